//! Hashtag derivation and store notification

use std::sync::{Arc, Mutex};

use art_prompt::state::{zero_pad, FieldEdit, FormState, FormStore};
use art_prompt::theme::ThemeId;
use art_prompt::{AspectRatio, GeneratorConfig, HashtagPolicy};

#[test]
fn number_changes_derive_padded_hashtag() {
    let mut s = FormState::default();
    for n in ["0", "7", "42", "365", "", "abc"] {
        s.set_number(n);
        assert_eq!(s.hashtag, format!("onephotoaday{}", zero_pad(n, 3)));
    }
    s.set_number("1000");
    assert_eq!(s.hashtag, "onephotoaday1000");
}

#[test]
fn manual_hashtag_blocks_only_the_next_number_change() {
    let mut s = FormState::default();
    s.set_number("10");
    s.set_hashtag("sunday");
    s.set_number("11");
    assert_eq!(s.hashtag, "sunday");
    s.set_number("12");
    assert_eq!(s.hashtag, "onephotoaday012");
}

#[test]
fn repeated_hashtag_edits_keep_it_manual() {
    let mut s = FormState::default();
    s.set_hashtag("a");
    s.set_hashtag("b");
    assert!(s.hashtag_is_manual());
    s.set_number("3");
    assert_eq!(s.hashtag, "b");
}

#[test]
fn custom_prefix_and_pad_width() {
    let cfg = GeneratorConfig {
        hashtag_prefix: "sketch".into(),
        hashtag_pad: 4,
        hashtag_policy: HashtagPolicy::Detached,
        ..Default::default()
    };
    let mut s = FormState::with_config(&cfg);
    assert_eq!(s.hashtag, "sketch0001");
    s.set_number("9");
    assert_eq!(s.hashtag, "sketch0009");
}

#[test]
fn any_string_is_accepted() {
    let mut store = FormStore::default();
    store.apply_all([
        FieldEdit::Title(String::new()),
        FieldEdit::Body("\u{0}\u{7f}\\n".into()),
        FieldEdit::Quote("\"unterminated".into()),
        FieldEdit::Author("x".repeat(10_000)),
        FieldEdit::Theme(ThemeId::Mono),
        FieldEdit::AspectRatio(AspectRatio::Portrait),
    ]);
    let s = store.state();
    assert_eq!(s.title, "");
    assert_eq!(s.author.len(), 10_000);
    assert_eq!(s.theme, ThemeId::Mono);
    assert_eq!(s.aspect_ratio, AspectRatio::Portrait);
}

#[test]
fn every_edit_notifies_once() {
    let mut store = FormStore::default();
    let count = Arc::new(Mutex::new(0usize));
    let c = count.clone();
    store.subscribe(move |_| *c.lock().unwrap() += 1);
    store.apply(FieldEdit::SimplePage(true));
    store.apply(FieldEdit::SimplePage(true));
    store.apply(FieldEdit::RelinkHashtag);
    // one immediate call on subscribe plus one per edit
    assert_eq!(*count.lock().unwrap(), 4);
}
