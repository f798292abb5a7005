//! Rendering properties of the card preview

use art_prompt::rendering::{NodeKind, PreviewRenderer, RenderedRoot};
use art_prompt::state::FormState;
use art_prompt::theme::{registry, ThemeId};
use art_prompt::{AspectRatio, CARD_WIDTH_WIDE};

fn render(state: &FormState) -> RenderedRoot {
    PreviewRenderer::default().render_state(state)
}

fn expected_lines(s: &str) -> usize {
    s.matches('\n').count() + s.matches("\\n").count() + 1
}

#[test]
fn title_line_count_follows_both_break_forms() {
    let samples = [
        "",
        "single",
        "GO TO A MUSEUM\\nTODAY",
        "a\nb\nc",
        "mixed\\nescape\nand real",
        "\\n\\n",
        "ends with backslash \\",
        "windows\r\nbreak",
        "unmatched <b> [markup ( \\x",
        "ünïcödé\\n日本語",
    ];
    let mut state = FormState::default();
    for s in samples {
        state.set_title(s);
        let root = render(&state);
        assert_eq!(root.title_lines().len(), expected_lines(s), "title {:?}", s);
    }
}

#[test]
fn render_is_total_for_extreme_input() {
    let mut state = FormState::default();
    state.set_simple_page(true);
    let long = "W".repeat(200_000);
    for s in ["", long.as_str(), "\u{0}\u{1b}[31m", "\\", "\n\n\n"] {
        state.set_number(s);
        state.set_title(s);
        state.set_body(s);
        state.set_quote(s);
        state.set_author(s);
        state.set_hashtag(s);
        for aspect in AspectRatio::ALL {
            state.set_aspect_ratio(aspect);
            let root = render(&state);
            assert!(root.find(NodeKind::Quote).is_some());
        }
    }
}

#[test]
fn number_is_shown_verbatim() {
    let mut state = FormState::default();
    state.set_number("7");
    let root = render(&state);
    let number = root.find(NodeKind::Number).unwrap();
    assert_eq!(number.lines[0].text, "7");
    let label = root.find(NodeKind::HashtagLabel).unwrap();
    assert_eq!(label.lines[0].text, "#onephotoaday007");
}

#[test]
fn simple_page_toggles_body_and_quote() {
    let mut state = FormState::default();
    let off = render(&state);
    assert!(off.find(NodeKind::Body).is_none());
    assert!(off.find(NodeKind::Quote).is_none());
    state.set_simple_page(false);
    assert_eq!(render(&state), off);

    state.set_simple_page(true);
    let on = render(&state);
    let body = on.find(NodeKind::Body).unwrap();
    let quote = on.find(NodeKind::Quote).unwrap();
    assert!(body.lines.len() >= 2, "sample body has a blank line between paragraphs");
    assert!(quote.lines[0].text.starts_with('\u{201c}'));
    assert_eq!(quote.lines[1].text, "Thomas Merton");
    assert!(quote.lines[0].style.italic);
    assert!(!quote.lines[1].style.italic);
    state.set_simple_page(true);
    assert_eq!(render(&state), on);
}

#[test]
fn quote_is_pinned_to_the_bottom_of_the_content() {
    let mut state = FormState::default();
    state.set_simple_page(true);
    state.set_title("short");
    state.set_body("tiny");
    let root = render(&state);
    let content = root.find(NodeKind::Content).unwrap();
    let quote = root.find(NodeKind::Quote).unwrap();
    assert_eq!(quote.rect.bottom(), content.rect.bottom() - 2);
}

#[test]
fn theme_changes_only_theme_surfaces() {
    let mut state = FormState::default();
    state.set_simple_page(true);
    let base = render(&state);
    for id in ThemeId::ALL {
        state.set_theme(id);
        let root = render(&state);
        let theme = registry().get(id);
        let surfaces = root.style_surfaces();
        assert_eq!(surfaces.background, Some(theme.background));
        assert_eq!(surfaces.text, Some(theme.text));
        assert_eq!(surfaces.border, Some(theme.border));
        assert_eq!(root.width(), base.width());
        assert_eq!(root.height(), base.height());
        assert_eq!(root.aspect_ratio, base.aspect_ratio);

        let mut a = Vec::new();
        base.card.walk(&mut |n| a.push((n.kind, n.rect)));
        let mut b = Vec::new();
        root.card.walk(&mut |n| b.push((n.kind, n.rect)));
        assert_eq!(a, b);
    }
}

#[test]
fn aspect_ratio_changes_only_card_height() {
    let mut state = FormState::default();
    state.set_theme(ThemeId::Forest);
    let square = render(&state);
    state.set_aspect_ratio(AspectRatio::Portrait);
    let portrait = render(&state);
    assert_eq!(square.style_surfaces(), portrait.style_surfaces());
    assert_eq!(square.width(), portrait.width());
    assert_eq!(square.height(), 480);
    assert_eq!(portrait.height(), 600);
}

#[test]
fn wide_card_uses_600px() {
    let root = PreviewRenderer::new(CARD_WIDTH_WIDE).render_state(&FormState::default());
    assert_eq!((root.width(), root.height()), (600, 600));
}

#[test]
fn text_snapshot_lists_blocks_in_order() {
    let mut state = FormState::default();
    state.set_title("first\\nsecond");
    state.set_simple_page(true);
    state.set_body("b");
    state.set_quote("q");
    state.set_author("a");
    let snap = render(&state).text_snapshot();
    let lines: Vec<&str> = snap.lines().collect();
    assert_eq!(
        lines,
        vec![
            "card 480x480 theme=classic aspect=square",
            "[hashtag] #onephotoaday001",
            "[number] 001",
            "[title] FIRST",
            "[title] SECOND",
            "[body] b",
            "[quote] \u{201c}q\u{201d}",
            "[quote] a",
        ]
    );
}
