//! Form state and the observable store that owns it.
//!
//! [`FormState`] is the single source of truth for everything the card shows.
//! [`FormStore`] owns one, applies [`FieldEdit`]s to it and synchronously
//! notifies subscribers after each edit, which is how the preview is kept in
//! step with the form.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::theme::ThemeId;
use crate::{AspectRatio, GeneratorConfig};

const SAMPLE_TITLE: &str =
    "GO TO AN ART GALLERY OR A MUSEUM TODAY AND CHOOSE ONE WORK TO TAKE HOME WITH YOU.";

const SAMPLE_BODY: &str = "One of the best ways you can practise paying attention to the things around you is to look at art. Think about how absurdly fast we move through a museum or an art exhibit, glancing at each artwork for just a few seconds, considering each work has taken days, weeks, months, or even years to create.\n\nA good way to teach yourself to give art the attention it deserves is to play a game with yourself when you enter a gallery or a museum. Pretend that you have an unlimited budget and that you can take just one work of art home with you. Which one would you choose? Think about it very carefully. Take a picture of your final choice and use it as your screensaver.";

const SAMPLE_QUOTE: &str = "Art enables us to find ourselves and lose ourselves at the same time.";

/// How a manually edited hashtag reacts to later number changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashtagPolicy {
    /// The next number change keeps the manual hashtag and re-links it;
    /// number changes after that derive the hashtag again.
    #[default]
    UntilNextNumber,
    /// A manual hashtag stays until [`FormState::relink_hashtag`] is called.
    Detached,
}

/// Left-pad `number` with `'0'` to `width` characters. Never truncates.
pub fn zero_pad(number: &str, width: usize) -> String {
    let len = number.chars().count();
    if len >= width {
        return number.to_string();
    }
    let mut out = "0".repeat(width - len);
    out.push_str(number);
    out
}

/// All user-editable fields plus the derived hashtag
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub number: String,
    pub hashtag: String,
    pub title: String,
    /// Shows the body and quote blocks ("full page")
    pub simple_page: bool,
    pub body: String,
    pub quote: String,
    pub author: String,
    pub theme: ThemeId,
    pub aspect_ratio: AspectRatio,

    hashtag_edited: bool,
    hashtag_prefix: String,
    hashtag_pad: usize,
    hashtag_policy: HashtagPolicy,
}

impl Default for FormState {
    fn default() -> Self {
        Self::with_config(&GeneratorConfig::default())
    }
}

impl FormState {
    /// Sample content with the hashtag rules taken from `config`.
    pub fn with_config(config: &GeneratorConfig) -> Self {
        let mut state = Self {
            number: "001".to_string(),
            hashtag: String::new(),
            title: SAMPLE_TITLE.to_string(),
            simple_page: false,
            body: SAMPLE_BODY.to_string(),
            quote: SAMPLE_QUOTE.to_string(),
            author: "Thomas Merton".to_string(),
            theme: ThemeId::default(),
            aspect_ratio: AspectRatio::default(),
            hashtag_edited: false,
            hashtag_prefix: config.hashtag_prefix.clone(),
            hashtag_pad: config.hashtag_pad,
            hashtag_policy: config.hashtag_policy,
        };
        state.hashtag = state.derived_hashtag();
        state
    }

    /// The hashtag `number` would derive, without the leading `#`.
    pub fn derived_hashtag(&self) -> String {
        format!("{}{}", self.hashtag_prefix, zero_pad(&self.number, self.hashtag_pad))
    }

    /// Whether the hashtag currently holds a manual edit.
    pub fn hashtag_is_manual(&self) -> bool {
        self.hashtag_edited
    }

    pub fn set_number(&mut self, number: impl Into<String>) {
        self.number = number.into();
        if !self.hashtag_edited {
            self.hashtag = self.derived_hashtag();
            return;
        }
        if self.hashtag_policy == HashtagPolicy::UntilNextNumber {
            self.hashtag_edited = false;
        }
    }

    pub fn set_hashtag(&mut self, hashtag: impl Into<String>) {
        self.hashtag = hashtag.into();
        self.hashtag_edited = true;
    }

    /// Drop any manual hashtag and derive it from the current number.
    pub fn relink_hashtag(&mut self) {
        self.hashtag_edited = false;
        self.hashtag = self.derived_hashtag();
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_simple_page(&mut self, simple_page: bool) {
        self.simple_page = simple_page;
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    pub fn set_quote(&mut self, quote: impl Into<String>) {
        self.quote = quote.into();
    }

    pub fn set_author(&mut self, author: impl Into<String>) {
        self.author = author.into();
    }

    pub fn set_theme(&mut self, theme: ThemeId) {
        self.theme = theme;
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: AspectRatio) {
        self.aspect_ratio = aspect_ratio;
    }

    /// Apply a single edit event.
    pub fn apply(&mut self, edit: FieldEdit) {
        match edit {
            FieldEdit::Number(v) => self.set_number(v),
            FieldEdit::Hashtag(v) => self.set_hashtag(v),
            FieldEdit::RelinkHashtag => self.relink_hashtag(),
            FieldEdit::Title(v) => self.set_title(v),
            FieldEdit::SimplePage(v) => self.set_simple_page(v),
            FieldEdit::Body(v) => self.set_body(v),
            FieldEdit::Quote(v) => self.set_quote(v),
            FieldEdit::Author(v) => self.set_author(v),
            FieldEdit::Theme(v) => self.set_theme(v),
            FieldEdit::AspectRatio(v) => self.set_aspect_ratio(v),
        }
    }
}

/// A change event coming from one form control
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    Number(String),
    Hashtag(String),
    RelinkHashtag,
    Title(String),
    SimplePage(bool),
    Body(String),
    Quote(String),
    Author(String),
    Theme(ThemeId),
    AspectRatio(AspectRatio),
}

/// Handle returned by [`FormStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Arc<dyn Fn(&FormState) + Send + Sync>;

/// Owns the [`FormState`] and notifies subscribers after every edit.
///
/// All edits go through `&mut self`, so there is exactly one writer and each
/// subscriber sees every state in order.
pub struct FormStore {
    state: FormState,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: u64,
}

impl Default for FormStore {
    fn default() -> Self {
        Self::new(FormState::default())
    }
}

impl FormStore {
    pub fn new(state: FormState) -> Self {
        Self {
            state,
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Register a callback. It is invoked immediately with the current state
    /// and then after every edit.
    pub fn subscribe<F>(&mut self, cb: F) -> SubscriptionId
    where
        F: Fn(&FormState) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        cb(&self.state);
        self.subscribers.push((id, Arc::new(cb)));
        id
    }

    /// Remove a subscriber. Returns false when the id was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn apply(&mut self, edit: FieldEdit) {
        log::debug!("applying edit {:?}", edit);
        self.state.apply(edit);
        self.notify();
    }

    /// Apply several edits, notifying once per edit.
    pub fn apply_all<I>(&mut self, edits: I)
    where
        I: IntoIterator<Item = FieldEdit>,
    {
        for edit in edits {
            self.apply(edit);
        }
    }

    fn notify(&self) {
        for (_, cb) in &self.subscribers {
            cb(&self.state);
        }
    }
}
