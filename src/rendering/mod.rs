//! Card preview rendering
//!
//! [`PreviewRenderer::render`] is a pure function of the form state, the theme
//! and the aspect ratio. [`Preview`] runs it on every store notification and
//! publishes the resulting [`RenderedRoot`] through a [`RootHandle`], which is
//! the only thing the exporter sees.

pub mod layout;
pub mod paint;
pub mod raster;

use std::sync::Arc;

use sha2::{Digest, Sha256};
use tokio::sync::watch;

use crate::state::{FormState, FormStore, SubscriptionId};
use crate::theme::{registry, Rgba, Theme, ThemeId};
use crate::{AspectRatio, GeneratorConfig};

pub use layout::Rect;

/// A rasterized card.
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Card,
    Sidebar,
    HashtagLabel,
    Content,
    Number,
    Title,
    Body,
    Quote,
}

impl NodeKind {
    fn label(&self) -> &'static str {
        match self {
            NodeKind::Card => "card",
            NodeKind::Sidebar => "sidebar",
            NodeKind::HashtagLabel => "hashtag",
            NodeKind::Content => "content",
            NodeKind::Number => "number",
            NodeKind::Title => "title",
            NodeKind::Body => "body",
            NodeKind::Quote => "quote",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFamily {
    /// Condensed display face used for the number and title
    Display,
    Sans,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Medium,
    SemiBold,
    Bold,
    ExtraBold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    None,
    /// Turned a quarter left: text reads bottom to top
    CounterClockwise90,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub color: Rgba,
    /// Font size in px
    pub size: u32,
    /// Line height as a multiple of `size`
    pub leading: f32,
    pub family: FontFamily,
    pub weight: FontWeight,
    /// Displayed upper-case; the stored text keeps its case
    pub uppercase: bool,
    pub italic: bool,
    pub rotation: Rotation,
}

impl TextStyle {
    /// Estimated advance of one character in px.
    pub fn char_width(&self) -> u32 {
        let factor = match self.family {
            FontFamily::Display => 0.42,
            FontFamily::Sans => 0.55,
        };
        ((self.size as f32 * factor).round() as u32).max(1)
    }

    pub fn line_height(&self) -> u32 {
        ((self.size as f32 * self.leading).round() as u32).max(1)
    }

    pub fn chars_per_row(&self, width: u32) -> usize {
        (width / self.char_width()).max(1) as usize
    }

    /// The text as it appears on the card.
    pub fn display(&self, text: &str) -> String {
        if self.uppercase {
            text.to_uppercase()
        } else {
            text.to_string()
        }
    }
}

/// One logical line of text and the rows it wraps into
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub rows: Vec<String>,
    pub style: TextStyle,
}

impl TextLine {
    /// A line that is never wrapped.
    pub fn single(text: String, style: TextStyle) -> Self {
        Self {
            rows: vec![text.clone()],
            text,
            style,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Borders {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
    pub width: u32,
    pub color: Rgba,
}

impl Borders {
    pub fn all(width: u32, color: Rgba) -> Self {
        Self { top: true, right: true, bottom: true, left: true, width, color }
    }

    pub fn top(width: u32, color: Rgba) -> Self {
        Self { top: true, right: false, bottom: false, left: false, width, color }
    }

    pub fn bottom(width: u32, color: Rgba) -> Self {
        Self { top: false, right: false, bottom: true, left: false, width, color }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub rect: Rect,
    pub background: Option<Rgba>,
    pub borders: Option<Borders>,
    pub lines: Vec<TextLine>,
    pub children: Vec<Node>,
}

impl Node {
    /// Depth-first search for the first node of `kind`.
    pub fn find(&self, kind: NodeKind) -> Option<&Node> {
        if self.kind == kind {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(kind))
    }

    /// Visit this node and all descendants in paint order.
    pub fn walk<'a>(&'a self, f: &mut dyn FnMut(&'a Node)) {
        f(self);
        for c in &self.children {
            c.walk(f);
        }
    }
}

/// The three colors a theme controls, as read back from a rendered tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleSurfaces {
    pub background: Option<Rgba>,
    pub text: Option<Rgba>,
    pub border: Option<Rgba>,
}

/// The rendered card. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRoot {
    pub theme: ThemeId,
    pub aspect_ratio: AspectRatio,
    pub card: Node,
}

impl RenderedRoot {
    pub fn width(&self) -> u32 {
        self.card.rect.width
    }

    pub fn height(&self) -> u32 {
        self.card.rect.height
    }

    pub fn find(&self, kind: NodeKind) -> Option<&Node> {
        self.card.find(kind)
    }

    /// Logical title lines, before wrapping and case transform.
    pub fn title_lines(&self) -> Vec<&str> {
        self.find(NodeKind::Title)
            .map(|n| n.lines.iter().map(|l| l.text.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn style_surfaces(&self) -> StyleSurfaces {
        StyleSurfaces {
            background: self.card.background,
            text: self
                .find(NodeKind::Number)
                .and_then(|n| n.lines.first())
                .map(|l| l.style.color),
            border: self
                .find(NodeKind::Content)
                .and_then(|n| n.borders)
                .map(|b| b.color),
        }
    }

    /// Plain-text dump of the card, one row per logical line as displayed.
    pub fn text_snapshot(&self) -> String {
        let mut out = format!(
            "card {}x{} theme={} aspect={}\n",
            self.width(),
            self.height(),
            self.theme,
            self.aspect_ratio
        );
        self.card.walk(&mut |node| {
            for line in &node.lines {
                out.push_str(&format!("[{}] {}\n", node.kind.label(), line.style.display(&line.text)));
            }
        });
        out
    }

    /// SHA-256 over everything that affects the raster output.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.text_snapshot().as_bytes());
        self.card.walk(&mut |node| {
            hasher.update(format!("{:?}{:?}{:?}", node.rect, node.background, node.borders).as_bytes());
            for line in &node.lines {
                hasher.update(format!("{:?}", line.style).as_bytes());
            }
        });
        hex::encode(hasher.finalize())
    }
}

/// Pure state-to-tree renderer
#[derive(Debug, Clone)]
pub struct PreviewRenderer {
    card_width: u32,
}

impl PreviewRenderer {
    pub fn new(card_width: u32) -> Self {
        Self { card_width }
    }

    /// Render the card. Total over all string inputs.
    pub fn render(&self, state: &FormState, theme: &Theme, aspect: AspectRatio) -> RenderedRoot {
        RenderedRoot {
            theme: theme.id,
            aspect_ratio: aspect,
            card: layout::layout_card(state, theme, aspect, self.card_width),
        }
    }

    /// Render using the theme and aspect ratio selected in `state`.
    pub fn render_state(&self, state: &FormState) -> RenderedRoot {
        self.render(state, registry().get(state.theme), state.aspect_ratio)
    }
}

impl Default for PreviewRenderer {
    fn default() -> Self {
        Self::new(crate::CARD_WIDTH)
    }
}

type RootSlot = Option<Arc<RenderedRoot>>;

/// Read side of the published root. Cheap to clone.
///
/// Unset until the preview renders for the first time.
#[derive(Debug, Clone)]
pub struct RootHandle {
    rx: watch::Receiver<RootSlot>,
}

impl RootHandle {
    /// A handle that is never set.
    pub fn unset() -> Self {
        let (_tx, rx) = watch::channel(None);
        Self { rx }
    }

    /// The root published most recently, if any.
    pub fn current(&self) -> Option<Arc<RenderedRoot>> {
        self.rx.borrow().clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.rx.borrow().is_some()
    }
}

/// A renderer bound to the slot its output is published into
#[derive(Debug, Clone)]
pub struct Preview {
    renderer: PreviewRenderer,
    tx: Arc<watch::Sender<RootSlot>>,
}

impl Preview {
    pub fn new(config: &GeneratorConfig) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            renderer: PreviewRenderer::new(config.card_width),
            tx: Arc::new(tx),
        }
    }

    pub fn handle(&self) -> RootHandle {
        RootHandle { rx: self.tx.subscribe() }
    }

    /// Render `state` and publish the result.
    pub fn render_now(&self, state: &FormState) -> Arc<RenderedRoot> {
        let root = Arc::new(self.renderer.render_state(state));
        log::debug!(
            "publishing {}x{} root (theme={}, simple_page={})",
            root.width(),
            root.height(),
            root.theme,
            state.simple_page
        );
        self.tx.send_replace(Some(root.clone()));
        root
    }

    /// Subscribe to `store` so every edit re-renders. Renders immediately.
    pub fn mount(&self, store: &mut FormStore) -> SubscriptionId {
        let preview = self.clone();
        store.subscribe(move |state| {
            preview.render_now(state);
        })
    }

    /// Clear the published root, as when the preview is removed.
    pub fn unmount(&self) {
        self.tx.send_replace(None);
    }
}
