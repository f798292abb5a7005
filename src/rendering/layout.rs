/// Fixed-grid card layout
///
/// The card is an 18-column grid inside 24px of padding: one column holds the
/// rotated hashtag, the other seventeen hold the stacked content rows. Text is
/// measured with a per-font character-width estimate, which is enough to size
/// the rows and wrap long lines.

use super::{Borders, FontFamily, FontWeight, Node, NodeKind, Rotation, TextLine, TextStyle};
use crate::state::FormState;
use crate::theme::Theme;
use crate::AspectRatio;

pub const CARD_PADDING: u32 = 24;
pub const GRID_COLUMNS: u32 = 18;
pub const BORDER_WIDTH: u32 = 2;
pub const ROW_GAP: u32 = 8;
pub const BLOCK_PADDING: u32 = 8;

pub const HASHTAG_SIZE: u32 = 16;
pub const NUMBER_SIZE: u32 = 128;
pub const TITLE_SIZE: u32 = 72;
pub const BODY_SIZE: u32 = 14;
pub const AUTHOR_SIZE: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(i32::try_from(self.height).unwrap_or(i32::MAX))
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(i32::try_from(self.width).unwrap_or(i32::MAX))
    }

    /// Shrink by `amount` on every side.
    pub fn inset(&self, amount: u32) -> Rect {
        Rect {
            x: self.x.saturating_add(amount as i32),
            y: self.y.saturating_add(amount as i32),
            width: self.width.saturating_sub(amount * 2),
            height: self.height.saturating_sub(amount * 2),
        }
    }

    /// Overlap of two rects; zero-sized when they do not meet.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Rect {
            x,
            y,
            width: right.saturating_sub(x).max(0) as u32,
            height: bottom.saturating_sub(y).max(0) as u32,
        }
    }
}

/// Split a title into its display lines.
///
/// Both a real line feed and the two-character sequence backslash-n start a
/// new line, and a carriage return right before a line feed is dropped. Empty
/// segments are kept, so `"A\\n\\nB"` yields three lines.
pub fn split_title_lines(title: &str) -> Vec<String> {
    title
        .replace("\\n", "\n")
        .split('\n')
        .map(|seg| seg.strip_suffix('\r').unwrap_or(seg).to_string())
        .collect()
}

/// Split body text on real line feeds only (`white-space: pre-line`).
pub fn split_body_lines(body: &str) -> Vec<String> {
    body.split('\n')
        .map(|seg| seg.strip_suffix('\r').unwrap_or(seg).to_string())
        .collect()
}

/// Greedy word wrap to at most `max_chars` characters per row.
/// Words longer than a row are hard-split. Always returns at least one row.
pub fn wrap_line(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut rows = Vec::new();
    let mut cur = String::new();
    let mut cur_len = 0usize;

    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        let mut word: &[char] = &chars;
        if word.len() > max_chars && cur_len > 0 {
            rows.push(std::mem::take(&mut cur));
            cur_len = 0;
        }
        while word.len() > max_chars {
            let (head, tail) = word.split_at(max_chars);
            rows.push(head.iter().collect());
            word = tail;
        }
        if cur_len > 0 && cur_len + 1 + word.len() > max_chars {
            rows.push(std::mem::take(&mut cur));
            cur_len = 0;
        }
        if cur_len > 0 {
            cur.push(' ');
            cur_len += 1;
        }
        cur_len += word.len();
        cur.extend(word.iter());
    }
    if cur_len > 0 || rows.is_empty() {
        rows.push(cur);
    }
    rows
}

fn text_line(text: String, style: TextStyle, inner_width: u32) -> TextLine {
    let rows = wrap_line(&text, style.chars_per_row(inner_width));
    TextLine { text, rows, style }
}

fn text_height(lines: &[TextLine]) -> u32 {
    lines
        .iter()
        .map(|l| (l.rows.len() as u32).saturating_mul(l.style.line_height()))
        .fold(0u32, |acc, h| acc.saturating_add(h))
}

/// Lay out the whole card for one form state.
pub fn layout_card(state: &FormState, theme: &Theme, aspect: AspectRatio, card_width: u32) -> Node {
    let card_rect = Rect::new(0, 0, card_width, aspect.height_for(card_width));
    let grid = card_rect.inset(CARD_PADDING);
    let col = grid.width / GRID_COLUMNS;

    // Sidebar: one column, open on the right so it shares the content border.
    let sidebar_rect = Rect::new(grid.x, grid.y, col, grid.height);
    let label_style = TextStyle {
        color: theme.text,
        size: HASHTAG_SIZE,
        leading: 1.5,
        family: FontFamily::Sans,
        weight: FontWeight::SemiBold,
        uppercase: false,
        italic: false,
        rotation: Rotation::CounterClockwise90,
    };
    let label_rect = Rect::new(
        sidebar_rect.x + BORDER_WIDTH as i32,
        sidebar_rect.y + BLOCK_PADDING as i32,
        sidebar_rect.width.saturating_sub(BORDER_WIDTH),
        sidebar_rect.height.saturating_sub(BLOCK_PADDING * 2),
    );
    // Rotated text runs along the sidebar's height and is never wrapped.
    let label = Node {
        kind: NodeKind::HashtagLabel,
        rect: label_rect,
        background: None,
        borders: None,
        lines: vec![TextLine::single(format!("#{}", state.hashtag), label_style)],
        children: Vec::new(),
    };
    let sidebar = Node {
        kind: NodeKind::Sidebar,
        rect: sidebar_rect,
        background: None,
        borders: Some(Borders {
            top: true,
            right: false,
            bottom: true,
            left: true,
            width: BORDER_WIDTH,
            color: theme.border,
        }),
        lines: Vec::new(),
        children: vec![label],
    };

    let content_rect = Rect::new(
        sidebar_rect.right(),
        grid.y,
        grid.width.saturating_sub(col),
        grid.height,
    );
    let inner = content_rect.inset(BORDER_WIDTH);
    let text_width = inner.width.saturating_sub(BLOCK_PADDING * 2);
    let mut children = Vec::new();

    // Number
    let number_style = TextStyle {
        color: theme.text,
        size: NUMBER_SIZE,
        leading: 1.0,
        family: FontFamily::Display,
        weight: FontWeight::ExtraBold,
        uppercase: false,
        italic: false,
        rotation: Rotation::None,
    };
    let number_lines = vec![text_line(state.number.clone(), number_style, text_width)];
    let number_h = text_height(&number_lines).saturating_add(BLOCK_PADDING + BORDER_WIDTH);
    let number_rect = Rect::new(inner.x, inner.y, inner.width, number_h);
    let mut y = number_rect.bottom().saturating_add(ROW_GAP as i32);
    children.push(Node {
        kind: NodeKind::Number,
        rect: number_rect,
        background: None,
        borders: Some(Borders::bottom(BORDER_WIDTH, theme.border)),
        lines: number_lines,
        children: Vec::new(),
    });

    // Title
    let title_style = TextStyle {
        color: theme.text,
        size: TITLE_SIZE,
        leading: 1.0,
        family: FontFamily::Display,
        weight: FontWeight::Bold,
        uppercase: true,
        italic: false,
        rotation: Rotation::None,
    };
    let title_lines: Vec<TextLine> = split_title_lines(&state.title)
        .into_iter()
        .map(|l| text_line(l, title_style, text_width))
        .collect();
    let title_h = text_height(&title_lines).saturating_add(BLOCK_PADDING * 2);
    let title_rect = Rect::new(inner.x, y, inner.width, title_h);
    y = title_rect.bottom().saturating_add(ROW_GAP as i32);
    children.push(Node {
        kind: NodeKind::Title,
        rect: title_rect,
        background: None,
        borders: None,
        lines: title_lines,
        children: Vec::new(),
    });

    if state.simple_page {
        let body_style = TextStyle {
            color: theme.text,
            size: BODY_SIZE,
            leading: 1.625,
            family: FontFamily::Sans,
            weight: FontWeight::Regular,
            uppercase: false,
            italic: false,
            rotation: Rotation::None,
        };
        let quote_style = TextStyle {
            leading: 1.43,
            italic: true,
            ..body_style
        };
        let author_style = TextStyle {
            size: AUTHOR_SIZE,
            leading: 1.5,
            weight: FontWeight::Medium,
            italic: false,
            ..body_style
        };

        // Quote is pinned to the bottom; the body takes whatever is left.
        let quote_lines = vec![
            text_line(format!("\u{201c}{}\u{201d}", state.quote), quote_style, text_width),
            text_line(state.author.clone(), author_style, text_width),
        ];
        let quote_h = text_height(&quote_lines).saturating_add(BORDER_WIDTH + BLOCK_PADDING * 2);
        let quote_y = inner
            .bottom()
            .saturating_sub(i32::try_from(quote_h).unwrap_or(i32::MAX))
            .max(y);
        let quote_rect = Rect::new(inner.x, quote_y, inner.width, quote_h);

        let body_lines: Vec<TextLine> = split_body_lines(&state.body)
            .into_iter()
            .map(|l| text_line(l, body_style, text_width))
            .collect();
        let body_h = quote_y.saturating_sub(ROW_GAP as i32).saturating_sub(y).max(0) as u32;
        children.push(Node {
            kind: NodeKind::Body,
            rect: Rect::new(inner.x, y, inner.width, body_h),
            background: None,
            borders: Some(Borders::top(BORDER_WIDTH, theme.border)),
            lines: body_lines,
            children: Vec::new(),
        });
        children.push(Node {
            kind: NodeKind::Quote,
            rect: quote_rect,
            background: None,
            borders: Some(Borders::top(BORDER_WIDTH, theme.border)),
            lines: quote_lines,
            children: Vec::new(),
        });
    }

    let content = Node {
        kind: NodeKind::Content,
        rect: content_rect,
        background: None,
        borders: Some(Borders::all(BORDER_WIDTH, theme.border)),
        lines: Vec::new(),
        children,
    };

    Node {
        kind: NodeKind::Card,
        rect: card_rect,
        background: Some(theme.background),
        borders: None,
        lines: Vec::new(),
        children: vec![sidebar, content],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_splits_on_both_break_forms() {
        assert_eq!(split_title_lines("A\\nB\nC"), vec!["A", "B", "C"]);
        assert_eq!(split_title_lines("A\r\nB"), vec!["A", "B"]);
        assert_eq!(split_title_lines(""), vec![""]);
        assert_eq!(split_title_lines("\\n"), vec!["", ""]);
        assert_eq!(split_title_lines("trailing\\"), vec!["trailing\\"]);
    }

    #[test]
    fn body_ignores_escaped_breaks() {
        assert_eq!(split_body_lines("a\\nb\nc"), vec!["a\\nb", "c"]);
    }

    #[test]
    fn wrap_line_breaks_words_and_hard_splits() {
        assert_eq!(wrap_line("hello big world", 9), vec!["hello big", "world"]);
        assert_eq!(wrap_line("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap_line("", 4), vec![""]);
        assert_eq!(wrap_line("   ", 4), vec![""]);
        assert_eq!(wrap_line("ab cd", 0), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn intersect_of_disjoint_rects_is_empty() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(20, 20, 5, 5);
        assert_eq!(a.intersect(&b).width, 0);
        assert_eq!(a.intersect(&Rect::new(5, 5, 10, 10)), Rect::new(5, 5, 5, 5));
    }
}
