/// Flattening of a rendered card into paint commands
///
/// Backgrounds come first, then borders, then text rows, node by node in tree
/// order. Text rows that fall outside their node or the card are dropped.

use super::layout::Rect;
use super::{Node, RenderedRoot, Rotation, TextStyle};
use crate::theme::Rgba;

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    SolidRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        rgba: Rgba,
    },
    Text {
        x: i32,
        y: i32,
        /// Row text with the style's case transform applied
        text: String,
        style: TextStyle,
        /// Painting stops at this rect
        clip: Rect,
    },
}

pub fn paint_root(root: &RenderedRoot) -> Vec<PaintCommand> {
    let mut cmds = Vec::new();
    paint_node(&root.card, &root.card.rect, &mut cmds);
    cmds
}

fn paint_node(node: &Node, card: &Rect, cmds: &mut Vec<PaintCommand>) {
    let clip = node.rect.intersect(card);

    if let Some(bg) = node.background {
        push_rect(cmds, clip, bg);
    }

    if let Some(b) = node.borders {
        let r = node.rect;
        let w = b.width;
        let edges = [
            (b.top, Rect::new(r.x, r.y, r.width, w)),
            (b.bottom, Rect::new(r.x, r.bottom().saturating_sub(w as i32), r.width, w)),
            (b.left, Rect::new(r.x, r.y, w, r.height)),
            (b.right, Rect::new(r.right().saturating_sub(w as i32), r.y, w, r.height)),
        ];
        for (on, edge) in edges {
            if on {
                push_rect(cmds, edge.intersect(card), b.color);
            }
        }
    }

    paint_text(node, clip, cmds);

    for child in &node.children {
        paint_node(child, card, cmds);
    }
}

fn push_rect(cmds: &mut Vec<PaintCommand>, r: Rect, rgba: Rgba) {
    if r.width == 0 || r.height == 0 {
        return;
    }
    cmds.push(PaintCommand::SolidRect {
        x: r.x,
        y: r.y,
        width: r.width,
        height: r.height,
        rgba,
    });
}

fn paint_text(node: &Node, clip: Rect, cmds: &mut Vec<PaintCommand>) {
    if clip.width == 0 || clip.height == 0 || node.lines.is_empty() {
        return;
    }
    let pad = super::layout::BLOCK_PADDING as i32;
    let top_border = node.borders.map(|b| if b.top { b.width as i32 } else { 0 }).unwrap_or(0);
    let x = node.rect.x.saturating_add(pad);
    let mut y = node.rect.y.saturating_add(top_border + pad);

    for line in &node.lines {
        if line.style.rotation != Rotation::None {
            // Rotated labels are one unwrapped row whose baseline starts at the
            // bottom-left corner and climbs.
            cmds.push(PaintCommand::Text {
                x: node.rect.x,
                y: node.rect.bottom(),
                text: line.style.display(&line.text),
                style: line.style,
                clip,
            });
            continue;
        }
        let advance = line.style.line_height() as i32;
        for row in &line.rows {
            if y >= clip.bottom() {
                return;
            }
            if !row.is_empty() {
                cmds.push(PaintCommand::Text {
                    x,
                    y,
                    text: line.style.display(row),
                    style: line.style,
                    clip,
                });
            }
            y += advance;
        }
    }
}
