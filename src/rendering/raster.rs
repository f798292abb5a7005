/// CPU rasterizer for rendered cards
///
/// Paints the command list from [`paint_root`] into a `tiny_skia::Pixmap` and
/// encodes it as PNG. There is no font stack: every visible character is drawn
/// as a filled glyph block sized from the text style, which keeps the layout,
/// colors and line structure of the card recognizable in the image.

use tiny_skia::{Paint, Pixmap, Transform};

use super::layout::Rect;
use super::paint::{paint_root, PaintCommand};
use super::{FontWeight, RenderedRoot, Rotation, Screenshot, TextStyle};
use crate::theme::Rgba;
use crate::{Error, Result};

/// Rasterize `root` at `pixel_ratio` device pixels per CSS pixel.
pub fn rasterize(root: &RenderedRoot, pixel_ratio: f32) -> Result<Screenshot> {
    if !(pixel_ratio.is_finite() && pixel_ratio > 0.0) {
        return Err(Error::Rasterization(format!("invalid pixel ratio {}", pixel_ratio)));
    }
    let width = ((root.width() as f32) * pixel_ratio).ceil() as u32;
    let height = ((root.height() as f32) * pixel_ratio).ceil() as u32;
    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        Error::Rasterization(format!("cannot allocate {}x{} pixmap", width, height))
    })?;
    let transform = Transform::from_scale(pixel_ratio, pixel_ratio);

    for cmd in paint_root(root) {
        match cmd {
            PaintCommand::SolidRect { x, y, width, height, rgba } => {
                fill(&mut pixmap, x as f32, y as f32, width as f32, height as f32, rgba, transform);
            }
            PaintCommand::Text { x, y, text, style, clip } => {
                draw_text(&mut pixmap, x, y, &text, &style, clip, transform);
            }
        }
    }

    let png_data = pixmap
        .encode_png()
        .map_err(|e| Error::Encoding(e.to_string()))?;
    Ok(Screenshot { width, height, png_data })
}

fn fill(pixmap: &mut Pixmap, x: f32, y: f32, w: f32, h: f32, rgba: Rgba, transform: Transform) {
    let Some(rect) = tiny_skia::Rect::from_xywh(x, y, w, h) else {
        return;
    };
    let mut paint = Paint::default();
    paint.set_color_rgba8(rgba.r, rgba.g, rgba.b, rgba.a);
    paint.anti_alias = false;
    pixmap.fill_rect(rect, &paint, transform, None);
}

/// Glyph block for `ch` relative to its cell: `(dx, dy, w, h)` in px, with
/// `dy` measured down from the top of the line.
fn glyph_box(ch: char, cell: f32, style: &TextStyle) -> Option<(f32, f32, f32, f32)> {
    if ch.is_whitespace() || ch.is_control() {
        return None;
    }
    let size = style.size as f32;
    let inset = match style.weight {
        FontWeight::Bold | FontWeight::ExtraBold => 0.08,
        FontWeight::SemiBold | FontWeight::Medium => 0.12,
        FontWeight::Regular => 0.16,
    } * cell;
    let w = (cell - inset * 2.0).max(1.0);
    let slant = if style.italic { inset } else { 0.0 };

    let b = match ch {
        '.' | ',' | ':' | ';' => (inset + slant, size * 0.75, w * 0.35, size * 0.12),
        '\'' | '"' | '\u{201c}' | '\u{201d}' | '\u{2018}' | '\u{2019}' | '`' => {
            (inset + slant, size * 0.15, w * 0.5, size * 0.15)
        }
        '-' | '\u{2013}' | '\u{2014}' => (inset, size * 0.5, w, size * 0.08),
        c if c.is_lowercase() => (inset + slant, size * 0.4, w, size * 0.48),
        _ => (inset + slant, size * 0.15, w, size * 0.73),
    };
    Some(b)
}

fn draw_text(
    pixmap: &mut Pixmap,
    x: i32,
    y: i32,
    text: &str,
    style: &TextStyle,
    clip: Rect,
    transform: Transform,
) {
    let cell = style.char_width() as f32;
    let (cx0, cy0) = (clip.x as f32, clip.y as f32);
    let (cx1, cy1) = (clip.right() as f32, clip.bottom() as f32);

    for (i, ch) in text.chars().enumerate() {
        let Some((dx, dy, w, h)) = glyph_box(ch, cell, style) else {
            continue;
        };
        let advance = i as f32 * cell;
        let (gx, gy, gw, gh) = match style.rotation {
            Rotation::None => {
                if x as f32 + advance >= cx1 {
                    break;
                }
                (x as f32 + advance + dx, y as f32 + dy, w, h)
            }
            // Top of the glyphs faces left; the run climbs from `y`.
            Rotation::CounterClockwise90 => {
                if y as f32 - advance <= cy0 {
                    break;
                }
                (x as f32 + dy, y as f32 - advance - dx - w, h, w)
            }
        };
        let x0 = gx.max(cx0);
        let y0 = gy.max(cy0);
        let x1 = (gx + gw).min(cx1);
        let y1 = (gy + gh).min(cy1);
        if x1 > x0 && y1 > y0 {
            fill(pixmap, x0, y0, x1 - x0, y1 - y0, style.color, transform);
        }
    }
}
