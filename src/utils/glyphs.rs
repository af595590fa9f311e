//! Bitmap text rasterizer built on the 8x8 `font8x8` glyph set.
//!
//! Glyph cells are scaled by nearest-neighbor and each lit cell is drawn as a
//! filled rectangle, widened by the stroke thickness.

use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

/// Glyph edge length in font units.
pub const GLYPH_SIZE: i32 = 8;

/// Text height in pixels at font scale 1.0.
const BASE_HEIGHT: f64 = 22.0;

/// Pixel size of one glyph cell for the given font scale (at least 1).
pub fn cell_size(font_scale: f64) -> i32 {
    ((font_scale * BASE_HEIGHT / GLYPH_SIZE as f64).round() as i32).max(1)
}

fn glyph(ch: char) -> [u8; 8] {
    BASIC_FONTS
        .get(ch)
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

/// Draw `text` in an italic slant with the bottom-left corner of the line at
/// `origin`. Returns the advance width of the line in pixels.
pub fn draw_text(
    canvas: &mut RgbImage,
    text: &str,
    origin: (i32, i32),
    font_scale: f64,
    thickness: u32,
    color: Rgb<u8>,
) -> i32 {
    let cell = cell_size(font_scale);
    let stroke = cell + thickness.max(1) as i32 - 1;
    // Strokes widen up and to the left so nothing crosses the baseline.
    let pad = stroke - cell;
    let advance = GLYPH_SIZE * cell;
    let top = origin.1 - advance;

    let mut cursor_x = origin.0;
    for ch in text.chars() {
        for (row, bits) in glyph(ch).iter().enumerate() {
            let row = row as i32;
            let slant = (GLYPH_SIZE - 1 - row) * cell / 4;
            for col in 0..GLYPH_SIZE {
                if (bits >> col) & 1 == 0 {
                    continue;
                }
                let x = cursor_x + col * cell + slant - pad;
                let y = top + row * cell - pad;
                let rect = Rect::at(x, y).of_size(stroke as u32, stroke as u32);
                draw_filled_rect_mut(canvas, rect, color);
            }
        }
        cursor_x += advance;
    }

    cursor_x - origin.0
}
