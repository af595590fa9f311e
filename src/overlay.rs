//! Text overlay with size-tiered styling.

use image::Rgb;
use tracing::{debug, instrument, warn};

use crate::image_handler::Image;
use crate::utils::glyphs;

/// Overlay color, the RGBA literal (255, 0, 140, 0) with alpha dropped.
pub const TEXT_COLOR: Rgb<u8> = Rgb([255, 0, 140]);

/// Stroke thickness, font scale and anchor for a text overlay.
/// The anchor is the bottom-left corner of the text line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub thickness: u32,
    pub font_scale: f64,
    pub x: i32,
    pub y: i32,
}

// (max rows, style), ascending by max rows.
const TIERS: [(u32, TextStyle); 4] = [
    (256, TextStyle { thickness: 2, font_scale: 0.6, x: 10, y: 25 }),
    (400, TextStyle { thickness: 1, font_scale: 0.3, x: 10, y: 10 }),
    (720, TextStyle { thickness: 2, font_scale: 0.8, x: 10, y: 50 }),
    (2992, TextStyle { thickness: 3, font_scale: 3.0, x: 10, y: 100 }),
];

impl TextStyle {
    /// Style for an image with `rows` rows, or `None` above the last tier.
    pub fn for_rows(rows: u32) -> Option<Self> {
        TIERS
            .iter()
            .find(|(max_rows, _)| rows <= *max_rows)
            .map(|(_, style)| *style)
    }
}

impl Image {
    /// Burn `text` into the image, styled by [`TextStyle::for_rows`].
    ///
    /// Images taller than the last tier are left untouched.
    pub fn put_text(&mut self, text: &str) {
        let rows = self.rows();
        match TextStyle::for_rows(rows) {
            Some(style) => self.put_text_with(text, style),
            None => debug!(id = self.id(), rows, "no text style for image height, skipping"),
        }
    }

    /// Burn `text` into the image with an explicit style.
    #[instrument(skip(self, text), fields(id = self.id(), len = text.len()))]
    pub fn put_text_with(&mut self, text: &str, style: TextStyle) {
        let id = self.id();
        let Some(buffer) = self.buffer_mut() else {
            warn!(id, "put_text on a released image");
            return;
        };
        let width = glyphs::draw_text(
            buffer,
            text,
            (style.x, style.y),
            style.font_scale,
            style.thickness,
            TEXT_COLOR,
        );
        debug!(width, ?style, "Text drawn");
    }
}
