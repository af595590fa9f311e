use image::{ImageBuffer, Rgb, RgbImage};

/// A 3-channel HSV image. Channels are stored in an `Rgb` container as
/// `[h, s, v]` with the 8-bit convention: hue in `0..180` (degrees / 2),
/// saturation and value in `0..=255`.
pub type HsvImage = ImageBuffer<Rgb<u8>, Vec<u8>>;

/// Convert one RGB pixel to 8-bit HSV.
pub fn rgb_to_hsv(pixel: Rgb<u8>) -> [u8; 3] {
    let [r, g, b] = pixel.0;
    let (r, g, b) = (r as f32, g as f32, b as f32);

    let v = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = v - min;

    let s = if v == 0.0 { 0.0 } else { 255.0 * diff / v };

    let mut h = if diff == 0.0 {
        0.0
    } else if v == r {
        60.0 * (g - b) / diff
    } else if v == g {
        120.0 + 60.0 * (b - r) / diff
    } else {
        240.0 + 60.0 * (r - g) / diff
    };
    if h < 0.0 {
        h += 360.0;
    }

    // Hue is halved so it fits a byte; 359.x rounds up to 180 and wraps to 0.
    let h = (h / 2.0).round() as u16 % 180;

    [h as u8, s.round() as u8, v as u8]
}

/// Convert an RGB image to an HSV image of the same dimensions.
pub fn rgb_to_hsv_image(img: &RgbImage) -> HsvImage {
    let (width, height) = img.dimensions();
    let mut out = ImageBuffer::new(width, height);

    for (x, y, pixel) in img.enumerate_pixels() {
        out.put_pixel(x, y, Rgb(rgb_to_hsv(*pixel)));
    }

    out
}

/// Mean of the HSV value channel, normalized to `[0, 1]`.
/// Returns `None` for an image with no pixels.
pub fn mean_value(hsv: &HsvImage) -> Option<f64> {
    let count = hsv.width() as u64 * hsv.height() as u64;
    if count == 0 {
        return None;
    }
    let sum: u64 = hsv.pixels().map(|p| p[2] as u64).sum();
    Some(sum as f64 / count as f64 / 255.0)
}
