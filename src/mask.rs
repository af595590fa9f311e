//! HSV color-range masks.

use std::path::Path;

use image::{GrayImage, ImageBuffer, ImageFormat, Luma, Rgb};
use tracing::{info, instrument};

use crate::error::Result;
use crate::image_handler::{Image, write_image};
use crate::utils::convert::{HsvImage, rgb_to_hsv_image};

const IN_RANGE: Luma<u8> = Luma([255]);
const OUT_OF_RANGE: Luma<u8> = Luma([0]);

/// Inclusive per-channel bounds on an HSV pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HsvRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl HsvRange {
    /// Sky/water blue.
    pub const BLUE: HsvRange = HsvRange {
        lower: [102, 31, 160],
        upper: [115, 255, 255],
    };

    pub fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    /// True when every channel lies within `[lower, upper]`.
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        within(&hsv, &self.lower, &self.upper)
    }
}

fn within(value: &[u8; 3], lower: &[u8; 3], upper: &[u8; 3]) -> bool {
    value
        .iter()
        .zip(lower.iter().zip(upper.iter()))
        .all(|(v, (lo, hi))| lo <= v && v <= hi)
}

/// Binary mask of the pixels of `hsv` inside `range`: 255 in range, 0 outside.
pub fn in_range(hsv: &HsvImage, range: &HsvRange) -> GrayImage {
    let (width, height) = hsv.dimensions();
    let lower: HsvImage = ImageBuffer::from_pixel(width, height, Rgb(range.lower));
    let upper: HsvImage = ImageBuffer::from_pixel(width, height, Rgb(range.upper));

    let mut mask = GrayImage::new(width, height);
    for (((out, px), lo), hi) in mask
        .pixels_mut()
        .zip(hsv.pixels())
        .zip(lower.pixels())
        .zip(upper.pixels())
    {
        *out = if within(&px.0, &lo.0, &hi.0) {
            IN_RANGE
        } else {
            OUT_OF_RANGE
        };
    }
    mask
}

impl Image {
    /// Mask of the pixels whose HSV values fall inside `range`.
    #[instrument(skip(self), fields(id = self.id()))]
    pub fn mask(&self, range: &HsvRange) -> Result<GrayImage> {
        let buffer = self.require("mask")?;
        let hsv = rgb_to_hsv_image(buffer);
        Ok(in_range(&hsv, range))
    }

    /// Mask of the blue pixels, see [`HsvRange::BLUE`].
    pub fn blue_mask(&self) -> Result<GrayImage> {
        self.mask(&HsvRange::BLUE)
    }

    /// Write the blue mask to `path` as PNG.
    #[instrument(skip_all, fields(id = self.id(), path = %path.as_ref().display()))]
    pub fn write_blue_mask(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mask = self.blue_mask()?;
        write_image(&mask, path, ImageFormat::Png, "write_blue_mask")?;
        let selected = mask.pixels().filter(|p| **p == IN_RANGE).count();
        info!(selected, total = mask.len(), "Blue mask written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImgUtilError;
    use image::RgbImage;

    #[test]
    fn test_blue_range_boundaries() {
        assert!(HsvRange::BLUE.contains([102, 31, 160]));
        assert!(HsvRange::BLUE.contains([115, 255, 255]));
        assert!(!HsvRange::BLUE.contains([101, 31, 160]));
        assert!(!HsvRange::BLUE.contains([116, 100, 200]));
        assert!(!HsvRange::BLUE.contains([110, 30, 200]));
        assert!(!HsvRange::BLUE.contains([110, 100, 159]));
    }

    #[test]
    fn test_in_range_on_synthetic_hsv() {
        let mut hsv = HsvImage::new(3, 1);
        hsv.put_pixel(0, 0, Rgb([102, 31, 160]));
        hsv.put_pixel(1, 0, Rgb([115, 255, 255]));
        hsv.put_pixel(2, 0, Rgb([101, 31, 160]));

        let mask = in_range(&hsv, &HsvRange::BLUE);
        assert_eq!(mask.get_pixel(0, 0), &IN_RANGE);
        assert_eq!(mask.get_pixel(1, 0), &IN_RANGE);
        assert_eq!(mask.get_pixel(2, 0), &OUT_OF_RANGE);
    }

    #[test]
    fn test_in_range_with_custom_range() {
        let mut hsv = HsvImage::new(2, 2);
        hsv.put_pixel(0, 0, Rgb([10, 10, 10]));
        hsv.put_pixel(1, 0, Rgb([20, 20, 20]));
        hsv.put_pixel(0, 1, Rgb([21, 20, 20]));
        hsv.put_pixel(1, 1, Rgb([9, 10, 10]));

        let mask = in_range(&hsv, &HsvRange::new([10, 10, 10], [20, 20, 20]));
        assert_eq!(mask.get_pixel(0, 0), &IN_RANGE);
        assert_eq!(mask.get_pixel(1, 0), &IN_RANGE);
        assert_eq!(mask.get_pixel(0, 1), &OUT_OF_RANGE);
        assert_eq!(mask.get_pixel(1, 1), &OUT_OF_RANGE);
    }

    #[test]
    fn test_blue_mask_selects_sky_blue() {
        // Left half sky blue (hue 108), right half red.
        let rgb = RgbImage::from_fn(8, 4, |x, _| {
            if x < 4 { Rgb([70, 130, 220]) } else { Rgb([220, 30, 30]) }
        });
        let image = Image::from_rgb(rgb).unwrap();
        let mask = image.blue_mask().unwrap();

        assert_eq!(mask.dimensions(), (8, 4));
        for (x, _, p) in mask.enumerate_pixels() {
            let expected = if x < 4 { IN_RANGE } else { OUT_OF_RANGE };
            assert_eq!(*p, expected);
        }
    }

    #[test]
    fn test_blue_mask_on_released_image() {
        let mut image = Image::from_rgb(RgbImage::new(2, 2)).unwrap();
        image.release();
        assert_eq!(
            image.blue_mask().unwrap_err(),
            ImgUtilError::BadBuffer("mask".into())
        );
    }

    #[test]
    fn test_write_blue_mask() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mask.png");
        let image = Image::from_rgb(RgbImage::from_pixel(5, 5, Rgb([70, 130, 220]))).unwrap();

        image.write_blue_mask(&path).unwrap();

        let written = image::open(&path).unwrap().to_luma8();
        assert_eq!(written.dimensions(), (5, 5));
        assert!(written.pixels().all(|p| *p == IN_RANGE));
    }
}
