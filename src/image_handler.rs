//! The `Image` façade: an owned 8-bit, 3-channel pixel buffer.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use image::{ImageFormat, ImageReader, RgbImage};
use tracing::{debug, info, instrument, warn};

use crate::error::{ImgUtilError, Result};
use crate::utils::convert::{mean_value, rgb_to_hsv_image};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// An in-memory color image.
///
/// The buffer is released by [`Image::release`] or when the value is dropped,
/// whichever comes first. Every operation on a released image fails with
/// [`ImgUtilError::BadBuffer`] (or, for drawing, is skipped with a warning).
#[derive(Debug)]
pub struct Image {
    id: u64,
    buffer: Option<RgbImage>,
}

impl Image {
    /// Load and decode an image file as color.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let op = format!("failed to load image {}", path.display());
        // Sniff the content; the extension may be missing or wrong.
        let img = ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|e| ImgUtilError::decode(&op, e))?
            .decode()
            .map_err(|e| ImgUtilError::decode(&op, e))?;
        Self::from_decoded(img.to_rgb8(), "from_path")
    }

    /// Decode an encoded image (PNG, JPEG, BMP, ...) held in memory.
    #[instrument(skip(bytes), fields(data_len = bytes.len()))]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| ImgUtilError::decode("failed to decode image bytes", e))?;
        Self::from_decoded(img.to_rgb8(), "from_bytes")
    }

    /// Wrap an already decoded RGB buffer.
    pub fn from_rgb(buffer: RgbImage) -> Result<Self> {
        if buffer.width() == 0 || buffer.height() == 0 {
            return Err(ImgUtilError::bad_buffer("from_rgb: empty pixel buffer"));
        }
        Ok(Self::wrap(buffer))
    }

    fn from_decoded(buffer: RgbImage, op: &str) -> Result<Self> {
        if buffer.width() == 0 || buffer.height() == 0 {
            return Err(ImgUtilError::Decode(format!("{op}: decoded image is empty")));
        }
        let image = Self::wrap(buffer);
        info!(
            id = image.id,
            width = image.width(),
            height = image.height(),
            "Image loaded"
        );
        Ok(image)
    }

    fn wrap(buffer: RgbImage) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            buffer: Some(buffer),
        }
    }

    /// Process-unique identifier, used in log records.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Width in pixels, 0 once released.
    pub fn width(&self) -> u32 {
        self.buffer.as_ref().map_or(0, |b| b.width())
    }

    /// Height in pixels, 0 once released.
    pub fn height(&self) -> u32 {
        self.buffer.as_ref().map_or(0, |b| b.height())
    }

    /// Row count, same as [`Image::height`].
    pub fn rows(&self) -> u32 {
        self.height()
    }

    /// Column count, same as [`Image::width`].
    pub fn cols(&self) -> u32 {
        self.width()
    }

    /// True once the buffer has been released.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_none()
    }

    /// Borrow the pixel buffer, `None` once released.
    pub fn as_rgb(&self) -> Option<&RgbImage> {
        self.buffer.as_ref()
    }

    pub(crate) fn buffer_mut(&mut self) -> Option<&mut RgbImage> {
        self.buffer.as_mut()
    }

    pub(crate) fn require(&self, op: &str) -> Result<&RgbImage> {
        self.buffer
            .as_ref()
            .ok_or_else(|| ImgUtilError::bad_buffer(op))
    }

    /// Release the pixel buffer. Releasing twice is not an error; it is
    /// reported as a warning.
    pub fn release(&mut self) {
        match self.buffer.take() {
            Some(_) => debug!(id = self.id, "Image released"),
            None => warn!(id = self.id, "release called on an already released image"),
        }
    }

    /// Mean HSV value (brightness) of the image, in `[0, 1]`.
    #[instrument(skip(self), fields(id = self.id))]
    pub fn mean_brightness(&self) -> Result<f64> {
        let buffer = self.require("mean_brightness")?;
        let hsv = rgb_to_hsv_image(buffer);
        mean_value(&hsv).ok_or_else(|| ImgUtilError::bad_buffer("mean_brightness"))
    }

    /// Encode the image to `path`; the format follows the file extension.
    #[instrument(skip_all, fields(id = self.id, path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let buffer = self.require("save")?;
        let format = ImageFormat::from_path(path)
            .map_err(|e| ImgUtilError::encode("save: unsupported output format", e))?;
        write_image(buffer, path, format, "save")
    }
}

impl Drop for Image {
    fn drop(&mut self) {
        if self.buffer.take().is_some() {
            debug!(id = self.id, "Image released on drop");
        }
    }
}

/// Create `path` and encode `buffer` into it.
pub(crate) fn write_image<P>(
    buffer: &image::ImageBuffer<P, Vec<u8>>,
    path: &Path,
    format: ImageFormat,
    op: &str,
) -> Result<()>
where
    P: image::PixelWithColorType<Subpixel = u8>,
    [P::Subpixel]: image::EncodableLayout,
{
    let file = File::create(path).map_err(|source| ImgUtilError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    buffer
        .write_to(&mut writer, format)
        .map_err(|e| ImgUtilError::encode(op, e))?;
    Ok(())
}
