//! Small image-manipulation helpers: load, overlay text, measure brightness,
//! resize JPEGs and mask by HSV color range.

pub mod error;
pub mod image_handler;
pub mod mask;
pub mod overlay;
pub mod scale;
pub mod utils;

pub use error::{ImgUtilError, Result};
pub use image_handler::Image;
pub use mask::{HsvRange, in_range};
pub use overlay::TextStyle;
pub use scale::{scale_jpeg_buffer, scale_jpeg_file};
