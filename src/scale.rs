//! JPEG resizing, in memory and file to file.

use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};
use tracing::{debug, instrument};

use crate::error::{ImgUtilError, Result};

/// JPEG quality used when re-encoding scaled images.
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Interpolation kernel for scaling. `Triangle` is bilinear.
const SCALE_FILTER: FilterType = FilterType::Triangle;

/// Decode a JPEG held in memory, scale it to exactly `width` x `height` and
/// re-encode it as JPEG.
#[instrument(skip(input), fields(data_len = input.len()))]
pub fn scale_jpeg_buffer(input: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let src = decode_jpeg(Cursor::new(input), "scale_jpeg_buffer")?;
    let dst = scale_to(&src, width, height, "scale_jpeg_buffer")?;

    let mut out = Vec::new();
    encode_jpeg(dst, &mut out, "scale_jpeg_buffer")?;
    debug!(out_len = out.len(), "JPEG buffer scaled");
    Ok(out)
}

/// File variant of [`scale_jpeg_buffer`].
///
/// The input is opened before the output is created, so a missing input never
/// truncates an existing output file.
#[instrument(
    skip(input_path, output_path),
    fields(input = %input_path.as_ref().display(), output = %output_path.as_ref().display())
)]
pub fn scale_jpeg_file(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    width: u32,
    height: u32,
) -> Result<()> {
    let input_path = input_path.as_ref();
    let output_path = output_path.as_ref();

    let input = File::open(input_path).map_err(|source| ImgUtilError::Open {
        path: input_path.to_path_buf(),
        source,
    })?;
    let output = File::create(output_path).map_err(|source| ImgUtilError::Create {
        path: output_path.to_path_buf(),
        source,
    })?;

    let src = decode_jpeg(input, "scale_jpeg_file")?;
    let dst = scale_to(&src, width, height, "scale_jpeg_file")?;

    let mut writer = BufWriter::new(output);
    encode_jpeg(dst, &mut writer, "scale_jpeg_file")?;
    writer
        .flush()
        .map_err(|e| ImgUtilError::encode("scale_jpeg_file", e))?;
    debug!("JPEG file scaled");
    Ok(())
}

fn decode_jpeg<R: Read + Seek>(reader: R, op: &str) -> Result<DynamicImage> {
    ImageReader::with_format(BufReader::new(reader), ImageFormat::Jpeg)
        .decode()
        .map_err(|e| ImgUtilError::decode(op, e))
}

/// Scale the full source onto a blank RGBA canvas of the target size. The
/// canvas starts transparent, so the scaled pixels simply replace it.
fn scale_to(src: &DynamicImage, width: u32, height: u32, op: &str) -> Result<RgbaImage> {
    if width == 0 || height == 0 {
        return Err(ImgUtilError::Encode(format!(
            "{op}: cannot encode a {width}x{height} image"
        )));
    }
    Ok(imageops::resize(&src.to_rgba8(), width, height, SCALE_FILTER))
}

fn encode_jpeg<W: Write>(img: RgbaImage, writer: &mut W, op: &str) -> Result<()> {
    // JPEG has no alpha channel.
    let rgb = DynamicImage::ImageRgba8(img).to_rgb8();
    let encoder = JpegEncoder::new_with_quality(writer, DEFAULT_JPEG_QUALITY);
    rgb.write_with_encoder(encoder)
        .map_err(|e| ImgUtilError::encode(op, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};
    use rand::{RngCore, SeedableRng};

    fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 4 % 256) as u8, (y * 4 % 256) as u8, 128])
        });
        let mut buf = Vec::new();
        img.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, 90))
            .unwrap();
        buf
    }

    fn decoded_dimensions(bytes: &[u8]) -> (u32, u32) {
        image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)
            .unwrap()
            .dimensions()
    }

    #[test]
    fn test_scale_to_requested_size() {
        let out = scale_jpeg_buffer(&sample_jpeg(64, 48), 100, 50).unwrap();
        assert_eq!(decoded_dimensions(&out), (100, 50));
    }

    #[test]
    fn test_scale_to_same_size_keeps_dimensions() {
        let out = scale_jpeg_buffer(&sample_jpeg(40, 30), 40, 30).unwrap();
        assert_eq!(decoded_dimensions(&out), (40, 30));
    }

    #[test]
    fn test_scale_preserves_flat_color() {
        let img = RgbImage::from_pixel(20, 20, Rgb([200, 200, 200]));
        let mut jpeg = Vec::new();
        img.write_with_encoder(JpegEncoder::new_with_quality(&mut jpeg, 95))
            .unwrap();

        let out = scale_jpeg_buffer(&jpeg, 7, 5).unwrap();
        let decoded = image::load_from_memory(&out).unwrap().to_rgb8();
        for p in decoded.pixels() {
            for c in p.0 {
                assert!((c as i32 - 200).abs() <= 4, "channel drifted to {c}");
            }
        }
    }

    #[test]
    fn test_empty_input_is_decode_error() {
        let result = scale_jpeg_buffer(&[], 10, 10);
        assert!(matches!(result, Err(ImgUtilError::Decode(_))));
    }

    #[test]
    fn test_garbage_input_is_decode_error() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let mut garbage = vec![0u8; 512];
        rng.fill_bytes(&mut garbage);
        garbage[0] = 0;

        let result = scale_jpeg_buffer(&garbage, 10, 10);
        assert!(matches!(result, Err(ImgUtilError::Decode(_))));
    }

    #[test]
    fn test_png_input_is_decode_error() {
        let mut png = Vec::new();
        RgbImage::new(4, 4)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();
        let result = scale_jpeg_buffer(&png, 10, 10);
        assert!(matches!(result, Err(ImgUtilError::Decode(_))));
    }

    #[test]
    fn test_zero_dimensions_is_encode_error() {
        let result = scale_jpeg_buffer(&sample_jpeg(8, 8), 0, 10);
        assert!(matches!(result, Err(ImgUtilError::Encode(_))));
    }

    #[test]
    fn test_scale_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.jpg");
        let output = dir.path().join("out.jpg");
        std::fs::write(&input, sample_jpeg(32, 32)).unwrap();

        scale_jpeg_file(&input, &output, 16, 8).unwrap();

        let bytes = std::fs::read(&output).unwrap();
        assert_eq!(decoded_dimensions(&bytes), (16, 8));
    }

    #[test]
    fn test_scale_file_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("missing.jpg");
        let output = dir.path().join("out.jpg");

        let err = scale_jpeg_file(&input, &output, 16, 8).unwrap_err();
        assert_eq!(
            err,
            ImgUtilError::Open {
                path: input,
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }
        );
        assert!(!output.exists());
    }

    #[test]
    fn test_scale_file_uncreatable_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.jpg");
        let output = dir.path().join("no_such_dir").join("out.jpg");
        std::fs::write(&input, sample_jpeg(8, 8)).unwrap();

        let err = scale_jpeg_file(&input, &output, 4, 4).unwrap_err();
        assert!(matches!(err, ImgUtilError::Create { .. }));
    }

    #[test]
    fn test_scale_file_corrupt_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.jpg");
        let output = dir.path().join("out.jpg");
        std::fs::write(&input, b"not a jpeg").unwrap();

        let err = scale_jpeg_file(&input, &output, 4, 4).unwrap_err();
        assert!(matches!(err, ImgUtilError::Decode(_)));
    }
}
