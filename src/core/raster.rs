// IconForge - core/raster.rs
//
// Single-image encoders (PNG, BMP, WebP). These are standard formats with
// mature codecs, so they delegate to the `image` crate; only the container
// formats are assembled by hand.

use crate::core::model::AssetFormat;
use crate::util::error::EncodeError;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

/// Encode `image` as a PNG byte stream (8-bit RGBA).
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, EncodeError> {
    write_with(image, ImageFormat::Png, "PNG")
}

/// Encode `image` as a 32-bit BMP byte stream.
pub fn encode_bmp(image: &RgbaImage) -> Result<Vec<u8>, EncodeError> {
    write_with(image, ImageFormat::Bmp, "BMP")
}

/// Encode `image` as a lossless WebP byte stream.
pub fn encode_webp(image: &RgbaImage) -> Result<Vec<u8>, EncodeError> {
    write_with(image, ImageFormat::WebP, "WebP")
}

/// Encode a single raster in one of the simple formats.
pub fn encode_single(image: &RgbaImage, format: AssetFormat) -> Result<Vec<u8>, EncodeError> {
    match format {
        AssetFormat::Png => encode_png(image),
        AssetFormat::Bmp => encode_bmp(image),
        AssetFormat::Webp => encode_webp(image),
        other => Err(EncodeError::InvalidDimensions {
            format: other.label(),
            width: image.width(),
            height: image.height(),
            reason: "not a single-image raster format",
        }),
    }
}

fn write_with(
    image: &RgbaImage,
    format: ImageFormat,
    label: &'static str,
) -> Result<Vec<u8>, EncodeError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(EncodeError::InvalidDimensions {
            format: label,
            width: image.width(),
            height: image.height(),
            reason: "image is empty",
        });
    }
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, format)
        .map_err(|source| EncodeError::Raster {
            format: label,
            source,
        })?;
    Ok(buf.into_inner())
}
