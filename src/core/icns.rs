// IconForge - core/icns.rs
//
// Apple icon family (.icns) writer.
//
// Layout (all integers big-endian):
//   'icns'  u32 total file length
//   per image: OSType (4 bytes), u32 element length incl. 8-byte header,
//              PNG payload
//
// Only the PNG-bearing element types are written; each square size maps to
// exactly one OSType, so a family can hold each size at most once.

use crate::core::raster;
use crate::util::constants;
use crate::util::error::EncodeError;
use image::RgbaImage;

const MAGIC: &[u8; 4] = b"icns";
const HEADER_LEN: usize = 8;

/// OSType for a square side length, if ICNS has a PNG element for it.
pub fn type_code_for_size(size: u32) -> Option<[u8; 4]> {
    constants::ICNS_TYPE_CODES
        .iter()
        .find(|(s, _)| *s == size)
        .map(|(_, code)| *code)
}

/// Encode `images` into one ICNS file, in the given order.
pub fn encode_icns(images: &[RgbaImage]) -> Result<Vec<u8>, EncodeError> {
    if images.is_empty() {
        return Err(EncodeError::EmptyImageList { format: "ICNS" });
    }

    let mut seen: Vec<[u8; 4]> = Vec::with_capacity(images.len());
    let mut elements: Vec<([u8; 4], Vec<u8>)> = Vec::with_capacity(images.len());

    for image in images {
        let (width, height) = image.dimensions();
        if width != height {
            return Err(EncodeError::InvalidDimensions {
                format: "ICNS",
                width,
                height,
                reason: "ICNS images must be square",
            });
        }
        let code =
            type_code_for_size(width).ok_or(EncodeError::UnsupportedIcnsSize { size: width })?;
        if seen.contains(&code) {
            return Err(EncodeError::DuplicateIcnsSize {
                size: width,
                type_code: String::from_utf8_lossy(&code).into_owned(),
            });
        }
        seen.push(code);
        elements.push((code, raster::encode_png(image)?));
    }

    let total_len = HEADER_LEN
        + elements
            .iter()
            .map(|(_, png)| HEADER_LEN + png.len())
            .sum::<usize>();
    let total_u32 = u32::try_from(total_len).map_err(|_| EncodeError::ContainerTooLarge {
        format: "ICNS",
        bytes: total_len,
    })?;

    let mut out = Vec::with_capacity(total_len);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&total_u32.to_be_bytes());
    for (code, png) in &elements {
        out.extend_from_slice(code);
        // Each element is smaller than the total, which fits in u32.
        out.extend_from_slice(&((HEADER_LEN + png.len()) as u32).to_be_bytes());
        out.extend_from_slice(png);
    }

    debug_assert_eq!(out.len(), total_len);
    tracing::debug!(images = images.len(), bytes = out.len(), "ICNS encoded");
    Ok(out)
}
