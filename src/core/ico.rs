// IconForge - core/ico.rs
//
// Multi-resolution Windows ICO writer.
//
// Layout:
//   ICONDIR        6 bytes   reserved=0, type=1, count=N          (LE)
//   ICONDIRENTRY  16 bytes x N
//                 width u8, height u8 (256 stored as 0), colours=0,
//                 reserved=0, planes=1 (u16), bit count=32 (u16),
//                 payload length (u32), absolute payload offset (u32)
//   payloads      in directory order, back to back
//
// Entries below 256px carry a classic DIB (BITMAPINFOHEADER with doubled
// height, bottom-up BGRA rows, 1-bpp AND mask). 256px entries carry an
// embedded PNG, which every reader since Vista accepts.

use crate::core::raster;
use crate::util::constants;
use crate::util::error::EncodeError;
use image::RgbaImage;

const HEADER_LEN: usize = 6;
const ENTRY_LEN: usize = 16;
const BITMAPINFOHEADER_LEN: u32 = 40;

/// Encode `images` into one ICO file, in the given order.
pub fn encode_ico(images: &[RgbaImage]) -> Result<Vec<u8>, EncodeError> {
    if images.is_empty() {
        return Err(EncodeError::EmptyImageList { format: "ICO" });
    }
    let count = u16::try_from(images.len()).map_err(|_| EncodeError::ContainerTooLarge {
        format: "ICO",
        bytes: images.len(),
    })?;

    let payloads = images
        .iter()
        .map(encode_payload)
        .collect::<Result<Vec<_>, _>>()?;

    let directory_len = HEADER_LEN + ENTRY_LEN * images.len();
    let total_len = directory_len + payloads.iter().map(Vec::len).sum::<usize>();
    if u32::try_from(total_len).is_err() {
        return Err(EncodeError::ContainerTooLarge {
            format: "ICO",
            bytes: total_len,
        });
    }

    let mut out = Vec::with_capacity(total_len);
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&count.to_le_bytes());

    let mut offset = directory_len;
    for (image, payload) in images.iter().zip(&payloads) {
        out.push(dimension_byte(image.width()));
        out.push(dimension_byte(image.height()));
        out.push(0); // colour count: not palettised
        out.push(0); // reserved
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&constants::ICO_BIT_COUNT.to_le_bytes());
        // Both fit: total_len was checked against u32 above.
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(&(offset as u32).to_le_bytes());
        offset += payload.len();
    }

    for payload in &payloads {
        out.extend_from_slice(payload);
    }

    debug_assert_eq!(out.len(), total_len);
    tracing::debug!(images = images.len(), bytes = out.len(), "ICO encoded");
    Ok(out)
}

/// Directory byte for a side length: 1..=255 verbatim, 256 as 0.
fn dimension_byte(side: u32) -> u8 {
    if side >= constants::ICO_MAX_DIMENSION {
        0
    } else {
        side as u8
    }
}

fn encode_payload(image: &RgbaImage) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions {
            format: "ICO",
            width,
            height,
            reason: "image is empty",
        });
    }
    if width > constants::ICO_MAX_DIMENSION || height > constants::ICO_MAX_DIMENSION {
        return Err(EncodeError::InvalidDimensions {
            format: "ICO",
            width,
            height,
            reason: "ICO entries are limited to 256x256",
        });
    }

    if width >= constants::ICO_PNG_THRESHOLD || height >= constants::ICO_PNG_THRESHOLD {
        raster::encode_png(image)
    } else {
        Ok(encode_dib(image))
    }
}

/// Classic 32-bit icon bitmap: header, XOR (colour) rows, AND mask rows.
fn encode_dib(image: &RgbaImage) -> Vec<u8> {
    let (width, height) = image.dimensions();
    let xor_len = width * height * 4;
    let mask_stride = mask_row_stride(width);
    let mask_len = mask_stride * height;

    let mut out = Vec::with_capacity((BITMAPINFOHEADER_LEN + xor_len + mask_len) as usize);
    out.extend_from_slice(&BITMAPINFOHEADER_LEN.to_le_bytes());
    out.extend_from_slice(&(width as i32).to_le_bytes());
    // Height covers XOR + AND planes.
    out.extend_from_slice(&((height * 2) as i32).to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&constants::ICO_BIT_COUNT.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // BI_RGB
    out.extend_from_slice(&(xor_len + mask_len).to_le_bytes());
    out.extend_from_slice(&0i32.to_le_bytes());
    out.extend_from_slice(&0i32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());

    for y in (0..height).rev() {
        for x in 0..width {
            let [r, g, b, a] = image.get_pixel(x, y).0;
            out.extend_from_slice(&[b, g, r, a]);
        }
    }

    // Mask bit set = transparent for readers that ignore the alpha channel.
    for y in (0..height).rev() {
        let mut row = vec![0u8; mask_stride as usize];
        for x in 0..width {
            if image.get_pixel(x, y).0[3] == 0 {
                row[(x / 8) as usize] |= 0x80 >> (x % 8);
            }
        }
        out.extend_from_slice(&row);
    }

    out
}

/// AND mask rows are 1 bpp padded to a 32-bit boundary.
fn mask_row_stride(width: u32) -> u32 {
    width.div_ceil(32) * 4
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    /// (width, height, bit count, payload length, offset) per directory entry.
    fn read_directory(bytes: &[u8]) -> Vec<(u32, u32, u16, u32, u32)> {
        let le16 = |i: usize| u16::from_le_bytes([bytes[i], bytes[i + 1]]);
        let le32 = |i: usize| u32::from_le_bytes(bytes[i..i + 4].try_into().unwrap());
        assert_eq!(le16(0), 0);
        assert_eq!(le16(2), 1);
        let count = le16(4) as usize;
        (0..count)
            .map(|n| {
                let base = HEADER_LEN + n * ENTRY_LEN;
                let side = |b: u8| if b == 0 { 256 } else { b as u32 };
                assert_eq!(le16(base + 4), 1, "planes");
                (
                    side(bytes[base]),
                    side(bytes[base + 1]),
                    le16(base + 6),
                    le32(base + 8),
                    le32(base + 12),
                )
            })
            .collect()
    }

    fn square(side: u32) -> RgbaImage {
        RgbaImage::from_fn(side, side, |x, y| {
            let a = if (x + y) % 5 == 0 { 0 } else { 255 };
            Rgba([x as u8, y as u8, 128, a])
        })
    }

    #[test]
    fn test_directory_matches_requested_images() {
        let sizes = [16u32, 24, 32, 48, 64, 128, 256];
        let images: Vec<_> = sizes.iter().map(|&s| square(s)).collect();
        let bytes = encode_ico(&images).unwrap();
        let dir = read_directory(&bytes);

        assert_eq!(dir.len(), sizes.len());
        let mut expected_offset = (HEADER_LEN + ENTRY_LEN * sizes.len()) as u32;
        for (&side, &(w, h, bits, len, offset)) in sizes.iter().zip(&dir) {
            assert_eq!((w, h), (side, side));
            assert_eq!(bits, 32);
            assert_eq!(offset, expected_offset, "payloads are contiguous and in order");
            expected_offset += len;
        }
        assert_eq!(expected_offset as usize, bytes.len());
    }

    #[test]
    fn test_dib_payload_layout() {
        let img = square(16);
        let bytes = encode_ico(&[img.clone()]).unwrap();
        let (_, _, _, len, offset) = read_directory(&bytes)[0];
        let payload = &bytes[offset as usize..(offset + len) as usize];

        assert_eq!(u32::from_le_bytes(payload[0..4].try_into().unwrap()), 40);
        assert_eq!(i32::from_le_bytes(payload[8..12].try_into().unwrap()), 32);
        // 40 header + 16*16*4 colour + 16 rows * 4 bytes mask
        assert_eq!(len, 40 + 1024 + 64);

        // First stored row is the bottom image row, in BGRA.
        let [r, g, b, a] = img.get_pixel(0, 15).0;
        assert_eq!(&payload[40..44], &[b, g, r, a]);
    }

    #[test]
    fn test_256_entry_is_png() {
        let bytes = encode_ico(&[square(256)]).unwrap();
        let (w, h, _, _, offset) = read_directory(&bytes)[0];
        assert_eq!((w, h), (256, 256));
        assert_eq!(&bytes[HEADER_LEN..HEADER_LEN + 2], &[0, 0], "256 stored as 0");
        assert_eq!(&bytes[offset as usize..offset as usize + 4], b"\x89PNG");
    }

    #[test]
    fn test_empty_list_rejected() {
        assert!(matches!(
            encode_ico(&[]),
            Err(EncodeError::EmptyImageList { .. })
        ));
    }

    #[test]
    fn test_oversized_image_rejected() {
        let big = RgbaImage::new(257, 16);
        assert!(matches!(
            encode_ico(&[big]),
            Err(EncodeError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_mask_row_stride_pads_to_dword() {
        assert_eq!(mask_row_stride(16), 4);
        assert_eq!(mask_row_stride(32), 4);
        assert_eq!(mask_row_stride(33), 8);
        assert_eq!(mask_row_stride(24), 4);
    }
}
