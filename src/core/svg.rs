// IconForge - core/svg.rs
//
// The `icon.svg` written into every platform root: the original vector
// markup when the source was an SVG, otherwise a minimal SVG wrapping the
// master PNG as a base64 data URI.

use crate::core::master::MasterImage;
use crate::core::raster;
use crate::util::error::EncodeError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Wrap PNG bytes in a minimal SVG document of the given size.
pub fn wrap_svg_raster(png_bytes: &[u8], width: u32, height: u32) -> String {
    let data = STANDARD.encode(png_bytes);
    format!(
        "<svg version=\"1.1\" width=\"{width}\" height=\"{height}\" \
         xmlns=\"http://www.w3.org/2000/svg\">\n  \
         <image href=\"data:image/png;base64,{data}\" x=\"0\" y=\"0\" \
         width=\"{width}\" height=\"{height}\" />\n</svg>"
    )
}

/// The SVG document for a run: the source file's bytes if it was a vector,
/// else the master wrapped as PNG.
///
/// Vector bytes are copied untouched, so compressed (svgz) sources stay
/// compressed.
pub fn master_svg(master: &MasterImage, vector_source: Option<&[u8]>) -> Result<Vec<u8>, EncodeError> {
    if let Some(bytes) = vector_source {
        return Ok(bytes.to_vec());
    }
    let png = raster::encode_png(master.as_rgba())?;
    Ok(wrap_svg_raster(&png, master.width(), master.height()).into_bytes())
}
