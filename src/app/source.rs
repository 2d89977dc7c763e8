// IconForge - app/source.rs
//
// Source file loading: raster formats through the `image` crate, SVG through
// usvg + resvg. Vector sources keep their file bytes (plain or gzip-compressed)
// so they can be written out unchanged as each platform's icon.svg.

use crate::core::master::{source_advisories, SourceAdvisory};
use crate::util::constants;
use crate::util::error::DecodeError;
use image::RgbaImage;
use resvg::{tiny_skia, usvg};
use std::path::{Path, PathBuf};

/// A decoded source ready for the master builder.
#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub path: PathBuf,

    /// Decoded pixels, non-premultiplied RGBA.
    pub rgba: RgbaImage,

    /// The SVG file's bytes, exactly as read, when the source was a vector.
    pub vector_source: Option<Vec<u8>>,

    /// Quality advisories. Always empty for vector sources, which scale freely.
    pub advisories: Vec<SourceAdvisory>,
}

impl LoadedSource {
    pub fn is_vector(&self) -> bool {
        self.vector_source.is_some()
    }
}

/// True when the path has an `.svg` extension (any case).
pub fn is_svg_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"))
}

/// Load and decode a source file.
pub fn load_source(path: &Path) -> Result<LoadedSource, DecodeError> {
    if !path.exists() {
        return Err(DecodeError::NotFound {
            path: path.to_path_buf(),
        });
    }

    if is_svg_path(path) {
        let data = std::fs::read(path).map_err(|source| DecodeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = render_svg(&data, path, constants::MASTER_DIMENSION)?;
        tracing::info!(
            path = %path.display(),
            size = constants::MASTER_DIMENSION,
            "Rendered SVG source"
        );
        return Ok(LoadedSource {
            path: path.to_path_buf(),
            rgba,
            vector_source: Some(data),
            advisories: Vec::new(),
        });
    }

    let decoded = image::open(path).map_err(|source| DecodeError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = decoded.into_rgba8();
    let advisories = source_advisories(rgba.width(), rgba.height());
    tracing::info!(
        path = %path.display(),
        width = rgba.width(),
        height = rgba.height(),
        "Decoded raster source"
    );
    Ok(LoadedSource {
        path: path.to_path_buf(),
        rgba,
        vector_source: None,
        advisories,
    })
}

/// Render SVG bytes into a `side` x `side` RGBA buffer, stretching to fill.
pub fn render_svg(data: &[u8], path: &Path, side: u32) -> Result<RgbaImage, DecodeError> {
    let mut opt = usvg::Options::default();
    // Relative hrefs (linked images) resolve against the SVG's own directory.
    opt.resources_dir = std::fs::canonicalize(path)
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf));

    let tree = usvg::Tree::from_data(data, &opt).map_err(|source| DecodeError::Svg {
        path: path.to_path_buf(),
        source,
    })?;

    let size = tree.size();
    if size.width() <= 0.0 || size.height() <= 0.0 {
        return Err(DecodeError::SvgRender {
            path: path.to_path_buf(),
            reason: format!("degenerate size {}x{}", size.width(), size.height()),
        });
    }

    let mut pixmap = tiny_skia::Pixmap::new(side, side).ok_or_else(|| DecodeError::SvgRender {
        path: path.to_path_buf(),
        reason: format!("cannot allocate {side}x{side} pixmap"),
    })?;
    let transform = tiny_skia::Transform::from_scale(
        side as f32 / size.width(),
        side as f32 / size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    // tiny-skia stores premultiplied alpha; the rest of the pipeline does not.
    let mut raw = Vec::with_capacity((side * side * 4) as usize);
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        raw.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    RgbaImage::from_raw(side, side, raw).ok_or_else(|| DecodeError::SvgRender {
        path: path.to_path_buf(),
        reason: "pixmap size does not match buffer".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const HALF_RED_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10">
  <rect x="0" y="0" width="10" height="10" fill="#ff0000"/>
</svg>
"##;

    /// Reflected CRC-32 (IEEE), as carried in the gzip trailer.
    fn crc32(data: &[u8]) -> u32 {
        let mut crc = !0u32;
        for &byte in data {
            crc ^= byte as u32;
            for _ in 0..8 {
                crc = if crc & 1 != 0 { (crc >> 1) ^ 0xEDB8_8320 } else { crc >> 1 };
            }
        }
        !crc
    }

    /// Minimal gzip member holding `data` in one stored deflate block.
    fn gzip_stored(data: &[u8]) -> Vec<u8> {
        let len = data.len() as u16;
        let mut out = vec![0x1f, 0x8b, 0x08, 0, 0, 0, 0, 0, 0, 0xff];
        out.push(0x01); // final block, stored
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&(!len).to_le_bytes());
        out.extend_from_slice(data);
        out.extend_from_slice(&crc32(data).to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_source(&dir.path().join("nope.png")).unwrap_err();
        assert!(matches!(err, DecodeError::NotFound { .. }));
    }

    #[test]
    fn test_raster_source_reports_advisories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.png");
        RgbaImage::from_pixel(100, 50, Rgba([1, 2, 3, 255]))
            .save(&path)
            .unwrap();
        let loaded = load_source(&path).unwrap();
        assert_eq!(loaded.rgba.dimensions(), (100, 50));
        assert!(!loaded.is_vector());
        assert!(loaded.advisories.contains(&SourceAdvisory::TooSmall {
            width: 100,
            height: 50
        }));
    }

    #[test]
    fn test_svg_source_rendered_and_markup_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.SVG");
        std::fs::write(&path, HALF_RED_SVG).unwrap();
        let loaded = load_source(&path).unwrap();

        assert_eq!(loaded.vector_source.as_deref(), Some(HALF_RED_SVG.as_bytes()));
        assert!(loaded.advisories.is_empty());
        assert_eq!(loaded.rgba.dimensions(), (1024, 1024));
        // Left half red and opaque, right half fully transparent.
        assert_eq!(loaded.rgba.get_pixel(100, 512).0, [255, 0, 0, 255]);
        assert_eq!(loaded.rgba.get_pixel(900, 512).0[3], 0);
    }

    #[test]
    fn test_compressed_svg_bytes_kept_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.svg");
        let svgz = gzip_stored(HALF_RED_SVG.as_bytes());
        assert!(std::str::from_utf8(&svgz).is_err());
        std::fs::write(&path, &svgz).unwrap();

        let loaded = load_source(&path).unwrap();
        assert_eq!(loaded.vector_source.as_deref(), Some(svgz.as_slice()));
        assert_eq!(loaded.rgba.get_pixel(100, 512).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_garbage_inputs_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let svg = dir.path().join("bad.svg");
        std::fs::write(&svg, "not xml at all").unwrap();
        assert!(matches!(
            load_source(&svg),
            Err(DecodeError::Svg { .. })
        ));
        let png = dir.path().join("bad.png");
        std::fs::write(&png, b"definitely not a png").unwrap();
        assert!(matches!(
            load_source(&png),
            Err(DecodeError::Image { .. })
        ));
    }
}
