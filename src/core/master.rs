// IconForge - core/master.rs
//
// Normalises any decoded RGBA buffer into the canonical master image that
// every generated asset is derived from.

use crate::core::resample;
use crate::util::constants;
use crate::util::error::DecodeError;
use image::RgbaImage;

/// The canonical 1024x1024 straight-alpha RGBA buffer for one generation run.
///
/// Only constructible through [`build_master`], so the dimension invariant
/// always holds. Immutable once built.
#[derive(Debug, Clone)]
pub struct MasterImage {
    image: RgbaImage,
}

impl MasterImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.image
    }
}

/// A quality concern about the source that does not stop generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceAdvisory {
    /// Either side is below the recommended minimum.
    TooSmall { width: u32, height: u32 },
    /// The source will be stretched to a square.
    NotSquare { width: u32, height: u32 },
}

impl std::fmt::Display for SourceAdvisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooSmall { width, height } => write!(
                f,
                "source is {width}x{height}, smaller than {min}x{min}; \
                 a square image of at least {master}x{master} is recommended",
                min = constants::ADVISORY_MIN_SOURCE_DIMENSION,
                master = constants::MASTER_DIMENSION,
            ),
            Self::NotSquare { width, height } => write!(
                f,
                "source is not square ({width}x{height}) and will be stretched"
            ),
        }
    }
}

/// Advisories for a source of the given size. Empty for a good source.
pub fn source_advisories(width: u32, height: u32) -> Vec<SourceAdvisory> {
    let mut advisories = Vec::new();
    let min = constants::ADVISORY_MIN_SOURCE_DIMENSION;
    if width < min || height < min {
        advisories.push(SourceAdvisory::TooSmall { width, height });
    }
    if width != height {
        advisories.push(SourceAdvisory::NotSquare { width, height });
    }
    advisories
}

/// Build the master image from a decoded source of any size.
///
/// The source is resampled to exactly 1024x1024 with the engine filter;
/// non-square sources are stretched, never cropped. Small or non-square
/// sources are logged as warnings but accepted.
pub fn build_master(decoded: &RgbaImage) -> Result<MasterImage, DecodeError> {
    let (width, height) = decoded.dimensions();
    if width == 0 || height == 0 || decoded.as_raw().is_empty() {
        return Err(DecodeError::EmptyBuffer { width, height });
    }

    for advisory in source_advisories(width, height) {
        tracing::warn!(width, height, "{advisory}");
    }

    let side = constants::MASTER_DIMENSION;
    let image = resample::resample(decoded, side, side).map_err(|e| {
        // Dimensions were validated above, so this only fires on a filter bug.
        tracing::error!(error = %e, "Master resample failed");
        DecodeError::EmptyBuffer { width, height }
    })?;

    tracing::debug!(
        source_width = width,
        source_height = height,
        side,
        "Master buffer built"
    );

    Ok(MasterImage { image })
}
