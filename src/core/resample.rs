// IconForge - core/resample.rs
//
// Lanczos3 resampling of RGBA buffers plus a per-run memo so that each
// (width, height) target is filtered exactly once, however many platforms
// ask for it.
//
// Filtering is separable (horizontal pass, then vertical) and runs on
// straight (un-premultiplied) RGBA: alpha is filtered exactly like the colour
// channels. Output is deterministic; parallel preparation only distributes
// whole targets across workers and never splits one image.

use crate::core::master::MasterImage;
use crate::util::error::EncodeError;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use rayon::prelude::*;
use std::collections::HashMap;

/// Windowed-sinc filter used for every resize in the engine.
pub const FILTER: FilterType = FilterType::Lanczos3;

/// Resample `source` to exactly `width` x `height`.
///
/// Aspect ratio is not preserved: non-square targets stretch. Resampling to
/// the source's own size returns an exact copy.
pub fn resample(source: &RgbaImage, width: u32, height: u32) -> Result<RgbaImage, EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions {
            format: "resample",
            width,
            height,
            reason: "target dimensions must be at least 1x1",
        });
    }
    if source.width() == 0 || source.height() == 0 {
        return Err(EncodeError::InvalidDimensions {
            format: "resample",
            width: source.width(),
            height: source.height(),
            reason: "source buffer is empty",
        });
    }

    if source.dimensions() == (width, height) {
        return Ok(source.clone());
    }

    Ok(imageops::resize(source, width, height, FILTER))
}

// =============================================================================
// Per-run memo
// =============================================================================

/// Memoised resampling of one master image, keyed by target size.
///
/// Lives for a single generation run and borrows the immutable master.
pub struct ResampleCache<'a> {
    master: &'a MasterImage,
    images: HashMap<(u32, u32), RgbaImage>,
    /// Number of filter passes actually performed.
    resampled: usize,
}

impl<'a> ResampleCache<'a> {
    pub fn new(master: &'a MasterImage) -> Self {
        Self {
            master,
            images: HashMap::new(),
            resampled: 0,
        }
    }

    /// Number of distinct targets that have been filtered so far.
    pub fn resample_count(&self) -> usize {
        self.resampled
    }

    /// True if `(width, height)` has already been computed.
    pub fn contains(&self, width: u32, height: u32) -> bool {
        self.images.contains_key(&(width, height))
    }

    /// An already-computed buffer, without filtering.
    pub fn image(&self, width: u32, height: u32) -> Option<&RgbaImage> {
        self.images.get(&(width, height))
    }

    /// Return the buffer for `(width, height)`, filtering it on first use.
    pub fn get(&mut self, width: u32, height: u32) -> Result<&RgbaImage, EncodeError> {
        let key = (width, height);
        if !self.images.contains_key(&key) {
            let image = resample(self.master.as_rgba(), width, height)?;
            self.resampled += 1;
            self.images.insert(key, image);
        }
        Ok(&self.images[&key])
    }

    /// Compute every missing size in `sizes`, fanning out across `pool` when
    /// one is given. All results are joined before this returns, so callers
    /// always see a complete set.
    pub fn prepare(
        &mut self,
        sizes: &[(u32, u32)],
        pool: Option<&rayon::ThreadPool>,
    ) -> Result<(), EncodeError> {
        let mut missing: Vec<(u32, u32)> = Vec::new();
        for &size in sizes {
            if !self.images.contains_key(&size) && !missing.contains(&size) {
                missing.push(size);
            }
        }
        if missing.is_empty() {
            return Ok(());
        }

        let master: &'a MasterImage = self.master;
        let master = master.as_rgba();
        let compute = |&(w, h): &(u32, u32)| resample(master, w, h).map(|img| ((w, h), img));

        let results: Vec<((u32, u32), RgbaImage)> = match pool {
            Some(pool) => pool.install(|| {
                missing
                    .par_iter()
                    .map(compute)
                    .collect::<Result<Vec<_>, EncodeError>>()
            })?,
            None => missing
                .iter()
                .map(compute)
                .collect::<Result<Vec<_>, EncodeError>>()?,
        };

        tracing::debug!(
            count = results.len(),
            parallel = pool.is_some(),
            "Resampled batch"
        );

        self.resampled += results.len();
        self.images.extend(results);
        Ok(())
    }
}
