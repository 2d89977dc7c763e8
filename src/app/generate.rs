// IconForge - app/generate.rs
//
// Generation orchestrator. Drives the catalog, the per-run resample memo, the
// encoders, file writes, and manifest building.
//
// Error policy:
//   - A platform whose assets fail to encode is recorded in the report and
//     skipped; the remaining platforms still complete.
//   - Every asset of a platform is encoded before any of its files are
//     written, so a failed platform never leaves a partial container behind.
//   - Filesystem failures and catalog defects abort the run.

use crate::core::catalog;
use crate::core::icns;
use crate::core::ico;
use crate::core::manifest::Manifest;
use crate::core::master::MasterImage;
use crate::core::model::{AssetFormat, AssetSpec, GeneratedAsset, PlatformFlags, PlatformSpec};
use crate::core::raster;
use crate::core::resample::ResampleCache;
use crate::core::svg;
use crate::core::xpm;
use crate::platform::fs;
use crate::util::constants;
use crate::util::error::{EncodeError, IconForgeError, PlatformGenerationError};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Tunables for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Resampling worker threads. 0 = available cores, 1 = serial.
    pub worker_threads: usize,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            worker_threads: constants::DEFAULT_WORKER_THREADS,
        }
    }
}

/// What a run produced.
#[derive(Debug)]
pub struct GenerationReport {
    pub manifest: Manifest,

    /// Platforms that failed to encode, in catalog order.
    pub failures: Vec<PlatformGenerationError>,
}

impl GenerationReport {
    /// True when every requested platform was written.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// `<stem>_icons` next to the source file.
pub fn default_output_dir(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "icon".to_string());
    let name = format!("{stem}{}", constants::DEFAULT_OUTPUT_SUFFIX);
    match source.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

/// Generate every enabled platform's icon set under `output_dir`.
///
/// `vector_source` holds the SVG file's bytes when the source was a vector
/// file; they are written verbatim as each platform's `icon.svg`. Otherwise
/// the master is wrapped as an embedded PNG.
pub fn generate(
    master: &MasterImage,
    vector_source: Option<&[u8]>,
    output_dir: &Path,
    flags: &PlatformFlags,
    options: &GenerateOptions,
) -> Result<GenerationReport, IconForgeError> {
    let specs = flags
        .enabled()
        .into_iter()
        .map(catalog::platform_spec)
        .collect::<Result<Vec<_>, _>>()?;
    generate_specs(master, vector_source, output_dir, &specs, options)
}

/// Generate the given platform tables, in order.
pub fn generate_specs(
    master: &MasterImage,
    vector_source: Option<&[u8]>,
    output_dir: &Path,
    specs: &[PlatformSpec],
    options: &GenerateOptions,
) -> Result<GenerationReport, IconForgeError> {
    let started = Instant::now();
    fs::ensure_dir(output_dir)?;

    // The shared icon.svg does not depend on the platform, so a failure here
    // is not attributable to one and aborts the run.
    let svg_document = svg::master_svg(master, vector_source)?;

    let pool = build_pool(options.worker_threads);
    let mut cache = ResampleCache::new(master);
    let mut manifest = Manifest::new(output_dir.to_path_buf());
    let mut failures = Vec::new();

    tracing::info!(
        output = %output_dir.display(),
        platforms = specs.len(),
        vector = vector_source.is_some(),
        "Generation started"
    );

    for spec in specs {
        let dir_name = spec.platform.dir_name();
        let root = output_dir.join(dir_name);
        fs::ensure_dir(&root)?;

        let encoded = match encode_platform(spec, &mut cache, pool.as_ref(), &svg_document) {
            Ok(encoded) => encoded,
            Err(failure) => {
                tracing::warn!(
                    platform = failure.platform,
                    asset = %failure.asset.display(),
                    error = %failure.source,
                    "Platform failed; continuing with the rest"
                );
                failures.push(failure);
                continue;
            }
        };

        for asset in encoded {
            let bytes = fs::write_file(&root.join(&asset.path), &asset.bytes)?;
            manifest.insert(GeneratedAsset {
                path: Path::new(dir_name).join(&asset.path),
                width: asset.width,
                height: asset.height,
                bytes,
            });
        }

        tracing::info!(
            platform = %spec.platform,
            dir = dir_name,
            "Platform icon set written"
        );
    }

    tracing::info!(
        files = manifest.file_count(),
        bytes = manifest.total_bytes(),
        resampled = cache.resample_count(),
        failures = failures.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Generation finished"
    );

    Ok(GenerationReport { manifest, failures })
}

// =============================================================================
// Encoding
// =============================================================================

/// One encoded file, not yet written.
struct EncodedAsset {
    /// Relative to the platform root.
    path: PathBuf,
    width: u32,
    height: u32,
    bytes: Vec<u8>,
}

fn build_pool(worker_threads: usize) -> Option<rayon::ThreadPool> {
    if worker_threads == 1 {
        return None;
    }
    match rayon::ThreadPoolBuilder::new()
        .num_threads(worker_threads)
        .thread_name(|i| format!("resample-{i}"))
        .build()
    {
        Ok(pool) => {
            tracing::debug!(threads = pool.current_num_threads(), "Resample pool ready");
            Some(pool)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Could not start resample pool; resampling serially");
            None
        }
    }
}

/// Encode every asset of one platform, plus the root `icon.svg`.
fn encode_platform(
    spec: &PlatformSpec,
    cache: &mut ResampleCache<'_>,
    pool: Option<&rayon::ThreadPool>,
    svg_document: &[u8],
) -> Result<Vec<EncodedAsset>, PlatformGenerationError> {
    let platform = spec.platform.key();
    let fail = |asset: &Path, source: EncodeError| PlatformGenerationError {
        platform,
        asset: Path::new(spec.platform.dir_name()).join(asset),
        source,
    };

    cache
        .prepare(&spec.required_sizes(), pool)
        .map_err(|e| fail(Path::new(""), e))?;

    let mut out = Vec::with_capacity(spec.assets.len() + 1);
    for asset in &spec.assets {
        let bytes = encode_asset(asset, cache, svg_document).map_err(|e| fail(&asset.path, e))?;
        tracing::debug!(
            platform,
            asset = %asset.path.display(),
            format = asset.format.label(),
            bytes = bytes.len(),
            "Encoded asset"
        );
        out.push(EncodedAsset {
            path: asset.path.clone(),
            width: asset.width,
            height: asset.height,
            bytes,
        });
    }

    let svg_path = PathBuf::from(constants::SVG_FILE_NAME);
    if !out.iter().any(|a| a.path == svg_path) {
        out.push(EncodedAsset {
            path: svg_path,
            width: 0,
            height: 0,
            bytes: svg_document.to_vec(),
        });
    }
    Ok(out)
}

fn encode_asset(
    asset: &AssetSpec,
    cache: &ResampleCache<'_>,
    svg_document: &[u8],
) -> Result<Vec<u8>, EncodeError> {
    match asset.format {
        AssetFormat::Png | AssetFormat::Bmp | AssetFormat::Webp => {
            let image = prepared(cache, asset.format, asset.width, asset.height)?;
            raster::encode_single(image, asset.format)
        }
        AssetFormat::Xpm => {
            let image = prepared(cache, asset.format, asset.width, asset.height)?;
            xpm::encode_xpm(image).map(String::into_bytes)
        }
        AssetFormat::Ico => ico::encode_ico(&members(asset, cache)?),
        AssetFormat::Icns => icns::encode_icns(&members(asset, cache)?),
        AssetFormat::Svg => Ok(svg_document.to_vec()),
    }
}

fn members(asset: &AssetSpec, cache: &ResampleCache<'_>) -> Result<Vec<RgbaImage>, EncodeError> {
    asset
        .members
        .iter()
        .map(|&side| prepared(cache, asset.format, side, side).cloned())
        .collect()
}

fn prepared<'c>(
    cache: &'c ResampleCache<'_>,
    format: AssetFormat,
    width: u32,
    height: u32,
) -> Result<&'c RgbaImage, EncodeError> {
    cache
        .image(width, height)
        .ok_or(EncodeError::InvalidDimensions {
            format: format.label(),
            width,
            height,
            reason: "size was not prepared for this platform",
        })
}
