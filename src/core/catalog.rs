// IconForge - core/catalog.rs
//
// Platform target catalog: the fixed (name, size, format) tables each
// platform must produce.
//
// The tables are TOML files embedded at compile time, one per platform. They
// are parsed into an intermediate serde shape, then validated and compiled
// into `PlatformSpec`s. A malformed table is a build defect, so loading
// errors are surfaced rather than skipped.

use crate::core::model::{AssetFormat, AssetSpec, Platform, PlatformSpec};
use crate::util::error::CatalogError;
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

// =============================================================================
// TOML shape
// =============================================================================

/// Raw catalog table as it appears in a `catalog/*.toml` file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogDefinition {
    pub platform: String,
    #[serde(default, rename = "asset")]
    pub assets: Vec<AssetDefinition>,
}

/// One `[[asset]]` entry.
///
/// Single rasters give either `size` (square) or `width` + `height`.
/// Containers give `sizes`. SVG entries give nothing.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetDefinition {
    pub path: String,
    pub format: AssetFormat,
    pub name: Option<String>,
    pub size: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub sizes: Option<Vec<u32>>,
}

// =============================================================================
// Built-in tables
// =============================================================================

/// Embedded catalog sources, keyed by platform.
pub fn builtin_catalog_sources() -> Vec<(Platform, &'static str, &'static str)> {
    vec![
        (
            Platform::Linux,
            "linux.toml",
            include_str!("../../catalog/linux.toml"),
        ),
        (
            Platform::Windows,
            "windows.toml",
            include_str!("../../catalog/windows.toml"),
        ),
        (
            Platform::MacOs,
            "macos.toml",
            include_str!("../../catalog/macos.toml"),
        ),
        (Platform::Web, "web.toml", include_str!("../../catalog/web.toml")),
        (
            Platform::Unix,
            "unix.toml",
            include_str!("../../catalog/unix.toml"),
        ),
        (
            Platform::Android,
            "android.toml",
            include_str!("../../catalog/android.toml"),
        ),
        (Platform::Ios, "ios.toml", include_str!("../../catalog/ios.toml")),
        (
            Platform::WatchOs,
            "watchos.toml",
            include_str!("../../catalog/watchos.toml"),
        ),
    ]
}

/// The asset table for one platform.
pub fn platform_spec(platform: Platform) -> Result<PlatformSpec, CatalogError> {
    let (_, file, content) = builtin_catalog_sources()
        .into_iter()
        .find(|(p, _, _)| *p == platform)
        .ok_or(CatalogError::EmptyPlatform {
            platform: platform.key(),
        })?;
    let def = parse_catalog_toml(content, file)?;
    validate_and_compile(def, platform, file)
}

/// Every platform's table, in catalog order.
pub fn all_platform_specs() -> Result<Vec<PlatformSpec>, CatalogError> {
    Platform::all().iter().map(|&p| platform_spec(p)).collect()
}

// =============================================================================
// Parsing and validation
// =============================================================================

pub fn parse_catalog_toml(
    content: &str,
    file: &'static str,
) -> Result<CatalogDefinition, CatalogError> {
    toml::from_str(content).map_err(|source| CatalogError::TomlParse { file, source })
}

/// Validate a raw table and compile it into a `PlatformSpec`.
///
/// Validates:
/// - the declared platform matches the expected one
/// - at least one asset, with unique relative paths
/// - every size is non-zero and the sizing fields fit the format
pub fn validate_and_compile(
    def: CatalogDefinition,
    platform: Platform,
    file: &'static str,
) -> Result<PlatformSpec, CatalogError> {
    if Platform::from_key(&def.platform) != Some(platform) {
        return Err(CatalogError::PlatformMismatch {
            file,
            expected: platform.key(),
            found: def.platform,
        });
    }
    if def.assets.is_empty() {
        return Err(CatalogError::EmptyPlatform {
            platform: platform.key(),
        });
    }

    let mut assets: Vec<AssetSpec> = Vec::with_capacity(def.assets.len());
    for raw in def.assets {
        let asset = compile_asset(raw, platform)?;
        if assets.iter().any(|a| a.path == asset.path) {
            return Err(invalid(
                platform,
                &asset.path.display().to_string(),
                "duplicate output path",
            ));
        }
        assets.push(asset);
    }

    tracing::debug!(
        platform = %platform,
        assets = assets.len(),
        "Loaded catalog table"
    );
    Ok(PlatformSpec { platform, assets })
}

fn compile_asset(raw: AssetDefinition, platform: Platform) -> Result<AssetSpec, CatalogError> {
    let path = PathBuf::from(&raw.path);
    if !is_plain_relative(&path) {
        return Err(invalid(
            platform,
            &raw.path,
            "path must be relative and stay inside the platform root",
        ));
    }

    let (width, height, members) = match raw.format {
        AssetFormat::Ico | AssetFormat::Icns => {
            if raw.size.is_some() || raw.width.is_some() || raw.height.is_some() {
                return Err(invalid(platform, &raw.path, "containers take 'sizes' only"));
            }
            let members = raw.sizes.unwrap_or_default();
            if members.is_empty() {
                return Err(invalid(platform, &raw.path, "container has no member sizes"));
            }
            if members.contains(&0) {
                return Err(invalid(platform, &raw.path, "member size must be non-zero"));
            }
            let largest = members.iter().copied().max().unwrap_or(0);
            (largest, largest, members)
        }
        AssetFormat::Svg => {
            if raw.size.is_some()
                || raw.width.is_some()
                || raw.height.is_some()
                || raw.sizes.is_some()
            {
                return Err(invalid(platform, &raw.path, "SVG entries take no size"));
            }
            (0, 0, Vec::new())
        }
        AssetFormat::Png | AssetFormat::Bmp | AssetFormat::Webp | AssetFormat::Xpm => {
            if raw.sizes.is_some() {
                return Err(invalid(
                    platform,
                    &raw.path,
                    "'sizes' is only valid for ICO and ICNS",
                ));
            }
            let (w, h) = match (raw.size, raw.width, raw.height) {
                (Some(s), None, None) => (s, s),
                (None, Some(w), Some(h)) => (w, h),
                _ => {
                    return Err(invalid(
                        platform,
                        &raw.path,
                        "give either 'size' or both 'width' and 'height'",
                    ))
                }
            };
            if w == 0 || h == 0 {
                return Err(invalid(platform, &raw.path, "dimensions must be non-zero"));
            }
            (w, h, Vec::new())
        }
    };

    let name = raw.name.unwrap_or_else(|| default_name(&path));
    Ok(AssetSpec {
        name,
        path,
        width,
        height,
        format: raw.format,
        members,
    })
}

/// Name derived from the path: the parent directory and file stem.
fn default_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match path.parent().and_then(|p| p.file_name()) {
        Some(parent) => format!("{}/{stem}", parent.to_string_lossy()),
        None => stem,
    }
}

fn is_plain_relative(path: &Path) -> bool {
    path.components().count() > 0
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

fn invalid(platform: Platform, path: &str, reason: &str) -> CatalogError {
    CatalogError::InvalidAsset {
        platform: platform.key(),
        path: path.to_string(),
        reason: reason.to_string(),
    }
}
