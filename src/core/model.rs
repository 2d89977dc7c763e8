// IconForge - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no platform
// dependencies. These types are the shared vocabulary across all layers.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// =============================================================================
// Platform
// =============================================================================

/// A target platform the engine can render an icon set for.
///
/// Variant order is catalog order: platforms are always generated, reported,
/// and listed in this sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Windows,
    #[serde(rename = "macos")]
    MacOs,
    Web,
    Unix,
    Android,
    Ios,
    #[serde(rename = "watchos")]
    WatchOs,
}

impl Platform {
    /// Returns all variants in catalog order.
    pub fn all() -> &'static [Platform] {
        &[
            Platform::Linux,
            Platform::Windows,
            Platform::MacOs,
            Platform::Web,
            Platform::Unix,
            Platform::Android,
            Platform::Ios,
            Platform::WatchOs,
        ]
    }

    /// Lower-case key used in flags, config files, and the CLI.
    pub fn key(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Windows => "windows",
            Platform::MacOs => "macos",
            Platform::Web => "web",
            Platform::Unix => "unix",
            Platform::Android => "android",
            Platform::Ios => "ios",
            Platform::WatchOs => "watchos",
        }
    }

    /// Name of the platform's root directory in the output tree.
    /// Fixed by downstream tooling conventions, so the case differs per platform.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Windows => "windows",
            Platform::MacOs => "macOS",
            Platform::Web => "web",
            Platform::Unix => "unix",
            Platform::Android => "android",
            Platform::Ios => "iOS",
            Platform::WatchOs => "watchOS",
        }
    }

    /// Parse a platform key case-insensitively.
    pub fn from_key(key: &str) -> Option<Platform> {
        let key = key.trim().to_lowercase();
        Platform::all().iter().copied().find(|p| p.key() == key)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

// =============================================================================
// Platform flags
// =============================================================================

/// Which platforms a generation run renders. Supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformFlags {
    pub linux: bool,
    pub windows: bool,
    pub macos: bool,
    pub web: bool,
    pub unix: bool,
    pub android: bool,
    pub ios: bool,
    pub watchos: bool,
}

impl Default for PlatformFlags {
    /// All platforms enabled.
    fn default() -> Self {
        Self::all()
    }
}

impl PlatformFlags {
    /// Every platform enabled.
    pub fn all() -> Self {
        Self {
            linux: true,
            windows: true,
            macos: true,
            web: true,
            unix: true,
            android: true,
            ios: true,
            watchos: true,
        }
    }

    /// Every platform disabled.
    pub fn none() -> Self {
        Self {
            linux: false,
            windows: false,
            macos: false,
            web: false,
            unix: false,
            android: false,
            ios: false,
            watchos: false,
        }
    }

    /// Only the listed platforms enabled.
    pub fn only(platforms: &[Platform]) -> Self {
        let mut flags = Self::none();
        for &p in platforms {
            flags.set(p, true);
        }
        flags
    }

    pub fn is_enabled(&self, platform: Platform) -> bool {
        match platform {
            Platform::Linux => self.linux,
            Platform::Windows => self.windows,
            Platform::MacOs => self.macos,
            Platform::Web => self.web,
            Platform::Unix => self.unix,
            Platform::Android => self.android,
            Platform::Ios => self.ios,
            Platform::WatchOs => self.watchos,
        }
    }

    pub fn set(&mut self, platform: Platform, enabled: bool) {
        let slot = match platform {
            Platform::Linux => &mut self.linux,
            Platform::Windows => &mut self.windows,
            Platform::MacOs => &mut self.macos,
            Platform::Web => &mut self.web,
            Platform::Unix => &mut self.unix,
            Platform::Android => &mut self.android,
            Platform::Ios => &mut self.ios,
            Platform::WatchOs => &mut self.watchos,
        };
        *slot = enabled;
    }

    /// Enabled platforms in catalog order.
    pub fn enabled(&self) -> Vec<Platform> {
        Platform::all()
            .iter()
            .copied()
            .filter(|p| self.is_enabled(*p))
            .collect()
    }
}

// =============================================================================
// Asset specification (catalog data)
// =============================================================================

/// Output encoding of a single catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetFormat {
    Png,
    Bmp,
    Webp,
    Ico,
    Icns,
    Xpm,
    /// SVG document: the original vector markup, or a wrapper around a PNG.
    Svg,
}

impl AssetFormat {
    /// Human-readable label for logs and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            AssetFormat::Png => "PNG",
            AssetFormat::Bmp => "BMP",
            AssetFormat::Webp => "WebP",
            AssetFormat::Ico => "ICO",
            AssetFormat::Icns => "ICNS",
            AssetFormat::Xpm => "XPM",
            AssetFormat::Svg => "SVG",
        }
    }

    /// True for multi-image container formats.
    pub fn is_container(&self) -> bool {
        matches!(self, AssetFormat::Ico | AssetFormat::Icns)
    }
}

/// One (name, size, format) request the orchestrator must satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSpec {
    /// Logical name (e.g. "Square44x44Logo.scale-100").
    pub name: String,

    /// Output path relative to the platform root directory.
    pub path: PathBuf,

    /// Declared width in pixels. For containers, the largest member.
    /// Zero for SVG.
    pub width: u32,

    /// Declared height in pixels. Set independently of width.
    pub height: u32,

    pub format: AssetFormat,

    /// Square member sizes of a container asset, in file order.
    /// Empty for single-image formats.
    pub members: Vec<u32>,
}

impl AssetSpec {
    /// Raster buffers this asset needs, as (width, height), in encoding order.
    pub fn required_sizes(&self) -> Vec<(u32, u32)> {
        match self.format {
            AssetFormat::Ico | AssetFormat::Icns => {
                self.members.iter().map(|&s| (s, s)).collect()
            }
            // The wrapper always embeds the master itself.
            AssetFormat::Svg => Vec::new(),
            _ => vec![(self.width, self.height)],
        }
    }
}

/// The full asset table for one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformSpec {
    pub platform: Platform,
    /// Assets in generation order.
    pub assets: Vec<AssetSpec>,
}

impl PlatformSpec {
    /// Every distinct raster size this platform needs, in first-use order.
    pub fn required_sizes(&self) -> Vec<(u32, u32)> {
        let mut sizes: Vec<(u32, u32)> = Vec::new();
        for asset in &self.assets {
            for size in asset.required_sizes() {
                if !sizes.contains(&size) {
                    sizes.push(size);
                }
            }
        }
        sizes
    }
}

// =============================================================================
// Generated output
// =============================================================================

/// One file written by a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedAsset {
    /// Path relative to the output root (e.g. "windows/store/StoreLogo.scale-100.png").
    pub path: PathBuf,

    /// Declared width; 0 when the file is not a single raster (SVG).
    pub width: u32,

    /// Declared height; 0 when the file is not a single raster (SVG).
    pub height: u32,

    /// Actual byte length on disk after the write.
    pub bytes: u64,
}
