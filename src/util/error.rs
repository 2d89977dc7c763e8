// IconForge - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation; every error keeps its causal chain
// for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all IconForge operations.
/// Errors are categorised by the subsystem that produced them.
///
/// Per-platform encode failures are deliberately absent: they are collected
/// as [`PlatformGenerationError`]s in the generation report instead of
/// aborting the run.
#[derive(Debug)]
pub enum IconForgeError {
    /// The source image could not be decoded or was empty.
    Decode(DecodeError),

    /// An encoder rejected its input outside of a per-platform context.
    Encode(EncodeError),

    /// The embedded platform catalog failed to load.
    Catalog(CatalogError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// The manifest could not be serialised.
    Manifest {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// I/O error with path context. Always fatal to the run.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for IconForgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(e) => write!(f, "Decode error: {e}"),
            Self::Encode(e) => write!(f, "Encode error: {e}"),
            Self::Catalog(e) => write!(f, "Catalog error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Manifest { path, source } => write!(
                f,
                "Cannot serialise manifest for '{}': {source}",
                path.display()
            ),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for IconForgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode(e) => Some(e),
            Self::Encode(e) => Some(e),
            Self::Catalog(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Manifest { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Decode errors
// ---------------------------------------------------------------------------

/// Errors producing a usable RGBA buffer from a source.
#[derive(Debug)]
pub enum DecodeError {
    /// The decoded buffer has no pixels.
    EmptyBuffer { width: u32, height: u32 },

    /// The source file does not exist.
    NotFound { path: PathBuf },

    /// The source file could not be read.
    Io { path: PathBuf, source: io::Error },

    /// The raster decoder rejected the file.
    Image {
        path: PathBuf,
        source: image::ImageError,
    },

    /// The SVG source could not be parsed.
    Svg {
        path: PathBuf,
        source: resvg::usvg::Error,
    },

    /// The SVG has a degenerate size or the render target could not be allocated.
    SvgRender { path: PathBuf, reason: String },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyBuffer { width, height } => {
                write!(f, "Source buffer is empty ({width}x{height})")
            }
            Self::NotFound { path } => {
                write!(f, "Source file '{}' does not exist", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "Cannot read source '{}': {source}", path.display())
            }
            Self::Image { path, source } => {
                write!(f, "Cannot decode image '{}': {source}", path.display())
            }
            Self::Svg { path, source } => {
                write!(f, "Cannot parse SVG '{}': {source}", path.display())
            }
            Self::SvgRender { path, reason } => {
                write!(f, "Cannot render SVG '{}': {reason}", path.display())
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Image { source, .. } => Some(source),
            Self::Svg { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DecodeError> for IconForgeError {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

// ---------------------------------------------------------------------------
// Encode errors
// ---------------------------------------------------------------------------

/// Format-level contract violations raised by the container encoders.
#[derive(Debug)]
pub enum EncodeError {
    /// A container encoder was handed no images.
    EmptyImageList { format: &'static str },

    /// An image has dimensions the format cannot represent.
    InvalidDimensions {
        format: &'static str,
        width: u32,
        height: u32,
        reason: &'static str,
    },

    /// ICNS only stores a fixed set of square sizes.
    UnsupportedIcnsSize { size: u32 },

    /// Two ICNS images mapped to the same chunk type.
    DuplicateIcnsSize { size: u32, type_code: String },

    /// The container outgrew its 32-bit length/offset fields.
    ContainerTooLarge { format: &'static str, bytes: usize },

    /// A single-image codec (PNG, BMP, WebP) failed.
    Raster {
        format: &'static str,
        source: image::ImageError,
    },

    /// XPM text does not follow the dialect this crate writes.
    MalformedXpm { line: usize, reason: String },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyImageList { format } => {
                write!(f, "{format}: at least one image is required")
            }
            Self::InvalidDimensions {
                format,
                width,
                height,
                reason,
            } => write!(f, "{format}: invalid dimensions {width}x{height}: {reason}"),
            Self::UnsupportedIcnsSize { size } => write!(
                f,
                "ICNS: unsupported size {size}px (expected 16, 32, 64, 128, 256, 512 or 1024)"
            ),
            Self::DuplicateIcnsSize { size, type_code } => write!(
                f,
                "ICNS: size {size}px ('{type_code}') encoded more than once"
            ),
            Self::ContainerTooLarge { format, bytes } => write!(
                f,
                "{format}: encoded size {bytes} bytes exceeds the 32-bit format limit"
            ),
            Self::Raster { format, source } => {
                write!(f, "{format} encoding failed: {source}")
            }
            Self::MalformedXpm { line, reason } => {
                write!(f, "XPM line {line}: {reason}")
            }
        }
    }
}

impl std::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Raster { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<EncodeError> for IconForgeError {
    fn from(e: EncodeError) -> Self {
        Self::Encode(e)
    }
}

// ---------------------------------------------------------------------------
// Platform generation errors
// ---------------------------------------------------------------------------

/// One platform's asset set failed to encode.
///
/// Collected by the orchestrator and returned alongside the manifest; the
/// remaining platforms still complete.
#[derive(Debug)]
pub struct PlatformGenerationError {
    /// Platform key (e.g. "windows").
    pub platform: &'static str,
    /// Output path of the asset that failed, relative to the output root.
    pub asset: PathBuf,
    pub source: EncodeError,
}

impl fmt::Display for PlatformGenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Platform '{}' failed at '{}': {}",
            self.platform,
            self.asset.display(),
            self.source
        )
    }
}

impl std::error::Error for PlatformGenerationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

// ---------------------------------------------------------------------------
// Catalog errors
// ---------------------------------------------------------------------------

/// Errors loading the embedded platform catalog tables.
#[derive(Debug)]
pub enum CatalogError {
    /// A catalog table is not valid TOML for the expected shape.
    TomlParse {
        file: &'static str,
        source: toml::de::Error,
    },

    /// The table declares a different platform than the file it lives in.
    PlatformMismatch {
        file: &'static str,
        expected: &'static str,
        found: String,
    },

    /// An asset entry violates a catalog rule.
    InvalidAsset {
        platform: &'static str,
        path: String,
        reason: String,
    },

    /// The platform has no assets at all.
    EmptyPlatform { platform: &'static str },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { file, source } => {
                write!(f, "Failed to parse catalog '{file}': {source}")
            }
            Self::PlatformMismatch {
                file,
                expected,
                found,
            } => write!(
                f,
                "Catalog '{file}' declares platform '{found}', expected '{expected}'"
            ),
            Self::InvalidAsset {
                platform,
                path,
                reason,
            } => write!(f, "Catalog '{platform}': asset '{path}': {reason}"),
            Self::EmptyPlatform { platform } => {
                write!(f, "Catalog '{platform}' declares no assets")
            }
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<CatalogError> for IconForgeError {
    fn from(e: CatalogError) -> Self {
        Self::Catalog(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for IconForgeError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for IconForge results.
pub type Result<T> = std::result::Result<T, IconForgeError>;
