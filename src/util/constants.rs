// IconForge - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "IconForge";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "IconForge";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Master buffer
// =============================================================================

/// Side length of the canonical master buffer every asset is derived from.
pub const MASTER_DIMENSION: u32 = 1024;

/// Sources smaller than this on either axis trigger a quality advisory.
/// Advisory only: the engine never rejects a source on size.
pub const ADVISORY_MIN_SOURCE_DIMENSION: u32 = 512;

// =============================================================================
// Container format limits
// =============================================================================

/// Largest width/height a classic ICO directory entry can describe.
/// Stored as 0 in the single-byte dimension field.
pub const ICO_MAX_DIMENSION: u32 = 256;

/// ICO entries at or above this size carry an embedded PNG payload instead
/// of a raw bitmap.
pub const ICO_PNG_THRESHOLD: u32 = 256;

/// Bit depth written to every ICO directory entry and bitmap header.
pub const ICO_BIT_COUNT: u16 = 32;

/// Square sizes an ICNS file may contain, paired with their chunk type code.
pub const ICNS_TYPE_CODES: &[(u32, [u8; 4])] = &[
    (16, *b"icp4"),
    (32, *b"icp5"),
    (64, *b"icp6"),
    (128, *b"ic07"),
    (256, *b"ic08"),
    (512, *b"ic09"),
    (1024, *b"ic10"),
];

// =============================================================================
// XPM
// =============================================================================

/// Pixels with alpha strictly below this are written as the transparent colour.
pub const XPM_ALPHA_THRESHOLD: u8 = 128;

/// Printable characters used to build the two-character XPM colour codes.
/// Contains no `"` or `\` so codes never need escaping inside C strings.
pub const XPM_CODE_ALPHABET: &[u8] =
    b" .XoO+@#$%&*=-;:>,<1234567890qwertyuipasdfghjklzxcvbnmMNBVCZLKJHGFDSAQWERTYUIP";

/// Characters per pixel in the generated XPM.
pub const XPM_CHARS_PER_PIXEL: usize = 2;

// =============================================================================
// Worker pool
// =============================================================================

/// Default number of resampling worker threads.
/// 0 means auto-detect (use available CPU cores).
pub const DEFAULT_WORKER_THREADS: usize = 0;

/// Hard upper bound on configured worker threads.
pub const MAX_WORKER_THREADS: usize = 256;

// =============================================================================
// Output
// =============================================================================

/// File name of the SVG written into every enabled platform root.
pub const SVG_FILE_NAME: &str = "icon.svg";

/// Suffix appended to the source file stem when no output directory is given.
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_icons";

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
