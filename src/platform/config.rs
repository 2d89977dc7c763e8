// IconForge - platform/config.rs
//
// Platform-specific configuration directory resolution, and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::model::{Platform, PlatformFlags};
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for IconForge configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/iconforge/ or %APPDATA%\IconForge\config\)
    pub config_dir: PathBuf,

    /// Default location of config.toml inside `config_dir`.
    pub config_file: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let config_file = config_dir.join(constants::CONFIG_FILE_NAME);
            Self {
                config_dir,
                config_file,
            }
        } else {
            let fallback = PathBuf::from(".");
            Self {
                config_file: fallback.join(constants::CONFIG_FILE_NAME),
                config_dir: fallback,
            }
        }
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[output]` section.
    pub output: OutputSection,
    /// `[resample]` section.
    pub resample: ResampleSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[output]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Platform keys to generate when the CLI names none.
    pub platforms: Option<Vec<String>>,
}

/// `[resample]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ResampleSection {
    /// Number of worker threads (0 = auto).
    pub worker_threads: Option<usize>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Platforms generated when the CLI does not name any.
    pub platforms: PlatformFlags,

    /// Resampling worker threads (0 = available cores).
    pub worker_threads: usize,

    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            platforms: PlatformFlags::all(),
            worker_threads: constants::DEFAULT_WORKER_THREADS,
            log_level: None,
        }
    }
}

/// Read and parse a config file without validating its values.
pub fn read_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load and validate `config.toml` at `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first run).
/// If the file is unreadable or unparseable, returns defaults with a warning.
///
/// Called before logging is initialised (the level lives in the file), so
/// warnings are returned for the caller to log.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        return (AppConfig::default(), warnings);
    }

    let raw = match read_config_file(config_path) {
        Ok(raw) => raw,
        Err(e) => {
            warnings.push(format!("{e}. Using defaults."));
            return (AppConfig::default(), warnings);
        }
    };

    let config = validate(raw, &mut warnings);
    (config, warnings)
}

/// Load and validate a config file the user named explicitly.
///
/// Unlike `load_config`, a file that is missing or cannot be parsed is an
/// error rather than a fallback to defaults. Value problems are still
/// returned as warnings.
pub fn load_explicit_config(config_path: &Path) -> Result<(AppConfig, Vec<String>), ConfigError> {
    let raw = read_config_file(config_path)?;
    let mut warnings = Vec::new();
    let config = validate(raw, &mut warnings);
    Ok((config, warnings))
}

/// Validate each field against named constants, accumulating all problems.
pub fn validate(raw: RawConfig, warnings: &mut Vec<String>) -> AppConfig {
    let mut config = AppConfig::default();

    // -- Output: platforms --
    if let Some(keys) = raw.output.platforms {
        let mut selected = Vec::new();
        for key in &keys {
            match Platform::from_key(key) {
                Some(p) => selected.push(p),
                None => warnings.push(
                    ConfigError::ValueOutOfRange {
                        field: "[output] platforms".to_string(),
                        value: key.clone(),
                        expected: platform_key_list(),
                    }
                    .to_string()
                        + ". Entry ignored.",
                ),
            }
        }
        if selected.is_empty() {
            warnings.push(
                "[output] platforms selects no known platform. Using default (all).".to_string(),
            );
        } else {
            config.platforms = PlatformFlags::only(&selected);
        }
    }

    // -- Resample: worker_threads --
    if let Some(threads) = raw.resample.worker_threads {
        if threads <= constants::MAX_WORKER_THREADS {
            config.worker_threads = threads;
        } else {
            warnings.push(format!(
                "{}. Using default ({}).",
                ConfigError::ValueOutOfRange {
                    field: "[resample] worker_threads".to_string(),
                    value: threads.to_string(),
                    expected: format!("0-{} (0 = auto)", constants::MAX_WORKER_THREADS),
                },
                constants::DEFAULT_WORKER_THREADS,
            ));
        }
    }

    // -- Logging: level --
    if let Some(level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default ({}).",
                constants::DEFAULT_LOG_LEVEL,
            ));
        }
    }

    config
}

fn platform_key_list() -> String {
    Platform::all()
        .iter()
        .map(|p| p.key())
        .collect::<Vec<_>>()
        .join(", ")
}
