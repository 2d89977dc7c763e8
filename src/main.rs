// IconForge - main.rs
//
// Command-line entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading and logging initialisation (debug mode support)
// 3. Source decoding and master buffer construction
// 4. Generation, manifest output, and exit status

use clap::Parser;
use iconforge::app::generate::{self, GenerateOptions};
use iconforge::app::source;
use iconforge::core::master;
use iconforge::core::model::{Platform, PlatformFlags};
use iconforge::platform::config::{self, PlatformPaths};
use iconforge::platform::fs;
use iconforge::util;
use iconforge::util::error::IconForgeError;
use std::path::PathBuf;
use std::process::ExitCode;

/// IconForge - generate platform icon sets from a single image.
///
/// Renders Linux, Windows, macOS, Web, Unix, Android, iOS and watchOS icon
/// sets (PNG, BMP, WebP, ICO, ICNS, XPM and SVG) from one PNG, JPEG, SVG or
/// other raster source.
#[derive(Parser, Debug)]
#[command(name = "iconforge", version, about)]
struct Cli {
    /// Source image (PNG, JPEG, WebP, TIFF, BMP, GIF or SVG).
    source: PathBuf,

    /// Output directory (default: `<source stem>_icons` beside the source).
    output_dir: Option<PathBuf>,

    /// Comma-separated platforms to generate
    /// (linux, windows, macos, web, unix, android, ios, watchos).
    #[arg(short = 'p', long = "platforms", value_delimiter = ',')]
    platforms: Vec<String>,

    /// Also write the manifest as pretty JSON to this file.
    #[arg(short = 'm', long = "manifest-json")]
    manifest_json: Option<PathBuf>,

    /// Config file (default: the platform config directory's config.toml).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Resampling worker threads (0 = all cores, 1 = serial).
    #[arg(short = 't', long = "threads")]
    threads: Option<usize>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

/// Exit status when some platforms failed but the rest were written.
const EXIT_PARTIAL: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // An explicit --config must load; the default location may be absent.
    let (config_path, loaded_config) = match &cli.config {
        Some(path) => (path.clone(), config::load_explicit_config(path)),
        None => {
            let path = PlatformPaths::resolve().config_file;
            let loaded = config::load_config(&path);
            (path, Ok(loaded))
        }
    };
    let (app_config, config_warnings) = match loaded_config {
        Ok(loaded) => loaded,
        Err(e) => {
            util::logging::init(cli.debug, None);
            let e = IconForgeError::from(e);
            tracing::error!(error = %e, "Config load failed");
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    util::logging::init(cli.debug, app_config.log_level.as_deref());

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        config = %config_path.display(),
        "IconForge starting"
    );
    for warning in &config_warnings {
        tracing::warn!("{warning}");
    }

    match run(&cli, &app_config) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Generation aborted");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, app_config: &config::AppConfig) -> Result<ExitCode, IconForgeError> {
    let flags = resolve_platforms(&cli.platforms, app_config.platforms);
    let options = GenerateOptions {
        worker_threads: cli.threads.unwrap_or(app_config.worker_threads),
    };
    let output_dir = cli
        .output_dir
        .clone()
        .unwrap_or_else(|| generate::default_output_dir(&cli.source));

    let loaded = source::load_source(&cli.source)?;
    let master = master::build_master(&loaded.rgba)?;

    let report = generate::generate(
        &master,
        loaded.vector_source.as_deref(),
        &output_dir,
        &flags,
        &options,
    )?;

    if let Some(path) = &cli.manifest_json {
        let json = report
            .manifest
            .to_json()
            .map_err(|source| IconForgeError::Manifest {
                path: path.clone(),
                source,
            })?;
        fs::write_file(path, json.as_bytes())?;
        tracing::info!(path = %path.display(), "Manifest JSON written");
    }

    print!("{}", report.manifest.render_tree());
    println!(
        "{} files, {} bytes",
        report.manifest.file_count(),
        report.manifest.total_bytes()
    );

    if report.is_complete() {
        return Ok(ExitCode::SUCCESS);
    }
    for failure in &report.failures {
        eprintln!("Failed: {failure}");
    }
    Ok(ExitCode::from(EXIT_PARTIAL))
}

/// CLI platforms win over config; unknown keys are warned about and skipped.
fn resolve_platforms(keys: &[String], configured: PlatformFlags) -> PlatformFlags {
    if keys.is_empty() {
        return configured;
    }
    let mut selected = Vec::new();
    for key in keys {
        match Platform::from_key(key) {
            Some(p) => selected.push(p),
            None => tracing::warn!(platform = %key, "Unknown platform ignored"),
        }
    }
    if selected.is_empty() {
        tracing::warn!("No known platform given; using configured platforms");
        return configured;
    }
    PlatformFlags::only(&selected)
}
