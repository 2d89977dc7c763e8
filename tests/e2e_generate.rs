// IconForge - tests/e2e_generate.rs
//
// End-to-end tests for the generation pipeline.
//
// These tests exercise the real filesystem, the embedded catalog, real
// Lanczos resampling and every encoder, then read the results back with
// independent decoders (the `ico` crate, the `image` crate) where one exists.

use iconforge::app::generate::{generate, GenerateOptions, GenerationReport};
use iconforge::app::source::load_source;
use iconforge::core::master::{build_master, MasterImage};
use iconforge::core::model::{Platform, PlatformFlags};
use iconforge::core::resample::resample;
use iconforge::core::xpm::{parse_xpm, XpmColor};
use image::{Rgba, RgbaImage};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// =============================================================================
// Helpers
// =============================================================================

fn red_master() -> MasterImage {
    build_master(&RgbaImage::from_pixel(1024, 1024, Rgba([255, 0, 0, 255]))).unwrap()
}

/// A master with structure: a gradient disc on a transparent background.
fn disc_master() -> MasterImage {
    let src = RgbaImage::from_fn(256, 256, |x, y| {
        let dx = x as i32 - 128;
        let dy = y as i32 - 128;
        if dx * dx + dy * dy < 100 * 100 {
            Rgba([x as u8, y as u8, 200, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    build_master(&src).unwrap()
}

fn run(master: &MasterImage, out: &Path, platforms: &[Platform]) -> GenerationReport {
    generate(
        master,
        None,
        out,
        &PlatformFlags::only(platforms),
        &GenerateOptions { worker_threads: 2 },
    )
    .unwrap()
}

/// Every file under `root`, relative, with `/` separators.
fn files_under(root: &Path) -> BTreeSet<String> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect()
}

fn top_level_dirs(root: &Path) -> BTreeSet<String> {
    std::fs::read_dir(root)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.path().is_dir())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect()
}

// =============================================================================
// Windows
// =============================================================================

/// A red 1024 source with only Windows enabled produces exactly the Windows
/// set and nothing else.
#[test]
fn e2e_windows_only_produces_exact_file_set() {
    let dir = tempfile::tempdir().unwrap();
    let report = run(&red_master(), dir.path(), &[Platform::Windows]);
    assert!(report.is_complete());

    let mut expected: BTreeSet<String> = [
        "windows/icon.ico",
        "windows/icon.bmp",
        "windows/icon.png",
        "windows/icon.svg",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    for name in [
        "Square44x44Logo.scale-100",
        "Square44x44Logo.scale-125",
        "Square44x44Logo.scale-150",
        "Square44x44Logo.scale-200",
        "Square44x44Logo.scale-400",
        "Square50x50Logo.scale-100",
        "Square50x50Logo.scale-200",
        "Square150x150Logo.scale-100",
        "Square150x150Logo.scale-200",
        "Square150x150Logo.scale-400",
        "Square310x310Logo.scale-100",
        "Square310x310Logo.scale-200",
        "StoreLogo.scale-100",
        "StoreLogo.scale-125",
        "StoreLogo.scale-150",
        "StoreLogo.scale-200",
        "StoreLogo.scale-400",
    ] {
        expected.insert(format!("windows/store/{name}.png"));
    }

    assert_eq!(files_under(dir.path()), expected);
    assert_eq!(
        top_level_dirs(dir.path()),
        BTreeSet::from(["windows".to_string()])
    );
    assert_eq!(report.manifest.file_count(), expected.len());
}

/// The generated ICO is readable by an independent decoder with the
/// requested sizes at 32 bpp.
#[test]
fn e2e_windows_ico_decodes_with_ico_crate() {
    let dir = tempfile::tempdir().unwrap();
    run(&red_master(), dir.path(), &[Platform::Windows]);

    let file = std::fs::File::open(dir.path().join("windows/icon.ico")).unwrap();
    let icon_dir = ico::IconDir::read(file).unwrap();
    let sizes: Vec<u32> = icon_dir.entries().iter().map(|e| e.width()).collect();
    assert_eq!(sizes, vec![16, 24, 32, 48, 64, 128, 256]);

    for entry in icon_dir.entries() {
        assert_eq!(entry.width(), entry.height());
        assert_eq!(entry.bits_per_pixel(), 32);
        let image = entry.decode().unwrap();
        assert_eq!(image.width(), entry.width());
        let px = &image.rgba_data()[..4];
        assert!(px[0] >= 250 && px[1] <= 5 && px[2] <= 5 && px[3] >= 250, "{px:?}");
    }
}

/// Store tiles and the BMP decode at their catalog sizes.
#[test]
fn e2e_windows_rasters_have_declared_sizes() {
    let dir = tempfile::tempdir().unwrap();
    let report = run(&red_master(), dir.path(), &[Platform::Windows]);

    let bmp = image::open(dir.path().join("windows/icon.bmp")).unwrap();
    assert_eq!((bmp.width(), bmp.height()), (128, 128));

    let store = image::open(dir.path().join("windows/store/StoreLogo.scale-125.png")).unwrap();
    assert_eq!((store.width(), store.height()), (63, 63));

    let entry = report
        .manifest
        .get(Path::new("windows/store/StoreLogo.scale-125.png"))
        .unwrap();
    assert_eq!((entry.width, entry.height), (63, 63));
}

// =============================================================================
// Other platforms
// =============================================================================

/// The unix XPM parses back to exactly the resampled 48px pixels.
#[test]
fn e2e_unix_xpm_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let master = disc_master();
    run(&master, dir.path(), &[Platform::Unix]);

    let text = std::fs::read_to_string(dir.path().join("unix/icon.xpm")).unwrap();
    assert!(text.starts_with("/* XPM */\nstatic char * icon[] = {\n\"48 48 "));
    assert!(text.ends_with("};\n"));

    let parsed = parse_xpm(&text).unwrap();
    let expected = resample(master.as_rgba(), 48, 48).unwrap();
    assert_eq!((parsed.width(), parsed.height()), (48, 48));
    for (x, y, px) in expected.enumerate_pixels() {
        assert_eq!(parsed.color_at(x, y), XpmColor::from_rgba(px.0), "pixel ({x},{y})");
    }
    assert!(parsed.palette().contains(&XpmColor::Transparent));
}

/// The macOS ICNS declares its own length and holds all seven sizes.
#[test]
fn e2e_macos_icns_structure() {
    let dir = tempfile::tempdir().unwrap();
    run(&red_master(), dir.path(), &[Platform::MacOs]);

    let bytes = std::fs::read(dir.path().join("macOS/icon.icns")).unwrap();
    assert_eq!(&bytes[..4], b"icns");
    assert_eq!(
        u32::from_be_bytes(bytes[4..8].try_into().unwrap()) as usize,
        bytes.len()
    );

    let mut codes = Vec::new();
    let mut pos = 8;
    while pos < bytes.len() {
        codes.push(String::from_utf8_lossy(&bytes[pos..pos + 4]).into_owned());
        pos += u32::from_be_bytes(bytes[pos + 4..pos + 8].try_into().unwrap()) as usize;
    }
    assert_eq!(
        codes,
        vec!["icp4", "icp5", "icp6", "ic07", "ic08", "ic09", "ic10"]
    );
}

/// Every platform at once: all eight roots, each with its icon.svg, and
/// watchOS without a standalone icon.png.
#[test]
fn e2e_all_platforms_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let report = run(&red_master(), dir.path(), Platform::all());
    assert!(report.is_complete());

    let roots: Vec<&str> = Platform::all().iter().map(|p| p.dir_name()).collect();
    assert_eq!(
        top_level_dirs(dir.path()),
        roots.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>()
    );
    for root in &roots {
        let svg = PathBuf::from(root).join("icon.svg");
        assert!(report.manifest.get(&svg).is_some(), "{root} missing icon.svg");
    }
    assert!(dir.path().join("linux/scalable/icon.svg").is_file());
    assert!(report
        .manifest
        .get(Path::new("watchOS/icon.png"))
        .is_none());

    // linux: 18 sized PNGs + icon.png + scalable svg + root svg
    let linux = report
        .manifest
        .files()
        .iter()
        .filter(|a| a.path.starts_with("linux"))
        .count();
    assert_eq!(linux, 21);

    // Manifest lists exactly what is on disk, with matching byte counts.
    let on_disk = files_under(dir.path());
    assert_eq!(report.manifest.file_count(), on_disk.len());
    for asset in report.manifest.files() {
        let len = std::fs::metadata(dir.path().join(&asset.path)).unwrap().len();
        assert_eq!(asset.bytes, len, "{}", asset.path.display());
    }
}

// =============================================================================
// Determinism and sources
// =============================================================================

/// Two runs from the same source give identical text outputs and manifest
/// structure, serial or parallel.
#[test]
fn e2e_runs_are_deterministic() {
    let master = disc_master();
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    let platforms = PlatformFlags::only(&[Platform::Unix, Platform::Web]);

    let serial = generate(
        &master,
        None,
        a.path(),
        &platforms,
        &GenerateOptions { worker_threads: 1 },
    )
    .unwrap();
    let parallel = generate(
        &master,
        None,
        b.path(),
        &platforms,
        &GenerateOptions { worker_threads: 4 },
    )
    .unwrap();

    let strip = |r: &GenerationReport| -> Vec<_> {
        r.manifest
            .files()
            .iter()
            .map(|f| (f.path.clone(), f.width, f.height, f.bytes))
            .collect()
    };
    assert_eq!(strip(&serial), strip(&parallel));

    for rel in ["unix/icon.xpm", "unix/icon.svg", "web/favicon.ico", "web/apple-touch-icon.png"] {
        assert_eq!(
            std::fs::read(a.path().join(rel)).unwrap(),
            std::fs::read(b.path().join(rel)).unwrap(),
            "{rel} differs"
        );
    }
}

/// An SVG source is rendered for rasters and copied verbatim as icon.svg.
#[test]
fn e2e_svg_source_passthrough() {
    let dir = tempfile::tempdir().unwrap();
    let svg_path = dir.path().join("logo.svg");
    let markup = "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"64\" height=\"64\">\
                  <circle cx=\"32\" cy=\"32\" r=\"30\" fill=\"#0080ff\"/></svg>";
    std::fs::write(&svg_path, markup).unwrap();

    let loaded = load_source(&svg_path).unwrap();
    let master = build_master(&loaded.rgba).unwrap();
    let out = dir.path().join("logo_icons");
    generate(
        &master,
        loaded.vector_source.as_deref(),
        &out,
        &PlatformFlags::only(&[Platform::Linux]),
        &GenerateOptions::default(),
    )
    .unwrap();

    assert_eq!(std::fs::read_to_string(out.join("linux/icon.svg")).unwrap(), markup);
    assert_eq!(
        std::fs::read_to_string(out.join("linux/scalable/icon.svg")).unwrap(),
        markup
    );
    let png = image::open(out.join("linux/256x256/icon.png")).unwrap().into_rgba8();
    assert_eq!(png.get_pixel(128, 128).0, [0, 128, 255, 255]);
    assert_eq!(png.get_pixel(0, 0).0[3], 0);
}
