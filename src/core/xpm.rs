// IconForge - core/xpm.rs
//
// X PixMap (XPM3) text encoder for legacy Unix desktops, plus a reader for
// the exact dialect it writes.
//
// No colour reduction is applied: every distinct opaque RGB triple gets its
// own palette entry, and everything with alpha below the threshold collapses
// into the single transparent colour "None". Palette order is first-seen
// order in a row-major scan, which makes the output byte stream a pure
// function of the pixels.

use crate::util::constants::{XPM_ALPHA_THRESHOLD, XPM_CHARS_PER_PIXEL, XPM_CODE_ALPHABET};
use crate::util::error::EncodeError;
use image::RgbaImage;
use std::collections::HashMap;
use std::fmt::Write as _;

// =============================================================================
// Indexed-colour model
// =============================================================================

/// One palette entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XpmColor {
    Transparent,
    Rgb([u8; 3]),
}

impl XpmColor {
    /// Classify a straight-alpha RGBA pixel.
    pub fn from_rgba(px: [u8; 4]) -> Self {
        if px[3] < XPM_ALPHA_THRESHOLD {
            XpmColor::Transparent
        } else {
            XpmColor::Rgb([px[0], px[1], px[2]])
        }
    }

    /// Colour value as written after the `c` key.
    fn spec(&self) -> String {
        match self {
            XpmColor::Transparent => "None".to_string(),
            XpmColor::Rgb([r, g, b]) => format!("#{r:02X}{g:02X}{b:02X}"),
        }
    }
}

/// A palette plus a per-pixel index grid.
///
/// Palette entries are unique and ordered by first appearance in a
/// row-major scan; every index is a valid palette position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedColorImage {
    width: u32,
    height: u32,
    palette: Vec<XpmColor>,
    /// Row-major, `width * height` entries.
    indices: Vec<usize>,
}

impl IndexedColorImage {
    /// Index an RGBA buffer. Fails only if the buffer is empty.
    pub fn from_rgba(image: &RgbaImage) -> Result<Self, EncodeError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(EncodeError::InvalidDimensions {
                format: "XPM",
                width,
                height,
                reason: "image is empty",
            });
        }

        let mut lookup: HashMap<XpmColor, usize> = HashMap::new();
        let mut palette = Vec::new();
        let mut indices = Vec::with_capacity((width * height) as usize);

        // `pixels()` iterates row-major, left to right, top to bottom.
        for px in image.pixels() {
            let colour = XpmColor::from_rgba(px.0);
            let index = *lookup.entry(colour).or_insert_with(|| {
                palette.push(colour);
                palette.len() - 1
            });
            indices.push(index);
        }

        Ok(Self {
            width,
            height,
            palette,
            indices,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn palette(&self) -> &[XpmColor] {
        &self.palette
    }

    /// Palette entry at pixel (x, y).
    pub fn color_at(&self, x: u32, y: u32) -> XpmColor {
        self.palette[self.indices[(y * self.width + x) as usize]]
    }

    fn row(&self, y: u32) -> &[usize] {
        let start = (y * self.width) as usize;
        &self.indices[start..start + self.width as usize]
    }
}

/// Two-character code for palette index `i`: low digit first, base N over
/// the code alphabet. Wraps after N² colours.
pub fn color_code(index: usize) -> [u8; 2] {
    let n = XPM_CODE_ALPHABET.len();
    [
        XPM_CODE_ALPHABET[index % n],
        XPM_CODE_ALPHABET[(index / n) % n],
    ]
}

// =============================================================================
// Encoder
// =============================================================================

/// Encode an RGBA buffer as XPM text.
pub fn encode_xpm(image: &RgbaImage) -> Result<String, EncodeError> {
    let indexed = IndexedColorImage::from_rgba(image)?;
    if indexed.palette.len() > XPM_CODE_ALPHABET.len().pow(2) {
        tracing::warn!(
            colours = indexed.palette.len(),
            "XPM palette exceeds the unique two-character code space; codes will repeat"
        );
    }
    Ok(write_indexed(&indexed))
}

/// Serialise an indexed image in the XPM dialect this module reads back.
pub fn write_indexed(indexed: &IndexedColorImage) -> String {
    let row_len = indexed.width as usize * XPM_CHARS_PER_PIXEL + 4;
    let mut out =
        String::with_capacity(64 + indexed.palette.len() * 16 + row_len * indexed.height as usize);

    out.push_str("/* XPM */\n");
    out.push_str("static char * icon[] = {\n");
    // Writing into a String cannot fail.
    let _ = writeln!(
        out,
        "\"{} {} {} {}\",",
        indexed.width,
        indexed.height,
        indexed.palette.len(),
        XPM_CHARS_PER_PIXEL
    );

    for (i, colour) in indexed.palette.iter().enumerate() {
        let [a, b] = color_code(i);
        let _ = writeln!(out, "\"{}{} c {}\",", a as char, b as char, colour.spec());
    }

    for y in 0..indexed.height {
        out.push('"');
        for &index in indexed.row(y) {
            let [a, b] = color_code(index);
            out.push(a as char);
            out.push(b as char);
        }
        out.push_str("\",\n");
    }

    out.push_str("};\n");
    out
}

// =============================================================================
// Reader
// =============================================================================

/// Parse XPM text written by [`encode_xpm`] back into an indexed image.
///
/// Accepts only the single dialect this crate produces: two characters per
/// pixel, `c` colour keys, `None` or `#RRGGBB` values.
pub fn parse_xpm(text: &str) -> Result<IndexedColorImage, EncodeError> {
    let lines: Vec<&str> = text.lines().collect();
    let malformed = |line: usize, reason: String| EncodeError::MalformedXpm { line, reason };

    if lines.first().map(|l| l.trim()) != Some("/* XPM */") {
        return Err(malformed(1, "missing /* XPM */ marker".to_string()));
    }
    if !lines.get(1).is_some_and(|l| l.trim_start().starts_with("static char")) {
        return Err(malformed(2, "missing array declaration".to_string()));
    }

    let values_line = quoted(lines.get(2).copied(), 3)?;
    let values: Vec<usize> = values_line
        .split_whitespace()
        .map(|v| v.parse::<usize>())
        .collect::<Result<_, _>>()
        .map_err(|e| malformed(3, format!("invalid values line: {e}")))?;
    let [width, height, ncolors, cpp] = values[..] else {
        return Err(malformed(3, format!("expected 4 values, found {}", values.len())));
    };
    if cpp != XPM_CHARS_PER_PIXEL {
        return Err(malformed(3, format!("unsupported {cpp} chars per pixel")));
    }
    if width == 0 || height == 0 {
        return Err(malformed(3, "image is empty".to_string()));
    }

    // Header values are untrusted; never reserve more than the text can hold.
    let mut palette = Vec::with_capacity(ncolors.min(lines.len()));
    let mut codes: HashMap<&[u8], usize> = HashMap::with_capacity(ncolors.min(lines.len()));
    for i in 0..ncolors {
        let line_no = 4 + i;
        let entry = quoted(lines.get(line_no - 1).copied(), line_no)?;
        if entry.len() < cpp {
            return Err(malformed(line_no, "colour line too short".to_string()));
        }
        let (code, rest) = entry.as_bytes().split_at(cpp);
        let value = std::str::from_utf8(rest)
            .ok()
            .and_then(|r| r.strip_prefix(" c "))
            .ok_or_else(|| malformed(line_no, "expected ' c ' colour key".to_string()))?;
        let colour = parse_colour(value)
            .ok_or_else(|| malformed(line_no, format!("unrecognised colour '{value}'")))?;
        if codes.insert(code, i).is_some() {
            return Err(malformed(line_no, "duplicate colour code".to_string()));
        }
        palette.push(colour);
    }

    let mut indices = Vec::with_capacity(width.saturating_mul(height).min(text.len()));
    for y in 0..height {
        let line_no = 4 + ncolors + y;
        let row = quoted(lines.get(line_no - 1).copied(), line_no)?.as_bytes();
        if row.len() != width.saturating_mul(cpp) {
            return Err(malformed(
                line_no,
                format!("expected {} characters, found {}", width.saturating_mul(cpp), row.len()),
            ));
        }
        for code in row.chunks(cpp) {
            let index = codes
                .get(code)
                .ok_or_else(|| malformed(line_no, "unknown colour code".to_string()))?;
            indices.push(*index);
        }
    }

    let closing = 4 + ncolors + height;
    if lines.get(closing - 1).map(|l| l.trim()) != Some("};") {
        return Err(malformed(closing, "missing closing '};'".to_string()));
    }

    Ok(IndexedColorImage {
        width: width as u32,
        height: height as u32,
        palette,
        indices,
    })
}

/// Contents of a `"...",` line.
fn quoted(line: Option<&str>, line_no: usize) -> Result<&str, EncodeError> {
    line.map(str::trim_end)
        .and_then(|l| l.strip_prefix('"'))
        .and_then(|l| l.strip_suffix("\",").or_else(|| l.strip_suffix('"')))
        .ok_or(EncodeError::MalformedXpm {
            line: line_no,
            reason: "expected a quoted string".to_string(),
        })
}

fn parse_colour(value: &str) -> Option<XpmColor> {
    if value == "None" {
        return Some(XpmColor::Transparent);
    }
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some(XpmColor::Rgb([channel(0)?, channel(2)?, channel(4)?]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_exact_output_for_small_image() {
        // Row 0: red, transparent. Row 1: transparent (different RGB), red.
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([1, 2, 3, 0]));
        img.put_pixel(0, 1, Rgba([9, 9, 9, 127]));
        img.put_pixel(1, 1, Rgba([255, 0, 0, 128]));

        let text = encode_xpm(&img).unwrap();
        let expected = "/* XPM */\n\
                        static char * icon[] = {\n\
                        \"2 2 2 2\",\n\
                        \"   c #FF0000\",\n\
                        \".  c None\",\n\
                        \"  . \",\n\
                        \".   \",\n\
                        };\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_codes_follow_base_n_rule() {
        let n = XPM_CODE_ALPHABET.len();
        assert_eq!(color_code(0), [b' ', b' ']);
        assert_eq!(color_code(1), [b'.', b' ']);
        assert_eq!(color_code(n), [b' ', b'.']);
        assert_eq!(color_code(n + 2), [b'X', b'.']);
        // Wraps after n^2 colours.
        assert_eq!(color_code(n * n), color_code(0));
    }

    #[test]
    fn test_alphabet_has_unique_printable_chars() {
        let mut seen = std::collections::HashSet::new();
        for &c in XPM_CODE_ALPHABET {
            assert!((b' '..=b'~').contains(&c));
            assert!(c != b'"' && c != b'\\');
            assert!(seen.insert(c), "duplicate code character {}", c as char);
        }
    }

    #[test]
    fn test_palette_is_first_seen_order() {
        let img = RgbaImage::from_fn(3, 2, |x, y| match (x, y) {
            (0, 0) => Rgba([0, 0, 255, 255]),
            (1, 0) => Rgba([0, 255, 0, 255]),
            (2, 0) => Rgba([0, 0, 255, 255]),
            _ => Rgba([255, 0, 0, 255]),
        });
        let indexed = IndexedColorImage::from_rgba(&img).unwrap();
        assert_eq!(
            indexed.palette(),
            &[
                XpmColor::Rgb([0, 0, 255]),
                XpmColor::Rgb([0, 255, 0]),
                XpmColor::Rgb([255, 0, 0]),
            ]
        );
    }

    #[test]
    fn test_round_trip_reproduces_every_pixel() {
        let img = RgbaImage::from_fn(48, 48, |x, y| {
            let a = if (x * y) % 7 == 0 { 40 } else { 255 };
            Rgba([(x * 5) as u8, (y * 5) as u8, ((x ^ y) * 3) as u8, a])
        });
        let text = encode_xpm(&img).unwrap();
        let parsed = parse_xpm(&text).unwrap();

        let mut distinct = std::collections::HashSet::new();
        for (x, y, px) in img.enumerate_pixels() {
            let expected = XpmColor::from_rgba(px.0);
            distinct.insert(expected);
            assert_eq!(parsed.color_at(x, y), expected, "pixel ({x}, {y})");
        }
        assert_eq!(parsed.palette().len(), distinct.len());
        assert_eq!(parsed, IndexedColorImage::from_rgba(&img).unwrap());
    }

    #[test]
    fn test_many_colours_uncapped() {
        // 4096 distinct opaque colours, more than any classic XPM tool expects.
        let img = RgbaImage::from_fn(64, 64, |x, y| Rgba([x as u8, y as u8, 0, 255]));
        let text = encode_xpm(&img).unwrap();
        assert!(text.lines().nth(2).unwrap().contains("64 64 4096 2"));
        assert_eq!(parse_xpm(&text).unwrap().palette().len(), 4096);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let img = RgbaImage::from_fn(20, 20, |x, y| Rgba([(x * y) as u8, x as u8, y as u8, 255]));
        assert_eq!(encode_xpm(&img).unwrap(), encode_xpm(&img).unwrap());
    }

    #[test]
    fn test_empty_buffer_rejected() {
        assert!(encode_xpm(&RgbaImage::new(0, 3)).is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_code() {
        let text = "/* XPM */\nstatic char * icon[] = {\n\"1 1 1 2\",\n\"   c None\",\n\"XX\",\n};\n";
        assert!(matches!(
            parse_xpm(text),
            Err(EncodeError::MalformedXpm { line: 5, .. })
        ));
    }
}
