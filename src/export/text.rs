use fontdue::{Font as FontdueFont, FontSettings, Metrics};
use image::{Rgba, RgbaImage};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::ExportError;

/// Name of egui's bundled proportional font, used when no font file is configured
const BUNDLED_FONT: &str = "Ubuntu-Light";

/// Measures the rendered width of a string
pub trait MeasureText {
    fn measure(&self, text: &str) -> f32;
}

/// Greedy word wrap.
///
/// Words are appended to the current line while the measured line fits in
/// `max_width`; the word that would overflow starts the next line. A word is
/// never split, so a single word wider than `max_width` gets a line of its own.
pub fn wrap_text(text: &str, max_width: f32, measure: &impl MeasureText) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }
        let candidate = format!("{line} {word}");
        if measure.measure(&candidate) > max_width {
            lines.push(std::mem::replace(&mut line, word.to_owned()));
        } else {
            line = candidate;
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

type GlyphKey = (char, u32);

/// TrueType font wrapper using fontdue for rasterization
#[derive(Clone)]
pub struct Typeface {
    font: Arc<FontdueFont>,
    /// Cache for rendered glyphs, keyed by character and pixel size bits
    glyph_cache: Arc<Mutex<HashMap<GlyphKey, Arc<(Metrics, Vec<u8>)>>>>,
}

impl Typeface {
    /// Load a font from TrueType/OpenType bytes
    pub fn from_bytes(font_data: &[u8]) -> Result<Self, ExportError> {
        let font = FontdueFont::from_bytes(font_data, FontSettings::default())
            .map_err(|e| ExportError::Font(e.to_string()))?;
        Ok(Self {
            font: Arc::new(font),
            glyph_cache: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Load a font from a file path
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ExportError> {
        let path = path.as_ref();
        let font_data = std::fs::read(path)
            .map_err(|e| ExportError::Font(format!("{}: {}", path.display(), e)))?;
        log::info!("Loaded font from {}", path.display());
        Self::from_bytes(&font_data)
    }

    /// The proportional font egui ships with
    pub fn bundled() -> Result<Self, ExportError> {
        let definitions = egui::FontDefinitions::default();
        let data = definitions
            .font_data
            .get(BUNDLED_FONT)
            .ok_or_else(|| ExportError::Font(format!("bundled font {BUNDLED_FONT} missing")))?;
        Self::from_bytes(data.font.as_ref())
    }

    /// `path` if given, otherwise the bundled font
    pub fn load(path: Option<&Path>) -> Result<Self, ExportError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::bundled(),
        }
    }

    /// Number of rasterized glyphs held in the cache
    pub fn cached_glyphs(&self) -> usize {
        self.glyph_cache.lock().len()
    }

    /// Whether both handles point at the same font and glyph cache
    pub fn shares_cache_with(&self, other: &Typeface) -> bool {
        Arc::ptr_eq(&self.glyph_cache, &other.glyph_cache)
    }

    /// This typeface at a fixed pixel size
    pub fn at_size(&self, px: f32) -> SizedFont<'_> {
        SizedFont { typeface: self, px }
    }

    fn glyph(&self, ch: char, px: f32) -> Arc<(Metrics, Vec<u8>)> {
        let key = (ch, px.to_bits());
        if let Some(glyph) = self.glyph_cache.lock().get(&key) {
            return Arc::clone(glyph);
        }
        let glyph = Arc::new(self.font.rasterize(ch, px));
        self.glyph_cache.lock().insert(key, Arc::clone(&glyph));
        glyph
    }

    fn kern(&self, prev: Option<char>, ch: char, px: f32) -> f32 {
        prev.and_then(|p| self.font.horizontal_kern(p, ch, px))
            .unwrap_or(0.0)
    }
}

impl std::fmt::Debug for Typeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Typeface")
            .field("glyphs_cached", &self.cached_glyphs())
            .finish()
    }
}

/// A typeface bound to a pixel size
#[derive(Debug, Clone, Copy)]
pub struct SizedFont<'a> {
    typeface: &'a Typeface,
    px: f32,
}

impl SizedFont<'_> {
    /// Draws `text` with its left edge at `x` and its baseline at `baseline`
    pub fn draw(&self, image: &mut RgbaImage, text: &str, x: f32, baseline: f32, color: Rgba<u8>) {
        let mut pen_x = x;
        let mut prev = None;
        for ch in text.chars() {
            pen_x += self.typeface.kern(prev, ch, self.px);
            let glyph = self.typeface.glyph(ch, self.px);
            let (metrics, coverage) = (&glyph.0, &glyph.1);

            let left = pen_x.round() as i64 + i64::from(metrics.xmin);
            let top = baseline.round() as i64 - metrics.height as i64 - i64::from(metrics.ymin);
            for gy in 0..metrics.height {
                for gx in 0..metrics.width {
                    let alpha = coverage[gy * metrics.width + gx];
                    if alpha > 0 {
                        blend_into(image, left + gx as i64, top + gy as i64, color, alpha);
                    }
                }
            }

            pen_x += metrics.advance_width;
            prev = Some(ch);
        }
    }

    /// Draws `text` horizontally centred on `center_x`
    pub fn draw_centered(
        &self,
        image: &mut RgbaImage,
        text: &str,
        center_x: f32,
        baseline: f32,
        color: Rgba<u8>,
    ) {
        let width = self.measure(text);
        self.draw(image, text, center_x - width / 2.0, baseline, color);
    }
}

impl MeasureText for SizedFont<'_> {
    fn measure(&self, text: &str) -> f32 {
        let mut width = 0.0;
        let mut prev = None;
        for ch in text.chars() {
            width += self.typeface.kern(prev, ch, self.px);
            width += self.typeface.font.metrics(ch, self.px).advance_width;
            prev = Some(ch);
        }
        width
    }
}

/// Composites `color` with glyph coverage `alpha` onto one pixel, ignoring
/// coordinates outside the image
fn blend_into(image: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>, alpha: u8) {
    if x < 0 || y < 0 || x >= i64::from(image.width()) || y >= i64::from(image.height()) {
        return;
    }
    let a = f32::from(alpha) / 255.0;
    let dst = image.get_pixel_mut(x as u32, y as u32);
    for c in 0..3 {
        let out = f32::from(color.0[c]) * a + f32::from(dst.0[c]) * (1.0 - a);
        dst.0[c] = out.round().clamp(0.0, 255.0) as u8;
    }
    dst.0[3] = dst.0[3].max(alpha);
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every character is 10px wide
    struct Monospace;

    impl MeasureText for Monospace {
        fn measure(&self, text: &str) -> f32 {
            text.chars().count() as f32 * 10.0
        }
    }

    #[test]
    fn test_wrap_breaks_before_overflowing_word() {
        // "aaa bbb" = 70px fits, "aaa bbb ccc" = 110px does not
        let lines = wrap_text("aaa bbb ccc dd", 100.0, &Monospace);
        assert_eq!(lines, vec!["aaa bbb", "ccc dd"]);
    }

    #[test]
    fn test_wrap_never_splits_words() {
        let lines = wrap_text("tiny enormouslylongword end", 50.0, &Monospace);
        assert_eq!(lines, vec!["tiny", "enormouslylongword", "end"]);
    }

    #[test]
    fn test_wrap_exact_fit_stays_on_line() {
        let lines = wrap_text("aaaa bbbbb", 100.0, &Monospace);
        assert_eq!(lines, vec!["aaaa bbbbb"]);
    }

    #[test]
    fn test_wrap_empty_and_whitespace() {
        assert!(wrap_text("", 100.0, &Monospace).is_empty());
        assert!(wrap_text("   \n ", 100.0, &Monospace).is_empty());
        assert_eq!(wrap_text("  one   two ", 100.0, &Monospace), vec!["one two"]);
    }

    #[test]
    fn test_bundled_font_measures_and_draws() {
        let typeface = Typeface::bundled().unwrap();
        let font = typeface.at_size(20.0);
        let short = font.measure("Hi");
        let long = font.measure("Hi there");
        assert!(short > 0.0);
        assert!(long > short);

        let mut image = RgbaImage::from_pixel(120, 40, Rgba([255, 255, 255, 255]));
        font.draw_centered(&mut image, "Hi there", 60.0, 28.0, Rgba([0, 0, 0, 255]));
        assert!(image.pixels().any(|p| p.0[0] < 128));
    }

    #[test]
    fn test_missing_font_file() {
        assert!(matches!(
            Typeface::from_file("/no/such/font.ttf"),
            Err(ExportError::Font(_))
        ));
        assert!(matches!(
            Typeface::from_bytes(b"not a font"),
            Err(ExportError::Font(_))
        ));
    }
}
