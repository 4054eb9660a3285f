//! Text shaping backed by fontdue.
//!
//! [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
//!
//! "CSS assumes that every font has font metrics that specify a
//! characteristic height above the baseline and a depth below it."

use fontdue::{Font, FontSettings};
use koala_common::Size;

use super::{
    FontFace, FontSpec, ShapedGlyph, ShapedText, TextShaper, check_font_size, wrap_lines,
};
use crate::error::{PaintError, PaintResult};

/// Common system font paths to search for a default (regular) font.
const FONT_SEARCH_PATHS: &[&str] = &[
    // macOS
    "/System/Library/Fonts/Helvetica.ttc",
    "/System/Library/Fonts/SFNS.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    // Linux
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    // Windows
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Heavy face paths (weights 700 and above).
const FONT_HEAVY_SEARCH_PATHS: &[&str] = &[
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSansBold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// Light face paths (weights 300 and below).
const FONT_LIGHT_SEARCH_PATHS: &[&str] = &[
    "/System/Library/Fonts/Supplemental/Arial Narrow.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-ExtraLight.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-ExtraLight.ttf",
    "C:\\Windows\\Fonts\\segoeuil.ttf",
];

/// Line height as a multiple of the font size.
///
/// [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#leading)
///
/// "We recommend a used value for 'normal' between 1.0 and 1.2."
const LINE_HEIGHT_RATIO: f32 = 1.2;

/// Shaper rasterizing glyphs with fontdue.
///
/// Missing light or heavy faces fall back to the regular face.
pub struct FontdueShaper {
    regular: Font,
    heavy: Option<Font>,
    light: Option<Font>,
}

impl FontdueShaper {
    /// A shaper using only `regular`.
    #[must_use]
    pub fn new(regular: Font) -> Self {
        Self {
            regular,
            heavy: None,
            light: None,
        }
    }

    /// Builder: add a heavy face.
    #[must_use]
    pub fn with_heavy(mut self, font: Font) -> Self {
        self.heavy = Some(font);
        self
    }

    /// Builder: add a light face.
    #[must_use]
    pub fn with_light(mut self, font: Font) -> Self {
        self.light = Some(font);
        self
    }

    /// Parse a regular face from font file bytes.
    ///
    /// # Errors
    ///
    /// Returns [`PaintError::TextRendering`] if the bytes are not a font.
    pub fn from_bytes(data: Vec<u8>) -> PaintResult<Self> {
        Font::from_bytes(data, FontSettings::default())
            .map(Self::new)
            .map_err(|e| PaintError::TextRendering(e.to_string()))
    }

    /// Load faces from the usual system font locations.
    ///
    /// # Errors
    ///
    /// Returns [`PaintError::TextRendering`] if no regular face is found.
    pub fn from_system() -> PaintResult<Self> {
        let regular = load_font_from_paths(FONT_SEARCH_PATHS, "regular").ok_or_else(|| {
            PaintError::TextRendering(format!(
                "no system font found (searched {} paths)",
                FONT_SEARCH_PATHS.len()
            ))
        })?;
        Ok(Self {
            regular,
            heavy: load_font_from_paths(FONT_HEAVY_SEARCH_PATHS, "heavy"),
            light: load_font_from_paths(FONT_LIGHT_SEARCH_PATHS, "light"),
        })
    }

    fn font(&self, face: FontFace) -> &Font {
        match face {
            FontFace::Heavy => self.heavy.as_ref(),
            FontFace::Light => self.light.as_ref(),
            FontFace::Regular => None,
        }
        .unwrap_or(&self.regular)
    }
}

/// Try to load a font from a list of filesystem paths.
fn load_font_from_paths(paths: &[&str], label: &str) -> Option<Font> {
    for path in paths {
        if let Ok(data) = std::fs::read(path)
            && let Ok(font) = Font::from_bytes(data, FontSettings::default())
        {
            log::debug!("loaded {label} font: {path}");
            return Some(font);
        }
    }
    None
}

/// Sum per-character advance widths.
///
/// Uses `Font::metrics()` instead of `Font::rasterize()` to avoid
/// generating bitmaps when only measurements are needed.
fn line_width(font: &Font, text: &str, size: f32) -> f32 {
    text.chars()
        .filter(|ch| !ch.is_control())
        .map(|ch| font.metrics(ch, size).advance_width)
        .sum()
}

impl TextShaper for FontdueShaper {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::cast_precision_loss
    )]
    fn shape(
        &self,
        text: &str,
        spec: &FontSpec,
        max_width: Option<f32>,
    ) -> PaintResult<ShapedText> {
        check_font_size(spec.size)?;
        let font = self.font(spec.face);
        let size = spec.size;
        let ascent = font
            .horizontal_line_metrics(size)
            .map_or(size * 0.8, |m| m.ascent);
        let line_height = size * LINE_HEIGHT_RATIO;

        let lines = wrap_lines(text, max_width, |line| line_width(font, line, size));
        let mut shaped = ShapedText {
            ascent,
            line_height,
            line_count: lines.len(),
            height: lines.len() as f32 * line_height,
            ..ShapedText::default()
        };

        for (row, line) in lines.iter().enumerate() {
            let baseline = -(row as f32).mul_add(line_height, ascent);
            let mut pen_x = 0.0_f32;
            for ch in line.chars().filter(|ch| !ch.is_control()) {
                let (metrics, coverage) = font.rasterize(ch, size);
                if metrics.width > 0 && metrics.height > 0 {
                    shaped.glyphs.push(ShapedGlyph {
                        x: pen_x.round() as i32 + metrics.xmin,
                        y: baseline.round() as i32 + metrics.ymin,
                        width: metrics.width as u32,
                        height: metrics.height as u32,
                        coverage,
                    });
                }
                pen_x += metrics.advance_width;
            }
            shaped.width = shaped.width.max(pen_x);
        }
        Ok(shaped)
    }

    fn measure(&self, text: &str, spec: &FontSpec) -> PaintResult<Size> {
        check_font_size(spec.size)?;
        let font = self.font(spec.face);
        Ok(Size::new(
            line_width(font, text, spec.size),
            spec.size * LINE_HEIGHT_RATIO,
        ))
    }
}
