use super::{FontSpec, ShapedGlyph, ShapedText, TextShaper, check_font_size, wrap_lines};
use crate::error::{PaintError, PaintResult};

const CHAR_WIDTH_RATIO: f32 = 0.6;
const LINE_HEIGHT_RATIO: f32 = 1.2;
const ASCENT_RATIO: f32 = 0.8;

/// Shaper with fixed-ratio metrics and box glyphs.
///
/// [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
///
/// Every character advances 0.6× the font size and lines are 1.2× apart,
/// so measurements are deterministic and need no font files. Visible
/// characters are drawn as solid boxes sitting on the baseline.
///
/// This is used as a fallback when no font is available, and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateShaper;

impl ApproximateShaper {
    #[allow(clippy::cast_precision_loss)]
    fn line_width(text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * CHAR_WIDTH_RATIO
    }
}

impl TextShaper for ApproximateShaper {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn shape(
        &self,
        text: &str,
        font: &FontSpec,
        max_width: Option<f32>,
    ) -> PaintResult<ShapedText> {
        check_font_size(font.size)?;
        let size = font.size;
        let advance = size * CHAR_WIDTH_RATIO;
        let ascent = size * ASCENT_RATIO;
        let line_height = size * LINE_HEIGHT_RATIO;
        let glyph_width = (size * 0.5).round().max(1.0) as u32;
        let glyph_height = (size * 0.7).round().max(1.0) as u32;
        let glyph_area = (glyph_width as usize)
            .checked_mul(glyph_height as usize)
            .ok_or_else(|| PaintError::TextRendering(format!("glyph too large at {size}px")))?;

        let lines = wrap_lines(text, max_width, |line| Self::line_width(line, size));
        let mut shaped = ShapedText {
            ascent,
            line_height,
            line_count: lines.len(),
            height: lines.len() as f32 * line_height,
            ..ShapedText::default()
        };

        for (row, line) in lines.iter().enumerate() {
            shaped.width = shaped.width.max(Self::line_width(line, size));
            let baseline = -(row as f32).mul_add(line_height, ascent);
            for (col, ch) in line.chars().enumerate() {
                if ch.is_whitespace() || ch.is_control() {
                    continue;
                }
                shaped.glyphs.push(ShapedGlyph {
                    x: (col as f32 * advance).round() as i32,
                    y: baseline.round() as i32,
                    width: glyph_width,
                    height: glyph_height,
                    coverage: vec![255; glyph_area],
                });
            }
        }
        Ok(shaped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_uses_fixed_ratios() {
        let size = ApproximateShaper
            .measure("Hello", &FontSpec::regular(10.0))
            .unwrap();
        assert!((size.width - 30.0).abs() < 1e-4);
        assert!((size.height - 12.0).abs() < 1e-4);
    }

    #[test]
    fn test_shape_wraps_and_skips_spaces() {
        let shaped = ApproximateShaper
            .shape("ab cd", &FontSpec::regular(10.0), Some(20.0))
            .unwrap();
        assert_eq!(shaped.line_count, 2);
        assert_eq!(shaped.glyphs.len(), 4);
        // second line's glyphs sit one line lower
        assert_eq!(shaped.glyphs[0].y, -8);
        assert_eq!(shaped.glyphs[2].y, -20);
    }

    #[test]
    fn test_huge_font_size_is_an_error() {
        let result = ApproximateShaper.shape("a", &FontSpec::regular(200_000.0), None);
        assert!(matches!(result, Err(PaintError::TextRendering(_))));
        assert!(ApproximateShaper.measure("a", &FontSpec::regular(f32::NAN)).is_err());
    }
}
