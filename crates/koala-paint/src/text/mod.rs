//! Text shaping contract and the text painter.
//!
//! [CSS Text Module Level 3](https://www.w3.org/TR/css-text-3/)
//!
//! A [`TextShaper`] turns a string and a [`FontSpec`] into positioned glyph
//! coverage. Shapers report geometry y-up (the way font files do), so the
//! [`TextPainter`] flips the frame locally before drawing and restores the
//! canvas state afterwards.

mod approximate;
mod fontdue_shaper;

pub use approximate::ApproximateShaper;
pub use fontdue_shaper::FontdueShaper;

use std::sync::Arc;

use koala_common::{ColorValue, Point, Rect, Size, Transform};
use koala_tree::{ComputedStyle, DEFAULT_FONT_SIZE_PX, FontWeight};

use crate::context::PaintContext;
use crate::error::{PaintError, PaintResult};

/// Largest font size a shaper will rasterize.
pub const MAX_FONT_SIZE: f32 = 4096.0;

/// Reject font sizes that are not finite, not positive, or above
/// [`MAX_FONT_SIZE`].
pub(crate) fn check_font_size(size: f32) -> PaintResult<()> {
    if size.is_finite() && size > 0.0 && size <= MAX_FONT_SIZE {
        Ok(())
    } else {
        Err(PaintError::TextRendering(format!("invalid font size {size}")))
    }
}

/// Which face of the family to shape with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FontFace {
    /// Weights 300 and below, and `lighter`.
    Light,
    /// Everything between.
    #[default]
    Regular,
    /// Weights 700 and above, `bold`, and `bolder`.
    Heavy,
}

impl FontFace {
    /// Bucket a computed `font-weight`.
    ///
    /// [§ 3.2 'font-weight'](https://www.w3.org/TR/css-fonts-4/#font-weight-prop)
    #[must_use]
    pub const fn for_weight(weight: FontWeight) -> Self {
        match weight {
            FontWeight::Bold | FontWeight::Bolder => Self::Heavy,
            FontWeight::Lighter => Self::Light,
            FontWeight::Numeric(w) if w >= 700 => Self::Heavy,
            FontWeight::Numeric(w) if w <= 300 => Self::Light,
            FontWeight::Normal | FontWeight::Numeric(_) => Self::Regular,
        }
    }
}

/// Font request passed to a shaper.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    /// Font size in pixels.
    pub size: f32,
    /// Face within the family.
    pub face: FontFace,
}

impl FontSpec {
    /// A font request.
    #[must_use]
    pub const fn new(size: f32, face: FontFace) -> Self {
        Self { size, face }
    }

    /// The regular face at `size`.
    #[must_use]
    pub const fn regular(size: f32) -> Self {
        Self::new(size, FontFace::Regular)
    }

    /// Font size and face from a computed style; defaults without one.
    #[must_use]
    pub fn from_style(style: Option<&ComputedStyle>) -> Self {
        style.map_or_else(
            || Self::regular(DEFAULT_FONT_SIZE_PX),
            |s| Self::new(s.font_size_px(), FontFace::for_weight(s.font_weight)),
        )
    }
}

/// One rasterized glyph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapedGlyph {
    /// Left edge relative to the text origin.
    pub x: i32,
    /// Bottom edge relative to the text origin, y-up.
    pub y: i32,
    /// Bitmap width.
    pub width: u32,
    /// Bitmap height.
    pub height: u32,
    /// `width * height` coverage values, row 0 at the top of the glyph.
    pub coverage: Vec<u8>,
}

/// A shaped block of text.
///
/// The origin is the top-left corner of the block in y-up space: glyphs sit
/// at negative `y`, the first baseline at `-ascent`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapedText {
    /// Visible glyphs; whitespace produces none.
    pub glyphs: Vec<ShapedGlyph>,
    /// Width of the widest line.
    pub width: f32,
    /// `line_count * line_height`.
    pub height: f32,
    /// Distance from the top of a line to its baseline.
    pub ascent: f32,
    /// Distance between consecutive baselines.
    pub line_height: f32,
    /// Number of lines after wrapping.
    pub line_count: usize,
}

impl ShapedText {
    /// Bounding size of the block.
    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// A text shaping and rasterization backend.
pub trait TextShaper: Send + Sync {
    /// Shape `text`, wrapping at `max_width` when given.
    ///
    /// # Errors
    ///
    /// Returns [`PaintError::TextRendering`](crate::PaintError::TextRendering)
    /// when the backend cannot shape the text.
    fn shape(&self, text: &str, font: &FontSpec, max_width: Option<f32>)
    -> PaintResult<ShapedText>;

    /// Measure a single unwrapped line.
    ///
    /// # Errors
    ///
    /// Same as [`TextShaper::shape`].
    fn measure(&self, text: &str, font: &FontSpec) -> PaintResult<Size> {
        self.shape(text, font, None).map(|shaped| shaped.size())
    }
}

/// Break `text` into lines no wider than `max_width`.
///
/// Greedy: words are added to the current line until the next one would
/// overflow. A single word wider than the limit gets a line of its own.
/// Explicit newlines always break.
pub(crate) fn wrap_lines(
    text: &str,
    max_width: Option<f32>,
    measure: impl Fn(&str) -> f32,
) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let Some(limit) = max_width else {
            lines.push(paragraph.to_string());
            continue;
        };
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{current} {word}");
            if measure(&candidate) > limit {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            } else {
                current = candidate;
            }
        }
        lines.push(current);
    }
    lines
}

/// Horizontal placement for single-line text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAlign {
    /// Flush with the frame's left edge.
    #[default]
    Left,
    /// Centered on the frame's horizontal midpoint.
    Center,
    /// Flush with the frame's right edge.
    Right,
}

/// Top-left corner of a `size` block placed in `frame` with `align`.
///
/// The block is always centered vertically.
#[must_use]
pub fn aligned_origin(frame: Rect, size: Size, align: TextAlign) -> Point {
    let x = match align {
        TextAlign::Left => frame.min_x(),
        TextAlign::Center => frame.mid_x() - size.width / 2.0,
        TextAlign::Right => frame.max_x() - size.width,
    };
    Point::new(x, frame.mid_y() - size.height / 2.0)
}

/// Flip about the horizontal center line of `frame`.
fn flip_about(frame: Rect) -> Transform {
    Transform::translate(0.0, frame.min_y() + frame.max_y()).pre_concat(&Transform::scale(1.0, -1.0))
}

/// Draws text through a [`TextShaper`].
#[derive(Clone)]
pub struct TextPainter {
    shaper: Arc<dyn TextShaper>,
}

impl TextPainter {
    /// A painter shaping with `shaper`.
    #[must_use]
    pub fn new(shaper: Arc<dyn TextShaper>) -> Self {
        Self { shaper }
    }

    /// The shaping backend.
    #[must_use]
    pub fn shaper(&self) -> &dyn TextShaper {
        self.shaper.as_ref()
    }

    /// Paint a paragraph wrapped to `frame.width`, starting at the top of
    /// the frame.
    ///
    /// Whitespace-only text paints nothing.
    ///
    /// # Errors
    ///
    /// Propagates shaping failures.
    pub fn paint_text(
        &self,
        text: &str,
        style: Option<&ComputedStyle>,
        frame: Rect,
        ctx: &mut PaintContext<'_>,
    ) -> PaintResult<()> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let font = FontSpec::from_style(style);
        let color = style.map_or(ColorValue::BLACK, |s| s.color);
        let shaped = self.shaper.shape(text, &font, Some(frame.width))?;
        Self::draw_flipped(&shaped, Point::new(frame.min_x(), frame.min_y()), frame, color, ctx);
        Ok(())
    }

    /// Paint one line of text aligned inside `frame`.
    ///
    /// Used for widget labels and placeholders. Whitespace-only text paints
    /// nothing, like [`TextPainter::paint_text`].
    ///
    /// # Errors
    ///
    /// Propagates shaping failures.
    pub fn paint_simple_text(
        &self,
        text: &str,
        font_size: f32,
        color: ColorValue,
        frame: Rect,
        align: TextAlign,
        ctx: &mut PaintContext<'_>,
    ) -> PaintResult<()> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let shaped = self
            .shaper
            .shape(text, &FontSpec::regular(font_size), None)?;
        let top_left = aligned_origin(frame, shaped.size(), align);
        Self::draw_flipped(&shaped, top_left, frame, color, ctx);
        Ok(())
    }

    /// Draw `shaped` with its top-left corner at `top_left` (y-down), inside
    /// a flip about `frame`.
    fn draw_flipped(
        shaped: &ShapedText,
        top_left: Point,
        frame: Rect,
        color: ColorValue,
        ctx: &mut PaintContext<'_>,
    ) {
        let mut scope = ctx.scoped();
        scope.canvas().concat(&flip_about(frame));
        // In the flipped space the block's top edge sits at the mirrored y.
        let origin = Point::new(top_left.x, frame.min_y() + frame.max_y() - top_left.y);
        scope.canvas().draw_glyphs(origin, shaped, color);
    }
}
