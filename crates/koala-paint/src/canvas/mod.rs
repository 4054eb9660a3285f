//! Drawing surface abstraction.
//!
//! The painters never talk to a pixel buffer directly. They issue
//! [`Canvas`] calls, and each backend decides what a call means:
//! [`SkiaCanvas`] rasterizes with tiny-skia, [`RecordingCanvas`] records
//! the calls for inspection.
//!
//! State (`transform`, clip, alpha) is a stack. Every [`Canvas::save`] must
//! be balanced by one [`Canvas::restore`]; painters use
//! [`ScopedState`](crate::ScopedState) so that holds on every exit path.

mod recording;
mod skia;

pub use recording::{CanvasOp, RecordingCanvas};
pub use skia::SkiaCanvas;

use koala_common::image::LoadedImage;
use koala_common::{ColorValue, Point, Rect, Transform};

use crate::text::ShapedText;

/// How a line or rectangle outline is stroked.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    /// Line width in local units.
    pub width: f32,
    /// Stroke color.
    pub color: ColorValue,
    /// Alternating on/off lengths, starting with "on". Empty means solid.
    pub dash: Vec<f32>,
}

impl StrokeStyle {
    /// A solid stroke.
    #[must_use]
    pub const fn solid(width: f32, color: ColorValue) -> Self {
        Self {
            width,
            color,
            dash: Vec::new(),
        }
    }

    /// A dashed stroke with the given on/off pattern.
    #[must_use]
    pub fn dashed(width: f32, color: ColorValue, dash: Vec<f32>) -> Self {
        Self { width, color, dash }
    }
}

/// A 2D drawing surface with a state stack.
pub trait Canvas {
    /// Push a copy of the current state (transform, clip, alpha).
    fn save(&mut self);

    /// Pop the state pushed by the matching [`Canvas::save`]. Content drawn
    /// since a [`Canvas::begin_alpha`] at this level is composited here.
    fn restore(&mut self);

    /// Intersect the clip with `rect` in local coordinates.
    fn clip_rect(&mut self, rect: Rect);

    /// Apply `transform` before the current transform.
    fn concat(&mut self, transform: &Transform);

    /// The current local-to-device transform.
    fn transform(&self) -> Transform;

    /// Start a group whose content is blended with `opacity` when the
    /// current state is restored.
    fn begin_alpha(&mut self, opacity: f32);

    /// Fill `rect` with `color`.
    fn fill_rect(&mut self, rect: Rect, color: ColorValue);

    /// Stroke the outline of `rect`.
    fn stroke_rect(&mut self, rect: Rect, style: &StrokeStyle);

    /// Stroke a straight line.
    fn stroke_line(&mut self, from: Point, to: Point, style: &StrokeStyle);

    /// Draw `image` scaled to fill `dest`.
    fn draw_image(&mut self, image: &LoadedImage, dest: Rect);

    /// Draw shaped glyphs.
    ///
    /// Glyph geometry in `text` is y-up relative to `origin`. Coverage row 0
    /// is the visual top of a glyph and is always placed at the device-space
    /// top of the glyph's mapped rectangle.
    fn draw_glyphs(&mut self, origin: Point, text: &ShapedText, color: ColorValue);
}
