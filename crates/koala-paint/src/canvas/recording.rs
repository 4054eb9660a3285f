//! A canvas that records calls instead of drawing.

use koala_common::image::LoadedImage;
use koala_common::{ColorValue, Point, Rect, Transform};

use super::{Canvas, StrokeStyle};
use crate::text::ShapedText;

/// One recorded canvas call. Drawing calls carry the transform in force.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasOp {
    /// [`Canvas::save`].
    Save,
    /// [`Canvas::restore`].
    Restore,
    /// [`Canvas::clip_rect`].
    ClipRect {
        /// Local clip rectangle.
        rect: Rect,
        /// Transform in force.
        transform: Transform,
    },
    /// [`Canvas::concat`].
    Concat(Transform),
    /// [`Canvas::begin_alpha`].
    BeginAlpha(f32),
    /// [`Canvas::fill_rect`].
    FillRect {
        /// Local rectangle.
        rect: Rect,
        /// Fill color.
        color: ColorValue,
        /// Transform in force.
        transform: Transform,
    },
    /// [`Canvas::stroke_rect`].
    StrokeRect {
        /// Local rectangle.
        rect: Rect,
        /// Stroke parameters.
        style: StrokeStyle,
        /// Transform in force.
        transform: Transform,
    },
    /// [`Canvas::stroke_line`].
    StrokeLine {
        /// Local start point.
        from: Point,
        /// Local end point.
        to: Point,
        /// Stroke parameters.
        style: StrokeStyle,
        /// Transform in force.
        transform: Transform,
    },
    /// [`Canvas::draw_image`].
    DrawImage {
        /// Intrinsic image size.
        image_size: (u32, u32),
        /// Local destination rectangle.
        dest: Rect,
        /// Transform in force.
        transform: Transform,
    },
    /// [`Canvas::draw_glyphs`].
    DrawGlyphs {
        /// Device-space bounds of the whole text block.
        bounds: Rect,
        /// Text color.
        color: ColorValue,
        /// Number of glyphs drawn.
        glyph_count: usize,
    },
}

impl CanvasOp {
    /// Whether this call puts pixels on the surface.
    #[must_use]
    pub const fn is_drawing(&self) -> bool {
        matches!(
            self,
            Self::FillRect { .. }
                | Self::StrokeRect { .. }
                | Self::StrokeLine { .. }
                | Self::DrawImage { .. }
                | Self::DrawGlyphs { .. }
        )
    }

    /// Device-space bounds of a fill, stroke centerline, image, or text.
    #[must_use]
    pub fn device_bounds(&self) -> Option<Rect> {
        match self {
            Self::FillRect {
                rect, transform, ..
            }
            | Self::StrokeRect {
                rect, transform, ..
            }
            | Self::DrawImage {
                dest: rect,
                transform,
                ..
            } => Some(transform.map_rect(rect)),
            Self::StrokeLine {
                from, to, transform, ..
            } => {
                let (a, b) = (transform.map_point(*from), transform.map_point(*to));
                Some(Rect::from_ltrb(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y)))
            }
            Self::DrawGlyphs { bounds, .. } => Some(*bounds),
            _ => None,
        }
    }
}

/// Records every call for later inspection.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    ops: Vec<CanvasOp>,
    transforms: Vec<Transform>,
    current: Transform,
}

impl RecordingCanvas {
    /// An empty recording with the identity transform.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far.
    #[must_use]
    pub fn ops(&self) -> &[CanvasOp] {
        &self.ops
    }

    /// Only the calls that draw.
    pub fn drawing_ops(&self) -> impl Iterator<Item = &CanvasOp> {
        self.ops.iter().filter(|op| op.is_drawing())
    }

    /// Number of outstanding saves.
    #[must_use]
    pub fn save_depth(&self) -> usize {
        self.transforms.len()
    }

    /// Forget recorded calls; the state stack is kept.
    pub fn clear(&mut self) {
        self.ops.clear();
    }
}

impl Canvas for RecordingCanvas {
    fn save(&mut self) {
        self.transforms.push(self.current);
        self.ops.push(CanvasOp::Save);
    }

    fn restore(&mut self) {
        if let Some(transform) = self.transforms.pop() {
            self.current = transform;
        }
        self.ops.push(CanvasOp::Restore);
    }

    fn clip_rect(&mut self, rect: Rect) {
        self.ops.push(CanvasOp::ClipRect {
            rect,
            transform: self.current,
        });
    }

    fn concat(&mut self, transform: &Transform) {
        self.current = self.current.pre_concat(transform);
        self.ops.push(CanvasOp::Concat(*transform));
    }

    fn transform(&self) -> Transform {
        self.current
    }

    fn begin_alpha(&mut self, opacity: f32) {
        self.ops.push(CanvasOp::BeginAlpha(opacity));
    }

    fn fill_rect(&mut self, rect: Rect, color: ColorValue) {
        self.ops.push(CanvasOp::FillRect {
            rect,
            color,
            transform: self.current,
        });
    }

    fn stroke_rect(&mut self, rect: Rect, style: &StrokeStyle) {
        self.ops.push(CanvasOp::StrokeRect {
            rect,
            style: style.clone(),
            transform: self.current,
        });
    }

    fn stroke_line(&mut self, from: Point, to: Point, style: &StrokeStyle) {
        self.ops.push(CanvasOp::StrokeLine {
            from,
            to,
            style: style.clone(),
            transform: self.current,
        });
    }

    fn draw_image(&mut self, image: &LoadedImage, dest: Rect) {
        self.ops.push(CanvasOp::DrawImage {
            image_size: (image.width(), image.height()),
            dest,
            transform: self.current,
        });
    }

    fn draw_glyphs(&mut self, origin: Point, text: &ShapedText, color: ColorValue) {
        // y-up block: the top edge is at origin.y, the bottom below it.
        let local = Rect::new(origin.x, origin.y - text.height, text.width, text.height);
        self.ops.push(CanvasOp::DrawGlyphs {
            bounds: self.current.map_rect(&local),
            color,
            glyph_count: text.glyphs.len(),
        });
    }
}
