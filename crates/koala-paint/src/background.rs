//! Background painting.
//!
//! [§ 3.2 'background-color'](https://www.w3.org/TR/css-backgrounds-3/#background-color)

use koala_common::{ColorValue, Rect};

use crate::context::PaintContext;

/// Fills a node's border box with its background color.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackgroundPainter;

impl BackgroundPainter {
    /// Fill `frame` with `color`; transparent colors paint nothing.
    ///
    /// [§ 3.7 'background-clip'](https://www.w3.org/TR/css-backgrounds-3/#background-clip)
    /// "The initial value of 'background-clip' is 'border-box', meaning the
    /// background is painted within the border box."
    pub fn paint_background(&self, color: ColorValue, frame: Rect, ctx: &mut PaintContext<'_>) {
        if color.is_transparent() {
            return;
        }
        ctx.canvas().fill_rect(frame, color);
    }
}
