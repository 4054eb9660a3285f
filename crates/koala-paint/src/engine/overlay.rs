//! Debug overlay: box outlines and tag labels drawn over painted nodes.

use koala_common::{ColorValue, Rect};
use koala_tree::RenderNode;

use crate::canvas::StrokeStyle;
use crate::context::PaintContext;
use crate::text::{TextAlign, TextPainter};

const FRAME_COLOR: ColorValue = ColorValue::rgba(255, 0, 0, 160);
const CONTENT_COLOR: ColorValue = ColorValue::rgba(0, 0, 255, 160);
const LABEL_COLOR: ColorValue = ColorValue::rgb(200, 0, 0);
const LABEL_FONT_SIZE: f32 = 10.0;
/// Frames must exceed this to get a tag label.
const LABEL_MIN_SIZE: (f32, f32) = (100.0, 20.0);

/// Outline the frame, the content box when it differs, and label larger
/// frames with their tag. Failures here are logged and dropped.
pub(super) fn paint_debug_overlay(node: &RenderNode, text: &TextPainter, ctx: &mut PaintContext<'_>) {
    let frame = node.frame;
    ctx.canvas()
        .stroke_rect(frame, &StrokeStyle::solid(1.0, FRAME_COLOR));
    if let Some(content) = node.content_box.filter(|c| *c != frame) {
        ctx.canvas()
            .stroke_rect(content, &StrokeStyle::solid(1.0, CONTENT_COLOR));
    }

    let (min_w, min_h) = LABEL_MIN_SIZE;
    if frame.width <= min_w || frame.height <= min_h {
        return;
    }
    let label = node.tag_name().unwrap_or_else(|| "#text".to_string());
    let label_frame = Rect::new(frame.min_x() + 2.0, frame.min_y() + 2.0, frame.width - 4.0, 12.0);
    if let Err(e) =
        text.paint_simple_text(&label, LABEL_FONT_SIZE, LABEL_COLOR, label_frame, TextAlign::Left, ctx)
    {
        log::debug!("debug label for <{label}> not drawn: {e}");
    }
}
