//! Property tests for the geometric laws of painting.

use std::sync::Arc;

use koala_common::{ColorValue, Rect, Size};
use koala_paint::text::aligned_origin;
use koala_paint::{
    ApproximateShaper, PaintContext, PaintEngine, RecordingCanvas, TextAlign, edge_strokes,
};
use koala_tree::{BorderStyle, ComputedStyle, ElementData, RenderNode, RenderTree, Side};
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;

/// Map an arbitrary integer to a length in `[0, 500)` with a fractional part.
fn length(raw: u16) -> f32 {
    f32::from(raw % 5000) / 10.0
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() <= 1e-3 * a.abs().max(b.abs()).max(1.0)
}

// ========== borders ==========

#[quickcheck]
fn prop_double_border_covers_width(raw: u16, side_index: u8) -> TestResult {
    let width = length(raw);
    if width <= 0.0 {
        return TestResult::discard();
    }
    let side = Side::ALL[usize::from(side_index % 4)];
    let frame = Rect::new(0.0, 0.0, 1000.0, 1000.0);
    let strokes = edge_strokes(frame, side, width, BorderStyle::Double);
    if strokes.len() != 2 {
        return TestResult::failed();
    }

    // Distance of each stroke's centerline from the edge it belongs to.
    let inset = |i: usize| match side {
        Side::Top => strokes[i].from.y - frame.min_y(),
        Side::Bottom => frame.max_y() - strokes[i].from.y,
        Side::Left => strokes[i].from.x - frame.min_x(),
        Side::Right => frame.max_x() - strokes[i].from.x,
    };
    let line = width / 3.0;
    let outer_edge = inset(0) - strokes[0].width / 2.0;
    let inner_edge = inset(1) + strokes[1].width / 2.0;
    let gap = (inset(1) - strokes[1].width / 2.0) - (inset(0) + strokes[0].width / 2.0);

    TestResult::from_bool(
        close(strokes[0].width, line)
            && close(strokes[1].width, line)
            && close(gap, line)
            && close(outer_edge, 0.0)
            && close(inner_edge - outer_edge, width),
    )
}

#[quickcheck]
fn prop_single_border_inset_by_half_width(raw: u16) -> TestResult {
    let width = length(raw);
    if width <= 0.0 {
        return TestResult::discard();
    }
    let frame = Rect::new(0.0, 0.0, 1000.0, 1000.0);
    let strokes = edge_strokes(frame, Side::Top, width, BorderStyle::Solid);
    TestResult::from_bool(strokes.len() == 1 && close(strokes[0].from.y, width / 2.0))
}

#[quickcheck]
fn prop_non_positive_width_draws_nothing(raw: u16) -> bool {
    let width = -length(raw);
    let frame = Rect::new(0.0, 0.0, 100.0, 100.0);
    [BorderStyle::Solid, BorderStyle::Double, BorderStyle::Dashed]
        .into_iter()
        .all(|style| edge_strokes(frame, Side::Left, width, style).is_empty())
}

// ========== alignment ==========

#[quickcheck]
fn prop_alignment(x: i16, y: i16, w: u16, h: u16, tw: u16, th: u16) -> bool {
    let frame = Rect::new(f32::from(x), f32::from(y), length(w), length(h));
    let size = Size::new(length(tw), length(th));

    let left = aligned_origin(frame, size, TextAlign::Left);
    let center = aligned_origin(frame, size, TextAlign::Center);
    let right = aligned_origin(frame, size, TextAlign::Right);

    close(left.x, frame.min_x())
        && close(center.x, frame.mid_x() - size.width / 2.0)
        && close(right.x, frame.max_x() - size.width)
        && [left, center, right]
            .iter()
            .all(|p| close(p.y, frame.mid_y() - size.height / 2.0))
}

// ========== degenerate frames ==========

#[quickcheck]
fn prop_zero_area_frame_paints_nothing(x: i16, y: i16, w: i16, tag_index: u8) -> TestResult {
    if w > 0 {
        return TestResult::discard();
    }
    let tags = ["div", "html", "button", "input", "canvas", "hr", "img"];
    let tag = tags[usize::from(tag_index) % tags.len()];
    let style = Arc::new(ComputedStyle {
        background_color: ColorValue::BLACK,
        ..ComputedStyle::default()
    });
    let frame = Rect::new(f32::from(x), f32::from(y), f32::from(w), 40.0);

    let mut tree = RenderTree::new();
    let root = tree.alloc(RenderNode::element(ElementData::new(tag), frame).with_style(style));
    let mut canvas = RecordingCanvas::new();
    let ok = {
        let mut ctx = PaintContext::new(&mut canvas, Rect::new(0.0, 0.0, 100.0, 100.0));
        PaintEngine::new(Arc::new(ApproximateShaper)).paint(&mut tree, root, &mut ctx)
    };
    TestResult::from_bool(ok && canvas.ops().is_empty())
}
