//! Border painting.
//!
//! [CSS Backgrounds and Borders § 4](https://www.w3.org/TR/css-backgrounds-3/#borders)
//!
//! Each edge is drawn as one or two straight strokes along the inside of
//! the frame. Corners are not joined or mitred; adjacent edges simply
//! overlap there.

use koala_common::{Point, Rect};
use koala_tree::{BorderStyle, ComputedStyle, Side};

use crate::canvas::StrokeStyle;
use crate::context::PaintContext;

/// One stroke of a border edge, in the frame's coordinate space.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeStroke {
    /// Start of the centerline.
    pub from: Point,
    /// End of the centerline.
    pub to: Point,
    /// Stroke width.
    pub width: f32,
    /// Dash pattern, empty for solid lines.
    pub dash: Vec<f32>,
}

/// Resolve the used width of one edge.
///
/// `em` resolves against the style's font size, percentages against the
/// frame width. Negative and non-finite results clamp to zero.
#[must_use]
pub fn resolved_width(style: &ComputedStyle, side: Side, frame: Rect) -> f32 {
    let px = style
        .border(side)
        .width
        .resolve(style.font_size_px(), frame.width);
    if px.is_finite() { px.max(0.0) } else { 0.0 }
}

/// A centerline parallel to `side`, `inset` in from that edge of `frame`.
fn centerline(frame: Rect, side: Side, inset: f32) -> (Point, Point) {
    match side {
        Side::Top => {
            let y = frame.min_y() + inset;
            (Point::new(frame.min_x(), y), Point::new(frame.max_x(), y))
        }
        Side::Bottom => {
            let y = frame.max_y() - inset;
            (Point::new(frame.min_x(), y), Point::new(frame.max_x(), y))
        }
        Side::Left => {
            let x = frame.min_x() + inset;
            (Point::new(x, frame.min_y()), Point::new(x, frame.max_y()))
        }
        Side::Right => {
            let x = frame.max_x() - inset;
            (Point::new(x, frame.min_y()), Point::new(x, frame.max_y()))
        }
    }
}

/// The strokes that draw one edge of width `width` and `style`.
///
/// - solid: one stroke of `width`, centered `width / 2` inside the edge.
/// - dashed: the same line with a `[3w, 2w]` pattern.
/// - dotted: the same line with a `[w, w]` pattern.
/// - double: two strokes of `w / 3` separated by a `w / 3` gap, so that
///   stroke + gap + stroke covers exactly `w`.
#[must_use]
pub fn edge_strokes(frame: Rect, side: Side, width: f32, style: BorderStyle) -> Vec<EdgeStroke> {
    if width.is_nan() || width <= 0.0 {
        return Vec::new();
    }
    let single = |dash: Vec<f32>| {
        let (from, to) = centerline(frame, side, width / 2.0);
        vec![EdgeStroke {
            from,
            to,
            width,
            dash,
        }]
    };
    match style {
        BorderStyle::None => Vec::new(),
        BorderStyle::Solid => single(Vec::new()),
        BorderStyle::Dashed => single(vec![3.0 * width, 2.0 * width]),
        BorderStyle::Dotted => single(vec![width, width]),
        BorderStyle::Double => {
            let line = width / 3.0;
            [line / 2.0, width - line / 2.0]
                .into_iter()
                .map(|inset| {
                    let (from, to) = centerline(frame, side, inset);
                    EdgeStroke {
                        from,
                        to,
                        width: line,
                        dash: Vec::new(),
                    }
                })
                .collect()
        }
    }
}

/// Draws the four border edges of a box.
#[derive(Debug, Clone, Copy, Default)]
pub struct BorderPainter;

impl BorderPainter {
    /// Paint every visible edge of `style` around `frame`.
    pub fn paint_borders(&self, style: &ComputedStyle, frame: Rect, ctx: &mut PaintContext<'_>) {
        for side in Side::ALL {
            let width = resolved_width(style, side, frame);
            let edge_style = style.border(side).style;
            for stroke in edge_strokes(frame, side, width, edge_style) {
                let stroke_style = StrokeStyle::dashed(stroke.width, style.border_color, stroke.dash);
                ctx.canvas().stroke_line(stroke.from, stroke.to, &stroke_style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use koala_tree::{BorderEdge, LengthValue};

    #[test]
    fn test_solid_top_edge_centerline() {
        let frame = Rect::new(0.0, 0.0, 100.0, 50.0);
        let strokes = edge_strokes(frame, Side::Top, 4.0, BorderStyle::Solid);
        assert_eq!(strokes.len(), 1);
        assert_eq!(strokes[0].from, Point::new(0.0, 2.0));
        assert_eq!(strokes[0].to, Point::new(100.0, 2.0));
        assert!(strokes[0].dash.is_empty());
    }

    #[test]
    fn test_dash_patterns() {
        let frame = Rect::new(0.0, 0.0, 100.0, 50.0);
        let dashed = edge_strokes(frame, Side::Left, 2.0, BorderStyle::Dashed);
        assert_eq!(dashed[0].dash, vec![6.0, 4.0]);
        let dotted = edge_strokes(frame, Side::Left, 2.0, BorderStyle::Dotted);
        assert_eq!(dotted[0].dash, vec![2.0, 2.0]);
    }

    #[test]
    fn test_double_right_edge() {
        let frame = Rect::new(0.0, 0.0, 100.0, 50.0);
        let strokes = edge_strokes(frame, Side::Right, 9.0, BorderStyle::Double);
        assert_eq!(strokes.len(), 2);
        assert!((strokes[0].from.x - 98.5).abs() < 1e-4);
        assert!((strokes[1].from.x - 92.5).abs() < 1e-4);
        assert!((strokes[0].width - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_resolved_width_units() {
        let frame = Rect::new(0.0, 0.0, 200.0, 50.0);
        let mut style = ComputedStyle {
            font_size: LengthValue::Px(10.0),
            ..ComputedStyle::default()
        };
        style.border_top.width = LengthValue::Percent(5.0);
        style.border_left.width = LengthValue::Em(0.5);
        style.border_right = BorderEdge::new(-3.0, BorderStyle::Solid);
        assert!((resolved_width(&style, Side::Top, frame) - 10.0).abs() < 1e-4);
        assert!((resolved_width(&style, Side::Left, frame) - 5.0).abs() < 1e-4);
        assert!(resolved_width(&style, Side::Right, frame).abs() < f32::EPSILON);
    }
}
