//! Element-specific content: replaced elements, form widgets, and anchor
//! decorations.

use koala_common::{ColorValue, Point, Rect};
use koala_tree::{ComputedStyle, DEFAULT_FONT_SIZE_PX, ElementData, RenderNode, TextDecoration};

use crate::canvas::StrokeStyle;
use crate::context::PaintContext;
use crate::error::PaintResult;
use crate::text::TextAlign;

use super::PaintEngine;

/// Horizontal padding between an input's edge and its text.
const INPUT_TEXT_INSET: f32 = 8.0;
const BUTTON_FALLBACK_LABEL: &str = "Button";
const CANVAS_LABEL: &str = "CANVAS";
const CANVAS_LABEL_SIZE: f32 = 12.0;
const PASSWORD_BULLET: char = '\u{2022}';

/// Dispatch on the element's lowercased tag.
pub(super) fn paint_element(
    engine: &PaintEngine,
    node: &RenderNode,
    element: &ElementData,
    ctx: &mut PaintContext<'_>,
) -> PaintResult<()> {
    let frame = node.frame;
    match element.local_name().as_str() {
        "img" => {
            if let Some(src) = element.attr("src") {
                engine.image_painter().paint_image(src, frame, ctx);
            }
            Ok(())
        }
        "hr" => {
            paint_rule(frame, ctx);
            Ok(())
        }
        "input" => paint_input(engine, node, element, ctx),
        "button" => paint_button(engine, node, element, ctx),
        "canvas" => paint_canvas_placeholder(engine, frame, ctx),
        _ => Ok(()),
    }
}

/// [§ 4.4.2 The hr element](https://html.spec.whatwg.org/multipage/grouping-content.html#the-hr-element)
fn paint_rule(frame: Rect, ctx: &mut PaintContext<'_>) {
    let y = frame.mid_y();
    ctx.canvas().stroke_line(
        Point::new(frame.min_x(), y),
        Point::new(frame.max_x(), y),
        &StrokeStyle::solid(1.0, ColorValue::GRAY),
    );
}

fn text_color(style: Option<&ComputedStyle>) -> ColorValue {
    style.map_or(ColorValue::BLACK, |s| s.color)
}

fn font_size(style: Option<&ComputedStyle>) -> f32 {
    style.map_or(DEFAULT_FONT_SIZE_PX, ComputedStyle::font_size_px)
}

/// The text an input shows and its color: the value when present (masked
/// for passwords), otherwise the placeholder in a lighter tone.
fn input_text(element: &ElementData, color: ColorValue) -> Option<(String, ColorValue)> {
    if let Some(value) = element.attr("value") {
        let is_password = element
            .attr("type")
            .is_some_and(|t| t.eq_ignore_ascii_case("password"));
        let shown = if is_password {
            std::iter::repeat_n(PASSWORD_BULLET, value.chars().count()).collect()
        } else {
            value.to_string()
        };
        return Some((shown, color));
    }
    element
        .attr("placeholder")
        .map(|p| (p.to_string(), ColorValue::DARK_GRAY))
}

/// [§ 4.10.5 The input element](https://html.spec.whatwg.org/multipage/input.html#the-input-element)
fn paint_input(
    engine: &PaintEngine,
    node: &RenderNode,
    element: &ElementData,
    ctx: &mut PaintContext<'_>,
) -> PaintResult<()> {
    let frame = node.frame;
    ctx.canvas().fill_rect(frame, ColorValue::WHITE);
    ctx.canvas()
        .stroke_rect(frame, &StrokeStyle::solid(1.0, ColorValue::GRAY));

    let style = node.style.as_deref();
    let Some((text, color)) = input_text(element, text_color(style)) else {
        return Ok(());
    };
    let text_frame = Rect::new(
        frame.min_x() + INPUT_TEXT_INSET,
        frame.min_y(),
        (frame.width - 2.0 * INPUT_TEXT_INSET).max(0.0),
        frame.height,
    );
    engine.text_painter().paint_simple_text(
        &text,
        font_size(style),
        color,
        text_frame,
        TextAlign::Left,
        ctx,
    )
}

/// [§ 4.10.6 The button element](https://html.spec.whatwg.org/multipage/form-elements.html#the-button-element)
fn paint_button(
    engine: &PaintEngine,
    node: &RenderNode,
    element: &ElementData,
    ctx: &mut PaintContext<'_>,
) -> PaintResult<()> {
    let frame = node.frame;
    ctx.canvas().fill_rect(frame, ColorValue::LIGHT_GRAY);
    ctx.canvas()
        .stroke_rect(frame, &StrokeStyle::solid(1.0, ColorValue::GRAY));

    let label = node
        .text_content
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .or_else(|| element.attr("value"))
        .unwrap_or(BUTTON_FALLBACK_LABEL);
    let style = node.style.as_deref();
    engine.text_painter().paint_simple_text(
        label,
        font_size(style),
        text_color(style),
        frame,
        TextAlign::Center,
        ctx,
    )
}

/// Scripted drawing is not supported; show where the canvas would be.
fn paint_canvas_placeholder(
    engine: &PaintEngine,
    frame: Rect,
    ctx: &mut PaintContext<'_>,
) -> PaintResult<()> {
    ctx.canvas().fill_rect(frame, ColorValue::LIGHT_GRAY);
    ctx.canvas()
        .stroke_rect(frame, &StrokeStyle::solid(1.0, ColorValue::GRAY));
    engine.text_painter().paint_simple_text(
        CANVAS_LABEL,
        CANVAS_LABEL_SIZE,
        ColorValue::GRAY,
        frame,
        TextAlign::Center,
        ctx,
    )
}

/// [§ 2.1 'text-decoration-line'](https://www.w3.org/TR/css-text-decor-3/#text-decoration-line-property)
///
/// One line across the whole frame in the text color.
pub(super) fn paint_text_decoration(
    style: &ComputedStyle,
    frame: Rect,
    ctx: &mut PaintContext<'_>,
) {
    let thickness = (style.font_size_px() / 16.0).max(1.0);
    let y = match style.text_decoration {
        TextDecoration::None => return,
        TextDecoration::Underline => frame.max_y() - thickness / 2.0,
        TextDecoration::Overline => frame.min_y() + thickness / 2.0,
        TextDecoration::LineThrough => frame.mid_y(),
    };
    ctx.canvas().stroke_line(
        Point::new(frame.min_x(), y),
        Point::new(frame.max_x(), y),
        &StrokeStyle::solid(thickness, style.color),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_text_prefers_value() {
        let element = ElementData::new("input")
            .with_attr("value", "hello")
            .with_attr("placeholder", "name");
        assert_eq!(
            input_text(&element, ColorValue::BLACK),
            Some(("hello".to_string(), ColorValue::BLACK))
        );
    }

    #[test]
    fn test_input_text_placeholder_is_lighter() {
        let element = ElementData::new("input").with_attr("placeholder", "name");
        assert_eq!(
            input_text(&element, ColorValue::BLACK),
            Some(("name".to_string(), ColorValue::DARK_GRAY))
        );
        assert_eq!(input_text(&ElementData::new("input"), ColorValue::BLACK), None);
    }

    #[test]
    fn test_password_is_masked() {
        let element = ElementData::new("input")
            .with_attr("type", "Password")
            .with_attr("value", "hunter2");
        let (shown, _) = input_text(&element, ColorValue::BLACK).unwrap();
        assert_eq!(shown, "\u{2022}".repeat(7));
    }
}
