//! Resolved style values.
//!
//! [CSS Backgrounds and Borders Level 3](https://www.w3.org/TR/css-backgrounds-3/)
//! [CSS Fonts Module Level 4](https://www.w3.org/TR/css-fonts-4/)
//!
//! These are computed values: the cascade has already run, so nothing here
//! inherits or cascades. Lengths that depend on the box being painted
//! (percentages, `em`) stay symbolic until paint resolves them.

use koala_common::ColorValue;

/// User agent default font size.
/// [§ 3.5 font-size](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
pub const DEFAULT_FONT_SIZE_PX: f32 = 16.0;

/// [§ 4.1 Lengths](https://www.w3.org/TR/css-values-4/#lengths)
/// "Lengths refer to distance measurements and are denoted by `<length>` in the
/// property definitions."
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LengthValue {
    /// [§ 6.1 Absolute lengths](https://www.w3.org/TR/css-values-4/#absolute-lengths)
    /// "1px = 1/96th of 1in"
    Px(f32),
    /// [§ 5.1.1 Font-relative lengths](https://www.w3.org/TR/css-values-4/#font-relative-lengths)
    /// "Equal to the computed value of the font-size property of the element"
    Em(f32),
    /// [§ 4.3 Percentages](https://www.w3.org/TR/css-values-4/#percentages)
    /// Resolved against a reference length supplied at paint time.
    Percent(f32),
}

impl Default for LengthValue {
    fn default() -> Self {
        Self::Px(0.0)
    }
}

impl LengthValue {
    /// Resolve to pixels. `em` multiplies `font_size`, percentages take a
    /// share of `percent_base`.
    ///
    /// Non-finite results resolve to `0.0`; callers decide what a negative
    /// length means for them.
    #[must_use]
    pub fn resolve(&self, font_size: f32, percent_base: f32) -> f32 {
        let px = match *self {
            Self::Px(px) => px,
            Self::Em(em) => em * font_size,
            Self::Percent(pct) => pct * percent_base / 100.0,
        };
        if px.is_finite() { px } else { 0.0 }
    }

    /// Parse `12px`, `1.5em`, `50%`, or a bare number (pixels).
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let lower = text.to_ascii_lowercase();
        if let Some(num) = lower.strip_suffix("px") {
            num.trim().parse().ok().map(Self::Px)
        } else if let Some(num) = lower.strip_suffix("em") {
            num.trim().parse().ok().map(Self::Em)
        } else if let Some(num) = lower.strip_suffix('%') {
            num.trim().parse().ok().map(Self::Percent)
        } else {
            lower.parse().ok().map(Self::Px)
        }
    }
}

/// [§ 4.2 'border-style'](https://www.w3.org/TR/css-backgrounds-3/#border-style)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BorderStyle {
    /// "No border. Color and width are ignored."
    #[default]
    None,
    /// "A single line segment."
    Solid,
    /// "A series of square-ended dashes."
    Dashed,
    /// "A series of round dots."
    Dotted,
    /// "Two parallel solid lines with some space between them."
    Double,
}

impl BorderStyle {
    /// Parse a `border-style` keyword. `hidden` paints like `none`.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "none" | "hidden" => Some(Self::None),
            "solid" => Some(Self::Solid),
            "dashed" => Some(Self::Dashed),
            "dotted" => Some(Self::Dotted),
            "double" => Some(Self::Double),
            _ => None,
        }
    }
}

/// One side of a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Top edge.
    Top,
    /// Right edge.
    Right,
    /// Bottom edge.
    Bottom,
    /// Left edge.
    Left,
}

impl Side {
    /// All sides in painting order.
    pub const ALL: [Self; 4] = [Self::Top, Self::Right, Self::Bottom, Self::Left];
}

/// [§ 4 Borders](https://www.w3.org/TR/css-backgrounds-3/#borders)
///
/// Width and style of one border edge. The color is shared by all four
/// edges (see [`ComputedStyle::border_color`]).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BorderEdge {
    /// [§ 4.3 'border-width'](https://www.w3.org/TR/css-backgrounds-3/#border-width)
    pub width: LengthValue,
    /// [§ 4.2 'border-style'](https://www.w3.org/TR/css-backgrounds-3/#border-style)
    pub style: BorderStyle,
}

impl BorderEdge {
    /// An edge with a pixel width.
    #[must_use]
    pub const fn new(width_px: f32, style: BorderStyle) -> Self {
        Self {
            width: LengthValue::Px(width_px),
            style,
        }
    }
}

/// [§ 3.2 'font-weight'](https://www.w3.org/TR/css-fonts-4/#font-weight-prop)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FontWeight {
    /// "Same as 400."
    #[default]
    Normal,
    /// "Same as 700."
    Bold,
    /// "Specifies a bolder weight than the inherited value."
    Bolder,
    /// "Specifies a lighter weight than the inherited value."
    Lighter,
    /// A numeric weight in `1..=1000`.
    Numeric(u16),
}

impl FontWeight {
    /// Parse a `font-weight` keyword or number.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim().to_ascii_lowercase();
        match text.as_str() {
            "normal" => Some(Self::Normal),
            "bold" => Some(Self::Bold),
            "bolder" => Some(Self::Bolder),
            "lighter" => Some(Self::Lighter),
            _ => text
                .parse::<u16>()
                .ok()
                .filter(|w| (1..=1000).contains(w))
                .map(Self::Numeric),
        }
    }
}

/// [§ 2.1 'text-decoration-line'](https://www.w3.org/TR/css-text-decor-3/#text-decoration-line-property)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextDecoration {
    /// "Neither produces nor inhibits text decoration."
    #[default]
    None,
    /// "Each line of text is underlined."
    Underline,
    /// "Each line of text has a line over it."
    Overline,
    /// "Each line of text has a line through the middle."
    LineThrough,
}

impl TextDecoration {
    /// Parse a `text-decoration-line` keyword.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "underline" => Some(Self::Underline),
            "overline" => Some(Self::Overline),
            "line-through" => Some(Self::LineThrough),
            _ => None,
        }
    }
}

/// Fully resolved style attached to a render node.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    /// [§ 3.2 'background-color'](https://www.w3.org/TR/css-backgrounds-3/#background-color)
    /// "The initial value is transparent."
    pub background_color: ColorValue,
    /// Top border edge.
    pub border_top: BorderEdge,
    /// Right border edge.
    pub border_right: BorderEdge,
    /// Bottom border edge.
    pub border_bottom: BorderEdge,
    /// Left border edge.
    pub border_left: BorderEdge,
    /// One color for all four border edges.
    pub border_color: ColorValue,
    /// Text color.
    pub color: ColorValue,
    /// [§ 3.5 'font-size'](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
    pub font_size: LengthValue,
    /// [§ 3.2 'font-weight'](https://www.w3.org/TR/css-fonts-4/#font-weight-prop)
    pub font_weight: FontWeight,
    /// [§ 2.1 'text-decoration-line'](https://www.w3.org/TR/css-text-decor-3/#text-decoration-line-property)
    pub text_decoration: TextDecoration,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            background_color: ColorValue::TRANSPARENT,
            border_top: BorderEdge::default(),
            border_right: BorderEdge::default(),
            border_bottom: BorderEdge::default(),
            border_left: BorderEdge::default(),
            border_color: ColorValue::BLACK,
            color: ColorValue::BLACK,
            font_size: LengthValue::Px(DEFAULT_FONT_SIZE_PX),
            font_weight: FontWeight::Normal,
            text_decoration: TextDecoration::None,
        }
    }
}

impl ComputedStyle {
    /// The border edge on `side`.
    #[must_use]
    pub const fn border(&self, side: Side) -> &BorderEdge {
        match side {
            Side::Top => &self.border_top,
            Side::Right => &self.border_right,
            Side::Bottom => &self.border_bottom,
            Side::Left => &self.border_left,
        }
    }

    /// Set the same edge on all four sides.
    pub fn set_all_borders(&mut self, edge: BorderEdge) {
        self.border_top = edge;
        self.border_right = edge;
        self.border_bottom = edge;
        self.border_left = edge;
    }

    /// Font size in pixels.
    ///
    /// `em` and percentages resolve against the UA default, since the
    /// parent's size is no longer known after the cascade. Non-positive
    /// sizes fall back to the default too.
    #[must_use]
    pub fn font_size_px(&self) -> f32 {
        let px = self
            .font_size
            .resolve(DEFAULT_FONT_SIZE_PX, DEFAULT_FONT_SIZE_PX);
        if px > 0.0 { px } else { DEFAULT_FONT_SIZE_PX }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_parse() {
        assert_eq!(LengthValue::parse("2px"), Some(LengthValue::Px(2.0)));
        assert_eq!(LengthValue::parse(" 1.5EM "), Some(LengthValue::Em(1.5)));
        assert_eq!(LengthValue::parse("10%"), Some(LengthValue::Percent(10.0)));
        assert_eq!(LengthValue::parse("3"), Some(LengthValue::Px(3.0)));
        assert_eq!(LengthValue::parse("thick"), None);
    }

    #[test]
    fn test_length_resolve() {
        assert!((LengthValue::Em(2.0).resolve(10.0, 0.0) - 20.0).abs() < f32::EPSILON);
        assert!((LengthValue::Percent(10.0).resolve(16.0, 200.0) - 20.0).abs() < f32::EPSILON);
        assert!(LengthValue::Px(f32::NAN).resolve(16.0, 0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_font_weight_parse() {
        assert_eq!(FontWeight::parse("bold"), Some(FontWeight::Bold));
        assert_eq!(FontWeight::parse("300"), Some(FontWeight::Numeric(300)));
        assert_eq!(FontWeight::parse("0"), None);
    }

    #[test]
    fn test_font_size_px_falls_back_to_default() {
        let style = ComputedStyle {
            font_size: LengthValue::Px(-4.0),
            ..ComputedStyle::default()
        };
        assert!((style.font_size_px() - DEFAULT_FONT_SIZE_PX).abs() < f32::EPSILON);
    }
}
