//! sRGB colors and parsing
//!
//! [CSS Color Level 4](https://www.w3.org/TR/css-color-4/)

/// [§ 4 Color syntax](https://www.w3.org/TR/css-color-4/#color-syntax)
/// sRGB color represented as RGBA components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorValue {
    /// "the red color channel" (0-255)
    pub r: u8,
    /// "the green color channel" (0-255)
    pub g: u8,
    /// "the blue color channel" (0-255)
    pub b: u8,
    /// "the alpha channel" (0-255, 255 = fully opaque)
    pub a: u8,
}

impl ColorValue {
    /// Black (#000000)
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// White (#ffffff)
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Gray (#808080), the CSS `gray` keyword.
    pub const GRAY: Self = Self::rgb(128, 128, 128);

    /// Dark gray (#a9a9a9), the CSS `darkgray` keyword. Lighter than `gray`.
    pub const DARK_GRAY: Self = Self::rgb(169, 169, 169);

    /// Light gray (#d3d3d3), the CSS `lightgray` keyword.
    pub const LIGHT_GRAY: Self = Self::rgb(211, 211, 211);

    /// [§ 6.2 The transparent keyword](https://www.w3.org/TR/css-color-4/#transparent-color)
    /// "transparent black"
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    /// An opaque color from its channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// A color from its channels including alpha.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// A fully transparent color paints nothing, whatever its RGB channels.
    #[must_use]
    pub const fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// [§ 4.2 The RGB hexadecimal notations](https://www.w3.org/TR/css-color-4/#hex-notation)
    /// "The syntax of a <hex-color> is a <hash-token> token whose value consists of
    /// 3, 4, 6, or 8 hexadecimal digits."
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return None;
        }
        let short = |i: usize| u8::from_str_radix(&hex[i..=i].repeat(2), 16).ok();
        let long = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            // [§ 4.2.1]
            // "The three-digit RGB notation (#RGB) is converted into six-digit form (#RRGGBB)
            // by replicating digits, not by adding zeros."
            3 => Some(Self::rgb(short(0)?, short(1)?, short(2)?)),
            4 => Some(Self::rgba(short(0)?, short(1)?, short(2)?, short(3)?)),
            6 => Some(Self::rgb(long(0)?, long(2)?, long(4)?)),
            8 => Some(Self::rgba(long(0)?, long(2)?, long(4)?, long(6)?)),
            _ => None,
        }
    }

    /// [§ 6.1 Named Colors](https://www.w3.org/TR/css-color-4/#named-colors)
    /// "CSS defines a large set of named colors..."
    #[must_use]
    pub fn from_named(name: &str) -> Option<Self> {
        // MVP: the basic 16 HTML colors plus the grays used by form controls
        let color = match name.to_ascii_lowercase().as_str() {
            "transparent" => Self::TRANSPARENT,
            "black" => Self::BLACK,
            "white" => Self::WHITE,
            "gray" | "grey" => Self::GRAY,
            "darkgray" | "darkgrey" => Self::DARK_GRAY,
            "lightgray" | "lightgrey" => Self::LIGHT_GRAY,
            "silver" => Self::rgb(192, 192, 192),
            "red" => Self::rgb(255, 0, 0),
            "maroon" => Self::rgb(128, 0, 0),
            "green" => Self::rgb(0, 128, 0),
            "lime" => Self::rgb(0, 255, 0),
            "blue" => Self::rgb(0, 0, 255),
            "navy" => Self::rgb(0, 0, 128),
            "yellow" => Self::rgb(255, 255, 0),
            "olive" => Self::rgb(128, 128, 0),
            "aqua" | "cyan" => Self::rgb(0, 255, 255),
            "teal" => Self::rgb(0, 128, 128),
            "fuchsia" | "magenta" => Self::rgb(255, 0, 255),
            "purple" => Self::rgb(128, 0, 128),
            _ => return None,
        };
        Some(color)
    }

    /// Parse either a `#hex` color or a named color.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.starts_with('#') {
            Self::from_hex(text)
        } else {
            Self::from_named(text)
        }
    }

    /// Format as `#rrggbb` (or `#rrggbbaa` when not opaque).
    #[must_use]
    pub fn to_hex_string(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}
