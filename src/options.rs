//! Render options.
//!
//! Callers hand in a partial [`RenderOptions`]; every renderer resolves it over
//! its own [`ResolvedOptions`] defaults, so anything the caller sets wins and
//! everything else falls back to the renderer default. Keys barforge does not
//! recognize are kept in [`RenderOptions::extra`] and passed through.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An opaque RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Color {
    /// `#000000`
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// `#ffffff`
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Creates a color from its channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels as an array.
    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Fully opaque pixel value for the `image` crate.
    pub fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, 255])
    }

    /// Channels scaled to `0.0..=1.0`, as PDF color operators expect.
    pub fn to_unit(self) -> [f32; 3] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        ]
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Color::rgb(r, g, b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "black" => return Ok(Color::BLACK),
            "white" => return Ok(Color::WHITE),
            "red" => return Ok(Color::rgb(255, 0, 0)),
            "green" => return Ok(Color::rgb(0, 128, 0)),
            "blue" => return Ok(Color::rgb(0, 0, 255)),
            "gray" | "grey" => return Ok(Color::rgb(128, 128, 128)),
            _ => {}
        }

        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| format!("invalid color '{s}'"))?;
        let digit = |c: u8| -> Result<u8, String> {
            (c as char)
                .to_digit(16)
                .map(|d| d as u8)
                .ok_or_else(|| format!("invalid color '{s}'"))
        };
        match hex.as_bytes() {
            [r, g, b] => Ok(Color::rgb(digit(*r)? * 17, digit(*g)? * 17, digit(*b)? * 17)),
            [r1, r2, g1, g2, b1, b2] => Ok(Color::rgb(
                digit(*r1)? << 4 | digit(*r2)?,
                digit(*g1)? << 4 | digit(*g2)?,
                digit(*b1)? << 4 | digit(*b2)?,
            )),
            _ => Err(format!("invalid color '{s}'")),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Horizontal alignment of the human readable text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Flush left
    Left,
    /// Centered under or over the symbol
    #[default]
    Center,
    /// Flush right
    Right,
}

impl TextAlign {
    /// CSS / SVG keyword (`left`, `center`, `right`)
    pub fn as_css(self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }

    /// SVG `text-anchor` keyword
    pub fn as_svg_anchor(self) -> &'static str {
        match self {
            TextAlign::Left => "start",
            TextAlign::Center => "middle",
            TextAlign::Right => "end",
        }
    }

    /// Left edge of a run of `text_width` inside `[left, left + span)`.
    pub fn place(self, left: f32, span: f32, text_width: f32) -> f32 {
        match self {
            TextAlign::Left => left,
            TextAlign::Center => left + (span - text_width) / 2.0,
            TextAlign::Right => left + span - text_width,
        }
    }
}

/// Whether the human readable text goes above or below the bars.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextPosition {
    /// Above the symbol
    Top,
    /// Below the symbol
    #[default]
    Bottom,
}

/// Caller supplied options. Every recognized key is optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderOptions {
    /// Width of one module (bar unit or 2D cell), in output units
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Height of the bars
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Draw the human readable text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_value: Option<bool>,
    /// Font size of the human readable text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    /// Horizontal text alignment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    /// Text above or below the symbol
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_position: Option<TextPosition>,
    /// Gap between symbol and text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_margin: Option<u32>,
    /// Background color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,
    /// Bar / module color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_color: Option<Color>,
    /// Quiet zone on all sides, unless a side is set explicitly
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<u32>,
    /// Quiet zone above
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_top: Option<u32>,
    /// Quiet zone below
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_bottom: Option<u32>,
    /// Quiet zone on the left
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_left: Option<u32>,
    /// Quiet zone on the right
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_right: Option<u32>,
    /// Unrecognized keys, passed through untouched
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl RenderOptions {
    /// Empty option set; every key falls back to renderer defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the module width.
    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    /// Sets the bar height.
    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    /// Shows or hides the human readable text.
    pub fn display_value(mut self, display: bool) -> Self {
        self.display_value = Some(display);
        self
    }

    /// Sets the font size.
    pub fn font_size(mut self, size: u32) -> Self {
        self.font_size = Some(size);
        self
    }

    /// Sets the text alignment.
    pub fn text_align(mut self, align: TextAlign) -> Self {
        self.text_align = Some(align);
        self
    }

    /// Sets the text position.
    pub fn text_position(mut self, position: TextPosition) -> Self {
        self.text_position = Some(position);
        self
    }

    /// Sets the gap between symbol and text.
    pub fn text_margin(mut self, margin: u32) -> Self {
        self.text_margin = Some(margin);
        self
    }

    /// Sets the background color.
    pub fn background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    /// Sets the bar color.
    pub fn line_color(mut self, color: Color) -> Self {
        self.line_color = Some(color);
        self
    }

    /// Sets the quiet zone on all sides.
    pub fn margin(mut self, margin: u32) -> Self {
        self.margin = Some(margin);
        self
    }

    /// Adds a pass-through key.
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Resolves these options over `defaults`.
    pub fn resolve(&self, defaults: &ResolvedOptions) -> ResolvedOptions {
        let side = |explicit: Option<u32>, fallback: u32| explicit.or(self.margin).unwrap_or(fallback);
        let mut extra = defaults.extra.clone();
        extra.extend(self.extra.iter().map(|(k, v)| (k.clone(), v.clone())));

        ResolvedOptions {
            width: self.width.unwrap_or(defaults.width).max(1),
            height: self.height.unwrap_or(defaults.height).max(1),
            display_value: self.display_value.unwrap_or(defaults.display_value),
            font_size: self.font_size.unwrap_or(defaults.font_size),
            text_align: self.text_align.unwrap_or(defaults.text_align),
            text_position: self.text_position.unwrap_or(defaults.text_position),
            text_margin: self.text_margin.unwrap_or(defaults.text_margin),
            background: self.background.unwrap_or(defaults.background),
            line_color: self.line_color.unwrap_or(defaults.line_color),
            margin_top: side(self.margin_top, defaults.margin_top),
            margin_bottom: side(self.margin_bottom, defaults.margin_bottom),
            margin_left: side(self.margin_left, defaults.margin_left),
            margin_right: side(self.margin_right, defaults.margin_right),
            extra,
        }
    }
}

/// Upper bound for every length option (`width`, `height`, `fontSize`,
/// `textMargin` and the margins).
pub const MAX_LENGTH_OPTION: u32 = 10_000;

/// Fully resolved options a renderer draws with.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedOptions {
    /// Width of one module
    pub width: u32,
    /// Height of the bars
    pub height: u32,
    /// Draw the human readable text
    pub display_value: bool,
    /// Font size of the human readable text
    pub font_size: u32,
    /// Horizontal text alignment
    pub text_align: TextAlign,
    /// Text above or below the symbol
    pub text_position: TextPosition,
    /// Gap between symbol and text
    pub text_margin: u32,
    /// Background color
    pub background: Color,
    /// Bar / module color
    pub line_color: Color,
    /// Quiet zone above
    pub margin_top: u32,
    /// Quiet zone below
    pub margin_bottom: u32,
    /// Quiet zone on the left
    pub margin_left: u32,
    /// Quiet zone on the right
    pub margin_right: u32,
    /// Pass-through keys
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for ResolvedOptions {
    fn default() -> Self {
        Self {
            width: 2,
            height: 100,
            display_value: true,
            font_size: 20,
            text_align: TextAlign::Center,
            text_position: TextPosition::Bottom,
            text_margin: 2,
            background: Color::WHITE,
            line_color: Color::BLACK,
            margin_top: 10,
            margin_bottom: 10,
            margin_left: 10,
            margin_right: 10,
            extra: BTreeMap::new(),
        }
    }
}

impl ResolvedOptions {
    /// Height of the text block including its margin, zero when text is hidden.
    pub fn text_block_height(&self) -> u32 {
        if self.display_value {
            self.font_size.saturating_add(self.text_margin)
        } else {
            0
        }
    }

    /// Rejects length options above [`MAX_LENGTH_OPTION`], naming the first
    /// offending key.
    pub fn check_limits(&self) -> Result<(), String> {
        let lengths = [
            ("width", self.width),
            ("height", self.height),
            ("fontSize", self.font_size),
            ("textMargin", self.text_margin),
            ("marginTop", self.margin_top),
            ("marginBottom", self.margin_bottom),
            ("marginLeft", self.margin_left),
            ("marginRight", self.margin_right),
        ];
        match lengths.iter().find(|(_, value)| *value > MAX_LENGTH_OPTION) {
            Some((key, value)) => Err(format!("{key} {value} exceeds the limit of {MAX_LENGTH_OPTION}")),
            None => Ok(()),
        }
    }

    /// String value of a pass-through key.
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(serde_json::Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_colors() {
        assert_eq!("#ff8000".parse::<Color>(), Ok(Color::rgb(255, 128, 0)));
        assert_eq!("#FFF".parse::<Color>(), Ok(Color::WHITE));
        assert_eq!("black".parse::<Color>(), Ok(Color::BLACK));
        assert!("#12345".parse::<Color>().is_err());
        assert!("ff0000".parse::<Color>().is_err());
        assert!("#gg0000".parse::<Color>().is_err());
        assert_eq!(Color::rgb(1, 2, 255).to_string(), "#0102ff");
    }

    #[test]
    fn test_caller_overrides_win() {
        let defaults = ResolvedOptions::default();
        let resolved = RenderOptions::new()
            .width(3)
            .display_value(false)
            .line_color(Color::rgb(10, 20, 30))
            .resolve(&defaults);

        assert_eq!(resolved.width, 3);
        assert_eq!(resolved.height, 100);
        assert!(!resolved.display_value);
        assert_eq!(resolved.line_color, Color::rgb(10, 20, 30));
        assert_eq!(resolved.background, Color::WHITE);
    }

    #[test]
    fn test_length_limits() {
        let defaults = ResolvedOptions::default();
        assert_eq!(defaults.check_limits(), Ok(()));

        let resolved = RenderOptions::new().margin(u32::MAX).resolve(&defaults);
        assert_eq!(
            resolved.check_limits(),
            Err(format!("marginTop {} exceeds the limit of 10000", u32::MAX))
        );
        assert_eq!(resolved.text_block_height(), 22);

        let resolved = RenderOptions::new()
            .font_size(u32::MAX)
            .text_margin(u32::MAX)
            .resolve(&defaults);
        assert_eq!(resolved.text_block_height(), u32::MAX);
        assert!(resolved.check_limits().is_err());
    }

    #[test]
    fn test_margin_sides() {
        let options = RenderOptions {
            margin: Some(4),
            margin_left: Some(0),
            ..RenderOptions::default()
        };
        let resolved = options.resolve(&ResolvedOptions::default());
        assert_eq!(resolved.margin_left, 0);
        assert_eq!(resolved.margin_right, 4);
        assert_eq!(resolved.margin_top, 4);
    }

    #[test]
    fn test_deserialize_with_unknown_keys() {
        let options: RenderOptions = serde_json::from_str(
            r##"{"width": 3, "displayValue": false, "lineColor": "#ff0000",
                "textAlign": "left", "flat": true, "id": "my-code"}"##,
        )
        .unwrap();

        assert_eq!(options.width, Some(3));
        assert_eq!(options.display_value, Some(false));
        assert_eq!(options.line_color, Some(Color::rgb(255, 0, 0)));
        assert_eq!(options.text_align, Some(TextAlign::Left));
        assert_eq!(options.extra.get("flat"), Some(&serde_json::Value::Bool(true)));

        let resolved = options.resolve(&ResolvedOptions::default());
        assert_eq!(resolved.extra_str("id"), Some("my-code"));
    }

    #[test]
    fn test_bad_color_is_rejected() {
        let result = serde_json::from_str::<RenderOptions>(r#"{"background": "mauve-ish"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_text_placement() {
        assert_eq!(TextAlign::Left.place(10.0, 100.0, 20.0), 10.0);
        assert_eq!(TextAlign::Center.place(10.0, 100.0, 20.0), 50.0);
        assert_eq!(TextAlign::Right.place(10.0, 100.0, 20.0), 90.0);
    }
}
