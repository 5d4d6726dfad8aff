use serde::{Deserialize, Serialize};

use crate::model::style::Style;

/// CSS font weight: a keyword (`bold`) or a number (`700`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FontWeight {
    /// Numeric weight.
    Number(f64),
    /// Keyword weight.
    Name(String),
}

impl FontWeight {
    /// Numeric weight on the 1..=1000 scale (`normal` = 400, `bold` = 700).
    pub fn numeric(&self) -> f32 {
        match self {
            Self::Number(n) => *n as f32,
            Self::Name(name) => match name.trim() {
                "bold" | "bolder" => 700.0,
                "lighter" => 300.0,
                other => other.parse::<f32>().unwrap_or(400.0),
            },
        }
    }
}

impl std::fmt::Display for FontWeight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) if n.fract() == 0.0 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{n}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// Horizontal anchor of a text line relative to its x coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum TextAlign {
    #[default]
    Start,
    End,
    Left,
    Right,
    Center,
}

impl TextAlign {
    /// Fraction of the line width the anchor sits at (0 left, 0.5 center, 1 right).
    pub fn anchor_factor(self) -> f64 {
        match self {
            Self::Center => 0.5,
            Self::Right | Self::End => 1.0,
            Self::Left | Self::Start => 0.0,
        }
    }
}

/// Vertical anchor of a text line relative to its y coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum TextBaseline {
    Top,
    Hanging,
    Middle,
    #[default]
    Alphabetic,
    Ideographic,
    Bottom,
}

/// Font selection fields shared by text layers and spans.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Typography {
    /// Font size in logical pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    /// Font family name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Font weight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    /// Font style (`normal`, `italic`, `oblique`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
}

impl Typography {
    /// Field-wise merge where `over` wins whenever it sets a field.
    pub fn merged_with(&self, over: &Typography) -> Typography {
        Typography {
            font_size: over.font_size.or(self.font_size),
            font_family: over
                .font_family
                .clone()
                .or_else(|| self.font_family.clone()),
            font_weight: over
                .font_weight
                .clone()
                .or_else(|| self.font_weight.clone()),
            font_style: over.font_style.clone().or_else(|| self.font_style.clone()),
        }
    }
}

/// A styled run of text inside a rich text layer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextSpan {
    /// Run content.
    pub text: String,
    /// Font overrides.
    #[serde(flatten)]
    pub typography: Typography,
    /// Text color shorthand.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Extra spacing between characters, in logical pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,
    /// Whether the run is stroked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_text: Option<bool>,
    /// Paint overrides.
    #[serde(flatten)]
    pub style: Style,
}

impl TextSpan {
    /// Plain run with no overrides.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}
