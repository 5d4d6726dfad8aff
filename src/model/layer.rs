use serde::{Deserialize, Serialize};

use crate::model::{
    style::Style,
    text::{TextAlign, TextBaseline, TextSpan, Typography},
};

fn default_true() -> bool {
    true
}

fn is_true(v: &bool) -> bool {
    *v
}

fn is_false(v: &bool) -> bool {
    !*v
}

fn is_zero(v: &f64) -> bool {
    *v == 0.0
}

/// Metadata shared by every layer variant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerCommon {
    /// Caller-assigned identifier, used by layout, hit testing, and removal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Paint order; higher paints later.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub z_index: f64,
    /// Hidden layers are skipped by the renderer.
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub visible: bool,
    /// Editor hint; ignored by the renderer but honored by hit testing.
    #[serde(default, skip_serializing_if = "is_false")]
    pub locked: bool,
    /// Geometry-only clip layer applied while drawing this layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<Box<Layer>>,
}

impl Default for LayerCommon {
    fn default() -> Self {
        Self {
            id: None,
            z_index: 0.0,
            visible: true,
            locked: false,
            mask: None,
        }
    }
}

/// Corner radius: one value for all corners or `[tl, tr, br, bl]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Radius {
    /// Same radius on every corner.
    Uniform(f64),
    /// Per-corner radii, clockwise from top-left; missing entries are zero.
    Corners(Vec<f64>),
}

impl Radius {
    /// Normalized `[tl, tr, br, bl]`.
    pub fn corners(&self) -> [f64; 4] {
        match self {
            Self::Uniform(r) => [*r; 4],
            Self::Corners(v) => {
                let at = |i: usize| v.get(i).copied().unwrap_or(0.0);
                [at(0), at(1), at(2), at(3)]
            }
        }
    }

    /// Whether every corner is square.
    pub fn is_zero(&self) -> bool {
        self.corners().iter().all(|r| *r == 0.0)
    }
}

/// Rectangle with optional rounded corners.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct RectLayer {
    #[serde(flatten)]
    pub common: LayerCommon,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<Radius>,
    #[serde(flatten)]
    pub style: Style,
}

/// Circle centered on `(x, y)`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct CircleLayer {
    #[serde(flatten)]
    pub common: LayerCommon,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    #[serde(flatten)]
    pub style: Style,
}

/// Straight segment from `(x1, y1)` to `(x2, y2)`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct LineLayer {
    #[serde(flatten)]
    pub common: LayerCommon,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    #[serde(flatten)]
    pub style: Style,
}

/// Polyline or polygon through `points`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PolygonLayer {
    /// Shared metadata.
    #[serde(flatten)]
    pub common: LayerCommon,
    /// Vertices as `[x, y]` pairs.
    pub points: Vec<[f64; 2]>,
    /// Close the outline back to the first point (default true).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_path: Option<bool>,
    /// Paint.
    #[serde(flatten)]
    pub style: Style,
}

/// Single-style (`text`) or rich (`spans`) text anchored at `(x, y)`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextLayer {
    /// Shared metadata.
    #[serde(flatten)]
    pub common: LayerCommon,
    /// Anchor x.
    pub x: f64,
    /// Anchor y.
    pub y: f64,
    /// Single-style content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Rich content; takes precedence over `text` when non-empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spans: Option<Vec<TextSpan>>,
    /// Wrap width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<f64>,
    /// Explicit line advance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    /// Maximum number of lines before truncating with an ellipsis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_lines: Option<usize>,
    /// Font selection.
    #[serde(flatten)]
    pub typography: Typography,
    /// Horizontal anchor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    /// Vertical anchor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_baseline: Option<TextBaseline>,
    /// Text color shorthand; overrides `fillStyle`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Stroke the glyph outlines after filling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_text: Option<bool>,
    /// Default letter spacing for rich spans.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,
    /// Paint.
    #[serde(flatten)]
    pub style: Style,
}

impl TextLayer {
    /// Rich spans, when present and non-empty.
    pub fn rich_spans(&self) -> Option<&[TextSpan]> {
        self.spans.as_deref().filter(|s| !s.is_empty())
    }

    /// Line advance in logical units: explicit, else 1.2 × font size, else 19.2.
    pub fn resolved_line_height(&self) -> f64 {
        self.line_height
            .or_else(|| self.typography.font_size.map(|s| s * 1.2))
            .unwrap_or(19.2)
    }
}

/// Source rectangle in image pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct Crop {
    pub sx: f64,
    pub sy: f64,
    pub sw: f64,
    pub sh: f64,
}

/// How an image is fitted into its destination box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectFit {
    /// Stretch to the box.
    #[default]
    Fill,
    /// Letterbox inside the box keeping aspect ratio.
    Contain,
    /// Cover the box keeping aspect ratio, cropping the overflow.
    Cover,
}

/// Raster image placed into a box.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageLayer {
    /// Shared metadata.
    #[serde(flatten)]
    pub common: LayerCommon,
    /// Resource key (path or `data:` URL).
    #[serde(alias = "image")]
    pub source: String,
    /// Destination left.
    pub x: f64,
    /// Destination top.
    pub y: f64,
    /// Destination width.
    pub width: f64,
    /// Destination height.
    pub height: f64,
    /// Source rectangle in image pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<Crop>,
    /// Rounded-corner clip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<Radius>,
    /// Fit mode when no crop or nine-slice grid is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_fit: Option<ObjectFit>,
    /// Nine-slice insets `[top, right, bottom, left]` in image pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale9_grid: Option<[f64; 4]>,
    /// Paint state (alpha, composite, shadow).
    #[serde(flatten)]
    pub style: Style,
}

/// QR error correction level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QrErrorLevel {
    /// ~7% recovery.
    L,
    /// ~15% recovery.
    #[default]
    M,
    /// ~25% recovery.
    Q,
    /// ~30% recovery.
    H,
}

/// Module colors of a QR code.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QrColors {
    /// Foreground color (default opaque black).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dark: Option<String>,
    /// Background color (default opaque white).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub light: Option<String>,
}

/// Generated QR code placed into a box.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QrCodeLayer {
    /// Shared metadata.
    #[serde(flatten)]
    pub common: LayerCommon,
    /// Encoded payload.
    pub text: String,
    /// Destination left.
    pub x: f64,
    /// Destination top.
    pub y: f64,
    /// Destination width.
    pub width: f64,
    /// Destination height.
    pub height: f64,
    /// Quiet zone in modules (default 4).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<u32>,
    /// Error correction level (default M).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_correction_level: Option<QrErrorLevel>,
    /// Module colors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<QrColors>,
    /// Paint state (alpha, composite, shadow).
    #[serde(flatten)]
    pub style: Style,
}

/// One drawable primitive, tagged by `type` in JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Layer {
    /// `type: "rect"`.
    Rect(RectLayer),
    /// `type: "circle"`.
    Circle(CircleLayer),
    /// `type: "line"`.
    Line(LineLayer),
    /// `type: "polygon"`.
    Polygon(PolygonLayer),
    /// `type: "text"`.
    Text(TextLayer),
    /// `type: "image"`.
    Image(ImageLayer),
    /// `type: "qrcode"`.
    #[serde(rename = "qrcode")]
    QrCode(QrCodeLayer),
}

impl Layer {
    /// Variant tag as it appears in JSON.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rect(_) => "rect",
            Self::Circle(_) => "circle",
            Self::Line(_) => "line",
            Self::Polygon(_) => "polygon",
            Self::Text(_) => "text",
            Self::Image(_) => "image",
            Self::QrCode(_) => "qrcode",
        }
    }

    /// Shared metadata.
    pub fn common(&self) -> &LayerCommon {
        match self {
            Self::Rect(l) => &l.common,
            Self::Circle(l) => &l.common,
            Self::Line(l) => &l.common,
            Self::Polygon(l) => &l.common,
            Self::Text(l) => &l.common,
            Self::Image(l) => &l.common,
            Self::QrCode(l) => &l.common,
        }
    }

    /// Mutable shared metadata.
    pub fn common_mut(&mut self) -> &mut LayerCommon {
        match self {
            Self::Rect(l) => &mut l.common,
            Self::Circle(l) => &mut l.common,
            Self::Line(l) => &mut l.common,
            Self::Polygon(l) => &mut l.common,
            Self::Text(l) => &mut l.common,
            Self::Image(l) => &mut l.common,
            Self::QrCode(l) => &mut l.common,
        }
    }

    /// Style bag.
    pub fn style(&self) -> &Style {
        match self {
            Self::Rect(l) => &l.style,
            Self::Circle(l) => &l.style,
            Self::Line(l) => &l.style,
            Self::Polygon(l) => &l.style,
            Self::Text(l) => &l.style,
            Self::Image(l) => &l.style,
            Self::QrCode(l) => &l.style,
        }
    }

    /// Layer id, if assigned.
    pub fn id(&self) -> Option<&str> {
        self.common().id.as_deref()
    }

    /// Paint order key.
    pub fn z_index(&self) -> f64 {
        self.common().z_index
    }

    /// Whether the renderer draws this layer.
    pub fn is_visible(&self) -> bool {
        self.common().visible
    }

    /// Builder-style id assignment.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.common_mut().id = Some(id.into());
        self
    }

    /// Builder-style z-index assignment.
    pub fn with_z_index(mut self, z_index: f64) -> Self {
        self.common_mut().z_index = z_index;
        self
    }

    /// Builder-style mask assignment.
    pub fn with_mask(mut self, mask: Layer) -> Self {
        self.common_mut().mask = Some(Box::new(mask));
        self
    }
}

macro_rules! impl_from_variant {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Layer {
                fn from(l: $ty) -> Self {
                    Layer::$variant(l)
                }
            }
        )*
    };
}

impl_from_variant!(
    RectLayer => Rect,
    CircleLayer => Circle,
    LineLayer => Line,
    PolygonLayer => Polygon,
    TextLayer => Text,
    ImageLayer => Image,
    QrCodeLayer => QrCode,
);

impl RectLayer {
    /// Unstyled rectangle.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            ..Self::default()
        }
    }
}

impl CircleLayer {
    /// Unstyled circle.
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Self {
            x,
            y,
            radius,
            ..Self::default()
        }
    }
}

impl LineLayer {
    /// Unstyled segment.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            ..Self::default()
        }
    }
}

impl PolygonLayer {
    /// Unstyled closed polygon.
    pub fn new(points: Vec<[f64; 2]>) -> Self {
        Self {
            points,
            ..Self::default()
        }
    }
}

impl TextLayer {
    /// Single-style text at `(x, y)`.
    pub fn new(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            text: Some(text.into()),
            x,
            y,
            ..Self::default()
        }
    }
}

impl ImageLayer {
    /// Image from `source` into the given box.
    pub fn new(source: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            source: source.into(),
            x,
            y,
            width,
            height,
            ..Self::default()
        }
    }
}

impl QrCodeLayer {
    /// QR code encoding `text` into the given box.
    pub fn new(text: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width,
            height,
            ..Self::default()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/layer.rs"]
mod tests;
