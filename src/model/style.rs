use serde::{Deserialize, Serialize};

/// One color stop of a gradient.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    /// Position along the gradient in `0..=1`.
    pub offset: f64,
    /// CSS color string.
    pub color: String,
}

/// Tiling mode of a pattern paint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Repetition {
    /// Tile on both axes.
    #[default]
    Repeat,
    /// Tile horizontally only.
    RepeatX,
    /// Tile vertically only.
    RepeatY,
    /// Draw the image once.
    NoRepeat,
}

/// Declarative non-solid paint, resolved against the device ratio at draw time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PaintSpec {
    /// Linear gradient between two points.
    Linear {
        /// Start x.
        x0: f64,
        /// Start y.
        y0: f64,
        /// End x.
        x1: f64,
        /// End y.
        y1: f64,
        /// Color stops.
        #[serde(default)]
        stops: Vec<ColorStop>,
    },
    /// Two-circle radial gradient.
    Radial {
        /// Start circle center x.
        x0: f64,
        /// Start circle center y.
        y0: f64,
        /// Start circle radius.
        r0: f64,
        /// End circle center x.
        x1: f64,
        /// End circle center y.
        y1: f64,
        /// End circle radius.
        r1: f64,
        /// Color stops.
        #[serde(default)]
        stops: Vec<ColorStop>,
    },
    /// Image pattern; `image` is a resource key loaded through the resource manager.
    Pattern {
        /// Image source key.
        image: String,
        /// Tiling mode (default `repeat`).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        repetition: Option<Repetition>,
    },
}

/// Value of `fillStyle`/`strokeStyle`: a CSS color string or a paint descriptor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FillStyle {
    /// CSS color string.
    Color(String),
    /// Gradient or pattern descriptor.
    Paint(PaintSpec),
}

impl FillStyle {
    /// Shorthand for a solid color.
    pub fn color(c: impl Into<String>) -> Self {
        Self::Color(c.into())
    }

    /// Pattern image source key, if this is a pattern paint.
    pub fn pattern_source(&self) -> Option<&str> {
        match self {
            Self::Paint(PaintSpec::Pattern { image, .. }) => Some(image.as_str()),
            _ => None,
        }
    }
}

impl From<&str> for FillStyle {
    fn from(c: &str) -> Self {
        Self::Color(c.to_owned())
    }
}

/// Stroke corner style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineJoin {
    /// Sharp corners.
    #[default]
    Miter,
    /// Rounded corners.
    Round,
    /// Cut-off corners.
    Bevel,
}

/// Stroke end style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    /// Flat end at the endpoint.
    #[default]
    Butt,
    /// Semicircular end.
    Round,
    /// Square end projecting past the endpoint.
    Square,
}

/// Canvas-style `globalCompositeOperation` values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum CompositeOp {
    #[default]
    SourceOver,
    SourceIn,
    SourceOut,
    SourceAtop,
    DestinationOver,
    DestinationIn,
    DestinationOut,
    DestinationAtop,
    Lighter,
    Copy,
    Xor,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

impl CompositeOp {
    /// CSS keyword for this operation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SourceOver => "source-over",
            Self::SourceIn => "source-in",
            Self::SourceOut => "source-out",
            Self::SourceAtop => "source-atop",
            Self::DestinationOver => "destination-over",
            Self::DestinationIn => "destination-in",
            Self::DestinationOut => "destination-out",
            Self::DestinationAtop => "destination-atop",
            Self::Lighter => "lighter",
            Self::Copy => "copy",
            Self::Xor => "xor",
            Self::Multiply => "multiply",
            Self::Screen => "screen",
            Self::Overlay => "overlay",
            Self::Darken => "darken",
            Self::Lighten => "lighten",
            Self::ColorDodge => "color-dodge",
            Self::ColorBurn => "color-burn",
            Self::HardLight => "hard-light",
            Self::SoftLight => "soft-light",
            Self::Difference => "difference",
            Self::Exclusion => "exclusion",
            Self::Hue => "hue",
            Self::Saturation => "saturation",
            Self::Color => "color",
            Self::Luminosity => "luminosity",
        }
    }
}

/// Shared style bag carried by every layer variant.
///
/// Every field is optional; an absent field leaves the surface state untouched. Lengths are
/// logical and get multiplied by the device ratio when applied.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Style {
    /// Fill paint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_style: Option<FillStyle>,
    /// Stroke paint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_style: Option<FillStyle>,
    /// Stroke width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_width: Option<f64>,
    /// Stroke corner style.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_join: Option<LineJoin>,
    /// Stroke end style.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_cap: Option<LineCap>,
    /// Dash pattern (alternating on/off lengths).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_dash: Option<Vec<f64>>,
    /// Shadow color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_color: Option<String>,
    /// Shadow blur radius.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_blur: Option<f64>,
    /// Shadow x offset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_offset_x: Option<f64>,
    /// Shadow y offset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_offset_y: Option<f64>,
    /// Layer opacity in `0..=1`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_alpha: Option<f64>,
    /// Blend/composite mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_composite_operation: Option<CompositeOp>,
    /// CSS filter string, e.g. `blur(5px)`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// Rotation in radians around the layer's center (rect, circle, image, qrcode).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate: Option<f64>,
}

impl Style {
    /// Field-wise merge where `over` wins whenever it sets a field.
    pub fn merged_with(&self, over: &Style) -> Style {
        Style {
            fill_style: over.fill_style.clone().or_else(|| self.fill_style.clone()),
            stroke_style: over
                .stroke_style
                .clone()
                .or_else(|| self.stroke_style.clone()),
            line_width: over.line_width.or(self.line_width),
            line_join: over.line_join.or(self.line_join),
            line_cap: over.line_cap.or(self.line_cap),
            line_dash: over.line_dash.clone().or_else(|| self.line_dash.clone()),
            shadow_color: over
                .shadow_color
                .clone()
                .or_else(|| self.shadow_color.clone()),
            shadow_blur: over.shadow_blur.or(self.shadow_blur),
            shadow_offset_x: over.shadow_offset_x.or(self.shadow_offset_x),
            shadow_offset_y: over.shadow_offset_y.or(self.shadow_offset_y),
            global_alpha: over.global_alpha.or(self.global_alpha),
            global_composite_operation: over
                .global_composite_operation
                .or(self.global_composite_operation),
            filter: over.filter.clone().or_else(|| self.filter.clone()),
            rotate: over.rotate.or(self.rotate),
        }
    }

    /// Image sources referenced by pattern paints.
    pub fn pattern_sources(&self) -> impl Iterator<Item = &str> {
        [self.fill_style.as_ref(), self.stroke_style.as_ref()]
            .into_iter()
            .flatten()
            .filter_map(FillStyle::pattern_source)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/style.rs"]
mod tests;
