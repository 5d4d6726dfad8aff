//! Diagnostic overlays drawn on top of a finished frame.

use kurbo::{Circle, Shape as _};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    foundation::core::{BezPath, Rect},
    layout::bounds::get_layer_bounds,
    model::layer::Layer,
    render::shapes::scaled_rect,
    style::resolve::scale_value,
    surface::{Paint, StateProp, Surface},
};

const GRID_COLOR: &str = "rgba(0, 120, 255, 0.15)";
const GUIDE_COLOR: &str = "rgba(255, 0, 128, 0.8)";
const BOUNDS_COLOR: &str = "red";

/// Accept either `true`/`false` or a full options object.
#[derive(Deserialize)]
#[serde(untagged)]
enum Toggle<T> {
    Flag(bool),
    Options(T),
}

/// `true` maps to `T::default()`, `false` and `null` to `None`.
pub(crate) fn deserialize_toggle<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(match Option::<Toggle<T>>::deserialize(de)? {
        None | Some(Toggle::Flag(false)) => None,
        Some(Toggle::Flag(true)) => Some(T::default()),
        Some(Toggle::Options(o)) => Some(o),
    })
}

fn default_true() -> bool {
    true
}

/// Background grid settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridOptions {
    /// Cell size in logical units.
    pub size: f64,
    /// Line color.
    pub color: String,
    /// Line width in device pixels.
    pub line_width: f64,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            size: 20.0,
            color: GRID_COLOR.to_owned(),
            line_width: 1.0,
        }
    }
}

/// Orientation of a guide line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum GuideDirection {
    Horizontal,
    Vertical,
}

/// A full-length reference line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideLine {
    /// Horizontal lines run across at `y = position`, vertical ones at `x = position`.
    pub direction: GuideDirection,
    /// Logical coordinate.
    pub position: f64,
    /// Line color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Line width in device pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_width: Option<f64>,
    /// Dash pattern in device pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_dash: Option<Vec<f64>>,
}

impl GuideLine {
    /// Guide with default styling.
    pub fn new(direction: GuideDirection, position: f64) -> Self {
        Self {
            direction,
            position,
            color: None,
            line_width: None,
            line_dash: None,
        }
    }
}

/// Which overlays to draw.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DebugOptions {
    /// Outline every visible layer.
    #[serde(default = "default_true")]
    pub bounds: bool,
    /// Background grid; JSON accepts `true` for the defaults.
    #[serde(
        deserialize_with = "deserialize_toggle",
        skip_serializing_if = "Option::is_none"
    )]
    pub grid: Option<GridOptions>,
    /// Reference lines.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub guides: Vec<GuideLine>,
}

impl Default for DebugOptions {
    fn default() -> Self {
        Self {
            bounds: true,
            grid: None,
            guides: Vec::new(),
        }
    }
}

fn segment(x0: f64, y0: f64, x1: f64, y1: f64) -> BezPath {
    let mut path = BezPath::new();
    path.move_to((x0, y0));
    path.line_to((x1, y1));
    path
}

fn overlay_state(surface: &mut dyn Surface, color: &str, line_width: f64, dash: Vec<f64>) {
    surface.set_state(StateProp::StrokePaint(Paint::Color(color.to_owned())));
    surface.set_state(StateProp::LineWidth(line_width));
    surface.set_state(StateProp::GlobalAlpha(1.0));
    surface.set_state(StateProp::LineDash(dash));
}

/// Grid lines every `size × ratio` device pixels, edges included.
pub fn draw_debug_grid(surface: &mut dyn Surface, grid: &GridOptions, ratio: f64) {
    let step = scale_value(grid.size, ratio);
    if !(step.is_finite() && step > 0.0) {
        return;
    }
    let (w, h) = surface.size();
    let (w, h) = (f64::from(w), f64::from(h));

    surface.save();
    overlay_state(surface, &grid.color, grid.line_width, Vec::new());
    let mut x = 0.0;
    while x <= w {
        surface.stroke_path(&segment(x, 0.0, x, h));
        x += step;
    }
    let mut y = 0.0;
    while y <= h {
        surface.stroke_path(&segment(0.0, y, w, y));
        y += step;
    }
    surface.restore();
}

/// One dashed reference line across the whole surface.
pub fn draw_debug_guide(surface: &mut dyn Surface, guide: &GuideLine, ratio: f64) {
    let pos = scale_value(guide.position, ratio);
    let (w, h) = surface.size();
    let (w, h) = (f64::from(w), f64::from(h));

    surface.save();
    overlay_state(
        surface,
        guide.color.as_deref().unwrap_or(GUIDE_COLOR),
        guide.line_width.unwrap_or(1.0),
        guide.line_dash.clone().unwrap_or_else(|| vec![4.0, 4.0]),
    );
    let path = match guide.direction {
        GuideDirection::Horizontal => segment(0.0, pos, w, pos),
        GuideDirection::Vertical => segment(pos, 0.0, pos, h),
    };
    surface.stroke_path(&path);
    surface.restore();
}

fn outline(surface: &mut dyn Surface, layer: &Layer, ratio: f64) -> Option<BezPath> {
    let path = match layer {
        Layer::Rect(l) => scaled_rect(l.x, l.y, l.width, l.height, ratio).to_path(0.1),
        Layer::Image(l) => scaled_rect(l.x, l.y, l.width, l.height, ratio).to_path(0.1),
        Layer::QrCode(l) => scaled_rect(l.x, l.y, l.width, l.height, ratio).to_path(0.1),
        Layer::Circle(l) => Circle::new(
            (scale_value(l.x, ratio), scale_value(l.y, ratio)),
            scale_value(l.radius, ratio),
        )
        .to_path(0.1),
        Layer::Line(l) => segment(
            scale_value(l.x1, ratio),
            scale_value(l.y1, ratio),
            scale_value(l.x2, ratio),
            scale_value(l.y2, ratio),
        ),
        Layer::Polygon(l) => {
            let (first, rest) = l.points.split_first()?;
            let mut path = BezPath::new();
            path.move_to((scale_value(first[0], ratio), scale_value(first[1], ratio)));
            for [x, y] in rest {
                path.line_to((scale_value(*x, ratio), scale_value(*y, ratio)));
            }
            if l.close_path != Some(false) {
                path.close_path();
            }
            path
        }
        Layer::Text(_) => {
            let b = get_layer_bounds(surface, layer);
            Rect::from_origin_size(
                (scale_value(b.x, ratio), scale_value(b.y, ratio)),
                (scale_value(b.width, ratio), scale_value(b.height, ratio)),
            )
            .to_path(0.1)
        }
    };
    Some(path)
}

/// Red 1px outline of every visible layer.
pub fn draw_debug_bounds(surface: &mut dyn Surface, layers: &[Layer], ratio: f64) {
    surface.save();
    overlay_state(surface, BOUNDS_COLOR, 1.0, Vec::new());
    for layer in layers.iter().filter(|l| l.is_visible()) {
        if let Some(path) = outline(surface, layer, ratio) {
            surface.stroke_path(&path);
        }
    }
    surface.restore();
}

/// Grid first, then guides, then layer bounds.
pub fn render_debug_helpers(
    surface: &mut dyn Surface,
    layers: &[Layer],
    options: &DebugOptions,
    ratio: f64,
) {
    if let Some(grid) = &options.grid {
        draw_debug_grid(surface, grid, ratio);
    }
    for guide in &options.guides {
        draw_debug_guide(surface, guide, ratio);
    }
    if options.bounds {
        draw_debug_bounds(surface, layers, ratio);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/debug.rs"]
mod tests;
