use kurbo::{Circle, RoundedRect, RoundedRectRadii, Shape as _};

use crate::{
    assets::resource::ResourceManager,
    foundation::core::{Affine, BezPath, Point, Rect},
    model::layer::{CircleLayer, Layer, LineLayer, PolygonLayer, Radius, RectLayer},
    model::style::Style,
    style::resolve::{scale_value, with_context},
    surface::Surface,
};

const PATH_TOLERANCE: f64 = 0.1;

/// `[tl, tr, br, bl]` radii, zeros when unset.
pub fn normalize_radius(radius: Option<&Radius>) -> [f64; 4] {
    radius.map_or([0.0; 4], Radius::corners)
}

/// Device-space rectangle from logical geometry.
pub(crate) fn scaled_rect(x: f64, y: f64, width: f64, height: f64, ratio: f64) -> Rect {
    Rect::from_origin_size(
        (scale_value(x, ratio), scale_value(y, ratio)),
        (scale_value(width, ratio), scale_value(height, ratio)),
    )
}

/// Path of `rect` with per-corner radii; square corners produce a plain rectangle.
pub fn rounded_rect_path(rect: Rect, radii: [f64; 4]) -> BezPath {
    if radii.iter().all(|r| *r == 0.0) {
        return rect.to_path(PATH_TOLERANCE);
    }
    let [tl, tr, br, bl] = radii;
    RoundedRect::from_rect(rect, RoundedRectRadii::new(tl, tr, br, bl)).to_path(PATH_TOLERANCE)
}

/// Rotate the current transform by `radians` around a device-space pivot.
pub(crate) fn rotate_about(surface: &mut dyn Surface, radians: f64, pivot: Point) {
    surface.concat_transform(Affine::rotate_about(radians, pivot));
}

fn polygon_path(points: &[[f64; 2]], close: bool, ratio: f64) -> BezPath {
    let mut path = BezPath::new();
    let mut iter = points.iter();
    let Some(first) = iter.next() else {
        return path;
    };
    path.move_to((scale_value(first[0], ratio), scale_value(first[1], ratio)));
    for [x, y] in iter {
        path.line_to((scale_value(*x, ratio), scale_value(*y, ratio)));
    }
    if close {
        path.close_path();
    }
    path
}

fn circle_path(x: f64, y: f64, radius: f64, ratio: f64) -> BezPath {
    Circle::new(
        (scale_value(x, ratio), scale_value(y, ratio)),
        scale_value(radius, ratio),
    )
    .to_path(PATH_TOLERANCE)
}

fn fill_and_stroke(surface: &mut dyn Surface, style: &Style, path: &BezPath) {
    if style.fill_style.is_some() {
        surface.fill_path(path);
    }
    if style.stroke_style.is_some() || style.line_width.is_some() {
        surface.stroke_path(path);
    }
}

/// Draw a (possibly rounded, possibly rotated) rectangle.
///
/// Fills when `fillStyle` is set; strokes when `strokeStyle` or `lineWidth` is set.
pub fn draw_rect(
    surface: &mut dyn Surface,
    layer: &RectLayer,
    ratio: f64,
    resources: &ResourceManager,
) {
    let rect = scaled_rect(layer.x, layer.y, layer.width, layer.height, ratio);
    let radii = normalize_radius(layer.radius.as_ref()).map(|r| scale_value(r, ratio));
    with_context(surface, &layer.style, ratio, resources, |s| {
        if let Some(angle) = layer.style.rotate.filter(|a| *a != 0.0) {
            rotate_about(s, angle, rect.center());
        }
        fill_and_stroke(s, &layer.style, &rounded_rect_path(rect, radii));
    });
}

/// Draw a circle, rotated about its own center.
pub fn draw_circle(
    surface: &mut dyn Surface,
    layer: &CircleLayer,
    ratio: f64,
    resources: &ResourceManager,
) {
    with_context(surface, &layer.style, ratio, resources, |s| {
        if let Some(angle) = layer.style.rotate.filter(|a| *a != 0.0) {
            let pivot = Point::new(scale_value(layer.x, ratio), scale_value(layer.y, ratio));
            rotate_about(s, angle, pivot);
        }
        let path = circle_path(layer.x, layer.y, layer.radius, ratio);
        fill_and_stroke(s, &layer.style, &path);
    });
}

/// Stroke a segment. The stroke paint falls back to `fillStyle` when `strokeStyle` is unset.
pub fn draw_line(
    surface: &mut dyn Surface,
    layer: &LineLayer,
    ratio: f64,
    resources: &ResourceManager,
) {
    let style = Style {
        stroke_style: layer
            .style
            .stroke_style
            .clone()
            .or_else(|| layer.style.fill_style.clone()),
        ..layer.style.clone()
    };
    with_context(surface, &style, ratio, resources, |s| {
        let mut path = BezPath::new();
        path.move_to((scale_value(layer.x1, ratio), scale_value(layer.y1, ratio)));
        path.line_to((scale_value(layer.x2, ratio), scale_value(layer.y2, ratio)));
        s.stroke_path(&path);
    });
}

/// Draw a polygon; closed unless `closePath` is `false`. No points draws nothing.
pub fn draw_polygon(
    surface: &mut dyn Surface,
    layer: &PolygonLayer,
    ratio: f64,
    resources: &ResourceManager,
) {
    with_context(surface, &layer.style, ratio, resources, |s| {
        if layer.points.is_empty() {
            return;
        }
        let path = polygon_path(&layer.points, layer.close_path != Some(false), ratio);
        fill_and_stroke(s, &layer.style, &path);
    });
}

/// Device-space outline of a rect, circle, or polygon; empty for every other kind.
///
/// Used for masks, so rotation and styling are ignored.
pub fn create_layer_path(layer: &Layer, ratio: f64) -> BezPath {
    match layer {
        Layer::Rect(l) => rounded_rect_path(
            scaled_rect(l.x, l.y, l.width, l.height, ratio),
            normalize_radius(l.radius.as_ref()).map(|r| scale_value(r, ratio)),
        ),
        Layer::Circle(l) => circle_path(l.x, l.y, l.radius, ratio),
        Layer::Polygon(l) => polygon_path(&l.points, l.close_path != Some(false), ratio),
        Layer::Line(_) | Layer::Text(_) | Layer::Image(_) | Layer::QrCode(_) => BezPath::new(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/shapes.rs"]
mod tests;
