use crate::{
    foundation::core::BoundingBox,
    model::{
        layer::{Layer, TextLayer},
        text::{TextAlign, TextBaseline},
    },
    surface::{StateProp, Surface},
    text::{
        layout::{build_font, layout_lines},
        rich::layout_rich_lines,
    },
};

/// Share of the text block height that sits above an alphabetic baseline.
const ALPHABETIC_ASCENT: f64 = 0.8;

/// Logical bounding box of `layer`.
///
/// Text is measured with `surface`, at ratio 1, inside a `save`/`restore` pair. Degenerate
/// geometry (an empty polygon, negative sizes) yields a zero-sized box rather than an error.
pub fn get_layer_bounds(surface: &mut dyn Surface, layer: &Layer) -> BoundingBox {
    match layer {
        Layer::Rect(l) => BoundingBox::new(l.x, l.y, l.width, l.height),
        Layer::Image(l) => BoundingBox::new(l.x, l.y, l.width, l.height),
        Layer::QrCode(l) => BoundingBox::new(l.x, l.y, l.width, l.height),
        Layer::Circle(l) => {
            BoundingBox::new(l.x - l.radius, l.y - l.radius, l.radius * 2.0, l.radius * 2.0)
        }
        Layer::Line(l) => BoundingBox::new(
            l.x1.min(l.x2),
            l.y1.min(l.y2),
            (l.x1 - l.x2).abs(),
            (l.y1 - l.y2).abs(),
        ),
        Layer::Polygon(l) => {
            let Some(first) = l.points.first() else {
                return BoundingBox::zero();
            };
            let (mut x0, mut y0, mut x1, mut y1) = (first[0], first[1], first[0], first[1]);
            for [x, y] in &l.points {
                x0 = x0.min(*x);
                y0 = y0.min(*y);
                x1 = x1.max(*x);
                y1 = y1.max(*y);
            }
            BoundingBox::new(x0, y0, x1 - x0, y1 - y0)
        }
        Layer::Text(l) => text_bounds(surface, l),
    }
}

fn text_bounds(surface: &mut dyn Surface, layer: &TextLayer) -> BoundingBox {
    surface.save();
    let (width, height) = if layer.rich_spans().is_some() {
        let lines = layout_rich_lines(surface, layer, 1.0);
        (
            lines.iter().map(|l| l.width).fold(0.0, f64::max),
            lines.iter().map(|l| l.height).sum(),
        )
    } else {
        surface.set_state(StateProp::Font(build_font(&layer.typography, 1.0)));
        let text = layer.text.as_deref().unwrap_or_default();
        let lines = layout_lines(surface, text, layer.max_width, layer.max_lines);
        let width = lines
            .iter()
            .map(|line| surface.measure_text(line))
            .fold(0.0, f64::max);
        (width, lines.len() as f64 * layer.resolved_line_height())
    };
    surface.restore();

    let x = match layer.text_align {
        Some(TextAlign::Center) => layer.x - width / 2.0,
        Some(TextAlign::Right | TextAlign::End) => layer.x - width,
        _ => layer.x,
    };
    let y = match layer.text_baseline {
        Some(TextBaseline::Top) => layer.y,
        Some(TextBaseline::Middle) => layer.y - height / 2.0,
        Some(TextBaseline::Bottom) => layer.y - height,
        _ => layer.y - height * ALPHABETIC_ASCENT,
    };
    BoundingBox::new(x, y, width, height)
}

/// Translate every coordinate field of `layer` by `(dx, dy)`. The mask is left in place.
pub fn move_layer(layer: &mut Layer, dx: f64, dy: f64) {
    match layer {
        Layer::Rect(l) => {
            l.x += dx;
            l.y += dy;
        }
        Layer::Circle(l) => {
            l.x += dx;
            l.y += dy;
        }
        Layer::Text(l) => {
            l.x += dx;
            l.y += dy;
        }
        Layer::Image(l) => {
            l.x += dx;
            l.y += dy;
        }
        Layer::QrCode(l) => {
            l.x += dx;
            l.y += dy;
        }
        Layer::Line(l) => {
            l.x1 += dx;
            l.y1 += dy;
            l.x2 += dx;
            l.y2 += dy;
        }
        Layer::Polygon(l) => {
            for p in &mut l.points {
                p[0] += dx;
                p[1] += dy;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/bounds.rs"]
mod tests;
