use crate::{
    assets::resource::ResourceManager,
    foundation::core::Point,
    model::style::{FillStyle, PaintSpec, Style},
    surface::{Paint, StateProp, Surface},
};

/// Multiply a logical length by the device ratio.
pub fn scale_value(value: f64, ratio: f64) -> f64 {
    value * ratio
}

/// Resolve a declarative fill into a device-space surface paint.
///
/// Gradient geometry is scaled by `ratio`. Pattern images must already be cached in `resources`;
/// an uncached pattern resolves to transparent.
pub fn resolve_paint(fill: &FillStyle, ratio: f64, resources: &ResourceManager) -> Paint {
    match fill {
        FillStyle::Color(c) => Paint::Color(c.clone()),
        FillStyle::Paint(PaintSpec::Linear {
            x0,
            y0,
            x1,
            y1,
            stops,
        }) => Paint::LinearGradient {
            start: Point::new(x0 * ratio, y0 * ratio),
            end: Point::new(x1 * ratio, y1 * ratio),
            stops: stops.clone(),
        },
        FillStyle::Paint(PaintSpec::Radial {
            x0,
            y0,
            r0,
            x1,
            y1,
            r1,
            stops,
        }) => Paint::RadialGradient {
            start: Point::new(x0 * ratio, y0 * ratio),
            start_radius: r0 * ratio,
            end: Point::new(x1 * ratio, y1 * ratio),
            end_radius: r1 * ratio,
            stops: stops.clone(),
        },
        FillStyle::Paint(PaintSpec::Pattern { image, repetition }) => match resources.get(image) {
            Some(decoded) => Paint::Pattern {
                image: decoded,
                repetition: repetition.unwrap_or_default(),
            },
            None => {
                tracing::debug!(src = %image, "pattern image not loaded; using transparent");
                Paint::transparent()
            }
        },
    }
}

/// Push every field set in `style` onto the surface, scaling lengths by `ratio`.
pub fn apply_styles(
    surface: &mut dyn Surface,
    style: &Style,
    ratio: f64,
    resources: &ResourceManager,
) {
    if let Some(a) = style.global_alpha {
        surface.set_state(StateProp::GlobalAlpha(a));
    }
    if let Some(fill) = &style.fill_style {
        surface.set_state(StateProp::FillPaint(resolve_paint(fill, ratio, resources)));
    }
    if let Some(stroke) = &style.stroke_style {
        surface.set_state(StateProp::StrokePaint(resolve_paint(
            stroke, ratio, resources,
        )));
    }
    if let Some(w) = style.line_width {
        surface.set_state(StateProp::LineWidth(scale_value(w, ratio)));
    }
    if let Some(j) = style.line_join {
        surface.set_state(StateProp::LineJoin(j));
    }
    if let Some(c) = style.line_cap {
        surface.set_state(StateProp::LineCap(c));
    }
    if let Some(dash) = &style.line_dash {
        surface.set_state(StateProp::LineDash(
            dash.iter().map(|d| scale_value(*d, ratio)).collect(),
        ));
    }
    if let Some(c) = &style.shadow_color {
        surface.set_state(StateProp::ShadowColor(c.clone()));
    }
    if let Some(b) = style.shadow_blur {
        surface.set_state(StateProp::ShadowBlur(scale_value(b, ratio)));
    }
    if let Some(x) = style.shadow_offset_x {
        surface.set_state(StateProp::ShadowOffsetX(scale_value(x, ratio)));
    }
    if let Some(y) = style.shadow_offset_y {
        surface.set_state(StateProp::ShadowOffsetY(scale_value(y, ratio)));
    }
    if let Some(op) = style.global_composite_operation {
        surface.set_state(StateProp::Composite(op));
    }
    if let Some(f) = &style.filter {
        surface.set_state(StateProp::Filter(f.clone()));
    }
}

/// Run `draw` between `save`/`restore` with `style` applied.
pub fn with_context<R>(
    surface: &mut dyn Surface,
    style: &Style,
    ratio: f64,
    resources: &ResourceManager,
    draw: impl FnOnce(&mut dyn Surface) -> R,
) -> R {
    surface.save();
    apply_styles(surface, style, ratio, resources);
    let out = draw(&mut *surface);
    surface.restore();
    out
}

#[cfg(test)]
#[path = "../../tests/unit/style/resolve.rs"]
mod tests;
