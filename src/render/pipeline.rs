use std::time::{Duration, Instant};

use crate::{
    assets::{decode::DecodedImage, resource::ResourceManager},
    foundation::error::PosterResult,
    model::layer::Layer,
    plugin::Plugin,
    poster::PosterOptions,
    render::{
        debug::render_debug_helpers,
        image::draw_image,
        mask::apply_mask,
        qrcode::draw_qr_code,
        shapes::{draw_circle, draw_line, draw_polygon, draw_rect},
    },
    surface::Surface,
    text::{layout::draw_text, rich::draw_rich_text},
};

/// Timing and size of the most recent render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Wall time of the whole render, hooks and overlays included.
    pub render_time: Duration,
    /// Time spent awaiting the resource manager.
    pub load_time: Duration,
    /// Number of layers in the list, hidden ones included.
    pub layer_count: usize,
}

async fn timed_load(
    resources: &ResourceManager,
    src: &str,
    load_time: &mut Duration,
) -> PosterResult<DecodedImage> {
    let started = Instant::now();
    let out = resources.load(src).await;
    *load_time += started.elapsed();
    out
}

/// Pattern image sources referenced by a layer and, for rich text, its spans.
fn pattern_sources(layer: &Layer) -> Vec<&str> {
    let mut out: Vec<&str> = layer.style().pattern_sources().collect();
    if let Layer::Text(t) = layer {
        for span in t.rich_spans().unwrap_or_default() {
            out.extend(span.style.pattern_sources());
        }
    }
    out
}

/// Draw one layer, awaiting any image it needs first.
async fn draw_layer(
    surface: &mut dyn Surface,
    layer: &Layer,
    ratio: f64,
    resources: &ResourceManager,
    load_time: &mut Duration,
) -> PosterResult<()> {
    for src in pattern_sources(layer) {
        timed_load(resources, src, load_time).await?;
    }

    match layer {
        Layer::Rect(l) => draw_rect(surface, l, ratio, resources),
        Layer::Circle(l) => draw_circle(surface, l, ratio, resources),
        Layer::Line(l) => draw_line(surface, l, ratio, resources),
        Layer::Polygon(l) => draw_polygon(surface, l, ratio, resources),
        Layer::Text(l) => {
            if l.rich_spans().is_some() {
                draw_rich_text(surface, l, ratio, resources);
            } else {
                draw_text(surface, l, ratio, resources);
            }
        }
        Layer::Image(l) => {
            let image = timed_load(resources, &l.source, load_time).await?;
            draw_image(surface, l, &image, ratio, resources);
        }
        Layer::QrCode(l) => draw_qr_code(surface, l, ratio, resources)?,
    }
    Ok(())
}

/// Paint `layers` onto `surface`.
///
/// The list is stable-sorted by `zIndex` in place. Image loads are awaited per layer, so drawing
/// order always follows z-order. The first error (plugin hook, image load, QR generation) aborts
/// the render and leaves already-drawn layers on the surface.
pub async fn render_layers(
    surface: &mut dyn Surface,
    layers: &mut [Layer],
    plugins: &mut [Box<dyn Plugin>],
    options: &PosterOptions,
    resources: &ResourceManager,
) -> PosterResult<RenderStats> {
    let started = Instant::now();
    let ratio = options.ratio;
    let mut load_time = Duration::ZERO;

    layers.sort_by(|a, b| a.z_index().total_cmp(&b.z_index()));

    for plugin in plugins.iter_mut() {
        plugin.before_draw(surface, layers, options)?;
    }

    surface.clear();

    for layer in layers.iter() {
        if !layer.is_visible() {
            continue;
        }
        tracing::trace!(kind = layer.kind(), id = layer.id(), z = layer.z_index(), "draw layer");

        let mask = layer.common().mask.as_deref();
        if let Some(mask) = mask {
            surface.save();
            apply_mask(surface, mask, ratio);
        }
        let drawn = draw_layer(surface, layer, ratio, resources, &mut load_time).await;
        if mask.is_some() {
            surface.restore();
        }
        drawn?;
    }

    if let Some(debug) = &options.debug {
        render_debug_helpers(surface, layers, debug, ratio);
    }

    for plugin in plugins.iter_mut() {
        plugin.after_draw(surface, layers, options)?;
    }

    let stats = RenderStats {
        render_time: started.elapsed(),
        load_time,
        layer_count: layers.len(),
    };
    tracing::debug!(
        render_ms = stats.render_time.as_secs_f64() * 1000.0,
        load_ms = stats.load_time.as_secs_f64() * 1000.0,
        layers = stats.layer_count,
        "render finished"
    );
    Ok(stats)
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
