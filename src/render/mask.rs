use crate::{model::layer::Layer, render::shapes::create_layer_path, surface::Surface};

/// Intersect the clip with `mask`'s outline.
///
/// Only geometry is read: the mask's style, visibility and own `mask` are ignored. Kinds without
/// an outline (line, text, image, qrcode) clip everything away.
pub fn apply_mask(surface: &mut dyn Surface, mask: &Layer, ratio: f64) {
    surface.clip(&create_layer_path(mask, ratio));
}

#[cfg(test)]
#[path = "../../tests/unit/render/mask.rs"]
mod tests;
