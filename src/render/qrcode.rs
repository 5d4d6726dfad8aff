use qrcode::{EcLevel, QrCode};

use crate::{
    assets::{decode::DecodedImage, resource::ResourceManager},
    foundation::error::{PosterError, PosterResult},
    model::layer::{QrCodeLayer, QrErrorLevel},
    render::shapes::{rotate_about, scaled_rect},
    style::{color::parse_css_color, resolve::with_context},
    surface::Surface,
};

/// Pixels per QR module in the generated bitmap.
pub const MODULE_PX: u32 = 4;
/// Quiet zone, in modules, when the layer does not set one.
pub const DEFAULT_MARGIN: u32 = 4;
/// Largest quiet zone accepted, in modules.
pub const MAX_MARGIN: u32 = 64;

const DEFAULT_DARK: &str = "#000000ff";
const DEFAULT_LIGHT: &str = "#ffffffff";

fn ec_level(level: QrErrorLevel) -> EcLevel {
    match level {
        QrErrorLevel::L => EcLevel::L,
        QrErrorLevel::M => EcLevel::M,
        QrErrorLevel::Q => EcLevel::Q,
        QrErrorLevel::H => EcLevel::H,
    }
}

/// Encode the layer's payload into a bitmap with its quiet zone and colors.
pub fn generate_qr_image(layer: &QrCodeLayer) -> PosterResult<DecodedImage> {
    let level = ec_level(layer.error_correction_level.unwrap_or_default());
    let code = QrCode::with_error_correction_level(layer.text.as_bytes(), level)
        .map_err(|e| PosterError::qr_code(format!("{e} ({} bytes)", layer.text.len())))?;

    let colors = layer.color.clone().unwrap_or_default();
    let parse = |c: Option<&str>, fallback: &str| {
        parse_css_color(c.unwrap_or(fallback))
            .map(|c| c.to_rgba8())
            .map_err(PosterError::qr_code)
    };
    let dark = parse(colors.dark.as_deref(), DEFAULT_DARK)?;
    let light = parse(colors.light.as_deref(), DEFAULT_LIGHT)?;

    let modules = code.width() as u32;
    let margin = layer.margin.unwrap_or(DEFAULT_MARGIN);
    if margin > MAX_MARGIN {
        return Err(PosterError::qr_code(format!(
            "margin {margin} exceeds {MAX_MARGIN} modules"
        )));
    }
    let side_modules = modules + margin * 2;
    let side = side_modules * MODULE_PX;
    let cells = code.to_colors();

    let mut px = Vec::with_capacity(side as usize * side as usize * 4);
    for y in 0..side {
        let my = (y / MODULE_PX).checked_sub(margin).filter(|m| *m < modules);
        for x in 0..side {
            let mx = (x / MODULE_PX).checked_sub(margin).filter(|m| *m < modules);
            let is_dark = match (mx, my) {
                (Some(mx), Some(my)) => {
                    cells.get((my * modules + mx) as usize) == Some(&qrcode::Color::Dark)
                }
                _ => false,
            };
            px.extend_from_slice(if is_dark { &dark } else { &light });
        }
    }
    DecodedImage::from_rgba8(side, side, px)
}

/// Generate and draw a QR code into the layer's box, rotated about its center.
pub fn draw_qr_code(
    surface: &mut dyn Surface,
    layer: &QrCodeLayer,
    ratio: f64,
    resources: &ResourceManager,
) -> PosterResult<()> {
    let image = generate_qr_image(layer)?;
    let dst = scaled_rect(layer.x, layer.y, layer.width, layer.height, ratio);
    with_context(surface, &layer.style, ratio, resources, |s| {
        if let Some(angle) = layer.style.rotate.filter(|a| *a != 0.0) {
            rotate_about(s, angle, dst.center());
        }
        s.draw_image(&image, None, dst);
    });
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/qrcode.rs"]
mod tests;
