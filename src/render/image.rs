use crate::{
    assets::{decode::DecodedImage, resource::ResourceManager},
    foundation::core::Rect,
    model::layer::{Crop, ImageLayer, ObjectFit},
    render::shapes::{normalize_radius, rotate_about, rounded_rect_path, scaled_rect},
    style::resolve::{scale_value, with_context},
    surface::Surface,
};

/// Source and destination rectangles for `object-fit` inside `dst`.
///
/// `src` is `None` when the whole image is drawn.
pub fn fit_rects(image_w: f64, image_h: f64, dst: Rect, fit: ObjectFit) -> (Option<Rect>, Rect) {
    if image_w <= 0.0 || image_h <= 0.0 || dst.width() <= 0.0 || dst.height() <= 0.0 {
        return (None, dst);
    }
    match fit {
        ObjectFit::Fill => (None, dst),
        ObjectFit::Contain => {
            let scale = (dst.width() / image_w).min(dst.height() / image_h);
            let (w, h) = (image_w * scale, image_h * scale);
            let center = dst.center();
            (
                None,
                Rect::from_center_size(center, (w, h)),
            )
        }
        ObjectFit::Cover => {
            let scale = (dst.width() / image_w).max(dst.height() / image_h);
            let (sw, sh) = (dst.width() / scale, dst.height() / scale);
            let src = Rect::from_origin_size(((image_w - sw) / 2.0, (image_h - sh) / 2.0), (sw, sh));
            (Some(src), dst)
        }
    }
}

/// Split `[start, end)` into three spans with fixed `lead` and `trail` lengths.
fn three_spans(start: f64, end: f64, lead: f64, trail: f64) -> [(f64, f64); 3] {
    [
        (start, start + lead),
        (start + lead, end - trail),
        (end - trail, end),
    ]
}

/// Nine-slice pairs of `(src, dst)` rectangles; zero-sized slices are dropped.
///
/// `grid` is `[top, right, bottom, left]` in image pixels. `ratio` scales the insets on the
/// destination side so borders keep their logical size.
pub fn scale9_slices(
    image_w: f64,
    image_h: f64,
    dst: Rect,
    grid: [f64; 4],
    ratio: f64,
) -> Vec<(Rect, Rect)> {
    let [top, right, bottom, left] = grid;
    let src_cols = three_spans(0.0, image_w, left, right);
    let src_rows = three_spans(0.0, image_h, top, bottom);
    let dst_cols = three_spans(
        dst.x0,
        dst.x1,
        scale_value(left, ratio),
        scale_value(right, ratio),
    );
    let dst_rows = three_spans(
        dst.y0,
        dst.y1,
        scale_value(top, ratio),
        scale_value(bottom, ratio),
    );

    let mut out = Vec::with_capacity(9);
    for (row, drow) in src_rows.iter().zip(&dst_rows) {
        for (col, dcol) in src_cols.iter().zip(&dst_cols) {
            let src = Rect::new(col.0, row.0, col.1, row.1);
            let d = Rect::new(dcol.0, drow.0, dcol.1, drow.1);
            if src.width() > 0.0 && src.height() > 0.0 && d.width() > 0.0 && d.height() > 0.0 {
                out.push((src, d));
            }
        }
    }
    out
}

fn crop_rect(crop: &Crop, ratio: f64) -> Rect {
    scaled_rect(crop.sx, crop.sy, crop.sw, crop.sh, ratio)
}

/// Draw an already-decoded image layer.
///
/// Rotation pivots on the destination center and the rounded-corner clip is applied in the
/// rotated frame. Nine-slice wins over crop, which wins over object fit. Crop coordinates are
/// multiplied by `ratio` like the destination box.
pub fn draw_image(
    surface: &mut dyn Surface,
    layer: &ImageLayer,
    image: &DecodedImage,
    ratio: f64,
    resources: &ResourceManager,
) {
    let dst = scaled_rect(layer.x, layer.y, layer.width, layer.height, ratio);
    let (iw, ih) = (f64::from(image.width), f64::from(image.height));

    with_context(surface, &layer.style, ratio, resources, |s| {
        if let Some(angle) = layer.style.rotate.filter(|a| *a != 0.0) {
            rotate_about(s, angle, dst.center());
        }
        if let Some(radius) = layer.radius.as_ref().filter(|r| !r.is_zero()) {
            let radii = normalize_radius(Some(radius)).map(|r| scale_value(r, ratio));
            s.clip(&rounded_rect_path(dst, radii));
        }

        if let Some(grid) = layer.scale9_grid {
            for (src, d) in scale9_slices(iw, ih, dst, grid, ratio) {
                s.draw_image(image, Some(src), d);
            }
        } else if let Some(crop) = &layer.crop {
            s.draw_image(image, Some(crop_rect(crop, ratio)), dst);
        } else {
            let (src, d) = fit_rects(iw, ih, dst, layer.object_fit.unwrap_or_default());
            s.draw_image(image, src, d);
        }
    });
}

#[cfg(test)]
#[path = "../../tests/unit/render/image.rs"]
mod tests;
