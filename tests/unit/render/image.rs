use super::*;
use crate::{
    model::layer::Radius,
    surface::recording::{DrawCommand, RecordingSurface},
};

fn draws(s: &RecordingSurface) -> Vec<(Option<Rect>, Rect)> {
    s.commands()
        .iter()
        .filter_map(|c| match c {
            DrawCommand::DrawImage { src, dst, .. } => Some((*src, *dst)),
            _ => None,
        })
        .collect()
}

#[test]
fn plain_image_fills_the_scaled_box() {
    let res = ResourceManager::default();
    let img = DecodedImage::solid(4, 2, [255, 0, 0, 255]);
    let mut s = RecordingSurface::new(100, 100);
    draw_image(&mut s, &ImageLayer::new("a.png", 5.0, 5.0, 10.0, 10.0), &img, 2.0, &res);
    assert_eq!(draws(&s), vec![(None, Rect::new(10.0, 10.0, 30.0, 30.0))]);
    assert_eq!(s.save_depth(), 0);
}

#[test]
fn scale9_draws_nine_slices() {
    let res = ResourceManager::default();
    let img = DecodedImage::solid(100, 100, [0, 0, 0, 255]);
    let mut layer = ImageLayer::new("a.png", 0.0, 0.0, 200.0, 200.0);
    layer.scale9_grid = Some([10.0, 10.0, 10.0, 10.0]);
    let mut s = RecordingSurface::new(200, 200);
    draw_image(&mut s, &layer, &img, 1.0, &res);

    let d = draws(&s);
    assert_eq!(d.len(), 9);
    assert_eq!(
        d[4],
        (
            Some(Rect::new(10.0, 10.0, 90.0, 90.0)),
            Rect::new(10.0, 10.0, 190.0, 190.0)
        )
    );
}

#[test]
fn scale9_skips_zero_sized_slices() {
    let slices = scale9_slices(
        100.0,
        100.0,
        Rect::new(0.0, 0.0, 50.0, 50.0),
        [0.0, 10.0, 0.0, 10.0],
        1.0,
    );
    assert_eq!(slices.len(), 3);
}

#[test]
fn crop_scales_with_ratio() {
    let res = ResourceManager::default();
    let img = DecodedImage::solid(100, 100, [0, 0, 0, 255]);
    let mut layer = ImageLayer::new("a.png", 0.0, 0.0, 10.0, 10.0);
    layer.crop = Some(Crop {
        sx: 5.0,
        sy: 6.0,
        sw: 20.0,
        sh: 30.0,
    });
    let mut s = RecordingSurface::new(100, 100);
    draw_image(&mut s, &layer, &img, 2.0, &res);
    assert_eq!(
        draws(&s),
        vec![(
            Some(Rect::new(10.0, 12.0, 50.0, 72.0)),
            Rect::new(0.0, 0.0, 20.0, 20.0)
        )]
    );
}

#[test]
fn object_fit_contain_and_cover() {
    let dst = Rect::new(0.0, 0.0, 100.0, 50.0);
    let (src, d) = fit_rects(200.0, 200.0, dst, ObjectFit::Contain);
    assert_eq!(src, None);
    assert_eq!(d, Rect::new(25.0, 0.0, 75.0, 50.0));

    let (src, d) = fit_rects(200.0, 200.0, dst, ObjectFit::Cover);
    assert_eq!(src, Some(Rect::new(0.0, 50.0, 200.0, 150.0)));
    assert_eq!(d, dst);
}

#[test]
fn rounded_image_clips_before_drawing() {
    let res = ResourceManager::default();
    let img = DecodedImage::solid(1, 1, [0, 0, 0, 255]);
    let mut layer = ImageLayer::new("a.png", 0.0, 0.0, 10.0, 10.0);
    layer.radius = Some(Radius::Uniform(2.0));
    let mut s = RecordingSurface::new(20, 20);
    draw_image(&mut s, &layer, &img, 1.0, &res);
    let clip_at = s
        .commands()
        .iter()
        .position(|c| matches!(c, DrawCommand::Clip(_)))
        .unwrap();
    let draw_at = s
        .commands()
        .iter()
        .position(|c| matches!(c, DrawCommand::DrawImage { .. }))
        .unwrap();
    assert!(clip_at < draw_at);
}
