use super::*;
use crate::{
    model::layer::{CircleLayer, RectLayer},
    surface::recording::RecordingSurface,
};

fn rect_x(layer: &Layer) -> (f64, f64) {
    match layer {
        Layer::Rect(r) => (r.x, r.y),
        other => panic!("expected rect, got {}", other.kind()),
    }
}

#[test]
fn single_target_aligns_to_canvas() {
    let mut s = RecordingSurface::new(800, 600);
    let mut layer: Layer = RectLayer::new(100.0, 40.0, 50.0, 20.0).into();

    align(&mut s, &mut [&mut layer], AlignType::Center, 800.0, 600.0);
    assert_eq!(rect_x(&layer), (375.0, 40.0));

    align(&mut s, &mut [&mut layer], AlignType::Right, 800.0, 600.0);
    assert_eq!(rect_x(&layer), (750.0, 40.0));

    align(&mut s, &mut [&mut layer], AlignType::Bottom, 800.0, 600.0);
    assert_eq!(rect_x(&layer), (750.0, 580.0));

    align(&mut s, &mut [&mut layer], AlignType::Middle, 800.0, 600.0);
    assert_eq!(rect_x(&layer), (750.0, 290.0));
}

#[test]
fn several_targets_align_to_their_union() {
    let mut s = RecordingSurface::new(800, 600);
    let mut a: Layer = RectLayer::new(10.0, 0.0, 20.0, 10.0).into();
    let mut b: Layer = RectLayer::new(100.0, 50.0, 40.0, 10.0).into();

    align(&mut s, &mut [&mut a, &mut b], AlignType::Right, 800.0, 600.0);
    assert_eq!(rect_x(&a).0, 120.0);
    assert_eq!(rect_x(&b).0, 100.0);

    align(&mut s, &mut [&mut a, &mut b], AlignType::Top, 800.0, 600.0);
    assert_eq!(rect_x(&a).1, 0.0);
    assert_eq!(rect_x(&b).1, 0.0);
}

#[test]
fn align_moves_circles_by_their_box() {
    let mut s = RecordingSurface::new(200, 200);
    let mut c: Layer = CircleLayer::new(50.0, 50.0, 10.0).into();
    align(&mut s, &mut [&mut c], AlignType::Left, 200.0, 200.0);
    let Layer::Circle(c) = &c else { unreachable!() };
    assert_eq!((c.x, c.y), (10.0, 50.0));
}

#[test]
fn align_with_no_targets_is_a_noop() {
    let mut s = RecordingSurface::new(10, 10);
    align(&mut s, &mut [], AlignType::Left, 10.0, 10.0);
}

#[test]
fn distribute_spaces_interior_centers_evenly() {
    let mut s = RecordingSurface::new(800, 600);
    let mut a: Layer = RectLayer::new(250.0, 0.0, 50.0, 10.0).into();
    let mut b: Layer = RectLayer::new(0.0, 0.0, 50.0, 10.0).into();
    let mut c: Layer = RectLayer::new(50.0, 0.0, 50.0, 10.0).into();

    distribute(&mut s, &mut [&mut a, &mut b, &mut c], DistributeAxis::Horizontal);
    assert_eq!(rect_x(&a).0, 250.0);
    assert_eq!(rect_x(&b).0, 0.0);
    assert_eq!(rect_x(&c).0 + 25.0, 150.0);
}

#[test]
fn distribute_vertical_and_too_few_targets() {
    let mut s = RecordingSurface::new(800, 600);
    let mut a: Layer = RectLayer::new(0.0, 0.0, 10.0, 10.0).into();
    let mut b: Layer = RectLayer::new(0.0, 10.0, 10.0, 10.0).into();
    distribute(&mut s, &mut [&mut a, &mut b], DistributeAxis::Vertical);
    assert_eq!(rect_x(&b).1, 10.0);

    let mut c: Layer = RectLayer::new(0.0, 100.0, 10.0, 10.0).into();
    let mut d: Layer = RectLayer::new(0.0, 70.0, 10.0, 10.0).into();
    distribute(
        &mut s,
        &mut [&mut a, &mut b, &mut c, &mut d],
        DistributeAxis::Vertical,
    );
    assert_eq!(rect_x(&a).1, 0.0);
    assert_eq!(rect_x(&c).1, 100.0);
    let mut ys = [rect_x(&b).1, rect_x(&d).1];
    ys.sort_by(f64::total_cmp);
    assert!((ys[0] - 100.0 / 3.0).abs() < 1e-9);
    assert!((ys[1] - 200.0 / 3.0).abs() < 1e-9);
}

#[test]
fn parses_names() {
    assert_eq!("middle".parse::<AlignType>().unwrap(), AlignType::Middle);
    assert_eq!(
        "vertical".parse::<DistributeAxis>().unwrap(),
        DistributeAxis::Vertical
    );
    assert!("diagonal".parse::<DistributeAxis>().is_err());
}
