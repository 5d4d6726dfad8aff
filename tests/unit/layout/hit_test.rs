use super::*;
use crate::{model::layer::RectLayer, surface::recording::RecordingSurface};

fn rect(id: &str, z: f64) -> Layer {
    Layer::from(RectLayer::new(0.0, 0.0, 100.0, 100.0))
        .with_id(id)
        .with_z_index(z)
}

#[test]
fn higher_z_index_wins() {
    let mut s = RecordingSurface::new(200, 200);
    let layers = vec![rect("top", 2.0), rect("bottom", 1.0)];
    assert_eq!(hit_test(&mut s, &layers, 50.0, 50.0).as_deref(), Some("top"));
}

#[test]
fn later_layer_wins_ties() {
    let mut s = RecordingSurface::new(200, 200);
    let layers = vec![rect("first", 0.0), rect("second", 0.0)];
    assert_eq!(hit_test(&mut s, &layers, 10.0, 10.0).as_deref(), Some("second"));
}

#[test]
fn skips_hidden_locked_and_anonymous_layers() {
    let mut s = RecordingSurface::new(200, 200);
    let mut hidden = rect("hidden", 5.0);
    hidden.common_mut().visible = false;
    let mut locked = rect("locked", 4.0);
    locked.common_mut().locked = true;
    let anonymous = Layer::from(RectLayer::new(0.0, 0.0, 100.0, 100.0)).with_z_index(3.0);
    let layers = vec![rect("base", 0.0), hidden, locked, anonymous];
    assert_eq!(hit_test(&mut s, &layers, 1.0, 1.0).as_deref(), Some("base"));
}

#[test]
fn misses_outside_every_box() {
    let mut s = RecordingSurface::new(200, 200);
    assert_eq!(hit_test(&mut s, &[rect("a", 0.0)], 150.0, 10.0), None);
    assert_eq!(hit_test(&mut s, &[rect("a", 0.0)], 100.0, 100.0).as_deref(), Some("a"));
}
