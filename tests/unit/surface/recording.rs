use super::*;

#[test]
fn save_restore_scopes_state() {
    let mut s = RecordingSurface::new(100, 100);
    s.set_state(StateProp::GlobalAlpha(0.5));
    s.save();
    s.set_state(StateProp::GlobalAlpha(0.25));
    s.translate(10.0, 0.0);
    assert_eq!(s.state().global_alpha, 0.25);
    assert_eq!(s.save_depth(), 1);
    s.restore();
    assert_eq!(s.state().global_alpha, 0.5);
    assert_eq!(s.state().transform, Affine::IDENTITY);
    assert_eq!(s.save_depth(), 0);
}

#[test]
fn restore_without_save_is_harmless() {
    let mut s = RecordingSurface::new(10, 10);
    s.restore();
    assert_eq!(s.commands(), &[DrawCommand::Restore]);
}

#[test]
fn measures_fixed_advance_per_char() {
    let mut s = RecordingSurface::new(10, 10);
    assert_eq!(s.measure_text("héllo"), 50.0);
    let mut s = s.with_char_advance(4.0);
    assert_eq!(s.measure_text("ab"), 8.0);
}

#[test]
fn records_paint_commands_in_order() {
    let mut s = RecordingSurface::new(10, 10);
    s.fill_rect(Rect::new(0.0, 0.0, 5.0, 5.0));
    s.fill_text("hi", 1.0, 2.0, None);
    s.set_state(StateProp::LineWidth(2.0));
    s.draw_image(
        &DecodedImage::solid(3, 2, [0, 0, 0, 255]),
        None,
        Rect::new(0.0, 0.0, 6.0, 4.0),
    );
    let paints: Vec<_> = s.paint_commands().collect();
    assert_eq!(paints.len(), 3);
    assert!(matches!(paints[0], DrawCommand::FillPath(_)));
    assert!(matches!(
        paints[2],
        DrawCommand::DrawImage { image_width: 3, image_height: 2, .. }
    ));
    assert_eq!(s.filled_text(), vec!["hi"]);
}

#[test]
fn set_size_resets_state() {
    let mut s = RecordingSurface::new(10, 10);
    s.save();
    s.set_state(StateProp::Composite(CompositeOp::Multiply));
    s.set_size(20, 30);
    assert_eq!(s.size(), (20, 30));
    assert_eq!(s.state().composite, CompositeOp::SourceOver);
    assert_eq!(s.save_depth(), 0);
}

#[test]
fn read_pixels_returns_transparent_buffer() {
    let mut s = RecordingSurface::new(10, 10);
    let data = s.read_pixels(Rect::new(0.0, 0.0, 4.0, 2.0)).unwrap();
    assert_eq!((data.width, data.height), (4, 2));
    assert!(data.data.iter().all(|b| *b == 0));
}
