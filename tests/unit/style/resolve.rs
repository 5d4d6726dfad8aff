use super::*;
use crate::{
    assets::decode::DecodedImage,
    foundation::error::PosterError,
    model::style::{ColorStop, CompositeOp, LineCap, Repetition},
    surface::recording::{DrawCommand, RecordingSurface},
};

fn solid_loader() -> ResourceManager {
    ResourceManager::new(|_src: &str| async {
        Ok::<_, PosterError>(DecodedImage::solid(2, 2, [0, 0, 255, 255]))
    })
}

#[test]
fn scales_lengths_by_ratio() {
    let mut s = RecordingSurface::new(10, 10);
    let style = Style {
        line_width: Some(2.0),
        line_dash: Some(vec![4.0, 1.0]),
        shadow_blur: Some(3.0),
        shadow_offset_x: Some(1.0),
        shadow_offset_y: Some(-1.0),
        ..Style::default()
    };
    apply_styles(&mut s, &style, 2.0, &ResourceManager::default());
    let st = s.state();
    assert_eq!(st.line_width, 4.0);
    assert_eq!(st.line_dash, vec![8.0, 2.0]);
    assert_eq!(st.shadow_blur, 6.0);
    assert_eq!(st.shadow_offset, (2.0, -2.0));
}

#[test]
fn absent_fields_leave_state_untouched() {
    let mut s = RecordingSurface::new(10, 10);
    apply_styles(&mut s, &Style::default(), 3.0, &ResourceManager::default());
    assert!(s.commands().is_empty());
}

#[test]
fn gradients_are_scaled_into_device_space() {
    let fill = FillStyle::Paint(PaintSpec::Radial {
        x0: 1.0,
        y0: 2.0,
        r0: 0.0,
        x1: 1.0,
        y1: 2.0,
        r1: 5.0,
        stops: vec![ColorStop {
            offset: 0.0,
            color: "red".into(),
        }],
    });
    let paint = resolve_paint(&fill, 2.0, &ResourceManager::default());
    let Paint::RadialGradient {
        start,
        end_radius,
        stops,
        ..
    } = paint
    else {
        panic!("expected radial gradient, got {paint:?}");
    };
    assert_eq!(start, Point::new(2.0, 4.0));
    assert_eq!(end_radius, 10.0);
    assert_eq!(stops.len(), 1);
}

#[test]
fn pattern_resolves_from_cache_or_transparent() {
    let rm = solid_loader();
    let fill = FillStyle::Paint(PaintSpec::Pattern {
        image: "tile.png".into(),
        repetition: Some(Repetition::RepeatY),
    });
    assert_eq!(resolve_paint(&fill, 1.0, &rm), Paint::transparent());

    futures::executor::block_on(rm.load("tile.png")).unwrap();
    match resolve_paint(&fill, 1.0, &rm) {
        Paint::Pattern { image, repetition } => {
            assert_eq!(image.width, 2);
            assert_eq!(repetition, Repetition::RepeatY);
        }
        other => panic!("expected pattern, got {other:?}"),
    }
}

#[test]
fn with_context_restores_state() {
    let mut s = RecordingSurface::new(10, 10);
    let style = Style {
        global_composite_operation: Some(CompositeOp::Multiply),
        line_cap: Some(LineCap::Round),
        filter: Some("blur(2px)".into()),
        ..Style::default()
    };
    let seen = with_context(&mut s, &style, 1.0, &ResourceManager::default(), |surface| {
        surface.fill_rect(crate::foundation::core::Rect::new(0.0, 0.0, 1.0, 1.0));
        7
    });
    assert_eq!(seen, 7);
    assert_eq!(s.state().composite, CompositeOp::SourceOver);
    assert_eq!(s.save_depth(), 0);
    assert!(s.commands().contains(&DrawCommand::State(StateProp::Composite(
        CompositeOp::Multiply
    ))));
    assert!(s.commands().contains(&DrawCommand::State(StateProp::Filter(
        "blur(2px)".into()
    ))));
    assert_eq!(s.commands().first(), Some(&DrawCommand::Save));
    assert_eq!(s.commands().last(), Some(&DrawCommand::Restore));
}
