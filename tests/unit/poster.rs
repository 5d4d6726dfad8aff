use std::sync::{Arc, Mutex};

use futures::executor::block_on;
use serde_json::json;

use super::*;
use crate::{
    foundation::core::Rect,
    model::style::FillStyle,
    render::debug::GridOptions,
    surface::recording::{DrawCommand, RecordingSurface},
};

fn poster(w: u32, h: u32) -> DrawPoster<RecordingSurface> {
    DrawPoster::builder(RecordingSurface::new(w, h))
        .resources(ResourceManager::new(|_src: &str| async {
            Ok(DecodedImage::solid(4, 4, [0, 0, 255, 255]))
        }))
        .build()
        .unwrap()
}

fn rect(id: &str, x: f64, y: f64, w: f64, h: f64) -> Layer {
    let mut r = RectLayer::new(x, y, w, h);
    r.style.fill_style = Some(FillStyle::color(id));
    Layer::from(r).with_id(id)
}

#[test]
fn options_default_and_reject_bad_ratios() {
    let o = PosterOptions::default();
    assert_eq!(o.ratio, 1.0);
    assert!(o.debug.is_none());

    for ratio in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let err = DrawPoster::builder(RecordingSurface::new(1, 1))
            .ratio(ratio)
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, PosterError::Validation(_)));
    }
}

#[test]
fn options_parse_debug_toggle() {
    let o: PosterOptions = serde_json::from_value(json!({ "ratio": 2, "debug": true })).unwrap();
    assert_eq!(o.ratio, 2.0);
    assert_eq!(o.debug, Some(DebugOptions::default()));

    let o: PosterOptions = serde_json::from_value(json!({ "debug": false })).unwrap();
    assert_eq!(o, PosterOptions::default());

    let o: PosterOptions =
        serde_json::from_value(json!({ "debug": { "bounds": false, "grid": true } })).unwrap();
    let debug = o.debug.unwrap();
    assert!(!debug.bounds);
    assert_eq!(debug.grid, Some(GridOptions::default()));
}

#[test]
fn render_sorts_layers_and_records_stats() {
    let mut p = poster(100, 100);
    p.add_layer(rect("top", 0.0, 0.0, 10.0, 10.0).with_z_index(5.0));
    p.add_layer(rect("bottom", 0.0, 0.0, 10.0, 10.0));
    let stats = block_on(p.render()).unwrap();

    assert_eq!(stats.layer_count, 2);
    assert_eq!(p.stats(), stats);
    let ids: Vec<_> = p.layers().iter().filter_map(Layer::id).collect();
    assert_eq!(ids, ["bottom", "top"]);
}

#[test]
fn remove_layer_drops_every_match() {
    let mut p = poster(10, 10);
    p.add_layer(rect("a", 0.0, 0.0, 1.0, 1.0));
    p.add_layer(rect("b", 0.0, 0.0, 1.0, 1.0));
    p.add_layer(rect("a", 0.0, 0.0, 1.0, 1.0));

    assert!(p.remove_layer("a"));
    assert!(!p.remove_layer("a"));
    assert_eq!(p.layers().len(), 1);
    assert!(p.layer("b").is_some());
}

#[test]
fn align_single_layer_uses_logical_canvas() {
    let mut p = DrawPoster::builder(RecordingSurface::new(200, 100))
        .ratio(2.0)
        .build()
        .unwrap();
    p.add_layer(rect("a", 10.0, 10.0, 20.0, 10.0));
    p.align(AlignType::Right, Some(&["a"]));

    let b = p.layer_bounds("a").unwrap();
    assert_eq!((b.x, b.y), (80.0, 10.0));
}

#[test]
fn align_only_touches_named_layers() {
    let mut p = poster(200, 200);
    p.add_layer(rect("a", 0.0, 0.0, 10.0, 10.0));
    p.add_layer(rect("b", 50.0, 50.0, 10.0, 10.0));
    p.add_layer(rect("c", 100.0, 100.0, 10.0, 10.0));
    p.align(AlignType::Left, Some(&["b", "c"]));

    assert_eq!(p.layer_bounds("a").unwrap().x, 0.0);
    assert_eq!(p.layer_bounds("b").unwrap().x, 50.0);
    assert_eq!(p.layer_bounds("c").unwrap().x, 50.0);
}

#[test]
fn distribute_spaces_centers_evenly() {
    let mut p = poster(200, 200);
    p.add_layer(rect("a", 0.0, 0.0, 10.0, 10.0));
    p.add_layer(rect("b", 20.0, 0.0, 10.0, 10.0));
    p.add_layer(rect("c", 100.0, 0.0, 10.0, 10.0));
    p.distribute(DistributeAxis::Horizontal, None);

    assert_eq!(p.layer_bounds("b").unwrap().center_x(), 55.0);
}

#[test]
fn snap_layer_ignores_itself_and_hidden_layers() {
    let mut p = poster(200, 200);
    p.add_layer(rect("active", 12.0, 40.0, 10.0, 10.0));
    let mut hidden = rect("hidden", 11.0, 0.0, 10.0, 10.0);
    hidden.common_mut().visible = false;
    p.add_layer(hidden);
    p.add_layer(rect("target", 10.0, 100.0, 10.0, 10.0));

    let snap = p.snap_layer("active", 5.0).unwrap();
    assert_eq!(snap.dx, -2.0);
    assert_eq!(snap.dy, 0.0);
    assert!(p.snap_layer("missing", 5.0).is_none());
}

#[test]
fn hit_test_returns_topmost_id() {
    let mut p = poster(100, 100);
    p.add_layer(rect("under", 0.0, 0.0, 50.0, 50.0));
    p.add_layer(rect("over", 10.0, 10.0, 20.0, 20.0));

    assert_eq!(p.hit_test(15.0, 15.0).as_deref(), Some("over"));
    assert_eq!(p.hit_test(45.0, 45.0).as_deref(), Some("under"));
    assert_eq!(p.hit_test(90.0, 90.0), None);
}

#[test]
fn templates_create_without_adding() {
    let mut p = poster(10, 10);
    p.register_template("dot", |data: &Value| {
        let x = data["x"].as_f64().unwrap_or_default();
        Ok(vec![RectLayer::new(x, 0.0, 1.0, 1.0).into()])
    });
    p.register_json_template(
        "label",
        JsonTemplate::from_value(json!([{ "type": "text", "text": "{{title}}", "x": 0, "y": 0 }]))
            .unwrap(),
    );

    let dots = p
        .create_from_template("dot", &json!({ "x": 3 }), Some(Offset::new(1.0, 2.0)))
        .unwrap();
    let Layer::Rect(r) = &dots[0] else { panic!() };
    assert_eq!((r.x, r.y), (4.0, 2.0));

    let labels = p
        .create_from_template("label", &json!({ "title": "Hi" }), None)
        .unwrap();
    let Layer::Text(t) = &labels[0] else { panic!() };
    assert_eq!(t.text.as_deref(), Some("Hi"));

    assert!(p.layers().is_empty());
    assert!(matches!(
        p.create_from_template("nope", &Value::Null, None),
        Err(PosterError::UnknownTemplate(_))
    ));
}

struct Counter {
    inits: Arc<Mutex<u32>>,
    fail: bool,
}

impl Plugin for Counter {
    fn name(&self) -> &str {
        "counter"
    }

    fn on_init(&mut self, _surface: &mut dyn Surface, _options: &PosterOptions) -> PosterResult<()> {
        *self.inits.lock().unwrap() += 1;
        if self.fail {
            return Err(PosterError::plugin("init failed"));
        }
        Ok(())
    }
}

#[test]
fn plugins_initialize_once_and_failures_stay_detached() {
    let inits = Arc::new(Mutex::new(0));
    let mut p = DrawPoster::builder(RecordingSurface::new(10, 10))
        .plugin(Counter {
            inits: inits.clone(),
            fail: false,
        })
        .build()
        .unwrap();
    assert_eq!(*inits.lock().unwrap(), 1);
    assert_eq!(p.plugin_names(), ["counter"]);

    let err = p
        .use_plugin(Counter {
            inits: inits.clone(),
            fail: true,
        })
        .unwrap_err();
    assert!(matches!(err, PosterError::Plugin(_)));
    assert_eq!(*inits.lock().unwrap(), 2);
    assert_eq!(p.plugin_names().len(), 1);
}

#[test]
fn failing_plugin_in_builder_fails_build() {
    let result = DrawPoster::builder(RecordingSurface::new(10, 10))
        .plugin(Counter {
            inits: Arc::default(),
            fail: true,
        })
        .build();
    assert!(result.is_err());
}

#[test]
fn immediate_draws_scale_by_ratio() {
    let mut p = DrawPoster::builder(RecordingSurface::new(100, 100))
        .ratio(2.0)
        .build()
        .unwrap();
    let mut r = RectLayer::new(1.0, 2.0, 3.0, 4.0);
    r.style.fill_style = Some(FillStyle::color("red"));
    p.draw_rect(&r);

    let path = p
        .surface()
        .commands()
        .iter()
        .find_map(|c| match c {
            DrawCommand::FillPath(path) => Some(path.clone()),
            _ => None,
        })
        .unwrap();
    use kurbo::Shape as _;
    let bbox = path.bounding_box();
    assert_eq!((bbox.x0, bbox.y0, bbox.x1, bbox.y1), (2.0, 4.0, 8.0, 12.0));
}

#[test]
fn draw_image_loads_through_cache() {
    let mut p = poster(50, 50);
    block_on(p.draw_image(&ImageLayer::new("a.png", 0.0, 0.0, 8.0, 8.0))).unwrap();

    assert_eq!(p.resources().cached_len(), 1);
    assert!(p.surface().commands().iter().any(|c| matches!(
        c,
        DrawCommand::DrawImage {
            image_width: 4,
            image_height: 4,
            ..
        }
    )));
}

#[test]
fn draw_text_reports_extra_lines() {
    let mut p = poster(100, 100);
    let mut t = TextLayer::new("abcdef", 0.0, 0.0);
    t.max_width = Some(25.0);
    assert_eq!(p.draw_text(&t), 2);
    assert_eq!(p.surface().filled_text(), ["ab", "cd", "ef"]);
}

#[test]
fn wrap_text_truncates_with_ellipsis() {
    let mut p = poster(100, 100);
    let lines = p.wrap_text("abcdefgh", &Typography::default(), Some(40.0), Some(1));
    assert_eq!(lines, ["a..."]);
    assert_eq!(p.surface().save_depth(), 0);
}

#[test]
fn set_size_scales_and_validates() {
    let mut p = DrawPoster::builder(RecordingSurface::new(1, 1))
        .ratio(2.0)
        .build()
        .unwrap();
    p.set_size(300.0, 150.25).unwrap();
    assert_eq!(p.surface().size(), (600, 301));
    assert_eq!(p.size(), (300.0, 150.5));
    assert!(p.set_size(0.0, 10.0).is_err());
}

#[test]
fn clear_scales_the_region_by_ratio() {
    let mut p = DrawPoster::builder(RecordingSurface::new(40, 20))
        .ratio(2.0)
        .build()
        .unwrap();
    p.clear(Some([1.0, 2.0, 3.0, 4.0]));
    p.clear(None);
    assert_eq!(
        p.surface().commands(),
        [
            DrawCommand::ClearRect(Rect::new(2.0, 4.0, 8.0, 12.0)),
            DrawCommand::ClearRect(Rect::new(0.0, 0.0, 40.0, 20.0)),
        ]
    );
}

#[test]
fn transform_applies_translate_rotate_scale() {
    let mut p = DrawPoster::builder(RecordingSurface::new(10, 10))
        .ratio(2.0)
        .build()
        .unwrap();
    p.transform(&TransformOptions::default());
    assert!(p.surface().commands().is_empty());

    p.transform(&TransformOptions {
        translate_x: Some(5.0),
        scale_y: Some(3.0),
        ..TransformOptions::default()
    });
    assert_eq!(
        p.surface().commands(),
        [DrawCommand::Transform(Affine::new([
            1.0, 0.0, 0.0, 3.0, 10.0, 0.0
        ]))]
    );
}

#[test]
fn export_uses_whole_surface_by_default() {
    let mut p = DrawPoster::builder(RecordingSurface::new(8, 6))
        .ratio(2.0)
        .build()
        .unwrap();
    let full = p.export_image_data(None).unwrap();
    assert_eq!((full.width, full.height), (8, 6));
    let part = p.export_image_data(Some([0.0, 0.0, 2.0, 1.0])).unwrap();
    assert_eq!((part.width, part.height), (4, 2));

    let url = p.export_data_url(ExportFormat::Png, 1.0).unwrap();
    assert!(url.starts_with("data:image/png;base64,"));
    let blob = p.export_blob(ExportFormat::Jpeg, 0.8).unwrap();
    assert_eq!(blob.mime, "image/jpeg");
}

#[test]
fn debug_grid_draws_through_render() {
    let mut p = DrawPoster::builder(RecordingSurface::new(40, 40))
        .debug(DebugOptions {
            bounds: false,
            grid: Some(GridOptions::default()),
            guides: Vec::new(),
        })
        .build()
        .unwrap();
    block_on(p.render()).unwrap();
    let strokes = p
        .surface()
        .commands()
        .iter()
        .filter(|c| matches!(c, DrawCommand::StrokePath(_)))
        .count();
    assert_eq!(strokes, 6);
}
