//! drawposter is a retained-mode 2D poster renderer.
//!
//! A [`DrawPoster`] owns a drawing [`Surface`] and a list of declarative [`Layer`]s (shapes, text,
//! images, QR codes). Calling [`DrawPoster::render`] sorts the layers by z-index and paints them
//! at the configured device ratio. Around that core sit:
//!
//! - Layout helpers: bounds, align/distribute, snapping, hit testing
//! - Templates that expand data into layers, in code or as JSON with `{{path}}` placeholders
//! - Plugins with init/before/after hooks
//! - PNG/JPEG export
//!
//! [`CpuSurface`] rasterizes on the CPU; [`RecordingSurface`] records calls for tests and tooling.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub(crate) mod assets;
pub(crate) mod export;
pub(crate) mod foundation;
pub(crate) mod layout;
pub(crate) mod model;
pub(crate) mod plugin;
pub(crate) mod poster;
pub(crate) mod render;
pub(crate) mod style;
pub(crate) mod surface;
pub(crate) mod template;
pub(crate) mod text;

pub use crate::foundation::core::{
    Affine, BezPath, BoundingBox, Offset, Point, Rect, Vec2,
};
pub use crate::foundation::error::{PosterError, PosterResult};

pub use crate::assets::decode::{DecodedImage, decode_image, parse_data_url};
pub use crate::assets::loader::{FsImageLoader, IMAGE_ROOT_ENV, ImageLoader, normalize_rel_path};
pub use crate::assets::resource::ResourceManager;

pub use crate::model::layer::{
    CircleLayer, Crop, ImageLayer, Layer, LayerCommon, LineLayer, ObjectFit, PolygonLayer,
    QrCodeLayer, QrColors, QrErrorLevel, Radius, RectLayer, TextLayer,
};
pub use crate::model::style::{
    ColorStop, CompositeOp, FillStyle, LineCap, LineJoin, PaintSpec, Repetition, Style,
};
pub use crate::model::text::{FontWeight, TextAlign, TextBaseline, TextSpan, Typography};

pub use crate::style::color::{Rgba, parse_css_color};
pub use crate::style::resolve::{apply_styles, resolve_paint, scale_value, with_context};

pub use crate::surface::cpu::CpuSurface;
pub use crate::surface::recording::{DrawCommand, RecordedState, RecordingSurface};
pub use crate::surface::{FontSpec, ImageData, Paint, StateProp, Surface};

pub use crate::text::layout::{DEFAULT_FONT_SIZE, build_font, draw_text, layout_lines};
pub use crate::text::rich::{
    RichLine, RichSegment, draw_rich_text, layout_rich_lines, merge_span,
};

pub use crate::layout::align::{AlignType, DistributeAxis, align, distribute};
pub use crate::layout::bounds::{get_layer_bounds, move_layer};
pub use crate::layout::hit_test::hit_test;
pub use crate::layout::snap::{
    DEFAULT_SNAP_THRESHOLD, SnapLine, SnapOrientation, SnapResult, get_snap_lines,
};

pub use crate::render::debug::{
    DebugOptions, GridOptions, GuideDirection, GuideLine, draw_debug_bounds, draw_debug_grid,
    draw_debug_guide, render_debug_helpers,
};
pub use crate::render::image::{draw_image, fit_rects, scale9_slices};
pub use crate::render::mask::apply_mask;
pub use crate::render::pipeline::{RenderStats, render_layers};
pub use crate::render::qrcode::{draw_qr_code, generate_qr_image};
pub use crate::render::shapes::{
    create_layer_path, draw_circle, draw_line, draw_polygon, draw_rect, normalize_radius,
    rounded_rect_path,
};

pub use crate::template::json::{JsonTemplate, lookup_path};
pub use crate::template::registry::{TemplateFn, TemplateRegistry, apply_layer_offset};

pub use crate::export::{
    Blob, ExportFormat, encode_image, export_image_data, jpeg_quality, to_blob, to_data_url,
};
pub use crate::plugin::Plugin;
pub use crate::poster::{DrawPoster, DrawPosterBuilder, PosterOptions, TransformOptions};
