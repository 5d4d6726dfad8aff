use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use drawposter::{
    CpuSurface, DebugOptions, DrawPoster, ExportFormat, FsImageLoader, JsonTemplate, Layer, Offset,
    PosterOptions, ResourceManager, TemplateRegistry,
};

#[derive(Parser, Debug)]
#[command(name = "drawposter", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a poster document to PNG or JPEG.
    Render(RenderArgs),
    /// Instantiate a JSON template and print the resulting layers.
    Template(TemplateArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Poster document: a layer array or `{ width, height, ratio, debug, layers }`.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output image; a `.jpg`/`.jpeg` extension selects JPEG.
    #[arg(long)]
    out: PathBuf,

    /// Logical width (overrides the document).
    #[arg(long)]
    width: Option<f64>,

    /// Logical height (overrides the document).
    #[arg(long)]
    height: Option<f64>,

    /// Device pixels per logical unit (overrides the document).
    #[arg(long)]
    ratio: Option<f64>,

    /// TTF/OTF files to register; the first one is the fallback family.
    #[arg(long = "font")]
    fonts: Vec<PathBuf>,

    /// Root for relative image paths; defaults to the document's directory.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Outline every layer.
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// JPEG quality in `0..=1`.
    #[arg(long, default_value_t = 0.92)]
    quality: f64,
}

#[derive(Parser, Debug)]
struct TemplateArgs {
    /// JSON array of layer descriptors with `{{path}}` placeholders.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// JSON data the placeholders resolve against.
    #[arg(long)]
    data: Option<PathBuf>,

    /// Horizontal offset applied to every layer.
    #[arg(long, default_value_t = 0.0)]
    dx: f64,

    /// Vertical offset applied to every layer.
    #[arg(long, default_value_t = 0.0)]
    dy: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PosterDocument {
    Layers(Vec<Layer>),
    Full(FullDocument),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FullDocument {
    #[serde(default)]
    width: Option<f64>,
    #[serde(default)]
    height: Option<f64>,
    #[serde(flatten)]
    options: PosterOptions,
    layers: Vec<Layer>,
}

const DEFAULT_SIZE: (f64, f64) = (800.0, 600.0);

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Template(args) => cmd_template(args),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let bytes = std::fs::read(path).with_context(|| format!("read '{}'", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parse json '{}'", path.display()))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let doc = match read_json::<PosterDocument>(&args.in_path)? {
        PosterDocument::Layers(layers) => FullDocument {
            width: None,
            height: None,
            options: PosterOptions::default(),
            layers,
        },
        PosterDocument::Full(doc) => doc,
    };

    let width = args.width.or(doc.width).unwrap_or(DEFAULT_SIZE.0);
    let height = args.height.or(doc.height).unwrap_or(DEFAULT_SIZE.1);
    let mut options = doc.options;
    if let Some(ratio) = args.ratio {
        options.ratio = ratio;
    }
    if args.debug && options.debug.is_none() {
        options.debug = Some(DebugOptions::default());
    }

    let mut surface = CpuSurface::new(1, 1)?;
    for path in &args.fonts {
        let bytes = std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        let family = surface.register_font(bytes)?;
        tracing::debug!(family = %family, path = %path.display(), "font registered");
    }

    let assets_root = match args.assets {
        Some(root) => root,
        None => args
            .in_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf(),
    };

    let mut poster = DrawPoster::builder(surface)
        .options(options)
        .resources(ResourceManager::new(FsImageLoader::new(assets_root)))
        .build()?;
    poster.set_size(width, height)?;
    for layer in doc.layers {
        poster.add_layer(layer);
    }

    let stats = futures::executor::block_on(poster.render())?;

    let format = args
        .out
        .extension()
        .and_then(|ext| ext.to_str())
        .map(ExportFormat::from_mime)
        .unwrap_or_default();
    let blob = poster.export_blob(format, args.quality)?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, &blob.bytes)
        .with_context(|| format!("write {} '{}'", blob.mime, args.out.display()))?;

    eprintln!(
        "wrote {} ({} layers in {:.1} ms)",
        args.out.display(),
        stats.layer_count,
        stats.render_time.as_secs_f64() * 1000.0
    );
    Ok(())
}

fn cmd_template(args: TemplateArgs) -> anyhow::Result<()> {
    let template = JsonTemplate::from_value(read_json(&args.in_path)?)?;
    let data = match &args.data {
        Some(path) => read_json(path)?,
        None => serde_json::Value::Null,
    };

    let mut registry = TemplateRegistry::new();
    registry.register_json("cli", template);
    let layers = registry.create("cli", &data, Some(Offset::new(args.dx, args.dy)))?;

    println!("{}", serde_json::to_string_pretty(&layers)?);
    Ok(())
}
