use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pixstack", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply an edit document to an image and write a PNG.
    Render(RenderArgs),
    /// Report which rendering backends are usable on this machine.
    Probe,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Source image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Edit document JSON. Sticker assets resolve relative to its directory.
    #[arg(long)]
    edits: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Backend preference; overrides the document and `PIXSTACK_RENDERER`.
    #[arg(long, value_enum)]
    renderer: Option<RendererChoice>,

    /// Output size (`800x600`, `800x`, `x600`, `^800x600`); overrides the document.
    #[arg(long)]
    dimensions: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RendererChoice {
    Auto,
    Canvas,
}

impl From<RendererChoice> for pixstack::BackendPreference {
    fn from(c: RendererChoice) -> Self {
        match c {
            RendererChoice::Auto => Self::Auto,
            RendererChoice::Canvas => Self::Canvas,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Probe => cmd_probe(),
    }
}

fn read_document(path: &Path) -> anyhow::Result<pixstack::EditDocument> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read edit document '{}'", path.display()))?;
    pixstack::EditDocument::from_json_str(&raw)
        .with_context(|| format!("parse edit document '{}'", path.display()))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let doc = read_document(&args.edits)?;
    let image = pixstack::load_image(&args.in_path)?;

    // Precedence: CLI flag, then environment, then document.
    let mut opts = pixstack::PipelineOpts {
        preference: doc.renderer,
        dimensions: doc.dimensions,
    }
    .with_env_overrides()?;
    if let Some(choice) = args.renderer {
        opts.preference = choice.into();
    }
    if let Some(dims) = &args.dimensions {
        opts.dimensions = dims.parse()?;
    }

    let assets_root = args.edits.parent().unwrap_or_else(|| Path::new("."));
    let assets = pixstack::AssetStore::load_all(assets_root, &doc.assets)?;
    let registry = pixstack::OperationRegistry::with_builtin();
    let ops = registry.build_stack(&doc.operations, &assets)?;

    let mut pipeline = pixstack::RenderPipeline::new(&image, opts)?;
    let result = pipeline.render(&ops)?;

    let rgba = result
        .surface
        .to_rgba_image()
        .context("surface buffer does not match its dimensions")?;
    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    rgba.save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    tracing::info!(
        backend = %result.stats.backend,
        operations = result.stats.operations_applied,
        resized = result.stats.resized,
        size = %result.size,
        "render complete"
    );
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_probe() -> anyhow::Result<()> {
    let backends = pixstack::Backends::default();
    for factory in [backends.accelerated.as_ref(), backends.raster.as_ref()] {
        let status = if factory.is_supported() {
            "supported"
        } else {
            "unsupported"
        };
        println!("{}: {status}", factory.kind());
    }
    match backends.select(pixstack::BackendPreference::Auto) {
        Ok(f) => println!("auto selects: {}", f.kind()),
        Err(e) => println!("auto selects: none ({e})"),
    }
    Ok(())
}
