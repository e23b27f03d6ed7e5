use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use textsnap::page::{Page, PageConfig};
use textsnap::raster::Rasterizer;
use textsnap::{snapshot, Format, ResvgRasterizer, Snapshot, SnapshotOptions, Target};

/// Snapshot the rendered text of an HTML document as SVG or PNG
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// HTML file to render
    input: PathBuf,

    /// CSS selector of the element to snapshot (defaults to the whole page)
    #[arg(short, long)]
    selector: Option<String>,

    /// Output format: svg, canvas, img or blob
    #[arg(short, long)]
    format: Option<String>,

    /// Output width in pixels
    #[arg(long)]
    width: Option<f64>,

    /// Output height in pixels
    #[arg(long)]
    height: Option<f64>,

    /// Padding around the text in pixels
    #[arg(long)]
    padding: Option<f64>,

    /// Multiplier for the output size
    #[arg(long)]
    scalar: Option<f64>,

    /// Layout viewport width in pixels
    #[arg(long)]
    viewport_width: Option<f64>,

    /// JSON file with snapshot options; flags override its values
    #[arg(long)]
    options: Option<PathBuf>,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Args {
    fn snapshot_options(&self) -> Result<SnapshotOptions> {
        let mut opts = match &self.options {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("reading options from {}", path.display()))?;
                SnapshotOptions::from_json(&json)
                    .with_context(|| format!("parsing options from {}", path.display()))?
            }
            None => SnapshotOptions::default(),
        };
        if let Some(format) = &self.format {
            opts.format = format.parse::<Format>()?;
        }
        if self.width.is_some() {
            opts.width = self.width;
        }
        if self.height.is_some() {
            opts.height = self.height;
        }
        if let Some(padding) = self.padding {
            opts.padding = padding;
        }
        if let Some(scalar) = self.scalar {
            opts.scalar = scalar;
        }
        Ok(opts)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("textsnap=info"))
        .init();

    let args = Args::parse();
    let options = args.snapshot_options()?;

    let html = fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let mut config = PageConfig::default();
    if let Some(width) = args.viewport_width {
        config.viewport_width = width;
    }
    let page = Page::parse(&html, config);

    let target = match args.selector.as_deref() {
        Some(selector) => Target::Selector(selector),
        None => Target::Node(page.root()),
    };

    let rasterizer = ResvgRasterizer::new();
    let result = snapshot(&page, &rasterizer, target, &options)
        .await
        .context("snapshot failed")?;

    let bytes = match result {
        Snapshot::Svg(doc) => doc.to_svg().into_bytes(),
        Snapshot::Canvas(bitmap) => {
            if bitmap.is_empty() {
                Vec::new()
            } else {
                rasterizer.encode_png(&bitmap)?
            }
        }
        Snapshot::Image(image) => image.src.into_bytes(),
        Snapshot::Blob(png) => png,
    };
    log::info!("{} snapshot: {} bytes", options.format, bytes.len());

    match &args.output {
        Some(path) => fs::write(path, &bytes)
            .with_context(|| format!("writing {}", path.display()))?,
        None => std::io::stdout().write_all(&bytes)?,
    }
    Ok(())
}
