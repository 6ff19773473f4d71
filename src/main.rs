use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;

use vcanvas::{
    init_logging, Canvas, Config, DocumentFile, Session, SessionReport, TinySkiaSurface,
    BUILD_DATE, VERSION,
};

/// Replays a scripted editing session against a vector canvas.
#[derive(Parser, Debug)]
#[command(name = "vcanvas", version, about)]
struct Args {
    /// Editor configuration (JSON or TOML); defaults to the user config file
    #[arg(long, env = "VCANVAS_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Document to open before the session runs
    #[arg(long, value_name = "FILE")]
    document: Option<PathBuf>,

    /// Session script with the input steps to replay
    #[arg(long, value_name = "FILE")]
    session: Option<PathBuf>,

    /// Where to save the resulting document
    #[arg(long, value_name = "FILE")]
    save: Option<PathBuf>,

    /// Where to write a PNG of the resulting canvas
    #[arg(long, value_name = "FILE.png")]
    render: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default_path()
            .map(|path| Config::load_or_default(&path))
            .unwrap_or_default(),
    };
    init_logging(&config.logging)?;
    info!("vcanvas {} (built {})", VERSION, BUILD_DATE);

    let mut document = match &args.document {
        Some(path) => Some(DocumentFile::load_from_file(path)?),
        None => None,
    };
    let mut canvas = Canvas::default();
    config.apply_to(&mut canvas);
    if let Some(doc) = &document {
        doc.apply_to(&mut canvas);
    }

    let report = match &args.session {
        Some(path) => Session::load_from_file(path)?.run(&mut canvas)?,
        None => SessionReport::from_canvas(&canvas),
    };

    if let Some(path) = &args.save {
        let doc = match document.as_mut() {
            Some(doc) => {
                doc.update_from(&canvas);
                doc.clone()
            }
            None => DocumentFile::new("Untitled", &canvas),
        };
        doc.save_to_file(path)?;
    }

    if let Some(path) = &args.render {
        render_png(&canvas, path)?;
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn render_png(canvas: &Canvas, path: &Path) -> Result<()> {
    let (width, height) = canvas.viewport().control_size();
    let mut surface =
        TinySkiaSurface::new(width.ceil().max(1.0) as u32, height.ceil().max(1.0) as u32)?;
    canvas.redraw(&mut surface)?;
    let png = surface.encode_png()?;
    std::fs::write(path, png)
        .with_context(|| format!("Failed to write image {}", path.display()))?;
    info!(
        "Rendered {}x{} canvas to {}",
        surface.width(),
        surface.height(),
        path.display()
    );
    Ok(())
}
