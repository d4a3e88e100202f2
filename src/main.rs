use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use eframe::egui;

mod app;
mod config;
mod error;
mod export;
mod scale;
mod selection;
mod session;
mod transform;
mod workspace;
mod zoom;

use config::Config;
use scale::ScalePolicy;
use session::Session;

/// Crop square regions out of a folder of images into per-class folders.
///
/// Draw with the left button, drag with the right one. `.` archives the image
/// and moves on, a class key saves the square, space zooms into it,
/// backspace resets and escape quits.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Directory holding the images to review.
    root: PathBuf,

    /// JSON file overriding the default settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// How oversized images are scaled down.
    #[arg(long, value_enum)]
    scale_policy: Option<ScalePolicy>,
}

// ── Main ────────────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(policy) = cli.scale_policy {
        config.scale_policy = policy;
    }

    let session = Session::open(&cli.root, config)
        .with_context(|| format!("cannot start reviewing {}", cli.root.display()))?;
    let (max_width, max_height) = (session.config().max_width, session.config().max_height);

    let app = app::AnnotatorApp::new(session);
    let title = app.title().to_owned();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([max_width as f32, max_height as f32 + 28.0])
            .with_title(&title),
        ..Default::default()
    };

    eframe::run_native(&title, options, Box::new(move |_cc| Ok(Box::new(app))))
        .map_err(|err| anyhow::anyhow!("failed to run the viewer: {err}"))
}
