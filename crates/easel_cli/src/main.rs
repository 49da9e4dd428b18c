//! Easel CLI
//!
//! Render declarative canvas scenes to PNG with the software backend.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use easel_core::CommandKind;
use easel_raster::{RasterBackend, RasterFont};
use easel_render::{BackendContext, CanvasConfig, CanvasPlugin, ComponentRef, PluginRegistry};

mod scene;

use scene::{Scene, SceneBridge};

#[derive(Parser)]
#[command(name = "easel")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Immediate-mode canvas renderer", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a scene file to PNG
    Render {
        /// Scene file (TOML)
        scene: PathBuf,

        /// Output PNG path
        #[arg(short, long, default_value = "out.png")]
        output: PathBuf,

        /// Image width, overrides the scene
        #[arg(long)]
        width: Option<u32>,

        /// Image height, overrides the scene
        #[arg(long)]
        height: Option<u32>,

        /// Renderer config (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Font file for text commands; a system font is tried otherwise
        #[arg(long)]
        font: Option<PathBuf>,

        /// Font size in pixels
        #[arg(long, default_value = "16")]
        font_size: f32,
    },

    /// List command kinds and their IDs
    Kinds,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Render {
            scene,
            output,
            width,
            height,
            config,
            font,
            font_size,
        } => cmd_render(RenderArgs {
            scene: &scene,
            output: &output,
            width,
            height,
            config: config.as_deref(),
            font: font.as_deref(),
            font_size,
        }),

        Commands::Kinds => cmd_kinds(),
    }
}

struct RenderArgs<'a> {
    scene: &'a Path,
    output: &'a Path,
    width: Option<u32>,
    height: Option<u32>,
    config: Option<&'a Path>,
    font: Option<&'a Path>,
    font_size: f32,
}

fn load_font(args: &RenderArgs<'_>, scene: &Scene) -> Result<Option<RasterFont>> {
    if let Some(path) = args.font {
        let font = RasterFont::load(path, args.font_size)
            .with_context(|| format!("Failed to load font {}", path.display()))?;
        return Ok(Some(font));
    }
    if !scene.has_text() {
        return Ok(None);
    }
    match RasterFont::system_default(args.font_size) {
        Ok(font) => Ok(Some(font)),
        Err(err) => {
            warn!("{err}; text will be skipped (pass --font to choose one)");
            Ok(None)
        }
    }
}

fn cmd_render(args: RenderArgs<'_>) -> Result<()> {
    let scene = Scene::load(args.scene)?;
    let config = match args.config {
        Some(path) => CanvasConfig::load(path)?,
        None => CanvasConfig::default(),
    };

    let width = args.width.unwrap_or(scene.canvas.width);
    let height = args.height.unwrap_or(scene.canvas.height);
    if width == 0 || height == 0 {
        anyhow::bail!("Image size must be non-zero, got {}x{}", width, height);
    }

    let font = load_font(&args, &scene)?;
    let bounds = scene.canvas.bounds_in(width, height);

    let mut backend = RasterBackend::new(width, height);
    if let Some(background) = scene.canvas.background {
        backend.clear(background.0.channels());
    }
    let white = backend.white_texture();

    info!(
        "Rendering {} ({} draw calls) at {}x{}",
        args.scene.display(),
        scene.draw.len(),
        width,
        height
    );

    let plugin = CanvasPlugin::new(config);
    let mut registry = PluginRegistry::<RasterBackend>::new();
    plugin.init(&mut registry, Box::new(SceneBridge::new(scene.draw)))?;

    let report = {
        let mut ctx = BackendContext::new(&mut backend).with_white_texture(&white);
        if let Some(font) = &font {
            ctx = ctx.with_font(font);
        }
        registry.render_component(
            plugin.slot(),
            &mut ctx,
            ComponentRef::new(plugin.slot(), 1),
            bounds,
        )
    };
    plugin.shutdown(&mut registry);
    let report = report?;

    if report.skipped > 0 || report.failed > 0 {
        warn!(
            "{} command(s) skipped, {} failed",
            report.skipped, report.failed
        );
    }

    backend.save_png(args.output)?;
    info!(
        "Drew {} of {} commands into {}",
        report.drawn + report.approximated,
        report.recorded,
        args.output.display()
    );
    Ok(())
}

fn cmd_kinds() -> Result<()> {
    println!("{:<8} KIND", "ID");
    for kind in CommandKind::ALL {
        println!("{:#06x}   {}", kind.id(), kind);
    }
    Ok(())
}
