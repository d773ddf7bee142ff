//! Coverage map generator.
//!
//! Renders one coverage raster per dataset for every directory of a tile
//! tree, then merges them into depth-colored composites on a basemap.

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use config::CoverageConfig;
use projection::ProjectionTable;
use renderer::composite::load_basemap;
use renderer::{CompositeBuilder, FontLabelRenderer, TreeRenderer};

#[derive(Parser, Debug)]
#[command(name = "coverage-map")]
#[command(about = "Render tile coverage rasters and composite maps")]
struct Args {
    /// Root of the tile tree
    root: PathBuf,

    /// Configuration file path
    #[arg(short, long, env = "COVERAGE_CONFIG")]
    config: Option<PathBuf>,

    /// Mirror rasters into this directory instead of beside the tiles
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory for composite images
    #[arg(long)]
    composite_dir: Option<PathBuf>,

    /// Basemap image
    #[arg(long)]
    basemap: Option<PathBuf>,

    /// TrueType font for labels
    #[arg(long)]
    font: Option<PathBuf>,

    /// Skip raster rendering and composite existing rasters
    #[arg(long)]
    skip_render: bool,

    /// Render rasters only
    #[arg(long)]
    skip_composite: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false);
    if args.json_logs {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    info!(root = %args.root.display(), "Starting coverage map");

    let config = load_config(&args)?;

    if !args.root.is_dir() {
        anyhow::bail!("Tile root {} is not a directory", args.root.display());
    }

    let table = ProjectionTable::build(config.projection)
        .context("Invalid projection parameters")?;
    info!(
        calibration = ?config.projection.calibration,
        rows = ?table.domain(),
        "Built projection table"
    );

    if args.skip_render {
        info!("Skipping raster rendering");
    } else {
        let renderer = TreeRenderer::new(&table, config.render_options());
        let summary = renderer
            .render_tree(&args.root)
            .context("Raster rendering failed")?;
        if summary.rejected_files > 0 {
            warn!(count = summary.rejected_files, "Some tile filenames could not be parsed");
        }
    }

    if args.skip_composite {
        info!("Skipping composites");
        return Ok(());
    }

    // Both resources are required before any composite is written
    let basemap = load_basemap(&config.basemap).context("Failed to load basemap")?;
    let font = FontLabelRenderer::from_file(&config.font).context("Failed to load font")?;
    info!(
        basemap = %config.basemap.display(),
        width = basemap.width(),
        height = basemap.height(),
        "Loaded basemap"
    );

    let raster_root = config.output.clone().unwrap_or_else(|| args.root.clone());
    let options = config.composite_options(&table)?;
    let builder = CompositeBuilder::new(basemap, &font, options);
    let written = builder
        .build_all(&raster_root)
        .context("Composite generation failed")?;

    info!(
        composites = written.len(),
        dir = %config.composite_dir.display(),
        "Coverage map complete"
    );
    Ok(())
}

/// Config file, then environment, then flags.
fn load_config(args: &Args) -> Result<CoverageConfig> {
    let mut config = match &args.config {
        Some(path) => CoverageConfig::from_yaml(path)?,
        None => CoverageConfig::default(),
    };
    config.apply_env()?;

    if let Some(output) = &args.output {
        config.output = Some(output.clone());
    }
    if let Some(dir) = &args.composite_dir {
        config.composite_dir = dir.clone();
    }
    if let Some(basemap) = &args.basemap {
        config.basemap = basemap.clone();
    }
    if let Some(font) = &args.font {
        config.font = font.clone();
    }

    Ok(config)
}
