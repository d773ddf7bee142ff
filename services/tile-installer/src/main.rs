//! Tile installer.
//!
//! Copies a nested tile tree into a one-level layout, either from a
//! directory set found under the root or from a list file.

mod install;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "tile-installer")]
#[command(about = "Install nested tile sets into a flat target directory")]
struct Args {
    /// Root of the source tile tree
    root: PathBuf,

    /// A list file of paths relative to the root, or a directory name under it
    directory_set: String,

    /// Target directory; without it the planned paths are written to
    /// `<directory_set>.txt`
    #[arg(short, long)]
    target: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let list_file = PathBuf::from(&args.directory_set);
    if list_file.is_file() {
        let Some(target) = &args.target else {
            anyhow::bail!("A target directory is required when installing from a list file");
        };
        info!(list = %list_file.display(), "Installing from list file");
        let plan = install::plan_list(&args.root, &list_file)?;
        let copied = install::execute(&plan, target)?;
        info!(files = copied, "Done");
        return Ok(());
    }

    if !args.root.is_dir() {
        anyhow::bail!("Root directory {} was not found", args.root.display());
    }

    let Some(base) = install::find_directory_set(&args.root, &args.directory_set)? else {
        anyhow::bail!(
            "Directory set {} was not found under {}",
            args.directory_set,
            args.root.display()
        );
    };
    info!(base = %base.display(), "Found directory set");

    let plan = install::plan_flatten(&base)?;
    match &args.target {
        Some(target) => {
            let copied = install::execute(&plan, target)?;
            info!(files = copied, target = %target.display(), "Done");
        }
        None => {
            let listing = PathBuf::from(format!("{}.txt", args.directory_set));
            install::write_listing(&plan, &listing)?;
            info!(files = plan.len(), listing = %listing.display(), "Wrote install listing");
        }
    }

    Ok(())
}
