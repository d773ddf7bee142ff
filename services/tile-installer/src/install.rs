//! Flattening copy of a nested tile tree.
//!
//! Map viewers read at most one directory level, so nested tile sets are
//! installed as `<target>/<leaf dir>/<tile>`; any other file lands directly
//! in `<target>`.

use anyhow::{Context, Result};
use coverage_common::tile::is_tile_filename;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// One file to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCopy {
    pub source: PathBuf,
    /// Destination relative to the install target.
    pub target: PathBuf,
}

/// Locate the directory set under `root`.
///
/// Every directory whose path ends with `name` matches; the last one in
/// walk order wins.
pub fn find_directory_set(root: &Path, name: &str) -> Result<Option<PathBuf>> {
    let mut found = None;
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if entry.file_type().is_dir() && entry.path().ends_with(name) {
            found = Some(entry.into_path());
        }
    }
    Ok(found)
}

/// Plan a flattening copy of everything below `base`.
pub fn plan_flatten(base: &Path) -> Result<Vec<PlannedCopy>> {
    let mut plan = Vec::new();
    for entry in WalkDir::new(base).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", base.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().into_owned();
        let target = if is_tile_filename(&file_name) {
            let leaf = entry
                .path()
                .parent()
                .and_then(|p| p.file_name())
                .map(PathBuf::from)
                .unwrap_or_default();
            leaf.join(&file_name)
        } else {
            debug!(file = %entry.path().display(), "Not a tile, installing at top level");
            PathBuf::from(&file_name)
        };
        plan.push(PlannedCopy {
            source: entry.into_path(),
            target,
        });
    }
    Ok(plan)
}

/// Plan a copy from a list file of paths relative to `root`.
///
/// Each entry keeps its relative path under the target. Entries that do
/// not exist are logged and skipped.
pub fn plan_list(root: &Path, list_file: &Path) -> Result<Vec<PlannedCopy>> {
    let content = fs::read_to_string(list_file)
        .with_context(|| format!("Failed to read list file {}", list_file.display()))?;

    let mut plan = Vec::new();
    for line in content.lines().map(str::trim_end).filter(|l| !l.is_empty()) {
        let source = root.join(line);
        if !source.is_file() {
            warn!(file = %source.display(), "Skipping missing file named in list");
            continue;
        }
        plan.push(PlannedCopy {
            source,
            target: PathBuf::from(line),
        });
    }
    Ok(plan)
}

/// Copy every planned file under `target`, creating directories as needed.
pub fn execute(plan: &[PlannedCopy], target: &Path) -> Result<usize> {
    fs::create_dir_all(target)
        .with_context(|| format!("Failed to create target {}", target.display()))?;

    for copy in plan {
        let dest = target.join(&copy.target);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::copy(&copy.source, &dest).with_context(|| {
            format!("Failed to copy {} to {}", copy.source.display(), dest.display())
        })?;
        info!(from = %copy.source.display(), to = %dest.display(), "Installed");
    }
    Ok(plan.len())
}

/// Write the planned target paths, one per line.
pub fn write_listing(plan: &[PlannedCopy], path: &Path) -> Result<()> {
    let mut out = String::new();
    for copy in plan {
        out.push_str(&copy.target.to_string_lossy());
        out.push('\n');
    }
    fs::write(path, out).with_context(|| format!("Failed to write listing {}", path.display()))
}
