//! Directory scanning and the raster tree walk.
//!
//! The root directory may size each dataset's raster from its own tiles;
//! every directory below it is rendered under one fixed bounding box so
//! rasters at all depths line up pixel for pixel.

use crate::raster::{render_raster, CoverageRaster, RasterGeometry, RasterStyle};
use coverage_common::{
    CoverageError, CoverageResult, GridBounds, GridCoordinate, ParsedTileId, TileNameError,
    TILE_EXTENSION,
};
use projection::ProjectionTable;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default fixed bounds used below the root: roughly 112.5-125 W, 32-42.5 N.
pub const DEFAULT_FIXED_BOUNDS: GridBounds = GridBounds {
    min_gx: -500,
    max_gx: -450,
    min_gy: -169,
    max_gy: -128,
};

/// Default extension of written rasters.
pub const DEFAULT_RASTER_EXTENSION: &str = "bmp";

/// Tiles found directly in one directory.
#[derive(Debug, Default)]
pub struct DirectoryTiles {
    /// Distinct grid coordinates per dataset id.
    pub datasets: BTreeMap<String, BTreeSet<GridCoordinate>>,
    /// Tile-extension files whose names did not parse.
    pub rejected: Vec<TileNameError>,
}

/// Parse every tile filename directly inside `dir` (no recursion).
///
/// Files without the tile extension are ignored; malformed tile names are
/// logged and recorded.
pub fn collect_tiles(dir: &Path) -> CoverageResult<DirectoryTiles> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| CoverageError::io(dir, e))? {
        let entry = entry.map_err(|e| CoverageError::io(dir, e))?;
        let file_type = entry.file_type().map_err(|e| CoverageError::io(entry.path(), e))?;
        if !file_type.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    names.sort();

    let mut tiles = DirectoryTiles::default();
    let suffix = format!(".{}", TILE_EXTENSION);
    for name in names.iter().filter(|n| n.ends_with(&suffix)) {
        match ParsedTileId::from_filename(name) {
            Ok(tile) => {
                let coord = tile.grid_coordinate();
                debug!(file = %name, gx = coord.gx, gy = coord.gy, "Parsed tile");
                tiles
                    .datasets
                    .entry(tile.dataset_id)
                    .or_default()
                    .insert(coord);
            }
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Skipping malformed tile filename");
                tiles.rejected.push(e);
            }
        }
    }

    Ok(tiles)
}

/// Render one raster per non-empty dataset.
///
/// With `bounds` set, every dataset shares that box; otherwise each dataset
/// is sized from its own coordinates. Datasets whose rows fall outside the
/// projection domain are logged and skipped.
pub fn render_rasters(
    datasets: &BTreeMap<String, BTreeSet<GridCoordinate>>,
    bounds: Option<GridBounds>,
    table: &ProjectionTable,
    style: &RasterStyle,
) -> BTreeMap<String, CoverageRaster> {
    let mut rasters = BTreeMap::new();

    for (dataset_id, coords) in datasets {
        if coords.is_empty() {
            continue;
        }
        let Some(dataset_bounds) = bounds.or_else(|| GridBounds::from_coords(coords)) else {
            continue;
        };

        let geometry = match RasterGeometry::new(dataset_bounds, table) {
            Ok(g) => g,
            Err(e) => {
                warn!(dataset = %dataset_id, error = %e, "Cannot size raster, skipping dataset");
                continue;
            }
        };

        debug!(
            dataset = %dataset_id,
            width = geometry.width,
            height = geometry.height,
            origin = geometry.origin,
            "Creating raster"
        );
        let raster = render_raster(dataset_id, coords, geometry, table, style);
        rasters.insert(dataset_id.clone(), raster);
    }

    rasters
}

/// Settings for a raster tree walk.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Bounds applied to every directory below the root.
    pub fixed_bounds: GridBounds,
    /// Also apply `fixed_bounds` at the root.
    pub fixed_bounds_at_root: bool,
    /// Extension (without dot) of written rasters.
    pub raster_extension: String,
    /// Where the mirrored raster tree goes; `None` writes beside the tiles.
    pub output_root: Option<PathBuf>,
    pub style: RasterStyle,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            fixed_bounds: DEFAULT_FIXED_BOUNDS,
            fixed_bounds_at_root: false,
            raster_extension: DEFAULT_RASTER_EXTENSION.to_string(),
            output_root: None,
            style: RasterStyle::default(),
        }
    }
}

impl RenderOptions {
    /// Pixel size of every raster rendered under the fixed bounds.
    pub fn fixed_raster_size(&self, table: &ProjectionTable) -> CoverageResult<(u32, u32)> {
        let geometry = RasterGeometry::new(self.fixed_bounds, table)?;
        Ok((geometry.width, geometry.height))
    }
}

/// Outcome of rendering a single directory.
#[derive(Debug)]
pub struct DirectoryRender {
    pub rasters: BTreeMap<String, CoverageRaster>,
    pub written: Vec<PathBuf>,
    pub rejected: Vec<TileNameError>,
}

/// Totals from one tree walk.
#[derive(Debug, Default, Clone)]
pub struct RenderSummary {
    pub directories: usize,
    pub rejected_files: usize,
    pub written: Vec<PathBuf>,
}

/// Walks a tile tree and writes coverage rasters.
pub struct TreeRenderer<'a> {
    table: &'a ProjectionTable,
    options: RenderOptions,
}

impl<'a> TreeRenderer<'a> {
    pub fn new(table: &'a ProjectionTable, options: RenderOptions) -> Self {
        Self { table, options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Directory that receives the rasters for `dir`.
    pub fn output_dir(&self, root: &Path, dir: &Path) -> PathBuf {
        match &self.options.output_root {
            Some(out) => match dir.strip_prefix(root) {
                Ok(rel) => out.join(rel),
                Err(_) => out.clone(),
            },
            None => dir.to_path_buf(),
        }
    }

    /// Scan, render and write rasters for a single directory.
    pub fn render_directory(
        &self,
        root: &Path,
        dir: &Path,
        bounds: Option<GridBounds>,
    ) -> CoverageResult<DirectoryRender> {
        info!(dir = %dir.display(), "Processing directory");
        let tiles = collect_tiles(dir)?;
        let rasters = render_rasters(&tiles.datasets, bounds, self.table, &self.options.style);

        let mut written = Vec::with_capacity(rasters.len());
        if !rasters.is_empty() {
            let out_dir = self.output_dir(root, dir);
            fs::create_dir_all(&out_dir).map_err(|e| CoverageError::io(&out_dir, e))?;
            for raster in rasters.values() {
                written.push(self.write_raster(&out_dir, raster)?);
            }
        }

        Ok(DirectoryRender {
            rasters,
            written,
            rejected: tiles.rejected,
        })
    }

    /// Write a raster as `<dataset>.<ext>` into `out_dir`.
    pub fn write_raster(&self, out_dir: &Path, raster: &CoverageRaster) -> CoverageResult<PathBuf> {
        let path = out_dir.join(format!(
            "{}.{}",
            raster.dataset_id, self.options.raster_extension
        ));
        raster
            .image
            .save(&path)
            .map_err(|e| CoverageError::image(&path, e))?;
        info!(
            path = %path.display(),
            cells = raster.cells,
            width = raster.geometry.width,
            height = raster.geometry.height,
            "Wrote coverage raster"
        );
        Ok(path)
    }

    /// Render `root` and every directory below it.
    ///
    /// Directories are visited depth-first in lexicographic order using an
    /// explicit stack. Any filesystem error aborts the walk.
    pub fn render_tree(&self, root: &Path) -> CoverageResult<RenderSummary> {
        let mut summary = RenderSummary::default();
        let root_bounds = self
            .options
            .fixed_bounds_at_root
            .then_some(self.options.fixed_bounds);
        let output_root = match &self.options.output_root {
            Some(out) => {
                fs::create_dir_all(out).map_err(|e| CoverageError::io(out, e))?;
                Some(fs::canonicalize(out).map_err(|e| CoverageError::io(out, e))?)
            }
            None => None,
        };
        let mut stack: Vec<(PathBuf, Option<GridBounds>)> = vec![(root.to_path_buf(), root_bounds)];

        while let Some((dir, bounds)) = stack.pop() {
            let result = self.render_directory(root, &dir, bounds)?;
            summary.directories += 1;
            summary.rejected_files += result.rejected.len();
            summary.written.extend(result.written);

            let mut subdirs = list_subdirs(&dir, output_root.as_deref())?;
            subdirs.sort();
            for sub in subdirs.into_iter().rev() {
                stack.push((sub, Some(self.options.fixed_bounds)));
            }
        }

        info!(
            directories = summary.directories,
            rasters = summary.written.len(),
            rejected = summary.rejected_files,
            "Raster tree complete"
        );
        Ok(summary)
    }

}

/// Immediate subdirectories of `dir`, excluding the canonical `skip` tree.
fn list_subdirs(dir: &Path, skip: Option<&Path>) -> CoverageResult<Vec<PathBuf>> {
    let mut subdirs = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| CoverageError::io(dir, e))? {
        let entry = entry.map_err(|e| CoverageError::io(dir, e))?;
        let file_type = entry.file_type().map_err(|e| CoverageError::io(entry.path(), e))?;
        if !file_type.is_dir() {
            continue;
        }
        let path = entry.path();
        if let Some(skip) = skip {
            let canonical = fs::canonicalize(&path).map_err(|e| CoverageError::io(&path, e))?;
            if canonical == skip {
                debug!(dir = %path.display(), "Skipping raster output tree");
                continue;
            }
        }
        subdirs.push(path);
    }
    Ok(subdirs)
}
