//! Depth-colored composites of coverage rasters on a basemap.
//!
//! For each dataset id, every raster with that file stem anywhere in the
//! tree is merged into one RGBA layer. Each raster paints its present pixels
//! with the palette color of its nesting depth; rasters are applied in
//! lexicographic path order and later rasters win where they overlap.
//!
//! The merged layer is resized to a calibrated region of the basemap and
//! blended at fixed translucency. Blending goes through an explicit mask
//! rather than a paste so empty overlay pixels leave the basemap untouched.

use crate::labels::LabelRenderer;
use coverage_common::{Color, CoverageError, CoverageResult, DatasetLabels};
use image::imageops::{self, FilterType};
use image::{GrayImage, Rgba, RgbaImage};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Where the merged layer lands on the basemap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Placement {
    /// Size the merged layer is resized to, in basemap pixels.
    pub width: u32,
    pub height: u32,
    /// Top-left corner on the basemap; may be negative.
    pub x: i64,
    pub y: i64,
    /// Opacity of every non-transparent overlay pixel.
    pub opacity: u8,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            width: 1160,
            height: 1208,
            x: -37,
            y: 64,
            opacity: 128,
        }
    }
}

/// Positions and sizes of the stamped labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelLayout {
    pub title_position: (i32, i32),
    pub title_size: f32,
    pub detail_position: (i32, i32),
    pub date_position: (i32, i32),
    pub detail_size: f32,
    pub color: Color,
    /// chrono format string for the date label.
    pub date_format: String,
}

impl Default for LabelLayout {
    fn default() -> Self {
        Self {
            title_position: (560, 160),
            title_size: 40.0,
            detail_position: (580, 210),
            date_position: (580, 235),
            detail_size: 20.0,
            color: Color::rgb(40, 40, 255),
            date_format: "%b %-d, %Y".to_string(),
        }
    }
}

/// Settings for a composite run.
#[derive(Debug, Clone)]
pub struct CompositeOptions {
    pub placement: Placement,
    /// Colors by nesting depth, shallowest first; cycled when exhausted.
    pub palette: Vec<Color>,
    /// Extension (without dot) of the rasters to collect.
    pub raster_extension: String,
    pub labels: DatasetLabels,
    pub layout: LabelLayout,
    /// Flat directory receiving `<dataset>.png`.
    pub output_dir: PathBuf,
    /// Size every merged raster must have, normally the fixed-bounds raster
    /// size. `None` takes the size of the first raster in path order.
    pub raster_size: Option<(u32, u32)>,
}

impl Default for CompositeOptions {
    fn default() -> Self {
        Self {
            placement: Placement::default(),
            palette: coverage_common::default_nesting_palette(),
            raster_extension: crate::scan::DEFAULT_RASTER_EXTENSION.to_string(),
            labels: DatasetLabels::default(),
            layout: LabelLayout::default(),
            output_dir: PathBuf::from("composite"),
            raster_size: None,
        }
    }
}

/// A raster file found during discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterSource {
    pub path: PathBuf,
    pub dataset_id: String,
    /// Directory levels between the tree root and the raster's directory.
    pub depth: usize,
}

/// Find every raster under `root`, grouped by dataset id.
///
/// Within a group sources are ordered lexicographically by path; that order
/// decides overlap precedence when merging.
pub fn discover_rasters(
    root: &Path,
    extension: &str,
) -> CoverageResult<BTreeMap<String, Vec<RasterSource>>> {
    let mut groups: BTreeMap<String, Vec<RasterSource>> = BTreeMap::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let matches_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case(extension))
            .unwrap_or(false);
        if !matches_ext {
            continue;
        }
        let Some(dataset_id) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let depth = path
            .parent()
            .and_then(|p| p.strip_prefix(root).ok())
            .map(|rel| rel.components().count())
            .unwrap_or(0);

        groups
            .entry(dataset_id.to_string())
            .or_default()
            .push(RasterSource {
                path: path.to_path_buf(),
                dataset_id: dataset_id.to_string(),
                depth,
            });
    }

    for sources in groups.values_mut() {
        sources.sort_by(|a, b| a.path.cmp(&b.path));
    }

    Ok(groups)
}

/// Palette color for a nesting depth.
///
/// Depth 1 takes the first color; the root (depth 0) is treated as depth 1.
pub fn depth_color(depth: usize, palette: &[Color]) -> Rgba<u8> {
    if palette.is_empty() {
        return Rgba([0, 0, 0, 255]);
    }
    let idx = (depth.max(1) - 1) % palette.len();
    Rgba(palette[idx].to_rgba())
}

/// Merge gray rasters into one RGBA layer, in iteration order.
///
/// The layer is `size` when given, otherwise the size of the first raster.
/// Rasters of any other size are skipped. Returns `None` when no raster
/// contributed.
pub fn merge_layers<'a, I>(layers: I, size: Option<(u32, u32)>) -> Option<RgbaImage>
where
    I: IntoIterator<Item = (&'a GrayImage, Rgba<u8>)>,
{
    let mut merged: Option<RgbaImage> = None;

    for (raster, color) in layers {
        let (w, h) = size.unwrap_or_else(|| {
            merged
                .as_ref()
                .map(|m| m.dimensions())
                .unwrap_or(raster.dimensions())
        });
        if raster.dimensions() != (w, h) {
            warn!(
                expected = ?(w, h),
                actual = ?raster.dimensions(),
                "Raster size differs from the composite raster size, skipping"
            );
            continue;
        }
        let target = merged.get_or_insert_with(|| RgbaImage::from_pixel(w, h, Rgba([0, 0, 0, 0])));
        for (x, y, pixel) in raster.enumerate_pixels() {
            if pixel.0[0] != 0 {
                target.put_pixel(x, y, color);
            }
        }
    }

    merged
}

/// Resize `layer` and paste it onto a transparent canvas, clipping at the
/// canvas edges.
pub fn place_layer(layer: &RgbaImage, canvas_size: (u32, u32), placement: &Placement) -> RgbaImage {
    let resized = imageops::resize(layer, placement.width, placement.height, FilterType::Nearest);
    let mut canvas = RgbaImage::from_pixel(canvas_size.0, canvas_size.1, Rgba([0, 0, 0, 0]));

    let x_start = placement.x.max(0);
    let y_start = placement.y.max(0);
    let x_end = (placement.x + resized.width() as i64).min(canvas_size.0 as i64);
    let y_end = (placement.y + resized.height() as i64).min(canvas_size.1 as i64);

    for cy in y_start..y_end {
        for cx in x_start..x_end {
            let src = resized.get_pixel((cx - placement.x) as u32, (cy - placement.y) as u32);
            canvas.put_pixel(cx as u32, cy as u32, *src);
        }
    }

    canvas
}

/// Blend `overlay` onto `basemap` at fixed opacity.
///
/// Every overlay pixel with non-zero alpha counts as present regardless of
/// its own alpha; absent pixels keep the basemap unchanged. The basemap's
/// alpha channel is preserved.
pub fn blend_over(basemap: &RgbaImage, overlay: &RgbaImage, opacity: u8) -> RgbaImage {
    let mut out = basemap.clone();
    let a = opacity as u32;

    for (x, y, base) in out.enumerate_pixels_mut() {
        let Some(over) = overlay.get_pixel_checked(x, y) else {
            continue;
        };
        if over.0[3] == 0 {
            continue;
        }
        for c in 0..3 {
            let mixed = over.0[c] as u32 * a + base.0[c] as u32 * (255 - a);
            base.0[c] = ((mixed + 127) / 255) as u8;
        }
    }

    out
}

/// Load the basemap once; failure is fatal for the composite stage.
pub fn load_basemap(path: &Path) -> CoverageResult<RgbaImage> {
    let img = image::open(path).map_err(|e| CoverageError::Basemap {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(img.to_rgba8())
}

/// Builds one annotated composite per dataset id.
pub struct CompositeBuilder<'a, L: LabelRenderer> {
    basemap: RgbaImage,
    labels: &'a L,
    options: CompositeOptions,
    date: String,
}

impl<'a, L: LabelRenderer> CompositeBuilder<'a, L> {
    pub fn new(basemap: RgbaImage, labels: &'a L, options: CompositeOptions) -> Self {
        let date = chrono::Local::now()
            .format(&options.layout.date_format)
            .to_string();
        Self {
            basemap,
            labels,
            options,
            date,
        }
    }

    /// Replace the date label text.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    pub fn options(&self) -> &CompositeOptions {
        &self.options
    }

    /// Merge a dataset's rasters from disk into one RGBA layer.
    pub fn merge_sources(&self, sources: &[RasterSource]) -> CoverageResult<Option<RgbaImage>> {
        let mut loaded = Vec::with_capacity(sources.len());
        for source in sources {
            let img = image::open(&source.path)
                .map_err(|e| CoverageError::image(&source.path, e))?
                .to_luma8();
            let color = depth_color(source.depth, &self.options.palette);
            debug!(
                dataset = %source.dataset_id,
                path = %source.path.display(),
                depth = source.depth,
                color = ?color.0,
                "Adding raster to composite"
            );
            loaded.push((img, color));
        }
        Ok(merge_layers(
            loaded.iter().map(|(img, color)| (img, *color)),
            self.options.raster_size,
        ))
    }

    /// Composite one dataset onto the basemap and stamp its labels.
    pub fn compose(&self, dataset_id: &str, layer: &RgbaImage) -> RgbaImage {
        let placement = &self.options.placement;
        let overlay = place_layer(layer, self.basemap.dimensions(), placement);
        let mut out = blend_over(&self.basemap, &overlay, placement.opacity);
        self.annotate(&mut out, dataset_id);
        out
    }

    /// Stamp display name, raw dataset id and date.
    pub fn annotate(&self, image: &mut RgbaImage, dataset_id: &str) {
        let layout = &self.options.layout;
        let color = Rgba(layout.color.to_rgba());
        let title = self.options.labels.display_name(dataset_id);
        let detail = format!("Filename base: '{}'", dataset_id);

        let (x, y) = layout.title_position;
        self.labels.draw_label(image, &title, x, y, layout.title_size, color);
        let (x, y) = layout.detail_position;
        self.labels.draw_label(image, &detail, x, y, layout.detail_size, color);
        let (x, y) = layout.date_position;
        self.labels.draw_label(image, &self.date, x, y, layout.detail_size, color);
    }

    /// Build and write a composite for every dataset found under `root`.
    pub fn build_all(&self, root: &Path) -> CoverageResult<Vec<PathBuf>> {
        let out_dir = &self.options.output_dir;
        fs::create_dir_all(out_dir).map_err(|e| CoverageError::io(out_dir, e))?;
        let out_abs = fs::canonicalize(out_dir).map_err(|e| CoverageError::io(out_dir, e))?;

        let mut groups = discover_rasters(root, &self.options.raster_extension)?;
        for sources in groups.values_mut() {
            sources.retain(|s| {
                fs::canonicalize(&s.path)
                    .map(|p| !p.starts_with(&out_abs))
                    .unwrap_or(true)
            });
        }
        groups.retain(|_, sources| !sources.is_empty());

        let written: Vec<Option<PathBuf>> = groups
            .par_iter()
            .map(|(dataset_id, sources)| self.build_one(dataset_id, sources))
            .collect::<CoverageResult<_>>()?;

        Ok(written.into_iter().flatten().collect())
    }

    fn build_one(&self, dataset_id: &str, sources: &[RasterSource]) -> CoverageResult<Option<PathBuf>> {
        info!(dataset = %dataset_id, rasters = sources.len(), "Generating composite");

        let Some(layer) = self.merge_sources(sources)? else {
            return Ok(None);
        };
        let composite = self.compose(dataset_id, &layer);

        let path = self.options.output_dir.join(format!("{}.png", dataset_id));
        composite
            .save(&path)
            .map_err(|e| CoverageError::image(&path, e))?;
        info!(dataset = %dataset_id, path = %path.display(), "Wrote composite");
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_color_cycles() {
        let palette = coverage_common::default_nesting_palette();
        assert_eq!(depth_color(1, &palette), Rgba([255, 0, 0, 255]));
        assert_eq!(depth_color(0, &palette), Rgba([255, 0, 0, 255]));
        assert_eq!(depth_color(2, &palette), Rgba([255, 165, 0, 255]));
        assert_eq!(depth_color(8, &palette), Rgba([0, 0, 0, 255]));
        assert_eq!(depth_color(9, &palette), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_blend_half_opacity() {
        let base = RgbaImage::from_pixel(2, 1, Rgba([200, 200, 200, 255]));
        let mut overlay = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 0]));
        overlay.put_pixel(0, 0, Rgba([255, 0, 0, 255]));

        let out = blend_over(&base, &overlay, 128);
        assert_eq!(out.get_pixel(1, 0), &Rgba([200, 200, 200, 255]));
        let p = out.get_pixel(0, 0);
        assert_eq!(p.0[0], ((255 * 128 + 200 * 127 + 127) / 255) as u8);
        assert_eq!(p.0[1], ((200 * 127 + 127) / 255) as u8);
        assert_eq!(p.0[3], 255);
    }

    #[test]
    fn test_place_layer_negative_offset_clips() {
        let layer = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]));
        let placement = Placement {
            width: 4,
            height: 4,
            x: -2,
            y: -3,
            opacity: 128,
        };
        let canvas = place_layer(&layer, (5, 5), &placement);
        assert_eq!(canvas.get_pixel(0, 0), &Rgba([1, 2, 3, 255]));
        assert_eq!(canvas.get_pixel(1, 0), &Rgba([1, 2, 3, 255]));
        assert_eq!(canvas.get_pixel(2, 0), &Rgba([0, 0, 0, 0]));
        assert_eq!(canvas.get_pixel(0, 1), &Rgba([0, 0, 0, 0]));
    }
}
