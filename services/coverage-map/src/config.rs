//! Coverage map configuration.
//!
//! Values come from an optional YAML file (with `${VAR}` and
//! `${VAR:-default}` substitution), then `COVERAGE_*` environment variables,
//! then command-line flags.

use anyhow::{Context, Result};
use coverage_common::{Color, CoverageError, CoverageResult, DatasetLabels, GridBounds};
use projection::{CalibrationMode, ProjectionParams, ProjectionTable};
use renderer::composite::LabelLayout;
use renderer::raster::RasterStyle;
use renderer::scan::{DEFAULT_FIXED_BOUNDS, DEFAULT_RASTER_EXTENSION};
use renderer::{CompositeOptions, Placement, RenderOptions};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level coverage map configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageConfig {
    /// Vertical projection parameters
    pub projection: ProjectionParams,

    /// Bounds shared by every directory below the root
    pub fixed_bounds: GridBounds,

    /// Apply `fixed_bounds` at the root as well
    pub fixed_bounds_at_root: bool,

    /// Gray levels of rendered cells
    pub style: RasterStyle,

    /// Extension of written rasters
    pub raster_extension: String,

    /// Mirror rasters into this tree instead of writing beside the tiles
    pub output: Option<PathBuf>,

    /// Flat directory receiving one composite per dataset
    pub composite_dir: PathBuf,

    pub basemap: PathBuf,
    pub font: PathBuf,

    pub placement: Placement,

    /// Nesting depth colors, shallowest first
    pub palette: Vec<Color>,

    /// Display names added to (or replacing) the built-in table
    pub labels: DatasetLabels,

    pub layout: LabelLayout,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            projection: ProjectionParams::default(),
            fixed_bounds: DEFAULT_FIXED_BOUNDS,
            fixed_bounds_at_root: false,
            style: RasterStyle::default(),
            raster_extension: DEFAULT_RASTER_EXTENSION.to_string(),
            output: None,
            composite_dir: PathBuf::from("composite"),
            basemap: PathBuf::from("basemap.png"),
            font: PathBuf::from("arial.ttf"),
            placement: Placement::default(),
            palette: coverage_common::default_nesting_palette(),
            labels: DatasetLabels::empty(),
            layout: LabelLayout::default(),
        }
    }
}

impl CoverageConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let expanded = expand_env_vars(content)?;
        if expanded.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(&expanded).map_err(CoverageError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `COVERAGE_*` environment overrides.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(v) = env::var("COVERAGE_BASEMAP") {
            self.basemap = PathBuf::from(v);
        }
        if let Ok(v) = env::var("COVERAGE_FONT") {
            self.font = PathBuf::from(v);
        }
        if let Ok(v) = env::var("COVERAGE_OUTPUT") {
            self.output = Some(PathBuf::from(v));
        }
        if let Ok(v) = env::var("COVERAGE_COMPOSITE_DIR") {
            self.composite_dir = PathBuf::from(v);
        }
        if let Ok(v) = env::var("COVERAGE_CALIBRATION") {
            self.projection.calibration = parse_calibration(&v)?;
        }
        Ok(())
    }

    fn validate(&self) -> CoverageResult<()> {
        if !self.fixed_bounds.is_valid() {
            return Err(CoverageError::Config(format!(
                "fixed_bounds is inverted: {:?}",
                self.fixed_bounds
            )));
        }
        if self.raster_extension.is_empty() || self.raster_extension.starts_with('.') {
            return Err(CoverageError::Config(format!(
                "raster_extension must be a bare extension, got {:?}",
                self.raster_extension
            )));
        }
        if self.palette.is_empty() {
            return Err(CoverageError::Config(
                "palette must contain at least one color".to_string(),
            ));
        }
        let colors = self.palette.iter().chain(std::iter::once(&self.layout.color));
        for color in colors {
            if color.try_to_rgba().is_none() {
                return Err(CoverageError::Config(format!("unrecognised color {:?}", color)));
            }
        }
        Ok(())
    }

    /// Built-in display names overlaid with configured ones.
    pub fn dataset_labels(&self) -> DatasetLabels {
        let mut labels = DatasetLabels::default();
        labels.extend(&self.labels);
        labels
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            fixed_bounds: self.fixed_bounds,
            fixed_bounds_at_root: self.fixed_bounds_at_root,
            raster_extension: self.raster_extension.clone(),
            output_root: self.output.clone(),
            style: self.style,
        }
    }

    /// Composite settings; merged rasters must match the fixed-bounds size.
    pub fn composite_options(&self, table: &ProjectionTable) -> CoverageResult<CompositeOptions> {
        let raster_size = self.render_options().fixed_raster_size(table)?;
        Ok(CompositeOptions {
            placement: self.placement,
            palette: self.palette.clone(),
            raster_extension: self.raster_extension.clone(),
            labels: self.dataset_labels(),
            layout: self.layout.clone(),
            output_dir: self.composite_dir.clone(),
            raster_size: Some(raster_size),
        })
    }
}

fn parse_calibration(value: &str) -> Result<CalibrationMode> {
    match value.trim().to_lowercase().as_str() {
        "formula" => Ok(CalibrationMode::Formula),
        "reference_override" | "reference" => Ok(CalibrationMode::ReferenceOverride),
        other => anyhow::bail!("Unknown calibration mode: {}", other),
    }
}

/// Expand `${VAR}` and `${VAR:-default}` in YAML content.
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();
            let mut var_expr = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(c) => var_expr.push(c),
                    None => anyhow::bail!("Unclosed variable substitution: ${{{}", var_expr),
                }
            }
            result.push_str(&resolve_var_expr(&var_expr)?);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

fn resolve_var_expr(expr: &str) -> Result<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        env::var(expr.trim()).with_context(|| format!("Environment variable {} not set", expr))
    }
}
