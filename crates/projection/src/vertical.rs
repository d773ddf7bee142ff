//! Row height and cumulative row offset lookup.

use crate::calibration::{self, CalibrationMode};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use thiserror::Error;

/// Calibration constants of the vertical spacing model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionParams {
    /// Height change per grid row, in pixels.
    pub slope: f64,
    /// Height of row 0, in pixels.
    pub intercept: f64,
    /// Width of one grid column, in pixels.
    pub column_width: f64,
    /// First (seed) row of the table.
    pub row_min: i32,
    /// Last row of the table.
    pub row_max: i32,
    pub calibration: CalibrationMode,
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self {
            slope: 0.07317,
            intercept: 14.63415,
            column_width: 27.7778,
            row_min: -200,
            row_max: 0,
            calibration: CalibrationMode::Formula,
        }
    }
}

impl ProjectionParams {
    /// Pixel height of a row according to the linear fit.
    #[inline]
    pub fn formula_height(&self, gy: i32) -> f64 {
        -self.slope * gy as f64 + self.intercept
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("empty projection domain: row_min {min} > row_max {max}")]
    EmptyDomain { min: i32, max: i32 },

    #[error("row {gy} would be {height:.3} px tall; rows must be at least 1 px")]
    RowTooShort { gy: i32, height: f64 },

    #[error("column width must be at least 1 px, got {0}")]
    ColumnTooNarrow(f64),
}

/// Immutable per-row lookup built once at startup.
///
/// Offsets grow more negative moving toward `row_max`; a row `gy` occupies
/// the pixel span between `offset(gy)` and `offset(gy - 1)`.
#[derive(Debug, Clone)]
pub struct ProjectionTable {
    params: ProjectionParams,
    heights: Vec<f64>,
    offsets_f64: Vec<f64>,
    offsets: Vec<i64>,
}

impl ProjectionTable {
    /// Build the table by summing row heights from `row_min`.
    pub fn build(params: ProjectionParams) -> Result<Self, ProjectionError> {
        if params.row_min > params.row_max {
            return Err(ProjectionError::EmptyDomain {
                min: params.row_min,
                max: params.row_max,
            });
        }
        if !(params.column_width >= 1.0) {
            return Err(ProjectionError::ColumnTooNarrow(params.column_width));
        }

        let len = (params.row_max - params.row_min + 1) as usize;
        let mut heights = Vec::with_capacity(len);
        for gy in params.row_min..=params.row_max {
            let height = match params.calibration {
                CalibrationMode::ReferenceOverride => calibration::measured_height(gy)
                    .unwrap_or_else(|| params.formula_height(gy)),
                CalibrationMode::Formula => params.formula_height(gy),
            };
            // Offsets are all negative, so truncation acts as ceil; a height
            // of at least one pixel keeps the integer offsets distinct.
            if !(height >= 1.0) {
                return Err(ProjectionError::RowTooShort { gy, height });
            }
            heights.push(height);
        }

        let mut offsets_f64 = Vec::with_capacity(len);
        let mut acc = -heights[0];
        offsets_f64.push(acc);
        for height in &heights[1..] {
            acc -= height;
            offsets_f64.push(acc);
        }

        let offsets = offsets_f64.iter().map(|v| v.trunc() as i64).collect();

        tracing::debug!(
            row_min = params.row_min,
            row_max = params.row_max,
            calibration = ?params.calibration,
            "Built projection table"
        );

        Ok(Self {
            params,
            heights,
            offsets_f64,
            offsets,
        })
    }

    /// Parameters the table was built from.
    pub fn params(&self) -> &ProjectionParams {
        &self.params
    }

    /// Rows the table can answer for.
    pub fn domain(&self) -> RangeInclusive<i32> {
        self.params.row_min..=self.params.row_max
    }

    pub fn column_width(&self) -> f64 {
        self.params.column_width
    }

    #[inline]
    fn index(&self, gy: i32) -> Option<usize> {
        if self.domain().contains(&gy) {
            Some((gy - self.params.row_min) as usize)
        } else {
            None
        }
    }

    /// Pixel height of a row.
    pub fn height(&self, gy: i32) -> Option<f64> {
        self.index(gy).map(|i| self.heights[i])
    }

    /// Cumulative offset before truncation.
    pub fn offset_f64(&self, gy: i32) -> Option<f64> {
        self.index(gy).map(|i| self.offsets_f64[i])
    }

    /// Cumulative offset truncated toward zero.
    pub fn offset(&self, gy: i32) -> Option<i64> {
        self.index(gy).map(|i| self.offsets[i])
    }

    /// Left pixel edge of the `n`th column from the raster origin.
    #[inline]
    pub fn column_edge(&self, n: i64) -> i64 {
        (n as f64 * self.params.column_width) as i64
    }
}
