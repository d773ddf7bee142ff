//! Vertical projection model for coverage rasters.
//!
//! Longitude lines of the reference basemap are evenly spaced, but latitude
//! rows get taller moving north. Row heights come from a linear fit, and
//! row positions are accumulated from those heights so integer pixel
//! positions never carry compounded rounding error.

pub mod calibration;
pub mod vertical;

pub use calibration::CalibrationMode;
pub use vertical::{ProjectionError, ProjectionParams, ProjectionTable};
