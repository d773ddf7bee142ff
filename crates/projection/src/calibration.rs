//! Hand-measured row positions from a reference coverage screenshot.
//!
//! The absolute values are arbitrary (screen y of each row boundary), only
//! their differences matter: they are the measured pixel heights of rows
//! `-169..=-127`.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Rows with a measured boundary position.
pub const REFERENCE_ROWS: RangeInclusive<i32> = -170..=-127;

/// Measured screen y of each row in [`REFERENCE_ROWS`], in order.
pub const REFERENCE_POSITIONS: [f64; 44] = [
    1299.5, 1275.5, 1251.0, 1226.7, 1202.4, 1178.1, 1153.7, 1128.6, 1104.4, 1079.0, //
    1054.8, 1029.5, 1004.4, 980.1, 954.7, 929.5, 904.5, 878.3, 853.1, 827.9, //
    801.8, 776.7, 750.3, 724.6, 699.2, 673.3, 647.1, 620.1, 593.7, 567.6, //
    540.7, 514.5, 487.5, 461.5, 434.4, 407.5, 380.5, 352.5, 325.5, 298.6, //
    270.5, 242.6, 215.7, 187.7,
];

/// Which row heights feed the cumulative offset table.
///
/// `Formula` ignores the measurements. `ReferenceOverride` swaps the
/// measured heights in for the calibrated rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationMode {
    #[default]
    Formula,
    ReferenceOverride,
}

/// Measured screen position of a row boundary.
pub fn reference_position(gy: i32) -> Option<f64> {
    if !REFERENCE_ROWS.contains(&gy) {
        return None;
    }
    let idx = (gy - REFERENCE_ROWS.start()) as usize;
    REFERENCE_POSITIONS.get(idx).copied()
}

/// Measured pixel height of row `gy`.
///
/// Defined for every calibrated row except the first, whose northern
/// neighbour was not measured.
pub fn measured_height(gy: i32) -> Option<f64> {
    let north = reference_position(gy - 1)?;
    let this = reference_position(gy)?;
    Some(north - this)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::assert_approx_eq;

    #[test]
    fn test_positions_cover_rows() {
        let rows = REFERENCE_ROWS.end() - REFERENCE_ROWS.start() + 1;
        assert_eq!(rows as usize, REFERENCE_POSITIONS.len());
    }

    #[test]
    fn test_measured_heights() {
        assert!(measured_height(-170).is_none());
        assert_approx_eq!(measured_height(-169).unwrap(), 24.0, 1e-9);
        assert_approx_eq!(measured_height(-127).unwrap(), 28.0, 1e-9);
        assert!(measured_height(-126).is_none());
    }

    #[test]
    fn test_measured_heights_positive() {
        for gy in (REFERENCE_ROWS.start() + 1)..=*REFERENCE_ROWS.end() {
            assert!(measured_height(gy).unwrap() > 20.0, "row {}", gy);
        }
    }
}
