//! Tile filename decoding and grid coordinates.
//!
//! Tiles are 15-minute-square files named `<dataset>-<lat>-<lon>-<qq>.mbtiles`.
//! `lat` and `lon` are positive integer degrees of the southeast corner of a
//! 1x1 degree block (western hemisphere), and `qq` locates the tile within
//! that block:
//!
//! ```text
//!  +----+----+----+----+
//!  | 33 | 32 | 31 | 30 |
//!  +----+----+----+----+
//!  | 23 | 22 | 21 | 20 |
//!  +----+----+----+----+
//!  | 13 | 12 | 11 | 10 |
//!  +----+----+----+----+
//!  | 03 | 02 | 01 | 00 |
//!  +----+----+----+----+
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Extension carried by every tile file.
pub const TILE_EXTENSION: &str = "mbtiles";

/// Number of 15-minute grid steps per degree.
pub const GRIDS_PER_DEGREE: i32 = 4;

const MAX_LATITUDE: u16 = 90;
const MAX_LONGITUDE: u16 = 180;

/// A decoded tile filename.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParsedTileId {
    /// Everything preceding the lat/lon/sub-grid suffix, including any
    /// scale marker such as `-2m`.
    pub dataset_id: String,
    pub lat: u16,
    pub lon: u16,
    /// First digit of the sub-grid code (0-3, increasing northward).
    pub sub_row: u8,
    /// Second digit of the sub-grid code (0-3, increasing westward).
    pub sub_col: u8,
}

/// Reasons a filename is not a valid tile name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileNameError {
    #[error("not an .mbtiles file: {0}")]
    WrongExtension(String),

    #[error("fewer than four hyphen-delimited tokens: {0}")]
    TooFewTokens(String),

    #[error("the last three tokens must only contain digits: {0}")]
    NonNumeric(String),

    #[error("the sub-grid token must be exactly two digits: {0}")]
    SubGridLength(String),

    #[error("each sub-grid digit must be between 0 and 3: {0}")]
    SubGridRange(String),

    #[error("empty dataset id: {0}")]
    EmptyDataset(String),

    #[error("latitude must be at most 90 and longitude at most 180: {0}")]
    CoordinateRange(String),
}

impl ParsedTileId {
    /// Decode a tile filename (no directory component).
    pub fn from_filename(name: &str) -> Result<Self, TileNameError> {
        let stem = name
            .strip_suffix(TILE_EXTENSION)
            .and_then(|s| s.strip_suffix('.'))
            .ok_or_else(|| TileNameError::WrongExtension(name.to_string()))?;

        let tokens: Vec<&str> = stem.split('-').collect();
        if tokens.len() < 4 {
            return Err(TileNameError::TooFewTokens(name.to_string()));
        }

        let (head, tail) = tokens.split_at(tokens.len() - 3);
        let (lat, lon, qq) = (tail[0], tail[1], tail[2]);

        if ![lat, lon, qq].iter().all(|t| is_ascii_number(t)) {
            return Err(TileNameError::NonNumeric(name.to_string()));
        }
        if qq.len() != 2 {
            return Err(TileNameError::SubGridLength(name.to_string()));
        }

        let digits = qq.as_bytes();
        let sub_row = digits[0] - b'0';
        let sub_col = digits[1] - b'0';
        if sub_row > 3 || sub_col > 3 {
            return Err(TileNameError::SubGridRange(name.to_string()));
        }

        let dataset_id = head.join("-");
        if dataset_id.is_empty() {
            return Err(TileNameError::EmptyDataset(name.to_string()));
        }

        let degrees = |token: &str, max: u16| {
            token
                .parse::<u16>()
                .ok()
                .filter(|v| *v <= max)
                .ok_or_else(|| TileNameError::CoordinateRange(name.to_string()))
        };

        Ok(Self {
            dataset_id,
            lat: degrees(lat, MAX_LATITUDE)?,
            lon: degrees(lon, MAX_LONGITUDE)?,
            sub_row,
            sub_col,
        })
    }

    /// Position of this tile in the uniform rendering grid.
    ///
    /// Both axes are negated: longitude grows westward while screen columns
    /// grow eastward, and image rows grow downward.
    pub fn grid_coordinate(&self) -> GridCoordinate {
        GridCoordinate {
            gx: -(self.lon as i32 * GRIDS_PER_DEGREE + self.sub_col as i32),
            gy: -(self.lat as i32 * GRIDS_PER_DEGREE + self.sub_row as i32),
        }
    }
}

/// Whether `name` follows the tile naming convention.
pub fn is_tile_filename(name: &str) -> bool {
    ParsedTileId::from_filename(name).is_ok()
}

fn is_ascii_number(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// Signed integer grid position of one 15-minute tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoordinate {
    pub gx: i32,
    pub gy: i32,
}

impl GridCoordinate {
    pub fn new(gx: i32, gy: i32) -> Self {
        Self { gx, gy }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_standard_name() {
        let tile = ParsedTileId::from_filename("t-34-118-21.mbtiles").unwrap();
        assert_eq!(tile.dataset_id, "t");
        assert_eq!(tile.lat, 34);
        assert_eq!(tile.lon, 118);
        assert_eq!(tile.sub_row, 2);
        assert_eq!(tile.sub_col, 1);
    }

    #[test]
    fn test_parse_keeps_scale_in_dataset() {
        let tile = ParsedTileId::from_filename("naip_2014-2m-39-120-03.mbtiles").unwrap();
        assert_eq!(tile.dataset_id, "naip_2014-2m");
    }

    #[test]
    fn test_grid_coordinate_negates_axes() {
        let tile = ParsedTileId::from_filename("layer-34-118-01.mbtiles").unwrap();
        assert_eq!(tile.grid_coordinate(), GridCoordinate::new(-473, -136));
    }

    #[test]
    fn test_rejections() {
        assert!(matches!(
            ParsedTileId::from_filename("layer-34-118-00.zip"),
            Err(TileNameError::WrongExtension(_))
        ));
        assert!(matches!(
            ParsedTileId::from_filename("layer.mbtiles"),
            Err(TileNameError::TooFewTokens(_))
        ));
        assert!(matches!(
            ParsedTileId::from_filename("layer-3a-118-00.mbtiles"),
            Err(TileNameError::NonNumeric(_))
        ));
        assert!(matches!(
            ParsedTileId::from_filename("layer-34-118-001.mbtiles"),
            Err(TileNameError::SubGridLength(_))
        ));
        assert!(matches!(
            ParsedTileId::from_filename("layer-34-118-04.mbtiles"),
            Err(TileNameError::SubGridRange(_))
        ));
    }
}
