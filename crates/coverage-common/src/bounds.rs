//! Grid-space bounding boxes.

use crate::GridCoordinate;
use serde::{Deserialize, Serialize};

/// An inclusive rectangle of grid cells.
///
/// All rasters rendered under the same bounds share pixel size, scale and
/// origin, so they can be overlaid without re-registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBounds {
    pub min_gx: i32,
    pub max_gx: i32,
    pub min_gy: i32,
    pub max_gy: i32,
}

impl GridBounds {
    /// Create new bounds from inclusive limits.
    pub fn new(min_gx: i32, max_gx: i32, min_gy: i32, max_gy: i32) -> Self {
        Self {
            min_gx,
            max_gx,
            min_gy,
            max_gy,
        }
    }

    /// Smallest bounds containing every coordinate, or `None` if empty.
    pub fn from_coords<'a, I>(coords: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a GridCoordinate>,
    {
        coords.into_iter().fold(None, |acc, c| {
            Some(match acc {
                None => Self::new(c.gx, c.gx, c.gy, c.gy),
                Some(b) => Self {
                    min_gx: b.min_gx.min(c.gx),
                    max_gx: b.max_gx.max(c.gx),
                    min_gy: b.min_gy.min(c.gy),
                    max_gy: b.max_gy.max(c.gy),
                },
            })
        })
    }

    /// Number of grid columns covered.
    pub fn columns(&self) -> u32 {
        (self.max_gx - self.min_gx + 1).max(0) as u32
    }

    /// Number of grid rows covered.
    pub fn rows(&self) -> u32 {
        (self.max_gy - self.min_gy + 1).max(0) as u32
    }

    /// Check if a coordinate lies within these bounds.
    pub fn contains(&self, coord: &GridCoordinate) -> bool {
        coord.gx >= self.min_gx
            && coord.gx <= self.max_gx
            && coord.gy >= self.min_gy
            && coord.gy <= self.max_gy
    }

    /// Check that min <= max on both axes.
    pub fn is_valid(&self) -> bool {
        self.min_gx <= self.max_gx && self.min_gy <= self.max_gy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_coords() {
        let coords = [
            GridCoordinate::new(-472, -136),
            GridCoordinate::new(-475, -139),
            GridCoordinate::new(-473, -137),
        ];
        let bounds = GridBounds::from_coords(&coords).unwrap();
        assert_eq!(bounds, GridBounds::new(-475, -472, -139, -136));
        assert_eq!(bounds.columns(), 4);
        assert_eq!(bounds.rows(), 4);
    }

    #[test]
    fn test_from_empty() {
        assert!(GridBounds::from_coords(&[]).is_none());
    }

    #[test]
    fn test_contains() {
        let bounds = GridBounds::new(-500, -450, -169, -128);
        assert!(bounds.contains(&GridCoordinate::new(-472, -136)));
        assert!(bounds.contains(&GridCoordinate::new(-500, -128)));
        assert!(!bounds.contains(&GridCoordinate::new(-449, -136)));
        assert!(!bounds.contains(&GridCoordinate::new(-472, -170)));
    }
}
