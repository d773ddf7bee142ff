//! Common types and utilities shared across the tile coverage crates.

pub mod bounds;
pub mod dataset;
pub mod error;
pub mod style;
pub mod tile;

pub use bounds::GridBounds;
pub use dataset::DatasetLabels;
pub use error::{CoverageError, CoverageResult};
pub use style::{default_nesting_palette, Color};
pub use tile::{GridCoordinate, ParsedTileId, TileNameError, TILE_EXTENSION};
