//! Coverage raster rendering and compositing.
//!
//! - `raster`: one grayscale bitmap per dataset per directory
//! - `scan`: directory tile discovery and the tree walk that writes rasters
//! - `composite`: depth-colored merge of rasters placed on a basemap
//! - `labels`: text stamping for composites

pub mod composite;
pub mod labels;
pub mod raster;
pub mod scan;

pub use composite::{CompositeBuilder, CompositeOptions, Placement};
pub use labels::{FontLabelRenderer, LabelRenderer};
pub use raster::{CoverageRaster, RasterGeometry, RasterStyle};
pub use scan::{RenderOptions, RenderSummary, TreeRenderer};
