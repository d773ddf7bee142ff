//! Per-dataset coverage rasters.
//!
//! Each existing tile becomes a filled, outlined cell. Column edges come from
//! the fixed column width; row edges come from the projection table so row
//! heights follow the basemap's latitude spacing.

use coverage_common::{CoverageError, CoverageResult, GridBounds, GridCoordinate};
use image::{GrayImage, Luma};
use projection::ProjectionTable;
use serde::{Deserialize, Serialize};

/// Extra rows below the last grid row so the bottom border never clips.
pub const HEIGHT_PAD: i64 = 3;

/// Gray levels used when drawing cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterStyle {
    pub background: u8,
    pub fill: u8,
    pub border: u8,
}

impl Default for RasterStyle {
    fn default() -> Self {
        Self {
            background: 0,
            fill: 164,
            border: 128,
        }
    }
}

/// Inclusive pixel rectangle of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub left: i64,
    pub right: i64,
    pub top: i64,
    pub bottom: i64,
}

/// Canvas size and vertical origin derived from bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterGeometry {
    pub bounds: GridBounds,
    pub width: u32,
    pub height: u32,
    /// Cumulative offset of the southernmost row.
    pub origin: i64,
}

impl RasterGeometry {
    /// Size a canvas for `bounds`.
    ///
    /// Every row from `min_gy - 1` to `max_gy + 1` must be inside the
    /// projection domain.
    pub fn new(bounds: GridBounds, table: &ProjectionTable) -> CoverageResult<Self> {
        if !bounds.is_valid() {
            return Err(CoverageError::Projection(format!(
                "inverted grid bounds {:?}",
                bounds
            )));
        }

        let lookup = |gy: i32| {
            table.offset(gy).ok_or_else(|| {
                let domain = table.domain();
                CoverageError::OutsideProjection {
                    gy,
                    min: *domain.start(),
                    max: *domain.end(),
                }
            })
        };

        lookup(bounds.min_gy - 1)?;
        let top = lookup(bounds.min_gy)?;
        let below = lookup(bounds.max_gy + 1)?;
        let origin = lookup(bounds.max_gy)?;

        let width = table.column_edge(bounds.columns() as i64);
        let height = top - below + HEIGHT_PAD;

        Ok(Self {
            bounds,
            width: width as u32,
            height: height as u32,
            origin,
        })
    }

    /// Pixel rectangle of a cell, or `None` outside the bounds.
    ///
    /// The rectangle may extend past the canvas edge; callers clip.
    pub fn cell(&self, coord: &GridCoordinate, table: &ProjectionTable) -> Option<CellRect> {
        if !self.bounds.contains(coord) {
            return None;
        }

        let ngx = (coord.gx - self.bounds.min_gx) as i64;
        let south = table.offset(coord.gy)?;
        let north = table.offset(coord.gy - 1)?;
        let h = self.height as i64;

        // Image rows grow downward, offsets grow more negative southward
        Some(CellRect {
            left: table.column_edge(ngx),
            right: table.column_edge(ngx + 1) - 1,
            top: h - (north - self.origin),
            bottom: h - (south - self.origin + 1),
        })
    }
}

/// A rendered coverage bitmap for one dataset in one directory.
#[derive(Debug, Clone)]
pub struct CoverageRaster {
    pub dataset_id: String,
    pub geometry: RasterGeometry,
    pub image: GrayImage,
    /// Number of distinct cells drawn.
    pub cells: usize,
}

/// Draw every coordinate of one dataset onto a fresh canvas.
///
/// Coordinates outside `geometry.bounds` are skipped and logged.
pub fn render_raster<'a, I>(
    dataset_id: &str,
    coords: I,
    geometry: RasterGeometry,
    table: &ProjectionTable,
    style: &RasterStyle,
) -> CoverageRaster
where
    I: IntoIterator<Item = &'a GridCoordinate>,
{
    let mut image = GrayImage::from_pixel(geometry.width, geometry.height, Luma([style.background]));
    let mut cells = 0;

    for coord in coords {
        match geometry.cell(coord, table) {
            Some(rect) => {
                draw_cell(&mut image, &rect, style);
                cells += 1;
                tracing::trace!(
                    dataset = dataset_id,
                    gx = coord.gx,
                    gy = coord.gy,
                    left = rect.left,
                    top = rect.top,
                    right = rect.right,
                    bottom = rect.bottom,
                    "Drew cell"
                );
            }
            None => {
                tracing::warn!(
                    dataset = dataset_id,
                    gx = coord.gx,
                    gy = coord.gy,
                    bounds = ?geometry.bounds,
                    "Tile outside raster bounds, skipping"
                );
            }
        }
    }

    CoverageRaster {
        dataset_id: dataset_id.to_string(),
        geometry,
        image,
        cells,
    }
}

/// Fill a cell's interior and outline its four edges, clipped to the image.
fn draw_cell(image: &mut GrayImage, rect: &CellRect, style: &RasterStyle) {
    let (w, h) = (image.width() as i64, image.height() as i64);
    let x0 = rect.left.max(0);
    let x1 = rect.right.min(w - 1);
    let y0 = rect.top.max(0);
    let y1 = rect.bottom.min(h - 1);
    if x0 > x1 || y0 > y1 {
        return;
    }

    for y in y0..=y1 {
        let on_row_edge = y == rect.top || y == rect.bottom;
        for x in x0..=x1 {
            let on_edge = on_row_edge || x == rect.left || x == rect.right;
            let value = if on_edge { style.border } else { style.fill };
            image.put_pixel(x as u32, y as u32, Luma([value]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use projection::ProjectionParams;

    fn table() -> ProjectionTable {
        ProjectionTable::build(ProjectionParams::default()).unwrap()
    }

    #[test]
    fn test_single_cell_geometry() {
        let t = table();
        let bounds = GridBounds::new(-472, -472, -136, -136);
        let geom = RasterGeometry::new(bounds, &t).unwrap();

        assert_eq!(geom.width, 27);
        let expected = t.offset(-136).unwrap() - t.offset(-135).unwrap() + HEIGHT_PAD;
        assert_eq!(geom.height as i64, expected);

        let rect = geom.cell(&GridCoordinate::new(-472, -136), &t).unwrap();
        assert_eq!(rect.left, 0);
        assert_eq!(rect.right, 26);
        assert_eq!(rect.bottom, geom.height as i64 - 1);
        assert!(rect.top >= 0);
    }

    #[test]
    fn test_outside_domain() {
        let t = table();
        let bounds = GridBounds::new(-472, -472, -200, -200);
        assert!(matches!(
            RasterGeometry::new(bounds, &t),
            Err(CoverageError::OutsideProjection { gy: -201, .. })
        ));
    }

    #[test]
    fn test_cell_border_and_fill() {
        let t = table();
        let coord = GridCoordinate::new(-472, -136);
        let geom = RasterGeometry::new(GridBounds::new(-472, -472, -136, -136), &t).unwrap();
        let raster = render_raster("t", [coord].iter(), geom, &t, &RasterStyle::default());
        let rect = geom.cell(&coord, &t).unwrap();

        let img = &raster.image;
        assert_eq!(raster.cells, 1);
        assert_eq!(img.get_pixel(0, rect.bottom as u32).0[0], 128);
        assert_eq!(img.get_pixel(13, rect.top as u32).0[0], 128);
        assert_eq!(img.get_pixel(26, 10).0[0], 128);
        assert_eq!(img.get_pixel(13, 10).0[0], 164);
    }
}
