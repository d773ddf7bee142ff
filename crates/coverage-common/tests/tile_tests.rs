//! Tests for tile filename decoding and grid mapping.

use coverage_common::tile::is_tile_filename;
use coverage_common::{GridBounds, GridCoordinate, ParsedTileId, TileNameError};

// ============================================================================
// Parsing tests
// ============================================================================

#[test]
fn test_hyphenated_dataset_id() {
    let tile = ParsedTileId::from_filename("mapbuilder-topo-2m-38-121-33.mbtiles").unwrap();
    assert_eq!(tile.dataset_id, "mapbuilder-topo-2m");
    assert_eq!(tile.lat, 38);
    assert_eq!(tile.lon, 121);
    assert_eq!((tile.sub_row, tile.sub_col), (3, 3));
}

#[test]
fn test_malformed_names_are_rejected() {
    for name in [
        "layer.mbtiles",
        "layer-34-118.mbtiles",
        "layer-34-118-0.mbtiles",
        "layer-34--118-00.mbtiles",
        "layer-34-118-40.mbtiles",
        "layer-34-118-00.mbtiles.bak",
        "-34-118-00.mbtiles",
        "layer-99999-118-00.mbtiles",
    ] {
        assert!(
            ParsedTileId::from_filename(name).is_err(),
            "{} should not parse",
            name
        );
    }
}

#[test]
fn test_empty_dataset_error() {
    assert_eq!(
        ParsedTileId::from_filename("-34-118-00.mbtiles"),
        Err(TileNameError::EmptyDataset("-34-118-00.mbtiles".to_string()))
    );
}

#[test]
fn test_coordinate_range_error() {
    for name in [
        "layer-99999-118-00.mbtiles",
        "layer-91-118-00.mbtiles",
        "layer-34-181-00.mbtiles",
    ] {
        assert_eq!(
            ParsedTileId::from_filename(name),
            Err(TileNameError::CoordinateRange(name.to_string()))
        );
    }
    assert!(ParsedTileId::from_filename("layer-90-180-00.mbtiles").is_ok());
}

#[test]
fn test_is_tile_filename() {
    assert!(is_tile_filename("c-39-120-12.mbtiles"));
    assert!(!is_tile_filename("readme.txt"));
}

// ============================================================================
// Grid mapping tests
// ============================================================================

#[test]
fn test_subgrid_second_digit_is_column() {
    let a = ParsedTileId::from_filename("layer-34-118-00.mbtiles")
        .unwrap()
        .grid_coordinate();
    let b = ParsedTileId::from_filename("layer-34-118-01.mbtiles")
        .unwrap()
        .grid_coordinate();

    assert_eq!(a.gy, b.gy);
    assert_eq!(a.gx - b.gx, 1);
}

#[test]
fn test_subgrid_first_digit_is_row() {
    let a = ParsedTileId::from_filename("layer-34-118-00.mbtiles")
        .unwrap()
        .grid_coordinate();
    let b = ParsedTileId::from_filename("layer-34-118-10.mbtiles")
        .unwrap()
        .grid_coordinate();

    assert_eq!(a.gx, b.gx);
    // Northward tiles get smaller (more negative) rows
    assert_eq!(b.gy, a.gy - 1);
}

#[test]
fn test_blocks_are_contiguous() {
    // The westernmost column of one degree block sits next to the easternmost
    // column of the block to its west.
    let east = ParsedTileId::from_filename("t-34-118-03.mbtiles")
        .unwrap()
        .grid_coordinate();
    let west = ParsedTileId::from_filename("t-34-119-00.mbtiles")
        .unwrap()
        .grid_coordinate();
    assert_eq!(east.gx - west.gx, 1);
}

#[test]
fn test_bounds_of_parsed_tiles() {
    let coords: Vec<GridCoordinate> = ["t-34-118-00.mbtiles", "t-35-119-33.mbtiles"]
        .iter()
        .map(|n| ParsedTileId::from_filename(n).unwrap().grid_coordinate())
        .collect();
    let bounds = GridBounds::from_coords(&coords).unwrap();
    assert_eq!(bounds, GridBounds::new(-479, -472, -143, -136));
}
