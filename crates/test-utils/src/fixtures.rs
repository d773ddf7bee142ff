//! Common test fixtures for tile coverage tests.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Tile filenames used across the test suite.
pub mod tiles {
    /// Two horizontally adjacent tiles of one dataset.
    pub const ADJACENT_PAIR: [&str; 2] = ["layer-34-118-00.mbtiles", "layer-34-118-01.mbtiles"];

    /// A full 1x1 degree block (16 tiles).
    pub fn full_block(dataset: &str, lat: u32, lon: u32) -> Vec<String> {
        let mut names = Vec::with_capacity(16);
        for qy in 0..4 {
            for qx in 0..4 {
                names.push(format!("{}-{}-{}-{}{}.mbtiles", dataset, lat, lon, qy, qx));
            }
        }
        names
    }

    /// Names that must never contribute a cell.
    pub const MALFORMED: [&str; 3] = [
        "layer.mbtiles",
        "layer-34-118-44.mbtiles",
        "layer-34-xx-00.mbtiles",
    ];
}

/// A scratch directory tree populated with empty tile files.
///
/// Only presence matters for coverage, so every file is zero bytes.
pub struct TileTree {
    dir: TempDir,
}

impl TileTree {
    pub fn new() -> Self {
        Self {
            dir: tempfile::Builder::new()
                .prefix("tile_tree_")
                .tempdir()
                .expect("Failed to create temporary tile tree"),
        }
    }

    /// Root of the tree.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of a directory relative to the root.
    pub fn dir(&self, rel: &str) -> PathBuf {
        if rel.is_empty() {
            self.root().to_path_buf()
        } else {
            self.root().join(rel)
        }
    }

    /// Create empty files named `names` inside `rel`, creating the directory.
    pub fn add_files<S: AsRef<str>>(&self, rel: &str, names: &[S]) -> &Self {
        let dir = self.dir(rel);
        fs::create_dir_all(&dir).expect("Failed to create tile directory");
        for name in names {
            fs::write(dir.join(name.as_ref()), b"").expect("Failed to create tile file");
        }
        self
    }

    /// Create an empty directory.
    pub fn add_dir(&self, rel: &str) -> &Self {
        fs::create_dir_all(self.dir(rel)).expect("Failed to create directory");
        self
    }
}

impl Default for TileTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_block_names() {
        let names = tiles::full_block("t", 34, 118);
        assert_eq!(names.len(), 16);
        assert_eq!(names[0], "t-34-118-00.mbtiles");
        assert_eq!(names[15], "t-34-118-33.mbtiles");
    }

    #[test]
    fn test_tile_tree_creates_files() {
        let tree = TileTree::new();
        tree.add_files("a/b", &tiles::ADJACENT_PAIR);
        assert!(tree.dir("a/b").join("layer-34-118-00.mbtiles").is_file());
    }
}
