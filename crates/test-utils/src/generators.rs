//! Synthetic image generators.

use image::{GrayImage, Luma, Rgba, RgbaImage};
use std::path::Path;

/// A gray raster with the given pixels set to `value`, everything else 0.
pub fn gray_raster(width: u32, height: u32, present: &[(u32, u32)], value: u8) -> GrayImage {
    let mut img = GrayImage::from_pixel(width, height, Luma([0]));
    for &(x, y) in present {
        img.put_pixel(x, y, Luma([value]));
    }
    img
}

/// Write a gray raster to `path`, creating parent directories.
pub fn write_gray_raster(path: &Path, raster: &GrayImage) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create raster directory");
    }
    raster.save(path).expect("Failed to write raster");
}

/// A uniformly colored opaque basemap.
pub fn solid_basemap(width: u32, height: u32, rgb: [u8; 3]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([rgb[0], rgb[1], rgb[2], 255]))
}

/// Count pixels of a gray raster that are not background.
pub fn count_present(raster: &GrayImage) -> usize {
    raster.pixels().filter(|p| p.0[0] != 0).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gray_raster() {
        let img = gray_raster(4, 3, &[(0, 0), (3, 2)], 164);
        assert_eq!(count_present(&img), 2);
        assert_eq!(img.get_pixel(3, 2).0[0], 164);
    }
}
