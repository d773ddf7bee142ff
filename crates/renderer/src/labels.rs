//! Text stamping for composite images.

use coverage_common::{CoverageError, CoverageResult};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use rusttype::{Font, Scale};
use std::path::Path;

/// Draws a string onto an image.
///
/// Composites are built in parallel, so implementations must be `Sync`.
pub trait LabelRenderer: Sync {
    /// Draw `text` with its top-left corner at `(x, y)`.
    fn draw_label(&self, image: &mut RgbaImage, text: &str, x: i32, y: i32, size: f32, color: Rgba<u8>);
}

/// TrueType label renderer.
pub struct FontLabelRenderer {
    font: Font<'static>,
}

impl FontLabelRenderer {
    /// Load a TrueType font file.
    pub fn from_file(path: &Path) -> CoverageResult<Self> {
        let data = std::fs::read(path).map_err(|e| CoverageError::Font {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_bytes(data).ok_or_else(|| CoverageError::Font {
            path: path.to_path_buf(),
            message: "not a valid TrueType font".to_string(),
        })
    }

    pub fn from_bytes(data: Vec<u8>) -> Option<Self> {
        Font::try_from_vec(data).map(|font| Self { font })
    }
}

impl LabelRenderer for FontLabelRenderer {
    fn draw_label(&self, image: &mut RgbaImage, text: &str, x: i32, y: i32, size: f32, color: Rgba<u8>) {
        draw_text_mut(image, color, x, y, Scale::uniform(size), &self.font, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_font_is_an_error() {
        let err = FontLabelRenderer::from_file(Path::new("/nonexistent/font.ttf"))
            .err()
            .unwrap();
        assert!(err.is_fatal_resource());
    }

    #[test]
    fn test_garbage_font_rejected() {
        assert!(FontLabelRenderer::from_bytes(vec![0u8; 64]).is_none());
    }
}
