use std::io::Cursor;

use image::{DynamicImage, ImageFormat};

use crate::errors::{ProductCropError, Result};
use crate::traits::Segmenter;

/// Alpha mask a [`MockSegmenter`] paints onto its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskShape {
    /// Opaque rectangle `(x, y)` to `(x + width - 1, y + height - 1)`,
    /// transparent everywhere else.
    Rectangle {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    /// Every pixel opaque.
    Full,
    /// Every pixel transparent; downstream cropping reports NoForeground.
    Empty,
}

/// Test double for the [`Segmenter`] boundary.
///
/// Decodes the input bytes, overwrites the alpha channel with a synthetic
/// mask, and re-encodes as PNG. Crop and batch tests run against this
/// instead of a model file.
#[derive(Debug, Clone, Copy)]
pub struct MockSegmenter {
    pub shape: MaskShape,
}

impl MockSegmenter {
    pub const fn new(shape: MaskShape) -> Self {
        Self { shape }
    }
}

impl Segmenter for MockSegmenter {
    fn segment(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        let img = image::load_from_memory(bytes).map_err(|e| ProductCropError::Segmentation {
            operation: "input decoding".to_string(),
            source: Box::new(e),
        })?;

        let mut rgba = img.into_rgba8();
        for (x, y, pixel) in rgba.enumerate_pixels_mut() {
            pixel[3] = match self.shape {
                MaskShape::Full => 255,
                MaskShape::Empty => 0,
                MaskShape::Rectangle {
                    x: rx,
                    y: ry,
                    width,
                    height,
                } => {
                    if x >= rx && x < rx + width && y >= ry && y < ry + height {
                        255
                    } else {
                        0
                    }
                }
            };
        }

        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(rgba)
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(|e| ProductCropError::Segmentation {
                operation: "output encoding".to_string(),
                source: Box::new(e),
            })?;
        Ok(buffer.into_inner())
    }
}
