use image::{imageops, RgbaImage};

use crate::errors::{ProductCropError, Result};

/// Inclusive axis-aligned pixel rectangle.
///
/// Invariant: `x_min <= x_max < W` and `y_min <= y_max < H` for the image the
/// box was computed on. Inclusive coordinates mean a single pixel is the box
/// `(x, y)-(x, y)` with width and height 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x_min: u32,
    pub y_min: u32,
    pub x_max: u32,
    pub y_max: u32,
}

impl BoundingBox {
    pub const fn width(&self) -> u32 {
        self.x_max - self.x_min + 1
    }

    pub const fn height(&self) -> u32 {
        self.y_max - self.y_min + 1
    }

    /// Expand by `margin` on each side, clamped to the image extents.
    ///
    /// Clamping uses the original canvas, not the pre-expansion box, so the
    /// margin never extends past an edge but may be asymmetrically truncated
    /// there.
    pub fn expand(self, margin: u32, image_width: u32, image_height: u32) -> Self {
        Self {
            x_min: self.x_min.saturating_sub(margin),
            y_min: self.y_min.saturating_sub(margin),
            x_max: self.x_max.saturating_add(margin).min(image_width - 1),
            y_max: self.y_max.saturating_add(margin).min(image_height - 1),
        }
    }
}

/// Tightest box enclosing all pixels with alpha > 0, or `None` when the
/// image is fully transparent. Single O(W*H) pass, exact.
pub fn foreground_bounds(img: &RgbaImage) -> Option<BoundingBox> {
    let mut bounds: Option<BoundingBox> = None;

    for (x, y, pixel) in img.enumerate_pixels() {
        if pixel[3] > 0 {
            update_bounds(&mut bounds, x, y);
        }
    }

    bounds
}

fn update_bounds(bounds: &mut Option<BoundingBox>, x: u32, y: u32) {
    match bounds {
        Some(b) => {
            b.x_min = b.x_min.min(x);
            b.y_min = b.y_min.min(y);
            b.x_max = b.x_max.max(x);
            b.y_max = b.y_max.max(y);
        }
        None => {
            *bounds = Some(BoundingBox {
                x_min: x,
                y_min: y,
                x_max: x,
                y_max: y,
            });
        }
    }
}

/// Crop an alpha-bearing image to its foreground plus `margin`.
///
/// Pixel values are copied unchanged; the only transformation is spatial.
/// A fully transparent image yields [`ProductCropError::NoForeground`].
pub fn crop_to_foreground(img: &RgbaImage, margin: u32) -> Result<RgbaImage> {
    let bounds = foreground_bounds(img).ok_or(ProductCropError::NoForeground)?;

    let (width, height) = img.dimensions();
    let bounds = bounds.expand(margin, width, height);

    Ok(imageops::crop_imm(img, bounds.x_min, bounds.y_min, bounds.width(), bounds.height())
        .to_image())
}
