use image::{imageops, ImageBuffer, Luma, Rgb, RgbImage, RgbaImage};

use crate::errors::{ProductCropError, Result};

/// Mask produced by model inference, one f32 per pixel in `[0, 1]`.
pub type AlphaMask = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Place `image` centered on a `pad_width` x `pad_height` canvas of `color`.
///
/// Returns the canvas and the (x, y) offset the image was placed at, or
/// `None` when the image does not fit the canvas.
pub fn pad_center(
    image: &RgbImage,
    pad_width: u32,
    pad_height: u32,
    color: Rgb<u8>,
) -> Option<(RgbImage, (u32, u32))> {
    let (width, height) = image.dimensions();
    if width > pad_width || height > pad_height {
        return None;
    }

    let x = (pad_width - width) / 2;
    let y = (pad_height - height) / 2;

    let mut canvas = ImageBuffer::from_pixel(pad_width, pad_height, color);
    imageops::overlay(&mut canvas, image, i64::from(x), i64::from(y));
    Some((canvas, (x, y)))
}

/// Attach `mask` to `image` as its alpha channel.
///
/// Mask values are clamped to `[0, 1]` and scaled to u8; color channels pass
/// through unchanged.
pub fn apply_alpha_mask(image: &RgbImage, mask: &AlphaMask) -> Result<RgbaImage> {
    if image.dimensions() != mask.dimensions() {
        return Err(ProductCropError::ImageProcessing {
            path: "unknown".to_string(),
            operation: "apply alpha mask".to_string(),
            source: Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!(
                    "image and mask dimensions do not match: image {}x{}, mask {}x{}",
                    image.width(),
                    image.height(),
                    mask.width(),
                    mask.height()
                ),
            )),
        });
    }

    let pixels = image
        .pixels()
        .zip(mask.pixels())
        .flat_map(|(&Rgb([red, green, blue]), &Luma([alpha]))| {
            let alpha = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
            [red, green, blue, alpha]
        })
        .collect::<Vec<u8>>();

    RgbaImage::from_raw(image.width(), image.height(), pixels).ok_or_else(|| {
        ProductCropError::ImageProcessing {
            path: "unknown".to_string(),
            operation: "apply alpha mask".to_string(),
            source: Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "failed to assemble RGBA buffer",
            )),
        }
    })
}
