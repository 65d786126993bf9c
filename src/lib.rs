pub mod config;
pub mod crop;
pub mod errors;
pub mod imageops_ext;
pub mod model;
pub mod traits;

pub mod mocks;

#[cfg(feature = "gui")]
pub mod gui;

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{ImageFormat, RgbaImage};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use walkdir::WalkDir;

pub use config::Config;
pub use crop::{crop_to_foreground, foreground_bounds, BoundingBox};
pub use errors::{ProductCropError, Result};
pub use model::OnnxSegmenter;
pub use traits::Segmenter;

/// Per-batch outcome counts; one bad image never aborts a batch, it only
/// shows up here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub total: usize,
    pub processed: usize,
    pub failed: usize,
}

/// Decode segmenter output and require an alpha channel.
///
/// The segmenter contract is "encoded bytes with alpha"; output that decodes
/// without one is a hard segmentation failure for the image, not a crop
/// failure.
pub fn decode_segmented(bytes: &[u8]) -> Result<RgbaImage> {
    let decoded = image::load_from_memory(bytes).map_err(|e| ProductCropError::Segmentation {
        operation: "output decoding".to_string(),
        source: Box::new(e),
    })?;

    if !decoded.color().has_alpha() {
        return Err(ProductCropError::Segmentation {
            operation: "output validation".to_string(),
            source: Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "segmenter output has no alpha channel",
            )),
        });
    }

    Ok(decoded.into_rgba8())
}

/// Run the full per-image pipeline: read, segment, crop, save.
///
/// The output is always a PNG named after the input file's stem, written
/// into `output_dir` and overwriting any existing file of that name.
pub fn process_image<S: Segmenter>(
    segmenter: &S,
    input_file: &Path,
    output_dir: &Path,
    margin: u32,
) -> Result<PathBuf> {
    let bytes = fs::read(input_file).map_err(|e| ProductCropError::FileSystem {
        path: input_file.to_path_buf(),
        operation: "input image read".to_string(),
        source: e,
    })?;

    let segmented = segmenter.segment(&bytes)?;
    let img = decode_segmented(&segmented)?;
    let cropped = crop_to_foreground(&img, margin)?;

    let stem = input_file
        .file_stem()
        .and_then(OsStr::to_str)
        .ok_or_else(|| ProductCropError::Configuration {
            message: format!("invalid input file name: {}", input_file.display()),
        })?;
    let output_file = output_dir.join(format!("{stem}.png"));

    cropped
        .save_with_format(&output_file, ImageFormat::Png)
        .map_err(|e| ProductCropError::ImageProcessing {
            path: output_file.display().to_string(),
            operation: "cropped image save".to_string(),
            source: Box::new(e),
        })?;

    Ok(output_file)
}

pub struct ImageProcessor<S: Segmenter> {
    segmenter: S,
    config: Config,
}

impl<S: Segmenter> ImageProcessor<S> {
    pub const fn new(segmenter: S, config: Config) -> Self {
        Self { segmenter, config }
    }

    pub fn process_directory(&self) -> Result<BatchSummary> {
        let input_path = &self.config.input_dir;
        let output_path = &self.config.output_dir;

        if !input_path.exists() {
            return Err(ProductCropError::FileSystem {
                path: input_path.clone(),
                operation: "input directory check".to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "input directory does not exist",
                ),
            });
        }

        fs::create_dir_all(output_path).map_err(|e| ProductCropError::FileSystem {
            path: output_path.clone(),
            operation: "output directory creation".to_string(),
            source: e,
        })?;

        let image_files = self.collect_image_files(input_path);

        if image_files.is_empty() {
            println!("no matching image files found");
            return Ok(BatchSummary::default());
        }

        let pb = ProgressBar::new(image_files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )
                .unwrap()
                .progress_chars("#>-"),
        );

        let processed = AtomicUsize::new(0);
        let failed = AtomicUsize::new(0);

        image_files.par_iter().for_each(|input_file| {
            match process_image(
                &self.segmenter,
                input_file,
                output_path,
                self.config.margin,
            ) {
                Ok(_) => {
                    processed.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    pb.suspend(|| eprintln!("error processing {}: {e}", input_file.display()));
                    failed.fetch_add(1, Ordering::Relaxed);
                }
            }
            pb.inc(1);
        });

        pb.finish();

        Ok(BatchSummary {
            total: image_files.len(),
            processed: processed.into_inner(),
            failed: failed.into_inner(),
        })
    }

    /// Collect processable files from the top level of the input directory.
    ///
    /// The batch tool matches the original contract: no recursion, extension
    /// list from the config.
    fn collect_image_files(&self, input_path: &Path) -> Vec<PathBuf> {
        let mut image_files: Vec<_> = WalkDir::new(input_path)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| self.config.is_supported_extension(e.path()))
            .map(|e| e.into_path())
            .collect();
        image_files.sort();
        image_files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{MaskShape, MockSegmenter};
    use tempfile::TempDir;

    fn test_config(input_dir: PathBuf, output_dir: PathBuf) -> Config {
        Config {
            input_dir,
            output_dir,
            margin: 10,
            extensions: vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()],
            model_path: "model.onnx".into(),
            device_id: 0,
            num_threads: 2,
        }
    }

    #[test]
    fn collect_is_not_recursive_and_respects_extensions() {
        let temp_dir = TempDir::new().unwrap();
        let input_dir = temp_dir.path().join("input");
        let subdir = input_dir.join("nested");
        fs::create_dir_all(&subdir).unwrap();

        let img = image::DynamicImage::new_rgb8(4, 4);
        img.save(input_dir.join("a.png")).unwrap();
        img.save(input_dir.join("b.jpg")).unwrap();
        img.save(subdir.join("nested.png")).unwrap();
        fs::write(input_dir.join("notes.txt"), "ignored").unwrap();

        let config = test_config(input_dir.clone(), temp_dir.path().join("out"));
        let processor = ImageProcessor::new(MockSegmenter::new(MaskShape::Full), config);

        let files = processor.collect_image_files(&input_dir);
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.parent() == Some(input_dir.as_path())));
    }

    #[test]
    fn decode_segmented_rejects_alpha_free_output() {
        let img = image::DynamicImage::new_rgb8(4, 4);
        let mut buffer = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Png).unwrap();

        let err = decode_segmented(&buffer.into_inner()).unwrap_err();
        assert!(matches!(err, ProductCropError::Segmentation { .. }));
    }

    #[test]
    fn decode_segmented_accepts_rgba_png() {
        let img = image::DynamicImage::new_rgba8(4, 4);
        let mut buffer = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Png).unwrap();

        let rgba = decode_segmented(&buffer.into_inner()).unwrap();
        assert_eq!(rgba.dimensions(), (4, 4));
    }

    #[test]
    fn process_image_writes_png_named_after_the_stem() {
        let temp_dir = TempDir::new().unwrap();
        let input_file = temp_dir.path().join("widget.jpg");
        let output_dir = temp_dir.path().join("out");
        fs::create_dir_all(&output_dir).unwrap();

        image::DynamicImage::new_rgb8(32, 32)
            .save(&input_file)
            .unwrap();

        let segmenter = MockSegmenter::new(MaskShape::Rectangle {
            x: 8,
            y: 8,
            width: 8,
            height: 8,
        });
        let output = process_image(&segmenter, &input_file, &output_dir, 2).unwrap();

        assert_eq!(output, output_dir.join("widget.png"));
        let cropped = image::open(&output).unwrap().into_rgba8();
        // 8x8 foreground plus a 2px margin on every side.
        assert_eq!(cropped.dimensions(), (12, 12));
    }

    #[test]
    fn process_image_overwrites_existing_output() {
        let temp_dir = TempDir::new().unwrap();
        let input_file = temp_dir.path().join("widget.png");
        let output_dir = temp_dir.path().join("out");
        fs::create_dir_all(&output_dir).unwrap();
        fs::write(output_dir.join("widget.png"), b"stale").unwrap();

        image::DynamicImage::new_rgb8(16, 16)
            .save(&input_file)
            .unwrap();

        let segmenter = MockSegmenter::new(MaskShape::Full);
        let output = process_image(&segmenter, &input_file, &output_dir, 0).unwrap();

        // The stale file was replaced by a decodable PNG.
        let cropped = image::open(&output).unwrap().into_rgba8();
        assert_eq!(cropped.dimensions(), (16, 16));
    }
}
