use std::fs;
use std::path::PathBuf;

use image::{DynamicImage, Rgb, RgbImage};
use tempfile::TempDir;

use product_crop_rs::mocks::{MaskShape, MockSegmenter};
use product_crop_rs::{Config, ImageProcessor, ProductCropError, Segmenter};

fn test_config(input_dir: PathBuf, output_dir: PathBuf, margin: u32) -> Config {
    Config {
        input_dir,
        output_dir,
        margin,
        extensions: vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()],
        model_path: "unused.onnx".into(),
        device_id: 0,
        num_threads: 2,
    }
}

fn write_product_photo(path: &PathBuf, width: u32, height: u32) {
    let img = RgbImage::from_pixel(width, height, Rgb([180, 180, 180]));
    DynamicImage::ImageRgb8(img).save(path).unwrap();
}

#[test]
fn batch_crops_every_matching_image() {
    let temp_dir = TempDir::new().unwrap();
    let input_dir = temp_dir.path().join("input");
    let output_dir = temp_dir.path().join("output");
    fs::create_dir_all(&input_dir).unwrap();

    write_product_photo(&input_dir.join("mug.jpg"), 50, 50);
    write_product_photo(&input_dir.join("lamp.png"), 50, 50);
    fs::write(input_dir.join("readme.txt"), "not an image").unwrap();

    // Foreground block (10,10)-(20,20); with margin 3 the crop is 17x17.
    let segmenter = MockSegmenter::new(MaskShape::Rectangle {
        x: 10,
        y: 10,
        width: 11,
        height: 11,
    });
    let processor = ImageProcessor::new(segmenter, test_config(input_dir, output_dir.clone(), 3));

    let summary = processor.process_directory().unwrap();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failed, 0);

    for name in ["mug.png", "lamp.png"] {
        let output = output_dir.join(name);
        assert!(output.exists(), "missing output: {name}");
        let cropped = image::open(&output).unwrap().into_rgba8();
        assert_eq!(cropped.dimensions(), (17, 17));
    }
}

#[test]
fn one_bad_image_never_aborts_the_batch() {
    let temp_dir = TempDir::new().unwrap();
    let input_dir = temp_dir.path().join("input");
    let output_dir = temp_dir.path().join("output");
    fs::create_dir_all(&input_dir).unwrap();

    write_product_photo(&input_dir.join("good.png"), 40, 40);
    // Decodable by the collector but rejected by the segmenter.
    fs::write(input_dir.join("broken.jpg"), b"truncated junk").unwrap();

    let segmenter = MockSegmenter::new(MaskShape::Full);
    let processor = ImageProcessor::new(segmenter, test_config(input_dir, output_dir.clone(), 0));

    let summary = processor.process_directory().unwrap();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.failed, 1);
    assert!(output_dir.join("good.png").exists());
    assert!(!output_dir.join("broken.png").exists());
}

#[test]
fn empty_foreground_counts_as_a_failure() {
    let temp_dir = TempDir::new().unwrap();
    let input_dir = temp_dir.path().join("input");
    let output_dir = temp_dir.path().join("output");
    fs::create_dir_all(&input_dir).unwrap();

    write_product_photo(&input_dir.join("blank.png"), 30, 30);

    let segmenter = MockSegmenter::new(MaskShape::Empty);
    let processor = ImageProcessor::new(segmenter, test_config(input_dir, output_dir.clone(), 10));

    let summary = processor.process_directory().unwrap();
    assert_eq!(summary.total, 1);
    assert_eq!(summary.processed, 0);
    assert_eq!(summary.failed, 1);
    assert!(!output_dir.join("blank.png").exists());
}

#[test]
fn empty_input_directory_yields_an_empty_summary() {
    let temp_dir = TempDir::new().unwrap();
    let input_dir = temp_dir.path().join("input");
    fs::create_dir_all(&input_dir).unwrap();

    let segmenter = MockSegmenter::new(MaskShape::Full);
    let processor = ImageProcessor::new(
        segmenter,
        test_config(input_dir, temp_dir.path().join("output"), 10),
    );

    let summary = processor.process_directory().unwrap();
    assert_eq!(summary.total, 0);
    assert_eq!(summary.processed, 0);
    assert_eq!(summary.failed, 0);
}

#[test]
fn missing_input_directory_is_a_filesystem_error() {
    let temp_dir = TempDir::new().unwrap();
    let segmenter = MockSegmenter::new(MaskShape::Full);
    let processor = ImageProcessor::new(
        segmenter,
        test_config(
            temp_dir.path().join("does-not-exist"),
            temp_dir.path().join("output"),
            10,
        ),
    );

    let err = processor.process_directory().unwrap_err();
    assert!(matches!(err, ProductCropError::FileSystem { .. }));
}

#[test]
fn segmenter_boundary_round_trips_through_bytes() {
    // The pipeline talks to the segmenter in encoded bytes only; whatever
    // the mock returns must decode to an alpha-bearing image.
    let img = DynamicImage::new_rgb8(20, 20);
    let mut buffer = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buffer, image::ImageFormat::Png).unwrap();

    let segmenter = MockSegmenter::new(MaskShape::Rectangle {
        x: 5,
        y: 5,
        width: 10,
        height: 10,
    });
    let segmented = segmenter.segment(&buffer.into_inner()).unwrap();

    let decoded = image::load_from_memory(&segmented).unwrap();
    assert!(decoded.color().has_alpha());

    let cropped = product_crop_rs::crop_to_foreground(&decoded.into_rgba8(), 0).unwrap();
    assert_eq!(cropped.dimensions(), (10, 10));
}
