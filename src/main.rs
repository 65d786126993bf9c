use anyhow::{ensure, Context, Result};
use clap::Parser;
use rayon::ThreadPoolBuilder;

use product_crop_rs::{Config, ImageProcessor, OnnxSegmenter};

fn main() -> Result<()> {
    let config = Config::parse();

    ensure!(config.model_path.exists(), "Model path does not exist");
    ensure!(config.input_dir.is_dir(), "Input directory does not exist");

    ThreadPoolBuilder::new()
        .num_threads(config.num_threads)
        .build_global()?;

    let segmenter = OnnxSegmenter::new(&config.model_path, config.device_id)
        .context("failed to load segmentation model")?;

    let processor = ImageProcessor::new(segmenter, config);
    let summary = processor.process_directory()?;

    println!("\nSummary:");
    println!("Total images: {}", summary.total);
    println!("Successfully processed: {}", summary.processed);
    println!("Failed: {}", summary.failed);

    Ok(())
}
