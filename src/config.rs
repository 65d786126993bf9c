use clap::Parser;
use std::path::{Path, PathBuf};

/// Extensions processed when no explicit list is given.
pub const DEFAULT_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Parser, Clone, Debug)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Directory containing the images to process
    pub input_dir: PathBuf,

    /// Directory the cropped images are written to
    #[arg(short, long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Margin in pixels kept around the detected object
    #[arg(short, long, default_value_t = 10)]
    pub margin: u32,

    /// File extensions to process, comma separated
    #[arg(short, long, value_delimiter = ',', default_value = "jpg,jpeg,png")]
    pub extensions: Vec<String>,

    /// Path to the segmentation model (ONNX)
    #[arg(long)]
    pub model_path: PathBuf,

    #[arg(short, long, default_value_t = 0)]
    pub device_id: i32,

    #[arg(
        short, long, default_value_t = std::thread::available_parallelism().unwrap().get()
    )]
    pub num_threads: usize,
}

impl Config {
    /// Whether a path's extension is in the configured list.
    ///
    /// Comparison is case-insensitive and tolerates a leading dot in the
    /// configured entries (`.jpg` and `jpg` both match).
    pub fn is_supported_extension(&self, path: &Path) -> bool {
        let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
            return false;
        };
        let extension = extension.to_lowercase();
        self.extensions
            .iter()
            .any(|e| e.trim_start_matches('.').to_lowercase() == extension)
    }
}
