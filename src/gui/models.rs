use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use super::processing::ProcessingEvent;

/// State of the desktop front end.
///
/// Everything the background worker needs is cloned out of this struct when
/// processing starts; the UI thread only ever reads its own copy and the
/// events drained from `event_receiver`.
pub struct ProductCropGui {
    // Input parameters
    pub input_files: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub model_path: Option<PathBuf>,
    pub margin: u32,
    pub device_id: i32,

    // Status
    pub is_processing: bool,
    pub status_message: String,
    pub progress: f32,
    pub completion: Option<(usize, usize)>,

    // Job-boundary cancellation: checked between images, never mid-crop.
    pub stop_flag: Arc<AtomicBool>,

    // Receiver for progress/completion events from the worker thread
    pub event_receiver: Option<Receiver<ProcessingEvent>>,
}

impl Default for ProductCropGui {
    fn default() -> Self {
        let output_dir = std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join("output");

        Self {
            input_files: Vec::new(),
            output_dir,
            model_path: None,
            margin: 10,
            device_id: 0,
            is_processing: false,
            status_message: "Ready".to_string(),
            progress: 0.0,
            completion: None,
            stop_flag: Arc::new(AtomicBool::new(false)),
            event_receiver: None,
        }
    }
}
