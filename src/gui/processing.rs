use std::fs;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::thread;

use walkdir::WalkDir;

use super::models::ProductCropGui;
use crate::config::DEFAULT_EXTENSIONS;
use crate::{process_image, OnnxSegmenter};

/// Messages the worker thread sends back to the UI thread.
#[derive(Debug)]
pub enum ProcessingEvent {
    Status(String),
    Progress { done: usize, total: usize },
    Finished { processed: usize, failed: usize },
    Fatal(String),
}

fn has_default_extension(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_lowercase();
            DEFAULT_EXTENSIONS.contains(&ext.as_str())
        })
}

impl ProductCropGui {
    pub fn select_input_files(&mut self) {
        if let Some(files) = rfd::FileDialog::new()
            .add_filter("Images", &DEFAULT_EXTENSIONS)
            .pick_files()
        {
            self.input_files = files;
            self.status_message = format!("{} files selected", self.input_files.len());
        }
    }

    pub fn select_input_folder(&mut self) {
        if let Some(folder) = rfd::FileDialog::new().pick_folder() {
            let mut files: Vec<PathBuf> = WalkDir::new(&folder)
                .max_depth(1)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .filter(|e| has_default_extension(e.path()))
                .map(|e| e.into_path())
                .collect();
            files.sort();

            if files.is_empty() {
                self.status_message = "no images found in the folder".to_string();
            } else {
                self.status_message = format!("{} files found in the folder", files.len());
            }
            self.input_files = files;
        }
    }

    pub fn select_output_directory(&mut self) {
        if let Some(folder) = rfd::FileDialog::new().pick_folder() {
            self.output_dir = folder;
        }
    }

    pub fn select_model_file(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("ONNX models", &["onnx"])
            .pick_file()
        {
            self.model_path = Some(path);
        }
    }

    pub fn start_processing(&mut self) {
        if self.is_processing || self.input_files.is_empty() {
            return;
        }
        let Some(model_path) = self.model_path.clone() else {
            self.status_message = "select a segmentation model first".to_string();
            return;
        };

        self.is_processing = true;
        self.progress = 0.0;
        self.completion = None;
        self.status_message = "Processing started".to_string();
        self.stop_flag.store(false, Ordering::Relaxed);

        let files = self.input_files.clone();
        let output_dir = self.output_dir.clone();
        let margin = self.margin;
        let device_id = self.device_id;
        let stop_flag = self.stop_flag.clone();
        let (tx, rx) = mpsc::channel();
        self.event_receiver = Some(rx);

        thread::spawn(move || {
            let segmenter = match OnnxSegmenter::new(&model_path, device_id) {
                Ok(segmenter) => segmenter,
                Err(e) => {
                    let _ = tx.send(ProcessingEvent::Fatal(format!(
                        "failed to load segmentation model: {e}"
                    )));
                    return;
                }
            };

            if let Err(e) = fs::create_dir_all(&output_dir) {
                let _ = tx.send(ProcessingEvent::Fatal(format!(
                    "failed to create output directory: {e}"
                )));
                return;
            }

            let total = files.len();
            let mut processed = 0;
            let mut failed = 0;

            for (idx, input_file) in files.iter().enumerate() {
                if stop_flag.load(Ordering::Relaxed) {
                    break;
                }

                let _ = tx.send(ProcessingEvent::Status(format!(
                    "Processing: {}",
                    input_file.display()
                )));

                match process_image(&segmenter, input_file, &output_dir, margin) {
                    Ok(_) => processed += 1,
                    Err(e) => {
                        let _ = tx.send(ProcessingEvent::Status(format!(
                            "error processing {}: {e}",
                            input_file.display()
                        )));
                        failed += 1;
                    }
                }

                let _ = tx.send(ProcessingEvent::Progress {
                    done: idx + 1,
                    total,
                });
            }

            let _ = tx.send(ProcessingEvent::Finished { processed, failed });
        });
    }

    pub fn stop_processing(&mut self) {
        if self.is_processing {
            self.stop_flag.store(true, Ordering::Relaxed);
            self.status_message = "Stopping after the current image...".to_string();
        }
    }

    /// Drain worker events; called once per frame.
    pub fn poll_events(&mut self) {
        let Some(receiver) = &self.event_receiver else {
            return;
        };

        let mut finished = false;
        for event in receiver.try_iter() {
            match event {
                ProcessingEvent::Status(message) => self.status_message = message,
                ProcessingEvent::Progress { done, total } => {
                    self.progress = done as f32 / total.max(1) as f32;
                }
                ProcessingEvent::Finished { processed, failed } => {
                    self.status_message = format!(
                        "Processing complete: {processed} succeeded, {failed} failed"
                    );
                    self.completion = Some((processed, failed));
                    finished = true;
                }
                ProcessingEvent::Fatal(message) => {
                    self.status_message = message;
                    finished = true;
                }
            }
        }

        if finished {
            self.is_processing = false;
            self.event_receiver = None;
        }
    }
}
