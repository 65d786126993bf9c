use std::time::Duration;

use eframe::egui;

use super::models::ProductCropGui;

impl eframe::App for ProductCropGui {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_events();

        if self.is_processing {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("Product Crop").size(24.0).strong());
                ui.label(
                    egui::RichText::new(format!("v{}", env!("CARGO_PKG_VERSION")))
                        .size(10.0)
                        .weak(),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.add_enabled_ui(self.is_processing, |ui| {
                        if ui.button("Stop").clicked() {
                            self.stop_processing();
                        }
                    });
                    let can_start = !self.is_processing
                        && !self.input_files.is_empty()
                        && self.model_path.is_some();
                    ui.add_enabled_ui(can_start, |ui| {
                        if ui.button("Process images").clicked() {
                            self.start_processing();
                        }
                    });
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.group(|ui| {
                ui.label(egui::RichText::new("Input").strong());
                ui.horizontal(|ui| {
                    ui.add_enabled_ui(!self.is_processing, |ui| {
                        if ui.button("Select images").clicked() {
                            self.select_input_files();
                        }
                        if ui.button("Select folder").clicked() {
                            self.select_input_folder();
                        }
                    });
                    if self.input_files.is_empty() {
                        ui.label("no files selected");
                    } else {
                        ui.label(format!("{} files selected", self.input_files.len()));
                    }
                });
            });

            ui.group(|ui| {
                ui.label(egui::RichText::new("Output").strong());
                ui.horizontal(|ui| {
                    ui.add_enabled_ui(!self.is_processing, |ui| {
                        if ui.button("Output folder").clicked() {
                            self.select_output_directory();
                        }
                    });
                    ui.label(self.output_dir.display().to_string());
                });
                ui.horizontal(|ui| {
                    ui.label("Margin (px):");
                    ui.add_enabled_ui(!self.is_processing, |ui| {
                        ui.add(egui::DragValue::new(&mut self.margin).range(0..=200));
                    });
                });
            });

            ui.group(|ui| {
                ui.label(egui::RichText::new("Model").strong());
                ui.horizontal(|ui| {
                    ui.add_enabled_ui(!self.is_processing, |ui| {
                        if ui.button("Select model").clicked() {
                            self.select_model_file();
                        }
                    });
                    match &self.model_path {
                        Some(path) => ui.label(path.display().to_string()),
                        None => ui.label("no model selected"),
                    };
                });
            });

            ui.add_space(8.0);
            ui.add(egui::ProgressBar::new(self.progress).show_percentage());
            ui.add_space(4.0);
            ui.label(&self.status_message);
        });

        if let Some((processed, failed)) = self.completion {
            egui::Window::new("Processing complete")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(format!("{processed} images processed successfully"));
                    ui.label(format!("{failed} images failed"));
                    if ui.button("OK").clicked() {
                        self.completion = None;
                    }
                });
        }
    }
}
