#[cfg(feature = "gui")]
use eframe::{egui::ViewportBuilder, NativeOptions};
#[cfg(feature = "gui")]
use product_crop_rs::gui::ProductCropGui;

#[cfg(feature = "gui")]
fn main() -> Result<(), eframe::Error> {
    let options = NativeOptions {
        viewport: ViewportBuilder::default()
            .with_inner_size([900.0, 620.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Product Crop",
        options,
        Box::new(|_cc| Ok(Box::new(ProductCropGui::default()))),
    )
}

#[cfg(not(feature = "gui"))]
fn main() {
    eprintln!("GUI feature is not enabled. Please build with --features gui");
    std::process::exit(1);
}
