pub mod app;
pub mod models;
pub mod processing;

pub use models::ProductCropGui;
pub use processing::ProcessingEvent;
