mod backend;
mod config;
pub mod constants;
pub mod crop;
pub mod dirs;
pub mod geometry;
pub mod pool;
pub mod probe;
pub mod render;
pub mod stamp;
mod types;

pub use backend::DocumentBackend;
pub use config::*;
pub use crop::{CropMode, CropRequest, crop_absolute, crop_percent, resolve_crop};
pub use dirs::{DirectoryProvisioning, provision_directories};
pub use geometry::placement_rect;
pub use pool::{choose_from_pool, dispose, list_pool};
pub use probe::{FileImageProbe, ImageProbe};
pub use render::{PdfCanvas, page_dimensions};
pub use stamp::{
    PlacementEngine, SkipCategories, StampJob, load_pdf, run_job, save_pdf, stamp,
};
pub use types::*;
