use crate::types::{Rect, Result};
use std::path::Path;

/// Page-level operations the placement engine needs from a document.
///
/// Rectangles are in points with a top-left origin and y growing downward.
pub trait DocumentBackend {
    fn page_count(&self) -> usize;

    /// Width and height of the page's natural (media) rectangle
    fn page_size(&self, page_index: usize) -> Result<(f32, f32)>;

    /// Draw the image at `source` into `rect` on top of the page's content
    fn insert_image(&mut self, page_index: usize, rect: Rect, source: &Path) -> Result<()>;

    /// Restrict the visible region of the page to `rect`
    fn set_crop_box(&mut self, page_index: usize, rect: Rect) -> Result<()>;
}
