//! Image placement geometry
//!
//! Converts an image's pixel size and resolution into a rectangle in
//! points. A pixel at 72 DPI maps to exactly one point.

use crate::constants::{DEFAULT_RESOLUTION_DPI, POINTS_PER_INCH};
use crate::types::{PixelGeometry, Rect};

/// Size of an image in points at the given scale.
///
/// A zero (or otherwise non-positive) resolution on either axis is
/// replaced with 72 DPI.
pub fn image_size_pt(pixels: PixelGeometry, scale: f32) -> (f32, f32) {
    let x_res = effective_resolution(pixels.x_resolution);
    let y_res = effective_resolution(pixels.y_resolution);

    let width = pixels.width as f32 * POINTS_PER_INCH / x_res * scale;
    let height = pixels.height as f32 * POINTS_PER_INCH / y_res * scale;
    (width, height)
}

/// Rectangle covered by an image whose top-left corner sits at `(x, y)`.
///
/// Callers guarantee `scale > 0` and non-zero pixel dimensions.
pub fn placement_rect(pixels: PixelGeometry, scale: f32, x: f32, y: f32) -> Rect {
    let (width, height) = image_size_pt(pixels, scale);
    Rect::from_origin_size(x, y, width, height)
}

fn effective_resolution(dpi: f32) -> f32 {
    if dpi > 0.0 { dpi } else { DEFAULT_RESOLUTION_DPI }
}
