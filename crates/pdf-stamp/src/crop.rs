//! Crop box calculation
//!
//! Turns a crop request into a rectangle inside the page's natural
//! rectangle. Two modes are supported:
//! - absolute: width/height and an optional origin, in points
//! - percent: a fraction of each axis; negative values crop from the
//!   opposite edge, keeping the far end of the axis

use crate::constants::CROP_EDGE_TOLERANCE_PT;
use crate::types::*;

/// How the crop rectangle is specified
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CropMode {
    /// Size and origin in points
    Absolute {
        width: f32,
        height: f32,
        x: f32,
        y: f32,
    },
    /// Percentage of each page axis
    Percent {
        width_percent: f32,
        height_percent: f32,
    },
}

impl CropMode {
    /// Absolute crop anchored at the page origin
    pub fn absolute(width: f32, height: f32) -> Self {
        CropMode::Absolute {
            width,
            height,
            x: 0.0,
            y: 0.0,
        }
    }

    /// Percent crop of the width only, keeping the full height
    pub fn width_percent(width_percent: f32) -> Self {
        CropMode::Percent {
            width_percent,
            height_percent: 100.0,
        }
    }
}

/// A crop to apply to one page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRequest {
    pub page_index: usize,
    pub mode: CropMode,
}

/// Resolve a crop mode against a page of the given size
pub fn resolve_crop(page_size: (f32, f32), mode: &CropMode) -> Result<Rect> {
    let (page_width, page_height) = page_size;
    match *mode {
        CropMode::Absolute {
            width,
            height,
            x,
            y,
        } => crop_absolute(page_width, page_height, width, height, x, y),
        CropMode::Percent {
            width_percent,
            height_percent,
        } => crop_percent(page_width, page_height, width_percent, height_percent),
    }
}

/// Crop rectangle of `width` x `height` points with its top-left corner at `(x, y)`.
pub fn crop_absolute(
    page_width: f32,
    page_height: f32,
    width: f32,
    height: f32,
    x: f32,
    y: f32,
) -> Result<Rect> {
    let rect = Rect::from_origin_size(x, y, width, height);
    check_bounds(rect, page_width, page_height, 0.0)?;
    Ok(rect)
}

/// Crop rectangle covering a percentage of each axis.
pub fn crop_percent(
    page_width: f32,
    page_height: f32,
    width_percent: f32,
    height_percent: f32,
) -> Result<Rect> {
    if width_percent == 0.0 || height_percent == 0.0 {
        return Err(StampError::InvalidCropPercent);
    }

    let (x, width) = axis_span(page_width, width_percent);
    let (y, height) = axis_span(page_height, height_percent);

    let rect = Rect::from_origin_size(x, y, width, height);
    check_bounds(rect, page_width, page_height, CROP_EDGE_TOLERANCE_PT)?;

    // Rounding can leave the far edge a hair past the page
    Ok(Rect {
        x1: rect.x1.min(page_width),
        y1: rect.y1.min(page_height),
        ..rect
    })
}

/// Origin and extent along one axis for a percentage crop
fn axis_span(dimension: f32, percent: f32) -> (f32, f32) {
    if percent < 0.0 {
        let origin = dimension * percent.abs() / 100.0;
        (origin, dimension - origin)
    } else {
        (0.0, dimension * percent / 100.0)
    }
}

fn check_bounds(rect: Rect, page_width: f32, page_height: f32, tolerance: f32) -> Result<()> {
    let inside = rect.x0 >= 0.0
        && rect.y0 >= 0.0
        && rect.width() > 0.0
        && rect.height() > 0.0
        && rect.x1 <= page_width + tolerance
        && rect.y1 <= page_height + tolerance;

    if inside {
        Ok(())
    } else {
        Err(StampError::CropOutOfBounds {
            rect,
            page_width,
            page_height,
        })
    }
}
