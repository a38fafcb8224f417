//! Shared constants for stamping
//!
//! This module centralizes magic numbers used by geometry, cropping and
//! the PDF backend.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per inch, the PDF user-space unit
pub const POINTS_PER_INCH: f32 = 72.0;

/// Resolution assumed when an image carries none (1 pixel = 1 point)
pub const DEFAULT_RESOLUTION_DPI: f32 = 72.0;

/// Centimeters per inch, for dots-per-centimeter density headers
pub const CM_PER_INCH: f32 = 2.54;

/// Meters per inch, for PNG pixels-per-meter density
pub const METERS_PER_INCH: f32 = 0.0254;

// =============================================================================
// Default Page Dimensions
// =============================================================================

/// Default page width in points (US Letter: 8.5" × 11")
pub const DEFAULT_PAGE_WIDTH_PT: f32 = 612.0;

/// Default page height in points (US Letter)
pub const DEFAULT_PAGE_HEIGHT_PT: f32 = 792.0;

// =============================================================================
// Cropping
// =============================================================================

/// Slack allowed when comparing a percentage crop's far edge against the
/// page edge, so crops that land exactly on the edge survive float
/// rounding. Absolute crops get no slack.
pub const CROP_EDGE_TOLERANCE_PT: f32 = 1e-3;

// =============================================================================
// Resources
// =============================================================================

/// Prefix for XObject resource names of inserted images
pub const IMAGE_RESOURCE_PREFIX: &str = "StampImg";
