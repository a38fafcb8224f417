//! Image metadata
//!
//! Pixel dimensions come from the `image` crate. Resolution is looked up per
//! format:
//! - PNG: the `pHYs` chunk, then an `eXIf` chunk
//! - JPEG: EXIF `XResolution`/`YResolution`, then the JFIF `APP0` density
//! - TIFF and WebP: EXIF
//!
//! Anything without usable density reports zero so the 72 DPI default
//! applies.

use crate::constants::{CM_PER_INCH, METERS_PER_INCH};
use crate::types::{PixelGeometry, Result};
use exif::{Exif, In, Tag, Value};
use image::{ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;

/// Source of image size and resolution
pub trait ImageProbe {
    fn read_geometry(&self, path: &Path) -> Result<PixelGeometry>;
}

/// Reads geometry from image files on disk
#[derive(Debug, Clone, Copy, Default)]
pub struct FileImageProbe;

impl ImageProbe for FileImageProbe {
    fn read_geometry(&self, path: &Path) -> Result<PixelGeometry> {
        let bytes = std::fs::read(path)?;
        let (width, height) = ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()?
            .into_dimensions()?;
        let (x_resolution, y_resolution) = read_resolution(&bytes).unwrap_or((0.0, 0.0));

        Ok(PixelGeometry {
            width,
            height,
            x_resolution,
            y_resolution,
        })
    }
}

/// Resolution in DPI from an encoded image, if it carries one
pub fn read_resolution(bytes: &[u8]) -> Option<(f32, f32)> {
    match image::guess_format(bytes).ok()? {
        ImageFormat::Png => png_resolution(bytes).or_else(|| exif_resolution(bytes)),
        ImageFormat::Jpeg => exif_resolution(bytes).or_else(|| jfif_resolution(bytes)),
        ImageFormat::Tiff | ImageFormat::WebP => exif_resolution(bytes),
        _ => None,
    }
}

fn png_resolution(bytes: &[u8]) -> Option<(f32, f32)> {
    let reader = png::Decoder::new(Cursor::new(bytes)).read_info().ok()?;
    let dims = reader.info().pixel_dims?;
    // Unspecified units only give the aspect ratio
    match dims.unit {
        png::Unit::Meter if dims.xppu > 0 && dims.yppu > 0 => Some((
            dims.xppu as f32 * METERS_PER_INCH,
            dims.yppu as f32 * METERS_PER_INCH,
        )),
        _ => None,
    }
}

fn exif_resolution(bytes: &[u8]) -> Option<(f32, f32)> {
    let exif = exif::Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()?;

    let x = exif_rational(&exif, Tag::XResolution)?;
    let y = exif_rational(&exif, Tag::YResolution).unwrap_or(x);

    // ResolutionUnit defaults to inches when absent
    let unit = exif
        .get_field(Tag::ResolutionUnit, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .unwrap_or(2);
    match unit {
        2 => Some((x, y)),
        3 => Some((x * CM_PER_INCH, y * CM_PER_INCH)),
        _ => None,
    }
}

fn exif_rational(exif: &Exif, tag: Tag) -> Option<f32> {
    match &exif.get_field(tag, In::PRIMARY)?.value {
        Value::Rational(values) => values
            .first()
            .map(|r| r.to_f64() as f32)
            .filter(|v| v.is_finite() && *v > 0.0),
        _ => None,
    }
}

/// Density from a JFIF APP0 segment directly after SOI.
fn jfif_resolution(bytes: &[u8]) -> Option<(f32, f32)> {
    let segment = bytes.get(2..18)?;
    if segment[0..2] != [0xFF, 0xE0] || &segment[4..9] != b"JFIF\0" {
        return None;
    }

    let units = segment[11];
    let x_density = u16::from_be_bytes([segment[12], segment[13]]) as f32;
    let y_density = u16::from_be_bytes([segment[14], segment[15]]) as f32;
    if x_density == 0.0 || y_density == 0.0 {
        return None;
    }

    match units {
        1 => Some((x_density, y_density)),
        2 => Some((x_density * CM_PER_INCH, y_density * CM_PER_INCH)),
        _ => None,
    }
}
