//! Image XObject creation
//!
//! JPEG files in grey or RGB are embedded byte-for-byte with `DCTDecode`.
//! Everything else is decoded and stored as 8-bit samples with Flate, with
//! the alpha channel (if any) split into a soft mask.

use crate::types::Result;
use image::{ColorType, DynamicImage, ImageFormat};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use std::path::Path;

/// Add the image at `path` to the document as an Image XObject.
pub(crate) fn create_image_xobject(doc: &mut Document, path: &Path) -> Result<ObjectId> {
    let bytes = std::fs::read(path)?;
    let format = image::guess_format(&bytes)?;
    let decoded = image::load_from_memory_with_format(&bytes, format)?;

    if format == ImageFormat::Jpeg {
        if let Some(color_space) = jpeg_color_space(decoded.color()) {
            let stream = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => decoded.width() as i64,
                    "Height" => decoded.height() as i64,
                    "ColorSpace" => color_space,
                    "BitsPerComponent" => 8,
                    "Filter" => "DCTDecode",
                },
                bytes,
            )
            .with_compression(false);
            return Ok(doc.add_object(stream));
        }
    }

    add_decoded_image(doc, &decoded)
}

fn jpeg_color_space(color: ColorType) -> Option<&'static str> {
    match color {
        ColorType::L8 => Some("DeviceGray"),
        ColorType::Rgb8 => Some("DeviceRGB"),
        _ => None,
    }
}

fn add_decoded_image(doc: &mut Document, decoded: &DynamicImage) -> Result<ObjectId> {
    let (width, height) = (decoded.width() as i64, decoded.height() as i64);
    let has_color = decoded.color().has_color();

    let (samples, alpha) = if decoded.color().has_alpha() {
        if has_color {
            let rgba = decoded.to_rgba8();
            let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
            let mut alpha = Vec::with_capacity(rgba.len() / 4);
            for pixel in rgba.pixels() {
                rgb.extend_from_slice(&pixel.0[..3]);
                alpha.push(pixel.0[3]);
            }
            (rgb, Some(alpha))
        } else {
            let luma_alpha = decoded.to_luma_alpha8();
            let mut luma = Vec::with_capacity(luma_alpha.len() / 2);
            let mut alpha = Vec::with_capacity(luma_alpha.len() / 2);
            for pixel in luma_alpha.pixels() {
                luma.push(pixel.0[0]);
                alpha.push(pixel.0[1]);
            }
            (luma, Some(alpha))
        }
    } else if has_color {
        (decoded.to_rgb8().into_raw(), None)
    } else {
        (decoded.to_luma8().into_raw(), None)
    };

    let mut image_dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width,
        "Height" => height,
        "ColorSpace" => if has_color { "DeviceRGB" } else { "DeviceGray" },
        "BitsPerComponent" => 8,
    };

    if let Some(alpha) = alpha {
        let mut smask = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width,
                "Height" => height,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            alpha,
        );
        smask.compress()?;
        let smask_id = doc.add_object(smask);
        image_dict.set("SMask", Object::Reference(smask_id));
    }

    let mut stream = Stream::new(image_dict, samples);
    stream.compress()?;
    Ok(doc.add_object(stream))
}
