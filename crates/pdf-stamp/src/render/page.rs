//! Page dictionary helpers
//!
//! Reads page boxes (following inherited attributes), writes crop boxes,
//! registers image XObjects in page resources and appends drawing
//! operators to page content.

use crate::constants::{DEFAULT_PAGE_HEIGHT_PT, DEFAULT_PAGE_WIDTH_PT, IMAGE_RESOURCE_PREFIX};
use crate::types::{Rect, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Page tree nodes are never nested deeper than this; guards against
/// cyclic `Parent` links in damaged files.
const MAX_TREE_DEPTH: usize = 64;

// =============================================================================
// Page Boxes
// =============================================================================

/// A page box in PDF user space (origin bottom-left)
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PdfBox {
    pub llx: f32,
    pub lly: f32,
    pub urx: f32,
    pub ury: f32,
}

impl PdfBox {
    fn from_corners(a: f32, b: f32, c: f32, d: f32) -> Self {
        Self {
            llx: a.min(c),
            lly: b.min(d),
            urx: a.max(c),
            ury: b.max(d),
        }
    }

    pub fn width(&self) -> f32 {
        self.urx - self.llx
    }

    pub fn height(&self) -> f32 {
        self.ury - self.lly
    }

    /// Map a top-left based rectangle relative to this box into user space
    pub fn map_rect(&self, rect: Rect) -> PdfBox {
        PdfBox::from_corners(
            self.llx + rect.x0,
            self.ury - rect.y1,
            self.llx + rect.x1,
            self.ury - rect.y0,
        )
    }

    fn to_object(self) -> Object {
        Object::Array(vec![
            Object::Real(self.llx),
            Object::Real(self.lly),
            Object::Real(self.urx),
            Object::Real(self.ury),
        ])
    }
}

/// Default MediaBox for US Letter size
fn default_media_box() -> PdfBox {
    PdfBox::from_corners(0.0, 0.0, DEFAULT_PAGE_WIDTH_PT, DEFAULT_PAGE_HEIGHT_PT)
}

/// The page's MediaBox, inherited from the page tree if necessary
pub(crate) fn media_box(doc: &Document, page_id: ObjectId) -> Result<PdfBox> {
    Ok(inherited_attribute(doc, page_id, b"MediaBox")?
        .and_then(|obj| parse_box(doc, &obj))
        .unwrap_or_else(default_media_box))
}

/// The page's CropBox, if one is set on the page or inherited
pub(crate) fn crop_box(doc: &Document, page_id: ObjectId) -> Result<Option<PdfBox>> {
    Ok(inherited_attribute(doc, page_id, b"CropBox")?.and_then(|obj| parse_box(doc, &obj)))
}

/// Get page dimensions (width, height) in points from the MediaBox
pub fn get_page_dimensions(doc: &Document, page_id: ObjectId) -> Result<(f32, f32)> {
    let mb = media_box(doc, page_id)?;
    Ok((mb.width(), mb.height()))
}

/// Set the CropBox directly on the page dictionary
pub(crate) fn set_crop_box(doc: &mut Document, page_id: ObjectId, crop: PdfBox) -> Result<()> {
    let page_dict = doc.get_object_mut(page_id)?.as_dict_mut()?;
    page_dict.set("CropBox", crop.to_object());
    Ok(())
}

fn parse_box(doc: &Document, obj: &Object) -> Option<PdfBox> {
    let arr = resolve(doc, obj).ok()?.as_array().ok()?;
    if arr.len() != 4 {
        return None;
    }
    let values: Vec<f32> = arr
        .iter()
        .map(|item| extract_number(resolve(doc, item).ok()?))
        .collect::<Option<_>>()?;
    Some(PdfBox::from_corners(
        values[0], values[1], values[2], values[3],
    ))
}

/// Extract numeric value from a PDF object
fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

// =============================================================================
// Inheritance
// =============================================================================

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Result<&'a Object> {
    match obj {
        Object::Reference(id) => Ok(doc.get_object(*id)?),
        other => Ok(other),
    }
}

/// Look up `key` on the page, then on its ancestors in the page tree.
/// References are resolved one level.
fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Result<Option<Object>> {
    let mut current = Some(page_id);
    let mut depth = 0;

    while let Some(id) = current {
        let dict = doc.get_dictionary(id)?;
        if let Ok(value) = dict.get(key) {
            return Ok(Some(resolve(doc, value)?.clone()));
        }

        depth += 1;
        if depth > MAX_TREE_DEPTH {
            break;
        }
        current = dict.get(b"Parent").and_then(|p| p.as_reference()).ok();
    }

    Ok(None)
}

// =============================================================================
// Resources
// =============================================================================

/// Make `xobject_id` available to the page and return its resource name.
///
/// The page receives its own copy of any inherited resources so other
/// pages sharing them are left untouched.
pub(crate) fn register_xobject(
    doc: &mut Document,
    page_id: ObjectId,
    xobject_id: ObjectId,
) -> Result<String> {
    let mut resources = match inherited_attribute(doc, page_id, b"Resources")? {
        Some(Object::Dictionary(dict)) => dict,
        _ => Dictionary::new(),
    };

    let mut xobjects = match resources.get(b"XObject") {
        Ok(obj) => match resolve(doc, obj)? {
            Object::Dictionary(dict) => dict.clone(),
            _ => Dictionary::new(),
        },
        Err(_) => Dictionary::new(),
    };

    let name = format!("{}{}", IMAGE_RESOURCE_PREFIX, xobject_id.0);
    xobjects.set(name.as_bytes(), Object::Reference(xobject_id));
    resources.set("XObject", Object::Dictionary(xobjects));

    let page_dict = doc.get_object_mut(page_id)?.as_dict_mut()?;
    page_dict.set("Resources", Object::Dictionary(resources));

    Ok(name)
}

// =============================================================================
// Content
// =============================================================================

/// Content stream operators that draw an image XObject into `target`
pub(crate) fn image_draw_command(name: &str, target: PdfBox) -> String {
    format!(
        "q {} 0 0 {} {} {} cm /{} Do Q\n",
        target.width(),
        target.height(),
        target.llx,
        target.lly,
        name
    )
}

/// Append a content stream to the page.
///
/// With `isolate_existing`, the current content is first wrapped in a
/// `q`/`Q` pair so graphics state it leaves behind cannot leak into the
/// appended operators.
pub(crate) fn append_content(
    doc: &mut Document,
    page_id: ObjectId,
    content: Vec<u8>,
    isolate_existing: bool,
) -> Result<()> {
    let mut contents: Vec<Object> = match doc.get_dictionary(page_id)?.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id)? {
            Object::Array(arr) => arr.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(arr)) => arr.clone(),
        _ => Vec::new(),
    };

    if isolate_existing && !contents.is_empty() {
        let open_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let close_id = doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));
        contents.insert(0, Object::Reference(open_id));
        contents.push(Object::Reference(close_id));
    }

    let content_id = doc.add_object(Stream::new(Dictionary::new(), content));
    contents.push(Object::Reference(content_id));

    let page_dict = doc.get_object_mut(page_id)?.as_dict_mut()?;
    page_dict.set("Contents", Object::Array(contents));
    Ok(())
}
