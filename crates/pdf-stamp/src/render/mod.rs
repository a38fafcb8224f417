//! PDF backend for stamping
//!
//! This module handles all PDF-specific operations:
//! - Creating image XObjects from source files
//! - Drawing images onto existing pages
//! - Reading page boxes and setting crop boxes

mod page;
mod raster;

pub use page::get_page_dimensions;

use crate::backend::DocumentBackend;
use crate::types::*;
use lopdf::{Document, ObjectId};
use page::{append_content, crop_box, image_draw_command, media_box, register_xobject};
use raster::create_image_xobject;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// [`DocumentBackend`] over an in-memory lopdf document.
///
/// Each source image is embedded once and shared by every page it is
/// drawn on.
pub struct PdfCanvas {
    document: Document,
    page_ids: Vec<ObjectId>,
    images: HashMap<PathBuf, ObjectId>,
    isolated_pages: HashSet<ObjectId>,
}

impl PdfCanvas {
    pub fn new(document: Document) -> Self {
        let page_ids = document.get_pages().values().copied().collect();
        Self {
            document,
            page_ids,
            images: HashMap::new(),
            isolated_pages: HashSet::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    fn page_id(&self, page_index: usize) -> Result<ObjectId> {
        self.page_ids
            .get(page_index)
            .copied()
            .ok_or(StampError::PageOutOfRange {
                index: page_index,
                page_count: self.page_ids.len(),
            })
    }

    fn image_xobject(&mut self, source: &Path) -> Result<ObjectId> {
        if let Some(&id) = self.images.get(source) {
            return Ok(id);
        }
        let id = create_image_xobject(&mut self.document, source)?;
        self.images.insert(source.to_path_buf(), id);
        Ok(id)
    }
}

impl DocumentBackend for PdfCanvas {
    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page_size(&self, page_index: usize) -> Result<(f32, f32)> {
        get_page_dimensions(&self.document, self.page_id(page_index)?)
    }

    fn insert_image(&mut self, page_index: usize, rect: Rect, source: &Path) -> Result<()> {
        let page_id = self.page_id(page_index)?;
        let xobject_id = self.image_xobject(source)?;

        // Placement is relative to what the reader sees
        let visible = match crop_box(&self.document, page_id)? {
            Some(crop) => crop,
            None => media_box(&self.document, page_id)?,
        };
        let target = visible.map_rect(rect);

        let name = register_xobject(&mut self.document, page_id, xobject_id)?;
        let isolate = self.isolated_pages.insert(page_id);
        append_content(
            &mut self.document,
            page_id,
            image_draw_command(&name, target).into_bytes(),
            isolate,
        )
    }

    fn set_crop_box(&mut self, page_index: usize, rect: Rect) -> Result<()> {
        let page_id = self.page_id(page_index)?;
        let crop = media_box(&self.document, page_id)?.map_rect(rect);
        page::set_crop_box(&mut self.document, page_id, crop)
    }
}

/// Width and height of a page, by zero-based index
pub fn page_dimensions(doc: &Document, page_index: usize) -> Result<(f32, f32)> {
    let page_count = doc.get_pages().len();
    let page_id = doc
        .get_pages()
        .values()
        .nth(page_index)
        .copied()
        .ok_or(StampError::PageOutOfRange {
            index: page_index,
            page_count,
        })?;
    get_page_dimensions(doc, page_id)
}
