#![allow(dead_code)]

use lopdf::{Dictionary, Document, Object, Stream};
use pdf_stamp::*;
use std::cell::RefCell;
use std::path::{Path, PathBuf};

pub fn create_test_pdf(num_pages: usize) -> Document {
    let mut doc = Document::with_version("1.7");

    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for _ in 0..num_pages {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(600),
                    Object::Integer(800),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));

    doc.trailer.set("Root", catalog_id);

    doc
}

/// Write a small RGB PNG and return its path
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    image::RgbImage::from_pixel(width, height, image::Rgb([200, 30, 30]))
        .save(&path)
        .unwrap();
    path
}

/// Create `count` placeholder files named `img{n}.png` in `dir`
pub fn fill_pool(dir: &Path, count: usize) -> Vec<PathBuf> {
    std::fs::create_dir_all(dir).unwrap();
    (0..count)
        .map(|n| {
            let path = dir.join(format!("img{}.png", n));
            std::fs::write(&path, b"placeholder").unwrap();
            path
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Insert {
        page: usize,
        rect: Rect,
        source: PathBuf,
    },
    Crop {
        page: usize,
        rect: Rect,
    },
}

/// Backend that records every call instead of touching a PDF
pub struct RecordingBackend {
    pub pages: Vec<(f32, f32)>,
    pub calls: Vec<Call>,
}

impl RecordingBackend {
    pub fn new(page_count: usize) -> Self {
        Self {
            pages: vec![(600.0, 800.0); page_count],
            calls: Vec::new(),
        }
    }

    pub fn inserts(&self) -> Vec<(usize, Rect, PathBuf)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Insert { page, rect, source } => Some((*page, *rect, source.clone())),
                Call::Crop { .. } => None,
            })
            .collect()
    }
}

impl DocumentBackend for RecordingBackend {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_size(&self, page_index: usize) -> Result<(f32, f32)> {
        self.pages
            .get(page_index)
            .copied()
            .ok_or(StampError::PageOutOfRange {
                index: page_index,
                page_count: self.pages.len(),
            })
    }

    fn insert_image(&mut self, page_index: usize, rect: Rect, source: &Path) -> Result<()> {
        self.calls.push(Call::Insert {
            page: page_index,
            rect,
            source: source.to_path_buf(),
        });
        Ok(())
    }

    fn set_crop_box(&mut self, page_index: usize, rect: Rect) -> Result<()> {
        self.calls.push(Call::Crop {
            page: page_index,
            rect,
        });
        Ok(())
    }
}

/// Probe that reports the same geometry for every file and remembers
/// which files it was asked about
pub struct FixedProbe {
    pub geometry: PixelGeometry,
    pub seen: RefCell<Vec<PathBuf>>,
}

impl FixedProbe {
    pub fn new(width: u32, height: u32, dpi: f32) -> Self {
        Self {
            geometry: PixelGeometry {
                width,
                height,
                x_resolution: dpi,
                y_resolution: dpi,
            },
            seen: RefCell::new(Vec::new()),
        }
    }
}

impl ImageProbe for FixedProbe {
    fn read_geometry(&self, path: &Path) -> Result<PixelGeometry> {
        self.seen.borrow_mut().push(path.to_path_buf());
        Ok(self.geometry)
    }
}

pub fn placement(x: f32, y: f32, scale: f32, page: PageTarget) -> Placement {
    Placement { x, y, scale, page }
}
