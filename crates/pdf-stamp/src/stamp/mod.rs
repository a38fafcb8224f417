//! PDF stamping - drawing configured images onto existing pages
//!
//! A run moves strictly forward through these stages:
//! 1. Validate the configuration and every crop request
//! 2. Create the directories the configuration refers to
//! 3. Apply crop boxes
//! 4. Place fixed images, then random pools, then disposable pools
//!
//! Saving the document is left to the caller.

mod engine;
mod io;

pub use engine::PlacementEngine;
pub use io::{load_pdf, save_pdf};

use crate::backend::DocumentBackend;
use crate::config::PlacementConfig;
use crate::crop::{CropRequest, resolve_crop};
use crate::dirs::provision_directories;
use crate::probe::{FileImageProbe, ImageProbe};
use crate::render::PdfCanvas;
use crate::types::*;
use lopdf::Document;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Image categories left out of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SkipCategories {
    pub images: bool,
    pub random_images: bool,
    pub disposable_random_images: bool,
}

impl SkipCategories {
    pub fn all(self) -> bool {
        self.images && self.random_images && self.disposable_random_images
    }
}

/// One stamping run over a document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StampJob {
    pub config: PlacementConfig,
    /// Crops applied before any image is placed
    pub crops: Vec<CropRequest>,
    pub skip: SkipCategories,
    /// Seed for pool selection; random when absent
    pub seed: Option<u64>,
}

impl StampJob {
    /// Whether running this job changes the document and so warrants a save
    pub fn has_work(&self) -> bool {
        !self.crops.is_empty() || !self.skip.all()
    }

    /// Random source for pool selection
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Stamp a document off the async runtime's worker threads.
///
/// The job is validated by [`run_job`] before anything is changed.
pub async fn stamp(document: Document, job: &StampJob) -> Result<(Document, StampReport)> {
    let job = job.clone();

    tokio::task::spawn_blocking(move || {
        let mut canvas = PdfCanvas::new(document);
        let mut rng = job.rng();
        let report = run_job(&mut canvas, &job, &FileImageProbe, &mut rng)?;
        Ok((canvas.into_document(), report))
    })
    .await?
}

/// Run a job against any backend.
///
/// Configuration and crop problems are reported before anything is
/// changed on disk or in the document.
pub fn run_job<B, P, R>(
    backend: &mut B,
    job: &StampJob,
    probe: &P,
    rng: &mut R,
) -> Result<StampReport>
where
    B: DocumentBackend + ?Sized,
    P: ImageProbe + ?Sized,
    R: Rng + ?Sized,
{
    let page_count = backend.page_count();
    job.config.validate()?;
    job.config.validate_pages(page_count)?;
    let crops = resolve_crops(backend, &job.crops)?;

    let mut report = StampReport::default();

    let provisioning = provision_directories(&job.config);
    report.directories_ok = provisioning.is_success();
    for (directory, e) in provisioning.failed {
        report.warnings.push(StampWarning::DirectoryCreationFailure {
            directory,
            reason: e.to_string(),
        });
    }

    for (page_index, rect) in crops {
        log::info!("Cropping page {} to {}", page_index, rect);
        backend.set_crop_box(page_index, rect)?;
        report.crops_applied += 1;
    }

    let mut engine = PlacementEngine::with_report(backend, probe, report);
    if !job.skip.images {
        engine.place_fixed_images(&job.config.images)?;
    }
    if !job.skip.random_images {
        engine.place_random_pools(&job.config.random_images, rng)?;
    }
    if !job.skip.disposable_random_images {
        engine.place_disposable_pools(&job.config.disposable_random_images, rng)?;
    }

    Ok(engine.finish())
}

/// Validate every crop request against its page
fn resolve_crops<B>(backend: &B, crops: &[CropRequest]) -> Result<Vec<(usize, Rect)>>
where
    B: DocumentBackend + ?Sized,
{
    let page_count = backend.page_count();
    crops
        .iter()
        .map(|crop| {
            if crop.page_index >= page_count {
                return Err(StampError::PageOutOfRange {
                    index: crop.page_index,
                    page_count,
                });
            }
            let page_size = backend.page_size(crop.page_index)?;
            Ok((crop.page_index, resolve_crop(page_size, &crop.mode)?))
        })
        .collect()
}
