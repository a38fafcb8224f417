//! Per-item placement
//!
//! Every item is best-effort: a missing file, an empty or unreadable pool,
//! an unreadable image or a failed disposal is recorded as a warning and
//! the batch moves on. Backend failures are returned as errors.

use crate::backend::DocumentBackend;
use crate::config::{DisposablePoolSpec, ImageSpec, Placement, RandomPoolSpec};
use crate::geometry::placement_rect;
use crate::pool::{choose_from_pool, dispose};
use crate::probe::ImageProbe;
use crate::types::*;
use rand::Rng;
use std::path::{Path, PathBuf};

/// Draws configured images onto a document and records what happened.
pub struct PlacementEngine<'a, B: ?Sized, P: ?Sized> {
    backend: &'a mut B,
    probe: &'a P,
    report: StampReport,
}

impl<'a, B, P> PlacementEngine<'a, B, P>
where
    B: DocumentBackend + ?Sized,
    P: ImageProbe + ?Sized,
{
    /// Continue filling an existing report
    pub fn with_report(backend: &'a mut B, probe: &'a P, report: StampReport) -> Self {
        Self {
            backend,
            probe,
            report,
        }
    }

    pub fn finish(self) -> StampReport {
        self.report
    }

    /// Place fixed images in order, skipping files that do not exist
    pub fn place_fixed_images(&mut self, images: &[ImageSpec]) -> Result<()> {
        for image in images {
            if !image.path.is_file() {
                self.report.warn(StampWarning::MissingSourceFile {
                    path: image.path.clone(),
                });
                continue;
            }
            self.place(&image.path, &image.placement)?;
        }
        Ok(())
    }

    /// Place one randomly chosen image from each pool
    pub fn place_random_pools<R: Rng + ?Sized>(
        &mut self,
        pools: &[RandomPoolSpec],
        rng: &mut R,
    ) -> Result<()> {
        for pool in pools {
            if let Some(chosen) = self.choose(&pool.pool, rng) {
                self.place(&chosen, &pool.placement)?;
            }
        }
        Ok(())
    }

    /// Place one randomly chosen image from each pool, then move it to the
    /// pool's disposed directory. A failed move leaves the placement in place.
    pub fn place_disposable_pools<R: Rng + ?Sized>(
        &mut self,
        pools: &[DisposablePoolSpec],
        rng: &mut R,
    ) -> Result<()> {
        for pool in pools {
            let Some(chosen) = self.choose(&pool.pool, rng) else {
                continue;
            };
            if !self.place(&chosen, &pool.placement)? {
                continue;
            }

            match dispose(&chosen, &pool.disposed_dir) {
                Ok(destination) => self.report.disposed.push(destination),
                Err(e) => self.report.warn(StampWarning::DisposalMoveFailure {
                    path: chosen,
                    disposed_dir: pool.disposed_dir.clone(),
                    reason: e.to_string(),
                }),
            }
        }
        Ok(())
    }

    fn choose<R: Rng + ?Sized>(&mut self, pool: &Path, rng: &mut R) -> Option<PathBuf> {
        match choose_from_pool(pool, rng) {
            Ok(Some(chosen)) => {
                log::debug!("Chose {} from pool {}", chosen.display(), pool.display());
                Some(chosen)
            }
            Ok(None) => {
                self.report.warn(StampWarning::EmptyPool {
                    pool: pool.to_path_buf(),
                });
                None
            }
            Err(e) => {
                self.report.warn(StampWarning::PoolUnreadable {
                    pool: pool.to_path_buf(),
                    reason: e.to_string(),
                });
                None
            }
        }
    }

    /// Draw `source` on every targeted page. Returns whether anything was drawn.
    fn place(&mut self, source: &Path, placement: &Placement) -> Result<bool> {
        let pixels = match self.probe.read_geometry(source) {
            Ok(pixels) if pixels.width > 0 && pixels.height > 0 => pixels,
            Ok(_) => {
                self.report.warn(StampWarning::UnreadableImage {
                    path: source.to_path_buf(),
                    reason: "image has no pixels".to_string(),
                });
                return Ok(false);
            }
            Err(e) => {
                self.report.warn(StampWarning::UnreadableImage {
                    path: source.to_path_buf(),
                    reason: e.to_string(),
                });
                return Ok(false);
            }
        };

        // Geometry is computed once and shared by every targeted page
        let rect = placement_rect(pixels, placement.scale, placement.x, placement.y);
        log::info!(
            "Image {} at ({}, {}) scale {} on {}",
            source.display(),
            placement.x,
            placement.y,
            placement.scale,
            placement.page
        );

        let pages = match placement.page {
            PageTarget::All => 0..self.backend.page_count(),
            PageTarget::Index(index) => index..index + 1,
        };

        let mut placed = false;
        for page_index in pages {
            match self.backend.insert_image(page_index, rect, source) {
                Ok(()) => {}
                // Pixel data that fails to decode is the image's fault, not the document's
                Err(StampError::Image(e)) if !placed => {
                    self.report.warn(StampWarning::UnreadableImage {
                        path: source.to_path_buf(),
                        reason: e.to_string(),
                    });
                    return Ok(false);
                }
                Err(e) => return Err(e),
            }
            log::debug!("Placed {} on page {} at {}", source.display(), page_index, rect);
            self.report.images_placed += 1;
            placed = true;
        }

        Ok(placed)
    }
}
