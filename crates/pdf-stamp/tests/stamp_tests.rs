mod common;

use common::*;
use pdf_stamp::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::Path;

fn job(config: PlacementConfig) -> StampJob {
    StampJob {
        config,
        ..Default::default()
    }
}

fn fixed(path: &Path, page: PageTarget) -> ImageSpec {
    ImageSpec {
        path: path.to_path_buf(),
        placement: placement(10.0, 20.0, 1.0, page),
    }
}

#[test]
fn test_all_pages_get_identical_rect() {
    let dir = tempfile::tempdir().unwrap();
    let logo = fill_pool(dir.path(), 1).remove(0);
    let config = PlacementConfig {
        images: vec![fixed(&logo, PageTarget::All)],
        ..Default::default()
    };

    let mut backend = RecordingBackend::new(3);
    let probe = FixedProbe::new(200, 100, 100.0);
    let mut rng = StdRng::seed_from_u64(0);
    let report = run_job(&mut backend, &job(config), &probe, &mut rng).unwrap();

    let expected = Rect::new(10.0, 20.0, 154.0, 92.0);
    assert_eq!(
        backend.inserts(),
        vec![
            (0, expected, logo.clone()),
            (1, expected, logo.clone()),
            (2, expected, logo.clone()),
        ]
    );
    assert_eq!(report.images_placed, 3);
    assert!(report.warnings.is_empty());
    assert!(report.directories_ok);

    // Geometry is read once for all three pages
    assert_eq!(probe.seen.borrow().len(), 1);
}

#[test]
fn test_single_page_target() {
    let dir = tempfile::tempdir().unwrap();
    let logo = fill_pool(dir.path(), 1).remove(0);
    let config = PlacementConfig {
        images: vec![fixed(&logo, PageTarget::Index(1))],
        ..Default::default()
    };

    let mut backend = RecordingBackend::new(3);
    let mut rng = StdRng::seed_from_u64(0);
    run_job(&mut backend, &job(config), &FixedProbe::new(72, 72, 0.0), &mut rng).unwrap();

    let inserts = backend.inserts();
    assert_eq!(inserts.len(), 1);
    assert_eq!(inserts[0].0, 1);
    assert_eq!(inserts[0].1, Rect::new(10.0, 20.0, 82.0, 92.0));
}

#[test]
fn test_missing_fixed_image_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let logo = fill_pool(dir.path(), 1).remove(0);
    let missing = dir.path().join("missing.png");
    let config = PlacementConfig {
        images: vec![fixed(&missing, PageTarget::All), fixed(&logo, PageTarget::Index(0))],
        ..Default::default()
    };

    let mut backend = RecordingBackend::new(2);
    let mut rng = StdRng::seed_from_u64(0);
    let report = run_job(&mut backend, &job(config), &FixedProbe::new(10, 10, 72.0), &mut rng)
        .unwrap();

    assert_eq!(backend.inserts().len(), 1);
    assert_eq!(
        report.warnings,
        vec![StampWarning::MissingSourceFile { path: missing }]
    );
}

#[test]
fn test_processing_order() {
    let dir = tempfile::tempdir().unwrap();
    let fixed_a = fill_pool(&dir.path().join("fixed_a"), 1).remove(0);
    let fixed_b = fill_pool(&dir.path().join("fixed_b"), 1).remove(0);
    let random = fill_pool(&dir.path().join("random"), 1).remove(0);
    let disposable = fill_pool(&dir.path().join("disposable"), 1).remove(0);

    let config = PlacementConfig {
        images: vec![
            fixed(&fixed_a, PageTarget::Index(0)),
            fixed(&fixed_b, PageTarget::Index(0)),
        ],
        random_images: vec![RandomPoolSpec {
            pool: dir.path().join("random"),
            placement: Placement::default(),
        }],
        disposable_random_images: vec![DisposablePoolSpec {
            pool: dir.path().join("disposable"),
            disposed_dir: dir.path().join("disposed"),
            placement: Placement::default(),
        }],
    };

    let mut backend = RecordingBackend::new(1);
    let mut rng = StdRng::seed_from_u64(0);
    run_job(&mut backend, &job(config), &FixedProbe::new(10, 10, 72.0), &mut rng).unwrap();

    let sources: Vec<_> = backend.inserts().into_iter().map(|(_, _, s)| s).collect();
    assert_eq!(sources, vec![fixed_a, fixed_b, random, disposable]);
}

#[test]
fn test_random_pool_leaves_files_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let pool = dir.path().join("art");
    let files = fill_pool(&pool, 3);
    let config = PlacementConfig {
        random_images: vec![RandomPoolSpec {
            pool: pool.clone(),
            placement: placement(0.0, 0.0, 1.0, PageTarget::All),
        }],
        ..Default::default()
    };

    let mut backend = RecordingBackend::new(2);
    let mut rng = StdRng::seed_from_u64(5);
    let report = run_job(&mut backend, &job(config), &FixedProbe::new(10, 10, 72.0), &mut rng)
        .unwrap();

    let inserts = backend.inserts();
    assert_eq!(inserts.len(), 2);
    assert!(files.contains(&inserts[0].2));
    assert_eq!(inserts[0].2, inserts[1].2);
    assert_eq!(list_pool(&pool).unwrap().len(), 3);
    assert!(report.disposed.is_empty());
}

#[test]
fn test_disposable_pool_drains() {
    let dir = tempfile::tempdir().unwrap();
    let pool = dir.path().join("stickers");
    let disposed = dir.path().join("used");
    fill_pool(&pool, 2);
    let config = PlacementConfig {
        disposable_random_images: vec![DisposablePoolSpec {
            pool: pool.clone(),
            disposed_dir: disposed.clone(),
            placement: Placement::default(),
        }],
        ..Default::default()
    };
    let job = job(config);
    let probe = FixedProbe::new(10, 10, 72.0);
    let mut rng = StdRng::seed_from_u64(42);

    for remaining in [1, 0] {
        let mut backend = RecordingBackend::new(1);
        let report = run_job(&mut backend, &job, &probe, &mut rng).unwrap();

        let placed = &backend.inserts()[0].2;
        assert!(!placed.exists());
        assert_eq!(report.disposed.len(), 1);
        assert_eq!(report.disposed[0], disposed.join(placed.file_name().unwrap()));
        assert_eq!(list_pool(&pool).unwrap().len(), remaining);
    }
    assert_eq!(list_pool(&disposed).unwrap().len(), 2);

    // Pool exhausted: nothing placed, nothing fails
    let mut backend = RecordingBackend::new(1);
    let report = run_job(&mut backend, &job, &probe, &mut rng).unwrap();
    assert!(backend.calls.is_empty());
    assert_eq!(
        report.warnings,
        vec![StampWarning::EmptyPool { pool: pool.clone() }]
    );
}

#[test]
fn test_skip_categories() {
    let dir = tempfile::tempdir().unwrap();
    let logo = fill_pool(&dir.path().join("logos"), 1).remove(0);
    let pool = dir.path().join("stickers");
    fill_pool(&pool, 1);
    let mut job = job(PlacementConfig {
        images: vec![fixed(&logo, PageTarget::All)],
        disposable_random_images: vec![DisposablePoolSpec {
            pool: pool.clone(),
            disposed_dir: dir.path().join("used"),
            placement: Placement::default(),
        }],
        ..Default::default()
    });
    job.skip.images = true;
    job.skip.disposable_random_images = true;
    assert!(job.has_work());

    let mut backend = RecordingBackend::new(2);
    let mut rng = StdRng::seed_from_u64(0);
    run_job(&mut backend, &job, &FixedProbe::new(10, 10, 72.0), &mut rng).unwrap();

    assert!(backend.calls.is_empty());
    assert_eq!(list_pool(&pool).unwrap().len(), 1);

    job.skip.random_images = true;
    assert!(!job.has_work());
}

#[test]
fn test_crop_applied_before_placement() {
    let dir = tempfile::tempdir().unwrap();
    let logo = fill_pool(dir.path(), 1).remove(0);
    let job = StampJob {
        config: PlacementConfig {
            images: vec![fixed(&logo, PageTarget::Index(0))],
            ..Default::default()
        },
        crops: vec![CropRequest {
            page_index: 0,
            mode: CropMode::width_percent(-50.0),
        }],
        ..Default::default()
    };

    let mut backend = RecordingBackend::new(1);
    let mut rng = StdRng::seed_from_u64(0);
    let report = run_job(&mut backend, &job, &FixedProbe::new(10, 10, 72.0), &mut rng).unwrap();

    assert_eq!(report.crops_applied, 1);
    assert_eq!(
        backend.calls[0],
        Call::Crop {
            page: 0,
            rect: Rect::new(300.0, 0.0, 600.0, 800.0)
        }
    );
    assert!(matches!(backend.calls[1], Call::Insert { .. }));
}

#[test]
fn test_crop_failure_aborts_before_any_change() {
    let dir = tempfile::tempdir().unwrap();
    let logo = dir.path().join("logos").join("logo.png");
    let job = StampJob {
        config: PlacementConfig {
            images: vec![fixed(&logo, PageTarget::All)],
            ..Default::default()
        },
        crops: vec![CropRequest {
            page_index: 0,
            mode: CropMode::Absolute {
                width: 600.0,
                height: 800.0,
                x: 50.0,
                y: 50.0,
            },
        }],
        ..Default::default()
    };

    let mut backend = RecordingBackend::new(2);
    let mut rng = StdRng::seed_from_u64(0);
    let result = run_job(&mut backend, &job, &FixedProbe::new(10, 10, 72.0), &mut rng);

    assert!(matches!(result, Err(StampError::CropOutOfBounds { .. })));
    assert!(backend.calls.is_empty());
    assert!(!dir.path().join("logos").exists());
}

#[test]
fn test_zero_percent_crop_is_fatal() {
    let job = StampJob {
        crops: vec![CropRequest {
            page_index: 0,
            mode: CropMode::width_percent(0.0),
        }],
        ..Default::default()
    };

    let mut backend = RecordingBackend::new(1);
    let mut rng = StdRng::seed_from_u64(0);
    let result = run_job(&mut backend, &job, &FixedProbe::new(10, 10, 72.0), &mut rng);
    assert!(matches!(result, Err(StampError::InvalidCropPercent)));
}

#[test]
fn test_crop_page_out_of_range() {
    let job = StampJob {
        crops: vec![CropRequest {
            page_index: 4,
            mode: CropMode::absolute(10.0, 10.0),
        }],
        ..Default::default()
    };

    let mut backend = RecordingBackend::new(2);
    let mut rng = StdRng::seed_from_u64(0);
    let result = run_job(&mut backend, &job, &FixedProbe::new(10, 10, 72.0), &mut rng);
    assert!(matches!(
        result,
        Err(StampError::PageOutOfRange {
            index: 4,
            page_count: 2
        })
    ));
}

#[test]
fn test_page_index_out_of_range_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let logo = fill_pool(dir.path(), 1).remove(0);
    let config = PlacementConfig {
        images: vec![fixed(&logo, PageTarget::Index(3))],
        ..Default::default()
    };

    let mut backend = RecordingBackend::new(3);
    let mut rng = StdRng::seed_from_u64(0);
    let result = run_job(&mut backend, &job(config), &FixedProbe::new(10, 10, 72.0), &mut rng);

    assert!(matches!(result, Err(StampError::Config(_))));
    assert!(backend.calls.is_empty());
}

#[test]
fn test_unprovisionable_pool_does_not_block_fixed_images() {
    let dir = tempfile::tempdir().unwrap();
    let logo = fill_pool(&dir.path().join("logos"), 1).remove(0);
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"file").unwrap();

    let config = PlacementConfig {
        images: vec![fixed(&logo, PageTarget::Index(0))],
        random_images: vec![RandomPoolSpec {
            pool: blocker.join("pool"),
            placement: Placement::default(),
        }],
        ..Default::default()
    };

    let mut backend = RecordingBackend::new(1);
    let mut rng = StdRng::seed_from_u64(0);
    let report = run_job(&mut backend, &job(config), &FixedProbe::new(10, 10, 72.0), &mut rng)
        .unwrap();

    assert!(!report.directories_ok);
    assert_eq!(report.images_placed, 1);
    assert!(matches!(
        report.warnings[0],
        StampWarning::DirectoryCreationFailure { .. }
    ));
    assert!(matches!(
        report.warnings[1],
        StampWarning::PoolUnreadable { .. }
    ));
}

#[test]
fn test_failed_disposal_keeps_placement() {
    let dir = tempfile::tempdir().unwrap();
    let pool = dir.path().join("stickers");
    let chosen = fill_pool(&pool, 1).remove(0);
    // The disposed "directory" is a file, so provisioning and the move both fail
    let disposed = dir.path().join("used");
    std::fs::write(&disposed, b"file").unwrap();

    let config = PlacementConfig {
        disposable_random_images: vec![DisposablePoolSpec {
            pool: pool.clone(),
            disposed_dir: disposed.clone(),
            placement: Placement::default(),
        }],
        ..Default::default()
    };

    let mut backend = RecordingBackend::new(1);
    let mut rng = StdRng::seed_from_u64(0);
    let report = run_job(&mut backend, &job(config), &FixedProbe::new(10, 10, 72.0), &mut rng)
        .unwrap();

    assert_eq!(report.images_placed, 1);
    assert!(report.disposed.is_empty());
    assert!(chosen.exists());
    assert!(report.warnings.iter().any(|w| matches!(
        w,
        StampWarning::DisposalMoveFailure { path, .. } if *path == chosen
    )));
}

#[cfg(unix)]
#[test]
fn test_disposed_dir_aliasing_pool_never_renames() {
    let dir = tempfile::tempdir().unwrap();
    let pool = dir.path().join("stickers");
    let files = fill_pool(&pool, 1);
    let alias = dir.path().join("used");
    std::os::unix::fs::symlink(&pool, &alias).unwrap();

    let job = job(PlacementConfig {
        disposable_random_images: vec![DisposablePoolSpec {
            pool: pool.clone(),
            disposed_dir: alias.clone(),
            placement: Placement::default(),
        }],
        ..Default::default()
    });
    let probe = FixedProbe::new(10, 10, 72.0);
    let mut rng = StdRng::seed_from_u64(1);

    for _ in 0..3 {
        let mut backend = RecordingBackend::new(1);
        let report = run_job(&mut backend, &job, &probe, &mut rng).unwrap();

        assert!(report.disposed.is_empty());
        assert!(matches!(
            &report.warnings[..],
            [StampWarning::DisposalMoveFailure { .. }]
        ));
        assert_eq!(list_pool(&pool).unwrap(), files);
    }
}
