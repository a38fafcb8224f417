//! Directory provisioning
//!
//! Makes sure every directory named by a configuration exists before any
//! placement runs. Failures are collected rather than propagated so a
//! broken pool does not block otherwise valid fixed images.

use crate::config::PlacementConfig;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Result of provisioning the directories of one configuration
#[derive(Debug, Default)]
pub struct DirectoryProvisioning {
    /// Directories that exist after provisioning, in sorted order
    pub ready: Vec<PathBuf>,
    /// Directories that could not be created, with the reason
    pub failed: Vec<(PathBuf, std::io::Error)>,
}

impl DirectoryProvisioning {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Unique directories a configuration reads from or writes to.
///
/// Fixed images contribute their parent directory; pools contribute the
/// pool directory itself and, for disposable pools, the disposed directory.
pub fn required_directories(config: &PlacementConfig) -> BTreeSet<PathBuf> {
    let mut dirs = BTreeSet::new();

    for image in &config.images {
        if let Some(parent) = non_empty_parent(&image.path) {
            dirs.insert(parent.to_path_buf());
        }
    }
    for pool in &config.random_images {
        dirs.insert(pool.pool.clone());
    }
    for pool in &config.disposable_random_images {
        dirs.insert(pool.pool.clone());
        dirs.insert(pool.disposed_dir.clone());
    }

    dirs
}

/// Create every required directory, continuing past individual failures.
pub fn provision_directories(config: &PlacementConfig) -> DirectoryProvisioning {
    let mut result = DirectoryProvisioning::default();

    for dir in required_directories(config) {
        match std::fs::create_dir_all(&dir) {
            Ok(()) => {
                log::debug!("Directory ready: {}", dir.display());
                result.ready.push(dir);
            }
            Err(e) => {
                log::warn!("Directory {} can not be created: {}", dir.display(), e);
                result.failed.push((dir, e));
            }
        }
    }

    result
}

fn non_empty_parent(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}
