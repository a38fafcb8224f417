//! Random image pools
//!
//! A pool is a directory of candidate images. One regular file is chosen
//! uniformly at random per use; disposable pools then move the chosen file
//! into a disposed directory so it is never picked again.

use crate::types::Result;
use rand::Rng;
use rand::seq::SliceRandom;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Regular files directly inside `dir`, sorted by path.
///
/// Subdirectories are ignored. Sorting makes the choice reproducible for a
/// seeded generator regardless of directory iteration order.
pub fn list_pool(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Pick one file from the pool, or `None` when the pool is empty.
pub fn choose_from_pool<R: Rng + ?Sized>(
    dir: impl AsRef<Path>,
    rng: &mut R,
) -> Result<Option<PathBuf>> {
    let files = list_pool(dir)?;
    Ok(files.choose(rng).cloned())
}

/// Move a placed image into `disposed_dir`, returning its new path.
///
/// The move is a rename, so the file is either still in the pool or fully
/// in the disposed directory. An existing file of the same name in the
/// disposed directory is kept; the moved file gets a numeric suffix instead.
/// A disposed directory that resolves to the file's own directory is an
/// error, since the file would stay selectable.
pub fn dispose(file: impl AsRef<Path>, disposed_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let file = file.as_ref();
    let file_name = file.file_name().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{} has no file name", file.display()),
        )
    })?;

    let disposed_dir = disposed_dir.as_ref();
    let pool_dir = file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    if same_directory(pool_dir, disposed_dir) {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!(
                "disposed directory {} is the pool itself",
                disposed_dir.display()
            ),
        )
        .into());
    }

    let destination = free_destination(disposed_dir, Path::new(file_name));
    std::fs::rename(file, &destination)?;
    log::info!("Disposed {} → {}", file.display(), destination.display());
    Ok(destination)
}

/// Whether both paths resolve to the same existing directory
fn same_directory(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// First of `name`, `stem-1.ext`, `stem-2.ext`, ... that does not exist in `dir`
fn free_destination(dir: &Path, name: &Path) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let stem = name.file_stem().map(OsString::from).unwrap_or_default();
    let extension = name.extension();

    (1u32..)
        .map(|n| {
            let mut file_name = stem.clone();
            file_name.push(format!("-{}", n));
            if let Some(ext) = extension {
                file_name.push(".");
                file_name.push(ext);
            }
            dir.join(file_name)
        })
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}
