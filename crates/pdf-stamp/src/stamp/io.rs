//! Reading and writing the stamped document

use crate::types::*;
use lopdf::Document;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Read and parse a PDF off the async runtime's worker threads
pub async fn load_pdf(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await?;
    let document = tokio::task::spawn_blocking(move || Document::load_mem(&bytes)).await??;
    log::debug!(
        "Loaded {} ({} pages)",
        path.display(),
        document.get_pages().len()
    );
    Ok(document)
}

/// Serialize `doc` and write it to `path`.
///
/// The bytes go to a sibling file first and are then renamed over `path`,
/// so the input can be stamped in place without being truncated on failure.
pub async fn save_pdf(mut doc: Document, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let bytes = tokio::task::spawn_blocking(move || {
        let mut writer = Vec::new();
        doc.save_to(&mut writer)?;
        Ok::<_, StampError>(writer)
    })
    .await??;

    let partial = partial_path(path);
    if let Err(e) = tokio::fs::write(&partial, &bytes).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(e.into());
    }
    tokio::fs::rename(&partial, path).await?;

    log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("output.pdf"));
    name.push(".partial");
    path.with_file_name(name)
}
