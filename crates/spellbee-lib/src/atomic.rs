//! Atomic file publish: write to a temp file beside the target, then rename.
//!
//! Readers see either the previous file or the complete new one, never a
//! truncated write.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// Replace `dest` with `bytes` atomically. Runs on the blocking pool.
pub async fn write_atomic(dest: &Path, bytes: Vec<u8>) -> std::io::Result<()> {
    let dest = dest.to_path_buf();
    tokio::task::spawn_blocking(move || write_atomic_blocking(&dest, &bytes))
        .await
        .map_err(std::io::Error::other)?
}

fn write_atomic_blocking(dest: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = parent_dir(dest);
    std::fs::create_dir_all(&dir)?;

    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|e| e.error)?;
    Ok(())
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
