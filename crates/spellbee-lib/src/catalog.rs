//! Word list loading.

use std::path::Path;

use tracing::{info, warn};

use spellbee_core::error::CatalogError;
use spellbee_core::words::WordCatalog;

/// Read and validate the word list at `path`.
///
/// A missing file or a list with no usable words is fatal for the caller:
/// no round can be served without a catalog.
pub async fn load(path: &Path) -> Result<WordCatalog, CatalogError> {
    let text = tokio::fs::read_to_string(path).await?;
    let catalog = WordCatalog::parse(&text)?;

    for line in catalog.skipped() {
        warn!("catalog: skipping malformed entry {line:?} in {}", path.display());
    }
    info!("catalog: loaded {} words from {}", catalog.len(), path.display());

    Ok(catalog)
}
