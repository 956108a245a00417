//! Catalog persistence as pretty-printed JSON.

use std::path::Path;

use tracing::{debug, info};

use flowatlas_shared::{Catalog, FlowAtlasError, Result};

/// Write the catalog to `path` as pretty-printed JSON.
///
/// The catalog map is ordered, so keys serialize lexicographically and two
/// runs over the same hosts produce byte-identical files.
pub fn write_catalog(path: &Path, catalog: &Catalog) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| FlowAtlasError::io(parent, e))?;
    }

    let json = serde_json::to_string_pretty(catalog)
        .map_err(|e| FlowAtlasError::validation(format!("JSON serialization failed: {e}")))?;
    std::fs::write(path, json).map_err(|e| FlowAtlasError::io(path, e))?;

    info!(path = %path.display(), workflows = catalog.len(), "catalog written");
    Ok(())
}

/// Read a previously written catalog back from disk.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let raw = std::fs::read_to_string(path).map_err(|e| FlowAtlasError::io(path, e))?;
    let catalog = serde_json::from_str(&raw).map_err(|e| {
        FlowAtlasError::validation(format!("invalid catalog JSON in {}: {e}", path.display()))
    })?;

    debug!(path = %path.display(), "catalog loaded");
    Ok(catalog)
}
