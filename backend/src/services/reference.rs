//! Estate reference data loading
//!
//! Each `*.json` file in the reference directory is one source: a JSON array
//! of estate entries. Files are read in name order, so when two sources give
//! the same block different planting years the earlier file wins.

use std::path::{Path, PathBuf};

use serde_json::Value;
use shared::{EstateAsset, LocationHierarchy};

use crate::error::{AppError, AppResult};

async fn source_files(dir: &Path) -> AppResult<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
        AppError::Internal(format!("Cannot read reference dir {}: {}", dir.display(), e))
    })?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::Internal(format!("Cannot list {}: {}", dir.display(), e)))?
    {
        let path = entry.path();
        if path.extension().map_or(false, |ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Parse one source; anything but a top-level array is an error
pub fn parse_source(name: &str, text: &str) -> AppResult<Vec<Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(entries)) => Ok(entries),
        Ok(_) => Err(AppError::Internal(format!(
            "Reference source {} is not a JSON array",
            name
        ))),
        Err(e) => Err(AppError::Internal(format!(
            "Reference source {} is not valid JSON: {}",
            name, e
        ))),
    }
}

/// Build the location hierarchy from every source in `dir`.
///
/// Malformed entries are skipped and logged; they never fail startup.
pub async fn load_hierarchy(dir: impl AsRef<Path>) -> AppResult<LocationHierarchy> {
    let dir = dir.as_ref();
    let files = source_files(dir).await?;

    let mut sources = Vec::with_capacity(files.len());
    for path in &files {
        let name = path.display().to_string();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::Internal(format!("Cannot read {}: {}", name, e)))?;
        sources.push(parse_source(&name, &text)?);
    }

    let (hierarchy, skips) = LocationHierarchy::build_with_report(&sources);
    for skip in &skips {
        let source = files
            .get(skip.source)
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        tracing::warn!(
            "Skipped reference entry {} in {}: {}",
            skip.entry,
            source,
            skip.reason
        );
    }

    tracing::info!(
        "Loaded {} estates from {} reference files ({} skipped entries)",
        hierarchy.len(),
        files.len(),
        skips.len()
    );
    Ok(hierarchy)
}

/// Read the dashboard asset rows; a missing file means no dashboard data
pub async fn load_assets(path: Option<&str>) -> AppResult<Vec<EstateAsset>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };

    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::Internal(format!("Cannot read {}: {}", path, e)))?;
    let assets: Vec<EstateAsset> = serde_json::from_str(&text)
        .map_err(|e| AppError::Internal(format!("Invalid asset file {}: {}", path, e)))?;

    tracing::info!("Loaded {} estate asset rows", assets.len());
    Ok(assets)
}
