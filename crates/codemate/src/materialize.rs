use std::path::{Path, PathBuf};

use codemate_core::files::GeneratedFileSet;

use crate::prelude::Error;

/// Files written for one project, in set order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LocalWriteResult {
    pub written: Vec<PathBuf>,
    /// One message per file that could not be written.
    pub warnings: Vec<String>,
}

/// Write every file under `base_dir`, overwriting previous generations.
///
/// All directories are created first; any failure there aborts the whole
/// step. A failed file write is recorded as a warning and the remaining files
/// are still written.
pub async fn materialize(base_dir: &Path, files: &GeneratedFileSet) -> Result<LocalWriteResult, Error> {
    tokio::fs::create_dir_all(base_dir).await.map_err(|e| {
        Error::LocalWrite(format!("Failed to create {}: {e}", base_dir.display()))
    })?;

    let base_dir = tokio::fs::canonicalize(base_dir).await.map_err(|e| {
        Error::LocalWrite(format!("Failed to resolve {}: {e}", base_dir.display()))
    })?;

    for file in files {
        if let Some(parent) = base_dir.join(&file.path).parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::LocalWrite(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }
    }

    let mut result = LocalWriteResult::default();
    for file in files {
        let target = base_dir.join(&file.path);
        match tokio::fs::write(&target, &file.content).await {
            Ok(()) => {
                log::debug!("Wrote local file: {}", target.display());
                result.written.push(target);
            }
            Err(e) => {
                let warning = format!("Could not write {}: {e}", target.display());
                log::warn!("{warning}");
                result.warnings.push(warning);
            }
        }
    }

    Ok(result)
}
