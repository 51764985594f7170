// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};
use crate::extractors::schedule::Record;
use crate::utils::error::{AppError, StorageError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub last_updated: String,
}

/// The published document. Rebuilt from scratch on every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDocument {
    pub metadata: Metadata,
    pub daily: Vec<Record>,
    pub weekly: Vec<Record>,
}

impl OutputDocument {
    /// Combines the per-source outcomes. A failed source is logged and published as an empty list.
    pub fn assemble(
        daily: Result<Vec<Record>, AppError>,
        weekly: Result<Vec<Record>, AppError>,
        last_updated: String,
    ) -> Self {
        Self {
            metadata: Metadata { last_updated },
            daily: records_or_empty("Daily", daily),
            weekly: records_or_empty("Weekly", weekly),
        }
    }
}

fn records_or_empty(source: &str, outcome: Result<Vec<Record>, AppError>) -> Vec<Record> {
    outcome.unwrap_or_else(|e| {
        tracing::error!("Error in {}: {}", source, e);
        Vec::new()
    })
}

/// Local wall-clock time as "2026-10-19 08:15:02.123456".
pub fn timestamp_now() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

pub struct StorageManager {
    output_path: PathBuf,
}

impl StorageManager {
    /// Creates a StorageManager writing to `output_path`, which must name a file.
    pub fn new<P: AsRef<Path>>(output_path: P) -> Result<Self, AppError> {
        let output_path = output_path.as_ref().to_path_buf();
        if output_path.file_name().is_none() {
            return Err(AppError::Config(format!("Output path {} does not name a file", output_path.display())));
        }
        Ok(Self { output_path })
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Serializes the document and replaces the output file with it.
    ///
    /// The JSON goes to a sibling `.tmp` file first and is renamed into place,
    /// so an interrupted run leaves the previous file intact.
    pub fn save_document(&self, document: &OutputDocument) -> Result<PathBuf, StorageError> {
        // Create the parent directory if it doesn't exist
        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(StorageError::IoError)?;
            }
        }

        let json = serde_json::to_string_pretty(document)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        let mut tmp_name = self.output_path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = self.output_path.with_file_name(tmp_name);

        fs::write(&tmp_path, json)
            .map_err(StorageError::IoError)?;
        if let Err(e) = fs::rename(&tmp_path, &self.output_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(StorageError::IoError(e));
        }

        tracing::info!("Saved to {}", self.output_path.display());

        Ok(self.output_path.clone())
    }
}
