//! Directory-based storage for finished analyses
//!
//! Every analysis lives in `<root>/<id>/`, where the id is the creation time in
//! unix milliseconds. `analysis.json` inside the directory is the record the
//! history and download endpoints read.

use chrono::{DateTime, Utc};
use leaflet_core::{not_found_error, storage_error, validation_error, LeafletError, LeafletResult};
use leaflet_docs::ProjectAnalysis;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};
use utoipa::ToSchema;
use walkdir::WalkDir;

pub const ANALYSIS_FILE: &str = "analysis.json";

/// One row of the analysis history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub project_name: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub download_url: String,
}

/// The parts of a stored analysis the history needs
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct StoredSummary {
    project_name: String,
    description: String,
    technology: Vec<String>,
}

pub fn download_url(id: &str) -> String {
    format!("/api/download/{id}")
}

/// Reject ids that could escape the storage root
pub fn validate_id(id: &str) -> LeafletResult<()> {
    let valid = !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\'])
        && !id.contains("..")
        && !id.starts_with('.');

    if valid {
        Ok(())
    } else {
        Err(validation_error!(
            format!("Invalid analysis id '{id}'"),
            "id",
            "analysis_store"
        ))
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisStore {
    root: PathBuf,
}

impl AnalysisStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of an existing entry
    pub fn entry_dir(&self, id: &str) -> LeafletResult<PathBuf> {
        validate_id(id)?;
        Ok(self.root.join(id))
    }

    /// Create a fresh entry directory and return its id and path
    pub async fn create_entry(&self) -> LeafletResult<(String, PathBuf)> {
        fs::create_dir_all(&self.root).await.map_err(|e| {
            storage_error!(
                format!("Failed to create {}", self.root.display()),
                "analysis_store",
                e
            )
        })?;

        let mut millis = Utc::now().timestamp_millis();
        loop {
            let id = millis.to_string();
            let dir = self.root.join(&id);
            match fs::create_dir(&dir).await {
                Ok(()) => {
                    debug!(id = %id, "Created analysis entry");
                    return Ok((id, dir));
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => millis += 1,
                Err(e) => {
                    return Err(storage_error!(
                        format!("Failed to create {}", dir.display()),
                        "analysis_store",
                        e
                    ))
                }
            }
        }
    }

    /// Write `analysis.json` into an entry directory
    pub async fn write_analysis(&self, dir: &Path, analysis: &ProjectAnalysis) -> LeafletResult<PathBuf> {
        let path = dir.join(ANALYSIS_FILE);
        let content = serde_json::to_string_pretty(analysis)?;
        fs::write(&path, content).await.map_err(|e| {
            storage_error!(format!("Failed to write {}", path.display()), "analysis_store", e)
        })?;
        Ok(path)
    }

    /// Stored analyses, newest first.
    ///
    /// Entries without a readable `analysis.json` are skipped.
    pub async fn list_history(&self) -> LeafletResult<Vec<HistoryEntry>> {
        let mut dirs = match fs::read_dir(&self.root).await {
            Ok(dirs) => dirs,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => {
                return Err(storage_error!(
                    format!("Failed to list {}", self.root.display()),
                    "analysis_store",
                    e
                ))
            }
        };

        let mut history = Vec::new();
        while let Some(entry) = dirs.next_entry().await? {
            let id = entry.file_name().to_string_lossy().into_owned();
            if validate_id(&id).is_err() {
                continue;
            }
            let Ok(metadata) = entry.metadata().await else {
                continue;
            };
            if !metadata.is_dir() {
                continue;
            }

            let analysis_file = entry.path().join(ANALYSIS_FILE);
            let summary = match fs::read_to_string(&analysis_file).await {
                Ok(content) => match serde_json::from_str::<StoredSummary>(&content) {
                    Ok(summary) => summary,
                    Err(e) => {
                        warn!(id = %id, error = %e, "Could not parse stored analysis");
                        continue;
                    }
                },
                Err(_) => continue,
            };

            let created_at = metadata
                .created()
                .or_else(|_| metadata.modified())
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());

            history.push(HistoryEntry {
                download_url: download_url(&id),
                id,
                project_name: summary.project_name,
                description: summary.description,
                technologies: summary.technology,
                created_at,
            });
        }

        history.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(history)
    }

    /// The raw stored `analysis.json` of an entry
    pub async fn load_analysis(&self, id: &str) -> LeafletResult<serde_json::Value> {
        let path = self.entry_dir(id)?.join(ANALYSIS_FILE);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(not_found_error!(format!("analysis {id}"), "analysis_store"))
            }
            Err(e) => {
                return Err(storage_error!(
                    format!("Failed to read {}", path.display()),
                    "analysis_store",
                    e
                ))
            }
        };
        Ok(serde_json::from_str(&content)?)
    }

    pub async fn delete(&self, id: &str) -> LeafletResult<()> {
        let dir = self.entry_dir(id)?;
        match fs::remove_dir_all(&dir).await {
            Ok(()) => {
                info!(id = %id, "🗑️ Analysis deleted");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(not_found_error!(format!("analysis {id}"), "analysis_store"))
            }
            Err(e) => Err(storage_error!(
                format!("Failed to delete {}", dir.display()),
                "analysis_store",
                e
            )),
        }
    }

    /// Copy an entry into `hosted_dir/<id>` and return the hosted directory
    pub async fn host(&self, id: &str, hosted_dir: &Path) -> LeafletResult<PathBuf> {
        let source = self.entry_dir(id)?;
        if !fs::try_exists(&source).await.unwrap_or(false) {
            return Err(not_found_error!(format!("analysis {id}"), "analysis_store"));
        }
        let target = hosted_dir.join(id);

        let from = source.clone();
        let to = target.clone();
        tokio::task::spawn_blocking(move || copy_dir(&from, &to))
            .await
            .map_err(|e| LeafletError::internal(format!("copy task panicked: {e}"), "analysis_store"))??;

        info!(id = %id, target = %target.display(), "🌐 Documentation hosted");
        Ok(target)
    }
}

fn copy_dir(source: &Path, target: &Path) -> LeafletResult<()> {
    for entry in WalkDir::new(source).follow_links(false) {
        let entry = entry.map_err(|e| {
            storage_error!(format!("Failed to read {}", source.display()), "analysis_store", e)
        })?;
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let destination = target.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&destination)?;
        } else if entry.file_type().is_file() {
            std::fs::copy(entry.path(), &destination).map_err(|e| {
                storage_error!(
                    format!("Failed to copy {}", entry.path().display()),
                    "analysis_store",
                    e
                )
            })?;
        }
    }
    Ok(())
}
