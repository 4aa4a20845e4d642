//! Project metadata from the filesystem and the package manifest

use crate::model::{ProjectMetadata, DEFAULT_PROJECT_VERSION};
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Fields picked out of a manifest file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestInfo {
    pub version: Option<String>,
    pub license: Option<String>,
    pub repository: Option<String>,
    pub author: Option<String>,
}

/// Read `package.json` style fields.
///
/// `repository` may be a string or `{ "url": ... }`, `author` a string or
/// `{ "name": ..., "email": ... }`, `license` a string or `{ "type": ... }`.
pub fn parse_package_json(content: &str) -> Result<ManifestInfo, serde_json::Error> {
    let value: JsonValue = serde_json::from_str(content)?;

    let text = |v: &JsonValue| v.as_str().map(str::to_string);
    let field = |name: &str, nested: &str| {
        value.get(name).and_then(|v| {
            text(v).or_else(|| v.get(nested).and_then(|inner| text(inner)))
        })
    };

    let author = value.get("author").and_then(|author| {
        text(author).or_else(|| {
            let name = author.get("name").and_then(JsonValue::as_str)?;
            Some(match author.get("email").and_then(JsonValue::as_str) {
                Some(email) => format!("{name} <{email}>"),
                None => name.to_string(),
            })
        })
    });

    Ok(ManifestInfo {
        version: value.get("version").and_then(text),
        license: field("license", "type"),
        repository: field("repository", "url"),
        author,
    })
}

/// Read the `[package]` table of a `Cargo.toml`.
///
/// Workspace-inherited fields (`version.workspace = true`) are treated as absent.
pub fn parse_cargo_toml(content: &str) -> Result<ManifestInfo, toml::de::Error> {
    let value: toml::Table = toml::from_str(content)?;
    let Some(package) = value.get("package") else {
        return Ok(ManifestInfo::default());
    };

    let text = |name: &str| package.get(name).and_then(|v| v.as_str()).map(str::to_string);
    let author = package
        .get("authors")
        .and_then(|v| v.as_array())
        .and_then(|authors| authors.first())
        .and_then(|v| v.as_str())
        .map(str::to_string);

    Ok(ManifestInfo {
        version: text("version"),
        license: text("license"),
        repository: text("repository"),
        author,
    })
}

/// Gathers [`ProjectMetadata`] for a project root. Never fails.
#[derive(Debug, Clone)]
pub struct MetadataReader {
    root: PathBuf,
}

impl MetadataReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub async fn read(&self) -> ProjectMetadata {
        let (created_at, last_modified) = self.timestamps().await;
        let manifest = self.manifest().await.unwrap_or_default();
        let has_version_control = tokio::fs::try_exists(self.root.join(".git"))
            .await
            .unwrap_or(false);

        ProjectMetadata {
            created_at,
            last_modified,
            version: manifest
                .version
                .unwrap_or_else(|| DEFAULT_PROJECT_VERSION.to_string()),
            license: manifest.license,
            repository: manifest.repository,
            author: manifest.author,
            has_version_control,
        }
    }

    async fn timestamps(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        match tokio::fs::metadata(&self.root).await {
            Ok(meta) => {
                let modified = meta.modified().map(DateTime::<Utc>::from).ok();
                // Birth time is not available on every filesystem
                let created = meta.created().map(DateTime::<Utc>::from).ok().or(modified);
                let now = Utc::now();
                (created.unwrap_or(now), modified.unwrap_or(now))
            }
            Err(e) => {
                warn!(root = %self.root.display(), error = %e, "Could not stat project root");
                let now = Utc::now();
                (now, now)
            }
        }
    }

    async fn manifest(&self) -> Option<ManifestInfo> {
        if let Some(content) = read_optional(&self.root.join("package.json")).await {
            match parse_package_json(&content) {
                Ok(info) => return Some(info),
                Err(e) => warn!(error = %e, "Ignoring malformed package.json"),
            }
        }

        if let Some(content) = read_optional(&self.root.join("Cargo.toml")).await {
            match parse_cargo_toml(&content) {
                Ok(info) => return Some(info),
                Err(e) => warn!(error = %e, "Ignoring malformed Cargo.toml"),
            }
        }

        debug!(root = %self.root.display(), "No usable manifest found");
        None
    }
}

async fn read_optional(path: &Path) -> Option<String> {
    tokio::fs::read_to_string(path).await.ok()
}
