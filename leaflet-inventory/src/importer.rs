//! Repository importer - brings a remote or local project into a temp directory

use chrono::Utc;
use leaflet_core::{import_error, with_timeout, ErrorContext, LeafletError, LeafletResult};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::process::Command;
use tracing::{debug, info, warn};
use url::Url;
use walkdir::WalkDir;

pub const DEFAULT_TEMP_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);
const CLONE_TIMEOUT_MS: u64 = 10 * 60 * 1000;
const LS_REMOTE_TIMEOUT_MS: u64 = 30 * 1000;

/// Last path segment of a repository URL without `.git`, or `unknown-repo`
pub fn extract_repo_name(repo_url: &str) -> String {
    let trimmed = repo_url.trim().trim_end_matches('/');
    let path = match Url::parse(trimmed) {
        Ok(url) if url.has_host() => url.path().to_string(),
        // scp-like `git@host:owner/repo.git` or a plain path
        _ => trimmed
            .rsplit_once(':')
            .map(|(_, rest)| rest.to_string())
            .unwrap_or_else(|| trimmed.to_string()),
    };

    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .map(|segment| segment.trim_end_matches(".git"))
        .filter(|segment| !segment.is_empty())
        .unwrap_or("unknown-repo")
        .to_string()
}

fn check_argument(value: &str, field: &str) -> LeafletResult<()> {
    if value.trim().is_empty() || value.starts_with('-') {
        return Err(LeafletError::Validation {
            message: format!("Invalid {field}: '{value}'"),
            field: Some(field.to_string()),
            context: ErrorContext::new("repo_importer")
                .with_suggestion("Pass a repository URL and branch name, not a git option"),
        });
    }
    Ok(())
}

/// Imports projects into uniquely named directories under a temp root
#[derive(Debug, Clone)]
pub struct RepoImporter {
    temp_dir: PathBuf,
}

impl RepoImporter {
    pub fn new(temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: temp_dir.into(),
        }
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    async fn target_dir(&self, name: &str) -> LeafletResult<PathBuf> {
        tokio::fs::create_dir_all(&self.temp_dir).await.map_err(|e| {
            import_error!(
                format!("Failed to create temp directory {}", self.temp_dir.display()),
                "repo_importer",
                e
            )
        })?;

        let mut stamp = Utc::now().timestamp_millis();
        loop {
            let candidate = self.temp_dir.join(format!("{name}-{stamp}"));
            if !tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
                return Ok(candidate);
            }
            stamp += 1;
        }
    }

    /// Shallow-clone `repo_url` at `branch` and strip its `.git` directory.
    pub async fn import_repository(&self, repo_url: &str, branch: &str) -> LeafletResult<PathBuf> {
        check_argument(repo_url, "repo_url")?;
        check_argument(branch, "branch")?;

        let target = self.target_dir(&extract_repo_name(repo_url)).await?;
        info!(
            repo_url = repo_url,
            branch = branch,
            target = %target.display(),
            "📥 Cloning repository"
        );

        let clone = Command::new("git")
            .arg("clone")
            .arg("--depth")
            .arg("1")
            .arg("--branch")
            .arg(branch)
            .arg(repo_url)
            .arg(&target)
            .kill_on_drop(true)
            .output();
        let output = with_timeout(clone, CLONE_TIMEOUT_MS, "git_clone")
            .await?
            .map_err(|e| LeafletError::Import {
                message: format!("Failed to execute git clone: {e}"),
                source: Some(Box::new(e)),
                context: ErrorContext::new("repo_importer")
                    .with_operation("import_repository")
                    .with_suggestion("Ensure git is installed and accessible"),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LeafletError::Import {
                message: format!("Git clone failed: {}", stderr.trim()),
                source: None,
                context: ErrorContext::new("repo_importer")
                    .with_operation("import_repository")
                    .with_metadata("repo_url", repo_url)
                    .with_suggestion("Check repository URL, branch and access permissions"),
            });
        }

        let git_dir = target.join(".git");
        if tokio::fs::try_exists(&git_dir).await.unwrap_or(false) {
            if let Err(e) = tokio::fs::remove_dir_all(&git_dir).await {
                warn!(path = %git_dir.display(), error = %e, "Could not remove cloned .git directory");
            }
        }

        info!(target = %target.display(), "✅ Repository imported");
        Ok(target)
    }

    /// Copy a local directory into the temp root.
    ///
    /// Symbolic links inside the source are not copied.
    pub async fn import_local_directory(&self, source: &Path) -> LeafletResult<PathBuf> {
        let is_dir = tokio::fs::metadata(source)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(LeafletError::Import {
                message: format!("Directory does not exist: {}", source.display()),
                source: None,
                context: ErrorContext::new("repo_importer").with_operation("import_local_directory"),
            });
        }

        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string());
        let target = self.target_dir(&name).await?;

        info!(
            source = %source.display(),
            target = %target.display(),
            "📁 Copying local directory"
        );

        let from = source.to_path_buf();
        let to = target.clone();
        tokio::task::spawn_blocking(move || copy_tree(&from, &to))
            .await
            .map_err(|e| LeafletError::internal(format!("copy task panicked: {e}"), "repo_importer"))??;

        info!(target = %target.display(), "✅ Local directory imported");
        Ok(target)
    }

    /// Whether `git ls-remote` can reach the repository
    pub async fn validate_repository(&self, repo_url: &str) -> bool {
        if check_argument(repo_url, "repo_url").is_err() {
            return false;
        }

        let ls_remote = Command::new("git")
            .arg("ls-remote")
            .arg("--heads")
            .arg(repo_url)
            .kill_on_drop(true)
            .output();

        match with_timeout(ls_remote, LS_REMOTE_TIMEOUT_MS, "git_ls_remote").await {
            Ok(Ok(output)) => output.status.success(),
            Ok(Err(e)) => {
                debug!(repo_url = repo_url, error = %e, "git ls-remote failed to start");
                false
            }
            Err(e) => {
                debug!(repo_url = repo_url, error = %e, "git ls-remote timed out");
                false
            }
        }
    }

    /// Remove temp entries last modified more than `max_age` ago.
    ///
    /// Returns the number of removed entries. Failures are logged only.
    pub async fn cleanup_temp_files(&self, max_age: Duration) -> usize {
        let mut entries = match tokio::fs::read_dir(&self.temp_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(temp_dir = %self.temp_dir.display(), error = %e, "Failed to read temp directory");
                return 0;
            }
        };

        let now = SystemTime::now();
        let mut removed = 0;

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "Failed to list temp directory entry");
                    break;
                }
            };

            let path = entry.path();
            let expired = match entry.metadata().await.and_then(|m| m.modified()) {
                Ok(modified) => now
                    .duration_since(modified)
                    .map(|age| age > max_age)
                    .unwrap_or(false),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to stat temp entry");
                    continue;
                }
            };
            if !expired {
                continue;
            }

            let result = if path.is_dir() {
                tokio::fs::remove_dir_all(&path).await
            } else {
                tokio::fs::remove_file(&path).await
            };
            match result {
                Ok(()) => {
                    info!(path = %path.display(), "🗑️ Cleaned up old temp entry");
                    removed += 1;
                }
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove temp entry"),
            }
        }

        removed
    }
}

fn copy_tree(source: &Path, target: &Path) -> LeafletResult<()> {
    for entry in WalkDir::new(source).follow_links(false) {
        let entry = entry.map_err(|e| {
            import_error!(format!("Failed to read {}", source.display()), "repo_importer", e)
        })?;
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let destination = target.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            std::fs::create_dir_all(&destination)?;
        } else if file_type.is_file() {
            std::fs::copy(entry.path(), &destination).map_err(|e| {
                import_error!(
                    format!("Failed to copy {}", entry.path().display()),
                    "repo_importer",
                    e
                )
            })?;
        } else {
            debug!(path = %entry.path().display(), "Not copying non-regular file");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn repo_names_from_common_url_shapes() {
        assert_eq!(extract_repo_name("https://github.com/acme/widget.git"), "widget");
        assert_eq!(extract_repo_name("https://github.com/acme/widget/"), "widget");
        assert_eq!(extract_repo_name("git@github.com:acme/tools.git"), "tools");
        assert_eq!(extract_repo_name("/srv/git/local-repo"), "local-repo");
        assert_eq!(extract_repo_name("https://example.com/"), "unknown-repo");
        assert_eq!(extract_repo_name(""), "unknown-repo");
    }

    #[tokio::test]
    async fn option_like_arguments_are_rejected() {
        let temp = TempDir::new().unwrap();
        let importer = RepoImporter::new(temp.path());

        let result = importer
            .import_repository("--upload-pack=touch /tmp/x", "main")
            .await;
        assert!(matches!(result, Err(LeafletError::Validation { .. })));

        let result = importer
            .import_repository("https://github.com/acme/widget", "-b")
            .await;
        assert!(matches!(result, Err(LeafletError::Validation { .. })));
        assert!(!importer.validate_repository("--help").await);
    }

    #[tokio::test]
    async fn local_directory_is_copied_under_temp() {
        let source = TempDir::new().unwrap();
        fs::create_dir_all(source.path().join("src")).unwrap();
        fs::write(source.path().join("src/main.rs"), "fn main() {}").unwrap();
        fs::write(source.path().join("README.md"), "# demo").unwrap();
        let temp = TempDir::new().unwrap();

        let importer = RepoImporter::new(temp.path().join("imports"));
        let target = importer.import_local_directory(source.path()).await.unwrap();

        assert!(target.starts_with(temp.path().join("imports")));
        let name = source.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(target
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(&format!("{name}-")));
        assert_eq!(
            fs::read_to_string(target.join("src/main.rs")).unwrap(),
            "fn main() {}"
        );
        assert!(target.join("README.md").exists());
    }

    #[tokio::test]
    async fn missing_local_directory_is_an_import_error() {
        let temp = TempDir::new().unwrap();
        let importer = RepoImporter::new(temp.path());

        let result = importer
            .import_local_directory(&temp.path().join("missing"))
            .await;
        assert!(matches!(result, Err(LeafletError::Import { .. })));
    }

    #[tokio::test]
    async fn cleanup_keeps_fresh_entries() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("fresh-1")).unwrap();
        fs::write(temp.path().join("fresh-1/file.txt"), "x").unwrap();
        let importer = RepoImporter::new(temp.path());

        assert_eq!(importer.cleanup_temp_files(DEFAULT_TEMP_MAX_AGE).await, 0);
        assert!(temp.path().join("fresh-1").exists());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(importer.cleanup_temp_files(Duration::from_millis(1)).await, 1);
        assert!(!temp.path().join("fresh-1").exists());
    }

    #[tokio::test]
    async fn cleanup_of_missing_dir_is_silent() {
        let temp = TempDir::new().unwrap();
        let importer = RepoImporter::new(temp.path().join("never-created"));
        assert_eq!(importer.cleanup_temp_files(DEFAULT_TEMP_MAX_AGE).await, 0);
    }
}
