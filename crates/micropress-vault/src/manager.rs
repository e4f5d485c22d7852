//! Directory-backed vault with path confinement and atomic writes

use async_trait::async_trait;
use micropress_core::prelude::*;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use tracing::instrument;
use walkdir::WalkDir;

/// Directories never listed as vault content
const DEFAULT_EXCLUDED: [&str; 4] = [".obsidian", ".git", ".trash", ".DS_Store"];

/// File operations confined to one vault directory
#[derive(Debug, Clone)]
pub struct VaultManager {
    vault_path: PathBuf,
    excluded_paths: HashSet<String>,
}

impl VaultManager {
    /// Open a vault rooted at an existing directory
    pub fn new(vault_path: impl Into<PathBuf>) -> Result<Self> {
        let vault_path = vault_path.into();

        if !vault_path.is_dir() {
            return Err(Error::config_error(format!(
                "Vault path is not a directory: {}",
                vault_path.display()
            )));
        }

        Ok(Self {
            vault_path,
            excluded_paths: DEFAULT_EXCLUDED.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Get vault path
    pub fn vault_path(&self) -> &PathBuf {
        &self.vault_path
    }

    /// Read a text file
    #[instrument(skip(self), fields(file = ?path), name = "vault_read_text")]
    pub async fn read_text(&self, path: &Path) -> Result<String> {
        let full_path = self.resolve_existing(path)?;
        tokio::fs::read_to_string(&full_path)
            .await
            .map_err(Error::io)
    }

    /// Write file to disk atomically
    #[instrument(skip(self, content), fields(file = ?path, size = content.len()), name = "vault_write_text")]
    pub async fn write_text(&self, path: &Path, content: &str) -> Result<()> {
        let full_path = self.resolve_path(path)?;

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(Error::io)?;
        }

        // Write to temp file first
        let temp_path = full_path.with_extension("micropress.tmp");
        tokio::fs::write(&temp_path, content)
            .await
            .map_err(Error::io)?;

        if let Err(e) = tokio::fs::rename(&temp_path, &full_path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(Error::io(e));
        }

        Ok(())
    }

    /// Resolve a vault-relative path, rejecting anything that escapes the root
    fn resolve_path(&self, path: &Path) -> Result<PathBuf> {
        if path.is_absolute() {
            if !path.starts_with(&self.vault_path) {
                return Err(Error::path_traversal(path.to_path_buf()));
            }
            return Ok(path.to_path_buf());
        }

        if path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            return Err(Error::path_traversal(path.to_path_buf()));
        }

        Ok(self.vault_path.join(path))
    }

    fn resolve_existing(&self, path: &Path) -> Result<PathBuf> {
        let full_path = self.resolve_path(path)?;
        if !full_path.is_file() {
            return Err(Error::file_not_found(path.to_path_buf()));
        }
        Ok(full_path)
    }

    fn is_excluded(&self, relative: &Path) -> bool {
        relative.components().any(|c| match c {
            Component::Normal(name) => name
                .to_str()
                .is_some_and(|n| self.excluded_paths.contains(n)),
            _ => false,
        })
    }
}

#[async_trait]
impl FileStore for VaultManager {
    #[instrument(skip(self), name = "vault_list")]
    async fn list(&self) -> Result<Vec<FileEntry>> {
        let root = self.vault_path.clone();
        let mut files = Vec::new();

        for entry in WalkDir::new(&root).follow_links(false).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable vault entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&root) else {
                continue;
            };
            if self.is_excluded(relative) {
                continue;
            }
            files.push(FileEntry::new(relative));
        }

        log::debug!("Listed {} files in {}", files.len(), root.display());
        Ok(files)
    }

    #[instrument(skip(self), fields(file = ?file.path), name = "vault_read_binary")]
    async fn read_binary(&self, file: &FileEntry) -> Result<Vec<u8>> {
        let full_path = self.resolve_existing(&file.path)?;
        tokio::fs::read(&full_path).await.map_err(Error::io)
    }

    #[instrument(skip(self), fields(file = ?file.path), name = "vault_delete")]
    async fn delete(&self, file: &FileEntry) -> Result<()> {
        let full_path = self.resolve_existing(&file.path)?;
        tokio::fs::remove_file(&full_path)
            .await
            .map_err(Error::io)?;
        log::info!("Deleted local file: {}", file.path.display());
        Ok(())
    }

    #[instrument(skip(self), fields(from = ?file.path, to = ?new_path), name = "vault_rename")]
    async fn rename(&self, file: &FileEntry, new_path: &Path) -> Result<()> {
        let from = self.resolve_existing(&file.path)?;
        let to = self.resolve_path(new_path)?;

        if from == to {
            return Ok(());
        }
        if to.exists() {
            return Err(Error::rename_failure(
                new_path,
                "a file already exists at the destination",
            ));
        }

        if let Some(parent) = to.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(Error::io)?;
        }

        tokio::fs::rename(&from, &to)
            .await
            .map_err(|e| Error::rename_failure(new_path, e.to_string()))?;

        log::info!("Moved: {} → {}", file.path.display(), new_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, VaultManager) {
        let temp_dir = TempDir::new().unwrap();
        let manager = VaultManager::new(temp_dir.path()).unwrap();
        (temp_dir, manager)
    }

    #[test]
    fn test_new_rejects_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = VaultManager::new(temp_dir.path().join("missing"));
        assert!(matches!(result, Err(Error::ConfigError { .. })));
    }

    #[tokio::test]
    async fn test_write_and_read_text() {
        let (_temp, manager) = setup();
        let path = Path::new("notes/post.md");

        manager.write_text(path, "# Post\nHello").await.unwrap();
        assert_eq!(manager.read_text(path).await.unwrap(), "# Post\nHello");
    }

    #[tokio::test]
    async fn test_atomic_write_leaves_no_temp_files() {
        let (temp, manager) = setup();
        manager.write_text(Path::new("a.md"), "x").await.unwrap();

        for entry in std::fs::read_dir(temp.path()).unwrap() {
            let name = entry.unwrap().file_name();
            assert!(!name.to_string_lossy().ends_with(".tmp"));
        }
    }

    #[tokio::test]
    async fn test_list_skips_excluded_directories() {
        let (temp, manager) = setup();
        std::fs::create_dir_all(temp.path().join(".obsidian")).unwrap();
        std::fs::create_dir_all(temp.path().join("attachments")).unwrap();
        std::fs::write(temp.path().join(".obsidian/app.json"), "{}").unwrap();
        std::fs::write(temp.path().join("attachments/photo.png"), [1, 2, 3]).unwrap();
        std::fs::write(temp.path().join("note.md"), "text").unwrap();

        let files = manager.list().await.unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.clone()).collect();

        assert_eq!(
            paths,
            vec![PathBuf::from("attachments/photo.png"), PathBuf::from("note.md")]
        );
    }

    #[tokio::test]
    async fn test_read_binary_is_verbatim() {
        let (temp, manager) = setup();
        let bytes = vec![0x89, b'P', b'N', b'G', 0x00, 0xff];
        std::fs::write(temp.path().join("img.png"), &bytes).unwrap();

        let read = manager.read_binary(&FileEntry::new("img.png")).await.unwrap();
        assert_eq!(read, bytes);
    }

    #[tokio::test]
    async fn test_delete() {
        let (temp, manager) = setup();
        std::fs::write(temp.path().join("img.png"), [1]).unwrap();

        manager.delete(&FileEntry::new("img.png")).await.unwrap();
        assert!(!temp.path().join("img.png").exists());

        let again = manager.delete(&FileEntry::new("img.png")).await;
        assert!(matches!(again, Err(Error::FileNotFound { .. })));
    }

    #[tokio::test]
    async fn test_rename_and_conflict() {
        let (temp, manager) = setup();
        std::fs::write(temp.path().join("draft.md"), "a").unwrap();
        std::fs::write(temp.path().join("taken.md"), "b").unwrap();

        let conflict = manager
            .rename(&FileEntry::new("draft.md"), Path::new("taken.md"))
            .await;
        assert!(matches!(conflict, Err(Error::RenameFailure { .. })));

        manager
            .rename(&FileEntry::new("draft.md"), Path::new("posts/2025-04-14_hello.md"))
            .await
            .unwrap();
        assert!(temp.path().join("posts/2025-04-14_hello.md").exists());
        assert!(!temp.path().join("draft.md").exists());
    }

    #[tokio::test]
    async fn test_path_traversal_prevention() {
        let (_temp, manager) = setup();
        let result = manager.read_text(Path::new("../../../etc/passwd")).await;
        assert!(matches!(result, Err(Error::PathTraversalAttempt { .. })));

        let result = manager.write_text(Path::new("/etc/passwd"), "x").await;
        assert!(result.is_err());
    }
}
