//! Note-scoped collaborators: the note being edited and its frontmatter

use crate::manager::VaultManager;
use async_trait::async_trait;
use micropress_core::prelude::*;
use micropress_parser::set_frontmatter_value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Editor over a note file in the vault
#[derive(Debug, Clone)]
pub struct NoteEditor {
    vault: Arc<VaultManager>,
    path: PathBuf,
}

impl NoteEditor {
    pub fn new(vault: Arc<VaultManager>, path: impl Into<PathBuf>) -> Self {
        Self {
            vault,
            path: path.into(),
        }
    }

    /// Vault-relative path of the note
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The note as a store entry, for rename
    pub fn entry(&self) -> FileEntry {
        FileEntry::new(self.path.clone())
    }
}

#[async_trait]
impl ActiveEditor for NoteEditor {
    async fn get_text(&self) -> Result<String> {
        self.vault.read_text(&self.path).await
    }

    async fn set_text(&self, text: &str) -> Result<()> {
        self.vault.write_text(&self.path, text).await
    }
}

/// Frontmatter block of one note
#[derive(Debug, Clone)]
pub struct NoteFrontmatter {
    vault: Arc<VaultManager>,
    path: PathBuf,
}

impl NoteFrontmatter {
    pub fn new(vault: Arc<VaultManager>, path: impl Into<PathBuf>) -> Self {
        Self {
            vault,
            path: path.into(),
        }
    }
}

#[async_trait]
impl FrontmatterStore for NoteFrontmatter {
    async fn save(&self, value: serde_json::Value, key: &str) -> Result<()> {
        let content = self.vault.read_text(&self.path).await?;
        let updated = set_frontmatter_value(&content, key, value)?;
        self.vault.write_text(&self.path, &updated).await?;
        log::debug!("Saved frontmatter key '{}' in {}", key, self.path.display());
        Ok(())
    }
}
