//! # Micropress Vault
//!
//! Filesystem implementations of the host collaborators:
//!
//! - [`VaultManager`] - [`FileStore`](micropress_core::FileStore) over a vault
//!   directory, with path confinement and atomic text writes
//! - [`NoteEditor`] - [`ActiveEditor`](micropress_core::ActiveEditor) over one note
//! - [`NoteFrontmatter`] - [`FrontmatterStore`](micropress_core::FrontmatterStore)
//!   over one note's YAML block
//!
//! ```no_run
//! use micropress_vault::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<()> {
//! let vault = Arc::new(VaultManager::new("/path/to/vault")?);
//! let editor = NoteEditor::new(vault.clone(), "posts/today.md");
//! let text = editor.get_text().await?;
//! # let _ = text;
//! # Ok(())
//! # }
//! ```

pub mod manager;
pub mod note;

pub use manager::VaultManager;
pub use note::{NoteEditor, NoteFrontmatter};

pub mod prelude {
    pub use crate::manager::*;
    pub use crate::note::*;
    pub use micropress_core::prelude::*;
}
