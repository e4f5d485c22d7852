//! # Micropress Core
//!
//! Core data models, error types, settings, and host-collaborator traits for
//! publishing notes to Micro.blog. Every other crate in the workspace depends
//! on the types defined here.
//!
//! ## Core Modules
//!
//! - [`models`] - Embedded references, upload results, tags, visibility
//! - [`error`] - Error taxonomy and Result alias
//! - [`config`] - Persisted [`Settings`] with a builder
//! - [`collaborators`] - File store, editor, frontmatter, HTTP and notice traits
//!
//! ## Usage
//!
//! ```
//! use micropress_core::prelude::*;
//!
//! let settings = Settings::builder()
//!     .app_token("app-token")
//!     .default_tags("rust, notes")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(settings.default_tag_list().to_string(), "rust,notes");
//! ```

pub mod collaborators;
pub mod config;
pub mod error;
pub mod models;

pub use collaborators::{
    ActiveEditor, FileStore, FrontmatterStore, HttpRequest, HttpResponse, LogNotifier, Method,
    Notifier, RequestExecutor,
};
pub use config::{DEFAULT_BLOG_ID, Settings, SettingsBuilder};
pub use error::{Error, ErrorKind, Result};
pub use models::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::collaborators::{
        ActiveEditor, FileStore, FrontmatterStore, HttpRequest, HttpResponse, LogNotifier, Method,
        Notifier, RequestExecutor,
    };
    pub use crate::config::{DEFAULT_BLOG_ID, Settings};
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::models::{
        EmbeddedReference, FileEntry, PublishOutcome, TagList, UploadResult, Visibility,
    };
}
