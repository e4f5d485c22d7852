//! # Micropress
//!
//! Publish Obsidian notes to Micro.blog: upload and caption embedded images,
//! then submit the note as a post.
//!
//! This crate wires the pipeline crates to real I/O:
//!
//! - [`ReqwestExecutor`] - HTTP through `reqwest`
//! - [`Workspace`] - the `upload`, `publish`, and `destinations` commands
//!   over a vault directory

pub mod commands;
pub mod http;

pub use commands::{PublishArgs, Workspace, default_config_path};
pub use http::ReqwestExecutor;

pub use micropress_core::prelude::*;
pub use micropress_media::{UploadOptions, UploadOrchestrator, UploadReport, UploadStatus};
pub use micropress_publish::{
    PublishDraft, PublishEvent, PublishObserver, PublishSubmissionController, SubmissionState,
    SubmitOutcome,
};
pub use micropress_vault::{NoteEditor, NoteFrontmatter, VaultManager};
