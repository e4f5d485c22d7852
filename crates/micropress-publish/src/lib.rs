//! # Micropress Publish
//!
//! Composing and submitting a note as a Micro.blog post.
//!
//! - [`PublishDraft`] - the post being composed, mutated through setters
//! - [`PublishSubmissionController`] - validation, submission, and the
//!   post-publish frontmatter update and rename
//! - [`schedule`] - scheduled-date parsing and ISO formatting
//! - [`naming`] - `YYYY-MM-DD_slug` note names from post URLs
//! - [`suggestions`] - tag suggestions from synchronized categories
//! - [`destinations`] - the token's blogs from the Micropub config query
//! - [`categories`] - per-destination categories that feed the suggestions
//!
//! ```
//! use micropress_publish::prelude::*;
//!
//! let settings = Settings::builder().default_tags("daily").build()?;
//! let mut draft = PublishDraft::from_note("---\ntitle: Hi\n---\nHello", &settings)?;
//! draft.set_scheduled_date("2025-04-14 10:00");
//! assert_eq!(draft.title(), "Hi");
//! assert!(!draft.formatted_scheduled_date().is_empty());
//! # Ok::<(), micropress_core::Error>(())
//! ```

pub mod categories;
pub mod controller;
pub mod destinations;
pub mod draft;
pub mod micropub;
pub mod naming;
pub mod schedule;
pub mod suggestions;

pub use categories::{CATEGORY_SYNC_FAILED, fetch_categories, synchronized_notice};
pub use controller::{
    PublishEvent, PublishObserver, PublishSubmissionController, SubmissionState, SubmitOutcome,
};
pub use destinations::{Destination, fetch_destinations};
pub use draft::{BLANK_POST_MESSAGE, PublishDraft};
pub use naming::{note_name_from_url, renamed_path};
pub use schedule::{format_scheduled_date, parse_scheduled_date};
pub use suggestions::tag_suggestions;

pub mod prelude {
    pub use crate::categories::{CATEGORY_SYNC_FAILED, fetch_categories, synchronized_notice};
    pub use crate::controller::*;
    pub use crate::destinations::{Destination, fetch_destinations};
    pub use crate::draft::*;
    pub use crate::naming::*;
    pub use crate::schedule::*;
    pub use crate::suggestions::*;
    pub use micropress_core::prelude::*;
}
