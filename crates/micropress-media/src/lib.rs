//! # Micropress Media
//!
//! The image half of publishing a note: every `![[image]]` embed is uploaded
//! to the media endpoint, captioned, and rewritten as a standard Markdown
//! image link.
//!
//! - [`multipart`] - hand-built `multipart/form-data` bodies
//! - [`describe`] - captions from a description service, with a filename fallback
//! - [`rewrite`] - exact-token substitution
//! - [`upload`] - the batch driver, [`UploadOrchestrator`]
//!
//! ```
//! use micropress_media::rewrite::rewrite_reference;
//!
//! let text = rewrite_reference(
//!     "Look: ![[sunset.png]]",
//!     "![[sunset.png]]",
//!     "https://cdn.micro.blog/sunset.png",
//!     "sunset",
//! );
//! assert_eq!(text, "Look: ![sunset](https://cdn.micro.blog/sunset.png)");
//! ```

pub mod describe;
pub mod multipart;
pub mod rewrite;
pub mod upload;

pub use describe::{DescriptionGenerator, fallback_description};
pub use multipart::{MultipartPayload, mime_type_for};
pub use rewrite::{image_link, rewrite_reference};
pub use upload::{UploadOptions, UploadOrchestrator, UploadReport, UploadStatus};

pub mod prelude {
    pub use crate::describe::*;
    pub use crate::multipart::MultipartPayload;
    pub use crate::rewrite::*;
    pub use crate::upload::*;
    pub use micropress_core::prelude::*;
}
