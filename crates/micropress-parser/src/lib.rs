//! # Micropress Parser
//!
//! Parsers for the two pieces of note syntax the publishing flows care about:
//!
//! - Image embeds (`![[photo.png]]`) via [`extract_references`]
//! - YAML frontmatter via [`ParsedNote`] and [`set_frontmatter_value`]
//!
//! ```
//! use micropress_parser::{extract_references, ParsedNote};
//!
//! let note = ParsedNote::parse("---\ntitle: Trip\n---\n![[beach.jpg]] and ![[beach.jpg]]");
//! assert_eq!(note.title(), Some("Trip"));
//! assert_eq!(extract_references(&note.body).count(), 2);
//! ```

pub mod frontmatter;
pub mod references;

pub use frontmatter::{ParsedNote, parse_frontmatter, set_frontmatter_value, split_frontmatter};
pub use references::{
    IMAGE_EXTENSIONS, References, extract_references, unique_filenames,
};
