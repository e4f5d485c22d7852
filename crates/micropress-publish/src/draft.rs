//! The post being composed

use crate::schedule::{format_scheduled_date, is_valid_scheduled_date, validate_scheduled_date};
use micropress_core::prelude::*;
use micropress_parser::ParsedNote;

/// Shown when a note has nothing to publish
pub const BLANK_POST_MESSAGE: &str =
    "Micro.blog does not support blank posts. Please write something before trying again.";

/// Mutable state of one compose session.
///
/// Fields change only through setters so tag de-duplication and the date
/// validity flag stay consistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishDraft {
    title: String,
    content: String,
    tags: TagList,
    visibility: Visibility,
    destination: String,
    scheduled_date: String,
    is_valid_date: bool,
    is_submitting: bool,
}

impl PublishDraft {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            title: String::new(),
            content: content.into(),
            tags: TagList::new(),
            visibility: Visibility::default(),
            destination: DEFAULT_BLOG_ID.to_string(),
            scheduled_date: String::new(),
            is_valid_date: true,
            is_submitting: false,
        }
    }

    /// Start a draft from a note's text.
    ///
    /// Title and tags come from the frontmatter when present; tags fall back
    /// to the configured defaults. Notes with a blank body are rejected.
    pub fn from_note(note: &str, settings: &Settings) -> Result<Self> {
        let parsed = ParsedNote::parse(note);
        if let Some(url) = parsed.url() {
            log::info!("Note was already published at {}; this creates a new post", url);
        }

        if parsed.body.trim().is_empty() {
            return Err(Error::validation_error(BLANK_POST_MESSAGE));
        }

        let tags = parsed
            .tags()
            .filter(|tags| !tags.is_empty())
            .unwrap_or_else(|| settings.default_tag_list());

        let mut draft = Self::new(parsed.body.clone());
        draft.title = parsed.title().unwrap_or_default().trim().to_string();
        draft.tags = tags;
        draft.visibility = settings.post_visibility;
        draft.destination = settings.selected_blog_id.clone();
        Ok(draft)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        log::debug!("Post title changed: {}", self.title);
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn tags(&self) -> &TagList {
        &self.tags
    }

    /// Replace the tag list from comma-separated text
    pub fn set_tags(&mut self, tags: &str) {
        self.tags = TagList::parse(tags);
        log::debug!("Post tags changed: {}", self.tags);
    }

    /// Append one tag; returns false when it was already present
    pub fn add_tag(&mut self, tag: &str) -> bool {
        self.tags.insert(tag)
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.visibility = visibility;
    }

    /// Selected destination uid, `"default"` for the account's default blog
    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn set_destination(&mut self, uid: impl Into<String>) {
        self.destination = uid.into();
        log::debug!("Selected blog changed: {}", self.destination);
    }

    pub fn scheduled_date(&self) -> &str {
        &self.scheduled_date
    }

    /// Store the raw date text.
    ///
    /// Blank or parseable text clears a previous rejection; unparseable text
    /// is only flagged by the next submit.
    pub fn set_scheduled_date(&mut self, text: impl Into<String>) {
        self.scheduled_date = text.into();
        if is_valid_scheduled_date(&self.scheduled_date) {
            self.is_valid_date = true;
        }
    }

    /// ISO-8601 scheduled date, or empty when unscheduled
    pub fn formatted_scheduled_date(&self) -> String {
        format_scheduled_date(&self.scheduled_date)
    }

    pub fn is_valid_date(&self) -> bool {
        self.is_valid_date
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    /// Recompute `is_valid_date` from the current date text
    pub(crate) fn revalidate_date(&mut self) -> Result<()> {
        let checked = validate_scheduled_date(&self.scheduled_date).map(|_| ());
        self.is_valid_date = checked.is_ok();
        checked
    }

    pub(crate) fn set_submitting(&mut self, submitting: bool) {
        self.is_submitting = submitting;
    }

    pub(crate) fn clear_title(&mut self) {
        self.title.clear();
    }

    pub(crate) fn clear_date(&mut self) {
        self.scheduled_date.clear();
        self.is_valid_date = true;
    }
}
