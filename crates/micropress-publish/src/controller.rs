//! Compose-and-submit state machine.
//!
//! ```text
//! Idle -> Validating -> Submitting -> Succeeded | Failed
//!              |
//!              +-> Idle (rejected date, nothing sent)
//! ```
//!
//! `Succeeded` and `Failed` settle back to `Idle` as soon as the draft is
//! touched again, so a failed post can be retried without re-entering it.
//! Observers see every transition as a [`PublishEvent`]; for one `submit`
//! the date validation event always precedes the submitting event.

use crate::draft::PublishDraft;
use crate::micropub;
use crate::naming::renamed_path;
use crate::schedule::INVALID_DATE_TEXT;
use crate::suggestions::tag_suggestions;
use micropress_core::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

/// State changes reported to observers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishEvent {
    /// The scheduled date was checked at the start of a submit
    DateValidated { valid: bool },
    /// The publish request is in flight
    Submitting,
    /// The note was renamed after publishing
    Renamed { path: PathBuf },
    /// Renaming failed; the post itself is live
    RenameFailed { message: String },
    Published(PublishOutcome),
    PublishFailed { kind: ErrorKind, message: String },
    TitleCleared,
    DateCleared,
    TagSelected { tag: String, added: bool },
}

/// Receives controller events along with the draft as it stands after each
pub trait PublishObserver: Send + Sync {
    fn on_event(&self, event: &PublishEvent, draft: &PublishDraft);
}

impl PublishObserver for UnboundedSender<PublishEvent> {
    fn on_event(&self, event: &PublishEvent, _draft: &PublishDraft) {
        if self.send(event.clone()).is_err() {
            log::debug!("Publish event dropped, receiver closed");
        }
    }
}

/// Result of one [`PublishSubmissionController::submit`]
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The scheduled date did not parse; nothing was sent
    Rejected(Error),
    Published(PublishOutcome),
    Failed(Error),
}

impl SubmitOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, SubmitOutcome::Published(_))
    }
}

/// Where the note lives, for renaming after publish
struct RenameTarget {
    files: Arc<dyn FileStore>,
    entry: FileEntry,
}

/// Drives one compose session from draft to published post
pub struct PublishSubmissionController {
    draft: PublishDraft,
    state: SubmissionState,
    executor: Arc<dyn RequestExecutor>,
    frontmatter: Arc<dyn FrontmatterStore>,
    rename: Option<RenameTarget>,
    observer: Option<Arc<dyn PublishObserver>>,
    notifier: Arc<dyn Notifier>,
    endpoint: String,
    token: String,
    blogs: BTreeMap<String, String>,
    categories: BTreeMap<String, Vec<String>>,
    rename_after_publish: bool,
}

impl std::fmt::Debug for PublishSubmissionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublishSubmissionController")
            .field("draft", &self.draft)
            .field("state", &self.state)
            .field("endpoint", &self.endpoint)
            .field("rename_after_publish", &self.rename_after_publish)
            .finish()
    }
}

impl PublishSubmissionController {
    pub fn new(
        draft: PublishDraft,
        settings: &Settings,
        executor: Arc<dyn RequestExecutor>,
        frontmatter: Arc<dyn FrontmatterStore>,
    ) -> Self {
        Self {
            draft,
            state: SubmissionState::Idle,
            executor,
            frontmatter,
            rename: None,
            observer: None,
            notifier: Arc::new(LogNotifier),
            endpoint: settings.micropub_endpoint.clone(),
            token: settings.app_token.clone(),
            blogs: settings.blogs.clone(),
            categories: settings.synchronized_categories.clone(),
            rename_after_publish: settings.rename_note_after_publish,
        }
    }

    /// File to rename when "rename after publish" is enabled
    pub fn with_rename_target(mut self, files: Arc<dyn FileStore>, entry: FileEntry) -> Self {
        self.rename = Some(RenameTarget { files, entry });
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn PublishObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn draft(&self) -> &PublishDraft {
        &self.draft
    }

    /// Edit the draft; a settled submission returns to `Idle`
    pub fn draft_mut(&mut self) -> &mut PublishDraft {
        self.settle();
        &mut self.draft
    }

    pub fn blogs(&self) -> &BTreeMap<String, String> {
        &self.blogs
    }

    /// More than one real destination besides `"default"`
    pub fn has_multiple_blogs(&self) -> bool {
        self.blogs.keys().filter(|uid| *uid != DEFAULT_BLOG_ID).count() > 1
    }

    /// Error text for the date field; empty while the date is valid
    pub fn invalid_date_text(&self) -> &'static str {
        if self.draft.is_valid_date() {
            ""
        } else {
            INVALID_DATE_TEXT
        }
    }

    /// Whether the busy "publishing" affordance is shown
    pub fn show_publishing_button(&self) -> bool {
        self.draft.is_valid_date() && self.draft.is_submitting()
    }

    /// Validate, publish, then persist metadata and optionally rename.
    ///
    /// Taking `&mut self` serializes submissions: a second submit cannot
    /// start while one is in flight.
    #[instrument(skip(self), fields(destination = %self.draft.destination()), name = "submit_post")]
    pub async fn submit(&mut self) -> SubmitOutcome {
        self.state = SubmissionState::Validating;

        if let Err(e) = self.draft.revalidate_date() {
            self.draft.set_submitting(false);
            self.emit(PublishEvent::DateValidated { valid: false });
            self.state = SubmissionState::Idle;

            log::warn!("Rejected scheduled date: {}", self.draft.scheduled_date());
            return SubmitOutcome::Rejected(e);
        }

        self.draft.set_submitting(true);
        self.emit(PublishEvent::DateValidated { valid: true });
        self.state = SubmissionState::Submitting;
        self.emit(PublishEvent::Submitting);

        let result = micropub::publish(
            self.executor.as_ref(),
            &self.endpoint,
            &self.token,
            &self.draft,
        )
        .await;
        self.draft.set_submitting(false);

        match result {
            Ok(outcome) => {
                log::info!("Published {}", outcome.url);
                self.persist_metadata(&outcome).await;
                if self.rename_after_publish {
                    self.rename_note(&outcome.url).await;
                }
                self.state = SubmissionState::Succeeded;
                self.emit(PublishEvent::Published(outcome.clone()));
                SubmitOutcome::Published(outcome)
            }
            Err(e) => {
                log::error!("Publish failed: {}", e);
                self.state = SubmissionState::Failed;
                self.emit(PublishEvent::PublishFailed {
                    kind: e.kind(),
                    message: e.to_string(),
                });
                SubmitOutcome::Failed(e)
            }
        }
    }

    pub fn clear_title(&mut self) {
        self.settle();
        self.draft.clear_title();
        self.emit(PublishEvent::TitleCleared);
    }

    /// Clear the scheduled date and its error state
    pub fn clear_date(&mut self) {
        self.settle();
        self.draft.clear_date();
        self.emit(PublishEvent::DateCleared);
    }

    /// Add a suggested tag; selecting a tag already present changes nothing
    pub fn select_tag(&mut self, tag: &str) -> bool {
        self.settle();
        let added = self.draft.add_tag(tag);
        self.emit(PublishEvent::TagSelected {
            tag: tag.trim().to_string(),
            added,
        });
        added
    }

    /// Synchronized categories for the selected destination not yet on the draft
    pub fn suggestions(&self) -> Vec<String> {
        tag_suggestions(&self.categories, self.draft.destination(), self.draft.tags())
    }

    fn settle(&mut self) {
        if matches!(
            self.state,
            SubmissionState::Succeeded | SubmissionState::Failed
        ) {
            self.state = SubmissionState::Idle;
        }
    }

    fn emit(&self, event: PublishEvent) {
        log::debug!("Publish event: {:?}", event);
        if let Some(observer) = &self.observer {
            observer.on_event(&event, &self.draft);
        }
    }

    async fn persist_metadata(&self, outcome: &PublishOutcome) {
        let fields = [
            ("title", serde_json::Value::from(self.draft.title())),
            ("url", serde_json::Value::from(outcome.url.as_str())),
            ("tags", serde_json::Value::from(self.draft.tags().to_vec())),
        ];

        for (key, value) in fields {
            if let Err(e) = self.frontmatter.save(value, key).await {
                log::warn!("Failed to save '{}' to frontmatter: {}", key, e);
            }
        }
    }

    async fn rename_note(&mut self, url: &str) {
        let Some(target) = &mut self.rename else {
            log::debug!("Rename after publish enabled but no note to rename");
            return;
        };

        let new_path = renamed_path(target.entry.path(), url);
        let event = match target.files.rename(&target.entry, &new_path).await {
            Ok(()) => {
                target.entry = FileEntry::new(new_path.clone());
                let name = new_path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or_default();
                self.notifier.notify(&format!("Note renamed to: {}", name));
                PublishEvent::Renamed { path: new_path }
            }
            Err(e) => {
                let err = match e {
                    Error::RenameFailure { .. } => e,
                    other => Error::rename_failure(&new_path, other.to_string()),
                };
                let message = err.to_string();
                self.notifier.notify(&message);
                PublishEvent::RenameFailed { message }
            }
        };
        self.emit(event);
    }
}
