//! Command implementations shared by the CLI and its tests

use micropress_core::prelude::*;
use micropress_media::{UploadOptions, UploadOrchestrator, UploadReport};
use micropress_publish::prelude::{
    CATEGORY_SYNC_FAILED, PublishDraft, PublishObserver, PublishSubmissionController,
    SubmitOutcome, fetch_categories, fetch_destinations, synchronized_notice,
};
use micropress_vault::{NoteEditor, NoteFrontmatter, VaultManager};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything a command needs: the vault, settings, and host services
#[derive(Clone)]
pub struct Workspace {
    pub vault: Arc<VaultManager>,
    pub settings: Settings,
    pub executor: Arc<dyn RequestExecutor>,
    pub notifier: Arc<dyn Notifier>,
    /// Where refreshed destinations and categories are saved
    pub config_path: Option<PathBuf>,
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("vault", &self.vault.vault_path())
            .field("config_path", &self.config_path)
            .finish()
    }
}

/// Overrides for one publish
#[derive(Debug, Clone, Default)]
pub struct PublishArgs {
    pub title: Option<String>,
    pub tags: Option<String>,
    pub visibility: Option<Visibility>,
    pub blog: Option<String>,
    pub schedule: Option<String>,
    /// Suggested tags to select, as if picked from the suggestion list
    pub suggest: Vec<String>,
    /// Rename the note after publishing, on top of the stored setting
    pub rename: bool,
}

impl Workspace {
    pub fn new(
        vault: Arc<VaultManager>,
        settings: Settings,
        executor: Arc<dyn RequestExecutor>,
    ) -> Self {
        Self {
            vault,
            settings,
            executor,
            notifier: Arc::new(LogNotifier),
            config_path: None,
        }
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    fn require_token(&self) -> Result<()> {
        if self.settings.has_app_token() {
            Ok(())
        } else {
            Err(Error::config_error(
                "No app token configured; pass --token or set app_token in the settings file",
            ))
        }
    }

    /// Upload the images embedded in `note` and rewrite it in place
    pub async fn upload(&self, note: &Path) -> Result<UploadReport> {
        self.require_token()?;

        let editor = NoteEditor::new(self.vault.clone(), note);
        let orchestrator =
            UploadOrchestrator::from_settings(self.vault.clone(), self.executor.clone(), &self.settings)
                .with_notifier(self.notifier.clone());

        orchestrator
            .upload_and_replace_images(&editor, &UploadOptions::from_settings(&self.settings))
            .await
    }

    /// Publish `note` with the given overrides.
    ///
    /// Categories are refreshed first when `synchronize_categories_on_open`
    /// is set; a failed refresh keeps the stored categories.
    pub async fn publish(
        &mut self,
        note: &Path,
        args: PublishArgs,
        observer: Option<Arc<dyn PublishObserver>>,
    ) -> Result<SubmitOutcome> {
        self.require_token()?;

        if self.settings.synchronize_categories_on_open
            && let Err(e) = self.synchronize_categories().await
        {
            log::warn!("Continuing with stored categories: {}", e);
        }

        let mut settings = self.settings.clone();
        settings.rename_note_after_publish |= args.rename;

        let text = self.vault.read_text(note).await?;
        let mut draft = PublishDraft::from_note(&text, &settings)?;

        if let Some(title) = args.title {
            draft.set_title(title);
        }
        if let Some(tags) = args.tags {
            draft.set_tags(&tags);
        }
        if let Some(visibility) = args.visibility {
            draft.set_visibility(visibility);
        }
        if let Some(blog) = args.blog {
            draft.set_destination(blog);
        }
        if let Some(schedule) = args.schedule {
            draft.set_scheduled_date(schedule);
        }

        let mut controller = PublishSubmissionController::new(
            draft,
            &settings,
            self.executor.clone(),
            Arc::new(NoteFrontmatter::new(self.vault.clone(), note)),
        )
        .with_rename_target(self.vault.clone(), FileEntry::new(note))
        .with_notifier(self.notifier.clone());

        if let Some(observer) = observer {
            controller = controller.with_observer(observer);
        }

        for tag in &args.suggest {
            controller.select_tag(tag);
        }

        Ok(controller.submit().await)
    }

    /// Refresh the token's destinations and store them in the settings file
    pub async fn refresh_destinations(&mut self) -> Result<BTreeMap<String, String>> {
        self.require_token()?;

        let blogs = fetch_destinations(
            self.executor.as_ref(),
            &self.settings.micropub_endpoint,
            &self.settings.app_token,
        )
        .await?;

        self.settings.blogs = blogs.clone();
        self.save_settings().await?;
        Ok(blogs)
    }

    /// Refresh the categories of every destination and store them
    pub async fn synchronize_categories(&mut self) -> Result<BTreeMap<String, Vec<String>>> {
        self.require_token()?;

        let synced = match fetch_categories(
            self.executor.as_ref(),
            &self.settings.micropub_endpoint,
            &self.settings.app_token,
            &self.settings.blogs,
        )
        .await
        {
            Ok(synced) => synced,
            Err(e) => {
                log::error!("Category sync failed: {}", e);
                self.notifier.notify(CATEGORY_SYNC_FAILED);
                return Err(e);
            }
        };

        self.settings.synchronized_categories = synced.clone();
        self.save_settings().await?;
        self.notifier.notify(&synchronized_notice(&synced));
        Ok(synced)
    }

    async fn save_settings(&self) -> Result<()> {
        match &self.config_path {
            Some(path) => self.settings.save(path).await,
            None => Ok(()),
        }
    }
}

/// Settings file used when none is given: `<vault>/.micropress/settings.yaml`
pub fn default_config_path(vault: &Path) -> PathBuf {
    vault.join(".micropress").join("settings.yaml")
}
