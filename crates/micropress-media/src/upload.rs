//! Batch upload of a note's embedded images.
//!
//! Each distinct image is resolved, uploaded, described, and rewritten in
//! turn. Items fail independently: a missing file or an upload without a
//! location is recorded in the report and the batch moves on.

use crate::describe::{DescriptionGenerator, fallback_description};
use crate::multipart::{self, mime_type_for};
use crate::rewrite::{occurrences, rewrite_reference};
use micropress_core::prelude::*;
use micropress_parser::unique_filenames;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;
use uuid::Uuid;

/// Notice shown when a note has no image embeds
pub const NOTHING_TO_UPLOAD: &str = "No image links found to upload.";

/// Notice shown when a batch finishes
pub const UPLOAD_COMPLETE: &str = "Image upload and replacement complete.";

/// Per-run switches for an upload batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOptions {
    pub access_token: String,
    pub delete_after_upload: bool,
    pub use_description_service: bool,
    pub description_service_key: Option<String>,
}

impl UploadOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            access_token: settings.app_token.clone(),
            delete_after_upload: settings.delete_after_upload,
            use_description_service: settings.use_description_service,
            description_service_key: settings.description_key().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    /// The text held no image embeds; nothing was sent
    NothingToUpload,
    /// Every referenced image was attempted
    Completed,
}

/// Result of one batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReport {
    pub status: UploadStatus,
    /// One record per distinct filename, in order of first appearance
    pub results: Vec<UploadResult>,
    /// The rewritten text
    pub text: String,
    pub batch_id: String,
    pub duration_ms: u64,
}

impl UploadReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &UploadResult> {
        self.results.iter().filter(|r| r.succeeded)
    }

    pub fn failed(&self) -> impl Iterator<Item = &UploadResult> {
        self.results.iter().filter(|r| !r.succeeded)
    }

    /// Human-readable summary of the batch
    pub fn summary(&self) -> String {
        match self.status {
            UploadStatus::NothingToUpload => NOTHING_TO_UPLOAD.to_string(),
            UploadStatus::Completed => {
                let failed: Vec<&str> = self.failed().map(|r| r.filename.as_str()).collect();
                if failed.is_empty() {
                    UPLOAD_COMPLETE.to_string()
                } else {
                    format!(
                        "{} {} of {} images failed: {}",
                        UPLOAD_COMPLETE,
                        failed.len(),
                        self.results.len(),
                        failed.join(", ")
                    )
                }
            }
        }
    }
}

/// Drives the upload pipeline against host collaborators
#[derive(Clone)]
pub struct UploadOrchestrator {
    files: Arc<dyn FileStore>,
    executor: Arc<dyn RequestExecutor>,
    describer: DescriptionGenerator,
    media_endpoint: String,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for UploadOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadOrchestrator")
            .field("media_endpoint", &self.media_endpoint)
            .field("describer", &self.describer)
            .finish()
    }
}

impl UploadOrchestrator {
    pub fn new(
        files: Arc<dyn FileStore>,
        executor: Arc<dyn RequestExecutor>,
        media_endpoint: impl Into<String>,
        description_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            describer: DescriptionGenerator::new(executor.clone(), description_endpoint),
            files,
            executor,
            media_endpoint: media_endpoint.into(),
            notifier: Arc::new(LogNotifier),
        }
    }

    pub fn from_settings(
        files: Arc<dyn FileStore>,
        executor: Arc<dyn RequestExecutor>,
        settings: &Settings,
    ) -> Self {
        Self {
            describer: DescriptionGenerator::from_settings(executor.clone(), settings),
            files,
            executor,
            media_endpoint: settings.media_endpoint.clone(),
            notifier: Arc::new(LogNotifier),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_describer(mut self, describer: DescriptionGenerator) -> Self {
        self.describer = describer;
        self
    }

    /// Upload every image embedded in the editor's text and write the
    /// rewritten text back.
    ///
    /// Only reading or writing the editor can fail; per-image problems are
    /// in the report.
    #[instrument(skip(self, editor, options), name = "upload_and_replace_images")]
    pub async fn upload_and_replace_images(
        &self,
        editor: &dyn ActiveEditor,
        options: &UploadOptions,
    ) -> Result<UploadReport> {
        let original = editor.get_text().await?;
        let report = self.rewrite_text(&original, options).await;

        if report.status == UploadStatus::Completed {
            editor.set_text(&report.text).await?;
        }

        self.notifier.notify(&report.summary());
        Ok(report)
    }

    /// Run the pipeline over `text` without touching the editor
    pub async fn rewrite_text(&self, text: &str, options: &UploadOptions) -> UploadReport {
        let started = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        let filenames = unique_filenames(text);

        if filenames.is_empty() {
            log::debug!("No image embeds found");
            return UploadReport {
                status: UploadStatus::NothingToUpload,
                results: Vec::new(),
                text: text.to_string(),
                batch_id,
                duration_ms: started.elapsed().as_millis() as u64,
            };
        }

        log::info!("Uploading {} images (batch {})", filenames.len(), batch_id);

        // Listed once; every item resolves against the same snapshot
        let listing = self.files.list().await;
        let mut working = text.to_string();
        let mut results = Vec::with_capacity(filenames.len());

        for filename in filenames {
            let result = match &listing {
                Ok(entries) => {
                    self.process_item(&filename, entries, &mut working, options)
                        .await
                }
                Err(e) => UploadResult::failed(&filename, fallback_description(&filename), e),
            };

            if let Some(message) = &result.message {
                log::warn!("Skipped {}: {}", filename, message);
            }
            results.push(result);
        }

        UploadReport {
            status: UploadStatus::Completed,
            results,
            text: working,
            batch_id,
            duration_ms: started.elapsed().as_millis() as u64,
        }
    }

    async fn process_item(
        &self,
        filename: &str,
        entries: &[FileEntry],
        working: &mut String,
        options: &UploadOptions,
    ) -> UploadResult {
        let entry = match resolve(entries, filename) {
            Some(entry) => entry,
            None => {
                let err = Error::reference_not_found(filename);
                return UploadResult::failed(filename, fallback_description(filename), &err);
            }
        };

        let location = match self.upload(entry, filename, &options.access_token).await {
            Ok(location) => location,
            Err(e) => return UploadResult::failed(filename, fallback_description(filename), &e),
        };

        let description = self
            .describer
            .describe(
                &location,
                filename,
                options.use_description_service,
                options.description_service_key.as_deref(),
            )
            .await;

        let token = EmbeddedReference::new(filename).raw_token;
        log::debug!("Replacing {} embeds of {}", occurrences(working, &token), filename);
        *working = rewrite_reference(working, &token, &location, &description);

        let mut result = UploadResult::uploaded(filename, location, description);

        if options.delete_after_upload {
            match self.files.delete(entry).await {
                Ok(()) => result.deleted = true,
                Err(e) => log::warn!("Failed to delete {} after upload: {}", filename, e),
            }
        }

        result
    }

    /// Read, encode, and post one file; returns the created location
    #[instrument(skip(self, entry, token), name = "upload_image")]
    async fn upload(&self, entry: &FileEntry, filename: &str, token: &str) -> Result<String> {
        let content = self.files.read_binary(entry).await?;
        let payload = multipart::encode(&content, entry.name(), mime_type_for(entry.name()));

        let content_type = payload.content_type();
        log::debug!("Posting {} ({} bytes, {})", filename, payload.len(), content_type);

        let request = HttpRequest::post(&self.media_endpoint, payload.into_body())
            .bearer(token)
            .header("Content-Type", content_type);

        let response = self.executor.execute(request).await?;

        match response.header("Location").map(str::trim) {
            Some(location) if !location.is_empty() => {
                log::info!("Uploaded {} to {}", filename, location);
                Ok(location.to_string())
            }
            _ => Err(Error::upload_incomplete(filename)),
        }
    }
}

/// First entry whose name or store-relative path equals `filename`
fn resolve<'a>(entries: &'a [FileEntry], filename: &str) -> Option<&'a FileEntry> {
    let wanted = std::path::Path::new(filename);
    entries
        .iter()
        .find(|entry| entry.name() == filename || entry.path() == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(results: Vec<UploadResult>) -> UploadReport {
        UploadReport {
            status: UploadStatus::Completed,
            results,
            text: String::new(),
            batch_id: "b".to_string(),
            duration_ms: 0,
        }
    }

    #[test]
    fn test_resolve_by_name_or_path() {
        let entries = vec![
            FileEntry::new("notes/post.md"),
            FileEntry::new("assets/photo.png"),
        ];
        assert_eq!(
            resolve(&entries, "photo.png").map(|e| e.path()),
            Some(std::path::Path::new("assets/photo.png"))
        );
        assert!(resolve(&entries, "assets/photo.png").is_some());
        assert!(resolve(&entries, "Photo.png").is_none());
    }

    #[test]
    fn test_summary_mentions_failures() {
        let ok = UploadResult::uploaded("a.png", "L", "a");
        let missing = UploadResult::failed("b.png", "b", &Error::reference_not_found("b.png"));

        assert_eq!(report(vec![ok.clone()]).summary(), UPLOAD_COMPLETE);
        assert_eq!(
            report(vec![ok, missing]).summary(),
            "Image upload and replacement complete. 1 of 2 images failed: b.png"
        );
    }

    #[test]
    fn test_options_from_settings() {
        let settings = Settings::builder()
            .app_token("tok")
            .delete_after_upload(true)
            .description_service_key("  ")
            .build()
            .unwrap();

        let options = UploadOptions::from_settings(&settings);
        assert_eq!(options.access_token, "tok");
        assert!(options.delete_after_upload);
        assert!(options.use_description_service);
        assert_eq!(options.description_service_key, None);
    }
}
