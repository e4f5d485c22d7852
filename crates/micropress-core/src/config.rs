//! Persisted settings for the publishing pipelines.
//!
//! Follows a builder pattern for programmatic construction and YAML for
//! persistence. Missing keys in a settings file fall back to their defaults.

use crate::error::{Error, Result};
use crate::models::{TagList, Visibility};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Identifier of the account's primary destination
pub const DEFAULT_BLOG_ID: &str = "default";

pub const DEFAULT_MICROPUB_ENDPOINT: &str = "https://micro.blog/micropub";
pub const DEFAULT_MEDIA_ENDPOINT: &str = "https://micro.blog/micropub/media";
pub const DEFAULT_DESCRIPTION_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_DESCRIPTION_MODEL: &str = "gpt-4o";

/// Stored settings shared by the upload and publish flows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Application token used to access the blogging service
    pub app_token: String,
    /// Comma-separated tags applied to new posts
    pub default_tags: String,
    /// Visibility applied to new posts
    pub post_visibility: Visibility,
    /// Destinations available to the token (uid -> display name)
    pub blogs: BTreeMap<String, String>,
    /// Destination used for new posts
    pub selected_blog_id: String,
    /// Categories synchronized per destination, used for tag suggestions
    pub synchronized_categories: BTreeMap<String, Vec<String>>,
    /// Refresh the synchronized categories whenever a compose session opens
    pub synchronize_categories_on_open: bool,
    /// Delete local images once they are uploaded
    pub delete_after_upload: bool,
    /// Rename the note to `YYYY-MM-DD_slug` after a successful publish
    pub rename_note_after_publish: bool,
    /// Ask the description service for image captions
    pub use_description_service: bool,
    /// Key for the description service
    pub description_service_key: Option<String>,

    // Endpoints
    pub micropub_endpoint: String,
    pub media_endpoint: String,
    pub description_endpoint: String,
    pub description_model: String,
    pub description_max_tokens: u32,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_token: String::new(),
            default_tags: String::new(),
            post_visibility: Visibility::Draft,
            blogs: BTreeMap::new(),
            selected_blog_id: DEFAULT_BLOG_ID.to_string(),
            synchronized_categories: BTreeMap::new(),
            synchronize_categories_on_open: true,
            delete_after_upload: false,
            rename_note_after_publish: false,
            use_description_service: true,
            description_service_key: None,
            micropub_endpoint: DEFAULT_MICROPUB_ENDPOINT.to_string(),
            media_endpoint: DEFAULT_MEDIA_ENDPOINT.to_string(),
            description_endpoint: DEFAULT_DESCRIPTION_ENDPOINT.to_string(),
            description_model: DEFAULT_DESCRIPTION_MODEL.to_string(),
            description_max_tokens: 60,
            request_timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a settings builder from the defaults
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::new()
    }

    /// Whether an application token is configured
    pub fn has_app_token(&self) -> bool {
        !self.app_token.trim().is_empty()
    }

    /// Default tags as a de-duplicated list
    pub fn default_tag_list(&self) -> TagList {
        TagList::parse(&self.default_tags)
    }

    /// Description service key, if one is set and non-blank
    pub fn description_key(&self) -> Option<&str> {
        self.description_service_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        for (name, endpoint) in [
            ("micropub_endpoint", &self.micropub_endpoint),
            ("media_endpoint", &self.media_endpoint),
            ("description_endpoint", &self.description_endpoint),
        ] {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(Error::config_error(format!(
                    "{} must be an http(s) URL, got '{}'",
                    name, endpoint
                )));
            }
        }

        if self.selected_blog_id.trim().is_empty() {
            return Err(Error::config_error("selected_blog_id cannot be empty"));
        }

        if self.request_timeout_secs == 0 {
            return Err(Error::config_error("request_timeout_secs must be positive"));
        }

        Ok(())
    }

    /// Save settings to a YAML file
    pub async fn save(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)
            .map_err(|e| Error::config_error(format!("Failed to serialize settings: {}", e)))?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(Error::io)?;
        }

        tokio::fs::write(path, yaml).await.map_err(|e| {
            Error::config_error(format!(
                "Failed to save settings to {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Load settings from a YAML file; a missing file yields the defaults
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::config_error(format!(
                "Failed to load settings from {}: {}",
                path.display(),
                e
            ))
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let settings: Settings = serde_yaml::from_str(&content)
            .map_err(|e| Error::config_error(format!("Invalid settings file: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }
}

/// Builder for [`Settings`]
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    pub fn app_token(mut self, token: impl Into<String>) -> Self {
        self.settings.app_token = token.into();
        self
    }

    pub fn default_tags(mut self, tags: impl Into<String>) -> Self {
        self.settings.default_tags = tags.into();
        self
    }

    pub fn post_visibility(mut self, visibility: Visibility) -> Self {
        self.settings.post_visibility = visibility;
        self
    }

    /// Register a destination
    pub fn blog(mut self, uid: impl Into<String>, name: impl Into<String>) -> Self {
        self.settings.blogs.insert(uid.into(), name.into());
        self
    }

    pub fn selected_blog_id(mut self, uid: impl Into<String>) -> Self {
        self.settings.selected_blog_id = uid.into();
        self
    }

    /// Set the synchronized categories for one destination
    pub fn categories<I, S>(mut self, uid: impl Into<String>, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.settings
            .synchronized_categories
            .insert(uid.into(), categories.into_iter().map(Into::into).collect());
        self
    }

    pub fn synchronize_categories_on_open(mut self, enabled: bool) -> Self {
        self.settings.synchronize_categories_on_open = enabled;
        self
    }

    pub fn delete_after_upload(mut self, enabled: bool) -> Self {
        self.settings.delete_after_upload = enabled;
        self
    }

    pub fn rename_note_after_publish(mut self, enabled: bool) -> Self {
        self.settings.rename_note_after_publish = enabled;
        self
    }

    pub fn use_description_service(mut self, enabled: bool) -> Self {
        self.settings.use_description_service = enabled;
        self
    }

    pub fn description_service_key(mut self, key: impl Into<String>) -> Self {
        self.settings.description_service_key = Some(key.into());
        self
    }

    pub fn micropub_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.settings.micropub_endpoint = endpoint.into();
        self
    }

    pub fn media_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.settings.media_endpoint = endpoint.into();
        self
    }

    pub fn description_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.settings.description_endpoint = endpoint.into();
        self
    }

    /// Build and validate
    pub fn build(self) -> Result<Settings> {
        self.settings.validate()?;
        Ok(self.settings)
    }
}
