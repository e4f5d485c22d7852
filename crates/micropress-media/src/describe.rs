//! Image descriptions from a vision-capable chat completion service.
//!
//! [`DescriptionGenerator::describe`] always returns text: when the service
//! is disabled, unconfigured, unreachable, or answers with something
//! unusable, the description falls back to one derived from the filename.

use micropress_core::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use tracing::instrument;

/// Instruction sent along with every image
pub const DESCRIPTION_PROMPT: &str =
    "Write a short, descriptive alt text for the image. Keep it concise and relevant.";

static EXTENSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.[^/.]+$").expect("valid extension pattern"));

/// Description derived from a filename: extension stripped, `-` and `_`
/// turned into spaces.
pub fn fallback_description(filename: &str) -> String {
    EXTENSION_PATTERN
        .replace(filename, "")
        .replace(['-', '_'], " ")
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Debug, Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for the description service
#[derive(Clone)]
pub struct DescriptionGenerator {
    executor: Arc<dyn RequestExecutor>,
    endpoint: String,
    model: String,
    max_tokens: u32,
}

impl std::fmt::Debug for DescriptionGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptionGenerator")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl DescriptionGenerator {
    pub fn new(executor: Arc<dyn RequestExecutor>, endpoint: impl Into<String>) -> Self {
        let defaults = Settings::default();
        Self {
            executor,
            endpoint: endpoint.into(),
            model: defaults.description_model,
            max_tokens: defaults.description_max_tokens,
        }
    }

    /// Endpoint, model, and token budget taken from settings
    pub fn from_settings(executor: Arc<dyn RequestExecutor>, settings: &Settings) -> Self {
        Self::new(executor, settings.description_endpoint.clone())
            .with_model(settings.description_model.clone())
            .with_max_tokens(settings.description_max_tokens)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Describe the image at `location`.
    ///
    /// Never fails; `filename` feeds the fallback text.
    #[instrument(skip(self, api_key), name = "describe_image")]
    pub async fn describe(
        &self,
        location: &str,
        filename: &str,
        enabled: bool,
        api_key: Option<&str>,
    ) -> String {
        let fallback = fallback_description(filename);

        let key = match api_key.map(str::trim) {
            Some(key) if enabled && !key.is_empty() && !location.is_empty() => key,
            _ => return fallback,
        };

        match self.request_description(location, key).await {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Using fallback description for {}: {}", filename, e);
                fallback
            }
        }
    }

    /// One call to the service; any problem is a `DescriptionService` error
    async fn request_description(&self, location: &str, api_key: &str) -> Result<String> {
        let payload = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: DESCRIPTION_PROMPT,
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: location },
                    },
                ],
            }],
            max_tokens: self.max_tokens,
        };
        let body = serde_json::to_vec(&payload)
            .map_err(|e| Error::description_service(format!("Failed to encode request: {}", e)))?;

        let request = HttpRequest::post(&self.endpoint, body)
            .bearer(api_key)
            .header("Content-Type", "application/json");

        let response = self
            .executor
            .execute(request)
            .await
            .map_err(|e| Error::description_service(e.to_string()))?;

        log::debug!("Description service raw response: {}", response.body_text);

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| Error::description_service(e.to_string()))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(Error::description_service("Empty description in response"));
        }

        Ok(text)
    }
}
