//! [`RequestExecutor`] over `reqwest`

use async_trait::async_trait;
use micropress_core::prelude::*;
use std::time::Duration;
use tracing::instrument;

/// Executes pipeline requests with a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct ReqwestExecutor {
    client: reqwest::Client,
}

impl ReqwestExecutor {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("micropress/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::config_error(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(Duration::from_secs(settings.request_timeout_secs))
    }
}

#[async_trait]
impl RequestExecutor for ReqwestExecutor {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url), name = "http_execute")]
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body_text = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("Failed to read response body: {}", e)))?;

        log::debug!("{} {} -> {}", request.method, request.url, status);

        if !(200..300).contains(&status) {
            return Err(Error::http(status, body_text));
        }

        Ok(HttpResponse {
            status,
            headers,
            body_text,
        })
    }
}
