//! Interfaces to the host environment.
//!
//! The pipelines never touch the filesystem or network directly; they go
//! through these traits so the vault-backed and reqwest-backed
//! implementations can be swapped for in-memory ones in tests.

use crate::error::{Error, Result};
use crate::models::FileEntry;
use async_trait::async_trait;
use std::fmt;
use std::path::Path;

/// HTTP method subset used by the pipelines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

/// A fully-formed outbound request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn post(url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add `Authorization: Bearer <token>`
    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {}", token))
    }

    /// Case-insensitive request header lookup
    pub fn header_value(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// A settled response with a 2xx status
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body_text: String,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body_text = body.into();
        self
    }

    /// Case-insensitive header lookup; services differ in header casing
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Decode the body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body_text)
            .map_err(|e| Error::parse_error(format!("Malformed response body: {}", e)))
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Performs HTTP calls for the pipelines.
///
/// Implementations return `Err(Error::Http { .. })` for non-2xx statuses and
/// `Err(Error::Transport { .. })` when no response was received.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Binary and text file access rooted at a vault
#[async_trait]
pub trait FileStore: Send + Sync {
    /// All files in the store
    async fn list(&self) -> Result<Vec<FileEntry>>;

    async fn read_binary(&self, file: &FileEntry) -> Result<Vec<u8>>;

    async fn delete(&self, file: &FileEntry) -> Result<()>;

    /// Move `file` to `new_path` (relative to the store root)
    async fn rename(&self, file: &FileEntry, new_path: &Path) -> Result<()>;
}

/// The document currently being edited
#[async_trait]
pub trait ActiveEditor: Send + Sync {
    async fn get_text(&self) -> Result<String>;

    async fn set_text(&self, text: &str) -> Result<()>;
}

/// Structured metadata block of the active document
#[async_trait]
pub trait FrontmatterStore: Send + Sync {
    /// Set `key` to `value`, creating the block if needed
    async fn save(&self, value: serde_json::Value, key: &str) -> Result<()>;
}

/// Short user-facing notices
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Notifier that writes notices to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        log::info!("{}", message);
    }
}
