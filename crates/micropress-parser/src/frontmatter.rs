//! Frontmatter handling: `---\nYAML\n---`
//!
//! Notes carry their publishing metadata (`title`, `url`, `tags`) in a YAML
//! block at the top of the file. This module splits that block from the body,
//! decodes it, and writes single keys back without touching the body.

use micropress_core::{Error, Result, TagList};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Matches YAML frontmatter at the start of a document; the block may be empty
static FRONTMATTER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^---[ \t]*\r?\n(?:([\s\S]*?)\r?\n)??---[ \t]*(?:\r?\n|$)")
        .expect("valid frontmatter pattern")
});

/// Split content into `(frontmatter_yaml, body)`
pub fn split_frontmatter(content: &str) -> (Option<&str>, &str) {
    match FRONTMATTER_PATTERN.captures(content) {
        Some(caps) => {
            let Some(full) = caps.get(0) else {
                return (None, content);
            };
            let yaml = caps.get(1).map_or("", |m| m.as_str());
            (Some(yaml), &content[full.end()..])
        }
        None => (None, content),
    }
}

/// Decode a YAML block into a key/value map
pub fn parse_frontmatter(yaml: &str) -> Result<Map<String, Value>> {
    if yaml.trim().is_empty() {
        return Ok(Map::new());
    }

    match serde_yaml::from_str::<Value>(yaml) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(Value::Null) => Ok(Map::new()),
        Ok(other) => Err(Error::parse_error(format!(
            "Frontmatter must be a mapping, found {}",
            other
        ))),
        Err(e) => Err(Error::parse_error(format!("Invalid frontmatter YAML: {}", e))),
    }
}

/// A note split into metadata and body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedNote {
    pub frontmatter: Map<String, Value>,
    pub body: String,
}

impl ParsedNote {
    /// Parse note content. Malformed frontmatter is treated as body text.
    pub fn parse(content: &str) -> Self {
        let (yaml, body) = split_frontmatter(content);
        let Some(yaml) = yaml else {
            return Self {
                frontmatter: Map::new(),
                body: content.to_string(),
            };
        };

        match parse_frontmatter(yaml) {
            Ok(frontmatter) => Self {
                frontmatter,
                body: body.to_string(),
            },
            Err(e) => {
                log::warn!("Ignoring unreadable frontmatter: {}", e);
                Self {
                    frontmatter: Map::new(),
                    body: content.to_string(),
                }
            }
        }
    }

    /// `title` key, if it is a string
    pub fn title(&self) -> Option<&str> {
        self.frontmatter.get("title").and_then(Value::as_str)
    }

    /// `url` key, if it is a non-empty string
    pub fn url(&self) -> Option<&str> {
        self.frontmatter
            .get("url")
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
    }

    /// `tags` key as a list; accepts a YAML list or comma-separated string
    pub fn tags(&self) -> Option<TagList> {
        match self.frontmatter.get("tags")? {
            Value::String(s) => Some(TagList::parse(s)),
            Value::Array(items) => Some(items.iter().filter_map(Value::as_str).collect()),
            _ => None,
        }
    }
}

/// Set one frontmatter key, creating the block when the note has none.
///
/// The body is preserved byte for byte; existing keys keep their order.
pub fn set_frontmatter_value(content: &str, key: &str, value: Value) -> Result<String> {
    let (yaml, body) = split_frontmatter(content);
    let mut map = match yaml {
        Some(yaml) => parse_frontmatter(yaml)?,
        None => Map::new(),
    };
    map.insert(key.to_string(), value);

    let rendered = serde_yaml::to_string(&map)
        .map_err(|e| Error::parse_error(format!("Failed to serialize frontmatter: {}", e)))?;

    Ok(format!("---\n{}---\n{}", rendered, body))
}
