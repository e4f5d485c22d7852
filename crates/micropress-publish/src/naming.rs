//! Note names derived from published post URLs

use std::path::{Path, PathBuf};
use url::Url;

/// Name used when a URL has no `/year/month/day/` shape
pub const FALLBACK_NOTE_NAME: &str = "published-note";

/// `YYYY-MM-DD_slug` from a post URL such as
/// `https://example.micro.blog/2025/04/14/my-post.html`.
///
/// ```
/// use micropress_publish::naming::note_name_from_url;
///
/// assert_eq!(
///     note_name_from_url("https://x.blog/2025/04/14/my-post.html"),
///     "2025-04-14_my-post"
/// );
/// assert_eq!(note_name_from_url("not a url"), "published-note");
/// ```
pub fn note_name_from_url(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return FALLBACK_NOTE_NAME.to_string();
    };

    let parts: Vec<&str> = parsed
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    if parts.len() < 3 {
        return FALLBACK_NOTE_NAME.to_string();
    }

    let (year, month, day) = (parts[0], parts[1], parts[2]);
    let rest = &parts[3..];

    let slug = if rest.is_empty() {
        parts.last().copied().unwrap_or("post").to_string()
    } else {
        rest.join("-")
    };
    let slug = slug.strip_suffix(".html").unwrap_or(&slug);

    format!("{}-{}-{}_{}", year, month, day, slug)
}

/// New path for `current` after publishing to `url`: same directory and
/// extension, name from [`note_name_from_url`].
pub fn renamed_path(current: &Path, url: &str) -> PathBuf {
    let name = note_name_from_url(url);
    let file_name = match current.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}.{}", name, ext),
        None => name,
    };

    match current.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}
