//! Embedded image parser: `![[photo.png]]`, `![[Scan 01.JPEG]]`

use micropress_core::EmbeddedReference;
use regex::{CaptureMatches, Regex};
use std::sync::LazyLock;

/// Image extensions recognized inside an embed, matched case-insensitively
pub const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "webp", "bmp"];

/// Matches `![[<name>.<image ext>]]`
static IMAGE_EMBED_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"(?i)!\[\[([^\]]+\.(?:{}))\]\]",
        IMAGE_EXTENSIONS.join("|")
    );
    Regex::new(&pattern).expect("valid embed pattern")
});

/// Lazy sequence of image embeds in a text, in document order.
///
/// Each match yields one [`EmbeddedReference`]; repeated embeds of the same
/// file are yielded once per occurrence.
pub struct References<'t> {
    inner: CaptureMatches<'static, 't>,
}

impl Iterator for References<'_> {
    type Item = EmbeddedReference;

    fn next(&mut self) -> Option<Self::Item> {
        let caps = self.inner.next()?;
        let raw_token = caps.get(0)?.as_str().to_string();
        let filename = caps.get(1)?.as_str().to_string();
        Some(EmbeddedReference {
            raw_token,
            filename,
        })
    }
}

/// Scan `text` for embedded image references.
///
/// Filenames are returned exactly as written: no case folding and no
/// whitespace trimming. Text without embeds yields an empty sequence.
pub fn extract_references(text: &str) -> References<'_> {
    References {
        inner: IMAGE_EMBED_PATTERN.captures_iter(text),
    }
}

/// Distinct referenced filenames in order of first appearance
pub fn unique_filenames(text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for reference in extract_references(text) {
        if !seen.contains(&reference.filename) {
            seen.push(reference.filename);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_embed() {
        let refs: Vec<_> = extract_references("See ![[photo.png]] here").collect();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].filename, "photo.png");
        assert_eq!(refs[0].raw_token, "![[photo.png]]");
    }

    #[test]
    fn test_all_extensions_case_insensitive() {
        let text = "![[a.PNG]] ![[b.jpg]] ![[c.JpEg]] ![[d.gif]] ![[e.webp]] ![[f.BMP]]";
        let names: Vec<_> = extract_references(text).map(|r| r.filename).collect();
        assert_eq!(names, vec!["a.PNG", "b.jpg", "c.JpEg", "d.gif", "e.webp", "f.BMP"]);
    }

    #[test]
    fn test_non_image_embeds_are_ignored() {
        let text = "![[Other Note]] ![[doc.pdf]] [[photo.png]] ![[clip.mp4]]";
        assert_eq!(extract_references(text).count(), 0);
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        assert_eq!(extract_references("").count(), 0);
        assert!(unique_filenames("").is_empty());
    }

    #[test]
    fn test_no_normalization() {
        let refs: Vec<_> = extract_references("![[ My Photo.png]]").collect();
        assert_eq!(refs[0].filename, " My Photo.png");
    }

    #[test]
    fn test_folder_embed() {
        let refs: Vec<_> = extract_references("![[attachments/img 1.jpeg]]").collect();
        assert_eq!(refs[0].filename, "attachments/img 1.jpeg");
    }

    #[test]
    fn test_duplicates_are_yielded_per_occurrence() {
        let text = "![[a.png]] then ![[b.png]] and ![[a.png]] again";
        assert_eq!(extract_references(text).count(), 3);
        assert_eq!(unique_filenames(text), vec!["a.png", "b.png"]);
    }

    #[test]
    fn test_sizing_suffix_is_not_an_image_embed() {
        assert_eq!(extract_references("![[photo.png|300]]").count(), 0);
    }

}
