//! Replace embedded image tokens with standard Markdown image links.

/// `![description](location)`
pub fn image_link(description: &str, location: &str) -> String {
    format!("![{}]({})", description, location)
}

/// Replace every exact occurrence of `token` in `text` with an image link.
///
/// Matching is plain substring matching, so `![[a.png]]` never touches
/// `![[a.png.png]]` or `![[aa.png]]`. Running it again once no occurrence
/// remains returns the text unchanged.
pub fn rewrite_reference(text: &str, token: &str, location: &str, description: &str) -> String {
    if token.is_empty() || !text.contains(token) {
        return text.to_string();
    }
    text.replace(token, &image_link(description, location))
}

/// Number of exact occurrences of `token` in `text`
pub fn occurrences(text: &str, token: &str) -> usize {
    if token.is_empty() {
        return 0;
    }
    text.matches(token).count()
}
