//! Tag suggestions from a destination's synchronized categories

use micropress_core::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

/// Categories for `blog_id` that are not already in `excluding`, sorted.
///
/// The `"default"` destination suggests the union of every synchronized
/// destination's categories.
pub fn tag_suggestions(
    categories: &BTreeMap<String, Vec<String>>,
    blog_id: &str,
    excluding: &TagList,
) -> Vec<String> {
    let pool: Box<dyn Iterator<Item = &String>> = if blog_id == DEFAULT_BLOG_ID {
        Box::new(categories.values().flatten())
    } else {
        Box::new(categories.get(blog_id).into_iter().flatten())
    };

    pool.map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty() && !excluding.contains(tag))
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
