//! Categories synchronized from each destination, used for tag suggestions

use micropress_core::prelude::*;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::instrument;
use url::Url;

/// Shown when synchronization fails
pub const CATEGORY_SYNC_FAILED: &str = "Error synchronizing categories";

#[derive(Debug, Deserialize)]
struct CategoryResponse {
    #[serde(default)]
    categories: Vec<String>,
}

/// `{endpoint}?q=category`, scoped with `mp-destination` unless `uid` is the
/// default destination
pub fn category_url(endpoint: &str, uid: &str) -> Result<String> {
    let mut url = Url::parse(endpoint).map_err(|e| {
        Error::config_error(format!("Invalid micropub endpoint '{}': {}", endpoint, e))
    })?;

    {
        let mut query = url.query_pairs_mut();
        query.append_pair("q", "category");
        if uid != DEFAULT_BLOG_ID {
            query.append_pair("mp-destination", uid);
        }
    }

    Ok(url.into())
}

/// Query the categories of every destination in `blogs`.
///
/// With no known destinations the account's default blog is queried and
/// stored under `"default"`. Destinations are queried one after another;
/// the first failure aborts the sync.
#[instrument(skip(executor, token, blogs), fields(blogs = blogs.len()), name = "fetch_categories")]
pub async fn fetch_categories(
    executor: &dyn RequestExecutor,
    endpoint: &str,
    token: &str,
    blogs: &BTreeMap<String, String>,
) -> Result<BTreeMap<String, Vec<String>>> {
    let uids: Vec<&str> = if blogs.is_empty() {
        vec![DEFAULT_BLOG_ID]
    } else {
        blogs.keys().map(String::as_str).collect()
    };

    let mut synchronized = BTreeMap::new();
    for uid in uids {
        let request = HttpRequest::get(category_url(endpoint, uid)?)
            .bearer(token)
            .header("Accept", "application/json");

        let response = executor.execute(request).await?;
        let body: CategoryResponse = response.json()?;

        let categories: Vec<String> = body
            .categories
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();

        log::debug!("{} categories for {}", categories.len(), uid);
        synchronized.insert(uid.to_string(), categories);
    }

    Ok(synchronized)
}

/// Distinct categories across all destinations
pub fn category_count(categories: &BTreeMap<String, Vec<String>>) -> usize {
    categories.values().flatten().collect::<BTreeSet<_>>().len()
}

/// Notice reported after a successful sync
pub fn synchronized_notice(categories: &BTreeMap<String, Vec<String>>) -> String {
    format!(
        "Categories synchronized. Found {} categories in {} blog(s).",
        category_count(categories),
        categories.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Answers each category query from a per-destination table
    struct CategoryServer {
        by_destination: BTreeMap<String, String>,
        seen: Mutex<Vec<String>>,
    }

    impl CategoryServer {
        fn new(entries: &[(&str, &str)]) -> Self {
            Self {
                by_destination: entries
                    .iter()
                    .map(|(uid, body)| (uid.to_string(), body.to_string()))
                    .collect(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RequestExecutor for CategoryServer {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
            self.seen.lock().unwrap().push(request.url.clone());

            let url = Url::parse(&request.url).unwrap();
            let uid = url
                .query_pairs()
                .find(|(k, _)| k == "mp-destination")
                .map(|(_, v)| v.into_owned())
                .unwrap_or_else(|| DEFAULT_BLOG_ID.to_string());

            match self.by_destination.get(&uid) {
                Some(body) => Ok(HttpResponse::new(200).with_body(body.clone())),
                None => Err(Error::http(404, "unknown destination")),
            }
        }
    }

    fn blogs(uids: &[&str]) -> BTreeMap<String, String> {
        uids.iter().map(|u| (u.to_string(), u.to_string())).collect()
    }

    #[test]
    fn test_category_url() {
        assert_eq!(
            category_url("https://micro.blog/micropub", DEFAULT_BLOG_ID).unwrap(),
            "https://micro.blog/micropub?q=category"
        );
        assert_eq!(
            category_url("https://micro.blog/micropub", "https://me.micro.blog/").unwrap(),
            "https://micro.blog/micropub?q=category&mp-destination=https%3A%2F%2Fme.micro.blog%2F"
        );
        assert!(category_url("not a url", DEFAULT_BLOG_ID).is_err());
    }

    #[tokio::test]
    async fn test_each_destination_is_queried() {
        let server = CategoryServer::new(&[
            ("https://a.micro.blog/", r#"{"categories": ["swift", " books ", ""]}"#),
            ("https://b.example/", r#"{"categories": ["swift", "photos"]}"#),
        ]);

        let synced = fetch_categories(
            &server,
            "https://micro.blog/micropub",
            "tok",
            &blogs(&["https://a.micro.blog/", "https://b.example/"]),
        )
        .await
        .unwrap();

        assert_eq!(synced["https://a.micro.blog/"], vec!["swift", "books"]);
        assert_eq!(synced["https://b.example/"], vec!["swift", "photos"]);
        assert_eq!(server.seen.lock().unwrap().len(), 2);
        assert_eq!(category_count(&synced), 3);
        assert_eq!(
            synchronized_notice(&synced),
            "Categories synchronized. Found 3 categories in 2 blog(s)."
        );
    }

    #[tokio::test]
    async fn test_no_destinations_queries_default() {
        let server = CategoryServer::new(&[(DEFAULT_BLOG_ID, r#"{"categories": ["rust"]}"#)]);

        let synced = fetch_categories(&server, "https://micro.blog/micropub", "tok", &BTreeMap::new())
            .await
            .unwrap();

        assert_eq!(synced.len(), 1);
        assert_eq!(synced[DEFAULT_BLOG_ID], vec!["rust"]);
        assert_eq!(
            server.seen.lock().unwrap()[0],
            "https://micro.blog/micropub?q=category"
        );
    }

    #[tokio::test]
    async fn test_failing_destination_fails_the_sync() {
        let server = CategoryServer::new(&[("https://a.micro.blog/", r#"{"categories": []}"#)]);

        let err = fetch_categories(
            &server,
            "https://micro.blog/micropub",
            "tok",
            &blogs(&["https://a.micro.blog/", "https://gone.example/"]),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Http { status: 404, .. }));
    }
}
