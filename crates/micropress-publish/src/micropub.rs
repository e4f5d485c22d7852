//! Micropub publish requests.
//!
//! Posts go out as `application/x-www-form-urlencoded` entries; the
//! response carries the post's `url` and `preview` address.

use crate::draft::PublishDraft;
use micropress_core::prelude::*;
use serde::Deserialize;
use tracing::instrument;
use url::form_urlencoded;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";

/// Form body for a draft
pub fn publish_form(draft: &PublishDraft) -> String {
    let mut form = form_urlencoded::Serializer::new(String::new());
    form.append_pair("h", "entry");
    form.append_pair("name", draft.title());
    form.append_pair("content", draft.content());
    for tag in draft.tags().iter() {
        form.append_pair("category[]", tag);
    }
    form.append_pair("post-status", draft.visibility().as_str());

    if draft.destination() != DEFAULT_BLOG_ID && !draft.destination().is_empty() {
        form.append_pair("mp-destination", draft.destination());
    }

    let published = draft.formatted_scheduled_date();
    if !published.is_empty() {
        form.append_pair("published", &published);
    }

    form.finish()
}

/// Authenticated publish request for a draft
pub fn publish_request(endpoint: &str, token: &str, draft: &PublishDraft) -> HttpRequest {
    HttpRequest::post(endpoint, publish_form(draft))
        .bearer(token)
        .header("Content-Type", FORM_CONTENT_TYPE)
        .header("Accept", "application/json")
}

#[derive(Debug, Deserialize)]
struct PublishResponse {
    #[serde(default)]
    url: String,
    #[serde(default)]
    preview: String,
}

/// Read the outcome of a successful publish.
///
/// The post address comes from the JSON body, or from `Location` when the
/// body does not name one.
pub fn parse_publish_response(response: &HttpResponse) -> Result<PublishOutcome> {
    let body: Option<PublishResponse> = response.json().ok();
    let (url, preview) = body
        .map(|body| (body.url, body.preview))
        .unwrap_or_default();

    let url = if url.is_empty() {
        response
            .header("Location")
            .map(str::trim)
            .unwrap_or_default()
            .to_string()
    } else {
        url
    };

    if url.is_empty() {
        return Err(Error::publish_request(
            Some(response.status),
            "Response did not include the post URL",
        ));
    }

    Ok(PublishOutcome { url, preview })
}

/// Send the draft and return the published post's addresses.
///
/// Every failure comes back as [`Error::PublishRequest`].
#[instrument(skip(executor, token, draft), name = "publish_post")]
pub async fn publish(
    executor: &dyn RequestExecutor,
    endpoint: &str,
    token: &str,
    draft: &PublishDraft,
) -> Result<PublishOutcome> {
    let response = executor
        .execute(publish_request(endpoint, token, draft))
        .await
        .map_err(into_publish_failure)?;

    log::debug!("Publish response: {}", response.body_text);
    parse_publish_response(&response)
}

fn into_publish_failure(err: Error) -> Error {
    match err {
        Error::PublishRequest { .. } => err,
        Error::Http { status, body } => Error::publish_request(Some(status), body),
        other => Error::publish_request(other.status(), other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> PublishDraft {
        let mut draft = PublishDraft::new("Hello & welcome");
        draft.set_title("First post");
        draft.set_tags("swift, rust");
        draft.set_visibility(Visibility::Published);
        draft
    }

    fn pairs(form: &str) -> Vec<(String, String)> {
        form_urlencoded::parse(form.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_form_fields() {
        let fields = pairs(&publish_form(&draft()));
        let expected: Vec<(String, String)> = [
            ("h", "entry"),
            ("name", "First post"),
            ("content", "Hello & welcome"),
            ("category[]", "swift"),
            ("category[]", "rust"),
            ("post-status", "published"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(fields, expected);
    }

    #[test]
    fn test_destination_and_schedule_are_optional_fields() {
        let mut draft = draft();
        draft.set_destination("https://other.micro.blog/");
        draft.set_scheduled_date("2025-04-14T10:00:00Z");

        let fields = pairs(&publish_form(&draft));
        assert!(fields.contains(&(
            "mp-destination".to_string(),
            "https://other.micro.blog/".to_string()
        )));
        assert!(fields.contains(&(
            "published".to_string(),
            "2025-04-14T10:00:00.000Z".to_string()
        )));
    }

    #[test]
    fn test_request_headers() {
        let request = publish_request("https://micro.blog/micropub", "tok", &draft());
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.header_value("authorization"), Some("Bearer tok"));
        assert_eq!(request.header_value("content-type"), Some(FORM_CONTENT_TYPE));
    }

    #[test]
    fn test_parse_response_body() {
        let response = HttpResponse::new(202)
            .with_body(r#"{"url":"https://x.blog/2025/04/14/my-post.html","preview":"https://x.blog/preview"}"#);
        let outcome = parse_publish_response(&response).unwrap();
        assert_eq!(outcome.url, "https://x.blog/2025/04/14/my-post.html");
        assert_eq!(outcome.preview, "https://x.blog/preview");
    }

    #[test]
    fn test_parse_response_location_fallback() {
        let response =
            HttpResponse::new(201).with_header("Location", "https://x.blog/2025/04/14/a.html");
        let outcome = parse_publish_response(&response).unwrap();
        assert_eq!(outcome.url, "https://x.blog/2025/04/14/a.html");
        assert_eq!(outcome.preview, "");
    }

    #[test]
    fn test_parse_response_without_url() {
        let err = parse_publish_response(&HttpResponse::new(200).with_body("{}")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PublishRequestFailure);
        assert_eq!(err.status(), Some(200));
    }

    #[test]
    fn test_failures_are_publish_errors() {
        let err = into_publish_failure(Error::http(401, "bad token"));
        assert_eq!(err.kind(), ErrorKind::PublishRequestFailure);
        assert_eq!(err.status(), Some(401));

        let err = into_publish_failure(Error::transport("timed out"));
        assert_eq!(err.kind(), ErrorKind::PublishRequestFailure);
        assert_eq!(err.status(), None);
        assert!(err.to_string().contains("timed out"));
    }
}
