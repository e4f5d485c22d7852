//! End-to-end commands against a local mock Micro.blog

use micropress::*;
use mockito::Matcher;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

fn vault_with(note: &str) -> (TempDir, Arc<VaultManager>) {
    let temp = TempDir::new().expect("Failed to create temp dir");
    std::fs::write(temp.path().join("post.md"), note).unwrap();
    std::fs::write(temp.path().join("sunset_beach.png"), b"\x89PNG fake image").unwrap();
    let vault = Arc::new(VaultManager::new(temp.path()).unwrap());
    (temp, vault)
}

fn workspace(vault: Arc<VaultManager>, server: &mockito::ServerGuard) -> Workspace {
    let settings = Settings::builder()
        .app_token("app-token")
        .use_description_service(false)
        .synchronize_categories_on_open(false)
        .micropub_endpoint(format!("{}/micropub", server.url()))
        .media_endpoint(format!("{}/micropub/media", server.url()))
        .build()
        .unwrap();
    let executor = Arc::new(ReqwestExecutor::new(Duration::from_secs(5)).unwrap());
    Workspace::new(vault, settings, executor)
}

#[tokio::test]
async fn test_upload_command_rewrites_note() {
    let mut server = mockito::Server::new_async().await;
    let media = server
        .mock("POST", "/micropub/media")
        .match_header("authorization", "Bearer app-token")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data; boundary=".to_string()),
        )
        .with_status(202)
        .with_header("location", "https://cdn.micro.blog/sunset.png")
        .expect(1)
        .create_async()
        .await;

    let (_temp, vault) = vault_with("Evening ![[sunset_beach.png]] again ![[sunset_beach.png]]");
    let report = workspace(vault.clone(), &server)
        .upload(Path::new("post.md"))
        .await
        .unwrap();

    assert_eq!(report.status, UploadStatus::Completed);
    assert_eq!(report.succeeded().count(), 1);
    let text = vault.read_text(Path::new("post.md")).await.unwrap();
    assert_eq!(
        text,
        "Evening ![sunset beach](https://cdn.micro.blog/sunset.png) again ![sunset beach](https://cdn.micro.blog/sunset.png)"
    );
    media.assert_async().await;
}

#[tokio::test]
async fn test_upload_command_records_server_rejection() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/micropub/media")
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let (_temp, vault) = vault_with("![[sunset_beach.png]]");
    let report = workspace(vault.clone(), &server)
        .upload(Path::new("post.md"))
        .await
        .unwrap();

    assert_eq!(report.results[0].error, Some(ErrorKind::RequestFailure));
    assert_eq!(
        vault.read_text(Path::new("post.md")).await.unwrap(),
        "![[sunset_beach.png]]"
    );
}

#[tokio::test]
async fn test_publish_command_with_rename() {
    let mut server = mockito::Server::new_async().await;
    let publish = server
        .mock("POST", "/micropub")
        .match_header("authorization", "Bearer app-token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("h".to_string(), "entry".to_string()),
            Matcher::UrlEncoded("name".to_string(), "My post".to_string()),
            Matcher::UrlEncoded("category[]".to_string(), "swift".to_string()),
            Matcher::UrlEncoded("post-status".to_string(), "draft".to_string()),
        ]))
        .with_status(202)
        .with_header("content-type", "application/json")
        .with_body(r#"{"url":"https://x.blog/2025/04/14/my-post.html","preview":"https://x.blog/p/1"}"#)
        .create_async()
        .await;

    let (_temp, vault) = vault_with("---\ntitle: My post\n---\nHello there");
    let mut ws = workspace(vault.clone(), &server);
    ws.settings.rename_note_after_publish = true;

    let args = PublishArgs {
        suggest: vec!["swift".to_string(), "swift".to_string()],
        ..Default::default()
    };
    let outcome = ws.publish(Path::new("post.md"), args, None).await.unwrap();

    let SubmitOutcome::Published(published) = outcome else {
        panic!("expected the post to publish");
    };
    assert_eq!(published.preview, "https://x.blog/p/1");
    publish.assert_async().await;

    let renamed = Path::new("2025-04-14_my-post.md");
    assert!(vault.vault_path().join(renamed).exists());
    let text = vault.read_text(renamed).await.unwrap();
    assert!(text.starts_with("---\n"));
    assert!(text.contains("https://x.blog/2025/04/14/my-post.html"));
    assert!(text.ends_with("Hello there"));
}

#[tokio::test]
async fn test_publish_command_rejects_bad_date_without_request() {
    let mut server = mockito::Server::new_async().await;
    let publish = server
        .mock("POST", "/micropub")
        .expect(0)
        .create_async()
        .await;

    let (_temp, vault) = vault_with("Hello there");
    let args = PublishArgs {
        schedule: Some("not-a-date".to_string()),
        ..Default::default()
    };
    let outcome = workspace(vault, &server)
        .publish(Path::new("post.md"), args, None)
        .await
        .unwrap();

    assert!(matches!(outcome, SubmitOutcome::Rejected(_)));
    publish.assert_async().await;
}

#[tokio::test]
async fn test_destinations_are_saved() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", Matcher::Regex(r"^/micropub(\?|$)".to_string()))
        .match_query(Matcher::UrlEncoded("q".to_string(), "config".to_string()))
        .with_status(200)
        .with_body(r#"{"destination":[{"uid":"https://me.micro.blog/","name":"me.micro.blog"}]}"#)
        .create_async()
        .await;

    let (temp, vault) = vault_with("x");
    let config = default_config_path(temp.path());
    let mut ws = workspace(vault, &server).with_config_path(&config);

    let blogs = ws.refresh_destinations().await.unwrap();
    assert_eq!(blogs["https://me.micro.blog/"], "me.micro.blog");

    let saved = Settings::load(&config).await.unwrap();
    assert_eq!(saved.blogs, blogs);
}

#[tokio::test]
async fn test_commands_require_token() {
    let server = mockito::Server::new_async().await;
    let (_temp, vault) = vault_with("![[sunset_beach.png]]");
    let mut ws = workspace(vault, &server);
    ws.settings.app_token.clear();

    let err = ws.upload(Path::new("post.md")).await.unwrap_err();
    assert!(matches!(err, Error::ConfigError { .. }));
}

#[derive(Default)]
struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

#[tokio::test]
async fn test_categories_are_synchronized_per_blog() {
    let mut server = mockito::Server::new_async().await;
    let categories = server
        .mock("GET", Matcher::Regex(r"^/micropub(\?|$)".to_string()))
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".to_string(), "category".to_string()),
            Matcher::UrlEncoded("mp-destination".to_string(), "https://me.micro.blog/".to_string()),
        ]))
        .with_status(200)
        .with_body(r#"{"categories":["swift","books"]}"#)
        .expect(1)
        .create_async()
        .await;

    let (temp, vault) = vault_with("x");
    let config = default_config_path(temp.path());
    let notifier = Arc::new(RecordingNotifier::default());
    let mut ws = workspace(vault, &server)
        .with_config_path(&config)
        .with_notifier(notifier.clone());
    ws.settings.blogs.insert("https://me.micro.blog/".to_string(), "me".to_string());

    let synced = ws.synchronize_categories().await.unwrap();
    assert_eq!(synced["https://me.micro.blog/"], vec!["swift", "books"]);
    categories.assert_async().await;

    let saved = Settings::load(&config).await.unwrap();
    assert_eq!(saved.synchronized_categories, synced);
    assert_eq!(
        notifier.messages.lock().unwrap().as_slice(),
        ["Categories synchronized. Found 2 categories in 1 blog(s)."]
    );
}

#[tokio::test]
async fn test_category_sync_failure_is_reported() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", Matcher::Regex(r"^/micropub(\?|$)".to_string()))
        .match_query(Matcher::UrlEncoded("q".to_string(), "category".to_string()))
        .with_status(500)
        .create_async()
        .await;

    let (_temp, vault) = vault_with("x");
    let notifier = Arc::new(RecordingNotifier::default());
    let mut ws = workspace(vault, &server).with_notifier(notifier.clone());

    let err = ws.synchronize_categories().await.unwrap_err();
    assert!(matches!(err, Error::Http { status: 500, .. }));
    assert_eq!(
        notifier.messages.lock().unwrap().as_slice(),
        ["Error synchronizing categories"]
    );
}

#[tokio::test]
async fn test_publish_synchronizes_categories_on_open() {
    let mut server = mockito::Server::new_async().await;
    let categories = server
        .mock("GET", Matcher::Regex(r"^/micropub(\?|$)".to_string()))
        .match_query(Matcher::UrlEncoded("q".to_string(), "category".to_string()))
        .with_status(200)
        .with_body(r#"{"categories":["swift"]}"#)
        .expect(1)
        .create_async()
        .await;
    let publish = server
        .mock("POST", "/micropub")
        .match_body(Matcher::UrlEncoded("category[]".to_string(), "swift".to_string()))
        .with_status(202)
        .with_body(r#"{"url":"https://x.blog/2025/04/14/hi.html","preview":""}"#)
        .expect(1)
        .create_async()
        .await;

    let (_temp, vault) = vault_with("Hello there");
    let mut ws = workspace(vault, &server);
    ws.settings.synchronize_categories_on_open = true;

    let args = PublishArgs {
        suggest: vec!["swift".to_string()],
        ..Default::default()
    };
    let outcome = ws.publish(Path::new("post.md"), args, None).await.unwrap();

    assert!(outcome.is_published());
    assert_eq!(ws.settings.synchronized_categories["default"], vec!["swift"]);
    categories.assert_async().await;
    publish.assert_async().await;
}
