mod common;

use async_trait::async_trait;
use axum::http::StatusCode;
use snaplink::infrastructure::cache::CacheService;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[tokio::test]
async fn test_redirect_success() {
    let app = common::test_app();
    let created = common::shorten(&app.server, "https://example.com/target").await;
    let code = created["code"].as_str().unwrap();

    let response = app.server.get(&format!("/{code}")).await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.header("location"), "https://example.com/target");
}

#[tokio::test]
async fn test_redirect_not_found() {
    let app = common::test_app();

    let response = app.server.get("/nonexistent").await;

    response.assert_status_not_found();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["code"], "RESOURCE_NOT_FOUND");
}

#[tokio::test]
async fn test_redirect_malformed_code_is_not_found() {
    let app = common::test_app();

    let response = app.server.get("/bad-code!").await;

    response.assert_status_not_found();
}

#[derive(Default)]
struct RecordingCache {
    entries: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl CacheService for RecordingCache {
    async fn get_target(&self, code: &str) -> Option<String> {
        self.entries.lock().unwrap().get(code).cloned()
    }

    async fn put_target(&self, code: &str, url: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(code.to_string(), url.to_string());
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "recording"
    }
}

#[tokio::test]
async fn test_redirect_served_from_cache() {
    let cache = Arc::new(RecordingCache::default());
    cache
        .put_target("cached1", "https://cached.example.com/")
        .await;

    let app = common::test_app_with_cache(cache);

    let response = app.server.get("/cached1").await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.header("location"), "https://cached.example.com/");
}

#[tokio::test]
async fn test_redirect_populates_cache() {
    let cache = Arc::new(RecordingCache::default());
    let app = common::test_app_with_cache(cache.clone());
    let created = common::shorten(&app.server, "https://example.com/warm").await;
    let code = created["code"].as_str().unwrap();

    app.server
        .get(&format!("/{code}"))
        .await
        .assert_status(StatusCode::TEMPORARY_REDIRECT);

    for _ in 0..50 {
        if cache.get_target(code).await.is_some() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    assert_eq!(
        cache.get_target(code).await.as_deref(),
        Some("https://example.com/warm")
    );
}


#[tokio::test]
async fn test_url_with_embedded_newline_is_rejected_not_stored() {
    let app = common::test_app();

    let response = app
        .server
        .post("/api/shorten")
        .json(&serde_json::json!({ "url": "https://example.com/a\nb" }))
        .await;

    response.assert_status_bad_request();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["code"], "INVALID_URL");
    assert!(json["message"].as_str().unwrap().starts_with("Invalid Url: "));
    assert_eq!(app.store.short_url_count(), 0);
}

#[tokio::test]
async fn test_every_accepted_url_redirects() {
    let app = common::test_app();

    for target in [
        "https://example.com/a%20b?q=1#frag",
        "http://EXAMPLE.com:8080/Path",
        "https://example.com",
    ] {
        let created = common::shorten(&app.server, target).await;
        let code = created["code"].as_str().unwrap();

        let response = app.server.get(&format!("/{code}")).await;

        response.assert_status(StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.header("location"), target);
    }
}
