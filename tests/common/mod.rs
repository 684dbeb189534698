#![allow(dead_code)]

use axum_test::TestServer;
use serde_json::{Value, json};
use std::sync::Arc;
use snaplink::infrastructure::cache::{CacheService, NullCache};
use snaplink::infrastructure::memory::MemoryStore;
use snaplink::routes::build_router;
use snaplink::state::{AppState, Backends, ServiceSettings};

pub const BASE_URL: &str = "http://localhost:3000";
pub const PASSWORD: &str = "correct-horse-42";

pub struct TestApp {
    pub server: TestServer,
    pub store: MemoryStore,
    pub state: AppState,
}

pub fn test_settings() -> ServiceSettings {
    ServiceSettings::new(BASE_URL, "test-signing-secret")
}

pub fn create_test_state(store: &MemoryStore, cache: Arc<dyn CacheService>) -> AppState {
    AppState::new(Backends::memory(store), cache, &test_settings())
}

pub fn test_app() -> TestApp {
    test_app_with_cache(Arc::new(NullCache))
}

pub fn test_app_with_cache(cache: Arc<dyn CacheService>) -> TestApp {
    let store = MemoryStore::new();
    let state = create_test_state(&store, cache);
    let server = TestServer::new(build_router(state.clone())).unwrap();

    TestApp {
        server,
        store,
        state,
    }
}

pub async fn register(server: &TestServer, email: &str) -> Value {
    let response = server
        .post("/api/auth/register")
        .json(&json!({ "email": email, "password": PASSWORD }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()
}

/// Registers `email` and logs in, returning the token response.
pub async fn register_and_login(server: &TestServer, email: &str) -> Value {
    register(server, email).await;

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": email, "password": PASSWORD }))
        .await;
    response.assert_status_ok();
    response.json::<Value>()
}

pub async fn shorten(server: &TestServer, url: &str) -> Value {
    let response = server
        .post("/api/shorten")
        .json(&json!({ "url": url }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()
}
