//! Shared setup for HTTP tests
//!
//! Each test gets its own in-memory database, memory cache, embedded
//! templates, a temporary media directory and a clock frozen at `start()`.

#![allow(dead_code)]

use axum_test::TestServer;
use blogicum::api::{build_router, AppState};
use blogicum::cache::create_cache;
use blogicum::config::{CacheConfig, UploadConfig};
use blogicum::db::{create_test_pool, migrations};
use blogicum::policy::FixedClock;
use blogicum::theme::ThemeEngine;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub struct TestApp {
    pub server: TestServer,
    pub clock: Arc<FixedClock>,
    pub media: TempDir,
}

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub async fn spawn_app() -> TestApp {
    let pool = create_test_pool().await.expect("Failed to create test pool");
    migrations::run_migrations(&pool).await.expect("Failed to run migrations");
    let cache = create_cache(&CacheConfig::default()).await.unwrap();
    let media = TempDir::new().unwrap();
    let clock = Arc::new(FixedClock::new(start()));

    let upload = UploadConfig {
        path: media.path().to_path_buf(),
        ..UploadConfig::default()
    };
    let state = AppState::new(
        pool,
        cache,
        Duration::from_secs(60),
        ThemeEngine::embedded().unwrap(),
        upload,
        clock.clone(),
    );
    let router = build_router(state, "http://localhost:3000").unwrap();

    TestApp {
        server: TestServer::new(router).expect("Failed to create test server"),
        clock,
        media,
    }
}

impl TestApp {
    /// Register a user and return their session token
    pub async fn register(&self, username: &str) -> String {
        let response = self
            .server
            .post("/api/v1/auth/register")
            .json(&json!({ "username": username, "password": "correct-horse" }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<Value>()["token"].as_str().unwrap().to_string()
    }

    pub async fn create_category(&self, admin_token: &str, slug: &str, is_published: bool) -> i64 {
        let response = self
            .server
            .post("/api/v1/admin/categories")
            .authorization_bearer(admin_token)
            .json(&json!({
                "title": slug.to_uppercase(),
                "description": format!("All about {}", slug),
                "slug": slug,
                "is_published": is_published,
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<Value>()["id"].as_i64().unwrap()
    }

    /// Create a post and return its id
    pub async fn create_post(&self, token: &str, body: Value) -> i64 {
        let response = self
            .server
            .post("/api/v1/posts")
            .authorization_bearer(token)
            .json(&body)
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<Value>()["id"].as_i64().unwrap()
    }
}

/// Post body dated `hours_ago` before the test start
pub fn post_body(title: &str, category_id: i64, hours_ago: i64) -> Value {
    json!({
        "title": title,
        "text": format!("{} body", title),
        "category_id": category_id,
        "pub_date": (start() - chrono::Duration::hours(hours_ago)).to_rfc3339(),
    })
}
