//! Server-rendered pages

mod common;

use axum::http::{header, StatusCode};
use common::{post_body, spawn_app, start};
use serde_json::json;

#[tokio::test]
async fn test_index_lists_visible_posts() {
    let app = spawn_app().await;
    let admin = app.register("admin").await;
    let news = app.create_category(&admin, "news", true).await;
    let post = app.create_post(&admin, post_body("Visible <b>title</b>", news, 1)).await;
    app.create_post(
        &admin,
        json!({
            "title": "From the future",
            "text": "Soon",
            "category_id": news,
            "pub_date": (start() + chrono::Duration::days(1)).to_rfc3339(),
        }),
    )
    .await;

    let response = app.server.get("/").await;
    response.assert_status_ok();
    let content_type = response.header(header::CONTENT_TYPE);
    assert!(content_type.to_str().unwrap().starts_with("text/html"));

    let html = response.text();
    assert!(html.contains("Visible &lt;b&gt;title&lt;&#x2F;b&gt;"));
    assert!(html.contains(&format!("/posts/{}/", post)));
    assert!(!html.contains("From the future"));
}

#[tokio::test]
async fn test_index_paginates() {
    let app = spawn_app().await;
    let admin = app.register("admin").await;
    let news = app.create_category(&admin, "news", true).await;
    for i in 0..11 {
        app.create_post(&admin, post_body(&format!("Entry {}", i), news, i + 1)).await;
    }

    let first = app.server.get("/").await.text();
    assert!(first.contains("Page 1 of 2"));
    assert!(first.contains("Entry 0"));
    assert!(!first.contains("Entry 10"));

    let last = app.server.get("/").add_query_param("page", 99999).await.text();
    assert!(last.contains("Page 2 of 2"));
    assert!(last.contains("Entry 10"));

    let repeated = app.server.get("/?page=1&page=2").await;
    repeated.assert_status_ok();
    assert!(repeated.text().contains("Page 2 of 2"));

    let garbage = app.server.get("/category/news/?page=x&page=y").await;
    garbage.assert_status_ok();
    assert!(garbage.text().contains("Page 1 of 2"));
}

#[tokio::test]
async fn test_detail_page() {
    let app = spawn_app().await;
    let admin = app.register("admin").await;
    let news = app.create_category(&admin, "news", true).await;
    let post = app
        .create_post(
            &admin,
            json!({ "title": "Two lines", "text": "first\nsecond", "category_id": news }),
        )
        .await;

    let response = app.server.get(&format!("/posts/{}/", post)).await;
    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("Two lines"));
    assert!(html.contains("first<br>second"));
}

#[tokio::test]
async fn test_hidden_post_renders_not_found_page() {
    let app = spawn_app().await;
    let admin = app.register("admin").await;
    let news = app.create_category(&admin, "news", true).await;
    let mut draft = post_body("Secret draft", news, 1);
    draft["is_published"] = json!(false);
    let post = app.create_post(&admin, draft).await;

    let response = app.server.get(&format!("/posts/{}/", post)).await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert!(!response.text().contains("Secret draft"));

    // The author signed in through the cookie still sees it
    let response = app
        .server
        .get(&format!("/posts/{}/", post))
        .add_header(header::COOKIE, format!("session={}", admin))
        .await;
    response.assert_status_ok();
    assert!(response.text().contains("Secret draft"));
}

#[tokio::test]
async fn test_category_and_profile_pages() {
    let app = spawn_app().await;
    let admin = app.register("admin").await;
    let news = app.create_category(&admin, "news", true).await;
    app.create_category(&admin, "hidden", false).await;
    app.create_post(&admin, post_body("In the news", news, 1)).await;

    let category = app.server.get("/category/news/").await;
    category.assert_status_ok();
    assert!(category.text().contains("In the news"));

    app.server
        .get("/category/hidden/")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let profile = app.server.get("/profile/admin/").await;
    profile.assert_status_ok();
    assert!(profile.text().contains("In the news"));

    app.server
        .get("/profile/nobody/")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_static_pages_and_unknown_paths() {
    let app = spawn_app().await;

    app.server.get("/pages/about/").await.assert_status_ok();
    app.server.get("/pages/rules/").await.assert_status_ok();

    let response = app.server.get("/no/such/page").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert!(response.text().contains("Page not found"));

    for path in ["/posts/abc/", "/posts/99999999999999999999/", "/posts/-1/"] {
        let response = app.server.get(path).await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert!(response.text().contains("Page not found"));
    }
}
