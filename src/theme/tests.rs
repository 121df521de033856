//! Tests for the template engine

use super::*;
use chrono::TimeZone;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn base_context() -> TeraContext {
    PageVars::new("/", None, now()).context()
}

fn empty_page() -> serde_json::Value {
    json!({
        "items": [],
        "page_number": 1,
        "page_count": 1,
        "total": 0,
        "has_next": false,
        "has_previous": false,
    })
}

fn post_json(id: i64, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "text": "Line one\nLine <two>",
        "image": null,
        "pub_date": "2024-05-31T10:00:00Z",
        "author_id": 1,
        "location_id": null,
        "category_id": 1,
        "is_published": true,
        "created_at": "2024-05-31T10:00:00Z",
        "author": { "id": 1, "username": "alice" },
        "category": { "id": 1, "title": "News", "slug": "news", "is_published": true },
        "location": null,
        "comment_count": 3,
    })
}

#[test]
fn test_embedded_templates_load() {
    let engine = ThemeEngine::embedded().unwrap();

    for name in [
        "base.html",
        "blog/index.html",
        "blog/detail.html",
        "blog/category.html",
        "blog/profile.html",
        "includes/paginator.html",
        "pages/about.html",
        "pages/rules.html",
        NOT_FOUND_TEMPLATE,
        SERVER_ERROR_TEMPLATE,
    ] {
        assert!(engine.has_template(name), "missing template {}", name);
    }
}

#[test]
fn test_render_index_with_posts() {
    let engine = ThemeEngine::embedded().unwrap();
    let mut context = base_context();
    let mut page = empty_page();
    page["items"] = json!([post_json(1, "Hello world")]);
    page["total"] = json!(1);
    context.insert("page", &page);

    let html = engine.render("blog/index.html", &context).unwrap();
    assert!(html.contains("Hello world"));
    assert!(html.contains("/posts/1/"));
    assert!(html.contains("Comments (3)"));
    assert!(html.contains("2024"));
}

#[test]
fn test_render_index_paginator() {
    let engine = ThemeEngine::embedded().unwrap();
    let mut context = base_context();
    context.insert(
        "page",
        &json!({
            "items": [],
            "page_number": 2,
            "page_count": 3,
            "total": 25,
            "has_next": true,
            "has_previous": true,
        }),
    );

    let html = engine.render("blog/index.html", &context).unwrap();
    assert!(html.contains("Page 2 of 3"));
    assert!(html.contains("?page=1"));
    assert!(html.contains("?page=3"));
}

#[test]
fn test_detail_escapes_text_and_keeps_line_breaks() {
    let engine = ThemeEngine::embedded().unwrap();
    let mut context = base_context();
    context.insert("post", &post_json(5, "Detail"));
    context.insert("comments", &Vec::<serde_json::Value>::new());
    context.insert("comment_count", &0);

    let html = engine.render("blog/detail.html", &context).unwrap();
    assert!(html.contains("Line one<br>Line &lt;two&gt;"));
    assert!(html.contains("No comments yet."));
}

#[test]
fn test_current_user_in_navigation() {
    let engine = ThemeEngine::embedded().unwrap();
    let user = User::new("bob".into(), String::new(), "hash".into(), crate::models::UserRole::Author);
    let mut context = PageVars::new("/", Some(&user), now()).context();
    context.insert("page", &empty_page());

    let html = engine.render("blog/index.html", &context).unwrap();
    assert!(html.contains("/profile/bob/"));
    assert!(html.contains("Nothing has been published yet."));
}

#[test]
fn test_render_unknown_template() {
    let engine = ThemeEngine::embedded().unwrap();
    let err = engine.render("nope.html", &base_context()).unwrap_err();
    assert!(err.to_string().contains("nope.html"));
}

#[test]
fn test_render_with_fallback_uses_error_page() {
    let engine = ThemeEngine::embedded().unwrap();

    // blog/index.html needs `page`; without it the 500 page is returned.
    let html = engine.render_with_fallback("blog/index.html", &base_context());
    assert!(html.contains("Server error"));
}

#[test]
fn test_override_directory_replaces_and_adds() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("pages")).unwrap();
    fs::write(
        dir.path().join("pages/about.html"),
        r#"{% extends "base.html" %}{% block content %}Custom about{% endblock content %}"#,
    )
    .unwrap();
    fs::write(dir.path().join("pages/extra.html"), "Extra page").unwrap();

    let engine = ThemeEngine::new(dir.path()).unwrap();

    let about = engine.render("pages/about.html", &base_context()).unwrap();
    assert!(about.contains("Custom about"));
    assert!(about.contains("Blogicum"));
    assert_eq!(engine.render("pages/extra.html", &base_context()).unwrap(), "Extra page");
}

#[test]
fn test_missing_override_directory_is_fine() {
    let dir = TempDir::new().unwrap();
    let engine = ThemeEngine::new(&dir.path().join("does-not-exist")).unwrap();
    assert!(engine.has_template("blog/index.html"));
}

#[test]
fn test_broken_override_fails_to_load() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("broken.html"), "{% if %}").unwrap();

    assert!(ThemeEngine::new(dir.path()).is_err());
}

#[test]
fn test_reload_picks_up_new_files() {
    let dir = TempDir::new().unwrap();
    let mut engine = ThemeEngine::new(dir.path()).unwrap();
    assert!(!engine.has_template("late.html"));

    fs::write(dir.path().join("late.html"), "late").unwrap();
    engine.reload().unwrap();
    assert!(engine.has_template("late.html"));
}

#[test]
fn test_linebreaksbr_filter() {
    let out = linebreaksbr(&json!("a\r\nb\n<c>"), &HashMap::new()).unwrap();
    assert_eq!(out, json!("a<br>b<br>&lt;c&gt;"));
}
