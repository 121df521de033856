//! HTML pages
//!
//! Server-rendered views over the same services the JSON API uses. Missing
//! or hidden content renders the 404 page; any other failure the 500 page.

use axum::{
    extract::{OriginalUri, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use tera::Context as TeraContext;

use crate::api::middleware::{AppState, MaybeUser};
use crate::api::responses::PageQuery;
use crate::services::PostServiceError;
use crate::theme::{PageVars, NOT_FOUND_TEMPLATE};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/posts/{id}/", get(post_detail))
        .route("/category/{slug}/", get(category_posts))
        .route("/profile/{username}/", get(profile))
        .route("/pages/about/", get(about))
        .route("/pages/rules/", get(rules))
}

#[derive(Debug)]
enum PageError {
    NotFound,
    Internal(String),
}

impl From<PostServiceError> for PageError {
    fn from(e: PostServiceError) -> Self {
        match e {
            PostServiceError::NotFound(_) => PageError::NotFound,
            other => PageError::Internal(format!("{:#}", other)),
        }
    }
}

fn page_vars(state: &AppState, uri: &OriginalUri, user: &MaybeUser) -> PageVars {
    PageVars::new(uri.0.path(), user.0.as_ref(), state.clock.now())
}

/// Render `template`, or the matching error page
fn respond(state: &AppState, vars: &PageVars, result: Result<(&str, TeraContext), PageError>) -> Response {
    let Ok(engine) = state.theme_engine.read() else {
        tracing::error!("Template engine lock poisoned");
        return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response();
    };

    let (template, context) = match result {
        Ok(page) => page,
        Err(PageError::NotFound) => {
            let html = engine
                .render(NOT_FOUND_TEMPLATE, &vars.context())
                .unwrap_or_else(|_| engine.render_server_error(&vars.context()));
            return (StatusCode::NOT_FOUND, Html(html)).into_response();
        }
        Err(PageError::Internal(message)) => {
            tracing::error!("Failed to build page {}: {}", vars.request_path, message);
            let html = engine.render_server_error(&vars.context());
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response();
        }
    };

    match engine.render(template, &context) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::warn!("Failed to render template '{}': {:#}", template, e);
            let html = engine.render_server_error(&vars.context());
            (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response()
        }
    }
}

async fn index(
    State(state): State<AppState>,
    user: MaybeUser,
    uri: OriginalUri,
    query: PageQuery,
) -> Response {
    let vars = page_vars(&state, &uri, &user);
    let result = async {
        let page = state.post_service.list_index(user.actor(), query.request()).await?;
        let mut context = vars.context();
        context.insert("page", &page);
        Ok::<_, PageError>(("blog/index.html", context))
    }
    .await;
    respond(&state, &vars, result)
}

async fn post_detail(
    State(state): State<AppState>,
    user: MaybeUser,
    uri: OriginalUri,
    Path(id): Path<String>,
) -> Response {
    let vars = page_vars(&state, &uri, &user);
    let result = async {
        let id: i64 = id.parse().map_err(|_| PageError::NotFound)?;
        let detail = state.post_service.get_detail(id, user.actor()).await?;
        let mut context = vars.context();
        context.insert("post", &detail.post);
        context.insert("comments", &detail.comments);
        context.insert("comment_count", &detail.comment_count);
        Ok::<_, PageError>(("blog/detail.html", context))
    }
    .await;
    respond(&state, &vars, result)
}

async fn category_posts(
    State(state): State<AppState>,
    user: MaybeUser,
    uri: OriginalUri,
    Path(slug): Path<String>,
    query: PageQuery,
) -> Response {
    let vars = page_vars(&state, &uri, &user);
    let result = async {
        let (category, page) = state
            .post_service
            .list_by_category(&slug, user.actor(), query.request())
            .await?;
        let mut context = vars.context();
        context.insert("category", &category);
        context.insert("page", &page);
        Ok::<_, PageError>(("blog/category.html", context))
    }
    .await;
    respond(&state, &vars, result)
}

async fn profile(
    State(state): State<AppState>,
    user: MaybeUser,
    uri: OriginalUri,
    Path(username): Path<String>,
    query: PageQuery,
) -> Response {
    let vars = page_vars(&state, &uri, &user);
    let result = async {
        let (profile, page) = state
            .post_service
            .list_by_profile(&username, user.actor(), query.request())
            .await?;
        let mut context = vars.context();
        context.insert("profile", &profile);
        context.insert("page", &page);
        Ok::<_, PageError>(("blog/profile.html", context))
    }
    .await;
    respond(&state, &vars, result)
}

async fn about(State(state): State<AppState>, user: MaybeUser, uri: OriginalUri) -> Response {
    let vars = page_vars(&state, &uri, &user);
    let context = vars.context();
    respond(&state, &vars, Ok(("pages/about.html", context)))
}

async fn rules(State(state): State<AppState>, user: MaybeUser, uri: OriginalUri) -> Response {
    let vars = page_vars(&state, &uri, &user);
    let context = vars.context();
    respond(&state, &vars, Ok(("pages/rules.html", context)))
}

/// Fallback for unknown paths
pub async fn not_found(State(state): State<AppState>, user: MaybeUser, uri: OriginalUri) -> Response {
    let vars = page_vars(&state, &uri, &user);
    respond(&state, &vars, Err(PageError::NotFound))
}
