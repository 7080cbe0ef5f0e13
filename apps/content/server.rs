//! HTTP surface: JSON content API, sitemap and robots file.
//!
//! Every request fetches fresh data from the gateway. Gateway failures
//! degrade to empty listings; only `/health` reports them as an error.

use crate::{
    config::SiteConfig,
    filter::{CategorySelection, filter_posts},
    gateway::{ContentApi, Fetched},
    hierarchy::{HierarchyStats, find_category},
    models::{categories::CategoryNode, posts::Post},
    robots::{ROBOTS_CACHE_CONTROL, render_robots},
    sitemap::{SitemapSources, build_sitemap, render_sitemap_xml},
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::{future::Future, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};
use utils::errors::GATEWAY_UNHEALTHY;

#[derive(Clone)]
pub struct AppState {
    api: Arc<ContentApi>,
    site: Arc<SiteConfig>,
}

impl AppState {
    pub fn new(api: ContentApi, site: SiteConfig) -> Self {
        Self {
            api: Arc::new(api),
            site: Arc::new(site),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/posts", get(list_posts))
        .route("/api/posts/{slug}", get(get_post))
        .route("/api/featured", get(featured_posts))
        .route("/api/categories", get(list_categories))
        .route("/api/categories/{slug}", get(get_category))
        .route("/sitemap.xml", get(sitemap))
        .route("/robots.txt", get(robots))
        .with_state(state)
}

pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(address = %addr, "Starting content server");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

#[derive(Debug, Deserialize, Default)]
pub struct PostsQuery {
    pub category: Option<String>,
    pub exclude: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct FeaturedQuery {
    pub limit: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PostsPayload<'a> {
    category: String,
    count: usize,
    posts: Vec<&'a Post>,
}

#[derive(Serialize)]
struct CategoriesPayload<'a> {
    stats: HierarchyStats,
    categories: &'a [CategoryNode],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CategoryPayload<'a> {
    category: &'a CategoryNode,
    post_count: usize,
    posts: Vec<&'a Post>,
}

async fn health(State(state): State<AppState>) -> Response {
    match state.api.health().await {
        Fetched::Ready(true) => (StatusCode::OK, "OK").into_response(),
        Fetched::Ready(false) => {
            (StatusCode::SERVICE_UNAVAILABLE, GATEWAY_UNHEALTHY).into_response()
        }
        Fetched::Failed(e) => {
            (StatusCode::SERVICE_UNAVAILABLE, format!("{GATEWAY_UNHEALTHY}: {e}")).into_response()
        }
    }
}

async fn list_posts(State(state): State<AppState>, Query(query): Query<PostsQuery>) -> Response {
    let posts = state.api.posts().await.into_inner_or_default();
    let selection = CategorySelection::from(query.category.as_deref());
    let visible = filter_posts(&posts, &selection, query.exclude.as_deref());

    Json(PostsPayload {
        category: selection.to_string(),
        count: visible.len(),
        posts: visible,
    })
    .into_response()
}

async fn get_post(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    match state.api.post(&slug).await.into_inner_or_default() {
        Some(post) => Json(post).into_response(),
        None => (StatusCode::NOT_FOUND, format!("post `{slug}` not found")).into_response(),
    }
}

async fn featured_posts(
    State(state): State<AppState>,
    Query(query): Query<FeaturedQuery>,
) -> Response {
    let limit = query.limit.unwrap_or(state.site.featured_limit);
    let posts = state.api.featured_posts(limit).await.into_inner_or_default();
    Json(posts).into_response()
}

async fn list_categories(State(state): State<AppState>) -> Response {
    let categories = state.api.categories().await.into_inner_or_default();
    Json(CategoriesPayload {
        stats: HierarchyStats::from_roots(&categories),
        categories: &categories,
    })
    .into_response()
}

async fn get_category(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    let (posts, categories) = tokio::join!(state.api.posts(), state.api.categories());
    let posts = posts.into_inner_or_default();
    let categories = categories.into_inner_or_default();

    let Some(category) = find_category(&categories, &slug) else {
        warn!(category = %slug, "Category not found in categories list");
        return (StatusCode::NOT_FOUND, format!("category `{slug}` not found")).into_response();
    };

    let selection = CategorySelection::Category(slug.clone());
    let visible = filter_posts(&posts, &selection, None);
    Json(CategoryPayload {
        category,
        post_count: visible.len(),
        posts: visible,
    })
    .into_response()
}

async fn sitemap(State(state): State<AppState>) -> Response {
    let (posts, pages, categories) = tokio::join!(
        state.api.sitemap_posts(),
        state.api.sitemap_pages(),
        state.api.sitemap_categories()
    );
    let sources = SitemapSources {
        posts: posts.into_inner_or_default(),
        pages: pages.into_inner_or_default(),
        categories: categories.into_inner_or_default(),
    };

    let entries = build_sitemap(
        &state.site.base_url,
        &sources,
        &state.site.excluded_page_slugs,
        Utc::now().naive_utc(),
    );

    (
        [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
        render_sitemap_xml(&entries),
    )
        .into_response()
}

async fn robots(State(state): State<AppState>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, ROBOTS_CACHE_CONTROL),
        ],
        render_robots(&state.site.base_url),
    )
        .into_response()
}
