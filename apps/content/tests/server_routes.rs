use alasr_content::{
    config::{GatewayConfig, SiteConfig},
    gateway::ContentApi,
    server::{AppState, serve},
};
use mockito::{Matcher, Server, ServerGuard};
use reqwest::StatusCode;
use serde_json::Value;
use tokio::{net::TcpListener, sync::oneshot};

const POSTS_BODY: &str = r#"{ "data": { "posts": { "nodes": [
    { "id": "1", "slug": "moon-sighting", "title": "Moon sighting", "date": "2024-04-08T18:00:00",
      "modified": "2024-04-08T19:00:00", "categories": { "nodes": [ { "slug": "calendar", "name": "Calendar" } ] } },
    { "id": "2", "slug": "friday-khutbah", "title": "Friday khutbah", "date": "2024-04-05T12:00:00",
      "modified": null, "categories": { "nodes": [ { "slug": "daily-post", "name": "Daily Post" } ] } },
    { "id": "3", "slug": "eid-mubarak", "title": "Eid Mubarak", "date": "2024-04-10T08:00:00",
      "modified": null, "categories": { "nodes": [ { "slug": "calendar", "name": "Calendar" } ] } }
] } } }"#;

const CATEGORIES_BODY: &str = r#"{ "data": { "categories": { "nodes": [
    { "id": "c1", "slug": "calendar", "name": "Calendar", "count": 2, "parent": null },
    { "id": "c2", "slug": "daily-post", "name": "Daily Post", "count": 1,
      "parent": { "node": { "id": "c1" } } }
] } } }"#;

struct TestApp {
    base: String,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn spawn_app(backend: &ServerGuard) -> TestApp {
    let api = ContentApi::new(&GatewayConfig {
        endpoint: backend.url(),
        max_retries: 0,
        timeout_secs: 5,
        ..GatewayConfig::default()
    })
    .unwrap();
    let site = SiteConfig {
        base_url: "https://al-asr.centers.pk".to_string(),
        ..SiteConfig::default()
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(serve(listener, AppState::new(api, site), async move {
        let _ = rx.await;
    }));

    TestApp {
        base: format!("http://{addr}"),
        shutdown: Some(tx),
    }
}

async fn mock_query(backend: &mut ServerGuard, operation: &str, body: &str) -> mockito::Mock {
    backend
        .mock("POST", "/")
        .match_body(Matcher::Regex(operation.to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

#[tokio::test]
async fn posts_listing_filters_by_category() {
    let mut backend = Server::new_async().await;
    let _posts = mock_query(&mut backend, "GetPosts", POSTS_BODY).await;
    let app = spawn_app(&backend).await;

    let url = format!("{}/api/posts?category=calendar&exclude=eid-mubarak", app.base);
    let body: Value = reqwest::get(url)
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["category"], "calendar");
    assert_eq!(body["count"], 1);
    assert_eq!(body["posts"][0]["slug"], "moon-sighting");

    let body: Value = reqwest::get(format!("{}/api/posts?category=ALL", app.base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["category"], "all");
    assert_eq!(body["count"], 3);
}

#[tokio::test]
async fn categories_listing_is_a_tree_with_stats() {
    let mut backend = Server::new_async().await;
    let _categories = mock_query(&mut backend, "GetAllCategories", CATEGORIES_BODY).await;
    let app = spawn_app(&backend).await;

    let body: Value = reqwest::get(format!("{}/api/categories", app.base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["categories"].as_array().unwrap().len(), 1);
    assert_eq!(body["categories"][0]["slug"], "calendar");
    assert_eq!(body["categories"][0]["children"][0]["slug"], "daily-post");
    assert_eq!(body["stats"]["rootCount"], 1);
}

#[tokio::test]
async fn category_page_finds_nested_categories() {
    let mut backend = Server::new_async().await;
    let _posts = mock_query(&mut backend, "GetPosts", POSTS_BODY).await;
    let _categories = mock_query(&mut backend, "GetAllCategories", CATEGORIES_BODY).await;
    let app = spawn_app(&backend).await;

    let response = reqwest::get(format!("{}/api/categories/daily-post", app.base))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["category"]["name"], "Daily Post");
    assert_eq!(body["postCount"], 1);
    assert_eq!(body["posts"][0]["slug"], "friday-khutbah");

    let missing = reqwest::get(format!("{}/api/categories/unknown", app.base))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn failed_backend_renders_empty_listing() {
    let mut backend = Server::new_async().await;
    let _failing = backend
        .mock("POST", "/")
        .with_status(502)
        .with_body("bad gateway")
        .create_async()
        .await;
    let app = spawn_app(&backend).await;

    let response = reqwest::get(format!("{}/api/posts", app.base)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["count"], 0);

    let health = reqwest::get(format!("{}/health", app.base)).await.unwrap();
    assert_eq!(health.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn sitemap_and_robots() {
    let mut backend = Server::new_async().await;
    let _sitemap_posts = mock_query(
        &mut backend,
        "GetPostsForSitemap",
        r#"{ "data": { "posts": { "nodes": [ { "slug": "moon-sighting", "date": "2024-04-08T18:00:00", "modified": null } ] } } }"#,
    )
    .await;
    let _sitemap_pages = mock_query(
        &mut backend,
        "GetPagesForSitemap",
        r#"{ "data": { "pages": { "nodes": [ { "slug": "about", "date": null, "modified": null }, { "slug": "feed", "date": null, "modified": null } ] } } }"#,
    )
    .await;
    let _sitemap_categories = mock_query(
        &mut backend,
        "GetCategoriesForSitemap",
        r#"{ "data": { "categories": { "nodes": [ { "slug": "calendar" } ] } } }"#,
    )
    .await;
    let app = spawn_app(&backend).await;

    let response = reqwest::get(format!("{}/sitemap.xml", app.base)).await.unwrap();
    assert!(
        response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("application/xml")
    );
    let xml = response.text().await.unwrap();
    assert!(xml.contains("<loc>https://al-asr.centers.pk</loc>"));
    assert!(xml.contains("<loc>https://al-asr.centers.pk/posts/moon-sighting</loc>"));
    assert!(xml.contains("<lastmod>2024-04-08T18:00:00Z</lastmod>"));
    assert!(xml.contains("<loc>https://al-asr.centers.pk/about</loc>"));
    assert!(!xml.contains("/feed</loc>"));
    assert!(xml.contains("<loc>https://al-asr.centers.pk/categories/calendar</loc>"));

    let robots = reqwest::get(format!("{}/robots.txt", app.base)).await.unwrap();
    assert_eq!(
        robots.headers()["cache-control"],
        "public, max-age=86400, s-maxage=86400"
    );
    assert!(
        robots
            .text()
            .await
            .unwrap()
            .contains("Sitemap: https://al-asr.centers.pk/sitemap.xml")
    );
}
