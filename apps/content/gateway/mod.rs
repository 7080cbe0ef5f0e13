use crate::{
    config::GatewayConfig,
    filter::{CategorySelection, retain_posts},
    hierarchy::build_category_hierarchy,
    models::{
        Connection,
        categories::{CategoriesData, Category, CategoryNode, WireCategory},
        pages::{PagesData, SettingsData, SitemapRecord, WireSitemapRecord},
        posts::{Post, PostData, PostsData, WirePost},
    },
};
use reqwest::{
    Client, StatusCode,
    header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT},
};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

pub mod queries;

const CLIENT_USER_AGENT: &str = "alasr-content/0.1 (+https://al-asr.centers.pk)";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest_middleware::Error),
    #[error("HTTP error {status}: {body}")]
    Http { status: StatusCode, body: String },
    #[error("failed to parse response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("GraphQL query failed: {}", .0.join("; "))]
    GraphQl(Vec<String>),
    #[error("response is missing `{0}`")]
    MissingData(&'static str),
}

/// Result of a gateway call.
///
/// Callers that only render content use [`Fetched::into_inner_or_default`] and
/// get an empty value on failure; tests and health checks can still tell a
/// legitimately empty result from a failed fetch.
#[derive(Debug)]
pub enum Fetched<T> {
    Ready(T),
    Failed(GatewayError),
}

impl<T> Fetched<T> {
    fn from_result(result: Result<T, GatewayError>, operation: &'static str) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(e) => {
                error!(operation, error = %e, "Content gateway request failed");
                Self::Failed(e)
            }
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn error(&self) -> Option<&GatewayError> {
        match self {
            Self::Ready(_) => None,
            Self::Failed(e) => Some(e),
        }
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Failed(_) => None,
        }
    }

    pub fn map<U, F>(self, f: F) -> Fetched<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Ready(value) => Fetched::Ready(f(value)),
            Self::Failed(e) => Fetched::Failed(e),
        }
    }
}

impl<T: Default> Fetched<T> {
    pub fn into_inner_or_default(self) -> T {
        self.ok().unwrap_or_default()
    }
}

#[derive(Deserialize, Debug)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlErrorMessage>>,
}

#[derive(Deserialize, Debug)]
struct GraphQlErrorMessage {
    message: String,
}

/// Client for the WordPress GraphQL endpoint.
pub struct ContentApi {
    client: ClientWithMiddleware,
    endpoint: String,
    posts_limit: u32,
    categories_limit: u32,
    pages_limit: u32,
    hide_empty_categories: bool,
}

impl ContentApi {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let inner = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(GatewayError::Client)?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(inner)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            posts_limit: config.posts_limit,
            categories_limit: config.categories_limit,
            pages_limit: config.pages_limit,
            hide_empty_categories: config.hide_empty_categories,
        })
    }

    pub fn new_with_endpoint(endpoint: impl Into<String>) -> Result<Self, GatewayError> {
        Self::new(&GatewayConfig {
            endpoint: endpoint.into(),
            ..GatewayConfig::default()
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Latest posts, in the order the backend returns them.
    #[instrument(name = "fetch_posts", skip(self))]
    pub async fn posts(&self) -> Fetched<Vec<Post>> {
        Fetched::from_result(self.fetch_posts().await, "posts")
    }

    /// A single post; `Ready(None)` when the slug is unknown.
    #[instrument(name = "fetch_post", skip(self))]
    pub async fn post(&self, slug: &str) -> Fetched<Option<Post>> {
        Fetched::from_result(self.fetch_post(slug).await, "post")
    }

    #[instrument(name = "fetch_categories_flat", skip(self))]
    pub async fn categories_flat(&self) -> Fetched<Vec<Category>> {
        Fetched::from_result(self.fetch_categories().await, "categories")
    }

    /// Categories arranged into their parent/child forest.
    #[instrument(name = "fetch_categories", skip(self))]
    pub async fn categories(&self) -> Fetched<Vec<CategoryNode>> {
        self.categories_flat().await.map(|flat| build_category_hierarchy(&flat))
    }

    #[instrument(name = "fetch_posts_by_category", skip(self))]
    pub async fn posts_by_category(&self, slug: &str) -> Fetched<Vec<Post>> {
        let selection = CategorySelection::Category(slug.to_string());
        self.posts().await.map(|mut posts| {
            retain_posts(&mut posts, &selection, None);
            info!(category = %slug, count = posts.len(), "Found posts for category");
            posts
        })
    }

    /// The first `limit` posts of [`ContentApi::posts`].
    #[instrument(name = "fetch_featured_posts", skip(self))]
    pub async fn featured_posts(&self, limit: usize) -> Fetched<Vec<Post>> {
        self.posts().await.map(|mut posts| {
            posts.truncate(limit);
            posts
        })
    }

    #[instrument(name = "fetch_sitemap_posts", skip(self))]
    pub async fn sitemap_posts(&self) -> Fetched<Vec<SitemapRecord>> {
        Fetched::from_result(self.fetch_sitemap_posts().await, "sitemap_posts")
    }

    #[instrument(name = "fetch_sitemap_pages", skip(self))]
    pub async fn sitemap_pages(&self) -> Fetched<Vec<SitemapRecord>> {
        Fetched::from_result(self.fetch_sitemap_pages().await, "sitemap_pages")
    }

    #[instrument(name = "fetch_sitemap_categories", skip(self))]
    pub async fn sitemap_categories(&self) -> Fetched<Vec<SitemapRecord>> {
        Fetched::from_result(self.fetch_sitemap_categories().await, "sitemap_categories")
    }

    /// `Ready(true)` when the backend answers with its general settings.
    #[instrument(name = "check_health", skip(self))]
    pub async fn health(&self) -> Fetched<bool> {
        Fetched::from_result(self.fetch_health().await, "health")
    }

    async fn fetch_posts(&self) -> Result<Vec<Post>, GatewayError> {
        let data: PostsData = self
            .fetch_graphql(queries::POSTS, json!({ "first": self.posts_limit }))
            .await?;
        let posts: Vec<Post> = data
            .posts
            .ok_or(GatewayError::MissingData("posts"))?
            .into_nodes()
            .into_iter()
            .filter_map(WirePost::into_post)
            .collect();

        info!(count = posts.len(), "Retrieved posts");
        Ok(posts)
    }

    async fn fetch_post(&self, slug: &str) -> Result<Option<Post>, GatewayError> {
        let data: PostData = self
            .fetch_graphql(queries::POST_BY_SLUG, json!({ "slug": slug }))
            .await?;
        match data.post.and_then(WirePost::into_post) {
            Some(post) => {
                info!(slug = %slug, title = %post.title, "Fetched post");
                Ok(Some(post))
            }
            None => {
                warn!(slug = %slug, "Post not found");
                Ok(None)
            }
        }
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, GatewayError> {
        let data: CategoriesData = self
            .fetch_graphql(
                queries::CATEGORIES,
                json!({
                    "first": self.categories_limit,
                    "hideEmpty": self.hide_empty_categories,
                }),
            )
            .await?;
        let categories: Vec<Category> = data
            .categories
            .ok_or(GatewayError::MissingData("categories"))?
            .into_nodes()
            .into_iter()
            .filter_map(WireCategory::into_category)
            .collect();

        info!(count = categories.len(), "Retrieved categories");
        Ok(categories)
    }

    async fn fetch_sitemap_posts(&self) -> Result<Vec<SitemapRecord>, GatewayError> {
        let data: PostsData<WireSitemapRecord> = self
            .fetch_graphql(queries::SITEMAP_POSTS, json!({ "first": self.posts_limit }))
            .await?;
        let connection = data.posts.ok_or(GatewayError::MissingData("posts"))?;
        Ok(sitemap_records(connection))
    }

    async fn fetch_sitemap_pages(&self) -> Result<Vec<SitemapRecord>, GatewayError> {
        let data: PagesData = self
            .fetch_graphql(queries::SITEMAP_PAGES, json!({ "first": self.pages_limit }))
            .await?;
        let connection = data.pages.ok_or(GatewayError::MissingData("pages"))?;
        Ok(sitemap_records(connection))
    }

    async fn fetch_sitemap_categories(&self) -> Result<Vec<SitemapRecord>, GatewayError> {
        let data: CategoriesData<WireSitemapRecord> = self
            .fetch_graphql(
                queries::SITEMAP_CATEGORIES,
                json!({ "first": self.categories_limit }),
            )
            .await?;
        let connection = data.categories.ok_or(GatewayError::MissingData("categories"))?;
        Ok(sitemap_records(connection))
    }

    async fn fetch_health(&self) -> Result<bool, GatewayError> {
        let data: SettingsData = self.fetch_graphql(queries::HEALTH_CHECK, json!({})).await?;
        let healthy = match data.general_settings {
            Some(settings) => {
                debug!(
                    title = ?settings.title,
                    description = ?settings.description,
                    "Backend settings"
                );
                true
            }
            None => false,
        };
        info!(healthy, "Content backend health check");
        Ok(healthy)
    }

    /// Execute a GraphQL query
    async fn fetch_graphql<T>(&self, query: &str, variables: Value) -> Result<T, GatewayError>
    where
        T: DeserializeOwned,
    {
        let operation = query.trim().lines().next().unwrap_or_default();
        debug!(endpoint = %self.endpoint, query = %operation, "Sending GraphQL query");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(reqwest_middleware::Error::from)?;

        if !status.is_success() {
            return Err(GatewayError::Http { status, body });
        }

        let envelope: GraphQlResponse<T> = serde_json::from_str(&body)?;
        if let Some(errors) = envelope.errors.filter(|errors| !errors.is_empty()) {
            return Err(GatewayError::GraphQl(
                errors.into_iter().map(|e| e.message).collect(),
            ));
        }

        envelope.data.ok_or(GatewayError::MissingData("data"))
    }
}

fn sitemap_records(connection: Connection<WireSitemapRecord>) -> Vec<SitemapRecord> {
    connection
        .into_nodes()
        .into_iter()
        .filter_map(WireSitemapRecord::into_record)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetched_degrades_to_default() {
        let failed: Fetched<Vec<u8>> = Fetched::Failed(GatewayError::MissingData("posts"));
        assert!(failed.is_failed());
        assert!(failed.into_inner_or_default().is_empty());

        let ready = Fetched::Ready(vec![1u8, 2]);
        assert!(!ready.is_failed());
        assert_eq!(ready.map(|v| v.len()).into_inner_or_default(), 2);
    }

    #[test]
    fn graphql_error_message_joins_entries() {
        let err = GatewayError::GraphQl(vec!["first".into(), "second".into()]);
        assert_eq!(err.to_string(), "GraphQL query failed: first; second");
    }

    #[test]
    fn envelope_with_errors_and_no_data_parses() {
        let envelope: GraphQlResponse<PostsData> = serde_json::from_str(
            r#"{ "errors": [ { "message": "Cannot query field" } ], "data": null }"#,
        )
        .unwrap();
        assert!(envelope.data.is_none());
        assert_eq!(envelope.errors.unwrap()[0].message, "Cannot query field");
    }
}
