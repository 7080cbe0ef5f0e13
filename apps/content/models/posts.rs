use super::{Connection, Edge, date_format};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Post as returned by the `posts` / `post` queries.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WirePost {
    pub id: Option<String>,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    #[serde(default, deserialize_with = "date_format::deserialize_option")]
    pub date: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "date_format::deserialize_option")]
    pub modified: Option<NaiveDateTime>,
    pub featured_image: Option<Edge<WireImage>>,
    pub categories: Option<Connection<WireCategoryRef>>,
    pub author: Option<Edge<WireAuthor>>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WireImage {
    pub source_url: Option<String>,
    pub alt_text: Option<String>,
    pub media_details: Option<WireMediaDetails>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WireMediaDetails {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WireCategoryRef {
    pub slug: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WireAuthor {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PostsData<T = WirePost> {
    pub posts: Option<Connection<T>>,
}

#[derive(Debug, Deserialize)]
pub struct PostData {
    pub post: Option<WirePost>,
}

/// Category reference carried on a post.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct CategoryRef {
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedImage {
    pub source_url: String,
    pub alt_text: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Read-only snapshot of a published post.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    /// Rendered HTML.
    pub content: String,
    pub excerpt: String,
    pub date: NaiveDateTime,
    pub modified: NaiveDateTime,
    pub slug: String,
    pub featured_image: Option<FeaturedImage>,
    /// `None` when the backend sent no category data at all.
    pub categories: Option<Vec<CategoryRef>>,
    pub author: Option<Author>,
}

impl Post {
    /// Slugs of the post's categories; empty when category data is absent.
    pub fn category_slugs(&self) -> impl Iterator<Item = &str> {
        self.categories
            .iter()
            .flatten()
            .map(|category| category.slug.as_str())
    }

    pub fn in_category(&self, slug: &str) -> bool {
        self.category_slugs().any(|candidate| candidate == slug)
    }
}

impl WirePost {
    /// Normalizes the wire record. Posts without an id, a slug or any usable
    /// date are dropped; everything else degrades to empty strings / `None`.
    pub fn into_post(self) -> Option<Post> {
        let (Some(id), Some(slug)) = (self.id, self.slug) else {
            warn!("Post is missing its id or slug, skipping");
            return None;
        };
        let Some(date) = self.date.or(self.modified) else {
            warn!(post_id = %id, slug = %slug, "Post has no parseable date, skipping");
            return None;
        };

        Some(Post {
            modified: self.modified.unwrap_or(date),
            date,
            title: self.title.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
            excerpt: self.excerpt.unwrap_or_default(),
            featured_image: self
                .featured_image
                .and_then(|edge| edge.node)
                .and_then(WireImage::into_featured_image),
            categories: self
                .categories
                .and_then(Connection::nodes)
                .map(|refs| refs.into_iter().filter_map(WireCategoryRef::into_ref).collect()),
            author: self
                .author
                .and_then(|edge| edge.node)
                .and_then(|author| author.name)
                .map(|name| Author { name }),
            id,
            slug,
        })
    }
}

impl WireCategoryRef {
    /// Refs without a slug cannot be matched against a selection and are dropped.
    fn into_ref(self) -> Option<CategoryRef> {
        let slug = self.slug.filter(|slug| !slug.is_empty())?;
        Some(CategoryRef {
            name: self.name.unwrap_or_else(|| slug.clone()),
            slug,
        })
    }
}

impl WireImage {
    fn into_featured_image(self) -> Option<FeaturedImage> {
        let source_url = self.source_url.filter(|url| !url.trim().is_empty())?;
        Some(FeaturedImage {
            source_url,
            alt_text: self.alt_text.unwrap_or_default(),
            width: self.media_details.as_ref().and_then(|m| m.width),
            height: self.media_details.as_ref().and_then(|m| m.height),
        })
    }
}
