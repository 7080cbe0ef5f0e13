use super::Edge;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Category as returned by the `categories` query.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WireCategory {
    pub id: Option<String>,
    pub slug: Option<String>,
    pub name: Option<String>,
    pub count: Option<u32>,
    pub description: Option<String>,
    pub parent: Option<Edge<WireParentRef>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WireParentRef {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoriesData<T = WireCategory> {
    pub categories: Option<super::Connection<T>>,
}

/// Flat category record. `parent_id` points at another category's `id`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub slug: String,
    pub name: String,
    /// Direct post count as maintained by the backend.
    pub count: u32,
    pub description: String,
    pub parent_id: Option<String>,
}

impl WireCategory {
    /// Categories without an id or slug can be neither linked nor selected; they are dropped.
    pub fn into_category(self) -> Option<Category> {
        let (Some(id), Some(slug)) = (self.id, self.slug) else {
            warn!(name = ?self.name, "Category is missing its id or slug, skipping");
            return None;
        };

        Some(Category {
            name: self.name.unwrap_or_else(|| slug.clone()),
            count: self.count.unwrap_or(0),
            description: self.description.unwrap_or_default(),
            parent_id: self
                .parent
                .and_then(|edge| edge.node)
                .and_then(|parent| parent.id),
            id,
            slug,
        })
    }
}

/// Hierarchical form of [`Category`].
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            children: Vec::new(),
        }
    }

    pub fn slug(&self) -> &str {
        &self.category.slug
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Number of nodes below this one, at any depth.
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }
}
