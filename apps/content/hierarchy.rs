//! Flat category list to parent/child forest.

use crate::models::categories::{Category, CategoryNode};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Builds the category forest from a flat list.
///
/// Records whose `parent_id` does not resolve to a known `id` become roots.
/// Siblings keep their input order. When an `id` appears more than once the
/// last record wins and is placed at the position of its last occurrence.
/// Records caught in a parent cycle are unreachable from any root and are
/// left out of the result.
pub fn build_category_hierarchy(categories: &[Category]) -> Vec<CategoryNode> {
    // id -> index of the record that owns that id (last write wins)
    let mut lookup: HashMap<&str, usize> = HashMap::with_capacity(categories.len());
    for (index, category) in categories.iter().enumerate() {
        lookup.insert(category.id.as_str(), index);
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); categories.len()];
    let mut roots = Vec::new();

    for (index, category) in categories.iter().enumerate() {
        if lookup.get(category.id.as_str()) != Some(&index) {
            debug!(
                id = %category.id,
                slug = %category.slug,
                "Duplicate category id, keeping the later record"
            );
            continue;
        }

        match category
            .parent_id
            .as_deref()
            .and_then(|parent_id| lookup.get(parent_id))
        {
            Some(&parent) => children[parent].push(index),
            None => roots.push(index),
        }
    }

    let mut placed = vec![false; categories.len()];
    let forest: Vec<CategoryNode> = roots
        .into_iter()
        .map(|root| materialize(root, categories, &children, &mut placed))
        .collect();

    let kept = lookup.len();
    let reachable = placed.iter().filter(|placed| **placed).count();
    if reachable < kept {
        warn!(
            dropped = kept - reachable,
            total = kept,
            "Categories unreachable from any root (parent cycle), dropping"
        );
    }

    forest
}

fn materialize(
    index: usize,
    categories: &[Category],
    children: &[Vec<usize>],
    placed: &mut [bool],
) -> CategoryNode {
    placed[index] = true;
    let mut node = CategoryNode::new(categories[index].clone());
    for &child in &children[index] {
        // each index has a single parent, so this only guards against a bad lookup
        if placed[child] {
            continue;
        }
        node.children
            .push(materialize(child, categories, children, placed));
    }
    node
}

/// Depth-first, pre-order search for `slug`.
pub fn find_category<'a>(nodes: &'a [CategoryNode], slug: &str) -> Option<&'a CategoryNode> {
    nodes.iter().find_map(|node| {
        if node.slug() == slug {
            Some(node)
        } else {
            find_category(&node.children, slug)
        }
    })
}

/// Pre-order walk over every node in the forest.
pub fn walk(nodes: &[CategoryNode]) -> Vec<&CategoryNode> {
    let mut out = Vec::new();
    let mut stack: Vec<&CategoryNode> = nodes.iter().rev().collect();
    while let Some(node) = stack.pop() {
        out.push(node);
        stack.extend(node.children.iter().rev());
    }
    out
}

/// Summary numbers shown on the category index.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyStats {
    pub root_count: usize,
    /// Roots that have at least one child.
    pub with_children: usize,
    /// Direct children of roots.
    pub subcategory_count: usize,
    /// Backend post counts summed over every node.
    pub total_posts: u64,
}

impl HierarchyStats {
    pub fn from_roots(roots: &[CategoryNode]) -> Self {
        Self {
            root_count: roots.len(),
            with_children: roots.iter().filter(|root| root.has_children()).count(),
            subcategory_count: roots.iter().map(|root| root.children.len()).sum(),
            total_posts: walk(roots)
                .into_iter()
                .map(|node| u64::from(node.category.count))
                .sum(),
        }
    }
}
