//! Materializes the category forest out of the flat list the API serves.
//!
//! Categories are stored flat with a nullable parent reference. The storefront
//! sidebar needs the direct children of a given group, the admin console needs
//! the whole forest flattened in pre-order with a depth for indentation. Both
//! views are recomputed from scratch on every call; the list is small and
//! refetched wholesale, so there is no cache to invalidate.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Category;

/// A parent reference as it appears in category payloads: either the raw id
/// or the parent expanded into an object.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ParentRef {
    Id(Uuid),
    Expanded { id: Uuid },
}

impl ParentRef {
    pub fn resolves_to(&self, target: Uuid) -> bool {
        match self {
            ParentRef::Id(id) => *id == target,
            ParentRef::Expanded { id } => *id == target,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            ParentRef::Id(id) => *id,
            ParentRef::Expanded { id } => *id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryRecord {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub parent: Option<ParentRef>,
}

impl From<Category> for CategoryRecord {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            slug: c.slug,
            parent: c.parent_id.map(ParentRef::Id),
        }
    }
}

/// A node of the flattened forest, annotated with its depth.
#[derive(Debug, Serialize, ToSchema)]
pub struct TreeRow {
    pub depth: usize,
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<Uuid>,
}

/// Direct children of `parent`, in input order. A parent reference matches
/// whether it arrived as a raw id or as an expanded object.
pub fn children_of(all: &[CategoryRecord], parent: Uuid) -> Vec<&CategoryRecord> {
    all.iter()
        .filter(|c| c.parent.as_ref().is_some_and(|p| p.resolves_to(parent)))
        .collect()
}

/// Nodes with no parent reference, in input order.
pub fn roots(all: &[CategoryRecord]) -> Vec<&CategoryRecord> {
    all.iter().filter(|c| c.parent.is_none()).collect()
}

/// The root with the given slug, if it was fetched at all. Callers fall back
/// to an unfiltered listing when the slug is absent.
pub fn find_root_by_slug<'a>(all: &'a [CategoryRecord], slug: &str) -> Option<&'a CategoryRecord> {
    roots(all).into_iter().find(|c| c.slug == slug)
}

/// Pre-order flattening of the whole forest with depth annotations.
///
/// A visited set bounds the traversal: a node is emitted at most once, so a
/// malformed parent cycle degrades to a truncated tree instead of unbounded
/// recursion. Nodes whose parent id does not resolve to a fetched category
/// are never emitted as children.
pub fn flatten(all: &[CategoryRecord]) -> Vec<TreeRow> {
    let mut out = Vec::with_capacity(all.len());
    let mut visited = HashSet::new();
    for root in roots(all) {
        push_subtree(all, root, 0, &mut visited, &mut out);
    }
    out
}

fn push_subtree(
    all: &[CategoryRecord],
    node: &CategoryRecord,
    depth: usize,
    visited: &mut HashSet<Uuid>,
    out: &mut Vec<TreeRow>,
) {
    if !visited.insert(node.id) {
        return;
    }
    out.push(TreeRow {
        depth,
        id: node.id,
        name: node.name.clone(),
        slug: node.slug.clone(),
        parent_id: node.parent.as_ref().map(ParentRef::id),
    });
    for child in children_of(all, node.id) {
        push_subtree(all, child, depth + 1, visited, out);
    }
}
