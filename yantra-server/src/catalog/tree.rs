//! In-memory category forest
//!
//! The whole category table is small, so each request loads it once and
//! answers every hierarchy question (ancestry, descendants, path
//! resolution, cycle checks) from memory instead of one query per level.
//! Every walk is iterative and tracks visited ids, so corrupt parent links
//! cannot hang a request.

use std::collections::{HashMap, HashSet, VecDeque};

use shared::models::{Category, CategoryNode};
use uuid::Uuid;

/// Hard cap on ancestry walks
pub const MAX_CATEGORY_DEPTH: usize = 32;

#[derive(Debug, Default)]
pub struct CategoryTree {
    nodes: HashMap<Uuid, Category>,
    /// Child ids per parent, in load order
    children: HashMap<Uuid, Vec<Uuid>>,
    roots: Vec<Uuid>,
}

impl CategoryTree {
    /// Build the forest from a flat category list.
    ///
    /// A category whose parent is missing or is itself becomes a root.
    pub fn new(categories: Vec<Category>) -> Self {
        let ids: HashSet<Uuid> = categories.iter().map(|c| c.id).collect();
        let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        let mut roots = Vec::new();

        for category in &categories {
            match category.parent_id {
                Some(parent) if parent != category.id && ids.contains(&parent) => {
                    children.entry(parent).or_default().push(category.id);
                }
                _ => roots.push(category.id),
            }
        }

        Self {
            nodes: categories.into_iter().map(|c| (c.id, c)).collect(),
            children,
            roots,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Category> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn has_children(&self, id: Uuid) -> bool {
        self.children.get(&id).is_some_and(|c| !c.is_empty())
    }

    /// Chain from the root down to `id` (inclusive).
    ///
    /// Unknown or absent ids give an empty chain. The walk stops at the
    /// first repeated id or after [`MAX_CATEGORY_DEPTH`] hops, returning
    /// the chain collected so far.
    pub fn ancestry(&self, id: Option<Uuid>) -> Vec<&Category> {
        let Some(mut current) = id.and_then(|id| self.nodes.get(&id)) else {
            return Vec::new();
        };

        let mut chain = vec![current];
        let mut seen = HashSet::from([current.id]);

        while let Some(parent_id) = current.parent_id {
            if chain.len() >= MAX_CATEGORY_DEPTH {
                tracing::warn!(category_id = %chain[0].id, "Category ancestry exceeds max depth, truncating");
                break;
            }
            if !seen.insert(parent_id) {
                if parent_id != current.id {
                    tracing::warn!(category_id = %chain[0].id, %parent_id, "Category parent cycle detected");
                }
                break;
            }
            let Some(parent) = self.nodes.get(&parent_id) else {
                break;
            };
            chain.push(parent);
            current = parent;
        }

        chain.reverse();
        chain
    }

    /// Every category below `id`, breadth-first. `id` itself is excluded.
    pub fn descendant_ids(&self, id: Uuid) -> Vec<Uuid> {
        let mut found = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut queue = VecDeque::from([id]);

        while let Some(current) = queue.pop_front() {
            for &child in self.children.get(&current).into_iter().flatten() {
                if seen.insert(child) {
                    found.push(child);
                    queue.push_back(child);
                }
            }
        }
        found
    }

    /// `id` followed by all of its descendants
    pub fn scope_ids(&self, id: Uuid) -> Vec<Uuid> {
        let mut ids = vec![id];
        ids.extend(self.descendant_ids(id));
        ids
    }

    /// Slugs from the root down to `id`
    pub fn slug_path(&self, id: Uuid) -> Vec<&str> {
        self.ancestry(Some(id))
            .into_iter()
            .map(|c| c.slug.as_str())
            .collect()
    }

    /// Resolve a slash-separated slug path to a category.
    ///
    /// The last segment selects the category; the one before it, when
    /// present, must be its parent's slug. If several categories still
    /// match, the one whose full slug path equals the requested path wins,
    /// then the shallowest.
    pub fn resolve_path(&self, path: &str) -> Option<&Category> {
        let segments: Vec<&str> = path
            .split('/')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        let (last, rest) = segments.split_last()?;
        let parent_slug = rest.last();

        let mut candidates: Vec<&Category> = self
            .nodes
            .values()
            .filter(|c| c.slug == *last)
            .filter(|c| match parent_slug {
                None => true,
                Some(expected) => c
                    .parent_id
                    .filter(|p| *p != c.id)
                    .and_then(|p| self.nodes.get(&p))
                    .is_some_and(|p| p.slug == *expected),
            })
            .collect();

        candidates.sort_by_cached_key(|c| {
            let full = self.slug_path(c.id);
            (full != segments, full.len(), c.id)
        });
        candidates.into_iter().next()
    }

    /// Whether making `new_parent` the parent of `id` would close a loop
    pub fn would_create_cycle(&self, id: Uuid, new_parent: Uuid) -> bool {
        new_parent == id || self.descendant_ids(id).contains(&new_parent)
    }

    /// Whether a sibling under `parent` already uses `slug`
    pub fn sibling_slug_taken(&self, parent: Option<Uuid>, slug: &str, except: Option<Uuid>) -> bool {
        self.nodes.values().any(|c| {
            Some(c.id) != except && c.slug == slug && self.effective_parent(c) == parent
        })
    }

    /// Nested view for navigation menus
    pub fn to_nested(&self) -> Vec<CategoryNode> {
        self.roots.iter().filter_map(|&id| self.node(id)).collect()
    }

    fn node(&self, id: Uuid) -> Option<CategoryNode> {
        let category = self.nodes.get(&id)?.clone();
        let children = self
            .children
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|&child| self.node(child))
            .collect();
        Some(CategoryNode { category, children })
    }

    fn effective_parent(&self, category: &Category) -> Option<Uuid> {
        category
            .parent_id
            .filter(|p| *p != category.id && self.nodes.contains_key(p))
    }
}
