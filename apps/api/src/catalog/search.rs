use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{CatalogEntry, Category};

/// Category selector. `All` is the pass-through sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Only(Category),
}

impl CategoryFilter {
    pub const ALL_SENTINEL: &'static str = "all";

    /// Empty input and `"all"` select everything; otherwise the label must be
    /// one of the nine categories.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case(Self::ALL_SENTINEL) {
            return Some(CategoryFilter::All);
        }
        Category::parse(raw).map(CategoryFilter::Only)
    }
}

/// Case-insensitive substring search over title, description, body and tags.
/// An empty query matches everything.
pub fn search<'a>(entries: &'a [CatalogEntry], query: &str) -> Vec<&'a CatalogEntry> {
    let needle = query.trim().to_lowercase();
    entries
        .iter()
        .filter(|e| needle.is_empty() || matches_query(e, &needle))
        .collect()
}

fn matches_query(entry: &CatalogEntry, needle: &str) -> bool {
    let r = &entry.record;
    r.title.to_lowercase().contains(needle)
        || r.description.to_lowercase().contains(needle)
        || r.text.to_lowercase().contains(needle)
        || r.tags.iter().any(|t| t.to_lowercase().contains(needle))
}

/// Keeps entries whose interpreted category matches. Records with an absent or
/// unrecognized label count as `Other`.
pub fn filter_by_category<'a>(
    entries: impl IntoIterator<Item = &'a CatalogEntry>,
    filter: CategoryFilter,
) -> Vec<&'a CatalogEntry> {
    entries
        .into_iter()
        .filter(|e| match filter {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => e.record.category_kind() == category,
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryMember {
    pub id: Uuid,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategorySummary {
    pub category: Category,
    pub count: usize,
    pub tags: Vec<TagCount>,
    pub prompts: Vec<CategoryMember>,
}

/// Groups the catalog by category for the "categories & tags" overview.
/// Only categories that have at least one record are listed, sorted by label;
/// tags within a category are sorted alphabetically.
pub fn summarize_categories(entries: &[CatalogEntry]) -> Vec<CategorySummary> {
    let mut groups: BTreeMap<&'static str, (Category, Vec<&CatalogEntry>)> = BTreeMap::new();
    for entry in entries {
        let category = entry.record.category_kind();
        groups
            .entry(category.label())
            .or_insert_with(|| (category, Vec::new()))
            .1
            .push(entry);
    }

    groups
        .into_values()
        .map(|(category, members)| {
            let mut tag_counts: BTreeMap<&str, usize> = BTreeMap::new();
            for entry in &members {
                for tag in &entry.record.tags {
                    *tag_counts.entry(tag.as_str()).or_default() += 1;
                }
            }
            CategorySummary {
                category,
                count: members.len(),
                tags: tag_counts
                    .into_iter()
                    .map(|(tag, count)| TagCount {
                        tag: tag.to_string(),
                        count,
                    })
                    .collect(),
                prompts: members
                    .iter()
                    .map(|e| CategoryMember {
                        id: e.id,
                        title: e.record.title.clone(),
                    })
                    .collect(),
            }
        })
        .collect()
}
