// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

use crate::ids::ItemId;
use crate::model::GalleryItem;

/// Immutable item list plus its tag index, computed once at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog<T> {
    items: Vec<T>,
    tags: Vec<String>,
}

impl<T> Default for Catalog<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            tags: Vec::new(),
        }
    }
}

impl<T: GalleryItem> Catalog<T> {
    pub fn new(items: Vec<T>) -> Self {
        let tags = tag_index(&items);
        Self { items, tags }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn filtered(&self, query: &str, active_tag: Option<&str>) -> Vec<&T> {
        filter_items(&self.items, query, active_tag)
    }
}

/// Sorted, deduplicated tags across all items.
pub fn tag_index<T: GalleryItem>(items: &[T]) -> Vec<String> {
    items
        .iter()
        .flat_map(|item| item.tags().iter().cloned())
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// `normalized` must already be trimmed and lower-cased.
pub fn matches_query<T: GalleryItem>(item: &T, normalized: &str) -> bool {
    normalized.is_empty()
        || item
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(normalized))
}

pub fn matches_tag<T: GalleryItem>(item: &T, active_tag: Option<&str>) -> bool {
    match active_tag {
        None => true,
        Some(tag) => item.tags().iter().any(|candidate| candidate == tag),
    }
}

/// Items passing both the text and the tag predicate, in source order.
pub fn filter_items<'a, T: GalleryItem>(
    items: &'a [T],
    query: &str,
    active_tag: Option<&str>,
) -> Vec<&'a T> {
    let normalized = normalize_query(query);
    items
        .iter()
        .filter(|item| matches_query(*item, &normalized) && matches_tag(*item, active_tag))
        .collect()
}

/// First position of `id` in `items`. Duplicate ids resolve to the earliest
/// entry.
pub fn position_of<T: GalleryItem>(items: &[&T], id: &ItemId) -> Option<usize> {
    items.iter().position(|item| item.id() == id)
}
