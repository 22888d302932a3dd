//! Cross-platform merge and sort of raw search results.

use crate::config::SortKey;
use crate::model::{RawItem, SearchPage};
use crate::platform::Platform;
use crate::versions::{epoch_seconds_millis, iso_millis};
use serde::Serialize;
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

impl RawItem {
    /// Download count, 0 when absent.
    pub fn downloads(&self) -> u64 {
        match self {
            RawItem::Modrinth(hit) => hit.downloads,
            RawItem::Spigot(resource) => resource.downloads,
            RawItem::Hangar(project) => project.stats.as_ref().map(|s| s.downloads).unwrap_or(0),
        }
    }

    /// Followers, likes or stars, 0 when absent.
    pub fn follows(&self) -> u64 {
        match self {
            RawItem::Modrinth(hit) => hit.follows,
            RawItem::Spigot(resource) if resource.likes > 0 => resource.likes,
            RawItem::Spigot(resource) => resource.rating.as_ref().map(|r| r.count).unwrap_or(0),
            RawItem::Hangar(project) => project.stats.as_ref().map(|s| s.stars).unwrap_or(0),
        }
    }

    /// Creation time in epoch milliseconds, 0 when absent or invalid.
    pub fn created_millis(&self) -> i64 {
        match self {
            RawItem::Modrinth(hit) => iso_millis(hit.date_created.as_deref()),
            RawItem::Spigot(resource) => epoch_seconds_millis(resource.release_date),
            RawItem::Hangar(project) => iso_millis(project.created_at.as_deref()),
        }
    }

    /// Last-modified time in epoch milliseconds, 0 when absent or invalid.
    pub fn updated_millis(&self) -> i64 {
        match self {
            RawItem::Modrinth(hit) => iso_millis(hit.date_modified.as_deref()),
            RawItem::Spigot(resource) => epoch_seconds_millis(resource.update_date),
            RawItem::Hangar(project) => iso_millis(project.last_updated.as_deref()),
        }
    }

    /// Display title folded for comparison: lowercase with accents stripped,
    /// so "Éclair" sorts next to "eclair".
    pub fn sort_title(&self) -> String {
        let title = match self {
            RawItem::Modrinth(hit) => hit.title.as_deref(),
            RawItem::Spigot(resource) => resource.name.as_deref(),
            RawItem::Hangar(project) => project.name.as_deref(),
        };
        title
            .unwrap_or_default()
            .trim()
            .nfd()
            .filter(|c| !is_combining_mark(*c))
            .collect::<String>()
            .to_lowercase()
    }
}

fn compare(key: SortKey, a: &RawItem, b: &RawItem) -> Ordering {
    match key {
        SortKey::Downloads => b.downloads().cmp(&a.downloads()),
        SortKey::Newest => b.created_millis().cmp(&a.created_millis()),
        SortKey::Updated => b.updated_millis().cmp(&a.updated_millis()),
        SortKey::Follows => b.follows().cmp(&a.follows()),
        SortKey::NameAsc => a.sort_title().cmp(&b.sort_title()),
        SortKey::NameDesc => b.sort_title().cmp(&a.sort_title()),
    }
}

/// Stable sort by a unified key.
pub fn sort_by_key(items: &mut [RawItem], key: SortKey) {
    items.sort_by(|a, b| compare(key, a, b));
}

/// Stable sort by a sort key name; an unknown name leaves the order untouched.
pub fn sort_items(items: &mut [RawItem], sort: &str) {
    if let Ok(key) = sort.parse::<SortKey>() {
        sort_by_key(items, key);
    }
}

/// The outcome of one fan-out.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergedResults {
    pub items: Vec<RawItem>,
    pub total: u64,
    /// False when any contributing platform only reported its page length.
    pub total_exact: bool,
    pub queried: Vec<Platform>,
    pub failed: Vec<Platform>,
}

impl MergedResults {
    /// Every queried platform failed.
    pub fn all_failed(&self) -> bool {
        !self.queried.is_empty() && self.failed.len() == self.queried.len()
    }

    /// Append the next page, skipping items already present.
    pub fn append(&mut self, next: MergedResults) {
        let next_all_failed = next.all_failed();
        for item in next.items {
            let key = item.key();
            if !self.items.iter().any(|existing| existing.key() == key) {
                self.items.push(item);
            }
        }
        if !next_all_failed {
            self.total = next.total;
            self.total_exact = next.total_exact;
        }
        self.failed = next.failed;
    }
}

/// Flatten per-platform pages in platform order, then sort across platforms.
pub fn merge_pages(pages: Vec<SearchPage>, key: SortKey) -> MergedResults {
    let mut merged = MergedResults {
        total_exact: true,
        ..MergedResults::default()
    };

    for page in pages {
        merged.queried.push(page.platform);
        if page.error {
            merged.failed.push(page.platform);
            continue;
        }
        merged.total += page.total;
        merged.total_exact &= page.total_exact;
        merged.items.extend(page.hits);
    }

    sort_by_key(&mut merged.items, key);
    merged
}
