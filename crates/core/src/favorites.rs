//! Favorites list operations.

use crate::model::RawItem;
use crate::platform::Platform;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A saved plugin. `data` is the raw search item it was saved from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: String,
    pub platform: Platform,
    pub data: Value,
}

impl Favorite {
    pub fn from_item(item: &RawItem) -> Self {
        Self {
            id: favorite_id(item),
            platform: item.platform(),
            data: item.to_json(),
        }
    }

    /// The stored raw item, or `None` when `data` no longer fits its platform's shape.
    pub fn item(&self) -> Option<RawItem> {
        RawItem::from_json(self.platform, self.data.clone()).ok()
    }
}

/// `platform:nativeId`.
pub fn favorite_id(item: &RawItem) -> String {
    item.key()
}

pub fn is_favorite(list: &[Favorite], id: &str) -> bool {
    list.iter().any(|f| f.id == id)
}

/// Add `item` if absent, remove it if present. Returns whether it is now a favorite.
pub fn toggle(list: &mut Vec<Favorite>, item: &RawItem) -> bool {
    let id = favorite_id(item);
    if remove(list, &id) {
        false
    } else {
        list.push(Favorite::from_item(item));
        true
    }
}

/// Add `item` unless it is already saved. Returns whether the list changed.
pub fn add(list: &mut Vec<Favorite>, item: &RawItem) -> bool {
    if is_favorite(list, &favorite_id(item)) {
        return false;
    }
    list.push(Favorite::from_item(item));
    true
}

/// Remove by id. Returns whether anything was removed.
pub fn remove(list: &mut Vec<Favorite>, id: &str) -> bool {
    let before = list.len();
    list.retain(|f| f.id != id);
    list.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item() -> RawItem {
        RawItem::from_json(Platform::Modrinth, json!({"project_id": "abc", "title": "X"})).unwrap()
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut list = Vec::new();

        assert!(toggle(&mut list, &item()));
        assert!(is_favorite(&list, "modrinth:abc"));
        assert_eq!(list[0].platform, Platform::Modrinth);

        assert!(!toggle(&mut list, &item()));
        assert!(list.is_empty());
    }

    #[test]
    fn test_add_is_unique_by_id() {
        let mut list = Vec::new();
        assert!(add(&mut list, &item()));
        assert!(!add(&mut list, &item()));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_stored_shape_and_item_round_trip() {
        let favorite = Favorite::from_item(&item());
        let stored = serde_json::to_value(&favorite).unwrap();

        assert_eq!(stored["id"], "modrinth:abc");
        assert_eq!(stored["platform"], "modrinth");
        assert_eq!(stored["data"]["title"], "X");

        let loaded: Favorite = serde_json::from_value(stored).unwrap();
        assert_eq!(loaded.item(), Some(item()));
    }

    #[test]
    fn test_item_with_mismatched_data() {
        let favorite = Favorite {
            id: "spigot:1".into(),
            platform: Platform::Spigot,
            data: json!("not an object"),
        };
        assert!(favorite.item().is_none());
    }
}
