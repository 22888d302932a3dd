//! File-backed key/value store: one JSON file per key under the data dir.

use crate::prelude::*;
use minenav_core::config::storage_keys;
use minenav_core::favorites::{self, Favorite};
use minenav_core::i18n::Locale;
use minenav_core::model::RawItem;
use minenav_core::state::ViewMode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(f!("{key}.json"))
    }

    /// The stored value, or `None` when it is missing or unreadable.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.path(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                log::warn!("Failed to read {}: {err}", path.display());
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!("Ignoring corrupt {}: {err}", path.display());
                None
            }
        }
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            Error::Storage(f!("Failed to create {}: {e}", self.dir.display()))
        })?;
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| Error::Storage(f!("Failed to serialize {key}: {e}")))?;
        let path = self.path(key);
        fs::write(&path, json)
            .map_err(|e| Error::Storage(f!("Failed to write {}: {e}", path.display())))?;
        Ok(())
    }
}

/// Stored preferences that live outside the filter state.
#[derive(Debug, Clone)]
pub struct Preferences {
    store: Store,
}

impl Preferences {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn locale(&self) -> Option<Locale> {
        self.store
            .get::<String>(storage_keys::LOCALE)
            .map(|tag| Locale::resolve(&tag))
    }

    pub fn set_locale(&self, locale: Locale) -> Result<()> {
        self.store.set(storage_keys::LOCALE, locale.as_str())
    }

    /// The last layout `search` rendered with.
    pub fn layout(&self) -> Option<ViewMode> {
        self.store
            .get::<String>(storage_keys::LAYOUT)
            .and_then(|raw| raw.parse().ok())
    }

    pub fn set_layout(&self, mode: ViewMode) -> Result<()> {
        self.store.set(storage_keys::LAYOUT, mode.as_str())
    }
}

type Listener = Box<dyn Fn(&[Favorite]) + Send>;

/// The favorites list, read and written through on every change.
pub struct FavoritesStore {
    store: Store,
    listeners: Vec<Listener>,
}

impl FavoritesStore {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            listeners: Vec::new(),
        }
    }

    pub fn all(&self) -> Vec<Favorite> {
        self.store.get(storage_keys::FAVORITES).unwrap_or_default()
    }

    /// Returns whether `item` is a favorite afterwards.
    pub fn toggle(&mut self, item: &RawItem) -> Result<bool> {
        let mut list = self.all();
        let added = favorites::toggle(&mut list, item);
        self.save(&list)?;
        Ok(added)
    }

    /// Returns whether the list changed.
    pub fn add(&mut self, item: &RawItem) -> Result<bool> {
        let mut list = self.all();
        if !favorites::add(&mut list, item) {
            return Ok(false);
        }
        self.save(&list)?;
        Ok(true)
    }

    /// The removed favorite, if `id` was saved.
    pub fn remove(&mut self, id: &str) -> Result<Option<Favorite>> {
        let mut list = self.all();
        let Some(removed) = list.iter().find(|f| f.id == id).cloned() else {
            return Ok(None);
        };
        favorites::remove(&mut list, id);
        self.save(&list)?;
        Ok(Some(removed))
    }

    /// Call `listener` with the new list after every change.
    pub fn subscribe(&mut self, listener: impl Fn(&[Favorite]) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn save(&self, list: &[Favorite]) -> Result<()> {
        self.store.set(storage_keys::FAVORITES, list)?;
        for listener in &self.listeners {
            listener(list);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minenav_core::platform::Platform;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn item(id: &str) -> RawItem {
        RawItem::from_json(Platform::Modrinth, json!({"project_id": id, "title": id})).unwrap()
    }

    #[test]
    fn test_missing_and_corrupt_keys_read_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());

        assert_eq!(store.get::<String>("sort"), None);

        fs::write(dir.path().join("sort.json"), "{not json").unwrap();
        assert_eq!(store.get::<String>("sort"), None);
    }

    #[test]
    fn test_set_creates_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("nested").join("minenav"));

        store.set("platform", "hangar").unwrap();

        assert_eq!(store.get::<String>("platform").as_deref(), Some("hangar"));
    }

    #[test]
    fn test_preferences() {
        let dir = tempfile::tempdir().unwrap();
        let preferences = Preferences::new(Store::new(dir.path()));

        assert_eq!(preferences.locale(), None);
        preferences.set_locale(Locale::ZhCn).unwrap();
        preferences.set_layout(ViewMode::List).unwrap();

        assert_eq!(preferences.locale(), Some(Locale::ZhCn));
        assert_eq!(preferences.layout(), Some(ViewMode::List));
    }

    #[test]
    fn test_favorites_persist_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let mut favorites = FavoritesStore::new(Store::new(dir.path()));

        assert!(favorites.toggle(&item("a")).unwrap());
        assert!(favorites.add(&item("b")).unwrap());
        assert!(!favorites.add(&item("b")).unwrap());

        let reopened = FavoritesStore::new(Store::new(dir.path()));
        let ids: Vec<String> = reopened.all().into_iter().map(|f| f.id).collect();
        assert_eq!(ids, vec!["modrinth:a", "modrinth:b"]);

        let stored = fs::read_to_string(dir.path().join("plugin-favorites.json")).unwrap();
        assert!(stored.contains("\"platform\": \"modrinth\""));
    }

    #[test]
    fn test_remove_returns_the_favorite() {
        let dir = tempfile::tempdir().unwrap();
        let mut favorites = FavoritesStore::new(Store::new(dir.path()));
        favorites.add(&item("a")).unwrap();

        let removed = favorites.remove("modrinth:a").unwrap();

        assert_eq!(removed.map(|f| f.id).as_deref(), Some("modrinth:a"));
        assert!(favorites.remove("modrinth:a").unwrap().is_none());
        assert!(favorites.all().is_empty());
    }

    #[test]
    fn test_subscribers_see_every_change() {
        let dir = tempfile::tempdir().unwrap();
        let mut favorites = FavoritesStore::new(Store::new(dir.path()));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        favorites.subscribe(move |list| sink.lock().unwrap().push(list.len()));

        favorites.toggle(&item("a")).unwrap();
        favorites.toggle(&item("b")).unwrap();
        favorites.toggle(&item("a")).unwrap();
        favorites.remove("modrinth:missing").unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 1]);
    }
}
