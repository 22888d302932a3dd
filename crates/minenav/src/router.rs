//! Owns the filter state, mirrors it to the preference store and tags each
//! fetch with the generation of the query it belongs to, so late results of
//! an outdated query can be dropped.

use crate::store::Store;
use minenav_core::query::SearchQuery;
use minenav_core::state::{ChangeSet, FetchKind, FilterState, StateError, StateUpdate};

pub type Generation = u64;
type Observer = Box<dyn Fn(&FilterState, &ChangeSet) + Send>;

pub struct Router {
    state: FilterState,
    store: Store,
    observers: Vec<Observer>,
    generation: Generation,
}

impl Router {
    /// Start from the persisted preferences. Search and page always start empty.
    pub fn new(store: Store) -> Self {
        let state = FilterState::restore_persisted(|key| store.get::<String>(key));
        Self {
            state,
            store,
            observers: Vec::new(),
            generation: 0,
        }
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// Overlay a deep link on the current state.
    pub fn load_from_query(&mut self, query: &str) -> (ChangeSet, Vec<StateError>) {
        let (update, errors) = self.state.overlay_query_string(query);
        for error in &errors {
            log::warn!("Ignoring deep-link parameter: {error}");
        }
        (self.set_state(update), errors)
    }

    /// Apply `update`, persist the preference keys it changed and notify
    /// observers. Nothing happens when no key actually changed.
    pub fn set_state(&mut self, update: StateUpdate) -> ChangeSet {
        let changes = self.state.apply(update);
        if changes.is_empty() {
            return changes;
        }

        for (key, value) in self.state.persisted_entries(&changes) {
            if let Err(err) = self.store.set(key, &value) {
                log::warn!("Failed to persist {key}: {err}");
            }
        }
        for observer in &self.observers {
            observer(&self.state, &changes);
        }
        changes
    }

    pub fn reset(&mut self) -> ChangeSet {
        self.set_state(FilterState::reset_update())
    }

    pub fn subscribe(&mut self, observer: impl Fn(&FilterState, &ChangeSet) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// The shareable query string for the current state.
    pub fn link(&self) -> String {
        self.state.to_query_string()
    }

    /// Start a fetch. A refetch is a new query and makes every fetch started
    /// earlier stale; an append loads another page of the current query.
    pub fn begin_fetch(&mut self, kind: FetchKind) -> Generation {
        if kind == FetchKind::Refetch {
            self.generation += 1;
            log::debug!("query generation {}", self.generation);
        }
        self.generation
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        generation == self.generation
    }

    /// The catalog query for the current state.
    pub fn query(&self, page_size: usize) -> SearchQuery {
        SearchQuery {
            search: self.state.search.clone(),
            category: self.state.category.clone(),
            sort: self.state.sort,
            page: self.state.page,
            page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minenav_core::config::SortKey;
    use minenav_core::platform::{Platform, PlatformFilter};
    use minenav_core::state::{StateKey, ViewMode};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_preferences_survive_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        let mut router = Router::new(Store::new(dir.path()));
        router.set_state(StateUpdate {
            platform: Some(PlatformFilter::Only(Platform::Hangar)),
            sort: Some(SortKey::Updated),
            search: Some("claims".into()),
            view_mode: Some(ViewMode::List),
            ..StateUpdate::default()
        });

        let restarted = Router::new(Store::new(dir.path()));

        assert_eq!(restarted.state().platform, PlatformFilter::Only(Platform::Hangar));
        assert_eq!(restarted.state().sort, SortKey::Updated);
        assert_eq!(restarted.state().view_mode, ViewMode::List);
        assert_eq!(restarted.state().search, "");
        assert_eq!(restarted.state().page, 0);
    }

    #[test]
    fn test_deep_link_overlays_persisted_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut router = Router::new(Store::new(dir.path()));
        router.set_state(StateUpdate {
            sort: Some(SortKey::Newest),
            ..StateUpdate::default()
        });

        let (changes, errors) = router.load_from_query("?q=economy%20shop&page=2&bogus=1");

        assert_eq!(errors, vec![StateError::UnknownParameter("bogus".into())]);
        assert!(changes.contains(StateKey::Search));
        assert_eq!(router.state().sort, SortKey::Newest);
        assert_eq!(router.state().search, "economy shop");
        assert_eq!(router.state().page, 2);
        assert_eq!(router.link(), "sort=newest&q=economy%20shop&page=2");
    }

    #[test]
    fn test_observers_only_hear_real_changes() {
        let dir = tempfile::tempdir().unwrap();
        let mut router = Router::new(Store::new(dir.path()));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        router.subscribe(move |_, changes| sink.lock().unwrap().push(changes.fetch_kind()));

        router.set_state(StateUpdate {
            search: Some("x".into()),
            ..StateUpdate::default()
        });
        router.set_state(StateUpdate {
            search: Some("x".into()),
            ..StateUpdate::default()
        });
        router.set_state(StateUpdate {
            page: Some(1),
            ..StateUpdate::default()
        });

        assert_eq!(*seen.lock().unwrap(), vec![FetchKind::Refetch, FetchKind::Append]);
    }

    #[test]
    fn test_generations_mark_stale_fetches() {
        let dir = tempfile::tempdir().unwrap();
        let mut router = Router::new(Store::new(dir.path()));

        let first = router.begin_fetch(FetchKind::Refetch);
        let second = router.begin_fetch(FetchKind::Refetch);

        assert!(!router.is_current(first));
        assert!(router.is_current(second));
    }

    #[test]
    fn test_appends_share_the_query_generation() {
        let dir = tempfile::tempdir().unwrap();
        let mut router = Router::new(Store::new(dir.path()));

        let query = router.begin_fetch(FetchKind::Refetch);
        let page_two = router.begin_fetch(FetchKind::Append);
        let page_three = router.begin_fetch(FetchKind::Append);

        assert_eq!(query, page_two);
        assert!(router.is_current(page_two));
        assert!(router.is_current(page_three));

        router.begin_fetch(FetchKind::Refetch);
        assert!(!router.is_current(page_two));
    }

    #[test]
    fn test_reset_restores_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut router = Router::new(Store::new(dir.path()));
        router.set_state(StateUpdate {
            category: Some("economy".into()),
            page: Some(4),
            ..StateUpdate::default()
        });

        router.reset();

        assert_eq!(router.state(), &FilterState::default());
        assert_eq!(router.link(), "");
        assert_eq!(router.query(12), SearchQuery::default());
    }
}
