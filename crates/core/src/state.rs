//! Catalog filter state, its diffing and its query-string form.

use crate::config::{self, storage_keys, SortKey, DEFAULT_CATEGORY};
use crate::platform::PlatformFilter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
    #[error("unknown parameter {0:?}")]
    UnknownParameter(String),
    #[error("malformed percent-encoding in {0:?}")]
    Encoding(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Grid => "grid",
            ViewMode::List => "list",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "grid" => Ok(ViewMode::Grid),
            "list" => Ok(ViewMode::List),
            other => Err(format!("Invalid view mode: {other}. Valid modes: grid, list")),
        }
    }
}

/// Keys of [`FilterState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKey {
    Platform,
    Category,
    Sort,
    Search,
    Page,
    ViewMode,
}

impl StateKey {
    /// Keys whose change invalidates the loaded results.
    pub const QUERY: [StateKey; 4] = [
        StateKey::Platform,
        StateKey::Category,
        StateKey::Sort,
        StateKey::Search,
    ];

    /// Keys mirrored to the preference store.
    pub const PERSISTED: [StateKey; 4] = [
        StateKey::Platform,
        StateKey::Category,
        StateKey::Sort,
        StateKey::ViewMode,
    ];

    fn storage_key(&self) -> Option<&'static str> {
        match self {
            StateKey::Platform => Some(storage_keys::PLATFORM),
            StateKey::Category => Some(storage_keys::CATEGORY),
            StateKey::Sort => Some(storage_keys::SORT),
            StateKey::ViewMode => Some(storage_keys::VIEW_MODE),
            StateKey::Search | StateKey::Page => None,
        }
    }
}

/// What a state transition asks the catalog to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchKind {
    /// Drop the loaded results and fetch page 0.
    Refetch,
    /// Fetch the current page and append it.
    Append,
    None,
}

/// The keys an update actually changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    keys: BTreeSet<StateKey>,
}

impl ChangeSet {
    pub fn contains(&self, key: StateKey) -> bool {
        self.keys.contains(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = StateKey> + '_ {
        self.keys.iter().copied()
    }

    pub fn fetch_kind(&self) -> FetchKind {
        if StateKey::QUERY.iter().any(|key| self.contains(*key)) {
            FetchKind::Refetch
        } else if self.contains(StateKey::Page) {
            FetchKind::Append
        } else {
            FetchKind::None
        }
    }

    fn insert(&mut self, key: StateKey) {
        self.keys.insert(key);
    }
}

/// A partial state; `None` leaves a key untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateUpdate {
    pub platform: Option<PlatformFilter>,
    pub category: Option<String>,
    pub sort: Option<SortKey>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub view_mode: Option<ViewMode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub platform: PlatformFilter,
    pub category: String,
    pub sort: SortKey,
    pub search: String,
    /// Zero-based.
    pub page: u32,
    pub view_mode: ViewMode,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            platform: PlatformFilter::All,
            category: DEFAULT_CATEGORY.to_string(),
            sort: SortKey::Downloads,
            search: String::new(),
            page: 0,
            view_mode: ViewMode::Grid,
        }
    }
}

fn set_if_changed<T: PartialEq>(
    slot: &mut T,
    value: Option<T>,
    key: StateKey,
    changes: &mut ChangeSet,
) {
    if let Some(value) = value {
        if *slot != value {
            *slot = value;
            changes.insert(key);
        }
    }
}

impl FilterState {
    /// Apply `update` and report which keys changed.
    ///
    /// A change to any query key moves the state back to page 0, unless the
    /// same update names a page of its own.
    pub fn apply(&mut self, update: StateUpdate) -> ChangeSet {
        let explicit_page = update.page.is_some();
        let mut changes = ChangeSet::default();
        set_if_changed(&mut self.platform, update.platform, StateKey::Platform, &mut changes);
        set_if_changed(&mut self.category, update.category, StateKey::Category, &mut changes);
        set_if_changed(&mut self.sort, update.sort, StateKey::Sort, &mut changes);
        set_if_changed(&mut self.search, update.search, StateKey::Search, &mut changes);
        set_if_changed(&mut self.page, update.page, StateKey::Page, &mut changes);
        set_if_changed(&mut self.view_mode, update.view_mode, StateKey::ViewMode, &mut changes);

        if changes.fetch_kind() == FetchKind::Refetch && !explicit_page && self.page != 0 {
            self.page = 0;
            changes.insert(StateKey::Page);
        }
        changes
    }

    /// An update that restores every default.
    pub fn reset_update() -> StateUpdate {
        let defaults = FilterState::default();
        StateUpdate {
            platform: Some(defaults.platform),
            category: Some(defaults.category),
            sort: Some(defaults.sort),
            search: Some(defaults.search),
            page: Some(defaults.page),
            view_mode: Some(defaults.view_mode),
        }
    }

    /// `platform, category, sort, q, page`, only where they differ from the
    /// defaults. An all-default state is the empty string.
    pub fn to_query_string(&self) -> String {
        let defaults = FilterState::default();
        let mut params: Vec<(&str, String)> = Vec::new();
        if self.platform != defaults.platform {
            params.push(("platform", self.platform.to_string()));
        }
        if self.category != defaults.category {
            params.push(("category", self.category.clone()));
        }
        if self.sort != defaults.sort {
            params.push(("sort", self.sort.to_string()));
        }
        if !self.search.is_empty() {
            params.push(("q", self.search.clone()));
        }
        if self.page > 0 {
            params.push(("page", self.page.to_string()));
        }

        params
            .iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Parse a query string; invalid values keep their defaults.
    pub fn from_query_string(query: &str) -> FilterState {
        Self::parse_query_string(query).0
    }

    /// Parse a query string, reporting every parameter that was ignored.
    pub fn parse_query_string(query: &str) -> (FilterState, Vec<StateError>) {
        let mut state = FilterState::default();
        let mut errors = Vec::new();

        let query = query.trim().trim_start_matches('?');
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, raw) = pair.split_once('=').unwrap_or((pair, ""));
            let value = match urlencoding::decode(&raw.replace('+', " ")) {
                Ok(value) => value.into_owned(),
                Err(_) => {
                    errors.push(StateError::Encoding(pair.to_string()));
                    continue;
                }
            };
            if let Err(err) = state.set_param(key, value) {
                errors.push(err);
            }
        }

        (state, errors)
    }

    fn set_param(&mut self, key: &str, value: String) -> Result<(), StateError> {
        let invalid = |value: String| StateError::InvalidValue {
            key: key.to_string(),
            value,
        };
        match key {
            "platform" => self.platform = value.parse().map_err(|_| invalid(value))?,
            "category" => match config::category(&value) {
                Some(category) => self.category = category.id.to_string(),
                None => return Err(invalid(value)),
            },
            "sort" => self.sort = value.parse().map_err(|_| invalid(value))?,
            "q" => self.search = value,
            "page" => self.page = value.trim().parse().map_err(|_| invalid(value))?,
            other => return Err(StateError::UnknownParameter(other.to_string())),
        }
        Ok(())
    }

    /// Storage entries for the persisted keys in `changes`.
    pub fn persisted_entries(&self, changes: &ChangeSet) -> Vec<(&'static str, String)> {
        changes
            .keys()
            .filter_map(|key| {
                let storage_key = key.storage_key()?;
                let value = match key {
                    StateKey::Platform => self.platform.to_string(),
                    StateKey::Category => self.category.clone(),
                    StateKey::Sort => self.sort.to_string(),
                    StateKey::ViewMode => self.view_mode.to_string(),
                    StateKey::Search | StateKey::Page => return None,
                };
                Some((storage_key, value))
            })
            .collect()
    }

    /// Build a state from stored preferences. Missing or invalid entries keep
    /// their defaults; search and page are never restored.
    pub fn restore_persisted<F>(lookup: F) -> FilterState
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut state = FilterState::default();
        for key in StateKey::PERSISTED {
            let Some(raw) = key.storage_key().and_then(&lookup) else {
                continue;
            };
            match key {
                StateKey::Platform => {
                    if let Ok(platform) = raw.parse() {
                        state.platform = platform;
                    }
                }
                StateKey::Category => {
                    if let Some(category) = config::category(&raw) {
                        state.category = category.id.to_string();
                    }
                }
                StateKey::Sort => {
                    if let Ok(sort) = raw.parse() {
                        state.sort = sort;
                    }
                }
                StateKey::ViewMode => {
                    if let Ok(mode) = raw.parse() {
                        state.view_mode = mode;
                    }
                }
                StateKey::Search | StateKey::Page => {}
            }
        }
        state
    }

    /// Merge deep-link parameters over this state. Only keys present in the
    /// query string are touched.
    pub fn overlay_query_string(&self, query: &str) -> (StateUpdate, Vec<StateError>) {
        let (parsed, errors) = Self::parse_query_string(query);
        let present = |name: &str| {
            query
                .trim_start_matches('?')
                .split('&')
                .any(|pair| pair.split_once('=').map(|(k, _)| k).unwrap_or(pair) == name)
        };

        let update = StateUpdate {
            platform: present("platform").then_some(parsed.platform),
            category: present("category").then(|| parsed.category.clone()),
            sort: present("sort").then_some(parsed.sort),
            search: present("q").then(|| parsed.search.clone()),
            page: present("page").then_some(parsed.page),
            view_mode: None,
        };
        (update, errors)
    }
}
