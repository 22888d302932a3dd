//! Native request paths and query parameters per registry.

use crate::config::{self, SortKey, DEFAULT_CATEGORY, ITEMS_PER_PAGE};
use serde::{Deserialize, Serialize};

/// A unified catalog query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchQuery {
    pub search: String,
    pub category: String,
    pub sort: SortKey,
    /// Zero-based.
    pub page: u32,
    pub page_size: usize,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: DEFAULT_CATEGORY.to_string(),
            sort: SortKey::default(),
            page: 0,
            page_size: ITEMS_PER_PAGE,
        }
    }
}

impl SearchQuery {
    fn trimmed_search(&self) -> Option<&str> {
        let search = self.search.trim();
        (!search.is_empty()).then_some(search)
    }

    fn offset(&self) -> usize {
        self.page as usize * self.page_size
    }

    /// Stable key for the search cache.
    pub fn cache_key(&self, platform: &str) -> String {
        format!(
            "{platform}_search_{}_{}_{}_{}_{}",
            self.search.trim(),
            self.category,
            self.sort,
            self.page,
            self.page_size
        )
    }
}

/// Path plus query parameters, relative to a registry's API base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub path: String,
    pub params: Vec<(&'static str, String)>,
}

impl Request {
    fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: Vec::new(),
        }
    }

    fn param(mut self, key: &'static str, value: impl ToString) -> Self {
        self.params.push((key, value.to_string()));
        self
    }

    /// Full URL with percent-encoded parameters.
    pub fn url(&self, base: &str) -> String {
        let mut url = format!("{}{}", base.trim_end_matches('/'), self.path);
        for (i, (key, value)) in self.params.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }
}

fn segment(value: &str) -> String {
    urlencoding::encode(value.trim()).into_owned()
}

/// `GET /search` with the plugin facet and an optional category facet.
pub fn modrinth_search(query: &SearchQuery) -> Request {
    let mut facets = vec![vec!["project_type:plugin".to_string()]];
    if let Some(slug) = config::category(&query.category).and_then(|c| c.modrinth_slug) {
        facets.push(vec![format!("categories:{slug}")]);
    }
    let facets = serde_json::to_string(&facets).unwrap_or_default();

    Request::new("/search")
        .param("query", query.trimmed_search().unwrap_or("*"))
        .param("facets", facets)
        .param("index", query.sort.modrinth_index())
        .param("offset", query.offset())
        .param("limit", query.page_size)
}

/// A search path when there is a query, a category path when a category is
/// selected, `/resources` otherwise. Spiget pages are 1-indexed.
pub fn spiget_search(query: &SearchQuery) -> Request {
    let path = match (
        query.trimmed_search(),
        config::category(&query.category).and_then(|c| c.spigot_category_id),
    ) {
        (Some(search), _) => format!("/search/resources/{}", segment(search)),
        (None, Some(id)) => format!("/categories/{id}/resources"),
        (None, None) => "/resources".to_string(),
    };

    Request::new(path)
        .param("size", query.page_size)
        .param("page", query.page + 1)
        .param("sort", query.sort.spiget_sort())
}

/// `GET /projects` with `q`, `category`, `sort`, `limit` and `offset`.
pub fn hangar_search(query: &SearchQuery) -> Request {
    let mut request = Request::new("/projects").param("q", query.trimmed_search().unwrap_or(""));
    if let Some(category) = config::category(&query.category).and_then(|c| c.hangar_category) {
        request = request.param("category", category);
    }
    request
        .param("sort", query.sort.hangar_sort())
        .param("limit", query.page_size)
        .param("offset", query.offset())
}

pub fn modrinth_project(id: &str) -> Request {
    Request::new(format!("/project/{}", segment(id)))
}

pub fn modrinth_versions(id: &str) -> Request {
    Request::new(format!("/project/{}/version", segment(id)))
}

pub fn modrinth_version(version_id: &str) -> Request {
    Request::new(format!("/version/{}", segment(version_id)))
}

pub fn spiget_resource(id: &str) -> Request {
    Request::new(format!("/resources/{}", segment(id)))
}

pub fn spiget_versions(id: &str) -> Request {
    Request::new(format!("/resources/{}/versions", segment(id)))
        .param("size", 100)
        .param("sort", "-releaseDate")
}

pub fn spiget_minecraft_versions() -> Request {
    Request::new("/minecraft/versions").param("size", 1000)
}

pub fn spiget_author(id: u64) -> Request {
    Request::new(format!("/authors/{id}"))
}

/// Each part of `owner/slug` is encoded on its own.
fn hangar_slug_path(slug: &str) -> String {
    slug.split('/').map(segment).collect::<Vec<_>>().join("/")
}

pub fn hangar_project(slug: &str) -> Request {
    Request::new(format!("/projects/{}", hangar_slug_path(slug)))
}

pub fn hangar_versions(slug: &str) -> Request {
    Request::new(format!("/projects/{}/versions", hangar_slug_path(slug)))
        .param("limit", 25)
        .param("offset", 0)
}
