//! Fan-out search across registries, with the session caches and detail
//! lookups on top of the adapters.

use crate::adapters::{hangar, modrinth, spiget, Registries};
use crate::prelude::*;
use futures::future::join_all;
use minenav_core::cache::{Cache, TtlCache};
use minenav_core::config::CACHE_DURATION;
use minenav_core::hangar as hangar_core;
use minenav_core::merge::{merge_pages, MergedResults};
use minenav_core::metadata::{self, Metadata};
use minenav_core::model::{PluginDetail, RawItem, SearchPage};
use minenav_core::modrinth as modrinth_core;
use minenav_core::platform::{Platform, PlatformFilter};
use minenav_core::query::SearchQuery;
use minenav_core::spiget as spiget_core;
use serde::Serialize;
use std::sync::Mutex;

/// A detail view and the metadata derived alongside it.
#[derive(Debug, Clone, Serialize)]
pub struct DetailView {
    #[serde(flatten)]
    pub detail: PluginDetail,
    pub metadata: Metadata,
    /// The detail fetch failed and `detail` was built from the search item.
    pub degraded: bool,
}

pub struct Catalog {
    registries: Registries,
    search_cache: Mutex<TtlCache<String, SearchPage>>,
    metadata_cache: Mutex<TtlCache<String, Metadata>>,
}

impl Catalog {
    pub fn new(registries: Registries) -> Self {
        Self {
            registries,
            search_cache: Mutex::new(TtlCache::new()),
            metadata_cache: Mutex::new(TtlCache::new()),
        }
    }

    /// One registry's page, served from the five-minute cache when possible.
    /// Failed pages are never cached.
    pub async fn search_platform(&self, platform: Platform, query: &SearchQuery) -> SearchPage {
        let key = query.cache_key(platform.as_str());
        let cached = self.search_cache.lock().ok().and_then(|cache| cache.get(&key));
        if let Some(page) = cached {
            log::debug!("search cache hit: {key}");
            return page;
        }

        let page = self.registries.search(platform, query).await;
        if !page.error {
            if let Ok(mut cache) = self.search_cache.lock() {
                cache.set(key, page.clone(), Some(CACHE_DURATION));
            }
        }
        page
    }

    /// Query every selected registry concurrently and merge the pages. One
    /// registry failing never fails the whole search.
    pub async fn search(&self, filter: PlatformFilter, query: &SearchQuery) -> MergedResults {
        let platforms = filter.platforms();
        let pages = join_all(
            platforms
                .iter()
                .map(|platform| self.search_platform(*platform, query)),
        )
        .await;

        let merged = merge_pages(pages, query.sort);
        if !merged.failed.is_empty() {
            log::debug!("search failed on {:?}", merged.failed);
        }
        merged
    }

    /// Fetch a single item by its native id, as a search would have returned it.
    pub async fn lookup(&self, platform: Platform, id: &str) -> Result<RawItem> {
        let id = id.trim();
        if id.is_empty() {
            return Err(eyre!("A {} plugin id is required", platform.display_name()));
        }

        let item = match platform {
            Platform::Modrinth => {
                let project = modrinth::project(&self.registries, id).await?;
                RawItem::Modrinth(modrinth_core::hit_from_project(&project))
            }
            Platform::Spigot => RawItem::Spigot(spiget::resource(&self.registries, id).await?),
            Platform::Hangar => RawItem::Hangar(hangar::project(&self.registries, id).await?),
        };
        Ok(item)
    }

    /// The detail view for `item`. Any fetch failure degrades to a detail
    /// built from the item itself.
    pub async fn detail(&self, item: &RawItem) -> DetailView {
        let view = match item {
            RawItem::Modrinth(hit) => self.modrinth_detail(hit).await,
            RawItem::Spigot(resource) => self.spigot_detail(resource).await,
            RawItem::Hangar(project) => self.hangar_detail(project).await,
        };

        if !view.degraded {
            if let Ok(mut cache) = self.metadata_cache.lock() {
                cache.set(item.key(), view.metadata.clone(), None);
            }
        }
        view
    }

    /// Metadata for `item`, cached for the whole session once resolved.
    pub async fn metadata(&self, item: &RawItem) -> Metadata {
        let key = item.key();
        let cached = self
            .metadata_cache
            .lock()
            .ok()
            .and_then(|cache| cache.get(&key));
        if let Some(metadata) = cached {
            log::debug!("metadata cache hit: {key}");
            return metadata;
        }
        self.detail(item).await.metadata
    }

    async fn modrinth_detail(&self, hit: &modrinth_core::ModrinthHit) -> DetailView {
        let id = modrinth_core::plugin_id(hit);
        if id.is_empty() {
            return degraded(modrinth_core::degraded_detail(hit));
        }

        let (project, versions) = futures::join!(
            modrinth::project(&self.registries, &id),
            modrinth::versions(&self.registries, &id)
        );
        let project = match project {
            Ok(project) => project,
            Err(err) => {
                log::warn!("Modrinth detail for {id} failed: {err}");
                return degraded(modrinth_core::degraded_detail(hit));
            }
        };
        let versions = match versions {
            Ok(versions) => versions,
            Err(err) => {
                log::warn!("Modrinth versions for {id} failed: {err}");
                self.modrinth_latest_version(&project, hit).await
            }
        };

        DetailView {
            detail: modrinth_core::normalize_project(&project, Some(hit)),
            metadata: metadata::modrinth_metadata(&project, &versions, Some(hit)),
            degraded: false,
        }
    }

    /// The single latest version, when the full version list is unavailable.
    async fn modrinth_latest_version(
        &self,
        project: &modrinth_core::ModrinthProject,
        hit: &modrinth_core::ModrinthHit,
    ) -> Vec<modrinth_core::ModrinthVersion> {
        let Some(version_id) = project
            .versions
            .last()
            .or(hit.latest_version.as_ref())
            .filter(|id| !id.is_empty())
        else {
            return Vec::new();
        };
        match modrinth::version(&self.registries, version_id).await {
            Ok(version) => vec![version],
            Err(err) => {
                log::warn!("Modrinth version {version_id} failed: {err}");
                Vec::new()
            }
        }
    }

    async fn spigot_detail(&self, listed: &spiget_core::SpigetResource) -> DetailView {
        let id = spiget_core::plugin_id(listed);
        if id.is_empty() {
            return degraded(spiget_core::degraded_detail(listed));
        }

        let (resource, versions, minecraft_versions) = futures::join!(
            spiget::resource(&self.registries, &id),
            spiget::versions(&self.registries, &id),
            spiget::minecraft_versions(&self.registries)
        );
        let resource = match resource {
            Ok(resource) => resource,
            Err(err) => {
                log::warn!("Spiget detail for {id} failed: {err}");
                return degraded(spiget_core::degraded_detail(listed));
            }
        };
        let versions = versions.unwrap_or_else(|err| {
            log::warn!("Spiget versions for {id} failed: {err}");
            Vec::new()
        });
        let minecraft_versions = minecraft_versions.unwrap_or_else(|err| {
            log::warn!("Spiget version table failed: {err}");
            Vec::new()
        });

        let author_id = resource
            .author
            .as_ref()
            .or(listed.author.as_ref())
            .map(|author| author.id)
            .unwrap_or_default();
        let author = if author_id == 0 {
            None
        } else {
            spiget::author(&self.registries, author_id)
                .await
                .map_err(|err| log::warn!("Spiget author {author_id} failed: {err}"))
                .ok()
        };

        DetailView {
            detail: spiget_core::normalize_detail(&resource, author.as_ref(), &minecraft_versions),
            metadata: metadata::spigot_metadata(&resource, &versions, &minecraft_versions),
            degraded: false,
        }
    }

    async fn hangar_detail(&self, listed: &hangar_core::HangarProject) -> DetailView {
        let slug = hangar_core::project_slug(listed);
        if slug.is_empty() {
            log::debug!("Hangar project without owner/slug, skipping detail fetch");
            return degraded(hangar_core::degraded_detail(listed));
        }

        let (project, versions) = futures::join!(
            hangar::project(&self.registries, &slug),
            hangar::versions(&self.registries, &slug)
        );
        let project = match project {
            Ok(project) => project,
            Err(err) => {
                log::warn!("Hangar detail for {slug} failed: {err}");
                return degraded(hangar_core::degraded_detail(listed));
            }
        };
        let versions = versions
            .map(|response| response.result)
            .unwrap_or_else(|err| {
                log::warn!("Hangar versions for {slug} failed: {err}");
                Vec::new()
            });

        DetailView {
            detail: hangar_core::normalize_detail(&project, &versions),
            metadata: metadata::hangar_metadata(&project, &versions),
            degraded: false,
        }
    }
}

fn degraded(detail: PluginDetail) -> DetailView {
    DetailView {
        detail,
        metadata: Metadata::default(),
        degraded: true,
    }
}
