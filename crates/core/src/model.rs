//! Unified plugin records shared by every registry.

use crate::hangar::{self, HangarProject};
use crate::links::PluginLinks;
use crate::modrinth::{self, ModrinthHit};
use crate::platform::Platform;
use crate::spiget::{self, SpigetResource};
use chrono::{DateTime, Utc};
use crate::de::lenient_items;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Literal used when a registry gives no usable value for a text field.
pub const UNKNOWN: &str = "Unknown";

/// Literal used when a registry gives no description.
pub const NO_DESCRIPTION: &str = "No description";

/// A plugin as shown on a catalog card.
///
/// `id` is only unique within `platform`; use [`PluginSummary::key`] for
/// cross-platform identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginSummary {
    pub id: String,
    pub slug: Option<String>,
    pub title: String,
    pub author: String,
    pub description: String,
    pub icon_url: Option<String>,
    pub downloads: u64,
    pub follows: u64,
    pub categories: Vec<String>,
    pub loaders: Vec<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub platform: Platform,
    pub url: String,
}

impl PluginSummary {
    /// `platform:id`, unique across registries.
    pub fn key(&self) -> String {
        format!("{}:{}", self.platform, self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rating {
    pub count: u64,
    pub average: f64,
}

/// Supported Minecraft versions per Hangar sub-platform.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HangarPlatformVersions {
    pub paper: Vec<String>,
    pub velocity: Vec<String>,
    pub waterfall: Vec<String>,
}

impl HangarPlatformVersions {
    pub fn is_empty(&self) -> bool {
        self.paper.is_empty() && self.velocity.is_empty() && self.waterfall.is_empty()
    }
}

/// Fields only one registry provides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PlatformExtras {
    Modrinth,
    Spigot {
        rating: Rating,
    },
    Hangar {
        supports_folia: bool,
        platform_versions: HangarPlatformVersions,
    },
}

/// A plugin as shown in the detail view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginDetail {
    #[serde(flatten)]
    pub summary: PluginSummary,
    pub body: String,
    pub game_versions: Vec<String>,
    pub links: PluginLinks,
    pub extras: PlatformExtras,
}

/// A raw search result tagged with the registry it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawItem {
    Modrinth(ModrinthHit),
    Spigot(SpigetResource),
    Hangar(HangarProject),
}

impl RawItem {
    pub fn platform(&self) -> Platform {
        match self {
            RawItem::Modrinth(_) => Platform::Modrinth,
            RawItem::Spigot(_) => Platform::Spigot,
            RawItem::Hangar(_) => Platform::Hangar,
        }
    }

    /// Native id, or an empty string when the item carries none.
    pub fn plugin_id(&self) -> String {
        match self {
            RawItem::Modrinth(hit) => modrinth::plugin_id(hit),
            RawItem::Spigot(resource) => spiget::plugin_id(resource),
            RawItem::Hangar(project) => hangar::plugin_id(project),
        }
    }

    /// `platform:id`, unique across registries.
    pub fn key(&self) -> String {
        format!("{}:{}", self.platform(), self.plugin_id())
    }

    pub fn normalize(&self) -> PluginSummary {
        match self {
            RawItem::Modrinth(hit) => modrinth::normalize_hit(hit),
            RawItem::Spigot(resource) => spiget::normalize_resource(resource),
            RawItem::Hangar(project) => hangar::normalize_project(project),
        }
    }

    /// Rebuild a raw item from stored JSON, using `platform` to pick the shape.
    pub fn from_json(platform: Platform, value: serde_json::Value) -> serde_json::Result<Self> {
        Ok(match platform {
            Platform::Modrinth => RawItem::Modrinth(serde_json::from_value(value)?),
            Platform::Spigot => RawItem::Spigot(serde_json::from_value(value)?),
            Platform::Hangar => RawItem::Hangar(serde_json::from_value(value)?),
        })
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// A bare JSON array response. Entries that do not decode are dropped so one
/// bad record cannot sink the rest.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent, bound(deserialize = "T: DeserializeOwned"))]
pub struct ItemList<T>(#[serde(deserialize_with = "lenient_items")] pub Vec<T>);

/// One registry's contribution to a search.
///
/// Spiget answers with a bare array, so its `total` is just the page length
/// and `total_exact` is false.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPage {
    pub platform: Platform,
    pub hits: Vec<RawItem>,
    pub total: u64,
    pub total_exact: bool,
    pub error: bool,
}

impl SearchPage {
    pub fn new(platform: Platform, hits: Vec<RawItem>, total: u64, total_exact: bool) -> Self {
        Self {
            platform,
            hits,
            total,
            total_exact,
            error: false,
        }
    }

    /// The empty page an adapter returns instead of an error.
    pub fn failed(platform: Platform) -> Self {
        Self {
            platform,
            hits: Vec::new(),
            total: 0,
            total_exact: false,
            error: true,
        }
    }
}

/// Pick the first non-blank string.
pub(crate) fn first_non_empty<'a, I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parse an ISO-8601 timestamp; anything else is `None`.
pub(crate) fn parse_iso(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value?.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Convert Unix seconds to a timestamp; zero and negatives are `None`.
pub(crate) fn from_epoch_seconds(value: Option<i64>) -> Option<DateTime<Utc>> {
    value
        .filter(|secs| *secs > 0)
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
}
