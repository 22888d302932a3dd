//! Spiget (SpigotMC) REST v2 models and normalization.

use crate::config::{project_url, SPIGOT_SITE};
use crate::de::{lenient, lenient_string, lenient_u64};
use crate::links::{self, PluginLinks};
use crate::model::{
    first_non_empty, from_epoch_seconds, PlatformExtras, PluginDetail, PluginSummary, Rating,
    NO_DESCRIPTION, UNKNOWN,
};
use crate::platform::Platform;
use base64::Engine;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// A resource from `/resources`, `/search/resources/{query}` or `/resources/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpigetResource {
    #[serde(deserialize_with = "lenient_u64")]
    pub id: u64,
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    /// One-line description.
    #[serde(deserialize_with = "lenient_string")]
    pub tag: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub author: Option<SpigetIdRef>,
    #[serde(deserialize_with = "lenient")]
    pub icon: Option<SpigetIcon>,
    #[serde(deserialize_with = "lenient_u64")]
    pub downloads: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub likes: u64,
    #[serde(deserialize_with = "lenient")]
    pub rating: Option<SpigetRating>,
    #[serde(deserialize_with = "lenient")]
    pub category: Option<SpigetIdRef>,
    /// Unix seconds.
    #[serde(deserialize_with = "lenient")]
    pub release_date: Option<i64>,
    /// Unix seconds.
    #[serde(deserialize_with = "lenient")]
    pub update_date: Option<i64>,
    /// Strings, numeric ids or `{id, name}` objects depending on the resource's age.
    #[serde(deserialize_with = "lenient")]
    pub tested_versions: Vec<Value>,
    #[serde(deserialize_with = "lenient")]
    pub version: Option<SpigetIdRef>,
    #[serde(deserialize_with = "lenient_string")]
    pub source_code_link: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub donation_link: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub links: BTreeMap<String, Value>,
    #[serde(deserialize_with = "lenient_string")]
    pub github_url: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub discord_url: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub wiki_url: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub documentation: Option<String>,
    /// Base64-encoded HTML, only on detail responses.
    #[serde(deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub premium: bool,
    #[serde(deserialize_with = "lenient")]
    pub external: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SpigetIdRef {
    #[serde(deserialize_with = "lenient_u64")]
    pub id: u64,
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SpigetIcon {
    #[serde(deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub data: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SpigetRating {
    #[serde(deserialize_with = "lenient_u64")]
    pub count: u64,
    #[serde(deserialize_with = "lenient")]
    pub average: f64,
}

/// An entry of `/resources/{id}/versions`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpigetVersion {
    #[serde(deserialize_with = "lenient_u64")]
    pub id: u64,
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    /// Unix seconds.
    #[serde(deserialize_with = "lenient")]
    pub release_date: Option<i64>,
    #[serde(deserialize_with = "lenient_u64")]
    pub downloads: u64,
}

/// Response of `/authors/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SpigetAuthor {
    #[serde(deserialize_with = "lenient_u64")]
    pub id: u64,
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
}

/// An entry of `/minecraft/versions`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SpigetMinecraftVersion {
    pub id: Value,
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
}

/// SpigotMC resource category names by id.
const SPIGOT_CATEGORY_NAMES: &[(u64, &str)] = &[
    (2, "bungee_spigot"),
    (3, "bungee_proxy"),
    (4, "spigot"),
    (5, "transportation"),
    (6, "chat"),
    (7, "tools_and_utilities"),
    (8, "misc"),
    (14, "chat"),
    (15, "tools_and_utilities"),
    (16, "misc"),
    (17, "fun"),
    (18, "world_management"),
    (22, "mechanics"),
    (23, "economy"),
    (24, "game_mode"),
    (25, "skript"),
    (26, "libraries_apis"),
];

/// Native id as a string, empty when the resource has none.
pub fn plugin_id(resource: &SpigetResource) -> String {
    if resource.id == 0 {
        String::new()
    } else {
        resource.id.to_string()
    }
}

fn category_tag(category: Option<&SpigetIdRef>) -> String {
    let Some(category) = category else {
        return "misc".to_string();
    };
    first_non_empty([category.name.as_deref()])
        .map(|name| name.to_lowercase().replace([' ', '/'], "_"))
        .or_else(|| {
            SPIGOT_CATEGORY_NAMES
                .iter()
                .find(|(id, _)| *id == category.id)
                .map(|(_, name)| name.to_string())
        })
        .unwrap_or_else(|| "misc".to_string())
}

/// Spiget icon paths are relative to the SpigotMC site.
fn icon_url(icon: Option<&SpigetIcon>) -> Option<String> {
    let url = first_non_empty([icon?.url.as_deref()])?;
    if url.starts_with("http://") || url.starts_with("https://") {
        Some(url)
    } else {
        Some(format!("{SPIGOT_SITE}/{}", url.trim_start_matches('/')))
    }
}

/// Normalize a list/search resource into a card summary.
pub fn normalize_resource(resource: &SpigetResource) -> PluginSummary {
    let id = plugin_id(resource);
    let follows = if resource.likes > 0 {
        resource.likes
    } else {
        resource.rating.as_ref().map(|r| r.count).unwrap_or(0)
    };

    PluginSummary {
        url: project_url(Platform::Spigot, &id),
        slug: None,
        title: first_non_empty([resource.name.as_deref()]).unwrap_or_else(|| UNKNOWN.to_string()),
        author: first_non_empty([resource.author.as_ref().and_then(|a| a.name.as_deref())])
            .unwrap_or_else(|| UNKNOWN.to_string()),
        description: first_non_empty([resource.tag.as_deref()])
            .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        icon_url: icon_url(resource.icon.as_ref()),
        downloads: resource.downloads,
        follows,
        categories: vec![category_tag(resource.category.as_ref())],
        loaders: Vec::new(),
        updated_at: from_epoch_seconds(resource.update_date)
            .or_else(|| from_epoch_seconds(resource.release_date)),
        created_at: from_epoch_seconds(resource.release_date),
        platform: Platform::Spigot,
        id,
    }
}

fn html_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]*>").expect("static regex"))
}

fn line_break_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)<br\s*/?>|</p>|</li>|</div>").expect("static regex"))
}

fn blank_lines_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\n\s*\n(\s*\n)+").expect("static regex"))
}

/// Decode a base64 HTML description into plain text.
pub fn decode_description(encoded: &str) -> Option<String> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .ok()?;
    let html = String::from_utf8_lossy(&bytes);
    let with_breaks = line_break_pattern().replace_all(&html, "\n");
    let stripped = html_tag_pattern().replace_all(&with_breaks, "");
    let decoded = html_escape::decode_html_entities(&stripped);
    let text = blank_lines_pattern().replace_all(decoded.trim(), "\n\n");
    (!text.is_empty()).then(|| text.into_owned())
}

fn value_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Tested Minecraft versions as names, resolving numeric ids through the
/// version table when it is available.
pub fn resolve_tested_versions(
    resource: &SpigetResource,
    minecraft_versions: &[SpigetMinecraftVersion],
) -> Vec<String> {
    let lookup = |id: &Value| -> Option<String> {
        let key = value_key(id)?;
        minecraft_versions
            .iter()
            .find(|v| value_key(&v.id).as_deref() == Some(key.as_str()))
            .and_then(|v| v.name.clone())
    };

    let mut resolved: Vec<String> = Vec::new();
    for entry in &resource.tested_versions {
        let name = match entry {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => lookup(entry).or_else(|| Some(n.to_string())),
            Value::Object(map) => {
                let id = map.get("id").cloned().unwrap_or(Value::Null);
                lookup(&id)
                    .or_else(|| map.get("name").and_then(value_key))
                    .or_else(|| value_key(&id))
            }
            _ => None,
        };
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            if !resolved.contains(&name) {
                resolved.push(name);
            }
        }
    }
    resolved
}

/// Normalize a resource detail.
pub fn normalize_detail(
    resource: &SpigetResource,
    author: Option<&SpigetAuthor>,
    minecraft_versions: &[SpigetMinecraftVersion],
) -> PluginDetail {
    let mut summary = normalize_resource(resource);
    if let Some(name) = first_non_empty([author.and_then(|a| a.name.as_deref())]) {
        summary.author = name;
    }

    let body = resource
        .description
        .as_deref()
        .and_then(decode_description)
        .unwrap_or_else(|| summary.description.clone());

    PluginDetail {
        body,
        game_versions: resolve_tested_versions(resource, minecraft_versions),
        links: links::spigot_links(resource),
        extras: PlatformExtras::Spigot {
            rating: rating(resource),
        },
        summary,
    }
}

/// Build the detail view from a list resource alone, when the detail fetch failed.
pub fn degraded_detail(resource: &SpigetResource) -> PluginDetail {
    let summary = normalize_resource(resource);
    PluginDetail {
        body: summary.description.clone(),
        game_versions: resolve_tested_versions(resource, &[]),
        links: PluginLinks::new(),
        extras: PlatformExtras::Spigot {
            rating: rating(resource),
        },
        summary,
    }
}

pub fn rating(resource: &SpigetResource) -> Rating {
    resource
        .rating
        .as_ref()
        .map(|r| Rating {
            count: r.count,
            average: r.average,
        })
        .unwrap_or_default()
}
