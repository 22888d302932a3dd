//! Hangar (PaperMC) REST v1 models and normalization.

use crate::config::{self, project_url};
use crate::de::{lenient, lenient_items, lenient_string, lenient_strings, lenient_u64};
use crate::links::{self, PluginLinks};
use crate::model::{
    first_non_empty, parse_iso, HangarPlatformVersions, PlatformExtras, PluginDetail,
    PluginSummary, NO_DESCRIPTION, UNKNOWN,
};
use crate::platform::Platform;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tag Hangar sets on projects that run on Folia.
pub const SUPPORTS_FOLIA: &str = "SUPPORTS_FOLIA";

/// Response of `GET /projects`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HangarProjectsResponse {
    #[serde(deserialize_with = "lenient")]
    pub pagination: HangarPagination,
    #[serde(deserialize_with = "lenient_items")]
    pub result: Vec<HangarProject>,
}

/// Response of `GET /projects/{slug}/versions`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HangarVersionsResponse {
    #[serde(deserialize_with = "lenient")]
    pub pagination: HangarPagination,
    #[serde(deserialize_with = "lenient_items")]
    pub result: Vec<HangarVersion>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HangarPagination {
    #[serde(deserialize_with = "lenient_u64")]
    pub count: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub limit: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub offset: u64,
}

/// A project from `/projects` or `/projects/{slug}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HangarProject {
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub namespace: Option<HangarNamespace>,
    /// Older payloads put the slug and owner at the top level.
    #[serde(deserialize_with = "lenient_string")]
    pub slug: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub owner: Option<HangarOwner>,
    #[serde(deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub avatar_url: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub stats: Option<HangarStats>,
    #[serde(deserialize_with = "lenient_string")]
    pub category: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub created_at: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub last_updated: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub settings: Option<HangarSettings>,
    #[serde(deserialize_with = "lenient_strings")]
    pub tags: Vec<String>,
    /// Minecraft versions keyed by sub-platform (`PAPER`, `VELOCITY`, `WATERFALL`).
    #[serde(deserialize_with = "lenient")]
    pub supported_platforms: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HangarNamespace {
    #[serde(deserialize_with = "lenient_string")]
    pub owner: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum HangarOwner {
    Plain(String),
    Named { name: Option<String> },
}

impl HangarOwner {
    fn name(&self) -> Option<&str> {
        match self {
            HangarOwner::Plain(name) => Some(name),
            HangarOwner::Named { name } => name.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HangarStats {
    #[serde(deserialize_with = "lenient_u64")]
    pub downloads: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub stars: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub views: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub watchers: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HangarSettings {
    #[serde(deserialize_with = "lenient_items")]
    pub links: Vec<HangarLinkSection>,
    #[serde(deserialize_with = "lenient_strings")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HangarLinkSection {
    #[serde(deserialize_with = "lenient")]
    pub id: Option<i64>,
    #[serde(rename = "type")]
    #[serde(deserialize_with = "lenient_string")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_items")]
    pub links: Vec<HangarLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HangarLink {
    #[serde(deserialize_with = "lenient")]
    pub id: Option<i64>,
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub url: Option<String>,
}

/// An entry of `/projects/{slug}/versions`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HangarVersion {
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub created_at: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub platform_dependencies: BTreeMap<String, Vec<HangarDependency>>,
}

/// A platform dependency is a bare version string or a `{version}` object.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum HangarDependency {
    Plain(String),
    Detailed { version: Option<String> },
}

impl HangarDependency {
    pub fn version(&self) -> Option<&str> {
        match self {
            HangarDependency::Plain(version) => Some(version),
            HangarDependency::Detailed { version } => version.as_deref(),
        }
    }
}

/// Native id: `namespace.slug`, then `slug`, then `name`, else empty.
pub fn plugin_id(project: &HangarProject) -> String {
    first_non_empty([
        project.namespace.as_ref().and_then(|ns| ns.slug.as_deref()),
        project.slug.as_deref(),
        project.name.as_deref(),
    ])
    .unwrap_or_default()
}

fn owner_name(project: &HangarProject) -> Option<String> {
    first_non_empty([
        project.namespace.as_ref().and_then(|ns| ns.owner.as_deref()),
        project.owner.as_ref().and_then(HangarOwner::name),
    ])
}

/// `owner/slug` for the detail endpoints, or an empty string when either
/// part is missing.
pub fn project_slug(project: &HangarProject) -> String {
    match (owner_name(project), first_non_empty([Some(plugin_id(project).as_str())])) {
        (Some(owner), Some(slug)) => format!("{owner}/{slug}"),
        _ => String::new(),
    }
}

/// Tags from `settings.tags` and the top-level `tags`, deduplicated.
pub fn project_tags(project: &HangarProject) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    let settings_tags = project.settings.iter().flat_map(|s| s.tags.iter());
    for tag in settings_tags.chain(project.tags.iter()) {
        if !tags.contains(tag) {
            tags.push(tag.clone());
        }
    }
    tags
}

pub fn supports_folia(project: &HangarProject) -> bool {
    project_tags(project)
        .iter()
        .any(|tag| tag.eq_ignore_ascii_case(SUPPORTS_FOLIA))
}

fn platform_entry<'a>(platforms: &'a BTreeMap<String, Vec<String>>, key: &str) -> &'a [String] {
    platforms
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(key))
        .map(|(_, versions)| versions.as_slice())
        .unwrap_or_default()
}

/// Union of every `platformDependencies` version across `versions`,
/// optionally limited to one sub-platform.
pub fn dependency_versions(versions: &[HangarVersion], platform: Option<&str>) -> Vec<String> {
    let mut collected: Vec<String> = Vec::new();
    for version in versions {
        for (name, entries) in &version.platform_dependencies {
            if platform.is_some_and(|p| !name.eq_ignore_ascii_case(p)) {
                continue;
            }
            for entry in entries {
                if let Some(v) = entry.version().map(str::trim).filter(|v| !v.is_empty()) {
                    if !collected.iter().any(|c| c == v) {
                        collected.push(v.to_string());
                    }
                }
            }
        }
    }
    collected
}

/// `supportedPlatforms.PAPER`, or the union of the versions'
/// `platformDependencies` when the project lists none.
pub fn supported_versions(project: &HangarProject, versions: &[HangarVersion]) -> Vec<String> {
    let paper = platform_entry(&project.supported_platforms, "PAPER");
    if paper.is_empty() {
        dependency_versions(versions, None)
    } else {
        paper.to_vec()
    }
}

/// Per-sub-platform versions from the project, then from the version list.
pub fn platform_versions(project: &HangarProject, versions: &[HangarVersion]) -> HangarPlatformVersions {
    let pick = |key: &str| {
        let listed = platform_entry(&project.supported_platforms, key);
        if listed.is_empty() {
            dependency_versions(versions, Some(key))
        } else {
            listed.to_vec()
        }
    };
    HangarPlatformVersions {
        paper: pick("PAPER"),
        velocity: pick("VELOCITY"),
        waterfall: pick("WATERFALL"),
    }
}

/// Normalize a search result into a card summary.
pub fn normalize_project(project: &HangarProject) -> PluginSummary {
    let id = plugin_id(project);
    let slug = project_slug(project);
    let stats = project.stats.clone().unwrap_or_default();

    let category = first_non_empty([project.category.as_deref()])
        .map(|c| c.to_lowercase())
        .unwrap_or_else(|| "misc".to_string());

    let loaders = project
        .supported_platforms
        .keys()
        .filter_map(|key| config::loader(key))
        .map(|loader| loader.id.to_string())
        .collect();

    PluginSummary {
        url: project_url(Platform::Hangar, &slug),
        slug: (!id.is_empty()).then(|| id.clone()),
        title: first_non_empty([project.name.as_deref()]).unwrap_or_else(|| UNKNOWN.to_string()),
        author: owner_name(project).unwrap_or_else(|| UNKNOWN.to_string()),
        description: first_non_empty([project.description.as_deref()])
            .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        icon_url: first_non_empty([project.avatar_url.as_deref()]),
        downloads: stats.downloads,
        follows: stats.stars,
        categories: vec![category],
        loaders,
        updated_at: parse_iso(project.last_updated.as_deref()),
        created_at: parse_iso(project.created_at.as_deref()),
        platform: Platform::Hangar,
        id,
    }
}

/// Normalize a project detail and its version list.
pub fn normalize_detail(project: &HangarProject, versions: &[HangarVersion]) -> PluginDetail {
    let summary = normalize_project(project);
    PluginDetail {
        body: summary.description.clone(),
        game_versions: supported_versions(project, versions),
        links: links::hangar_links(project),
        extras: PlatformExtras::Hangar {
            supports_folia: supports_folia(project),
            platform_versions: platform_versions(project, versions),
        },
        summary,
    }
}

/// Build the detail view from a search result alone, when the detail fetch
/// failed or the project has no usable slug.
pub fn degraded_detail(project: &HangarProject) -> PluginDetail {
    let summary = normalize_project(project);
    PluginDetail {
        body: summary.description.clone(),
        game_versions: supported_versions(project, &[]),
        links: PluginLinks::new(),
        extras: PlatformExtras::Hangar {
            supports_folia: supports_folia(project),
            platform_versions: platform_versions(project, &[]),
        },
        summary,
    }
}
