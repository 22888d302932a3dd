//! Modrinth REST v2 models and normalization.

use crate::config::{self, project_url};
use crate::de::{lenient_items, lenient_string, lenient_strings, lenient_u64};
use crate::links::{self, PluginLinks};
use crate::model::{
    first_non_empty, parse_iso, PlatformExtras, PluginDetail, PluginSummary, NO_DESCRIPTION,
    UNKNOWN,
};
use crate::platform::Platform;
use crate::tags::{classify_modrinth_tags, TagClassification};
use serde::{Deserialize, Serialize};

/// Response of `GET /search`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModrinthSearchResponse {
    #[serde(deserialize_with = "lenient_items")]
    pub hits: Vec<ModrinthHit>,
    #[serde(deserialize_with = "lenient_u64")]
    pub total_hits: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub offset: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub limit: u64,
}

/// A search hit.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModrinthHit {
    #[serde(deserialize_with = "lenient_string")]
    pub project_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub slug: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub author: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub icon_url: Option<String>,
    #[serde(deserialize_with = "lenient_u64")]
    pub downloads: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub follows: u64,
    #[serde(deserialize_with = "lenient_strings")]
    pub categories: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub display_categories: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub loaders: Vec<String>,
    /// Game versions.
    #[serde(deserialize_with = "lenient_strings")]
    pub versions: Vec<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub latest_version: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub version_number: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub date_created: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub date_modified: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub project_type: Option<String>,
}

/// Response of `GET /project/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModrinthProject {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub slug: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub body: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub icon_url: Option<String>,
    #[serde(deserialize_with = "lenient_u64")]
    pub downloads: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub followers: u64,
    #[serde(deserialize_with = "lenient_strings")]
    pub categories: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub additional_categories: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub loaders: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub game_versions: Vec<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub published: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub updated: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub source_url: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub discord_url: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub wiki_url: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub issues_url: Option<String>,
    #[serde(deserialize_with = "lenient_items")]
    pub donation_urls: Vec<ModrinthDonationUrl>,
    #[serde(deserialize_with = "lenient_string")]
    pub team: Option<String>,
    /// Version ids, oldest first.
    #[serde(deserialize_with = "lenient_strings")]
    pub versions: Vec<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub version: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub latest_version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModrinthDonationUrl {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub platform: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub url: Option<String>,
}

/// An entry of `GET /project/{id}/version` or `GET /version/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModrinthVersion {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub version_number: Option<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub game_versions: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub loaders: Vec<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub date_published: Option<String>,
    #[serde(deserialize_with = "lenient_u64")]
    pub downloads: u64,
}

/// Native id: `project_id`, then `id`, then `slug`, else empty.
pub fn plugin_id(hit: &ModrinthHit) -> String {
    first_non_empty([
        hit.project_id.as_deref(),
        hit.id.as_deref(),
        hit.slug.as_deref(),
    ])
    .unwrap_or_default()
}

/// Partition a hit's categories and loaders.
pub fn classify_hit(hit: &ModrinthHit) -> TagClassification {
    classify_modrinth_tags(&hit.categories, &hit.loaders)
}

fn page_url(slug: Option<&str>, id: &str) -> String {
    let path = first_non_empty([slug, Some(id)]).unwrap_or_default();
    project_url(Platform::Modrinth, &path)
}

/// Normalize a search hit into a card summary.
pub fn normalize_hit(hit: &ModrinthHit) -> PluginSummary {
    let id = plugin_id(hit);
    let tags = classify_hit(hit);

    let mut categories = tags.normal_tags;
    categories.extend(tags.datapack_indicator);

    PluginSummary {
        url: page_url(hit.slug.as_deref(), &id),
        slug: first_non_empty([hit.slug.as_deref()]),
        title: first_non_empty([hit.title.as_deref()]).unwrap_or_else(|| UNKNOWN.to_string()),
        author: first_non_empty([hit.author.as_deref()]).unwrap_or_else(|| UNKNOWN.to_string()),
        description: first_non_empty([hit.description.as_deref()])
            .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        icon_url: first_non_empty([hit.icon_url.as_deref()]),
        downloads: hit.downloads,
        follows: hit.follows,
        categories,
        loaders: tags.loader_compatibility,
        updated_at: parse_iso(hit.date_modified.as_deref()),
        created_at: parse_iso(hit.date_created.as_deref()),
        platform: Platform::Modrinth,
        id,
    }
}

/// Normalize a project detail, falling back to the search hit it was opened from.
pub fn normalize_project(project: &ModrinthProject, hit: Option<&ModrinthHit>) -> PluginDetail {
    let fallback = hit.cloned().unwrap_or_default();
    let base = normalize_hit(&fallback);

    let id = first_non_empty([project.id.as_deref(), Some(base.id.as_str())]).unwrap_or_default();
    let slug = first_non_empty([project.slug.as_deref(), base.slug.as_deref()]);

    let mut categories = project.categories.clone();
    categories.extend(project.additional_categories.iter().cloned());
    if categories.is_empty() {
        categories = fallback.categories.clone();
    }
    let mut loaders = project.loaders.clone();
    if loaders.is_empty() {
        loaders = fallback.loaders.clone();
    }
    let tags = classify_modrinth_tags(&categories, &loaders);
    let mut categories = tags.normal_tags;
    categories.extend(tags.datapack_indicator);

    let mut game_versions = project.game_versions.clone();
    for version in &fallback.versions {
        if !game_versions.contains(version) {
            game_versions.push(version.clone());
        }
    }

    let description = first_non_empty([project.description.as_deref(), hit.and_then(|h| h.description.as_deref())])
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());
    let body = first_non_empty([project.body.as_deref()]).unwrap_or_else(|| description.clone());

    let summary = PluginSummary {
        url: page_url(slug.as_deref(), &id),
        title: first_non_empty([project.title.as_deref(), fallback.title.as_deref()])
            .unwrap_or_else(|| UNKNOWN.to_string()),
        author: base.author,
        description,
        icon_url: first_non_empty([project.icon_url.as_deref(), base.icon_url.as_deref()]),
        downloads: project.downloads.max(base.downloads),
        follows: if project.followers > 0 { project.followers } else { base.follows },
        categories,
        loaders: tags.loader_compatibility,
        updated_at: parse_iso(project.updated.as_deref()).or(base.updated_at),
        created_at: parse_iso(project.published.as_deref()).or(base.created_at),
        platform: Platform::Modrinth,
        slug,
        id,
    };

    PluginDetail {
        summary,
        body,
        game_versions,
        links: links::modrinth_links(project),
        extras: PlatformExtras::Modrinth,
    }
}

/// Build the detail view from a search hit alone, when the detail fetch failed.
pub fn degraded_detail(hit: &ModrinthHit) -> PluginDetail {
    let summary = normalize_hit(hit);
    PluginDetail {
        body: summary.description.clone(),
        game_versions: hit.versions.clone(),
        links: PluginLinks::new(),
        extras: PlatformExtras::Modrinth,
        summary,
    }
}

/// A search-hit shaped view of a project, for items opened by id rather
/// than from a result list. The author stays unset; projects only name a team.
pub fn hit_from_project(project: &ModrinthProject) -> ModrinthHit {
    ModrinthHit {
        project_id: project.id.clone(),
        slug: project.slug.clone(),
        title: project.title.clone(),
        description: project.description.clone(),
        icon_url: project.icon_url.clone(),
        downloads: project.downloads,
        follows: project.followers,
        categories: project.categories.clone(),
        loaders: project.loaders.clone(),
        versions: project.game_versions.clone(),
        date_created: project.published.clone(),
        date_modified: project.updated.clone(),
        project_type: Some("plugin".to_string()),
        ..ModrinthHit::default()
    }
}

/// Recognized loaders from the project, the hit and every version.
pub fn collect_loaders(
    project: &ModrinthProject,
    versions: &[ModrinthVersion],
    hit: Option<&ModrinthHit>,
) -> Vec<String> {
    let mut loaders: Vec<String> = Vec::new();
    let candidates = project
        .loaders
        .iter()
        .chain(hit.map(|h| h.loaders.iter()).into_iter().flatten())
        .chain(versions.iter().flat_map(|v| v.loaders.iter()));

    for token in candidates {
        if let Some(loader) = config::loader(token) {
            if !loaders.iter().any(|l| l == loader.id) {
                loaders.push(loader.id.to_string());
            }
        }
    }
    loaders
}

/// Game versions from the project, the hit and every version, deduplicated.
pub fn collect_game_versions(
    project: &ModrinthProject,
    versions: &[ModrinthVersion],
    hit: Option<&ModrinthHit>,
) -> Vec<String> {
    let mut collected: Vec<String> = Vec::new();
    let candidates = project
        .game_versions
        .iter()
        .chain(hit.map(|h| h.versions.iter()).into_iter().flatten())
        .chain(versions.iter().flat_map(|v| v.game_versions.iter()));

    for version in candidates {
        if !collected.contains(version) {
            collected.push(version.clone());
        }
    }
    collected
}
