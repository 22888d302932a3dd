//! Card and detail metadata derived from a project's detail and version list.

use crate::config::{self, SpecialTag};
use crate::hangar::{self, HangarProject, HangarVersion};
use crate::links::{self, PluginLinks};
use crate::model::{first_non_empty, HangarPlatformVersions, Rating, UNKNOWN};
use crate::modrinth::{self, ModrinthHit, ModrinthProject, ModrinthVersion};
use crate::spiget::{self, SpigetMinecraftVersion, SpigetResource, SpigetVersion};
use crate::tags::hangar_special_tags;
use crate::versions::{epoch_seconds_millis, format_version_list, iso_millis, latest_by_date};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    pub supported_versions: Vec<String>,
    pub latest_version: String,
    pub loader_compatibility: Vec<String>,
    pub links: PluginLinks,
    pub hangar_platform_versions: Option<HangarPlatformVersions>,
    pub rating: Option<Rating>,
    pub supports_folia: bool,
    pub special_tags: Vec<SpecialTag>,
}

/// One labelled line of text metadata. `key` is an i18n key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataLine {
    pub key: &'static str,
    pub value: String,
}

impl Default for Metadata {
    fn default() -> Self {
        fallback_metadata()
    }
}

/// What a card shows before, or instead of, a successful metadata fetch.
pub fn fallback_metadata() -> Metadata {
    Metadata {
        supported_versions: Vec::new(),
        latest_version: UNKNOWN.to_string(),
        loader_compatibility: Vec::new(),
        links: PluginLinks::new(),
        hangar_platform_versions: None,
        rating: None,
        supports_folia: false,
        special_tags: Vec::new(),
    }
}

impl Metadata {
    /// Text lines for the card footer and the detail header.
    ///
    /// `unknown` is the localized fallback for an empty version range.
    pub fn text_metadata(&self, unknown: &str) -> Vec<MetadataLine> {
        let mut lines = vec![
            MetadataLine {
                key: "meta.versions",
                value: format_version_list(&self.supported_versions, unknown),
            },
            MetadataLine {
                key: "meta.latest",
                value: if self.latest_version == UNKNOWN {
                    unknown.to_string()
                } else {
                    self.latest_version.clone()
                },
            },
        ];

        if !self.loader_compatibility.is_empty() {
            let labels: Vec<String> = self
                .loader_compatibility
                .iter()
                .map(|l| config::loader_label(l))
                .collect();
            lines.push(MetadataLine {
                key: "meta.loaders",
                value: labels.join(", "),
            });
        }

        if let Some(platforms) = self.hangar_platform_versions.as_ref() {
            for (key, versions) in [
                ("meta.paper", &platforms.paper),
                ("meta.velocity", &platforms.velocity),
                ("meta.waterfall", &platforms.waterfall),
            ] {
                if !versions.is_empty() {
                    lines.push(MetadataLine {
                        key,
                        value: format_version_list(versions, unknown),
                    });
                }
            }
        }

        if let Some(rating) = self.rating.filter(|r| r.count > 0) {
            lines.push(MetadataLine {
                key: "meta.rating",
                value: format!("{:.1} ({})", rating.average, rating.count),
            });
        }

        lines
    }
}

pub fn modrinth_metadata(
    project: &ModrinthProject,
    versions: &[ModrinthVersion],
    hit: Option<&ModrinthHit>,
) -> Metadata {
    let latest = latest_by_date(versions, |v| iso_millis(v.date_published.as_deref()));
    let latest_version = first_non_empty([
        latest.and_then(|v| v.version_number.as_deref()),
        project.version.as_deref(),
        project.latest_version.as_deref(),
        hit.and_then(|h| h.version_number.as_deref()),
    ])
    .unwrap_or_else(|| UNKNOWN.to_string());

    Metadata {
        supported_versions: modrinth::collect_game_versions(project, versions, hit),
        latest_version,
        loader_compatibility: modrinth::collect_loaders(project, versions, hit),
        links: links::modrinth_links(project),
        ..fallback_metadata()
    }
}

pub fn hangar_metadata(project: &HangarProject, versions: &[HangarVersion]) -> Metadata {
    let latest = latest_by_date(versions, |v| iso_millis(v.created_at.as_deref()));
    let latest_version = first_non_empty([latest.and_then(|v| v.name.as_deref())])
        .unwrap_or_else(|| UNKNOWN.to_string());

    let platform_versions = hangar::platform_versions(project, versions);
    Metadata {
        supported_versions: hangar::supported_versions(project, versions),
        latest_version,
        loader_compatibility: hangar::normalize_project(project).loaders,
        links: links::hangar_links(project),
        hangar_platform_versions: (!platform_versions.is_empty()).then_some(platform_versions),
        supports_folia: hangar::supports_folia(project),
        special_tags: hangar_special_tags(&hangar::project_tags(project)),
        ..fallback_metadata()
    }
}

pub fn spigot_metadata(
    resource: &SpigetResource,
    versions: &[SpigetVersion],
    minecraft_versions: &[SpigetMinecraftVersion],
) -> Metadata {
    let latest = latest_by_date(versions, |v| epoch_seconds_millis(v.release_date));
    let latest_version = first_non_empty([
        latest.and_then(|v| v.name.as_deref()),
        resource.version.as_ref().and_then(|v| v.name.as_deref()),
    ])
    .unwrap_or_else(|| UNKNOWN.to_string());

    Metadata {
        supported_versions: spiget::resolve_tested_versions(resource, minecraft_versions),
        latest_version,
        links: links::spigot_links(resource),
        rating: Some(spiget::rating(resource)),
        ..fallback_metadata()
    }
}
