//! External project links (source, Discord, wiki, issues, donations).

use crate::config::LinkKind;
use crate::hangar::HangarProject;
use crate::modrinth::ModrinthProject;
use crate::spiget::SpigetResource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginLink {
    pub label: String,
    pub icon: String,
    pub url: String,
}

/// Links keyed by kind. A missing link is a missing key.
pub type PluginLinks = BTreeMap<LinkKind, PluginLink>;

fn usable_url(url: Option<&str>) -> Option<&str> {
    let url = url?.trim();
    let lower = url.to_ascii_lowercase();
    (lower.starts_with("https://") || lower.starts_with("http://")).then_some(url)
}

/// Insert the first usable URL for `kind`, keeping an existing entry.
fn offer<'a, I>(links: &mut PluginLinks, kind: LinkKind, candidates: I)
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    if links.contains_key(&kind) {
        return;
    }
    if let Some(url) = candidates.into_iter().find_map(usable_url) {
        links.insert(
            kind,
            PluginLink {
                label: kind.label().to_string(),
                icon: kind.icon().to_string(),
                url: url.to_string(),
            },
        );
    }
}

pub fn modrinth_links(project: &ModrinthProject) -> PluginLinks {
    let mut links = PluginLinks::new();
    offer(&mut links, LinkKind::Source, [project.source_url.as_deref()]);
    offer(&mut links, LinkKind::Discord, [project.discord_url.as_deref()]);
    offer(&mut links, LinkKind::Wiki, [project.wiki_url.as_deref()]);
    offer(&mut links, LinkKind::Issues, [project.issues_url.as_deref()]);
    offer(
        &mut links,
        LinkKind::Donate,
        project.donation_urls.iter().map(|d| d.url.as_deref()),
    );
    links
}

/// Map a Hangar link name to a kind.
fn hangar_link_kind(name: &str) -> Option<LinkKind> {
    match name.trim().to_lowercase().as_str() {
        "support" | "discord" => Some(LinkKind::Discord),
        "source" | "github" | "source code" => Some(LinkKind::Source),
        "wiki" | "documentation" | "docs" => Some(LinkKind::Wiki),
        "issues" | "issue tracker" | "bug tracker" => Some(LinkKind::Issues),
        "donate" | "donation" | "sponsor" => Some(LinkKind::Donate),
        _ => None,
    }
}

/// Links from the `settings.links` groups, matched by link name.
pub fn hangar_links(project: &HangarProject) -> PluginLinks {
    let mut links = PluginLinks::new();
    let Some(settings) = project.settings.as_ref() else {
        return links;
    };

    for link in settings.links.iter().flat_map(|section| section.links.iter()) {
        if let Some(kind) = link.name.as_deref().and_then(hangar_link_kind) {
            offer(&mut links, kind, [link.url.as_deref()]);
        }
    }
    links
}

/// Links from the current Spiget fields, then the legacy ones.
pub fn spigot_links(resource: &SpigetResource) -> PluginLinks {
    let legacy = |key: &str| resource.links.get(key).and_then(|v| v.as_str());

    let mut links = PluginLinks::new();
    offer(
        &mut links,
        LinkKind::Source,
        [
            resource.source_code_link.as_deref(),
            legacy("github"),
            legacy("source"),
            resource.github_url.as_deref(),
        ],
    );
    offer(
        &mut links,
        LinkKind::Discord,
        [legacy("discord"), resource.discord_url.as_deref()],
    );
    offer(
        &mut links,
        LinkKind::Wiki,
        [
            resource.documentation.as_deref(),
            resource.wiki_url.as_deref(),
            legacy("wiki"),
        ],
    );
    offer(&mut links, LinkKind::Issues, [legacy("issues")]);
    offer(
        &mut links,
        LinkKind::Donate,
        [resource.donation_link.as_deref(), legacy("donate")],
    );
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_modrinth_links() {
        let project: ModrinthProject = serde_json::from_value(json!({
            "source_url": "https://github.com/a/b",
            "discord_url": "https://discord.gg/x",
            "wiki_url": "",
            "issues_url": null,
            "donation_urls": [{"id": "patreon", "url": "https://patreon.com/a"}]
        }))
        .unwrap();

        let links = modrinth_links(&project);

        assert_eq!(links[&LinkKind::Source].url, "https://github.com/a/b");
        assert_eq!(links[&LinkKind::Discord].label, "Discord");
        assert_eq!(links[&LinkKind::Donate].url, "https://patreon.com/a");
        assert!(!links.contains_key(&LinkKind::Wiki));
        assert!(!links.contains_key(&LinkKind::Issues));
    }

    #[test]
    fn test_hangar_links_by_name() {
        let project: HangarProject = serde_json::from_value(json!({
            "settings": {
                "links": [
                    {"id": 0, "type": "top", "title": "Top", "links": [
                        {"id": 0, "name": "Support", "url": "https://discord.gg/paper"},
                        {"id": 1, "name": "Source", "url": "https://github.com/PaperMC/x"}
                    ]},
                    {"id": 1, "type": "sidebar", "links": [
                        {"id": 2, "name": "Wiki", "url": "https://docs.papermc.io"},
                        {"id": 3, "name": "Homepage", "url": "https://papermc.io"},
                        {"id": 4, "name": "Issues", "url": null}
                    ]}
                ]
            }
        }))
        .unwrap();

        let links = hangar_links(&project);

        assert_eq!(links[&LinkKind::Discord].url, "https://discord.gg/paper");
        assert_eq!(links[&LinkKind::Source].url, "https://github.com/PaperMC/x");
        assert_eq!(links[&LinkKind::Wiki].url, "https://docs.papermc.io");
        assert!(!links.contains_key(&LinkKind::Issues));
        assert_eq!(links.len(), 3);
    }

    #[test]
    fn test_hangar_links_without_settings() {
        assert!(hangar_links(&HangarProject::default()).is_empty());
    }

    #[test]
    fn test_spigot_links_with_legacy_fallback() {
        let resource: SpigetResource = serde_json::from_value(json!({
            "id": 1,
            "sourceCodeLink": "",
            "donationLink": "https://paypal.me/a",
            "links": {
                "github": "https://github.com/legacy/repo",
                "discussion": "threads/foo.123/",
                "discord": 42
            },
            "discordUrl": "https://discord.gg/legacy"
        }))
        .unwrap();

        let links = spigot_links(&resource);

        assert_eq!(links[&LinkKind::Source].url, "https://github.com/legacy/repo");
        assert_eq!(links[&LinkKind::Discord].url, "https://discord.gg/legacy");
        assert_eq!(links[&LinkKind::Donate].url, "https://paypal.me/a");
        assert!(!links.contains_key(&LinkKind::Wiki));
    }

    #[test]
    fn test_relative_urls_are_not_links() {
        let resource: SpigetResource =
            serde_json::from_value(json!({"id": 1, "links": {"wiki": "wiki/page"}})).unwrap();
        assert!(spigot_links(&resource).is_empty());
    }
}
