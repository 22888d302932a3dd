//! Static lookup tables shared by the adapters, the normalizers and the renderer.
//!
//! Everything here is immutable and compiled in; nothing is loaded at runtime.

use crate::platform::Platform;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Results requested from each registry per page.
pub const ITEMS_PER_PAGE: usize = 12;

/// Client-side timeout applied to every outbound request.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Lifetime of cached search pages.
pub const CACHE_DURATION: Duration = Duration::from_secs(300);

/// Delay between the last search keystroke and the search itself.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

pub const MODRINTH_API_BASE: &str = "https://api.modrinth.com/v2";
pub const SPIGET_API_BASE: &str = "https://api.spiget.org/v2";
pub const HANGAR_API_BASE: &str = "https://hangar.papermc.io/api/v1";

pub const MODRINTH_SITE: &str = "https://modrinth.com";
pub const SPIGOT_SITE: &str = "https://www.spigotmc.org";
pub const HANGAR_SITE: &str = "https://hangar.papermc.io";

/// Persisted preference keys.
pub mod storage_keys {
    pub const THEME: &str = "theme";
    pub const PLATFORM: &str = "platform";
    pub const CATEGORY: &str = "category";
    pub const SORT: &str = "sort";
    pub const VIEW_MODE: &str = "view-mode";
    pub const FAVORITES: &str = "plugin-favorites";
    pub const LAYOUT: &str = "layout-mode";
    pub const LOCALE: &str = "locale";
}

/// A unified category and its native token on each registry.
///
/// `None` means the registry has no equivalent and the category filter is
/// not sent to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub id: &'static str,
    pub icon: &'static str,
    pub modrinth_slug: Option<&'static str>,
    pub spigot_category_id: Option<u32>,
    pub hangar_category: Option<&'static str>,
}

pub const DEFAULT_CATEGORY: &str = "all";

pub const CATEGORIES: &[Category] = &[
    Category {
        id: "all",
        icon: "fa-border-all",
        modrinth_slug: None,
        spigot_category_id: None,
        hangar_category: None,
    },
    Category {
        id: "admin",
        icon: "fa-shield-halved",
        modrinth_slug: Some("management"),
        spigot_category_id: Some(15),
        hangar_category: Some("admin_tools"),
    },
    Category {
        id: "gameplay",
        icon: "fa-bolt",
        modrinth_slug: Some("game-mechanics"),
        spigot_category_id: Some(22),
        hangar_category: Some("gameplay"),
    },
    Category {
        id: "world",
        icon: "fa-globe",
        modrinth_slug: Some("worldgen"),
        spigot_category_id: Some(18),
        hangar_category: Some("world_management"),
    },
    Category {
        id: "economy",
        icon: "fa-coins",
        modrinth_slug: Some("economy"),
        spigot_category_id: Some(23),
        hangar_category: Some("economy"),
    },
    Category {
        id: "chat",
        icon: "fa-comments",
        modrinth_slug: Some("social"),
        spigot_category_id: Some(14),
        hangar_category: Some("chat"),
    },
    Category {
        id: "utility",
        icon: "fa-wrench",
        modrinth_slug: Some("utility"),
        spigot_category_id: Some(15),
        hangar_category: Some("admin_tools"),
    },
    Category {
        id: "dev",
        icon: "fa-code",
        modrinth_slug: Some("library"),
        spigot_category_id: Some(26),
        hangar_category: Some("dev_tools"),
    },
    Category {
        id: "misc",
        icon: "fa-ellipsis",
        modrinth_slug: None,
        spigot_category_id: Some(16),
        hangar_category: Some("misc"),
    },
];

/// Look up a unified category by id (case-insensitive).
pub fn category(id: &str) -> Option<&'static Category> {
    let id = id.trim();
    CATEGORIES.iter().find(|c| c.id.eq_ignore_ascii_case(id))
}

/// Unified sort keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    #[default]
    Downloads,
    Newest,
    Updated,
    Follows,
    NameAsc,
    NameDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        SortKey::Downloads,
        SortKey::Newest,
        SortKey::Updated,
        SortKey::Follows,
        SortKey::NameAsc,
        SortKey::NameDesc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Downloads => "downloads",
            SortKey::Newest => "newest",
            SortKey::Updated => "updated",
            SortKey::Follows => "follows",
            SortKey::NameAsc => "name-asc",
            SortKey::NameDesc => "name-desc",
        }
    }

    /// Modrinth `index` parameter. Modrinth has no name index.
    pub fn modrinth_index(&self) -> &'static str {
        match self {
            SortKey::Downloads => "downloads",
            SortKey::Newest => "newest",
            SortKey::Updated => "updated",
            SortKey::Follows => "follows",
            SortKey::NameAsc | SortKey::NameDesc => "relevance",
        }
    }

    /// Spiget `sort` parameter, `-` prefixed for descending.
    pub fn spiget_sort(&self) -> &'static str {
        match self {
            SortKey::Downloads => "-downloads",
            SortKey::Newest => "-releaseDate",
            SortKey::Updated => "-updateDate",
            SortKey::Follows => "-rating",
            SortKey::NameAsc => "name",
            SortKey::NameDesc => "-name",
        }
    }

    /// Hangar `sort` parameter, `-` prefixed for descending.
    pub fn hangar_sort(&self) -> &'static str {
        match self {
            SortKey::Downloads => "-downloads",
            SortKey::Newest => "-newest",
            SortKey::Updated => "-updated",
            SortKey::Follows => "-stars",
            SortKey::NameAsc => "slug",
            SortKey::NameDesc => "-slug",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        SortKey::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Invalid sort key: {s}. Valid keys: downloads, newest, updated, follows, name-asc, name-desc"
                )
            })
    }
}

impl Serialize for SortKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SortKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A server software a plugin can run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Loader {
    pub id: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
}

pub const LOADERS: &[Loader] = &[
    Loader { id: "bukkit", label: "Bukkit", icon: "fa-bucket" },
    Loader { id: "bungeecord", label: "BungeeCord", icon: "fa-network-wired" },
    Loader { id: "fabric", label: "Fabric", icon: "fa-scroll" },
    Loader { id: "folia", label: "Folia", icon: "fa-leaf" },
    Loader { id: "forge", label: "Forge", icon: "fa-hammer" },
    Loader { id: "neoforge", label: "NeoForge", icon: "fa-fire" },
    Loader { id: "paper", label: "Paper", icon: "fa-paper-plane" },
    Loader { id: "purpur", label: "Purpur", icon: "fa-feather" },
    Loader { id: "quilt", label: "Quilt", icon: "fa-grip" },
    Loader { id: "spigot", label: "Spigot", icon: "fa-faucet" },
    Loader { id: "velocity", label: "Velocity", icon: "fa-gauge-high" },
    Loader { id: "waterfall", label: "Waterfall", icon: "fa-water" },
];

pub const DATAPACK_TAG: &str = "datapack";

/// Look up a recognized loader by token (trimmed, case-insensitive).
pub fn loader(token: &str) -> Option<&'static Loader> {
    let token = token.trim();
    LOADERS.iter().find(|l| l.id.eq_ignore_ascii_case(token))
}

/// Display label for a loader token; unknown tokens are returned as-is.
pub fn loader_label(token: &str) -> String {
    loader(token)
        .map(|l| l.label.to_string())
        .unwrap_or_else(|| token.to_string())
}

/// A Hangar project tag with a dedicated badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpecialTag {
    pub token: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
}

pub const HANGAR_SPECIAL_TAGS: &[SpecialTag] = &[
    SpecialTag { token: "SUPPORTS_FOLIA", label: "Folia", icon: "fa-leaf" },
    SpecialTag { token: "ADDON", label: "Addon", icon: "fa-puzzle-piece" },
    SpecialTag { token: "LIBRARY", label: "Library", icon: "fa-book" },
];

/// Kinds of external project links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Source,
    Discord,
    Wiki,
    Issues,
    Donate,
}

impl LinkKind {
    pub const ALL: [LinkKind; 5] = [
        LinkKind::Source,
        LinkKind::Discord,
        LinkKind::Wiki,
        LinkKind::Issues,
        LinkKind::Donate,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            LinkKind::Source => "Source",
            LinkKind::Discord => "Discord",
            LinkKind::Wiki => "Wiki",
            LinkKind::Issues => "Issues",
            LinkKind::Donate => "Donate",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            LinkKind::Source => "fa-github",
            LinkKind::Discord => "fa-discord",
            LinkKind::Wiki => "fa-book",
            LinkKind::Issues => "fa-bug",
            LinkKind::Donate => "fa-heart",
        }
    }
}

/// Public project page for a registry item.
pub fn project_url(platform: Platform, path: &str) -> String {
    match platform {
        Platform::Modrinth => format!("{MODRINTH_SITE}/plugin/{path}"),
        Platform::Spigot => format!("{SPIGOT_SITE}/resources/{path}/"),
        Platform::Hangar => format!("{HANGAR_SITE}/{path}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_lookup() {
        let admin = category("Admin").unwrap();
        assert_eq!(admin.hangar_category, Some("admin_tools"));
        assert!(category("nonexistent").is_none());
        assert_eq!(category(DEFAULT_CATEGORY).unwrap().modrinth_slug, None);
    }

    #[test]
    fn test_sort_key_native_tokens() {
        assert_eq!(SortKey::Newest.modrinth_index(), "newest");
        assert!(SortKey::Downloads.spiget_sort().starts_with('-'));
        assert!(SortKey::Updated.hangar_sort().starts_with('-'));
        assert_eq!("NAME-ASC".parse::<SortKey>().unwrap(), SortKey::NameAsc);
        assert!("relevance".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_loader_lookup() {
        assert_eq!(loader(" Paper ").unwrap().label, "Paper");
        assert!(loader("datapack").is_none());
        assert_eq!(loader_label("neoforge"), "NeoForge");
        assert_eq!(loader_label("iris"), "iris");
    }

    #[test]
    fn test_project_url() {
        assert_eq!(
            project_url(Platform::Spigot, "123"),
            "https://www.spigotmc.org/resources/123/"
        );
        assert_eq!(
            project_url(Platform::Hangar, "owner/slug"),
            "https://hangar.papermc.io/owner/slug"
        );
    }
}
