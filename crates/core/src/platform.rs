use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A plugin registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Modrinth,
    Spigot,
    Hangar,
}

impl Platform {
    /// Fan-out order used when every platform is selected.
    pub const ALL: [Platform; 3] = [Platform::Modrinth, Platform::Spigot, Platform::Hangar];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Modrinth => "modrinth",
            Platform::Spigot => "spigot",
            Platform::Hangar => "hangar",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Modrinth => "Modrinth",
            Platform::Spigot => "SpigotMC",
            Platform::Hangar => "Hangar",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Platform::Modrinth => "fa-leaf",
            Platform::Spigot => "fa-cube",
            Platform::Hangar => "fa-paper-plane",
        }
    }

    /// Brand color as an `(r, g, b)` triple.
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Platform::Modrinth => (27, 217, 106),
            Platform::Spigot => (246, 168, 33),
            Platform::Hangar => (30, 136, 229),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "modrinth" => Ok(Platform::Modrinth),
            "spigot" | "spigotmc" | "spiget" => Ok(Platform::Spigot),
            "hangar" => Ok(Platform::Hangar),
            other => Err(format!(
                "Invalid platform: {other}. Valid platforms: modrinth, spigot, hangar"
            )),
        }
    }
}

/// Platform selection for a catalog query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlatformFilter {
    #[default]
    All,
    Only(Platform),
}

impl PlatformFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformFilter::All => "all",
            PlatformFilter::Only(platform) => platform.as_str(),
        }
    }

    /// Platforms to query, in fan-out order.
    pub fn platforms(&self) -> Vec<Platform> {
        match self {
            PlatformFilter::All => Platform::ALL.to_vec(),
            PlatformFilter::Only(platform) => vec![*platform],
        }
    }
}

impl fmt::Display for PlatformFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(PlatformFilter::All);
        }
        s.parse::<Platform>()
            .map(PlatformFilter::Only)
            .map_err(|_| format!("Invalid platform: {s}. Valid platforms: all, modrinth, spigot, hangar"))
    }
}

impl Serialize for PlatformFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PlatformFilter {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
