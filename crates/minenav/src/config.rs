use crate::prelude::*;
use minenav_core::config::{
    FETCH_TIMEOUT, HANGAR_API_BASE, ITEMS_PER_PAGE, MODRINTH_API_BASE, SPIGET_API_BASE,
};
use minenav_core::i18n::Locale;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration, read from `MINENAV_*` environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub modrinth_url: String,
    pub spiget_url: String,
    pub hangar_url: String,
    pub timeout: Duration,
    pub page_size: usize,
    pub data_dir: PathBuf,
    pub locale: Option<Locale>,
}

impl AppConfig {
    pub const USER_AGENT: &'static str = concat!("minenav/", env!("CARGO_PKG_VERSION"));

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup. Unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout = match lookup("MINENAV_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse()
                    .map_err(|e| eyre!("Invalid MINENAV_TIMEOUT_SECS {raw:?}: {e}"))?,
            ),
            None => FETCH_TIMEOUT,
        };

        let page_size = match lookup("MINENAV_PAGE_SIZE") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => return Err(eyre!("Invalid MINENAV_PAGE_SIZE {raw:?}: expected a positive number")),
            },
            None => ITEMS_PER_PAGE,
        };

        let data_dir = match lookup("MINENAV_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };

        Ok(Self {
            modrinth_url: lookup("MINENAV_MODRINTH_URL")
                .unwrap_or_else(|| MODRINTH_API_BASE.to_string()),
            spiget_url: lookup("MINENAV_SPIGET_URL").unwrap_or_else(|| SPIGET_API_BASE.to_string()),
            hangar_url: lookup("MINENAV_HANGAR_URL").unwrap_or_else(|| HANGAR_API_BASE.to_string()),
            timeout,
            page_size,
            data_dir,
            locale: lookup("MINENAV_LOCALE").map(|tag| Locale::resolve(&tag)),
        })
    }

    /// Apply CLI overrides to the configuration
    pub fn with_overrides(mut self, locale: Option<String>) -> Self {
        if let Some(tag) = locale {
            self.locale = Some(Locale::resolve(&tag));
        }
        self
    }
}

fn default_data_dir() -> Result<PathBuf> {
    Ok(dirs_next::config_dir()
        .ok_or_else(|| eyre!("Unable to determine config directory"))?
        .join("minenav"))
}

/// HTTP client shared by every adapter, with the per-request timeout applied.
pub fn create_client(config: &AppConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(AppConfig::USER_AGENT)
        .timeout(config.timeout)
        .build()
        .map_err(|e| eyre!("Failed to build HTTP client: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[("MINENAV_DATA_DIR", "/tmp/minenav")]))
            .unwrap();

        assert_eq!(config.modrinth_url, MODRINTH_API_BASE);
        assert_eq!(config.spiget_url, SPIGET_API_BASE);
        assert_eq!(config.hangar_url, HANGAR_API_BASE);
        assert_eq!(config.timeout, FETCH_TIMEOUT);
        assert_eq!(config.page_size, ITEMS_PER_PAGE);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/minenav"));
        assert!(config.locale.is_none());
    }

    #[test]
    fn test_env_values() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("MINENAV_DATA_DIR", "/tmp/minenav"),
            ("MINENAV_SPIGET_URL", "http://localhost:9000"),
            ("MINENAV_TIMEOUT_SECS", "3"),
            ("MINENAV_PAGE_SIZE", "24"),
            ("MINENAV_LOCALE", "zh_CN"),
        ]))
        .unwrap();

        assert_eq!(config.spiget_url, "http://localhost:9000");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.page_size, 24);
        assert_eq!(config.locale, Some(Locale::ZhCn));
    }

    #[test]
    fn test_invalid_numbers_are_errors() {
        let bad_timeout = AppConfig::from_lookup(lookup_from(&[
            ("MINENAV_DATA_DIR", "/tmp"),
            ("MINENAV_TIMEOUT_SECS", "soon"),
        ]));
        assert!(bad_timeout.is_err());

        let zero_page = AppConfig::from_lookup(lookup_from(&[
            ("MINENAV_DATA_DIR", "/tmp"),
            ("MINENAV_PAGE_SIZE", "0"),
        ]));
        assert!(zero_page.is_err());
    }

    #[test]
    fn test_locale_override_wins() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("MINENAV_DATA_DIR", "/tmp"),
            ("MINENAV_LOCALE", "zh-CN"),
        ]))
        .unwrap()
        .with_overrides(Some("fr".to_string()));

        assert_eq!(config.locale, Some(Locale::En));
    }
}
