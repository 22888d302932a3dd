//! HTTP adapters for the three registries.
//!
//! Search calls never fail: any error becomes [`SearchPage::failed`] so the
//! fan-out can still merge the other registries. Detail calls return
//! `Result` and leave degradation to the caller.

use crate::config::{create_client, AppConfig};
use crate::prelude::*;
use minenav_core::model::SearchPage;
use minenav_core::platform::Platform;
use minenav_core::query::{Request, SearchQuery};
use serde::de::DeserializeOwned;

pub mod hangar;
pub mod modrinth;
pub mod spiget;

/// The shared HTTP client plus each registry's API base.
#[derive(Debug, Clone)]
pub struct Registries {
    client: reqwest::Client,
    modrinth_url: String,
    spiget_url: String,
    hangar_url: String,
}

impl Registries {
    pub fn new(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            client: create_client(config)?,
            modrinth_url: config.modrinth_url.clone(),
            spiget_url: config.spiget_url.clone(),
            hangar_url: config.hangar_url.clone(),
        })
    }

    fn base_url(&self, platform: Platform) -> &str {
        match platform {
            Platform::Modrinth => &self.modrinth_url,
            Platform::Spigot => &self.spiget_url,
            Platform::Hangar => &self.hangar_url,
        }
    }

    /// `GET` a registry endpoint and decode its JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        platform: Platform,
        request: &Request,
    ) -> Result<T, Error> {
        let url = request.url(self.base_url(platform));
        log::debug!("GET {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::from_reqwest(platform, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                platform,
                status: status.as_u16(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::from_reqwest(platform, e))
    }

    /// One registry's page for `query`; failures are logged and reported as
    /// an empty page with `error` set.
    pub async fn search(&self, platform: Platform, query: &SearchQuery) -> SearchPage {
        let result = match platform {
            Platform::Modrinth => modrinth::search(self, query).await,
            Platform::Spigot => spiget::search(self, query).await,
            Platform::Hangar => hangar::search(self, query).await,
        };

        match result {
            Ok(page) => page,
            Err(err) => {
                log::warn!("{platform} search failed: {err}");
                SearchPage::failed(platform)
            }
        }
    }
}
