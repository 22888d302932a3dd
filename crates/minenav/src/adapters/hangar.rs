use super::Registries;
use crate::prelude::*;
use minenav_core::hangar::{HangarProject, HangarProjectsResponse, HangarVersionsResponse};
use minenav_core::model::{RawItem, SearchPage};
use minenav_core::platform::Platform;
use minenav_core::query::{self, SearchQuery};

pub async fn search(registries: &Registries, query: &SearchQuery) -> Result<SearchPage, Error> {
    let response: HangarProjectsResponse = registries
        .get_json(Platform::Hangar, &query::hangar_search(query))
        .await?;

    let hits = response.result.into_iter().map(RawItem::Hangar).collect();
    Ok(SearchPage::new(
        Platform::Hangar,
        hits,
        response.pagination.count,
        true,
    ))
}

/// `slug` is `owner/slug` or a bare slug.
pub async fn project(registries: &Registries, slug: &str) -> Result<HangarProject, Error> {
    registries
        .get_json(Platform::Hangar, &query::hangar_project(slug))
        .await
}

pub async fn versions(registries: &Registries, slug: &str) -> Result<HangarVersionsResponse, Error> {
    registries
        .get_json(Platform::Hangar, &query::hangar_versions(slug))
        .await
}
