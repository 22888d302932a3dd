use super::Registries;
use crate::prelude::*;
use minenav_core::model::{ItemList, RawItem, SearchPage};
use minenav_core::platform::Platform;
use minenav_core::query::{self, SearchQuery};
use minenav_core::spiget::{SpigetAuthor, SpigetMinecraftVersion, SpigetResource, SpigetVersion};

/// Spiget answers with a bare array, so the total is only the page length.
pub async fn search(registries: &Registries, query: &SearchQuery) -> Result<SearchPage, Error> {
    let ItemList(resources) = registries
        .get_json::<ItemList<SpigetResource>>(Platform::Spigot, &query::spiget_search(query))
        .await?;

    let total = resources.len() as u64;
    let hits = resources.into_iter().map(RawItem::Spigot).collect();
    Ok(SearchPage::new(Platform::Spigot, hits, total, false))
}

pub async fn resource(registries: &Registries, id: &str) -> Result<SpigetResource, Error> {
    registries
        .get_json(Platform::Spigot, &query::spiget_resource(id))
        .await
}

pub async fn versions(registries: &Registries, id: &str) -> Result<Vec<SpigetVersion>, Error> {
    let ItemList(versions) = registries
        .get_json(Platform::Spigot, &query::spiget_versions(id))
        .await?;
    Ok(versions)
}

pub async fn minecraft_versions(
    registries: &Registries,
) -> Result<Vec<SpigetMinecraftVersion>, Error> {
    let ItemList(versions) = registries
        .get_json(Platform::Spigot, &query::spiget_minecraft_versions())
        .await?;
    Ok(versions)
}

pub async fn author(registries: &Registries, id: u64) -> Result<SpigetAuthor, Error> {
    registries
        .get_json(Platform::Spigot, &query::spiget_author(id))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{config_for, spawn_registry};
    use axum::{extract::Query, routing::get, Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_search_total_is_page_length() {
        let router = Router::new().route(
            "/spiget/search/resources/{query}",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params["page"], "3");
                assert_eq!(params["sort"], "-downloads");
                Json(json!([
                    {"id": 1, "name": "One", "downloads": 10},
                    {"id": 2, "name": "Two", "downloads": 20}
                ]))
            }),
        );
        let base = spawn_registry(router).await;
        let dir = tempfile::tempdir().unwrap();
        let registries = Registries::new(&config_for(&base, dir.path())).unwrap();

        let query = SearchQuery {
            search: "land claim".into(),
            page: 2,
            ..SearchQuery::default()
        };
        let page = search(&registries, &query).await.unwrap();

        assert_eq!(page.total, 2);
        assert!(!page.total_exact);
        assert!(!page.error);
        assert_eq!(page.hits[1].key(), "spigot:2");
    }

    #[tokio::test]
    async fn test_search_keeps_hits_beside_a_malformed_one() {
        let router = Router::new().route(
            "/spiget/search/resources/{query}",
            get(|| async {
                Json(json!([
                    {"id": 1, "name": "One", "downloads": 10},
                    "not a resource",
                    {"id": 2, "name": 42, "tag": ["x"], "author": "md_5", "releaseDate": "soon"}
                ]))
            }),
        );
        let base = spawn_registry(router).await;
        let dir = tempfile::tempdir().unwrap();
        let registries = Registries::new(&config_for(&base, dir.path())).unwrap();

        let query = SearchQuery {
            search: "one".into(),
            ..SearchQuery::default()
        };
        let page = search(&registries, &query).await.unwrap();

        assert!(!page.error);
        let titles: Vec<String> = page.hits.iter().map(|hit| hit.normalize().title).collect();
        assert_eq!(titles, vec!["One", "42"]);
    }

    #[tokio::test]
    async fn test_author_lookup() {
        let router = Router::new().route(
            "/spiget/authors/{id}",
            get(|| async { Json(json!({"id": 7, "name": "md_5"})) }),
        );
        let base = spawn_registry(router).await;
        let dir = tempfile::tempdir().unwrap();
        let registries = Registries::new(&config_for(&base, dir.path())).unwrap();

        let author = author(&registries, 7).await.unwrap();

        assert_eq!(author.name.as_deref(), Some("md_5"));
    }
}
