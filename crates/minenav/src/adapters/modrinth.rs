use super::Registries;
use crate::prelude::*;
use minenav_core::model::{ItemList, RawItem, SearchPage};
use minenav_core::modrinth::{ModrinthProject, ModrinthSearchResponse, ModrinthVersion};
use minenav_core::platform::Platform;
use minenav_core::query::{self, SearchQuery};

pub async fn search(registries: &Registries, query: &SearchQuery) -> Result<SearchPage, Error> {
    let response: ModrinthSearchResponse = registries
        .get_json(Platform::Modrinth, &query::modrinth_search(query))
        .await?;

    let hits = response.hits.into_iter().map(RawItem::Modrinth).collect();
    Ok(SearchPage::new(Platform::Modrinth, hits, response.total_hits, true))
}

pub async fn project(registries: &Registries, id: &str) -> Result<ModrinthProject, Error> {
    registries
        .get_json(Platform::Modrinth, &query::modrinth_project(id))
        .await
}

pub async fn versions(registries: &Registries, id: &str) -> Result<Vec<ModrinthVersion>, Error> {
    let ItemList(versions) = registries
        .get_json(Platform::Modrinth, &query::modrinth_versions(id))
        .await?;
    Ok(versions)
}

pub async fn version(registries: &Registries, version_id: &str) -> Result<ModrinthVersion, Error> {
    registries
        .get_json(Platform::Modrinth, &query::modrinth_version(version_id))
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
    async fn test_search_sends_native_parameters() {
        let router = Router::new().route(
            "/modrinth/search",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                Json(json!({
                    "hits": [{
                        "project_id": params["index"],
                        "title": params["query"],
                        "description": params["facets"]
                    }],
                    "total_hits": 40
                }))
            }),
        );
        let base = spawn_registry(router).await;
        let dir = tempfile::tempdir().unwrap();
        let registries = Registries::new(&config_for(&base, dir.path())).unwrap();

        let query = SearchQuery {
            search: "  essentials ".into(),
            category: "economy".into(),
            ..SearchQuery::default()
        };
        let page = search(&registries, &query).await.unwrap();

        assert_eq!(page.total, 40);
        assert!(page.total_exact);
        let summary = page.hits[0].normalize();
        assert_eq!(summary.id, "downloads");
        assert_eq!(summary.title, "essentials");
        assert!(summary.description.contains("project_type:plugin"));
        assert!(summary.description.contains("categories:economy"));
    }

    #[tokio::test]
    async fn test_project_and_versions() {
        let router = Router::new()
            .route(
                "/modrinth/project/{id}",
                get(|| async { Json(json!({"id": "abc", "title": "Alpha", "followers": 3})) }),
            )
            .route(
                "/modrinth/project/{id}/version",
                get(|| async {
                    Json(json!([
                        {"version_number": "1.0.0", "date_published": "2024-01-01T00:00:00Z"},
                        {"version_number": "1.1.0", "date_published": "2024-03-01T00:00:00Z"}
                    ]))
                }),
            )
            .route(
                "/modrinth/version/{id}",
                get(|| async { Json(json!({"id": "v1", "version_number": "1.1.0"})) }),
            );
        let base = spawn_registry(router).await;
        let dir = tempfile::tempdir().unwrap();
        let registries = Registries::new(&config_for(&base, dir.path())).unwrap();

        let project = project(&registries, "abc").await.unwrap();
        let versions = versions(&registries, "abc").await.unwrap();
        let single = version(&registries, "v1").await.unwrap();

        assert_eq!(project.title.as_deref(), Some("Alpha"));
        assert_eq!(versions.len(), 2);
        assert_eq!(single.version_number.as_deref(), Some("1.1.0"));
    }
}
