//! In-process mock registry for adapter and catalog tests.

use crate::config::AppConfig;
use std::path::Path;
use std::time::Duration;

/// Serve `router` on an ephemeral port and return its base URL.
pub async fn spawn_registry(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// A config whose registries live under `/modrinth`, `/spiget` and `/hangar` of `base`.
pub fn config_for(base: &str, data_dir: &Path) -> AppConfig {
    AppConfig {
        modrinth_url: format!("{base}/modrinth"),
        spiget_url: format!("{base}/spiget"),
        hangar_url: format!("{base}/hangar"),
        timeout: Duration::from_secs(5),
        page_size: 12,
        data_dir: data_dir.to_path_buf(),
        locale: None,
    }
}
