use crate::adapters::Registries;
use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::prelude::{eprintln, println, *};
use crate::render::{self, RenderContext};
use crate::router::Router;
use crate::store::{FavoritesStore, Preferences, Store};
use colored::Colorize;
use futures::future::join_all;
use indicatif::ProgressBar;
use minenav_core::config::{self as catalog_config, SortKey};
use minenav_core::merge::MergedResults;
use minenav_core::metadata::Metadata;
use minenav_core::model::PluginSummary;
use minenav_core::platform::{Platform, PlatformFilter};
use minenav_core::state::{FilterState, StateUpdate, ViewMode};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, clap::Args, Clone)]
pub struct SearchOptions {
    /// Search text; omit to browse by category and sort only
    #[arg(value_name = "QUERY")]
    pub query: Option<String>,

    /// Registry to search: all, modrinth, spigot, hangar
    #[arg(short, long)]
    pub platform: Option<PlatformFilter>,

    /// Category: all, admin, gameplay, world, economy, chat, utility, dev, misc
    #[arg(short, long)]
    pub category: Option<String>,

    /// Sort: downloads, newest, updated, follows, name-asc, name-desc
    #[arg(short, long)]
    pub sort: Option<SortKey>,

    /// Page number (1-indexed)
    #[arg(long)]
    pub page: Option<u32>,

    /// Start from a shared link, e.g. "platform=hangar&q=maps"
    #[arg(long, value_name = "QUERY_STRING")]
    pub state: Option<String>,

    /// Fetch versions and loaders for every result
    #[arg(long)]
    pub details: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Render results as a table
    #[arg(long, conflicts_with = "grid")]
    pub table: bool,

    /// Render results as cards
    #[arg(long)]
    pub grid: bool,
}

impl SearchOptions {
    /// The state update the flags ask for. Flags that were not given leave
    /// the stored preference in place.
    fn update(&self) -> Result<StateUpdate> {
        let category = match self.category.as_deref() {
            Some(id) => Some(
                catalog_config::category(id)
                    .map(|category| category.id.to_string())
                    .ok_or_else(|| {
                        let valid: Vec<&str> =
                            catalog_config::CATEGORIES.iter().map(|c| c.id).collect();
                        eyre!("Invalid category: {id}. Valid categories: {}", valid.join(", "))
                    })?,
            ),
            None => None,
        };

        let page = match self.page {
            Some(0) => return Err(eyre!("Pages start at 1")),
            Some(page) => Some(page - 1),
            None => None,
        };

        Ok(StateUpdate {
            platform: self.platform,
            category,
            sort: self.sort,
            search: self.query.clone(),
            page,
            view_mode: None,
        })
    }

    fn layout(&self) -> Option<ViewMode> {
        if self.table {
            Some(ViewMode::List)
        } else if self.grid {
            Some(ViewMode::Grid)
        } else {
            None
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub link: String,
    pub state: FilterState,
    pub total: u64,
    pub total_exact: bool,
    pub failed: Vec<Platform>,
    pub plugins: Vec<PluginSummary>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Metadata>,
    #[serde(skip)]
    pub results: MergedResults,
}

pub async fn run(options: SearchOptions, global: crate::Global) -> Result<()> {
    let config = AppConfig::from_env()?.with_overrides(global.locale.clone());
    let store = Store::new(&config.data_dir);
    let preferences = Preferences::new(store.clone());
    let i18n = crate::session_i18n(&config, &preferences);

    let mut router = Router::new(store.clone());
    if let Some(link) = options.state.as_deref() {
        let (_, errors) = router.load_from_query(link);
        if global.verbose {
            for error in errors {
                eprintln!("Ignored link parameter: {error}");
            }
        }
    }
    router.set_state(options.update()?);

    if let Some(layout) = options.layout() {
        preferences.set_layout(layout)?;
    }
    let view = options
        .layout()
        .or_else(|| preferences.layout())
        .unwrap_or(router.state().view_mode);

    if global.verbose {
        eprintln!("Searching with ?{}", router.link());
    }

    let catalog = Catalog::new(Registries::new(&config)?);
    let spinner = new_spinner(i18n.t("browse.loading"))?;
    let output = search_data(&catalog, &router, config.page_size, options.details, Some(&spinner)).await;
    spinner.finish_and_clear();

    if options.json {
        println!("{}", render::format_json(&output)?);
    } else {
        let favorites = FavoritesStore::new(store).all();
        let ctx = RenderContext {
            i18n: &i18n,
            now: chrono::Utc::now(),
            favorites: &favorites,
        };
        anstream::print!("{}", format_search_text(&output, view, &ctx));
    }

    Ok(())
}

/// Run the search for the router's current state.
pub async fn search_data(
    catalog: &Catalog,
    router: &Router,
    page_size: usize,
    details: bool,
    spinner: Option<&ProgressBar>,
) -> SearchOutput {
    let state = router.state().clone();
    let query = router.query(page_size);
    let results = catalog.search(state.platform, &query).await;

    let metadata = if details && !results.items.is_empty() {
        set_spinner_msg(spinner, f!("Fetching details for {} plugins...", results.items.len()));
        join_all(
            results
                .items
                .iter()
                .map(|item| async move { (item.key(), catalog.metadata(item).await) }),
        )
        .await
        .into_iter()
        .collect()
    } else {
        HashMap::new()
    };

    SearchOutput {
        link: router.link(),
        total: results.total,
        total_exact: results.total_exact,
        failed: results.failed.clone(),
        plugins: results.items.iter().map(|item| item.normalize()).collect(),
        metadata,
        state,
        results,
    }
}

fn format_search_text(output: &SearchOutput, view: ViewMode, ctx: &RenderContext) -> String {
    let mut text = render::format_results_header(&output.results, &output.state, ctx);
    text.push_str(&render::format_results_body(
        &output.results,
        view,
        &output.metadata,
        ctx,
    ));

    if !output.results.items.is_empty() {
        text.push_str(&f!(
            "\n{}\n",
            f!(
                "minenav search --state \"{}\" --page {}",
                output.link,
                output.state.page + 2
            )
            .dimmed()
        ));
    }
    text
}
