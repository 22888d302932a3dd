use crate::adapters::Registries;
use crate::catalog::{Catalog, DetailView};
use crate::config::AppConfig;
use crate::prelude::{eprintln, println, *};
use crate::render::{self, RenderContext};
use crate::store::{FavoritesStore, Preferences, Store};
use minenav_core::platform::Platform;

#[derive(Debug, clap::Args, Clone)]
pub struct ShowOptions {
    /// Registry the plugin lives on: modrinth, spigot, hangar
    #[arg(value_name = "PLATFORM")]
    pub platform: Platform,

    /// Modrinth project id or slug, Spigot resource id, or Hangar owner/slug
    #[arg(value_name = "ID")]
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(options: ShowOptions, global: crate::Global) -> Result<()> {
    let config = AppConfig::from_env()?.with_overrides(global.locale.clone());
    let store = Store::new(&config.data_dir);
    let i18n = crate::session_i18n(&config, &Preferences::new(store.clone()));
    let catalog = Catalog::new(Registries::new(&config)?);

    if global.verbose {
        eprintln!("Looking up {} {}", options.platform.display_name(), options.id);
    }

    let spinner = new_spinner(i18n.t("browse.loading"))?;
    let view = show_data(&catalog, options.platform, &options.id).await;
    spinner.finish_and_clear();
    let view = view?;

    if options.json {
        println!("{}", render::format_json(&view)?);
    } else {
        let favorites = FavoritesStore::new(store).all();
        let ctx = RenderContext {
            i18n: &i18n,
            now: chrono::Utc::now(),
            favorites: &favorites,
        };
        println!("{}", render::format_detail(&view, &ctx));
    }

    Ok(())
}

/// Look the plugin up, then load its detail. Only the lookup can fail; a
/// failed detail fetch degrades to the looked-up item.
pub async fn show_data(catalog: &Catalog, platform: Platform, id: &str) -> Result<DetailView> {
    let item = catalog
        .lookup(platform, id)
        .await
        .wrap_err_with(|| f!("Failed to find {} plugin {id}", platform.display_name()))?;
    Ok(catalog.detail(&item).await)
}
