use crate::adapters::Registries;
use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::prelude::{eprintln, println, *};
use crate::render::{self, RenderContext};
use crate::store::{FavoritesStore, Preferences, Store};
use minenav_core::favorites::Favorite;
use minenav_core::i18n::I18n;
use minenav_core::platform::Platform;

#[derive(Debug, clap::Parser)]
#[command(name = "favorites")]
#[command(about = "Manage saved plugins")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List saved plugins
    #[clap(name = "list")]
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Save a plugin by its registry id
    #[clap(name = "add")]
    Add {
        /// Registry the plugin lives on: modrinth, spigot, hangar
        platform: Platform,

        /// Native id on that registry
        id: String,
    },

    /// Remove a saved plugin
    #[clap(name = "remove")]
    Remove {
        /// Favorite id as listed, e.g. "modrinth:AANobbMI"
        id: String,
    },
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let config = AppConfig::from_env()?.with_overrides(global.locale.clone());
    let store = Store::new(&config.data_dir);
    let i18n = crate::session_i18n(&config, &Preferences::new(store.clone()));
    let mut favorites = FavoritesStore::new(store);

    if global.verbose {
        eprintln!("Favorites file lives in {}", config.data_dir.display());
    }

    match app.command {
        Commands::List { json } => {
            let list = favorites.all();
            if json {
                println!("{}", render::format_json(&list)?);
            } else {
                let ctx = RenderContext {
                    i18n: &i18n,
                    now: chrono::Utc::now(),
                    favorites: &list,
                };
                println!("{}", render::format_favorites(&list, &ctx));
            }
        }
        Commands::Add { platform, id } => {
            let catalog = Catalog::new(Registries::new(&config)?);
            let spinner = new_spinner(i18n.t("browse.loading"))?;
            let message = add_data(&catalog, &mut favorites, platform, &id, &i18n).await;
            spinner.finish_and_clear();
            println!("{}", message?);
        }
        Commands::Remove { id } => {
            println!("{}", remove_data(&mut favorites, &id, &i18n)?);
        }
    }

    Ok(())
}

/// Look the plugin up and save it. Returns the message to show.
pub async fn add_data(
    catalog: &Catalog,
    favorites: &mut FavoritesStore,
    platform: Platform,
    id: &str,
    i18n: &I18n,
) -> Result<String> {
    let item = catalog
        .lookup(platform, id)
        .await
        .wrap_err_with(|| f!("Failed to find {} plugin {id}", platform.display_name()))?;
    let name = item.normalize().title;

    let key = if favorites.add(&item)? {
        "favorites.added"
    } else {
        "favorites.exists"
    };
    Ok(i18n.t_with(key, &[("name", name.as_str())]))
}

pub fn remove_data(favorites: &mut FavoritesStore, id: &str, i18n: &I18n) -> Result<String> {
    let id = id.trim();
    match favorites.remove(id)? {
        Some(removed) => {
            let name = favorite_name(&removed);
            Ok(i18n.t_with("favorites.removed", &[("name", name.as_str())]))
        }
        None => Err(eyre!(i18n.t_with("favorites.not_found", &[("id", id)]))),
    }
}

fn favorite_name(favorite: &Favorite) -> String {
    favorite
        .item()
        .map(|item| item.normalize().title)
        .unwrap_or_else(|| favorite.id.clone())
}
