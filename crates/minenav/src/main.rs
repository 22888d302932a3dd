use crate::prelude::*;
use clap::Parser;
use minenav_core::i18n::{I18n, Locale};

mod adapters;
mod browse;
mod catalog;
mod config;
mod debounce;
mod error;
mod favorites;
mod prelude;
mod render;
mod router;
mod search;
mod show;
mod store;
#[cfg(test)]
mod testing;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Search Modrinth, SpigotMC and Hangar plugins from one place"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Interface language (en, zh-CN)
    #[clap(long, env = "MINENAV_LOCALE", global = true)]
    locale: Option<String>,

    /// Whether to display additional information.
    #[clap(long, env = "MINENAV_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Search plugins across registries
    Search(crate::search::SearchOptions),

    /// Show one plugin's details
    Show(crate::show::ShowOptions),

    /// Manage saved plugins
    Favorites(crate::favorites::App),

    /// Interactive catalog session
    Browse(crate::browse::BrowseOptions),
}

/// Resolve the interface language: flag or env first, then the stored preference.
pub fn session_i18n(config: &config::AppConfig, preferences: &store::Preferences) -> I18n {
    let locale = config
        .locale
        .or_else(|| preferences.locale())
        .unwrap_or(Locale::En);
    I18n::new(locale)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Search(options) => crate::search::run(options, app.global).await,
        SubCommands::Show(options) => crate::show::run(options, app.global).await,
        SubCommands::Favorites(sub_app) => crate::favorites::run(sub_app, app.global).await,
        SubCommands::Browse(options) => crate::browse::run(options, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
