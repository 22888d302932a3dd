//! Interactive catalog session. Filter commands go through the router, text
//! searches through the debouncer, and every fetch runs as a background task
//! whose result is dropped if the query has changed since. Pages load one at
//! a time so they append in order.

use crate::adapters::Registries;
use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::debounce::Debouncer;
use crate::prelude::{eprintln, println, *};
use crate::render::{self, RenderContext};
use crate::router::{Generation, Router};
use crate::store::{FavoritesStore, Preferences, Store};
use colored::Colorize;
use minenav_core::config::{self as catalog_config, SortKey, SEARCH_DEBOUNCE};
use minenav_core::favorites::Favorite;
use minenav_core::i18n::{I18n, Locale};
use minenav_core::merge::MergedResults;
use minenav_core::metadata::Metadata;
use minenav_core::model::RawItem;
use minenav_core::platform::PlatformFilter;
use minenav_core::state::{ChangeSet, FetchKind, StateUpdate, ViewMode};
use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[derive(Debug, clap::Args, Clone)]
pub struct BrowseOptions {
    /// Start from a shared link, e.g. "platform=hangar&q=maps"
    #[arg(long, value_name = "QUERY_STRING")]
    pub state: Option<String>,
}

/// One line of session input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Platform(PlatformFilter),
    Category(String),
    Sort(SortKey),
    More,
    /// 1-based result number.
    Open(usize),
    /// 1-based result number.
    Favorite(usize),
    Retry,
    View(ViewMode),
    Lang(Locale),
    Link,
    Reset,
    Help,
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("{0}")]
    Unknown(String),
    #[error("{command} needs {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },
    #[error("{0}")]
    InvalidArgument(String),
}

pub fn parse_command(line: &str) -> Result<Command, ParseError> {
    let line = line.trim();
    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    let command = match name.to_lowercase().as_str() {
        "q" | "search" | "/" => Command::Search(rest.to_string()),
        "platform" | "p" => Command::Platform(
            required(rest, "platform", "a platform")?
                .parse()
                .map_err(ParseError::InvalidArgument)?,
        ),
        "category" | "c" => {
            let id = required(rest, "category", "a category")?;
            let category = catalog_config::category(id).ok_or_else(|| {
                let valid: Vec<&str> = catalog_config::CATEGORIES.iter().map(|c| c.id).collect();
                ParseError::InvalidArgument(f!(
                    "Invalid category: {id}. Valid categories: {}",
                    valid.join(", ")
                ))
            })?;
            Command::Category(category.id.to_string())
        }
        "sort" | "s" => Command::Sort(
            required(rest, "sort", "a sort key")?
                .parse()
                .map_err(ParseError::InvalidArgument)?,
        ),
        "more" | "m" | "next" => Command::More,
        "open" | "o" => Command::Open(index(rest, "open")?),
        "fav" | "f" | "favorite" => Command::Favorite(index(rest, "fav")?),
        "retry" | "r" => Command::Retry,
        "view" | "v" => Command::View(
            required(rest, "view", "grid or list")?
                .parse()
                .map_err(ParseError::InvalidArgument)?,
        ),
        "lang" | "l" => Command::Lang(
            required(rest, "lang", "a locale")?
                .parse()
                .map_err(ParseError::InvalidArgument)?,
        ),
        "link" => Command::Link,
        "reset" => Command::Reset,
        "help" | "h" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => return Err(ParseError::Unknown(name.to_string())),
    };
    Ok(command)
}

fn required<'a>(
    rest: &'a str,
    command: &'static str,
    expected: &'static str,
) -> Result<&'a str, ParseError> {
    if rest.is_empty() {
        Err(ParseError::MissingArgument { command, expected })
    } else {
        Ok(rest)
    }
}

fn index(rest: &str, command: &'static str) -> Result<usize, ParseError> {
    let raw = required(rest, command, "a result number")?;
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ParseError::InvalidArgument(f!("Not a result number: {raw}"))),
    }
}

/// A finished fetch, tagged with the generation it was started under.
#[derive(Debug)]
pub struct FetchOutcome {
    pub generation: Generation,
    pub kind: FetchKind,
    pub results: MergedResults,
}

pub enum Step {
    Print(String),
    Quit,
}

pub struct Session {
    catalog: Arc<Catalog>,
    router: Router,
    favorites: FavoritesStore,
    favorites_snapshot: Arc<Mutex<Vec<Favorite>>>,
    preferences: Preferences,
    i18n: I18n,
    page_size: usize,
    results: MergedResults,
    metadata: HashMap<String, Metadata>,
    failed_fetch: Option<FetchKind>,
    /// A fetch for the current query has not landed yet.
    loading: bool,
    debouncer: Debouncer<String>,
    fetches: UnboundedSender<FetchOutcome>,
}

/// Receiving ends for settled searches and finished fetches.
pub struct Inbox {
    pub searches: UnboundedReceiver<String>,
    pub fetches: UnboundedReceiver<FetchOutcome>,
}

impl Session {
    pub fn new(catalog: Catalog, store: Store, i18n: I18n, page_size: usize) -> (Self, Inbox) {
        let (search_tx, searches) = mpsc::unbounded_channel();
        let (fetch_tx, fetches) = mpsc::unbounded_channel();

        let mut router = Router::new(store.clone());
        router.subscribe(|state, changes| {
            let keys: Vec<_> = changes.keys().collect();
            log::debug!("state changed {keys:?}: ?{}", state.to_query_string());
        });

        let mut favorites = FavoritesStore::new(store.clone());
        let favorites_snapshot = Arc::new(Mutex::new(favorites.all()));
        let snapshot = favorites_snapshot.clone();
        favorites.subscribe(move |list| {
            if let Ok(mut current) = snapshot.lock() {
                *current = list.to_vec();
            }
        });

        let session = Self {
            catalog: Arc::new(catalog),
            router,
            favorites,
            favorites_snapshot,
            preferences: Preferences::new(store),
            i18n,
            page_size,
            results: MergedResults::default(),
            metadata: HashMap::new(),
            failed_fetch: None,
            loading: false,
            debouncer: Debouncer::new(SEARCH_DEBOUNCE, search_tx),
            fetches: fetch_tx,
        };
        (session, Inbox { searches, fetches })
    }

    fn render<F>(&self, render: F) -> String
    where
        F: FnOnce(&RenderContext) -> String,
    {
        let favorites = self
            .favorites_snapshot
            .lock()
            .map(|list| list.clone())
            .unwrap_or_default();
        let ctx = RenderContext {
            i18n: &self.i18n,
            now: chrono::Utc::now(),
            favorites: &favorites,
        };
        render(&ctx)
    }

    /// Fetch the router's current page in the background.
    pub fn start_fetch(&mut self, kind: FetchKind) {
        let generation = self.router.begin_fetch(kind);
        if kind == FetchKind::Refetch {
            self.failed_fetch = None;
        }
        self.loading = true;
        let query = self.router.query(self.page_size);
        let filter = self.router.state().platform;
        let catalog = self.catalog.clone();
        let sender = self.fetches.clone();

        tokio::spawn(async move {
            let results = catalog.search(filter, &query).await;
            // The receiver is gone once the session ends.
            let _ = sender.send(FetchOutcome {
                generation,
                kind,
                results,
            });
        });
    }

    /// Start whatever fetch `changes` call for. Returns the loading line.
    fn follow(&mut self, changes: &ChangeSet) -> String {
        match changes.fetch_kind() {
            FetchKind::None => String::new(),
            kind => {
                self.start_fetch(kind);
                f!("{}\n", self.i18n.t("browse.loading").dimmed())
            }
        }
    }

    fn has_more(&self) -> bool {
        let loaded = self.results.items.len() as u64;
        loaded > 0 && !(self.results.total_exact && loaded >= self.results.total)
    }

    fn more_hint(&self) -> String {
        if self.has_more() {
            f!("{}\n", self.i18n.t("results.more").dimmed())
        } else {
            String::new()
        }
    }

    fn format_results(&self) -> String {
        let state = self.router.state();
        let mut out = self.render(|ctx| {
            let mut out = render::format_results_header(&self.results, state, ctx);
            out.push_str(&render::format_results_body(
                &self.results,
                state.view_mode,
                &self.metadata,
                ctx,
            ));
            out
        });
        out.push_str(&self.more_hint());
        out
    }

    /// Fold a finished fetch into the session.
    pub fn apply_outcome(&mut self, outcome: FetchOutcome) -> String {
        if !self.router.is_current(outcome.generation) {
            log::debug!("dropping results of fetch {}", outcome.generation);
            return f!("{}\n", self.i18n.t("results.stale").dimmed());
        }
        self.loading = false;

        match outcome.kind {
            FetchKind::Refetch => {
                self.failed_fetch = outcome.results.all_failed().then_some(FetchKind::Refetch);
                self.results = outcome.results;
                self.format_results()
            }
            FetchKind::Append if outcome.results.all_failed() => {
                self.failed_fetch = Some(FetchKind::Append);
                f!(
                    "{}\n{}\n",
                    self.i18n.t("results.load_failed").red(),
                    self.i18n.t("results.retry_hint").yellow()
                )
            }
            FetchKind::Append => {
                self.failed_fetch = None;
                let first = self.results.items.len();
                self.results.append(outcome.results);

                let view = self.router.state().view_mode;
                let mut out = self.render(|ctx| {
                    let added = &self.results.items[first..];
                    let mut out = match view {
                        ViewMode::Grid => added
                            .iter()
                            .enumerate()
                            .map(|(i, item)| {
                                render::format_card(
                                    first + i + 1,
                                    item,
                                    self.metadata.get(&item.key()),
                                    ctx,
                                )
                            })
                            .collect(),
                        ViewMode::List if added.is_empty() => String::new(),
                        ViewMode::List => render::format_table(added, first + 1, ctx),
                    };
                    if !self.results.failed.is_empty() {
                        out.push_str(&render::format_partial_failure(
                            &self.results.failed,
                            ctx.i18n,
                        ));
                    }
                    out
                });
                if self.results.items.len() == first {
                    out.push_str(&f!("{}\n", self.i18n.t("results.end").dimmed()));
                } else {
                    out.push_str(&self.more_hint());
                }
                out
            }
            FetchKind::None => String::new(),
        }
    }

    /// The debounced search text has settled.
    pub fn search_settled(&mut self, text: String) -> String {
        let changes = self.router.set_state(StateUpdate {
            search: Some(text),
            ..StateUpdate::default()
        });
        self.follow(&changes)
    }

    fn item_name(&self, index: usize) -> Option<(RawItem, String)> {
        let item = self.results.items.get(index.checked_sub(1)?)?.clone();
        let name = item.normalize().title;
        Some((item, name))
    }

    pub async fn handle(&mut self, command: Command) -> Result<Step> {
        let i18n = self.i18n;
        let text = match command {
            Command::Search(text) => {
                let query = text.trim().to_string();
                self.debouncer.schedule(query.clone());
                f!(
                    "{}\n",
                    i18n.t_with("browse.searching", &[("query", query.as_str())]).dimmed()
                )
            }
            Command::Platform(platform) => {
                let changes = self.router.set_state(StateUpdate {
                    platform: Some(platform),
                    ..StateUpdate::default()
                });
                self.follow(&changes)
            }
            Command::Category(category) => {
                let changes = self.router.set_state(StateUpdate {
                    category: Some(category),
                    ..StateUpdate::default()
                });
                self.follow(&changes)
            }
            Command::Sort(sort) => {
                let changes = self.router.set_state(StateUpdate {
                    sort: Some(sort),
                    ..StateUpdate::default()
                });
                self.follow(&changes)
            }
            Command::More => {
                if self.loading {
                    f!("{}\n", i18n.t("browse.busy").yellow())
                } else if self.failed_fetch == Some(FetchKind::Append) {
                    // The router still points at the page that failed.
                    self.failed_fetch = None;
                    self.start_fetch(FetchKind::Append);
                    f!("{}\n", i18n.t("browse.loading").dimmed())
                } else if !self.has_more() {
                    f!("{}\n", i18n.t("results.end").dimmed())
                } else {
                    let page = self.router.state().page + 1;
                    let changes = self.router.set_state(StateUpdate {
                        page: Some(page),
                        ..StateUpdate::default()
                    });
                    self.follow(&changes)
                }
            }
            Command::Open(index) => match self.item_name(index) {
                Some((item, _)) => {
                    let spinner = new_spinner(i18n.t("browse.loading"))?;
                    let view = self.catalog.detail(&item).await;
                    spinner.finish_and_clear();
                    if !view.degraded {
                        self.metadata.insert(item.key(), view.metadata.clone());
                    }
                    self.render(|ctx| render::format_detail(&view, ctx))
                }
                None => no_item(&i18n, index),
            },
            Command::Favorite(index) => match self.item_name(index) {
                Some((item, name)) => {
                    let key = if self.favorites.toggle(&item)? {
                        "favorites.added"
                    } else {
                        "favorites.removed"
                    };
                    f!("{}\n", i18n.t_with(key, &[("name", name.as_str())]).green())
                }
                None => no_item(&i18n, index),
            },
            Command::Retry => {
                let kind = match self.failed_fetch.take() {
                    Some(kind) => kind,
                    None => {
                        if self.router.state().page != 0 {
                            self.router.set_state(StateUpdate {
                                page: Some(0),
                                ..StateUpdate::default()
                            });
                        }
                        FetchKind::Refetch
                    }
                };
                self.start_fetch(kind);
                f!("{}\n", i18n.t("browse.loading").dimmed())
            }
            Command::View(mode) => {
                self.router.set_state(StateUpdate {
                    view_mode: Some(mode),
                    ..StateUpdate::default()
                });
                let label = i18n.t(&f!("view.{mode}"));
                let mut out = f!("{}\n", i18n.t_with("browse.view", &[("view", label.as_str())]));
                if !self.results.items.is_empty() {
                    out.push_str(&self.format_results());
                }
                out
            }
            Command::Lang(locale) => {
                self.i18n.set_locale(locale);
                self.preferences.set_locale(locale)?;
                f!(
                    "{}\n",
                    self.i18n.t_with("browse.locale", &[("locale", locale.as_str())])
                )
            }
            Command::Link => {
                let link = self.router.link();
                f!("{}\n", i18n.t_with("browse.link", &[("link", link.as_str())]))
            }
            Command::Reset => {
                self.debouncer.cancel();
                let changes = self.router.reset();
                let mut out = f!("{}\n", i18n.t("browse.reset"));
                out.push_str(&self.follow(&changes));
                out
            }
            Command::Help => f!("{}\n", i18n.t("browse.help")),
            Command::Quit => return Ok(Step::Quit),
        };
        Ok(Step::Print(text))
    }
}

fn no_item(i18n: &I18n, index: usize) -> String {
    let index = index.to_string();
    f!(
        "{}\n",
        i18n.t_with("browse.no_item", &[("index", index.as_str())]).yellow()
    )
}

fn prompt(i18n: &I18n) -> Result<()> {
    anstream::print!("{}", i18n.t("browse.prompt").cyan().bold());
    std::io::stdout().flush()?;
    Ok(())
}

pub async fn run(options: BrowseOptions, global: crate::Global) -> Result<()> {
    let config = AppConfig::from_env()?.with_overrides(global.locale.clone());
    let store = Store::new(&config.data_dir);
    let i18n = crate::session_i18n(&config, &Preferences::new(store.clone()));
    let catalog = Catalog::new(Registries::new(&config)?);
    let (mut session, mut inbox) = Session::new(catalog, store, i18n, config.page_size);

    if let Some(link) = options.state.as_deref() {
        let (_, errors) = session.router.load_from_query(link);
        if global.verbose {
            for error in errors {
                eprintln!("Ignored link parameter: {error}");
            }
        }
    }
    if global.verbose {
        eprintln!("Starting session with ?{}", session.router.link());
    }

    println!("{}", i18n.t("browse.help").dimmed());
    session.start_fetch(FetchKind::Refetch);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt(&session.i18n)?;

    loop {
        let output = tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break; // EOF
                };
                let line = line.trim();
                if line.is_empty() {
                    prompt(&session.i18n)?;
                    continue;
                }
                match parse_command(line) {
                    Ok(command) => match session.handle(command).await {
                        Ok(Step::Quit) => break,
                        Ok(Step::Print(text)) => text,
                        Err(err) => f!("{}\n", f!("{err}").red()),
                    },
                    Err(ParseError::Unknown(name)) => f!(
                        "{}\n",
                        session
                            .i18n
                            .t_with("browse.unknown_command", &[("command", name.as_str())])
                            .yellow()
                    ),
                    Err(err) => f!("{}\n", err.to_string().yellow()),
                }
            }
            Some(text) = inbox.searches.recv() => session.search_settled(text),
            Some(outcome) = inbox.fetches.recv() => session.apply_outcome(outcome),
        };

        if !output.is_empty() {
            anstream::print!("\n{output}");
            prompt(&session.i18n)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{config_for, spawn_registry};
    use axum::extract::Query;
    use axum::{http::StatusCode, routing::get, Json, Router as AxumRouter};
    use minenav_core::platform::Platform;
    use serde_json::json;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn offline_session(dir: &Path) -> (Session, Inbox) {
        let config = config_for("http://127.0.0.1:9", dir);
        let catalog = Catalog::new(Registries::new(&config).unwrap());
        Session::new(catalog, Store::new(dir), I18n::new(Locale::En), 12)
    }

    fn item(id: &str, title: &str) -> RawItem {
        RawItem::from_json(Platform::Modrinth, json!({"project_id": id, "title": title})).unwrap()
    }

    fn results(items: Vec<RawItem>, total: u64) -> MergedResults {
        MergedResults {
            items,
            total,
            total_exact: true,
            queried: vec![Platform::Modrinth],
            failed: vec![],
        }
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(
            parse_command("q  economy shop "),
            Ok(Command::Search("economy shop".into()))
        );
        assert_eq!(parse_command("q"), Ok(Command::Search(String::new())));
        assert_eq!(
            parse_command("platform spigotmc"),
            Ok(Command::Platform(PlatformFilter::Only(Platform::Spigot)))
        );
        assert_eq!(parse_command("category Chat"), Ok(Command::Category("chat".into())));
        assert_eq!(parse_command("sort name-desc"), Ok(Command::Sort(SortKey::NameDesc)));
        assert_eq!(parse_command("open 3"), Ok(Command::Open(3)));
        assert_eq!(parse_command("view list"), Ok(Command::View(ViewMode::List)));
        assert_eq!(parse_command("lang zh_CN"), Ok(Command::Lang(Locale::ZhCn)));
        assert_eq!(parse_command("EXIT"), Ok(Command::Quit));
    }

    #[test]
    fn test_parse_command_errors() {
        assert_eq!(parse_command("dance"), Err(ParseError::Unknown("dance".into())));
        assert_eq!(
            parse_command("sort"),
            Err(ParseError::MissingArgument {
                command: "sort",
                expected: "a sort key"
            })
        );
        assert!(matches!(parse_command("open 0"), Err(ParseError::InvalidArgument(_))));
        assert!(matches!(parse_command("fav two"), Err(ParseError::InvalidArgument(_))));
        assert!(matches!(
            parse_command("category weather"),
            Err(ParseError::InvalidArgument(msg)) if msg.contains("economy")
        ));
    }

    #[tokio::test]
    async fn test_stale_outcomes_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _inbox) = offline_session(dir.path());
        let old = session.router.begin_fetch(FetchKind::Refetch);
        session.router.begin_fetch(FetchKind::Refetch);

        let text = session.apply_outcome(FetchOutcome {
            generation: old,
            kind: FetchKind::Refetch,
            results: results(vec![item("a", "Alpha")], 1),
        });

        assert!(text.contains("outdated"));
        assert!(session.results.items.is_empty());
    }

    #[tokio::test]
    async fn test_failed_append_keeps_loaded_results() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _inbox) = offline_session(dir.path());
        session.results = results(vec![item("a", "Alpha")], 40);
        let generation = session.router.begin_fetch(FetchKind::Append);

        let text = session.apply_outcome(FetchOutcome {
            generation,
            kind: FetchKind::Append,
            results: MergedResults {
                failed: vec![Platform::Modrinth],
                ..results(vec![], 0)
            },
        });

        assert!(text.contains("Failed to load more results."));
        assert!(text.contains("retry"));
        assert_eq!(session.results.items.len(), 1);
        assert_eq!(session.results.total, 40);
        assert_eq!(session.failed_fetch, Some(FetchKind::Append));
    }

    #[tokio::test]
    async fn test_append_renders_only_new_items() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _inbox) = offline_session(dir.path());
        session.results = results(vec![item("a", "Alpha")], 2);
        let generation = session.router.begin_fetch(FetchKind::Append);

        let text = session.apply_outcome(FetchOutcome {
            generation,
            kind: FetchKind::Append,
            results: results(vec![item("a", "Alpha"), item("b", "Beta")], 2),
        });

        assert!(text.contains("[2]"));
        assert!(text.contains("Beta"));
        assert!(!text.contains("Alpha"));
        assert!(!session.has_more());
    }

    #[tokio::test]
    async fn test_more_at_the_end_does_not_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _inbox) = offline_session(dir.path());
        session.results = results(vec![item("a", "Alpha")], 1);

        let Step::Print(text) = session.handle(Command::More).await.unwrap() else {
            panic!("more should not quit");
        };

        assert!(text.contains("No more results."));
        assert_eq!(session.router.state().page, 0);
    }

    #[tokio::test]
    async fn test_favorite_toggles_by_result_number() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _inbox) = offline_session(dir.path());
        session.results = results(vec![item("a", "Alpha")], 1);

        let Step::Print(added) = session.handle(Command::Favorite(1)).await.unwrap() else {
            panic!("fav should not quit");
        };
        let Step::Print(missing) = session.handle(Command::Favorite(5)).await.unwrap() else {
            panic!("fav should not quit");
        };

        assert!(added.contains("Added Alpha to favorites."));
        assert!(missing.contains("No result numbered 5."));
        let snapshot = session.favorites_snapshot.lock().unwrap().clone();
        assert_eq!(snapshot.len(), 1);
        assert!(session.format_results().contains('★'));
    }

    #[tokio::test]
    async fn test_debounced_search_fetches_once() {
        let router = AxumRouter::new().route(
            "/modrinth/search",
            get(|| async {
                Json(json!({"hits": [{"project_id": "w", "title": "WorldEdit"}], "total_hits": 1}))
            }),
        );
        let base = spawn_registry(router).await;
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::new(Registries::new(&config_for(&base, dir.path())).unwrap());
        let (mut session, mut inbox) =
            Session::new(catalog, Store::new(dir.path()), I18n::new(Locale::En), 12);
        session.router.set_state(StateUpdate {
            platform: Some(PlatformFilter::Only(Platform::Modrinth)),
            ..StateUpdate::default()
        });

        session.handle(Command::Search("wor".into())).await.unwrap();
        session.handle(Command::Search("world".into())).await.unwrap();

        let settled = inbox.searches.recv().await.unwrap();
        assert_eq!(settled, "world");
        assert!(inbox.searches.try_recv().is_err());

        session.search_settled(settled);
        let outcome = inbox.fetches.recv().await.unwrap();
        let text = session.apply_outcome(outcome);

        assert!(text.contains("WorldEdit"));
        assert!(text.contains("Search: \"world\""));
        assert_eq!(session.router.link(), "platform=modrinth&q=world");
    }

    fn paged_modrinth(failures_at_offset_one: usize) -> AxumRouter {
        let failures = Arc::new(AtomicUsize::new(failures_at_offset_one));
        AxumRouter::new().route(
            "/modrinth/search",
            get(move |Query(params): Query<HashMap<String, String>>| {
                let failures = failures.clone();
                async move {
                    let offset = params["offset"].clone();
                    if offset == "1"
                        && failures
                            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                            .is_ok()
                    {
                        return Err(StatusCode::SERVICE_UNAVAILABLE);
                    }
                    Ok(Json(json!({
                        "hits": [{"project_id": format!("p{offset}"), "title": format!("Page {offset}")}],
                        "total_hits": 3
                    })))
                }
            }),
        )
    }

    async fn paged_session(router: AxumRouter, dir: &Path) -> (Session, Inbox) {
        let base = spawn_registry(router).await;
        let catalog = Catalog::new(Registries::new(&config_for(&base, dir)).unwrap());
        let (mut session, inbox) = Session::new(catalog, Store::new(dir), I18n::new(Locale::En), 1);
        session.router.set_state(StateUpdate {
            platform: Some(PlatformFilter::Only(Platform::Modrinth)),
            ..StateUpdate::default()
        });
        (session, inbox)
    }

    fn printed(step: Step) -> String {
        match step {
            Step::Print(text) => text,
            Step::Quit => panic!("unexpected quit"),
        }
    }

    fn loaded_keys(session: &Session) -> Vec<String> {
        session.results.items.iter().map(RawItem::key).collect()
    }

    #[tokio::test]
    async fn test_more_while_a_page_loads_does_not_skip_it() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, mut inbox) = paged_session(paged_modrinth(0), dir.path()).await;

        session.start_fetch(FetchKind::Refetch);
        let outcome = inbox.fetches.recv().await.unwrap();
        session.apply_outcome(outcome);

        let first = printed(session.handle(Command::More).await.unwrap());
        let second = printed(session.handle(Command::More).await.unwrap());
        assert!(first.contains("Loading..."));
        assert!(second.contains("Still loading"));
        assert_eq!(session.router.state().page, 1);

        let outcome = inbox.fetches.recv().await.unwrap();
        assert!(session.apply_outcome(outcome).contains("Page 1"));

        session.handle(Command::More).await.unwrap();
        let outcome = inbox.fetches.recv().await.unwrap();
        session.apply_outcome(outcome);

        assert_eq!(
            loaded_keys(&session),
            vec!["modrinth:p0", "modrinth:p1", "modrinth:p2"]
        );
        assert_eq!(session.router.state().page, 2);
        assert!(!session.has_more());
    }

    #[tokio::test]
    async fn test_more_after_a_failed_page_requests_it_again() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, mut inbox) = paged_session(paged_modrinth(1), dir.path()).await;

        session.start_fetch(FetchKind::Refetch);
        let outcome = inbox.fetches.recv().await.unwrap();
        session.apply_outcome(outcome);

        session.handle(Command::More).await.unwrap();
        let outcome = inbox.fetches.recv().await.unwrap();
        assert!(session.apply_outcome(outcome).contains("Failed to load more results."));
        assert_eq!(session.failed_fetch, Some(FetchKind::Append));

        session.handle(Command::More).await.unwrap();
        assert_eq!(session.router.state().page, 1);
        let outcome = inbox.fetches.recv().await.unwrap();
        session.apply_outcome(outcome);

        assert_eq!(loaded_keys(&session), vec!["modrinth:p0", "modrinth:p1"]);
        assert_eq!(session.failed_fetch, None);
        assert!(session.has_more());
    }

    #[tokio::test]
    async fn test_new_query_drops_a_pending_page() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _inbox) = offline_session(dir.path());
        session.results = results(vec![item("a", "Alpha")], 40);
        let page = session.router.begin_fetch(FetchKind::Append);
        session.router.begin_fetch(FetchKind::Refetch);

        let text = session.apply_outcome(FetchOutcome {
            generation: page,
            kind: FetchKind::Append,
            results: results(vec![item("b", "Beta")], 40),
        });

        assert!(text.contains("outdated"));
        assert_eq!(session.results.items.len(), 1);
    }
}
