//! Terminal rendering. Every function here returns a `String` so output can
//! be tested without a terminal.

use crate::catalog::DetailView;
use crate::prelude::*;
use chrono::{DateTime, Utc};
use colored::Colorize;
use minenav_core::config::{self, SortKey};
use minenav_core::favorites::{self, Favorite};
use minenav_core::format::{format_number, relative_date, truncate};
use minenav_core::i18n::I18n;
use minenav_core::merge::MergedResults;
use minenav_core::metadata::Metadata;
use minenav_core::model::{PlatformExtras, PluginSummary, RawItem, NO_DESCRIPTION, UNKNOWN};
use minenav_core::platform::{Platform, PlatformFilter};
use minenav_core::state::{FilterState, ViewMode};
use serde::Serialize;
use std::collections::HashMap;

const DESCRIPTION_WIDTH: usize = 120;
const BODY_LIMIT: usize = 2_000;

/// What every renderer needs besides the data itself.
pub struct RenderContext<'a> {
    pub i18n: &'a I18n,
    pub now: DateTime<Utc>,
    pub favorites: &'a [Favorite],
}

impl RenderContext<'_> {
    fn is_favorite(&self, item: &RawItem) -> bool {
        favorites::is_favorite(self.favorites, &favorites::favorite_id(item))
    }

    /// The localized form of the core's literal fallbacks.
    fn text(&self, value: &str) -> String {
        match value {
            UNKNOWN => self.i18n.t("card.unknown"),
            NO_DESCRIPTION => self.i18n.t("card.no_description"),
            other => other.to_string(),
        }
    }
}

pub fn format_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| eyre!("JSON serialization failed: {}", e))
}

fn banner(title: &str) -> String {
    f!(
        "\n{}\n{}\n{}\n",
        "=".repeat(80).bright_cyan(),
        title.bright_cyan().bold(),
        "=".repeat(80).bright_cyan()
    )
}

fn platform_badge(platform: Platform) -> String {
    let (r, g, b) = platform.color();
    f!("[{}]", platform.display_name())
        .truecolor(r, g, b)
        .bold()
        .to_string()
}

pub fn platform_filter_label(filter: PlatformFilter, i18n: &I18n) -> String {
    match filter {
        PlatformFilter::All => i18n.t("platform.all"),
        PlatformFilter::Only(platform) => platform.display_name().to_string(),
    }
}

pub fn category_label(category: &str, i18n: &I18n) -> String {
    i18n.t(&f!("category.{category}"))
}

pub fn sort_label(sort: SortKey, i18n: &I18n) -> String {
    i18n.t(&f!("sort.{sort}"))
}

/// Title banner, active filters and the result count.
pub fn format_results_header(
    results: &MergedResults,
    state: &FilterState,
    ctx: &RenderContext,
) -> String {
    let i18n = ctx.i18n;
    let mut out = banner(&i18n.t("app.title"));

    let mut filters = vec![
        f!("{}: {}", i18n.t("filter.platform"), platform_filter_label(state.platform, i18n)),
        f!("{}: {}", i18n.t("filter.category"), category_label(&state.category, i18n)),
        f!("{}: {}", i18n.t("filter.sort"), sort_label(state.sort, i18n)),
    ];
    if !state.search.trim().is_empty() {
        filters.push(f!("{}: \"{}\"", i18n.t("filter.search"), state.search.trim()));
    }
    out.push_str(&f!("{}\n", filters.join(" · ").dimmed()));

    if !results.all_failed() {
        let count = results.total.to_string();
        let key = if results.total_exact {
            "results.count"
        } else {
            "results.count_approx"
        };
        let page = (state.page + 1).to_string();
        out.push_str(&f!(
            "{} · {}\n",
            i18n.t_with(key, &[("count", count.as_str())]).green().bold(),
            i18n.t_with("results.page", &[("page", page.as_str())])
        ));
    }
    out
}

/// A single grid card. `index` is the 1-based number shown to the user.
pub fn format_card(
    index: usize,
    item: &RawItem,
    metadata: Option<&Metadata>,
    ctx: &RenderContext,
) -> String {
    let i18n = ctx.i18n;
    let summary = item.normalize();
    let mut out = String::new();

    let star = if ctx.is_favorite(item) { "★ " } else { "" };
    out.push_str(&f!(
        "\n{} {}{}  {}\n",
        f!("[{index}]").yellow().bold(),
        star.yellow(),
        ctx.text(&summary.title).white().bold(),
        platform_badge(summary.platform)
    ));

    let author = ctx.text(&summary.author);
    out.push_str(&f!(
        "    {} · {} {} · {} {} · {} {}\n",
        i18n.t_with("card.by", &[("author", author.as_str())]),
        i18n.t("card.downloads"),
        format_number(summary.downloads),
        i18n.t("card.follows"),
        format_number(summary.follows),
        i18n.t("card.updated"),
        relative_date(summary.updated_at, ctx.now, i18n)
    ));
    out.push_str(&f!(
        "    {}\n",
        truncate(&ctx.text(&summary.description), DESCRIPTION_WIDTH)
    ));

    let tags = i18n.tags().translate_list(&summary.categories);
    if !tags.is_empty() {
        out.push_str(&f!("    {}: {}\n", i18n.t("detail.tags"), tags.join(", ").cyan()));
    }
    if !summary.loaders.is_empty() {
        let loaders: Vec<String> = summary.loaders.iter().map(|l| config::loader_label(l)).collect();
        out.push_str(&f!("    {}: {}\n", i18n.t("meta.loaders"), loaders.join(", ")));
    }
    if let Some(metadata) = metadata {
        for line in metadata.text_metadata(&i18n.t("card.unknown")) {
            if line.key == "meta.loaders" && !summary.loaders.is_empty() {
                continue;
            }
            out.push_str(&f!("    {}: {}\n", i18n.t(line.key), line.value));
        }
    }
    out.push_str(&f!("    {}  {}\n", summary.url.blue().underline(), item.key().dimmed()));
    out
}

/// The list view: one table row per item, numbered from `first`.
pub fn format_table(items: &[RawItem], first: usize, ctx: &RenderContext) -> String {
    let i18n = ctx.i18n;
    let mut table = new_table();
    table.add_row(prettytable::row![
        "#",
        "★",
        i18n.t("card.title"),
        i18n.t("card.platform"),
        i18n.t("card.downloads"),
        i18n.t("card.follows"),
        i18n.t("card.updated"),
        "ID"
    ]);

    for (i, item) in items.iter().enumerate() {
        let summary: PluginSummary = item.normalize();
        table.add_row(prettytable::row![
            first + i,
            if ctx.is_favorite(item) { "★" } else { "" },
            truncate(&ctx.text(&summary.title), 40),
            summary.platform.display_name(),
            format_number(summary.downloads),
            format_number(summary.follows),
            relative_date(summary.updated_at, ctx.now, i18n),
            item.key()
        ]);
    }
    table.to_string()
}

/// Items in the chosen view, or the empty/failure message.
pub fn format_results_body(
    results: &MergedResults,
    view: ViewMode,
    metadata: &HashMap<String, Metadata>,
    ctx: &RenderContext,
) -> String {
    let i18n = ctx.i18n;
    if results.all_failed() {
        return f!(
            "\n{}\n{}\n",
            i18n.t("results.all_failed").red().bold(),
            i18n.t("results.retry_hint").yellow()
        );
    }

    let mut out = String::new();
    if results.items.is_empty() {
        out.push_str(&f!("\n{}\n", i18n.t("results.empty").yellow()));
    } else {
        match view {
            ViewMode::Grid => {
                for (i, item) in results.items.iter().enumerate() {
                    out.push_str(&format_card(i + 1, item, metadata.get(&item.key()), ctx));
                }
            }
            ViewMode::List => {
                out.push('\n');
                out.push_str(&format_table(&results.items, 1, ctx));
            }
        }
    }

    if !results.failed.is_empty() {
        out.push_str(&format_partial_failure(&results.failed, i18n));
    }
    out
}

pub fn format_partial_failure(failed: &[Platform], i18n: &I18n) -> String {
    let names: Vec<&str> = failed.iter().map(|p| p.display_name()).collect();
    let names = names.join(", ");
    f!(
        "\n{}\n{}\n",
        i18n.t_with("results.partial", &[("platforms", names.as_str())]).yellow(),
        i18n.t("results.retry_hint").dimmed()
    )
}

pub fn format_detail(view: &DetailView, ctx: &RenderContext) -> String {
    let i18n = ctx.i18n;
    let detail = &view.detail;
    let summary = &detail.summary;
    let mut out = banner(&f!(
        "{}  ({})",
        ctx.text(&summary.title),
        summary.platform.display_name()
    ));

    if view.degraded {
        out.push_str(&f!("{}\n", i18n.t("detail.degraded").yellow()));
    }

    let author = ctx.text(&summary.author);
    out.push_str(&f!(
        "{} · {} {} · {} {} · {} {}\n",
        i18n.t_with("card.by", &[("author", author.as_str())]),
        i18n.t("card.downloads"),
        format_number(summary.downloads),
        i18n.t("card.follows"),
        format_number(summary.follows),
        i18n.t("card.updated"),
        relative_date(summary.updated_at, ctx.now, i18n)
    ));
    out.push_str(&f!("{}\n", summary.url.blue().underline()));

    let unknown = i18n.t("card.unknown");
    let mut lines = view.metadata.text_metadata(&unknown);
    if view.degraded && !detail.game_versions.is_empty() {
        let fallback = Metadata {
            supported_versions: detail.game_versions.clone(),
            ..Metadata::default()
        };
        lines = fallback.text_metadata(&unknown);
    }
    out.push('\n');
    for line in lines {
        out.push_str(&f!("{}: {}\n", i18n.t(line.key).bright_white().bold(), line.value));
    }

    let mut badges: Vec<String> = view
        .metadata
        .special_tags
        .iter()
        .map(|tag| tag.label.to_string())
        .collect();
    if let PlatformExtras::Hangar { supports_folia: true, .. } = detail.extras {
        if badges.is_empty() {
            badges.push(i18n.t("detail.folia"));
        }
    }
    if !badges.is_empty() {
        out.push_str(&f!("{}\n", badges.join(" · ").green()));
    }

    let tags = i18n.tags().translate_list(&summary.categories);
    if !tags.is_empty() {
        out.push_str(&f!(
            "{}: {}\n",
            i18n.t("detail.tags").bright_white().bold(),
            tags.join(", ").cyan()
        ));
    }

    out.push_str(&f!("\n{}\n", i18n.t("detail.description").bright_white().bold()));
    out.push_str(&f!("{}\n", truncate(ctx.text(&detail.body).trim(), BODY_LIMIT)));

    if !detail.links.is_empty() {
        out.push_str(&f!("\n{}\n", i18n.t("detail.links").bright_white().bold()));
        for link in detail.links.values() {
            out.push_str(&f!("  {}: {}\n", link.label.green(), link.url.blue()));
        }
    }
    out
}

pub fn format_favorites(list: &[Favorite], ctx: &RenderContext) -> String {
    let i18n = ctx.i18n;
    let mut out = banner(&i18n.t("favorites.title"));
    if list.is_empty() {
        out.push_str(&f!("{}\n", i18n.t("favorites.empty").yellow()));
        return out;
    }

    let mut table = new_table();
    table.add_row(prettytable::row![
        "ID",
        i18n.t("card.title"),
        i18n.t("card.platform"),
        i18n.t("card.downloads"),
        i18n.t("card.updated")
    ]);
    for favorite in list {
        match favorite.item().map(|item| item.normalize()) {
            Some(summary) => table.add_row(prettytable::row![
                favorite.id,
                truncate(&ctx.text(&summary.title), 40),
                summary.platform.display_name(),
                format_number(summary.downloads),
                relative_date(summary.updated_at, ctx.now, i18n)
            ]),
            None => table.add_row(prettytable::row![
                favorite.id,
                i18n.t("card.unknown"),
                favorite.platform.display_name(),
                "-",
                "-"
            ]),
        };
    }
    out.push_str(&table.to_string());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use minenav_core::i18n::Locale;
    use minenav_core::model::SearchPage;
    use minenav_core::merge::merge_pages;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap()
    }

    fn modrinth_item() -> RawItem {
        RawItem::from_json(
            Platform::Modrinth,
            json!({
                "project_id": "abc",
                "slug": "worldedit",
                "title": "WorldEdit",
                "author": "sk89q",
                "description": "In-game map editor",
                "downloads": 12345,
                "follows": 800,
                "categories": ["utility", "paper"],
                "loaders": ["paper"],
                "date_modified": "2024-06-07T00:00:00Z"
            }),
        )
        .unwrap()
    }

    fn spigot_item() -> RawItem {
        RawItem::from_json(Platform::Spigot, json!({"id": 34315, "name": "Vault", "downloads": 5})).unwrap()
    }

    fn results(items: Vec<RawItem>, failed: Vec<Platform>) -> MergedResults {
        let mut pages = vec![SearchPage::new(Platform::Modrinth, items.clone(), items.len() as u64, true)];
        pages.extend(failed.into_iter().map(SearchPage::failed));
        merge_pages(pages, SortKey::Downloads)
    }

    #[test]
    fn test_card_shows_summary_fields() {
        let i18n = I18n::new(Locale::En);
        let ctx = RenderContext { i18n: &i18n, now: now(), favorites: &[] };

        let card = format_card(1, &modrinth_item(), None, &ctx);

        assert!(card.contains("WorldEdit"));
        assert!(card.contains("by sk89q"));
        assert!(card.contains("12.3K"));
        assert!(card.contains("3 days ago"));
        assert!(card.contains("In-game map editor"));
        assert!(card.contains("Paper"));
        assert!(card.contains("https://modrinth.com/plugin/worldedit"));
        assert!(card.contains("modrinth:abc"));
        assert!(!card.contains('★'));
    }

    #[test]
    fn test_card_marks_favorites_and_metadata() {
        let i18n = I18n::new(Locale::En);
        let favorites = vec![Favorite::from_item(&modrinth_item())];
        let ctx = RenderContext { i18n: &i18n, now: now(), favorites: &favorites };
        let metadata = Metadata {
            supported_versions: vec!["1.20.4".into(), "1.16.5".into()],
            latest_version: "7.3.0".into(),
            ..Metadata::default()
        };

        let card = format_card(2, &modrinth_item(), Some(&metadata), &ctx);

        assert!(card.contains('★'));
        assert!(card.contains("1.16.5 – 1.20.4"));
        assert!(card.contains("7.3.0"));
    }

    #[test]
    fn test_localized_card_fallbacks() {
        let i18n = I18n::new(Locale::ZhCn);
        let ctx = RenderContext { i18n: &i18n, now: now(), favorites: &[] };

        let card = format_card(1, &spigot_item(), None, &ctx);

        assert!(card.contains("作者 未知"));
        assert!(card.contains("暂无描述"));
    }

    #[test]
    fn test_list_view_is_a_table() {
        let i18n = I18n::new(Locale::En);
        let ctx = RenderContext { i18n: &i18n, now: now(), favorites: &[] };

        let table = format_table(&[modrinth_item(), spigot_item()], 1, &ctx);

        assert!(table.contains("Name"));
        assert!(table.contains("WorldEdit"));
        assert!(table.contains("spigot:34315"));
        assert!(table.contains("SpigotMC"));
    }

    #[test]
    fn test_all_failed_shows_retry_hint() {
        let i18n = I18n::new(Locale::En);
        let ctx = RenderContext { i18n: &i18n, now: now(), favorites: &[] };
        let merged = merge_pages(
            Platform::ALL.iter().map(|p| SearchPage::failed(*p)).collect(),
            SortKey::Downloads,
        );

        let body = format_results_body(&merged, ViewMode::Grid, &HashMap::new(), &ctx);
        let header = format_results_header(&merged, &FilterState::default(), &ctx);

        assert!(body.contains("Could not reach any plugin registry."));
        assert!(body.contains("Type `retry` to try again."));
        assert!(!header.contains("plugins"));
    }

    #[test]
    fn test_partial_failure_names_platforms() {
        let i18n = I18n::new(Locale::En);
        let ctx = RenderContext { i18n: &i18n, now: now(), favorites: &[] };

        let body = format_results_body(
            &results(vec![modrinth_item()], vec![Platform::Hangar]),
            ViewMode::List,
            &HashMap::new(),
            &ctx,
        );

        assert!(body.contains("WorldEdit"));
        assert!(body.contains("Some registries failed to load: Hangar"));
    }

    #[test]
    fn test_empty_results() {
        let i18n = I18n::new(Locale::En);
        let ctx = RenderContext { i18n: &i18n, now: now(), favorites: &[] };

        let body = format_results_body(&results(vec![], vec![]), ViewMode::Grid, &HashMap::new(), &ctx);

        assert!(body.contains("No plugins match these filters."));
    }

    #[test]
    fn test_header_describes_filters_and_count() {
        let i18n = I18n::new(Locale::En);
        let ctx = RenderContext { i18n: &i18n, now: now(), favorites: &[] };
        let state = FilterState {
            category: "economy".into(),
            search: "shop".into(),
            page: 1,
            ..FilterState::default()
        };
        let mut merged = results(vec![modrinth_item()], vec![]);
        merged.total_exact = false;

        let header = format_results_header(&merged, &state, &ctx);

        assert!(header.contains("All platforms"));
        assert!(header.contains("Economy"));
        assert!(header.contains("Most downloads"));
        assert!(header.contains("\"shop\""));
        assert!(header.contains("1+ plugins"));
        assert!(header.contains("Page 2"));
    }

    #[test]
    fn test_detail_view() {
        let i18n = I18n::new(Locale::En);
        let ctx = RenderContext { i18n: &i18n, now: now(), favorites: &[] };
        let item = modrinth_item();
        let RawItem::Modrinth(hit) = &item else { unreachable!() };
        let view = DetailView {
            detail: minenav_core::modrinth::degraded_detail(hit),
            metadata: Metadata::default(),
            degraded: true,
        };

        let text = format_detail(&view, &ctx);

        assert!(text.contains("WorldEdit"));
        assert!(text.contains("Details could not be loaded"));
        assert!(text.contains("In-game map editor"));
        assert!(text.contains("Versions"));
    }

    #[test]
    fn test_favorites_list() {
        let i18n = I18n::new(Locale::En);
        let ctx = RenderContext { i18n: &i18n, now: now(), favorites: &[] };

        let empty = format_favorites(&[], &ctx);
        let filled = format_favorites(&[Favorite::from_item(&spigot_item())], &ctx);

        assert!(empty.contains("No favorites yet."));
        assert!(filled.contains("spigot:34315"));
        assert!(filled.contains("Vault"));
    }

    #[test]
    fn test_json_output() {
        let json = format_json(&results(vec![modrinth_item()], vec![])).unwrap();
        assert!(json.contains("\"total\": 1"));
        assert!(json.contains("\"project_id\": \"abc\""));
    }
}
