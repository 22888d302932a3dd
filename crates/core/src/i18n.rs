//! Message packs, placeholder substitution and tag translation.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    En,
    #[serde(rename = "zh-CN")]
    ZhCn,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::ZhCn];

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::ZhCn => "zh-CN",
        }
    }

    /// Parse a locale tag, falling back to English for anything unsupported.
    pub fn resolve(tag: &str) -> Locale {
        tag.parse().unwrap_or_default()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "en" | "en-us" | "en-gb" => Ok(Locale::En),
            "zh" | "zh-cn" | "zh-hans" => Ok(Locale::ZhCn),
            other => Err(format!("Unsupported locale: {other}. Supported: en, zh-CN")),
        }
    }
}

type Pack = &'static [(&'static str, &'static str)];

const EN: Pack = &[
    ("app.title", "Minecraft plugin navigator"),
    ("platform.all", "All platforms"),
    ("category.all", "All"),
    ("category.admin", "Admin tools"),
    ("category.gameplay", "Gameplay"),
    ("category.world", "World"),
    ("category.economy", "Economy"),
    ("category.chat", "Chat"),
    ("category.utility", "Utility"),
    ("category.dev", "Developer tools"),
    ("category.misc", "Miscellaneous"),
    ("sort.downloads", "Most downloads"),
    ("sort.newest", "Newest"),
    ("sort.updated", "Recently updated"),
    ("sort.follows", "Most followed"),
    ("sort.name-asc", "Name (A-Z)"),
    ("sort.name-desc", "Name (Z-A)"),
    ("filter.platform", "Platform"),
    ("filter.category", "Category"),
    ("filter.sort", "Sort"),
    ("filter.search", "Search"),
    ("view.grid", "Grid"),
    ("view.list", "List"),
    ("card.unknown", "Unknown"),
    ("card.no_description", "No description"),
    ("card.by", "by {author}"),
    ("card.downloads", "Downloads"),
    ("card.follows", "Follows"),
    ("card.updated", "Updated"),
    ("card.platform", "Platform"),
    ("card.title", "Name"),
    ("card.favorite", "Favorite"),
    ("meta.versions", "Versions"),
    ("meta.latest", "Latest"),
    ("meta.loaders", "Loaders"),
    ("meta.paper", "Paper"),
    ("meta.velocity", "Velocity"),
    ("meta.waterfall", "Waterfall"),
    ("meta.rating", "Rating"),
    ("date.unknown", "Unknown"),
    ("date.today", "Today"),
    ("date.yesterday", "Yesterday"),
    ("date.days", "{count} days ago"),
    ("date.weeks", "{count} weeks ago"),
    ("date.months", "{count} months ago"),
    ("date.years", "{count} years ago"),
    ("results.count", "{count} plugins"),
    ("results.count_approx", "{count}+ plugins"),
    ("results.page", "Page {page}"),
    ("results.empty", "No plugins match these filters."),
    ("results.all_failed", "Could not reach any plugin registry."),
    ("results.retry_hint", "Type `retry` to try again."),
    ("results.partial", "Some registries failed to load: {platforms}"),
    ("results.load_failed", "Failed to load more results."),
    ("results.more", "Type `more` to load the next page."),
    ("results.end", "No more results."),
    ("results.stale", "Discarded results of an outdated query."),
    ("detail.description", "Description"),
    ("detail.links", "Links"),
    ("detail.versions", "Game versions"),
    ("detail.degraded", "Details could not be loaded; showing search data."),
    ("detail.folia", "Supports Folia"),
    ("detail.tags", "Tags"),
    ("favorites.title", "Favorites"),
    ("favorites.empty", "No favorites yet."),
    ("favorites.added", "Added {name} to favorites."),
    ("favorites.removed", "Removed {name} from favorites."),
    ("favorites.exists", "{name} is already in your favorites."),
    ("favorites.not_found", "{id} is not in your favorites."),
    ("browse.prompt", "minenav> "),
    ("browse.help", "Commands: q <text>, platform <p>, category <c>, sort <s>, more, open <n>, fav <n>, retry, view grid|list, lang <locale>, link, reset, help, quit"),
    ("browse.unknown_command", "Unknown command: {command}. Type `help` for the list."),
    ("browse.no_item", "No result numbered {index}."),
    ("browse.link", "Share link: {link}"),
    ("browse.searching", "Searching for \"{query}\"..."),
    ("browse.loading", "Loading..."),
    ("browse.busy", "Still loading the previous page, try again in a moment."),
    ("browse.locale", "Language set to {locale}."),
    ("browse.view", "Layout set to {view}."),
    ("browse.reset", "Filters reset."),
];

const ZH_CN: Pack = &[
    ("app.title", "Minecraft 插件导航"),
    ("platform.all", "全部平台"),
    ("category.all", "全部"),
    ("category.admin", "管理工具"),
    ("category.gameplay", "游戏玩法"),
    ("category.world", "世界管理"),
    ("category.economy", "经济"),
    ("category.chat", "聊天"),
    ("category.utility", "实用工具"),
    ("category.dev", "开发工具"),
    ("category.misc", "杂项"),
    ("sort.downloads", "下载最多"),
    ("sort.newest", "最新发布"),
    ("sort.updated", "最近更新"),
    ("sort.follows", "关注最多"),
    ("sort.name-asc", "名称 (A-Z)"),
    ("sort.name-desc", "名称 (Z-A)"),
    ("filter.platform", "平台"),
    ("filter.category", "分类"),
    ("filter.sort", "排序"),
    ("filter.search", "搜索"),
    ("view.grid", "网格"),
    ("view.list", "列表"),
    ("card.unknown", "未知"),
    ("card.no_description", "暂无描述"),
    ("card.by", "作者 {author}"),
    ("card.downloads", "下载"),
    ("card.follows", "关注"),
    ("card.updated", "更新"),
    ("card.platform", "平台"),
    ("card.title", "名称"),
    ("card.favorite", "收藏"),
    ("meta.versions", "支持版本"),
    ("meta.latest", "最新版本"),
    ("meta.loaders", "加载器"),
    ("meta.rating", "评分"),
    ("date.unknown", "未知"),
    ("date.today", "今天"),
    ("date.yesterday", "昨天"),
    ("date.days", "{count}天前"),
    ("date.weeks", "{count}周前"),
    ("date.months", "{count}月前"),
    ("date.years", "{count}年前"),
    ("results.count", "共 {count} 个插件"),
    ("results.count_approx", "至少 {count} 个插件"),
    ("results.page", "第 {page} 页"),
    ("results.empty", "没有符合条件的插件。"),
    ("results.all_failed", "无法连接任何插件平台。"),
    ("results.retry_hint", "输入 `retry` 重试。"),
    ("results.partial", "部分平台加载失败：{platforms}"),
    ("results.load_failed", "加载更多结果失败。"),
    ("results.more", "输入 `more` 加载下一页。"),
    ("results.end", "没有更多结果了。"),
    ("detail.description", "简介"),
    ("detail.links", "链接"),
    ("detail.versions", "游戏版本"),
    ("detail.degraded", "详情加载失败，显示搜索结果中的信息。"),
    ("detail.folia", "支持 Folia"),
    ("detail.tags", "标签"),
    ("favorites.title", "收藏夹"),
    ("favorites.empty", "还没有收藏。"),
    ("favorites.added", "已收藏 {name}。"),
    ("favorites.removed", "已取消收藏 {name}。"),
    ("favorites.exists", "{name} 已在收藏夹中。"),
    ("favorites.not_found", "{id} 不在收藏夹中。"),
    ("browse.unknown_command", "未知命令：{command}。输入 `help` 查看命令列表。"),
    ("browse.no_item", "没有编号为 {index} 的结果。"),
    ("browse.link", "分享链接：{link}"),
    ("browse.searching", "正在搜索 \"{query}\"..."),
    ("browse.loading", "加载中..."),
    ("browse.busy", "上一页仍在加载，请稍后再试。"),
    ("browse.locale", "语言已切换为 {locale}。"),
    ("browse.view", "布局已切换为 {view}。"),
    ("browse.reset", "筛选条件已重置。"),
    ("browse.help", "命令：q <文本>、platform <平台>、category <分类>、sort <排序>、more、open <n>、fav <n>、retry、view grid|list、lang <语言>、link、reset、help、quit"),
];

const ZH_CN_TAGS: Pack = &[
    ("admin_tools", "管理工具"),
    ("management", "管理"),
    ("utility", "实用工具"),
    ("economy", "经济"),
    ("chat", "聊天"),
    ("social", "社交"),
    ("gameplay", "游戏玩法"),
    ("game-mechanics", "游戏机制"),
    ("mechanics", "机制"),
    ("worldgen", "世界生成"),
    ("world_management", "世界管理"),
    ("library", "前置库"),
    ("libraries_apis", "前置库/API"),
    ("dev_tools", "开发工具"),
    ("tools_and_utilities", "工具"),
    ("misc", "杂项"),
    ("minigame", "小游戏"),
    ("game_mode", "游戏模式"),
    ("fun", "娱乐"),
    ("optimization", "优化"),
    ("storage", "存储"),
    ("technology", "科技"),
    ("transportation", "交通"),
    ("adventure", "冒险"),
    ("decoration", "装饰"),
    ("equipment", "装备"),
    ("food", "食物"),
    ("magic", "魔法"),
    ("mobs", "生物"),
    ("protection", "保护"),
    ("datapack", "数据包"),
];

const EN_TAGS: Pack = &[
    ("admin_tools", "Admin Tools"),
    ("game-mechanics", "Game Mechanics"),
    ("world_management", "World Management"),
    ("libraries_apis", "Libraries / APIs"),
    ("dev_tools", "Developer Tools"),
    ("tools_and_utilities", "Tools and Utilities"),
    ("game_mode", "Game Mode"),
    ("datapack", "Datapack"),
];

fn pack(locale: Locale) -> Pack {
    match locale {
        Locale::En => EN,
        Locale::ZhCn => ZH_CN,
    }
}

fn tag_pack(locale: Locale) -> Pack {
    match locale {
        Locale::En => EN_TAGS,
        Locale::ZhCn => ZH_CN_TAGS,
    }
}

fn lookup(pack: Pack, key: &str) -> Option<&'static str> {
    pack.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{(\w+)\}").expect("static regex"))
}

/// Translate `key`, substituting `{name}` placeholders from `params`.
///
/// Falls back to the English pack, then to the key itself. Placeholders
/// without a matching param are left as written.
pub fn translate(locale: Locale, key: &str, params: &[(&str, &str)]) -> String {
    let template = lookup(pack(locale), key)
        .or_else(|| lookup(EN, key))
        .unwrap_or(key);

    placeholder_pattern()
        .replace_all(template, |caps: &Captures| {
            params
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// The active locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct I18n {
    locale: Locale,
}

impl I18n {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
    }

    pub fn t(&self, key: &str) -> String {
        translate(self.locale, key, &[])
    }

    pub fn t_with(&self, key: &str, params: &[(&str, &str)]) -> String {
        translate(self.locale, key, params)
    }

    pub fn tags(&self) -> TagTranslator {
        TagTranslator { locale: self.locale }
    }
}

/// Display names for category tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagTranslator {
    locale: Locale,
}

impl TagTranslator {
    /// Exact match, then lowercase match, then the tag unchanged.
    pub fn translate(&self, tag: &str) -> String {
        if tag.is_empty() {
            return String::new();
        }
        let pack = tag_pack(self.locale);
        lookup(pack, tag)
            .or_else(|| lookup(pack, &tag.to_lowercase()))
            .map(str::to_string)
            .unwrap_or_else(|| tag.to_string())
    }

    /// Translate every non-empty tag.
    pub fn translate_list<S: AsRef<str>>(&self, tags: &[S]) -> Vec<String> {
        tags.iter()
            .map(|tag| self.translate(tag.as_ref()))
            .filter(|tag| !tag.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_with_params() {
        assert_eq!(
            translate(Locale::En, "date.days", &[("count", "3")]),
            "3 days ago"
        );
        assert_eq!(
            translate(Locale::ZhCn, "date.days", &[("count", "3")]),
            "3天前"
        );
    }

    #[test]
    fn test_translate_falls_back_to_english_then_key() {
        assert_eq!(translate(Locale::ZhCn, "meta.velocity", &[]), "Velocity");
        assert_eq!(translate(Locale::ZhCn, "no.such.key", &[]), "no.such.key");
    }

    #[test]
    fn test_missing_param_keeps_placeholder() {
        assert_eq!(translate(Locale::En, "card.by", &[]), "by {author}");
        assert_eq!(
            translate(Locale::En, "card.by", &[("other", "x"), ("author", "alice")]),
            "by alice"
        );
    }

    #[test]
    fn test_locale_resolution() {
        assert_eq!(Locale::resolve("zh_CN"), Locale::ZhCn);
        assert_eq!(Locale::resolve("fr"), Locale::En);
        assert_eq!(serde_json::to_string(&Locale::ZhCn).unwrap(), "\"zh-CN\"");
    }

    #[test]
    fn test_tag_translation() {
        let tags = I18n::new(Locale::ZhCn).tags();
        assert_eq!(tags.translate("economy"), "经济");
        assert_eq!(tags.translate("ECONOMY"), "经济");
        assert_eq!(tags.translate("brand-new"), "brand-new");
        assert_eq!(tags.translate_list(&["chat", ""]), vec!["聊天"]);
    }

    #[test]
    fn test_every_chinese_key_exists_in_english() {
        for (key, _) in ZH_CN {
            assert!(lookup(EN, key).is_some(), "{key} missing from en");
        }
    }
}
