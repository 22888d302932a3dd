//! Display helpers for counts, text and dates.

use crate::i18n::I18n;
use chrono::{DateTime, Utc};

/// `1.2K`, `3.4M`, or the plain number below a thousand.
pub fn format_number(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Cut `text` to `max` characters, appending `...` when anything was cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max).collect();
    cut.push_str("...");
    cut
}

/// "Today", "3 days ago", "2 months ago" and so on, relative to `now`.
pub fn relative_date(date: Option<DateTime<Utc>>, now: DateTime<Utc>, i18n: &I18n) -> String {
    let Some(date) = date else {
        return i18n.t("date.unknown");
    };

    let days = (now - date).num_days().unsigned_abs();
    let counted = |key: &str, count: u64| {
        let count = count.to_string();
        i18n.t_with(key, &[("count", count.as_str())])
    };
    match days {
        0 => i18n.t("date.today"),
        1 => i18n.t("date.yesterday"),
        2..=6 => counted("date.days", days),
        7..=29 => counted("date.weeks", days / 7),
        30..=364 => counted("date.months", days / 30),
        _ => counted("date.years", days / 365),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Locale;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_000), "1.0K");
        assert_eq!(format_number(12_345), "12.3K");
        assert_eq!(format_number(2_500_000), "2.5M");
    }

    #[test]
    fn test_truncate_is_char_aware() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly", 7), "exactly");
        assert_eq!(truncate("a longer sentence", 8), "a longer...");
        assert_eq!(truncate("插件导航工具", 4), "插件导航...");
    }

    #[test]
    fn test_relative_date() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let en = I18n::new(Locale::En);

        assert_eq!(relative_date(Some(now - Duration::hours(3)), now, &en), "Today");
        assert_eq!(relative_date(Some(now - Duration::days(1)), now, &en), "Yesterday");
        assert_eq!(relative_date(Some(now - Duration::days(5)), now, &en), "5 days ago");
        assert_eq!(relative_date(Some(now - Duration::days(15)), now, &en), "2 weeks ago");
        assert_eq!(relative_date(Some(now - Duration::days(95)), now, &en), "3 months ago");
        assert_eq!(relative_date(Some(now - Duration::days(800)), now, &en), "2 years ago");
        assert_eq!(relative_date(None, now, &en), "Unknown");
    }

    #[test]
    fn test_relative_date_localized() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let zh = I18n::new(Locale::ZhCn);
        assert_eq!(relative_date(Some(now - Duration::days(3)), now, &zh), "3天前");
    }
}
