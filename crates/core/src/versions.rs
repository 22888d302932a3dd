//! Minecraft version ranges and latest-release resolution.

use regex::Regex;
use std::cmp::Ordering;
use std::sync::OnceLock;

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+(?:\.\d+)*").expect("static regex"))
}

/// Numeric parts of the first `\d+(\.\d+)*` run in `version`.
///
/// Returns `None` when there is no such run or a part does not fit a `u64`.
pub fn parse_version_parts(version: &str) -> Option<Vec<u64>> {
    let found = version_pattern().find(version)?;
    found
        .as_str()
        .split('.')
        .map(|part| part.parse::<u64>().ok())
        .collect()
}

fn compare_parts(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    for i in 0..len {
        let left = a.get(i).copied().unwrap_or(0);
        let right = b.get(i).copied().unwrap_or(0);
        match left.cmp(&right) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// Parseable, deduplicated versions sorted ascending.
///
/// Equal tuples ("1.20" and "1.20.0") are ordered by their raw text so the
/// result never depends on input order.
pub fn sorted_versions<S: AsRef<str>>(versions: &[S]) -> Vec<String> {
    let mut parsed: Vec<(Vec<u64>, String)> = Vec::new();
    for version in versions {
        let raw = version.as_ref().trim();
        if raw.is_empty() || parsed.iter().any(|(_, seen)| seen == raw) {
            continue;
        }
        if let Some(parts) = parse_version_parts(raw) {
            parsed.push((parts, raw.to_string()));
        }
    }

    parsed.sort_by(|(a_parts, a_raw), (b_parts, b_raw)| {
        compare_parts(a_parts, b_parts).then_with(|| a_raw.cmp(b_raw))
    });
    parsed.into_iter().map(|(_, raw)| raw).collect()
}

/// `"<min> – <max>"`, the single version when they match, or `fallback`.
pub fn format_version_list<S: AsRef<str>>(versions: &[S], fallback: &str) -> String {
    let sorted = sorted_versions(versions);
    match (sorted.first(), sorted.last()) {
        (Some(min), Some(max)) if min == max => min.clone(),
        (Some(min), Some(max)) => format!("{min} – {max}"),
        _ => fallback.to_string(),
    }
}

/// Entry with the greatest timestamp; the first one wins ties.
///
/// `timestamp_of` should return 0 for a missing or invalid date.
pub fn latest_by_date<T, F>(items: &[T], timestamp_of: F) -> Option<&T>
where
    F: Fn(&T) -> i64,
{
    let mut iter = items.iter();
    let first = iter.next()?;
    let mut latest = (first, timestamp_of(first));
    for item in iter {
        let ts = timestamp_of(item);
        if ts > latest.1 {
            latest = (item, ts);
        }
    }
    Some(latest.0)
}

/// Milliseconds since the epoch for an ISO-8601 string, 0 when missing or invalid.
pub fn iso_millis(value: Option<&str>) -> i64 {
    crate::model::parse_iso(value)
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(0)
}

/// Milliseconds since the epoch for Unix seconds, 0 when missing.
pub fn epoch_seconds_millis(value: Option<i64>) -> i64 {
    value.map(|secs| secs.saturating_mul(1000)).unwrap_or(0)
}
