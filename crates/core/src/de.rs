use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accept integers and floats for counters; registries are not consistent.
pub(crate) fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

/// Keep strings, render numbers as text, drop anything else.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Option::<Value>::deserialize(deserializer)?))
}

/// A list of labels; entries that are not strings or numbers are skipped.
pub(crate) fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(values)) => values
            .into_iter()
            .filter_map(|value| scalar_text(Some(value)))
            .collect(),
        _ => Vec::new(),
    })
}

/// A list of records. `null` and non-lists are empty, and an entry that does
/// not decode is dropped instead of failing the whole list.
pub(crate) fn lenient_items<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(values)) => values
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Any other field: a value of the wrong shape becomes the default.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default())
}

fn scalar_text(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Sample {
        #[serde(deserialize_with = "lenient_string")]
        name: Option<String>,
        #[serde(deserialize_with = "lenient_strings")]
        tags: Vec<String>,
        #[serde(deserialize_with = "lenient_items")]
        children: Vec<Child>,
        #[serde(deserialize_with = "lenient")]
        child: Option<Child>,
        #[serde(deserialize_with = "lenient_u64")]
        count: u64,
    }

    #[derive(Debug, Default, PartialEq, Deserialize)]
    struct Child {
        id: u64,
    }

    #[test]
    fn test_wrong_types_fall_back() {
        let sample: Sample = serde_json::from_value(json!({
            "name": 42,
            "tags": ["a", 1, null, {"x": 1}],
            "children": [{"id": 1}, "oops", {"id": "two"}, {"id": 3}],
            "child": "oops",
            "count": "7"
        }))
        .unwrap();

        assert_eq!(sample.name.as_deref(), Some("42"));
        assert_eq!(sample.tags, vec!["a", "1"]);
        assert_eq!(sample.children, vec![Child { id: 1 }, Child { id: 3 }]);
        assert_eq!(sample.child, None);
        assert_eq!(sample.count, 7);
    }

    #[test]
    fn test_nulls_and_non_lists_are_empty() {
        let sample: Sample = serde_json::from_value(json!({
            "name": {"nested": true},
            "tags": "paper",
            "children": null,
            "child": null
        }))
        .unwrap();

        assert_eq!(sample.name, None);
        assert!(sample.tags.is_empty());
        assert!(sample.children.is_empty());
        assert_eq!(sample.count, 0);
    }
}
