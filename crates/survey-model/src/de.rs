//! Lenient field deserializers for upstream survey documents.
//!
//! Optional sub-fields that carry an unexpected shape deserialize to `None`
//! so that only the affected feature is skipped, never the whole document.

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Int(i64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

impl LooseNumber {
    fn into_f64(self) -> Option<f64> {
        match self {
            LooseNumber::Int(value) => Some(value as f64),
            LooseNumber::Float(value) => Some(value),
            LooseNumber::Text(text) => text.trim().parse::<f64>().ok(),
            LooseNumber::Other(_) => None,
        }
        .filter(|value| value.is_finite())
    }

    fn into_code(self) -> Option<i64> {
        match self {
            LooseNumber::Int(value) => Some(value),
            LooseNumber::Text(text) => {
                let trimmed = text.trim();
                trimmed.parse::<i64>().ok().or_else(|| {
                    trimmed
                        .parse::<f64>()
                        .ok()
                        .filter(|value| value.is_finite())
                        .map(truncate)
                })
            }
            other => other.into_f64().map(truncate),
        }
    }
}

fn truncate(value: f64) -> i64 {
    value.trunc() as i64
}

/// Integer category code from a number or numeric string.
pub(crate) fn optional_code<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<LooseNumber> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(LooseNumber::into_code))
}

/// Finite float from a number or numeric string.
pub(crate) fn optional_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<LooseNumber> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(LooseNumber::into_f64))
}

/// Non-blank key string. Blank keys count as absent.
pub(crate) fn optional_key<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum LooseKey {
        Text(String),
        Int(i64),
        Other(IgnoredAny),
    }

    let raw: Option<LooseKey> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|raw| match raw {
        LooseKey::Text(text) => Some(text.trim().to_string()),
        LooseKey::Int(value) => Some(value.to_string()),
        LooseKey::Other(_) => None,
    })
    .filter(|key| !key.is_empty()))
}

/// List field that tolerates `null`, a non-list value and malformed entries.
///
/// Entries that fail to deserialize are dropped one by one; their siblings are kept.
pub(crate) fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Value::deserialize(deserializer)?;
    let Value::Array(items) = raw else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "lenient_vec")]
        items: Vec<i64>,
    }

    fn items(json: &str) -> Vec<i64> {
        serde_json::from_str::<Holder>(json).unwrap().items
    }

    #[test]
    fn lenient_vec_tolerates_bad_shapes() {
        assert_eq!(items(r#"{"items": null}"#), Vec::<i64>::new());
        assert_eq!(items(r#"{"items": {"a": 1}}"#), Vec::<i64>::new());
        assert_eq!(items(r#"{}"#), Vec::<i64>::new());
        assert_eq!(items(r#"{"items": [1, "x", 3]}"#), vec![1, 3]);
    }
}
