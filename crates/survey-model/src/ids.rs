#![deny(unsafe_code)]

use std::fmt;

use serde::de::{self, Visitor};

/// Identifier assigned upstream to an element, matrix row or choice.
///
/// The survey API emits ids as JSON numbers in some documents and as strings
/// in others, so both are accepted and kept in canonical string form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(String);

impl SourceId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<i64> for SourceId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl From<i32> for SourceId {
    fn from(value: i32) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for SourceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl serde::Serialize for SourceId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for SourceId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SourceIdVisitor)
    }
}

struct SourceIdVisitor;

impl Visitor<'_> for SourceIdVisitor {
    type Value = SourceId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a numeric or string identifier")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<SourceId, E> {
        Ok(SourceId(value.to_string()))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<SourceId, E> {
        Ok(SourceId(value.to_string()))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<SourceId, E> {
        // 42.0 and 42 must index the same element.
        if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 {
            Ok(SourceId((value as i64).to_string()))
        } else {
            Ok(SourceId(value.to_string()))
        }
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<SourceId, E> {
        Ok(SourceId::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_string_ids_agree() {
        let from_int: SourceId = serde_json::from_str("42").unwrap();
        let from_float: SourceId = serde_json::from_str("42.0").unwrap();
        let from_str: SourceId = serde_json::from_str("\" 42 \"").unwrap();
        assert_eq!(from_int, from_float);
        assert_eq!(from_int, from_str);
        assert_eq!(from_int.as_str(), "42");
    }

    #[test]
    fn serializes_as_string() {
        let id = SourceId::from(1001);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"1001\"");
    }
}
