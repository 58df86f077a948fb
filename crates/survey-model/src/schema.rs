//! Survey schema document.
//!
//! A schema is an ordered list of pages, each an ordered list of elements.
//! Document order matters downstream: it fixes column order and the
//! placeholder ordinals handed out during name sanitization.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::de::{lenient_vec, optional_code, optional_f64, optional_key};
use crate::ids::SourceId;

/// Display text, either a plain string or a localized `{"default": ...}` map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LocalizedText {
    Plain(String),
    Localized {
        #[serde(default)]
        default: Option<String>,
    },
    #[default]
    Missing,
}

impl LocalizedText {
    /// Default-locale text, or an empty string when absent.
    pub fn as_str(&self) -> &str {
        match self {
            LocalizedText::Plain(text) => text,
            LocalizedText::Localized { default } => default.as_deref().unwrap_or(""),
            LocalizedText::Missing => "",
        }
    }
}

impl From<&str> for LocalizedText {
    fn from(value: &str) -> Self {
        LocalizedText::Plain(value.to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SurveySchema {
    #[serde(default)]
    pub id: Option<SourceId>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub pages: Vec<Page>,
}

impl SurveySchema {
    /// Iterate every element across all pages in document order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.pages.iter().flat_map(|page| page.elements.iter())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Page {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub elements: Vec<Element>,
}

/// A schema element, dispatched on its `@type` discriminator.
#[derive(Debug, Clone)]
pub enum Element {
    Matrix(MatrixElement),
    Radiogroup(RadiogroupElement),
    Number(NumberElement),
    Text(TextElement),
    /// An element kind this crate does not know about, an element without a
    /// string `@type`, or a known kind whose body could not be read.
    Unknown,
}

impl<'de> Deserialize<'de> for Element {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Element::from_value)
    }
}

impl Element {
    fn from_value(raw: Value) -> Self {
        let kind = raw.get("@type").and_then(Value::as_str).map(str::to_owned);
        let parsed = match kind.as_deref() {
            Some("Matrix") => serde_json::from_value(raw).map(Element::Matrix),
            Some("Radiogroup") => serde_json::from_value(raw).map(Element::Radiogroup),
            Some("Number") => serde_json::from_value(raw).map(Element::Number),
            Some("Text") => serde_json::from_value(raw).map(Element::Text),
            _ => return Element::Unknown,
        };
        parsed.unwrap_or(Element::Unknown)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Element::Matrix(_) => "Matrix",
            Element::Radiogroup(_) => "Radiogroup",
            Element::Number(_) => "Number",
            Element::Text(_) => "Text",
            Element::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatrixElement {
    #[serde(default)]
    pub id: Option<SourceId>,
    #[serde(default)]
    pub title: LocalizedText,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub rows: Vec<MatrixRow>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub columns: Vec<MatrixColumn>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatrixRow {
    #[serde(default)]
    pub id: Option<SourceId>,
    #[serde(rename = "itemKey", default, deserialize_with = "optional_key")]
    pub item_key: Option<String>,
    #[serde(default)]
    pub text: LocalizedText,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatrixColumn {
    #[serde(default, deserialize_with = "optional_code")]
    pub value: Option<i64>,
    #[serde(default)]
    pub text: LocalizedText,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RadiogroupElement {
    #[serde(default)]
    pub id: Option<SourceId>,
    #[serde(rename = "itemKey", default, deserialize_with = "optional_key")]
    pub item_key: Option<String>,
    #[serde(default)]
    pub title: LocalizedText,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub id: Option<SourceId>,
    #[serde(default, deserialize_with = "optional_code")]
    pub value: Option<i64>,
    #[serde(default)]
    pub text: LocalizedText,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NumberElement {
    #[serde(default)]
    pub id: Option<SourceId>,
    #[serde(rename = "itemKey", default, deserialize_with = "optional_key")]
    pub item_key: Option<String>,
    #[serde(default)]
    pub title: LocalizedText,
    #[serde(default, deserialize_with = "optional_f64")]
    pub min: Option<f64>,
    #[serde(default, deserialize_with = "optional_f64")]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextElement {
    #[serde(default)]
    pub id: Option<SourceId>,
    #[serde(rename = "itemKey", default, deserialize_with = "optional_key")]
    pub item_key: Option<String>,
    #[serde(default)]
    pub title: LocalizedText,
}
