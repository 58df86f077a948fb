//! Export-safe variable names.
//!
//! Question keys come from survey authors and can be anything: long
//! free-form strings, UUIDs, or strings with punctuation. Statistical
//! formats need short identifiers made of letters, digits and underscores.
//! [`sanitize_names`] maps every key to such a name, deterministically from
//! document order, and never assigns the same name twice.

use std::collections::{HashMap, HashSet};

use tracing::debug;

/// Longest name any export format accepts, in UTF-8 bytes.
pub const MAX_NAME_LEN: usize = 64;

/// Base length in bytes kept in front of a collision suffix.
pub const SUFFIX_BASE_LEN: usize = 60;

/// Column holding the response id.
pub const RESPONSE_ID_COLUMN: &str = "response_id";

/// Column holding the response creation timestamp.
pub const CREATED_AT_COLUMN: &str = "created_at";

/// Literal tokens that upstream keys embed and that never make a key invalid.
const IGNORED_KEY_TOKENS: [&str; 4] = ["OFF", "MERK", "CUSTOM", "PAGE"];

const UUID_LEN: usize = 36;
const UUID_HYPHENS: usize = 4;

/// How a name was derived from its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameOrigin {
    /// The key was already a valid name.
    Unchanged,
    /// The key looked like a UUID and received a `Q###` placeholder.
    Placeholder,
    /// The key was cleaned and truncated.
    Cleaned,
    /// The name needed a numeric suffix to stay unique.
    Suffixed,
}

/// Immutable bijection from question keys to export names.
#[derive(Debug, Clone, Default)]
pub struct VariableNames {
    entries: Vec<(String, String)>,
    by_key: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

impl VariableNames {
    /// Export name assigned to a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.by_key
            .get(key)
            .map(|&idx| self.entries[idx].1.as_str())
    }

    /// Key that received an export name.
    pub fn key_for(&self, name: &str) -> Option<&str> {
        self.by_name
            .get(name)
            .map(|&idx| self.entries[idx].0.as_str())
    }

    /// `(key, name)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, name)| (key.as_str(), name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Assign export names to keys in the given order.
///
/// Rules, first match wins:
/// 1. A key that is already valid is kept.
/// 2. A UUID-shaped key gets the next `Q001`, `Q002`, ... placeholder.
/// 3. Anything else has invalid characters replaced by `_` and is
///    truncated to [`MAX_NAME_LEN`] bytes on a character boundary.
///
/// A candidate that is already taken gets a numeric suffix on a shortened
/// base. The metadata column names are reserved up front. Repeated keys map
/// to the name of their first occurrence.
pub fn sanitize_names<I, S>(keys: I) -> VariableNames
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut allocator = NameAllocator::new();
    let mut names = VariableNames::default();
    for key in keys {
        let key = key.as_ref();
        if names.by_key.contains_key(key) {
            continue;
        }
        let (name, origin) = allocator.assign(key);
        if origin != NameOrigin::Unchanged {
            debug!(key, name = %name, ?origin, "renamed variable");
        }
        let idx = names.entries.len();
        names.by_key.insert(key.to_string(), idx);
        names.by_name.insert(name.clone(), idx);
        names.entries.push((key.to_string(), name));
    }
    names
}

/// Returns true if `key` can be used as an export name unchanged.
pub fn is_valid_name(key: &str) -> bool {
    if key.len() > MAX_NAME_LEN || key.contains('-') {
        return false;
    }
    let mut stripped = key.to_string();
    for token in IGNORED_KEY_TOKENS {
        stripped = stripped.replace(token, "");
    }
    stripped.chars().all(is_name_char)
}

/// Returns true for 36-character keys with exactly four hyphens.
pub fn is_uuid_shaped(key: &str) -> bool {
    key.chars().count() == UUID_LEN && key.matches('-').count() == UUID_HYPHENS
}

fn is_name_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

fn clean_key(key: &str) -> String {
    let mut name = String::with_capacity(key.len().min(MAX_NAME_LEN));
    for ch in key.chars() {
        let ch = if is_name_char(ch) { ch } else { '_' };
        if name.len() + ch.len_utf8() > MAX_NAME_LEN {
            break;
        }
        name.push(ch);
    }
    name
}

/// Longest prefix of `value` that fits in `max_bytes` without splitting a character.
fn truncate_bytes(value: &str, max_bytes: usize) -> &str {
    if value.len() <= max_bytes {
        return value;
    }
    let mut end = max_bytes;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

struct NameAllocator {
    used: HashSet<String>,
    suffix_counters: HashMap<String, usize>,
    placeholders: usize,
}

impl NameAllocator {
    fn new() -> Self {
        let used = [RESPONSE_ID_COLUMN, CREATED_AT_COLUMN]
            .into_iter()
            .map(str::to_string)
            .collect();
        Self {
            used,
            suffix_counters: HashMap::new(),
            placeholders: 0,
        }
    }

    fn assign(&mut self, key: &str) -> (String, NameOrigin) {
        let (candidate, origin) = if is_valid_name(key) {
            (key.to_string(), NameOrigin::Unchanged)
        } else if is_uuid_shaped(key) {
            self.placeholders += 1;
            (format!("Q{:03}", self.placeholders), NameOrigin::Placeholder)
        } else {
            (clean_key(key), NameOrigin::Cleaned)
        };

        if self.used.insert(candidate.clone()) {
            return (candidate, origin);
        }
        (self.suffixed(&candidate), NameOrigin::Suffixed)
    }

    fn suffixed(&mut self, candidate: &str) -> String {
        let base = truncate_bytes(candidate, SUFFIX_BASE_LEN).to_string();
        let mut counter = self.suffix_counters.get(&base).copied().unwrap_or(1);
        loop {
            let suffix = format!("_{counter}");
            let room = MAX_NAME_LEN - suffix.len();
            let name = format!("{}{suffix}", truncate_bytes(&base, room));
            counter += 1;
            if self.used.insert(name.clone()) {
                self.suffix_counters.insert(base, counter);
                return name;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_keys_are_kept() {
        assert!(is_valid_name("Q1"));
        assert!(is_valid_name("OFF_MERK_CUSTOM_PAGE_3"));
        assert!(is_valid_name("Zufriedenheit_Ä"));
        assert!(!is_valid_name("has-hyphen"));
        assert!(!is_valid_name("has space"));
        assert!(!is_valid_name(&"a".repeat(65)));
    }

    #[test]
    fn uuid_shape_is_length_and_hyphens() {
        assert!(is_uuid_shaped("3f2b8c1e-9d4a-4e6b-8f1a-2c3d4e5f6a7b"));
        assert!(!is_uuid_shaped("3f2b8c1e9d4a4e6b8f1a2c3d4e5f6a7b"));
        assert!(!is_uuid_shaped("3f2b8c1e-9d4a-4e6b-8f1a-2c3d4e5f6a7b-"));
    }

    #[test]
    fn fallback_replaces_separators() {
        let names = sanitize_names(["work load-index", "item.1?"]);
        assert_eq!(names.get("work load-index"), Some("work_load_index"));
        assert_eq!(names.get("item.1?"), Some("item_1_"));
    }

    #[test]
    fn fallback_truncates_long_keys() {
        let key = format!("{}-tail", "x".repeat(70));
        let names = sanitize_names([key.as_str()]);
        assert_eq!(names.get(&key), Some("x".repeat(64).as_str()));
    }

    #[test]
    fn reserved_metadata_names_are_not_reused() {
        let names = sanitize_names([RESPONSE_ID_COLUMN, "created-at"]);
        assert_eq!(names.get(RESPONSE_ID_COLUMN), Some("response_id_1"));
        assert_eq!(names.get("created-at"), Some("created_at_1"));
    }

    #[test]
    fn cleaned_name_colliding_with_valid_key_is_suffixed() {
        let names = sanitize_names(["a-b", "a_b", "a b"]);
        assert_eq!(names.get("a-b"), Some("a_b"));
        assert_eq!(names.get("a_b"), Some("a_b_1"));
        assert_eq!(names.get("a b"), Some("a_b_2"));
    }

    #[test]
    fn placeholder_colliding_with_literal_key_is_suffixed() {
        let uuid = "3f2b8c1e-9d4a-4e6b-8f1a-2c3d4e5f6a7b";
        let names = sanitize_names(["Q001", uuid]);
        assert_eq!(names.get("Q001"), Some("Q001"));
        assert_eq!(names.get(uuid), Some("Q001_1"));
    }

    #[test]
    fn lookup_in_both_directions() {
        let names = sanitize_names(["x-1", "y"]);
        assert_eq!(names.key_for("x_1"), Some("x-1"));
        assert_eq!(names.key_for("y"), Some("y"));
        assert_eq!(names.len(), 2);
        let pairs: Vec<_> = names.iter().collect();
        assert_eq!(pairs, vec![("x-1", "x_1"), ("y", "y")]);
    }

    #[test]
    fn multibyte_keys_are_bounded_in_bytes() {
        let key = "Ä".repeat(40);
        let names = sanitize_names([key.as_str(), key.replace('Ä', "Ö").as_str()]);
        let name = names.get(&key).unwrap_or_default();
        assert_eq!(name, "Ä".repeat(32));
        assert!(!is_valid_name(&key));
        assert!(is_valid_name(&"Ä".repeat(32)));
    }

    #[test]
    fn suffix_never_splits_a_character() {
        let names = sanitize_names(["é".repeat(40), "é".repeat(41)]);
        let second = names.get(&"é".repeat(41)).unwrap_or_default();
        assert_eq!(second, format!("{}_1", "é".repeat(30)));
        assert!(second.len() <= MAX_NAME_LEN);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_bytes("aé", 2), "a");
        assert_eq!(truncate_bytes("aé", 3), "aé");
        assert_eq!(truncate_bytes("abc", 10), "abc");
    }

    #[test]
    fn repeated_keys_keep_first_name() {
        let names = sanitize_names(["a-b", "a-b"]);
        assert_eq!(names.len(), 1);
        assert_eq!(names.get("a-b"), Some("a_b"));
    }
}
