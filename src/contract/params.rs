//! Request parameter extraction.
//!
//! Query strings and headers may repeat a key. Both are collected into a
//! [`ParameterMap`] that keeps a single-value view (last occurrence wins)
//! and a multi-value view (every occurrence, in order) consistent with
//! each other.

use indexmap::IndexMap;
use percent_encoding::percent_decode_str;
use url::form_urlencoded;

/// Single- and multi-value views of a repeatable key/value collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterMap {
    single: IndexMap<String, String>,
    multi: IndexMap<String, Vec<String>>,
}

impl ParameterMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = Self::new();
        for (key, value) in pairs {
            map.append(key, value);
        }
        map
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        self.multi.entry(key.clone()).or_default().push(value.clone());
        self.single.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.single.get(key).map(String::as_str)
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.multi.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.single.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.single.is_empty()
    }

    pub fn len(&self) -> usize {
        self.single.len()
    }

    pub fn single(&self) -> &IndexMap<String, String> {
        &self.single
    }

    pub fn multi(&self) -> &IndexMap<String, Vec<String>> {
        &self.multi
    }
}

/// Parse a raw (still encoded) query string.
pub fn parse_query(raw: &str) -> ParameterMap {
    ParameterMap::from_pairs(form_urlencoded::parse(raw.as_bytes()))
}

/// Percent-decode a request path, or one segment of it.
pub fn decode_path_value(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}
