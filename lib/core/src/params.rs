//! Raw query parameters of a single API call

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A parameter value: a single string, or a list when the key was repeated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Single(String),
    List(Vec<String>),
}

impl ParamValue {
    /// The value as one string, list items joined with commas
    pub fn joined(&self) -> String {
        match self {
            ParamValue::Single(s) => s.clone(),
            ParamValue::List(items) => items.join(","),
        }
    }

    pub fn values(&self) -> Vec<&str> {
        match self {
            ParamValue::Single(s) => vec![s.as_str()],
            ParamValue::List(items) => items.iter().map(String::as_str).collect(),
        }
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Single(s)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Single(s.to_string())
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(items: Vec<String>) -> Self {
        ParamValue::List(items)
    }
}

/// Parameter mapping keyed by parameter name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams(BTreeMap<String, ParamValue>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from decoded `key=value` pairs; repeated keys collect into a list
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = Self::new();
        for (key, value) in pairs {
            params.append(key.into(), value.into());
        }
        params
    }

    fn append(&mut self, key: String, value: String) {
        match self.0.remove(&key) {
            None => {
                self.0.insert(key, ParamValue::Single(value));
            }
            Some(ParamValue::Single(first)) => {
                self.0.insert(key, ParamValue::List(vec![first, value]));
            }
            Some(ParamValue::List(mut items)) => {
                items.push(value);
                self.0.insert(key, ParamValue::List(items));
            }
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    /// Value of `key` as a single string
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.0.get(key).map(ParamValue::joined)
    }

    /// Value of `key` when present and not blank
    pub fn get_present(&self, key: &str) -> Option<String> {
        self.get_str(key).filter(|v| !v.trim().is_empty())
    }

    /// Comma separated list value, blanks dropped
    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.get_str(key)
            .map(|v| split_list(&v))
            .unwrap_or_default()
    }

    /// Whether `key` holds a truthy flag (`true`, `1`, `yes`)
    pub fn is_truthy(&self, key: &str) -> bool {
        matches!(
            self.get_str(key).map(|v| v.trim().to_ascii_lowercase()).as_deref(),
            Some("true") | Some("1") | Some("yes")
        )
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

/// Split a comma separated list, trimming whitespace and dropping blanks
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_keys_collect_into_list() {
        let params = QueryParams::from_pairs([("q", "cats"), ("facets", "a"), ("facets", "b")]);

        assert_eq!(params.get("q"), Some(&ParamValue::Single("cats".to_string())));
        assert_eq!(
            params.get("facets"),
            Some(&ParamValue::List(vec!["a".to_string(), "b".to_string()]))
        );
        assert_eq!(params.get_list("facets"), vec!["a", "b"]);
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("a, b,c ,, "), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_truthy_and_present() {
        let params: QueryParams = [("filter_facets", "TRUE"), ("fields", "  "), ("x", "0")]
            .into_iter()
            .collect();

        assert!(params.is_truthy("filter_facets"));
        assert!(!params.is_truthy("x"));
        assert!(!params.is_truthy("missing"));
        assert_eq!(params.get_present("fields"), None);
        assert_eq!(params.get_present("x"), Some("0".to_string()));
    }

    #[test]
    fn test_deserialize_from_json() {
        let params: QueryParams =
            serde_json::from_str(r#"{"q": "maps", "id": ["a", "b"]}"#).unwrap();

        assert_eq!(params.get_str("id"), Some("a,b".to_string()));
        assert_eq!(params.keys().collect::<Vec<_>>(), vec!["id", "q"]);
    }
}
