//! Case-insensitive header maps.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// A header value: one string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    /// A single value.
    Single(String),
    /// Repeated values for the same header.
    Multiple(Vec<String>),
}

impl HeaderValue {
    /// Returns `true` for an empty string or an empty list.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Single(value) => value.is_empty(),
            Self::Multiple(values) => values.iter().all(String::is_empty),
        }
    }

    /// Iterates over every value.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let values: &[String] = match self {
            Self::Single(value) => std::slice::from_ref(value),
            Self::Multiple(values) => values,
        };
        values.iter().map(String::as_str)
    }

    /// Coerces a definition value into a header value.
    ///
    /// Strings are kept, numbers and booleans are stringified, arrays become
    /// lists of strings with blanks dropped. `null` yields `None`. Mappings
    /// cannot be sent as headers.
    pub fn from_value(value: &Value) -> Result<Option<Self>, String> {
        match value {
            Value::Null => Ok(None),
            Value::Array(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    match Self::from_value(item)? {
                        Some(Self::Single(value)) if !value.is_empty() => values.push(value),
                        Some(Self::Multiple(_)) => {
                            return Err("nested lists are not valid header values".to_string())
                        }
                        _ => {}
                    }
                }
                Ok(Some(Self::Multiple(values)))
            }
            Value::Object(_) => Err(format!("{value} is not a valid header value")),
            Value::String(s) => Ok(Some(Self::Single(s.clone()))),
            other => Ok(Some(Self::Single(other.to_string()))),
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for HeaderValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multiple(values)
    }
}

/// Ordered header map with case-insensitive keys.
///
/// Lookups ignore case. Inserting a key that already exists under another
/// spelling replaces both its value and its spelling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, HeaderValue)>);

impl Headers {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.0
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))
    }

    /// Returns the value stored for `name`, ignoring case.
    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.position(name).map(|index| &self.0[index].1)
    }

    /// Returns the first value stored for `name`, ignoring case.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|value| value.iter().next())
    }

    /// Returns `true` if `name` is present, ignoring case.
    pub fn contains_key(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Inserts or replaces a header.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<HeaderValue>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(index) => self.0[index] = (name, value),
            None => self.0.push((name, value)),
        }
    }

    /// Adds a value to a header, turning it into a list when repeated.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(index) => {
                let entry = &mut self.0[index].1;
                *entry = match std::mem::replace(entry, HeaderValue::Multiple(Vec::new())) {
                    HeaderValue::Single(first) => HeaderValue::Multiple(vec![first, value]),
                    HeaderValue::Multiple(mut values) => {
                        values.push(value);
                        HeaderValue::Multiple(values)
                    }
                };
            }
            None => self.0.push((name, HeaderValue::Single(value))),
        }
    }

    /// Removes a header, ignoring case.
    pub fn remove(&mut self, name: &str) -> Option<HeaderValue> {
        self.position(name).map(|index| self.0.remove(index).1)
    }

    /// Drops every header whose value is blank.
    pub fn prune(&mut self) {
        self.0.retain(|(_, value)| !value.is_blank());
    }

    /// Inserts every header of `other`, later keys winning.
    pub fn merge(&mut self, other: Headers) {
        for (name, value) in other.0 {
            self.insert(name, value);
        }
    }

    /// Iterates over headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Returns the number of headers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no headers.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<HeaderValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

impl Serialize for Headers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_case_insensitive_lookup() {
        let headers: Headers = [("Content-Type", "text/plain")].into_iter().collect();
        assert_eq!(headers.first("content-type"), Some("text/plain"));
        assert!(headers.contains_key("CONTENT-TYPE"));
    }

    #[test]
    fn test_insert_keeps_last_spelling() {
        let mut headers = Headers::new();
        headers.insert("x-token", "a");
        headers.insert("X-Token", "b");
        assert_eq!(headers.len(), 1);
        let (name, value) = headers.iter().next().unwrap();
        assert_eq!(name, "X-Token");
        assert_eq!(value, &HeaderValue::from("b"));
    }

    #[test]
    fn test_append_builds_list() {
        let mut headers = Headers::new();
        headers.append("Set-Cookie", "a=1");
        headers.append("set-cookie", "b=2");
        assert_eq!(
            headers.get("SET-COOKIE"),
            Some(&HeaderValue::Multiple(vec!["a=1".to_string(), "b=2".to_string()]))
        );
    }

    #[test]
    fn test_prune_blank_values() {
        let mut headers = Headers::new();
        headers.insert("A", "");
        headers.insert("B", HeaderValue::Multiple(vec![]));
        headers.insert("C", "1");
        headers.prune();
        assert_eq!(headers.len(), 1);
        assert!(headers.contains_key("c"));
    }

    #[test]
    fn test_from_value() {
        assert_eq!(
            HeaderValue::from_value(&json!(42)).unwrap(),
            Some(HeaderValue::from("42"))
        );
        assert_eq!(HeaderValue::from_value(&json!(null)).unwrap(), None);
        assert_eq!(
            HeaderValue::from_value(&json!(["a", "", 1])).unwrap(),
            Some(HeaderValue::Multiple(vec!["a".to_string(), "1".to_string()]))
        );
        assert!(HeaderValue::from_value(&json!({"a": 1})).is_err());
    }

    #[test]
    fn test_serialize_as_map() {
        let headers: Headers = [("Accept", "application/json")].into_iter().collect();
        assert_eq!(
            serde_json::to_value(&headers).unwrap(),
            json!({"Accept": "application/json"})
        );
    }
}
