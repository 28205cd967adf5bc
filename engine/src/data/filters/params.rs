//! Raw query parameters
//!
//! The untyped `key → value` input handed to `SelectQuery::set_parameters`,
//! kept in caller order.

use serde_json::Value;

/// One raw value: a single string or a list of alternatives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    One(String),
    Many(Vec<String>),
}

impl RawValue {
    /// Blank strings and lists of blank strings carry no filter
    pub fn is_empty(&self) -> bool {
        match self {
            Self::One(value) => value.trim().is_empty(),
            Self::Many(values) => values.iter().all(|v| v.trim().is_empty()),
        }
    }

    /// Each value the caller sent, in order
    pub fn alternatives(&self) -> Vec<&str> {
        match self {
            Self::One(value) => vec![value.as_str()],
            Self::Many(values) => values.iter().map(String::as_str).collect(),
        }
    }

    /// Length of the longest value in bytes
    pub fn max_len(&self) -> usize {
        self.alternatives().iter().map(|v| v.len()).max().unwrap_or(0)
    }

    /// Convert a JSON value; `null` and nested objects yield `None`
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null | Value::Object(_) => None,
            Value::Array(items) => Some(Self::Many(
                items.iter().filter_map(json_scalar).collect(),
            )),
            scalar => json_scalar(scalar).map(Self::One),
        }
    }
}

fn json_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::One(value)
    }
}

impl From<Vec<String>> for RawValue {
    fn from(values: Vec<String>) -> Self {
        Self::Many(values)
    }
}

impl From<Vec<&str>> for RawValue {
    fn from(values: Vec<&str>) -> Self {
        Self::Many(values.into_iter().map(str::to_string).collect())
    }
}

/// Ordered raw parameter map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawParameters {
    entries: Vec<(String, RawValue)>,
}

impl RawParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `key`, keeping its original position on replace
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RawValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copy without blank keys or values
    pub fn without_empty(&self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|(k, v)| !k.trim().is_empty() && !v.is_empty())
                .cloned()
                .collect(),
        }
    }

    /// Parse a `key=value` pair.
    ///
    /// The key ends at the first `=` or operator character, so
    /// `date>=2020-01-01` and `date><2020-01-01,2020-12-31` keep the operator
    /// on the value and `title!=draft` becomes `!draft`. A `%` directly before
    /// `=` stays on the key (`title%=hello`).
    pub fn parse_pair(pair: &str) -> Option<(String, String)> {
        let (key, rest) = pair.split_at(pair.find(['=', '<', '>', '!', '~', '['])?);
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        let value = match rest.strip_prefix("!=") {
            Some(negated) => format!("!{}", negated),
            None => rest.strip_prefix('=').unwrap_or(rest).to_string(),
        };
        Some((key.to_string(), value))
    }

    /// Parse `key=value` pairs; repeated keys collect into a list
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut params = Self::new();
        for pair in pairs {
            let Some((key, value)) = Self::parse_pair(pair.as_ref()) else {
                tracing::debug!(pair = pair.as_ref(), "Skipping malformed parameter pair");
                continue;
            };
            let merged = match params.get(&key) {
                Some(RawValue::One(existing)) => RawValue::Many(vec![existing.clone(), value]),
                Some(RawValue::Many(existing)) => {
                    let mut values = existing.clone();
                    values.push(value);
                    RawValue::Many(values)
                }
                None => RawValue::One(value),
            };
            params.insert(key, merged);
        }
        params
    }

    /// Build from a JSON object, keeping its key order
    pub fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let mut params = Self::new();
        for (key, value) in object {
            if let Some(raw) = RawValue::from_json(value) {
                params.insert(key.clone(), raw);
            }
        }
        Some(params)
    }
}

impl<K, V> FromIterator<(K, V)> for RawParameters
where
    K: Into<String>,
    V: Into<RawValue>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}
