//! The caller-supplied configuration object.
//!
//! Values are credentials. A `ConfigObject` is built once per launch
//! attempt and never mutated; its `Debug` output lists keys only.

use crate::schema::CredentialField;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors turning external data into a [`ConfigObject`].
#[derive(Error, Debug)]
pub enum ObjectError {
    #[error("Invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Configuration must be a JSON object, got {found}")]
    NotAnObject { found: &'static str },

    #[error("Value for {key} must be a string, got {found}")]
    NonStringValue { key: String, found: &'static str },
}

/// Mapping from field name to string value.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConfigObject {
    values: BTreeMap<String, String>,
}

impl ConfigObject {
    /// An empty object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from key/value pairs. Later duplicates win.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Parse a JSON document holding an object of string values.
    pub fn from_json_str(json: &str) -> Result<Self, ObjectError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_json_value(value)
    }

    /// Convert a parsed JSON value.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, ObjectError> {
        let map = match value {
            serde_json::Value::Object(map) => map,
            other => {
                return Err(ObjectError::NotAnObject {
                    found: json_kind(&other),
                })
            }
        };

        let mut values = BTreeMap::new();
        for (key, value) in map {
            match value {
                serde_json::Value::String(s) => {
                    values.insert(key, s);
                }
                other => {
                    return Err(ObjectError::NonStringValue {
                        found: json_kind(&other),
                        key,
                    });
                }
            }
        }

        Ok(Self { values })
    }

    /// Collect credentials exported as `LINKEDIN_*` variables, keyed by
    /// their configuration names. Unset variables are left out.
    pub fn from_env_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            values: CredentialField::ALL
                .iter()
                .filter_map(|cred| {
                    lookup(cred.env_var()).map(|value| (cred.key().to_string(), value))
                })
                .collect(),
        }
    }

    /// Collect credentials from the current process environment.
    pub fn from_process_env() -> Self {
        Self::from_env_lookup(|name| std::env::var(name).ok())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Key/value pairs in sorted key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConfigObject {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

impl std::fmt::Debug for ConfigObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.values.keys().map(|k| (k, Redacted)))
            .finish()
    }
}

impl<'de> Deserialize<'de> for ConfigObject {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::from_json_value(value).map_err(serde::de::Error::custom)
    }
}

struct Redacted;

impl std::fmt::Debug for Redacted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_str() {
        let obj = ConfigObject::from_json_str(
            r#"{"linkedinClientId": "cid", "foo": "bar"}"#,
        )
        .unwrap();
        assert_eq!(obj.get("linkedinClientId"), Some("cid"));
        assert_eq!(obj.get("foo"), Some("bar"));
        assert_eq!(obj.len(), 2);
    }

    #[test]
    fn test_rejects_non_object() {
        let err = ConfigObject::from_json_str("[1, 2]").unwrap_err();
        assert!(matches!(err, ObjectError::NotAnObject { found: "array" }));
    }

    #[test]
    fn test_rejects_non_string_value() {
        let err = ConfigObject::from_json_str(r#"{"linkedinClientId": 42}"#).unwrap_err();
        match err {
            ObjectError::NonStringValue { key, found } => {
                assert_eq!(key, "linkedinClientId");
                assert_eq!(found, "number");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = ConfigObject::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ObjectError::Parse(_)));
    }

    #[test]
    fn test_debug_hides_values() {
        let obj = ConfigObject::from_pairs([("linkedinClientSecret", "hunter2-secret")]);
        let debug = format!("{:?}", obj);
        assert!(debug.contains("linkedinClientSecret"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("hunter2-secret"));
    }

    #[test]
    fn test_from_env_lookup_maps_back_to_keys() {
        let obj = ConfigObject::from_env_lookup(|name| match name {
            "LINKEDIN_CLIENT_ID" => Some("cid".to_string()),
            "LINKEDIN_REFRESH_TOKEN" => Some("rt".to_string()),
            _ => None,
        });
        assert_eq!(obj.get("linkedinClientId"), Some("cid"));
        assert_eq!(obj.get("linkedinRefreshToken"), Some("rt"));
        assert!(!obj.contains_key("linkedinAccessToken"));
        assert_eq!(obj.len(), 2);
    }

    #[test]
    fn test_later_duplicate_wins() {
        let obj: ConfigObject = [("a", "1"), ("a", "2")].into_iter().collect();
        assert_eq!(obj.get("a"), Some("2"));
    }

    #[test]
    fn test_deserialize_through_serde() {
        #[derive(Deserialize)]
        struct Envelope {
            config: ConfigObject,
        }
        let env: Envelope = serde_json::from_str(r#"{"config": {"a": "b"}}"#).unwrap();
        assert_eq!(env.config.get("a"), Some("b"));

        let err = serde_json::from_str::<Envelope>(r#"{"config": {"a": true}}"#);
        assert!(err.is_err());
    }
}
