//! Core type system for tfplug
//!
//! This module provides the value types shared between the wire codec and
//! provider implementations: Dynamic values, Config/State containers, and
//! Diagnostics.

use std::collections::HashMap;

/// Dynamic represents Terraform values that can be of any type
/// This is the core type for all configuration and state data
#[derive(Debug, Clone, PartialEq)]
pub enum Dynamic {
    /// Explicit null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Number value (all numbers are f64 to match Terraform)
    Number(f64),
    /// String value
    String(String),
    /// List of values (ordered, allows duplicates)
    List(Vec<Dynamic>),
    /// Map of string keys to values (objects are represented as Maps)
    Map(HashMap<String, Dynamic>),
    /// Value not yet known (during planning)
    Unknown,
}

impl Dynamic {
    pub fn as_string(&self) -> Option<&String> {
        match self {
            Dynamic::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Dynamic::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Dynamic::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Vec<Dynamic>> {
        match self {
            Dynamic::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&HashMap<String, Dynamic>> {
        match self {
            Dynamic::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Dynamic::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Dynamic::Unknown)
    }

    /// Name of the value's type, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Dynamic::Null => "null",
            Dynamic::Bool(_) => "bool",
            Dynamic::Number(_) => "number",
            Dynamic::String(_) => "string",
            Dynamic::List(_) => "list",
            Dynamic::Map(_) => "map",
            Dynamic::Unknown => "unknown",
        }
    }
}

impl serde::Serialize for Dynamic {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Dynamic::Null => serializer.serialize_unit(),
            Dynamic::Bool(b) => serializer.serialize_bool(*b),
            Dynamic::Number(n) => serializer.serialize_f64(*n),
            Dynamic::String(s) => serializer.serialize_str(s),
            Dynamic::List(l) => l.serialize(serializer),
            Dynamic::Map(m) => m.serialize(serializer),
            Dynamic::Unknown => serializer.serialize_str("__unknown__"),
        }
    }
}

impl<'de> serde::Deserialize<'de> for Dynamic {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, Visitor};
        use std::fmt;

        struct DynamicVisitor;

        impl<'de> Visitor<'de> for DynamicVisitor {
            type Value = Dynamic;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a valid Dynamic value")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Dynamic, E> {
                Ok(Dynamic::Null)
            }

            fn visit_none<E: de::Error>(self) -> Result<Dynamic, E> {
                Ok(Dynamic::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Dynamic, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                deserializer.deserialize_any(DynamicVisitor)
            }

            fn visit_bool<E: de::Error>(self, value: bool) -> Result<Dynamic, E> {
                Ok(Dynamic::Bool(value))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Dynamic, E> {
                Ok(Dynamic::Number(value as f64))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Dynamic, E> {
                Ok(Dynamic::Number(value as f64))
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> Result<Dynamic, E> {
                Ok(Dynamic::Number(value))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Dynamic, E> {
                if value == "__unknown__" {
                    Ok(Dynamic::Unknown)
                } else {
                    Ok(Dynamic::String(value.to_string()))
                }
            }

            fn visit_string<E: de::Error>(self, value: String) -> Result<Dynamic, E> {
                if value == "__unknown__" {
                    Ok(Dynamic::Unknown)
                } else {
                    Ok(Dynamic::String(value))
                }
            }

            fn visit_seq<V>(self, mut seq: V) -> Result<Dynamic, V::Error>
            where
                V: de::SeqAccess<'de>,
            {
                let mut vec = Vec::new();
                while let Some(elem) = seq.next_element()? {
                    vec.push(elem);
                }
                Ok(Dynamic::List(vec))
            }

            fn visit_map<V>(self, mut map: V) -> Result<Dynamic, V::Error>
            where
                V: de::MapAccess<'de>,
            {
                let mut hashmap = HashMap::new();
                while let Some((key, value)) = map.next_entry()? {
                    hashmap.insert(key, value);
                }
                Ok(Dynamic::Map(hashmap))
            }
        }

        deserializer.deserialize_any(DynamicVisitor)
    }
}

/// DynamicValues is a flat container of named Dynamic values.
/// Config and State are both this shape; the aliases exist so signatures
/// read as what they carry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynamicValues {
    pub values: HashMap<String, Dynamic>,
}

impl DynamicValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Dynamic> {
        self.values.get(key)
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.values.get(key)?.as_string().cloned()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key)?.as_bool()
    }

    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.values.get(key)?.as_number()
    }

    pub fn get_list(&self, key: &str) -> Option<&Vec<Dynamic>> {
        self.values.get(key)?.as_list()
    }

    pub fn get_map(&self, key: &str) -> Option<&HashMap<String, Dynamic>> {
        self.values.get(key)?.as_map()
    }

    /// Collect a list attribute of strings, skipping non-string elements
    pub fn get_string_list(&self, key: &str) -> Option<Vec<String>> {
        let list = self.get_list(key)?;
        Some(list.iter().filter_map(|v| v.as_string().cloned()).collect())
    }
}

/// Config represents configuration values
pub type Config = DynamicValues;

/// State represents resource state values
pub type State = DynamicValues;

/// Diagnostic represents a single warning or error from the provider
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub summary: String,
    pub detail: Option<String>,
}

/// Diagnostics collects errors and warnings to surface to Terraform
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, summary: impl Into<String>, detail: Option<impl Into<String>>) {
        self.errors.push(Diagnostic {
            summary: summary.into(),
            detail: detail.map(Into::into),
        });
    }

    pub fn add_warning(&mut self, summary: impl Into<String>, detail: Option<impl Into<String>>) {
        self.warnings.push(Diagnostic {
            summary: summary.into(),
            detail: detail.map(Into::into),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynamic_accessors_return_typed_values() {
        assert_eq!(
            Dynamic::String("test".to_string()).as_string(),
            Some(&"test".to_string())
        );
        assert_eq!(Dynamic::Bool(true).as_bool(), Some(true));
        assert_eq!(Dynamic::Number(42.0).as_number(), Some(42.0));
        assert!(Dynamic::Null.as_string().is_none());
        assert!(Dynamic::Null.is_null());
        assert!(Dynamic::Unknown.is_unknown());
    }

    #[test]
    fn config_get_helpers_navigate_values() {
        let mut config = Config::new();
        config
            .values
            .insert("name".to_string(), Dynamic::String("net".to_string()));
        config
            .values
            .insert("enabled".to_string(), Dynamic::Bool(true));
        config.values.insert(
            "ids".to_string(),
            Dynamic::List(vec![
                Dynamic::String("a".to_string()),
                Dynamic::String("b".to_string()),
            ]),
        );

        assert_eq!(config.get_string("name").unwrap(), "net");
        assert_eq!(config.get_bool("enabled"), Some(true));
        assert_eq!(
            config.get_string_list("ids").unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );
        assert!(config.get_string("missing").is_none());
    }

    #[test]
    fn dynamic_round_trips_through_msgpack() {
        let mut values = HashMap::new();
        values.insert("name".to_string(), Dynamic::String("net".to_string()));
        values.insert("count".to_string(), Dynamic::Number(3.0));
        values.insert("active".to_string(), Dynamic::Bool(false));

        let encoded = rmp_serde::encode::to_vec_named(&values).unwrap();
        let decoded: HashMap<String, Dynamic> = rmp_serde::decode::from_slice(&encoded).unwrap();

        assert_eq!(decoded, values);
    }

    #[test]
    fn diagnostics_collects_errors_and_warnings() {
        let mut diags = Diagnostics::new();
        assert!(!diags.has_errors());

        diags.add_error("something failed", Some("detail"));
        diags.add_warning("heads up", None::<String>);

        assert!(diags.has_errors());
        assert_eq!(diags.errors.len(), 1);
        assert_eq!(diags.warnings.len(), 1);
        assert_eq!(diags.errors[0].summary, "something failed");
        assert_eq!(diags.errors[0].detail.as_deref(), Some("detail"));
    }
}
