//! State construction helpers
//!
//! Resources and data sources assemble their response state from many
//! values; StateBuilder keeps that readable.

use crate::types::{Config, Dynamic, State};
use std::collections::HashMap;

pub struct StateBuilder {
    values: HashMap<String, Dynamic>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Start from the configuration values, then overlay computed ones
    pub fn from_config(config: &Config) -> Self {
        Self {
            values: config.values.clone(),
        }
    }

    pub fn string(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), Dynamic::String(value.into()));
        self
    }

    pub fn opt_string(mut self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => {
                self.values.insert(key.into(), Dynamic::String(v.into()));
            }
            None => {
                self.values.insert(key.into(), Dynamic::Null);
            }
        }
        self
    }

    pub fn bool(mut self, key: impl Into<String>, value: bool) -> Self {
        self.values.insert(key.into(), Dynamic::Bool(value));
        self
    }

    pub fn number(mut self, key: impl Into<String>, value: f64) -> Self {
        self.values.insert(key.into(), Dynamic::Number(value));
        self
    }

    pub fn list(mut self, key: impl Into<String>, value: Vec<Dynamic>) -> Self {
        self.values.insert(key.into(), Dynamic::List(value));
        self
    }

    pub fn string_list(mut self, key: impl Into<String>, values: Vec<String>) -> Self {
        self.values.insert(
            key.into(),
            Dynamic::List(values.into_iter().map(Dynamic::String).collect()),
        );
        self
    }

    pub fn map(mut self, key: impl Into<String>, value: HashMap<String, Dynamic>) -> Self {
        self.values.insert(key.into(), Dynamic::Map(value));
        self
    }

    pub fn value(mut self, key: impl Into<String>, value: Dynamic) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    pub fn build(self) -> State {
        State {
            values: self.values,
        }
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_builder_from_config_overlays_computed_values() {
        let mut config = Config::new();
        config
            .values
            .insert("name".to_string(), Dynamic::String("office".to_string()));

        let state = StateBuilder::from_config(&config)
            .string("id", "UmVtb3RlTmV0d29yazox")
            .build();

        assert_eq!(state.values.len(), 2);
        assert_eq!(state.get_string("name").unwrap(), "office");
        assert_eq!(state.get_string("id").unwrap(), "UmVtb3RlTmV0d29yazox");
    }

    #[test]
    fn state_builder_handles_optional_and_list_values() {
        let state = StateBuilder::new()
            .string("id", "R3NvdXJjZTox")
            .opt_string("alias", None::<String>)
            .opt_string("location", Some("AWS"))
            .string_list("user_ids", vec!["u1".to_string(), "u2".to_string()])
            .bool("is_active", true)
            .build();

        assert!(state.values.get("alias").unwrap().is_null());
        assert_eq!(state.get_string("location").unwrap(), "AWS");
        assert_eq!(
            state.get_string_list("user_ids").unwrap(),
            vec!["u1".to_string(), "u2".to_string()]
        );
        assert_eq!(state.get_bool("is_active"), Some(true));
    }
}
