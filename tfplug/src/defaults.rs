//! Default value providers for attributes
//!
//! Defaults are evaluated during planning when an optional+computed
//! attribute is absent from configuration.

use crate::types::Dynamic;

#[derive(Debug, Clone)]
pub struct DefaultRequest {
    pub attribute_path: String,
}

#[derive(Debug, Clone)]
pub struct DefaultResponse {
    pub value: Dynamic,
}

pub trait DefaultValue: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;

    /// Provide the default value
    fn default_value(&self, request: DefaultRequest) -> DefaultResponse;
}

/// Static string default
pub struct StaticString {
    value: String,
}

impl StaticString {
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
        }
    }
}

impl DefaultValue for StaticString {
    fn description(&self) -> String {
        format!("defaults to \"{}\"", self.value)
    }

    fn default_value(&self, _request: DefaultRequest) -> DefaultResponse {
        DefaultResponse {
            value: Dynamic::String(self.value.clone()),
        }
    }
}

/// Static boolean default
pub struct StaticBool {
    value: bool,
}

impl StaticBool {
    pub fn new(value: bool) -> Self {
        Self { value }
    }
}

impl DefaultValue for StaticBool {
    fn description(&self) -> String {
        format!("defaults to {}", self.value)
    }

    fn default_value(&self, _request: DefaultRequest) -> DefaultResponse {
        DefaultResponse {
            value: Dynamic::Bool(self.value),
        }
    }
}

/// Static number default
pub struct StaticNumber {
    value: f64,
}

impl StaticNumber {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl DefaultValue for StaticNumber {
    fn description(&self) -> String {
        format!("defaults to {}", self.value)
    }

    fn default_value(&self, _request: DefaultRequest) -> DefaultResponse {
        DefaultResponse {
            value: Dynamic::Number(self.value),
        }
    }
}

/// Default read from an environment variable, with optional fallback
pub struct EnvDefault {
    env_var: String,
    fallback: Option<String>,
}

impl EnvDefault {
    pub fn new(env_var: &str, fallback: &str) -> Self {
        Self {
            env_var: env_var.to_string(),
            fallback: Some(fallback.to_string()),
        }
    }

    pub fn without_fallback(env_var: &str) -> Self {
        Self {
            env_var: env_var.to_string(),
            fallback: None,
        }
    }
}

impl DefaultValue for EnvDefault {
    fn description(&self) -> String {
        match &self.fallback {
            Some(fallback) => format!(
                "defaults to the {} environment variable (fallback: \"{}\")",
                self.env_var, fallback
            ),
            None => format!("defaults to the {} environment variable", self.env_var),
        }
    }

    fn default_value(&self, _request: DefaultRequest) -> DefaultResponse {
        let value = std::env::var(&self.env_var)
            .ok()
            .or_else(|| self.fallback.clone());

        DefaultResponse {
            value: match value {
                Some(v) => Dynamic::String(v),
                None => Dynamic::Null,
            },
        }
    }
}
