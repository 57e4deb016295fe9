//! Attribute validators
//!
//! Validators run during ValidateResourceConfig/ValidateDataSourceConfig on
//! the raw config value of the attribute they are attached to. Null and
//! unknown values are skipped by the caller.

use crate::types::{Diagnostics, Dynamic};

pub trait Validator: Send + Sync {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics);
}

/// Restricts a string attribute to a fixed set of allowed values
pub struct OneOfValidator {
    allowed: Vec<String>,
}

impl OneOfValidator {
    pub fn new(allowed: &[&str]) -> Self {
        Self {
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Validator for OneOfValidator {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        if let Some(s) = value.as_string() {
            if !self.allowed.iter().any(|allowed| allowed == s) {
                diagnostics.add_error(
                    format!("{} must be one of [{}]", attribute_path, self.allowed.join(", ")),
                    Some(format!("Got '{}'", s)),
                );
            }
        }
    }
}

pub struct StringLengthValidator {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl Validator for StringLengthValidator {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        if let Some(s) = value.as_string() {
            if let Some(min) = self.min {
                if s.len() < min {
                    diagnostics.add_error(
                        format!("{} must have minimum length of {}", attribute_path, min),
                        Some(format!("Got length {}", s.len())),
                    );
                }
            }
            if let Some(max) = self.max {
                if s.len() > max {
                    diagnostics.add_error(
                        format!("{} must have maximum length of {}", attribute_path, max),
                        Some(format!("Got length {}", s.len())),
                    );
                }
            }
        }
    }
}

pub struct NumberRangeValidator {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Validator for NumberRangeValidator {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        if let Some(n) = value.as_number() {
            if let Some(min) = self.min {
                if n < min {
                    diagnostics.add_error(
                        format!("{} must be at least {}", attribute_path, min),
                        Some(format!("Got {}", n)),
                    );
                }
            }
            if let Some(max) = self.max {
                if n > max {
                    diagnostics.add_error(
                        format!("{} must be at most {}", attribute_path, max),
                        Some(format!("Got {}", n)),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_of_validator_accepts_allowed_value() {
        let validator = OneOfValidator::new(&["RESTRICTED", "ALLOW_ALL", "DENY_ALL"]);

        let mut diags = Diagnostics::new();
        validator.validate(
            &Dynamic::String("ALLOW_ALL".to_string()),
            "protocols.tcp.policy",
            &mut diags,
        );

        assert!(!diags.has_errors());
    }

    #[test]
    fn one_of_validator_rejects_unlisted_value() {
        let validator = OneOfValidator::new(&["ADMIN", "DEVOPS", "SUPPORT", "MEMBER"]);

        let mut diags = Diagnostics::new();
        validator.validate(&Dynamic::String("ROOT".to_string()), "role", &mut diags);

        assert_eq!(diags.errors.len(), 1);
        assert!(diags.errors[0].summary.contains("must be one of"));
        assert_eq!(diags.errors[0].detail.as_deref(), Some("Got 'ROOT'"));
    }

    #[test]
    fn one_of_validator_ignores_non_strings() {
        let validator = OneOfValidator::new(&["A", "B"]);

        let mut diags = Diagnostics::new();
        validator.validate(&Dynamic::Null, "attr", &mut diags);
        validator.validate(&Dynamic::Number(1.0), "attr", &mut diags);

        assert!(!diags.has_errors());
    }

    #[test]
    fn string_length_validator_rejects_too_short() {
        let validator = StringLengthValidator {
            min: Some(1),
            max: None,
        };

        let mut diags = Diagnostics::new();
        validator.validate(&Dynamic::String(String::new()), "name", &mut diags);

        assert_eq!(diags.errors.len(), 1);
        assert!(diags.errors[0].summary.contains("minimum length"));
    }

    #[test]
    fn number_range_validator_enforces_bounds() {
        let validator = NumberRangeValidator {
            min: Some(0.0),
            max: Some(365.0),
        };

        let mut diags = Diagnostics::new();
        validator.validate(&Dynamic::Number(30.0), "expiration_time", &mut diags);
        assert!(!diags.has_errors());

        validator.validate(&Dynamic::Number(400.0), "expiration_time", &mut diags);
        assert_eq!(diags.errors.len(), 1);
        assert!(diags.errors[0].summary.contains("at most"));
    }
}
