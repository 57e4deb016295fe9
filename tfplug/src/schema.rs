//! Schema attribute model and builders
//!
//! Schemas describe the attributes of the provider block, resources, and
//! data sources. Always construct attributes through [`AttributeBuilder`]
//! and schemas through [`SchemaBuilder`].

use crate::attribute_type::AttributeType;
use crate::defaults::DefaultValue;
use crate::plan_modifier::PlanModifier;
use crate::provider::{DataSourceSchema, ProviderSchema, ResourceSchema};
use crate::validator::Validator;
use std::collections::HashMap;

/// A single configuration attribute
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub requires_replace: bool,
    pub validators: Vec<Box<dyn Validator>>,
    pub plan_modifiers: Vec<Box<dyn PlanModifier>>,
    pub default: Option<Box<dyn DefaultValue>>,
}

// Validators, plan modifiers and defaults are trait objects without Debug
impl std::fmt::Debug for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("type", &self.r#type)
            .field("required", &self.required)
            .field("optional", &self.optional)
            .field("computed", &self.computed)
            .field("sensitive", &self.sensitive)
            .field("requires_replace", &self.requires_replace)
            .field("validators", &self.validators.len())
            .field("plan_modifiers", &self.plan_modifiers.len())
            .field("default", &self.default.is_some())
            .finish()
    }
}

/// Fluent builder for [`Attribute`]
pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    fn new(name: &str, r#type: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
                requires_replace: false,
                validators: Vec::new(),
                plan_modifiers: Vec::new(),
                default: None,
            },
        }
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, AttributeType::String)
    }

    pub fn number(name: &str) -> Self {
        Self::new(name, AttributeType::Number)
    }

    pub fn bool(name: &str) -> Self {
        Self::new(name, AttributeType::Bool)
    }

    pub fn list(name: &str, element: AttributeType) -> Self {
        Self::new(name, AttributeType::List(Box::new(element)))
    }

    pub fn set(name: &str, element: AttributeType) -> Self {
        Self::new(name, AttributeType::Set(Box::new(element)))
    }

    pub fn map(name: &str, element: AttributeType) -> Self {
        Self::new(name, AttributeType::Map(Box::new(element)))
    }

    pub fn object(name: &str, attributes: HashMap<String, AttributeType>) -> Self {
        Self::new(name, AttributeType::Object(attributes))
    }

    pub fn description(mut self, description: &str) -> Self {
        self.attribute.description = description.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self.attribute.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self.attribute.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    /// Changing this attribute forces replacement of the resource
    pub fn requires_replace(mut self) -> Self {
        self.attribute.requires_replace = true;
        self
    }

    pub fn validator(mut self, validator: Box<dyn Validator>) -> Self {
        self.attribute.validators.push(validator);
        self
    }

    pub fn plan_modifier(mut self, modifier: Box<dyn PlanModifier>) -> Self {
        self.attribute.plan_modifiers.push(modifier);
        self
    }

    pub fn default(mut self, default: Box<dyn DefaultValue>) -> Self {
        self.attribute.default = Some(default);
        self
    }

    pub fn build(self) -> Attribute {
        self.attribute
    }
}

/// Fluent builder for resource, data source and provider schemas
pub struct SchemaBuilder {
    attributes: HashMap<String, Attribute>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            attributes: HashMap::new(),
        }
    }

    pub fn attribute(mut self, name: &str, builder: AttributeBuilder) -> Self {
        self.attributes.insert(name.to_string(), builder.build());
        self
    }

    pub fn build_resource(self, version: i64) -> ResourceSchema {
        ResourceSchema {
            version,
            attributes: self.attributes,
        }
    }

    pub fn build_data_source(self, version: i64) -> DataSourceSchema {
        DataSourceSchema {
            version,
            attributes: self.attributes,
        }
    }

    pub fn build_provider(self, version: i64) -> ProviderSchema {
        ProviderSchema {
            version,
            attributes: self.attributes,
        }
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::StaticBool;

    #[test]
    fn attribute_builder_creates_required_string() {
        let attr = AttributeBuilder::string("name")
            .description("The name of the resource")
            .required()
            .build();

        assert_eq!(attr.name, "name");
        assert!(matches!(attr.r#type, AttributeType::String));
        assert!(attr.required);
        assert!(!attr.optional);
        assert_eq!(attr.description, "The name of the resource");
    }

    #[test]
    fn attribute_builder_marks_replacement_triggers() {
        let attr = AttributeBuilder::string("remote_network_id")
            .required()
            .requires_replace()
            .build();

        assert!(attr.requires_replace);
    }

    #[test]
    fn schema_builder_collects_attributes() {
        let schema = SchemaBuilder::new()
            .attribute("id", AttributeBuilder::string("id").computed())
            .attribute("name", AttributeBuilder::string("name").required())
            .attribute(
                "is_authoritative",
                AttributeBuilder::bool("is_authoritative")
                    .optional()
                    .computed()
                    .default(Box::new(StaticBool::new(true))),
            )
            .build_resource(0);

        assert_eq!(schema.version, 0);
        assert_eq!(schema.attributes.len(), 3);
        assert!(schema.attributes["id"].computed);
        assert!(schema.attributes["name"].required);
        assert!(schema.attributes["is_authoritative"].default.is_some());
    }
}
