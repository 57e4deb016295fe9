//! Terraform attribute type system
//!
//! Types here must match Terraform's own type system, since they are
//! serialized into the schema wire format as cty type encodings.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number,
    Bool,
    List(Box<AttributeType>),
    Set(Box<AttributeType>),
    Map(Box<AttributeType>),
    Object(HashMap<String, AttributeType>),
}

impl AttributeType {
    /// Encode as the JSON type constraint Terraform expects in schema bytes
    pub fn to_wire_bytes(&self) -> Vec<u8> {
        self.to_wire_json().into_bytes()
    }

    fn to_wire_json(&self) -> String {
        match self {
            AttributeType::String => "\"string\"".to_string(),
            AttributeType::Number => "\"number\"".to_string(),
            AttributeType::Bool => "\"bool\"".to_string(),
            AttributeType::List(elem) => format!("[\"list\", {}]", elem.to_wire_json()),
            AttributeType::Set(elem) => format!("[\"set\", {}]", elem.to_wire_json()),
            AttributeType::Map(elem) => format!("[\"map\", {}]", elem.to_wire_json()),
            AttributeType::Object(attrs) => {
                let mut fields: Vec<(&String, &AttributeType)> = attrs.iter().collect();
                fields.sort_by_key(|(name, _)| name.as_str());

                let rendered: Vec<String> = fields
                    .iter()
                    .map(|(name, attr_type)| format!("\"{}\": {}", name, attr_type.to_wire_json()))
                    .collect();

                format!("[\"object\", {{{}}}]", rendered.join(", "))
            }
        }
    }
}
