//! tfplug - Terraform Plugin Framework for Rust
//!
//! A framework for building Terraform providers in Rust, implementing the
//! Terraform Plugin Protocol v6. Providers implement the factory-based
//! [`Provider`] trait; [`grpc::ProviderServer`] serves it to Terraform.

// Core modules
pub mod attribute_type;
pub mod context;
pub mod error;
pub mod schema;
pub mod types;

// Provider API modules
pub mod data_source;
pub mod provider;
pub mod request;
pub mod resource;

// Helper modules
pub mod builders;
pub mod defaults;
pub mod plan_modifier;
pub mod validator;

// Framework implementation modules
pub mod grpc;
pub mod proto;

// Re-exports for convenience
pub use attribute_type::AttributeType;
pub use builders::StateBuilder;
pub use context::Context;
pub use data_source::DataSource;
pub use error::{Result, TfplugError};
pub use grpc::ProviderServer;
pub use provider::{DataSourceSchema, Provider, ProviderSchema, ResourceSchema};
pub use resource::Resource;
pub use schema::{Attribute, AttributeBuilder, SchemaBuilder};
pub use types::{Config, Diagnostic, Diagnostics, Dynamic, DynamicValues, State};
