//! Provider trait and schema containers
//!
//! Providers are factories: the gRPC layer asks for a fresh resource or
//! data source instance per operation, so implementations hold no shared
//! mutable state beyond the configured API client.

use crate::data_source::DataSource;
use crate::request::{ConfigureRequest, ConfigureResponse};
use crate::resource::Resource;
use crate::schema::Attribute;
use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;

#[async_trait]
pub trait Provider: Send + Sync {
    /// Schema of the provider configuration block
    fn provider_schema(&self) -> ProviderSchema;

    /// Called once before any resource or data source operation.
    /// Build API clients here from config values and environment.
    async fn configure(&mut self, request: ConfigureRequest) -> ConfigureResponse;

    /// Create a resource instance for the given type name
    async fn create_resource(&self, name: &str) -> Result<Box<dyn Resource>>;

    /// Create a data source instance for the given type name
    async fn create_data_source(&self, name: &str) -> Result<Box<dyn DataSource>>;

    /// Schemas for every resource type, keyed by type name
    fn resource_schemas(&self) -> HashMap<String, ResourceSchema>;

    /// Schemas for every data source type, keyed by type name
    fn data_source_schemas(&self) -> HashMap<String, DataSourceSchema>;
}

#[derive(Debug)]
pub struct ProviderSchema {
    pub version: i64,
    pub attributes: HashMap<String, Attribute>,
}

#[derive(Debug)]
pub struct ResourceSchema {
    pub version: i64,
    pub attributes: HashMap<String, Attribute>,
}

#[derive(Debug)]
pub struct DataSourceSchema {
    pub version: i64,
    pub attributes: HashMap<String, Attribute>,
}
