//! DataSource trait

use crate::request::{
    DataSourceSchemaResponse, ReadRequest, ReadResponse, SchemaRequest, ValidateRequest,
    ValidateResponse,
};
use crate::types::Diagnostics;
use async_trait::async_trait;

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Called to get the data source schema
    async fn schema(&self, request: SchemaRequest) -> DataSourceSchemaResponse;

    /// Called during plan to validate configuration. The default accepts
    /// everything.
    async fn validate(&self, _request: ValidateRequest) -> ValidateResponse {
        ValidateResponse {
            diagnostics: Diagnostics::new(),
        }
    }

    /// Called to read data. The request's `current_state` carries the
    /// configuration values. MUST populate all attributes in the returned
    /// state.
    async fn read(&self, request: ReadRequest) -> ReadResponse;
}
