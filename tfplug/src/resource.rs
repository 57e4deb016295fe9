//! Resource trait
//!
//! Resources implement the CRUD operations. A resource instance is created
//! per operation by the provider factory, holding whatever client it needs.

use crate::request::{
    CreateRequest, CreateResponse, DeleteRequest, DeleteResponse, ReadRequest, ReadResponse,
    ResourceSchemaResponse, SchemaRequest, UpdateRequest, UpdateResponse, ValidateRequest,
    ValidateResponse,
};
use crate::types::Diagnostics;
use async_trait::async_trait;

#[async_trait]
pub trait Resource: Send + Sync {
    /// Called to get the resource schema
    async fn schema(&self, request: SchemaRequest) -> ResourceSchemaResponse;

    /// Called during plan to validate configuration beyond what the schema
    /// expresses. The default accepts everything.
    async fn validate(&self, _request: ValidateRequest) -> ValidateResponse {
        ValidateResponse {
            diagnostics: Diagnostics::new(),
        }
    }

    /// Called to create a new resource.
    /// MUST populate all attributes in the returned state, including
    /// computed ones.
    async fn create(&self, request: CreateRequest) -> CreateResponse;

    /// Called to read current state, used for refresh and after
    /// create/update. Return `state: None` when the remote object is gone.
    async fn read(&self, request: ReadRequest) -> ReadResponse;

    /// Called to update an existing resource.
    /// MUST apply all changes from the planned state.
    async fn update(&self, request: UpdateRequest) -> UpdateResponse;

    /// Called to delete a resource
    async fn delete(&self, request: DeleteRequest) -> DeleteResponse;
}
