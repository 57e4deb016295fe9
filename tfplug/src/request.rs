//! Request and response types passed to provider, resource and data source
//! implementations.

use crate::context::Context;
use crate::provider::{DataSourceSchema, ResourceSchema};
use crate::types::{Config, Diagnostics, State};

#[derive(Clone)]
pub struct ConfigureRequest {
    pub context: Context,
    pub config: Config,
}

#[derive(Clone)]
pub struct ConfigureResponse {
    pub diagnostics: Diagnostics,
}

#[derive(Clone)]
pub struct SchemaRequest {
    pub context: Context,
}

pub struct ResourceSchemaResponse {
    pub schema: ResourceSchema,
    pub diagnostics: Diagnostics,
}

pub struct DataSourceSchemaResponse {
    pub schema: DataSourceSchema,
    pub diagnostics: Diagnostics,
}

#[derive(Clone)]
pub struct ValidateRequest {
    pub context: Context,
    pub config: Config,
}

#[derive(Clone)]
pub struct ValidateResponse {
    pub diagnostics: Diagnostics,
}

#[derive(Clone)]
pub struct CreateRequest {
    pub context: Context,
    pub config: Config,
    pub planned_state: State,
}

#[derive(Clone)]
pub struct CreateResponse {
    pub state: State,
    pub diagnostics: Diagnostics,
}

#[derive(Clone)]
pub struct ReadRequest {
    pub context: Context,
    pub current_state: State,
}

#[derive(Clone)]
pub struct ReadResponse {
    /// None signals the remote object no longer exists and should be
    /// removed from state
    pub state: Option<State>,
    pub diagnostics: Diagnostics,
}

#[derive(Clone)]
pub struct UpdateRequest {
    pub context: Context,
    pub config: Config,
    pub planned_state: State,
    pub current_state: State,
}

#[derive(Clone)]
pub struct UpdateResponse {
    pub state: State,
    pub diagnostics: Diagnostics,
}

#[derive(Clone)]
pub struct DeleteRequest {
    pub context: Context,
    pub current_state: State,
}

#[derive(Clone)]
pub struct DeleteResponse {
    pub diagnostics: Diagnostics,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dynamic;
    use std::collections::HashMap;

    #[test]
    fn configure_request_carries_config_and_context() {
        let req = ConfigureRequest {
            context: Context::new(),
            config: Config::new(),
        };

        assert!(req.config.values.is_empty());
    }

    #[test]
    fn read_request_carries_current_state() {
        let mut values = HashMap::new();
        values.insert("id".to_string(), Dynamic::String("R3001".to_string()));

        let req = ReadRequest {
            context: Context::new(),
            current_state: State { values },
        };

        assert_eq!(req.current_state.get_string("id").unwrap(), "R3001");
    }
}
