//! twingate_connector_tokens
//!
//! Tokens are minted once at create and never returned by the API again,
//! so read only verifies the connector still exists. Replacing the
//! resource mints fresh tokens and invalidates the old pair.

use crate::client::Client;
use crate::model;
use async_trait::async_trait;
use tfplug::plan_modifier::UseStateForUnknown;
use tfplug::request::{
    CreateRequest, CreateResponse, DeleteRequest, DeleteResponse, ReadRequest, ReadResponse,
    ResourceSchemaResponse, SchemaRequest, UpdateRequest, UpdateResponse,
};
use tfplug::{
    AttributeBuilder, Diagnostics, Resource, ResourceSchema, SchemaBuilder, State, StateBuilder,
};

pub struct ConnectorTokensResource {
    client: Client,
}

impl ConnectorTokensResource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn schema_static() -> ResourceSchema {
        SchemaBuilder::new()
            .attribute(
                "id",
                AttributeBuilder::string("id")
                    .computed()
                    .description("The ID of the Connector the tokens were generated for")
                    .plan_modifier(Box::new(UseStateForUnknown)),
            )
            .attribute(
                "connector_id",
                AttributeBuilder::string("connector_id")
                    .required()
                    .requires_replace()
                    .description("The ID of the Connector to generate tokens for"),
            )
            .attribute(
                "access_token",
                AttributeBuilder::string("access_token")
                    .computed()
                    .sensitive()
                    .description("The Access Token of the parent Connector")
                    .plan_modifier(Box::new(UseStateForUnknown)),
            )
            .attribute(
                "refresh_token",
                AttributeBuilder::string("refresh_token")
                    .computed()
                    .sensitive()
                    .description("The Refresh Token of the parent Connector")
                    .plan_modifier(Box::new(UseStateForUnknown)),
            )
            .build_resource(0)
    }

    fn state_from(connector_id: &str, tokens: &model::ConnectorTokens) -> State {
        StateBuilder::new()
            .string("id", connector_id)
            .string("connector_id", connector_id)
            .string("access_token", &tokens.access_token)
            .string("refresh_token", &tokens.refresh_token)
            .build()
    }
}

#[async_trait]
impl Resource for ConnectorTokensResource {
    async fn schema(&self, _request: SchemaRequest) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: Diagnostics::new(),
        }
    }

    async fn create(&self, request: CreateRequest) -> CreateResponse {
        let mut diagnostics = Diagnostics::new();

        let Some(connector_id) = request.config.get_string("connector_id") else {
            diagnostics.add_error("connector_id is required", None::<String>);
            return CreateResponse {
                state: request.planned_state,
                diagnostics,
            };
        };

        match self.client.generate_connector_tokens(&connector_id).await {
            Ok(tokens) => CreateResponse {
                state: Self::state_from(&connector_id, &tokens),
                diagnostics,
            },
            Err(e) => {
                diagnostics.add_error(
                    "Failed to create twingate_connector_tokens",
                    Some(e.to_string()),
                );
                CreateResponse {
                    state: request.planned_state,
                    diagnostics,
                }
            }
        }
    }

    async fn read(&self, request: ReadRequest) -> ReadResponse {
        let mut diagnostics = Diagnostics::new();

        let Some(connector_id) = request.current_state.get_string("connector_id") else {
            diagnostics.add_error("connector_id is missing from state", None::<String>);
            return ReadResponse {
                state: Some(request.current_state),
                diagnostics,
            };
        };

        // Tokens cannot be re-read; they live only in state. Drop them
        // when the parent connector is gone.
        match self.client.read_connector(&connector_id).await {
            Ok(Some(_)) => ReadResponse {
                state: Some(request.current_state),
                diagnostics,
            },
            Ok(None) => ReadResponse {
                state: None,
                diagnostics,
            },
            Err(e) => {
                diagnostics.add_error(
                    "Failed to read twingate_connector_tokens",
                    Some(e.to_string()),
                );
                ReadResponse {
                    state: Some(request.current_state),
                    diagnostics,
                }
            }
        }
    }

    async fn update(&self, request: UpdateRequest) -> UpdateResponse {
        // connector_id forces replacement; nothing else is updatable
        UpdateResponse {
            state: request.planned_state,
            diagnostics: Diagnostics::new(),
        }
    }

    async fn delete(&self, request: DeleteRequest) -> DeleteResponse {
        let mut diagnostics = Diagnostics::new();

        // Tokens are invalidated by the next generation for this
        // connector; there is nothing to revoke server-side.
        if let Some(connector_id) = request.current_state.get_string("connector_id") {
            tracing::debug!(%connector_id, "removing connector tokens from state");
        } else {
            diagnostics.add_error("connector_id is missing from state", None::<String>);
        }

        DeleteResponse { diagnostics }
    }
}
