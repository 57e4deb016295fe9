//! twingate_connector

use crate::client::Client;
use crate::model;
use async_trait::async_trait;
use tfplug::defaults::StaticBool;
use tfplug::plan_modifier::UseStateForUnknown;
use tfplug::request::{
    CreateRequest, CreateResponse, DeleteRequest, DeleteResponse, ReadRequest, ReadResponse,
    ResourceSchemaResponse, SchemaRequest, UpdateRequest, UpdateResponse,
};
use tfplug::{
    AttributeBuilder, Diagnostics, Resource, ResourceSchema, SchemaBuilder, State, StateBuilder,
};

pub struct ConnectorResource {
    client: Client,
}

impl ConnectorResource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn schema_static() -> ResourceSchema {
        SchemaBuilder::new()
            .attribute(
                "id",
                AttributeBuilder::string("id")
                    .computed()
                    .description("Autogenerated ID of the Connector")
                    .plan_modifier(Box::new(UseStateForUnknown)),
            )
            .attribute(
                "remote_network_id",
                AttributeBuilder::string("remote_network_id")
                    .required()
                    .requires_replace()
                    .description("The ID of the Remote Network the Connector is attached to"),
            )
            .attribute(
                "name",
                AttributeBuilder::string("name")
                    .optional()
                    .computed()
                    .description("Name of the Connector; one is generated when omitted")
                    .plan_modifier(Box::new(UseStateForUnknown)),
            )
            .attribute(
                "status_updates_enabled",
                AttributeBuilder::bool("status_updates_enabled")
                    .optional()
                    .computed()
                    .description("Whether status notifications are enabled for the Connector")
                    .default(Box::new(StaticBool::new(true))),
            )
            .build_resource(0)
    }

    fn state_from(connector: &model::Connector) -> State {
        StateBuilder::new()
            .string("id", &connector.id)
            .string("name", &connector.name)
            .string("remote_network_id", &connector.remote_network_id)
            .bool("status_updates_enabled", connector.status_updates_enabled)
            .build()
    }
}

#[async_trait]
impl Resource for ConnectorResource {
    async fn schema(&self, _request: SchemaRequest) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: Diagnostics::new(),
        }
    }

    async fn create(&self, request: CreateRequest) -> CreateResponse {
        let mut diagnostics = Diagnostics::new();

        let Some(remote_network_id) = request.config.get_string("remote_network_id") else {
            diagnostics.add_error("remote_network_id is required", None::<String>);
            return CreateResponse {
                state: request.planned_state,
                diagnostics,
            };
        };

        let name = request.config.get_string("name");
        let status_updates_enabled = request.planned_state.get_bool("status_updates_enabled");

        match self
            .client
            .create_connector(&remote_network_id, name.as_deref(), status_updates_enabled)
            .await
        {
            Ok(connector) => CreateResponse {
                state: Self::state_from(&connector),
                diagnostics,
            },
            Err(e) => {
                diagnostics.add_error("Failed to create twingate_connector", Some(e.to_string()));
                CreateResponse {
                    state: request.planned_state,
                    diagnostics,
                }
            }
        }
    }

    async fn read(&self, request: ReadRequest) -> ReadResponse {
        let mut diagnostics = Diagnostics::new();

        let Some(id) = request.current_state.get_string("id") else {
            diagnostics.add_error("id is missing from state", None::<String>);
            return ReadResponse {
                state: Some(request.current_state),
                diagnostics,
            };
        };

        match self.client.read_connector(&id).await {
            Ok(Some(connector)) => ReadResponse {
                state: Some(Self::state_from(&connector)),
                diagnostics,
            },
            Ok(None) => ReadResponse {
                state: None,
                diagnostics,
            },
            Err(e) => {
                diagnostics.add_error("Failed to read twingate_connector", Some(e.to_string()));
                ReadResponse {
                    state: Some(request.current_state),
                    diagnostics,
                }
            }
        }
    }

    async fn update(&self, request: UpdateRequest) -> UpdateResponse {
        let mut diagnostics = Diagnostics::new();

        let Some(id) = request.current_state.get_string("id") else {
            diagnostics.add_error("id is missing from state", None::<String>);
            return UpdateResponse {
                state: request.planned_state,
                diagnostics,
            };
        };

        let name = request.planned_state.get_string("name");
        let status_updates_enabled = request.planned_state.get_bool("status_updates_enabled");

        match self
            .client
            .update_connector(&id, name.as_deref(), status_updates_enabled)
            .await
        {
            Ok(connector) => UpdateResponse {
                state: Self::state_from(&connector),
                diagnostics,
            },
            Err(e) => {
                diagnostics.add_error("Failed to update twingate_connector", Some(e.to_string()));
                UpdateResponse {
                    state: request.planned_state,
                    diagnostics,
                }
            }
        }
    }

    async fn delete(&self, request: DeleteRequest) -> DeleteResponse {
        let mut diagnostics = Diagnostics::new();

        let Some(id) = request.current_state.get_string("id") else {
            diagnostics.add_error("id is missing from state", None::<String>);
            return DeleteResponse { diagnostics };
        };

        if let Err(e) = self.client.delete_connector(&id).await {
            diagnostics.add_error("Failed to delete twingate_connector", Some(e.to_string()));
        }

        DeleteResponse { diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::test_client;
    use mockito::Server;
    use tfplug::Context;

    #[test]
    fn schema_forces_replacement_on_remote_network_change() {
        let schema = ConnectorResource::schema_static();

        assert!(schema.attributes["remote_network_id"].required);
        assert!(schema.attributes["remote_network_id"].requires_replace);
        assert!(schema.attributes["name"].computed);
        assert!(schema.attributes["status_updates_enabled"].default.is_some());
    }

    #[tokio::test]
    async fn create_accepts_generated_name() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/graphql/")
            .with_body(
                r#"{"data":{"connectorCreate":{"ok":true,"error":null,"entity":{"id":"c1","name":"brave-ox","remoteNetwork":{"id":"rn1"},"hasStatusNotificationsEnabled":true}}}}"#,
            )
            .create_async()
            .await;

        let resource = ConnectorResource::new(test_client(&server.url()));
        let config = StateBuilder::new().string("remote_network_id", "rn1").build();
        let planned = StateBuilder::new()
            .string("remote_network_id", "rn1")
            .bool("status_updates_enabled", true)
            .build();

        let response = resource
            .create(CreateRequest {
                context: Context::new(),
                config,
                planned_state: planned,
            })
            .await;

        assert!(!response.diagnostics.has_errors());
        assert_eq!(response.state.get_string("name").unwrap(), "brave-ox");
        assert_eq!(response.state.get_bool("status_updates_enabled"), Some(true));
    }

    #[tokio::test]
    async fn read_clears_state_when_connector_is_gone() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/graphql/")
            .with_body(r#"{"data":{"connector":null}}"#)
            .create_async()
            .await;

        let resource = ConnectorResource::new(test_client(&server.url()));
        let state = StateBuilder::new().string("id", "c1").build();

        let response = resource
            .read(ReadRequest {
                context: Context::new(),
                current_state: state,
            })
            .await;

        assert!(response.state.is_none());
    }
}
