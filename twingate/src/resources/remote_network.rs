//! twingate_remote_network

use crate::client::Client;
use crate::model;
use async_trait::async_trait;
use tfplug::defaults::StaticString;
use tfplug::plan_modifier::UseStateForUnknown;
use tfplug::request::{
    CreateRequest, CreateResponse, DeleteRequest, DeleteResponse, ReadRequest, ReadResponse,
    ResourceSchemaResponse, SchemaRequest, UpdateRequest, UpdateResponse,
};
use tfplug::validator::OneOfValidator;
use tfplug::{
    AttributeBuilder, Diagnostics, Resource, ResourceSchema, SchemaBuilder, State, StateBuilder,
};

pub struct RemoteNetworkResource {
    client: Client,
}

impl RemoteNetworkResource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn schema_static() -> ResourceSchema {
        SchemaBuilder::new()
            .attribute(
                "id",
                AttributeBuilder::string("id")
                    .computed()
                    .description("Autogenerated ID of the Remote Network")
                    .plan_modifier(Box::new(UseStateForUnknown)),
            )
            .attribute(
                "name",
                AttributeBuilder::string("name")
                    .required()
                    .description("The name of the Remote Network"),
            )
            .attribute(
                "location",
                AttributeBuilder::string("location")
                    .optional()
                    .computed()
                    .description(
                        "The location of the Remote Network. Must be one of AWS, AZURE, GOOGLE_CLOUD, ON_PREMISE or OTHER",
                    )
                    .validator(Box::new(OneOfValidator::new(&model::LOCATIONS)))
                    .default(Box::new(StaticString::new(model::LOCATION_OTHER))),
            )
            .build_resource(0)
    }

    fn state_from(network: &model::RemoteNetwork) -> State {
        StateBuilder::new()
            .string("id", &network.id)
            .string("name", &network.name)
            .string("location", &network.location)
            .build()
    }
}

#[async_trait]
impl Resource for RemoteNetworkResource {
    async fn schema(&self, _request: SchemaRequest) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: Diagnostics::new(),
        }
    }

    async fn create(&self, request: CreateRequest) -> CreateResponse {
        let mut diagnostics = Diagnostics::new();

        let Some(name) = request.config.get_string("name") else {
            diagnostics.add_error("name is required", None::<String>);
            return CreateResponse {
                state: request.planned_state,
                diagnostics,
            };
        };

        let location = request
            .config
            .get_string("location")
            .unwrap_or_else(|| model::LOCATION_OTHER.to_string());

        match self.client.create_remote_network(&name, &location).await {
            Ok(network) => CreateResponse {
                state: Self::state_from(&network),
                diagnostics,
            },
            Err(e) => {
                diagnostics.add_error(
                    "Failed to create twingate_remote_network",
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

        let Some(id) = request.current_state.get_string("id") else {
            diagnostics.add_error("id is missing from state", None::<String>);
            return ReadResponse {
                state: Some(request.current_state),
                diagnostics,
            };
        };

        match self.client.read_remote_network(&id).await {
            Ok(Some(network)) => ReadResponse {
                state: Some(Self::state_from(&network)),
                diagnostics,
            },
            Ok(None) => ReadResponse {
                state: None,
                diagnostics,
            },
            Err(e) => {
                diagnostics.add_error(
                    "Failed to read twingate_remote_network",
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
        let mut diagnostics = Diagnostics::new();

        let Some(id) = request.current_state.get_string("id") else {
            diagnostics.add_error("id is missing from state", None::<String>);
            return UpdateResponse {
                state: request.planned_state,
                diagnostics,
            };
        };

        let Some(name) = request.config.get_string("name") else {
            diagnostics.add_error("name is required", None::<String>);
            return UpdateResponse {
                state: request.planned_state,
                diagnostics,
            };
        };

        let location = request
            .planned_state
            .get_string("location")
            .unwrap_or_else(|| model::LOCATION_OTHER.to_string());

        match self.client.update_remote_network(&id, &name, &location).await {
            Ok(network) => UpdateResponse {
                state: Self::state_from(&network),
                diagnostics,
            },
            Err(e) => {
                diagnostics.add_error(
                    "Failed to update twingate_remote_network",
                    Some(e.to_string()),
                );
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

        if let Err(e) = self.client.delete_remote_network(&id).await {
            diagnostics.add_error(
                "Failed to delete twingate_remote_network",
                Some(e.to_string()),
            );
        }

        DeleteResponse { diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::test_client;
    use mockito::Server;
    use tfplug::types::Config;
    use tfplug::Context;

    fn create_request(config: Config) -> CreateRequest {
        CreateRequest {
            context: Context::new(),
            planned_state: config.clone(),
            config,
        }
    }

    #[test]
    fn schema_marks_location_optional_with_default() {
        let schema = RemoteNetworkResource::schema_static();

        assert!(schema.attributes["name"].required);
        assert!(schema.attributes["id"].computed);

        let location = &schema.attributes["location"];
        assert!(location.optional);
        assert!(location.computed);
        assert!(location.default.is_some());
        assert_eq!(location.validators.len(), 1);
    }

    #[tokio::test]
    async fn create_populates_state_from_api() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/graphql/")
            .with_body(
                r#"{"data":{"remoteNetworkCreate":{"ok":true,"error":null,"entity":{"id":"rn1","name":"office","location":"AWS"}}}}"#,
            )
            .create_async()
            .await;

        let resource = RemoteNetworkResource::new(test_client(&server.url()));
        let config = StateBuilder::new()
            .string("name", "office")
            .string("location", "AWS")
            .build();

        let response = resource.create(create_request(config)).await;

        assert!(!response.diagnostics.has_errors());
        assert_eq!(response.state.get_string("id").unwrap(), "rn1");
        assert_eq!(response.state.get_string("location").unwrap(), "AWS");
    }

    #[tokio::test]
    async fn create_surfaces_api_failure_as_diagnostic() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/graphql/")
            .with_body(
                r#"{"data":{"remoteNetworkCreate":{"ok":false,"error":"name already taken","entity":null}}}"#,
            )
            .create_async()
            .await;

        let resource = RemoteNetworkResource::new(test_client(&server.url()));
        let config = StateBuilder::new().string("name", "office").build();

        let response = resource.create(create_request(config)).await;

        assert!(response.diagnostics.has_errors());
        assert!(response.diagnostics.errors[0]
            .detail
            .as_deref()
            .unwrap()
            .contains("name already taken"));
    }

    #[tokio::test]
    async fn read_clears_state_when_network_is_gone() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/graphql/")
            .with_body(r#"{"data":{"remoteNetwork":null}}"#)
            .create_async()
            .await;

        let resource = RemoteNetworkResource::new(test_client(&server.url()));
        let state = StateBuilder::new().string("id", "rn1").build();

        let response = resource
            .read(ReadRequest {
                context: Context::new(),
                current_state: state,
            })
            .await;

        assert!(!response.diagnostics.has_errors());
        assert!(response.state.is_none());
    }

    #[tokio::test]
    async fn delete_calls_api() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/graphql/")
            .with_body(r#"{"data":{"remoteNetworkDelete":{"ok":true,"error":null}}}"#)
            .create_async()
            .await;

        let resource = RemoteNetworkResource::new(test_client(&server.url()));
        let state = StateBuilder::new().string("id", "rn1").build();

        let response = resource
            .delete(DeleteRequest {
                context: Context::new(),
                current_state: state,
            })
            .await;

        assert!(!response.diagnostics.has_errors());
        mock.assert_async().await;
    }
}
