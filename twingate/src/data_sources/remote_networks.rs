//! twingate_remote_network / twingate_remote_networks

use crate::client::Client;
use crate::model;
use async_trait::async_trait;
use std::collections::HashMap;
use tfplug::request::{
    DataSourceSchemaResponse, ReadRequest, ReadResponse, SchemaRequest, ValidateRequest,
    ValidateResponse,
};
use tfplug::{
    AttributeBuilder, AttributeType, DataSource, DataSourceSchema, Diagnostics, Dynamic,
    SchemaBuilder, StateBuilder,
};

pub struct RemoteNetworkDataSource {
    client: Client,
}

impl RemoteNetworkDataSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn schema_static() -> DataSourceSchema {
        SchemaBuilder::new()
            .attribute(
                "id",
                AttributeBuilder::string("id")
                    .optional()
                    .computed()
                    .description("The ID of the Remote Network"),
            )
            .attribute(
                "name",
                AttributeBuilder::string("name")
                    .optional()
                    .computed()
                    .description("The name of the Remote Network"),
            )
            .attribute(
                "location",
                AttributeBuilder::string("location")
                    .computed()
                    .description("The location of the Remote Network"),
            )
            .build_data_source(0)
    }
}

#[async_trait]
impl DataSource for RemoteNetworkDataSource {
    async fn schema(&self, _request: SchemaRequest) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: Diagnostics::new(),
        }
    }

    async fn validate(&self, request: ValidateRequest) -> ValidateResponse {
        let mut diagnostics = Diagnostics::new();

        let id = request.config.get_string("id");
        let name = request.config.get_string("name");

        if id.is_some() == name.is_some() {
            diagnostics.add_error(
                "Exactly one of id or name must be set",
                None::<String>,
            );
        }

        ValidateResponse { diagnostics }
    }

    async fn read(&self, request: ReadRequest) -> ReadResponse {
        let mut diagnostics = Diagnostics::new();

        let id = request.current_state.get_string("id");
        let name = request.current_state.get_string("name");

        let result = match (&id, &name) {
            (Some(id), None) => self.client.read_remote_network(id).await,
            (None, Some(name)) => self.client.read_remote_network_by_name(name).await,
            _ => {
                diagnostics.add_error("Exactly one of id or name must be set", None::<String>);
                return ReadResponse {
                    state: None,
                    diagnostics,
                };
            }
        };

        match result {
            Ok(Some(network)) => ReadResponse {
                state: Some(
                    StateBuilder::new()
                        .string("id", &network.id)
                        .string("name", &network.name)
                        .string("location", &network.location)
                        .build(),
                ),
                diagnostics,
            },
            Ok(None) => {
                diagnostics.add_error(
                    "Remote network not found",
                    Some(format!(
                        "No twingate_remote_network matches {}",
                        id.or(name).unwrap_or_default()
                    )),
                );
                ReadResponse {
                    state: None,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.add_error(
                    "Failed to read twingate_remote_network",
                    Some(e.to_string()),
                );
                ReadResponse {
                    state: None,
                    diagnostics,
                }
            }
        }
    }
}

pub struct RemoteNetworksDataSource {
    client: Client,
}

impl RemoteNetworksDataSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn schema_static() -> DataSourceSchema {
        SchemaBuilder::new()
            .attribute(
                "id",
                AttributeBuilder::string("id")
                    .computed()
                    .description("The ID of this data source"),
            )
            .attribute(
                "remote_networks",
                AttributeBuilder::list(
                    "remote_networks",
                    AttributeType::Object(HashMap::from([
                        ("id".to_string(), AttributeType::String),
                        ("name".to_string(), AttributeType::String),
                        ("location".to_string(), AttributeType::String),
                    ])),
                )
                .computed()
                .description("List of all Remote Networks"),
            )
            .build_data_source(0)
    }

    fn network_to_dynamic(network: &model::RemoteNetwork) -> Dynamic {
        Dynamic::Map(HashMap::from([
            ("id".to_string(), Dynamic::String(network.id.clone())),
            ("name".to_string(), Dynamic::String(network.name.clone())),
            (
                "location".to_string(),
                Dynamic::String(network.location.clone()),
            ),
        ]))
    }
}

#[async_trait]
impl DataSource for RemoteNetworksDataSource {
    async fn schema(&self, _request: SchemaRequest) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: Diagnostics::new(),
        }
    }

    async fn read(&self, _request: ReadRequest) -> ReadResponse {
        let mut diagnostics = Diagnostics::new();

        match self.client.read_remote_networks().await {
            Ok(networks) => ReadResponse {
                state: Some(
                    StateBuilder::new()
                        .string("id", "all-remote-networks")
                        .list(
                            "remote_networks",
                            networks.iter().map(Self::network_to_dynamic).collect(),
                        )
                        .build(),
                ),
                diagnostics,
            },
            Err(e) => {
                diagnostics.add_error(
                    "Failed to read twingate_remote_networks",
                    Some(e.to_string()),
                );
                ReadResponse {
                    state: None,
                    diagnostics,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::test_client;
    use mockito::Server;
    use tfplug::types::Config;
    use tfplug::Context;

    #[tokio::test]
    async fn singular_lookup_by_name() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/graphql/")
            .with_body(
                r#"{"data":{"remoteNetworks":{"edges":[{"node":{"id":"rn1","name":"office","location":"AWS"}}],"pageInfo":{"endCursor":null,"hasNextPage":false}}}}"#,
            )
            .create_async()
            .await;

        let data_source = RemoteNetworkDataSource::new(test_client(&server.url()));
        let config = StateBuilder::new().string("name", "office").build();

        let response = data_source
            .read(ReadRequest {
                context: Context::new(),
                current_state: config,
            })
            .await;

        let state = response.state.unwrap();
        assert_eq!(state.get_string("id").unwrap(), "rn1");
        assert_eq!(state.get_string("location").unwrap(), "AWS");
    }

    #[tokio::test]
    async fn singular_lookup_requires_exactly_one_selector() {
        let server = Server::new_async().await;
        let data_source = RemoteNetworkDataSource::new(test_client(&server.url()));

        let response = data_source
            .validate(ValidateRequest {
                context: Context::new(),
                config: Config::new(),
            })
            .await;

        assert!(response.diagnostics.has_errors());

        let both = StateBuilder::new()
            .string("id", "rn1")
            .string("name", "office")
            .build();
        let response = data_source
            .validate(ValidateRequest {
                context: Context::new(),
                config: both,
            })
            .await;

        assert!(response.diagnostics.has_errors());
    }

    #[tokio::test]
    async fn listing_returns_all_networks() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/graphql/")
            .with_body(
                r#"{"data":{"remoteNetworks":{"edges":[{"node":{"id":"rn1","name":"one","location":"OTHER"}},{"node":{"id":"rn2","name":"two","location":"AWS"}}],"pageInfo":{"endCursor":null,"hasNextPage":false}}}}"#,
            )
            .create_async()
            .await;

        let data_source = RemoteNetworksDataSource::new(test_client(&server.url()));

        let response = data_source
            .read(ReadRequest {
                context: Context::new(),
                current_state: Config::new(),
            })
            .await;

        let state = response.state.unwrap();
        let networks = state.get_list("remote_networks").unwrap();
        assert_eq!(networks.len(), 2);
    }
}
