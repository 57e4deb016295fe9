//! twingate_connector / twingate_connectors

use crate::client::Client;
use crate::model;
use async_trait::async_trait;
use std::collections::HashMap;
use tfplug::request::{
    DataSourceSchemaResponse, ReadRequest, ReadResponse, SchemaRequest,
};
use tfplug::{
    AttributeBuilder, AttributeType, DataSource, DataSourceSchema, Diagnostics, Dynamic,
    SchemaBuilder, StateBuilder,
};

fn connector_object_type() -> AttributeType {
    AttributeType::Object(HashMap::from([
        ("id".to_string(), AttributeType::String),
        ("name".to_string(), AttributeType::String),
        ("remote_network_id".to_string(), AttributeType::String),
        ("status_updates_enabled".to_string(), AttributeType::Bool),
    ]))
}

fn connector_to_dynamic(connector: &model::Connector) -> Dynamic {
    Dynamic::Map(HashMap::from([
        ("id".to_string(), Dynamic::String(connector.id.clone())),
        ("name".to_string(), Dynamic::String(connector.name.clone())),
        (
            "remote_network_id".to_string(),
            Dynamic::String(connector.remote_network_id.clone()),
        ),
        (
            "status_updates_enabled".to_string(),
            Dynamic::Bool(connector.status_updates_enabled),
        ),
    ]))
}

pub struct ConnectorDataSource {
    client: Client,
}

impl ConnectorDataSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn schema_static() -> DataSourceSchema {
        SchemaBuilder::new()
            .attribute(
                "id",
                AttributeBuilder::string("id")
                    .required()
                    .description("The ID of the Connector"),
            )
            .attribute(
                "name",
                AttributeBuilder::string("name")
                    .computed()
                    .description("The name of the Connector"),
            )
            .attribute(
                "remote_network_id",
                AttributeBuilder::string("remote_network_id")
                    .computed()
                    .description("The ID of the Remote Network attached to the Connector"),
            )
            .attribute(
                "status_updates_enabled",
                AttributeBuilder::bool("status_updates_enabled")
                    .computed()
                    .description("Whether status notifications are enabled for the Connector"),
            )
            .build_data_source(0)
    }
}

#[async_trait]
impl DataSource for ConnectorDataSource {
    async fn schema(&self, _request: SchemaRequest) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: Diagnostics::new(),
        }
    }

    async fn read(&self, request: ReadRequest) -> ReadResponse {
        let mut diagnostics = Diagnostics::new();

        let Some(id) = request.current_state.get_string("id") else {
            diagnostics.add_error("id is required", None::<String>);
            return ReadResponse {
                state: None,
                diagnostics,
            };
        };

        match self.client.read_connector(&id).await {
            Ok(Some(connector)) => ReadResponse {
                state: Some(
                    StateBuilder::new()
                        .string("id", &connector.id)
                        .string("name", &connector.name)
                        .string("remote_network_id", &connector.remote_network_id)
                        .bool("status_updates_enabled", connector.status_updates_enabled)
                        .build(),
                ),
                diagnostics,
            },
            Ok(None) => {
                diagnostics.add_error(
                    "Connector not found",
                    Some(format!("No twingate_connector with id {}", id)),
                );
                ReadResponse {
                    state: None,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.add_error("Failed to read twingate_connector", Some(e.to_string()));
                ReadResponse {
                    state: None,
                    diagnostics,
                }
            }
        }
    }
}

pub struct ConnectorsDataSource {
    client: Client,
}

impl ConnectorsDataSource {
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
                "connectors",
                AttributeBuilder::list("connectors", connector_object_type())
                    .computed()
                    .description("List of all Connectors"),
            )
            .build_data_source(0)
    }
}

#[async_trait]
impl DataSource for ConnectorsDataSource {
    async fn schema(&self, _request: SchemaRequest) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: Diagnostics::new(),
        }
    }

    async fn read(&self, _request: ReadRequest) -> ReadResponse {
        let mut diagnostics = Diagnostics::new();

        match self.client.read_connectors().await {
            Ok(connectors) => ReadResponse {
                state: Some(
                    StateBuilder::new()
                        .string("id", "all-connectors")
                        .list(
                            "connectors",
                            connectors.iter().map(connector_to_dynamic).collect(),
                        )
                        .build(),
                ),
                diagnostics,
            },
            Err(e) => {
                diagnostics.add_error("Failed to read twingate_connectors", Some(e.to_string()));
                ReadResponse {
                    state: None,
                    diagnostics,
                }
            }
        }
    }
}
