//! twingate_resource / twingate_resources

use crate::client::Client;
use crate::model;
use crate::resources::resource::{protocols_to_dynamic, protocols_type};
use async_trait::async_trait;
use std::collections::HashMap;
use tfplug::request::{
    DataSourceSchemaResponse, ReadRequest, ReadResponse, SchemaRequest,
};
use tfplug::{
    AttributeBuilder, AttributeType, DataSource, DataSourceSchema, Diagnostics, Dynamic,
    SchemaBuilder, StateBuilder,
};

fn resource_object_type() -> AttributeType {
    AttributeType::Object(HashMap::from([
        ("id".to_string(), AttributeType::String),
        ("name".to_string(), AttributeType::String),
        ("address".to_string(), AttributeType::String),
        ("remote_network_id".to_string(), AttributeType::String),
    ]))
}

fn resource_to_dynamic(resource: &model::Resource) -> Dynamic {
    Dynamic::Map(HashMap::from([
        ("id".to_string(), Dynamic::String(resource.id.clone())),
        ("name".to_string(), Dynamic::String(resource.name.clone())),
        (
            "address".to_string(),
            Dynamic::String(resource.address.clone()),
        ),
        (
            "remote_network_id".to_string(),
            Dynamic::String(resource.remote_network_id.clone()),
        ),
    ]))
}

pub struct ResourceDataSource {
    client: Client,
}

impl ResourceDataSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn schema_static() -> DataSourceSchema {
        SchemaBuilder::new()
            .attribute(
                "id",
                AttributeBuilder::string("id")
                    .required()
                    .description("The ID of the Resource"),
            )
            .attribute(
                "name",
                AttributeBuilder::string("name")
                    .computed()
                    .description("The name of the Resource"),
            )
            .attribute(
                "address",
                AttributeBuilder::string("address")
                    .computed()
                    .description("The Resource's IP/CIDR or FQDN/DNS zone"),
            )
            .attribute(
                "remote_network_id",
                AttributeBuilder::string("remote_network_id")
                    .computed()
                    .description("Remote Network ID where the Resource lives"),
            )
            .attribute(
                "protocols",
                AttributeBuilder::object(
                    "protocols",
                    match protocols_type() {
                        AttributeType::Object(attrs) => attrs,
                        _ => unreachable!(),
                    },
                )
                .computed()
                .description("Protocol restrictions applied to the Resource"),
            )
            .build_data_source(0)
    }
}

#[async_trait]
impl DataSource for ResourceDataSource {
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

        match self.client.read_resource(&id).await {
            Ok(Some(resource)) => ReadResponse {
                state: Some(
                    StateBuilder::new()
                        .string("id", &resource.id)
                        .string("name", &resource.name)
                        .string("address", &resource.address)
                        .string("remote_network_id", &resource.remote_network_id)
                        .value("protocols", protocols_to_dynamic(&resource.protocols))
                        .build(),
                ),
                diagnostics,
            },
            Ok(None) => {
                diagnostics.add_error(
                    "Resource not found",
                    Some(format!("No twingate_resource with id {}", id)),
                );
                ReadResponse {
                    state: None,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.add_error("Failed to read twingate_resource", Some(e.to_string()));
                ReadResponse {
                    state: None,
                    diagnostics,
                }
            }
        }
    }
}

pub struct ResourcesDataSource {
    client: Client,
}

impl ResourcesDataSource {
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
                "name",
                AttributeBuilder::string("name")
                    .optional()
                    .description("Return only Resources that exactly match this name"),
            )
            .attribute(
                "resources",
                AttributeBuilder::list("resources", resource_object_type())
                    .computed()
                    .description("List of Resources matching the filter"),
            )
            .build_data_source(0)
    }
}

#[async_trait]
impl DataSource for ResourcesDataSource {
    async fn schema(&self, _request: SchemaRequest) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: Diagnostics::new(),
        }
    }

    async fn read(&self, request: ReadRequest) -> ReadResponse {
        let mut diagnostics = Diagnostics::new();

        let name = request.current_state.get_string("name");

        match self.client.read_resources(name.as_deref()).await {
            Ok(resources) => {
                let id = match &name {
                    Some(name) => format!("resources-by-name-{}", name),
                    None => "all-resources".to_string(),
                };

                let mut builder = StateBuilder::new()
                    .string("id", id)
                    .list(
                        "resources",
                        resources.iter().map(resource_to_dynamic).collect(),
                    );

                if let Some(name) = &name {
                    builder = builder.string("name", name);
                }

                ReadResponse {
                    state: Some(builder.build()),
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.add_error("Failed to read twingate_resources", Some(e.to_string()));
                ReadResponse {
                    state: None,
                    diagnostics,
                }
            }
        }
    }
}
