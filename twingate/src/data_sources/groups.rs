//! twingate_group / twingate_groups

use crate::client::groups::GroupsFilter;
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

fn group_object_type() -> AttributeType {
    AttributeType::Object(HashMap::from([
        ("id".to_string(), AttributeType::String),
        ("name".to_string(), AttributeType::String),
        ("type".to_string(), AttributeType::String),
        ("is_active".to_string(), AttributeType::Bool),
        ("security_policy_id".to_string(), AttributeType::String),
    ]))
}

fn group_to_dynamic(group: &model::Group) -> Dynamic {
    Dynamic::Map(HashMap::from([
        ("id".to_string(), Dynamic::String(group.id.clone())),
        ("name".to_string(), Dynamic::String(group.name.clone())),
        ("type".to_string(), Dynamic::String(group.group_type.clone())),
        ("is_active".to_string(), Dynamic::Bool(group.is_active)),
        (
            "security_policy_id".to_string(),
            match &group.security_policy_id {
                Some(id) => Dynamic::String(id.clone()),
                None => Dynamic::Null,
            },
        ),
    ]))
}

pub struct GroupDataSource {
    client: Client,
}

impl GroupDataSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn schema_static() -> DataSourceSchema {
        SchemaBuilder::new()
            .attribute(
                "id",
                AttributeBuilder::string("id")
                    .required()
                    .description("The ID of the Group"),
            )
            .attribute(
                "name",
                AttributeBuilder::string("name")
                    .computed()
                    .description("The name of the Group"),
            )
            .attribute(
                "type",
                AttributeBuilder::string("type")
                    .computed()
                    .description("The type of the Group"),
            )
            .attribute(
                "is_active",
                AttributeBuilder::bool("is_active")
                    .computed()
                    .description("Indicates if the Group is active"),
            )
            .attribute(
                "security_policy_id",
                AttributeBuilder::string("security_policy_id")
                    .computed()
                    .description("The Security Policy assigned to the Group"),
            )
            .build_data_source(0)
    }
}

#[async_trait]
impl DataSource for GroupDataSource {
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

        match self.client.read_group(&id).await {
            Ok(Some(group)) => ReadResponse {
                state: Some(
                    StateBuilder::new()
                        .string("id", &group.id)
                        .string("name", &group.name)
                        .string("type", &group.group_type)
                        .bool("is_active", group.is_active)
                        .opt_string("security_policy_id", group.security_policy_id.as_deref())
                        .build(),
                ),
                diagnostics,
            },
            Ok(None) => {
                diagnostics.add_error(
                    "Group not found",
                    Some(format!("No twingate_group with id {}", id)),
                );
                ReadResponse {
                    state: None,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.add_error("Failed to read twingate_group", Some(e.to_string()));
                ReadResponse {
                    state: None,
                    diagnostics,
                }
            }
        }
    }
}

pub struct GroupsDataSource {
    client: Client,
}

impl GroupsDataSource {
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
                    .description("Return only Groups that exactly match this name"),
            )
            .attribute(
                "type",
                AttributeBuilder::string("type")
                    .optional()
                    .description("Return only Groups of this type")
                    .validator(Box::new(tfplug::validator::OneOfValidator::new(&[
                        "MANUAL", "SYNCED", "SYSTEM",
                    ]))),
            )
            .attribute(
                "is_active",
                AttributeBuilder::bool("is_active")
                    .optional()
                    .description("Return only Groups matching this state"),
            )
            .attribute(
                "groups",
                AttributeBuilder::list("groups", group_object_type())
                    .computed()
                    .description("List of Groups matching the filters"),
            )
            .build_data_source(0)
    }
}

#[async_trait]
impl DataSource for GroupsDataSource {
    async fn schema(&self, _request: SchemaRequest) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: Diagnostics::new(),
        }
    }

    async fn read(&self, request: ReadRequest) -> ReadResponse {
        let mut diagnostics = Diagnostics::new();

        let filter = GroupsFilter {
            name: request.current_state.get_string("name"),
            group_type: request.current_state.get_string("type"),
            is_active: request.current_state.get_bool("is_active"),
        };

        match self.client.read_groups(&filter).await {
            Ok(groups) => {
                let id = match &filter.name {
                    Some(name) => format!("groups-by-name-{}", name),
                    None => "all-groups".to_string(),
                };

                let mut builder = StateBuilder::new()
                    .string("id", id)
                    .list("groups", groups.iter().map(group_to_dynamic).collect());

                if let Some(name) = &filter.name {
                    builder = builder.string("name", name);
                }
                if let Some(group_type) = &filter.group_type {
                    builder = builder.string("type", group_type);
                }
                if let Some(is_active) = filter.is_active {
                    builder = builder.bool("is_active", is_active);
                }

                ReadResponse {
                    state: Some(builder.build()),
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.add_error("Failed to read twingate_groups", Some(e.to_string()));
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
    use mockito::{Matcher, Server};
    use tfplug::Context;

    #[tokio::test]
    async fn listing_applies_name_filter() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/graphql/")
            .match_body(Matcher::Regex(r#""name":\{"eq":"devs"\}"#.to_string()))
            .with_body(
                r#"{"data":{"groups":{"edges":[{"node":{"id":"g1","name":"devs","type":"MANUAL","isActive":true,"securityPolicy":null}}],"pageInfo":{"endCursor":null,"hasNextPage":false}}}}"#,
            )
            .create_async()
            .await;

        let data_source = GroupsDataSource::new(test_client(&server.url()));
        let config = StateBuilder::new().string("name", "devs").build();

        let response = data_source
            .read(ReadRequest {
                context: Context::new(),
                current_state: config,
            })
            .await;

        let state = response.state.unwrap();
        assert_eq!(state.get_string("id").unwrap(), "groups-by-name-devs");
        assert_eq!(state.get_list("groups").unwrap().len(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn singular_lookup_includes_membership_free_fields() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/graphql/")
            .with_body(
                r#"{"data":{"group":{"id":"g1","name":"devs","type":"MANUAL","isActive":true,"securityPolicy":{"id":"sp1"},"users":{"edges":[],"pageInfo":{"endCursor":null,"hasNextPage":false}}}}}"#,
            )
            .create_async()
            .await;

        let data_source = GroupDataSource::new(test_client(&server.url()));
        let config = StateBuilder::new().string("id", "g1").build();

        let response = data_source
            .read(ReadRequest {
                context: Context::new(),
                current_state: config,
            })
            .await;

        let state = response.state.unwrap();
        assert_eq!(state.get_string("name").unwrap(), "devs");
        assert_eq!(state.get_string("security_policy_id").unwrap(), "sp1");
    }
}
