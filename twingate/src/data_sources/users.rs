//! twingate_user / twingate_users

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

fn user_object_type() -> AttributeType {
    AttributeType::Object(HashMap::from([
        ("id".to_string(), AttributeType::String),
        ("email".to_string(), AttributeType::String),
        ("first_name".to_string(), AttributeType::String),
        ("last_name".to_string(), AttributeType::String),
        ("role".to_string(), AttributeType::String),
        ("is_active".to_string(), AttributeType::Bool),
    ]))
}

fn user_to_dynamic(user: &model::User) -> Dynamic {
    Dynamic::Map(HashMap::from([
        ("id".to_string(), Dynamic::String(user.id.clone())),
        ("email".to_string(), Dynamic::String(user.email.clone())),
        (
            "first_name".to_string(),
            Dynamic::String(user.first_name.clone()),
        ),
        (
            "last_name".to_string(),
            Dynamic::String(user.last_name.clone()),
        ),
        ("role".to_string(), Dynamic::String(user.role.clone())),
        ("is_active".to_string(), Dynamic::Bool(user.is_active)),
    ]))
}

pub struct UserDataSource {
    client: Client,
}

impl UserDataSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn schema_static() -> DataSourceSchema {
        SchemaBuilder::new()
            .attribute(
                "id",
                AttributeBuilder::string("id")
                    .required()
                    .description("The ID of the User"),
            )
            .attribute(
                "email",
                AttributeBuilder::string("email")
                    .computed()
                    .description("The User's email address"),
            )
            .attribute(
                "first_name",
                AttributeBuilder::string("first_name")
                    .computed()
                    .description("The User's first name"),
            )
            .attribute(
                "last_name",
                AttributeBuilder::string("last_name")
                    .computed()
                    .description("The User's last name"),
            )
            .attribute(
                "role",
                AttributeBuilder::string("role")
                    .computed()
                    .description("The User's role"),
            )
            .attribute(
                "is_active",
                AttributeBuilder::bool("is_active")
                    .computed()
                    .description("Whether the User is able to authenticate"),
            )
            .build_data_source(0)
    }
}

#[async_trait]
impl DataSource for UserDataSource {
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

        match self.client.read_user(&id).await {
            Ok(Some(user)) => ReadResponse {
                state: Some(
                    StateBuilder::new()
                        .string("id", &user.id)
                        .string("email", &user.email)
                        .string("first_name", &user.first_name)
                        .string("last_name", &user.last_name)
                        .string("role", &user.role)
                        .bool("is_active", user.is_active)
                        .build(),
                ),
                diagnostics,
            },
            Ok(None) => {
                diagnostics.add_error(
                    "User not found",
                    Some(format!("No twingate_user with id {}", id)),
                );
                ReadResponse {
                    state: None,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.add_error("Failed to read twingate_user", Some(e.to_string()));
                ReadResponse {
                    state: None,
                    diagnostics,
                }
            }
        }
    }
}

pub struct UsersDataSource {
    client: Client,
}

impl UsersDataSource {
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
                "users",
                AttributeBuilder::list("users", user_object_type())
                    .computed()
                    .description("List of all Users"),
            )
            .build_data_source(0)
    }
}

#[async_trait]
impl DataSource for UsersDataSource {
    async fn schema(&self, _request: SchemaRequest) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: Diagnostics::new(),
        }
    }

    async fn read(&self, _request: ReadRequest) -> ReadResponse {
        let mut diagnostics = Diagnostics::new();

        match self.client.read_users().await {
            Ok(users) => ReadResponse {
                state: Some(
                    StateBuilder::new()
                        .string("id", "all-users")
                        .list("users", users.iter().map(user_to_dynamic).collect())
                        .build(),
                ),
                diagnostics,
            },
            Err(e) => {
                diagnostics.add_error("Failed to read twingate_users", Some(e.to_string()));
                ReadResponse {
                    state: None,
                    diagnostics,
                }
            }
        }
    }
}
