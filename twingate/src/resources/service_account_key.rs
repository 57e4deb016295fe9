//! twingate_service_account_key
//!
//! The bearer token is only returned by the create mutation and lives in
//! state from then on. A revoked or expired key reads back as gone so
//! Terraform plans a replacement.

use crate::client::Client;
use crate::model;
use async_trait::async_trait;
use tfplug::defaults::StaticNumber;
use tfplug::plan_modifier::UseStateForUnknown;
use tfplug::request::{
    CreateRequest, CreateResponse, DeleteRequest, DeleteResponse, ReadRequest, ReadResponse,
    ResourceSchemaResponse, SchemaRequest, UpdateRequest, UpdateResponse,
};
use tfplug::validator::NumberRangeValidator;
use tfplug::{
    AttributeBuilder, Diagnostics, Resource, ResourceSchema, SchemaBuilder, State, StateBuilder,
};

const MAX_EXPIRATION_DAYS: f64 = 365.0;

pub struct ServiceAccountKeyResource {
    client: Client,
}

impl ServiceAccountKeyResource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn schema_static() -> ResourceSchema {
        SchemaBuilder::new()
            .attribute(
                "id",
                AttributeBuilder::string("id")
                    .computed()
                    .description("Autogenerated ID of the Service Account Key")
                    .plan_modifier(Box::new(UseStateForUnknown)),
            )
            .attribute(
                "service_account_id",
                AttributeBuilder::string("service_account_id")
                    .required()
                    .requires_replace()
                    .description("The ID of the Service Account this key belongs to"),
            )
            .attribute(
                "name",
                AttributeBuilder::string("name")
                    .optional()
                    .computed()
                    .description("The name of the Service Account Key")
                    .plan_modifier(Box::new(UseStateForUnknown)),
            )
            .attribute(
                "expiration_time",
                AttributeBuilder::number("expiration_time")
                    .optional()
                    .computed()
                    .requires_replace()
                    .description("Expiration in days, 0 means the key never expires")
                    .validator(Box::new(NumberRangeValidator {
                        min: Some(0.0),
                        max: Some(MAX_EXPIRATION_DAYS),
                    }))
                    .default(Box::new(StaticNumber::new(0.0))),
            )
            .attribute(
                "token",
                AttributeBuilder::string("token")
                    .computed()
                    .sensitive()
                    .description("Bearer token for API access, only returned on creation")
                    .plan_modifier(Box::new(UseStateForUnknown)),
            )
            .attribute(
                "is_active",
                AttributeBuilder::bool("is_active")
                    .computed()
                    .description("Whether the key is active")
                    .plan_modifier(Box::new(UseStateForUnknown)),
            )
            .build_resource(0)
    }

    fn state_from(key: &model::ServiceAccountKey, token: &str) -> State {
        StateBuilder::new()
            .string("id", &key.id)
            .string("name", &key.name)
            .string("service_account_id", &key.service_account_id)
            .number("expiration_time", key.expiration_time as f64)
            .string("token", token)
            .bool("is_active", key.is_active)
            .build()
    }
}

#[async_trait]
impl Resource for ServiceAccountKeyResource {
    async fn schema(&self, _request: SchemaRequest) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: Diagnostics::new(),
        }
    }

    async fn create(&self, request: CreateRequest) -> CreateResponse {
        let mut diagnostics = Diagnostics::new();

        let Some(service_account_id) = request.config.get_string("service_account_id") else {
            diagnostics.add_error("service_account_id is required", None::<String>);
            return CreateResponse {
                state: request.planned_state,
                diagnostics,
            };
        };

        let name = request.config.get_string("name");
        let expiration_time = request
            .planned_state
            .get_number("expiration_time")
            .unwrap_or(0.0) as i64;

        match self
            .client
            .create_service_account_key(&service_account_id, name.as_deref(), expiration_time)
            .await
        {
            Ok((key, token)) => CreateResponse {
                state: Self::state_from(&key, &token),
                diagnostics,
            },
            Err(e) => {
                diagnostics.add_error(
                    "Failed to create twingate_service_account_key",
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

        match self.client.read_service_account_key(&id).await {
            // A revoked or expired key cannot authenticate; treat it as
            // gone so it gets replaced
            Ok(Some(key)) if !key.is_active => ReadResponse {
                state: None,
                diagnostics,
            },
            Ok(Some(key)) => {
                let token = request.current_state.get_string("token").unwrap_or_default();
                ReadResponse {
                    state: Some(Self::state_from(&key, &token)),
                    diagnostics,
                }
            }
            Ok(None) => ReadResponse {
                state: None,
                diagnostics,
            },
            Err(e) => {
                diagnostics.add_error(
                    "Failed to read twingate_service_account_key",
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

        // Only the name is updatable in place
        let Some(name) = request.planned_state.get_string("name") else {
            return UpdateResponse {
                state: request.planned_state,
                diagnostics,
            };
        };

        match self.client.update_service_account_key(&id, &name).await {
            Ok(key) => {
                let token = request.current_state.get_string("token").unwrap_or_default();
                UpdateResponse {
                    state: Self::state_from(&key, &token),
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.add_error(
                    "Failed to update twingate_service_account_key",
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

        // Keys must be revoked before they can be deleted
        if let Err(e) = self.client.revoke_service_account_key(&id).await {
            diagnostics.add_error(
                "Failed to revoke twingate_service_account_key",
                Some(e.to_string()),
            );
            return DeleteResponse { diagnostics };
        }

        if let Err(e) = self.client.delete_service_account_key(&id).await {
            diagnostics.add_error(
                "Failed to delete twingate_service_account_key",
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
    use mockito::{Matcher, Server};
    use tfplug::Context;

    #[test]
    fn schema_forces_replacement_for_expiration_change() {
        let schema = ServiceAccountKeyResource::schema_static();

        assert!(schema.attributes["service_account_id"].requires_replace);
        assert!(schema.attributes["expiration_time"].requires_replace);
        assert!(schema.attributes["token"].sensitive);
        assert_eq!(schema.attributes["expiration_time"].validators.len(), 1);
    }

    #[tokio::test]
    async fn create_stores_token_from_mutation() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/graphql/")
            .with_body(
                r#"{"data":{"serviceAccountKeyCreate":{"ok":true,"error":null,"token":"jwt",
                    "entity":{"id":"k1","name":"ci","serviceAccount":{"id":"sa1"},"expirationTime":30,"status":"ACTIVE"}}}}"#,
            )
            .create_async()
            .await;

        let resource = ServiceAccountKeyResource::new(test_client(&server.url()));
        let config = StateBuilder::new()
            .string("service_account_id", "sa1")
            .string("name", "ci")
            .build();
        let planned = StateBuilder::from_config(&config)
            .number("expiration_time", 30.0)
            .build();

        let response = resource
            .create(CreateRequest {
                context: Context::new(),
                config,
                planned_state: planned,
            })
            .await;

        assert!(!response.diagnostics.has_errors());
        assert_eq!(response.state.get_string("token").unwrap(), "jwt");
        assert_eq!(response.state.get_number("expiration_time"), Some(30.0));
        assert_eq!(response.state.get_bool("is_active"), Some(true));
    }

    #[tokio::test]
    async fn read_treats_revoked_key_as_gone() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/graphql/")
            .with_body(
                r#"{"data":{"serviceAccountKey":{"id":"k1","name":"ci","serviceAccount":{"id":"sa1"},"expirationTime":0,"status":"REVOKED"}}}"#,
            )
            .create_async()
            .await;

        let resource = ServiceAccountKeyResource::new(test_client(&server.url()));
        let state = StateBuilder::new()
            .string("id", "k1")
            .string("token", "jwt")
            .build();

        let response = resource
            .read(ReadRequest {
                context: Context::new(),
                current_state: state,
            })
            .await;

        assert!(response.state.is_none());
    }

    #[tokio::test]
    async fn delete_revokes_before_deleting() {
        let mut server = Server::new_async().await;

        let revoke_mock = server
            .mock("POST", "/api/graphql/")
            .match_body(Matcher::Regex(
                r#""operationName":"RevokeServiceAccountKey""#.to_string(),
            ))
            .with_body(r#"{"data":{"serviceAccountKeyRevoke":{"ok":true,"error":null}}}"#)
            .create_async()
            .await;

        let delete_mock = server
            .mock("POST", "/api/graphql/")
            .match_body(Matcher::Regex(
                r#""operationName":"DeleteServiceAccountKey""#.to_string(),
            ))
            .with_body(r#"{"data":{"serviceAccountKeyDelete":{"ok":true,"error":null}}}"#)
            .create_async()
            .await;

        let resource = ServiceAccountKeyResource::new(test_client(&server.url()));
        let state = StateBuilder::new().string("id", "k1").build();

        let response = resource
            .delete(DeleteRequest {
                context: Context::new(),
                current_state: state,
            })
            .await;

        assert!(!response.diagnostics.has_errors());
        revoke_mock.assert_async().await;
        delete_mock.assert_async().await;
    }
}
