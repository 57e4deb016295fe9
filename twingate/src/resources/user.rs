//! twingate_user
//!
//! Users are invited by email; the address is immutable once created.

use crate::client::Client;
use crate::model;
use async_trait::async_trait;
use tfplug::defaults::{StaticBool, StaticString};
use tfplug::plan_modifier::UseStateForUnknown;
use tfplug::request::{
    CreateRequest, CreateResponse, DeleteRequest, DeleteResponse, ReadRequest, ReadResponse,
    ResourceSchemaResponse, SchemaRequest, UpdateRequest, UpdateResponse,
};
use tfplug::validator::OneOfValidator;
use tfplug::{
    AttributeBuilder, Diagnostics, Resource, ResourceSchema, SchemaBuilder, State, StateBuilder,
};

pub struct UserResource {
    client: Client,
}

impl UserResource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn schema_static() -> ResourceSchema {
        SchemaBuilder::new()
            .attribute(
                "id",
                AttributeBuilder::string("id")
                    .computed()
                    .description("Autogenerated ID of the User")
                    .plan_modifier(Box::new(UseStateForUnknown)),
            )
            .attribute(
                "email",
                AttributeBuilder::string("email")
                    .required()
                    .requires_replace()
                    .description("The User's email address"),
            )
            .attribute(
                "first_name",
                AttributeBuilder::string("first_name")
                    .optional()
                    .computed()
                    .description("The User's first name")
                    .plan_modifier(Box::new(UseStateForUnknown)),
            )
            .attribute(
                "last_name",
                AttributeBuilder::string("last_name")
                    .optional()
                    .computed()
                    .description("The User's last name")
                    .plan_modifier(Box::new(UseStateForUnknown)),
            )
            .attribute(
                "role",
                AttributeBuilder::string("role")
                    .optional()
                    .computed()
                    .description("The User's role. Must be one of ADMIN, DEVOPS, SUPPORT or MEMBER")
                    .validator(Box::new(OneOfValidator::new(&model::USER_ROLES)))
                    .default(Box::new(StaticString::new(model::USER_ROLE_MEMBER))),
            )
            .attribute(
                "send_invite",
                AttributeBuilder::bool("send_invite")
                    .optional()
                    .computed()
                    .description("Whether to send an invitation email on creation")
                    .default(Box::new(StaticBool::new(true))),
            )
            .attribute(
                "is_active",
                AttributeBuilder::bool("is_active")
                    .optional()
                    .computed()
                    .description("Whether the User is able to authenticate")
                    .default(Box::new(StaticBool::new(true))),
            )
            .build_resource(0)
    }

    fn state_from(user: &model::User, send_invite: bool) -> State {
        StateBuilder::new()
            .string("id", &user.id)
            .string("email", &user.email)
            .string("first_name", &user.first_name)
            .string("last_name", &user.last_name)
            .string("role", &user.role)
            .bool("send_invite", send_invite)
            .bool("is_active", user.is_active)
            .build()
    }
}

#[async_trait]
impl Resource for UserResource {
    async fn schema(&self, _request: SchemaRequest) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: Diagnostics::new(),
        }
    }

    async fn create(&self, request: CreateRequest) -> CreateResponse {
        let mut diagnostics = Diagnostics::new();

        let Some(email) = request.config.get_string("email") else {
            diagnostics.add_error("email is required", None::<String>);
            return CreateResponse {
                state: request.planned_state,
                diagnostics,
            };
        };

        let first_name = request.config.get_string("first_name");
        let last_name = request.config.get_string("last_name");
        let role = request
            .planned_state
            .get_string("role")
            .unwrap_or_else(|| model::USER_ROLE_MEMBER.to_string());
        let send_invite = request.planned_state.get_bool("send_invite").unwrap_or(true);
        let is_active = request.planned_state.get_bool("is_active").unwrap_or(true);

        let mut user = match self
            .client
            .create_user(
                &email,
                first_name.as_deref(),
                last_name.as_deref(),
                &role,
                send_invite,
            )
            .await
        {
            Ok(user) => user,
            Err(e) => {
                diagnostics.add_error("Failed to create twingate_user", Some(e.to_string()));
                return CreateResponse {
                    state: request.planned_state,
                    diagnostics,
                };
            }
        };

        // Invited users start in a pending state; only an explicit
        // deactivation needs a follow-up call
        if !is_active {
            user = match self
                .client
                .update_user(
                    &user.id,
                    first_name.as_deref(),
                    last_name.as_deref(),
                    &role,
                    false,
                )
                .await
            {
                Ok(user) => user,
                Err(e) => {
                    diagnostics.add_error(
                        "Failed to deactivate twingate_user after create",
                        Some(e.to_string()),
                    );
                    return CreateResponse {
                        state: request.planned_state,
                        diagnostics,
                    };
                }
            };
        }

        // Pending invitees report inactive until they accept; state keeps
        // the configured value to avoid permanent drift
        user.is_active = is_active;

        CreateResponse {
            state: Self::state_from(&user, send_invite),
            diagnostics,
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

        // send_invite is a creation flag the API does not echo back
        let send_invite = request.current_state.get_bool("send_invite").unwrap_or(true);

        match self.client.read_user(&id).await {
            Ok(Some(user)) => ReadResponse {
                state: Some(Self::state_from(&user, send_invite)),
                diagnostics,
            },
            Ok(None) => ReadResponse {
                state: None,
                diagnostics,
            },
            Err(e) => {
                diagnostics.add_error("Failed to read twingate_user", Some(e.to_string()));
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

        let first_name = request.planned_state.get_string("first_name");
        let last_name = request.planned_state.get_string("last_name");
        let role = request
            .planned_state
            .get_string("role")
            .unwrap_or_else(|| model::USER_ROLE_MEMBER.to_string());
        let is_active = request.planned_state.get_bool("is_active").unwrap_or(true);
        let send_invite = request.planned_state.get_bool("send_invite").unwrap_or(true);

        match self
            .client
            .update_user(
                &id,
                first_name.as_deref(),
                last_name.as_deref(),
                &role,
                is_active,
            )
            .await
        {
            Ok(user) => UpdateResponse {
                state: Self::state_from(&user, send_invite),
                diagnostics,
            },
            Err(e) => {
                diagnostics.add_error("Failed to update twingate_user", Some(e.to_string()));
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

        if let Err(e) = self.client.delete_user(&id).await {
            diagnostics.add_error("Failed to delete twingate_user", Some(e.to_string()));
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
    fn schema_replaces_user_on_email_change() {
        let schema = UserResource::schema_static();

        assert!(schema.attributes["email"].required);
        assert!(schema.attributes["email"].requires_replace);
        assert!(schema.attributes["role"].default.is_some());
        assert_eq!(schema.attributes["role"].validators.len(), 1);
    }

    #[tokio::test]
    async fn create_sends_invite_flag() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/graphql/")
            .match_body(Matcher::Regex(r#""shouldSendInvite":false"#.to_string()))
            .with_body(
                r#"{"data":{"userCreate":{"ok":true,"error":null,"entity":{"id":"u1","email":"dev@corp.test","firstName":"Dev","lastName":"One","role":"MEMBER","state":"PENDING"}}}}"#,
            )
            .create_async()
            .await;

        let resource = UserResource::new(test_client(&server.url()));
        let config = StateBuilder::new()
            .string("email", "dev@corp.test")
            .string("first_name", "Dev")
            .string("last_name", "One")
            .build();
        let planned = StateBuilder::from_config(&config)
            .string("role", "MEMBER")
            .bool("send_invite", false)
            .bool("is_active", true)
            .build();

        let response = resource
            .create(CreateRequest {
                context: Context::new(),
                config,
                planned_state: planned,
            })
            .await;

        assert!(!response.diagnostics.has_errors());
        assert_eq!(response.state.get_string("id").unwrap(), "u1");
        assert_eq!(response.state.get_bool("send_invite"), Some(false));
        assert_eq!(response.state.get_bool("is_active"), Some(true));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn read_preserves_send_invite_from_state() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/graphql/")
            .with_body(
                r#"{"data":{"user":{"id":"u1","email":"dev@corp.test","firstName":"Dev","lastName":"One","role":"ADMIN","state":"ACTIVE"}}}"#,
            )
            .create_async()
            .await;

        let resource = UserResource::new(test_client(&server.url()));
        let state = StateBuilder::new()
            .string("id", "u1")
            .bool("send_invite", false)
            .build();

        let response = resource
            .read(ReadRequest {
                context: Context::new(),
                current_state: state,
            })
            .await;

        let state = response.state.unwrap();
        assert_eq!(state.get_string("role").unwrap(), "ADMIN");
        assert_eq!(state.get_bool("send_invite"), Some(false));
    }

    #[tokio::test]
    async fn read_clears_state_when_user_is_gone() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/graphql/")
            .with_body(r#"{"data":{"user":null}}"#)
            .create_async()
            .await;

        let resource = UserResource::new(test_client(&server.url()));
        let state = StateBuilder::new().string("id", "u1").build();

        let response = resource
            .read(ReadRequest {
                context: Context::new(),
                current_state: state,
            })
            .await;

        assert!(response.state.is_none());
    }
}
