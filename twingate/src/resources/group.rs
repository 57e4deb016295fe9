//! twingate_group
//!
//! User membership is reconciled according to `is_authoritative`: an
//! authoritative group is fully owned by Terraform, a non-authoritative
//! one only manages the user IDs declared in configuration.

use super::{membership_deltas, visible_membership};
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
    AttributeBuilder, AttributeType, Diagnostics, Resource, ResourceSchema, SchemaBuilder, State,
    StateBuilder,
};

pub struct GroupResource {
    client: Client,
}

impl GroupResource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn schema_static() -> ResourceSchema {
        SchemaBuilder::new()
            .attribute(
                "id",
                AttributeBuilder::string("id")
                    .computed()
                    .description("Autogenerated ID of the Group")
                    .plan_modifier(Box::new(UseStateForUnknown)),
            )
            .attribute(
                "name",
                AttributeBuilder::string("name")
                    .required()
                    .description("The name of the Group"),
            )
            .attribute(
                "security_policy_id",
                AttributeBuilder::string("security_policy_id")
                    .optional()
                    .computed()
                    .description("Defines which Security Policy applies to this Group")
                    .plan_modifier(Box::new(UseStateForUnknown)),
            )
            .attribute(
                "user_ids",
                AttributeBuilder::set("user_ids", AttributeType::String)
                    .optional()
                    .description("List of User IDs that have permission to access the Group"),
            )
            .attribute(
                "is_authoritative",
                AttributeBuilder::bool("is_authoritative")
                    .optional()
                    .computed()
                    .description(
                        "Determines whether User assignments to this Group will override any \
                         existing assignments; when false, out-of-band assignments are left alone",
                    )
                    .default(Box::new(StaticBool::new(true))),
            )
            .build_resource(0)
    }

    fn state_from(group: &model::Group, user_ids: Option<Vec<String>>, authoritative: bool) -> State {
        let builder = StateBuilder::new()
            .string("id", &group.id)
            .string("name", &group.name)
            .opt_string("security_policy_id", group.security_policy_id.as_deref())
            .bool("is_authoritative", authoritative);

        match user_ids {
            Some(ids) => builder.string_list("user_ids", ids).build(),
            None => builder
                .value("user_ids", tfplug::Dynamic::Null)
                .build(),
        }
    }
}

fn declared_user_ids(state: &State) -> Option<Vec<String>> {
    state.get_string_list("user_ids")
}

#[async_trait]
impl Resource for GroupResource {
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

        let user_ids = declared_user_ids(&request.config);
        let security_policy_id = request.config.get_string("security_policy_id");
        let authoritative = request.planned_state.get_bool("is_authoritative").unwrap_or(true);

        match self
            .client
            .create_group(
                &name,
                user_ids.as_deref().unwrap_or(&[]),
                security_policy_id.as_deref(),
            )
            .await
        {
            Ok(group) => CreateResponse {
                state: Self::state_from(&group, user_ids, authoritative),
                diagnostics,
            },
            Err(e) => {
                diagnostics.add_error("Failed to create twingate_group", Some(e.to_string()));
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

        let authoritative = request
            .current_state
            .get_bool("is_authoritative")
            .unwrap_or(true);
        let declared = declared_user_ids(&request.current_state);

        match self.client.read_group(&id).await {
            Ok(Some(group)) => {
                let user_ids = match &declared {
                    // Never declared: leave the attribute untracked unless
                    // the group is authoritative and has remote members
                    None if !authoritative || group.user_ids.is_empty() => None,
                    None => Some(visible_membership(&group.user_ids, &[], authoritative)),
                    Some(declared) => Some(visible_membership(
                        &group.user_ids,
                        declared,
                        authoritative,
                    )),
                };

                ReadResponse {
                    state: Some(Self::state_from(&group, user_ids, authoritative)),
                    diagnostics,
                }
            }
            Ok(None) => ReadResponse {
                state: None,
                diagnostics,
            },
            Err(e) => {
                diagnostics.add_error("Failed to read twingate_group", Some(e.to_string()));
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

        let Some(name) = request.planned_state.get_string("name") else {
            diagnostics.add_error("name is required", None::<String>);
            return UpdateResponse {
                state: request.planned_state,
                diagnostics,
            };
        };

        let authoritative = request
            .planned_state
            .get_bool("is_authoritative")
            .unwrap_or(true);
        let declared = declared_user_ids(&request.planned_state).unwrap_or_default();
        let prior = declared_user_ids(&request.current_state).unwrap_or_default();
        let security_policy_id = request.planned_state.get_string("security_policy_id");

        // Deltas are computed against the live remote list so that
        // out-of-band changes are handled per the authoritative mode.
        let remote = match self.client.read_group(&id).await {
            Ok(Some(group)) => group.user_ids,
            Ok(None) => {
                diagnostics.add_error(
                    "Failed to update twingate_group",
                    Some(format!("group {} no longer exists", id)),
                );
                return UpdateResponse {
                    state: request.planned_state,
                    diagnostics,
                };
            }
            Err(e) => {
                diagnostics.add_error("Failed to update twingate_group", Some(e.to_string()));
                return UpdateResponse {
                    state: request.planned_state,
                    diagnostics,
                };
            }
        };

        let (added, removed) = membership_deltas(&remote, &declared, &prior, authoritative);

        match self
            .client
            .update_group(&id, &name, security_policy_id.as_deref(), &added, &removed)
            .await
        {
            Ok(()) => UpdateResponse {
                state: request.planned_state,
                diagnostics,
            },
            Err(e) => {
                diagnostics.add_error("Failed to update twingate_group", Some(e.to_string()));
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

        if let Err(e) = self.client.delete_group(&id).await {
            diagnostics.add_error("Failed to delete twingate_group", Some(e.to_string()));
        }

        DeleteResponse { diagnostics }
    }
}
