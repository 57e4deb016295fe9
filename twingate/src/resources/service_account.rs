//! twingate_service_account

use crate::client::Client;
use crate::model;
use async_trait::async_trait;
use tfplug::plan_modifier::UseStateForUnknown;
use tfplug::request::{
    CreateRequest, CreateResponse, DeleteRequest, DeleteResponse, ReadRequest, ReadResponse,
    ResourceSchemaResponse, SchemaRequest, UpdateRequest, UpdateResponse,
};
use tfplug::{
    AttributeBuilder, Diagnostics, Resource, ResourceSchema, SchemaBuilder, State, StateBuilder,
};

pub struct ServiceAccountResource {
    client: Client,
}

impl ServiceAccountResource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn schema_static() -> ResourceSchema {
        SchemaBuilder::new()
            .attribute(
                "id",
                AttributeBuilder::string("id")
                    .computed()
                    .description("Autogenerated ID of the Service Account")
                    .plan_modifier(Box::new(UseStateForUnknown)),
            )
            .attribute(
                "name",
                AttributeBuilder::string("name")
                    .required()
                    .description("The name of the Service Account"),
            )
            .build_resource(0)
    }

    fn state_from(account: &model::ServiceAccount) -> State {
        StateBuilder::new()
            .string("id", &account.id)
            .string("name", &account.name)
            .build()
    }
}

#[async_trait]
impl Resource for ServiceAccountResource {
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

        match self.client.create_service_account(&name).await {
            Ok(account) => CreateResponse {
                state: Self::state_from(&account),
                diagnostics,
            },
            Err(e) => {
                diagnostics.add_error(
                    "Failed to create twingate_service_account",
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

        match self.client.read_service_account(&id).await {
            Ok(Some(account)) => ReadResponse {
                state: Some(Self::state_from(&account)),
                diagnostics,
            },
            Ok(None) => ReadResponse {
                state: None,
                diagnostics,
            },
            Err(e) => {
                diagnostics.add_error(
                    "Failed to read twingate_service_account",
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

        let Some(name) = request.planned_state.get_string("name") else {
            diagnostics.add_error("name is required", None::<String>);
            return UpdateResponse {
                state: request.planned_state,
                diagnostics,
            };
        };

        match self.client.update_service_account(&id, &name).await {
            Ok(account) => UpdateResponse {
                state: Self::state_from(&account),
                diagnostics,
            },
            Err(e) => {
                diagnostics.add_error(
                    "Failed to update twingate_service_account",
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

        if let Err(e) = self.client.delete_service_account(&id).await {
            diagnostics.add_error(
                "Failed to delete twingate_service_account",
                Some(e.to_string()),
            );
        }

        DeleteResponse { diagnostics }
    }
}
