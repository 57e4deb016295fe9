//! twingate_security_policy / twingate_security_policies
//!
//! Security Policies are defined in the admin console and determine user
//! and device authentication requirements; the API only exposes reads.

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

fn policy_object_type() -> AttributeType {
    AttributeType::Object(HashMap::from([
        ("id".to_string(), AttributeType::String),
        ("name".to_string(), AttributeType::String),
    ]))
}

fn policy_to_dynamic(policy: &model::SecurityPolicy) -> Dynamic {
    Dynamic::Map(HashMap::from([
        ("id".to_string(), Dynamic::String(policy.id.clone())),
        ("name".to_string(), Dynamic::String(policy.name.clone())),
    ]))
}

pub struct SecurityPolicyDataSource {
    client: Client,
}

impl SecurityPolicyDataSource {
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
                    .description("Return a Security Policy by its ID"),
            )
            .attribute(
                "name",
                AttributeBuilder::string("name")
                    .optional()
                    .computed()
                    .description("Return a Security Policy that exactly matches this name"),
            )
            .build_data_source(0)
    }
}

#[async_trait]
impl DataSource for SecurityPolicyDataSource {
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
            diagnostics.add_error("Exactly one of id or name must be set", None::<String>);
        }

        ValidateResponse { diagnostics }
    }

    async fn read(&self, request: ReadRequest) -> ReadResponse {
        let mut diagnostics = Diagnostics::new();

        let id = request.current_state.get_string("id");
        let name = request.current_state.get_string("name");

        if id.is_none() && name.is_none() {
            diagnostics.add_error("Exactly one of id or name must be set", None::<String>);
            return ReadResponse {
                state: None,
                diagnostics,
            };
        }

        match self
            .client
            .read_security_policy(id.as_deref(), name.as_deref())
            .await
        {
            Ok(Some(policy)) => ReadResponse {
                state: Some(
                    StateBuilder::new()
                        .string("id", &policy.id)
                        .string("name", &policy.name)
                        .build(),
                ),
                diagnostics,
            },
            Ok(None) => {
                diagnostics.add_error(
                    "Security policy not found",
                    Some(format!(
                        "No twingate_security_policy matches {}",
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
                    "Failed to read twingate_security_policy",
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

pub struct SecurityPoliciesDataSource {
    client: Client,
}

impl SecurityPoliciesDataSource {
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
                "security_policies",
                AttributeBuilder::list("security_policies", policy_object_type())
                    .computed()
                    .description("List of all Security Policies"),
            )
            .build_data_source(0)
    }
}

#[async_trait]
impl DataSource for SecurityPoliciesDataSource {
    async fn schema(&self, _request: SchemaRequest) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: Diagnostics::new(),
        }
    }

    async fn read(&self, _request: ReadRequest) -> ReadResponse {
        let mut diagnostics = Diagnostics::new();

        match self.client.read_security_policies().await {
            Ok(policies) => ReadResponse {
                state: Some(
                    StateBuilder::new()
                        .string("id", "all-security-policies")
                        .list(
                            "security_policies",
                            policies.iter().map(policy_to_dynamic).collect(),
                        )
                        .build(),
                ),
                diagnostics,
            },
            Err(e) => {
                diagnostics.add_error(
                    "Failed to read twingate_security_policies",
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
            .with_body(r#"{"data":{"securityPolicy":{"id":"sp1","name":"Default Policy"}}}"#)
            .create_async()
            .await;

        let data_source = SecurityPolicyDataSource::new(test_client(&server.url()));
        let config = StateBuilder::new().string("name", "Default Policy").build();

        let response = data_source
            .read(ReadRequest {
                context: Context::new(),
                current_state: config,
            })
            .await;

        let state = response.state.unwrap();
        assert_eq!(state.get_string("id").unwrap(), "sp1");
    }

    #[tokio::test]
    async fn validate_requires_a_selector() {
        let server = Server::new_async().await;
        let data_source = SecurityPolicyDataSource::new(test_client(&server.url()));

        let response = data_source
            .validate(ValidateRequest {
                context: Context::new(),
                config: Config::new(),
            })
            .await;

        assert!(response.diagnostics.has_errors());
    }

    #[tokio::test]
    async fn listing_returns_policies() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/graphql/")
            .with_body(
                r#"{"data":{"securityPolicies":{"edges":[{"node":{"id":"sp1","name":"Default Policy"}},{"node":{"id":"sp2","name":"Strict"}}],"pageInfo":{"endCursor":null,"hasNextPage":false}}}}"#,
            )
            .create_async()
            .await;

        let data_source = SecurityPoliciesDataSource::new(test_client(&server.url()));

        let response = data_source
            .read(ReadRequest {
                context: Context::new(),
                current_state: Config::new(),
            })
            .await;

        let state = response.state.unwrap();
        assert_eq!(state.get_list("security_policies").unwrap().len(), 2);
    }
}
