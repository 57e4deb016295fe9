//! twingate_resource
//!
//! Carries the protocol restriction rules and the access membership
//! (groups and service accounts), reconciled per `is_authoritative`.

use super::{membership_deltas, visible_membership};
use crate::client::resources::ResourceInput;
use crate::client::Client;
use crate::model;
use async_trait::async_trait;
use std::collections::HashMap;
use tfplug::defaults::StaticBool;
use tfplug::plan_modifier::UseStateForUnknown;
use tfplug::request::{
    CreateRequest, CreateResponse, DeleteRequest, DeleteResponse, ReadRequest, ReadResponse,
    ResourceSchemaResponse, SchemaRequest, UpdateRequest, UpdateResponse, ValidateRequest,
    ValidateResponse,
};
use tfplug::{
    AttributeBuilder, AttributeType, Diagnostics, Dynamic, Resource, ResourceSchema,
    SchemaBuilder, State, StateBuilder,
};

pub struct ResourceResource {
    client: Client,
}

fn protocol_type() -> AttributeType {
    AttributeType::Object(HashMap::from([
        ("policy".to_string(), AttributeType::String),
        (
            "ports".to_string(),
            AttributeType::List(Box::new(AttributeType::String)),
        ),
    ]))
}

pub(crate) fn protocols_type() -> AttributeType {
    AttributeType::Object(HashMap::from([
        ("allow_icmp".to_string(), AttributeType::Bool),
        ("tcp".to_string(), protocol_type()),
        ("udp".to_string(), protocol_type()),
    ]))
}

fn access_type() -> AttributeType {
    AttributeType::Object(HashMap::from([
        (
            "group_ids".to_string(),
            AttributeType::Set(Box::new(AttributeType::String)),
        ),
        (
            "service_account_ids".to_string(),
            AttributeType::Set(Box::new(AttributeType::String)),
        ),
    ]))
}

impl ResourceResource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn schema_static() -> ResourceSchema {
        SchemaBuilder::new()
            .attribute(
                "id",
                AttributeBuilder::string("id")
                    .computed()
                    .description("Autogenerated ID of the Resource")
                    .plan_modifier(Box::new(UseStateForUnknown)),
            )
            .attribute(
                "name",
                AttributeBuilder::string("name")
                    .required()
                    .description("The name of the Resource"),
            )
            .attribute(
                "address",
                AttributeBuilder::string("address")
                    .required()
                    .description("The Resource's IP/CIDR or FQDN/DNS zone"),
            )
            .attribute(
                "remote_network_id",
                AttributeBuilder::string("remote_network_id")
                    .required()
                    .requires_replace()
                    .description("Remote Network ID where the Resource lives"),
            )
            .attribute(
                "alias",
                AttributeBuilder::string("alias")
                    .optional()
                    .description("An alternate address clients can use to reach the Resource"),
            )
            .attribute(
                "security_policy_id",
                AttributeBuilder::string("security_policy_id")
                    .optional()
                    .computed()
                    .description("The ID of a Security Policy to apply to this Resource")
                    .plan_modifier(Box::new(UseStateForUnknown)),
            )
            .attribute(
                "is_active",
                AttributeBuilder::bool("is_active")
                    .optional()
                    .computed()
                    .description("Whether the Resource is active; inactive Resources reject traffic")
                    .default(Box::new(StaticBool::new(true))),
            )
            .attribute(
                "is_visible",
                AttributeBuilder::bool("is_visible")
                    .optional()
                    .computed()
                    .description("Whether the Resource is shown in end-user clients")
                    .default(Box::new(StaticBool::new(true))),
            )
            .attribute(
                "is_browser_shortcut_enabled",
                AttributeBuilder::bool("is_browser_shortcut_enabled")
                    .optional()
                    .computed()
                    .description("Whether a browser shortcut is shown for the Resource")
                    .default(Box::new(StaticBool::new(true))),
            )
            .attribute(
                "is_authoritative",
                AttributeBuilder::bool("is_authoritative")
                    .optional()
                    .computed()
                    .description(
                        "Determines whether access assignments to this Resource override any \
                         existing assignments; when false, out-of-band assignments are left alone",
                    )
                    .default(Box::new(StaticBool::new(true))),
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
                .optional()
                .description(
                    "Restrict access to certain protocols and ports; all traffic is allowed \
                     when omitted",
                ),
            )
            .attribute(
                "access",
                AttributeBuilder::object(
                    "access",
                    match access_type() {
                        AttributeType::Object(attrs) => attrs,
                        _ => unreachable!(),
                    },
                )
                .optional()
                .description("Group IDs and Service Account IDs granted access to the Resource"),
            )
            .build_resource(0)
    }
}

fn parse_protocol(value: Option<&Dynamic>, label: &str) -> Result<model::Protocol, String> {
    let value = match value {
        None => return Ok(model::Protocol::allow_all()),
        Some(v) if v.is_null() => return Ok(model::Protocol::allow_all()),
        Some(v) => v,
    };

    let map = value
        .as_map()
        .ok_or_else(|| format!("protocols.{} must be an object", label))?;

    let policy = map
        .get("policy")
        .and_then(|v| v.as_string())
        .ok_or_else(|| format!("protocols.{}.policy is required", label))?;

    let mut ports = Vec::new();
    if let Some(port_list) = map.get("ports").and_then(|v| v.as_list()) {
        for port in port_list {
            let Some(port) = port.as_string() else {
                return Err(format!("protocols.{}.ports must be strings", label));
            };
            let range = model::PortRange::parse(port)
                .map_err(|e| format!("protocols.{}: {}", label, e))?;
            ports.push(range);
        }
    }

    model::Protocol::new(policy, ports).map_err(|e| format!("protocols.{}: {}", label, e))
}

fn parse_protocols(value: &Dynamic) -> Result<model::Protocols, String> {
    let map = value
        .as_map()
        .ok_or_else(|| "protocols must be an object".to_string())?;

    Ok(model::Protocols {
        allow_icmp: map
            .get("allow_icmp")
            .and_then(|v| v.as_bool())
            .unwrap_or(true),
        tcp: parse_protocol(map.get("tcp"), "tcp")?,
        udp: parse_protocol(map.get("udp"), "udp")?,
    })
}

fn parse_access(value: &Dynamic) -> Result<(Vec<String>, Vec<String>), String> {
    let map = value
        .as_map()
        .ok_or_else(|| "access must be an object".to_string())?;

    let ids = |key: &str| -> Vec<String> {
        map.get(key)
            .and_then(|v| v.as_list())
            .map(|list| list.iter().filter_map(|v| v.as_string().cloned()).collect())
            .unwrap_or_default()
    };

    Ok((ids("group_ids"), ids("service_account_ids")))
}

pub(crate) fn protocol_to_dynamic(protocol: &model::Protocol) -> Dynamic {
    Dynamic::Map(HashMap::from([
        ("policy".to_string(), Dynamic::String(protocol.policy.clone())),
        (
            "ports".to_string(),
            Dynamic::List(
                protocol
                    .ports_to_strings()
                    .into_iter()
                    .map(Dynamic::String)
                    .collect(),
            ),
        ),
    ]))
}

pub(crate) fn protocols_to_dynamic(protocols: &model::Protocols) -> Dynamic {
    Dynamic::Map(HashMap::from([
        ("allow_icmp".to_string(), Dynamic::Bool(protocols.allow_icmp)),
        ("tcp".to_string(), protocol_to_dynamic(&protocols.tcp)),
        ("udp".to_string(), protocol_to_dynamic(&protocols.udp)),
    ]))
}

fn access_to_dynamic(group_ids: &[String], service_account_ids: &[String]) -> Dynamic {
    Dynamic::Map(HashMap::from([
        (
            "group_ids".to_string(),
            Dynamic::List(group_ids.iter().cloned().map(Dynamic::String).collect()),
        ),
        (
            "service_account_ids".to_string(),
            Dynamic::List(
                service_account_ids
                    .iter()
                    .cloned()
                    .map(Dynamic::String)
                    .collect(),
            ),
        ),
    ]))
}

struct ResourceConfig {
    input: ResourceInput,
    is_active: bool,
    authoritative: bool,
    has_protocols: bool,
    has_access: bool,
}

/// Extract and validate everything the mutations need from planned values
fn config_from(planned: &State) -> Result<ResourceConfig, String> {
    let name = planned.get_string("name").ok_or("name is required")?;
    let address = planned.get_string("address").ok_or("address is required")?;
    let remote_network_id = planned
        .get_string("remote_network_id")
        .ok_or("remote_network_id is required")?;

    let protocols_value = planned.get("protocols").filter(|v| !v.is_null());
    let protocols = match protocols_value {
        Some(value) => parse_protocols(value)?,
        None => model::Protocols::allow_all(),
    };

    let access_value = planned.get("access").filter(|v| !v.is_null());
    let (group_ids, service_account_ids) = match access_value {
        Some(value) => parse_access(value)?,
        None => (Vec::new(), Vec::new()),
    };

    Ok(ResourceConfig {
        input: ResourceInput {
            name,
            address,
            remote_network_id,
            protocols,
            group_ids,
            service_account_ids,
            is_visible: planned.get_bool("is_visible"),
            is_browser_shortcut_enabled: planned.get_bool("is_browser_shortcut_enabled"),
            alias: planned.get_string("alias"),
            security_policy_id: planned.get_string("security_policy_id"),
        },
        is_active: planned.get_bool("is_active").unwrap_or(true),
        authoritative: planned.get_bool("is_authoritative").unwrap_or(true),
        has_protocols: protocols_value.is_some(),
        has_access: access_value.is_some(),
    })
}

fn state_from(
    resource: &model::Resource,
    authoritative: bool,
    protocols: Option<&model::Protocols>,
    access: Option<(&[String], &[String])>,
) -> State {
    let builder = StateBuilder::new()
        .string("id", &resource.id)
        .string("name", &resource.name)
        .string("address", &resource.address)
        .string("remote_network_id", &resource.remote_network_id)
        .opt_string("alias", resource.alias.as_deref())
        .opt_string("security_policy_id", resource.security_policy_id.as_deref())
        .bool("is_active", resource.is_active)
        .bool("is_visible", resource.is_visible)
        .bool("is_browser_shortcut_enabled", resource.is_browser_shortcut_enabled)
        .bool("is_authoritative", authoritative);

    let builder = match protocols {
        Some(protocols) => builder.value("protocols", protocols_to_dynamic(protocols)),
        None => builder.value("protocols", Dynamic::Null),
    };

    let builder = match access {
        Some((group_ids, service_account_ids)) => builder.value(
            "access",
            access_to_dynamic(group_ids, service_account_ids),
        ),
        None => builder.value("access", Dynamic::Null),
    };

    builder.build()
}

#[async_trait]
impl Resource for ResourceResource {
    async fn schema(&self, _request: SchemaRequest) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: Diagnostics::new(),
        }
    }

    async fn validate(&self, request: ValidateRequest) -> ValidateResponse {
        let mut diagnostics = Diagnostics::new();

        if let Some(value) = request.config.get("protocols") {
            if !value.is_null() && !value.is_unknown() {
                if let Err(e) = parse_protocols(value) {
                    diagnostics.add_error("Invalid protocols configuration", Some(e));
                }
            }
        }

        if let Some(value) = request.config.get("access") {
            if !value.is_null() && !value.is_unknown() {
                if let Err(e) = parse_access(value) {
                    diagnostics.add_error("Invalid access configuration", Some(e));
                }
            }
        }

        ValidateResponse { diagnostics }
    }

    async fn create(&self, request: CreateRequest) -> CreateResponse {
        let mut diagnostics = Diagnostics::new();

        let config = match config_from(&request.planned_state) {
            Ok(config) => config,
            Err(e) => {
                diagnostics.add_error("Invalid twingate_resource configuration", Some(e));
                return CreateResponse {
                    state: request.planned_state,
                    diagnostics,
                };
            }
        };

        let mut resource = match self.client.create_resource(&config.input).await {
            Ok(resource) => resource,
            Err(e) => {
                diagnostics.add_error("Failed to create twingate_resource", Some(e.to_string()));
                return CreateResponse {
                    state: request.planned_state,
                    diagnostics,
                };
            }
        };

        // Resources are created active; deactivation is a follow-up call
        if !config.is_active {
            if let Err(e) = self
                .client
                .update_resource_active_state(&resource.id, false)
                .await
            {
                diagnostics.add_error(
                    "Failed to deactivate twingate_resource after create",
                    Some(e.to_string()),
                );
                return CreateResponse {
                    state: request.planned_state,
                    diagnostics,
                };
            }
            resource.is_active = false;
        }

        let state = state_from(
            &resource,
            config.authoritative,
            config.has_protocols.then_some(&config.input.protocols),
            config.has_access.then_some((
                config.input.group_ids.as_slice(),
                config.input.service_account_ids.as_slice(),
            )),
        );

        CreateResponse { state, diagnostics }
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

        let resource = match self.client.read_resource(&id).await {
            Ok(Some(resource)) => resource,
            Ok(None) => {
                return ReadResponse {
                    state: None,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.add_error("Failed to read twingate_resource", Some(e.to_string()));
                return ReadResponse {
                    state: Some(request.current_state),
                    diagnostics,
                };
            }
        };

        let authoritative = request
            .current_state
            .get_bool("is_authoritative")
            .unwrap_or(true);

        // Prior declared membership comes from the last applied state
        let prior_access = request.current_state.get("access").filter(|v| !v.is_null());
        let (declared_groups, declared_service_accounts) = match prior_access {
            Some(value) => parse_access(value).unwrap_or_default(),
            None => (Vec::new(), Vec::new()),
        };

        let visible_groups =
            visible_membership(&resource.group_ids, &declared_groups, authoritative);
        let visible_service_accounts = visible_membership(
            &resource.service_account_ids,
            &declared_service_accounts,
            authoritative,
        );

        let include_access = prior_access.is_some()
            || (authoritative
                && (!visible_groups.is_empty() || !visible_service_accounts.is_empty()));

        // Suppress the protocols object when nothing is restricted and the
        // configuration never set it
        let had_protocols = request
            .current_state
            .get("protocols")
            .is_some_and(|v| !v.is_null());
        let include_protocols =
            had_protocols || resource.protocols != model::Protocols::allow_all();

        let state = state_from(
            &resource,
            authoritative,
            include_protocols.then_some(&resource.protocols),
            include_access
                .then_some((visible_groups.as_slice(), visible_service_accounts.as_slice())),
        );

        ReadResponse {
            state: Some(state),
            diagnostics,
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

        let config = match config_from(&request.planned_state) {
            Ok(config) => config,
            Err(e) => {
                diagnostics.add_error("Invalid twingate_resource configuration", Some(e));
                return UpdateResponse {
                    state: request.planned_state,
                    diagnostics,
                };
            }
        };

        let prior_access = request.current_state.get("access").filter(|v| !v.is_null());
        let (prior_groups, prior_service_accounts) = match prior_access {
            Some(value) => parse_access(value).unwrap_or_default(),
            None => (Vec::new(), Vec::new()),
        };

        let remote = match self.client.read_resource(&id).await {
            Ok(Some(resource)) => resource,
            Ok(None) => {
                diagnostics.add_error(
                    "Failed to update twingate_resource",
                    Some(format!("resource {} no longer exists", id)),
                );
                return UpdateResponse {
                    state: request.planned_state,
                    diagnostics,
                };
            }
            Err(e) => {
                diagnostics.add_error("Failed to update twingate_resource", Some(e.to_string()));
                return UpdateResponse {
                    state: request.planned_state,
                    diagnostics,
                };
            }
        };

        let (added_groups, removed_groups) = membership_deltas(
            &remote.group_ids,
            &config.input.group_ids,
            &prior_groups,
            config.authoritative,
        );
        let (added_service_accounts, removed_service_accounts) = membership_deltas(
            &remote.service_account_ids,
            &config.input.service_account_ids,
            &prior_service_accounts,
            config.authoritative,
        );

        match self
            .client
            .update_resource(
                &id,
                &config.input,
                config.is_active,
                &added_groups,
                &removed_groups,
                &added_service_accounts,
                &removed_service_accounts,
            )
            .await
        {
            Ok(()) => UpdateResponse {
                state: request.planned_state,
                diagnostics,
            },
            Err(e) => {
                diagnostics.add_error("Failed to update twingate_resource", Some(e.to_string()));
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

        if let Err(e) = self.client.delete_resource(&id).await {
            diagnostics.add_error("Failed to delete twingate_resource", Some(e.to_string()));
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

    fn restricted_tcp() -> Dynamic {
        Dynamic::Map(HashMap::from([
            (
                "allow_icmp".to_string(),
                Dynamic::Bool(true),
            ),
            (
                "tcp".to_string(),
                Dynamic::Map(HashMap::from([
                    (
                        "policy".to_string(),
                        Dynamic::String("RESTRICTED".to_string()),
                    ),
                    (
                        "ports".to_string(),
                        Dynamic::List(vec![Dynamic::String("443".to_string())]),
                    ),
                ])),
            ),
            (
                "udp".to_string(),
                Dynamic::Map(HashMap::from([
                    (
                        "policy".to_string(),
                        Dynamic::String("ALLOW_ALL".to_string()),
                    ),
                    ("ports".to_string(), Dynamic::List(vec![])),
                ])),
            ),
        ]))
    }

    #[test]
    fn schema_declares_nested_objects() {
        let schema = ResourceResource::schema_static();

        assert!(schema.attributes["name"].required);
        assert!(schema.attributes["remote_network_id"].requires_replace);
        assert!(matches!(
            schema.attributes["protocols"].r#type,
            AttributeType::Object(_)
        ));
        assert!(matches!(
            schema.attributes["access"].r#type,
            AttributeType::Object(_)
        ));
    }

    #[tokio::test]
    async fn validate_rejects_allow_all_with_ports() {
        let server = Server::new_async().await;
        let resource = ResourceResource::new(test_client(&server.url()));

        let mut protocols = restricted_tcp();
        if let Dynamic::Map(map) = &mut protocols {
            map.insert(
                "tcp".to_string(),
                Dynamic::Map(HashMap::from([
                    (
                        "policy".to_string(),
                        Dynamic::String("ALLOW_ALL".to_string()),
                    ),
                    (
                        "ports".to_string(),
                        Dynamic::List(vec![Dynamic::String("443".to_string())]),
                    ),
                ])),
            );
        }

        let config = StateBuilder::new()
            .string("name", "db")
            .string("address", "db.internal")
            .string("remote_network_id", "rn1")
            .value("protocols", protocols)
            .build();

        let response = resource
            .validate(ValidateRequest {
                context: Context::new(),
                config,
            })
            .await;

        assert!(response.diagnostics.has_errors());
        assert!(response.diagnostics.errors[0]
            .detail
            .as_deref()
            .unwrap()
            .contains("ALLOW_ALL"));
    }

    #[tokio::test]
    async fn validate_rejects_descending_port_range() {
        let server = Server::new_async().await;
        let resource = ResourceResource::new(test_client(&server.url()));

        let mut protocols = restricted_tcp();
        if let Dynamic::Map(map) = &mut protocols {
            map.insert(
                "tcp".to_string(),
                Dynamic::Map(HashMap::from([
                    (
                        "policy".to_string(),
                        Dynamic::String("RESTRICTED".to_string()),
                    ),
                    (
                        "ports".to_string(),
                        Dynamic::List(vec![Dynamic::String("90-80".to_string())]),
                    ),
                ])),
            );
        }

        let config = StateBuilder::new()
            .string("name", "db")
            .string("address", "db.internal")
            .string("remote_network_id", "rn1")
            .value("protocols", protocols)
            .build();

        let response = resource
            .validate(ValidateRequest {
                context: Context::new(),
                config,
            })
            .await;

        assert!(response.diagnostics.has_errors());
        assert!(response.diagnostics.errors[0]
            .detail
            .as_deref()
            .unwrap()
            .contains("must not be greater"));
    }

    #[tokio::test]
    async fn create_builds_state_with_declared_access() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/graphql/")
            .match_body(Matcher::Regex(r#""groupIds":\["g1"\]"#.to_string()))
            .with_body(
                r#"{"data":{"resourceCreate":{"ok":true,"error":null,"entity":{
                    "id":"r1","name":"db","address":{"value":"db.internal"},
                    "remoteNetwork":{"id":"rn1"},
                    "isActive":true,"isVisible":true,"isBrowserShortcutEnabled":true,
                    "alias":null,"securityPolicy":null}}}}"#,
            )
            .create_async()
            .await;

        let resource = ResourceResource::new(test_client(&server.url()));

        let access = Dynamic::Map(HashMap::from([
            (
                "group_ids".to_string(),
                Dynamic::List(vec![Dynamic::String("g1".to_string())]),
            ),
            ("service_account_ids".to_string(), Dynamic::List(vec![])),
        ]));

        let planned = StateBuilder::new()
            .string("name", "db")
            .string("address", "db.internal")
            .string("remote_network_id", "rn1")
            .bool("is_active", true)
            .bool("is_visible", true)
            .bool("is_browser_shortcut_enabled", true)
            .bool("is_authoritative", true)
            .value("protocols", restricted_tcp())
            .value("access", access)
            .build();

        let response = resource
            .create(CreateRequest {
                context: Context::new(),
                config: planned.clone(),
                planned_state: planned,
            })
            .await;

        assert!(!response.diagnostics.has_errors());
        assert_eq!(response.state.get_string("id").unwrap(), "r1");

        let access = response.state.get_map("access").unwrap();
        let group_ids = access.get("group_ids").unwrap().as_list().unwrap();
        assert_eq!(group_ids.len(), 1);

        let protocols = response.state.get_map("protocols").unwrap();
        let tcp = protocols.get("tcp").unwrap().as_map().unwrap();
        assert_eq!(
            tcp.get("policy").unwrap().as_string().unwrap(),
            "RESTRICTED"
        );
    }

    #[tokio::test]
    async fn read_clears_state_when_resource_is_gone() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/graphql/")
            .with_body(r#"{"data":{"resource":null}}"#)
            .create_async()
            .await;

        let resource = ResourceResource::new(test_client(&server.url()));
        let state = StateBuilder::new().string("id", "r1").build();

        let response = resource
            .read(ReadRequest {
                context: Context::new(),
                current_state: state,
            })
            .await;

        assert!(response.state.is_none());
    }

    #[tokio::test]
    async fn non_authoritative_read_keeps_access_scoped_to_declared_ids() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/graphql/")
            .with_body(
                r#"{"data":{"resource":{
                    "id":"r1","name":"db","address":{"value":"db.internal"},
                    "remoteNetwork":{"id":"rn1"},
                    "protocols":null,
                    "isActive":true,"isVisible":true,"isBrowserShortcutEnabled":true,
                    "alias":null,"securityPolicy":null,
                    "groups":{"edges":[{"node":{"id":"g1"}},{"node":{"id":"g2"}},{"node":{"id":"g3"}}],"pageInfo":{"endCursor":null,"hasNextPage":false}},
                    "serviceAccounts":{"edges":[],"pageInfo":{"endCursor":null,"hasNextPage":false}}
                }}}"#,
            )
            .create_async()
            .await;

        let resource = ResourceResource::new(test_client(&server.url()));

        let access = Dynamic::Map(HashMap::from([
            (
                "group_ids".to_string(),
                Dynamic::List(vec![Dynamic::String("g1".to_string())]),
            ),
            ("service_account_ids".to_string(), Dynamic::List(vec![])),
        ]));

        let state = StateBuilder::new()
            .string("id", "r1")
            .bool("is_authoritative", false)
            .value("access", access)
            .build();

        let response = resource
            .read(ReadRequest {
                context: Context::new(),
                current_state: state,
            })
            .await;

        let state = response.state.unwrap();
        let access = state.get_map("access").unwrap();
        let group_ids = access.get("group_ids").unwrap().as_list().unwrap();

        // g2/g3 were added out of band; only the declared g1 is tracked
        assert_eq!(group_ids.len(), 1);
        assert_eq!(group_ids[0].as_string().unwrap(), "g1");
    }
}
