//! gRPC service implementation of the Terraform Plugin Protocol v6
//!
//! Bridges the proto service onto the factory-based [`Provider`] API:
//! resources and data sources are created on demand per operation, so no
//! locks are held across CRUD calls.

use crate::context::Context;
use crate::defaults::DefaultRequest;
use crate::plan_modifier::{values_equal, PlanModifyRequest};
use crate::proto::tfplugin6::{
    provider_server::{Provider as ProtoProvider, ProviderServer as ProtoProviderServer},
    *,
};
use crate::provider::Provider;
use crate::request::{
    CreateRequest, DeleteRequest, ReadRequest, UpdateRequest, ValidateRequest,
};
use crate::schema::Attribute as SchemaAttribute;
use crate::types::{Config, Diagnostics as TfplugDiagnostics, Dynamic, State};
use crate::Result;
use rmp_serde::{decode, encode};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::{Identity, Server, ServerTlsConfig};
use tonic::{Request, Response, Status};

pub struct ProviderServer<P: Provider> {
    provider: Arc<RwLock<P>>,
    cert_path: PathBuf,
    key_path: PathBuf,
}

impl<P: Provider + 'static> ProviderServer<P> {
    pub fn new(provider: P, cert_path: PathBuf, key_path: PathBuf) -> Self {
        Self {
            provider: Arc::new(RwLock::new(provider)),
            cert_path,
            key_path,
        }
    }

    pub async fn run(self) -> Result<()> {
        rustls::crypto::aws_lc_rs::default_provider()
            .install_default()
            .map_err(|_| crate::TfplugError::TlsError("crypto provider already installed".into()))?;

        let cert = tokio::fs::read(&self.cert_path).await?;
        let key = tokio::fs::read(&self.key_path).await?;
        let identity = Identity::from_pem(cert, key);

        let tls_config = ServerTlsConfig::new().identity(identity);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let bound_addr = listener.local_addr()?;

        // go-plugin handshake line: core protocol | plugin protocol | network | address | transport
        println!("1|6|tcp|127.0.0.1:{}|grpc", bound_addr.port());
        tracing::info!(port = bound_addr.port(), "provider server started");

        let stream = TcpListenerStream::new(listener);

        let service = ProviderService {
            provider: self.provider.clone(),
        };

        Server::builder()
            .tls_config(tls_config)?
            .add_service(ProtoProviderServer::new(service))
            .serve_with_incoming(stream)
            .await?;

        Ok(())
    }
}

struct ProviderService<P: Provider> {
    provider: Arc<RwLock<P>>,
}

#[tonic::async_trait]
impl<P: Provider + 'static> ProtoProvider for ProviderService<P> {
    async fn get_metadata(
        &self,
        _request: Request<get_metadata::Request>,
    ) -> std::result::Result<Response<get_metadata::Response>, Status> {
        let provider = self.provider.read().await;

        let resources = provider
            .resource_schemas()
            .into_keys()
            .map(|type_name| get_metadata::ResourceMetadata { type_name })
            .collect();
        let data_sources = provider
            .data_source_schemas()
            .into_keys()
            .map(|type_name| get_metadata::DataSourceMetadata { type_name })
            .collect();

        Ok(Response::new(get_metadata::Response {
            server_capabilities: Some(server_capabilities()),
            diagnostics: vec![],
            data_sources,
            resources,
            functions: vec![],
            ephemeral_resources: vec![],
        }))
    }

    async fn get_provider_schema(
        &self,
        _request: Request<get_provider_schema::Request>,
    ) -> std::result::Result<Response<get_provider_schema::Response>, Status> {
        let provider = self.provider.read().await;

        let provider_schema = provider.provider_schema();

        let resources = provider
            .resource_schemas()
            .into_iter()
            .map(|(name, schema)| (name, to_proto_schema(schema.version, &schema.attributes)))
            .collect();
        let data_sources = provider
            .data_source_schemas()
            .into_iter()
            .map(|(name, schema)| (name, to_proto_schema(schema.version, &schema.attributes)))
            .collect();

        Ok(Response::new(get_provider_schema::Response {
            provider: Some(to_proto_schema(
                provider_schema.version,
                &provider_schema.attributes,
            )),
            resource_schemas: resources,
            data_source_schemas: data_sources,
            functions: HashMap::new(),
            ephemeral_resource_schemas: HashMap::new(),
            diagnostics: vec![],
            provider_meta: None,
            server_capabilities: Some(server_capabilities()),
        }))
    }

    async fn validate_provider_config(
        &self,
        request: Request<validate_provider_config::Request>,
    ) -> std::result::Result<Response<validate_provider_config::Response>, Status> {
        let req = request.into_inner();

        // Unknown values in the provider block are legal during planning;
        // real validation happens in configure_provider.
        let _ = decode_dynamic_values(&req.config);

        Ok(Response::new(validate_provider_config::Response {
            diagnostics: vec![],
        }))
    }

    async fn configure_provider(
        &self,
        request: Request<configure_provider::Request>,
    ) -> std::result::Result<Response<configure_provider::Response>, Status> {
        let req = request.into_inner();
        let config = decode_dynamic_values(&req.config)?;

        tracing::debug!(
            keys = ?config.values.keys().collect::<Vec<_>>(),
            "configure_provider called"
        );

        let configure_req = crate::request::ConfigureRequest {
            context: Context::new(),
            config,
        };

        let mut provider = self.provider.write().await;
        let response = provider.configure(configure_req).await;

        Ok(Response::new(configure_provider::Response {
            diagnostics: to_proto_diagnostics(&response.diagnostics),
        }))
    }

    async fn stop_provider(
        &self,
        _request: Request<stop_provider::Request>,
    ) -> std::result::Result<Response<stop_provider::Response>, Status> {
        Ok(Response::new(stop_provider::Response {
            error: String::new(),
        }))
    }

    async fn validate_resource_config(
        &self,
        request: Request<validate_resource_config::Request>,
    ) -> std::result::Result<Response<validate_resource_config::Response>, Status> {
        let req = request.into_inner();
        let type_name = req.type_name;

        let provider = self.provider.read().await;
        let schemas = provider.resource_schemas();
        let schema = match schemas.get(&type_name) {
            Some(s) => s,
            None => {
                return Ok(Response::new(validate_resource_config::Response {
                    diagnostics: vec![error_diagnostic(
                        format!("Unknown resource type: {}", type_name),
                        String::new(),
                        None,
                    )],
                }))
            }
        };

        let config = match decode_dynamic_values(&req.config) {
            Ok(config) => config,
            Err(_) => {
                // Unknown values make the config undecodable during planning;
                // validation re-runs at apply with concrete values.
                tracing::debug!(%type_name, "skipping validation, config has unknown values");
                return Ok(Response::new(validate_resource_config::Response {
                    diagnostics: vec![],
                }));
            }
        };

        let mut diagnostics = validate_against_schema(&config, &schema.attributes);

        // Resource-specific validation beyond the schema
        if let Ok(resource) = provider.create_resource(&type_name).await {
            let response = resource
                .validate(ValidateRequest {
                    context: Context::new(),
                    config,
                })
                .await;
            diagnostics.extend(to_proto_diagnostics(&response.diagnostics));
        }

        Ok(Response::new(validate_resource_config::Response {
            diagnostics,
        }))
    }

    async fn validate_data_resource_config(
        &self,
        request: Request<validate_data_resource_config::Request>,
    ) -> std::result::Result<Response<validate_data_resource_config::Response>, Status> {
        let req = request.into_inner();
        let type_name = req.type_name;

        let provider = self.provider.read().await;
        let schemas = provider.data_source_schemas();
        let schema = match schemas.get(&type_name) {
            Some(s) => s,
            None => {
                return Ok(Response::new(validate_data_resource_config::Response {
                    diagnostics: vec![error_diagnostic(
                        format!("Unknown data source type: {}", type_name),
                        String::new(),
                        None,
                    )],
                }))
            }
        };

        let config = match decode_dynamic_values(&req.config) {
            Ok(config) => config,
            Err(_) => {
                return Ok(Response::new(validate_data_resource_config::Response {
                    diagnostics: vec![],
                }))
            }
        };

        let mut diagnostics = validate_against_schema(&config, &schema.attributes);

        if let Ok(data_source) = provider.create_data_source(&type_name).await {
            let response = data_source
                .validate(ValidateRequest {
                    context: Context::new(),
                    config,
                })
                .await;
            diagnostics.extend(to_proto_diagnostics(&response.diagnostics));
        }

        Ok(Response::new(validate_data_resource_config::Response {
            diagnostics,
        }))
    }

    async fn read_resource(
        &self,
        request: Request<read_resource::Request>,
    ) -> std::result::Result<Response<read_resource::Response>, Status> {
        let req = request.into_inner();
        let type_name = req.type_name;

        let provider = self.provider.read().await;
        let resource = provider
            .create_resource(&type_name)
            .await
            .map_err(|e| Status::internal(e.to_string()))?;

        let current_state = decode_dynamic_values(&req.current_state)?;

        let read_resp = resource
            .read(ReadRequest {
                context: Context::new(),
                current_state,
            })
            .await;

        // None means the remote object is gone; a null new_state tells
        // Terraform to drop it from state.
        let new_state = match read_resp.state {
            Some(state) => Some(encode_dynamic_values(&state.values)?),
            None => None,
        };

        Ok(Response::new(read_resource::Response {
            new_state,
            diagnostics: to_proto_diagnostics(&read_resp.diagnostics),
            private: vec![],
            deferred: None,
            new_identity: None,
        }))
    }

    async fn plan_resource_change(
        &self,
        request: Request<plan_resource_change::Request>,
    ) -> std::result::Result<Response<plan_resource_change::Response>, Status> {
        let req = request.into_inner();
        let type_name = req.type_name.clone();

        let provider = self.provider.read().await;
        let resource_schemas = provider.resource_schemas();
        let resource_schema = resource_schemas
            .get(&type_name)
            .ok_or_else(|| Status::not_found(format!("Unknown resource type: {}", type_name)))?;

        let prior_state = decode_dynamic_values(&req.prior_state)?.values;
        let config = decode_dynamic_values(&req.config)?.values;
        let proposed_new_state = decode_dynamic_values(&req.proposed_new_state)?.values;

        // Destroy plan: echo the empty proposed state, skip defaults and
        // modifiers so they don't resurrect attributes.
        if !prior_state.is_empty() && proposed_new_state.is_empty() {
            return Ok(Response::new(plan_resource_change::Response {
                planned_state: Some(encode_dynamic_values(&proposed_new_state)?),
                requires_replace: vec![],
                planned_private: vec![],
                diagnostics: vec![],
                legacy_type_system: false,
                deferred: None,
                planned_identity: None,
            }));
        }

        let mut planned_state = proposed_new_state;
        let mut requires_replace = Vec::new();
        let mut all_diagnostics = TfplugDiagnostics::new();

        // Apply defaults for optional+computed attributes left null in config
        for (attr_name, attr_schema) in &resource_schema.attributes {
            if let Some(default) = &attr_schema.default {
                if attr_schema.optional && attr_schema.computed {
                    let config_value = config.get(attr_name.as_str()).cloned().unwrap_or(Dynamic::Null);
                    let planned_value = planned_state
                        .get(attr_name.as_str())
                        .cloned()
                        .unwrap_or(Dynamic::Null);
                    if config_value.is_null() && planned_value.is_null() {
                        let response = default.default_value(DefaultRequest {
                            attribute_path: attr_name.clone(),
                        });
                        planned_state.insert(attr_name.clone(), response.value);
                    }
                }
            }
        }

        for (attr_name, attr_schema) in &resource_schema.attributes {
            let state_value = prior_state
                .get(attr_name.as_str())
                .cloned()
                .unwrap_or(Dynamic::Null);
            let config_value = config.get(attr_name.as_str()).cloned().unwrap_or(Dynamic::Null);
            let mut plan_value = planned_state
                .get(attr_name.as_str())
                .cloned()
                .unwrap_or(Dynamic::Null);

            // Immutable attribute changed in place
            if attr_schema.requires_replace
                && !prior_state.is_empty()
                && !state_value.is_null()
                && !plan_value.is_null()
                && !plan_value.is_unknown()
                && !values_equal(&state_value, &plan_value)
            {
                requires_replace.push(attribute_path(attr_name));
            }

            for modifier in &attr_schema.plan_modifiers {
                let response = modifier.modify_plan(PlanModifyRequest {
                    state: state_value.clone(),
                    plan: plan_value.clone(),
                    config: config_value.clone(),
                    attribute_path: attr_name.clone(),
                });

                plan_value = response.plan_value;

                if response.requires_replace {
                    requires_replace.push(attribute_path(attr_name));
                }

                all_diagnostics.extend(response.diagnostics);
            }

            match plan_value {
                Dynamic::Null => {
                    planned_state.remove(attr_name.as_str());
                }
                _ => {
                    planned_state.insert(attr_name.clone(), plan_value);
                }
            }
        }

        Ok(Response::new(plan_resource_change::Response {
            planned_state: Some(encode_dynamic_values(&planned_state)?),
            requires_replace,
            planned_private: vec![],
            diagnostics: to_proto_diagnostics(&all_diagnostics),
            legacy_type_system: false,
            deferred: None,
            planned_identity: None,
        }))
    }

    async fn apply_resource_change(
        &self,
        request: Request<apply_resource_change::Request>,
    ) -> std::result::Result<Response<apply_resource_change::Response>, Status> {
        let req = request.into_inner();
        let type_name = req.type_name;

        let provider = self.provider.read().await;
        let resource = provider
            .create_resource(&type_name)
            .await
            .map_err(|e| Status::internal(e.to_string()))?;

        let prior_state = decode_dynamic_values(&req.prior_state)?.values;
        let config = decode_dynamic_values(&req.config)?.values;
        let planned_state = decode_dynamic_values(&req.planned_state)?.values;

        let context = Context::new();

        let is_create = prior_state.is_empty() && !planned_state.is_empty();
        let is_delete = !prior_state.is_empty() && planned_state.is_empty();

        let (new_state, diagnostics) = if is_create {
            let create_resp = resource
                .create(CreateRequest {
                    context,
                    config: Config { values: config },
                    planned_state: State {
                        values: planned_state.clone(),
                    },
                })
                .await;
            (create_resp.state, create_resp.diagnostics)
        } else if is_delete {
            let delete_resp = resource
                .delete(DeleteRequest {
                    context,
                    current_state: State {
                        values: prior_state.clone(),
                    },
                })
                .await;
            (State::new(), delete_resp.diagnostics)
        } else if !prior_state.is_empty() {
            let update_resp = resource
                .update(UpdateRequest {
                    context,
                    config: Config { values: config },
                    planned_state: State {
                        values: planned_state.clone(),
                    },
                    current_state: State {
                        values: prior_state.clone(),
                    },
                })
                .await;
            (update_resp.state, update_resp.diagnostics)
        } else {
            (
                State {
                    values: planned_state.clone(),
                },
                TfplugDiagnostics::new(),
            )
        };

        if diagnostics.has_errors() {
            // Failed create keeps the planned state so Terraform can retry;
            // anything else keeps the prior state.
            let state_to_return = if is_create { &planned_state } else { &prior_state };

            return Ok(Response::new(apply_resource_change::Response {
                new_state: Some(encode_dynamic_values(state_to_return)?),
                diagnostics: to_proto_diagnostics(&diagnostics),
                private: vec![],
                legacy_type_system: false,
                new_identity: None,
            }));
        }

        let new_state_value = if is_delete && new_state.values.is_empty() {
            None
        } else {
            Some(encode_dynamic_values(&new_state.values)?)
        };

        Ok(Response::new(apply_resource_change::Response {
            new_state: new_state_value,
            diagnostics: to_proto_diagnostics(&diagnostics),
            private: vec![],
            legacy_type_system: false,
            new_identity: None,
        }))
    }

    async fn import_resource_state(
        &self,
        request: Request<import_resource_state::Request>,
    ) -> std::result::Result<Response<import_resource_state::Response>, Status> {
        let req = request.into_inner();
        let type_name = req.type_name;
        let id = req.id.trim().to_string();

        if id.is_empty() {
            return Ok(Response::new(import_resource_state::Response {
                imported_resources: vec![],
                diagnostics: vec![error_diagnostic(
                    "Import requires an ID".to_string(),
                    format!("Run: terraform import {}.<name> <id>", type_name),
                    None,
                )],
                deferred: None,
            }));
        }

        // ID passthrough: seed the state with the ID only, the follow-up
        // ReadResource call fills in the rest.
        let mut values = HashMap::new();
        values.insert("id".to_string(), Dynamic::String(id));

        Ok(Response::new(import_resource_state::Response {
            imported_resources: vec![import_resource_state::ImportedResource {
                type_name,
                state: Some(encode_dynamic_values(&values)?),
                private: vec![],
                identity: None,
            }],
            diagnostics: vec![],
            deferred: None,
        }))
    }

    async fn move_resource_state(
        &self,
        _request: Request<move_resource_state::Request>,
    ) -> std::result::Result<Response<move_resource_state::Response>, Status> {
        Err(Status::unimplemented("MoveResourceState is not supported"))
    }

    async fn read_data_source(
        &self,
        request: Request<read_data_source::Request>,
    ) -> std::result::Result<Response<read_data_source::Response>, Status> {
        let req = request.into_inner();
        let type_name = req.type_name;
        let config = decode_dynamic_values(&req.config)?;

        tracing::debug!(%type_name, "read_data_source called");

        let provider = self.provider.read().await;
        let data_source = provider
            .create_data_source(&type_name)
            .await
            .map_err(|e| Status::internal(e.to_string()))?;

        let read_resp = data_source
            .read(ReadRequest {
                context: Context::new(),
                current_state: config,
            })
            .await;

        let state = match read_resp.state {
            Some(state) => Some(encode_dynamic_values(&state.values)?),
            None => None,
        };

        Ok(Response::new(read_data_source::Response {
            state,
            diagnostics: to_proto_diagnostics(&read_resp.diagnostics),
            deferred: None,
        }))
    }

    async fn upgrade_resource_state(
        &self,
        request: Request<upgrade_resource_state::Request>,
    ) -> std::result::Result<Response<upgrade_resource_state::Response>, Status> {
        let req = request.into_inner();

        // All schemas are at version 0; pass the stored JSON state through.
        let upgraded_state = req.raw_state.as_ref().map(|raw| DynamicValue {
            msgpack: vec![],
            json: raw.json.clone(),
        });

        Ok(Response::new(upgrade_resource_state::Response {
            upgraded_state,
            diagnostics: vec![],
        }))
    }

    async fn get_resource_identity_schemas(
        &self,
        _request: Request<get_resource_identity_schemas::Request>,
    ) -> std::result::Result<Response<get_resource_identity_schemas::Response>, Status> {
        Ok(Response::new(get_resource_identity_schemas::Response {
            identity_schemas: HashMap::new(),
            diagnostics: vec![],
        }))
    }

    async fn upgrade_resource_identity(
        &self,
        _request: Request<upgrade_resource_identity::Request>,
    ) -> std::result::Result<Response<upgrade_resource_identity::Response>, Status> {
        Err(Status::unimplemented(
            "UpgradeResourceIdentity is not supported",
        ))
    }

    async fn get_functions(
        &self,
        _request: Request<get_functions::Request>,
    ) -> std::result::Result<Response<get_functions::Response>, Status> {
        Ok(Response::new(get_functions::Response {
            functions: HashMap::new(),
            diagnostics: vec![],
        }))
    }

    async fn call_function(
        &self,
        _request: Request<call_function::Request>,
    ) -> std::result::Result<Response<call_function::Response>, Status> {
        Err(Status::unimplemented("provider defines no functions"))
    }

    async fn validate_ephemeral_resource_config(
        &self,
        _request: Request<validate_ephemeral_resource_config::Request>,
    ) -> std::result::Result<Response<validate_ephemeral_resource_config::Response>, Status> {
        Ok(Response::new(
            validate_ephemeral_resource_config::Response {
                diagnostics: vec![],
            },
        ))
    }

    async fn open_ephemeral_resource(
        &self,
        _request: Request<open_ephemeral_resource::Request>,
    ) -> std::result::Result<Response<open_ephemeral_resource::Response>, Status> {
        Err(Status::unimplemented(
            "provider defines no ephemeral resources",
        ))
    }

    async fn renew_ephemeral_resource(
        &self,
        _request: Request<renew_ephemeral_resource::Request>,
    ) -> std::result::Result<Response<renew_ephemeral_resource::Response>, Status> {
        Err(Status::unimplemented(
            "provider defines no ephemeral resources",
        ))
    }

    async fn close_ephemeral_resource(
        &self,
        _request: Request<close_ephemeral_resource::Request>,
    ) -> std::result::Result<Response<close_ephemeral_resource::Response>, Status> {
        Err(Status::unimplemented(
            "provider defines no ephemeral resources",
        ))
    }
}

// Helper functions

fn server_capabilities() -> ServerCapabilities {
    ServerCapabilities {
        plan_destroy: false,
        get_provider_schema_optional: false,
        move_resource_state: false,
    }
}

fn to_proto_schema(version: i64, attributes: &HashMap<String, SchemaAttribute>) -> Schema {
    let mut attrs: Vec<&SchemaAttribute> = attributes.values().collect();
    attrs.sort_by_key(|attr| attr.name.as_str());

    Schema {
        version,
        block: Some(schema::Block {
            version,
            attributes: attrs
                .into_iter()
                .map(|attr| schema::Attribute {
                    name: attr.name.clone(),
                    r#type: attr.r#type.to_wire_bytes(),
                    nested_type: None,
                    description: attr.description.clone(),
                    required: attr.required,
                    optional: attr.optional,
                    computed: attr.computed,
                    sensitive: attr.sensitive,
                    description_kind: StringKind::Plain as i32,
                    deprecated: false,
                    write_only: false,
                })
                .collect(),
            block_types: vec![],
            description: String::new(),
            description_kind: StringKind::Plain as i32,
            deprecated: false,
        }),
    }
}

fn attribute_path(name: &str) -> AttributePath {
    AttributePath {
        steps: vec![attribute_path::Step {
            selector: Some(attribute_path::step::Selector::AttributeName(
                name.to_string(),
            )),
        }],
    }
}

fn error_diagnostic(summary: String, detail: String, attribute: Option<&str>) -> Diagnostic {
    Diagnostic {
        severity: diagnostic::Severity::Error as i32,
        summary,
        detail,
        attribute: attribute.map(attribute_path),
    }
}

/// Schema-driven validation: required fields present, value types match,
/// no undeclared fields, per-attribute validators.
fn validate_against_schema(
    config: &Config,
    attributes: &HashMap<String, SchemaAttribute>,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for (attr_name, attr) in attributes {
        if attr.required {
            let value = config.values.get(attr_name.as_str());
            if value.is_none() || value.is_some_and(|v| v.is_null()) {
                diagnostics.push(error_diagnostic(
                    format!("Missing required field: {}", attr_name),
                    format!("The field '{}' is required but was not provided", attr_name),
                    Some(attr_name.as_str()),
                ));
            }
        }
    }

    for (field_name, value) in &config.values {
        match attributes.get(field_name) {
            Some(attr) => {
                if !validate_dynamic_type(value, &attr.r#type) {
                    diagnostics.push(error_diagnostic(
                        format!("Type mismatch for field: {}", field_name),
                        format!(
                            "Field '{}' expects type {:?} but got {}",
                            field_name,
                            attr.r#type,
                            value.type_name()
                        ),
                        Some(field_name.as_str()),
                    ));
                    continue;
                }

                if value.is_null() || value.is_unknown() {
                    continue;
                }

                let mut validator_diags = TfplugDiagnostics::new();
                for validator in &attr.validators {
                    validator.validate(value, field_name, &mut validator_diags);
                }
                diagnostics.extend(to_proto_diagnostics(&validator_diags));
            }
            None => {
                diagnostics.push(error_diagnostic(
                    format!("Unknown field: {}", field_name),
                    format!("The field '{}' is not defined in the schema", field_name),
                    Some(field_name.as_str()),
                ));
            }
        }
    }

    diagnostics
}

fn decode_dynamic_values(
    value: &Option<DynamicValue>,
) -> std::result::Result<Config, Status> {
    let value = match value {
        Some(v) => v,
        None => return Ok(Config::new()),
    };

    if !value.msgpack.is_empty() {
        match decode::from_slice::<HashMap<String, Dynamic>>(&value.msgpack) {
            Ok(values) => Ok(Config { values }),
            Err(e) => match decode::from_slice::<Option<HashMap<String, Dynamic>>>(&value.msgpack) {
                Ok(None) => Ok(Config::new()),
                Ok(Some(values)) => Ok(Config { values }),
                Err(_) => Err(Status::invalid_argument(format!(
                    "Failed to decode msgpack value: {}",
                    e
                ))),
            },
        }
    } else if !value.json.is_empty() {
        match serde_json::from_slice::<Option<HashMap<String, Dynamic>>>(&value.json) {
            Ok(Some(values)) => Ok(Config { values }),
            Ok(None) => Ok(Config::new()),
            Err(e) => Err(Status::invalid_argument(format!(
                "Failed to decode json value: {}",
                e
            ))),
        }
    } else {
        Ok(Config::new())
    }
}

fn encode_dynamic_values(
    values: &HashMap<String, Dynamic>,
) -> std::result::Result<DynamicValue, Status> {
    let msgpack = encode::to_vec_named(values)
        .map_err(|e| Status::internal(format!("Failed to encode msgpack value: {}", e)))?;

    Ok(DynamicValue {
        msgpack,
        json: vec![],
    })
}

fn validate_dynamic_type(value: &Dynamic, expected: &crate::attribute_type::AttributeType) -> bool {
    use crate::attribute_type::AttributeType;

    match (value, expected) {
        // Null and unknown are acceptable anywhere (computed or pending)
        (Dynamic::Null, _) | (Dynamic::Unknown, _) => true,
        (Dynamic::String(_), AttributeType::String) => true,
        (Dynamic::Number(_), AttributeType::Number) => true,
        (Dynamic::Bool(_), AttributeType::Bool) => true,
        (Dynamic::List(list), AttributeType::List(elem)) => {
            list.iter().all(|v| validate_dynamic_type(v, elem))
        }
        (Dynamic::List(list), AttributeType::Set(elem)) => {
            list.iter().all(|v| validate_dynamic_type(v, elem))
        }
        (Dynamic::Map(map), AttributeType::Map(elem)) => {
            map.values().all(|v| validate_dynamic_type(v, elem))
        }
        (Dynamic::Map(map), AttributeType::Object(attrs)) => attrs.iter().all(|(name, t)| {
            map.get(name)
                .map(|v| validate_dynamic_type(v, t))
                .unwrap_or(true)
        }),
        _ => false,
    }
}

fn to_proto_diagnostics(diags: &TfplugDiagnostics) -> Vec<Diagnostic> {
    diags
        .errors
        .iter()
        .map(|d| Diagnostic {
            severity: diagnostic::Severity::Error as i32,
            summary: d.summary.clone(),
            detail: d.detail.clone().unwrap_or_default(),
            attribute: None,
        })
        .chain(diags.warnings.iter().map(|d| Diagnostic {
            severity: diagnostic::Severity::Warning as i32,
            summary: d.summary.clone(),
            detail: d.detail.clone().unwrap_or_default(),
            attribute: None,
        }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::DataSource;
    use crate::provider::{DataSourceSchema, ResourceSchema};
    use crate::request::{
        ConfigureRequest, ConfigureResponse, CreateRequest, CreateResponse,
        DataSourceSchemaResponse, DeleteRequest, DeleteResponse, ReadRequest, ReadResponse,
        ResourceSchemaResponse, SchemaRequest, UpdateRequest, UpdateResponse,
    };
    use crate::resource::Resource;
    use crate::schema::{AttributeBuilder, SchemaBuilder};
    use async_trait::async_trait;

    struct TestProvider;

    fn test_resource_schema() -> ResourceSchema {
        SchemaBuilder::new()
            .attribute("id", AttributeBuilder::string("id").computed())
            .attribute("name", AttributeBuilder::string("name").required())
            .attribute(
                "remote_network_id",
                AttributeBuilder::string("remote_network_id")
                    .required()
                    .requires_replace(),
            )
            .build_resource(0)
    }

    fn test_data_source_schema() -> DataSourceSchema {
        SchemaBuilder::new()
            .attribute("value", AttributeBuilder::string("value").computed())
            .build_data_source(0)
    }

    #[async_trait]
    impl Provider for TestProvider {
        fn provider_schema(&self) -> crate::provider::ProviderSchema {
            SchemaBuilder::new()
                .attribute(
                    "api_token",
                    AttributeBuilder::string("api_token").optional().sensitive(),
                )
                .build_provider(0)
        }

        async fn configure(&mut self, _request: ConfigureRequest) -> ConfigureResponse {
            ConfigureResponse {
                diagnostics: TfplugDiagnostics::new(),
            }
        }

        async fn create_resource(&self, name: &str) -> Result<Box<dyn Resource>> {
            match name {
                "test_resource" => Ok(Box::new(TestResource)),
                _ => Err(format!("Unknown resource type: {}", name).into()),
            }
        }

        async fn create_data_source(&self, name: &str) -> Result<Box<dyn DataSource>> {
            match name {
                "test_data" => Ok(Box::new(TestDataSource)),
                _ => Err(format!("Unknown data source type: {}", name).into()),
            }
        }

        fn resource_schemas(&self) -> HashMap<String, ResourceSchema> {
            HashMap::from([("test_resource".to_string(), test_resource_schema())])
        }

        fn data_source_schemas(&self) -> HashMap<String, DataSourceSchema> {
            HashMap::from([("test_data".to_string(), test_data_source_schema())])
        }
    }

    struct TestResource;

    #[async_trait]
    impl Resource for TestResource {
        async fn schema(&self, _request: SchemaRequest) -> ResourceSchemaResponse {
            ResourceSchemaResponse {
                schema: test_resource_schema(),
                diagnostics: TfplugDiagnostics::new(),
            }
        }

        async fn create(&self, request: CreateRequest) -> CreateResponse {
            let mut state = request.planned_state;
            state
                .values
                .insert("id".to_string(), Dynamic::String("test-123".to_string()));
            CreateResponse {
                state,
                diagnostics: TfplugDiagnostics::new(),
            }
        }

        async fn read(&self, request: ReadRequest) -> ReadResponse {
            ReadResponse {
                state: Some(request.current_state),
                diagnostics: TfplugDiagnostics::new(),
            }
        }

        async fn update(&self, request: UpdateRequest) -> UpdateResponse {
            UpdateResponse {
                state: request.planned_state,
                diagnostics: TfplugDiagnostics::new(),
            }
        }

        async fn delete(&self, _request: DeleteRequest) -> DeleteResponse {
            DeleteResponse {
                diagnostics: TfplugDiagnostics::new(),
            }
        }
    }

    struct TestDataSource;

    #[async_trait]
    impl DataSource for TestDataSource {
        async fn schema(&self, _request: SchemaRequest) -> DataSourceSchemaResponse {
            DataSourceSchemaResponse {
                schema: test_data_source_schema(),
                diagnostics: TfplugDiagnostics::new(),
            }
        }

        async fn read(&self, _request: ReadRequest) -> ReadResponse {
            let mut state = State::new();
            state.values.insert(
                "value".to_string(),
                Dynamic::String("test-value".to_string()),
            );
            ReadResponse {
                state: Some(state),
                diagnostics: TfplugDiagnostics::new(),
            }
        }
    }

    fn service() -> ProviderService<TestProvider> {
        ProviderService {
            provider: Arc::new(RwLock::new(TestProvider)),
        }
    }

    fn encoded(values: &HashMap<String, Dynamic>) -> Option<DynamicValue> {
        Some(DynamicValue {
            msgpack: encode::to_vec_named(values).unwrap(),
            json: vec![],
        })
    }

    #[tokio::test]
    async fn get_provider_schema_includes_all_schemas() {
        let service = service();

        let resp = service
            .get_provider_schema(Request::new(get_provider_schema::Request {}))
            .await
            .unwrap()
            .into_inner();

        assert!(resp.provider.is_some());
        assert!(resp.resource_schemas.contains_key("test_resource"));
        assert!(resp.data_source_schemas.contains_key("test_data"));
    }

    #[tokio::test]
    async fn validate_resource_config_flags_missing_required_field() {
        let service = service();

        let resp = service
            .validate_resource_config(Request::new(validate_resource_config::Request {
                type_name: "test_resource".to_string(),
                config: encoded(&HashMap::from([(
                    "name".to_string(),
                    Dynamic::String("x".to_string()),
                )])),
                client_capabilities: None,
            }))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(resp.diagnostics.len(), 1);
        assert!(resp.diagnostics[0]
            .summary
            .contains("Missing required field: remote_network_id"));
    }

    #[tokio::test]
    async fn apply_resource_change_creates_resource() {
        let service = service();

        let planned = HashMap::from([
            ("name".to_string(), Dynamic::String("x".to_string())),
            (
                "remote_network_id".to_string(),
                Dynamic::String("net-1".to_string()),
            ),
        ]);

        let resp = service
            .apply_resource_change(Request::new(apply_resource_change::Request {
                type_name: "test_resource".to_string(),
                prior_state: encoded(&HashMap::new()),
                planned_state: encoded(&planned),
                config: encoded(&planned),
                planned_private: vec![],
                provider_meta: None,
                planned_identity: None,
            }))
            .await
            .unwrap()
            .into_inner();

        let new_state = resp.new_state.unwrap();
        let decoded: HashMap<String, Dynamic> =
            decode::from_slice(&new_state.msgpack).unwrap();
        assert_eq!(
            decoded.get("id"),
            Some(&Dynamic::String("test-123".to_string()))
        );
    }

    #[tokio::test]
    async fn plan_resource_change_flags_replacement() {
        let service = service();

        let prior = HashMap::from([
            ("id".to_string(), Dynamic::String("test-123".to_string())),
            ("name".to_string(), Dynamic::String("x".to_string())),
            (
                "remote_network_id".to_string(),
                Dynamic::String("net-1".to_string()),
            ),
        ]);
        let mut proposed = prior.clone();
        proposed.insert(
            "remote_network_id".to_string(),
            Dynamic::String("net-2".to_string()),
        );

        let resp = service
            .plan_resource_change(Request::new(plan_resource_change::Request {
                type_name: "test_resource".to_string(),
                prior_state: encoded(&prior),
                proposed_new_state: encoded(&proposed),
                config: encoded(&proposed),
                prior_private: vec![],
                provider_meta: None,
                client_capabilities: None,
                prior_identity: None,
            }))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(resp.requires_replace.len(), 1);
    }

    #[tokio::test]
    async fn plan_resource_change_passes_destroy_through() {
        let service = service();

        let prior = HashMap::from([("id".to_string(), Dynamic::String("test-123".to_string()))]);

        let resp = service
            .plan_resource_change(Request::new(plan_resource_change::Request {
                type_name: "test_resource".to_string(),
                prior_state: encoded(&prior),
                proposed_new_state: encoded(&HashMap::new()),
                config: encoded(&HashMap::new()),
                prior_private: vec![],
                provider_meta: None,
                client_capabilities: None,
                prior_identity: None,
            }))
            .await
            .unwrap()
            .into_inner();

        let planned = resp.planned_state.unwrap();
        let decoded: HashMap<String, Dynamic> = decode::from_slice(&planned.msgpack).unwrap();
        assert!(decoded.is_empty());
    }

    #[tokio::test]
    async fn read_data_source_returns_state() {
        let service = service();

        let resp = service
            .read_data_source(Request::new(read_data_source::Request {
                type_name: "test_data".to_string(),
                config: encoded(&HashMap::new()),
                provider_meta: None,
                client_capabilities: None,
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(resp.state.is_some());
    }

    #[tokio::test]
    async fn import_resource_state_passes_id_through() {
        let service = service();

        let resp = service
            .import_resource_state(Request::new(import_resource_state::Request {
                type_name: "test_resource".to_string(),
                id: "test-123".to_string(),
                client_capabilities: None,
                identity: None,
            }))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(resp.imported_resources.len(), 1);
        let state = resp.imported_resources[0].state.as_ref().unwrap();
        let decoded: HashMap<String, Dynamic> = decode::from_slice(&state.msgpack).unwrap();
        assert_eq!(
            decoded.get("id"),
            Some(&Dynamic::String("test-123".to_string()))
        );
    }

    #[tokio::test]
    async fn apply_resource_change_rejects_unknown_type() {
        let service = service();

        let result = service
            .apply_resource_change(Request::new(apply_resource_change::Request {
                type_name: "non_existent".to_string(),
                prior_state: encoded(&HashMap::new()),
                planned_state: encoded(&HashMap::new()),
                config: encoded(&HashMap::new()),
                planned_private: vec![],
                provider_meta: None,
                planned_identity: None,
            }))
            .await;

        assert!(result.is_err());
        assert!(result.unwrap_err().message().contains("non_existent"));
    }
}
