pub mod client;
pub mod data_sources;
pub mod model;
pub mod resources;

use async_trait::async_trait;
use client::Client;
use std::collections::HashMap;
use tfplug::provider::{DataSourceSchema, ProviderSchema, ResourceSchema};
use tfplug::request::{ConfigureRequest, ConfigureResponse};
use tfplug::{
    AttributeBuilder, DataSource, Diagnostics, Provider, Resource, SchemaBuilder,
};

pub const DEFAULT_URL: &str = "twingate.com";
pub const DEFAULT_HTTP_TIMEOUT: u64 = 10;
pub const DEFAULT_HTTP_MAX_RETRY: u32 = 10;

const ENV_API_TOKEN: &str = "TWINGATE_API_TOKEN";
const ENV_NETWORK: &str = "TWINGATE_NETWORK";
const ENV_URL: &str = "TWINGATE_URL";
const ENV_HTTP_TIMEOUT: &str = "TWINGATE_HTTP_TIMEOUT";
const ENV_HTTP_MAX_RETRY: &str = "TWINGATE_HTTP_MAX_RETRY";

pub struct TwingateProvider {
    client: Option<Client>,
}

impl Default for TwingateProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TwingateProvider {
    pub fn new() -> Self {
        Self { client: None }
    }
}

fn env_number<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

#[async_trait]
impl Provider for TwingateProvider {
    fn provider_schema(&self) -> ProviderSchema {
        SchemaBuilder::new()
            .attribute(
                "api_token",
                AttributeBuilder::string("api_token")
                    .optional()
                    .sensitive()
                    .description(
                        "The access key for API operations, available in the Admin Console \
                         (can also be set via TWINGATE_API_TOKEN)",
                    ),
            )
            .attribute(
                "network",
                AttributeBuilder::string("network")
                    .optional()
                    .description(
                        "Network ID, the subdomain of the Admin Console URL \
                         (can also be set via TWINGATE_NETWORK)",
                    ),
            )
            .attribute(
                "url",
                AttributeBuilder::string("url")
                    .optional()
                    .description(
                        "Base API domain, defaults to twingate.com and shouldn't be changed \
                         under normal circumstances (can also be set via TWINGATE_URL)",
                    ),
            )
            .attribute(
                "http_timeout",
                AttributeBuilder::number("http_timeout")
                    .optional()
                    .description(
                        "Time limit in seconds for HTTP requests, defaults to 10 \
                         (can also be set via TWINGATE_HTTP_TIMEOUT)",
                    ),
            )
            .attribute(
                "http_max_retry",
                AttributeBuilder::number("http_max_retry")
                    .optional()
                    .description(
                        "Retry limit for transient HTTP failures, defaults to 10 \
                         (can also be set via TWINGATE_HTTP_MAX_RETRY)",
                    ),
            )
            .build_provider(0)
    }

    async fn configure(&mut self, request: ConfigureRequest) -> ConfigureResponse {
        let mut diags = Diagnostics::new();

        let api_token = request
            .config
            .get_string("api_token")
            .or_else(|| std::env::var(ENV_API_TOKEN).ok());

        let network = request
            .config
            .get_string("network")
            .or_else(|| std::env::var(ENV_NETWORK).ok());

        let url = request
            .config
            .get_string("url")
            .or_else(|| std::env::var(ENV_URL).ok())
            .unwrap_or_else(|| DEFAULT_URL.to_string());

        let http_timeout = request
            .config
            .get_number("http_timeout")
            .map(|v| v as u64)
            .or_else(|| env_number(ENV_HTTP_TIMEOUT))
            .unwrap_or(DEFAULT_HTTP_TIMEOUT);

        let http_max_retry = request
            .config
            .get_number("http_max_retry")
            .map(|v| v as u32)
            .or_else(|| env_number(ENV_HTTP_MAX_RETRY))
            .unwrap_or(DEFAULT_HTTP_MAX_RETRY);

        match (network, api_token) {
            (Some(network), Some(api_token)) => {
                match Client::new(&network, &url, &api_token, http_timeout, http_max_retry) {
                    Ok(client) => {
                        self.client = Some(client);
                    }
                    Err(e) => {
                        diags.add_error(
                            format!("Failed to create API client: {}", e),
                            None::<String>,
                        );
                    }
                }
            }
            (None, _) => {
                diags.add_error(
                    "network is required (set in provider config or TWINGATE_NETWORK env var)",
                    None::<String>,
                );
            }
            (_, None) => {
                diags.add_error(
                    "api_token is required (set in provider config or TWINGATE_API_TOKEN env var)",
                    None::<String>,
                );
            }
        }

        ConfigureResponse { diagnostics: diags }
    }

    async fn create_resource(&self, name: &str) -> tfplug::Result<Box<dyn Resource>> {
        let client = self
            .client
            .as_ref()
            .ok_or("Provider not configured")?
            .clone();

        match name {
            "twingate_remote_network" => Ok(Box::new(
                resources::remote_network::RemoteNetworkResource::new(client),
            )),
            "twingate_connector" => {
                Ok(Box::new(resources::connector::ConnectorResource::new(client)))
            }
            "twingate_connector_tokens" => Ok(Box::new(
                resources::connector_tokens::ConnectorTokensResource::new(client),
            )),
            "twingate_group" => Ok(Box::new(resources::group::GroupResource::new(client))),
            "twingate_resource" => {
                Ok(Box::new(resources::resource::ResourceResource::new(client)))
            }
            "twingate_service_account" => Ok(Box::new(
                resources::service_account::ServiceAccountResource::new(client),
            )),
            "twingate_service_account_key" => Ok(Box::new(
                resources::service_account_key::ServiceAccountKeyResource::new(client),
            )),
            "twingate_user" => Ok(Box::new(resources::user::UserResource::new(client))),
            _ => Err(format!("Unknown resource: {}", name).into()),
        }
    }

    async fn create_data_source(&self, name: &str) -> tfplug::Result<Box<dyn DataSource>> {
        let client = self
            .client
            .as_ref()
            .ok_or("Provider not configured")?
            .clone();

        match name {
            "twingate_remote_network" => Ok(Box::new(
                data_sources::remote_networks::RemoteNetworkDataSource::new(client),
            )),
            "twingate_remote_networks" => Ok(Box::new(
                data_sources::remote_networks::RemoteNetworksDataSource::new(client),
            )),
            "twingate_connector" => Ok(Box::new(
                data_sources::connectors::ConnectorDataSource::new(client),
            )),
            "twingate_connectors" => Ok(Box::new(
                data_sources::connectors::ConnectorsDataSource::new(client),
            )),
            "twingate_group" => Ok(Box::new(data_sources::groups::GroupDataSource::new(client))),
            "twingate_groups" => {
                Ok(Box::new(data_sources::groups::GroupsDataSource::new(client)))
            }
            "twingate_resource" => Ok(Box::new(
                data_sources::resources::ResourceDataSource::new(client),
            )),
            "twingate_resources" => Ok(Box::new(
                data_sources::resources::ResourcesDataSource::new(client),
            )),
            "twingate_user" => Ok(Box::new(data_sources::users::UserDataSource::new(client))),
            "twingate_users" => Ok(Box::new(data_sources::users::UsersDataSource::new(client))),
            "twingate_service_accounts" => Ok(Box::new(
                data_sources::service_accounts::ServiceAccountsDataSource::new(client),
            )),
            "twingate_security_policy" => Ok(Box::new(
                data_sources::security_policies::SecurityPolicyDataSource::new(client),
            )),
            "twingate_security_policies" => Ok(Box::new(
                data_sources::security_policies::SecurityPoliciesDataSource::new(client),
            )),
            _ => Err(format!("Unknown data source: {}", name).into()),
        }
    }

    fn resource_schemas(&self) -> HashMap<String, ResourceSchema> {
        HashMap::from([
            (
                "twingate_remote_network".to_string(),
                resources::remote_network::RemoteNetworkResource::schema_static(),
            ),
            (
                "twingate_connector".to_string(),
                resources::connector::ConnectorResource::schema_static(),
            ),
            (
                "twingate_connector_tokens".to_string(),
                resources::connector_tokens::ConnectorTokensResource::schema_static(),
            ),
            (
                "twingate_group".to_string(),
                resources::group::GroupResource::schema_static(),
            ),
            (
                "twingate_resource".to_string(),
                resources::resource::ResourceResource::schema_static(),
            ),
            (
                "twingate_service_account".to_string(),
                resources::service_account::ServiceAccountResource::schema_static(),
            ),
            (
                "twingate_service_account_key".to_string(),
                resources::service_account_key::ServiceAccountKeyResource::schema_static(),
            ),
            (
                "twingate_user".to_string(),
                resources::user::UserResource::schema_static(),
            ),
        ])
    }

    fn data_source_schemas(&self) -> HashMap<String, DataSourceSchema> {
        HashMap::from([
            (
                "twingate_remote_network".to_string(),
                data_sources::remote_networks::RemoteNetworkDataSource::schema_static(),
            ),
            (
                "twingate_remote_networks".to_string(),
                data_sources::remote_networks::RemoteNetworksDataSource::schema_static(),
            ),
            (
                "twingate_connector".to_string(),
                data_sources::connectors::ConnectorDataSource::schema_static(),
            ),
            (
                "twingate_connectors".to_string(),
                data_sources::connectors::ConnectorsDataSource::schema_static(),
            ),
            (
                "twingate_group".to_string(),
                data_sources::groups::GroupDataSource::schema_static(),
            ),
            (
                "twingate_groups".to_string(),
                data_sources::groups::GroupsDataSource::schema_static(),
            ),
            (
                "twingate_resource".to_string(),
                data_sources::resources::ResourceDataSource::schema_static(),
            ),
            (
                "twingate_resources".to_string(),
                data_sources::resources::ResourcesDataSource::schema_static(),
            ),
            (
                "twingate_user".to_string(),
                data_sources::users::UserDataSource::schema_static(),
            ),
            (
                "twingate_users".to_string(),
                data_sources::users::UsersDataSource::schema_static(),
            ),
            (
                "twingate_service_accounts".to_string(),
                data_sources::service_accounts::ServiceAccountsDataSource::schema_static(),
            ),
            (
                "twingate_security_policy".to_string(),
                data_sources::security_policies::SecurityPolicyDataSource::schema_static(),
            ),
            (
                "twingate_security_policies".to_string(),
                data_sources::security_policies::SecurityPoliciesDataSource::schema_static(),
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tfplug::types::Config;
    use tfplug::Context;

    fn configure_request(config: Config) -> ConfigureRequest {
        ConfigureRequest {
            context: Context::new(),
            config,
        }
    }

    #[tokio::test]
    #[serial]
    async fn provider_configures_successfully_with_env_vars() {
        std::env::set_var(ENV_NETWORK, "autoco");
        std::env::set_var(ENV_API_TOKEN, "secret-token");

        let mut provider = TwingateProvider::new();
        let response = provider.configure(configure_request(Config::new())).await;

        assert!(response.diagnostics.errors.is_empty());
        assert!(provider.client.is_some());

        std::env::remove_var(ENV_NETWORK);
        std::env::remove_var(ENV_API_TOKEN);
    }

    #[tokio::test]
    #[serial]
    async fn provider_configure_requires_network() {
        std::env::remove_var(ENV_NETWORK);
        std::env::set_var(ENV_API_TOKEN, "secret-token");

        let mut provider = TwingateProvider::new();
        let response = provider.configure(configure_request(Config::new())).await;

        assert!(!response.diagnostics.errors.is_empty());
        assert!(response.diagnostics.errors[0]
            .summary
            .contains("network is required"));

        std::env::remove_var(ENV_API_TOKEN);
    }

    #[tokio::test]
    #[serial]
    async fn provider_configure_requires_api_token() {
        std::env::set_var(ENV_NETWORK, "autoco");
        std::env::remove_var(ENV_API_TOKEN);

        let mut provider = TwingateProvider::new();
        let response = provider.configure(configure_request(Config::new())).await;

        assert!(!response.diagnostics.errors.is_empty());
        assert!(response.diagnostics.errors[0]
            .summary
            .contains("api_token is required"));

        std::env::remove_var(ENV_NETWORK);
    }

    #[tokio::test]
    #[serial]
    async fn provider_prefers_config_over_env_vars() {
        std::env::set_var(ENV_NETWORK, "env-tenant");
        std::env::set_var(ENV_API_TOKEN, "env-token");

        let config = tfplug::StateBuilder::new()
            .string("network", "config-tenant")
            .string("api_token", "config-token")
            .build();

        let mut provider = TwingateProvider::new();
        let response = provider.configure(configure_request(config)).await;

        assert!(response.diagnostics.errors.is_empty());
        assert!(provider.client.is_some());

        std::env::remove_var(ENV_NETWORK);
        std::env::remove_var(ENV_API_TOKEN);
    }

    #[tokio::test]
    async fn provider_fails_to_create_resources_before_configuration() {
        let provider = TwingateProvider::new();

        let resource = provider.create_resource("twingate_remote_network").await;
        assert!(resource.is_err());
        assert!(resource
            .err()
            .unwrap()
            .to_string()
            .contains("Provider not configured"));
    }

    #[tokio::test]
    #[serial]
    async fn provider_creates_known_resources_and_data_sources() {
        std::env::set_var(ENV_NETWORK, "autoco");
        std::env::set_var(ENV_API_TOKEN, "secret-token");

        let mut provider = TwingateProvider::new();
        provider.configure(configure_request(Config::new())).await;

        for name in provider.resource_schemas().keys() {
            assert!(
                provider.create_resource(name).await.is_ok(),
                "factory missing for resource {}",
                name
            );
        }

        for name in provider.data_source_schemas().keys() {
            assert!(
                provider.create_data_source(name).await.is_ok(),
                "factory missing for data source {}",
                name
            );
        }

        assert!(provider.create_resource("unknown_resource").await.is_err());
        assert!(provider
            .create_data_source("unknown_data_source")
            .await
            .is_err());

        std::env::remove_var(ENV_NETWORK);
        std::env::remove_var(ENV_API_TOKEN);
    }

    #[tokio::test]
    async fn provider_schemas_contain_expected_types() {
        let provider = TwingateProvider::new();

        let resource_schemas = provider.resource_schemas();
        assert_eq!(resource_schemas.len(), 8);
        assert!(resource_schemas.contains_key("twingate_resource"));
        assert!(resource_schemas.contains_key("twingate_group"));
        assert!(resource_schemas.contains_key("twingate_connector_tokens"));

        let data_source_schemas = provider.data_source_schemas();
        assert_eq!(data_source_schemas.len(), 13);
        assert!(data_source_schemas.contains_key("twingate_remote_networks"));
        assert!(data_source_schemas.contains_key("twingate_security_policy"));

        let provider_schema = provider.provider_schema();
        assert!(provider_schema.attributes["api_token"].sensitive);
        assert!(provider_schema.attributes.contains_key("http_max_retry"));
    }
}
