//! twingate_service_accounts

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

fn service_account_object_type() -> AttributeType {
    AttributeType::Object(HashMap::from([
        ("id".to_string(), AttributeType::String),
        ("name".to_string(), AttributeType::String),
    ]))
}

fn service_account_to_dynamic(account: &model::ServiceAccount) -> Dynamic {
    Dynamic::Map(HashMap::from([
        ("id".to_string(), Dynamic::String(account.id.clone())),
        ("name".to_string(), Dynamic::String(account.name.clone())),
    ]))
}

pub struct ServiceAccountsDataSource {
    client: Client,
}

impl ServiceAccountsDataSource {
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
                    .description("Return only Service Accounts that exactly match this name"),
            )
            .attribute(
                "service_accounts",
                AttributeBuilder::list("service_accounts", service_account_object_type())
                    .computed()
                    .description("List of Service Accounts matching the filter"),
            )
            .build_data_source(0)
    }
}

#[async_trait]
impl DataSource for ServiceAccountsDataSource {
    async fn schema(&self, _request: SchemaRequest) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: Diagnostics::new(),
        }
    }

    async fn read(&self, request: ReadRequest) -> ReadResponse {
        let mut diagnostics = Diagnostics::new();

        let name = request.current_state.get_string("name");

        match self.client.read_service_accounts(name.as_deref()).await {
            Ok(accounts) => {
                let id = match &name {
                    Some(name) => format!("service-accounts-by-name-{}", name),
                    None => "all-service-accounts".to_string(),
                };

                let mut builder = StateBuilder::new().string("id", id).list(
                    "service_accounts",
                    accounts.iter().map(service_account_to_dynamic).collect(),
                );

                if let Some(name) = &name {
                    builder = builder.string("name", name);
                }

                ReadResponse {
                    state: Some(builder.build()),
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.add_error(
                    "Failed to read twingate_service_accounts",
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
    use tfplug::Context;

    #[tokio::test]
    async fn listing_filters_by_name() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/graphql/")
            .with_body(
                r#"{"data":{"serviceAccounts":{"edges":[{"node":{"id":"sa1","name":"ci"}}],"pageInfo":{"endCursor":null,"hasNextPage":false}}}}"#,
            )
            .create_async()
            .await;

        let data_source = ServiceAccountsDataSource::new(test_client(&server.url()));
        let config = StateBuilder::new().string("name", "ci").build();

        let response = data_source
            .read(ReadRequest {
                context: Context::new(),
                current_state: config,
            })
            .await;

        let state = response.state.unwrap();
        assert_eq!(
            state.get_string("id").unwrap(),
            "service-accounts-by-name-ci"
        );
        assert_eq!(state.get_list("service_accounts").unwrap().len(), 1);
    }
}
