//! Connector and connector token operations

use super::{ApiError, Client, Connection, Payload};
use crate::model::{Connector, ConnectorTokens};
use serde::Deserialize;
use serde_json::json;

const READ_CONNECTOR: &str = r#"
query ReadConnector($id: ID!) {
  connector(id: $id) {
    id
    name
    remoteNetwork {
      id
    }
    hasStatusNotificationsEnabled
  }
}"#;

const READ_CONNECTORS: &str = r#"
query ReadConnectors($pageLimit: Int, $cursor: String) {
  connectors(first: $pageLimit, after: $cursor) {
    edges {
      node {
        id
        name
        remoteNetwork {
          id
        }
        hasStatusNotificationsEnabled
      }
    }
    pageInfo {
      endCursor
      hasNextPage
    }
  }
}"#;

const CREATE_CONNECTOR: &str = r#"
mutation CreateConnector($remoteNetworkId: ID!, $name: String, $hasStatusNotificationsEnabled: Boolean) {
  connectorCreate(remoteNetworkId: $remoteNetworkId, name: $name, hasStatusNotificationsEnabled: $hasStatusNotificationsEnabled) {
    ok
    error
    entity {
      id
      name
      remoteNetwork {
        id
      }
      hasStatusNotificationsEnabled
    }
  }
}"#;

const UPDATE_CONNECTOR: &str = r#"
mutation UpdateConnector($id: ID!, $name: String, $hasStatusNotificationsEnabled: Boolean) {
  connectorUpdate(id: $id, name: $name, hasStatusNotificationsEnabled: $hasStatusNotificationsEnabled) {
    ok
    error
    entity {
      id
      name
      remoteNetwork {
        id
      }
      hasStatusNotificationsEnabled
    }
  }
}"#;

const DELETE_CONNECTOR: &str = r#"
mutation DeleteConnector($id: ID!) {
  connectorDelete(id: $id) {
    ok
    error
  }
}"#;

const GENERATE_CONNECTOR_TOKENS: &str = r#"
mutation GenerateConnectorTokens($connectorId: ID!) {
  connectorGenerateTokens(connectorId: $connectorId) {
    ok
    error
    connectorTokens {
      accessToken
      refreshToken
    }
  }
}"#;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GqlConnector {
    id: String,
    name: String,
    remote_network: GqlRemoteNetworkId,
    has_status_notifications_enabled: bool,
}

#[derive(Debug, Deserialize)]
struct GqlRemoteNetworkId {
    id: String,
}

impl From<GqlConnector> for Connector {
    fn from(gql: GqlConnector) -> Self {
        Self {
            id: gql.id,
            name: gql.name,
            remote_network_id: gql.remote_network.id,
            status_updates_enabled: gql.has_status_notifications_enabled,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReadData {
    connector: Option<GqlConnector>,
}

#[derive(Debug, Deserialize)]
struct ListData {
    connectors: Connection<GqlConnector>,
}

#[derive(Debug, Deserialize)]
struct CreateData {
    #[serde(rename = "connectorCreate")]
    payload: Payload<GqlConnector>,
}

#[derive(Debug, Deserialize)]
struct UpdateData {
    #[serde(rename = "connectorUpdate")]
    payload: Payload<GqlConnector>,
}

#[derive(Debug, Deserialize)]
struct DeleteData {
    #[serde(rename = "connectorDelete")]
    payload: Payload<GqlConnector>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GqlConnectorTokens {
    access_token: String,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokensPayload {
    ok: bool,
    error: Option<String>,
    connector_tokens: Option<GqlConnectorTokens>,
}

#[derive(Debug, Deserialize)]
struct TokensData {
    #[serde(rename = "connectorGenerateTokens")]
    payload: TokensPayload,
}

impl Client {
    pub async fn create_connector(
        &self,
        remote_network_id: &str,
        name: Option<&str>,
        status_updates_enabled: Option<bool>,
    ) -> Result<Connector, ApiError> {
        let data: CreateData = self
            .execute(
                "CreateConnector",
                CREATE_CONNECTOR,
                json!({
                    "remoteNetworkId": remote_network_id,
                    "name": name,
                    "hasStatusNotificationsEnabled": status_updates_enabled,
                }),
            )
            .await?;

        data.payload.into_entity("connectorCreate").map(Into::into)
    }

    pub async fn read_connector(&self, id: &str) -> Result<Option<Connector>, ApiError> {
        let data: ReadData = self
            .execute("ReadConnector", READ_CONNECTOR, json!({"id": id}))
            .await?;

        Ok(data.connector.map(Into::into))
    }

    pub async fn read_connectors(&self) -> Result<Vec<Connector>, ApiError> {
        let mut all = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let data: ListData = self
                .execute(
                    "ReadConnectors",
                    READ_CONNECTORS,
                    json!({"pageLimit": self.page_limit(), "cursor": cursor}),
                )
                .await?;

            let connection = data.connectors;
            let has_next = connection.page_info.has_next_page;
            cursor = connection.page_info.end_cursor.clone();

            all.extend(connection.nodes().into_iter().map(Connector::from));

            if !has_next {
                break;
            }
        }

        Ok(all)
    }

    pub async fn update_connector(
        &self,
        id: &str,
        name: Option<&str>,
        status_updates_enabled: Option<bool>,
    ) -> Result<Connector, ApiError> {
        let data: UpdateData = self
            .execute(
                "UpdateConnector",
                UPDATE_CONNECTOR,
                json!({
                    "id": id,
                    "name": name,
                    "hasStatusNotificationsEnabled": status_updates_enabled,
                }),
            )
            .await?;

        data.payload.into_entity("connectorUpdate").map(Into::into)
    }

    pub async fn delete_connector(&self, id: &str) -> Result<(), ApiError> {
        let data: DeleteData = self
            .execute("DeleteConnector", DELETE_CONNECTOR, json!({"id": id}))
            .await?;

        data.payload.check("connectorDelete").map(|_| ())
    }

    pub async fn generate_connector_tokens(
        &self,
        connector_id: &str,
    ) -> Result<ConnectorTokens, ApiError> {
        let data: TokensData = self
            .execute(
                "GenerateConnectorTokens",
                GENERATE_CONNECTOR_TOKENS,
                json!({"connectorId": connector_id}),
            )
            .await?;

        if !data.payload.ok {
            return Err(ApiError::Graphql {
                operation: "connectorGenerateTokens".to_string(),
                message: data
                    .payload
                    .error
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        let tokens = data.payload.connector_tokens.ok_or_else(|| ApiError::Parse {
            operation: "connectorGenerateTokens".to_string(),
            message: "mutation returned no tokens".to_string(),
        })?;

        Ok(ConnectorTokens {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        })
    }
}
