//! Remote network operations

use super::{ApiError, Client, Connection, Payload};
use crate::model::RemoteNetwork;
use serde::Deserialize;
use serde_json::json;

const READ_REMOTE_NETWORK: &str = r#"
query ReadRemoteNetwork($id: ID!) {
  remoteNetwork(id: $id) {
    id
    name
    location
  }
}"#;

const READ_REMOTE_NETWORK_BY_NAME: &str = r#"
query ReadRemoteNetworkByName($name: String!) {
  remoteNetworks(filter: {name: {eq: $name}}, first: 1) {
    edges {
      node {
        id
        name
        location
      }
    }
    pageInfo {
      endCursor
      hasNextPage
    }
  }
}"#;

const READ_REMOTE_NETWORKS: &str = r#"
query ReadRemoteNetworks($pageLimit: Int, $cursor: String) {
  remoteNetworks(first: $pageLimit, after: $cursor) {
    edges {
      node {
        id
        name
        location
      }
    }
    pageInfo {
      endCursor
      hasNextPage
    }
  }
}"#;

const CREATE_REMOTE_NETWORK: &str = r#"
mutation CreateRemoteNetwork($name: String!, $location: RemoteNetworkLocation) {
  remoteNetworkCreate(name: $name, location: $location) {
    ok
    error
    entity {
      id
      name
      location
    }
  }
}"#;

const UPDATE_REMOTE_NETWORK: &str = r#"
mutation UpdateRemoteNetwork($id: ID!, $name: String, $location: RemoteNetworkLocation) {
  remoteNetworkUpdate(id: $id, name: $name, location: $location) {
    ok
    error
    entity {
      id
      name
      location
    }
  }
}"#;

const DELETE_REMOTE_NETWORK: &str = r#"
mutation DeleteRemoteNetwork($id: ID!) {
  remoteNetworkDelete(id: $id) {
    ok
    error
  }
}"#;

#[derive(Debug, Deserialize)]
struct GqlRemoteNetwork {
    id: String,
    name: String,
    location: String,
}

impl From<GqlRemoteNetwork> for RemoteNetwork {
    fn from(gql: GqlRemoteNetwork) -> Self {
        Self {
            id: gql.id,
            name: gql.name,
            location: gql.location,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReadData {
    #[serde(rename = "remoteNetwork")]
    remote_network: Option<GqlRemoteNetwork>,
}

#[derive(Debug, Deserialize)]
struct ListData {
    #[serde(rename = "remoteNetworks")]
    remote_networks: Connection<GqlRemoteNetwork>,
}

#[derive(Debug, Deserialize)]
struct CreateData {
    #[serde(rename = "remoteNetworkCreate")]
    payload: Payload<GqlRemoteNetwork>,
}

#[derive(Debug, Deserialize)]
struct UpdateData {
    #[serde(rename = "remoteNetworkUpdate")]
    payload: Payload<GqlRemoteNetwork>,
}

#[derive(Debug, Deserialize)]
struct DeleteData {
    #[serde(rename = "remoteNetworkDelete")]
    payload: Payload<GqlRemoteNetwork>,
}

impl Client {
    pub async fn create_remote_network(
        &self,
        name: &str,
        location: &str,
    ) -> Result<RemoteNetwork, ApiError> {
        let data: CreateData = self
            .execute(
                "CreateRemoteNetwork",
                CREATE_REMOTE_NETWORK,
                json!({"name": name, "location": location}),
            )
            .await?;

        data.payload
            .into_entity("remoteNetworkCreate")
            .map(Into::into)
    }

    pub async fn read_remote_network(&self, id: &str) -> Result<Option<RemoteNetwork>, ApiError> {
        let data: ReadData = self
            .execute("ReadRemoteNetwork", READ_REMOTE_NETWORK, json!({"id": id}))
            .await?;

        Ok(data.remote_network.map(Into::into))
    }

    pub async fn read_remote_network_by_name(
        &self,
        name: &str,
    ) -> Result<Option<RemoteNetwork>, ApiError> {
        let data: ListData = self
            .execute(
                "ReadRemoteNetworkByName",
                READ_REMOTE_NETWORK_BY_NAME,
                json!({"name": name}),
            )
            .await?;

        Ok(data
            .remote_networks
            .nodes()
            .into_iter()
            .next()
            .map(Into::into))
    }

    pub async fn read_remote_networks(&self) -> Result<Vec<RemoteNetwork>, ApiError> {
        let mut all = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let data: ListData = self
                .execute(
                    "ReadRemoteNetworks",
                    READ_REMOTE_NETWORKS,
                    json!({"pageLimit": self.page_limit(), "cursor": cursor}),
                )
                .await?;

            let connection = data.remote_networks;
            let has_next = connection.page_info.has_next_page;
            cursor = connection.page_info.end_cursor.clone();

            all.extend(connection.nodes().into_iter().map(RemoteNetwork::from));

            if !has_next {
                break;
            }
        }

        Ok(all)
    }

    pub async fn update_remote_network(
        &self,
        id: &str,
        name: &str,
        location: &str,
    ) -> Result<RemoteNetwork, ApiError> {
        let data: UpdateData = self
            .execute(
                "UpdateRemoteNetwork",
                UPDATE_REMOTE_NETWORK,
                json!({"id": id, "name": name, "location": location}),
            )
            .await?;

        data.payload
            .into_entity("remoteNetworkUpdate")
            .map(Into::into)
    }

    pub async fn delete_remote_network(&self, id: &str) -> Result<(), ApiError> {
        let data: DeleteData = self
            .execute(
                "DeleteRemoteNetwork",
                DELETE_REMOTE_NETWORK,
                json!({"id": id}),
            )
            .await?;

        data.payload.check("remoteNetworkDelete").map(|_| ())
    }
}
