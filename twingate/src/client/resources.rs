//! Resource operations: protocol restrictions and access membership

use super::{ApiError, Client, Connection, IdName, Payload};
use crate::model::{PortRange, Protocol, Protocols, Resource};
use serde::Deserialize;
use serde_json::json;

const READ_RESOURCE: &str = r#"
query ReadResource($id: ID!, $pageLimit: Int) {
  resource(id: $id) {
    id
    name
    address {
      value
    }
    remoteNetwork {
      id
    }
    protocols {
      allowIcmp
      tcp {
        policy
        ports {
          start
          end
        }
      }
      udp {
        policy
        ports {
          start
          end
        }
      }
    }
    isActive
    isVisible
    isBrowserShortcutEnabled
    alias
    securityPolicy {
      id
    }
    groups(first: $pageLimit) {
      edges {
        node {
          id
        }
      }
      pageInfo {
        endCursor
        hasNextPage
      }
    }
    serviceAccounts(first: $pageLimit) {
      edges {
        node {
          id
        }
      }
      pageInfo {
        endCursor
        hasNextPage
      }
    }
  }
}"#;

const READ_RESOURCE_GROUPS: &str = r#"
query ReadResourceGroups($id: ID!, $pageLimit: Int, $cursor: String) {
  resource(id: $id) {
    groups(first: $pageLimit, after: $cursor) {
      edges {
        node {
          id
        }
      }
      pageInfo {
        endCursor
        hasNextPage
      }
    }
  }
}"#;

const READ_RESOURCE_SERVICE_ACCOUNTS: &str = r#"
query ReadResourceServiceAccounts($id: ID!, $pageLimit: Int, $cursor: String) {
  resource(id: $id) {
    serviceAccounts(first: $pageLimit, after: $cursor) {
      edges {
        node {
          id
        }
      }
      pageInfo {
        endCursor
        hasNextPage
      }
    }
  }
}"#;

const READ_RESOURCES: &str = r#"
query ReadResources($filter: ResourceFilterInput, $pageLimit: Int, $cursor: String) {
  resources(filter: $filter, first: $pageLimit, after: $cursor) {
    edges {
      node {
        id
        name
        address {
          value
        }
        remoteNetwork {
          id
        }
        protocols {
          allowIcmp
          tcp {
            policy
            ports {
              start
              end
            }
          }
          udp {
            policy
            ports {
              start
              end
            }
          }
        }
        isActive
        isVisible
        isBrowserShortcutEnabled
        alias
        securityPolicy {
          id
        }
      }
    }
    pageInfo {
      endCursor
      hasNextPage
    }
  }
}"#;

const CREATE_RESOURCE: &str = r#"
mutation CreateResource($name: String!, $address: String!, $remoteNetworkId: ID!, $protocols: ProtocolsInput, $groupIds: [ID], $serviceAccountIds: [ID], $isVisible: Boolean, $isBrowserShortcutEnabled: Boolean, $alias: String, $securityPolicyId: ID) {
  resourceCreate(name: $name, address: $address, remoteNetworkId: $remoteNetworkId, protocols: $protocols, groupIds: $groupIds, serviceAccountIds: $serviceAccountIds, isVisible: $isVisible, isBrowserShortcutEnabled: $isBrowserShortcutEnabled, alias: $alias, securityPolicyId: $securityPolicyId) {
    ok
    error
    entity {
      id
      name
      address {
        value
      }
      remoteNetwork {
        id
      }
      isActive
      isVisible
      isBrowserShortcutEnabled
      alias
      securityPolicy {
        id
      }
    }
  }
}"#;

const UPDATE_RESOURCE: &str = r#"
mutation UpdateResource($id: ID!, $name: String, $address: String, $remoteNetworkId: ID, $protocols: ProtocolsInput, $isActive: Boolean, $isVisible: Boolean, $isBrowserShortcutEnabled: Boolean, $alias: String, $securityPolicyId: ID, $addedGroupIds: [ID], $removedGroupIds: [ID], $addedServiceAccountIds: [ID], $removedServiceAccountIds: [ID]) {
  resourceUpdate(id: $id, name: $name, address: $address, remoteNetworkId: $remoteNetworkId, protocols: $protocols, isActive: $isActive, isVisible: $isVisible, isBrowserShortcutEnabled: $isBrowserShortcutEnabled, alias: $alias, securityPolicyId: $securityPolicyId, addedGroupIds: $addedGroupIds, removedGroupIds: $removedGroupIds, addedServiceAccountIds: $addedServiceAccountIds, removedServiceAccountIds: $removedServiceAccountIds) {
    ok
    error
  }
}"#;

const UPDATE_RESOURCE_ACTIVE_STATE: &str = r#"
mutation UpdateResourceActiveState($id: ID!, $isActive: Boolean!) {
  resourceUpdate(id: $id, isActive: $isActive) {
    ok
    error
  }
}"#;

const DELETE_RESOURCE: &str = r#"
mutation DeleteResource($id: ID!) {
  resourceDelete(id: $id) {
    ok
    error
  }
}"#;

/// Input for resource create/update mutations
#[derive(Debug, Clone)]
pub struct ResourceInput {
    pub name: String,
    pub address: String,
    pub remote_network_id: String,
    pub protocols: Protocols,
    pub group_ids: Vec<String>,
    pub service_account_ids: Vec<String>,
    pub is_visible: Option<bool>,
    pub is_browser_shortcut_enabled: Option<bool>,
    pub alias: Option<String>,
    pub security_policy_id: Option<String>,
}

fn protocol_input(protocol: &Protocol) -> serde_json::Value {
    json!({
        "policy": protocol.api_policy(),
        "ports": protocol
            .ports
            .iter()
            .map(|range| json!({"start": range.start, "end": range.end}))
            .collect::<Vec<_>>(),
    })
}

fn protocols_input(protocols: &Protocols) -> serde_json::Value {
    json!({
        "allowIcmp": protocols.allow_icmp,
        "tcp": protocol_input(&protocols.tcp),
        "udp": protocol_input(&protocols.udp),
    })
}

#[derive(Debug, Deserialize)]
struct GqlId {
    id: String,
}

#[derive(Debug, Deserialize)]
struct GqlAddress {
    value: String,
}

#[derive(Debug, Deserialize)]
struct GqlPortRange {
    start: i64,
    end: i64,
}

#[derive(Debug, Deserialize)]
struct GqlProtocol {
    policy: String,
    ports: Vec<GqlPortRange>,
}

impl From<GqlProtocol> for Protocol {
    fn from(gql: GqlProtocol) -> Self {
        Protocol::from_api(
            gql.policy,
            gql.ports
                .into_iter()
                .map(|range| PortRange {
                    start: range.start,
                    end: range.end,
                })
                .collect(),
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GqlProtocols {
    allow_icmp: bool,
    tcp: GqlProtocol,
    udp: GqlProtocol,
}

impl From<GqlProtocols> for Protocols {
    fn from(gql: GqlProtocols) -> Self {
        Self {
            allow_icmp: gql.allow_icmp,
            tcp: gql.tcp.into(),
            udp: gql.udp.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GqlResource {
    id: String,
    name: String,
    address: GqlAddress,
    remote_network: GqlId,
    #[serde(default)]
    protocols: Option<GqlProtocols>,
    #[serde(default)]
    is_active: Option<bool>,
    is_visible: bool,
    is_browser_shortcut_enabled: bool,
    alias: Option<String>,
    security_policy: Option<GqlId>,
    #[serde(default)]
    groups: Option<Connection<GqlId>>,
    #[serde(default)]
    service_accounts: Option<Connection<GqlId>>,
}

impl GqlResource {
    fn into_model(self, group_ids: Vec<String>, service_account_ids: Vec<String>) -> Resource {
        Resource {
            id: self.id,
            name: self.name,
            address: self.address.value,
            remote_network_id: self.remote_network.id,
            protocols: self.protocols.map(Into::into).unwrap_or_default(),
            group_ids,
            service_account_ids,
            is_active: self.is_active.unwrap_or(true),
            is_visible: self.is_visible,
            is_browser_shortcut_enabled: self.is_browser_shortcut_enabled,
            alias: self.alias,
            security_policy_id: self.security_policy.map(|policy| policy.id),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReadData {
    resource: Option<GqlResource>,
}

#[derive(Debug, Deserialize)]
struct ListData {
    resources: Connection<GqlResource>,
}

#[derive(Debug, Deserialize)]
struct GqlResourceGroups {
    groups: Connection<GqlId>,
}

#[derive(Debug, Deserialize)]
struct ReadGroupsData {
    resource: Option<GqlResourceGroups>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GqlResourceServiceAccounts {
    service_accounts: Connection<GqlId>,
}

#[derive(Debug, Deserialize)]
struct ReadServiceAccountsData {
    resource: Option<GqlResourceServiceAccounts>,
}

#[derive(Debug, Deserialize)]
struct CreateData {
    #[serde(rename = "resourceCreate")]
    payload: Payload<GqlResource>,
}

#[derive(Debug, Deserialize)]
struct UpdateData {
    #[serde(rename = "resourceUpdate")]
    payload: Payload<IdName>,
}

#[derive(Debug, Deserialize)]
struct DeleteData {
    #[serde(rename = "resourceDelete")]
    payload: Payload<IdName>,
}

impl Client {
    pub async fn create_resource(&self, input: &ResourceInput) -> Result<Resource, ApiError> {
        let data: CreateData = self
            .execute(
                "CreateResource",
                CREATE_RESOURCE,
                json!({
                    "name": input.name,
                    "address": input.address,
                    "remoteNetworkId": input.remote_network_id,
                    "protocols": protocols_input(&input.protocols),
                    "groupIds": input.group_ids,
                    "serviceAccountIds": input.service_account_ids,
                    "isVisible": input.is_visible,
                    "isBrowserShortcutEnabled": input.is_browser_shortcut_enabled,
                    "alias": input.alias,
                    "securityPolicyId": input.security_policy_id,
                }),
            )
            .await?;

        let entity = data.payload.into_entity("resourceCreate")?;
        let mut resource =
            entity.into_model(input.group_ids.clone(), input.service_account_ids.clone());
        // The create payload omits protocols; they are exactly what was sent
        resource.protocols = input.protocols.clone();

        Ok(resource)
    }

    /// Read a resource and drain both access membership connections
    pub async fn read_resource(&self, id: &str) -> Result<Option<Resource>, ApiError> {
        let data: ReadData = self
            .execute(
                "ReadResource",
                READ_RESOURCE,
                json!({"id": id, "pageLimit": self.page_limit()}),
            )
            .await?;

        let Some(mut resource) = data.resource else {
            return Ok(None);
        };

        let group_ids = self
            .drain_resource_groups(id, resource.groups.take())
            .await?;
        let service_account_ids = self
            .drain_resource_service_accounts(id, resource.service_accounts.take())
            .await?;

        Ok(Some(resource.into_model(group_ids, service_account_ids)))
    }

    pub async fn read_resources(&self, name: Option<&str>) -> Result<Vec<Resource>, ApiError> {
        let filter = match name {
            Some(name) => json!({"name": {"eq": name}}),
            None => serde_json::Value::Null,
        };

        let mut all = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let data: ListData = self
                .execute(
                    "ReadResources",
                    READ_RESOURCES,
                    json!({
                        "filter": filter,
                        "pageLimit": self.page_limit(),
                        "cursor": cursor,
                    }),
                )
                .await?;

            let connection = data.resources;
            let has_next = connection.page_info.has_next_page;
            cursor = connection.page_info.end_cursor.clone();

            all.extend(
                connection
                    .nodes()
                    .into_iter()
                    .map(|resource| resource.into_model(Vec::new(), Vec::new())),
            );

            if !has_next {
                break;
            }
        }

        Ok(all)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update_resource(
        &self,
        id: &str,
        input: &ResourceInput,
        is_active: bool,
        added_group_ids: &[String],
        removed_group_ids: &[String],
        added_service_account_ids: &[String],
        removed_service_account_ids: &[String],
    ) -> Result<(), ApiError> {
        let data: UpdateData = self
            .execute(
                "UpdateResource",
                UPDATE_RESOURCE,
                json!({
                    "id": id,
                    "name": input.name,
                    "address": input.address,
                    "remoteNetworkId": input.remote_network_id,
                    "protocols": protocols_input(&input.protocols),
                    "isActive": is_active,
                    "isVisible": input.is_visible,
                    "isBrowserShortcutEnabled": input.is_browser_shortcut_enabled,
                    "alias": input.alias,
                    "securityPolicyId": input.security_policy_id,
                    "addedGroupIds": added_group_ids,
                    "removedGroupIds": removed_group_ids,
                    "addedServiceAccountIds": added_service_account_ids,
                    "removedServiceAccountIds": removed_service_account_ids,
                }),
            )
            .await?;

        data.payload.check("resourceUpdate").map(|_| ())
    }

    pub async fn update_resource_active_state(
        &self,
        id: &str,
        is_active: bool,
    ) -> Result<(), ApiError> {
        let data: UpdateData = self
            .execute(
                "UpdateResourceActiveState",
                UPDATE_RESOURCE_ACTIVE_STATE,
                json!({"id": id, "isActive": is_active}),
            )
            .await?;

        data.payload.check("resourceUpdate").map(|_| ())
    }

    pub async fn delete_resource(&self, id: &str) -> Result<(), ApiError> {
        let data: DeleteData = self
            .execute("DeleteResource", DELETE_RESOURCE, json!({"id": id}))
            .await?;

        data.payload.check("resourceDelete").map(|_| ())
    }

    async fn drain_resource_groups(
        &self,
        id: &str,
        first_page: Option<Connection<GqlId>>,
    ) -> Result<Vec<String>, ApiError> {
        let mut ids = Vec::new();
        let mut cursor = None;
        let mut has_next = false;

        if let Some(connection) = first_page {
            has_next = connection.page_info.has_next_page;
            cursor = connection.page_info.end_cursor.clone();
            ids.extend(connection.nodes().into_iter().map(|node| node.id));
        }

        while has_next {
            let page: ReadGroupsData = self
                .execute(
                    "ReadResourceGroups",
                    READ_RESOURCE_GROUPS,
                    json!({"id": id, "pageLimit": self.page_limit(), "cursor": cursor}),
                )
                .await?;

            let Some(groups) = page.resource else {
                break;
            };

            has_next = groups.groups.page_info.has_next_page;
            cursor = groups.groups.page_info.end_cursor.clone();
            ids.extend(groups.groups.nodes().into_iter().map(|node| node.id));
        }

        Ok(ids)
    }

    async fn drain_resource_service_accounts(
        &self,
        id: &str,
        first_page: Option<Connection<GqlId>>,
    ) -> Result<Vec<String>, ApiError> {
        let mut ids = Vec::new();
        let mut cursor = None;
        let mut has_next = false;

        if let Some(connection) = first_page {
            has_next = connection.page_info.has_next_page;
            cursor = connection.page_info.end_cursor.clone();
            ids.extend(connection.nodes().into_iter().map(|node| node.id));
        }

        while has_next {
            let page: ReadServiceAccountsData = self
                .execute(
                    "ReadResourceServiceAccounts",
                    READ_RESOURCE_SERVICE_ACCOUNTS,
                    json!({"id": id, "pageLimit": self.page_limit(), "cursor": cursor}),
                )
                .await?;

            let Some(accounts) = page.resource else {
                break;
            };

            has_next = accounts.service_accounts.page_info.has_next_page;
            cursor = accounts.service_accounts.page_info.end_cursor.clone();
            ids.extend(
                accounts
                    .service_accounts
                    .nodes()
                    .into_iter()
                    .map(|node| node.id),
            );
        }

        Ok(ids)
    }
}
