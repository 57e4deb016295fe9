//! Service account and service account key operations

use super::{ApiError, Client, Connection, IdName, Payload};
use crate::model::{ServiceAccount, ServiceAccountKey};
use serde::Deserialize;
use serde_json::json;

const KEY_STATUS_ACTIVE: &str = "ACTIVE";

const READ_SERVICE_ACCOUNT: &str = r#"
query ReadServiceAccount($id: ID!) {
  serviceAccount(id: $id) {
    id
    name
  }
}"#;

const READ_SERVICE_ACCOUNTS: &str = r#"
query ReadServiceAccounts($filter: ServiceAccountFilterInput, $pageLimit: Int, $cursor: String) {
  serviceAccounts(filter: $filter, first: $pageLimit, after: $cursor) {
    edges {
      node {
        id
        name
      }
    }
    pageInfo {
      endCursor
      hasNextPage
    }
  }
}"#;

const CREATE_SERVICE_ACCOUNT: &str = r#"
mutation CreateServiceAccount($name: String!) {
  serviceAccountCreate(name: $name) {
    ok
    error
    entity {
      id
      name
    }
  }
}"#;

const UPDATE_SERVICE_ACCOUNT: &str = r#"
mutation UpdateServiceAccount($id: ID!, $name: String!) {
  serviceAccountUpdate(id: $id, name: $name) {
    ok
    error
    entity {
      id
      name
    }
  }
}"#;

const DELETE_SERVICE_ACCOUNT: &str = r#"
mutation DeleteServiceAccount($id: ID!) {
  serviceAccountDelete(id: $id) {
    ok
    error
  }
}"#;

const CREATE_SERVICE_ACCOUNT_KEY: &str = r#"
mutation CreateServiceAccountKey($serviceAccountId: ID!, $name: String, $expirationTime: Int) {
  serviceAccountKeyCreate(serviceAccountId: $serviceAccountId, name: $name, expirationTime: $expirationTime) {
    ok
    error
    token
    entity {
      id
      name
      serviceAccount {
        id
      }
      expirationTime
      status
    }
  }
}"#;

const READ_SERVICE_ACCOUNT_KEY: &str = r#"
query ReadServiceAccountKey($id: ID!) {
  serviceAccountKey(id: $id) {
    id
    name
    serviceAccount {
      id
    }
    expirationTime
    status
  }
}"#;

const UPDATE_SERVICE_ACCOUNT_KEY: &str = r#"
mutation UpdateServiceAccountKey($id: ID!, $name: String!) {
  serviceAccountKeyUpdate(id: $id, name: $name) {
    ok
    error
    entity {
      id
      name
      serviceAccount {
        id
      }
      expirationTime
      status
    }
  }
}"#;

const REVOKE_SERVICE_ACCOUNT_KEY: &str = r#"
mutation RevokeServiceAccountKey($id: ID!) {
  serviceAccountKeyRevoke(id: $id) {
    ok
    error
  }
}"#;

const DELETE_SERVICE_ACCOUNT_KEY: &str = r#"
mutation DeleteServiceAccountKey($id: ID!) {
  serviceAccountKeyDelete(id: $id) {
    ok
    error
  }
}"#;

#[derive(Debug, Deserialize)]
struct GqlId {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GqlServiceAccountKey {
    id: String,
    name: String,
    service_account: GqlId,
    expiration_time: i64,
    status: String,
}

impl From<GqlServiceAccountKey> for ServiceAccountKey {
    fn from(gql: GqlServiceAccountKey) -> Self {
        Self {
            id: gql.id,
            name: gql.name,
            service_account_id: gql.service_account.id,
            expiration_time: gql.expiration_time,
            is_active: gql.status == KEY_STATUS_ACTIVE,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReadData {
    #[serde(rename = "serviceAccount")]
    service_account: Option<IdName>,
}

#[derive(Debug, Deserialize)]
struct ListData {
    #[serde(rename = "serviceAccounts")]
    service_accounts: Connection<IdName>,
}

#[derive(Debug, Deserialize)]
struct CreateData {
    #[serde(rename = "serviceAccountCreate")]
    payload: Payload<IdName>,
}

#[derive(Debug, Deserialize)]
struct UpdateData {
    #[serde(rename = "serviceAccountUpdate")]
    payload: Payload<IdName>,
}

#[derive(Debug, Deserialize)]
struct DeleteData {
    #[serde(rename = "serviceAccountDelete")]
    payload: Payload<IdName>,
}

#[derive(Debug, Deserialize)]
struct KeyCreatePayload {
    ok: bool,
    error: Option<String>,
    token: Option<String>,
    entity: Option<GqlServiceAccountKey>,
}

#[derive(Debug, Deserialize)]
struct KeyCreateData {
    #[serde(rename = "serviceAccountKeyCreate")]
    payload: KeyCreatePayload,
}

#[derive(Debug, Deserialize)]
struct KeyReadData {
    #[serde(rename = "serviceAccountKey")]
    service_account_key: Option<GqlServiceAccountKey>,
}

#[derive(Debug, Deserialize)]
struct KeyUpdateData {
    #[serde(rename = "serviceAccountKeyUpdate")]
    payload: Payload<GqlServiceAccountKey>,
}

#[derive(Debug, Deserialize)]
struct KeyRevokeData {
    #[serde(rename = "serviceAccountKeyRevoke")]
    payload: Payload<GqlServiceAccountKey>,
}

#[derive(Debug, Deserialize)]
struct KeyDeleteData {
    #[serde(rename = "serviceAccountKeyDelete")]
    payload: Payload<GqlServiceAccountKey>,
}

impl From<IdName> for ServiceAccount {
    fn from(id_name: IdName) -> Self {
        Self {
            id: id_name.id,
            name: id_name.name,
        }
    }
}

impl Client {
    pub async fn create_service_account(&self, name: &str) -> Result<ServiceAccount, ApiError> {
        let data: CreateData = self
            .execute(
                "CreateServiceAccount",
                CREATE_SERVICE_ACCOUNT,
                json!({"name": name}),
            )
            .await?;

        data.payload
            .into_entity("serviceAccountCreate")
            .map(Into::into)
    }

    pub async fn read_service_account(&self, id: &str) -> Result<Option<ServiceAccount>, ApiError> {
        let data: ReadData = self
            .execute(
                "ReadServiceAccount",
                READ_SERVICE_ACCOUNT,
                json!({"id": id}),
            )
            .await?;

        Ok(data.service_account.map(Into::into))
    }

    pub async fn read_service_accounts(
        &self,
        name: Option<&str>,
    ) -> Result<Vec<ServiceAccount>, ApiError> {
        let filter = match name {
            Some(name) => json!({"name": {"eq": name}}),
            None => serde_json::Value::Null,
        };

        let mut all = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let data: ListData = self
                .execute(
                    "ReadServiceAccounts",
                    READ_SERVICE_ACCOUNTS,
                    json!({
                        "filter": filter,
                        "pageLimit": self.page_limit(),
                        "cursor": cursor,
                    }),
                )
                .await?;

            let connection = data.service_accounts;
            let has_next = connection.page_info.has_next_page;
            cursor = connection.page_info.end_cursor.clone();

            all.extend(connection.nodes().into_iter().map(ServiceAccount::from));

            if !has_next {
                break;
            }
        }

        Ok(all)
    }

    pub async fn update_service_account(
        &self,
        id: &str,
        name: &str,
    ) -> Result<ServiceAccount, ApiError> {
        let data: UpdateData = self
            .execute(
                "UpdateServiceAccount",
                UPDATE_SERVICE_ACCOUNT,
                json!({"id": id, "name": name}),
            )
            .await?;

        data.payload
            .into_entity("serviceAccountUpdate")
            .map(Into::into)
    }

    pub async fn delete_service_account(&self, id: &str) -> Result<(), ApiError> {
        let data: DeleteData = self
            .execute(
                "DeleteServiceAccount",
                DELETE_SERVICE_ACCOUNT,
                json!({"id": id}),
            )
            .await?;

        data.payload.check("serviceAccountDelete").map(|_| ())
    }

    /// Create a key; the bearer token is only returned by this mutation
    pub async fn create_service_account_key(
        &self,
        service_account_id: &str,
        name: Option<&str>,
        expiration_time: i64,
    ) -> Result<(ServiceAccountKey, String), ApiError> {
        let data: KeyCreateData = self
            .execute(
                "CreateServiceAccountKey",
                CREATE_SERVICE_ACCOUNT_KEY,
                json!({
                    "serviceAccountId": service_account_id,
                    "name": name,
                    "expirationTime": expiration_time,
                }),
            )
            .await?;

        let payload = data.payload;
        if !payload.ok {
            return Err(ApiError::Graphql {
                operation: "serviceAccountKeyCreate".to_string(),
                message: payload.error.unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        let entity = payload.entity.ok_or_else(|| ApiError::Parse {
            operation: "serviceAccountKeyCreate".to_string(),
            message: "mutation returned no entity".to_string(),
        })?;
        let token = payload.token.ok_or_else(|| ApiError::Parse {
            operation: "serviceAccountKeyCreate".to_string(),
            message: "mutation returned no token".to_string(),
        })?;

        Ok((entity.into(), token))
    }

    pub async fn read_service_account_key(
        &self,
        id: &str,
    ) -> Result<Option<ServiceAccountKey>, ApiError> {
        let data: KeyReadData = self
            .execute(
                "ReadServiceAccountKey",
                READ_SERVICE_ACCOUNT_KEY,
                json!({"id": id}),
            )
            .await?;

        Ok(data.service_account_key.map(Into::into))
    }

    pub async fn update_service_account_key(
        &self,
        id: &str,
        name: &str,
    ) -> Result<ServiceAccountKey, ApiError> {
        let data: KeyUpdateData = self
            .execute(
                "UpdateServiceAccountKey",
                UPDATE_SERVICE_ACCOUNT_KEY,
                json!({"id": id, "name": name}),
            )
            .await?;

        data.payload
            .into_entity("serviceAccountKeyUpdate")
            .map(Into::into)
    }

    pub async fn revoke_service_account_key(&self, id: &str) -> Result<(), ApiError> {
        let data: KeyRevokeData = self
            .execute(
                "RevokeServiceAccountKey",
                REVOKE_SERVICE_ACCOUNT_KEY,
                json!({"id": id}),
            )
            .await?;

        data.payload.check("serviceAccountKeyRevoke").map(|_| ())
    }

    pub async fn delete_service_account_key(&self, id: &str) -> Result<(), ApiError> {
        let data: KeyDeleteData = self
            .execute(
                "DeleteServiceAccountKey",
                DELETE_SERVICE_ACCOUNT_KEY,
                json!({"id": id}),
            )
            .await?;

        data.payload.check("serviceAccountKeyDelete").map(|_| ())
    }
}
