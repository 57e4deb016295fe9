//! User operations

use super::{ApiError, Client, Connection, IdName, Payload};
use crate::model::User;
use serde::Deserialize;
use serde_json::json;

const USER_STATE_ACTIVE: &str = "ACTIVE";
const USER_STATE_DISABLED: &str = "DISABLED";

const READ_USER: &str = r#"
query ReadUser($id: ID!) {
  user(id: $id) {
    id
    email
    firstName
    lastName
    role
    state
  }
}"#;

const READ_USERS: &str = r#"
query ReadUsers($pageLimit: Int, $cursor: String) {
  users(first: $pageLimit, after: $cursor) {
    edges {
      node {
        id
        email
        firstName
        lastName
        role
        state
      }
    }
    pageInfo {
      endCursor
      hasNextPage
    }
  }
}"#;

const CREATE_USER: &str = r#"
mutation CreateUser($email: String!, $firstName: String, $lastName: String, $role: UserRole, $shouldSendInvite: Boolean) {
  userCreate(email: $email, firstName: $firstName, lastName: $lastName, role: $role, shouldSendInvite: $shouldSendInvite) {
    ok
    error
    entity {
      id
      email
      firstName
      lastName
      role
      state
    }
  }
}"#;

const UPDATE_USER: &str = r#"
mutation UpdateUser($id: ID!, $firstName: String, $lastName: String, $role: UserRole, $state: UserStateUpdateInput) {
  userDetailsUpdate(id: $id, firstName: $firstName, lastName: $lastName, role: $role, state: $state) {
    ok
    error
    entity {
      id
      email
      firstName
      lastName
      role
      state
    }
  }
}"#;

const DELETE_USER: &str = r#"
mutation DeleteUser($id: ID!) {
  userDelete(id: $id) {
    ok
    error
  }
}"#;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GqlUser {
    id: String,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    role: String,
    state: String,
}

impl From<GqlUser> for User {
    fn from(gql: GqlUser) -> Self {
        Self {
            id: gql.id,
            email: gql.email,
            first_name: gql.first_name.unwrap_or_default(),
            last_name: gql.last_name.unwrap_or_default(),
            role: gql.role,
            is_active: gql.state == USER_STATE_ACTIVE,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReadData {
    user: Option<GqlUser>,
}

#[derive(Debug, Deserialize)]
struct ListData {
    users: Connection<GqlUser>,
}

#[derive(Debug, Deserialize)]
struct CreateData {
    #[serde(rename = "userCreate")]
    payload: Payload<GqlUser>,
}

#[derive(Debug, Deserialize)]
struct UpdateData {
    #[serde(rename = "userDetailsUpdate")]
    payload: Payload<GqlUser>,
}

#[derive(Debug, Deserialize)]
struct DeleteData {
    #[serde(rename = "userDelete")]
    payload: Payload<IdName>,
}

fn state_input(is_active: bool) -> &'static str {
    if is_active {
        USER_STATE_ACTIVE
    } else {
        USER_STATE_DISABLED
    }
}

impl Client {
    pub async fn create_user(
        &self,
        email: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
        role: &str,
        send_invite: bool,
    ) -> Result<User, ApiError> {
        let data: CreateData = self
            .execute(
                "CreateUser",
                CREATE_USER,
                json!({
                    "email": email,
                    "firstName": first_name,
                    "lastName": last_name,
                    "role": role,
                    "shouldSendInvite": send_invite,
                }),
            )
            .await?;

        data.payload.into_entity("userCreate").map(Into::into)
    }

    pub async fn read_user(&self, id: &str) -> Result<Option<User>, ApiError> {
        let data: ReadData = self
            .execute("ReadUser", READ_USER, json!({"id": id}))
            .await?;

        Ok(data.user.map(Into::into))
    }

    pub async fn read_users(&self) -> Result<Vec<User>, ApiError> {
        let mut all = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let data: ListData = self
                .execute(
                    "ReadUsers",
                    READ_USERS,
                    json!({"pageLimit": self.page_limit(), "cursor": cursor}),
                )
                .await?;

            let connection = data.users;
            let has_next = connection.page_info.has_next_page;
            cursor = connection.page_info.end_cursor.clone();

            all.extend(connection.nodes().into_iter().map(User::from));

            if !has_next {
                break;
            }
        }

        Ok(all)
    }

    pub async fn update_user(
        &self,
        id: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
        role: &str,
        is_active: bool,
    ) -> Result<User, ApiError> {
        let data: UpdateData = self
            .execute(
                "UpdateUser",
                UPDATE_USER,
                json!({
                    "id": id,
                    "firstName": first_name,
                    "lastName": last_name,
                    "role": role,
                    "state": state_input(is_active),
                }),
            )
            .await?;

        data.payload.into_entity("userDetailsUpdate").map(Into::into)
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), ApiError> {
        let data: DeleteData = self
            .execute("DeleteUser", DELETE_USER, json!({"id": id}))
            .await?;

        data.payload.check("userDelete").map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::test_client;
    use super::*;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn create_user_maps_state_to_is_active() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/graphql/")
            .with_body(
                r#"{"data":{"userCreate":{"ok":true,"error":null,"entity":{"id":"u1","email":"dev@corp.test","firstName":"Dev","lastName":"One","role":"MEMBER","state":"PENDING"}}}}"#,
            )
            .create_async()
            .await;

        let client = test_client(&server.url());
        let user = client
            .create_user("dev@corp.test", Some("Dev"), Some("One"), "MEMBER", true)
            .await
            .unwrap();

        assert_eq!(user.id, "u1");
        assert_eq!(user.role, "MEMBER");
        assert!(!user.is_active);
    }

    #[tokio::test]
    async fn update_user_sends_disabled_state() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/graphql/")
            .match_body(Matcher::Regex(r#""state":"DISABLED""#.to_string()))
            .with_body(
                r#"{"data":{"userDetailsUpdate":{"ok":true,"error":null,"entity":{"id":"u1","email":"dev@corp.test","firstName":"Dev","lastName":"One","role":"MEMBER","state":"DISABLED"}}}}"#,
            )
            .create_async()
            .await;

        let client = test_client(&server.url());
        let user = client
            .update_user("u1", Some("Dev"), Some("One"), "MEMBER", false)
            .await
            .unwrap();

        assert!(!user.is_active);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn read_user_handles_missing_names() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/graphql/")
            .with_body(
                r#"{"data":{"user":{"id":"u1","email":"dev@corp.test","firstName":null,"lastName":null,"role":"ADMIN","state":"ACTIVE"}}}"#,
            )
            .create_async()
            .await;

        let client = test_client(&server.url());
        let user = client.read_user("u1").await.unwrap().unwrap();

        assert_eq!(user.first_name, "");
        assert_eq!(user.last_name, "");
        assert!(user.is_active);
    }
}
