//! Group operations, including the paginated user membership connection

use super::{ApiError, Client, Connection, IdName, Payload};
use crate::model::Group;
use serde::Deserialize;
use serde_json::json;

const READ_GROUP: &str = r#"
query ReadGroup($id: ID!, $pageLimit: Int) {
  group(id: $id) {
    id
    name
    type
    isActive
    securityPolicy {
      id
    }
    users(first: $pageLimit) {
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

const READ_GROUP_USERS: &str = r#"
query ReadGroupUsers($id: ID!, $pageLimit: Int, $cursor: String) {
  group(id: $id) {
    users(first: $pageLimit, after: $cursor) {
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

const READ_GROUPS: &str = r#"
query ReadGroups($filter: GroupFilterInput, $pageLimit: Int, $cursor: String) {
  groups(filter: $filter, first: $pageLimit, after: $cursor) {
    edges {
      node {
        id
        name
        type
        isActive
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

const CREATE_GROUP: &str = r#"
mutation CreateGroup($name: String!, $userIds: [ID], $securityPolicyId: ID) {
  groupCreate(name: $name, userIds: $userIds, securityPolicyId: $securityPolicyId) {
    ok
    error
    entity {
      id
      name
      type
      isActive
      securityPolicy {
        id
      }
    }
  }
}"#;

const UPDATE_GROUP: &str = r#"
mutation UpdateGroup($id: ID!, $name: String, $securityPolicyId: ID, $addedUserIds: [ID], $removedUserIds: [ID]) {
  groupUpdate(id: $id, name: $name, securityPolicyId: $securityPolicyId, addedUserIds: $addedUserIds, removedUserIds: $removedUserIds) {
    ok
    error
    entity {
      id
      name
      type
      isActive
      securityPolicy {
        id
      }
    }
  }
}"#;

const DELETE_GROUP: &str = r#"
mutation DeleteGroup($id: ID!) {
  groupDelete(id: $id) {
    ok
    error
  }
}"#;

/// Optional filters for the groups listing
#[derive(Debug, Clone, Default)]
pub struct GroupsFilter {
    pub name: Option<String>,
    pub group_type: Option<String>,
    pub is_active: Option<bool>,
}

impl GroupsFilter {
    fn to_variables(&self) -> serde_json::Value {
        if self.name.is_none() && self.group_type.is_none() && self.is_active.is_none() {
            return serde_json::Value::Null;
        }

        let mut filter = serde_json::Map::new();
        if let Some(name) = &self.name {
            filter.insert("name".to_string(), json!({"eq": name}));
        }
        if let Some(group_type) = &self.group_type {
            filter.insert("type".to_string(), json!({"in": [group_type]}));
        }
        if let Some(is_active) = self.is_active {
            filter.insert("isActive".to_string(), json!({"eq": is_active}));
        }

        serde_json::Value::Object(filter)
    }
}

#[derive(Debug, Deserialize)]
struct GqlId {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GqlGroup {
    id: String,
    name: String,
    #[serde(rename = "type")]
    group_type: String,
    is_active: bool,
    security_policy: Option<GqlId>,
    #[serde(default)]
    users: Option<Connection<GqlId>>,
}

impl GqlGroup {
    fn into_model(self, user_ids: Vec<String>) -> Group {
        Group {
            id: self.id,
            name: self.name,
            group_type: self.group_type,
            is_active: self.is_active,
            security_policy_id: self.security_policy.map(|policy| policy.id),
            user_ids,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReadData {
    group: Option<GqlGroup>,
}

#[derive(Debug, Deserialize)]
struct GqlGroupUsers {
    users: Connection<GqlId>,
}

#[derive(Debug, Deserialize)]
struct ReadUsersData {
    group: Option<GqlGroupUsers>,
}

#[derive(Debug, Deserialize)]
struct ListData {
    groups: Connection<GqlGroup>,
}

#[derive(Debug, Deserialize)]
struct CreateData {
    #[serde(rename = "groupCreate")]
    payload: Payload<GqlGroup>,
}

#[derive(Debug, Deserialize)]
struct UpdateData {
    #[serde(rename = "groupUpdate")]
    payload: Payload<GqlGroup>,
}

#[derive(Debug, Deserialize)]
struct DeleteData {
    #[serde(rename = "groupDelete")]
    payload: Payload<IdName>,
}

impl Client {
    pub async fn create_group(
        &self,
        name: &str,
        user_ids: &[String],
        security_policy_id: Option<&str>,
    ) -> Result<Group, ApiError> {
        let data: CreateData = self
            .execute(
                "CreateGroup",
                CREATE_GROUP,
                json!({
                    "name": name,
                    "userIds": user_ids,
                    "securityPolicyId": security_policy_id,
                }),
            )
            .await?;

        let entity = data.payload.into_entity("groupCreate")?;
        Ok(entity.into_model(user_ids.to_vec()))
    }

    /// Read a group and drain its full user membership
    pub async fn read_group(&self, id: &str) -> Result<Option<Group>, ApiError> {
        let data: ReadData = self
            .execute(
                "ReadGroup",
                READ_GROUP,
                json!({"id": id, "pageLimit": self.page_limit()}),
            )
            .await?;

        let Some(mut group) = data.group else {
            return Ok(None);
        };

        let users = group.users.take();
        let mut user_ids = Vec::new();
        let mut cursor = None;
        let mut has_next = false;

        if let Some(connection) = users {
            has_next = connection.page_info.has_next_page;
            cursor = connection.page_info.end_cursor.clone();
            user_ids.extend(connection.nodes().into_iter().map(|user| user.id));
        }

        while has_next {
            let page: ReadUsersData = self
                .execute(
                    "ReadGroupUsers",
                    READ_GROUP_USERS,
                    json!({"id": id, "pageLimit": self.page_limit(), "cursor": cursor}),
                )
                .await?;

            let Some(group_users) = page.group else {
                break;
            };

            has_next = group_users.users.page_info.has_next_page;
            cursor = group_users.users.page_info.end_cursor.clone();
            user_ids.extend(group_users.users.nodes().into_iter().map(|user| user.id));
        }

        Ok(Some(group.into_model(user_ids)))
    }

    /// List groups; membership is not expanded here
    pub async fn read_groups(&self, filter: &GroupsFilter) -> Result<Vec<Group>, ApiError> {
        let mut all = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let data: ListData = self
                .execute(
                    "ReadGroups",
                    READ_GROUPS,
                    json!({
                        "filter": filter.to_variables(),
                        "pageLimit": self.page_limit(),
                        "cursor": cursor,
                    }),
                )
                .await?;

            let connection = data.groups;
            let has_next = connection.page_info.has_next_page;
            cursor = connection.page_info.end_cursor.clone();

            all.extend(
                connection
                    .nodes()
                    .into_iter()
                    .map(|group| group.into_model(Vec::new())),
            );

            if !has_next {
                break;
            }
        }

        Ok(all)
    }

    pub async fn update_group(
        &self,
        id: &str,
        name: &str,
        security_policy_id: Option<&str>,
        added_user_ids: &[String],
        removed_user_ids: &[String],
    ) -> Result<(), ApiError> {
        let data: UpdateData = self
            .execute(
                "UpdateGroup",
                UPDATE_GROUP,
                json!({
                    "id": id,
                    "name": name,
                    "securityPolicyId": security_policy_id,
                    "addedUserIds": added_user_ids,
                    "removedUserIds": removed_user_ids,
                }),
            )
            .await?;

        data.payload.check("groupUpdate").map(|_| ())
    }

    pub async fn delete_group(&self, id: &str) -> Result<(), ApiError> {
        let data: DeleteData = self
            .execute("DeleteGroup", DELETE_GROUP, json!({"id": id}))
            .await?;

        data.payload.check("groupDelete").map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::test_client;
    use super::*;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn read_group_drains_nested_user_pages() {
        let mut server = Server::new_async().await;

        let first_page = server
            .mock("POST", "/api/graphql/")
            .match_body(Matcher::Regex(r#""operationName":"ReadGroup""#.to_string()))
            .with_body(
                r#"{"data":{"group":{"id":"g1","name":"devs","type":"MANUAL","isActive":true,"securityPolicy":{"id":"sp1"},"users":{"edges":[{"node":{"id":"u1"}}],"pageInfo":{"endCursor":"cur1","hasNextPage":true}}}}}"#,
            )
            .create_async()
            .await;

        let second_page = server
            .mock("POST", "/api/graphql/")
            .match_body(Matcher::Regex(
                r#""operationName":"ReadGroupUsers""#.to_string(),
            ))
            .with_body(
                r#"{"data":{"group":{"users":{"edges":[{"node":{"id":"u2"}}],"pageInfo":{"endCursor":"cur2","hasNextPage":false}}}}}"#,
            )
            .create_async()
            .await;

        let client = test_client(&server.url());
        let group = client.read_group("g1").await.unwrap().unwrap();

        assert_eq!(group.id, "g1");
        assert_eq!(group.name, "devs");
        assert_eq!(group.security_policy_id.as_deref(), Some("sp1"));
        assert_eq!(group.user_ids, vec!["u1".to_string(), "u2".to_string()]);
        first_page.assert_async().await;
        second_page.assert_async().await;
    }

    #[tokio::test]
    async fn read_group_returns_none_when_missing() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/graphql/")
            .with_body(r#"{"data":{"group":null}}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        assert!(client.read_group("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_group_sends_membership_deltas() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/graphql/")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#""addedUserIds":\["u3"\]"#.to_string()),
                Matcher::Regex(r#""removedUserIds":\["u1"\]"#.to_string()),
            ]))
            .with_body(
                r#"{"data":{"groupUpdate":{"ok":true,"error":null,"entity":{"id":"g1","name":"devs","type":"MANUAL","isActive":true,"securityPolicy":null}}}}"#,
            )
            .create_async()
            .await;

        let client = test_client(&server.url());
        client
            .update_group(
                "g1",
                "devs",
                None,
                &["u3".to_string()],
                &["u1".to_string()],
            )
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[test]
    fn groups_filter_builds_variables() {
        let empty = GroupsFilter::default();
        assert!(empty.to_variables().is_null());

        let filter = GroupsFilter {
            name: Some("devs".to_string()),
            group_type: Some("MANUAL".to_string()),
            is_active: Some(true),
        };
        assert_eq!(
            filter.to_variables(),
            json!({"name": {"eq": "devs"}, "type": {"in": ["MANUAL"]}, "isActive": {"eq": true}})
        );
    }
}
