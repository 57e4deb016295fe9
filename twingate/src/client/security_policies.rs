//! Security policy lookups
//!
//! Policies are defined in the admin console; the API only exposes reads.

use super::{ApiError, Client, Connection, IdName};
use crate::model::SecurityPolicy;
use serde::Deserialize;
use serde_json::json;

const READ_SECURITY_POLICY: &str = r#"
query ReadSecurityPolicy($id: ID, $name: String) {
  securityPolicy(id: $id, name: $name) {
    id
    name
  }
}"#;

const READ_SECURITY_POLICIES: &str = r#"
query ReadSecurityPolicies($pageLimit: Int, $cursor: String) {
  securityPolicies(first: $pageLimit, after: $cursor) {
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

#[derive(Debug, Deserialize)]
struct ReadData {
    #[serde(rename = "securityPolicy")]
    security_policy: Option<IdName>,
}

#[derive(Debug, Deserialize)]
struct ListData {
    #[serde(rename = "securityPolicies")]
    security_policies: Connection<IdName>,
}

impl From<IdName> for SecurityPolicy {
    fn from(id_name: IdName) -> Self {
        Self {
            id: id_name.id,
            name: id_name.name,
        }
    }
}

impl Client {
    /// Look up one policy by id or by exact name
    pub async fn read_security_policy(
        &self,
        id: Option<&str>,
        name: Option<&str>,
    ) -> Result<Option<SecurityPolicy>, ApiError> {
        let data: ReadData = self
            .execute(
                "ReadSecurityPolicy",
                READ_SECURITY_POLICY,
                json!({"id": id, "name": name}),
            )
            .await?;

        Ok(data.security_policy.map(Into::into))
    }

    pub async fn read_security_policies(&self) -> Result<Vec<SecurityPolicy>, ApiError> {
        let mut all = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let data: ListData = self
                .execute(
                    "ReadSecurityPolicies",
                    READ_SECURITY_POLICIES,
                    json!({"pageLimit": self.page_limit(), "cursor": cursor}),
                )
                .await?;

            let connection = data.security_policies;
            let has_next = connection.page_info.has_next_page;
            cursor = connection.page_info.end_cursor.clone();

            all.extend(connection.nodes().into_iter().map(SecurityPolicy::from));

            if !has_next {
                break;
            }
        }

        Ok(all)
    }
}
