//! Result types returned after applying resources or reading data sources

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteNetwork {
    pub id: String,
    pub name: String,
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
    pub id: String,
    pub name: String,
    pub remote_network_id: String,
    pub status_updates_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorTokens {
    pub connector_id: String,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub group_type: String,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_policy_id: Option<String>,
    #[serde(default)]
    pub user_ids: Vec<String>,
    pub is_authoritative: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolResult {
    pub policy: String,
    #[serde(default)]
    pub ports: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolsResult {
    pub allow_icmp: bool,
    pub tcp: ProtocolResult,
    pub udp: ProtocolResult,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccessResult {
    #[serde(default)]
    pub group_ids: Vec<String>,
    #[serde(default)]
    pub service_account_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub name: String,
    pub address: String,
    pub remote_network_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_policy_id: Option<String>,
    pub is_active: bool,
    pub is_visible: bool,
    pub is_browser_shortcut_enabled: bool,
    pub is_authoritative: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocols: Option<ProtocolsResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<AccessResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccount {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccountKey {
    pub id: String,
    pub name: String,
    pub service_account_id: String,
    pub expiration_time: i64,
    pub token: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub send_invite: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SecurityPolicy {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_result_deserializes_engine_output() {
        let json = r#"{
            "id": "r1",
            "name": "db",
            "address": "db.internal",
            "remoteNetworkId": "rn1",
            "isActive": true,
            "isVisible": true,
            "isBrowserShortcutEnabled": false,
            "isAuthoritative": true,
            "protocols": {
                "allowIcmp": true,
                "tcp": {"policy": "RESTRICTED", "ports": ["5432"]},
                "udp": {"policy": "ALLOW_ALL"}
            }
        }"#;

        let resource: Resource = serde_json::from_str(json).unwrap();
        assert_eq!(resource.remote_network_id, "rn1");
        assert_eq!(resource.protocols.as_ref().unwrap().tcp.ports, vec!["5432"]);
        assert!(resource.protocols.as_ref().unwrap().udp.ports.is_empty());
        assert!(resource.access.is_none());
    }

    #[test]
    fn group_type_field_uses_reserved_word_rename() {
        let json = r#"{
            "id": "g1",
            "name": "devs",
            "type": "MANUAL",
            "isActive": true,
            "userIds": ["u1"],
            "isAuthoritative": false
        }"#;

        let group: Group = serde_json::from_str(json).unwrap();
        assert_eq!(group.group_type, "MANUAL");
        assert_eq!(group.user_ids, vec!["u1"]);
    }
}
