//! Argument types for creating and updating resources
//!
//! One Args struct per resource, plus the nested input shapes shared by
//! twingate_resource. Serialized field names match the engine's camelCase
//! wire format.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteNetworkArgs {
    /// The name of the Remote Network
    pub name: String,
    /// One of AWS, AZURE, GOOGLE_CLOUD, ON_PREMISE or OTHER
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorArgs {
    /// The ID of the Remote Network the Connector is attached to
    pub remote_network_id: String,
    /// Name of the Connector; one is generated when omitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Whether status notifications are enabled for the Connector
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_updates_enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorTokensArgs {
    /// The ID of the Connector to generate tokens for
    pub connector_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupArgs {
    /// The name of the Group
    pub name: String,
    /// Defines which Security Policy applies to this Group
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_policy_id: Option<String>,
    /// List of User IDs that have permission to access the Group
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_ids: Option<Vec<String>>,
    /// Whether assignments fully override out-of-band changes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_authoritative: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolArgs {
    /// One of RESTRICTED, ALLOW_ALL or DENY_ALL
    pub policy: String,
    /// Port ranges, each "N" or "N-M"
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolsArgs {
    /// Whether to allow ICMP (ping) traffic
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_icmp: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tcp: Option<ProtocolArgs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub udp: Option<ProtocolArgs>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccessArgs {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub service_account_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceArgs {
    /// The name of the Resource
    pub name: String,
    /// The Resource's IP/CIDR or FQDN/DNS zone
    pub address: String,
    /// Remote Network ID where the Resource lives
    pub remote_network_id: String,
    /// An alternate address clients can use to reach the Resource
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// The ID of a Security Policy to apply to this Resource
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_policy_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_browser_shortcut_enabled: Option<bool>,
    /// Whether access assignments fully override out-of-band changes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_authoritative: Option<bool>,
    /// Restrict access to certain protocols and ports; everything is
    /// allowed when omitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocols: Option<ProtocolsArgs>,
    /// Group IDs and Service Account IDs granted access to the Resource
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<AccessArgs>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccountArgs {
    /// The name of the Service Account
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccountKeyArgs {
    /// The ID of the Service Account this key belongs to
    pub service_account_id: String,
    /// The name of the Service Account Key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Expiration in days, 0 means the key never expires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserArgs {
    /// The User's email address
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// One of ADMIN, DEVOPS, SUPPORT or MEMBER
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Whether to send an invitation email on creation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_invite: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_args_serialize_to_camel_case() {
        let args = ResourceArgs {
            name: "db".to_string(),
            address: "db.internal".to_string(),
            remote_network_id: "rn1".to_string(),
            protocols: Some(ProtocolsArgs {
                allow_icmp: Some(false),
                tcp: Some(ProtocolArgs {
                    policy: "RESTRICTED".to_string(),
                    ports: vec!["5432".to_string()],
                }),
                udp: None,
            }),
            ..ResourceArgs::default()
        };

        let json = serde_json::to_value(&args).unwrap();
        assert_eq!(json["remoteNetworkId"], "rn1");
        assert_eq!(json["protocols"]["allowIcmp"], false);
        assert_eq!(json["protocols"]["tcp"]["ports"][0], "5432");
        assert!(json.get("alias").is_none());
    }

    #[test]
    fn group_args_round_trip() {
        let args = GroupArgs {
            name: "devs".to_string(),
            user_ids: Some(vec!["u1".to_string(), "u2".to_string()]),
            is_authoritative: Some(false),
            ..GroupArgs::default()
        };

        let json = serde_json::to_string(&args).unwrap();
        let parsed: GroupArgs = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, args);
    }
}
