//! Domain models mirroring the admin API object graph
//!
//! Everything the provider reads or writes passes through these types; the
//! client converts GraphQL payloads into them and the resources map them
//! onto Terraform state.

use std::fmt;
use thiserror::Error;

pub const POLICY_RESTRICTED: &str = "RESTRICTED";
pub const POLICY_ALLOW_ALL: &str = "ALLOW_ALL";
pub const POLICY_DENY_ALL: &str = "DENY_ALL";

pub const POLICIES: [&str; 3] = [POLICY_RESTRICTED, POLICY_ALLOW_ALL, POLICY_DENY_ALL];

pub const LOCATIONS: [&str; 5] = ["AWS", "AZURE", "GOOGLE_CLOUD", "ON_PREMISE", "OTHER"];
pub const LOCATION_OTHER: &str = "OTHER";

pub const USER_ROLES: [&str; 4] = ["ADMIN", "DEVOPS", "SUPPORT", "MEMBER"];
pub const USER_ROLE_MEMBER: &str = "MEMBER";

pub const MAX_PORT: i64 = 65535;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("failed to parse port range \"{input}\": {reason}")]
    InvalidPortRange { input: String, reason: String },

    #[error("port range start {start} must not be greater than end {end}")]
    PortRangeNotRising { start: i64, end: i64 },

    #[error("protocol policy must be one of [RESTRICTED, ALLOW_ALL, DENY_ALL], got \"{0}\"")]
    InvalidPolicy(String),

    #[error("policy ALLOW_ALL does not allow ports to be set")]
    PortsNotAllowed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteNetwork {
    pub id: String,
    pub name: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    pub id: String,
    pub name: String,
    pub remote_network_id: String,
    pub status_updates_enabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorTokens {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub group_type: String,
    pub is_active: bool,
    pub security_policy_id: Option<String>,
    pub user_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceAccount {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceAccountKey {
    pub id: String,
    pub name: String,
    pub service_account_id: String,
    pub expiration_time: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SecurityPolicy {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub id: String,
    pub name: String,
    pub address: String,
    pub remote_network_id: String,
    pub protocols: Protocols,
    pub group_ids: Vec<String>,
    pub service_account_ids: Vec<String>,
    pub is_active: bool,
    pub is_visible: bool,
    pub is_browser_shortcut_enabled: bool,
    pub alias: Option<String>,
    pub security_policy_id: Option<String>,
}

/// A single port or inclusive port span, written as "80" or "8000-8080"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    pub start: i64,
    pub end: i64,
}

impl PortRange {
    pub fn parse(input: &str) -> Result<Self, ModelError> {
        match input.split_once('-') {
            Some((start, end)) => {
                let start = parse_port(input, start)?;
                let end = parse_port(input, end)?;

                if end < start {
                    return Err(ModelError::PortRangeNotRising { start, end });
                }

                Ok(Self { start, end })
            }
            None => {
                let port = parse_port(input, input)?;
                Ok(Self {
                    start: port,
                    end: port,
                })
            }
        }
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

fn parse_port(input: &str, part: &str) -> Result<i64, ModelError> {
    let port: i64 = part
        .trim()
        .parse()
        .map_err(|_| ModelError::InvalidPortRange {
            input: input.to_string(),
            reason: format!("\"{}\" is not a number", part.trim()),
        })?;

    if port < 1 || port > MAX_PORT {
        return Err(ModelError::InvalidPortRange {
            input: input.to_string(),
            reason: format!("port {} is out of range 1-{}", port, MAX_PORT),
        });
    }

    Ok(port)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Protocol {
    pub policy: String,
    pub ports: Vec<PortRange>,
}

impl Protocol {
    /// Build from configuration, enforcing the policy/ports exclusivity
    pub fn new(policy: &str, ports: Vec<PortRange>) -> Result<Self, ModelError> {
        if !POLICIES.contains(&policy) {
            return Err(ModelError::InvalidPolicy(policy.to_string()));
        }

        match policy {
            POLICY_ALLOW_ALL if !ports.is_empty() => Err(ModelError::PortsNotAllowed),
            POLICY_ALLOW_ALL => Ok(Self {
                policy: POLICY_ALLOW_ALL.to_string(),
                ports: Vec::new(),
            }),
            // DENY_ALL is stored upstream as RESTRICTED with no ports
            POLICY_DENY_ALL => Ok(Self {
                policy: POLICY_DENY_ALL.to_string(),
                ports: Vec::new(),
            }),
            _ => Ok(Self {
                policy: policy.to_string(),
                ports,
            }),
        }
    }

    pub fn allow_all() -> Self {
        Self {
            policy: POLICY_ALLOW_ALL.to_string(),
            ports: Vec::new(),
        }
    }

    /// Policy value sent to the API
    pub fn api_policy(&self) -> &str {
        if self.policy == POLICY_DENY_ALL {
            POLICY_RESTRICTED
        } else {
            &self.policy
        }
    }

    /// Rebuild from an API response; RESTRICTED with an empty port list is
    /// how the API represents DENY_ALL
    pub fn from_api(policy: String, ports: Vec<PortRange>) -> Self {
        if policy == POLICY_RESTRICTED && ports.is_empty() {
            Self {
                policy: POLICY_DENY_ALL.to_string(),
                ports,
            }
        } else {
            Self { policy, ports }
        }
    }

    pub fn ports_to_strings(&self) -> Vec<String> {
        self.ports.iter().map(|p| p.to_string()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Protocols {
    pub allow_icmp: bool,
    pub tcp: Protocol,
    pub udp: Protocol,
}

impl Protocols {
    /// No restriction: everything allowed
    pub fn allow_all() -> Self {
        Self {
            allow_icmp: true,
            tcp: Protocol::allow_all(),
            udp: Protocol::allow_all(),
        }
    }
}

impl Default for Protocols {
    fn default() -> Self {
        Self::allow_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_range_parses_single_port() {
        let range = PortRange::parse("443").unwrap();
        assert_eq!(range, PortRange { start: 443, end: 443 });
        assert_eq!(range.to_string(), "443");
    }

    #[test]
    fn port_range_parses_span() {
        let range = PortRange::parse("8000-8080").unwrap();
        assert_eq!(
            range,
            PortRange {
                start: 8000,
                end: 8080
            }
        );
        assert_eq!(range.to_string(), "8000-8080");
    }

    #[test]
    fn port_range_rejects_descending_span() {
        let err = PortRange::parse("90-80").unwrap_err();
        assert_eq!(err, ModelError::PortRangeNotRising { start: 90, end: 80 });
    }

    #[test]
    fn port_range_rejects_out_of_bounds_ports() {
        assert!(PortRange::parse("0").is_err());
        assert!(PortRange::parse("65536").is_err());
        assert!(PortRange::parse("-1").is_err());
    }

    #[test]
    fn port_range_rejects_garbage() {
        let err = PortRange::parse("http").unwrap_err();
        assert!(matches!(err, ModelError::InvalidPortRange { .. }));

        assert!(PortRange::parse("80-90-100").is_err());
    }

    #[test]
    fn protocol_rejects_allow_all_with_ports() {
        let err = Protocol::new(POLICY_ALLOW_ALL, vec![PortRange::parse("80").unwrap()])
            .unwrap_err();
        assert_eq!(err, ModelError::PortsNotAllowed);
    }

    #[test]
    fn protocol_deny_all_maps_to_restricted_for_api() {
        let protocol = Protocol::new(POLICY_DENY_ALL, Vec::new()).unwrap();
        assert_eq!(protocol.policy, POLICY_DENY_ALL);
        assert_eq!(protocol.api_policy(), POLICY_RESTRICTED);
        assert!(protocol.ports.is_empty());
    }

    #[test]
    fn protocol_from_api_reads_empty_restricted_as_deny_all() {
        let protocol = Protocol::from_api(POLICY_RESTRICTED.to_string(), Vec::new());
        assert_eq!(protocol.policy, POLICY_DENY_ALL);

        let with_ports = Protocol::from_api(
            POLICY_RESTRICTED.to_string(),
            vec![PortRange::parse("22").unwrap()],
        );
        assert_eq!(with_ports.policy, POLICY_RESTRICTED);
    }

    #[test]
    fn protocol_rejects_unknown_policy() {
        let err = Protocol::new("ALLOW_SOME", Vec::new()).unwrap_err();
        assert_eq!(err, ModelError::InvalidPolicy("ALLOW_SOME".to_string()));
    }

    #[test]
    fn protocols_default_allows_everything() {
        let protocols = Protocols::default();
        assert!(protocols.allow_icmp);
        assert_eq!(protocols.tcp.policy, POLICY_ALLOW_ALL);
        assert_eq!(protocols.udp.policy, POLICY_ALLOW_ALL);
    }
}
