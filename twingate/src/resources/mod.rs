//! Terraform resources
//!
//! One module per resource type. Membership-carrying resources (groups,
//! resources) share the authoritative/non-authoritative reconciliation
//! helpers below.

pub mod connector;
pub mod connector_tokens;
pub mod group;
pub mod remote_network;
pub mod resource;
pub mod service_account;
pub mod service_account_key;
pub mod user;

use std::collections::HashSet;

/// Compute membership changes to send to the API.
///
/// `declared` is what configuration wants, `prior` is what state last
/// recorded, `remote` is what the API reports right now. Authoritative
/// lists are fully owned: anything remote but undeclared is removed.
/// Non-authoritative lists only remove IDs that were dropped from
/// configuration, leaving out-of-band members alone.
pub(crate) fn membership_deltas(
    remote: &[String],
    declared: &[String],
    prior: &[String],
    authoritative: bool,
) -> (Vec<String>, Vec<String>) {
    let remote_set: HashSet<&String> = remote.iter().collect();
    let declared_set: HashSet<&String> = declared.iter().collect();

    let added: Vec<String> = declared
        .iter()
        .filter(|id| !remote_set.contains(*id))
        .cloned()
        .collect();

    let removed: Vec<String> = if authoritative {
        remote
            .iter()
            .filter(|id| !declared_set.contains(*id))
            .cloned()
            .collect()
    } else {
        prior
            .iter()
            .filter(|id| !declared_set.contains(*id) && remote_set.contains(*id))
            .cloned()
            .collect()
    };

    (added, removed)
}

/// Membership as it should appear in state after a refresh.
///
/// Authoritative lists mirror the remote side completely, so out-of-band
/// changes surface as drift. Non-authoritative lists only report the
/// declared IDs that still exist remotely.
pub(crate) fn visible_membership(
    remote: &[String],
    declared: &[String],
    authoritative: bool,
) -> Vec<String> {
    if authoritative {
        let mut ids = remote.to_vec();
        ids.sort();
        ids
    } else {
        let remote_set: HashSet<&String> = remote.iter().collect();
        declared
            .iter()
            .filter(|id| remote_set.contains(*id))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn authoritative_deltas_replace_the_remote_list() {
        let remote = ids(&["u1", "u2", "u3"]);
        let declared = ids(&["u2", "u4"]);

        let (added, removed) = membership_deltas(&remote, &declared, &remote, true);

        assert_eq!(added, ids(&["u4"]));
        assert_eq!(removed, ids(&["u1", "u3"]));
    }

    #[test]
    fn non_authoritative_deltas_leave_out_of_band_members() {
        // u3 was added out of band and is not declared; it must survive
        let remote = ids(&["u1", "u2", "u3"]);
        let prior = ids(&["u1", "u2"]);
        let declared = ids(&["u2", "u4"]);

        let (added, removed) = membership_deltas(&remote, &declared, &prior, false);

        assert_eq!(added, ids(&["u4"]));
        assert_eq!(removed, ids(&["u1"]));
    }

    #[test]
    fn non_authoritative_removal_skips_ids_already_gone_remotely() {
        let remote = ids(&["u2"]);
        let prior = ids(&["u1", "u2"]);
        let declared = ids(&[]);

        let (added, removed) = membership_deltas(&remote, &declared, &prior, false);

        assert!(added.is_empty());
        assert_eq!(removed, ids(&["u2"]));
    }

    #[test]
    fn deltas_are_empty_when_converged() {
        let remote = ids(&["u1", "u2"]);
        let declared = ids(&["u1", "u2"]);

        let (added, removed) = membership_deltas(&remote, &declared, &remote, true);

        assert!(added.is_empty());
        assert!(removed.is_empty());
    }

    #[test]
    fn authoritative_refresh_mirrors_remote() {
        let remote = ids(&["u3", "u1"]);
        let declared = ids(&["u1"]);

        assert_eq!(
            visible_membership(&remote, &declared, true),
            ids(&["u1", "u3"])
        );
    }

    #[test]
    fn non_authoritative_refresh_hides_out_of_band_members() {
        let remote = ids(&["u1", "u2", "u3"]);
        let declared = ids(&["u1", "u4"]);

        // u2/u3 are unmanaged, u4 is gone remotely
        assert_eq!(
            visible_membership(&remote, &declared, false),
            ids(&["u1"])
        );
    }
}
