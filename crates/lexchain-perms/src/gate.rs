//! The access gate: read-only access decisions.
//!
//! Plain access is decided by ownership and grants only. The emergency
//! override never widens `has_access`; it is reachable solely through
//! [`AccessGate::has_emergency_access`], which requires the caller to present
//! the secret behind the committed key hash.

use lexchain_core::{AccessView, EmergencyOverride, EmergencySecret, Identity, Timestamp};

/// Why an access check came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// The identity owns the document.
    Owner,
    /// A grant is in force until `expires_at`.
    Granted { expires_at: Timestamp },
    /// A grant exists but lapsed at `expired_at`.
    Expired { expired_at: Timestamp },
    /// No ownership and no grant.
    Denied,
}

impl AccessDecision {
    /// Whether the decision allows access.
    pub fn allows(&self) -> bool {
        matches!(self, AccessDecision::Owner | AccessDecision::Granted { .. })
    }
}

/// Pure access decisions over registry records.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessGate;

impl AccessGate {
    /// Decide plain access for `identity` at `now`. Owner first, then grant.
    pub fn decide(view: &AccessView, identity: &Identity, now: Timestamp) -> AccessDecision {
        if view.document.is_owned_by(identity) {
            return AccessDecision::Owner;
        }

        match &view.grant {
            Some(grant) if &grant.grantee == identity && grant.is_active(now) => {
                AccessDecision::Granted {
                    expires_at: grant.expires_at,
                }
            }
            Some(grant) if &grant.grantee == identity => AccessDecision::Expired {
                expired_at: grant.expires_at,
            },
            _ => AccessDecision::Denied,
        }
    }

    /// Shorthand for `decide(..).allows()`.
    pub fn has_access(view: &AccessView, identity: &Identity, now: Timestamp) -> bool {
        Self::decide(view, identity, now).allows()
    }

    /// True iff an override is active and `secret` opens its key hash.
    pub fn has_emergency_access(
        emergency: Option<&EmergencyOverride>,
        secret: &EmergencySecret,
    ) -> bool {
        match emergency {
            Some(e) if e.active => e.key_hash.matches(secret.as_bytes()),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexchain_core::{AccessGrant, ContentHash, Document, KeyHash};
    use proptest::prelude::*;

    fn id(s: &str) -> Identity {
        Identity::new(s).unwrap()
    }

    fn view(grant_expires_at: Option<Timestamp>) -> AccessView {
        let hash = ContentHash::new("abc").unwrap();
        AccessView {
            document: Document {
                hash: hash.clone(),
                owner: id("alice"),
                metadata: "contract.pdf".into(),
                created_at: 0,
                updated_at: 0,
            },
            grant: grant_expires_at.map(|expires_at| AccessGrant {
                document: hash,
                grantee: id("bob"),
                expires_at,
                granted_by: id("alice"),
                granted_at: 0,
            }),
        }
    }

    #[test]
    fn test_owner_has_access() {
        assert_eq!(
            AccessGate::decide(&view(None), &id("alice"), 1_000_000),
            AccessDecision::Owner
        );
    }

    #[test]
    fn test_grant_window() {
        let v = view(Some(3600));
        assert!(AccessGate::has_access(&v, &id("bob"), 3599));
        assert_eq!(
            AccessGate::decide(&v, &id("bob"), 3600),
            AccessDecision::Expired { expired_at: 3600 }
        );
        assert!(!AccessGate::has_access(&v, &id("carol"), 0));
    }

    #[test]
    fn test_grant_for_other_identity_is_ignored() {
        let v = view(Some(3600));
        assert_eq!(
            AccessGate::decide(&v, &id("carol"), 0),
            AccessDecision::Denied
        );
    }

    #[test]
    fn test_emergency_access_requires_active_override() {
        let secret = EmergencySecret::from("open sesame");
        let mut emergency = EmergencyOverride {
            document: ContentHash::new("abc").unwrap(),
            key_hash: secret.commitment(),
            activated_by: id("alice"),
            activated_at: 0,
            active: false,
        };

        assert!(!AccessGate::has_emergency_access(None, &secret));
        assert!(!AccessGate::has_emergency_access(Some(&emergency), &secret));

        emergency.active = true;
        assert!(AccessGate::has_emergency_access(Some(&emergency), &secret));
        assert!(!AccessGate::has_emergency_access(
            Some(&emergency),
            &EmergencySecret::from("wrong")
        ));
    }

    #[test]
    fn test_emergency_uses_key_commitment() {
        let emergency = EmergencyOverride {
            document: ContentHash::new("abc").unwrap(),
            key_hash: KeyHash::commit(b"k"),
            activated_by: id("alice"),
            activated_at: 0,
            active: true,
        };
        assert!(AccessGate::has_emergency_access(
            Some(&emergency),
            &EmergencySecret::new(b"k".to_vec())
        ));
    }

    proptest! {
        #[test]
        fn prop_grant_flips_exactly_at_expiry(
            expires_at in -1_000_000i64..1_000_000,
            now in -1_000_000i64..1_000_000,
        ) {
            let v = view(Some(expires_at));
            prop_assert_eq!(AccessGate::has_access(&v, &id("bob"), now), now < expires_at);
        }

        #[test]
        fn prop_owner_always_allowed(now in any::<i64>(), expires_at in any::<Option<i64>>()) {
            prop_assert!(AccessGate::has_access(&view(expires_at), &id("alice"), now));
        }
    }
}
