//! Emergency activation policy.
//!
//! Emergency activation exists for the case where the owner is unreachable,
//! so by default the owner may delegate the trigger to emergency contacts
//! registered ahead of time. Deployments that want the stricter rule can
//! select [`EmergencyPolicy::OwnerOnly`].

use serde::{Deserialize, Serialize};

use lexchain_core::{EmergencyView, Identity};

/// Who may call `activate_emergency`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmergencyPolicy {
    /// Only the document owner.
    OwnerOnly,

    /// The owner or any contact the owner registered for the document.
    #[default]
    OwnerOrContacts,
}

impl EmergencyPolicy {
    /// Check whether `caller` may activate the override described by `view`.
    pub fn authorizes(&self, view: &EmergencyView, caller: &Identity) -> bool {
        if view.document.is_owned_by(caller) {
            return true;
        }

        match self {
            EmergencyPolicy::OwnerOnly => false,
            EmergencyPolicy::OwnerOrContacts => view.is_contact,
        }
    }
}
