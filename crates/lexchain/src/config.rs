//! Registry configuration.

use serde::{Deserialize, Serialize};

use lexchain_perms::{EmergencyPolicy, Rules, DEFAULT_MAX_METADATA_LEN};

use crate::error::{RegistryError, Result};

/// One week, in seconds.
pub const DEFAULT_GRANT_DURATION_SECS: i64 = 7 * 24 * 60 * 60;

/// Default capacity of the event broadcast channel.
pub const DEFAULT_EVENT_BUFFER: usize = 256;

/// Configuration for the Registry.
///
/// Every field has a default, so `{}` is a valid configuration. Unknown
/// fields are rejected.
///
/// ```rust
/// use lexchain::{RegistryConfig, perms::EmergencyPolicy};
///
/// let config = RegistryConfig::from_json(r#"{ "emergency_policy": "owner_only" }"#).unwrap();
/// assert_eq!(config.emergency_policy, EmergencyPolicy::OwnerOnly);
/// assert_eq!(config.max_metadata_len, 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Who may activate a document's emergency override.
    pub emergency_policy: EmergencyPolicy,
    /// Maximum document metadata length, in bytes.
    pub max_metadata_len: usize,
    /// Duration used by `grant_access_default`.
    pub default_grant_duration_secs: i64,
    /// Capacity of the event broadcast channel. Slow subscribers lag past this.
    pub event_buffer: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            emergency_policy: EmergencyPolicy::default(),
            max_metadata_len: DEFAULT_MAX_METADATA_LEN,
            default_grant_duration_secs: DEFAULT_GRANT_DURATION_SECS,
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }
}

impl RegistryConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| RegistryError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check field ranges.
    pub fn validate(&self) -> Result<()> {
        if self.default_grant_duration_secs <= 0 {
            return Err(RegistryError::Config(format!(
                "default_grant_duration_secs must be positive, got {}",
                self.default_grant_duration_secs
            )));
        }
        if self.event_buffer == 0 {
            return Err(RegistryError::Config(
                "event_buffer must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The permission rules this configuration selects.
    pub fn rules(&self) -> Rules {
        Rules {
            emergency_policy: self.emergency_policy,
            max_metadata_len: self.max_metadata_len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        let config = RegistryConfig::from_json("{}").unwrap();
        assert_eq!(config, RegistryConfig::default());
        assert_eq!(config.default_grant_duration_secs, 604_800);
        assert_eq!(config.emergency_policy, EmergencyPolicy::OwnerOrContacts);
    }

    #[test]
    fn test_full_json() {
        let config = RegistryConfig::from_json(
            r#"{
                "emergency_policy": "owner_only",
                "max_metadata_len": 64,
                "default_grant_duration_secs": 3600,
                "event_buffer": 8
            }"#,
        )
        .unwrap();

        assert_eq!(config.emergency_policy, EmergencyPolicy::OwnerOnly);
        assert_eq!(config.rules().max_metadata_len, 64);
        assert_eq!(config.default_grant_duration_secs, 3600);
        assert_eq!(config.event_buffer, 8);
    }

    #[test]
    fn test_rejects_unknown_field() {
        let err = RegistryConfig::from_json(r#"{ "balance_lookup": true }"#).unwrap_err();
        assert!(matches!(err, RegistryError::Config(_)));
    }

    #[test]
    fn test_rejects_bad_ranges() {
        assert!(RegistryConfig::from_json(r#"{ "default_grant_duration_secs": 0 }"#).is_err());
        assert!(RegistryConfig::from_json(r#"{ "event_buffer": 0 }"#).is_err());
    }
}
