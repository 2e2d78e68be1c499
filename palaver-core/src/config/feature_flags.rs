//! Feature flags for optional policy behavior

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Feature flags for enabling/disabling functionality
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// Enroll a new workspace member into every existing channel of
    /// the workspace. Off by default: channels are locked until an
    /// explicit per-channel invitation.
    pub auto_join_channels: bool,

    /// Custom feature flags (key-value pairs)
    pub custom: HashMap<String, bool>,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            auto_join_channels: false,
            custom: HashMap::new(),
        }
    }
}

impl FeatureFlags {
    /// Look up a custom flag; absent flags read as disabled
    pub fn is_enabled(&self, name: &str) -> bool {
        self.custom.get(name).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_locked_channels() {
        let flags = FeatureFlags::default();
        assert!(!flags.auto_join_channels);
    }

    #[test]
    fn test_custom_flags() {
        let mut flags = FeatureFlags::default();
        assert!(!flags.is_enabled("experimental"));

        flags.custom.insert("experimental".to_string(), true);
        assert!(flags.is_enabled("experimental"));
    }
}
