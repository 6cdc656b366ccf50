// ABOUTME: Tunable engine settings for routing, bypass, and chain behaviour
// ABOUTME: Deserialized from the application config file with per-field defaults

use serde::{Deserialize, Serialize};

fn default_admin_sentinel() -> String {
    "aax".to_string()
}

fn default_admin_actor() -> String {
    "system".to_string()
}

fn default_bypass_route() -> String {
    "STANDARD.BYPASS".to_string()
}

fn default_context_root() -> String {
    "context".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Literal `sender`/`sendTo` value that names the administrative actor.
    #[serde(default = "default_admin_sentinel")]
    pub admin_sentinel: String,

    /// Identity the sentinel resolves to.
    #[serde(default = "default_admin_actor")]
    pub admin_actor: String,

    /// Route stamped on the step synthesized for unregistered routes.
    #[serde(default = "default_bypass_route")]
    pub bypass_route: String,

    /// Payload key that sender and recipient paths are resolved under.
    #[serde(default = "default_context_root")]
    pub context_root: String,

    /// Array fields reset to empty before a thread entry becomes the next baseline.
    #[serde(default)]
    pub volatile_fields: Vec<String>,

    /// Upper bound on ticks per call. `None` leaves chains unbounded.
    #[serde(default)]
    pub max_chain_length: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            admin_sentinel: default_admin_sentinel(),
            admin_actor: default_admin_actor(),
            bypass_route: default_bypass_route(),
            context_root: default_context_root(),
            volatile_fields: Vec::new(),
            max_chain_length: None,
        }
    }
}

impl EngineConfig {
    pub fn with_admin_actor(mut self, actor: impl Into<String>) -> Self {
        self.admin_actor = actor.into();
        self
    }

    pub fn with_volatile_fields(mut self, fields: Vec<String>) -> Self {
        self.volatile_fields = fields;
        self
    }

    pub fn with_max_chain_length(mut self, limit: usize) -> Self {
        self.max_chain_length = Some(limit);
        self
    }

    pub fn is_admin_sentinel(&self, value: &str) -> bool {
        value == self.admin_sentinel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_to_partial_config() {
        let config: EngineConfig =
            serde_yaml::from_str("admin_actor: ops\nvolatile_fields: [attachments]\n").unwrap();

        assert_eq!(config.admin_actor, "ops");
        assert_eq!(config.admin_sentinel, "aax");
        assert_eq!(config.bypass_route, "STANDARD.BYPASS");
        assert_eq!(config.volatile_fields, vec!["attachments"]);
        assert_eq!(config.max_chain_length, None);
    }

    #[test]
    fn test_sentinel_match_is_exact() {
        let config = EngineConfig::default();
        assert!(config.is_admin_sentinel("aax"));
        assert!(!config.is_admin_sentinel("AAX"));
        assert!(!config.is_admin_sentinel(""));
    }
}
