//! Evaluator configuration
//!
//! Loaded from TOML:
//!
//! ```toml
//! default_policy = "deny"
//! server_host = "head01.cluster.example.com"
//! group_cache_capacity = 256
//! ```

use crate::error::{AclError, Result};
use crate::validation::validate_server_host;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Largest accepted `group_cache_capacity`
pub const MAX_GROUP_CACHE_CAPACITY: usize = 65_536;

/// Decision used when no rule matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultPolicy {
    /// Refuse unless a rule allows; an unset host ACL admits only the
    /// server's own host
    #[default]
    Deny,
    /// Admit unless a rule denies; an unset ACL admits everyone
    Allow,
}

impl DefaultPolicy {
    pub fn allows(self) -> bool {
        self == DefaultPolicy::Allow
    }
}

/// Settings for [`AclEvaluator`](crate::acl::AclEvaluator)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AclConfig {
    /// Fallback decision
    pub default_policy: DefaultPolicy,

    /// Host name of the local server, always admitted by an unset host ACL
    pub server_host: String,

    /// Users kept in the group lookup cache (0 disables the cache, at most
    /// [`MAX_GROUP_CACHE_CAPACITY`])
    pub group_cache_capacity: usize,
}

impl Default for AclConfig {
    fn default() -> Self {
        AclConfig {
            default_policy: DefaultPolicy::Deny,
            server_host: local_host_name(),
            group_cache_capacity: 256,
        }
    }
}

impl AclConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: AclConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&text)?;
        info!(
            "Loaded ACL configuration from {:?} (default policy {:?}, server host '{}')",
            path.as_ref(),
            config.default_policy,
            config.server_host
        );
        Ok(config)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Check the settings for consistency
    pub fn validate(&self) -> Result<()> {
        validate_server_host(&self.server_host)?;
        if self.group_cache_capacity > MAX_GROUP_CACHE_CAPACITY {
            return Err(AclError::Config(format!(
                "group_cache_capacity {} exceeds {}",
                self.group_cache_capacity, MAX_GROUP_CACHE_CAPACITY
            )));
        }
        Ok(())
    }
}

/// Builder for [`AclConfig`]
#[derive(Debug, Default)]
pub struct AclConfigBuilder {
    default_policy: Option<DefaultPolicy>,
    server_host: Option<String>,
    group_cache_capacity: Option<usize>,
}

impl AclConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fallback decision
    pub fn default_policy(mut self, policy: DefaultPolicy) -> Self {
        self.default_policy = Some(policy);
        self
    }

    /// Set the local server host name (defaults to this machine's name)
    pub fn server_host<S: Into<String>>(mut self, host: S) -> Self {
        self.server_host = Some(host.into());
        self
    }

    /// Set the group cache capacity
    pub fn group_cache_capacity(mut self, capacity: usize) -> Self {
        self.group_cache_capacity = Some(capacity);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<AclConfig> {
        let defaults = AclConfig::default();
        let config = AclConfig {
            default_policy: self.default_policy.unwrap_or(defaults.default_policy),
            server_host: self.server_host.unwrap_or(defaults.server_host),
            group_cache_capacity: self
                .group_cache_capacity
                .unwrap_or(defaults.group_cache_capacity),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Name of this machine, or `localhost` when it cannot be read
#[cfg(unix)]
#[allow(unsafe_code)]
fn local_host_name() -> String {
    let mut buffer = [0_u8; 256];
    // SAFETY: `buffer` is writable for its full length; gethostname writes a
    // NUL-terminated name of at most that many bytes.
    let rc = unsafe { libc::gethostname(buffer.as_mut_ptr() as *mut libc::c_char, buffer.len()) };
    if rc != 0 {
        return "localhost".to_string();
    }
    let len = buffer.iter().position(|&b| b == 0).unwrap_or(buffer.len());
    match std::str::from_utf8(&buffer[..len]) {
        Ok(name) if !name.is_empty() => name.to_string(),
        _ => "localhost".to_string(),
    }
}

#[cfg(not(unix))]
fn local_host_name() -> String {
    std::env::var("COMPUTERNAME").unwrap_or_else(|_| "localhost".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AclConfig::default();
        assert_eq!(config.default_policy, DefaultPolicy::Deny);
        assert_eq!(config.group_cache_capacity, 256);
        assert!(!config.server_host.is_empty());
    }

    #[test]
    fn test_from_toml() {
        let config = AclConfig::from_toml_str(
            r#"
            default_policy = "allow"
            server_host = "head01.example.com"
            group_cache_capacity = 16
            "#,
        )
        .unwrap();

        assert_eq!(config.default_policy, DefaultPolicy::Allow);
        assert_eq!(config.server_host, "head01.example.com");
        assert_eq!(config.group_cache_capacity, 16);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AclConfig::from_toml_str(r#"server_host = "head01""#).unwrap();
        assert_eq!(config.default_policy, DefaultPolicy::Deny);
        assert_eq!(config.group_cache_capacity, 256);
    }

    #[test]
    fn test_bad_policy_rejected() {
        let err = AclConfig::from_toml_str(r#"default_policy = "maybe""#).unwrap_err();
        assert!(matches!(err, AclError::Config(_)));
    }

    #[test]
    fn test_bad_host_rejected() {
        let err = AclConfig::from_toml_str(r#"server_host = "not a host""#).unwrap_err();
        assert!(matches!(err, AclError::Config(_)));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = AclConfigBuilder::new()
            .default_policy(DefaultPolicy::Allow)
            .server_host("head01.example.com")
            .group_cache_capacity(0)
            .build()
            .unwrap();

        let text = config.to_toml_string().unwrap();
        let parsed = AclConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_builder_validates() {
        assert!(AclConfigBuilder::new().server_host("").build().is_err());
        assert!(AclConfigBuilder::new().server_host("head01").build().is_ok());
    }

    #[test]
    fn test_policy_allows() {
        assert!(DefaultPolicy::Allow.allows());
        assert!(!DefaultPolicy::Deny.allows());
    }

    #[test]
    fn test_cache_capacity_bounded() {
        let err = AclConfig::from_toml_str(
            "server_host = \"head01\"\ngroup_cache_capacity = 9223372036854775807",
        )
        .unwrap_err();
        assert!(matches!(err, AclError::Config(_)));

        let config = AclConfigBuilder::new()
            .server_host("head01")
            .group_cache_capacity(MAX_GROUP_CACHE_CAPACITY)
            .build()
            .unwrap();
        assert_eq!(config.group_cache_capacity, MAX_GROUP_CACHE_CAPACITY);

        assert!(matches!(
            AclConfigBuilder::new()
                .server_host("head01")
                .group_cache_capacity(MAX_GROUP_CACHE_CAPACITY + 1)
                .build(),
            Err(AclError::Config(_))
        ));
    }
}
