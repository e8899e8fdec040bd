//! Validation for ACL rule text and host identities
//!
//! Rules are stored verbatim, but they must survive the external text form
//! (entries joined by commas or new-lines), so the separators themselves and
//! NUL bytes are refused before a rule ever reaches the rule buffer.

use crate::error::{AclError, Result};
use regex::Regex;

/// Longest rule accepted by [`validate_rule`]
pub const MAX_RULE_LEN: usize = 1024;

/// Characters that delimit entries in the external text form
pub const SEPARATORS: [char; 2] = [',', '\n'];

/// Pattern for a server host name (labels of letters, digits, `-` and `_`)
const HOST_PATTERN: &str = r"^[A-Za-z0-9]([A-Za-z0-9._-]*[A-Za-z0-9])?$";

/// Validate a single incoming rule
///
/// # Rules
/// - Must not be empty
/// - At most [`MAX_RULE_LEN`] bytes
/// - No `,`, `\n` or NUL
/// - No leading or trailing whitespace (the text form trims entries)
///
/// # Examples
///
/// ```
/// use batch_acl::validation::validate_rule;
///
/// assert!(validate_rule("+*.example.com").is_ok());
/// assert!(validate_rule("-").is_ok());
/// assert!(validate_rule("a,b").is_err());
/// assert!(validate_rule("").is_err());
/// ```
pub fn validate_rule(rule: &str) -> Result<()> {
    if rule.is_empty() {
        return Err(AclError::InvalidArgument(
            "rule cannot be empty".to_string(),
        ));
    }

    if rule.len() > MAX_RULE_LEN {
        return Err(AclError::InvalidArgument(format!(
            "rule too long ({} bytes, max {})",
            rule.len(),
            MAX_RULE_LEN
        )));
    }

    if rule.trim_matches(|c: char| c.is_ascii_whitespace()) != rule {
        return Err(AclError::InvalidArgument(format!(
            "rule '{}' has surrounding whitespace",
            rule.escape_debug()
        )));
    }

    if let Some(bad) = rule.chars().find(|c| SEPARATORS.contains(c) || *c == '\0') {
        return Err(AclError::InvalidArgument(format!(
            "rule '{}' contains reserved character {:?}",
            rule.escape_debug(),
            bad
        )));
    }

    Ok(())
}

/// Validate the host name the server identifies itself with
///
/// Used by the configuration layer: the Host fallback compares candidates
/// against this name, so it has to be a plain host name.
pub fn validate_server_host(host: &str) -> Result<()> {
    if host.is_empty() {
        return Err(AclError::Config(
            "server_host cannot be empty".to_string(),
        ));
    }

    let re = Regex::new(HOST_PATTERN).map_err(|e| AclError::Config(e.to_string()))?;
    if !re.is_match(host) {
        return Err(AclError::Config(format!(
            "server_host '{}' is not a valid host name",
            host.escape_debug()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_rules() {
        assert!(validate_rule("alice").is_ok());
        assert!(validate_rule("-bob@*.example.com").is_ok());
        assert!(validate_rule("10.0.0.0/255.255.255.0").is_ok());
        assert!(validate_rule("+").is_ok());
        assert!(validate_rule("*").is_ok());
    }

    #[test]
    fn test_empty_rule() {
        assert!(matches!(
            validate_rule(""),
            Err(AclError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_separators_rejected() {
        assert!(validate_rule("alice,bob").is_err());
        assert!(validate_rule("alice\nbob").is_err());
        assert!(validate_rule("alice\0").is_err());
    }

    #[test]
    fn test_surrounding_whitespace_rejected() {
        assert!(validate_rule(" alice").is_err());
        assert!(validate_rule("alice\t").is_err());
        assert!(validate_rule("alice smith").is_ok());
    }

    #[test]
    fn test_length_limit() {
        let at_limit = "a".repeat(MAX_RULE_LEN);
        assert!(validate_rule(&at_limit).is_ok());

        let too_long = "a".repeat(MAX_RULE_LEN + 1);
        assert!(validate_rule(&too_long).is_err());
    }

    #[test]
    fn test_server_host() {
        assert!(validate_server_host("batch-head").is_ok());
        assert!(validate_server_host("head01.cluster.example.com").is_ok());
        assert!(validate_server_host("node_7").is_ok());

        assert!(validate_server_host("").is_err());
        assert!(validate_server_host("-leading").is_err());
        assert!(validate_server_host("trailing.").is_err());
        assert!(validate_server_host("two words").is_err());
        assert!(validate_server_host("a,b").is_err());
    }
}
