//! Access decisions against an ACL
//!
//! Rules are scanned in stored order and the first matching rule decides:
//! `-pattern` denies, `+pattern` or a bare pattern allows. A bare `+` or `-`
//! does not match anything; it changes the decision returned if the scan
//! ends without a match. An unset or empty ACL falls back to the configured
//! default, except that a host ACL always admits the server's own host under
//! a deny default.

use super::attribute::AclAttribute;
use super::groups::{CachedGroupDirectory, GroupDirectory, OsGroupDirectory};
use super::matcher::RuleMatcher;
use super::rule::{AclType, Rule};
use crate::config::AclConfig;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, trace};

/// ACL policy evaluator
pub struct AclEvaluator {
    config: AclConfig,
    groups: Arc<dyn GroupDirectory>,
}

impl AclEvaluator {
    /// Create an evaluator using the OS user database for group rules
    pub fn new(config: AclConfig) -> Self {
        let groups: Arc<dyn GroupDirectory> = match NonZeroUsize::new(config.group_cache_capacity)
        {
            Some(capacity) => Arc::new(CachedGroupDirectory::new(OsGroupDirectory::new(), capacity)),
            None => Arc::new(OsGroupDirectory::new()),
        };
        Self::with_directory(config, groups)
    }

    /// Create an evaluator with a caller-supplied group directory
    pub fn with_directory(config: AclConfig, groups: Arc<dyn GroupDirectory>) -> Self {
        AclEvaluator { config, groups }
    }

    /// Settings this evaluator decides with
    pub fn config(&self) -> &AclConfig {
        &self.config
    }

    /// Decide whether `candidate` is admitted by `acl`
    ///
    /// `acl_type` selects the matching semantics; subnet checks run against
    /// the same attribute as host checks.
    ///
    /// # Examples
    ///
    /// ```
    /// use batch_acl::acl::{AclAttribute, AclEvaluator, AclType};
    /// use batch_acl::config::AclConfigBuilder;
    ///
    /// let config = AclConfigBuilder::new().server_host("head01").build().unwrap();
    /// let evaluator = AclEvaluator::new(config);
    ///
    /// let acl = AclAttribute::decode(AclType::Host, "*.example.com,-bad.example.com").unwrap();
    /// assert!(evaluator.check(&acl, AclType::Host, Some("foo.example.com")));
    /// assert!(!evaluator.check(&acl, AclType::Host, Some("bad.example.com")));
    /// ```
    pub fn check(&self, acl: &AclAttribute, acl_type: AclType, candidate: Option<&str>) -> bool {
        let rules = if acl.is_set() { acl.rules() } else { None };
        self.check_rules(rules.into_iter().flatten(), acl_type, candidate)
    }

    /// Decide against a plain sequence of stored rules
    pub fn check_rules<'a, I>(&self, rules: I, acl_type: AclType, candidate: Option<&str>) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut default_rtn = self.config.default_policy.allows();

        let Some(candidate) = candidate.filter(|c| !c.is_empty()) else {
            debug!("No {} candidate, returning default {}", acl_type, default_rtn);
            return default_rtn;
        };

        let mut rules = rules.into_iter().peekable();
        if rules.peek().is_none() {
            return self.unset_fallback(acl_type, candidate);
        }

        for text in rules {
            let rule = Rule::parse(text);
            if rule.is_directive() {
                default_rtn = rule.grants();
                trace!("Directive '{}' sets default to {}", text, default_rtn);
                continue;
            }

            if acl_type.matches(candidate, rule.pattern, self.groups.as_ref()) {
                trace!("'{}' matched {} rule '{}'", candidate, acl_type, text);
                return rule.grants();
            }
        }

        debug!(
            "No {} rule matched '{}', returning default {}",
            acl_type, candidate, default_rtn
        );
        default_rtn
    }

    /// Decision for an ACL with no rules
    fn unset_fallback(&self, acl_type: AclType, candidate: &str) -> bool {
        let policy = self.config.default_policy;
        let allowed = match acl_type {
            _ if policy.allows() => true,
            AclType::Host => RuleMatcher::host(candidate, &self.config.server_host),
            _ => false,
        };
        debug!(
            "Empty {} ACL under {:?} default, '{}' {}",
            acl_type,
            policy,
            candidate,
            if allowed { "admitted" } else { "refused" }
        );
        allowed
    }
}
