//! ACL rule model
//!
//! A rule is a stored string optionally prefixed with `+` (explicit allow) or
//! `-` (explicit deny). A rule that is exactly `+` or `-` is a default-policy
//! directive rather than a pattern.

use super::groups::GroupDirectory;
use super::matcher::RuleMatcher;
use super::order::RuleOrder;
use crate::error::AclError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Allow/deny prefix of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    /// `+`
    Allow,
    /// `-`
    Deny,
}

impl Sign {
    fn from_byte(b: u8) -> Option<Sign> {
        match b {
            b'+' => Some(Sign::Allow),
            b'-' => Some(Sign::Deny),
            _ => None,
        }
    }
}

/// Borrowed, parsed view of a stored rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule<'a> {
    /// Explicit prefix, if any
    pub sign: Option<Sign>,
    /// Rule text with the prefix removed
    pub pattern: &'a str,
}

impl<'a> Rule<'a> {
    /// Split a stored rule into its prefix and pattern
    ///
    /// # Examples
    /// ```
    /// use batch_acl::acl::{Rule, Sign};
    ///
    /// let rule = Rule::parse("-bad.example.com");
    /// assert_eq!(rule.sign, Some(Sign::Deny));
    /// assert_eq!(rule.pattern, "bad.example.com");
    /// assert!(Rule::parse("+").is_directive());
    /// ```
    pub fn parse(text: &'a str) -> Self {
        match text.as_bytes().first().copied().and_then(Sign::from_byte) {
            Some(sign) => Rule {
                sign: Some(sign),
                pattern: &text[1..],
            },
            None => Rule {
                sign: None,
                pattern: text,
            },
        }
    }

    /// True for a bare `+` or `-`
    pub fn is_directive(&self) -> bool {
        self.sign.is_some() && self.pattern.is_empty()
    }

    /// Decision produced when this rule matches (unprefixed rules allow)
    pub fn grants(&self) -> bool {
        self.sign != Some(Sign::Deny)
    }
}

/// Remove a single leading `+` or `-`
pub(crate) fn strip_sign(text: &str) -> &str {
    Rule::parse(text).pattern
}

/// Identity dimension an ACL applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AclType {
    /// Originating host names, with leading `*` wildcards
    Host,
    /// `user[@host]` entries
    User,
    /// OS group names
    Group,
    /// IPv4 `subnet/mask` entries
    Subnet,
}

impl AclType {
    /// Ordering used when inserting rules of this type
    ///
    /// Subnet entries live in host ACLs alongside host names, so they sort
    /// with host order.
    pub fn order(self) -> RuleOrder {
        match self {
            AclType::Host | AclType::Subnet => RuleOrder::Host,
            AclType::User => RuleOrder::User,
            AclType::Group => RuleOrder::Group,
        }
    }

    /// Check whether `candidate` satisfies the prefix-stripped `pattern`
    pub fn matches(self, candidate: &str, pattern: &str, groups: &dyn GroupDirectory) -> bool {
        match self {
            AclType::Host => RuleMatcher::host(candidate, pattern),
            AclType::User => RuleMatcher::user(candidate, pattern),
            AclType::Group => RuleMatcher::group(candidate, pattern, groups),
            AclType::Subnet => RuleMatcher::subnet(candidate, pattern),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            AclType::Host => "host",
            AclType::User => "user",
            AclType::Group => "group",
            AclType::Subnet => "subnet",
        }
    }
}

impl fmt::Display for AclType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AclType {
    type Err = AclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "host" => Ok(AclType::Host),
            "user" => Ok(AclType::User),
            "group" => Ok(AclType::Group),
            "subnet" => Ok(AclType::Subnet),
            other => Err(AclError::InvalidArgument(format!(
                "unknown ACL type: {}",
                other
            ))),
        }
    }
}

/// Mutation applied to an ACL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchOp {
    /// Replace the whole list (`A = B`)
    Set,
    /// Add entries (`A += B`)
    Incr,
    /// Remove entries (`A -= B`)
    Decr,
}

impl fmt::Display for BatchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BatchOp::Set => "set",
            BatchOp::Incr => "incr",
            BatchOp::Decr => "decr",
        };
        f.write_str(s)
    }
}

impl FromStr for BatchOp {
    type Err = AclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "set" | "=" => Ok(BatchOp::Set),
            "incr" | "+=" | "+" => Ok(BatchOp::Incr),
            "decr" | "-=" | "-" => Ok(BatchOp::Decr),
            other => Err(AclError::InvalidArgument(format!(
                "unknown operation: {}",
                other
            ))),
        }
    }
}
