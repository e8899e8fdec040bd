//! # batch-acl - Access Control Lists for a Cluster Workload Manager
//!
//! `batch-acl` stores and evaluates the host, user, group and subnet ACLs
//! that decide who may submit to, or administer, a queue or server:
//!
//! - **Packed rule storage**: one byte arena per ACL, sorted in place
//! - **Type-aware ordering**: reverse-domain host order, `user@host` order
//! - **Four matchers**: host wildcards, `user@host`, OS groups, IPv4 subnets
//! - **Transactional mutation**: set, append and remove apply whole or not at all
//! - **First-match evaluation** with `+`/`-` default-policy directives
//!
//! ## Quick Start
//!
//! ```rust
//! use batch_acl::{AclAttribute, AclConfigBuilder, AclEvaluator, AclType, BatchOp, Result};
//!
//! # fn main() -> Result<()> {
//! let config = AclConfigBuilder::new().server_host("head01.example.com").build()?;
//! let evaluator = AclEvaluator::new(config);
//!
//! // Decode the external text form; rules are stored in host order
//! let mut hosts = AclAttribute::decode(AclType::Host, "*.example.com")?;
//! hosts.apply(BatchOp::Incr, &["-bad.example.com"])?;
//! assert_eq!(hosts.encode(), "-bad.example.com,*.example.com");
//!
//! assert!(evaluator.check(&hosts, AclType::Host, Some("node7.example.com")));
//! assert!(!evaluator.check(&hosts, AclType::Host, Some("bad.example.com")));
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! ```rust,no_run
//! use batch_acl::{AclConfig, AclEvaluator, Result};
//!
//! # fn main() -> Result<()> {
//! let config = AclConfig::load("/etc/batch/acl.toml")?;
//! let evaluator = AclEvaluator::new(config);
//! # let _ = evaluator;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod core;

pub use crate::core::{acl, config, error, validation};

pub use crate::core::{
    acl::{
        AclAttribute, AclEvaluator, AclType, BatchOp, CachedGroupDirectory, GroupDirectory,
        OsGroupDirectory, Rule, RuleBuffer, RuleMatcher, RuleOrder, Sign, StaticGroupDirectory,
    },
    config::{AclConfig, AclConfigBuilder, DefaultPolicy},
    error::{AclError, Result},
    validation::{validate_rule, MAX_RULE_LEN},
};
