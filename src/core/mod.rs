//! ACL engine internals
//!
//! - [`acl`] - rule storage, ordering, matching, mutation and evaluation
//! - [`config`] - evaluator settings loaded from TOML
//! - [`error`] - error type shared by every module
//! - [`validation`] - rule text and host name checks

pub mod acl;
pub mod config;
pub mod error;
pub mod validation;
