//! Access control lists for queues and servers
//!
//! Provides:
//! - Packed, ordered rule storage with in-place sorted insertion
//! - Per-type ordering (reverse-domain hosts, `user@host`, groups)
//! - Host wildcard, `user@host`, OS group and IPv4 subnet matching
//! - All-or-nothing set/append/remove mutation with duplicate rejection
//! - First-match evaluation with `+`/`-` default-policy directives
//! - LRU caching of OS group lookups

mod attribute;
mod buffer;
mod cache;
mod evaluator;
mod groups;
mod matcher;
mod mutation;
mod order;
mod rule;

pub use attribute::AclAttribute;
pub use buffer::{BufferCapacity, RuleBuffer};
pub use cache::{CachedGroups, GroupCache};
pub use evaluator::AclEvaluator;
pub use groups::{CachedGroupDirectory, GroupDirectory, OsGroupDirectory, StaticGroupDirectory};
pub use matcher::RuleMatcher;
pub use mutation::apply;
pub use order::RuleOrder;
pub use rule::{AclType, BatchOp, Rule, Sign};
