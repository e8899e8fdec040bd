//! Transactional mutation of a rule buffer
//!
//! `Set` replaces, `Incr` inserts in sorted position, `Decr` removes exact
//! matches. A batch either applies completely or not at all: every check and
//! every allocation happens before the first byte of the buffer changes.

use super::buffer::RuleBuffer;
use super::order::RuleOrder;
use super::rule::BatchOp;
use crate::error::{AclError, Result};
use crate::validation::validate_rule;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Apply `op` with the `incoming` rules to `target`
///
/// # Errors
///
/// - `DuplicateRule` if an incoming rule repeats another incoming rule or,
///   for `Incr`, a rule already stored
/// - `InvalidArgument` if an incoming `Set`/`Incr` rule is malformed
/// - `OutOfMemory` if the buffer cannot grow
///
/// On error `target` is unchanged.
///
/// # Examples
///
/// ```
/// use batch_acl::acl::{apply, BatchOp, RuleBuffer, RuleOrder};
///
/// let mut acl = RuleBuffer::new();
/// apply(&mut acl, &["*.example.com", "-bad.example.com"], BatchOp::Set, RuleOrder::Host).unwrap();
/// assert_eq!(acl.to_vec(), vec!["-bad.example.com", "*.example.com"]);
///
/// apply(&mut acl, &["*.example.com"], BatchOp::Decr, RuleOrder::Host).unwrap();
/// assert_eq!(acl.to_vec(), vec!["-bad.example.com"]);
/// ```
pub fn apply<S: AsRef<str>>(
    target: &mut RuleBuffer,
    incoming: &[S],
    op: BatchOp,
    order: RuleOrder,
) -> Result<()> {
    let incoming: Vec<&str> = incoming.iter().map(AsRef::as_ref).collect();

    let result = match op {
        BatchOp::Set => set(target, &incoming, order),
        BatchOp::Incr => incr(target, &incoming, order),
        BatchOp::Decr => {
            decr(target, &incoming);
            Ok(())
        }
    };

    match &result {
        Ok(()) => debug!(
            "Applied {} of {} rules ({:?} order), {} rules stored",
            op,
            incoming.len(),
            order,
            target.len()
        ),
        Err(e) => warn!("Rejected {} of {} rules: {}", op, incoming.len(), e),
    }
    result
}

fn set(target: &mut RuleBuffer, incoming: &[&str], order: RuleOrder) -> Result<()> {
    validate_batch(incoming)?;
    check_duplicates(None, incoming)?;

    // Reserve relative to the current contents so the space is there
    // whatever was stored before the clear.
    let bytes = incoming.iter().map(|r| r.len()).sum();
    target.ensure_capacity(incoming.len(), bytes)?;

    target.clear();
    insert_sorted(target, incoming, order)
}

fn incr(target: &mut RuleBuffer, incoming: &[&str], order: RuleOrder) -> Result<()> {
    validate_batch(incoming)?;
    check_duplicates(Some(target), incoming)?;

    let bytes = incoming.iter().map(|r| r.len()).sum();
    target.ensure_capacity(incoming.len(), bytes)?;

    insert_sorted(target, incoming, order)
}

fn decr(target: &mut RuleBuffer, incoming: &[&str]) {
    for rule in incoming {
        if let Some(idx) = target.position(rule) {
            target.remove_at(idx);
        }
    }
}

/// Insert each rule before the first stored rule that orders after it
///
/// Capacity has been reserved by the caller, so no insertion reallocates.
fn insert_sorted(target: &mut RuleBuffer, incoming: &[&str], order: RuleOrder) -> Result<()> {
    for rule in incoming {
        let at = order.insertion_point(target.iter(), rule);
        target.insert_before(at, rule)?;
    }
    Ok(())
}

fn validate_batch(incoming: &[&str]) -> Result<()> {
    incoming.iter().try_for_each(|rule| validate_rule(rule))
}

/// Reject a rule that appears twice in the batch or is already stored
fn check_duplicates(existing: Option<&RuleBuffer>, incoming: &[&str]) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(incoming.len());
    for rule in incoming {
        if !seen.insert(*rule) {
            return Err(AclError::DuplicateRule(rule.to_string()));
        }
    }

    if let Some(existing) = existing {
        if let Some(dup) = existing.iter().find(|stored| seen.contains(stored)) {
            return Err(AclError::DuplicateRule(dup.to_string()));
        }
    }

    Ok(())
}
