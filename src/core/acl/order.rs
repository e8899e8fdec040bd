//! Insertion ordering for ACL rules
//!
//! Every comparator receives the rule already stored first and the incoming
//! rule second. A new rule is inserted in front of the first stored rule that
//! compares [`Ordering::Greater`] against it. All ACL comparators ignore a
//! leading `+`/`-` so allow and deny entries interleave by pattern.

use super::rule::strip_sign;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Closed set of ordering strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleOrder {
    /// Tail-first comparison of host names, wildcards after specific names
    Host,
    /// User name from the head, then the host part in host order
    User,
    /// Plain byte order of the group name
    Group,
    /// Byte order of the whole entry, for string arrays that are not ACLs
    Lexical,
}

impl RuleOrder {
    /// Compare a stored rule against an incoming one
    pub fn compare(self, stored: &str, incoming: &str) -> Ordering {
        match self {
            RuleOrder::Host => host_order(stored, incoming),
            RuleOrder::User => user_order(stored, incoming),
            RuleOrder::Group => group_order(stored, incoming),
            RuleOrder::Lexical => stored.cmp(incoming),
        }
    }

    /// Index at which `incoming` belongs in `rules`
    pub fn insertion_point<'a, I>(self, rules: I, incoming: &str) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut count = 0;
        for (idx, stored) in rules.into_iter().enumerate() {
            if self.compare(stored, incoming) == Ordering::Greater {
                return idx;
            }
            count = idx + 1;
        }
        count
    }
}

/// Host order: walk both names from the last character toward the first.
///
/// Bytes are compared only while both cursors sit above their first
/// character; a difference orders by the incoming byte minus the stored one.
/// When both cursors reach the first character together, a stored `*` sorts
/// after, an incoming `*` sorts the stored name before, and otherwise the
/// first bytes decide. When only the stored name reaches its first character,
/// it sorts after; when only the incoming one does, the stored name sorts
/// before.
pub(crate) fn host_order(stored: &str, incoming: &str) -> Ordering {
    let s1 = strip_sign(stored).as_bytes();
    let s2 = strip_sign(incoming).as_bytes();

    // -1 marks an empty name
    let mut i = s1.len() as isize - 1;
    let mut j = s2.len() as isize - 1;

    while i > 0 && j > 0 {
        let (c1, c2) = (s1[i as usize], s2[j as usize]);
        if c1 != c2 {
            return c2.cmp(&c1);
        }
        i -= 1;
        j -= 1;
    }

    match (i, j) {
        (0, 0) => {
            if s1[0] == b'*' {
                Ordering::Greater
            } else if s2[0] == b'*' {
                Ordering::Less
            } else {
                s2[0].cmp(&s1[0])
            }
        }
        (0, _) => Ordering::Greater,
        _ => Ordering::Less,
    }
}

/// User order: compare user names from the head; at `@` or at the end of
/// both names hand the remaining host parts to [`host_order`].
pub(crate) fn user_order(stored: &str, incoming: &str) -> Ordering {
    let s1 = strip_sign(stored);
    let s2 = strip_sign(incoming);
    let (b1, b2) = (s1.as_bytes(), s2.as_bytes());

    let mut k = 0;
    loop {
        let c1 = b1.get(k).copied().unwrap_or(0);
        let c2 = b2.get(k).copied().unwrap_or(0);
        if c1 != c2 {
            return c1.cmp(&c2);
        }
        match c1 {
            b'@' => return host_order(&s1[k + 1..], &s2[k + 1..]),
            // Both names ended: compare the empty host parts
            0 => return host_order("", ""),
            _ => k += 1,
        }
    }
}

/// Group order: byte order of the names
pub(crate) fn group_order(stored: &str, incoming: &str) -> Ordering {
    strip_sign(stored).cmp(strip_sign(incoming))
}
