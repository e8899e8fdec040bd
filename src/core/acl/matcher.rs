//! Matching of candidate identities against ACL rule patterns
//!
//! Patterns reach these functions with the `+`/`-` prefix already removed.
//!
//! - Host: tail-first, ASCII case-insensitive; a `*` as the first pattern
//!   character matches any remaining prefix of the candidate
//!   (`*.example.com` matches `node1.example.com`, not `example.com`)
//! - User: `user[@host]`; a pattern without `@host` matches every host
//! - Group: OS group membership of the candidate user
//! - Subnet: IPv4 `net/mask`, mask dotted or a prefix length; a zero mask
//!   never matches

use super::groups::GroupDirectory;
use std::net::Ipv4Addr;

/// Longest network part accepted in a subnet pattern
const MAX_SUBNET_LEN: usize = 39;

/// Matcher for ACL rule patterns
pub struct RuleMatcher;

impl RuleMatcher {
    /// Check a host name against a host pattern
    ///
    /// # Examples
    /// ```
    /// use batch_acl::acl::RuleMatcher;
    ///
    /// assert!(RuleMatcher::host("node1.Example.COM", "*.example.com"));
    /// assert!(RuleMatcher::host("head.example.com", "head.example.com"));
    /// assert!(!RuleMatcher::host("example.com", "*.example.com"));
    /// ```
    pub fn host(candidate: &str, pattern: &str) -> bool {
        let c = candidate.as_bytes();
        let m = pattern.as_bytes();
        if m.is_empty() {
            return false;
        }

        let mut pc = c.len() as isize - 1;
        let mut pm = m.len() as isize - 1;
        while pc > 0 && pm > 0 {
            if !c[pc as usize].eq_ignore_ascii_case(&m[pm as usize]) {
                return false;
            }
            pc -= 1;
            pm -= 1;
        }

        // One or both cursors reached the first character
        if pm == 0 {
            if m[0] == b'*' {
                return true;
            }
            if pc == 0 && c[0].eq_ignore_ascii_case(&m[0]) {
                return true;
            }
        }
        false
    }

    /// Check `user[@host]` against a user pattern
    ///
    /// User names compare exactly. Without `@` in the pattern any host (or
    /// none) is accepted; otherwise the candidate must carry a host that
    /// matches the pattern's host part under [`RuleMatcher::host`].
    pub fn user(candidate: &str, pattern: &str) -> bool {
        let c = candidate.as_bytes();
        let m = pattern.as_bytes();
        let at = |s: &[u8], k: usize| s.get(k).copied();

        let mut k = 0;
        loop {
            if at(m, k) != at(c, k) {
                return false;
            }
            k += 1;
            if matches!(at(m, k), Some(b'@') | None) {
                break;
            }
        }

        match at(m, k) {
            None => matches!(at(c, k), None | Some(b'@')),
            Some(_) => {
                at(c, k) == Some(b'@') && Self::host(&candidate[k + 1..], &pattern[k + 1..])
            }
        }
    }

    /// Check whether user `candidate` belongs to OS group `group`
    ///
    /// Lookup failures count as no match.
    pub fn group(candidate: &str, group: &str, directory: &dyn GroupDirectory) -> bool {
        directory.is_member(candidate, group)
    }

    /// Check an IPv4 address against `net/mask`
    ///
    /// # Examples
    /// ```
    /// use batch_acl::acl::RuleMatcher;
    ///
    /// assert!(RuleMatcher::subnet("10.0.0.5", "10.0.0.0/24"));
    /// assert!(RuleMatcher::subnet("10.0.0.5", "10.0.0.0/255.255.255.0"));
    /// assert!(!RuleMatcher::subnet("10.0.1.5", "10.0.0.0/24"));
    /// assert!(!RuleMatcher::subnet("1.2.3.4", "10.0.0.0/0"));
    /// ```
    pub fn subnet(candidate: &str, pattern: &str) -> bool {
        let Ok(ip) = candidate.parse::<Ipv4Addr>() else {
            return false;
        };
        let Some((net, mask)) = pattern.split_once('/') else {
            return false;
        };
        if mask.is_empty() || net.len() > MAX_SUBNET_LEN {
            return false;
        }
        let Ok(net) = net.parse::<Ipv4Addr>() else {
            return false;
        };
        let Some(mask) = parse_mask(mask) else {
            return false;
        };
        if mask == 0 {
            return false;
        }

        u32::from(ip) & mask == u32::from(net) & mask
    }
}

/// Parse a dotted mask or a prefix length into a bit mask
fn parse_mask(mask: &str) -> Option<u32> {
    if mask.contains('.') {
        return mask.parse::<Ipv4Addr>().ok().map(u32::from);
    }

    match leading_decimal(mask) {
        0 => Some(0),
        bits @ 1..=32 => Some(u32::MAX << (32 - bits) as u32),
        _ => None,
    }
}

/// Decimal value of the leading digits, `atoi` style: surrounding garbage
/// after the digits is ignored and no digits means zero.
fn leading_decimal(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, d| {
            acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
        });
    if negative {
        -value
    } else {
        value
    }
}
