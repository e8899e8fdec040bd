//! OS identity lookups for group ACLs
//!
//! A group rule matches when the candidate user is a member, primary or
//! supplementary, of the named OS group. Every failure along the way (unknown
//! user, database error, allocation failure while building the group list)
//! is reported as "no groups", which the matcher treats as no match.
//!
//! # Platform Support
//!
//! On Unix the lookup goes through `getpwnam_r`, `getgrouplist` and
//! `getgrgid_r`. Elsewhere there is no POSIX group membership: a user's only
//! group is its own name, so a group rule matches by literal comparison.

use super::cache::GroupCache;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use tracing::{debug, trace, warn};

/// Source of user group memberships
pub trait GroupDirectory: Send + Sync {
    /// Names of every group `user` belongs to, or `None` if the user is
    /// unknown or the lookup failed
    fn groups_of(&self, user: &str) -> Option<Vec<String>>;

    /// Check whether `user` is a member of `group`
    fn is_member(&self, user: &str, group: &str) -> bool {
        self.groups_of(user)
            .is_some_and(|groups| groups.iter().any(|g| g == group))
    }
}

/// Group directory backed by the operating system's user database
#[derive(Debug, Clone, Copy, Default)]
pub struct OsGroupDirectory;

impl OsGroupDirectory {
    pub fn new() -> Self {
        OsGroupDirectory
    }
}

impl GroupDirectory for OsGroupDirectory {
    #[cfg(unix)]
    fn groups_of(&self, user: &str) -> Option<Vec<String>> {
        let Ok(c_user) = std::ffi::CString::new(user) else {
            return None;
        };

        let Some(primary) = os::primary_gid(&c_user) else {
            debug!("No passwd entry for user '{}'", user);
            return None;
        };

        let Some(gids) = os::group_ids(&c_user, primary) else {
            warn!("Group list lookup failed for user '{}'", user);
            return None;
        };

        let mut names: Vec<String> = Vec::with_capacity(gids.len());
        for gid in gids {
            if let Some(name) = os::group_name(gid) {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        trace!("User '{}' belongs to {} groups", user, names.len());
        Some(names)
    }

    #[cfg(not(unix))]
    fn groups_of(&self, user: &str) -> Option<Vec<String>> {
        Some(vec![user.to_string()])
    }
}

#[cfg(unix)]
#[allow(unsafe_code)]
mod os {
    use std::ffi::CStr;
    use std::mem::MaybeUninit;
    use std::ptr;

    const INITIAL_BUFFER: usize = 1024;
    const MAX_BUFFER: usize = 1024 * 1024;
    const INITIAL_GROUPS: usize = 32;
    const MAX_GROUPS: usize = 65536;

    // getgrouplist takes int on Apple platforms and gid_t elsewhere
    #[cfg(target_vendor = "apple")]
    type GroupListEntry = libc::c_int;
    #[cfg(not(target_vendor = "apple"))]
    type GroupListEntry = libc::gid_t;

    /// Primary group id of `user`
    pub(super) fn primary_gid(user: &CStr) -> Option<libc::gid_t> {
        let mut buffer = vec![0_u8; INITIAL_BUFFER];
        loop {
            let mut pwd = MaybeUninit::<libc::passwd>::zeroed();
            let mut result: *mut libc::passwd = ptr::null_mut();
            // SAFETY: All arguments are valid pointers with sufficient lifetimes:
            // - `user` is a valid NUL-terminated C string
            // - `pwd` is zeroed storage that getpwnam_r fills in
            // - `buffer` provides scratch space owned by this function
            // - `result` receives the output pointer
            let errno = unsafe {
                libc::getpwnam_r(
                    user.as_ptr(),
                    pwd.as_mut_ptr(),
                    buffer.as_mut_ptr() as *mut libc::c_char,
                    buffer.len(),
                    &mut result,
                )
            };

            if errno == 0 {
                if result.is_null() {
                    return None;
                }
                // SAFETY: `result` is non-null, so getpwnam_r initialized `pwd`.
                let pwd = unsafe { pwd.assume_init() };
                return Some(pwd.pw_gid);
            }

            if errno == libc::ERANGE && buffer.len() < MAX_BUFFER {
                buffer.resize(buffer.len() * 2, 0);
                continue;
            }
            return None;
        }
    }

    /// Primary and supplementary group ids of `user`
    pub(super) fn group_ids(user: &CStr, primary: libc::gid_t) -> Option<Vec<libc::gid_t>> {
        let mut capacity = INITIAL_GROUPS;
        loop {
            let mut groups: Vec<GroupListEntry> = Vec::new();
            groups.try_reserve_exact(capacity).ok()?;
            groups.resize(capacity, 0);
            let mut count = libc::c_int::try_from(capacity).ok()?;

            // SAFETY: `groups` holds `count` writable entries and `user` is a
            // valid C string; getgrouplist writes at most `count` entries and
            // stores the number it needs (or wrote) back into `count`.
            let rc = unsafe {
                libc::getgrouplist(
                    user.as_ptr(),
                    primary as GroupListEntry,
                    groups.as_mut_ptr(),
                    &mut count,
                )
            };

            if rc >= 0 {
                groups.truncate(usize::try_from(count).unwrap_or(0));
                return Some(groups.into_iter().map(|g| g as libc::gid_t).collect());
            }

            let wanted = usize::try_from(count).unwrap_or(0);
            capacity = if wanted > capacity {
                wanted
            } else {
                capacity * 2
            };
            if capacity > MAX_GROUPS {
                return None;
            }
        }
    }

    /// Canonical name of group `gid`
    pub(super) fn group_name(gid: libc::gid_t) -> Option<String> {
        let mut buffer = vec![0_u8; INITIAL_BUFFER];
        loop {
            let mut grp = MaybeUninit::<libc::group>::zeroed();
            let mut result: *mut libc::group = ptr::null_mut();
            // SAFETY: same contract as getpwnam_r above, keyed by gid.
            let errno = unsafe {
                libc::getgrgid_r(
                    gid,
                    grp.as_mut_ptr(),
                    buffer.as_mut_ptr() as *mut libc::c_char,
                    buffer.len(),
                    &mut result,
                )
            };

            if errno == 0 {
                if result.is_null() {
                    return None;
                }
                // SAFETY: `result` is non-null, so getgrgid_r initialized `grp`;
                // `gr_name` points into `buffer`, which outlives this read.
                let name = unsafe {
                    let grp = grp.assume_init();
                    if grp.gr_name.is_null() {
                        return None;
                    }
                    CStr::from_ptr(grp.gr_name).to_str().ok()?.to_owned()
                };
                return Some(name);
            }

            if errno == libc::ERANGE && buffer.len() < MAX_BUFFER {
                buffer.resize(buffer.len() * 2, 0);
                continue;
            }
            return None;
        }
    }
}

/// In-memory user to groups table
#[derive(Debug, Clone, Default)]
pub struct StaticGroupDirectory {
    members: HashMap<String, Vec<String>>,
}

impl StaticGroupDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `user` with the given group names, replacing earlier ones
    pub fn add_user(&mut self, user: &str, groups: &[&str]) {
        self.members.insert(
            user.to_string(),
            groups.iter().map(|g| g.to_string()).collect(),
        );
    }
}

impl GroupDirectory for StaticGroupDirectory {
    fn groups_of(&self, user: &str) -> Option<Vec<String>> {
        self.members.get(user).cloned()
    }
}

/// Group directory with an LRU cache in front of another directory
pub struct CachedGroupDirectory<D> {
    inner: D,
    cache: Mutex<GroupCache>,
}

impl<D: GroupDirectory> CachedGroupDirectory<D> {
    pub fn new(inner: D, capacity: NonZeroUsize) -> Self {
        CachedGroupDirectory {
            inner,
            cache: Mutex::new(GroupCache::new(capacity)),
        }
    }

    /// Forget every cached answer
    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    /// Number of cached users
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }
}

impl<D: GroupDirectory> GroupDirectory for CachedGroupDirectory<D> {
    fn groups_of(&self, user: &str) -> Option<Vec<String>> {
        if let Some(cached) = self.cache.lock().get(user) {
            return cached;
        }

        // Lookup runs unlocked; a concurrent miss for the same user only
        // repeats the lookup.
        let groups = self.inner.groups_of(user);
        self.cache.lock().put(user, groups.clone());
        groups
    }
}
