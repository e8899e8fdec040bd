//! Packed rule storage
//!
//! All rule strings of one ACL live back to back in a single byte arena. A
//! parallel table of spans (offset + length) gives the rules their order.
//! Spans are offsets, not addresses, so growing the arena relocates nothing:
//! the table stays valid across any reallocation.
//!
//! ```text
//! arena: |bad.example.com|*.example.com|..spare..|
//!         ^0              ^15           ^28
//! spans: [(0, 15), (15, 13)]
//! ```

use crate::error::{AclError, Result};

/// Location of one rule inside the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: usize,
    len: usize,
}

impl Span {
    fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Current allocation of a [`RuleBuffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferCapacity {
    /// Rule slots allocated in the span table
    pub slots: usize,
    /// Bytes allocated in the arena
    pub bytes: usize,
}

/// Ordered list of rule strings packed into one growable arena
#[derive(Debug, Clone, Default)]
pub struct RuleBuffer {
    arena: Vec<u8>,
    spans: Vec<Span>,
}

impl RuleBuffer {
    /// Create an empty buffer with no backing allocation
    pub fn new() -> Self {
        RuleBuffer {
            arena: Vec::new(),
            spans: Vec::new(),
        }
    }

    /// Number of stored rules
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// True when no rules are stored
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Bytes of rule text currently stored
    pub fn used_bytes(&self) -> usize {
        self.arena.len()
    }

    /// Allocated slots and arena bytes
    pub fn capacity(&self) -> BufferCapacity {
        BufferCapacity {
            slots: self.spans.capacity(),
            bytes: self.arena.capacity(),
        }
    }

    /// Rule at `index` in table order
    pub fn get(&self, index: usize) -> Option<&str> {
        let span = self.spans.get(index)?;
        std::str::from_utf8(&self.arena[span.start..span.end()]).ok()
    }

    /// Iterate rules in table order
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        (0..self.spans.len()).filter_map(move |i| self.get(i))
    }

    /// Index of the first rule exactly equal to `text`
    pub fn position(&self, text: &str) -> Option<usize> {
        self.iter().position(|rule| rule == text)
    }

    /// Make room for `extra_slots` more rules holding `extra_bytes` more bytes
    ///
    /// Arena growth reserves `used + 2 * extra_bytes` so a run of small
    /// appends does not reallocate every time; slot growth reserves
    /// `3 * required / 2`. On failure nothing has been written and the
    /// buffer is exactly as it was.
    pub fn ensure_capacity(&mut self, extra_slots: usize, extra_bytes: usize) -> Result<()> {
        let used = self.arena.len();
        if self.arena.capacity() - used < extra_bytes {
            let target = used
                .checked_add(extra_bytes.saturating_mul(2))
                .ok_or(AclError::OutOfMemory {
                    requested: usize::MAX,
                })?;
            self.arena
                .try_reserve_exact(target - used)
                .map_err(|_| AclError::OutOfMemory { requested: target })?;
        }

        let required = self
            .spans
            .len()
            .checked_add(extra_slots)
            .ok_or(AclError::OutOfMemory {
                requested: usize::MAX,
            })?;
        if required > self.spans.capacity() {
            let target = required.saturating_mul(3) / 2;
            self.spans
                .try_reserve_exact(target - self.spans.len())
                .map_err(|_| AclError::OutOfMemory { requested: target })?;
        }

        Ok(())
    }

    /// Insert `text` so that it becomes the rule at `index`
    ///
    /// Bytes of every rule at or after `index` move up by `text.len()` to
    /// open a gap, the text is copied into the gap, and every later span is
    /// shifted by the same amount.
    pub fn insert_before(&mut self, index: usize, text: &str) -> Result<()> {
        if index > self.spans.len() {
            return Err(AclError::InvalidArgument(format!(
                "insert position {} past end of {} rules",
                index,
                self.spans.len()
            )));
        }
        self.ensure_capacity(1, text.len())?;

        let shift = text.len();
        let before = self.arena.len();
        let at = self.spans.get(index).map_or(before, |span| span.start);

        self.arena.resize(before + shift, 0);
        self.arena.copy_within(at..before, at + shift);
        self.arena[at..at + shift].copy_from_slice(text.as_bytes());
        debug_assert_eq!(self.arena.len(), before + shift);

        for span in &mut self.spans[index..] {
            span.start += shift;
        }
        self.spans.insert(index, Span { start: at, len: shift });

        Ok(())
    }

    /// Remove the rule at `index`, compacting the arena
    ///
    /// Returns `false` when `index` is out of range.
    pub fn remove_at(&mut self, index: usize) -> bool {
        if index >= self.spans.len() {
            return false;
        }

        let removed = self.spans.remove(index);
        let before = self.arena.len();

        self.arena.copy_within(removed.end()..before, removed.start);
        self.arena.truncate(before - removed.len);
        debug_assert_eq!(self.arena.len(), before - removed.len);

        for span in &mut self.spans[index..] {
            span.start -= removed.len;
        }

        true
    }

    /// Drop every rule but keep the allocation for reuse
    pub fn clear(&mut self) {
        self.arena.clear();
        self.spans.clear();
    }

    /// Copy the rules out as owned strings
    pub fn to_vec(&self) -> Vec<String> {
        self.iter().map(str::to_string).collect()
    }
}

impl PartialEq for RuleBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for RuleBuffer {}
