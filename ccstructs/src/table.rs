//! Open-hashing table with byte-width keys and values.
//!
//! A table is defined by four parameters fixed at creation: the bucket
//! count, the key width, the value width, and a key comparator. Runtime
//! state is three parallel arrays carved from a private arena (key slots,
//! value slots, and `next` words), with collision chains continuing through
//! `(key, value, next)` overflow nodes allocated from the same arena. The
//! bucket arrays are never resized; a table only grows by allocating
//! overflow nodes until its arena runs out.

use crate::arena::{align_up, Arena, Offset, Usage};
use crate::err::Error;
use crate::link::Link;
use crate::stats::ChainHistogram;
use std::cmp::Ordering;

/// Caller-supplied key equality, in three-way form.
///
/// Only the `Equal`/non-`Equal` outcome is consulted; tables never rely on
/// an ordering beyond equality detection.
pub type KeyCompare = fn(&[u8], &[u8]) -> Ordering;

/// Pluggable digest used to map keys to buckets.
pub type HashFn = fn(&[u8]) -> u64;

/// The two successful outcomes of a [`HashTable::put`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PutOutcome {
    /// The key was not present; a fresh entry was created.
    Inserted,
    /// The key was present; its value was overwritten in place.
    Updated,
}

/// Offsets of one chain position's key, value, and `next` slots.
///
/// A position is either a bucket head (slots live in the parallel arrays)
/// or an overflow node (slots are contiguous); either way the walk code
/// only sees the three offsets.
#[derive(Clone, Copy)]
struct SlotRef {
    key: Offset,
    value: Offset,
    link: Offset,
}

/// Aligned byte size of one parallel array; `None` on overflow.
fn array_bytes(buckets: usize, width: usize) -> Option<usize> {
    buckets.checked_mul(width).map(align_up)
}

/// Separate-chaining hash table over arena storage.
pub struct HashTable {
    arena: Arena,
    buckets: usize,
    key_width: usize,
    value_width: usize,
    cmp: KeyCompare,
    hash: HashFn,
    keys: Offset,
    values: Offset,
    links: Offset,
}

impl HashTable {
    /// Create a table hashing with the default digest
    /// ([`mixhash::lookup3`]).
    ///
    /// The table allocates a private arena of `arena_budget` bytes and
    /// carves its bucket arrays from the front of it; the remainder serves
    /// overflow nodes. Budgets should be sized from the expected entry
    /// count: each colliding entry costs one `(key, value, next)` node of
    /// `key_width + value_width + 8` bytes, rounded to 8.
    pub fn new(
        buckets: usize,
        key_width: usize,
        value_width: usize,
        cmp: KeyCompare,
        arena_budget: usize,
    ) -> Result<Self, Error> {
        Self::with_hasher(buckets, key_width, value_width, cmp, arena_budget, mixhash::lookup3)
    }

    /// Create a table with a caller-chosen digest.
    pub fn with_hasher(
        buckets: usize,
        key_width: usize,
        value_width: usize,
        cmp: KeyCompare,
        arena_budget: usize,
        hash: HashFn,
    ) -> Result<Self, Error> {
        if buckets == 0 {
            return Err(Error::ZeroBuckets);
        }
        if key_width == 0 || value_width == 0 {
            return Err(Error::ZeroWidth);
        }
        let required = (|| {
            let keys = array_bytes(buckets, key_width)?;
            let values = array_bytes(buckets, value_width)?;
            let links = array_bytes(buckets, 8)?;
            keys.checked_add(values)?.checked_add(links)
        })()
        .unwrap_or(usize::MAX);
        if arena_budget < required {
            return Err(Error::Budget {
                budget: arena_budget,
                required,
            });
        }

        let mut arena = Arena::new(arena_budget);
        let keys = arena.alloc_array(buckets, key_width);
        let values = arena.alloc_array(buckets, value_width);
        let links = arena.alloc_array(buckets, 8);
        // A fresh arena is zeroed, so every `next` word already decodes as
        // Link::Empty.
        Ok(Self {
            arena,
            buckets,
            key_width,
            value_width,
            cmp,
            hash,
            keys,
            values,
            links,
        })
    }

    /// Bucket count fixed at creation.
    pub fn buckets(&self) -> usize {
        self.buckets
    }

    /// Key width in bytes, fixed at creation.
    pub fn key_width(&self) -> usize {
        self.key_width
    }

    /// Value width in bytes, fixed at creation.
    pub fn value_width(&self) -> usize {
        self.value_width
    }

    /// Occupancy report for the private arena.
    pub fn arena_usage(&self) -> Usage {
        self.arena.usage()
    }

    /// Insert `value` under `key`, or overwrite the existing value.
    ///
    /// Panics if the arena cannot hold the overflow node a colliding
    /// insert requires, or if `key`/`value` do not match the widths fixed
    /// at creation.
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> PutOutcome {
        self.check_widths(key, value);
        let bucket = self.bucket_for(key);
        let head = self.bucket_slot(bucket);

        if self.link_at(head.link) == Link::Empty {
            self.write_entry(head, key, value);
            self.write_link(head.link, Link::Terminal);
            return PutOutcome::Inserted;
        }

        let mut slot = head;
        loop {
            if self.key_matches(slot, key) {
                let width = self.value_width;
                self.arena.bytes_mut(slot.value, width).copy_from_slice(value);
                return PutOutcome::Updated;
            }
            match self.link_at(slot.link) {
                Link::Node(next) => slot = self.node_slot(next),
                Link::Terminal => {
                    let node = self.arena.alloc(self.node_size());
                    let tail = self.node_slot(node);
                    self.write_entry(tail, key, value);
                    self.write_link(tail.link, Link::Terminal);
                    self.write_link(slot.link, Link::Node(node));
                    return PutOutcome::Inserted;
                }
                Link::Empty => unreachable!("chain slot past the bucket head is never Empty"),
            }
        }
    }

    /// Look up `key`, returning a borrow of the stored value bytes.
    ///
    /// Panics if `key` does not match the width fixed at creation.
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        assert_eq!(
            key.len(),
            self.key_width,
            "key is {got} bytes, table stores {want}-byte keys",
            got = key.len(),
            want = self.key_width,
        );
        let bucket = self.bucket_for(key);
        let mut slot = self.bucket_slot(bucket);
        if self.link_at(slot.link) == Link::Empty {
            return None;
        }
        loop {
            if self.key_matches(slot, key) {
                return Some(self.arena.bytes(slot.value, self.value_width));
            }
            match self.link_at(slot.link) {
                Link::Node(next) => slot = self.node_slot(next),
                _ => return None,
            }
        }
    }

    /// Remove `key`, returning its value.
    ///
    /// The entry is unlinked from its chain; an unlinked overflow node's
    /// storage stays in the arena (there is no per-node free), which only
    /// matters for long-lived tables with heavy removal churn.
    pub fn remove(&mut self, key: &[u8]) -> Option<Vec<u8>> {
        assert_eq!(
            key.len(),
            self.key_width,
            "key is {got} bytes, table stores {want}-byte keys",
            got = key.len(),
            want = self.key_width,
        );
        let bucket = self.bucket_for(key);
        let head = self.bucket_slot(bucket);
        if self.link_at(head.link) == Link::Empty {
            return None;
        }

        if self.key_matches(head, key) {
            let removed = self.arena.bytes(head.value, self.value_width).to_vec();
            match self.link_at(head.link) {
                // Sole entry: the bucket goes back to never-used.
                Link::Terminal => self.write_link(head.link, Link::Empty),
                // Promote the first overflow node into the head slots; the
                // node's storage is leaked.
                Link::Node(next) => {
                    let follower = self.node_slot(next);
                    self.arena.copy_within(follower.key, head.key, self.key_width);
                    self.arena
                        .copy_within(follower.value, head.value, self.value_width);
                    let after = self.link_at(follower.link);
                    self.write_link(head.link, after);
                }
                Link::Empty => unreachable!("head link was checked non-Empty above"),
            }
            return Some(removed);
        }

        let mut prev = head;
        loop {
            match self.link_at(prev.link) {
                Link::Node(next) => {
                    let current = self.node_slot(next);
                    if self.key_matches(current, key) {
                        let removed = self.arena.bytes(current.value, self.value_width).to_vec();
                        let after = self.link_at(current.link);
                        self.write_link(prev.link, after);
                        return Some(removed);
                    }
                    prev = current;
                }
                _ => return None,
            }
        }
    }

    /// Count live entries by walking every bucket and chain.
    pub fn len(&self) -> usize {
        (0..self.buckets).map(|bucket| self.chain_len(bucket)).sum()
    }

    /// True when no bucket holds an entry.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Chain-length histogram and derived clustering metrics.
    pub fn chain_histogram(&self) -> ChainHistogram {
        ChainHistogram::collect(self.buckets, |bucket| self.chain_len(bucket))
    }

    /// Entries in one bucket's chain; zero for a never-used bucket.
    fn chain_len(&self, bucket: usize) -> usize {
        let mut slot = self.bucket_slot(bucket);
        if self.link_at(slot.link) == Link::Empty {
            return 0;
        }
        let mut len = 1;
        while let Link::Node(next) = self.link_at(slot.link) {
            slot = self.node_slot(next);
            len += 1;
        }
        len
    }

    fn check_widths(&self, key: &[u8], value: &[u8]) {
        assert_eq!(
            key.len(),
            self.key_width,
            "key is {got} bytes, table stores {want}-byte keys",
            got = key.len(),
            want = self.key_width,
        );
        assert_eq!(
            value.len(),
            self.value_width,
            "value is {got} bytes, table stores {want}-byte values",
            got = value.len(),
            want = self.value_width,
        );
    }

    fn bucket_for(&self, key: &[u8]) -> usize {
        ((self.hash)(key) % self.buckets as u64) as usize
    }

    fn bucket_slot(&self, bucket: usize) -> SlotRef {
        SlotRef {
            key: self.keys + bucket * self.key_width,
            value: self.values + bucket * self.value_width,
            link: self.links + bucket * 8,
        }
    }

    /// Slot view of an overflow node: `(key, value, next)` laid out
    /// contiguously at `node`.
    fn node_slot(&self, node: Offset) -> SlotRef {
        SlotRef {
            key: node,
            value: node + self.key_width,
            link: node + self.key_width + self.value_width,
        }
    }

    fn node_size(&self) -> usize {
        self.key_width + self.value_width + 8
    }

    fn key_matches(&self, slot: SlotRef, key: &[u8]) -> bool {
        (self.cmp)(self.arena.bytes(slot.key, self.key_width), key) == Ordering::Equal
    }

    fn link_at(&self, off: Offset) -> Link {
        Link::from_raw(self.arena.read_word(off))
    }

    fn write_link(&mut self, off: Offset, link: Link) {
        self.arena.write_word(off, link.to_raw());
    }

    fn write_entry(&mut self, slot: SlotRef, key: &[u8], value: &[u8]) {
        let (kw, vw) = (self.key_width, self.value_width);
        self.arena.bytes_mut(slot.key, kw).copy_from_slice(key);
        self.arena.bytes_mut(slot.value, vw).copy_from_slice(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn byte_cmp(a: &[u8], b: &[u8]) -> Ordering {
        a.cmp(b)
    }

    fn small_table() -> HashTable {
        HashTable::new(16, 4, 8, byte_cmp, 4096).expect("valid configuration")
    }

    #[test]
    fn put_then_get_round_trips() {
        let mut table = small_table();
        assert_eq!(table.put(b"key1", b"value--1"), PutOutcome::Inserted);
        assert_eq!(table.get(b"key1"), Some(&b"value--1"[..]));
    }

    #[test]
    fn second_put_updates_in_place() {
        let mut table = small_table();
        table.put(b"key1", b"value--1");
        assert_eq!(table.put(b"key1", b"value--2"), PutOutcome::Updated);
        assert_eq!(table.get(b"key1"), Some(&b"value--2"[..]));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn missing_key_is_none() {
        let mut table = small_table();
        assert_eq!(table.get(b"gone"), None);
        table.put(b"here", b"present!");
        assert_eq!(table.get(b"gone"), None);
    }

    #[test]
    fn creation_rejects_bad_configurations() {
        assert!(matches!(
            HashTable::new(0, 4, 4, byte_cmp, 1024),
            Err(Error::ZeroBuckets)
        ));
        assert!(matches!(
            HashTable::new(8, 0, 4, byte_cmp, 1024),
            Err(Error::ZeroWidth)
        ));
        assert!(matches!(
            HashTable::new(1024, 16, 16, byte_cmp, 64),
            Err(Error::Budget { .. })
        ));
    }

    #[test]
    #[should_panic(expected = "table stores 4-byte keys")]
    fn wrong_key_width_panics() {
        let table = small_table();
        let _ = table.get(b"toolong");
    }

    #[test]
    #[should_panic(expected = "arena exhausted")]
    fn overflow_nodes_beyond_the_budget_panic() {
        // Budget fits the bucket arrays plus one overflow node. One bucket,
        // so every insert after the first needs a node.
        let arrays = align_up(4) + align_up(8) + align_up(8);
        let node = align_up(4 + 8 + 8);
        let mut table =
            HashTable::new(1, 4, 8, byte_cmp, arrays + node).expect("valid configuration");
        table.put(b"aaaa", b"11111111");
        table.put(b"bbbb", b"22222222");
        table.put(b"cccc", b"33333333");
    }
}
