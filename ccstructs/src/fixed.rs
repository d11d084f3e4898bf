//! Fixed-width specialization: `u32` keys and `u32` values.
//!
//! Same bucket-and-chain structure as [`crate::table::HashTable`], with the
//! indirection through runtime byte widths stripped out: keys and values
//! live in word-typed parallel arrays, overflow nodes are 16-byte
//! `[key, value, next]` records, and key equality is plain integer
//! comparison instead of a caller-supplied comparator.

use crate::arena::{align_up, Arena, Offset, Usage};
use crate::err::Error;
use crate::link::Link;
use crate::stats::ChainHistogram;
use crate::table::{HashFn, PutOutcome};

/// Width of one key slot.
const KEY_BYTES: usize = 4;
/// Width of one value slot.
const VALUE_BYTES: usize = 4;
/// Width of one `next` word.
const LINK_BYTES: usize = 8;
/// One overflow node: `[key: u32, value: u32, next: u64]`.
const NODE_BYTES: usize = KEY_BYTES + VALUE_BYTES + LINK_BYTES;

/// Offsets of one chain position's key, value, and `next` slots.
#[derive(Clone, Copy)]
struct WordSlot {
    key: Offset,
    value: Offset,
    link: Offset,
}

/// Separate-chaining hash table specialized to word keys and values.
pub struct FixedTable {
    arena: Arena,
    buckets: usize,
    hash: HashFn,
    keys: Offset,
    values: Offset,
    links: Offset,
}

impl FixedTable {
    /// Create a table hashing with the default digest
    /// ([`mixhash::lookup3`] over the key's little-endian bytes).
    pub fn new(buckets: usize, arena_budget: usize) -> Result<Self, Error> {
        Self::with_hasher(buckets, arena_budget, mixhash::lookup3)
    }

    /// Create a table with a caller-chosen digest.
    pub fn with_hasher(buckets: usize, arena_budget: usize, hash: HashFn) -> Result<Self, Error> {
        if buckets == 0 {
            return Err(Error::ZeroBuckets);
        }
        let required = (|| {
            let keys = buckets.checked_mul(KEY_BYTES).map(align_up)?;
            let values = buckets.checked_mul(VALUE_BYTES).map(align_up)?;
            let links = buckets.checked_mul(LINK_BYTES).map(align_up)?;
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
        let keys = arena.alloc_array(buckets, KEY_BYTES);
        let values = arena.alloc_array(buckets, VALUE_BYTES);
        let links = arena.alloc_array(buckets, LINK_BYTES);
        Ok(Self {
            arena,
            buckets,
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

    /// Occupancy report for the private arena.
    pub fn arena_usage(&self) -> Usage {
        self.arena.usage()
    }

    /// Insert `value` under `key`, or overwrite the existing value.
    ///
    /// Panics if the arena cannot hold the overflow node a colliding
    /// insert requires.
    pub fn put(&mut self, key: u32, value: u32) -> PutOutcome {
        let bucket = self.bucket_for(key);
        let head = self.bucket_slot(bucket);

        if self.link_at(head.link) == Link::Empty {
            self.write_u32(head.key, key);
            self.write_u32(head.value, value);
            self.write_link(head.link, Link::Terminal);
            return PutOutcome::Inserted;
        }

        let mut slot = head;
        loop {
            if self.read_u32(slot.key) == key {
                self.write_u32(slot.value, value);
                return PutOutcome::Updated;
            }
            match self.link_at(slot.link) {
                Link::Node(next) => slot = self.node_slot(next),
                Link::Terminal => {
                    let node = self.arena.alloc(NODE_BYTES);
                    let tail = self.node_slot(node);
                    self.write_u32(tail.key, key);
                    self.write_u32(tail.value, value);
                    self.write_link(tail.link, Link::Terminal);
                    self.write_link(slot.link, Link::Node(node));
                    return PutOutcome::Inserted;
                }
                Link::Empty => unreachable!("chain slot past the bucket head is never Empty"),
            }
        }
    }

    /// Look up `key`.
    pub fn get(&self, key: u32) -> Option<u32> {
        let bucket = self.bucket_for(key);
        let mut slot = self.bucket_slot(bucket);
        if self.link_at(slot.link) == Link::Empty {
            return None;
        }
        loop {
            if self.read_u32(slot.key) == key {
                return Some(self.read_u32(slot.value));
            }
            match self.link_at(slot.link) {
                Link::Node(next) => slot = self.node_slot(next),
                _ => return None,
            }
        }
    }

    /// Remove `key`, returning its value.
    ///
    /// Unlinked overflow nodes stay in the arena; see
    /// [`crate::table::HashTable::remove`].
    pub fn remove(&mut self, key: u32) -> Option<u32> {
        let bucket = self.bucket_for(key);
        let head = self.bucket_slot(bucket);
        if self.link_at(head.link) == Link::Empty {
            return None;
        }

        if self.read_u32(head.key) == key {
            let removed = self.read_u32(head.value);
            match self.link_at(head.link) {
                Link::Terminal => self.write_link(head.link, Link::Empty),
                Link::Node(next) => {
                    let follower = self.node_slot(next);
                    let (k, v) = (self.read_u32(follower.key), self.read_u32(follower.value));
                    let after = self.link_at(follower.link);
                    self.write_u32(head.key, k);
                    self.write_u32(head.value, v);
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
                    if self.read_u32(current.key) == key {
                        let removed = self.read_u32(current.value);
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

    fn bucket_for(&self, key: u32) -> usize {
        ((self.hash)(&key.to_le_bytes()) % self.buckets as u64) as usize
    }

    fn bucket_slot(&self, bucket: usize) -> WordSlot {
        WordSlot {
            key: self.keys + bucket * KEY_BYTES,
            value: self.values + bucket * VALUE_BYTES,
            link: self.links + bucket * LINK_BYTES,
        }
    }

    fn node_slot(&self, node: Offset) -> WordSlot {
        WordSlot {
            key: node,
            value: node + KEY_BYTES,
            link: node + KEY_BYTES + VALUE_BYTES,
        }
    }

    /// Alignment-safe word read; the arena region only guarantees byte
    /// alignment.
    fn read_u32(&self, off: Offset) -> u32 {
        bytemuck::pod_read_unaligned(self.arena.bytes(off, KEY_BYTES))
    }

    fn write_u32(&mut self, off: Offset, word: u32) {
        self.arena
            .bytes_mut(off, KEY_BYTES)
            .copy_from_slice(bytemuck::bytes_of(&word));
    }

    fn link_at(&self, off: Offset) -> Link {
        Link::from_raw(self.arena.read_word(off))
    }

    fn write_link(&mut self, off: Offset, link: Link) {
        self.arena.write_word(off, link.to_raw());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hash that surfaces the key word itself, so `key % buckets` picks
    /// the bucket directly.
    fn identity_hash(bytes: &[u8]) -> u64 {
        u64::from(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn colliding_table() -> FixedTable {
        FixedTable::with_hasher(4, 1024, identity_hash).expect("valid configuration")
    }

    #[test]
    fn round_trip_and_update() {
        let mut table = FixedTable::new(64, 8192).expect("valid configuration");
        assert_eq!(table.put(7, 70), PutOutcome::Inserted);
        assert_eq!(table.put(9, 90), PutOutcome::Inserted);
        assert_eq!(table.get(7), Some(70));
        assert_eq!(table.put(7, 71), PutOutcome::Updated);
        assert_eq!(table.get(7), Some(71));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn colliding_keys_share_one_chain() {
        let mut table = colliding_table();
        for key in [0u32, 4, 8] {
            assert_eq!(table.put(key, key * 10), PutOutcome::Inserted);
        }
        for key in [0u32, 4, 8] {
            assert_eq!(table.get(key), Some(key * 10));
        }
        let histogram = table.chain_histogram();
        assert_eq!(histogram.max_chain_len(), 3);
        assert_eq!(histogram.buckets_with_len(0), 3);
    }

    #[test]
    fn remove_relinks_the_chain() {
        let mut table = colliding_table();
        for key in [0u32, 4, 8, 12] {
            table.put(key, key + 100);
        }
        // Middle node, head, then tail.
        assert_eq!(table.remove(4), Some(104));
        assert_eq!(table.remove(0), Some(100));
        assert_eq!(table.remove(12), Some(112));
        assert_eq!(table.remove(4), None);
        assert_eq!(table.get(8), Some(108));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn removing_the_last_entry_empties_the_bucket() {
        let mut table = colliding_table();
        table.put(3, 33);
        assert_eq!(table.remove(3), Some(33));
        assert_eq!(table.get(3), None);
        assert!(table.is_empty());
        // The bucket is usable again after going back to Empty.
        assert_eq!(table.put(3, 34), PutOutcome::Inserted);
        assert_eq!(table.get(3), Some(34));
    }

    #[test]
    fn zero_buckets_is_rejected() {
        assert!(matches!(
            FixedTable::new(0, 1024),
            Err(Error::ZeroBuckets)
        ));
    }
}
