//! Chain-slot state shared by both table flavors.
//!
//! Every bucket and every overflow node carries one `next` word. The word
//! has three meanings: the bucket has never held an entry, the entry is the
//! last of its chain, or the chain continues at an arena offset. The raw
//! encoding reserves the zero word for the never-used state and the
//! all-ones word for the chain terminator; a real continuation can never
//! collide with either, because the parallel bucket arrays occupy the front
//! of the arena and overflow nodes are always allocated behind them.

use crate::arena::Offset;

/// Raw word for a bucket that has never held an entry.
const EMPTY: u64 = 0;

/// Raw word for the last entry of a live chain.
const TERMINAL: u64 = u64::MAX;

/// Decoded state of one `next` slot.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Link {
    /// Bucket never used.
    Empty,
    /// Last entry of its chain.
    Terminal,
    /// The chain continues at this offset in the owning arena.
    Node(Offset),
}

impl Link {
    /// Decode a stored `next` word.
    pub(crate) fn from_raw(raw: u64) -> Self {
        match raw {
            EMPTY => Self::Empty,
            TERMINAL => Self::Terminal,
            off => Self::Node(off as Offset),
        }
    }

    /// Encode for storage in a `next` word.
    pub(crate) fn to_raw(self) -> u64 {
        match self {
            Self::Empty => EMPTY,
            Self::Terminal => TERMINAL,
            Self::Node(off) => {
                let raw = off as u64;
                debug_assert!(
                    raw != EMPTY && raw != TERMINAL,
                    "node offset {off} collides with a slot sentinel"
                );
                raw
            }
        }
    }
}
