//! Arena-backed open-hashing key/value stores.
//!
//! Everything in this crate allocates from an [`Arena`]: a fixed-capacity
//! byte region with bump-pointer allocation, bulk reset, and stack-order
//! pop. On top of it sit two separate-chaining hash tables, [`HashTable`]
//! with byte-width keys and values plus a caller-supplied comparator and
//! [`FixedTable`] specialized to `u32` words, along with a
//! [`ChainHistogram`] diagnostic for judging how well a hash function
//! spreads a workload.
//!
//! Capacities are commitments, not hints. An arena never grows, a table
//! never rehashes, and exhausting either is treated as a sizing mistake
//! made at creation time: the offending allocation panics rather than
//! returning an error. Recoverable [`Error`]s exist only for
//! configurations that could never work, caught before any memory is
//! committed. Lookup misses and fresh inserts are ordinary results
//! ([`Option`], [`PutOutcome`]), never errors.
//!
//! Single-threaded by design: there is no interior mutability and no
//! locking. Share a table across threads by wrapping it in the coarse
//! lock of your choice; the arena is the real unit of shared state, so
//! one lock per arena is the right grain.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod arena;
mod err;
mod fixed;
mod link;
mod stats;
mod table;

pub use arena::{Arena, Offset, Usage};
pub use err::Error;
pub use fixed::FixedTable;
pub use stats::ChainHistogram;
pub use table::{HashFn, HashTable, KeyCompare, PutOutcome};
