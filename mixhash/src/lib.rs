//! Non-cryptographic byte-string digests for bucket indexing.
//!
//! Four interchangeable digests of different speed/quality trade-offs, all
//! with the same `(bytes) -> u64` shape so callers can swap them freely:
//!
//! - [`super_fast_hash`]: Hsieh's 16-bit-word mixer; cheap, adequate
//!   avalanche for short keys.
//! - [`lookup2`] / [`lookup3`]: the Jenkins lookup3 family, surfacing one
//!   or both outputs of the same two-output core.
//! - [`casey_hash`]: an AES-round block mix; the strongest diffusion of
//!   the four, hardware-accelerated where the target allows.
//!
//! None of these are cryptographic. They are meant for hash-table bucket
//! selection and similar uses where a collision is a performance problem,
//! not a security problem.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod casey;
mod lookup3;
mod simd128;
mod superfast;

pub use casey::casey_hash;
pub use lookup3::{lookup2, lookup3};
pub use superfast::super_fast_hash;

/// Common shape of every digest in this crate.
pub type Digest = fn(&[u8]) -> u64;
