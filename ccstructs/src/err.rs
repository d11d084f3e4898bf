//! Error types for the `ccstructs` crate

/// Errors applicable to constructing arena-backed tables.
///
/// These cover misconfiguration caught at creation time. Once a table has
/// been created successfully, lookups and insertions never fail
/// recoverably; exhausting the arena mid-insertion is a contract violation
/// and panics at the allocation site.
#[derive(Clone, Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A table cannot hash into zero buckets.
    #[error("table needs at least one bucket")]
    ZeroBuckets,

    /// Keys and values are fixed-width; a zero width would make every
    /// entry indistinguishable.
    #[error("key and value widths must be nonzero")]
    ZeroWidth,

    /// The arena budget cannot even hold the bucket arrays, let alone any
    /// overflow nodes.
    #[error("arena budget of {budget} bytes cannot hold {required} bytes of bucket arrays")]
    Budget {
        /// The budget the caller asked for.
        budget: usize,
        /// The bytes the bucket arrays alone require.
        required: usize,
    },
}
