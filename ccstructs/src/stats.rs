//! Chain-health diagnostics.
//!
//! A [`ChainHistogram`] summarizes how evenly a table's entries spread
//! over its buckets. The numbers measure hash quality and load factor,
//! not correctness: a table with one long chain still answers every
//! lookup, just slowly.

use std::collections::BTreeMap;
use std::fmt;

/// Chain-length distribution and derived clustering metrics.
pub struct ChainHistogram {
    /// Observed chain length mapped to the number of buckets with it.
    classes: BTreeMap<usize, usize>,
    bucket_count: usize,
    entries: usize,
    max_chain_len: usize,
}

impl ChainHistogram {
    /// Build a histogram by asking `chain_len` for every bucket.
    pub(crate) fn collect(bucket_count: usize, mut chain_len: impl FnMut(usize) -> usize) -> Self {
        let mut classes = BTreeMap::new();
        let mut entries = 0;
        let mut max_chain_len = 0;
        for bucket in 0..bucket_count {
            let len = chain_len(bucket);
            *classes.entry(len).or_insert(0) += 1;
            entries += len;
            max_chain_len = max_chain_len.max(len);
        }
        Self {
            classes,
            bucket_count,
            entries,
            max_chain_len,
        }
    }

    /// Total live entries across every chain.
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Bucket count of the table the histogram was taken from.
    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    /// Length of the longest chain; zero for an empty table.
    pub fn max_chain_len(&self) -> usize {
        self.max_chain_len
    }

    /// How many buckets hold a chain of exactly `len` entries.
    pub fn buckets_with_len(&self, len: usize) -> usize {
        self.classes.get(&len).copied().unwrap_or(0)
    }

    /// Every observed `(chain length, bucket count)` class, ascending.
    pub fn classes(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.classes.iter().map(|(&len, &count)| (len, count))
    }

    /// Fraction of buckets that have never held an entry.
    pub fn empty_fraction(&self) -> f64 {
        if self.bucket_count == 0 {
            return 0.0;
        }
        self.buckets_with_len(0) as f64 / self.bucket_count as f64
    }

    /// Mean probes per successful lookup, amortized over all live entries.
    ///
    /// Hitting the i-th entry of a chain costs i probes (the bucket visit
    /// plus one hop per traversed node).
    pub fn mean_probe_len(&self) -> f64 {
        if self.entries == 0 {
            return 0.0;
        }
        let total_probes: usize = self
            .classes
            .iter()
            .map(|(&len, &count)| count * (len * (len + 1) / 2))
            .sum();
        total_probes as f64 / self.entries as f64
    }
}

impl fmt::Display for ChainHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{buckets} buckets, {entries} entries, {empty:.1}% empty",
            buckets = self.bucket_count,
            entries = self.entries,
            empty = self.empty_fraction() * 100.0,
        )?;
        for (len, count) in self.classes() {
            if len == 0 {
                continue;
            }
            let noun = if count == 1 { "bucket" } else { "buckets" };
            writeln!(f, "  chain length {len}: {count} {noun}")?;
        }
        write!(
            f,
            "  longest chain {max}, {probes:.2} mean probes per hit",
            max = self.max_chain_len,
            probes = self.mean_probe_len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_loaded_bucket() {
        let lengths = [3, 0, 0, 0];
        let histogram = ChainHistogram::collect(lengths.len(), |b| lengths[b]);
        assert_eq!(histogram.entries(), 3);
        assert_eq!(histogram.max_chain_len(), 3);
        assert_eq!(histogram.buckets_with_len(0), 3);
        assert_eq!(histogram.buckets_with_len(3), 1);
        assert!((histogram.empty_fraction() - 0.75).abs() < 1e-9);
        assert!((histogram.mean_probe_len() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn empty_table() {
        let histogram = ChainHistogram::collect(8, |_| 0);
        assert_eq!(histogram.entries(), 0);
        assert_eq!(histogram.max_chain_len(), 0);
        assert!((histogram.empty_fraction() - 1.0).abs() < 1e-9);
        assert_eq!(histogram.mean_probe_len(), 0.0);
    }

    #[test]
    fn report_mentions_every_observed_class() {
        let lengths = [2, 1, 1, 0];
        let histogram = ChainHistogram::collect(lengths.len(), |b| lengths[b]);
        let report = histogram.to_string();
        assert!(report.contains("4 entries"), "{report}");
        assert!(report.contains("chain length 1: 2 buckets"), "{report}");
        assert!(report.contains("chain length 2: 1 bucket"), "{report}");
        assert!(report.contains("longest chain 2"), "{report}");
    }
}
