//! Content-addressed section cache used during emission.
//!
//! 256 buckets, one slot each, indexed by the low byte of the content
//! hash. A miss overwrites the slot, so lookups stay O(1) and allocation
//! free at the price of missing some duplicates.

use crate::binary::section::SectionRecord;

/// Aggregate outcome of the deduplication pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupStats {
    /// Records redirected to an already emitted copy.
    pub hits: u64,
    /// Hash and length matched but the bytes differed.
    pub near_misses: u64,
    /// Records that had to be emitted.
    pub misses: u64,
    /// Bytes not written thanks to hits.
    pub bytes_skipped: u64,
}

#[derive(Debug, Clone, Copy)]
struct CachedSection {
    hash: u64,
    length: u32,
    offset: u32,
}

/// Result of probing the cache for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// Identical bytes were already emitted at this offset.
    Hit(u32),
    /// Same hash and length, different bytes.
    NearMiss,
    Miss,
}

pub struct DedupCache {
    buckets: [Option<CachedSection>; 256],
    stats: DedupStats,
}

impl DedupCache {
    pub fn new() -> Self {
        Self {
            buckets: [None; 256],
            stats: DedupStats::default(),
        }
    }

    #[inline]
    fn bucket(hash: u64) -> usize {
        (hash & 0xFF) as usize
    }

    /// Look for an emitted copy of `record` in `output`.
    pub fn probe(&mut self, record: &SectionRecord, hash: u64, output: &[u8]) -> Probe {
        let Some(cached) = self.buckets[Self::bucket(hash)] else {
            self.stats.misses += 1;
            return Probe::Miss;
        };

        if cached.hash != hash || cached.length as usize != record.len() {
            self.stats.misses += 1;
            return Probe::Miss;
        }

        let start = cached.offset as usize;
        let emitted = output.get(start..start + record.len());
        if emitted == Some(record.bytes()) {
            self.stats.hits += 1;
            self.stats.bytes_skipped += record.len() as u64;
            tracing::debug!(
                "section cache hit @{}, skipped {} bytes",
                cached.offset,
                cached.length
            );
            Probe::Hit(cached.offset)
        } else {
            self.stats.near_misses += 1;
            tracing::debug!("section cache near-miss @{}", cached.offset);
            Probe::NearMiss
        }
    }

    /// Remember that `record` was emitted at `offset`, replacing whatever
    /// occupied its bucket.
    pub fn insert(&mut self, record: &SectionRecord, hash: u64, offset: u32) {
        self.buckets[Self::bucket(hash)] = Some(CachedSection {
            hash,
            length: record.len() as u32,
            offset,
        });
    }

    pub fn stats(&self) -> DedupStats {
        self.stats
    }
}

impl Default for DedupCache {
    fn default() -> Self {
        Self::new()
    }
}
