//! Section arena and document emission.
//!
//! The arena owns every record of one document. Emission runs three
//! passes over the records in allocation order:
//!
//! 1. finalize: hash a prefix of every record,
//! 2. deduplicate-or-emit: link-free records may be redirected to an
//!    identical, already emitted copy; everything else is appended,
//! 3. relocate: every link slot receives its target's final offset.
//!
//! Record 0 is the root record; the header's root offset points at it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::binary::cache::{DedupCache, DedupStats, Probe};
use crate::binary::header::Header;
use crate::binary::section::{SectionId, SectionRecord};
use crate::binary::types::{DEFAULT_HASH_BYTES, HEADER_SIZE, LINK_SIZE};
use crate::binary::writer::NodeWriter;
use crate::error::{Result, TreeError};

// ── Write Config ───────────────────────────────────────────────────

/// Controls how an arena is turned into bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteConfig {
    /// Emit the 12-byte BT header in front of the sections.
    pub include_header: bool,
    /// Try to map identical link-free sections to one copy.
    pub section_deduplication: bool,
    /// Number of leading bytes of each section that are hashed.
    pub hash_bytes: u32,
}

impl Default for WriteConfig {
    fn default() -> Self {
        Self {
            include_header: true,
            section_deduplication: true,
            hash_bytes: DEFAULT_HASH_BYTES,
        }
    }
}

impl WriteConfig {
    /// Load a config from a JSON file. Missing fields keep their defaults.
    pub fn read_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }
}

// ── Emission ───────────────────────────────────────────────────────

/// Bytes of an emitted document plus deduplication statistics.
#[derive(Debug, Clone)]
pub struct Emission {
    pub bytes: Vec<u8>,
    pub stats: DedupStats,
    /// Final offset of every record, indexed by `SectionId`.
    pub offsets: Vec<u32>,
}

impl Emission {
    /// Final offset of one record.
    pub fn offset_of(&self, id: SectionId) -> Option<u32> {
        self.offsets.get(id.index()).copied()
    }
}

// ── Section Arena ──────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct SectionArena {
    records: Vec<SectionRecord>,
}

impl SectionArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh, empty record.
    pub fn allocate(&mut self) -> SectionId {
        let id = SectionId(self.records.len() as u32);
        self.records.push(SectionRecord::new());
        id
    }

    pub fn record(&self, id: SectionId) -> &SectionRecord {
        &self.records[id.index()]
    }

    pub fn record_mut(&mut self, id: SectionId) -> &mut SectionRecord {
        &mut self.records[id.index()]
    }

    /// Number of allocated records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Writer for the document's root value (record 0).
    ///
    /// Fails once a root value has been written.
    pub fn root(&mut self) -> Result<NodeWriter<'_>> {
        if self.records.is_empty() {
            self.allocate();
        } else if !self.records[0].is_empty() {
            return Err(TreeError::RootAlreadyWritten);
        }
        Ok(NodeWriter::root(self, SectionId(0)))
    }

    /// Turn all records into one contiguous byte buffer.
    pub fn emit(&self, config: &WriteConfig) -> Result<Emission> {
        if self.records.first().map_or(true, SectionRecord::is_empty) {
            return Err(TreeError::EmptyDocument);
        }

        let mut output = Vec::new();
        if config.include_header {
            // root offset patched once known
            Header::new(0, 0).encode(&mut output);
        }

        // Pass 1: finalize.
        let mut total = output.len();
        let hashes: Vec<u64> = self
            .records
            .iter()
            .map(|record| {
                total += record.len();
                record.content_hash(config.hash_bytes)
            })
            .collect();
        output.reserve(total);

        // Pass 2: deduplicate or emit.
        let mut cache = DedupCache::new();
        let mut offsets = Vec::with_capacity(self.records.len());

        for (record, &hash) in self.records.iter().zip(&hashes) {
            let dedup = config.section_deduplication && !record.has_links();

            if dedup {
                if let Probe::Hit(offset) = cache.probe(record, hash, &output) {
                    offsets.push(offset);
                    continue;
                }
            }

            let offset = checked_offset(output.len())?;
            checked_offset(output.len() + record.len())?;
            output.extend_from_slice(record.bytes());
            tracing::trace!("emitted section of {} bytes @{}", record.len(), offset);
            offsets.push(offset);

            // Linked records get their placeholders rewritten in pass 3
            // and must never become a dedup target.
            if dedup {
                cache.insert(record, hash, offset);
            }
        }

        // Pass 3: relocate.
        for (record, &base) in self.records.iter().zip(&offsets) {
            for link in record.links() {
                let slot = base as usize + link.at as usize;
                let target = offsets[link.target.index()];
                output[slot..slot + LINK_SIZE].copy_from_slice(&target.to_ne_bytes());
            }
        }

        if config.include_header {
            let mut header = Vec::with_capacity(HEADER_SIZE);
            Header::new(0, offsets[0]).encode(&mut header);
            output[..HEADER_SIZE].copy_from_slice(&header);
        }

        let stats = if config.section_deduplication {
            cache.stats()
        } else {
            DedupStats {
                misses: self.records.len() as u64,
                ..DedupStats::default()
            }
        };

        tracing::debug!(
            "emitted {} sections into {} bytes (hits: {}, near-misses: {}, misses: {}, skipped: {} bytes)",
            self.records.len(),
            output.len(),
            stats.hits,
            stats.near_misses,
            stats.misses,
            stats.bytes_skipped
        );

        Ok(Emission {
            bytes: output,
            stats,
            offsets,
        })
    }
}

fn checked_offset(offset: usize) -> Result<u32> {
    u32::try_from(offset).map_err(|_| TreeError::OffsetOverflow(offset))
}
