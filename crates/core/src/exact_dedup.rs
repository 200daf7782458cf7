//! Exact deduplication using content hashing
//!
//! Keeps the first record seen for each key. Keys are either the full record
//! or a fixed list of columns; null cells compare equal to other null cells
//! and unequal to empty strings. Hashes only route the lookup: two records
//! are duplicates when their key cells are equal.

use ahash::AHashMap;
use bloomfilter::Bloom;
use fastclean_formats::record::hash_cells;
use fastclean_formats::Record;
use tracing::debug;

/// Key cells of one record
type Key = Vec<Option<String>>;

/// Statistics for deduplication operations
#[derive(Debug, Clone, Default)]
pub struct DedupStats {
    /// Total number of records seen
    pub total_seen: usize,
    /// Number of duplicates found
    pub duplicates_found: usize,
    /// Number of unique records
    pub unique_count: usize,
    /// Number of bloom filter hits (potential duplicates)
    pub bloom_hits: usize,
    /// Number of bloom filter misses (definitely unique)
    pub bloom_misses: usize,
    /// Distinct keys that shared a hash with an earlier key
    pub hash_collisions: usize,
}

impl DedupStats {
    /// Get the deduplication rate as a percentage
    pub fn dedup_rate(&self) -> f64 {
        if self.total_seen == 0 {
            0.0
        } else {
            (self.duplicates_found as f64 / self.total_seen as f64) * 100.0
        }
    }
}

/// Strategy for hashing records
#[derive(Debug, Clone)]
pub enum HashStrategy {
    /// Hash every cell of the record
    FullRecord,
    /// Hash only the cells at these positions, in this order
    Columns(Vec<usize>),
}

impl HashStrategy {
    /// Compute hash for a record based on the strategy
    pub fn compute_hash(&self, record: &mut Record) -> u64 {
        match self {
            HashStrategy::FullRecord => record.compute_hash(),
            HashStrategy::Columns(indices) => hash_cells(indices.iter().map(|&idx| record.get(idx))),
        }
    }

    /// Cells compared when two records share a hash
    pub fn key(&self, record: &Record) -> Key {
        match self {
            HashStrategy::FullRecord => record.values().to_vec(),
            HashStrategy::Columns(indices) => indices
                .iter()
                .map(|&idx| record.get(idx).map(str::to_string))
                .collect(),
        }
    }
}

/// Exact deduplicator with bloom filter optimization
pub struct ExactDeduplicator {
    /// Keys seen so far, bucketed by hash
    seen: AHashMap<u64, Vec<Key>>,
    /// Bloom filter for quick negative lookups
    bloom: Bloom<u64>,
    /// Hash strategy
    hash_strategy: HashStrategy,
    /// Statistics
    stats: DedupStats,
}

impl ExactDeduplicator {
    /// Create a new exact deduplicator with default settings
    pub fn new(hash_strategy: HashStrategy) -> Self {
        Self::with_capacity(hash_strategy, 100_000)
    }

    /// Create a new exact deduplicator sized for `capacity` distinct keys
    ///
    /// Bloom filter is configured for ~1% false positive rate.
    pub fn with_capacity(hash_strategy: HashStrategy, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        debug!(
            "Creating ExactDeduplicator with capacity {} and strategy {:?}",
            capacity, hash_strategy
        );

        Self {
            seen: AHashMap::with_capacity(capacity),
            bloom: Bloom::new_for_fp_rate(capacity, 0.01),
            hash_strategy,
            stats: DedupStats::default(),
        }
    }

    /// Check if a record is a duplicate of one seen earlier
    ///
    /// Returns `true` if this is a duplicate, `false` if it is the first
    /// record with its key (which is then remembered).
    pub fn is_duplicate(&mut self, record: &mut Record) -> bool {
        let hash = self.hash_strategy.compute_hash(record);
        let key = self.hash_strategy.key(record);
        self.check_key(hash, key)
    }

    fn check_key(&mut self, hash: u64, key: Key) -> bool {
        self.stats.total_seen += 1;

        // First check bloom filter
        if !self.bloom.check(&hash) {
            // Definitely not seen before
            self.bloom.set(&hash);
            self.seen.insert(hash, vec![key]);
            self.stats.bloom_misses += 1;
            self.stats.unique_count += 1;
            return false;
        }

        // Bloom filter positive
        self.stats.bloom_hits += 1;

        let bucket = self.seen.entry(hash).or_default();
        if bucket.contains(&key) {
            self.stats.duplicates_found += 1;
            return true;
        }

        if !bucket.is_empty() {
            self.stats.hash_collisions += 1;
        }
        bucket.push(key);
        self.stats.unique_count += 1;
        false
    }

    /// Get current statistics
    pub fn stats(&self) -> &DedupStats {
        &self.stats
    }

    /// Get the number of unique keys stored
    pub fn unique_count(&self) -> usize {
        self.seen.values().map(Vec::len).sum()
    }

    /// Clear all seen keys and reset statistics
    pub fn clear(&mut self) {
        self.seen.clear();
        self.bloom.clear();
        self.stats = DedupStats::default();
    }
}

/// Split `records` into first occurrences and later duplicates, keeping order
pub fn partition_duplicates(
    records: Vec<Record>,
    strategy: HashStrategy,
) -> (Vec<Record>, Vec<Record>) {
    let mut dedup = ExactDeduplicator::with_capacity(strategy, records.len());
    let mut unique = Vec::with_capacity(records.len());
    let mut duplicates = Vec::new();

    for mut record in records {
        if dedup.is_duplicate(&mut record) {
            duplicates.push(record);
        } else {
            unique.push(record);
        }
    }

    (unique, duplicates)
}
