//! Per-partition byte statistics reported once a map stage finishes.

/// Byte statistics for one upstream shuffle's completed map stage.
///
/// Immutable once constructed. `bytes_by_partition_id[p]` is the total
/// number of bytes produced for pre-shuffle partition `p` across all map
/// tasks of this stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapOutputStatistics {
    /// Identifier of the stage that produced these statistics.
    pub stage_id: u64,
    /// Dense, `P`-long vector of byte counts, indexed by pre-shuffle
    /// partition id.
    pub bytes_by_partition_id: Vec<u64>,
}

impl MapOutputStatistics {
    /// Construct statistics for a stage with the given per-partition byte
    /// counts.
    #[must_use]
    pub fn new(stage_id: u64, bytes_by_partition_id: Vec<u64>) -> Self {
        Self {
            stage_id,
            bytes_by_partition_id,
        }
    }

    /// `P`: the number of pre-shuffle partitions this stage produced.
    #[must_use]
    pub fn partition_count(&self) -> usize {
        self.bytes_by_partition_id.len()
    }

    /// Sum of bytes across all partitions of this stage.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.bytes_by_partition_id.iter().sum()
    }
}
