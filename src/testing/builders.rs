//! Fluent construction of [`MapOutputStatistics`] for tests.

use crate::stats::MapOutputStatistics;

/// A fluent builder for [`MapOutputStatistics`].
///
/// ```
/// use shuffleplan::testing::builders::StatsBuilder;
///
/// let stats = StatsBuilder::new(7)
///     .partition(0, 10)
///     .partition(1, 20)
///     .uniform(90, 2..7)
///     .build();
/// assert_eq!(stats.bytes_by_partition_id, vec![10, 20, 90, 90, 90, 90, 90]);
/// ```
pub struct StatsBuilder {
    stage_id: u64,
    bytes: Vec<u64>,
}

impl StatsBuilder {
    /// Start building statistics for `p` pre-shuffle partitions, all
    /// initially zero.
    #[must_use]
    pub fn new(p: u32) -> Self {
        Self {
            stage_id: 0,
            bytes: vec![0; p as usize],
        }
    }

    /// Set this stage's id (defaults to `0`).
    #[must_use]
    pub fn stage_id(mut self, stage_id: u64) -> Self {
        self.stage_id = stage_id;
        self
    }

    /// Set one partition's byte count.
    #[must_use]
    pub fn partition(mut self, index: usize, bytes: u64) -> Self {
        self.bytes[index] = bytes;
        self
    }

    /// Set every partition in `range` to the same byte count.
    #[must_use]
    pub fn uniform(mut self, bytes: u64, range: std::ops::Range<usize>) -> Self {
        for slot in &mut self.bytes[range] {
            *slot = bytes;
        }
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> MapOutputStatistics {
        MapOutputStatistics::new(self.stage_id, self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_partitioned_statistics() {
        let stats = StatsBuilder::new(5).partition(0, 110).partition(3, 110).build();
        assert_eq!(stats.bytes_by_partition_id, vec![110, 0, 0, 110, 0]);
    }

    #[test]
    fn uniform_fills_a_range() {
        let stats = StatsBuilder::new(5).uniform(7, 1..4).build();
        assert_eq!(stats.bytes_by_partition_id, vec![0, 7, 7, 7, 0]);
    }

    #[test]
    fn stage_id_defaults_to_zero() {
        let stats = StatsBuilder::new(2).build();
        assert_eq!(stats.stage_id, 0);
    }
}
