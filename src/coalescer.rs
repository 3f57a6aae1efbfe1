//! Pure function mapping per-partition byte matrices to start-index arrays.
//!
//! Single-pass, greedy, left-to-right, no backtracking -- mirrors the
//! teacher's planner passes (`fuse_stateless`, `suggest_partitions`): cheap,
//! total, and order-preserving so downstream operators that rely on
//! partition ordering (e.g. range-partitioned joins) stay correct.

use crate::stats::MapOutputStatistics;

/// The floor under which `capByMin` may never fall, so that an all-zero
/// `total` doesn't force every pre-partition into its own post-partition.
const MIN_PARTITIONS_CAP_FLOOR: u64 = 16;

/// Compute post-shuffle partition start indices for one or more upstream
/// shuffles that all share the same pre-shuffle partition count.
///
/// # Panics
///
/// Panics if `stats` is non-empty and its elements don't all report the
/// same partition count, or if that count is `0`. Both are structural
/// invariants of the surrounding system (one partitioner decides `P` for
/// every sibling shuffle feeding the same downstream operator) that this
/// pure function assumes already hold; [`crate::coordinator::ExchangeCoordinator`]
/// is responsible for validating them before calling in and turning a
/// violation into a typed, non-panicking error.
#[must_use]
pub fn coalesce(stats: &[MapOutputStatistics], target_bytes: u64, min_partitions: Option<u32>) -> Vec<u32> {
    assert!(!stats.is_empty(), "coalesce is not called with empty stats; the coordinator represents that case as None");
    let p = stats[0].partition_count();
    assert!(p >= 1, "partition count must be >= 1");
    assert!(
        stats.iter().all(|s| s.partition_count() == p),
        "all stats must share the same pre-shuffle partition count"
    );

    let effective_target = effective_target_bytes(stats, target_bytes, min_partitions);

    let mut start_indices = vec![0u32];
    let mut acc: u64 = 0;
    for pre in 0..p {
        acc += stats.iter().map(|s| s.bytes_by_partition_id[pre]).sum::<u64>();
        if acc >= effective_target && pre < p - 1 {
            start_indices.push((pre + 1) as u32);
            acc = 0;
        }
    }
    start_indices
}

/// §4.1 "Effective target": `minPartitions` only ever shrinks the target
/// (more, smaller partitions); it never grows it past the advisory value.
fn effective_target_bytes(stats: &[MapOutputStatistics], target_bytes: u64, min_partitions: Option<u32>) -> u64 {
    let Some(min_partitions) = min_partitions else {
        return target_bytes;
    };
    let total: u64 = stats.iter().map(MapOutputStatistics::total_bytes).sum();
    let cap_by_min = (total.div_ceil(u64::from(min_partitions.max(1)))).max(MIN_PARTITIONS_CAP_FLOOR);
    cap_by_min.min(target_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats_from(rows: &[&[u64]]) -> Vec<MapOutputStatistics> {
        rows.iter()
            .enumerate()
            .map(|(i, bytes)| MapOutputStatistics::new(i as u64, bytes.to_vec()))
            .collect()
    }

    #[test]
    fn seed_scenario_1_single_exchange() {
        let stats = stats_from(&[&[110, 10, 100, 110, 0]]);
        let start = coalesce(&stats, 100, None);
        assert_eq!(start, vec![0, 1, 3, 4]);
    }

    #[test]
    fn seed_scenario_2_two_exchanges() {
        let stats = stats_from(&[&[0, 99, 0, 20, 0], &[30, 0, 70, 0, 30]]);
        let start = coalesce(&stats, 100, None);
        assert_eq!(start, vec![0, 2]);
    }

    #[test]
    fn seed_scenario_3_min_partitions_shrinks_target() {
        let stats = stats_from(&[&[10, 5, 5, 0, 20], &[5, 10, 0, 10, 5]]);
        let start = coalesce(&stats, 100, Some(2));
        assert_eq!(start, vec![0, 3]);
    }

    #[test]
    fn seed_scenario_4_all_zero_ignores_min_partitions() {
        let stats = stats_from(&[&[0, 0, 0, 0, 0]]);
        let start = coalesce(&stats, 100, Some(2));
        assert_eq!(start, vec![0]);
    }

    #[test]
    fn every_partition_oversized_is_full_fanout() {
        let stats = stats_from(&[&[200, 200, 200]]);
        let start = coalesce(&stats, 100, None);
        assert_eq!(start, vec![0, 1, 2]);
    }

    #[test]
    fn single_oversized_trailing_partition_gets_its_own() {
        let stats = stats_from(&[&[10, 10, 500]]);
        let start = coalesce(&stats, 100, None);
        assert_eq!(start, vec![0, 2]);
    }

    #[test]
    fn start_indices_are_strictly_increasing_and_bounded() {
        let stats = stats_from(&[&[7, 200, 3, 400, 1, 1, 1, 1]]);
        let start = coalesce(&stats, 50, None);
        assert_eq!(start[0], 0);
        assert!(start.windows(2).all(|w| w[0] < w[1]));
        assert!(start.iter().all(|&s| (s as usize) < 8));
    }

    #[test]
    fn min_partitions_never_exceeds_advisory_target() {
        // total is tiny, so cap_by_min would be well under target_bytes;
        // the 16-byte floor should dominate, not the (even smaller) advisory.
        let stats = stats_from(&[&[1, 1, 1, 1]]);
        let start = coalesce(&stats, 1_000_000, Some(1_000));
        // cap_by_min = max(ceil(4/1000), 16) = 16; effective_target = min(16, 1_000_000) = 16.
        // running sums never reach 16, so everything collapses into one partition.
        assert_eq!(start, vec![0]);
    }

    #[test]
    #[should_panic]
    fn panics_on_mismatched_partition_counts() {
        let stats = stats_from(&[&[1, 2, 3], &[1, 2]]);
        let _ = coalesce(&stats, 100, None);
    }
}
