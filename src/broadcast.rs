//! Two-input join broadcast-vs-coalesce policy.

use crate::plan::PostShufflePlan;
use crate::stats::MapOutputStatistics;

/// Which side of a two-input join is small enough to broadcast.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BroadcastSide {
    /// `stats[0]` is the small side; `stats[1]` is large.
    Left,
    /// `stats[1]` is the small side; `stats[0]` is large.
    Right,
}

/// The outcome of a broadcast decision: which side was chosen, and the two
/// plans to hand back (indexed by registration order, i.e. `plans[0]`
/// always corresponds to `stats[0]`'s exchange).
pub struct BroadcastPlan {
    pub side: BroadcastSide,
    pub plans: [PostShufflePlan; 2],
}

/// Applicability gate for the broadcast decision: §4.3 requires a two-input
/// join, the optimization enabled, and exactly two statistics present.
#[must_use]
pub fn is_applicable(is_two_input_join: bool, broadcast_enabled: bool, stats_len: usize) -> bool {
    is_two_input_join && broadcast_enabled && stats_len == 2
}

/// Decide whether one side of a two-input join is small enough to
/// broadcast, and if so, build both sides' plans.
///
/// `m0`/`m1` are each side's upstream map-task count (`ShuffleDependency::upstream_partition_count`).
/// Each branch below uses the map-task count of whichever side is actually
/// large *in that branch* (§9: a prior implementation mirrored the same `M`
/// across both branches regardless of which side broadcast; fixed here).
///
/// Returns `None` when both sides are at or above `threshold`, in which
/// case the caller falls back to [`crate::coalescer::coalesce`]. Ties (both
/// sides under threshold) favor side 0, matching scan order.
///
/// # Panics
///
/// Panics if `stats.len() != 2` -- callers must check [`is_applicable`]
/// first.
#[must_use]
pub fn decide(stats: &[MapOutputStatistics], threshold: u64, m0: u32, m1: u32) -> Option<BroadcastPlan> {
    assert_eq!(stats.len(), 2, "broadcast decision requires exactly two statistics");

    let s0 = stats[0].total_bytes();
    let s1 = stats[1].total_bytes();
    let p0 = stats[0].partition_count() as u32;
    let p1 = stats[1].partition_count() as u32;

    let side = if s0 < threshold {
        BroadcastSide::Left
    } else if s1 < threshold {
        BroadcastSide::Right
    } else {
        return None;
    };

    let plans = match side {
        BroadcastSide::Left => [
            PostShufflePlan::broadcast(p0, m1, false),
            PostShufflePlan::broadcast(p1, m1, true),
        ],
        BroadcastSide::Right => [
            PostShufflePlan::broadcast(p0, m0, true),
            PostShufflePlan::broadcast(p1, m0, false),
        ],
    };

    Some(BroadcastPlan { side, plans })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(bytes: &[u64]) -> MapOutputStatistics {
        MapOutputStatistics::new(0, bytes.to_vec())
    }

    #[test]
    fn seed_scenario_5_small_side_zero_broadcasts() {
        let left = stats(&vec![10u64; 5]); // sum = 50
        let right = stats(&vec![40u64; 5]); // sum = 200
        let decision = decide(&[left, right], 100, 4, 4).expect("should broadcast");
        assert_eq!(decision.side, BroadcastSide::Left);
        assert_eq!(decision.plans[0].len(), 4);
        assert_eq!(decision.plans[1].len(), 4);
        assert!(decision.plans[0].partitions().iter().all(|p| p.map_task_restriction.is_none()));
        let restrictions: Vec<_> = decision.plans[1]
            .partitions()
            .iter()
            .map(|p| p.map_task_restriction)
            .collect();
        assert_eq!(restrictions, vec![Some(0), Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn seed_scenario_6_both_sides_over_threshold_falls_back() {
        let left = stats(&vec![100u64; 5]);
        let right = stats(&vec![100u64; 5]);
        assert!(decide(&[left, right], 100, 4, 4).is_none());
    }

    #[test]
    fn tie_break_favors_side_zero() {
        let left = stats(&vec![1u64; 5]);
        let right = stats(&vec![1u64; 5]);
        let decision = decide(&[left, right], 100, 3, 3).unwrap();
        assert_eq!(decision.side, BroadcastSide::Left);
    }

    #[test]
    fn right_side_broadcast_restricts_left_plan() {
        let left = stats(&vec![200u64; 3]); // large
        let right = stats(&vec![1u64; 3]); // small
        let decision = decide(&[left, right], 50, 2, 2).unwrap();
        assert_eq!(decision.side, BroadcastSide::Right);
        assert!(
            decision.plans[0]
                .partitions()
                .iter()
                .all(|p| p.map_task_restriction.is_some())
        );
        assert!(
            decision.plans[1]
                .partitions()
                .iter()
                .all(|p| p.map_task_restriction.is_none())
        );
    }

    #[test]
    fn not_applicable_without_two_input_join() {
        assert!(!is_applicable(false, true, 2));
        assert!(!is_applicable(true, false, 2));
        assert!(!is_applicable(true, true, 1));
        assert!(is_applicable(true, true, 2));
    }
}
