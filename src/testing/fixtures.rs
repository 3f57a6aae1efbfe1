//! Canned [`MapOutputStatistics`] and [`MockExchange`] pairs for the seed
//! scenarios enumerated in spec §8, so coordinator- and coalescer-level
//! tests can reuse them instead of re-deriving the numbers inline.

use crate::stats::MapOutputStatistics;
use crate::testing::mock::MockExchange;

/// Seed scenario 1: single exchange, `target=100`,
/// `bytes=[110,10,100,110,0]` -> `startIndices == [0,1,3,4]`.
#[must_use]
pub fn seed_scenario_1() -> MapOutputStatistics {
    MapOutputStatistics::new(1, vec![110, 10, 100, 110, 0])
}

/// Seed scenario 2: two exchanges, `target=100`,
/// `bytes1=[0,99,0,20,0]`, `bytes2=[30,0,70,0,30]` -> pairwise sums
/// `[30,99,70,20,30]`, `startIndices == [0,2]`.
#[must_use]
pub fn seed_scenario_2() -> (MockExchange, MockExchange) {
    (
        MockExchange::new(5, 5, vec![0, 99, 0, 20, 0]),
        MockExchange::new(5, 5, vec![30, 0, 70, 0, 30]),
    )
}

/// Seed scenario 3: two exchanges, `target=100`, `minPartitions=Some(2)`,
/// `bytes1=[10,5,5,0,20]`, `bytes2=[5,10,0,10,5]` -> `startIndices == [0,3]`.
#[must_use]
pub fn seed_scenario_3() -> (MapOutputStatistics, MapOutputStatistics) {
    (
        MapOutputStatistics::new(3, vec![10, 5, 5, 0, 20]),
        MapOutputStatistics::new(4, vec![5, 10, 0, 10, 5]),
    )
}

/// Seed scenario 4: all zeros, `minPartitions=Some(2)` -> `[0]` (the floor
/// is not enforced when the total is zero).
#[must_use]
pub fn seed_scenario_4() -> MapOutputStatistics {
    MapOutputStatistics::new(5, vec![0, 0, 0, 0, 0])
}

/// Seed scenario 5: broadcast mode, `threshold=100`, `s0=50 < T`, `s1=200
/// >= T` -> side 0 broadcasts, large-side map-task count `M=4`.
#[must_use]
pub fn seed_scenario_5() -> (MockExchange, MockExchange) {
    (
        MockExchange::new(5, 4, vec![10, 10, 10, 10, 10]),
        MockExchange::new(5, 4, vec![40, 40, 40, 40, 40]),
    )
}

/// Seed scenario 6: broadcast enabled but both sides at/over threshold ->
/// falls through to the coalescer; both exchanges get identical plans.
#[must_use]
pub fn seed_scenario_6() -> (MockExchange, MockExchange) {
    (
        MockExchange::new(5, 4, vec![100, 100, 100, 100, 100]),
        MockExchange::new(5, 4, vec![100, 100, 100, 100, 100]),
    )
}
