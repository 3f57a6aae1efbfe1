//! # shuffleplan
//!
//! An **adaptive post-shuffle partition planner** for a distributed dataflow
//! engine. In a bulk-synchronous execution model, operators produce
//! intermediate data partitioned by key across many "map" tasks; a
//! downstream "reduce" stage must then fetch one or more of those
//! map-output partitions. This crate chooses *how many* reduce partitions
//! to create, and *which* pre-shuffle partitions each one should pull, after
//! the upstream map stages have reported per-partition byte sizes -- rather
//! than leaving that count a static tuning knob.
//!
//! ## Core flow
//!
//! 1. Construct an [`ExchangeCoordinator`] with a [`CoordinatorConfig`] and a
//!    [`Scheduler`] for the surrounding engine's map-stage submission.
//! 2. Every sibling exchange belonging to the same downstream operator calls
//!    [`ExchangeCoordinator::register_handle`] during prepare, getting back
//!    an [`ExchangeHandle`].
//! 3. The first call to [`ExchangeHandle::plan`] (on *any* sibling) triggers
//!    a one-shot estimation pass: the coordinator materializes every
//!    exchange's [`ShuffleDependency`], submits map stages for the ones with
//!    upstream work, awaits their [`MapOutputStatistics`], and decides
//!    between coalescing ([`coalescer::coalesce`]) and broadcasting
//!    ([`broadcast::decide`]).
//! 4. Every later call -- on any sibling -- returns the memoized
//!    [`PostShufflePlan`].
//!
//! ```no_run
//! use shuffleplan::config::CoordinatorConfig;
//! use shuffleplan::coordinator::ExchangeCoordinator;
//! use shuffleplan::testing::mock::{MockExchange, MockScheduler};
//! use std::sync::Arc;
//!
//! let coordinator = Arc::new(ExchangeCoordinator::new(
//!     CoordinatorConfig::new(2, 64 * 1024 * 1024),
//!     Arc::new(MockScheduler::new()),
//! ));
//!
//! let left = coordinator
//!     .register_handle(Arc::new(MockExchange::new(8, 8, vec![1_000_000; 8])))
//!     .unwrap();
//! let right = coordinator
//!     .register_handle(Arc::new(MockExchange::new(8, 8, vec![1_000_000; 8])))
//!     .unwrap();
//!
//! let left_plan = left.plan().unwrap();
//! let right_plan = right.plan().unwrap();
//! assert_eq!(left_plan.len(), right_plan.len());
//! ```
//!
//! ## Module overview
//!
//! - [`plan`] -- [`PostShufflePartition`] / [`PostShufflePlan`], the output types.
//! - [`coalesced_mapping`] -- O(1) pre-partition -> post-partition reverse lookup.
//! - [`coalescer`] -- the pure byte-budget coalescing pass.
//! - [`broadcast`] -- the two-input join broadcast-vs-coalesce policy.
//! - [`coordinator`] -- the stateful orchestrator tying the above together.
//! - [`exchange`] -- the `Exchange` / `ShuffleDependency` external collaborators.
//! - [`scheduler`] -- the `Scheduler` external collaborator (map-stage submission).
//! - [`reader`] -- the `PostShuffleReader` adapter over the shuffle transport.
//! - [`stats`] -- [`MapOutputStatistics`].
//! - [`config`] -- explicit [`CoordinatorConfig`] / `BroadcastConfig`.
//! - [`error`] -- [`CoordinatorError`].
//! - [`metrics`] -- per-estimation metrics (feature: `metrics`, enabled by default).
//! - [`testing`] -- fixtures, builders, and mock collaborators for downstream tests.
//!
//! ## Non-goals
//!
//! No cost model beyond byte sums; no handling of partitions produced out of
//! order; no per-key skew splitting (only contiguous coalescing); no
//! re-planning once a reduce stage begins reading.

pub mod broadcast;
pub mod coalesced_mapping;
pub mod coalescer;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod exchange;
pub mod plan;
pub mod reader;
pub mod scheduler;
pub mod stats;
pub mod testing;

#[cfg(feature = "metrics")]
pub mod metrics;

pub use coalesced_mapping::CoalescedMapping;
pub use coalescer::coalesce;
pub use config::{BroadcastConfig, CoordinatorConfig};
pub use coordinator::{ExchangeCoordinator, ExchangeHandle};
pub use error::CoordinatorError;
pub use exchange::{Exchange, ExchangeId, ShuffleDependency, ShuffleHandle};
pub use plan::{PostShufflePartition, PostShufflePlan};
pub use reader::{PostShuffleReader, ShuffleTransport};
pub use scheduler::{MapStageHandle, Scheduler, SchedulerError};
pub use stats::MapOutputStatistics;

#[cfg(feature = "metrics")]
pub use metrics::{EstimationMetrics, Metric};
