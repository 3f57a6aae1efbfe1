//! Map-stage submission: the external scheduler collaborator.
//!
//! A submitted map stage is awaited under the coordinator's lock (§5,
//! "holding the mutex across the blocking wait is deliberate"). This crate
//! has no async runtime dependency anywhere in its stack, so a submitted
//! stage's future is modeled as a `JoinHandle` joined synchronously, rather
//! than pulling in an async runtime this coordinator doesn't otherwise need.

use crate::exchange::ShuffleDependency;
use crate::stats::MapOutputStatistics;
use std::thread::JoinHandle;

/// A submitted map stage's outcome is awaited by joining this handle.
pub type MapStageHandle = JoinHandle<Result<MapOutputStatistics, SchedulerError>>;

/// Failure of a submitted map stage, as reported by the scheduler.
#[derive(Clone, Debug, thiserror::Error)]
#[error("map stage failed: {0}")]
pub struct SchedulerError(pub String);

/// External collaborator that runs map stages and reports their output
/// statistics. Out of scope for this crate beyond this one call.
pub trait Scheduler: Send + Sync {
    /// Submit the map stage for `dep` and return a handle to await its
    /// `MapOutputStatistics`. Only called for dependencies with at least
    /// one upstream partition (§4.4 step 3).
    fn submit_map_stage(&self, dep: ShuffleDependency) -> MapStageHandle;
}
