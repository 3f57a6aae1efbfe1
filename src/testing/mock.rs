//! In-memory `Exchange` + `Scheduler` test doubles, giving tests a way to
//! exercise the real coordinator machinery without touching anything
//! external.
//!
//! Real exchanges compute their byte statistics by actually running a map
//! stage; these doubles instead look them up from a small in-process
//! registry, keyed by the same opaque [`ShuffleHandle`] a real shuffle
//! transport would use to locate blocks.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};

use crate::exchange::{Exchange, ShuffleDependency, ShuffleHandle};
use crate::scheduler::{MapStageHandle, Scheduler, SchedulerError};
use crate::stats::MapOutputStatistics;

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(0);

fn registry() -> &'static Mutex<HashMap<u64, Vec<u64>>> {
    static REGISTRY: OnceLock<Mutex<HashMap<u64, Vec<u64>>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// A test-only [`Exchange`] whose dependency and byte statistics are fixed
/// at construction.
#[derive(Clone)]
pub struct MockExchange {
    p: u32,
    upstream_partition_count: u32,
    handle: ShuffleHandle,
}

impl MockExchange {
    /// Build an exchange reporting `p` pre-shuffle partitions, `upstream_partition_count`
    /// map tasks, and per-partition byte counts `bytes` (must have length `p`).
    #[must_use]
    pub fn new(p: u32, upstream_partition_count: u32, bytes: Vec<u64>) -> Self {
        assert_eq!(bytes.len(), p as usize, "mock exchange bytes must have length p");
        let id = NEXT_HANDLE.fetch_add(1, Ordering::Relaxed);
        registry().lock().unwrap().insert(id, bytes);
        Self {
            p,
            upstream_partition_count,
            handle: ShuffleHandle(id),
        }
    }
}

impl Exchange for MockExchange {
    fn prepare_shuffle_dependency(&self) -> ShuffleDependency {
        ShuffleDependency {
            num_pre_shuffle_partitions: self.p,
            upstream_partition_count: self.upstream_partition_count,
            handle: self.handle.clone(),
        }
    }
}

/// A test-only [`Scheduler`] that resolves a submitted dependency's
/// statistics from [`MockExchange`]'s shared registry, or always fails if
/// constructed via [`Self::always_fails`].
#[derive(Clone)]
pub struct MockScheduler {
    fail: Option<&'static str>,
}

impl MockScheduler {
    /// A scheduler that resolves every submitted stage successfully.
    #[must_use]
    pub fn new() -> Self {
        Self { fail: None }
    }

    /// A scheduler whose every submitted stage fails with `reason`.
    #[must_use]
    pub fn always_fails(reason: &'static str) -> Self {
        Self { fail: Some(reason) }
    }
}

impl Default for MockScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for MockScheduler {
    fn submit_map_stage(&self, dep: ShuffleDependency) -> MapStageHandle {
        let fail = self.fail;
        std::thread::spawn(move || {
            if let Some(reason) = fail {
                return Err(SchedulerError(reason.to_string()));
            }
            let bytes = registry().lock().unwrap().get(&dep.handle.0).cloned().unwrap_or_default();
            Ok(MapOutputStatistics::new(dep.handle.0, bytes))
        })
    }
}
