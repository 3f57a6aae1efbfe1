//! External collaborator interfaces: the physical-plan `Exchange` operator
//! and the `ShuffleDependency` it produces.
//!
//! These are intentionally thin traits/structs — the planner treats the
//! upstream dataset, partitioner, and physical exchange operator as opaque,
//! needing only the handful of fields and calls documented in §6 of the
//! spec this crate implements.

use std::fmt;

/// Stable integer identity for a registered exchange.
///
/// Per the design notes, the coordinator stores registrations by this
/// integer id rather than by exchange object identity, so that exchanges
/// can hold a non-owning handle back to the coordinator without forming a
/// reference cycle (see [`crate::coordinator::ExchangeHandle`]).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ExchangeId(pub(crate) u32);

impl ExchangeId {
    /// Construct an id for the given registration index. Only the
    /// coordinator assigns these during registration.
    #[must_use]
    pub(crate) fn new(index: u32) -> Self {
        Self(index)
    }

    /// The raw registration index (0-based, in registration order).
    #[must_use]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exchange#{}", self.0)
    }
}

/// Opaque handle to an upstream shuffle's block data, usable by the shuffle
/// transport to locate blocks. The coordinator never interprets this value;
/// it only threads it through to [`crate::reader::PostShuffleReader`].
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ShuffleHandle(pub u64);

/// Snapshot of one upstream shuffle dependency, materialized by
/// [`Exchange::prepare_shuffle_dependency`] during estimation.
///
/// Treated as opaque beyond the three fields the coordinator needs: the
/// pre-shuffle partition count, the upstream map-task count (used both to
/// detect a skippable empty stage and as the fan-out `M` in broadcast
/// mode), and a stable handle for the reader.
#[derive(Clone, Debug)]
pub struct ShuffleDependency {
    /// `P`: number of pre-shuffle (map-output) partitions this upstream
    /// stage produces. Defined by the upstream partitioner.
    pub num_pre_shuffle_partitions: u32,
    /// `numInputPartitions`: number of map tasks in the upstream stage. When
    /// this is `0` the stage is skipped entirely (no map stage submitted,
    /// no statistics contributed).
    pub upstream_partition_count: u32,
    /// Stable handle the shuffle transport uses to locate this stage's
    /// blocks.
    pub handle: ShuffleHandle,
}

impl ShuffleDependency {
    /// `P`, the pre-shuffle partition count, in the notation used
    /// throughout this crate's docs.
    #[must_use]
    pub fn p(&self) -> u32 {
        self.num_pre_shuffle_partitions
    }

    /// Whether this dependency's upstream stage has any work at all. When
    /// `false`, estimation skips submitting a map stage for it.
    #[must_use]
    pub fn has_upstream_partitions(&self) -> bool {
        self.upstream_partition_count > 0
    }
}

/// A physical exchange operator: the thing that registers with a
/// [`crate::coordinator::ExchangeCoordinator`] and, once a plan is ready,
/// drives a [`crate::reader::PostShuffleReader`] against it.
///
/// Only the one call the coordinator needs during estimation is modeled
/// here; everything else (wiring into the physical plan, invoking the
/// reader) lives outside this crate's scope.
pub trait Exchange: Send + Sync {
    /// Materialize this exchange's upstream shuffle dependency. Called
    /// exactly once per exchange, during the coordinator's estimation pass.
    fn prepare_shuffle_dependency(&self) -> ShuffleDependency;
}
