//! Stateful orchestrator: registration, one-shot estimation, plan
//! memoization, thread safety (§4.4, §5).
//!
//! [`ExchangeCoordinator`] is the cheap, cloneable handle; [`State`] is the
//! data its mutex actually protects -- the same outer-handle /
//! inner-state split used for shared mutable graphs elsewhere in this
//! codebase, with lock-held-briefly accessors on every path except
//! estimation itself.

use std::sync::{Arc, Mutex};

use crate::broadcast;
use crate::coalescer;
use crate::config::CoordinatorConfig;
use crate::error::CoordinatorError;
use crate::exchange::{Exchange, ExchangeId, ShuffleDependency};
use crate::plan::PostShufflePlan;
use crate::scheduler::Scheduler;
use crate::stats::MapOutputStatistics;

#[cfg(feature = "metrics")]
use crate::metrics::EstimationMetrics;

/// `Open` while registrations accumulate; `Planned` once the first
/// `plan_for` call has run estimation to completion (successfully or not).
/// There is no `Estimating` variant: estimation runs to completion while
/// the mutex is held (§5, "holding the mutex across the blocking wait is
/// deliberate"), so no caller ever observes an in-between state.
enum State {
    Open(Vec<Arc<dyn Exchange>>),
    Planned(Result<Vec<PostShufflePlan>, CoordinatorError>),
}

/// Coordinates post-shuffle planning for `numExchanges` sibling exchanges
/// belonging to the same downstream operator.
///
/// Construct one per downstream operator instance, register every sibling
/// exchange during prepare, then have each exchange call [`Self::plan_for`]
/// (or hold an [`ExchangeHandle`]) the first time it needs to read.
pub struct ExchangeCoordinator {
    config: CoordinatorConfig,
    scheduler: Arc<dyn Scheduler>,
    state: Mutex<State>,
    #[cfg(feature = "metrics")]
    metrics: Mutex<Option<EstimationMetrics>>,
}

impl ExchangeCoordinator {
    /// Construct a coordinator for `config.num_exchanges` sibling exchanges,
    /// driving map-stage submission through `scheduler`.
    #[must_use]
    pub fn new(config: CoordinatorConfig, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            config,
            scheduler,
            state: Mutex::new(State::Open(Vec::new())),
            #[cfg(feature = "metrics")]
            metrics: Mutex::new(None),
        }
    }

    /// Wrap `self` in an `Arc` and register `exchange` against it, handing
    /// back a non-owning [`ExchangeHandle`] instead of a raw [`ExchangeId`].
    ///
    /// This is the Design Note's "exchanges hold a handle back to the
    /// coordinator" re-architecture of the source's object-identity
    /// association: `exchange -> handle -> coordinator` has no cycle,
    /// unlike `exchange <-> coordinator` by direct reference.
    ///
    /// # Errors
    ///
    /// See [`Self::register`].
    pub fn register_handle(
        self: &Arc<Self>,
        exchange: Arc<dyn Exchange>,
    ) -> Result<ExchangeHandle, CoordinatorError> {
        let id = self.register(exchange)?;
        Ok(ExchangeHandle {
            coordinator: Arc::clone(self),
            id,
        })
    }

    /// Register `exchange`, returning the stable id it was assigned.
    ///
    /// Valid only while the coordinator is still `Open`; once the first
    /// `plan_for` call has started estimation, further registrations are
    /// rejected as an [`CoordinatorError::InvariantViolation`].
    ///
    /// Per §4.4, registering the same exchange twice is the caller's
    /// contract to uphold -- this crate does not attempt to detect it (doing
    /// so would require tracking `Arc` identity, which the stable-integer-id
    /// re-architecture in the Design Notes deliberately avoids).
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::InvariantViolation`] if estimation has
    /// already started.
    pub fn register(&self, exchange: Arc<dyn Exchange>) -> Result<ExchangeId, CoordinatorError> {
        let mut state = self.state.lock().unwrap();
        match &mut *state {
            State::Open(exchanges) => {
                let id = ExchangeId::new(exchanges.len() as u32);
                log::debug!("{id} registered ({}/{} expected)", exchanges.len() + 1, self.config.num_exchanges);
                exchanges.push(exchange);
                Ok(id)
            }
            State::Planned(_) => Err(CoordinatorError::InvariantViolation(
                "register called after estimation has started".to_string(),
            )),
        }
    }

    /// Return the post-shuffle plan for `id`, running the one-shot
    /// estimation pass on the first call across any exchange registered
    /// with this coordinator.
    ///
    /// # Errors
    ///
    /// - [`CoordinatorError::UnregisteredExchange`] if `id` was never
    ///   registered with this coordinator.
    /// - [`CoordinatorError::UnexpectedRegistrationCount`] if fewer or more
    ///   exchanges registered than `config.num_exchanges` promised.
    /// - [`CoordinatorError::InvariantViolation`] if the registered
    ///   dependencies report inconsistent pre-shuffle partition counts.
    /// - [`CoordinatorError::UpstreamStageFailed`] if a submitted map stage
    ///   failed. Once estimation fails, every subsequent call re-raises the
    ///   same error; no partial plans are ever published.
    pub fn plan_for(&self, id: ExchangeId) -> Result<PostShufflePlan, CoordinatorError> {
        let mut state = self.state.lock().unwrap();
        if matches!(&*state, State::Open(_)) {
            let exchanges = match std::mem::replace(&mut *state, State::Open(Vec::new())) {
                State::Open(exchanges) => exchanges,
                State::Planned(_) => unreachable!("just matched Open above"),
            };
            let result = self.estimate(exchanges);
            *state = State::Planned(result);
        }

        match &*state {
            State::Open(_) => unreachable!("estimate() always transitions to Planned"),
            State::Planned(Ok(plans)) => plans
                .get(id.index() as usize)
                .cloned()
                .ok_or(CoordinatorError::UnregisteredExchange(id)),
            State::Planned(Err(err)) => Err(err.clone()),
        }
    }

    /// A snapshot of the last estimation's outcome, if one has run and the
    /// `metrics` feature is enabled.
    #[cfg(feature = "metrics")]
    #[must_use]
    pub fn metrics(&self) -> Option<EstimationMetrics> {
        self.metrics.lock().unwrap().clone()
    }

    /// §4.4 estimation procedure, run exactly once while `state`'s mutex is
    /// held for the whole duration (suspension point: step 4's blocking
    /// join on submitted map stages).
    fn estimate(&self, exchanges: Vec<Arc<dyn Exchange>>) -> Result<Vec<PostShufflePlan>, CoordinatorError> {
        let expected = self.config.num_exchanges;
        let actual = exchanges.len() as u32;
        if actual != expected {
            return Err(CoordinatorError::UnexpectedRegistrationCount { expected, actual });
        }

        // Step 2: materialize every dependency, in registration order.
        let deps: Vec<ShuffleDependency> = exchanges.iter().map(|e| e.prepare_shuffle_dependency()).collect();
        log::debug!("estimating over {} registered exchanges", deps.len());

        // Step 3/4: submit map stages for deps with upstream work, join in
        // submission order, and collect their statistics.
        let handles: Vec<_> = deps
            .iter()
            .filter(|dep| dep.has_upstream_partitions())
            .map(|dep| self.scheduler.submit_map_stage(dep.clone()))
            .collect();
        log::debug!("submitted {} map stages", handles.len());

        let mut stats: Vec<MapOutputStatistics> = Vec::with_capacity(handles.len());
        for handle in handles {
            let outcome = handle.join().map_err(|panic| {
                let msg = panic_message(&panic);
                CoordinatorError::UpstreamStageFailed(msg)
            })?;
            let one = outcome.map_err(|e| CoordinatorError::UpstreamStageFailed(e.to_string()))?;
            stats.push(one);
        }

        // Step 5: validate a single shared pre-shuffle partition count.
        if let Some(first) = stats.first() {
            let p = first.partition_count();
            if stats.iter().any(|s| s.partition_count() != p) {
                return Err(CoordinatorError::InvariantViolation(
                    "registered exchanges reported mismatched pre-shuffle partition counts".to_string(),
                ));
            }
        }

        // Step 6: decide coalesce vs. broadcast vs. trivial, then expand
        // into one plan per registered exchange.
        let (plans, broadcast_side): (Vec<PostShufflePlan>, Option<u32>) = if stats.is_empty() {
            log::info!("no map output statistics gathered; every exchange gets a trivial plan");
            let plans = deps.iter().map(|dep| PostShufflePlan::trivial(dep.p())).collect();
            (plans, None)
        } else if broadcast::is_applicable(self.config.is_two_input_join, self.config.broadcast.enabled, stats.len())
        {
            let decision = broadcast::decide(
                &stats,
                self.config.broadcast.threshold,
                deps[0].upstream_partition_count,
                deps[1].upstream_partition_count,
            );
            match decision {
                Some(decision) => {
                    log::info!("broadcasting side {:?}", decision.side);
                    let side: u32 = match decision.side {
                        broadcast::BroadcastSide::Left => 0,
                        broadcast::BroadcastSide::Right => 1,
                    };
                    (decision.plans.to_vec(), Some(side))
                }
                None => {
                    log::warn!("broadcast threshold missed on both sides; falling back to coalescing");
                    (self.coalesce_plans(&stats, &deps), None)
                }
            }
        } else {
            (self.coalesce_plans(&stats, &deps), None)
        };

        log::info!(
            "estimation complete: {} exchanges, {} post-shuffle partitions{}",
            plans.len(),
            plans.first().map_or(0, PostShufflePlan::len),
            if broadcast_side.is_some() { " (broadcast)" } else { "" }
        );

        #[cfg(feature = "metrics")]
        {
            let total_bytes = stats.iter().map(MapOutputStatistics::total_bytes).sum();
            let recorded = EstimationMetrics {
                num_exchanges: plans.len() as u32,
                total_bytes,
                post_shuffle_partitions: plans.first().map_or(0, PostShufflePlan::len) as u32,
                broadcast_side,
            };
            *self.metrics.lock().unwrap() = Some(recorded);
        }

        Ok(plans)
    }

    fn coalesce_plans(&self, stats: &[MapOutputStatistics], deps: &[ShuffleDependency]) -> Vec<PostShufflePlan> {
        let start_indices = coalescer::coalesce(stats, self.config.target_bytes, self.config.min_partitions);
        deps.iter()
            .map(|dep| PostShufflePlan::from_start_indices(&start_indices, dep.p()))
            .collect()
    }
}

/// Best-effort extraction of a human-readable message from a thread panic
/// payload, since `Box<dyn Any + Send>` carries no `Display`.
fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "map stage thread panicked".to_string()
    }
}

/// A non-owning handle an [`Exchange`] implementation can hold back to the
/// [`ExchangeCoordinator`] it registered with, to call `plan_for` without
/// forming a reference cycle. See the Design Note "Shared coordinator
/// across sibling exchanges".
#[derive(Clone)]
pub struct ExchangeHandle {
    coordinator: Arc<ExchangeCoordinator>,
    id: ExchangeId,
}

impl ExchangeHandle {
    /// This handle's stable registration id.
    #[must_use]
    pub fn id(&self) -> ExchangeId {
        self.id
    }

    /// Fetch this exchange's post-shuffle plan, triggering estimation on the
    /// coordinator if it hasn't run yet.
    ///
    /// # Errors
    ///
    /// See [`ExchangeCoordinator::plan_for`].
    pub fn plan(&self) -> Result<PostShufflePlan, CoordinatorError> {
        self.coordinator.plan_for(self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BroadcastConfig, CoordinatorConfig};
    use crate::testing::fixtures;
    use crate::testing::mock::{MockExchange, MockScheduler};

    fn coordinator(config: CoordinatorConfig) -> Arc<ExchangeCoordinator> {
        Arc::new(ExchangeCoordinator::new(config, Arc::new(MockScheduler::new())))
    }

    #[test]
    fn seed_scenario_1_single_exchange_memoizes() {
        let coord = coordinator(CoordinatorConfig::new(1, 100));
        let handle = coord
            .register_handle(Arc::new(MockExchange::new(5, 5, vec![110, 10, 100, 110, 0])))
            .unwrap();

        let plan = handle.plan().unwrap();
        assert_eq!(plan.len(), 4);
        let ranges: Vec<_> = plan.partitions().iter().map(|p| (p.pre_start, p.pre_end)).collect();
        assert_eq!(ranges, vec![(0, 1), (1, 3), (3, 4), (4, 5)]);

        // Repeated calls return an equal, memoized plan (§8 invariant).
        let again = handle.plan().unwrap();
        assert_eq!(plan, again);
    }

    #[test]
    fn seed_scenario_5_broadcast_mode() {
        let config = CoordinatorConfig::new(2, 1_000_000).with_broadcast(BroadcastConfig { enabled: true, threshold: 100 });
        let coord = coordinator(config);
        let small = coord
            .register_handle(Arc::new(MockExchange::new(5, 4, vec![10, 10, 10, 10, 10])))
            .unwrap();
        let large = coord
            .register_handle(Arc::new(MockExchange::new(5, 4, vec![40, 40, 40, 40, 40])))
            .unwrap();

        let small_plan = small.plan().unwrap();
        let large_plan = large.plan().unwrap();
        assert_eq!(small_plan.len(), 4);
        assert_eq!(large_plan.len(), 4);
        assert!(small_plan.partitions().iter().all(|p| p.map_task_restriction.is_none()));
        let restrictions: Vec<_> = large_plan.partitions().iter().map(|p| p.map_task_restriction).collect();
        assert_eq!(restrictions, vec![Some(0), Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn seed_scenario_6_broadcast_falls_back_to_coalesce() {
        let config = CoordinatorConfig::new(2, 100).with_broadcast(BroadcastConfig { enabled: true, threshold: 50 });
        let coord = coordinator(config);
        let a = coord
            .register_handle(Arc::new(MockExchange::new(5, 4, vec![100, 100, 100, 100, 100])))
            .unwrap();
        let b = coord
            .register_handle(Arc::new(MockExchange::new(5, 4, vec![100, 100, 100, 100, 100])))
            .unwrap();

        let plan_a = a.plan().unwrap();
        let plan_b = b.plan().unwrap();
        assert_eq!(plan_a, plan_b);
        assert!(plan_a.partitions().iter().all(|p| p.map_task_restriction.is_none()));
    }

    #[test]
    fn empty_statistics_yields_trivial_plan_per_exchange() {
        let coord = coordinator(CoordinatorConfig::new(2, 100));
        let a = coord.register_handle(Arc::new(MockExchange::new(7, 0, vec![0; 7]))).unwrap();
        let b = coord.register_handle(Arc::new(MockExchange::new(7, 0, vec![0; 7]))).unwrap();

        assert_eq!(a.plan().unwrap().len(), 1);
        assert_eq!(b.plan().unwrap().len(), 1);
    }

    #[test]
    fn unregistered_exchange_is_an_error() {
        let coord = coordinator(CoordinatorConfig::new(1, 100));
        coord.register(Arc::new(MockExchange::new(3, 3, vec![1, 2, 3]))).unwrap();
        let bogus = ExchangeId::new(99);
        assert!(matches!(
            coord.plan_for(bogus),
            Err(CoordinatorError::UnregisteredExchange(_))
        ));
    }

    #[test]
    fn mismatched_partition_counts_is_invariant_violation() {
        let coord = coordinator(CoordinatorConfig::new(2, 100));
        coord.register(Arc::new(MockExchange::new(3, 3, vec![1, 2, 3]))).unwrap();
        let last = coord.register(Arc::new(MockExchange::new(5, 5, vec![1, 2, 3, 4, 5]))).unwrap();
        assert!(matches!(
            coord.plan_for(last),
            Err(CoordinatorError::InvariantViolation(_))
        ));
    }

    #[test]
    fn registration_count_mismatch_is_reported() {
        let coord = coordinator(CoordinatorConfig::new(2, 100));
        let only = coord.register(Arc::new(MockExchange::new(3, 3, vec![1, 2, 3]))).unwrap();
        assert!(matches!(
            coord.plan_for(only),
            Err(CoordinatorError::UnexpectedRegistrationCount { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn registration_after_estimation_is_invariant_violation() {
        let coord = coordinator(CoordinatorConfig::new(1, 100));
        let handle = coord.register_handle(Arc::new(MockExchange::new(3, 3, vec![1, 2, 3]))).unwrap();
        handle.plan().unwrap();
        let late = coord.register(Arc::new(MockExchange::new(3, 3, vec![1, 2, 3])));
        assert!(matches!(late, Err(CoordinatorError::InvariantViolation(_))));
    }

    #[test]
    fn upstream_stage_failure_poisons_the_coordinator() {
        let coord = Arc::new(ExchangeCoordinator::new(
            CoordinatorConfig::new(1, 100),
            Arc::new(MockScheduler::always_fails("boom")),
        ));
        let handle = coord.register_handle(Arc::new(MockExchange::new(3, 3, vec![1, 2, 3]))).unwrap();

        let first = handle.plan();
        assert!(matches!(first, Err(CoordinatorError::UpstreamStageFailed(_))));
        // Poisoned: the same error re-raises on every later call.
        let second = handle.plan();
        assert_eq!(first, second);
    }

    #[test]
    fn fixtures_round_trip_through_the_coordinator() {
        let coord = coordinator(CoordinatorConfig::new(2, 100));
        let (a, b) = fixtures::seed_scenario_2();
        let ha = coord.register_handle(Arc::new(a)).unwrap();
        let hb = coord.register_handle(Arc::new(b)).unwrap();
        let plan_a = ha.plan().unwrap();
        let plan_b = hb.plan().unwrap();
        assert_eq!(plan_a.len(), 2);
        assert_eq!(plan_b.len(), 2);
    }
}
