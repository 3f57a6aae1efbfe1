//! Explicit coordinator configuration.
//!
//! Per the design notes ("Mutable global singletons"), the source reads
//! broadcast threshold / advisory target / minimum partitions from a
//! process-wide configuration registry. This crate takes them as a plain
//! value passed at construction instead.

/// Construction parameters for [`crate::coordinator::ExchangeCoordinator`].
#[derive(Clone, Debug)]
pub struct CoordinatorConfig {
    /// Expected number of exchange registrations; asserted at estimation.
    pub num_exchanges: u32,
    /// Advisory post-shuffle partition byte budget (the upstream tuning
    /// knob "advisory target post-shuffle input size").
    pub target_bytes: u64,
    /// Optional floor on post-shuffle partition count.
    pub min_partitions: Option<u32>,
    /// Whether this coordinator serves a two-input join (enables
    /// [`crate::broadcast`] eligibility).
    pub is_two_input_join: bool,
    /// Broadcast-optimization toggle and byte threshold.
    pub broadcast: BroadcastConfig,
}

/// Broadcast-optimization toggle and byte threshold.
#[derive(Clone, Copy, Debug)]
pub struct BroadcastConfig {
    /// Whether the broadcast optimization is enabled at all.
    pub enabled: bool,
    /// A side broadcasts when its total bytes are strictly under this
    /// threshold.
    pub threshold: u64,
}

impl BroadcastConfig {
    /// Broadcast optimization disabled.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            threshold: 0,
        }
    }
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self::disabled()
    }
}

impl CoordinatorConfig {
    /// Construct a config for a single-input (non-join) exchange group with
    /// broadcast disabled -- the common case.
    #[must_use]
    pub fn new(num_exchanges: u32, target_bytes: u64) -> Self {
        Self {
            num_exchanges,
            target_bytes,
            min_partitions: None,
            is_two_input_join: false,
            broadcast: BroadcastConfig::disabled(),
        }
    }

    /// Builder-style setter for `min_partitions`.
    #[must_use]
    pub fn with_min_partitions(mut self, min_partitions: u32) -> Self {
        self.min_partitions = Some(min_partitions);
        self
    }

    /// Builder-style setter enabling the two-input join broadcast decision.
    #[must_use]
    pub fn with_broadcast(mut self, broadcast: BroadcastConfig) -> Self {
        self.is_two_input_join = true;
        self.broadcast = broadcast;
        self
    }

    /// Sanity-check this configuration before handing it to
    /// [`crate::coordinator::ExchangeCoordinator::new`].
    ///
    /// Not enforced by the coordinator itself -- a malformed config is a
    /// physical-plan construction bug, not a data-dependent `plan_for`
    /// failure, so it doesn't belong in [`crate::error::CoordinatorError`].
    /// Callers wiring up physical plans can call this to fail fast with a
    /// descriptive message instead.
    ///
    /// # Errors
    ///
    /// Returns an error if `num_exchanges` is `0`, if `min_partitions` is
    /// `Some(0)`, or if broadcast is enabled without `is_two_input_join`.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.num_exchanges > 0, "num_exchanges must be at least 1");
        if let Some(min) = self.min_partitions {
            anyhow::ensure!(min > 0, "min_partitions must be at least 1 when set");
        }
        anyhow::ensure!(
            !self.broadcast.enabled || self.is_two_input_join,
            "broadcast.enabled requires is_two_input_join"
        );
        Ok(())
    }
}
