//! Typed errors surfaced by [`crate::coordinator::ExchangeCoordinator`].
//!
//! Per the design notes, panics are reserved for programmer errors
//! (unregistered exchange, double registration via `assert!`/`unreachable!`
//! at call sites that are themselves programmer errors to trigger); every
//! data-dependent failure reaching `plan_for` is one of these typed variants.

/// Errors returned by [`crate::coordinator::ExchangeCoordinator::plan_for`]
/// and [`crate::coordinator::ExchangeCoordinator::register`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinatorError {
    /// `plan_for` was called with an exchange id that was never registered.
    #[error("plan_for queried unregistered exchange {0:?}")]
    UnregisteredExchange(crate::exchange::ExchangeId),

    /// A structural invariant of the surrounding system was violated, e.g.
    /// mismatched pre-partition counts across statistics, or a registration
    /// attempt after estimation has started.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// A submitted map stage failed; the formatted cause is carried as a
    /// string so the error remains `Clone` (needed to re-raise the same
    /// failure to every later caller once the coordinator is poisoned).
    #[error("upstream map stage failed: {0}")]
    UpstreamStageFailed(String),

    /// Estimation observed a different number of registered exchanges than
    /// `numExchanges` promised at construction.
    #[error("expected {expected} registered exchanges, found {actual}")]
    UnexpectedRegistrationCount { expected: u32, actual: u32 },
}

impl CoordinatorError {
    /// Human-readable discriminant, useful for metrics/log fields without
    /// formatting the full message.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnregisteredExchange(_) => "unregistered_exchange",
            Self::InvariantViolation(_) => "invariant_violation",
            Self::UpstreamStageFailed(_) => "upstream_stage_failed",
            Self::UnexpectedRegistrationCount { .. } => "unexpected_registration_count",
        }
    }
}
