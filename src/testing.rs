//! Testing utilities for crates embedding [`crate::coordinator::ExchangeCoordinator`].
//!
//! - [`builders`] -- fluent construction of [`crate::stats::MapOutputStatistics`].
//! - [`fixtures`] -- the §8 seed scenarios, canned for reuse.
//! - [`mock`] -- in-memory [`crate::exchange::Exchange`] and
//!   [`crate::scheduler::Scheduler`] test doubles, so coordinator tests never
//!   need a real shuffle transport.

pub mod builders;
pub mod fixtures;
pub mod mock;
