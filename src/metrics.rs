//! Planning metrics: a small trait for exposing a named, JSON-able value,
//! plus a concrete record of what one estimation pass decided.
//!
//! Feature-gated behind `metrics`, enabled by default.

use serde_json::{json, Value};

/// A single named metric value, exportable as JSON, so callers already
/// using this pattern elsewhere in their engine can register
/// [`EstimationMetrics`] alongside their own metrics.
pub trait Metric: Send + Sync {
    /// The metric's name, e.g. `"post_shuffle_partitions"`.
    fn name(&self) -> &str;
    /// The metric's current value.
    fn value(&self) -> Value;
}

/// What one coordinator's estimation pass decided, recorded once
/// `estimated` flips to `true`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EstimationMetrics {
    /// Number of exchanges registered and planned.
    pub num_exchanges: u32,
    /// Total bytes summed across all reported statistics (0 if
    /// `stats.is_empty()`).
    pub total_bytes: u64,
    /// Post-shuffle partition count each exchange received (uniform across
    /// exchanges by construction).
    pub post_shuffle_partitions: u32,
    /// `Some(side)` if the broadcast decider fired, naming the broadcast
    /// side as `0` or `1`; `None` if the coalescer was used instead.
    pub broadcast_side: Option<u32>,
}

impl Metric for EstimationMetrics {
    fn name(&self) -> &str {
        "shuffleplan.estimation"
    }

    fn value(&self) -> Value {
        json!({
            "num_exchanges": self.num_exchanges,
            "total_bytes": self.total_bytes,
            "post_shuffle_partitions": self.post_shuffle_partitions,
            "broadcast_side": self.broadcast_side,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_broadcast_decision() {
        let m = EstimationMetrics {
            num_exchanges: 2,
            total_bytes: 250,
            post_shuffle_partitions: 4,
            broadcast_side: Some(0),
        };
        let v = m.value();
        assert_eq!(v["broadcast_side"], json!(0));
        assert_eq!(v["post_shuffle_partitions"], json!(4));
    }

    #[test]
    fn serializes_coalesce_decision() {
        let m = EstimationMetrics {
            num_exchanges: 1,
            total_bytes: 330,
            post_shuffle_partitions: 4,
            broadcast_side: None,
        };
        assert_eq!(m.value()["broadcast_side"], Value::Null);
    }
}
