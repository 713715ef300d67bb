//! Lookup metrics.
//!
//! Opt-in timing data for [`Resolver::lookup_verbose`](super::Resolver::lookup_verbose).
//! Only the outermost activation is measured; recursive lookups triggered by
//! alias stages are folded into the duration of the stage that made them.

use crate::{Resolution, Value};
use std::time::Duration;

/// One stage's share of an outermost lookup.
#[derive(Debug, Clone)]
pub struct StageMetrics {
    /// Stage name as it appears in the pipeline.
    pub stage: String,
    /// Elapsed time, including any nested lookups the stage triggered.
    pub duration: Duration,
    /// Number of alias keys the stage contributed.
    pub aliases_used: usize,
    /// Number of not-found keys the stage contributed.
    pub aliases_not_found: usize,
    /// Whether the stage's output value differs from its input.
    pub changed: bool,
}

/// Result of [`Resolver::lookup_verbose`](super::Resolver::lookup_verbose).
#[derive(Debug, Clone)]
pub struct LookupDetails {
    /// The key that was looked up.
    pub key: String,
    /// Value stored under `key` before any stage ran.
    pub raw: Option<Value>,
    /// The same result `lookup` would return.
    pub resolution: Resolution,
    /// Total elapsed time.
    pub total: Duration,
    /// Per-stage breakdown, in execution order.
    pub stages: Vec<StageMetrics>,
}
