//! Run diagnostics: the time source and counters for a planning run.
//!
//! The planning loop reads time only through the [`Clock`] trait, so the
//! budget can be driven by a real monotonic clock ([`SystemClock`]) or by
//! a deterministic clock in tests. [`PlanSummary`] collects per-run
//! counts for tuning parameters such as the search radius.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// A monotonic time source.
pub trait Clock {
    /// Opaque point in time.
    type Instant;

    /// The current instant.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// [`Clock`] backed by [`web_time::Instant`] (`std::time::Instant` on
/// native targets, `performance.now()` on WASM).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Instant = web_time::Instant;

    fn now(&self) -> Self::Instant {
        web_time::Instant::now()
    }

    fn elapsed(&self, since: &Self::Instant) -> Duration {
        since.elapsed()
    }
}

/// Counters collected over one planning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    /// Loop iterations executed.
    pub iterations: u64,
    /// Samples attached to the tree.
    pub accepted: u64,
    /// Samples whose edge to the chosen parent was blocked.
    pub rejected: u64,
    /// Total re-parenting moves made by rewiring.
    pub rewires: u64,
    /// Nodes in the final tree, including the root.
    pub node_count: usize,
    /// Wall-clock duration of the loop.
    #[serde(with = "duration_serde")]
    pub elapsed: Duration,
    /// Iteration on which a solution was first recorded, if any.
    pub first_solution_iteration: Option<u64>,
    /// Cost of the final solution path, if any.
    pub solution_cost: Option<f64>,
    /// Points in the final solution path (root and goal included), if any.
    pub solution_points: Option<usize>,
}

impl PlanSummary {
    /// Format the summary as a human-readable report.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Planning Summary\n{}", "=".repeat(40)));
        lines.push(format!("Elapsed: {:.3}ms", duration_ms(self.elapsed)));

        let acceptance = if self.iterations > 0 {
            self.accepted as f64 / self.iterations as f64 * 100.0
        } else {
            0.0
        };
        lines.push(format!(
            "Iterations: {} ({} accepted, {} rejected, {acceptance:.1}% acceptance)",
            self.iterations, self.accepted, self.rejected,
        ));
        lines.push(format!(
            "Tree: {} nodes, {} rewires",
            self.node_count, self.rewires
        ));

        match (self.solution_cost, self.solution_points) {
            (Some(cost), Some(points)) => {
                let first = self
                    .first_solution_iteration
                    .map_or_else(String::new, |i| format!(", first found on iteration {i}"));
                lines.push(format!("Solution: cost {cost:.4}, {points} points{first}"));
            }
            _ => lines.push("Solution: none".to_string()),
        }

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}
