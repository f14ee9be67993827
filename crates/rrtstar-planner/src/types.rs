//! Shared types for the rrtstar planning core.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A 2D point in world coordinates.
///
/// One world unit is one grid cell: the cell covering `(x, y)` is
/// `(floor(x), floor(y))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Horizontal position (cells from the left edge).
    pub x: f64,
    /// Vertical position (cells from the top edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Linear interpolation towards `other`; `t = 0` is `self`, `t = 1` is `other`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            x: (other.x - self.x).mul_add(t, self.x),
            y: (other.y - self.y).mul_add(t, self.y),
        }
    }

    /// Returns `true` if both coordinates are finite.
    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Configuration for the RRT* planner.
///
/// Every field that materially changes convergence is exposed here
/// rather than hardcoded. `search_radius` is in world units and should
/// grow with the grid: the default only suits grids of a few dozen
/// cells across.
///
/// Values are checked by [`validate`](Self::validate), which
/// [`Planner::new`](crate::Planner::new) calls before planning starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Wall-clock budget for the planning loop, in milliseconds.
    pub time_budget_ms: u64,

    /// Probability (0.0 to 1.0) that a sample is the goal point itself
    /// rather than a uniformly random point.
    pub goal_bias: f64,

    /// Radius of the neighborhood considered for parent selection and
    /// rewiring. Larger radii rewire more aggressively at higher cost
    /// per iteration.
    pub search_radius: f64,

    /// Number of subdivisions of a segment for the collision test.
    ///
    /// `steps + 1` points are checked regardless of segment length, so
    /// long segments are checked more sparsely than short ones.
    pub collision_steps: u32,

    /// Distance within which a sample counts as reaching the goal.
    ///
    /// `0.0` requires exact coordinate equality, which only fires when
    /// the sampler draws the goal itself.
    pub goal_tolerance: f64,
}

impl PlannerConfig {
    /// Default time budget in milliseconds.
    pub const DEFAULT_TIME_BUDGET_MS: u64 = 1000;
    /// Default goal-sampling probability.
    pub const DEFAULT_GOAL_BIAS: f64 = 0.2;
    /// Default neighborhood radius in world units.
    pub const DEFAULT_SEARCH_RADIUS: f64 = 0.5;
    /// Default number of collision-test subdivisions (51 points).
    pub const DEFAULT_COLLISION_STEPS: u32 = 50;
    /// Default goal tolerance (exact equality).
    pub const DEFAULT_GOAL_TOLERANCE: f64 = 0.0;

    /// The time budget as a [`Duration`].
    #[must_use]
    pub const fn time_budget(&self) -> Duration {
        Duration::from_millis(self.time_budget_ms)
    }

    /// Check that every parameter is in its valid range.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<(), PlannerError> {
        if !(0.0..=1.0).contains(&self.goal_bias) {
            return Err(PlannerError::InvalidConfig(format!(
                "goal_bias must be within [0, 1], got {}",
                self.goal_bias
            )));
        }
        if !self.search_radius.is_finite() || self.search_radius <= 0.0 {
            return Err(PlannerError::InvalidConfig(format!(
                "search_radius must be positive and finite, got {}",
                self.search_radius
            )));
        }
        if self.collision_steps == 0 {
            return Err(PlannerError::InvalidConfig(
                "collision_steps must be at least 1".to_string(),
            ));
        }
        if !self.goal_tolerance.is_finite() || self.goal_tolerance < 0.0 {
            return Err(PlannerError::InvalidConfig(format!(
                "goal_tolerance must be non-negative and finite, got {}",
                self.goal_tolerance
            )));
        }
        Ok(())
    }

    /// Whether `point` counts as reaching `goal` under this configuration.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn reaches_goal(&self, point: Point, goal: Point) -> bool {
        if self.goal_tolerance == 0.0 {
            point.x == goal.x && point.y == goal.y
        } else {
            point.distance(goal) <= self.goal_tolerance
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            time_budget_ms: Self::DEFAULT_TIME_BUDGET_MS,
            goal_bias: Self::DEFAULT_GOAL_BIAS,
            search_radius: Self::DEFAULT_SEARCH_RADIUS,
            collision_steps: Self::DEFAULT_COLLISION_STEPS,
            goal_tolerance: Self::DEFAULT_GOAL_TOLERANCE,
        }
    }
}

/// Errors that can occur while loading a scene or planning.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlannerError {
    /// The scene text is malformed.
    #[error("invalid scene: {0}")]
    InvalidScene(String),

    /// Planner configuration or start/goal parameters are invalid.
    #[error("invalid planner configuration: {0}")]
    InvalidConfig(String),

    /// A grid query fell outside the grid.
    #[error("point ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        /// Queried x coordinate.
        x: f64,
        /// Queried y coordinate.
        y: f64,
        /// Grid width in cells.
        width: usize,
        /// Grid height in cells.
        height: usize,
    },

    /// A query needed at least one tree node and found none.
    #[error("the tree has no nodes")]
    EmptyTree,

    /// A node id does not belong to this tree.
    #[error("node {0} does not exist in the tree")]
    UnknownNode(usize),

    /// Reparenting would make a node its own ancestor.
    #[error("reparenting node {node} under node {parent} would create a cycle")]
    WouldCycle {
        /// Node being reparented.
        node: usize,
        /// Proposed parent.
        parent: usize,
    },

    /// A solution was requested before the goal was reached.
    #[error("no solution has been found")]
    NoSolution,
}
