//! The RRT* planning loop.
//!
//! [`Planner`] owns the grid, the tree and the sampler. It can be driven
//! one iteration at a time with [`Planner::step`], or under a wall-clock
//! budget with [`Planner::run`]:
//!
//! ```rust
//! # use rrtstar_planner::{NullSink, OccupancyGrid, Planner, PlannerConfig, Point, SystemClock};
//! # use rand::SeedableRng;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let grid = OccupancyGrid::from_rows(&["__________"; 10])?;
//! let config = PlannerConfig { time_budget_ms: 20, ..PlannerConfig::default() };
//! let rng = rand::rngs::StdRng::seed_from_u64(7);
//! let mut planner = Planner::with_rng(grid, Point::new(0.0, 0.0), Point::new(9.0, 9.0), config, rng)?;
//! let summary = planner.run(&SystemClock, &mut NullSink)?;
//! assert!(summary.iterations > 0);
//! # Ok(())
//! # }
//! ```
//!
//! While running, the planner reports through a [`ProgressSink`]: a
//! [`PlannerEvent::Progress`] snapshot before every iteration, then either
//! [`PlannerEvent::Solution`] or [`PlannerEvent::NoSolution`] after it, and
//! a closing [`PlannerEvent::Finished`] snapshot once the budget is spent.
//! Formatting those events is left to the sink.

use std::convert::Infallible;
use std::time::Duration;

use log::{debug, info, warn};
use rand::Rng;

use crate::collision::is_traversable;
use crate::diagnostics::{Clock, PlanSummary};
use crate::grid::OccupancyGrid;
use crate::neighbors::neighborhood;
use crate::optimize::{choose_parent, rewire};
use crate::sampler::{GoalBiasedSampler, Sampler};
use crate::tree::{NodeId, Tree};
use crate::types::{PlannerConfig, PlannerError, Point};

/// A borrowed snapshot of the planning scene.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    /// The occupancy grid.
    pub grid: &'a OccupancyGrid,
    /// Start point (the tree root).
    pub start: Point,
    /// Goal point.
    pub goal: Point,
    /// The tree at the time of the snapshot.
    pub tree: &'a Tree,
}

/// The best path found to the goal.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Tree node that reached the goal.
    pub node: NodeId,
    /// Path cost from the root.
    pub cost: f64,
    /// Points from the root to the goal node, inclusive.
    pub points: Vec<Point>,
}

/// A solution as reported after an iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionReport {
    /// Time since the loop started.
    pub elapsed: Duration,
    /// Path cost from the root.
    pub cost: f64,
    /// Points from the root to the goal node, inclusive.
    pub points: Vec<Point>,
}

impl SolutionReport {
    /// Number of points on the path, root and goal included.
    #[must_use]
    pub const fn point_count(&self) -> usize {
        self.points.len()
    }
}

/// Structured progress emitted by [`Planner::run`].
#[derive(Debug, Clone)]
pub enum PlannerEvent<'a> {
    /// Scene snapshot taken at the start of an iteration.
    Progress(Scene<'a>),
    /// The current solution, after an iteration.
    Solution(SolutionReport),
    /// No solution yet, after an iteration.
    NoSolution,
    /// Final scene snapshot once the budget is spent.
    Finished(Scene<'a>),
}

/// Receiver of [`PlannerEvent`]s.
pub trait ProgressSink {
    /// Error returned when the sink cannot accept an event.
    type Error;

    /// Handle one event. Returning an error stops the run.
    ///
    /// # Errors
    ///
    /// Implementation-defined; typically an I/O failure while writing.
    fn on_event(&mut self, event: &PlannerEvent<'_>) -> Result<(), Self::Error>;
}

/// A [`ProgressSink`] that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    type Error = Infallible;

    fn on_event(&mut self, _event: &PlannerEvent<'_>) -> Result<(), Infallible> {
        Ok(())
    }
}

/// Failure of [`Planner::run`].
#[derive(Debug, thiserror::Error)]
pub enum RunError<E> {
    /// The planner hit an invariant violation.
    #[error(transparent)]
    Planner(#[from] PlannerError),

    /// The progress sink rejected an event.
    #[error("progress sink failed: {0}")]
    Sink(E),
}

/// Result of one [`Planner::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// The sample was attached to the tree.
    Inserted {
        /// The new node.
        node: NodeId,
        /// Neighbors re-parented through the new node.
        rewired: usize,
        /// Whether the sample reached the goal.
        reached_goal: bool,
    },
    /// The edge from the chosen parent to the sample was blocked.
    Rejected {
        /// The discarded sample.
        sample: Point,
    },
}

#[derive(Debug, Clone, Copy, Default)]
struct Counters {
    iterations: u64,
    accepted: u64,
    rejected: u64,
    rewires: u64,
    first_solution_iteration: Option<u64>,
}

/// An RRT* planner over an occupancy grid.
#[derive(Debug)]
pub struct Planner<S> {
    grid: OccupancyGrid,
    start: Point,
    goal: Point,
    config: PlannerConfig,
    tree: Tree,
    sampler: S,
    solution: Option<NodeId>,
    counters: Counters,
}

impl<R: Rng> Planner<GoalBiasedSampler<R>> {
    /// Create a planner that samples with a [`GoalBiasedSampler`] over `rng`.
    ///
    /// # Errors
    ///
    /// See [`Planner::new`].
    pub fn with_rng(
        grid: OccupancyGrid,
        start: Point,
        goal: Point,
        config: PlannerConfig,
        rng: R,
    ) -> Result<Self, PlannerError> {
        let sampler = GoalBiasedSampler::new(rng, &grid, goal, config.goal_bias)?;
        Self::new(grid, start, goal, config, sampler)
    }
}

impl<S: Sampler> Planner<S> {
    /// Create a planner whose tree holds only the root at `start`.
    ///
    /// A start that already satisfies the goal test is recorded as a
    /// one-point solution immediately.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::InvalidConfig`] if `config` is invalid or
    /// `start` or `goal` is not a finite point inside `grid`.
    pub fn new(
        grid: OccupancyGrid,
        start: Point,
        goal: Point,
        config: PlannerConfig,
        sampler: S,
    ) -> Result<Self, PlannerError> {
        config.validate()?;
        for (name, point) in [("start", start), ("goal", goal)] {
            if !grid.contains(point) {
                return Err(PlannerError::InvalidConfig(format!(
                    "{name} ({}, {}) is outside the {}x{} grid",
                    point.x,
                    point.y,
                    grid.width(),
                    grid.height()
                )));
            }
            if grid.is_blocked(point)? {
                warn!("{name} ({}, {}) lies on a blocked cell", point.x, point.y);
            }
        }

        let tree = Tree::new(start);
        let solution = config.reaches_goal(start, goal).then(|| tree.root());
        Ok(Self {
            grid,
            start,
            goal,
            config,
            tree,
            sampler,
            solution,
            counters: Counters::default(),
        })
    }

    /// The occupancy grid.
    #[must_use]
    pub const fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    /// The start point.
    #[must_use]
    pub const fn start(&self) -> Point {
        self.start
    }

    /// The goal point.
    #[must_use]
    pub const fn goal(&self) -> Point {
        self.goal
    }

    /// The planner configuration.
    #[must_use]
    pub const fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// The search tree.
    #[must_use]
    pub const fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Consume the planner and return its tree.
    #[must_use]
    pub fn into_tree(self) -> Tree {
        self.tree
    }

    /// A snapshot of the grid, endpoints and tree.
    #[must_use]
    pub const fn scene(&self) -> Scene<'_> {
        Scene {
            grid: &self.grid,
            start: self.start,
            goal: self.goal,
            tree: &self.tree,
        }
    }

    /// Whether a solution has been recorded.
    #[must_use]
    pub const fn has_solution(&self) -> bool {
        self.solution.is_some()
    }

    /// The current solution path.
    ///
    /// The cost reflects any rewiring since the goal was first reached.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::NoSolution`] if the goal has not been reached.
    pub fn solution(&self) -> Result<Solution, PlannerError> {
        let recorded = self.solution.ok_or(PlannerError::NoSolution)?;
        let node = self.first_goal_on_path(recorded)?;
        Ok(Solution {
            node,
            cost: self.tree.cost(node)?,
            points: self.tree.path_to_root(node)?,
        })
    }

    /// Run one iteration: sample, pick a parent, attach, rewire, and check
    /// for goal arrival.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::OutOfBounds`] if the sampler produced a
    /// point outside the grid, or any tree invariant error.
    pub fn step(&mut self) -> Result<StepOutcome, PlannerError> {
        self.counters.iterations += 1;
        let steps = self.config.collision_steps;

        let sample = self.sampler.sample();
        let neighbors = neighborhood(
            &self.tree,
            &self.grid,
            sample,
            self.config.search_radius,
            steps,
        )?;
        let parent = choose_parent(&self.tree, sample, &neighbors)?;

        // An empty neighborhood falls back to the nearest node unchecked.
        if !is_traversable(&self.grid, sample, self.tree.point(parent)?, steps)? {
            self.counters.rejected += 1;
            return Ok(StepOutcome::Rejected { sample });
        }

        let node = self.tree.insert(sample, parent)?;
        let rewired = rewire(&mut self.tree, &self.grid, node, &neighbors, steps)?;
        self.counters.accepted += 1;
        self.counters.rewires += rewired as u64;

        let reached_goal = self.config.reaches_goal(sample, self.goal);
        if reached_goal {
            self.record_goal(node)?;
        }

        Ok(StepOutcome::Inserted {
            node,
            rewired,
            reached_goal,
        })
    }

    /// Iterate until `config.time_budget_ms` has elapsed on `clock`,
    /// reporting to `sink`.
    ///
    /// The closing [`PlannerEvent::Finished`] snapshot is always emitted,
    /// even with a zero budget.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Planner`] on an invariant violation and
    /// [`RunError::Sink`] as soon as the sink rejects an event.
    pub fn run<C, K>(&mut self, clock: &C, sink: &mut K) -> Result<PlanSummary, RunError<K::Error>>
    where
        C: Clock,
        K: ProgressSink,
    {
        let budget = self.config.time_budget();
        info!(
            "planning on a {}x{} grid from ({}, {}) to ({}, {}) for {}ms",
            self.grid.width(),
            self.grid.height(),
            self.start.x,
            self.start.y,
            self.goal.x,
            self.goal.y,
            budget.as_millis(),
        );

        let begin = clock.now();
        let mut elapsed = clock.elapsed(&begin);
        while elapsed < budget {
            sink.on_event(&PlannerEvent::Progress(self.scene()))
                .map_err(RunError::Sink)?;

            self.step()?;

            elapsed = clock.elapsed(&begin);
            let event = if self.has_solution() {
                let solution = self.solution()?;
                PlannerEvent::Solution(SolutionReport {
                    elapsed,
                    cost: solution.cost,
                    points: solution.points,
                })
            } else {
                PlannerEvent::NoSolution
            };
            sink.on_event(&event).map_err(RunError::Sink)?;
        }

        sink.on_event(&PlannerEvent::Finished(self.scene()))
            .map_err(RunError::Sink)?;

        let summary = self.summary(elapsed)?;
        info!(
            "planning finished after {} iterations with {} nodes",
            summary.iterations, summary.node_count
        );
        Ok(summary)
    }

    /// Counters for the run so far.
    ///
    /// # Errors
    ///
    /// Returns a tree invariant error if the recorded solution is invalid.
    pub fn summary(&self, elapsed: Duration) -> Result<PlanSummary, PlannerError> {
        let solution = self.solution.map(|_| self.solution()).transpose()?;
        Ok(PlanSummary {
            iterations: self.counters.iterations,
            accepted: self.counters.accepted,
            rejected: self.counters.rejected,
            rewires: self.counters.rewires,
            node_count: self.tree.len(),
            elapsed,
            first_solution_iteration: self.counters.first_solution_iteration,
            solution_cost: solution.as_ref().map(|s| s.cost),
            solution_points: solution.as_ref().map(|s| s.points.len()),
        })
    }

    /// The goal-reaching node closest to the root on the path to `node`.
    ///
    /// Rewiring can hang one goal node below another, so a path may pass
    /// through the goal more than once. Cutting it at the first arrival
    /// keeps the reported path free of a repeated goal point.
    fn first_goal_on_path(&self, node: NodeId) -> Result<NodeId, PlannerError> {
        let mut first = node;
        let mut current = Some(node);
        while let Some(id) = current {
            if self.config.reaches_goal(self.tree.point(id)?, self.goal) {
                first = id;
            }
            current = self.tree.parent(id)?;
        }
        Ok(first)
    }

    /// Record a goal arrival at `node`.
    ///
    /// Both the new arrival and the recorded solution are first cut back
    /// to their earliest goal node. The new one wins only if strictly
    /// cheaper.
    fn record_goal(&mut self, node: NodeId) -> Result<(), PlannerError> {
        let candidate = self.first_goal_on_path(node)?;
        let cost = self.tree.cost(candidate)?;
        match self.solution {
            None => {
                debug!(
                    "goal reached on iteration {} with cost {cost:.4}",
                    self.counters.iterations
                );
                self.counters.first_solution_iteration = Some(self.counters.iterations);
                self.solution = Some(candidate);
            }
            Some(recorded) => {
                let current = self.first_goal_on_path(recorded)?;
                if cost < self.tree.cost(current)? {
                    debug!("cheaper goal node {} with cost {cost:.4}", candidate.index());
                    self.solution = Some(candidate);
                } else {
                    self.solution = Some(current);
                }
            }
        }
        Ok(())
    }
}
