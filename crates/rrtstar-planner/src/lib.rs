//! rrtstar-planner: RRT* path planning over a 2D occupancy grid (sans-IO).
//!
//! Grows a tree of collision-free straight segments rooted at the start:
//! goal-biased sampling -> neighborhood query -> parent choice ->
//! collision check -> insertion -> local rewiring -> goal check.
//!
//! This crate has **no I/O dependencies**: time is read through
//! [`Clock`] and progress is pushed to a [`ProgressSink`]. Parsing the
//! scene from stdin and formatting the visualizer stream live in
//! `rrtstar` and `rrtstar-export`.

pub mod collision;
pub mod diagnostics;
pub mod grid;
pub mod neighbors;
pub mod optimize;
pub mod planner;
pub mod sampler;
pub mod tree;
pub mod types;

pub use diagnostics::{Clock, PlanSummary, SystemClock};
pub use grid::{Cell, OccupancyGrid};
pub use planner::{
    NullSink, Planner, PlannerEvent, ProgressSink, RunError, Scene, Solution, SolutionReport,
    StepOutcome,
};
pub use sampler::{GoalBiasedSampler, Sampler};
pub use tree::{NodeId, Tree};
pub use types::{PlannerConfig, PlannerError, Point};

/// Outcome of [`plan`].
#[derive(Debug, Clone)]
pub struct PlanResult {
    /// The final search tree.
    pub tree: Tree,
    /// The best path to the goal, if one was found.
    pub solution: Option<Solution>,
    /// Counters for the run.
    pub summary: PlanSummary,
}

/// Run RRT* on `grid` from `start` to `goal` under `config.time_budget_ms`.
///
/// Samples come from a [`GoalBiasedSampler`] over `rng`, time from
/// [`SystemClock`], and progress events are discarded. Use [`Planner`]
/// directly to observe the run.
///
/// # Errors
///
/// Returns [`PlannerError::InvalidConfig`] if `config` is invalid or an
/// endpoint lies outside `grid`, or a tree invariant error if planning
/// breaks one.
pub fn plan<R: rand::Rng>(
    grid: OccupancyGrid,
    start: Point,
    goal: Point,
    config: PlannerConfig,
    rng: R,
) -> Result<PlanResult, PlannerError> {
    let mut planner = Planner::with_rng(grid, start, goal, config, rng)?;
    let summary = planner
        .run(&SystemClock, &mut NullSink)
        .map_err(|err| match err {
            RunError::Planner(err) => err,
            RunError::Sink(never) => match never {},
        })?;
    let solution = planner
        .has_solution()
        .then(|| planner.solution())
        .transpose()?;
    Ok(PlanResult {
        tree: planner.into_tree(),
        solution,
        summary,
    })
}
