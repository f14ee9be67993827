//! Cost optimization: parent selection for a new sample and local rewiring.
//!
//! These two steps are what distinguish RRT* from plain RRT. A new sample
//! attaches to whichever collision-free neighbor gives it the lowest
//! cost-to-root, and then every neighbor is offered the sample as a new
//! parent if that would shorten its own path.

use log::trace;

use crate::collision::is_traversable;
use crate::grid::OccupancyGrid;
use crate::neighbors::nearest;
use crate::tree::{NodeId, Tree};
use crate::types::{PlannerError, Point};

/// Pick the parent for `sample` that minimizes its cost-to-root.
///
/// With an empty `neighborhood` this falls back to the nearest tree node.
/// That fallback is **not** collision-checked; the caller must validate
/// the edge before attaching. Otherwise the member with the lowest
/// [`Tree::cost_if_parent`] wins, ties going to the first in
/// `neighborhood` order.
///
/// # Errors
///
/// Returns [`PlannerError::EmptyTree`] if the fallback finds no nodes, or
/// [`PlannerError::UnknownNode`] if a neighborhood member is not in `tree`.
pub fn choose_parent(
    tree: &Tree,
    sample: Point,
    neighborhood: &[NodeId],
) -> Result<NodeId, PlannerError> {
    let mut members = neighborhood.iter();
    let Some(&first) = members.next() else {
        return nearest(tree, sample);
    };

    let mut best = first;
    let mut best_cost = tree.cost_if_parent(sample, first)?;
    for &candidate in members {
        let cost = tree.cost_if_parent(sample, candidate)?;
        if cost < best_cost {
            best = candidate;
            best_cost = cost;
        }
    }
    Ok(best)
}

/// Re-parent neighbors through `sample` where that lowers their cost.
///
/// Neighbors are processed in order. A neighbor moves under `sample` only
/// if its cost through `sample` is strictly lower than its current cost
/// and the connecting segment is collision-free. Each check sees the
/// costs left by earlier moves in the same pass.
///
/// Returns the number of re-parented nodes.
///
/// # Errors
///
/// Returns [`PlannerError::UnknownNode`] for ids not in `tree`,
/// [`PlannerError::OutOfBounds`] if a point lies outside `grid`, and
/// [`PlannerError::WouldCycle`] if a move would close a loop (the strict
/// cost test rules this out for consistent trees).
pub fn rewire(
    tree: &mut Tree,
    grid: &OccupancyGrid,
    sample: NodeId,
    neighborhood: &[NodeId],
    steps: u32,
) -> Result<usize, PlannerError> {
    let sample_point = tree.point(sample)?;
    let mut rewired = 0;

    for &neighbor in neighborhood {
        if neighbor == sample {
            continue;
        }
        let neighbor_point = tree.point(neighbor)?;
        let current = tree.cost(neighbor)?;
        let through_sample = tree.cost_if_parent(neighbor_point, sample)?;
        if through_sample < current && is_traversable(grid, sample_point, neighbor_point, steps)? {
            trace!(
                "rewire node {} under {}: cost {current:.4} -> {through_sample:.4}",
                neighbor.index(),
                sample.index(),
            );
            tree.reparent(neighbor, sample)?;
            rewired += 1;
        }
    }

    Ok(rewired)
}
