//! Segment validity: a discretized line-of-sight test against the grid.
//!
//! A segment is subdivided into a fixed number of equal steps (a digital
//! differential analyzer walk) and every resulting point, both endpoints
//! included, must land on a free cell. The step count does not depend on
//! segment length, so long segments are sampled more sparsely than short
//! ones and can skip over thin obstacles. Raise
//! [`PlannerConfig::collision_steps`](crate::PlannerConfig::collision_steps)
//! to tighten the check.

use crate::grid::OccupancyGrid;
use crate::types::{PlannerError, Point};

/// Whether the straight segment from `a` to `b` is collision-free.
///
/// Checks `steps + 1` equally spaced points from `a` to `b` inclusive and
/// returns `false` as soon as one lands on a blocked cell. Interior points
/// are clamped to the segment's bounding box so rounding cannot push them
/// outside the grid when both endpoints are inside it.
///
/// # Errors
///
/// Returns [`PlannerError::OutOfBounds`] if either endpoint is outside the grid.
pub fn is_traversable(
    grid: &OccupancyGrid,
    a: Point,
    b: Point,
    steps: u32,
) -> Result<bool, PlannerError> {
    if grid.is_blocked(a)? || grid.is_blocked(b)? {
        return Ok(false);
    }

    let (min_x, max_x) = (a.x.min(b.x), a.x.max(b.x));
    let (min_y, max_y) = (a.y.min(b.y), a.y.max(b.y));
    let steps_f = f64::from(steps);

    for i in 1..steps {
        let p = a.lerp(b, f64::from(i) / steps_f);
        let p = Point::new(p.x.clamp(min_x, max_x), p.y.clamp(min_y, max_y));
        if grid.is_blocked(p)? {
            return Ok(false);
        }
    }
    Ok(true)
}
