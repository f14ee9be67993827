//! Nearest-node and radius-neighborhood queries over the tree.
//!
//! Both queries are linear scans in insertion order, O(n) per call. The
//! neighborhood query additionally runs the collision test for every node
//! inside the radius.

use crate::collision::is_traversable;
use crate::grid::OccupancyGrid;
use crate::tree::{NodeId, Tree};
use crate::types::{PlannerError, Point};

/// The tree node closest to `point`.
///
/// Ties go to the earliest-inserted node.
///
/// # Errors
///
/// Returns [`PlannerError::EmptyTree`] if the tree has no nodes.
pub fn nearest(tree: &Tree, point: Point) -> Result<NodeId, PlannerError> {
    let mut best: Option<(NodeId, f64)> = None;
    for (id, candidate) in tree.iter() {
        let dist = point.distance(candidate);
        if best.is_none_or(|(_, best_dist)| dist < best_dist) {
            best = Some((id, dist));
        }
    }
    best.map(|(id, _)| id).ok_or(PlannerError::EmptyTree)
}

/// Every node strictly within `radius` of `center` whose straight segment
/// to `center` is collision-free, in insertion order.
///
/// # Errors
///
/// Returns [`PlannerError::OutOfBounds`] if `center` or a node lies
/// outside the grid.
pub fn neighborhood(
    tree: &Tree,
    grid: &OccupancyGrid,
    center: Point,
    radius: f64,
    steps: u32,
) -> Result<Vec<NodeId>, PlannerError> {
    let mut found = Vec::new();
    for (id, candidate) in tree.iter() {
        if center.distance(candidate) < radius && is_traversable(grid, center, candidate, steps)? {
            found.push(id);
        }
    }
    Ok(found)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const STEPS: u32 = 50;

    fn line_tree() -> Tree {
        let mut tree = Tree::new(Point::new(0.0, 0.0));
        let mut parent = tree.root();
        for x in 1..=5 {
            parent = tree.insert(Point::new(f64::from(x), 0.5), parent).unwrap();
        }
        tree
    }

    #[test]
    fn nearest_on_single_root() {
        let tree = Tree::new(Point::new(2.0, 2.0));
        assert_eq!(nearest(&tree, Point::new(9.0, 9.0)).unwrap(), tree.root());
    }

    #[test]
    fn nearest_picks_minimum_distance() {
        let tree = line_tree();
        let id = nearest(&tree, Point::new(3.2, 1.0)).unwrap();
        assert_eq!(tree.point(id).unwrap(), Point::new(3.0, 0.5));
    }

    #[test]
    fn nearest_ties_go_to_first_inserted() {
        let mut tree = Tree::new(Point::new(0.0, 0.0));
        let a = tree.insert(Point::new(2.0, 0.0), tree.root()).unwrap();
        tree.insert(Point::new(0.0, 2.0), a).unwrap();
        assert_eq!(nearest(&tree, Point::new(1.0, 1.0)).unwrap(), tree.root());
    }

    #[test]
    fn neighborhood_uses_strict_radius() {
        let grid = OccupancyGrid::from_rows(&["__________"; 3]).unwrap();
        let tree = line_tree();
        // Nodes at x = 2 and x = 4 are exactly 1.0 away and excluded.
        let found = neighborhood(&tree, &grid, Point::new(3.0, 0.5), 1.0, STEPS).unwrap();
        let points: Vec<Point> = found.iter().map(|&id| tree.point(id).unwrap()).collect();
        assert_eq!(points, vec![Point::new(3.0, 0.5)]);

        let found = neighborhood(&tree, &grid, Point::new(3.0, 0.5), 1.01, STEPS).unwrap();
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn neighborhood_is_in_insertion_order() {
        let grid = OccupancyGrid::from_rows(&["__________"; 3]).unwrap();
        let tree = line_tree();
        let found = neighborhood(&tree, &grid, Point::new(2.5, 1.0), 2.0, STEPS).unwrap();
        let indices: Vec<usize> = found.iter().map(|id| id.index()).collect();
        assert_eq!(indices, vec![1, 2, 3, 4]);
    }

    #[test]
    fn neighborhood_excludes_blocked_segments() {
        // Wall in column 3 separates nodes at x <= 2 from x >= 4.
        let grid = OccupancyGrid::from_rows(&["___#______"; 3]).unwrap();
        let mut tree = Tree::new(Point::new(1.0, 1.0));
        tree.insert(Point::new(2.0, 1.0), tree.root()).unwrap();
        tree.insert(Point::new(4.5, 1.0), tree.root()).unwrap();
        let found = neighborhood(&tree, &grid, Point::new(5.0, 1.0), 10.0, STEPS).unwrap();
        let points: Vec<Point> = found.iter().map(|&id| tree.point(id).unwrap()).collect();
        assert_eq!(points, vec![Point::new(4.5, 1.0)]);
    }

    #[test]
    fn neighborhood_can_be_empty() {
        let grid = OccupancyGrid::from_rows(&["__________"; 3]).unwrap();
        let tree = line_tree();
        let found = neighborhood(&tree, &grid, Point::new(9.0, 2.5), 0.5, STEPS).unwrap();
        assert!(found.is_empty());
    }
}
