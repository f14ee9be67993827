//! Search tree stored as an arena of nodes with index-based parent links.
//!
//! The [`Tree`] exclusively owns every node; callers hold [`NodeId`]
//! handles. A tree always has exactly one root, created from the start
//! point, so it is never empty.
//!
//! Each node caches its cost-to-root. The cache is written on insertion
//! and refreshed for the whole subtree whenever a node is re-parented,
//! using explicit child lists, so [`Tree::cost`] is O(1) and always equals
//! the sum of edge lengths along the current parent chain.

use crate::types::{PlannerError, Point};

/// Handle to a node in a [`Tree`].
///
/// Ids are dense insertion indices: the root is `0` and the n-th inserted
/// node is `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// The insertion index of this node.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Node {
    point: Point,
    parent: Option<NodeId>,
    cost: f64,
    children: Vec<NodeId>,
}

/// An RRT* search tree.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Create a tree holding only the root at `start`.
    #[must_use]
    pub fn new(start: Point) -> Self {
        Self {
            nodes: vec![Node {
                point: start,
                parent: None,
                cost: 0.0,
                children: Vec::new(),
            }],
        }
    }

    /// The root node.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes, including the root.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a tree is created with its root.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, Point)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i), node.point))
    }

    /// Iterate over every edge as `(child, parent)` points, in child
    /// insertion order. The root contributes no edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.nodes.iter().filter_map(|node| {
            let parent = node.parent?;
            let parent_point = self.nodes.get(parent.0)?.point;
            Some((node.point, parent_point))
        })
    }

    /// Number of edges (`len() - 1`).
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// The location of `id`.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::UnknownNode`] if `id` is not in this tree.
    pub fn point(&self, id: NodeId) -> Result<Point, PlannerError> {
        Ok(self.node(id)?.point)
    }

    /// The parent of `id`, or `None` for the root.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::UnknownNode`] if `id` is not in this tree.
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, PlannerError> {
        Ok(self.node(id)?.parent)
    }

    /// The children of `id`, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::UnknownNode`] if `id` is not in this tree.
    pub fn children(&self, id: NodeId) -> Result<&[NodeId], PlannerError> {
        Ok(&self.node(id)?.children)
    }

    /// Path cost from the root to `id`.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::UnknownNode`] if `id` is not in this tree.
    pub fn cost(&self, id: NodeId) -> Result<f64, PlannerError> {
        Ok(self.node(id)?.cost)
    }

    /// The cost `point` would have if attached under `candidate`.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::UnknownNode`] if `candidate` is not in this tree.
    pub fn cost_if_parent(&self, point: Point, candidate: NodeId) -> Result<f64, PlannerError> {
        let parent = self.node(candidate)?;
        Ok(point.distance(parent.point) + parent.cost)
    }

    /// Recompute the cost of `id` by walking its parent chain.
    ///
    /// This ignores the cache and is O(depth); it exists to check the
    /// cached value.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::UnknownNode`] if `id` or an ancestor is not
    /// in this tree.
    pub fn recompute_cost(&self, id: NodeId) -> Result<f64, PlannerError> {
        let mut total = 0.0;
        let mut current = self.node(id)?;
        while let Some(parent_id) = current.parent {
            let parent = self.node(parent_id)?;
            total += current.point.distance(parent.point);
            current = parent;
        }
        Ok(total)
    }

    /// Attach a new node at `point` under `parent`.
    ///
    /// The caller is responsible for the edge being collision-free.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::UnknownNode`] if `parent` is not in this tree.
    pub fn insert(&mut self, point: Point, parent: NodeId) -> Result<NodeId, PlannerError> {
        let cost = self.cost_if_parent(point, parent)?;
        let id = NodeId(self.nodes.len());
        self.node_mut(parent)?.children.push(id);
        self.nodes.push(Node {
            point,
            parent: Some(parent),
            cost,
            children: Vec::new(),
        });
        Ok(id)
    }

    /// Move `id` under `new_parent`, refreshing the cached cost of `id`
    /// and all of its descendants.
    ///
    /// The caller is responsible for the new edge being collision-free.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::WouldCycle`] if `new_parent` is `id` or one
    /// of its descendants (this includes trying to re-parent the root
    /// under one of its own nodes). Returns [`PlannerError::UnknownNode`]
    /// if either id is not in this tree.
    pub fn reparent(&mut self, id: NodeId, new_parent: NodeId) -> Result<(), PlannerError> {
        self.node(new_parent)?;
        if self.is_ancestor_or_self(id, new_parent)? {
            return Err(PlannerError::WouldCycle {
                node: id.0,
                parent: new_parent.0,
            });
        }

        if let Some(old_parent) = self.node(id)?.parent {
            self.node_mut(old_parent)?.children.retain(|&c| c != id);
        }
        self.node_mut(new_parent)?.children.push(id);
        self.node_mut(id)?.parent = Some(new_parent);

        self.refresh_subtree_costs(id)
    }

    /// Whether `ancestor` is `node` or lies on the parent chain of `node`.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::UnknownNode`] if either id is not in this tree.
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> Result<bool, PlannerError> {
        self.node(ancestor)?;
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return Ok(true);
            }
            current = self.node(id)?.parent;
        }
        Ok(false)
    }

    /// Points from the root to `id`, inclusive, root first.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::UnknownNode`] if `id` is not in this tree.
    pub fn path_to_root(&self, id: NodeId) -> Result<Vec<Point>, PlannerError> {
        let mut points = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id)?;
            points.push(node.point);
            current = node.parent;
        }
        points.reverse();
        Ok(points)
    }

    /// Recompute cached costs of `id` and its descendants top-down from
    /// the parent's cached cost.
    fn refresh_subtree_costs(&mut self, id: NodeId) -> Result<(), PlannerError> {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = self.node(current)?;
            let cost = match node.parent {
                Some(parent) => self.cost_if_parent(node.point, parent)?,
                None => 0.0,
            };
            stack.extend_from_slice(&node.children);
            self.node_mut(current)?.cost = cost;
        }
        Ok(())
    }

    fn node(&self, id: NodeId) -> Result<&Node, PlannerError> {
        self.nodes.get(id.0).ok_or(PlannerError::UnknownNode(id.0))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, PlannerError> {
        self.nodes.get_mut(id.0).ok_or(PlannerError::UnknownNode(id.0))
    }
}
