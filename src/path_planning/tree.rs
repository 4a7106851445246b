//! Tree store for RRT / RRT*
//!
//! Nodes live in an arena keyed by their grid cell; parent and child links
//! are plain cell keys. Iteration is lexicographic by cell, which gives the
//! planner a deterministic scan order.

use std::collections::BTreeMap;

use crate::common::Cell;

/// Which bookkeeping the tree maintains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeMode {
    /// Integer distance from parent per node
    Rrt,
    /// Cumulative distance to root per node, kept current across rewires
    RrtStar,
}

/// Per-node cost bookkeeping
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeCost {
    DistanceFromParent(u32),
    DistanceToRoot(f64),
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub cell: Cell,
    pub parent: Option<Cell>,
    /// Children in insertion order
    pub children: Vec<Cell>,
    pub cost: NodeCost,
}

impl TreeNode {
    fn new(cell: Cell, mode: TreeMode) -> Self {
        let cost = match mode {
            TreeMode::Rrt => NodeCost::DistanceFromParent(0),
            TreeMode::RrtStar => NodeCost::DistanceToRoot(0.0),
        };
        TreeNode {
            cell,
            parent: None,
            children: Vec::new(),
            cost,
        }
    }

    /// Cached cumulative cost, `None` in RRT mode
    pub fn distance_to_root(&self) -> Option<f64> {
        match self.cost {
            NodeCost::DistanceToRoot(d) => Some(d),
            NodeCost::DistanceFromParent(_) => None,
        }
    }

    /// Integer edge length to the parent, `None` in RRT* mode
    pub fn distance_from_parent(&self) -> Option<u32> {
        match self.cost {
            NodeCost::DistanceFromParent(d) => Some(d),
            NodeCost::DistanceToRoot(_) => None,
        }
    }
}

/// Arena of tree nodes keyed by unique cell coordinate
#[derive(Debug, Clone)]
pub struct TreeStore {
    mode: TreeMode,
    nodes: BTreeMap<Cell, TreeNode>,
    root: Option<Cell>,
}

impl TreeStore {
    pub fn new(mode: TreeMode) -> Self {
        TreeStore {
            mode,
            nodes: BTreeMap::new(),
            root: None,
        }
    }

    pub fn mode(&self) -> TreeMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<Cell> {
        self.root
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.nodes.contains_key(&cell)
    }

    pub fn node(&self, cell: Cell) -> Option<&TreeNode> {
        self.nodes.get(&cell)
    }

    pub fn parent_of(&self, cell: Cell) -> Option<Cell> {
        self.nodes.get(&cell).and_then(|n| n.parent)
    }

    /// Nodes in lexicographic cell order
    pub fn nodes(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.values()
    }

    /// Node cells in lexicographic order
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.nodes.keys().copied()
    }

    /// All `(parent, child)` edges
    pub fn edges(&self) -> impl Iterator<Item = (Cell, Cell)> + '_ {
        self.nodes
            .values()
            .filter_map(|n| n.parent.map(|p| (p, n.cell)))
    }

    /// Discard the whole tree, including the root
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Create a detached node at `cell`.
    ///
    /// Returns false without mutating anything when a node already exists
    /// there. The first node created becomes the root.
    pub fn create_node(&mut self, cell: Cell) -> bool {
        if self.nodes.contains_key(&cell) {
            return false;
        }
        self.nodes.insert(cell, TreeNode::new(cell, self.mode));
        if self.root.is_none() {
            self.root = Some(cell);
        }
        true
    }

    /// Attach `child` under `parent` with edge length `distance`.
    ///
    /// Fails when either endpoint is missing, when `child` is the root, or
    /// when `child` is still attached elsewhere.
    pub fn add_edge(&mut self, parent: Cell, child: Cell, distance: f64) -> bool {
        if parent == child || Some(child) == self.root {
            return false;
        }
        let parent_cost = match self.nodes.get(&parent) {
            Some(node) => node.distance_to_root().unwrap_or(0.0),
            None => return false,
        };
        match self.nodes.get(&child) {
            Some(node) if node.parent.is_none() => {}
            _ => return false,
        }

        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(child);
        }
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
            node.cost = match self.mode {
                TreeMode::Rrt => NodeCost::DistanceFromParent(distance as u32),
                TreeMode::RrtStar => NodeCost::DistanceToRoot(parent_cost + distance),
            };
        }
        if self.mode == TreeMode::RrtStar {
            self.propagate_cost(child);
        }
        true
    }

    /// Detach `child` from `parent` (RRT* only).
    ///
    /// The child's cached cost is left stale; the caller must re-attach it
    /// with [`TreeStore::add_edge`] before the step ends.
    pub fn remove_edge(&mut self, parent: Cell, child: Cell) -> bool {
        if self.mode != TreeMode::RrtStar || !self.nodes.contains_key(&parent) {
            return false;
        }
        match self.nodes.get_mut(&child) {
            Some(node) if node.parent == Some(parent) => node.parent = None,
            _ => return false,
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.retain(|&c| c != child);
        }
        true
    }

    /// Cost to root recomputed by walking parent links, summed root first
    pub fn distance_to_root(&self, cell: Cell) -> Option<f64> {
        let path = self.reconstruct_path(cell)?;
        Some(
            path.windows(2)
                .rev()
                .fold(0.0, |acc, w| acc + w[1].distance(&w[0])),
        )
    }

    /// Cached cost to root, RRT* mode only
    pub fn cached_distance_to_root(&self, cell: Cell) -> Option<f64> {
        self.nodes.get(&cell).and_then(|n| n.distance_to_root())
    }

    /// Number of edges between `cell` and the root
    pub fn depth(&self, cell: Cell) -> Option<usize> {
        self.reconstruct_path(cell).map(|p| p.len() - 1)
    }

    /// Cells from `from` up to the root inclusive. `None` when `from` is not
    /// a node.
    pub fn reconstruct_path(&self, from: Cell) -> Option<Vec<Cell>> {
        let mut node = self.nodes.get(&from)?;
        let mut path = vec![node.cell];
        while let Some(parent) = node.parent {
            node = self.nodes.get(&parent)?;
            path.push(node.cell);
            if path.len() > self.nodes.len() {
                // parent links form a cycle
                return None;
            }
        }
        Some(path)
    }

    fn propagate_cost(&mut self, from: Cell) {
        let mut stack = vec![from];
        while let Some(cell) = stack.pop() {
            let (base, children) = match self.nodes.get(&cell) {
                Some(node) => (node.distance_to_root().unwrap_or(0.0), node.children.clone()),
                None => continue,
            };
            for child in children {
                if let Some(node) = self.nodes.get_mut(&child) {
                    node.cost = NodeCost::DistanceToRoot(base + cell.distance(&child));
                    stack.push(child);
                }
            }
        }
    }
}
