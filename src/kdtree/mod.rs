//! 2d-tree.
//!
//! # Contracts:
//! - A node at even depth splits on x, at odd depth on y
//! - Points with a coordinate less than or equal to the splitting coordinate go to the left
//!   subtree, greater ones to the right
//!

use crate::iter::{closest_k, Iter};
use crate::{Axis, Point, PointSet, Rect, EPSILON, REBALANCE_FACTOR};
use std::collections::HashSet;
use std::iter::FromIterator;
use tracing::{debug, trace};

/// Index of a node in `KdTree::nodes`
pub(crate) type NodeId = usize;

#[derive(Debug, Clone)]
struct Node {
    point: Point,
    depth: usize,
    // `parent` is a plain index and does not own anything
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

impl Node {
    fn axis(&self) -> Axis {
        Axis::at_depth(self.depth)
    }

    /// Splitting coordinate of this node
    fn split(&self) -> f64 {
        self.point.coord(self.axis())
    }
}

/// Point set stored in a 2d-tree.
///
/// Nodes live in a single `Vec` and link to each other by index. Nodes are never removed, so
/// the length of the vector is the size of the set. `Clone` yields an independent tree.
#[derive(Debug, Clone, Default)]
pub struct KdTree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
    // deepest insertion since the last rebuild
    max_depth: usize,
    rebuilds: usize,
    // no rebuild runs below this size
    next_rebuild_size: usize,
}

impl KdTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![],
            root: None,
            max_depth: 0,
            rebuilds: 0,
            next_rebuild_size: 0,
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.max_depth = 0;
        self.rebuilds = 0;
        self.next_rebuild_size = 0;
    }

    /// Build a balanced tree by splitting `points` at the median of every level.
    pub fn from_points(mut points: Vec<Point>) -> Self {
        let len = points.len();
        // exact copies would all tie with each other and only shrink a slice by one per level
        let mut seen = HashSet::with_capacity(points.len());
        points.retain(|p| seen.insert(exact_key(p)));

        let mut tree = Self::new();
        tree.nodes.reserve(points.len());
        tree.build(points.as_mut_slice());
        trace!(
            input = len,
            size = tree.size(),
            max_depth = tree.max_depth,
            "built kd-tree"
        );
        tree
    }

    /// Depth of the deepest node, 0 for an empty tree.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn build(&mut self, points: &mut [Point]) {
        // (start, end, depth) of the slices still to place
        let mut todo = vec![(0, points.len(), 0)];
        while let Some((start, end, depth)) = todo.pop() {
            if start == end {
                continue;
            }
            let slice = &mut points[start..end];
            let mid = partition_at_median(slice, Axis::at_depth(depth));
            // everything left of `mid` is <= the median and everything right of it is greater,
            // so descending from the root lands the median right under its slice's parent
            self.insert(slice[mid]);
            todo.push((start + mid + 1, end, depth + 1));
            todo.push((start, start + mid, depth + 1));
        }
    }

    fn push_node(&mut self, point: Point, depth: usize, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            point,
            depth,
            parent,
            left: None,
            right: None,
        });
        self.max_depth = self.max_depth.max(depth);
        id
    }

    /// Returns false if an equal point was already in the tree.
    fn insert(&mut self, point: Point) -> bool {
        if self.find(&point).is_some() {
            return false;
        }
        let mut current = match self.root {
            Some(root) => root,
            None => {
                self.root = Some(self.push_node(point, 0, None));
                return true;
            }
        };
        loop {
            let node = &self.nodes[current];
            let to_left = point.coord(node.axis()) <= node.split();
            let child = if to_left { node.left } else { node.right };
            match child {
                Some(child) => current = child,
                None => {
                    let depth = node.depth + 1;
                    let id = self.push_node(point, depth, Some(current));
                    let parent = &mut self.nodes[current];
                    if to_left {
                        parent.left = Some(id);
                    } else {
                        parent.right = Some(id);
                    }
                    return true;
                }
            }
        }
    }

    /// Find a node equal to `point` within the tolerance.
    ///
    /// Follows the descent path, and also searches the other side of every splitting plane
    /// `point` is closer to than [EPSILON].
    fn find(&self, point: &Point) -> Option<NodeId> {
        let mut stack = Vec::with_capacity(self.max_depth + 1);
        stack.extend(self.root);
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if node.point == *point {
                return Some(id);
            }
            let c = point.coord(node.axis());
            let (near, far) = if c <= node.split() {
                (node.left, node.right)
            } else {
                (node.right, node.left)
            };
            if (c - node.split()).abs() < EPSILON {
                stack.extend(far);
            }
            stack.extend(near);
        }
        None
    }

    fn too_deep(&self) -> bool {
        self.max_depth as f64 > REBALANCE_FACTOR * (self.size() as f64).ln()
    }

    /// Rebuild the tree from scratch if it got too deep.
    ///
    /// Points sharing a coordinate can keep even a fresh tree above the limit. After such a
    /// rebuild the next one waits until the tree doubled in size.
    fn rebalance(&mut self) {
        if self.size() < self.next_rebuild_size || !self.too_deep() {
            return;
        }
        debug!(
            size = self.size(),
            max_depth = self.max_depth,
            "kd-tree is out of balance, rebuilding"
        );
        let points = self.iter().collect::<Vec<_>>();
        let rebuilds = self.rebuilds + 1;
        *self = Self::from_points(points);
        self.rebuilds = rebuilds;
        if self.too_deep() {
            self.next_rebuild_size = 2 * self.size();
        }
        debug!(
            max_depth = self.max_depth,
            rebuilds,
            next_rebuild_size = self.next_rebuild_size,
            "kd-tree rebuilt"
        );
    }

    pub(crate) fn point(&self, id: NodeId) -> Point {
        self.nodes[id].point
    }

    fn leftmost(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.nodes[id].left {
            id = left;
        }
        id
    }

    /// In-order successor of `id`, `None` after the last node.
    pub(crate) fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(right) = self.nodes[id].right {
            return Some(self.leftmost(right));
        }
        // climb until we leave a left subtree; leaving the root means we are done
        let mut current = id;
        while let Some(parent) = self.nodes[current].parent {
            if self.nodes[parent].left == Some(current) {
                return Some(parent);
            }
            current = parent;
        }
        None
    }

    /// Collect the points inside `rect` in pre-order.
    fn find_in_rect(&self, rect: &Rect, out: &mut Vec<Point>) {
        let mut stack = Vec::with_capacity(self.max_depth + 1);
        stack.extend(self.root);
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if rect.contains(&node.point) {
                out.push(node.point);
            }
            let axis = node.axis();
            // right goes on the stack first so the left subtree is visited first
            if node.split() <= rect.max(axis) + EPSILON {
                stack.extend(node.right);
            }
            if node.split() >= rect.min(axis) - EPSILON {
                stack.extend(node.left);
            }
        }
    }

    /// Nearest neighbour search starting from `root`.
    ///
    /// Each stack entry carries the distance of the splitting plane it was pushed across,
    /// `None` for the side the query falls on. An entry is skipped once the best distance
    /// found is not greater than its plane distance.
    fn find_nearest(&self, root: NodeId, query: &Point) -> Point {
        let mut best = self.nodes[root].point;
        let mut best_dist = best.distance(query);

        let mut stack: Vec<(NodeId, Option<f64>)> = Vec::with_capacity(2 * (self.max_depth + 1));
        stack.push((root, None));
        while let Some((id, plane_dist)) = stack.pop() {
            if let Some(plane_dist) = plane_dist {
                if plane_dist >= best_dist {
                    continue;
                }
            }
            let node = &self.nodes[id];
            let dist = node.point.distance(query);
            if dist < best_dist {
                best = node.point;
                best_dist = dist;
            }
            if dist == 0.0 {
                continue;
            }
            let delta = node.split() - query.coord(node.axis());
            let (near, far) = if delta > 0.0 {
                (node.left, node.right)
            } else {
                (node.right, node.left)
            };
            if let Some(far) = far {
                stack.push((far, Some(delta.abs())));
            }
            if let Some(near) = near {
                stack.push((near, None));
            }
        }
        best
    }
}

/// Move the median of `points` on `axis` to the returned index, with every point less than or
/// equal to it on the left and every greater point on the right.
fn partition_at_median(points: &mut [Point], axis: Axis) -> usize {
    let mid = points.len() / 2;
    points.select_nth_unstable_by(mid, |a, b| a.coord(axis).total_cmp(&b.coord(axis)));
    let median = points[mid].coord(axis);
    // ties go left, so gather them right after `mid` and move the median past them
    let mut split = mid;
    for i in mid + 1..points.len() {
        if points[i].coord(axis) <= median {
            split += 1;
            points.swap(split, i);
        }
    }
    points.swap(mid, split);
    split
}

/// Bit pattern of `p` with -0.0 folded into 0.0.
fn exact_key(p: &Point) -> (u64, u64) {
    ((p.x() + 0.0).to_bits(), (p.y() + 0.0).to_bits())
}

impl PointSet for KdTree {
    fn put(&mut self, point: Point) {
        if self.insert(point) {
            self.rebalance();
        }
    }

    fn contains(&self, point: &Point) -> bool {
        self.find(point).is_some()
    }

    fn size(&self) -> usize {
        self.nodes.len()
    }

    fn iter(&self) -> Iter<'_> {
        Iter::tree(self, self.root.map(|root| self.leftmost(root)))
    }

    fn range(&self, rect: &Rect) -> Iter<'_> {
        let mut res = Vec::new();
        self.find_in_rect(rect, &mut res);
        Iter::snapshot(res)
    }

    fn nearest(&self, point: &Point) -> Option<Point> {
        self.root.map(|root| self.find_nearest(root, point))
    }

    fn nearest_k(&self, point: &Point, k: usize) -> Iter<'_> {
        if k >= self.size() {
            return self.iter();
        }
        Iter::snapshot(closest_k(self.iter(), point, k))
    }
}

impl From<Vec<Point>> for KdTree {
    fn from(points: Vec<Point>) -> Self {
        Self::from_points(points)
    }
}

impl FromIterator<Point> for KdTree {
    fn from_iter<It>(it: It) -> Self
    where
        It: IntoIterator<Item = Point>,
    {
        Self::from_points(it.into_iter().collect())
    }
}

/// Inserts one point at a time, rebalancing as needed.
impl Extend<Point> for KdTree {
    fn extend<It>(&mut self, it: It)
    where
        It: IntoIterator<Item = Point>,
    {
        for p in it {
            self.put(p);
        }
    }
}

impl<'a> IntoIterator for &'a KdTree {
    type Item = Point;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}
