use crate::kdtree::{KdTree, NodeId};
use crate::ordered_set::Key;
use crate::{Point, PointSet};
use std::collections::btree_set;
use std::iter::FusedIterator;
use std::vec;

/// Forward iterator over the points of a set or of a query result.
///
/// Borrows the set it was created from, so the set can not be modified while iterating.
#[derive(Debug, Clone)]
pub struct Iter<'a>(Cursor<'a>);

#[derive(Debug, Clone)]
enum Cursor<'a> {
    /// Walks the live `BTreeSet` of an `OrderedSet`.
    Ordered(btree_set::Iter<'a, Key>),
    /// Owns the points matched by a query.
    Snapshot(vec::IntoIter<Point>),
    /// Walks a live tree in order. `None` is the end.
    Tree {
        tree: &'a KdTree,
        node: Option<NodeId>,
    },
}

impl<'a> Iter<'a> {
    pub fn empty() -> Self {
        Self::snapshot(Vec::new())
    }

    pub(crate) fn ordered(it: btree_set::Iter<'a, Key>) -> Self {
        Self(Cursor::Ordered(it))
    }

    pub(crate) fn snapshot(points: Vec<Point>) -> Self {
        Self(Cursor::Snapshot(points.into_iter()))
    }

    pub(crate) fn tree(tree: &'a KdTree, first: Option<NodeId>) -> Self {
        Self(Cursor::Tree { tree, node: first })
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        match &mut self.0 {
            Cursor::Ordered(it) => it.next().map(|key| key.0),
            Cursor::Snapshot(it) => it.next(),
            Cursor::Tree { tree, node } => {
                let current = (*node)?;
                *node = tree.successor(current);
                Some(tree.point(current))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.0 {
            Cursor::Ordered(it) => it.size_hint(),
            Cursor::Snapshot(it) => it.size_hint(),
            Cursor::Tree { tree, node } => match node {
                Some(_) => (1, Some(tree.size())),
                None => (0, Some(0)),
            },
        }
    }
}

impl<'a> FusedIterator for Iter<'a> {}

/// Keep the `k` points closest to `query` out of `points`.
///
/// The first `k` points fill the buffer, after that a point replaces the farthest candidate
/// if it is strictly closer. On ties the last farthest candidate is replaced.
pub(crate) fn closest_k<It>(points: It, query: &Point, k: usize) -> Vec<Point>
where
    It: Iterator<Item = Point>,
{
    let mut candidates: Vec<Point> = Vec::with_capacity(k);
    if k == 0 {
        return candidates;
    }
    for p in points {
        if candidates.len() < k {
            candidates.push(p);
            continue;
        }
        let worst = candidates
            .iter()
            .map(|c| c.distance(query))
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b));
        if let Some((worst, worst_dist)) = worst {
            if p.distance(query) < worst_dist {
                candidates[worst] = p;
            }
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closest_k_keeps_the_closest() {
        let points = (0..10).map(|i| Point::new(i as f64, 0.0));
        let mut res = closest_k(points, &Point::new(4.2, 0.0), 3);
        res.sort_by(|a, b| a.x().total_cmp(&b.x()));
        assert_eq!(
            res,
            vec![
                Point::new(3.0, 0.0),
                Point::new(4.0, 0.0),
                Point::new(5.0, 0.0)
            ]
        );
    }

    #[test]
    fn closest_k_zero_is_empty() {
        let points = (0..10).map(|i| Point::new(i as f64, 0.0));
        assert!(closest_k(points, &Point::new(0.0, 0.0), 0).is_empty());
    }

    #[test]
    fn closest_k_replaces_the_last_farthest_on_ties() {
        let points = vec![
            Point::new(-1.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.5, 0.0),
        ];
        let res = closest_k(points.into_iter(), &Point::new(0.0, 0.0), 2);
        assert_eq!(res, vec![Point::new(-1.0, 0.0), Point::new(0.5, 0.0)]);
    }

    #[test]
    fn empty_iter() {
        let mut it = Iter::empty();
        assert_eq!(it.size_hint(), (0, Some(0)));
        assert!(it.next().is_none());
        assert!(it.next().is_none());
    }
}
