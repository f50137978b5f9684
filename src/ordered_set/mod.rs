#[cfg(test)]
mod tests;

use crate::iter::{closest_k, Iter};
use crate::{Point, PointSet, Rect, EPSILON};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::iter::FromIterator;

/// Point ordered by x, then by y.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Key(pub(crate) Point);

impl Ord for Key {
    fn cmp(&self, rhs: &Self) -> Ordering {
        self.0
            .x()
            .total_cmp(&rhs.0.x())
            .then_with(|| self.0.y().total_cmp(&rhs.0.y()))
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, rhs: &Self) -> Option<Ordering> {
        Some(self.cmp(rhs))
    }
}

impl PartialEq for Key {
    fn eq(&self, rhs: &Self) -> bool {
        self.cmp(rhs) == Ordering::Equal
    }
}

impl Eq for Key {}

/// Point set backed by a `BTreeSet`.
///
/// Membership is logarithmic, every other query scans the set in x-then-y order.
#[derive(Debug, Clone, Default)]
pub struct OrderedSet {
    points: BTreeSet<Key>,
}

impl OrderedSet {
    pub fn new() -> Self {
        Self {
            points: BTreeSet::new(),
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Find a stored point equal to `point` within the tolerance.
    ///
    /// Equal points may differ by less than `EPSILON` in x, and the key orders by x first, so
    /// scan the keys with x in that window.
    fn find(&self, point: &Point) -> Option<&Point> {
        let from = Key(Point::new(point.x() - EPSILON, f64::NEG_INFINITY));
        let to = Key(Point::new(point.x() + EPSILON, f64::INFINITY));
        self.points
            .range(from..=to)
            .map(|key| &key.0)
            .find(|p| *p == point)
    }
}

impl PointSet for OrderedSet {
    fn put(&mut self, point: Point) {
        if self.find(&point).is_none() {
            self.points.insert(Key(point));
        }
    }

    fn contains(&self, point: &Point) -> bool {
        self.find(point).is_some()
    }

    fn size(&self) -> usize {
        self.points.len()
    }

    fn iter(&self) -> Iter<'_> {
        Iter::ordered(self.points.iter())
    }

    fn range(&self, rect: &Rect) -> Iter<'_> {
        let res = self.iter().filter(|p| rect.contains(p)).collect();
        Iter::snapshot(res)
    }

    fn nearest(&self, point: &Point) -> Option<Point> {
        // `min_by` keeps the first of equally close points
        self.iter()
            .map(|p| (p.distance(point), p))
            .min_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, p)| p)
    }

    fn nearest_k(&self, point: &Point, k: usize) -> Iter<'_> {
        if k >= self.size() {
            return self.iter();
        }
        Iter::snapshot(closest_k(self.iter(), point, k))
    }
}

impl FromIterator<Point> for OrderedSet {
    fn from_iter<It>(it: It) -> Self
    where
        It: IntoIterator<Item = Point>,
    {
        let mut res = Self::new();
        res.extend(it);
        res
    }
}

impl Extend<Point> for OrderedSet {
    fn extend<It>(&mut self, it: It)
    where
        It: IntoIterator<Item = Point>,
    {
        for p in it {
            self.put(p);
        }
    }
}

impl<'a> IntoIterator for &'a OrderedSet {
    type Item = Point;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}
