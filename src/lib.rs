//! 2D point sets.
//!
//! Two containers implement [PointSet]:
//! - [OrderedSet]: a `BTreeSet` of points, queries scan the ordered sequence.
//! - [KdTree]: a 2d-tree splitting on x at even and on y at odd depths, queries prune
//!   subtrees that can not contain a result.
//!
//! # Contracts:
//! - Points are compared with a tolerance of [EPSILON] on both axes
//! - Query results are unordered, sort them if you need to compare two sets
//!
pub mod error;
pub mod iter;
pub mod kdtree;
pub mod ordered_set;

pub use error::GeometryError;
pub use iter::Iter;
pub use kdtree::KdTree;
pub use ordered_set::OrderedSet;

use std::fmt;

/// Tolerance used by point equality and rectangle containment.
pub const EPSILON: f64 = f64::EPSILON;

/// The kd-tree is rebuilt once its depth exceeds `REBALANCE_FACTOR * ln(size)`.
pub const REBALANCE_FACTOR: f64 = 2.0;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// The splitting axis of a tree level.
    pub fn at_depth(depth: usize) -> Self {
        if depth % 2 == 0 {
            Axis::X
        } else {
            Axis::Y
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Point([f64; 2]);

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self([x, y])
    }

    pub fn try_new(x: f64, y: f64) -> Result<Self, GeometryError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(GeometryError::NonFinite { x, y });
        }
        Ok(Self::new(x, y))
    }

    pub fn x(&self) -> f64 {
        self.0[0]
    }

    pub fn y(&self) -> f64 {
        self.0[1]
    }

    pub fn coord(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.0[0],
            Axis::Y => self.0[1],
        }
    }

    /// Euclidean distance
    pub fn distance(&self, rhs: &Self) -> f64 {
        let x = self.x() - rhs.x();
        let y = self.y() - rhs.y();
        (x * x + y * y).sqrt()
    }
}

/// Tolerant equality: both coordinates differ by less than [EPSILON].
impl PartialEq for Point {
    fn eq(&self, rhs: &Self) -> bool {
        (self.x() - rhs.x()).abs() < EPSILON && (self.y() - rhs.y()).abs() < EPSILON
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<[f64; 2]> for Point {
    fn from(p: [f64; 2]) -> Self {
        Self(p)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.x(), self.y())
    }
}

/// Axis aligned rectangle, boundaries included.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    lower_left: Point,
    upper_right: Point,
}

impl Rect {
    /// Panics if `lower_left` is not below and left of `upper_right`.
    pub fn new(lower_left: Point, upper_right: Point) -> Self {
        assert!(lower_left.x() <= upper_right.x());
        assert!(lower_left.y() <= upper_right.y());
        Self {
            lower_left,
            upper_right,
        }
    }

    pub fn try_new(lower_left: Point, upper_right: Point) -> Result<Self, GeometryError> {
        for p in [lower_left, upper_right].iter() {
            if !p.x().is_finite() || !p.y().is_finite() {
                return Err(GeometryError::NonFinite { x: p.x(), y: p.y() });
            }
        }
        if lower_left.x() > upper_right.x() || lower_left.y() > upper_right.y() {
            return Err(GeometryError::InvertedRect {
                lower_left,
                upper_right,
            });
        }
        Ok(Self::new(lower_left, upper_right))
    }

    pub fn lower_left(&self) -> Point {
        self.lower_left
    }

    pub fn upper_right(&self) -> Point {
        self.upper_right
    }

    pub fn xmin(&self) -> f64 {
        self.lower_left.x()
    }

    pub fn ymin(&self) -> f64 {
        self.lower_left.y()
    }

    pub fn xmax(&self) -> f64 {
        self.upper_right.x()
    }

    pub fn ymax(&self) -> f64 {
        self.upper_right.y()
    }

    pub fn min(&self, axis: Axis) -> f64 {
        self.lower_left.coord(axis)
    }

    pub fn max(&self, axis: Axis) -> f64 {
        self.upper_right.coord(axis)
    }

    /// 0 if `p` is inside. Otherwise the distance to the closest edge on the axis `p` falls
    /// outside of, x taking precedence.
    pub fn distance(&self, p: &Point) -> f64 {
        let [x, y] = p.0;
        if self.xmin() <= x && x <= self.xmax() {
            if self.ymin() <= y && y <= self.ymax() {
                return 0.0;
            }
            return (y - self.ymin()).abs().min((y - self.ymax()).abs());
        }
        (x - self.xmin()).abs().min((x - self.xmax()).abs())
    }

    /// Boundaries are widened by [EPSILON] on both axes.
    pub fn contains(&self, p: &Point) -> bool {
        self.xmin() - EPSILON <= p.x()
            && p.x() <= self.xmax() + EPSILON
            && self.ymin() - EPSILON <= p.y()
            && p.y() <= self.ymax() + EPSILON
    }

    /// Touching edges count as an intersection.
    pub fn intersects(&self, other: &Self) -> bool {
        // separating axis test
        (other.xmax() - self.xmin()) * (other.xmin() - self.xmax()) <= 0.0
            && (other.ymax() - self.ymin()) * (other.ymin() - self.ymax()) <= 0.0
    }
}

/// Common interface of the point containers.
pub trait PointSet {
    /// Insert `point`. No-op if an equal point is already in the set.
    fn put(&mut self, point: Point);

    fn contains(&self, point: &Point) -> bool;

    fn size(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Visit every point once.
    fn iter(&self) -> Iter<'_>;

    /// Points inside `rect`.
    fn range(&self, rect: &Rect) -> Iter<'_>;

    /// The closest point to `point`, `None` if the set is empty.
    fn nearest(&self, point: &Point) -> Option<Point>;

    /// The `k` closest points to `point` in no particular order.
    /// Returns the whole set if `k >= self.size()`.
    fn nearest_k(&self, point: &Point, k: usize) -> Iter<'_>;
}
