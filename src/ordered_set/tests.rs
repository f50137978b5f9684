use super::*;
use rand::prelude::*;
use rand::rngs::SmallRng;

fn sample() -> OrderedSet {
    [(1.0, 1.0), (2.0, 3.0), (4.0, 4.0), (5.0, 1.0)]
        .iter()
        .map(|&p| Point::from(p))
        .collect()
}

fn sorted(it: Iter<'_>) -> Vec<Point> {
    let mut res = it.collect::<Vec<_>>();
    // Key implements the x-then-y order
    res.sort_by_key(|p| Key(*p));
    res
}

#[test]
fn insertions() {
    let mut set = OrderedSet::new();
    assert!(set.is_empty());

    set.put(Point::new(16.0, 32.0));

    assert!(!set.is_empty());
    assert_eq!(set.size(), 1);
    assert!(set.contains(&Point::new(16.0, 32.0)));
    assert!(!set.contains(&Point::new(32.0, 16.0)));
}

#[test]
fn duplicates_are_ignored() {
    let mut set = sample();
    set.put(Point::new(2.0, 3.0));
    set.put(Point::new(0.1 + 0.2, 1.0));
    set.put(Point::new(0.3, 1.0));

    assert_eq!(set.size(), 5);
}

#[test]
fn iterates_in_x_then_y_order() {
    let set: OrderedSet = [(3.0, 1.0), (1.0, 5.0), (1.0, 2.0), (-2.0, 9.0)]
        .iter()
        .map(|&p| Point::from(p))
        .collect();

    let res = set.iter().collect::<Vec<_>>();

    assert_eq!(
        res,
        vec![
            Point::new(-2.0, 9.0),
            Point::new(1.0, 2.0),
            Point::new(1.0, 5.0),
            Point::new(3.0, 1.0),
        ]
    );
}

#[test]
fn test_range_query_partial() {
    let set = sample();

    let res = sorted(set.range(&Rect::new(Point::new(0.0, 0.0), Point::new(3.0, 3.0))));

    assert_eq!(res, vec![Point::new(1.0, 1.0), Point::new(2.0, 3.0)]);
}

#[test]
fn test_range_query_all() {
    let mut rng = SmallRng::seed_from_u64(0xdeadbeef);

    let mut set = OrderedSet::new();
    for _ in 0..256 {
        set.put(Point::new(rng.gen_range(0.0, 128.0), rng.gen_range(0.0, 128.0)));
    }

    let rect = Rect::new(Point::new(0.0, 0.0), Point::new(128.0, 128.0));

    assert_eq!(set.range(&rect).count(), set.size());
}

#[test]
fn range_query_empty_set() {
    let set = OrderedSet::new();
    let rect = Rect::new(Point::new(0.0, 0.0), Point::new(1.0, 1.0));
    assert_eq!(set.range(&rect).count(), 0);
}

#[test]
fn nearest() {
    let set = sample();

    let res = set.nearest(&Point::new(0.0, 0.0)).expect("to find a point");

    assert_eq!(res, Point::new(1.0, 1.0));
    assert_eq!(res.distance(&Point::new(0.0, 0.0)), 2.0f64.sqrt());
}

#[test]
fn nearest_prefers_the_first_on_ties() {
    let set: OrderedSet = [(-1.0, 0.0), (1.0, 0.0)]
        .iter()
        .map(|&p| Point::from(p))
        .collect();

    assert_eq!(set.nearest(&Point::new(0.0, 0.0)), Some(Point::new(-1.0, 0.0)));
}

#[test]
fn nearest_on_empty_set_is_none() {
    let set = OrderedSet::new();
    assert_eq!(set.nearest(&Point::new(0.0, 0.0)), None);
    assert_eq!(set.nearest_k(&Point::new(0.0, 0.0), 3).count(), 0);
}

#[test]
fn nearest_k() {
    let set = sample();
    let q = Point::new(0.0, 0.0);

    assert_eq!(
        sorted(set.nearest_k(&q, 2)),
        vec![Point::new(1.0, 1.0), Point::new(2.0, 3.0)]
    );
    assert_eq!(set.nearest_k(&q, 0).count(), 0);
    assert_eq!(set.nearest_k(&q, 4).count(), 4);
    assert_eq!(set.nearest_k(&q, 100).count(), 4);
}

#[test]
fn clone_is_independent() {
    let set = sample();
    let mut copy = set.clone();
    copy.put(Point::new(100.0, 100.0));

    assert_eq!(set.size(), 4);
    assert_eq!(copy.size(), 5);
    assert!(!set.contains(&Point::new(100.0, 100.0)));
}

#[test]
fn clear() {
    let mut set = sample();
    set.clear();

    assert!(set.is_empty());
    assert_eq!(set.iter().count(), 0);
    assert_eq!(set.nearest(&Point::new(0.0, 0.0)), None);
    assert!(!set.contains(&Point::new(1.0, 1.0)));

    set.put(Point::new(1.0, 1.0));
    assert_eq!(set.size(), 1);
    assert!(set.contains(&Point::new(1.0, 1.0)));
}
