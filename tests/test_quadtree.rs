use rice_catapult::config::QuadTreeConfig;
use rice_catapult::error::SimError;
use rice_catapult::geometry::Rect;
use rice_catapult::quadtree::{QuadTree, Quadrant};

fn cfg() -> QuadTreeConfig {
    QuadTreeConfig {
        max_objects: 10,
        max_levels: 5,
        exhaustive_queries: false,
    }
}

fn root() -> QuadTree<Rect> {
    QuadTree::new(Rect::new(0.0, 0.0, 100.0, 100.0), &cfg())
}

/// Eleven 1×1 boxes along the diagonal, none touching a midline.
fn diagonal() -> Vec<Rect> {
    (0..11)
        .map(|i| {
            let p = 5.0 + 8.0 * i as f32;
            Rect::new(p, p, 1.0, 1.0)
        })
        .collect()
}

// ── Quadrant membership ───────────────────────────────────────────────────────

#[test]
fn quadrant_of_each_corner() {
    let b = Rect::new(0.0, 0.0, 100.0, 100.0);
    assert_eq!(Quadrant::of(&b, &Rect::new(60.0, 10.0, 5.0, 5.0)), Some(Quadrant::NorthEast));
    assert_eq!(Quadrant::of(&b, &Rect::new(10.0, 10.0, 5.0, 5.0)), Some(Quadrant::NorthWest));
    assert_eq!(Quadrant::of(&b, &Rect::new(10.0, 60.0, 5.0, 5.0)), Some(Quadrant::SouthWest));
    assert_eq!(Quadrant::of(&b, &Rect::new(60.0, 60.0, 5.0, 5.0)), Some(Quadrant::SouthEast));
}

#[test]
fn quadrant_of_straddler_is_none() {
    let b = Rect::new(0.0, 0.0, 100.0, 100.0);
    // Crosses the vertical midline
    assert_eq!(Quadrant::of(&b, &Rect::new(48.0, 10.0, 5.0, 5.0)), None);
    // Crosses the horizontal midline
    assert_eq!(Quadrant::of(&b, &Rect::new(10.0, 48.0, 5.0, 5.0)), None);
}

#[test]
fn quadrant_test_is_strict_on_the_midline() {
    let b = Rect::new(0.0, 0.0, 100.0, 100.0);
    // Left edge exactly on the midline is neither left nor right
    assert_eq!(Quadrant::of(&b, &Rect::new(50.0, 10.0, 5.0, 5.0)), None);
    // Right edge exactly on the midline is not strictly left
    assert_eq!(Quadrant::of(&b, &Rect::new(45.0, 10.0, 5.0, 5.0)), None);
}

// ── Insert & subdivision ──────────────────────────────────────────────────────

#[test]
fn eleventh_insert_splits_root_into_four() {
    let mut tree = root();
    tree.insert_all(diagonal()).unwrap();

    let nodes = tree.nodes().expect("root should have split");
    assert_eq!(nodes.len(), 4);
    assert!(tree.objects().is_empty()); // nothing straddles
    assert_eq!(tree.len(), 11);
    for node in nodes {
        assert!(node.is_leaf());
        assert_eq!(node.level(), 1);
    }
    // 0..=5 sit top-left, 6..=10 bottom-right
    assert_eq!(nodes[Quadrant::NorthWest as usize].objects().len(), 6);
    assert_eq!(nodes[Quadrant::SouthEast as usize].objects().len(), 5);
}

#[test]
fn ten_objects_do_not_split() {
    let mut tree = root();
    tree.insert_all(diagonal().into_iter().take(10)).unwrap();
    assert!(tree.is_leaf());
    assert_eq!(tree.objects().len(), 10);
}

#[test]
fn straddler_stays_at_parent_after_split() {
    let mut tree = root();
    tree.insert_all(diagonal()).unwrap();
    let straddler = Rect::new(45.0, 45.0, 10.0, 10.0);
    tree.insert(straddler).unwrap();
    assert_eq!(tree.objects(), &[straddler]);
    assert_eq!(tree.len(), 12);
}

#[test]
fn depth_limit_makes_permanent_leaf() {
    let limited = QuadTreeConfig {
        max_levels: 0,
        ..cfg()
    };
    let mut tree = QuadTree::new(Rect::new(0.0, 0.0, 100.0, 100.0), &limited);
    for i in 0..20 {
        tree.insert(Rect::new(2.0 + i as f32, 2.0, 1.0, 1.0)).unwrap();
    }
    assert!(tree.is_leaf());
    assert_eq!(tree.objects().len(), 20);
}

#[test]
fn split_truncates_odd_extents() {
    let mut tree = QuadTree::new(Rect::new(0.0, 0.0, 101.0, 99.0), &cfg());
    tree.insert_all(diagonal()).unwrap();
    let nodes = tree.nodes().unwrap();
    assert_eq!(*nodes[0].bounds(), Rect::new(50.0, 0.0, 50.0, 49.0));
    assert_eq!(*nodes[1].bounds(), Rect::new(0.0, 0.0, 50.0, 49.0));
    assert_eq!(*nodes[2].bounds(), Rect::new(0.0, 49.0, 50.0, 49.0));
    assert_eq!(*nodes[3].bounds(), Rect::new(50.0, 49.0, 50.0, 49.0));
}

#[test]
fn malformed_geometry_is_rejected_without_touching_tree() {
    let mut tree = root();
    let err = tree
        .insert(Rect::new(f32::NAN, 0.0, 1.0, 1.0))
        .unwrap_err();
    assert!(matches!(err, SimError::MalformedEntity { .. }));

    let err = tree.insert(Rect::new(1.0, 1.0, -4.0, 1.0)).unwrap_err();
    assert!(matches!(err, SimError::MalformedEntity { .. }));

    assert!(tree.is_empty());
}

#[test]
fn insert_all_stops_at_first_malformed() {
    let mut tree = root();
    let batch = vec![
        Rect::new(1.0, 1.0, 1.0, 1.0),
        Rect::new(2.0, 2.0, f32::INFINITY, 1.0),
        Rect::new(3.0, 3.0, 1.0, 1.0),
    ];
    assert!(tree.insert_all(batch).is_err());
    assert_eq!(tree.len(), 1);
}

// ── Queries ───────────────────────────────────────────────────────────────────

#[test]
fn collect_all_returns_every_object() {
    let mut tree = root();
    tree.insert_all(diagonal()).unwrap();
    tree.insert(Rect::new(45.0, 45.0, 10.0, 10.0)).unwrap();
    let mut all = Vec::new();
    tree.collect_all(&mut all);
    assert_eq!(all.len(), 12);
}

#[test]
fn find_objects_descends_only_into_own_quadrant() {
    let mut tree = root();
    tree.insert_all(diagonal()).unwrap();
    let found = tree.candidates(&Rect::new(10.0, 10.0, 1.0, 1.0));
    // The six north-west objects, nothing from the south-east
    assert_eq!(found.len(), 6);
    assert!(found.iter().all(|r| r.x < 50.0));
}

#[test]
fn find_objects_includes_ancestor_straddlers() {
    let mut tree = root();
    tree.insert_all(diagonal()).unwrap();
    let straddler = Rect::new(45.0, 45.0, 10.0, 10.0);
    tree.insert(straddler).unwrap();
    let found = tree.candidates(&Rect::new(80.0, 80.0, 1.0, 1.0));
    assert!(found.contains(&straddler));
    assert_eq!(found.len(), 6); // five south-east + the straddler
}

#[test]
fn straddling_query_misses_sibling_quadrant_objects() {
    // Known approximation: a query that straddles a midline only sees what is
    // stored at its own node, even if a child holds an overlapping object.
    let mut tree = root();
    for i in 0..11 {
        tree.insert(Rect::new(60.0 + 3.0 * i as f32, 5.0, 1.0, 1.0)).unwrap();
    }
    let query = Rect::new(45.0, 4.0, 20.0, 4.0);
    assert!(tree.candidates(&query).is_empty());

    let mut region = Vec::new();
    tree.query_region(&query, &mut region);
    assert!(region.iter().any(|r| r.intersects(&query)));
}

#[test]
fn query_on_empty_tree_returns_nothing() {
    let tree = root();
    assert!(tree.candidates(&Rect::new(1.0, 1.0, 1.0, 1.0)).is_empty());
}

#[test]
fn malformed_query_returns_nothing() {
    let mut tree = root();
    tree.insert(Rect::new(1.0, 1.0, 1.0, 1.0)).unwrap();
    assert!(tree.candidates(&Rect::new(f32::NAN, 1.0, 1.0, 1.0)).is_empty());
}

// ── Clear ─────────────────────────────────────────────────────────────────────

#[test]
fn clear_returns_to_single_empty_leaf() {
    let mut tree = root();
    tree.insert_all(diagonal()).unwrap();
    tree.clear();
    assert!(tree.is_leaf());
    assert!(tree.is_empty());
    assert_eq!(*tree.bounds(), Rect::new(0.0, 0.0, 100.0, 100.0));
}

#[test]
fn clear_twice_equals_clear_once() {
    let mut once = root();
    once.insert_all(diagonal()).unwrap();
    once.clear();

    let mut twice = once.clone();
    twice.clear();

    assert_eq!(once, twice);
    assert_eq!(once, root());
}
