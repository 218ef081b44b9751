//! Tree store rows, cells and iterator validity.

use std::sync::Arc;

use gbridge::{
    Bridge, BridgeError, ObjectExt, TreeIter, Value,
    gtk::{Label, TreeStore},
    sim::{SimRuntime, TREE_DOMAIN},
};
use pretty_assertions::assert_eq;

fn setup() -> (Arc<SimRuntime>, Bridge) {
    let sim = Arc::new(SimRuntime::new());
    let bridge = Bridge::new(sim.clone());
    (sim, bridge)
}

fn store(bridge: &Bridge) -> TreeStore {
    TreeStore::new(bridge, &["gchararray", "gint"]).unwrap()
}

fn add(store: &TreeStore, parent: Option<&TreeIter>, name: &str) -> TreeIter {
    let iter = store.append(parent).unwrap();
    store.set_value(&iter, 0, name).unwrap();
    iter
}

/// Names in column 0 of the children of `parent`, in order.
fn names(store: &TreeStore, parent: Option<&TreeIter>) -> Vec<String> {
    (0..store.n_children(parent).unwrap())
        .map(|n| {
            let iter = store.nth_child(parent, n).unwrap();
            match store.value(&iter, 0).unwrap() {
                Some(Value::Str(name)) => name,
                other => panic!("unexpected cell {other:?}"),
            }
        })
        .collect()
}

fn native_domain(err: BridgeError) -> String {
    match err {
        BridgeError::Native(err) => err.domain,
        other => panic!("expected a native error, got {other:?}"),
    }
}

// ============================================================================
// Cells
// ============================================================================

/// Cells hold typed values; unset cells read back as `None`.
#[test]
fn cells_are_typed() {
    let (_sim, bridge) = setup();
    let store = store(&bridge);
    assert_eq!(store.n_columns().unwrap(), 2);
    assert_eq!(store.ref_count().unwrap(), 1);

    let row = store.append(None).unwrap();
    assert_eq!(store.value(&row, 0).unwrap(), None);

    store.set(&row, &[0, 1], vec!["alpha".into(), 7_i32.into()]).unwrap();
    assert_eq!(store.value(&row, 0).unwrap(), Some(Value::Str("alpha".to_owned())));
    assert_eq!(store.value(&row, 1).unwrap(), Some(Value::Int(7)));

    assert_eq!(native_domain(store.set_value(&row, 1, "seven").unwrap_err()), TREE_DOMAIN);
    assert_eq!(native_domain(store.set_value(&row, 5, 1_i32).unwrap_err()), TREE_DOMAIN);
}

/// Mismatched column and value lists are rejected before reaching the store.
#[test]
fn set_requires_matching_lengths() {
    let (_sim, bridge) = setup();
    let store = store(&bridge);
    let row = store.append(None).unwrap();
    let err = store.set(&row, &[0, 1], vec!["only one".into()]).unwrap_err();
    assert!(matches!(err, BridgeError::InvalidArgument(_)));
    assert_eq!(store.value(&row, 0).unwrap(), None);
}

/// Column types are fixed once the store has rows.
#[test]
fn column_types_lock_after_first_row() {
    let (_sim, bridge) = setup();
    let store = store(&bridge);
    store.set_column_types(&["gchararray"]).unwrap();
    assert_eq!(store.n_columns().unwrap(), 1);
    store.append(None).unwrap();
    assert_eq!(native_domain(store.set_column_types(&["gint"]).unwrap_err()), TREE_DOMAIN);
    assert_eq!(
        store.set_column_types(&["NoSuchType"]).unwrap_err(),
        BridgeError::UnknownType("NoSuchType".to_owned())
    );
}

/// Object cells hold a reference until overwritten, cleared or the store dies.
#[test]
fn object_cells_hold_references() {
    let (sim, bridge) = setup();
    let store = TreeStore::new(&bridge, &["GObject"]).unwrap();
    let label = Label::new(&bridge, Some("cell")).unwrap();
    let raw = label.raw().unwrap();

    let row = store.append(None).unwrap();
    store.set_value(&row, 0, raw).unwrap();
    assert_eq!(label.ref_count().unwrap(), 2);
    assert_eq!(store.value(&row, 0).unwrap(), Some(Value::Object(raw)));

    store.set_value(&row, 0, Value::Null).unwrap();
    assert_eq!(label.ref_count().unwrap(), 1);

    let row = store.append(None).unwrap();
    store.set_value(&row, 0, raw).unwrap();
    store.clear().unwrap();
    assert_eq!(label.ref_count().unwrap(), 1);

    let row = store.append(None).unwrap();
    store.set_value(&row, 0, raw).unwrap();
    drop(store);
    assert_eq!(label.ref_count().unwrap(), 1);
    drop(label);
    assert!(!sim.is_alive(raw));
}

// ============================================================================
// Structure
// ============================================================================

/// Insert positions clamp to the level; the sibling variants place relative rows.
#[test]
fn insertion_positions() {
    let (_sim, bridge) = setup();
    let store = store(&bridge);
    let b = add(&store, None, "b");
    let a = store.insert(None, 0).unwrap();
    store.set_value(&a, 0, "a").unwrap();
    let d = store.insert(None, 99).unwrap();
    store.set_value(&d, 0, "d").unwrap();
    let c = store.insert_after(None, Some(&b)).unwrap();
    store.set_value(&c, 0, "c").unwrap();
    let first = store.insert_after(None, None).unwrap();
    store.set_value(&first, 0, "first").unwrap();
    let last = store.insert_before(None, None).unwrap();
    store.set_value(&last, 0, "last").unwrap();
    let before_d = store.insert_before(None, Some(&d)).unwrap();
    store.set_value(&before_d, 0, "c2").unwrap();
    let zero = store.prepend(None).unwrap();
    store.set_value(&zero, 0, "0").unwrap();

    assert_eq!(names(&store, None), vec!["0", "first", "a", "b", "c", "c2", "d", "last"]);
    assert!(store.nth_child(None, 8).unwrap_err().is_null_result());
}

/// Nested rows report depth and ancestry.
#[test]
fn nested_rows() {
    let (_sim, bridge) = setup();
    let store = store(&bridge);
    let root = add(&store, None, "root");
    let child = add(&store, Some(&root), "child");
    let grandchild = add(&store, Some(&child), "grandchild");

    assert_eq!(store.iter_depth(&root).unwrap(), 0);
    assert_eq!(store.iter_depth(&grandchild).unwrap(), 2);
    assert!(store.is_ancestor(&root, &grandchild).unwrap());
    assert!(!store.is_ancestor(&grandchild, &root).unwrap());
    assert!(!store.is_ancestor(&root, &root).unwrap());
    assert_eq!(store.n_children(None).unwrap(), 1);
    assert_eq!(names(&store, Some(&root)), vec!["child"]);

    let other = add(&store, None, "other");
    assert_eq!(native_domain(store.insert_before(Some(&other), Some(&child)).unwrap_err()), TREE_DOMAIN);
}

/// Removing a row invalidates it and every descendant.
#[test]
fn removal_invalidates_descendants() {
    let (_sim, bridge) = setup();
    let store = store(&bridge);
    let first = add(&store, None, "first");
    let nested = add(&store, Some(&first), "nested");
    let second = add(&store, None, "second");

    assert!(store.remove(&first).unwrap());
    assert!(!store.iter_is_valid(&first).unwrap());
    assert!(!store.iter_is_valid(&nested).unwrap());
    assert!(store.iter_is_valid(&second).unwrap());
    assert_eq!(native_domain(store.value(&nested, 0).unwrap_err()), TREE_DOMAIN);

    assert!(!store.remove(&second).unwrap());
    assert_eq!(store.n_children(None).unwrap(), 0);
}

/// Clearing invalidates every outstanding iterator, even for reused positions.
#[test]
fn clear_invalidates_old_iterators() {
    let (_sim, bridge) = setup();
    let store = store(&bridge);
    let old = add(&store, None, "old");
    store.clear().unwrap();
    assert!(!store.iter_is_valid(&old).unwrap());

    let new = add(&store, None, "new");
    assert_ne!(new, old);
    assert!(store.iter_is_valid(&new).unwrap());
    assert_eq!(native_domain(store.set_value(&old, 0, "stale").unwrap_err()), TREE_DOMAIN);
}

// ============================================================================
// Reordering
// ============================================================================

/// Reorder takes `new_order[new_position] = old_position`.
#[test]
fn reorder_permutes_a_level() {
    let (_sim, bridge) = setup();
    let store = store(&bridge);
    for name in ["a", "b", "c"] {
        add(&store, None, name);
    }
    store.reorder(None, &[2, 0, 1]).unwrap();
    assert_eq!(names(&store, None), vec!["c", "a", "b"]);

    assert_eq!(native_domain(store.reorder(None, &[0, 0, 1]).unwrap_err()), TREE_DOMAIN);
    assert_eq!(native_domain(store.reorder(None, &[0, 1]).unwrap_err()), TREE_DOMAIN);
    assert_eq!(names(&store, None), vec!["c", "a", "b"]);
}

/// Swap and move keep iterators valid and only work within one level.
#[test]
fn swap_and_move_within_a_level() {
    let (_sim, bridge) = setup();
    let store = store(&bridge);
    let a = add(&store, None, "a");
    let b = add(&store, None, "b");
    let c = add(&store, None, "c");
    let nested = add(&store, Some(&a), "nested");

    store.swap(&a, &c).unwrap();
    assert_eq!(names(&store, None), vec!["c", "b", "a"]);
    assert!(store.iter_is_valid(&a).unwrap());

    store.move_before(&a, Some(&c)).unwrap();
    assert_eq!(names(&store, None), vec!["a", "c", "b"]);
    store.move_after(&a, Some(&b)).unwrap();
    assert_eq!(names(&store, None), vec!["c", "b", "a"]);
    store.move_after(&a, None).unwrap();
    assert_eq!(names(&store, None), vec!["a", "c", "b"]);
    store.move_before(&a, None).unwrap();
    assert_eq!(names(&store, None), vec!["c", "b", "a"]);

    assert_eq!(native_domain(store.swap(&b, &nested).unwrap_err()), TREE_DOMAIN);
    assert_eq!(native_domain(store.move_before(&nested, Some(&b)).unwrap_err()), TREE_DOMAIN);
}
