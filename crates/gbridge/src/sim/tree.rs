//! The tree store: typed columns, nested rows and stamped iterators.

use super::{Args, Payload, SimState, WRONG_INSTANCE, sim_error};
use crate::{
    error::NativeError,
    handle::{RawHandle, TypeTag},
    value::{TreeIter, Value},
};

/// Error domain for tree model misuse.
pub const TREE_DOMAIN: &str = "gtk-tree-store";

const INVALID_ITER: i32 = 0;
const INVALID_COLUMN: i32 = 1;
const TYPE_MISMATCH: i32 = 2;
const INVALID_ORDER: i32 = 3;
const COLUMNS_LOCKED: i32 = 4;

const ROOT: usize = 0;

fn tree_error(code: i32, message: impl Into<String>) -> NativeError {
    NativeError::new(TREE_DOMAIN, code, message)
}

#[derive(Debug, Default)]
struct Node {
    parent: usize,
    children: Vec<usize>,
    values: Vec<Option<Value>>,
}

/// Rows of one store. Node 0 is the invisible root; removed nodes leave a
/// hole so iterators to them are detected as stale.
#[derive(Debug)]
pub(super) struct TreeModel {
    columns: Vec<TypeTag>,
    stamp: u32,
    nodes: Vec<Option<Node>>,
}

impl TreeModel {
    pub(super) fn new(stamp: u32) -> Self {
        Self {
            columns: Vec::new(),
            stamp,
            nodes: vec![Some(Node::default())],
        }
    }

    /// Drops every row and starts a new iterator generation. Returns the
    /// objects the cells were holding.
    pub(super) fn clear(&mut self, stamp: u32) -> Vec<RawHandle> {
        let held = self.held_objects(ROOT);
        self.nodes = vec![Some(Node::default())];
        self.stamp = stamp;
        held
    }

    fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.nodes.get_mut(index).and_then(Option::as_mut)
    }

    fn children(&self, index: usize) -> &[usize] {
        self.node(index).map_or(&[], |n| n.children.as_slice())
    }

    fn iter_for(&self, index: usize) -> TreeIter {
        TreeIter::new(self.stamp, index)
    }

    fn is_valid(&self, iter: TreeIter) -> bool {
        iter.stamp() == self.stamp && iter.node() != ROOT && self.node(iter.node()).is_some()
    }

    fn resolve(&self, iter: TreeIter) -> Result<usize, NativeError> {
        if self.is_valid(iter) {
            Ok(iter.node())
        } else {
            Err(tree_error(
                INVALID_ITER,
                format!("iterator {}:{} is not valid for this model", iter.stamp(), iter.node()),
            ))
        }
    }

    /// `None` addresses the top level.
    fn resolve_parent(&self, iter: Option<TreeIter>) -> Result<usize, NativeError> {
        iter.map_or(Ok(ROOT), |iter| self.resolve(iter))
    }

    fn parent_of(&self, index: usize) -> usize {
        self.node(index).map_or(ROOT, |n| n.parent)
    }

    fn position(&self, index: usize) -> usize {
        let parent = self.parent_of(index);
        self.children(parent).iter().position(|&c| c == index).unwrap_or(0)
    }

    fn column(&self, column: i32) -> Result<(usize, TypeTag), NativeError> {
        usize::try_from(column)
            .ok()
            .and_then(|c| self.columns.get(c).map(|tag| (c, *tag)))
            .ok_or_else(|| {
                tree_error(
                    INVALID_COLUMN,
                    format!("column {column} is out of range for a model with {} columns", self.columns.len()),
                )
            })
    }

    fn insert_node(&mut self, parent: usize, position: usize) -> TreeIter {
        let index = self.nodes.len();
        self.nodes.push(Some(Node {
            parent,
            children: Vec::new(),
            values: vec![None; self.columns.len()],
        }));
        if let Some(parent) = self.node_mut(parent) {
            let position = position.min(parent.children.len());
            parent.children.insert(position, index);
        }
        self.iter_for(index)
    }

    fn held_objects(&self, index: usize) -> Vec<RawHandle> {
        let mut held = Vec::new();
        let mut stack = vec![index];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.node(current) {
                held.extend(node.values.iter().flatten().filter_map(Value::as_object));
                stack.extend(&node.children);
            }
        }
        held
    }

    /// Unlinks a row and its descendants; returns the objects they held.
    fn remove_node(&mut self, index: usize) -> Vec<RawHandle> {
        let held = self.held_objects(index);
        let parent = self.parent_of(index);
        if let Some(parent) = self.node_mut(parent) {
            parent.children.retain(|&c| c != index);
        }
        let mut stack = vec![index];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(current).and_then(Option::take) {
                stack.extend(node.children);
            }
        }
        held
    }

    fn same_parent(&self, a: usize, b: usize) -> Result<usize, NativeError> {
        let parent = self.parent_of(a);
        if parent == self.parent_of(b) {
            Ok(parent)
        } else {
            Err(tree_error(INVALID_ITER, "rows do not share a parent"))
        }
    }

    fn move_to(&mut self, index: usize, position: usize) {
        let parent = self.parent_of(index);
        if let Some(parent) = self.node_mut(parent) {
            parent.children.retain(|&c| c != index);
            let position = position.min(parent.children.len());
            parent.children.insert(position, index);
        }
    }
}

fn model(state: &SimState, handle: RawHandle) -> Result<&TreeModel, NativeError> {
    match &state.obj(handle).payload {
        Payload::TreeStore(model) => Ok(model),
        _ => Err(sim_error(WRONG_INSTANCE, format!("{handle} carries no tree model"))),
    }
}

fn model_mut(state: &mut SimState, handle: RawHandle) -> Result<&mut TreeModel, NativeError> {
    match &mut state.obj_mut(handle).payload {
        Payload::TreeStore(model) => Ok(model),
        _ => Err(sim_error(WRONG_INSTANCE, format!("{handle} carries no tree model"))),
    }
}

fn required_iter(args: &Args<'_>, index: usize) -> Result<TreeIter, NativeError> {
    args.iter(index)?.ok_or_else(|| args.error(index, "must not be null"))
}

fn is_column_type(state: &SimState, tag: TypeTag) -> bool {
    let k = &state.known;
    [k.boolean, k.int, k.uint, k.int64, k.double, k.string].contains(&tag) || state.types.is_a(tag, k.object)
}

fn check_cell(state: &SimState, column: TypeTag, value: &Value) -> Result<(), NativeError> {
    let k = &state.known;
    let ok = match value {
        Value::Null => column == k.string || state.types.is_a(column, k.object),
        Value::Bool(_) => column == k.boolean,
        Value::Int(_) => column == k.int,
        Value::UInt(_) => column == k.uint,
        Value::Int64(_) => column == k.int64,
        Value::Double(_) => column == k.double,
        Value::Str(_) => column == k.string,
        Value::Object(raw) => state.try_obj(*raw).is_some_and(|obj| state.types.is_a(obj.tag, column)),
        _ => false,
    };
    if ok {
        return Ok(());
    }
    Err(tree_error(
        TYPE_MISMATCH,
        format!(
            "value of kind {} cannot be stored in a column of type {}",
            value.kind_name(),
            state.types.name(column)
        ),
    ))
}

fn count(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}

fn release(state: &mut SimState, held: Vec<RawHandle>) {
    for object in held {
        state.dec(object);
    }
}

pub(super) fn call(state: &mut SimState, handle: RawHandle, args: &Args<'_>) -> Result<Option<Value>, NativeError> {
    let result = match args.symbol {
        "gtk_tree_store_set_column_types" => {
            let types = args.types(0)?;
            if let Some(bad) = types.iter().find(|&&t| !is_column_type(state, t)) {
                return Err(tree_error(
                    TYPE_MISMATCH,
                    format!("{} is not a valid column type", state.types.name(*bad)),
                ));
            }
            let model = model_mut(state, handle)?;
            if !model.children(ROOT).is_empty() {
                return Err(tree_error(COLUMNS_LOCKED, "column types can only be set on an empty store"));
            }
            model.columns = types.to_vec();
            None
        }
        "gtk_tree_model_get_n_columns" => Some(Value::Int(count(model(state, handle)?.columns.len()))),
        "gtk_tree_store_set_value" => {
            let iter = required_iter(args, 0)?;
            let value = args.value(2)?.clone();
            let (node, column, column_type) = {
                let model = model(state, handle)?;
                let (column, column_type) = model.column(args.int(1)?)?;
                (model.resolve(iter)?, column, column_type)
            };
            check_cell(state, column_type, &value)?;
            if let Value::Object(object) = value {
                state.inc(object);
            }
            let cell = (!value.is_null()).then_some(value);
            let old = model_mut(state, handle)?
                .node_mut(node)
                .and_then(|n| n.values.get_mut(column))
                .and_then(|slot| std::mem::replace(slot, cell));
            if let Some(Value::Object(old)) = old {
                state.dec(old);
            }
            None
        }
        "gtk_tree_model_get_value" => {
            let iter = required_iter(args, 0)?;
            let model = model(state, handle)?;
            let (column, _) = model.column(args.int(1)?)?;
            let node = model.resolve(iter)?;
            model.node(node).and_then(|n| n.values.get(column)).cloned().flatten()
        }
        "gtk_tree_store_remove" => {
            let iter = required_iter(args, 0)?;
            let model = model_mut(state, handle)?;
            let node = model.resolve(iter)?;
            let parent = model.parent_of(node);
            let position = model.position(node);
            let held = model.remove_node(node);
            let has_next = position < model.children(parent).len();
            release(state, held);
            Some(Value::Bool(has_next))
        }
        "gtk_tree_store_insert" => {
            let parent_iter = args.iter(0)?;
            let position = args.int(1)?;
            let model = model_mut(state, handle)?;
            let parent = model.resolve_parent(parent_iter)?;
            let position = usize::try_from(position).unwrap_or(usize::MAX);
            Some(Value::TreeIter(model.insert_node(parent, position)))
        }
        "gtk_tree_store_insert_before" | "gtk_tree_store_insert_after" => {
            let before = args.symbol == "gtk_tree_store_insert_before";
            let parent_iter = args.iter(0)?;
            let sibling_iter = args.iter(1)?;
            let model = model_mut(state, handle)?;
            let parent = model.resolve_parent(parent_iter)?;
            let iter = match sibling_iter {
                Some(sibling) => {
                    let sibling = model.resolve(sibling)?;
                    let sibling_parent = model.parent_of(sibling);
                    if parent_iter.is_some() && sibling_parent != parent {
                        return Err(tree_error(INVALID_ITER, "sibling is not a child of parent"));
                    }
                    let position = model.position(sibling) + usize::from(!before);
                    model.insert_node(sibling_parent, position)
                }
                None if before => model.insert_node(parent, usize::MAX),
                None => model.insert_node(parent, 0),
            };
            Some(Value::TreeIter(iter))
        }
        "gtk_tree_store_prepend" | "gtk_tree_store_append" => {
            let position = if args.symbol == "gtk_tree_store_prepend" { 0 } else { usize::MAX };
            let parent_iter = args.iter(0)?;
            let model = model_mut(state, handle)?;
            let parent = model.resolve_parent(parent_iter)?;
            Some(Value::TreeIter(model.insert_node(parent, position)))
        }
        "gtk_tree_store_is_ancestor" => {
            let (iter, descendant) = (required_iter(args, 0)?, required_iter(args, 1)?);
            let model = model(state, handle)?;
            let ancestor = model.resolve(iter)?;
            let mut current = model.parent_of(model.resolve(descendant)?);
            let mut found = false;
            while current != ROOT {
                if current == ancestor {
                    found = true;
                    break;
                }
                current = model.parent_of(current);
            }
            Some(Value::Bool(found))
        }
        "gtk_tree_store_iter_depth" => {
            let iter = required_iter(args, 0)?;
            let model = model(state, handle)?;
            let mut current = model.parent_of(model.resolve(iter)?);
            let mut depth = 0;
            while current != ROOT {
                depth += 1;
                current = model.parent_of(current);
            }
            Some(Value::Int(depth))
        }
        "gtk_tree_model_iter_n_children" => {
            let parent_iter = args.iter(0)?;
            let model = model(state, handle)?;
            let parent = model.resolve_parent(parent_iter)?;
            Some(Value::Int(count(model.children(parent).len())))
        }
        "gtk_tree_model_iter_nth_child" => {
            let parent_iter = args.iter(0)?;
            let n = args.int(1)?;
            let model = model(state, handle)?;
            let parent = model.resolve_parent(parent_iter)?;
            usize::try_from(n)
                .ok()
                .and_then(|n| model.children(parent).get(n))
                .map(|&child| Value::TreeIter(model.iter_for(child)))
        }
        "gtk_tree_store_clear" => {
            let stamp = state.next_stamp;
            state.next_stamp = state.next_stamp.wrapping_add(1);
            let held = model_mut(state, handle)?.clear(stamp);
            release(state, held);
            None
        }
        "gtk_tree_store_iter_is_valid" => {
            let iter = required_iter(args, 0)?;
            Some(Value::Bool(model(state, handle)?.is_valid(iter)))
        }
        "gtk_tree_store_reorder" => {
            let parent_iter = args.iter(0)?;
            let new_order = args.ints(1)?;
            let model = model_mut(state, handle)?;
            let parent = model.resolve_parent(parent_iter)?;
            let children = model.children(parent).to_vec();
            let mut seen = vec![false; children.len()];
            let mut reordered = Vec::with_capacity(children.len());
            for &old in new_order {
                let slot = usize::try_from(old).ok().filter(|&i| i < children.len() && !seen[i]);
                let Some(old) = slot else {
                    return Err(tree_error(
                        INVALID_ORDER,
                        format!("{new_order:?} is not a permutation of {} rows", children.len()),
                    ));
                };
                seen[old] = true;
                reordered.push(children[old]);
            }
            if reordered.len() != children.len() {
                return Err(tree_error(
                    INVALID_ORDER,
                    format!("{new_order:?} is not a permutation of {} rows", children.len()),
                ));
            }
            if let Some(parent) = model.node_mut(parent) {
                parent.children = reordered;
            }
            None
        }
        "gtk_tree_store_swap" => {
            let (a, b) = (required_iter(args, 0)?, required_iter(args, 1)?);
            let model = model_mut(state, handle)?;
            let (a, b) = (model.resolve(a)?, model.resolve(b)?);
            let parent = model.same_parent(a, b)?;
            let (pa, pb) = (model.position(a), model.position(b));
            if let Some(parent) = model.node_mut(parent) {
                parent.children.swap(pa, pb);
            }
            None
        }
        "gtk_tree_store_move_before" | "gtk_tree_store_move_after" => {
            let before = args.symbol == "gtk_tree_store_move_before";
            let iter = required_iter(args, 0)?;
            let position_iter = args.iter(1)?;
            let model = model_mut(state, handle)?;
            let node = model.resolve(iter)?;
            let target = match position_iter {
                Some(position) => {
                    let position = model.resolve(position)?;
                    model.same_parent(node, position)?;
                    if position == node {
                        return Ok(None);
                    }
                    let current = model.position(node);
                    let mut target = model.position(position);
                    // indices shift once the row is taken out of the level
                    if current < target {
                        target -= 1;
                    }
                    target + usize::from(!before)
                }
                None if before => usize::MAX,
                None => 0,
            };
            model.move_to(node, target);
            None
        }
        symbol => return Err(NativeError::unsupported(symbol)),
    };
    Ok(result)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn order(model: &TreeModel) -> Vec<usize> {
        model.children(ROOT).to_vec()
    }

    #[test]
    fn insert_positions_clamp_to_the_level() {
        let mut model = TreeModel::new(1);
        let a = model.insert_node(ROOT, usize::MAX);
        let b = model.insert_node(ROOT, 0);
        let c = model.insert_node(ROOT, 1);
        assert_eq!(order(&model), [b.node(), c.node(), a.node()]);
    }

    #[test]
    fn removal_invalidates_descendants() {
        let mut model = TreeModel::new(1);
        let parent = model.insert_node(ROOT, 0);
        let child = model.insert_node(parent.node(), 0);
        assert!(model.is_valid(child));
        model.remove_node(parent.node());
        assert!(!model.is_valid(parent));
        assert!(!model.is_valid(child));
        assert!(order(&model).is_empty());
    }

    #[test]
    fn clear_changes_the_stamp() {
        let mut model = TreeModel::new(1);
        let row = model.insert_node(ROOT, 0);
        model.clear(2);
        assert!(!model.is_valid(row));
        let row = model.insert_node(ROOT, 0);
        assert_eq!(row.stamp(), 2);
    }
}
