use super::{CallExt, TreeIter};
use crate::{
    Ownership,
    bridge::Bridge,
    error::{BridgeError, BridgeResult},
    glib::Object,
    handle::TypeTag,
    object::ObjectExt,
    value::Value,
};

wrapper! {
    /// A tree-shaped model of typed columns.
    pub struct TreeStore: "GtkTreeStore", is_a [Object];
}

fn iter_arg(iter: Option<&TreeIter>) -> Value {
    Value::from_iter_opt(iter.copied())
}

impl TreeStore {
    /// `gtk_tree_store_newv`, with columns given by native type name
    /// (`"gchararray"`, `"gint"`, `"GObject"`, ...).
    ///
    /// The store is not initially-unowned; the wrapper adopts the full
    /// reference returned by the constructor.
    pub fn new(bridge: &Bridge, column_types: &[&str]) -> BridgeResult<Self> {
        let store: Self = bridge.construct_with(&[], Ownership::Full)?;
        store.set_column_types(column_types)?;
        Ok(store)
    }

    /// Sets the column types. Only valid before any row is inserted.
    pub fn set_column_types(&self, column_types: &[&str]) -> BridgeResult<()> {
        let bridge = self.bridge();
        let tags = column_types
            .iter()
            .map(|name| bridge.type_tag(name))
            .collect::<BridgeResult<Vec<TypeTag>>>()?;
        self.call_void("gtk_tree_store_set_column_types", &[Value::TypeList(tags)])
    }

    pub fn n_columns(&self) -> BridgeResult<i32> {
        self.call_as("gtk_tree_model_get_n_columns", &[])
    }

    /// Stores `value` in one cell. The value must match the column type.
    pub fn set_value(&self, iter: &TreeIter, column: i32, value: impl Into<Value>) -> BridgeResult<()> {
        self.call_void(
            "gtk_tree_store_set_value",
            &[Value::TreeIter(*iter), column.into(), value.into()],
        )
    }

    /// Stores several cells of one row; `columns` and `values` pair up by index.
    pub fn set(&self, iter: &TreeIter, columns: &[i32], values: Vec<Value>) -> BridgeResult<()> {
        if columns.len() != values.len() {
            return Err(BridgeError::InvalidArgument(format!(
                "columns and values lengths do not match ({} vs {})",
                columns.len(),
                values.len()
            )));
        }
        for (column, value) in columns.iter().zip(values) {
            self.set_value(iter, *column, value)?;
        }
        Ok(())
    }

    /// Reads one cell. `Ok(None)` for an unset cell.
    pub fn value(&self, iter: &TreeIter, column: i32) -> BridgeResult<Option<Value>> {
        self.call("gtk_tree_model_get_value", &[Value::TreeIter(*iter), column.into()])
    }

    /// Removes a row and its children. Returns whether a following sibling
    /// exists.
    pub fn remove(&self, iter: &TreeIter) -> BridgeResult<bool> {
        self.call_as("gtk_tree_store_remove", &[Value::TreeIter(*iter)])
    }

    /// Inserts an empty row at `position` under `parent`; a negative or
    /// past-the-end position appends.
    pub fn insert(&self, parent: Option<&TreeIter>, position: i32) -> BridgeResult<TreeIter> {
        self.call_as("gtk_tree_store_insert", &[iter_arg(parent), position.into()])
    }

    /// Inserts before `sibling`, or appends under `parent` when `sibling` is `None`.
    pub fn insert_before(&self, parent: Option<&TreeIter>, sibling: Option<&TreeIter>) -> BridgeResult<TreeIter> {
        self.call_as("gtk_tree_store_insert_before", &[iter_arg(parent), iter_arg(sibling)])
    }

    /// Inserts after `sibling`, or prepends under `parent` when `sibling` is `None`.
    pub fn insert_after(&self, parent: Option<&TreeIter>, sibling: Option<&TreeIter>) -> BridgeResult<TreeIter> {
        self.call_as("gtk_tree_store_insert_after", &[iter_arg(parent), iter_arg(sibling)])
    }

    pub fn prepend(&self, parent: Option<&TreeIter>) -> BridgeResult<TreeIter> {
        self.call_as("gtk_tree_store_prepend", &[iter_arg(parent)])
    }

    pub fn append(&self, parent: Option<&TreeIter>) -> BridgeResult<TreeIter> {
        self.call_as("gtk_tree_store_append", &[iter_arg(parent)])
    }

    /// Whether `iter` is a strict ancestor of `descendant`.
    pub fn is_ancestor(&self, iter: &TreeIter, descendant: &TreeIter) -> BridgeResult<bool> {
        self.call_as(
            "gtk_tree_store_is_ancestor",
            &[Value::TreeIter(*iter), Value::TreeIter(*descendant)],
        )
    }

    /// Depth of a row; top level rows have depth 0.
    pub fn iter_depth(&self, iter: &TreeIter) -> BridgeResult<i32> {
        self.call_as("gtk_tree_store_iter_depth", &[Value::TreeIter(*iter)])
    }

    /// Children of `parent`, or top level rows for `None`.
    pub fn n_children(&self, parent: Option<&TreeIter>) -> BridgeResult<i32> {
        self.call_as("gtk_tree_model_iter_n_children", &[iter_arg(parent)])
    }

    /// Child of `parent` at index `n`; `NullResult` when out of range.
    pub fn nth_child(&self, parent: Option<&TreeIter>, n: i32) -> BridgeResult<TreeIter> {
        match self.call("gtk_tree_model_iter_nth_child", &[iter_arg(parent), n.into()])? {
            Some(Value::TreeIter(iter)) => Ok(iter),
            _ => Err(BridgeError::null("tree row")),
        }
    }

    /// Removes every row and invalidates all outstanding iterators.
    pub fn clear(&self) -> BridgeResult<()> {
        self.call_void("gtk_tree_store_clear", &[])
    }

    pub fn iter_is_valid(&self, iter: &TreeIter) -> BridgeResult<bool> {
        self.call_as("gtk_tree_store_iter_is_valid", &[Value::TreeIter(*iter)])
    }

    /// Reorders the children of `parent`: `new_order[new_position] = old_position`.
    pub fn reorder(&self, parent: Option<&TreeIter>, new_order: &[i32]) -> BridgeResult<()> {
        self.call_void(
            "gtk_tree_store_reorder",
            &[iter_arg(parent), Value::IntList(new_order.to_vec())],
        )
    }

    /// Swaps two rows with the same parent.
    pub fn swap(&self, a: &TreeIter, b: &TreeIter) -> BridgeResult<()> {
        self.call_void("gtk_tree_store_swap", &[Value::TreeIter(*a), Value::TreeIter(*b)])
    }

    /// Moves `iter` before `position`, or to the end when `position` is `None`.
    pub fn move_before(&self, iter: &TreeIter, position: Option<&TreeIter>) -> BridgeResult<()> {
        self.call_void("gtk_tree_store_move_before", &[Value::TreeIter(*iter), iter_arg(position)])
    }

    /// Moves `iter` after `position`, or to the start when `position` is `None`.
    pub fn move_after(&self, iter: &TreeIter, position: Option<&TreeIter>) -> BridgeResult<()> {
        self.call_void("gtk_tree_store_move_after", &[Value::TreeIter(*iter), iter_arg(position)])
    }
}
