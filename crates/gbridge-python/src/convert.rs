//! Conversion between bridge [`Value`]s and Python objects.
//!
//! - `py_to_value`: Python arguments and property values going to the toolkit
//! - `value_to_py`: toolkit results coming back to Python

use gbridge::{Bridge, Ownership, TreeIter, TypeTag, Value};
use pyo3::{
    IntoPyObjectExt,
    exceptions::PyTypeError,
    prelude::*,
    types::{PyBool, PyFloat, PyInt, PyList, PyString, PyTuple},
};

use crate::object::PyGObject;

/// Converts a Python object to a toolkit value.
///
/// Lists must be homogeneous: all strings, all ints or all objects. A
/// `(stamp, node)` tuple is a tree iterator as returned by tree store calls.
///
/// # Important
/// Checks `bool` before `int` since `bool` is a subclass of `int` in Python.
pub fn py_to_value(obj: &Bound<'_, PyAny>) -> PyResult<Value> {
    if obj.is_none() {
        Ok(Value::Null)
    } else if let Ok(b) = obj.cast::<PyBool>() {
        Ok(Value::Bool(b.is_true()))
    } else if let Ok(int) = obj.cast::<PyInt>() {
        match int.extract::<i32>() {
            Ok(i) => Ok(Value::Int(i)),
            Err(_) => Ok(Value::Int64(int.extract()?)),
        }
    } else if let Ok(float) = obj.cast::<PyFloat>() {
        Ok(Value::Double(float.value()))
    } else if let Ok(string) = obj.cast::<PyString>() {
        Ok(Value::Str(string.to_str()?.to_owned()))
    } else if let Ok(wrapper) = obj.cast::<PyGObject>() {
        Ok(Value::from_object(wrapper.get().raw()))
    } else if let Ok(tuple) = obj.cast::<PyTuple>() {
        let (stamp, node): (u32, usize) = tuple.extract()?;
        Ok(Value::TreeIter(TreeIter::new(stamp, node)))
    } else if let Ok(list) = obj.cast::<PyList>() {
        list_to_value(list)
    } else {
        Err(PyTypeError::new_err(format!(
            "cannot pass a {} to the toolkit",
            obj.get_type().name()?
        )))
    }
}

fn list_to_value(list: &Bound<'_, PyList>) -> PyResult<Value> {
    let items = list.iter().map(|item| py_to_value(&item)).collect::<PyResult<Vec<_>>>()?;
    let Some(first) = items.first() else {
        return Ok(Value::Strv(Vec::new()));
    };
    let mismatch = || PyTypeError::new_err(format!("list items must all be {}", first.kind_name()));
    match first {
        Value::Str(_) => items
            .iter()
            .map(|v| v.as_str().map(str::to_owned).ok_or_else(mismatch))
            .collect::<PyResult<_>>()
            .map(Value::Strv),
        Value::Int(_) => items
            .iter()
            .map(|v| match v {
                Value::Int(i) => Ok(*i),
                _ => Err(mismatch()),
            })
            .collect::<PyResult<_>>()
            .map(Value::IntList),
        Value::Object(_) => items
            .iter()
            .map(|v| v.as_object().ok_or_else(mismatch))
            .collect::<PyResult<_>>()
            .map(Value::ObjectList),
        other => Err(PyTypeError::new_err(format!(
            "lists of {} cannot be passed to the toolkit",
            other.kind_name()
        ))),
    }
}

/// Converts a toolkit result to Python.
///
/// Returned objects are wrapped with a new reference of their own; the toolkit's
/// reference, if any, stays where it was.
pub fn value_to_py<'py>(py: Python<'py>, bridge: &Bridge, value: Value) -> PyResult<Bound<'py, PyAny>> {
    match value {
        Value::Null => Ok(py.None().into_bound(py)),
        Value::Bool(b) => b.into_bound_py_any(py),
        Value::Int(i) => i.into_bound_py_any(py),
        Value::UInt(u) => u.into_bound_py_any(py),
        Value::Int64(i) => i.into_bound_py_any(py),
        Value::Double(f) => f.into_bound_py_any(py),
        Value::Str(s) => s.into_bound_py_any(py),
        Value::Strv(v) => v.into_bound_py_any(py),
        Value::IntList(v) => v.into_bound_py_any(py),
        Value::Object(raw) => PyGObject::wrap(bridge, Some(raw), Ownership::Borrowed).into_bound_py_any(py),
        Value::ObjectList(raws) => raws
            .into_iter()
            .map(|raw| PyGObject::wrap(bridge, Some(raw), Ownership::Borrowed))
            .collect::<Vec<_>>()
            .into_bound_py_any(py),
        Value::Type(tag) => type_name(bridge, tag).into_bound_py_any(py),
        Value::TypeList(tags) => tags
            .into_iter()
            .map(|tag| type_name(bridge, tag))
            .collect::<Vec<_>>()
            .into_bound_py_any(py),
        Value::TreeIter(iter) => (iter.stamp(), iter.node()).into_bound_py_any(py),
    }
}

fn type_name(bridge: &Bridge, tag: TypeTag) -> Option<String> {
    bridge.runtime().type_name(tag)
}
