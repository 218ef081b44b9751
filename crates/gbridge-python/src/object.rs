use gbridge::{Bridge, BridgeError, ObjectExt, ObjectType, Ownership, RawHandle};
use pyo3::{
    prelude::*,
    types::{PyList, PyTuple},
};

use crate::{
    convert::{py_to_value, value_to_py},
    exceptions::{IntoPyResult, to_py_err},
};

/// A native toolkit object.
///
/// Holds one native reference for as long as the Python object lives. Dropping
/// the last Python reference on a thread other than the toolkit's queues the
/// release until `Toolkit.drain_releases()` runs.
#[pyclass(name = "Object", module = "gbridge", frozen)]
#[derive(Debug)]
pub struct PyGObject {
    obj: Box<dyn ObjectType>,
}

impl PyGObject {
    pub fn new(obj: Box<dyn ObjectType>) -> Self {
        Self { obj }
    }

    pub fn wrap(bridge: &Bridge, raw: Option<RawHandle>, ownership: Ownership) -> Self {
        Self::new(bridge.wrap(raw, ownership))
    }

    pub fn raw(&self) -> Option<RawHandle> {
        self.obj.raw()
    }

    fn bridge(&self) -> &Bridge {
        self.obj.bridge()
    }
}

#[pymethods]
impl PyGObject {
    /// Native address, or 0 for a null object.
    #[getter]
    fn handle(&self) -> usize {
        self.raw().map_or(0, RawHandle::addr)
    }

    /// Native type name, e.g. `GtkWindow`.
    #[getter]
    fn type_name(&self) -> PyResult<String> {
        self.obj.type_name().into_py_result()
    }

    /// Name of the Rust wrapper the registry picked for this object.
    #[getter]
    fn wrapper(&self) -> &'static str {
        self.obj.wrapper_name()
    }

    #[getter]
    fn ref_count(&self) -> PyResult<u32> {
        self.obj.ref_count().into_py_result()
    }

    #[getter]
    fn is_floating(&self) -> PyResult<bool> {
        self.obj.is_floating().into_py_result()
    }

    #[getter]
    fn is_destroyed(&self) -> bool {
        self.obj.is_destroyed()
    }

    /// Whether the native object derives from `type_name`.
    fn is_a(&self, type_name: &str) -> PyResult<bool> {
        match self.bridge().cast_handle(self.raw(), type_name) {
            Ok(_) => Ok(true),
            Err(BridgeError::TypeMismatch { .. }) => Ok(false),
            Err(err) => Err(to_py_err(err)),
        }
    }

    /// Another wrapper for the same object, checked against `type_name` and
    /// typed as `type_name`'s wrapper.
    fn cast(&self, type_name: &str) -> PyResult<Self> {
        self.bridge()
            .wrap_as_type(self.raw(), type_name, Ownership::Borrowed)
            .map(Self::new)
            .into_py_result()
    }

    /// Reads a property; `None` for a null object or string.
    fn get_property<'py>(&self, py: Python<'py>, name: &str) -> PyResult<Bound<'py, PyAny>> {
        let value = self.obj.property(name).into_py_result()?;
        match value {
            Some(value) => value_to_py(py, self.bridge(), value),
            None => Ok(py.None().into_bound(py)),
        }
    }

    fn set_property(&self, name: &str, value: &Bound<'_, PyAny>) -> PyResult<()> {
        self.obj.set_property(name, py_to_value(value)?).into_py_result()
    }

    /// Forwards a toolkit function with this object as the first argument.
    ///
    /// Objects in the result come back as new wrappers holding their own reference.
    #[pyo3(signature = (symbol, *args))]
    fn call<'py>(&self, py: Python<'py>, symbol: &str, args: &Bound<'py, PyTuple>) -> PyResult<Bound<'py, PyAny>> {
        let args = args.iter().map(|arg| py_to_value(&arg)).collect::<PyResult<Vec<_>>>()?;
        match self.obj.call(symbol, &args).into_py_result()? {
            Some(value) => value_to_py(py, self.bridge(), value),
            None => Ok(py.None().into_bound(py)),
        }
    }

    /// Container children, most specific wrapper each.
    fn children<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyList>> {
        match self.call(py, "gtk_container_get_children", &PyTuple::empty(py))?.cast_into::<PyList>() {
            Ok(list) => Ok(list),
            Err(_) => Ok(PyList::empty(py)),
        }
    }

    /// Destroys the native object. The wrapper stays usable only for dropping.
    fn destroy(&self) -> PyResult<()> {
        self.obj.destroy().into_py_result()
    }

    fn __eq__(&self, other: &Self) -> bool {
        self.raw() == other.raw()
    }

    fn __hash__(&self) -> usize {
        self.handle()
    }

    fn __repr__(&self) -> String {
        match self.obj.type_name() {
            Ok(type_name) => format!("<{type_name} at {:#x}>", self.handle()),
            Err(err) => format!("<{} ({err})>", self.obj.wrapper_name()),
        }
    }
}
