use std::sync::Arc;

use gbridge::{Bridge, BridgeConfig, NativeRuntime, ReleasePolicy, sim::SimRuntime};
use pyo3::{
    exceptions::PyValueError,
    prelude::*,
    types::{PyDict, PyString},
};

use crate::{convert::py_to_value, exceptions::IntoPyResult, object::PyGObject};

/// A toolkit session: one native runtime and the bridge in front of it.
///
/// The thread that creates the toolkit is its toolkit thread. Objects dropped
/// on other threads are released when that thread calls `drain_releases()`.
#[pyclass(name = "Toolkit", module = "gbridge", frozen)]
#[derive(Debug)]
pub struct PyToolkit {
    bridge: Bridge,
    sim: Option<Arc<SimRuntime>>,
}

#[pymethods]
impl PyToolkit {
    /// Creates a toolkit backed by the simulator, or by the real toolkit when
    /// `native` is true and the extension was built with it.
    #[new]
    #[pyo3(signature = (*, release_policy = None, drain_batch = None, native = false))]
    fn new(release_policy: Option<&str>, drain_batch: Option<usize>, native: bool) -> PyResult<Self> {
        let mut config = BridgeConfig::default().with_drain_batch(drain_batch);
        if let Some(policy) = release_policy {
            let policy: ReleasePolicy = policy
                .parse()
                .map_err(|_| PyValueError::new_err(format!("unknown release policy {policy:?}")))?;
            config = config.with_release_policy(policy);
        }
        let (runtime, sim) = runtime(native)?;
        tracing::debug!(backend = runtime.name(), "toolkit created");
        Ok(Self {
            bridge: Bridge::with_config(runtime, config),
            sim,
        })
    }

    /// Name of the backend, `sim` or `gobject`.
    #[getter]
    fn backend(&self) -> &'static str {
        self.bridge.runtime().name()
    }

    /// Constructs an object of the named native type.
    ///
    /// Keyword arguments become construct properties, using the native
    /// property names with `_` in place of `-`.
    #[pyo3(signature = (type_name, **properties))]
    fn new_object(&self, type_name: &str, properties: Option<&Bound<'_, PyDict>>) -> PyResult<PyGObject> {
        let mut props = Vec::new();
        if let Some(properties) = properties {
            for (key, value) in properties.iter() {
                let key = key.cast::<PyString>()?.to_str()?.replace('_', "-");
                props.push((key, py_to_value(&value)?));
            }
        }
        let props = props.iter().map(|(k, v)| (k.as_str(), v.clone())).collect::<Vec<_>>();
        let obj = self.bridge.construct_dynamic(type_name, &props).into_py_result()?;
        Ok(PyGObject::new(obj))
    }

    /// Whether `type_name` names a type known to the runtime.
    fn has_type(&self, type_name: &str) -> bool {
        self.bridge.type_tag(type_name).is_ok()
    }

    /// Releases references queued by drops on other threads.
    ///
    /// Returns the number released; zero when called off the toolkit thread.
    fn drain_releases(&self) -> usize {
        self.bridge.drain_releases()
    }

    #[getter]
    fn pending_releases(&self) -> usize {
        self.bridge.pending_releases()
    }

    /// Reference traffic counters as a dict.
    fn stats<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let stats = self.bridge.stats();
        let dict = PyDict::new(py);
        dict.set_item("acquired", stats.acquired)?;
        dict.set_item("released", stats.released)?;
        dict.set_item("deferred", stats.deferred)?;
        dict.set_item("pending", stats.pending)?;
        dict.set_item("live_wrappers", stats.live_wrappers())?;
        Ok(dict)
    }

    /// Object population of the simulator, or `None` for the real toolkit.
    fn sim_stats<'py>(&self, py: Python<'py>) -> PyResult<Option<Bound<'py, PyDict>>> {
        let Some(sim) = &self.sim else {
            return Ok(None);
        };
        let stats = sim.stats();
        let dict = PyDict::new(py);
        dict.set_item("live_objects", stats.live_objects)?;
        dict.set_item("finalized", stats.finalized)?;
        dict.set_item("toplevels", stats.toplevels)?;
        dict.set_item("objects_by_type", stats.objects_by_type)?;
        Ok(Some(dict))
    }

    /// Whether the simulator still holds the object at `handle`.
    fn is_alive(&self, handle: usize) -> PyResult<bool> {
        let Some(sim) = &self.sim else {
            return Err(PyValueError::new_err("liveness is only tracked by the simulator"));
        };
        Ok(gbridge::RawHandle::from_addr(handle).is_some_and(|raw| sim.is_alive(raw)))
    }

    fn __repr__(&self) -> String {
        format!("Toolkit(backend={:?})", self.backend())
    }
}

type Runtimes = (Arc<dyn NativeRuntime>, Option<Arc<SimRuntime>>);

fn runtime(native: bool) -> PyResult<Runtimes> {
    if native {
        return native_runtime();
    }
    let sim = Arc::new(SimRuntime::new());
    Ok((sim.clone(), Some(sim)))
}

#[cfg(feature = "gobject")]
fn native_runtime() -> PyResult<Runtimes> {
    let runtime = gbridge::ffi::GObjectRuntime::new().map_err(|err| crate::exceptions::to_py_err(err.into()))?;
    Ok((Arc::new(runtime), None))
}

#[cfg(not(feature = "gobject"))]
fn native_runtime() -> PyResult<Runtimes> {
    Err(PyValueError::new_err("this build has no native toolkit backend"))
}
