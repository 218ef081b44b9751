//! Python bindings for the gbridge native handle lifetime bridge.
//!
//! Python objects hold one native reference each; the bridge releases it when
//! the Python object is collected.

mod convert;
mod exceptions;
mod object;
mod toolkit;

use std::sync::OnceLock;

pub use exceptions::{
    DestroyedError, InvalidArgumentError, NativeCallError, NullResultError, ToolkitError, TypeMismatchError,
};
pub use object::PyGObject;
use pyo3::prelude::*;
pub use toolkit::PyToolkit;

/// Returns the package version, converting Cargo's format to Python's PEP 440.
fn get_version() -> &'static str {
    static VERSION: OnceLock<String> = OnceLock::new();

    VERSION.get_or_init(|| {
        let version = env!("CARGO_PKG_VERSION");
        // "1.0-alpha1" becomes "1.0a1"; enough for the versions this crate publishes
        version.replace("-alpha", "a").replace("-beta", "b")
    })
}

/// gbridge - reference-counted GTK and GLib objects from Python.
#[pymodule]
mod _gbridge {
    use pyo3::prelude::*;

    #[pymodule_export]
    use super::DestroyedError;
    #[pymodule_export]
    use super::InvalidArgumentError;
    #[pymodule_export]
    use super::NativeCallError;
    #[pymodule_export]
    use super::NullResultError;
    #[pymodule_export]
    use super::PyGObject as Object;
    #[pymodule_export]
    use super::PyToolkit as Toolkit;
    #[pymodule_export]
    use super::ToolkitError;
    #[pymodule_export]
    use super::TypeMismatchError;
    use super::get_version;

    #[pymodule_init]
    fn init(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add("__version__", get_version())?;
        Ok(())
    }
}
