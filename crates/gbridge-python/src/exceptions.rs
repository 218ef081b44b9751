//! Python exceptions raised for bridge failures.
//!
//! ## Exception Hierarchy
//!
//! ```text
//! ToolkitError(Exception)        # Base class for every bridge failure
//! ├── NullResultError            # A query returned no object or no string
//! ├── TypeMismatchError          # An object was viewed as a type it does not derive from
//! ├── NativeCallError            # The toolkit reported an error record
//! ├── DestroyedError             # The object was used after destroy()
//! └── InvalidArgumentError       # Arguments rejected before reaching the toolkit
//! ```

use gbridge::BridgeError;
use pyo3::{create_exception, exceptions::PyException, prelude::*};

create_exception!(gbridge, ToolkitError, PyException, "Base class for all bridge errors.");
create_exception!(
    gbridge,
    NullResultError,
    ToolkitError,
    "A toolkit query returned no object or no string."
);
create_exception!(
    gbridge,
    TypeMismatchError,
    ToolkitError,
    "An object was viewed as a type it does not derive from."
);
create_exception!(
    gbridge,
    NativeCallError,
    ToolkitError,
    "The toolkit reported an error. `args` is `(message, domain, code)`."
);
create_exception!(gbridge, DestroyedError, ToolkitError, "The object was used after destroy().");
create_exception!(
    gbridge,
    InvalidArgumentError,
    ToolkitError,
    "Arguments were rejected before reaching the toolkit."
);

/// Converts a bridge failure to the matching Python exception.
#[must_use]
pub fn to_py_err(err: BridgeError) -> PyErr {
    let message = err.to_string();
    match err {
        BridgeError::NullResult { .. } => NullResultError::new_err(message),
        BridgeError::TypeMismatch { .. } => TypeMismatchError::new_err(message),
        BridgeError::Native(native) => NativeCallError::new_err((native.message, native.domain, native.code)),
        BridgeError::Destroyed { .. } => DestroyedError::new_err(message),
        BridgeError::InvalidArgument(_) | BridgeError::InteriorNul { .. } | BridgeError::UnknownType(_) => {
            InvalidArgumentError::new_err(message)
        }
        BridgeError::InvalidUtf8(_) | BridgeError::UnexpectedValue { .. } => ToolkitError::new_err(message),
    }
}

/// `?`-friendly conversion for bridge results.
pub trait IntoPyResult<T> {
    fn into_py_result(self) -> PyResult<T>;
}

impl<T> IntoPyResult<T> for Result<T, BridgeError> {
    fn into_py_result(self) -> PyResult<T> {
        self.map_err(to_py_err)
    }
}
