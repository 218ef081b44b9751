use std::borrow::Cow;

/// Error domain used by backends for toolkit symbols they cannot forward.
pub const UNSUPPORTED_DOMAIN: &str = "gbridge-unsupported";

/// A translated native error record.
///
/// Built from the toolkit's own error record (a `GError` for the GObject backend)
/// at the boundary. The native record is released before this value is returned,
/// so it carries only owned copies of the domain and message text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} ({domain}:{code})")]
pub struct NativeError {
    /// Name of the error domain, e.g. `g-file-error-quark`.
    pub domain: String,
    /// Domain-specific error code.
    pub code: i32,
    /// Human readable message copied from the native record.
    pub message: String,
}

impl NativeError {
    #[must_use]
    pub fn new(domain: impl Into<String>, code: i32, message: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            code,
            message: message.into(),
        }
    }

    /// Error returned by a backend that has no forwarding for `symbol`.
    #[must_use]
    pub fn unsupported(symbol: &str) -> Self {
        Self::new(UNSUPPORTED_DOMAIN, 0, format!("{symbol} is not available in this runtime"))
    }

    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        self.domain == UNSUPPORTED_DOMAIN
    }
}

/// Failures surfaced by the bridge.
///
/// `NullResult`, `TypeMismatch` and `Native` are the recoverable conditions every
/// binding site reports as values. `Destroyed` is the defined marker for using an
/// object after its explicit destroy; other contract violations (double release,
/// cross-thread use) are not detected at runtime.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// A query returned no object or no string where one was asked for.
    #[error("native call returned no {what}")]
    NullResult { what: Cow<'static, str> },
    /// A handle was viewed as a type it does not derive from.
    #[error("type mismatch: expected {expected}, found {actual}")]
    TypeMismatch { expected: String, actual: String },
    /// The toolkit reported an error record.
    #[error(transparent)]
    Native(#[from] NativeError),
    /// The object was explicitly destroyed and only dropping is still allowed.
    #[error("{type_name} was used after it was destroyed")]
    Destroyed { type_name: String },
    /// A string could not be passed to the toolkit.
    #[error("string contains an interior NUL byte at offset {offset}")]
    InteriorNul { offset: usize },
    /// A string returned by the toolkit is not UTF-8.
    #[error("native string is not valid UTF-8: {0}")]
    InvalidUtf8(String),
    /// A value of the wrong shape came back from the toolkit.
    #[error("unexpected value for {what}: expected {expected}, found {actual}")]
    UnexpectedValue {
        what: String,
        expected: &'static str,
        actual: &'static str,
    },
    /// Arguments rejected before reaching the toolkit.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The toolkit does not know a type with this name.
    #[error("unknown native type {0:?}")]
    UnknownType(String),
}

pub type BridgeResult<T> = Result<T, BridgeError>;

impl BridgeError {
    #[must_use]
    pub fn null(what: impl Into<Cow<'static, str>>) -> Self {
        Self::NullResult { what: what.into() }
    }

    #[must_use]
    pub fn is_null_result(&self) -> bool {
        matches!(self, Self::NullResult { .. })
    }
}
