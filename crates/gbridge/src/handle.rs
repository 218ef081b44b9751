//! Handle representation and the cast layer.
//!
//! A native object is addressed by a [`RawHandle`], a non-null address into
//! foreign-owned memory. [`NativeHandle`] pairs that address with the [`TypeTag`]
//! of the object it points to, and is allowed to be null: "no object" is a valid,
//! checkable state that queries such as "get parent" routinely return.

use std::{fmt, num::NonZeroUsize};

use crate::{
    error::{BridgeError, BridgeResult},
    native::NativeRuntime,
};

/// Identity of a native type (a `GType` for the GObject backend).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeTag(usize);

impl TypeTag {
    /// The "no type" tag, `G_TYPE_INVALID`.
    pub const INVALID: Self = Self(0);

    #[must_use]
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn into_raw(self) -> usize {
        self.0
    }

    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

/// Non-null address of a native object.
///
/// Never dereferenced by bridge code; only the runtime interprets it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RawHandle(NonZeroUsize);

impl RawHandle {
    #[must_use]
    pub fn from_addr(addr: usize) -> Option<Self> {
        NonZeroUsize::new(addr).map(Self)
    }

    #[must_use]
    pub fn from_ptr<T>(ptr: *mut T) -> Option<Self> {
        Self::from_addr(ptr as usize)
    }

    #[must_use]
    pub fn addr(self) -> usize {
        self.0.get()
    }

    #[must_use]
    pub fn as_ptr<T>(self) -> *mut T {
        self.0.get() as *mut T
    }
}

impl fmt::Debug for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawHandle({:#x})", self.0)
    }
}

impl fmt::Display for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// An optional native address tagged with the concrete type it points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeHandle {
    raw: Option<RawHandle>,
    tag: TypeTag,
}

impl NativeHandle {
    pub const NULL: Self = Self {
        raw: None,
        tag: TypeTag::INVALID,
    };

    #[must_use]
    pub const fn new(raw: RawHandle, tag: TypeTag) -> Self {
        Self { raw: Some(raw), tag }
    }

    /// Captures `raw` together with its concrete type as reported by `runtime`.
    #[must_use]
    pub fn capture(runtime: &dyn NativeRuntime, raw: Option<RawHandle>) -> Self {
        match raw {
            Some(raw) => Self::new(raw, runtime.type_of(raw)),
            None => Self::NULL,
        }
    }

    #[must_use]
    pub const fn raw(&self) -> Option<RawHandle> {
        self.raw
    }

    #[must_use]
    pub const fn tag(&self) -> TypeTag {
        self.tag
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.raw.is_none()
    }
}

/// Checks that `handle` can be viewed as an instance of `target`.
///
/// A null handle always casts successfully and stays null, so callers can keep
/// treating "no object" as a checkable state. A non-null handle must be of type
/// `target` or of a type deriving from it.
pub fn cast(runtime: &dyn NativeRuntime, handle: NativeHandle, target: TypeTag) -> BridgeResult<NativeHandle> {
    if handle.is_null() || runtime.type_is_a(handle.tag, target) {
        return Ok(handle);
    }
    Err(BridgeError::TypeMismatch {
        expected: type_name_or_invalid(runtime, target),
        actual: type_name_or_invalid(runtime, handle.tag),
    })
}

pub(crate) fn type_name_or_invalid(runtime: &dyn NativeRuntime, tag: TypeTag) -> String {
    runtime.type_name(tag).unwrap_or_else(|| "<invalid>".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_address_is_not_a_handle() {
        assert!(RawHandle::from_addr(0).is_none());
        assert_eq!(RawHandle::from_addr(0x40).map(RawHandle::addr), Some(0x40));
    }

    #[test]
    fn null_native_handle_has_invalid_tag() {
        assert!(NativeHandle::NULL.is_null());
        assert!(!NativeHandle::NULL.tag().is_valid());
    }
}
