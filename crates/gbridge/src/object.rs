//! Wrapper objects and the capability traits shared by every native type.
//!
//! Each wrapper owns exactly one [`ObjectRef`], which holds exactly one native
//! reference from construction until drop. Wrappers never call the runtime's
//! reference primitives directly.

use std::{any::Any, fmt};

use crate::{
    bridge::Bridge,
    error::{BridgeError, BridgeResult},
    handle::{NativeHandle, RawHandle, TypeTag, cast, type_name_or_invalid},
    native::NativeRuntime,
    value::{FromValue, Value},
};

/// The single native reference held by one wrapper.
///
/// Cloning acquires an additional reference; dropping releases one, either
/// immediately or through the bridge's release queue depending on the dropping
/// thread and the release policy.
pub struct ObjectRef {
    raw: Option<RawHandle>,
    tag: TypeTag,
    bridge: Bridge,
}

impl ObjectRef {
    pub(crate) fn from_parts(raw: Option<RawHandle>, tag: TypeTag, bridge: Bridge) -> Self {
        Self { raw, tag, bridge }
    }

    /// The raw address, `None` for a null wrapper.
    #[must_use]
    pub fn raw(&self) -> Option<RawHandle> {
        self.raw
    }

    /// The concrete native type recorded at acquisition time.
    #[must_use]
    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    #[must_use]
    pub fn native_handle(&self) -> NativeHandle {
        self.raw.map_or(NativeHandle::NULL, |raw| NativeHandle::new(raw, self.tag))
    }

    #[must_use]
    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.raw.is_none()
    }

    /// The handle of a live object.
    ///
    /// Errors with `NullResult` for a null wrapper and `Destroyed` once the
    /// object was explicitly destroyed.
    pub fn live_handle(&self) -> BridgeResult<RawHandle> {
        let raw = self.raw.ok_or_else(|| BridgeError::null("object"))?;
        let runtime = self.bridge.runtime();
        if runtime.is_destroyed(raw) {
            return Err(BridgeError::Destroyed {
                type_name: type_name_or_invalid(runtime, self.tag),
            });
        }
        Ok(raw)
    }

    pub(crate) fn runtime(&self) -> &dyn NativeRuntime {
        self.bridge.runtime()
    }
}

impl Clone for ObjectRef {
    fn clone(&self) -> Self {
        self.bridge.acquire(self.raw, crate::Ownership::Borrowed)
    }
}

impl Drop for ObjectRef {
    fn drop(&mut self) {
        if let Some(raw) = self.raw.take() {
            self.bridge.release(raw);
        }
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRef")
            .field("raw", &self.raw)
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}

/// Object-safe view of any wrapper.
pub trait ObjectType: Any + fmt::Debug + Send + Sync {
    fn as_object_ref(&self) -> &ObjectRef;

    /// Rust type name of the concrete wrapper.
    fn wrapper_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    fn clone_boxed(&self) -> Box<dyn ObjectType>;

    fn into_object_ref_boxed(self: Box<Self>) -> ObjectRef;
}

impl dyn ObjectType {
    /// Checked conversion of a dynamically typed wrapper into `T`.
    ///
    /// Unlike [`downcast`], this succeeds whenever the native object derives
    /// from `T`, whatever wrapper the registry picked for it.
    pub fn cast_to<T: StaticType>(self: Box<Self>) -> BridgeResult<T> {
        let obj = self.into_object_ref_boxed();
        let target = obj.bridge().type_tag(T::TYPE_NAME)?;
        cast(obj.runtime(), obj.native_handle(), target)?;
        Ok(T::from_object_ref(obj))
    }
}

impl Clone for Box<dyn ObjectType> {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

/// A wrapper statically bound to one native type.
pub trait StaticType: ObjectType + Clone + Sized {
    /// Native type name, e.g. `GtkWindow`.
    const TYPE_NAME: &'static str;
    const WRAPPER_NAME: &'static str;

    /// Wraps a reference without checking its type.
    fn from_object_ref(obj: ObjectRef) -> Self;

    fn into_object_ref(self) -> ObjectRef;
}

/// Marker: `Self` is `T` or derives from it.
///
/// Every type is trivially `IsA<Self>`; the remaining impls mirror the native
/// inheritance chain.
pub trait IsA<T: StaticType>: StaticType {}

/// Converts a dynamically typed wrapper into `T` when it is exactly `T`.
///
/// Returns the original box on failure so callers can try another type.
pub fn downcast<T: StaticType>(obj: Box<dyn ObjectType>) -> Result<T, Box<dyn ObjectType>> {
    if obj.as_any().is::<T>() {
        match obj.into_any().downcast::<T>() {
            Ok(obj) => Ok(*obj),
            Err(_) => unreachable!("type checked above"),
        }
    } else {
        Err(obj)
    }
}

/// Operations available on every wrapper.
pub trait ObjectExt: ObjectType {
    fn raw(&self) -> Option<RawHandle> {
        self.as_object_ref().raw()
    }

    fn is_null(&self) -> bool {
        self.as_object_ref().is_null()
    }

    fn bridge(&self) -> &Bridge {
        self.as_object_ref().bridge()
    }

    /// Concrete native type name.
    fn type_name(&self) -> BridgeResult<String> {
        let obj = self.as_object_ref();
        let raw = obj.raw.ok_or_else(|| BridgeError::null("object"))?;
        Ok(type_name_or_invalid(obj.runtime(), obj.runtime().type_of(raw)))
    }

    /// Whether the native object is a `T` (or derives from it).
    fn is<T: StaticType>(&self) -> bool {
        let obj = self.as_object_ref();
        obj.bridge()
            .type_tag(T::TYPE_NAME)
            .is_ok_and(|tag| obj.raw.is_some() && obj.runtime().type_is_a(obj.tag, tag))
    }

    /// Upcasts to an ancestor wrapper type, sharing the same native object.
    fn upcast<T: StaticType>(self) -> T
    where
        Self: IsA<T> + Sized,
    {
        T::from_object_ref(self.into_object_ref())
    }

    /// Checked view of the same native object as `T`.
    ///
    /// Null wrappers cast to a null `T`.
    fn cast<T: StaticType>(self) -> BridgeResult<T>
    where
        Self: StaticType,
    {
        let obj = self.as_object_ref();
        let target = obj.bridge().type_tag(T::TYPE_NAME)?;
        cast(obj.runtime(), obj.native_handle(), target)?;
        Ok(T::from_object_ref(self.into_object_ref()))
    }

    /// Raw property read. `Ok(None)` when the property holds no object or string.
    fn property(&self, name: &str) -> BridgeResult<Option<Value>> {
        let obj = self.as_object_ref();
        let raw = obj.live_handle()?;
        obj.bridge().debug_check_thread();
        Ok(obj.runtime().get_property(raw, name)?)
    }

    /// Typed property read; an absent value is a `NullResult`.
    fn property_as<T: FromValue>(&self, name: &str) -> BridgeResult<T> {
        let value = self.property(name)?.ok_or_else(|| BridgeError::null(format!("value for property {name:?}")))?;
        expect_value(value, name)
    }

    /// String property read; an absent string is a `NullResult`.
    fn property_string(&self, name: &str) -> BridgeResult<String> {
        self.property_as(name)
    }

    fn property_bool(&self, name: &str) -> BridgeResult<bool> {
        self.property_as(name)
    }

    fn property_int(&self, name: &str) -> BridgeResult<i32> {
        self.property_as(name)
    }

    /// Object property read, wrapped with a borrowed reference.
    fn property_object(&self, name: &str) -> BridgeResult<Box<dyn ObjectType>> {
        let raw = self.property(name)?.and_then(|v| v.as_object());
        let raw = raw.ok_or_else(|| BridgeError::null(format!("object for property {name:?}")))?;
        Ok(self.bridge().wrap(Some(raw), crate::Ownership::Borrowed))
    }

    fn set_property(&self, name: &str, value: impl Into<Value>) -> BridgeResult<()> {
        let obj = self.as_object_ref();
        let raw = obj.live_handle()?;
        obj.bridge().debug_check_thread();
        Ok(obj.runtime().set_property(raw, name, value.into())?)
    }

    /// Forwards a toolkit function with this object as the instance argument.
    fn call(&self, symbol: &str, args: &[Value]) -> BridgeResult<Option<Value>> {
        let obj = self.as_object_ref();
        let raw = obj.live_handle()?;
        obj.bridge().debug_check_thread();
        Ok(obj.runtime().call(raw, symbol, args)?)
    }

    /// Diagnostic native reference count.
    fn ref_count(&self) -> BridgeResult<u32> {
        let obj = self.as_object_ref();
        let raw = obj.raw.ok_or_else(|| BridgeError::null("object"))?;
        Ok(obj.runtime().ref_count(raw))
    }

    fn is_floating(&self) -> BridgeResult<bool> {
        let obj = self.as_object_ref();
        let raw = obj.raw.ok_or_else(|| BridgeError::null("object"))?;
        Ok(obj.runtime().is_floating(raw))
    }

    /// Explicitly destroys the native object.
    ///
    /// The wrapper stays valid to drop; every other operation afterwards fails
    /// with [`BridgeError::Destroyed`].
    fn destroy(&self) -> BridgeResult<()> {
        let obj = self.as_object_ref();
        let raw = obj.live_handle()?;
        obj.bridge().debug_check_thread();
        obj.runtime().destroy(raw);
        Ok(())
    }

    fn is_destroyed(&self) -> bool {
        let obj = self.as_object_ref();
        obj.raw.is_some_and(|raw| obj.runtime().is_destroyed(raw))
    }
}

impl<O: ObjectType + ?Sized> ObjectExt for O {}

/// Converts a runtime value into `T`, reporting the mismatch otherwise.
pub(crate) fn expect_value<T: FromValue>(value: Value, what: &str) -> BridgeResult<T> {
    let actual = value.kind_name();
    T::from_value(value).ok_or_else(|| BridgeError::UnexpectedValue {
        what: what.to_owned(),
        expected: T::EXPECTED,
        actual,
    })
}

/// Unwraps a call result that must carry a value.
pub(crate) fn expect_result<T: FromValue>(result: Option<Value>, symbol: &str) -> BridgeResult<T> {
    let value = result.ok_or_else(|| BridgeError::null(format!("result of {symbol}")))?;
    expect_value(value, symbol)
}

/// Defines a wrapper type bound to a native type name.
///
/// ```ignore
/// wrapper! {
///     /// A top-level window.
///     pub struct Window: "GtkWindow", is_a [Object, InitiallyUnowned, Widget];
/// }
/// ```
///
/// The wrapper is submitted to the inventory so the global registry can
/// construct it when a handle of that native type (or of an unregistered
/// subtype) is wrapped.
#[macro_export]
macro_rules! wrapper {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident : $type_name:literal $(, is_a [$($parent:path),* $(,)?])? ;
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone)]
        $vis struct $name {
            obj: $crate::ObjectRef,
        }

        impl $crate::ObjectType for $name {
            fn as_object_ref(&self) -> &$crate::ObjectRef {
                &self.obj
            }

            fn wrapper_name(&self) -> &'static str {
                <Self as $crate::StaticType>::WRAPPER_NAME
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn into_any(self: Box<Self>) -> Box<dyn ::std::any::Any> {
                self
            }

            fn clone_boxed(&self) -> Box<dyn $crate::ObjectType> {
                Box::new(self.clone())
            }

            fn into_object_ref_boxed(self: Box<Self>) -> $crate::ObjectRef {
                self.obj
            }
        }

        impl $crate::StaticType for $name {
            const TYPE_NAME: &'static str = $type_name;
            const WRAPPER_NAME: &'static str = stringify!($name);

            fn from_object_ref(obj: $crate::ObjectRef) -> Self {
                Self { obj }
            }

            fn into_object_ref(self) -> $crate::ObjectRef {
                self.obj
            }
        }

        impl $crate::IsA<$name> for $name {}
        $($(impl $crate::IsA<$parent> for $name {})*)?

        $crate::__private::inventory::submit! {
            $crate::WrapperKind::of::<$name>()
        }
    };
}
