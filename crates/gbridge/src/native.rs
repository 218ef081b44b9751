use crate::{
    error::NativeError,
    handle::{RawHandle, TypeTag},
    value::Value,
};

/// The native toolkit as seen by the bridge.
///
/// Implementations wrap the object system that owns native memory: the real
/// GObject/GTK libraries (see the `gobject` feature) or the in-process
/// [`SimRuntime`](crate::sim::SimRuntime). Every method except the type-system
/// queries must only be invoked on the toolkit thread; the bridge funnels
/// cross-thread releases through its release queue instead of calling
/// [`dec_ref`](Self::dec_ref) from other threads.
///
/// The reference-counting primitives (`inc_ref`, `ref_sink`, `dec_ref`) are only
/// called by the bridge's reference adapter. Passing a handle that was already
/// finalized is a contract violation with undefined results.
pub trait NativeRuntime: Send + Sync {
    /// Short backend name used in diagnostics.
    fn name(&self) -> &'static str;

    // type system

    fn type_from_name(&self, name: &str) -> Option<TypeTag>;

    fn type_name(&self, tag: TypeTag) -> Option<String>;

    /// Direct parent type, or [`TypeTag::INVALID`] for fundamentals.
    fn type_parent(&self, tag: TypeTag) -> TypeTag;

    fn type_is_a(&self, tag: TypeTag, ancestor: TypeTag) -> bool;

    /// Concrete type of a live object.
    fn type_of(&self, handle: RawHandle) -> TypeTag;

    // construction and reference counting

    /// Creates an instance of `tag` with construct properties applied.
    ///
    /// `Ok(None)` is the native constructor returning null. The returned
    /// reference is floating for initially-unowned types and full otherwise.
    fn construct(&self, tag: TypeTag, properties: &[(&str, Value)]) -> Result<Option<RawHandle>, NativeError>;

    fn inc_ref(&self, handle: RawHandle);

    /// Converts a floating reference into a full one, or adds a reference if
    /// the object is not floating.
    fn ref_sink(&self, handle: RawHandle);

    /// Releases one reference; the object is finalized when the count reaches zero.
    fn dec_ref(&self, handle: RawHandle);

    fn is_floating(&self, handle: RawHandle) -> bool;

    /// Current reference count, for diagnostics and tests.
    fn ref_count(&self, handle: RawHandle) -> u32;

    // properties

    /// Reads a property. `Ok(None)` means the property holds no object or string.
    fn get_property(&self, handle: RawHandle, name: &str) -> Result<Option<Value>, NativeError>;

    fn set_property(&self, handle: RawHandle, name: &str, value: Value) -> Result<(), NativeError>;

    // teardown

    /// Explicit destroy: drops the references the object holds on others and
    /// detaches it from containers. Memory stays valid until the last reference
    /// is released.
    fn destroy(&self, handle: RawHandle);

    fn is_destroyed(&self, handle: RawHandle) -> bool;

    /// Invokes a toolkit function by its C symbol with `handle` as the instance.
    ///
    /// Backends without a forwarding for `symbol` return
    /// [`NativeError::unsupported`].
    fn call(&self, handle: RawHandle, symbol: &str, args: &[Value]) -> Result<Option<Value>, NativeError>;
}
