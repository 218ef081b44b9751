#![doc = include_str!("../../../README.md")]
// first so every later module can use the wrapper macro
#[macro_use]
mod object;

mod adapter;
mod bridge;
mod config;
mod error;
mod handle;
pub mod marshal;
mod native;
pub mod registry;
mod release;
mod value;

pub mod gdk;
pub mod gio;
pub mod glib;
pub mod gtk;
pub mod sim;

#[cfg(feature = "gobject")]
pub mod ffi;

pub use crate::{
    adapter::Ownership,
    bridge::{Bridge, BridgeStats},
    config::BridgeConfig,
    error::{BridgeError, BridgeResult, NativeError},
    handle::{NativeHandle, RawHandle, TypeTag, cast},
    native::NativeRuntime,
    object::{IsA, ObjectExt, ObjectRef, ObjectType, StaticType, downcast},
    registry::{RegistryError, TypeRegistry, WrapperKind},
    release::ReleasePolicy,
    value::{FromValue, TreeIter, Value},
};

#[doc(hidden)]
pub mod __private {
    pub use inventory;
}
