//! GTK 3 widget families.
//!
//! Each level of the native hierarchy is a concrete wrapper plus a capability
//! trait implemented for every wrapper that derives from it, so a [`Window`]
//! exposes the [`WidgetExt`], [`ContainerExt`], [`BinExt`] and [`WindowExt`]
//! operations without any concrete inheritance.

mod application;
mod application_window;
mod container;
mod enums;
mod misc;
mod tree_store;
mod widget;
mod window;

pub use application::Application;
pub use application_window::{ApplicationWindow, ApplicationWindowExt};
pub use container::{Bin, BinExt, Container, ContainerExt};
pub use enums::{Align, ApplicationInhibitFlags, WindowPosition, WindowType};
pub use misc::{Button, Label, Misc, MiscExt};
pub use tree_store::TreeStore;
pub use widget::{Widget, WidgetExt};
pub use window::{Window, WindowExt};

pub use crate::value::TreeIter;

/// Imports every capability trait.
pub mod prelude {
    pub use super::{ApplicationWindowExt, BinExt, ContainerExt, MiscExt, WidgetExt, WindowExt};
    pub use crate::ObjectExt;
}

use crate::{
    Ownership,
    error::{BridgeError, BridgeResult},
    object::{ObjectExt, ObjectType, StaticType, expect_result},
    value::{FromValue, Value},
};

/// Forwarding helpers shared by the wrapper families.
pub(crate) trait CallExt: ObjectType {
    fn call_void(&self, symbol: &str, args: &[Value]) -> BridgeResult<()> {
        self.call(symbol, args).map(drop)
    }

    fn call_as<T: FromValue>(&self, symbol: &str, args: &[Value]) -> BridgeResult<T> {
        expect_result(self.call(symbol, args)?, symbol)
    }

    /// Forwards a query returning an object; a null result is `None`.
    fn call_object_opt<T: StaticType>(&self, symbol: &str, args: &[Value], ownership: Ownership) -> BridgeResult<Option<T>> {
        let raw = match self.call(symbol, args)? {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Object(raw)) => raw,
            Some(other) => {
                return Err(BridgeError::UnexpectedValue {
                    what: symbol.to_owned(),
                    expected: "Object",
                    actual: other.kind_name(),
                });
            }
        };
        self.bridge().wrap_as(Some(raw), ownership).map(Some)
    }

    /// Forwards a query returning an object; a null result is a `NullResult`.
    fn call_object<T: StaticType>(&self, symbol: &str, args: &[Value], ownership: Ownership) -> BridgeResult<T> {
        self.call_object_opt(symbol, args, ownership)?
            .ok_or_else(|| BridgeError::null(format!("{} from {symbol}", T::TYPE_NAME)))
    }
}

impl<O: ObjectType + ?Sized> CallExt for O {}

/// Argument value for an object that may be absent.
pub(crate) fn object_arg<T: ObjectType + ?Sized>(obj: Option<&T>) -> Value {
    Value::from_object(obj.and_then(|o| o.raw()))
}
