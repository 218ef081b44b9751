use super::{CallExt, Widget};
use crate::{
    Ownership,
    error::{BridgeError, BridgeResult},
    glib::{InitiallyUnowned, Object},
    handle::RawHandle,
    object::{IsA, ObjectExt, ObjectType},
    value::Value,
};

wrapper! {
    /// A widget holding child widgets.
    pub struct Container: "GtkContainer", is_a [Object, InitiallyUnowned, Widget];
}

wrapper! {
    /// A container with at most one child.
    pub struct Bin: "GtkBin", is_a [Object, InitiallyUnowned, Widget, Container];
}

pub trait ContainerExt: IsA<Container> {
    /// Adds `child`; the container sinks the child's floating reference.
    fn add<W: IsA<Widget>>(&self, child: &W) -> BridgeResult<()> {
        self.call_void("gtk_container_add", &[Value::from_object(child.raw())])
    }

    fn remove<W: IsA<Widget>>(&self, child: &W) -> BridgeResult<()> {
        self.call_void("gtk_container_remove", &[Value::from_object(child.raw())])
    }

    /// Direct children, each wrapped as its most specific type.
    fn children(&self) -> BridgeResult<Vec<Box<dyn ObjectType>>> {
        let list: Vec<RawHandle> = self.call_as("gtk_container_get_children", &[])?;
        Ok(list
            .into_iter()
            .map(|raw| self.bridge().wrap(Some(raw), Ownership::Borrowed))
            .collect())
    }

    fn border_width(&self) -> BridgeResult<u32> {
        self.property_as("border-width")
    }

    fn set_border_width(&self, width: u32) -> BridgeResult<()> {
        self.set_property("border-width", width)
    }
}

impl<O: IsA<Container>> ContainerExt for O {}

pub trait BinExt: IsA<Bin> {
    /// The single child; `NullResult` when empty.
    fn child(&self) -> BridgeResult<Box<dyn ObjectType>> {
        let raw = self.call("gtk_bin_get_child", &[])?.and_then(|v| v.as_object());
        let raw = raw.ok_or_else(|| BridgeError::null("bin child"))?;
        Ok(self.bridge().wrap(Some(raw), Ownership::Borrowed))
    }
}

impl<O: IsA<Bin>> BinExt for O {}
