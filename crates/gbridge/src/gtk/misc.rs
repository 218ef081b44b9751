use super::{Bin, Container, Widget};
use crate::{
    Ownership,
    bridge::Bridge,
    error::BridgeResult,
    glib::{InitiallyUnowned, Object},
    object::{IsA, ObjectExt},
};

wrapper! {
    /// Base of widgets with alignment and padding, such as labels.
    pub struct Misc: "GtkMisc", is_a [Object, InitiallyUnowned, Widget];
}

wrapper! {
    pub struct Label: "GtkLabel", is_a [Object, InitiallyUnowned, Widget, Misc];
}

wrapper! {
    pub struct Button: "GtkButton", is_a [Object, InitiallyUnowned, Widget, Container, Bin];
}

/// Alignment and padding of [`Misc`] widgets.
pub trait MiscExt: IsA<Misc> {
    /// Horizontal and vertical alignment, each from 0.0 (start) to 1.0 (end).
    #[expect(clippy::cast_possible_truncation)]
    fn alignment(&self) -> BridgeResult<(f32, f32)> {
        let x: f64 = self.property_as("xalign")?;
        let y: f64 = self.property_as("yalign")?;
        Ok((x as f32, y as f32))
    }

    /// Values outside 0.0..=1.0 are clamped, like `gtk_misc_set_alignment`.
    fn set_alignment(&self, xalign: f32, yalign: f32) -> BridgeResult<()> {
        self.set_property("xalign", f64::from(xalign.clamp(0.0, 1.0)))?;
        self.set_property("yalign", f64::from(yalign.clamp(0.0, 1.0)))
    }

    /// Horizontal and vertical padding in pixels.
    fn padding(&self) -> BridgeResult<(i32, i32)> {
        Ok((self.property_int("xpad")?, self.property_int("ypad")?))
    }

    /// Negative padding is treated as zero.
    fn set_padding(&self, xpad: i32, ypad: i32) -> BridgeResult<()> {
        self.set_property("xpad", xpad.max(0))?;
        self.set_property("ypad", ypad.max(0))
    }
}

impl<O: IsA<Misc>> MiscExt for O {}

impl Label {
    /// `gtk_label_new`; the returned label is floating until sunk by this wrapper.
    pub fn new(bridge: &Bridge, text: Option<&str>) -> BridgeResult<Self> {
        let props = text.map(|t| ("label", crate::Value::from(t)));
        bridge.construct_with(props.as_slice(), Ownership::Sink)
    }

    /// The label text. A label always has text, possibly empty.
    pub fn text(&self) -> BridgeResult<String> {
        self.property_string("label")
    }

    pub fn set_text(&self, text: &str) -> BridgeResult<()> {
        self.set_property("label", text)
    }
}

impl Button {
    pub fn new(bridge: &Bridge) -> BridgeResult<Self> {
        bridge.construct_with(&[], Ownership::Sink)
    }

    pub fn with_label(bridge: &Bridge, label: &str) -> BridgeResult<Self> {
        bridge.construct_with(&[("label", label.into())], Ownership::Sink)
    }

    /// The button label; `NullResult` for a button without one.
    pub fn label(&self) -> BridgeResult<String> {
        self.property_string("label")
    }

    pub fn set_label(&self, label: &str) -> BridgeResult<()> {
        self.set_property("label", label)
    }
}
