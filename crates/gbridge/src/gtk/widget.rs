use super::{Align, CallExt};
use crate::{
    Ownership,
    error::BridgeResult,
    glib::{InitiallyUnowned, Object},
    object::{IsA, ObjectExt, ObjectType},
    value::Value,
};

wrapper! {
    /// Base of every visual element.
    pub struct Widget: "GtkWidget", is_a [Object, InitiallyUnowned];
}

/// Operations valid on every widget.
pub trait WidgetExt: IsA<Widget> {
    /// True while the widget is being destroyed.
    fn in_destruction(&self) -> BridgeResult<bool> {
        self.call_as("gtk_widget_in_destruction", &[])
    }

    fn show(&self) -> BridgeResult<()> {
        self.call_void("gtk_widget_show", &[])
    }

    fn hide(&self) -> BridgeResult<()> {
        self.call_void("gtk_widget_hide", &[])
    }

    /// Shows the widget and, recursively, all its children.
    fn show_all(&self) -> BridgeResult<()> {
        self.call_void("gtk_widget_show_all", &[])
    }

    fn map(&self) -> BridgeResult<()> {
        self.call_void("gtk_widget_map", &[])
    }

    fn unmap(&self) -> BridgeResult<()> {
        self.call_void("gtk_widget_unmap", &[])
    }

    fn is_mapped(&self) -> BridgeResult<bool> {
        self.call_as("gtk_widget_get_mapped", &[])
    }

    fn is_realized(&self) -> BridgeResult<bool> {
        self.call_as("gtk_widget_get_realized", &[])
    }

    fn set_realized(&self, realized: bool) -> BridgeResult<()> {
        self.call_void("gtk_widget_set_realized", &[realized.into()])
    }

    fn is_visible(&self) -> BridgeResult<bool> {
        self.property_bool("visible")
    }

    fn set_visible(&self, visible: bool) -> BridgeResult<()> {
        self.set_property("visible", visible)
    }

    fn is_sensitive(&self) -> BridgeResult<bool> {
        self.property_bool("sensitive")
    }

    /// Effective sensitivity: the widget and all its ancestors are sensitive.
    fn is_sensitive_effective(&self) -> BridgeResult<bool> {
        self.call_as("gtk_widget_is_sensitive", &[])
    }

    fn set_sensitive(&self, sensitive: bool) -> BridgeResult<()> {
        self.set_property("sensitive", sensitive)
    }

    fn can_focus(&self) -> BridgeResult<bool> {
        self.property_bool("can-focus")
    }

    fn set_can_focus(&self, can_focus: bool) -> BridgeResult<()> {
        self.set_property("can-focus", can_focus)
    }

    fn grab_focus(&self) -> BridgeResult<()> {
        self.call_void("gtk_widget_grab_focus", &[])
    }

    /// Whether this is the focus widget of its toplevel.
    fn is_focus(&self) -> BridgeResult<bool> {
        self.call_as("gtk_widget_is_focus", &[])
    }

    fn has_focus(&self) -> BridgeResult<bool> {
        self.property_bool("has-focus")
    }

    fn is_toplevel(&self) -> BridgeResult<bool> {
        self.call_as("gtk_widget_is_toplevel", &[])
    }

    /// The widget name; `NullResult` when none was set.
    fn name(&self) -> BridgeResult<String> {
        self.property_string("name")
    }

    fn set_name(&self, name: &str) -> BridgeResult<()> {
        self.set_property("name", name)
    }

    /// The tooltip text; `NullResult` when none was set, `""` when set empty.
    fn tooltip_text(&self) -> BridgeResult<String> {
        self.property_string("tooltip-text")
    }

    fn set_tooltip_text(&self, text: Option<&str>) -> BridgeResult<()> {
        self.set_property("tooltip-text", text)
    }

    /// The parent container, wrapped as its most specific type.
    ///
    /// An unparented widget yields `NullResult`.
    fn parent(&self) -> BridgeResult<Box<dyn ObjectType>> {
        self.property_object("parent")
    }

    fn set_parent<P: IsA<Widget>>(&self, parent: &P) -> BridgeResult<()> {
        self.call_void("gtk_widget_set_parent", &[Value::from_object(parent.raw())])
    }

    fn unparent(&self) -> BridgeResult<()> {
        self.call_void("gtk_widget_unparent", &[])
    }

    /// The topmost ancestor, or the widget itself when it has no parent.
    fn toplevel(&self) -> BridgeResult<Box<dyn ObjectType>> {
        let raw = self.call("gtk_widget_get_toplevel", &[])?.and_then(|v| v.as_object());
        let raw = raw.ok_or_else(|| crate::BridgeError::null("toplevel widget"))?;
        Ok(self.bridge().wrap(Some(raw), Ownership::Borrowed))
    }

    fn set_size_request(&self, width: i32, height: i32) -> BridgeResult<()> {
        self.set_property("width-request", width)?;
        self.set_property("height-request", height)
    }

    fn size_request(&self) -> BridgeResult<(i32, i32)> {
        Ok((self.property_int("width-request")?, self.property_int("height-request")?))
    }

    fn halign(&self) -> BridgeResult<Align> {
        Align::from_native(self.property_int("halign")?)
    }

    fn set_halign(&self, align: Align) -> BridgeResult<()> {
        self.set_property("halign", align.into_native())
    }

    fn valign(&self) -> BridgeResult<Align> {
        Align::from_native(self.property_int("valign")?)
    }

    fn set_valign(&self, align: Align) -> BridgeResult<()> {
        self.set_property("valign", align.into_native())
    }

    fn margin_top(&self) -> BridgeResult<i32> {
        self.property_int("margin-top")
    }

    fn set_margin_top(&self, margin: i32) -> BridgeResult<()> {
        self.set_property("margin-top", margin)
    }

    fn margin_bottom(&self) -> BridgeResult<i32> {
        self.property_int("margin-bottom")
    }

    fn set_margin_bottom(&self, margin: i32) -> BridgeResult<()> {
        self.set_property("margin-bottom", margin)
    }

    fn hexpand(&self) -> BridgeResult<bool> {
        self.property_bool("hexpand")
    }

    fn set_hexpand(&self, expand: bool) -> BridgeResult<()> {
        self.set_property("hexpand", expand)
    }

    fn vexpand(&self) -> BridgeResult<bool> {
        self.property_bool("vexpand")
    }

    fn set_vexpand(&self, expand: bool) -> BridgeResult<()> {
        self.set_property("vexpand", expand)
    }

    fn app_paintable(&self) -> BridgeResult<bool> {
        self.property_bool("app-paintable")
    }

    fn set_app_paintable(&self, paintable: bool) -> BridgeResult<()> {
        self.set_property("app-paintable", paintable)
    }

    fn no_show_all(&self) -> BridgeResult<bool> {
        self.property_bool("no-show-all")
    }

    fn set_no_show_all(&self, no_show_all: bool) -> BridgeResult<()> {
        self.set_property("no-show-all", no_show_all)
    }

    fn events(&self) -> BridgeResult<i32> {
        self.property_int("events")
    }

    fn set_events(&self, events: i32) -> BridgeResult<()> {
        self.set_property("events", events)
    }

    fn add_events(&self, events: i32) -> BridgeResult<()> {
        let current = self.events()?;
        self.set_events(current | events)
    }

    fn allocated_width(&self) -> BridgeResult<i32> {
        self.call_as("gtk_widget_get_allocated_width", &[])
    }

    fn allocated_height(&self) -> BridgeResult<i32> {
        self.call_as("gtk_widget_get_allocated_height", &[])
    }

    fn queue_draw(&self) -> BridgeResult<()> {
        self.call_void("gtk_widget_queue_draw", &[])
    }
}

impl<O: IsA<Widget>> WidgetExt for O {}
