use std::path::Path;

use super::{Application, Bin, CallExt, Container, Widget, WindowPosition, WindowType, object_arg};
use crate::{
    Ownership,
    bridge::Bridge,
    error::{BridgeError, BridgeResult},
    gdk::Screen,
    glib::{InitiallyUnowned, Object},
    object::{IsA, ObjectExt},
    value::Value,
};

wrapper! {
    /// A toplevel window.
    ///
    /// GTK keeps its own reference to every toplevel until the window is
    /// destroyed, so dropping all wrappers does not close a window.
    pub struct Window: "GtkWindow", is_a [Object, InitiallyUnowned, Widget, Container, Bin];
}

impl Window {
    /// `gtk_window_new`. The toolkit owns the initial reference; the wrapper
    /// sinks, which for an already-owned window adds its own.
    pub fn new(bridge: &Bridge, kind: WindowType) -> BridgeResult<Self> {
        bridge.construct_with(&[("type", Value::Int(kind.into_native()))], Ownership::Sink)
    }
}

fn int_pair(values: Vec<i32>, symbol: &str) -> BridgeResult<(i32, i32)> {
    match values.as_slice() {
        [a, b] => Ok((*a, *b)),
        _ => Err(BridgeError::UnexpectedValue {
            what: symbol.to_owned(),
            expected: "IntList of length 2",
            actual: "IntList",
        }),
    }
}

pub trait WindowExt: IsA<Window> {
    /// The title; `NullResult` when none was set.
    fn title(&self) -> BridgeResult<String> {
        self.property_string("title")
    }

    fn set_title(&self, title: &str) -> BridgeResult<()> {
        self.set_property("title", title)
    }

    fn is_resizable(&self) -> BridgeResult<bool> {
        self.property_bool("resizable")
    }

    fn set_resizable(&self, resizable: bool) -> BridgeResult<()> {
        self.set_property("resizable", resizable)
    }

    fn is_modal(&self) -> BridgeResult<bool> {
        self.property_bool("modal")
    }

    fn set_modal(&self, modal: bool) -> BridgeResult<()> {
        self.set_property("modal", modal)
    }

    /// Default size; `-1` means unset for that dimension.
    fn default_size(&self) -> BridgeResult<(i32, i32)> {
        Ok((self.property_int("default-width")?, self.property_int("default-height")?))
    }

    fn set_default_size(&self, width: i32, height: i32) -> BridgeResult<()> {
        self.set_property("default-width", width)?;
        self.set_property("default-height", height)
    }

    fn window_position(&self) -> BridgeResult<WindowPosition> {
        WindowPosition::from_native(self.property_int("window-position")?)
    }

    fn set_window_position(&self, position: WindowPosition) -> BridgeResult<()> {
        self.set_property("window-position", position.into_native())
    }

    /// The window this one is transient for; `NullResult` when unset.
    fn transient_for(&self) -> BridgeResult<Window> {
        let raw = self.property("transient-for")?.and_then(|v| v.as_object());
        self.bridge().wrap_non_null(raw, Ownership::Borrowed)
    }

    fn set_transient_for<W: IsA<Window>>(&self, parent: Option<&W>) -> BridgeResult<()> {
        self.set_property("transient-for", object_arg(parent))
    }

    fn destroys_with_parent(&self) -> BridgeResult<bool> {
        self.property_bool("destroy-with-parent")
    }

    fn set_destroy_with_parent(&self, setting: bool) -> BridgeResult<()> {
        self.set_property("destroy-with-parent", setting)
    }

    fn hides_titlebar_when_maximized(&self) -> BridgeResult<bool> {
        self.property_bool("hide-titlebar-when-maximized")
    }

    fn set_hide_titlebar_when_maximized(&self, setting: bool) -> BridgeResult<()> {
        self.set_property("hide-titlebar-when-maximized", setting)
    }

    fn is_active(&self) -> BridgeResult<bool> {
        self.property_bool("is-active")
    }

    fn has_toplevel_focus(&self) -> BridgeResult<bool> {
        self.property_bool("has-toplevel-focus")
    }

    fn activate_focus(&self) -> BridgeResult<bool> {
        self.call_as("gtk_window_activate_focus", &[])
    }

    fn activate_default(&self) -> BridgeResult<bool> {
        self.call_as("gtk_window_activate_default", &[])
    }

    /// Raises the window and makes it the active one.
    fn present(&self) -> BridgeResult<()> {
        self.call_void("gtk_window_present", &[])
    }

    fn iconify(&self) -> BridgeResult<()> {
        self.call_void("gtk_window_iconify", &[])
    }

    fn deiconify(&self) -> BridgeResult<()> {
        self.call_void("gtk_window_deiconify", &[])
    }

    fn stick(&self) -> BridgeResult<()> {
        self.call_void("gtk_window_stick", &[])
    }

    fn unstick(&self) -> BridgeResult<()> {
        self.call_void("gtk_window_unstick", &[])
    }

    fn maximize(&self) -> BridgeResult<()> {
        self.call_void("gtk_window_maximize", &[])
    }

    fn unmaximize(&self) -> BridgeResult<()> {
        self.call_void("gtk_window_unmaximize", &[])
    }

    fn is_maximized(&self) -> BridgeResult<bool> {
        self.call_as("gtk_window_is_maximized", &[])
    }

    fn fullscreen(&self) -> BridgeResult<()> {
        self.call_void("gtk_window_fullscreen", &[])
    }

    fn unfullscreen(&self) -> BridgeResult<()> {
        self.call_void("gtk_window_unfullscreen", &[])
    }

    fn set_keep_above(&self, setting: bool) -> BridgeResult<()> {
        self.call_void("gtk_window_set_keep_above", &[setting.into()])
    }

    fn set_keep_below(&self, setting: bool) -> BridgeResult<()> {
        self.call_void("gtk_window_set_keep_below", &[setting.into()])
    }

    fn is_decorated(&self) -> BridgeResult<bool> {
        self.property_bool("decorated")
    }

    fn set_decorated(&self, setting: bool) -> BridgeResult<()> {
        self.set_property("decorated", setting)
    }

    fn is_deletable(&self) -> BridgeResult<bool> {
        self.property_bool("deletable")
    }

    fn set_deletable(&self, setting: bool) -> BridgeResult<()> {
        self.set_property("deletable", setting)
    }

    fn skips_taskbar_hint(&self) -> BridgeResult<bool> {
        self.property_bool("skip-taskbar-hint")
    }

    fn set_skip_taskbar_hint(&self, setting: bool) -> BridgeResult<()> {
        self.set_property("skip-taskbar-hint", setting)
    }

    fn skips_pager_hint(&self) -> BridgeResult<bool> {
        self.property_bool("skip-pager-hint")
    }

    fn set_skip_pager_hint(&self, setting: bool) -> BridgeResult<()> {
        self.set_property("skip-pager-hint", setting)
    }

    fn urgency_hint(&self) -> BridgeResult<bool> {
        self.property_bool("urgency-hint")
    }

    fn set_urgency_hint(&self, setting: bool) -> BridgeResult<()> {
        self.set_property("urgency-hint", setting)
    }

    fn accepts_focus(&self) -> BridgeResult<bool> {
        self.property_bool("accept-focus")
    }

    fn set_accept_focus(&self, setting: bool) -> BridgeResult<()> {
        self.set_property("accept-focus", setting)
    }

    fn focus_on_map(&self) -> BridgeResult<bool> {
        self.property_bool("focus-on-map")
    }

    fn set_focus_on_map(&self, setting: bool) -> BridgeResult<()> {
        self.set_property("focus-on-map", setting)
    }

    fn mnemonics_visible(&self) -> BridgeResult<bool> {
        self.property_bool("mnemonics-visible")
    }

    fn set_mnemonics_visible(&self, setting: bool) -> BridgeResult<()> {
        self.set_property("mnemonics-visible", setting)
    }

    fn focus_visible(&self) -> BridgeResult<bool> {
        self.property_bool("focus-visible")
    }

    fn set_focus_visible(&self, setting: bool) -> BridgeResult<()> {
        self.set_property("focus-visible", setting)
    }

    fn has_group(&self) -> BridgeResult<bool> {
        self.call_as("gtk_window_has_group", &[])
    }

    /// `gtk_window_move`
    fn move_to(&self, x: i32, y: i32) -> BridgeResult<()> {
        self.call_void("gtk_window_move", &[x.into(), y.into()])
    }

    fn resize(&self, width: i32, height: i32) -> BridgeResult<()> {
        self.call_void("gtk_window_resize", &[width.into(), height.into()])
    }

    fn size(&self) -> BridgeResult<(i32, i32)> {
        int_pair(self.call_as("gtk_window_get_size", &[])?, "gtk_window_get_size")
    }

    fn position(&self) -> BridgeResult<(i32, i32)> {
        int_pair(self.call_as("gtk_window_get_position", &[])?, "gtk_window_get_position")
    }

    fn screen(&self) -> BridgeResult<Screen> {
        self.call_object("gtk_window_get_screen", &[], Ownership::Borrowed)
    }

    /// The owning application; `NullResult` when the window has none.
    fn application(&self) -> BridgeResult<Application> {
        let raw = self.property("application")?.and_then(|v| v.as_object());
        self.bridge().wrap_non_null(raw, Ownership::Borrowed)
    }

    /// Sets or unsets the owning application. The application is kept alive
    /// at least as long as the window is open.
    fn set_application(&self, application: Option<&Application>) -> BridgeResult<()> {
        self.set_property("application", object_arg(application))
    }

    /// Loads the window icon from an image file.
    ///
    /// Fails with the toolkit's error record when the file is missing or not an image.
    fn set_icon_from_file(&self, path: impl AsRef<Path>) -> BridgeResult<()> {
        let path = path.as_ref();
        let path = path
            .to_str()
            .ok_or_else(|| BridgeError::InvalidArgument(format!("icon path {} is not UTF-8", path.display())))?;
        self.call_void("gtk_window_set_icon_from_file", &[path.into()])
    }
}

impl<O: IsA<Window>> WindowExt for O {}
