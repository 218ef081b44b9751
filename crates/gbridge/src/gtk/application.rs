use super::{ApplicationInhibitFlags, CallExt, Window, object_arg};
use crate::{
    Ownership,
    bridge::Bridge,
    error::{BridgeError, BridgeResult},
    gio::{self, ApplicationFlags, Menu, MenuModel},
    glib::Object,
    handle::RawHandle,
    object::{IsA, ObjectExt},
    value::Value,
};

wrapper! {
    /// A GTK application: tracks its windows and owns the accelerator table.
    pub struct Application: "GtkApplication", is_a [Object, gio::Application];
}

impl Application {
    /// `gtk_application_new`.
    ///
    /// The native constructor returns a full reference, which the wrapper
    /// adopts without adding another. An invalid application id makes the
    /// constructor return null, surfaced as `NullResult`.
    pub fn new(bridge: &Bridge, application_id: Option<&str>, flags: ApplicationFlags) -> BridgeResult<Self> {
        bridge.construct_with(
            &[
                ("application-id", application_id.into()),
                ("flags", Value::UInt(flags.bits())),
            ],
            Ownership::Full,
        )
    }

    /// The application id; `NullResult` when none was given.
    pub fn application_id(&self) -> BridgeResult<String> {
        self.property_string("application-id")
    }

    pub fn flags(&self) -> BridgeResult<ApplicationFlags> {
        Ok(ApplicationFlags::from_bits_retain(self.property_as("flags")?))
    }

    /// Adds a window. The application holds a reference on it until it is
    /// removed or destroyed.
    pub fn add_window<W: IsA<Window>>(&self, window: &W) -> BridgeResult<()> {
        self.call_void("gtk_application_add_window", &[Value::from_object(window.raw())])
    }

    pub fn remove_window<W: IsA<Window>>(&self, window: &W) -> BridgeResult<()> {
        self.call_void("gtk_application_remove_window", &[Value::from_object(window.raw())])
    }

    /// Windows of the application, most recently focused first.
    ///
    /// The native list is only valid until the next focus change, so every
    /// entry is wrapped with its own reference before returning.
    pub fn windows(&self) -> BridgeResult<Vec<Window>> {
        let list: Vec<RawHandle> = self.call_as("gtk_application_get_windows", &[])?;
        list.into_iter()
            .map(|raw| self.bridge().wrap_as(Some(raw), Ownership::Borrowed))
            .collect()
    }

    /// The application window with the given id; `NullResult` when none matches.
    pub fn window_by_id(&self, id: u32) -> BridgeResult<Window> {
        self.call_object("gtk_application_get_window_by_id", &[id.into()], Ownership::Borrowed)
    }

    /// The most recently focused window; `NullResult` without windows.
    pub fn active_window(&self) -> BridgeResult<Window> {
        self.call_object("gtk_application_get_active_window", &[], Ownership::Borrowed)
    }

    /// Inhibits session actions. Returns a cookie for [`uninhibit`](Self::uninhibit);
    /// `0` means the request was refused.
    pub fn inhibit<W: IsA<Window>>(
        &self,
        window: Option<&W>,
        flags: ApplicationInhibitFlags,
        reason: Option<&str>,
    ) -> BridgeResult<u32> {
        self.call_as(
            "gtk_application_inhibit",
            &[object_arg(window), Value::UInt(flags.bits()), reason.into()],
        )
    }

    pub fn uninhibit(&self, cookie: u32) -> BridgeResult<()> {
        self.call_void("gtk_application_uninhibit", &[cookie.into()])
    }

    pub fn is_inhibited(&self, flags: ApplicationInhibitFlags) -> BridgeResult<bool> {
        self.call_as("gtk_application_is_inhibited", &[Value::UInt(flags.bits())])
    }

    pub fn prefers_app_menu(&self) -> BridgeResult<bool> {
        self.call_as("gtk_application_prefers_app_menu", &[])
    }

    /// The application menu; `NullResult` when none was set.
    pub fn app_menu(&self) -> BridgeResult<MenuModel> {
        let raw = self.property("app-menu")?.and_then(|v| v.as_object());
        self.bridge().wrap_non_null(raw, Ownership::Borrowed)
    }

    pub fn set_app_menu<M: IsA<MenuModel>>(&self, menu: Option<&M>) -> BridgeResult<()> {
        self.set_property("app-menu", object_arg(menu))
    }

    /// The menubar; `NullResult` when none was set.
    pub fn menubar(&self) -> BridgeResult<MenuModel> {
        let raw = self.property("menubar")?.and_then(|v| v.as_object());
        self.bridge().wrap_non_null(raw, Ownership::Borrowed)
    }

    pub fn set_menubar<M: IsA<MenuModel>>(&self, menu: Option<&M>) -> BridgeResult<()> {
        self.set_property("menubar", object_arg(menu))
    }

    /// A menu loaded from the application's UI resources by id.
    pub fn menu_by_id(&self, id: &str) -> BridgeResult<Menu> {
        self.call_object("gtk_application_get_menu_by_id", &[id.into()], Ownership::Borrowed)
    }

    /// Detailed action names that have accelerators.
    pub fn list_action_descriptions(&self) -> BridgeResult<Vec<String>> {
        self.call_as("gtk_application_list_action_descriptions", &[])
    }

    /// Accelerators for a detailed action name; empty when there are none.
    pub fn accels_for_action(&self, detailed_action_name: &str) -> BridgeResult<Vec<String>> {
        self.call_as("gtk_application_get_accels_for_action", &[detailed_action_name.into()])
    }

    /// Replaces the accelerators of an action; an empty list removes them.
    pub fn set_accels_for_action(&self, detailed_action_name: &str, accels: &[&str]) -> BridgeResult<()> {
        if detailed_action_name.is_empty() {
            return Err(BridgeError::InvalidArgument("detailed action name must not be empty".to_owned()));
        }
        self.call_void(
            "gtk_application_set_accels_for_action",
            &[detailed_action_name.into(), accels.into()],
        )
    }

    /// Actions bound to an accelerator; empty when there are none.
    pub fn actions_for_accel(&self, accel: &str) -> BridgeResult<Vec<String>> {
        self.call_as("gtk_application_get_actions_for_accel", &[accel.into()])
    }
}
