//! GIO wrappers used by the application layer.

use crate::{Ownership, bridge::Bridge, error::BridgeResult, glib::Object};

wrapper! {
    pub struct Application: "GApplication", is_a [Object];
}

wrapper! {
    /// Abstract menu description.
    pub struct MenuModel: "GMenuModel", is_a [Object];
}

wrapper! {
    pub struct Menu: "GMenu", is_a [Object, MenuModel];
}

impl Menu {
    /// `g_menu_new`; returns a full reference the wrapper adopts.
    pub fn new(bridge: &Bridge) -> BridgeResult<Self> {
        bridge.construct_with(&[], Ownership::Full)
    }
}

bitflags::bitflags! {
    /// `GApplicationFlags`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ApplicationFlags: u32 {
        const IS_SERVICE = 1 << 0;
        const IS_LAUNCHER = 1 << 1;
        const HANDLES_OPEN = 1 << 2;
        const HANDLES_COMMAND_LINE = 1 << 3;
        const SEND_ENVIRONMENT = 1 << 4;
        const NON_UNIQUE = 1 << 5;
        const CAN_OVERRIDE_APP_ID = 1 << 6;
    }
}
