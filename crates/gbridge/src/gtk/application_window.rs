use super::{Application, Bin, CallExt, Container, Widget, Window};
use crate::{
    Ownership,
    error::BridgeResult,
    glib::{InitiallyUnowned, Object},
    object::{IsA, ObjectExt, ObjectType},
    value::Value,
};

wrapper! {
    /// A window integrated with an [`Application`]: menubar and action support.
    pub struct ApplicationWindow: "GtkApplicationWindow", is_a [Object, InitiallyUnowned, Widget, Container, Bin, Window];
}

impl ApplicationWindow {
    /// `gtk_application_window_new`. The window is added to `application`,
    /// which holds its own reference until the window is removed or destroyed.
    pub fn new(application: &Application) -> BridgeResult<Self> {
        let raw = application.as_object_ref().live_handle()?;
        application
            .bridge()
            .construct_with(&[("application", Value::Object(raw))], Ownership::Sink)
    }
}

pub trait ApplicationWindowExt: IsA<ApplicationWindow> {
    fn shows_menubar(&self) -> BridgeResult<bool> {
        self.property_bool("show-menubar")
    }

    fn set_show_menubar(&self, show: bool) -> BridgeResult<()> {
        self.set_property("show-menubar", show)
    }

    /// Unique id within the application; `0` until the window is added to one.
    fn id(&self) -> BridgeResult<u32> {
        self.call_as("gtk_application_window_get_id", &[])
    }
}

impl<O: IsA<ApplicationWindow>> ApplicationWindowExt for O {}
