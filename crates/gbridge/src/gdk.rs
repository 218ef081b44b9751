//! GDK wrappers.

use crate::glib::Object;

wrapper! {
    /// A display screen. Owned by the display; wrappers only ever borrow it.
    pub struct Screen: "GdkScreen", is_a [Object];
}
