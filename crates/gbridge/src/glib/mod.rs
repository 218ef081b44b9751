//! GLib and GObject level wrappers and data structures.

mod list;
mod object;
mod variant_type;

pub use list::{GList, List};
pub use object::{InitiallyUnowned, Object};
pub use variant_type::VariantType;
