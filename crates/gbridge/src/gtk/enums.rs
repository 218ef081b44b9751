use crate::error::{BridgeError, BridgeResult};

macro_rules! native_enum {
    (
        $(#[$attr:meta])*
        pub enum $name:ident { $($(#[$vattr:meta])* $variant:ident = $value:literal,)* }
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::FromRepr, strum::EnumIter)]
        #[repr(i32)]
        pub enum $name {
            $($(#[$vattr])* $variant = $value,)*
        }

        impl $name {
            pub(crate) fn from_native(value: i32) -> BridgeResult<Self> {
                Self::from_repr(value).ok_or_else(|| {
                    BridgeError::InvalidArgument(format!(concat!("{} is not a valid ", stringify!($name)), value))
                })
            }

            pub(crate) fn into_native(self) -> i32 {
                self as i32
            }
        }
    };
}

native_enum! {
    /// `GtkWindowType`
    pub enum WindowType {
        Toplevel = 0,
        Popup = 1,
    }
}

native_enum! {
    /// `GtkWindowPosition`
    pub enum WindowPosition {
        None = 0,
        Center = 1,
        Mouse = 2,
        CenterAlways = 3,
        CenterOnParent = 4,
    }
}

native_enum! {
    /// `GtkAlign`
    pub enum Align {
        Fill = 0,
        Start = 1,
        End = 2,
        Center = 3,
        Baseline = 4,
    }
}

bitflags::bitflags! {
    /// `GtkApplicationInhibitFlags`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ApplicationInhibitFlags: u32 {
        const LOGOUT = 1 << 0;
        const SWITCH = 1 << 1;
        const SUSPEND = 1 << 2;
        const IDLE = 1 << 3;
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn native_values_round_trip() {
        for align in Align::iter() {
            assert_eq!(Align::from_native(align.into_native()).unwrap(), align);
        }
        assert!(WindowPosition::from_native(9).is_err());
    }
}
