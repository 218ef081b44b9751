//! Values crossing the runtime boundary.

use crate::handle::{RawHandle, TypeTag};

/// Position of a row in a tree model.
///
/// Iterators carry the stamp of the model generation they were issued for; any
/// structural reset of the model (such as clearing it) invalidates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeIter {
    stamp: u32,
    node: usize,
}

impl TreeIter {
    #[must_use]
    pub const fn new(stamp: u32, node: usize) -> Self {
        Self { stamp, node }
    }

    #[must_use]
    pub const fn stamp(&self) -> u32 {
        self.stamp
    }

    #[must_use]
    pub const fn node(&self) -> usize {
        self.node
    }
}

/// A property value, call argument, or call result.
///
/// Object values are borrowed addresses: passing one to the runtime never
/// transfers a reference, and receiving one never grants one. Wrapping a
/// returned object goes through the bridge with an explicit ownership mode.
#[derive(Debug, Clone, PartialEq, strum::IntoStaticStr)]
pub enum Value {
    /// A null pointer argument: no object, no string, no iterator.
    Null,
    Bool(bool),
    Int(i32),
    UInt(u32),
    Int64(i64),
    Double(f64),
    Str(String),
    Strv(Vec<String>),
    IntList(Vec<i32>),
    Object(RawHandle),
    ObjectList(Vec<RawHandle>),
    Type(TypeTag),
    TypeList(Vec<TypeTag>),
    TreeIter(TreeIter),
}

impl Value {
    /// Name of the variant, used in diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        self.into()
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_object(&self) -> Option<RawHandle> {
        match self {
            Self::Object(raw) => Some(*raw),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Wraps an optional object as `Object` or `Null`.
    #[must_use]
    pub fn from_object(raw: Option<RawHandle>) -> Self {
        raw.map_or(Self::Null, Self::Object)
    }

    /// Wraps an optional iterator as `TreeIter` or `Null`.
    #[must_use]
    pub fn from_iter_opt(iter: Option<TreeIter>) -> Self {
        iter.map_or(Self::Null, Self::TreeIter)
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i32 => Int,
    u32 => UInt,
    i64 => Int64,
    f64 => Double,
    String => Str,
    Vec<String> => Strv,
    Vec<i32> => IntList,
    RawHandle => Object,
    TypeTag => Type,
    TreeIter => TreeIter,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<Option<&str>> for Value {
    fn from(v: Option<&str>) -> Self {
        v.map_or(Self::Null, Self::from)
    }
}

impl From<&[&str]> for Value {
    fn from(v: &[&str]) -> Self {
        Self::Strv(v.iter().map(|s| (*s).to_owned()).collect())
    }
}

/// Extraction of a typed value out of a [`Value`].
pub trait FromValue: Sized {
    /// Variant name reported when extraction fails.
    const EXPECTED: &'static str;

    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! from_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromValue for $ty {
                const EXPECTED: &'static str = stringify!($variant);

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

from_value! {
    bool => Bool,
    i32 => Int,
    u32 => UInt,
    i64 => Int64,
    f64 => Double,
    String => Str,
    Vec<String> => Strv,
    Vec<i32> => IntList,
    RawHandle => Object,
    Vec<RawHandle> => ObjectList,
    TypeTag => Type,
    TreeIter => TreeIter,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_name_is_variant_name() {
        assert_eq!(Value::Int(3).kind_name(), "Int");
        assert_eq!(Value::Null.kind_name(), "Null");
        assert_eq!(Value::from("x").kind_name(), "Str");
    }

    #[test]
    fn absent_optional_string_becomes_null() {
        assert_eq!(Value::from(None::<&str>), Value::Null);
    }

    #[test]
    fn extraction_rejects_other_variants() {
        assert_eq!(bool::from_value(Value::Int(1)), None);
        assert_eq!(i32::from_value(Value::Int(1)), Some(1));
    }
}
