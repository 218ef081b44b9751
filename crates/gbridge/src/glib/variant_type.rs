//! GVariant type strings.
//!
//! A [`VariantType`] always holds exactly one complete, valid type string, so
//! every accessor can walk it without re-validating.

use std::{borrow::Cow, fmt};

use crate::error::{BridgeError, BridgeResult};

/// Nesting limit GLib places on type strings.
const MAX_DEPTH: usize = 128;

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct VariantType {
    repr: Cow<'static, str>,
}

macro_rules! variant_type_consts {
    ($($(#[$attr:meta])* $name:ident = $s:literal;)*) => {
        impl VariantType {
            $(
                $(#[$attr])*
                pub const $name: Self = Self { repr: Cow::Borrowed($s) };
            )*
        }
    };
}

variant_type_consts! {
    BOOLEAN = "b";
    BYTE = "y";
    INT16 = "n";
    UINT16 = "q";
    INT32 = "i";
    UINT32 = "u";
    INT64 = "x";
    UINT64 = "t";
    HANDLE = "h";
    DOUBLE = "d";
    STRING = "s";
    OBJECT_PATH = "o";
    SIGNATURE = "g";
    VARIANT = "v";
    /// Matches every type.
    ANY = "*";
    /// Matches every basic type.
    BASIC = "?";
    /// Matches every maybe type.
    MAYBE = "m*";
    /// Matches every array type.
    ARRAY = "a*";
    /// Matches every tuple type.
    TUPLE = "r";
    /// The empty tuple.
    UNIT = "()";
    /// Matches every dictionary entry type.
    DICT_ENTRY = "{?*}";
    /// Matches every dictionary type.
    DICTIONARY = "a{?*}";
    STRING_ARRAY = "as";
    OBJECT_PATH_ARRAY = "ao";
    BYTESTRING = "ay";
    BYTESTRING_ARRAY = "aay";
    /// The `a{sv}` dictionary used for option and property bags.
    VARDICT = "a{sv}";
}

fn is_basic_char(c: u8) -> bool {
    matches!(
        c,
        b'b' | b'y' | b'n' | b'q' | b'i' | b'u' | b'x' | b't' | b'h' | b'd' | b's' | b'o' | b'g' | b'?'
    )
}

/// Index just past the complete type starting at `start`.
fn scan(bytes: &[u8], start: usize, depth: usize) -> Option<usize> {
    if depth > MAX_DEPTH {
        return None;
    }
    let c = *bytes.get(start)?;
    match c {
        b'(' => {
            let mut i = start + 1;
            while *bytes.get(i)? != b')' {
                i = scan(bytes, i, depth + 1)?;
            }
            Some(i + 1)
        }
        b'{' => {
            if !is_basic_char(*bytes.get(start + 1)?) {
                return None;
            }
            let i = scan(bytes, start + 2, depth + 1)?;
            (*bytes.get(i)? == b'}').then_some(i + 1)
        }
        b'm' | b'a' => scan(bytes, start + 1, depth + 1),
        b'v' | b'r' | b'*' => Some(start + 1),
        c if is_basic_char(c) => Some(start + 1),
        _ => None,
    }
}

impl VariantType {
    /// Parses a complete type string.
    pub fn new(type_string: &str) -> BridgeResult<Self> {
        if Self::string_is_valid(type_string) {
            Ok(Self {
                repr: Cow::Owned(type_string.to_owned()),
            })
        } else {
            Err(BridgeError::InvalidArgument(format!("invalid GVariant type string {type_string:?}")))
        }
    }

    fn from_valid(repr: String) -> Self {
        debug_assert!(Self::string_is_valid(&repr), "{repr:?}");
        Self { repr: Cow::Owned(repr) }
    }

    #[must_use]
    pub fn string_is_valid(type_string: &str) -> bool {
        Self::string_scan(type_string) == Some(type_string.len())
    }

    /// Length of the first complete type at the start of `s`, if there is one.
    #[must_use]
    pub fn string_scan(s: &str) -> Option<usize> {
        scan(s.as_bytes(), 0, 0)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.repr
    }

    #[must_use]
    pub fn string_length(&self) -> usize {
        self.repr.len()
    }

    fn first_byte(&self) -> u8 {
        self.repr.as_bytes()[0]
    }

    /// Whether the type contains no indefinite parts (`*`, `?` or `r`).
    #[must_use]
    pub fn is_definite(&self) -> bool {
        !self.repr.bytes().any(|c| matches!(c, b'*' | b'?' | b'r'))
    }

    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(self.first_byte(), b'v' | b'a' | b'm' | b'r' | b'(' | b'{')
    }

    #[must_use]
    pub fn is_basic(&self) -> bool {
        is_basic_char(self.first_byte())
    }

    #[must_use]
    pub fn is_maybe(&self) -> bool {
        self.first_byte() == b'm'
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        self.first_byte() == b'a'
    }

    #[must_use]
    pub fn is_tuple(&self) -> bool {
        matches!(self.first_byte(), b'(' | b'r')
    }

    #[must_use]
    pub fn is_dict_entry(&self) -> bool {
        self.first_byte() == b'{'
    }

    #[must_use]
    pub fn is_variant(&self) -> bool {
        self.repr == "v"
    }

    /// Element type of an array or maybe type.
    #[must_use]
    pub fn element(&self) -> Option<Self> {
        (self.is_array() || self.is_maybe()).then(|| Self::from_valid(self.repr[1..].to_owned()))
    }

    /// Item types of a definite tuple or of a dictionary entry.
    #[must_use]
    pub fn items(&self) -> Option<Vec<Self>> {
        let close = match self.first_byte() {
            b'(' => b')',
            b'{' => b'}',
            _ => return None,
        };
        let bytes = self.repr.as_bytes();
        let mut out = Vec::new();
        let mut i = 1;
        while bytes[i] != close {
            let end = scan(bytes, i, 0)?;
            out.push(Self::from_valid(self.repr[i..end].to_owned()));
            i = end;
        }
        Some(out)
    }

    #[must_use]
    pub fn n_items(&self) -> Option<usize> {
        self.items().map(|items| items.len())
    }

    #[must_use]
    pub fn first(&self) -> Option<Self> {
        self.items()?.into_iter().next()
    }

    #[must_use]
    pub fn key(&self) -> Option<Self> {
        self.is_dict_entry().then(|| Self::from_valid(self.repr[1..2].to_owned()))
    }

    #[must_use]
    pub fn value(&self) -> Option<Self> {
        self.items()
            .filter(|_| self.is_dict_entry())
            .and_then(|items| items.into_iter().nth(1))
    }

    #[must_use]
    pub fn new_maybe(element: &Self) -> Self {
        Self::from_valid(format!("m{element}"))
    }

    #[must_use]
    pub fn new_array(element: &Self) -> Self {
        Self::from_valid(format!("a{element}"))
    }

    #[must_use]
    pub fn new_tuple(items: &[Self]) -> Self {
        let mut repr = String::from("(");
        for item in items {
            repr.push_str(item.as_str());
        }
        repr.push(')');
        Self::from_valid(repr)
    }

    /// Builds `{kv}`; the key must be a basic type.
    pub fn new_dict_entry(key: &Self, value: &Self) -> BridgeResult<Self> {
        if !key.is_basic() {
            return Err(BridgeError::InvalidArgument(format!(
                "dictionary entry key must be a basic type, got {key}"
            )));
        }
        Ok(Self::from_valid(format!("{{{key}{value}}}")))
    }

    /// Whether every value of `self` is also a value of `supertype`.
    #[must_use]
    pub fn is_subtype_of(&self, supertype: &Self) -> bool {
        let sup = supertype.repr.as_bytes();
        let sub = self.repr.as_bytes();
        let mut i = 0;
        let mut j = 0;
        while i < sup.len() {
            let s = sup[i];
            i += 1;
            let Some(&t) = sub.get(j) else {
                return false;
            };
            if s == t {
                j += 1;
                continue;
            }
            if t == b')' {
                return false;
            }
            let matches = match s {
                b'r' => matches!(t, b'(' | b'r'),
                b'*' => true,
                b'?' => is_basic_char(t),
                _ => false,
            };
            if !matches {
                return false;
            }
            let Some(end) = scan(sub, j, 0) else {
                return false;
            };
            j = end;
        }
        true
    }
}

impl fmt::Display for VariantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr)
    }
}

impl fmt::Debug for VariantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VariantType({:?})", self.repr)
    }
}

impl std::str::FromStr for VariantType {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn vt(s: &str) -> VariantType {
        VariantType::new(s).unwrap()
    }

    #[test]
    fn validity() {
        for ok in ["b", "as", "a{sv}", "(ii)", "()", "m(sa{sv})", "r", "*", "?", "a*", "{?*}", "aay"] {
            assert!(VariantType::string_is_valid(ok), "{ok}");
        }
        for bad in ["", "a", "(i", "{vs}", "{s}", "ii", "z", "a{sv", ")"] {
            assert!(!VariantType::string_is_valid(bad), "{bad}");
        }
    }

    #[test]
    fn scan_stops_after_first_type() {
        assert_eq!(VariantType::string_scan("a{sv}i"), Some(5));
        assert_eq!(VariantType::string_scan("(ii"), None);
    }

    #[test]
    fn nesting_limit() {
        let deep = format!("{}i", "a".repeat(MAX_DEPTH + 1));
        assert!(!VariantType::string_is_valid(&deep));
        let ok = format!("{}i", "a".repeat(MAX_DEPTH));
        assert!(VariantType::string_is_valid(&ok));
    }

    #[test]
    fn classification() {
        assert!(VariantType::VARDICT.is_array());
        assert!(VariantType::VARDICT.is_container());
        assert!(VariantType::VARDICT.is_definite());
        assert!(!VariantType::DICTIONARY.is_definite());
        assert!(VariantType::BASIC.is_basic());
        assert!(VariantType::TUPLE.is_tuple());
        assert!(VariantType::VARIANT.is_variant());
        assert!(!VariantType::STRING.is_container());
    }

    #[test]
    fn components() {
        let entry = vt("{s(ib)}");
        assert_eq!(entry.key(), Some(VariantType::STRING));
        assert_eq!(entry.value(), Some(vt("(ib)")));
        assert_eq!(entry.n_items(), Some(2));
        assert_eq!(vt("(sai)").items(), Some(vec![VariantType::STRING, vt("ai")]));
        assert_eq!(VariantType::UNIT.n_items(), Some(0));
        assert_eq!(VariantType::STRING_ARRAY.element(), Some(VariantType::STRING));
        assert_eq!(VariantType::STRING.element(), None);
        assert_eq!(VariantType::TUPLE.items(), None);
    }

    #[test]
    fn constructors() {
        assert_eq!(VariantType::new_array(&VariantType::BYTE), VariantType::BYTESTRING);
        assert_eq!(VariantType::new_maybe(&VariantType::STRING).as_str(), "ms");
        assert_eq!(
            VariantType::new_tuple(&[VariantType::INT32, VariantType::STRING_ARRAY]).as_str(),
            "(ias)"
        );
        assert_eq!(
            VariantType::new_dict_entry(&VariantType::STRING, &VariantType::VARIANT).unwrap().as_str(),
            "{sv}"
        );
        assert!(VariantType::new_dict_entry(&VariantType::VARIANT, &VariantType::STRING).is_err());
    }

    #[test]
    fn subtyping() {
        assert!(VariantType::STRING_ARRAY.is_subtype_of(&VariantType::ARRAY));
        assert!(VariantType::VARDICT.is_subtype_of(&VariantType::DICTIONARY));
        assert!(vt("(si)").is_subtype_of(&VariantType::TUPLE));
        assert!(VariantType::STRING.is_subtype_of(&VariantType::BASIC));
        assert!(VariantType::STRING.is_subtype_of(&VariantType::ANY));
        assert!(vt("(s(ii))").is_subtype_of(&vt("(s*)")));
        assert!(!VariantType::VARIANT.is_subtype_of(&VariantType::BASIC));
        assert!(!vt("(si)").is_subtype_of(&vt("(s)")));
        assert!(!vt("(s)").is_subtype_of(&vt("(si)")));
        assert!(!VariantType::STRING.is_subtype_of(&VariantType::INT32));
    }
}
