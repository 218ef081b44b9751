//! Conversions between Rust values and the toolkit's C representations.
//!
//! Strings passed in are duplicated into NUL-terminated buffers that live only
//! for the duration of the call. Strings returned by the toolkit are copied out
//! and never freed by the caller unless the binding site states otherwise.

use std::{
    ffi::{CStr, CString, c_char},
    ptr,
};

use crate::error::{BridgeError, BridgeResult};

/// Duplicates `s` into a C string.
pub fn to_c_string(s: &str) -> BridgeResult<CString> {
    CString::new(s).map_err(|err| BridgeError::InteriorNul {
        offset: err.nul_position(),
    })
}

/// Copies a borrowed C string. A null pointer is a `NullResult` for `what`.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string valid for reads.
pub unsafe fn string_from_ptr(ptr: *const c_char, what: &'static str) -> BridgeResult<String> {
    // SAFETY: forwarded caller contract
    unsafe { opt_string_from_ptr(ptr) }?.ok_or_else(|| BridgeError::null(what))
}

/// Copies a borrowed C string; a null pointer is `None`, an empty string is `""`.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string valid for reads.
pub unsafe fn opt_string_from_ptr(ptr: *const c_char) -> BridgeResult<Option<String>> {
    if ptr.is_null() {
        return Ok(None);
    }
    // SAFETY: non-null and NUL-terminated per the caller contract
    let s = unsafe { CStr::from_ptr(ptr) };
    s.to_str()
        .map(|s| Some(s.to_owned()))
        .map_err(|err| BridgeError::InvalidUtf8(err.to_string()))
}

/// Copies a null-terminated array of C strings.
///
/// # Safety
///
/// `ptr` must be null or point to an array of valid C strings terminated by a
/// null entry.
pub unsafe fn strv_to_vec(ptr: *const *const c_char, what: &'static str) -> BridgeResult<Vec<String>> {
    if ptr.is_null() {
        return Err(BridgeError::null(what));
    }
    let mut out = Vec::new();
    let mut cursor = ptr;
    loop {
        // SAFETY: the array is terminated by a null entry, so every read up to and
        // including the terminator is in bounds
        let item = unsafe { *cursor };
        if item.is_null() {
            break;
        }
        // SAFETY: entries before the terminator are valid C strings
        out.push(unsafe { string_from_ptr(item, what) }?);
        // SAFETY: the terminator has not been reached yet
        cursor = unsafe { cursor.add(1) };
    }
    Ok(out)
}

/// An owned, null-terminated `char**` built from Rust strings.
///
/// The pointer returned by [`as_ptr`](Self::as_ptr) stays valid for the life of
/// this value; pass it to functions that copy the array (`g_value_set_boxed`,
/// `gtk_application_set_accels_for_action`).
#[derive(Debug)]
pub struct NativeStrv {
    strings: Vec<CString>,
    ptrs: Vec<*const c_char>,
}

impl NativeStrv {
    pub fn new<S: AsRef<str>>(items: &[S]) -> BridgeResult<Self> {
        let strings = items
            .iter()
            .map(|s| to_c_string(s.as_ref()))
            .collect::<BridgeResult<Vec<_>>>()?;
        let ptrs = strings
            .iter()
            .map(|s| s.as_ptr())
            .chain(std::iter::once(ptr::null()))
            .collect();
        Ok(Self { strings, ptrs })
    }

    #[must_use]
    pub fn as_ptr(&self) -> *const *const c_char {
        self.ptrs.as_ptr()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn interior_nul_is_rejected() {
        assert_eq!(to_c_string("ab\0c").unwrap_err(), BridgeError::InteriorNul { offset: 2 });
    }

    #[test]
    fn null_string_is_null_result_but_empty_string_is_not() {
        // SAFETY: null is allowed
        let err = unsafe { string_from_ptr(ptr::null(), "name") }.unwrap_err();
        assert!(err.is_null_result());

        let empty = c"";
        // SAFETY: valid C string literal
        assert_eq!(unsafe { string_from_ptr(empty.as_ptr(), "name") }.unwrap(), "");
    }

    #[test]
    fn strv_survives_a_native_round_trip() {
        let strv = NativeStrv::new(&["<Control>q", "<Primary>w"]).unwrap();
        assert_eq!(strv.len(), 2);
        // SAFETY: `strv` owns a valid null-terminated array
        let back = unsafe { strv_to_vec(strv.as_ptr(), "accels") }.unwrap();
        assert_eq!(back, vec!["<Control>q".to_owned(), "<Primary>w".to_owned()]);
    }

    #[test]
    fn empty_strv_is_just_the_terminator() {
        let strv = NativeStrv::new::<&str>(&[]).unwrap();
        assert!(strv.is_empty());
        // SAFETY: `strv` owns a valid null-terminated array
        assert_eq!(unsafe { strv_to_vec(strv.as_ptr(), "accels") }.unwrap(), Vec::<String>::new());
    }
}
