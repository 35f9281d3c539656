//! Foreign byte strings.

#![allow(unsafe_code)]

use std::borrow::Cow;
use std::fmt;

use ffivec_core::StdVectorError;
use ffivec_native::objects as native;

use crate::object::{allocated, NativeObject};

/// A byte string held by the foreign side.
///
/// The content is not required to be UTF-8.
pub struct StdString {
    object: NativeObject,
}

impl StdString {
    /// Copy `content` into a new foreign string.
    pub fn new(content: impl AsRef<[u8]>) -> Result<Self, StdVectorError> {
        let bytes = content.as_ref();
        // SAFETY: `bytes` is valid for `bytes.len()` reads.
        let ptr = unsafe { native::stdstring_new(bytes.as_ptr(), bytes.len()) };
        allocated(ptr, native::stdstring_delete, "stdstring").map(|object| Self { object })
    }

    fn from_object(object: NativeObject) -> Self {
        Self { object }
    }

    /// The string's bytes, without a terminator.
    pub fn as_bytes(&self) -> &[u8] {
        let ptr = self.object.ptr();
        // SAFETY: the handle stays live for `&self`; the foreign side
        // reports the length of the buffer `c_str` points at.
        unsafe {
            let data = native::stdstring_c_str(ptr) as *const u8;
            if data.is_null() {
                return &[];
            }
            std::slice::from_raw_parts(data, native::stdstring_size(ptr))
        }
    }

    /// The content as UTF-8, replacing invalid sequences.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Whether the string is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Take a fresh string reference returned by a foreign getter and copy it
/// out. A null result reads as the empty string.
pub(crate) fn owned_string(ptr: *mut std::ffi::c_void, family: &'static str) -> String {
    allocated(ptr, native::stdstring_delete, family)
        .map(|o| StdString::from_object(o).to_string_lossy().into_owned())
        .unwrap_or_default()
}

handle_element!(StdString, native::stdstring_delete);

impl PartialEq for StdString {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for StdString {}

impl fmt::Debug for StdString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StdString")
            .field(&self.to_string_lossy())
            .finish()
    }
}

impl fmt::Display for StdString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;

    #[test]
    fn content_round_trip() {
        let s = StdString::new("hello").unwrap();
        assert_eq!(s.as_bytes(), b"hello");
        assert_eq!(s.len(), 5);
        assert_eq!(s.to_string(), "hello");
    }

    #[test]
    fn empty_string() {
        let s = StdString::new("").unwrap();
        assert!(s.is_empty());
    }

    #[test]
    fn non_utf8_is_lossy() {
        let s = StdString::new([0x66, 0xff, 0x6f]).unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(s.to_string_lossy(), "f\u{fffd}o");
    }

    #[test]
    fn equality_compares_content() {
        let a = StdString::new("x").unwrap();
        let b = StdString::new("x").unwrap();
        assert_eq!(a, b);
        assert_ne!(a.foreign_handle(), b.foreign_handle());
    }
}
