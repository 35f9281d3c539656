//! An owned or borrowed foreign element handle.

#![allow(unsafe_code)]

use std::ffi::c_void;
use std::fmt;

use ffivec_core::{ForeignHandle, Ownership, StdVectorError};

/// Release function for one foreign element family.
pub type Release = unsafe extern "C" fn(*mut c_void);

/// A foreign element handle plus the flag saying who frees it.
///
/// Dropping an [`Ownership::Owned`] object calls its release function
/// exactly once; dropping a borrowed one does nothing.
pub struct NativeObject {
    handle: ForeignHandle,
    ownership: Ownership,
    release: Release,
}

impl NativeObject {
    /// Wrap a handle with explicit ownership.
    ///
    /// # Safety
    ///
    /// `handle` must be live. If `ownership` is owned, the caller transfers
    /// one reference that `release` frees.
    pub unsafe fn from_raw(handle: ForeignHandle, ownership: Ownership, release: Release) -> Self {
        Self {
            handle,
            ownership,
            release,
        }
    }

    /// Wrap the result of a foreign constructor, or `None` if it returned
    /// null.
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must be a fresh reference that `release` frees.
    pub unsafe fn owned(ptr: *mut c_void, release: Release) -> Option<Self> {
        ForeignHandle::new(ptr).map(|handle| Self::from_raw(handle, Ownership::Owned, release))
    }

    /// The wrapped handle.
    pub fn handle(&self) -> ForeignHandle {
        self.handle
    }

    /// Whether this object frees its handle on drop.
    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    pub(crate) fn ptr(&self) -> *mut c_void {
        self.handle.as_ptr()
    }
}

impl Drop for NativeObject {
    fn drop(&mut self) {
        if self.ownership.owns() {
            // SAFETY: an owned object holds exactly one reference, released
            // here and nowhere else.
            unsafe {
                (self.release)(self.handle.as_ptr())
            }
        }
    }
}

impl fmt::Debug for NativeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeObject")
            .field("handle", &self.handle)
            .field("ownership", &self.ownership)
            .finish()
    }
}

/// Implement [`Element`](crate::Element) for a wrapper whose only field
/// is `object: NativeObject`, releasing with `$release`.
macro_rules! handle_element {
    ($t:ty, $release:path) => {
        impl $crate::element::Element for $t {
            fn descriptor() -> ::ffivec_core::TypeDescriptor {
                ::ffivec_core::TypeDescriptor::of::<$t>()
            }

            fn foreign_handle(&self) -> Option<::ffivec_core::ForeignHandle> {
                Some(self.object.handle())
            }

            unsafe fn from_foreign(
                handle: ::ffivec_core::ForeignHandle,
                ownership: ::ffivec_core::Ownership,
                _shape: ::ffivec_core::TemplateShape,
            ) -> Result<Self, ::ffivec_core::StdVectorError> {
                Ok(Self {
                    object: $crate::object::NativeObject::from_raw(handle, ownership, $release),
                })
            }
        }
    };
}

/// Wrap a constructor result, reporting null as an allocation failure of
/// `family`.
pub(crate) fn allocated(
    ptr: *mut c_void,
    release: Release,
    family: &'static str,
) -> Result<NativeObject, StdVectorError> {
    // SAFETY: `ptr` comes straight from the family's constructor.
    unsafe { NativeObject::owned(ptr, release) }.ok_or(StdVectorError::ForeignAllocation {
        element: family,
        operation: "new",
    })
}

/// Out-parameter getter of one foreign object family.
pub(crate) type OutGetter<N> = unsafe extern "C" fn(*const c_void, *mut N) -> bool;

/// Read one out-parameter field of `object`, or `N::default()` when the
/// foreign side reports nothing.
pub(crate) fn read_out<N: Default>(object: &NativeObject, get: OutGetter<N>) -> N {
    let mut out = N::default();
    // SAFETY: the handle is live for the borrow of `object`.
    unsafe { get(object.ptr(), &mut out) };
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffivec_native::objects::{point_delete, point_new};
    use ffivec_native::stats;

    #[test]
    fn owned_releases_once() {
        stats::reset();
        let obj = unsafe { NativeObject::owned(point_new(1, 2), point_delete) }.unwrap();
        assert!(obj.ownership().owns());
        drop(obj);
        assert_eq!(stats::snapshot().objects_freed, 1);
    }

    #[test]
    fn borrowed_releases_nothing() {
        stats::reset();
        let raw = point_new(1, 2);
        let handle = ForeignHandle::new(raw).unwrap();
        let obj = unsafe { NativeObject::from_raw(handle, Ownership::Borrowed, point_delete) };
        drop(obj);
        assert_eq!(stats::snapshot().objects_freed, 0);
        unsafe { point_delete(raw) };
        assert_eq!(stats::snapshot().objects_freed, 1);
    }

    #[test]
    fn null_constructor_result_is_none() {
        assert!(unsafe { NativeObject::owned(std::ptr::null_mut(), point_delete) }.is_none());
    }
}
