//! Containers of fixed-layout structs: `point`, `dpoint`, `rectangle`.
//!
//! `new3` takes standalone struct handles and stores clones, so the caller
//! keeps ownership of (and must free) its handles. `copy` lends the address
//! of each stored element; those addresses stay valid until the container
//! is deleted and must never be passed to `*_delete`.

#![allow(unsafe_code)]

use std::ffi::c_void;
use std::ptr;

use crate::alloc::try_alloc;
use crate::objects::raw_slice;
use crate::stats;
use crate::tracked::{Resource, Tracked};
use crate::types::{NativeDPoint, NativePoint, NativeRectangle};

/// Owns its elements; dropping the container frees all of them.
#[derive(Debug)]
pub(crate) struct StructVec<T>(Vec<T>);

impl<T> StructVec<T> {
    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}

impl<T> Default for StructVec<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> Drop for StructVec<T> {
    fn drop(&mut self) {
        stats::record_struct_elements_freed(self.0.len());
    }
}

pub(crate) fn new_empty<T>(label: &str) -> *mut c_void {
    log::debug!("stdvector_{label}: new empty");
    Tracked::publish(StructVec::<T>::default(), Resource::Container)
}

pub(crate) fn new_sized<T: Default + Clone>(label: &str, len: usize) -> *mut c_void {
    let Some(mut elements) = try_alloc::<T>(len, label) else {
        return ptr::null_mut();
    };
    elements.resize(len, T::default());
    log::debug!("stdvector_{label}: new with {len} default elements");
    Tracked::publish(StructVec(elements), Resource::Container)
}

/// # Safety
///
/// A non-null `handles` must be valid for `len` reads, and each entry must
/// be null or a live `T` handle.
pub(crate) unsafe fn new_from<T: Copy>(
    label: &str,
    handles: *const *mut c_void,
    len: usize,
) -> *mut c_void {
    let Some(src) = raw_slice(handles, len) else {
        log::warn!("stdvector_{label}: null handle array with length {len}");
        return ptr::null_mut();
    };
    let Some(mut elements) = try_alloc::<T>(len, label) else {
        return ptr::null_mut();
    };
    for (i, &h) in src.iter().enumerate() {
        match Tracked::<T>::borrow(h) {
            Some(value) => elements.push(*value),
            None => {
                log::warn!("stdvector_{label}: null element handle at {i}");
                return ptr::null_mut();
            }
        }
    }
    log::debug!("stdvector_{label}: new from {len} elements");
    Tracked::publish(StructVec(elements), Resource::Container)
}

/// # Safety
///
/// `v` must be null or an owned `StructVec<T>` container handle.
pub(crate) unsafe fn delete<T>(label: &str, v: *mut c_void) {
    if !v.is_null() {
        log::debug!("stdvector_{label}: delete");
    }
    Tracked::<StructVec<T>>::release(v)
}

/// # Safety
///
/// `v` must be null or a live `StructVec<T>` container handle.
pub(crate) unsafe fn pointer<T>(v: *const c_void) -> *mut c_void {
    stats::record_pointer_query();
    Tracked::<StructVec<T>>::borrow(v).map_or(ptr::null_mut(), |v| v.0.as_ptr() as *mut c_void)
}

/// # Safety
///
/// `v` must be null or a live `StructVec<T>` container handle.
pub(crate) unsafe fn size<T>(v: *const c_void) -> usize {
    Tracked::<StructVec<T>>::borrow(v).map_or(0, StructVec::len)
}

/// # Safety
///
/// `v` must be null or a live `StructVec<T>` container handle; a non-null
/// `dst` must be valid for `size(v)` writes.
pub(crate) unsafe fn copy<T>(v: *const c_void, dst: *mut *mut c_void) {
    stats::record_bulk_copy();
    if let (Some(elements), false) = (Tracked::<StructVec<T>>::borrow(v), dst.is_null()) {
        for (i, e) in elements.0.iter().enumerate() {
            dst.add(i).write(e as *const T as *mut c_void);
        }
    }
}

macro_rules! struct_vector_exports {
    (
        $t:ty, $label:literal,
        $new1:ident, $new2:ident, $new3:ident, $delete:ident,
        $get_pointer:ident, $get_size:ident, $copy:ident
    ) => {
        #[doc = concat!("Allocate an empty `", $label, "` container.")]
        #[no_mangle]
        pub extern "C" fn $new1() -> *mut c_void {
            ffi_guard_or!(ptr::null_mut(), { new_empty::<$t>($label) })
        }

        #[doc = concat!("Allocate a container of `len` zeroed `", $label, "` elements.")]
        ///
        /// Returns null when the allocation is refused.
        #[no_mangle]
        pub extern "C" fn $new2(len: usize) -> *mut c_void {
            ffi_guard_or!(ptr::null_mut(), { new_sized::<$t>($label, len) })
        }

        /// Allocate a container holding clones of `len` element handles.
        ///
        /// Returns null if any handle is null or the allocation is refused.
        /// The caller still owns the handles it passed.
        ///
        /// # Safety
        ///
        /// A non-null `handles` must be valid for `len` reads, and every
        /// entry must be null or a live element handle of this type.
        #[no_mangle]
        pub unsafe extern "C" fn $new3(handles: *const *mut c_void, len: usize) -> *mut c_void {
            ffi_guard_or!(ptr::null_mut(), { new_from::<$t>($label, handles, len) })
        }

        /// Free a container and every element it holds.
        ///
        /// # Safety
        ///
        /// `v` must be null or a container handle from this family that has
        /// not been deleted.
        #[no_mangle]
        pub unsafe extern "C" fn $delete(v: *mut c_void) {
            ffi_guard!({ delete::<$t>($label, v) })
        }

        /// Address of the contiguous element storage.
        ///
        /// # Safety
        ///
        /// `v` must be null or a live container handle from this family.
        #[no_mangle]
        #[allow(non_snake_case)]
        pub unsafe extern "C" fn $get_pointer(v: *mut c_void) -> *mut c_void {
            ffi_guard_or!(ptr::null_mut(), { pointer::<$t>(v) })
        }

        /// Number of elements in the container.
        ///
        /// # Safety
        ///
        /// `v` must be null or a live container handle from this family.
        #[no_mangle]
        #[allow(non_snake_case)]
        pub unsafe extern "C" fn $get_size(v: *mut c_void) -> usize {
            ffi_guard_or!(0, { size::<$t>(v) })
        }

        /// Write the borrowed address of every element into `dst`.
        ///
        /// # Safety
        ///
        /// `v` must be null or a live container handle from this family;
        /// a non-null `dst` must be valid for `getSize(v)` writes.
        #[no_mangle]
        pub unsafe extern "C" fn $copy(v: *mut c_void, dst: *mut *mut c_void) {
            ffi_guard!({ copy::<$t>(v, dst) })
        }
    };
}

struct_vector_exports!(
    NativePoint, "point",
    stdvector_point_new1, stdvector_point_new2, stdvector_point_new3, stdvector_point_delete,
    stdvector_point_getPointer, stdvector_point_getSize, stdvector_point_copy
);
struct_vector_exports!(
    NativeDPoint, "dpoint",
    stdvector_dpoint_new1, stdvector_dpoint_new2, stdvector_dpoint_new3, stdvector_dpoint_delete,
    stdvector_dpoint_getPointer, stdvector_dpoint_getSize, stdvector_dpoint_copy
);
struct_vector_exports!(
    NativeRectangle, "rectangle",
    stdvector_rectangle_new1, stdvector_rectangle_new2, stdvector_rectangle_new3,
    stdvector_rectangle_delete, stdvector_rectangle_getPointer, stdvector_rectangle_getSize,
    stdvector_rectangle_copy
);
