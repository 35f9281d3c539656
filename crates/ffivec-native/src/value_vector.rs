//! Containers of plain numeric values: `int32`, `uint32`, `long`, `double`.
//!
//! Storage is one contiguous `Vec<T>`. `getPointer` returns its data
//! address; callers read `getSize` values from there. These families have
//! no `copy` export.

#![allow(unsafe_code)]

use std::ffi::c_void;
use std::ptr;

use crate::alloc::try_alloc;
use crate::objects::raw_slice;
use crate::stats;
use crate::tracked::{Resource, Tracked};

pub(crate) fn new_empty<T>(label: &str) -> *mut c_void {
    log::debug!("stdvector_{label}: new empty");
    Tracked::publish(Vec::<T>::new(), Resource::Container)
}

pub(crate) fn new_sized<T: Default + Clone>(label: &str, len: usize) -> *mut c_void {
    let Some(mut values) = try_alloc::<T>(len, label) else {
        return ptr::null_mut();
    };
    values.resize(len, T::default());
    log::debug!("stdvector_{label}: new with {len} default values");
    Tracked::publish(values, Resource::Container)
}

/// # Safety
///
/// A non-null `data` must be valid for `len` reads.
pub(crate) unsafe fn new_from<T: Copy>(label: &str, data: *const T, len: usize) -> *mut c_void {
    let Some(src) = raw_slice(data, len) else {
        log::warn!("stdvector_{label}: null source with length {len}");
        return ptr::null_mut();
    };
    let Some(mut values) = try_alloc::<T>(len, label) else {
        return ptr::null_mut();
    };
    values.extend_from_slice(src);
    log::debug!("stdvector_{label}: new from {len} values");
    Tracked::publish(values, Resource::Container)
}

/// # Safety
///
/// `v` must be null or an owned `Vec<T>` container handle.
pub(crate) unsafe fn delete<T>(label: &str, v: *mut c_void) {
    if !v.is_null() {
        log::debug!("stdvector_{label}: delete");
    }
    Tracked::<Vec<T>>::release(v)
}

/// # Safety
///
/// `v` must be null or a live `Vec<T>` container handle.
pub(crate) unsafe fn pointer<T>(v: *const c_void) -> *mut c_void {
    stats::record_pointer_query();
    Tracked::<Vec<T>>::borrow(v).map_or(ptr::null_mut(), |v| v.as_ptr() as *mut c_void)
}

/// # Safety
///
/// `v` must be null or a live `Vec<T>` container handle.
pub(crate) unsafe fn size<T>(v: *const c_void) -> usize {
    Tracked::<Vec<T>>::borrow(v).map_or(0, Vec::len)
}

macro_rules! value_vector_exports {
    (
        $t:ty, $label:literal,
        $new1:ident, $new2:ident, $new3:ident, $delete:ident,
        $get_pointer:ident, $get_size:ident
    ) => {
        #[doc = concat!("Allocate an empty `", stringify!($t), "` container.")]
        #[no_mangle]
        pub extern "C" fn $new1() -> *mut c_void {
            ffi_guard_or!(ptr::null_mut(), { new_empty::<$t>($label) })
        }

        #[doc = concat!("Allocate a container of `len` zero `", stringify!($t), "` values.")]
        ///
        /// Returns null when the allocation is refused.
        #[no_mangle]
        pub extern "C" fn $new2(len: usize) -> *mut c_void {
            ffi_guard_or!(ptr::null_mut(), { new_sized::<$t>($label, len) })
        }

        /// Allocate a container holding a copy of `len` values at `data`.
        ///
        /// Returns null when `data` is null with a non-zero `len`, or the
        /// allocation is refused.
        ///
        /// # Safety
        ///
        /// A non-null `data` must be valid for `len` reads.
        #[no_mangle]
        pub unsafe extern "C" fn $new3(data: *const $t, len: usize) -> *mut c_void {
            ffi_guard_or!(ptr::null_mut(), { new_from($label, data, len) })
        }

        /// Free a container.
        ///
        /// # Safety
        ///
        /// `v` must be null or a container handle from this family that has
        /// not been deleted.
        #[no_mangle]
        pub unsafe extern "C" fn $delete(v: *mut c_void) {
            ffi_guard!({ delete::<$t>($label, v) })
        }

        /// Address of the first value; null for a null container.
        ///
        /// # Safety
        ///
        /// `v` must be null or a live container handle from this family.
        #[no_mangle]
        #[allow(non_snake_case)]
        pub unsafe extern "C" fn $get_pointer(v: *mut c_void) -> *mut c_void {
            ffi_guard_or!(ptr::null_mut(), { pointer::<$t>(v) })
        }

        /// Number of values in the container.
        ///
        /// # Safety
        ///
        /// `v` must be null or a live container handle from this family.
        #[no_mangle]
        #[allow(non_snake_case)]
        pub unsafe extern "C" fn $get_size(v: *mut c_void) -> usize {
            ffi_guard_or!(0, { size::<$t>(v) })
        }
    };
}

value_vector_exports!(
    i32, "int32",
    stdvector_int32_new1, stdvector_int32_new2, stdvector_int32_new3, stdvector_int32_delete,
    stdvector_int32_getPointer, stdvector_int32_getSize
);
value_vector_exports!(
    u32, "uint32",
    stdvector_uint32_new1, stdvector_uint32_new2, stdvector_uint32_new3, stdvector_uint32_delete,
    stdvector_uint32_getPointer, stdvector_uint32_getSize
);
value_vector_exports!(
    i64, "long",
    stdvector_long_new1, stdvector_long_new2, stdvector_long_new3, stdvector_long_delete,
    stdvector_long_getPointer, stdvector_long_getSize
);
value_vector_exports!(
    f64, "double",
    stdvector_double_new1, stdvector_double_new2, stdvector_double_new3, stdvector_double_delete,
    stdvector_double_getPointer, stdvector_double_getSize
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config, RuntimeConfig};
    use proptest::prelude::*;

    /// Read a container through its data address.
    unsafe fn contents<T: Copy>(
        v: *mut c_void,
        get_pointer: unsafe extern "C" fn(*mut c_void) -> *mut c_void,
        get_size: unsafe extern "C" fn(*mut c_void) -> usize,
    ) -> Vec<T> {
        let n = get_size(v);
        if n == 0 {
            return Vec::new();
        }
        std::slice::from_raw_parts(get_pointer(v) as *const T, n).to_vec()
    }

    #[test]
    fn new3_copies_the_source() {
        let src = [3, 1, 4, 1, 5];
        let v = unsafe { stdvector_int32_new3(src.as_ptr(), src.len()) };
        let out: Vec<i32> =
            unsafe { contents(v, stdvector_int32_getPointer, stdvector_int32_getSize) };
        unsafe { stdvector_int32_delete(v) };
        assert_eq!(out, src);
    }

    #[test]
    fn new2_zero_fills() {
        let v = stdvector_double_new2(4);
        let out: Vec<f64> =
            unsafe { contents(v, stdvector_double_getPointer, stdvector_double_getSize) };
        unsafe { stdvector_double_delete(v) };
        assert_eq!(out, [0.0; 4]);
    }

    #[test]
    fn pointer_is_data_address() {
        let src = [7u32, 8];
        let v = unsafe { stdvector_uint32_new3(src.as_ptr(), 2) };
        unsafe {
            let p = stdvector_uint32_getPointer(v) as *const u32;
            assert_eq!(*p.add(1), 8);
            stdvector_uint32_delete(v);
        }
    }

    #[test]
    fn pointer_query_is_counted() {
        let v = stdvector_int32_new2(1);
        let before = stats::snapshot();
        unsafe {
            stdvector_int32_getPointer(v);
            stdvector_int32_delete(v);
        }
        let after = stats::snapshot();
        assert_eq!(after.pointer_queries, before.pointer_queries + 1);
        assert_eq!(after.bulk_copies, before.bulk_copies);
    }

    #[test]
    fn empty_container_has_size_zero() {
        let v = stdvector_long_new1();
        unsafe {
            assert_eq!(stdvector_long_getSize(v), 0);
            stdvector_long_delete(v);
        }
    }

    #[test]
    fn null_source_with_length_is_refused() {
        assert!(unsafe { stdvector_int32_new3(ptr::null(), 2) }.is_null());
    }

    #[test]
    fn cap_refuses_large_containers() {
        let prev = config::install(RuntimeConfig::new(2));
        assert!(stdvector_int32_new2(3).is_null());
        let v = stdvector_int32_new2(2);
        assert!(!v.is_null());
        unsafe { stdvector_int32_delete(v) };
        config::install(prev);
    }

    #[test]
    fn delete_frees_exactly_once() {
        stats::reset();
        let v = stdvector_int32_new1();
        unsafe { stdvector_int32_delete(v) };
        let s = stats::snapshot();
        assert_eq!(s.containers_created, 1);
        assert_eq!(s.containers_freed, 1);
    }

    proptest! {
        #[test]
        fn long_containers_preserve_contents(values in prop::collection::vec(any::<i64>(), 0..64)) {
            let v = unsafe { stdvector_long_new3(values.as_ptr(), values.len()) };
            let out: Vec<i64> =
                unsafe { contents(v, stdvector_long_getPointer, stdvector_long_getSize) };
            unsafe { stdvector_long_delete(v) };
            prop_assert_eq!(out, values);
        }

        #[test]
        fn sized_containers_have_requested_length(len in 0usize..512) {
            let v = stdvector_uint32_new2(len);
            let n = unsafe { stdvector_uint32_getSize(v) };
            unsafe { stdvector_uint32_delete(v) };
            prop_assert_eq!(n, len);
        }
    }
}
