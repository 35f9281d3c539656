//! Containers of matrices, bound to one element kind and template shape.
//!
//! Every call repeats the `(kind, template_rows, template_columns)` binding
//! the container was created with; a mismatch is logged and treated like a
//! null container. Slots may be empty: `new2` creates `len` empty slots,
//! and `copy` writes null for each of them.

#![allow(unsafe_code)]

use std::ffi::c_void;
use std::ptr;
use std::sync::Arc;

use ffivec_core::{MatrixElementType, TemplateShape};

use crate::alloc::try_alloc;
use crate::matrix::{parse_kind, NativeMatrix};
use crate::objects::raw_slice;
use crate::stats;
use crate::tracked::{Resource, Tracked};

pub(crate) struct MatrixVec {
    kind: MatrixElementType,
    template: TemplateShape,
    slots: Slots,
}

fn binding(kind: i32, rows: u32, columns: u32) -> Option<(MatrixElementType, TemplateShape)> {
    Some((parse_kind(kind)?, TemplateShape::new(rows, columns)))
}

/// Borrow the container behind `v` if its binding matches.
///
/// # Safety
///
/// `v` must be null or a live matrix container handle.
unsafe fn bound<'a>(
    kind: i32,
    rows: u32,
    columns: u32,
    v: *const c_void,
) -> Option<&'a MatrixVec> {
    let container = Tracked::<MatrixVec>::borrow(v)?;
    let expected = (container.kind, container.template);
    if binding(kind, rows, columns) != Some(expected) {
        log::error!(
            "stdvector_matrix: container bound to {} {} used as code {kind} {rows}x{columns}",
            expected.0,
            expected.1
        );
        return None;
    }
    Some(container)
}

type Slots = Vec<Option<Arc<Tracked<NativeMatrix>>>>;

fn publish(kind: MatrixElementType, template: TemplateShape, slots: Slots) -> *mut c_void {
    log::debug!(
        "stdvector_matrix: new {kind} {template} with {} slots",
        slots.len()
    );
    Tracked::publish(
        MatrixVec {
            kind,
            template,
            slots,
        },
        Resource::Container,
    )
}

/// Allocate an empty matrix container.
#[no_mangle]
pub extern "C" fn stdvector_matrix_new1(
    kind: i32,
    template_rows: u32,
    template_columns: u32,
) -> *mut c_void {
    ffi_guard_or!(ptr::null_mut(), {
        binding(kind, template_rows, template_columns)
            .map_or(ptr::null_mut(), |(kind, template)| publish(kind, template, Vec::new()))
    })
}

/// Allocate a matrix container of `len` empty slots.
#[no_mangle]
pub extern "C" fn stdvector_matrix_new2(
    kind: i32,
    template_rows: u32,
    template_columns: u32,
    len: usize,
) -> *mut c_void {
    ffi_guard_or!(ptr::null_mut(), {
        let Some((kind, template)) = binding(kind, template_rows, template_columns) else {
            return ptr::null_mut();
        };
        let Some(mut slots) = try_alloc(len, "matrix") else {
            return ptr::null_mut();
        };
        slots.resize_with(len, || None);
        publish(kind, template, slots)
    })
}

/// Allocate a matrix container sharing `len` matrix handles.
///
/// Returns null if any handle is null, a matrix has the wrong element kind
/// or does not fit the template, or the allocation is refused.
///
/// # Safety
///
/// A non-null `handles` must be valid for `len` reads, and every entry must
/// be null or a live matrix handle.
#[no_mangle]
pub unsafe extern "C" fn stdvector_matrix_new3(
    kind: i32,
    template_rows: u32,
    template_columns: u32,
    handles: *const *mut c_void,
    len: usize,
) -> *mut c_void {
    ffi_guard_or!(ptr::null_mut(), {
        let Some((kind, template)) = binding(kind, template_rows, template_columns) else {
            return ptr::null_mut();
        };
        let Some(src) = raw_slice(handles, len) else {
            return ptr::null_mut();
        };
        let Some(mut slots) = try_alloc(len, "matrix") else {
            return ptr::null_mut();
        };
        for (i, &h) in src.iter().enumerate() {
            let Some(m) = Tracked::<NativeMatrix>::retain(h) else {
                log::warn!("stdvector_matrix: null element handle at {i}");
                return ptr::null_mut();
            };
            if !m.fits(kind, template) {
                log::warn!(
                    "stdvector_matrix: element {i} is {} {}x{}, container is {kind} {template}",
                    m.kind,
                    m.rows,
                    m.columns
                );
                return ptr::null_mut();
            }
            slots.push(Some(m));
        }
        publish(kind, template, slots)
    })
}

/// Free a matrix container, releasing its references to its matrices.
///
/// # Safety
///
/// `v` must be null or a matrix container handle that has not been deleted.
#[no_mangle]
pub unsafe extern "C" fn stdvector_matrix_delete(
    kind: i32,
    template_rows: u32,
    template_columns: u32,
    v: *mut c_void,
) {
    ffi_guard!({
        if v.is_null() {
            return;
        }
        if bound(kind, template_rows, template_columns, v).is_none() {
            log::warn!("stdvector_matrix: deleting despite binding mismatch");
        }
        log::debug!("stdvector_matrix: delete");
        Tracked::<MatrixVec>::release(v)
    })
}

/// Address of the container's slot storage.
///
/// # Safety
///
/// `v` must be null or a live matrix container handle.
#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "C" fn stdvector_matrix_getPointer(
    kind: i32,
    template_rows: u32,
    template_columns: u32,
    v: *mut c_void,
) -> *mut c_void {
    ffi_guard_or!(ptr::null_mut(), {
        stats::record_pointer_query();
        bound(kind, template_rows, template_columns, v)
            .map_or(ptr::null_mut(), |c| c.slots.as_ptr() as *mut c_void)
    })
}

/// Number of slots in the container.
///
/// # Safety
///
/// `v` must be null or a live matrix container handle.
#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "C" fn stdvector_matrix_getSize(
    kind: i32,
    template_rows: u32,
    template_columns: u32,
    v: *mut c_void,
) -> usize {
    ffi_guard_or!(0, {
        bound(kind, template_rows, template_columns, v).map_or(0, |c| c.slots.len())
    })
}

/// Write one owned matrix reference per slot into `dst`, null for empty
/// slots.
///
/// # Safety
///
/// `v` must be null or a live matrix container handle; a non-null `dst`
/// must be valid for `getSize` writes.
#[no_mangle]
pub unsafe extern "C" fn stdvector_matrix_copy(
    kind: i32,
    template_rows: u32,
    template_columns: u32,
    v: *mut c_void,
    dst: *mut *mut c_void,
) {
    ffi_guard!({
        stats::record_bulk_copy();
        if dst.is_null() {
            return;
        }
        if let Some(c) = bound(kind, template_rows, template_columns, v) {
            for (i, slot) in c.slots.iter().enumerate() {
                let h = slot.as_ref().map_or(ptr::null_mut(), Tracked::share);
                dst.add(i).write(h);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{matrix_delete, matrix_nr, matrix_new};

    const F64: i32 = 7;

    #[test]
    fn new2_slots_copy_as_null() {
        let v = stdvector_matrix_new2(F64, 0, 0, 3);
        let mut out = [ptr::NonNull::<c_void>::dangling().as_ptr(); 3];
        unsafe {
            assert_eq!(stdvector_matrix_getSize(F64, 0, 0, v), 3);
            stdvector_matrix_copy(F64, 0, 0, v, out.as_mut_ptr());
            stdvector_matrix_delete(F64, 0, 0, v);
        }
        assert!(out.iter().all(|h| h.is_null()));
    }

    #[test]
    fn new3_shares_matrices() {
        stats::reset();
        let m = matrix_new(F64, 2, 2);
        let v = unsafe { stdvector_matrix_new3(F64, 0, 0, [m].as_ptr(), 1) };
        unsafe { matrix_delete(m) };
        assert_eq!(stats::snapshot().objects_freed, 0);

        let mut out = [ptr::null_mut(); 1];
        unsafe {
            stdvector_matrix_copy(F64, 0, 0, v, out.as_mut_ptr());
            stdvector_matrix_delete(F64, 0, 0, v);
            assert_eq!(matrix_nr(out[0]), 2);
            matrix_delete(out[0]);
        }
        assert_eq!(stats::snapshot().objects_freed, 1);
    }

    #[test]
    fn new3_rejects_wrong_kind_and_shape() {
        let float = matrix_new(MatrixElementType::Float.code(), 0, 0);
        let wide = matrix_new(F64, 1, 3);
        unsafe {
            assert!(stdvector_matrix_new3(F64, 0, 0, [float].as_ptr(), 1).is_null());
            assert!(stdvector_matrix_new3(F64, 0, 1, [wide].as_ptr(), 1).is_null());
            matrix_delete(float);
            matrix_delete(wide);
        }
    }

    #[test]
    fn mismatched_binding_reads_as_null() {
        let v = stdvector_matrix_new2(F64, 0, 0, 2);
        unsafe {
            assert_eq!(stdvector_matrix_getSize(F64, 3, 1, v), 0);
            assert!(stdvector_matrix_getPointer(6, 0, 0, v).is_null());
            stdvector_matrix_delete(F64, 0, 0, v);
        }
    }

    #[test]
    fn unknown_code_is_refused() {
        assert!(stdvector_matrix_new1(99, 0, 0).is_null());
    }
}
