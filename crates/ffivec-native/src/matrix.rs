//! Type-erased matrix objects.
//!
//! A matrix records its numeric kind, its current dimensions, and the
//! template shape it was created for; its data is a row-major byte buffer
//! of `rows * columns * kind.element_size()` bytes.

#![allow(unsafe_code)]

use std::ffi::c_void;
use std::ptr;

use ffivec_core::{MatrixElementType, TemplateShape};

use crate::alloc::try_alloc;
use crate::objects::raw_slice;
use crate::tracked::{Resource, Tracked};

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct NativeMatrix {
    pub(crate) kind: MatrixElementType,
    pub(crate) rows: usize,
    pub(crate) columns: usize,
    pub(crate) template: TemplateShape,
    pub(crate) data: Vec<u8>,
}

impl NativeMatrix {
    /// Zero-filled matrix of the template's fixed dimensions (dynamic
    /// dimensions start at zero).
    pub(crate) fn zeroed(kind: MatrixElementType, template: TemplateShape) -> Option<Self> {
        let rows = template.rows as usize;
        let columns = template.columns as usize;
        let len = byte_len(kind, rows, columns)?;
        let mut data = try_alloc::<u8>(len, "matrix")?;
        data.resize(len, 0);
        Some(Self {
            kind,
            rows,
            columns,
            template,
            data,
        })
    }

    /// Whether this matrix may be stored in a container bound to
    /// `kind` and `template`.
    pub(crate) fn fits(&self, kind: MatrixElementType, template: TemplateShape) -> bool {
        self.kind == kind && template.admits(self.rows, self.columns)
    }
}

fn byte_len(kind: MatrixElementType, rows: usize, columns: usize) -> Option<usize> {
    rows.checked_mul(columns)?.checked_mul(kind.element_size())
}

pub(crate) fn parse_kind(code: i32) -> Option<MatrixElementType> {
    let kind = MatrixElementType::from_code(code);
    if kind.is_none() {
        log::warn!("unknown matrix element code {code}");
    }
    kind
}

/// Allocate a zero-filled matrix shaped by its template.
///
/// Returns null for an unknown element code.
#[no_mangle]
pub extern "C" fn matrix_new(kind: i32, template_rows: u32, template_columns: u32) -> *mut c_void {
    ffi_guard_or!(ptr::null_mut(), {
        let template = TemplateShape::new(template_rows, template_columns);
        parse_kind(kind)
            .and_then(|kind| NativeMatrix::zeroed(kind, template))
            .map_or(ptr::null_mut(), |m| Tracked::publish(m, Resource::Object))
    })
}

/// Allocate a `rows x columns` matrix holding a copy of `len` bytes.
///
/// Returns null for an unknown element code, dimensions the template does
/// not admit, or `len` differing from `rows * columns * element size`.
///
/// # Safety
///
/// A non-null `data` must be valid for `len` reads.
#[no_mangle]
pub unsafe extern "C" fn matrix_new_with_data(
    kind: i32,
    template_rows: u32,
    template_columns: u32,
    rows: usize,
    columns: usize,
    data: *const u8,
    len: usize,
) -> *mut c_void {
    ffi_guard_or!(ptr::null_mut(), {
        let template = TemplateShape::new(template_rows, template_columns);
        let Some(kind) = parse_kind(kind) else {
            return ptr::null_mut();
        };
        if !template.admits(rows, columns) {
            log::warn!("matrix {rows}x{columns} does not fit template {template}");
            return ptr::null_mut();
        }
        if byte_len(kind, rows, columns) != Some(len) {
            log::warn!("matrix {rows}x{columns} of {kind}: {len} bytes supplied");
            return ptr::null_mut();
        }
        let Some(src) = raw_slice(data, len) else {
            return ptr::null_mut();
        };
        let Some(mut bytes) = try_alloc::<u8>(len, "matrix") else {
            return ptr::null_mut();
        };
        bytes.extend_from_slice(src);
        Tracked::publish(
            NativeMatrix {
                kind,
                rows,
                columns,
                template,
                data: bytes,
            },
            Resource::Object,
        )
    })
}

/// Release a matrix handle.
///
/// # Safety
///
/// `m` must be null or an owned matrix handle.
#[no_mangle]
pub unsafe extern "C" fn matrix_delete(m: *mut c_void) {
    ffi_guard!({ Tracked::<NativeMatrix>::release(m) })
}

/// Row count of `m`; zero for null.
///
/// # Safety
///
/// `m` must be null or a live matrix handle.
#[no_mangle]
pub unsafe extern "C" fn matrix_nr(m: *const c_void) -> usize {
    ffi_guard_or!(0, { Tracked::<NativeMatrix>::borrow(m).map_or(0, |m| m.rows) })
}

/// Column count of `m`; zero for null.
///
/// # Safety
///
/// `m` must be null or a live matrix handle.
#[no_mangle]
pub unsafe extern "C" fn matrix_nc(m: *const c_void) -> usize {
    ffi_guard_or!(0, { Tracked::<NativeMatrix>::borrow(m).map_or(0, |m| m.columns) })
}

/// Row-major element bytes of `m`, valid while `m` is alive.
///
/// # Safety
///
/// `m` must be null or a live matrix handle.
#[no_mangle]
pub unsafe extern "C" fn matrix_data(m: *const c_void) -> *const u8 {
    ffi_guard_or!(ptr::null(), {
        Tracked::<NativeMatrix>::borrow(m).map_or(ptr::null(), |m| m.data.as_ptr())
    })
}

/// Element code of `m`; `-1` for null.
///
/// # Safety
///
/// `m` must be null or a live matrix handle.
#[no_mangle]
pub unsafe extern "C" fn matrix_element_type(m: *const c_void) -> i32 {
    ffi_guard_or!(-1, {
        Tracked::<NativeMatrix>::borrow(m).map_or(-1, |m| m.kind.code())
    })
}
