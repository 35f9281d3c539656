//! Feature-extraction objects: column vectors, chip details, SURF points,
//! and detector window details.

#![allow(unsafe_code)]

use std::ffi::c_void;
use std::ptr;

use crate::objects::{field, publish, publish_string, raw_slice, write_field};
use crate::tracked::Tracked;
use crate::types::{NativeDPoint, NativeRectangle};

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct NativeColumnVector {
    pub(crate) values: Vec<f64>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct NativeChipDetails {
    pub(crate) rect: NativeRectangle,
    pub(crate) angle: f64,
    pub(crate) rows: u64,
    pub(crate) cols: u64,
}

/// Length of a SURF descriptor.
pub const SURF_DESCRIPTOR_LEN: usize = 64;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct NativeSurfPoint {
    pub(crate) center: NativeDPoint,
    pub(crate) scale: f64,
    pub(crate) score: f64,
    pub(crate) laplacian: f64,
    pub(crate) angle: f64,
    pub(crate) descriptor: [f64; SURF_DESCRIPTOR_LEN],
}

impl Default for NativeSurfPoint {
    fn default() -> Self {
        Self {
            center: NativeDPoint::default(),
            scale: 0.0,
            score: 0.0,
            laplacian: 0.0,
            angle: 0.0,
            descriptor: [0.0; SURF_DESCRIPTOR_LEN],
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct NativeDetectorWindowDetails {
    pub(crate) width: u64,
    pub(crate) height: u64,
    pub(crate) label: Vec<u8>,
}

// ── column vector ─────────────────────────────────────────────────

/// Allocate a column vector holding a copy of `len` values at `data`.
///
/// Returns null if `data` is null and `len > 0`.
///
/// # Safety
///
/// A non-null `data` must be valid for `len` reads.
#[no_mangle]
pub unsafe extern "C" fn vector_double_new(data: *const f64, len: usize) -> *mut c_void {
    ffi_guard_or!(ptr::null_mut(), {
        match raw_slice(data, len) {
            Some(values) => publish(NativeColumnVector {
                values: values.to_vec(),
            }),
            None => ptr::null_mut(),
        }
    })
}

/// Number of rows of `v`.
///
/// # Safety
///
/// `v` must be null or a live column vector handle.
#[no_mangle]
pub unsafe extern "C" fn vector_double_nr(v: *const c_void) -> usize {
    ffi_guard_or!(0, { field(v, |v: &NativeColumnVector| v.values.len()) })
}

/// Address of the first value of `v`, valid while `v` is alive.
///
/// # Safety
///
/// `v` must be null or a live column vector handle.
#[no_mangle]
pub unsafe extern "C" fn vector_double_data(v: *const c_void) -> *const f64 {
    ffi_guard_or!(ptr::null(), {
        Tracked::<NativeColumnVector>::borrow(v).map_or(ptr::null(), |v| v.values.as_ptr())
    })
}

/// Release a column vector handle.
///
/// # Safety
///
/// `v` must be null or an owned column vector handle.
#[no_mangle]
pub unsafe extern "C" fn vector_double_delete(v: *mut c_void) {
    ffi_guard!({ Tracked::<NativeColumnVector>::release(v) })
}

// ── chip details ──────────────────────────────────────────────────

/// Allocate chip details for a `rows x cols` chip cut from `rect`, rotated
/// by `angle` radians.
#[no_mangle]
pub extern "C" fn chip_details_new(
    rect: NativeRectangle,
    angle: f64,
    rows: u64,
    cols: u64,
) -> *mut c_void {
    ffi_guard_or!(ptr::null_mut(), {
        publish(NativeChipDetails {
            rect,
            angle,
            rows,
            cols,
        })
    })
}

/// Copy the source rectangle of `c` into `out`.
///
/// # Safety
///
/// `c` must be null or a live chip details handle; `out` null or writable.
#[no_mangle]
pub unsafe extern "C" fn chip_details_get_rect(c: *const c_void, out: *mut NativeRectangle) -> bool {
    ffi_guard_or!(false, {
        write_field(c, out, |c: &NativeChipDetails| Some(c.rect))
    })
}

/// Rotation of `c` in radians.
///
/// # Safety
///
/// `c` must be null or a live chip details handle.
#[no_mangle]
pub unsafe extern "C" fn chip_details_angle(c: *const c_void) -> f64 {
    ffi_guard_or!(0.0, { field(c, |c: &NativeChipDetails| c.angle) })
}

/// Output rows of `c`.
///
/// # Safety
///
/// `c` must be null or a live chip details handle.
#[no_mangle]
pub unsafe extern "C" fn chip_details_rows(c: *const c_void) -> u64 {
    ffi_guard_or!(0, { field(c, |c: &NativeChipDetails| c.rows) })
}

/// Output columns of `c`.
///
/// # Safety
///
/// `c` must be null or a live chip details handle.
#[no_mangle]
pub unsafe extern "C" fn chip_details_cols(c: *const c_void) -> u64 {
    ffi_guard_or!(0, { field(c, |c: &NativeChipDetails| c.cols) })
}

/// Release a chip details handle.
///
/// # Safety
///
/// `c` must be null or an owned chip details handle.
#[no_mangle]
pub unsafe extern "C" fn chip_details_delete(c: *mut c_void) {
    ffi_guard!({ Tracked::<NativeChipDetails>::release(c) })
}

// ── surf point ────────────────────────────────────────────────────

/// Allocate a SURF point.
///
/// `descriptor` must hold exactly [`SURF_DESCRIPTOR_LEN`] values; any
/// other length, or a null `descriptor`, returns null.
///
/// # Safety
///
/// A non-null `descriptor` must be valid for `descriptor_len` reads.
#[no_mangle]
pub unsafe extern "C" fn surf_point_new(
    center: NativeDPoint,
    scale: f64,
    score: f64,
    laplacian: f64,
    angle: f64,
    descriptor: *const f64,
    descriptor_len: usize,
) -> *mut c_void {
    ffi_guard_or!(ptr::null_mut(), {
        let Some(des) = raw_slice(descriptor, descriptor_len) else {
            return ptr::null_mut();
        };
        let Ok(descriptor) = <[f64; SURF_DESCRIPTOR_LEN]>::try_from(des) else {
            log::warn!("surf_point: descriptor of {descriptor_len} values refused");
            return ptr::null_mut();
        };
        publish(NativeSurfPoint {
            center,
            scale,
            score,
            laplacian,
            angle,
            descriptor,
        })
    })
}

/// Copy the centre of `p` into `out`.
///
/// # Safety
///
/// `p` must be null or a live SURF point handle; `out` null or writable.
#[no_mangle]
pub unsafe extern "C" fn surf_point_get_center(p: *const c_void, out: *mut NativeDPoint) -> bool {
    ffi_guard_or!(false, {
        write_field(p, out, |p: &NativeSurfPoint| Some(p.center))
    })
}

/// Detection scale of `p`.
///
/// # Safety
///
/// `p` must be null or a live SURF point handle.
#[no_mangle]
pub unsafe extern "C" fn surf_point_scale(p: *const c_void) -> f64 {
    ffi_guard_or!(0.0, { field(p, |p: &NativeSurfPoint| p.scale) })
}

/// Detector response of `p`.
///
/// # Safety
///
/// `p` must be null or a live SURF point handle.
#[no_mangle]
pub unsafe extern "C" fn surf_point_score(p: *const c_void) -> f64 {
    ffi_guard_or!(0.0, { field(p, |p: &NativeSurfPoint| p.score) })
}

/// Sign of the Laplacian at `p`.
///
/// # Safety
///
/// `p` must be null or a live SURF point handle.
#[no_mangle]
pub unsafe extern "C" fn surf_point_laplacian(p: *const c_void) -> f64 {
    ffi_guard_or!(0.0, { field(p, |p: &NativeSurfPoint| p.laplacian) })
}

/// Orientation of `p` in radians.
///
/// # Safety
///
/// `p` must be null or a live SURF point handle.
#[no_mangle]
pub unsafe extern "C" fn surf_point_angle(p: *const c_void) -> f64 {
    ffi_guard_or!(0.0, { field(p, |p: &NativeSurfPoint| p.angle) })
}

/// Address of the [`SURF_DESCRIPTOR_LEN`] descriptor values of `p`.
///
/// # Safety
///
/// `p` must be null or a live SURF point handle.
#[no_mangle]
pub unsafe extern "C" fn surf_point_descriptor(p: *const c_void) -> *const f64 {
    ffi_guard_or!(ptr::null(), {
        Tracked::<NativeSurfPoint>::borrow(p).map_or(ptr::null(), |p| p.descriptor.as_ptr())
    })
}

/// Release a SURF point handle.
///
/// # Safety
///
/// `p` must be null or an owned SURF point handle.
#[no_mangle]
pub unsafe extern "C" fn surf_point_delete(p: *mut c_void) {
    ffi_guard!({ Tracked::<NativeSurfPoint>::release(p) })
}

// ── detector window details ───────────────────────────────────────

/// Allocate detector window details. The label is copied.
///
/// # Safety
///
/// A non-null `label` must be valid for `label_len` reads.
#[no_mangle]
pub unsafe extern "C" fn detector_window_details_new(
    width: u64,
    height: u64,
    label: *const u8,
    label_len: usize,
) -> *mut c_void {
    ffi_guard_or!(ptr::null_mut(), {
        let Some(label) = raw_slice(label, label_len) else {
            return ptr::null_mut();
        };
        publish(NativeDetectorWindowDetails {
            width,
            height,
            label: label.to_vec(),
        })
    })
}

/// Window width of `d`.
///
/// # Safety
///
/// `d` must be null or a live detector window details handle.
#[no_mangle]
pub unsafe extern "C" fn detector_window_details_width(d: *const c_void) -> u64 {
    ffi_guard_or!(0, { field(d, |d: &NativeDetectorWindowDetails| d.width) })
}

/// Window height of `d`.
///
/// # Safety
///
/// `d` must be null or a live detector window details handle.
#[no_mangle]
pub unsafe extern "C" fn detector_window_details_height(d: *const c_void) -> u64 {
    ffi_guard_or!(0, { field(d, |d: &NativeDetectorWindowDetails| d.height) })
}

/// The label of `d` as a new owned string handle.
///
/// # Safety
///
/// `d` must be null or a live detector window details handle.
#[no_mangle]
pub unsafe extern "C" fn detector_window_details_label(d: *const c_void) -> *mut c_void {
    ffi_guard_or!(ptr::null_mut(), {
        Tracked::<NativeDetectorWindowDetails>::borrow(d)
            .map_or(ptr::null_mut(), |d| publish_string(&d.label))
    })
}

/// Release a detector window details handle.
///
/// # Safety
///
/// `d` must be null or an owned detector window details handle.
#[no_mangle]
pub unsafe extern "C" fn detector_window_details_delete(d: *mut c_void) {
    ffi_guard!({ Tracked::<NativeDetectorWindowDetails>::release(d) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{stdstring_delete, stdstring_size};
    use crate::stats;

    #[test]
    fn column_vector_copies_its_source() {
        let src = [1.5, -2.0, 4.25];
        let v = unsafe { vector_double_new(src.as_ptr(), src.len()) };
        unsafe {
            assert_eq!(vector_double_nr(v), 3);
            let data = std::slice::from_raw_parts(vector_double_data(v), 3);
            assert_eq!(data, src);
            vector_double_delete(v);
        }
    }

    #[test]
    fn chip_details_fields() {
        let rect = NativeRectangle::new(10, 10, 59, 59);
        let c = chip_details_new(rect, 0.5, 150, 150);
        let mut out = NativeRectangle::default();
        unsafe {
            assert!(chip_details_get_rect(c, &mut out));
            assert_eq!(out, rect);
            assert_eq!(chip_details_angle(c), 0.5);
            assert_eq!((chip_details_rows(c), chip_details_cols(c)), (150, 150));
            chip_details_delete(c);
        }
    }

    #[test]
    fn surf_descriptor_length_is_checked() {
        let short = [0.0; 8];
        let p = unsafe {
            surf_point_new(NativeDPoint::default(), 1.0, 1.0, 1.0, 0.0, short.as_ptr(), 8)
        };
        assert!(p.is_null());

        let des: Vec<f64> = (0..SURF_DESCRIPTOR_LEN).map(|i| i as f64).collect();
        let center = NativeDPoint { x: 3.5, y: 7.0 };
        let p = unsafe { surf_point_new(center, 2.0, 0.8, -1.0, 0.25, des.as_ptr(), des.len()) };
        let mut out = NativeDPoint::default();
        unsafe {
            assert!(surf_point_get_center(p, &mut out));
            assert_eq!(out, center);
            assert_eq!(surf_point_laplacian(p), -1.0);
            assert_eq!(*surf_point_descriptor(p).add(63), 63.0);
            surf_point_delete(p);
        }
    }

    #[test]
    fn detector_window_label_is_a_fresh_string() {
        stats::reset();
        let d = unsafe { detector_window_details_new(80, 40, b"car".as_ptr(), 3) };
        unsafe {
            assert_eq!(detector_window_details_width(d), 80);
            assert_eq!(detector_window_details_height(d), 40);
            let label = detector_window_details_label(d);
            assert_eq!(stdstring_size(label), 3);
            stdstring_delete(label);
            detector_window_details_delete(d);
        }
        let s = stats::snapshot();
        assert_eq!(s.objects_created, 2);
        assert_eq!(s.objects_freed, 2);
    }

    #[test]
    fn getters_tolerate_null() {
        unsafe {
            assert_eq!(vector_double_nr(ptr::null()), 0);
            assert!(vector_double_data(ptr::null()).is_null());
            assert_eq!(chip_details_rows(ptr::null()), 0);
            assert!(surf_point_descriptor(ptr::null()).is_null());
            assert!(detector_window_details_label(ptr::null()).is_null());
        }
    }
}
