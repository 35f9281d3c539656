//! Standalone foreign objects: points, rectangles, strings, detections and
//! sample pairs.
//!
//! Getters accept null and return a zero value. Every `*_delete` releases
//! one reference to a handle returned by the matching `*_new` or handed out
//! by a container's `copy`.

#![allow(unsafe_code)]

use std::ffi::{c_char, c_void};
use std::ptr;

use crate::tracked::{Resource, Tracked};
use crate::types::{NativeDPoint, NativePoint, NativeRectangle};

/// Byte string with a trailing NUL kept for `stdstring_c_str`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct NativeString {
    bytes: Vec<u8>,
}

impl NativeString {
    pub(crate) fn new(content: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(content.len() + 1);
        bytes.extend_from_slice(content);
        bytes.push(0);
        Self { bytes }
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.bytes.len() - 1]
    }
}

impl Default for NativeString {
    fn default() -> Self {
        Self::new(&[])
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct NativeMModRect {
    pub(crate) rect: NativeRectangle,
    pub(crate) confidence: f64,
    pub(crate) ignore: bool,
    pub(crate) label: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct NativeRectDetection {
    pub(crate) rect: NativeRectangle,
    pub(crate) confidence: f64,
    pub(crate) weight_index: u64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct NativeFullObjectDetection {
    pub(crate) rect: NativeRectangle,
    pub(crate) parts: Vec<NativePoint>,
}

/// Indices are stored ordered so `index1 <= index2`.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct NativeSamplePair {
    pub(crate) index1: u64,
    pub(crate) index2: u64,
    pub(crate) distance: f64,
}

impl NativeSamplePair {
    pub(crate) fn new(a: u64, b: u64, distance: f64) -> Self {
        Self {
            index1: a.min(b),
            index2: a.max(b),
            distance,
        }
    }
}

/// View `len` items at `data`. `None` when `data` is null and `len > 0`.
///
/// # Safety
///
/// A non-null `data` must be valid for `len` reads.
pub(crate) unsafe fn raw_slice<'a, T>(data: *const T, len: usize) -> Option<&'a [T]> {
    if len == 0 {
        Some(&[])
    } else if data.is_null() {
        None
    } else {
        Some(std::slice::from_raw_parts(data, len))
    }
}

pub(crate) fn publish<T>(value: T) -> *mut c_void {
    Tracked::publish(value, Resource::Object)
}

/// # Safety
///
/// `handle` must be null or a live `T` handle; `out` must be null or writable.
pub(crate) unsafe fn read_into<T: Copy>(handle: *const c_void, out: *mut T) -> bool {
    match (Tracked::<T>::borrow(handle), out.is_null()) {
        (Some(v), false) => {
            out.write(*v);
            true
        }
        _ => false,
    }
}

/// # Safety
///
/// `handle` must be null or a live `T` handle.
pub(crate) unsafe fn field<T, R: Default>(handle: *const c_void, f: impl FnOnce(&T) -> R) -> R {
    Tracked::<T>::borrow(handle).map(f).unwrap_or_default()
}

/// Write `f` of the `T` behind `handle` into `out`. Returns `false` if
/// either is null or `f` yields nothing.
///
/// # Safety
///
/// `handle` must be null or a live `T` handle; `out` must be null or writable.
pub(crate) unsafe fn write_field<T, R>(
    handle: *const c_void,
    out: *mut R,
    f: impl FnOnce(&T) -> Option<R>,
) -> bool {
    match (Tracked::<T>::borrow(handle).and_then(f), out.is_null()) {
        (Some(v), false) => {
            out.write(v);
            true
        }
        _ => false,
    }
}

/// A new string handle holding a copy of `bytes`.
pub(crate) fn publish_string(bytes: &[u8]) -> *mut c_void {
    publish(NativeString::new(bytes))
}

// ── fixed-layout structs ──────────────────────────────────────────

/// Allocate a point.
#[no_mangle]
pub extern "C" fn point_new(x: i64, y: i64) -> *mut c_void {
    ffi_guard_or!(ptr::null_mut(), { publish(NativePoint { x, y }) })
}

/// Copy the point at `point` into `out`. Returns `false` if either is null.
///
/// # Safety
///
/// `point` must be null, a live point handle, or a point address lent by a
/// live container. `out` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn point_get(point: *const c_void, out: *mut NativePoint) -> bool {
    ffi_guard_or!(false, { read_into(point, out) })
}

/// Release a point handle.
///
/// # Safety
///
/// `point` must be null or an owned point handle.
#[no_mangle]
pub unsafe extern "C" fn point_delete(point: *mut c_void) {
    ffi_guard!({ Tracked::<NativePoint>::release(point) })
}

/// Allocate a floating-point point.
#[no_mangle]
pub extern "C" fn dpoint_new(x: f64, y: f64) -> *mut c_void {
    ffi_guard_or!(ptr::null_mut(), { publish(NativeDPoint { x, y }) })
}

/// Copy the dpoint at `point` into `out`. Returns `false` if either is null.
///
/// # Safety
///
/// As [`point_get`].
#[no_mangle]
pub unsafe extern "C" fn dpoint_get(point: *const c_void, out: *mut NativeDPoint) -> bool {
    ffi_guard_or!(false, { read_into(point, out) })
}

/// Release a dpoint handle.
///
/// # Safety
///
/// `point` must be null or an owned dpoint handle.
#[no_mangle]
pub unsafe extern "C" fn dpoint_delete(point: *mut c_void) {
    ffi_guard!({ Tracked::<NativeDPoint>::release(point) })
}

/// Allocate a rectangle.
#[no_mangle]
pub extern "C" fn rectangle_new(left: i64, top: i64, right: i64, bottom: i64) -> *mut c_void {
    ffi_guard_or!(ptr::null_mut(), {
        publish(NativeRectangle::new(left, top, right, bottom))
    })
}

/// Copy the rectangle at `rect` into `out`. Returns `false` if either is null.
///
/// # Safety
///
/// As [`point_get`].
#[no_mangle]
pub unsafe extern "C" fn rectangle_get(rect: *const c_void, out: *mut NativeRectangle) -> bool {
    ffi_guard_or!(false, { read_into(rect, out) })
}

/// Release a rectangle handle.
///
/// # Safety
///
/// `rect` must be null or an owned rectangle handle.
#[no_mangle]
pub unsafe extern "C" fn rectangle_delete(rect: *mut c_void) {
    ffi_guard!({ Tracked::<NativeRectangle>::release(rect) })
}

// ── strings ───────────────────────────────────────────────────────

/// Allocate a string holding a copy of `len` bytes at `data`.
///
/// Returns null if `data` is null and `len > 0`.
///
/// # Safety
///
/// A non-null `data` must be valid for `len` reads.
#[no_mangle]
pub unsafe extern "C" fn stdstring_new(data: *const u8, len: usize) -> *mut c_void {
    ffi_guard_or!(ptr::null_mut(), {
        match raw_slice(data, len) {
            Some(bytes) => publish(NativeString::new(bytes)),
            None => ptr::null_mut(),
        }
    })
}

/// NUL-terminated contents of `s`, valid while `s` is alive.
///
/// # Safety
///
/// `s` must be null or a live string handle.
#[no_mangle]
pub unsafe extern "C" fn stdstring_c_str(s: *const c_void) -> *const c_char {
    ffi_guard_or!(ptr::null(), {
        Tracked::<NativeString>::borrow(s)
            .map_or(ptr::null(), |s| s.bytes.as_ptr() as *const c_char)
    })
}

/// Length of `s` in bytes, excluding the terminator.
///
/// # Safety
///
/// `s` must be null or a live string handle.
#[no_mangle]
pub unsafe extern "C" fn stdstring_size(s: *const c_void) -> usize {
    ffi_guard_or!(0, { field(s, |s: &NativeString| s.as_bytes().len()) })
}

/// Release a string handle.
///
/// # Safety
///
/// `s` must be null or an owned string handle.
#[no_mangle]
pub unsafe extern "C" fn stdstring_delete(s: *mut c_void) {
    ffi_guard!({ Tracked::<NativeString>::release(s) })
}

// ── mmod rect ─────────────────────────────────────────────────────

/// Allocate an mmod rect. The label is copied.
///
/// # Safety
///
/// A non-null `label` must be valid for `label_len` reads.
#[no_mangle]
pub unsafe extern "C" fn mmod_rect_new(
    rect: NativeRectangle,
    confidence: f64,
    ignore: bool,
    label: *const u8,
    label_len: usize,
) -> *mut c_void {
    ffi_guard_or!(ptr::null_mut(), {
        let Some(label) = raw_slice(label, label_len) else {
            return ptr::null_mut();
        };
        publish(NativeMModRect {
            rect,
            confidence,
            ignore,
            label: label.to_vec(),
        })
    })
}

/// Copy the bounding rectangle of `m` into `out`.
///
/// # Safety
///
/// `m` must be null or a live mmod rect handle; `out` null or writable.
#[no_mangle]
pub unsafe extern "C" fn mmod_rect_get_rect(m: *const c_void, out: *mut NativeRectangle) -> bool {
    ffi_guard_or!(false, {
        match (Tracked::<NativeMModRect>::borrow(m), out.is_null()) {
            (Some(m), false) => {
                out.write(m.rect);
                true
            }
            _ => false,
        }
    })
}

/// Detection confidence of `m`.
///
/// # Safety
///
/// `m` must be null or a live mmod rect handle.
#[no_mangle]
pub unsafe extern "C" fn mmod_rect_confidence(m: *const c_void) -> f64 {
    ffi_guard_or!(0.0, { field(m, |m: &NativeMModRect| m.confidence) })
}

/// Ignore flag of `m`.
///
/// # Safety
///
/// `m` must be null or a live mmod rect handle.
#[no_mangle]
pub unsafe extern "C" fn mmod_rect_ignore(m: *const c_void) -> bool {
    ffi_guard_or!(false, { field(m, |m: &NativeMModRect| m.ignore) })
}

/// The label of `m` as a new owned string handle.
///
/// # Safety
///
/// `m` must be null or a live mmod rect handle.
#[no_mangle]
pub unsafe extern "C" fn mmod_rect_label(m: *const c_void) -> *mut c_void {
    ffi_guard_or!(ptr::null_mut(), {
        Tracked::<NativeMModRect>::borrow(m)
            .map_or(ptr::null_mut(), |m| publish(NativeString::new(&m.label)))
    })
}

/// Release an mmod rect handle.
///
/// # Safety
///
/// `m` must be null or an owned mmod rect handle.
#[no_mangle]
pub unsafe extern "C" fn mmod_rect_delete(m: *mut c_void) {
    ffi_guard!({ Tracked::<NativeMModRect>::release(m) })
}

// ── rect detection ────────────────────────────────────────────────

/// Allocate a rect detection.
#[no_mangle]
pub extern "C" fn rect_detection_new(
    rect: NativeRectangle,
    confidence: f64,
    weight_index: u64,
) -> *mut c_void {
    ffi_guard_or!(ptr::null_mut(), {
        publish(NativeRectDetection {
            rect,
            confidence,
            weight_index,
        })
    })
}

/// Copy the bounding rectangle of `d` into `out`.
///
/// # Safety
///
/// `d` must be null or a live rect detection handle; `out` null or writable.
#[no_mangle]
pub unsafe extern "C" fn rect_detection_get_rect(
    d: *const c_void,
    out: *mut NativeRectangle,
) -> bool {
    ffi_guard_or!(false, {
        match (Tracked::<NativeRectDetection>::borrow(d), out.is_null()) {
            (Some(d), false) => {
                out.write(d.rect);
                true
            }
            _ => false,
        }
    })
}

/// Detection confidence of `d`.
///
/// # Safety
///
/// `d` must be null or a live rect detection handle.
#[no_mangle]
pub unsafe extern "C" fn rect_detection_confidence(d: *const c_void) -> f64 {
    ffi_guard_or!(0.0, { field(d, |d: &NativeRectDetection| d.confidence) })
}

/// Weight index of `d`.
///
/// # Safety
///
/// `d` must be null or a live rect detection handle.
#[no_mangle]
pub unsafe extern "C" fn rect_detection_weight_index(d: *const c_void) -> u64 {
    ffi_guard_or!(0, { field(d, |d: &NativeRectDetection| d.weight_index) })
}

/// Release a rect detection handle.
///
/// # Safety
///
/// `d` must be null or an owned rect detection handle.
#[no_mangle]
pub unsafe extern "C" fn rect_detection_delete(d: *mut c_void) {
    ffi_guard!({ Tracked::<NativeRectDetection>::release(d) })
}

// ── full object detection ─────────────────────────────────────────

/// Allocate a full object detection. The parts are copied.
///
/// Returns null if `parts` is null and `num_parts > 0`.
///
/// # Safety
///
/// A non-null `parts` must be valid for `num_parts` reads.
#[no_mangle]
pub unsafe extern "C" fn full_object_detection_new(
    rect: NativeRectangle,
    parts: *const NativePoint,
    num_parts: usize,
) -> *mut c_void {
    ffi_guard_or!(ptr::null_mut(), {
        let Some(parts) = raw_slice(parts, num_parts) else {
            return ptr::null_mut();
        };
        publish(NativeFullObjectDetection {
            rect,
            parts: parts.to_vec(),
        })
    })
}

/// Copy the bounding rectangle of `d` into `out`.
///
/// # Safety
///
/// `d` must be null or a live full object detection handle; `out` null or
/// writable.
#[no_mangle]
pub unsafe extern "C" fn full_object_detection_get_rect(
    d: *const c_void,
    out: *mut NativeRectangle,
) -> bool {
    ffi_guard_or!(false, {
        match (Tracked::<NativeFullObjectDetection>::borrow(d), out.is_null()) {
            (Some(d), false) => {
                out.write(d.rect);
                true
            }
            _ => false,
        }
    })
}

/// Number of landmark parts in `d`.
///
/// # Safety
///
/// `d` must be null or a live full object detection handle.
#[no_mangle]
pub unsafe extern "C" fn full_object_detection_num_parts(d: *const c_void) -> usize {
    ffi_guard_or!(0, {
        field(d, |d: &NativeFullObjectDetection| d.parts.len())
    })
}

/// Copy part `index` of `d` into `out`. Returns `false` when out of range.
///
/// # Safety
///
/// `d` must be null or a live full object detection handle; `out` null or
/// writable.
#[no_mangle]
pub unsafe extern "C" fn full_object_detection_get_part(
    d: *const c_void,
    index: usize,
    out: *mut NativePoint,
) -> bool {
    ffi_guard_or!(false, {
        let part = Tracked::<NativeFullObjectDetection>::borrow(d)
            .and_then(|d| d.parts.get(index).copied());
        match (part, out.is_null()) {
            (Some(p), false) => {
                out.write(p);
                true
            }
            _ => false,
        }
    })
}

/// Release a full object detection handle.
///
/// # Safety
///
/// `d` must be null or an owned full object detection handle.
#[no_mangle]
pub unsafe extern "C" fn full_object_detection_delete(d: *mut c_void) {
    ffi_guard!({ Tracked::<NativeFullObjectDetection>::release(d) })
}

// ── sample pair ───────────────────────────────────────────────────

/// Allocate a sample pair. The indices are stored smaller first.
#[no_mangle]
pub extern "C" fn sample_pair_new(index1: u64, index2: u64, distance: f64) -> *mut c_void {
    ffi_guard_or!(ptr::null_mut(), {
        publish(NativeSamplePair::new(index1, index2, distance))
    })
}

/// Smaller index of `p`.
///
/// # Safety
///
/// `p` must be null or a live sample pair handle.
#[no_mangle]
pub unsafe extern "C" fn sample_pair_index1(p: *const c_void) -> u64 {
    ffi_guard_or!(0, { field(p, |p: &NativeSamplePair| p.index1) })
}

/// Larger index of `p`.
///
/// # Safety
///
/// `p` must be null or a live sample pair handle.
#[no_mangle]
pub unsafe extern "C" fn sample_pair_index2(p: *const c_void) -> u64 {
    ffi_guard_or!(0, { field(p, |p: &NativeSamplePair| p.index2) })
}

/// Distance of `p`.
///
/// # Safety
///
/// `p` must be null or a live sample pair handle.
#[no_mangle]
pub unsafe extern "C" fn sample_pair_distance(p: *const c_void) -> f64 {
    ffi_guard_or!(0.0, { field(p, |p: &NativeSamplePair| p.distance) })
}

/// Release a sample pair handle.
///
/// # Safety
///
/// `p` must be null or an owned sample pair handle.
#[no_mangle]
pub unsafe extern "C" fn sample_pair_delete(p: *mut c_void) {
    ffi_guard!({ Tracked::<NativeSamplePair>::release(p) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats;
    use std::ffi::CStr;

    #[test]
    fn point_round_trip() {
        let p = point_new(3, -4);
        let mut out = NativePoint::default();
        assert!(unsafe { point_get(p, &mut out) });
        assert_eq!(out, NativePoint { x: 3, y: -4 });
        unsafe { point_delete(p) };
    }

    #[test]
    fn getters_tolerate_null() {
        let mut out = NativeRectangle::default();
        unsafe {
            assert!(!rectangle_get(ptr::null(), &mut out));
            assert_eq!(stdstring_size(ptr::null()), 0);
            assert!(stdstring_c_str(ptr::null()).is_null());
            assert_eq!(sample_pair_distance(ptr::null()), 0.0);
            assert!(mmod_rect_label(ptr::null()).is_null());
        }
    }

    #[test]
    fn string_is_nul_terminated() {
        let s = unsafe { stdstring_new(b"face".as_ptr(), 4) };
        unsafe {
            assert_eq!(stdstring_size(s), 4);
            let c = CStr::from_ptr(stdstring_c_str(s));
            assert_eq!(c.to_bytes(), b"face");
            stdstring_delete(s);
        }
    }

    #[test]
    fn string_rejects_null_data_with_length() {
        assert!(unsafe { stdstring_new(ptr::null(), 3) }.is_null());
        let empty = unsafe { stdstring_new(ptr::null(), 0) };
        assert!(!empty.is_null());
        unsafe { stdstring_delete(empty) };
    }

    #[test]
    fn mmod_rect_fields() {
        let rect = NativeRectangle::new(1, 2, 30, 40);
        let m = unsafe { mmod_rect_new(rect, 0.75, true, b"dog".as_ptr(), 3) };
        let mut out = NativeRectangle::default();
        unsafe {
            assert!(mmod_rect_get_rect(m, &mut out));
            assert_eq!(out, rect);
            assert_eq!(mmod_rect_confidence(m), 0.75);
            assert!(mmod_rect_ignore(m));
            let label = mmod_rect_label(m);
            assert_eq!(stdstring_size(label), 3);
            stdstring_delete(label);
            mmod_rect_delete(m);
        }
    }

    #[test]
    fn full_object_detection_parts() {
        let parts = [NativePoint { x: 1, y: 1 }, NativePoint { x: 5, y: 9 }];
        let d = unsafe {
            full_object_detection_new(NativeRectangle::new(0, 0, 9, 9), parts.as_ptr(), 2)
        };
        let mut out = NativePoint::default();
        unsafe {
            assert_eq!(full_object_detection_num_parts(d), 2);
            assert!(full_object_detection_get_part(d, 1, &mut out));
            assert_eq!(out, parts[1]);
            assert!(!full_object_detection_get_part(d, 2, &mut out));
            full_object_detection_delete(d);
        }
    }

    #[test]
    fn sample_pair_orders_indices() {
        let p = sample_pair_new(9, 2, 0.5);
        unsafe {
            assert_eq!(sample_pair_index1(p), 2);
            assert_eq!(sample_pair_index2(p), 9);
            assert_eq!(sample_pair_distance(p), 0.5);
            sample_pair_delete(p);
        }
    }

    #[test]
    fn objects_are_counted() {
        stats::reset();
        let d = rect_detection_new(NativeRectangle::default(), 1.0, 3);
        unsafe {
            assert_eq!(rect_detection_weight_index(d), 3);
            rect_detection_delete(d);
        }
        let s = stats::snapshot();
        assert_eq!(s.objects_created, 1);
        assert_eq!(s.objects_freed, 1);
    }
}
