//! Image dataset metadata: annotated boxes and the images that hold them.
//!
//! An image owns copies of its boxes. Reading a box back out publishes a
//! fresh box handle, so callers never alias an image's internals.

#![allow(unsafe_code)]

use std::collections::BTreeMap;
use std::ffi::c_void;
use std::ptr;

use crate::objects::{field, publish, publish_string, raw_slice, write_field, NativeString};
use crate::tracked::Tracked;
use crate::types::{NativePoint, NativeRectangle};

/// Flags and scalar annotations of one box.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NativeBoxAttributes {
    /// Hard to detect.
    pub difficult: bool,
    /// Cut off by the image border.
    pub truncated: bool,
    /// Partly hidden.
    pub occluded: bool,
    /// Excluded from training.
    pub ignore: bool,
    /// Head pose, in degrees.
    pub pose: f64,
    /// Score the detector gave this box.
    pub detection_score: f64,
    /// Rotation of the box, in radians.
    pub angle: f64,
}

/// Named parts are kept in name order; a repeated name keeps the last point.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct NativeBox {
    pub(crate) rect: NativeRectangle,
    pub(crate) attributes: NativeBoxAttributes,
    pub(crate) label: Vec<u8>,
    pub(crate) parts: BTreeMap<Vec<u8>, NativePoint>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct NativeImage {
    pub(crate) filename: Vec<u8>,
    pub(crate) boxes: Vec<NativeBox>,
}

// ── box ───────────────────────────────────────────────────────────

/// Allocate an annotated box. The label and part names are copied.
///
/// `part_names` holds `num_parts` string handles naming the points at
/// `part_points`. Returns null if any name handle is null, or if an array is
/// null with a non-zero length.
///
/// # Safety
///
/// A non-null `label` must be valid for `label_len` reads. Non-null
/// `part_names` and `part_points` must be valid for `num_parts` reads, and
/// every name must be null or a live string handle.
#[no_mangle]
pub unsafe extern "C" fn dataset_box_new(
    rect: NativeRectangle,
    attributes: NativeBoxAttributes,
    label: *const u8,
    label_len: usize,
    part_names: *const *mut c_void,
    part_points: *const NativePoint,
    num_parts: usize,
) -> *mut c_void {
    ffi_guard_or!(ptr::null_mut(), {
        let (Some(label), Some(names), Some(points)) = (
            raw_slice(label, label_len),
            raw_slice(part_names, num_parts),
            raw_slice(part_points, num_parts),
        ) else {
            return ptr::null_mut();
        };
        let mut parts = BTreeMap::new();
        for (&name, &point) in names.iter().zip(points) {
            let Some(name) = Tracked::<NativeString>::borrow(name) else {
                log::warn!("dataset_box: null part name");
                return ptr::null_mut();
            };
            parts.insert(name.as_bytes().to_vec(), point);
        }
        publish(NativeBox {
            rect,
            attributes,
            label: label.to_vec(),
            parts,
        })
    })
}

/// Copy the rectangle of `b` into `out`.
///
/// # Safety
///
/// `b` must be null or a live box handle; `out` null or writable.
#[no_mangle]
pub unsafe extern "C" fn dataset_box_get_rect(b: *const c_void, out: *mut NativeRectangle) -> bool {
    ffi_guard_or!(false, { write_field(b, out, |b: &NativeBox| Some(b.rect)) })
}

/// Copy the attributes of `b` into `out`.
///
/// # Safety
///
/// `b` must be null or a live box handle; `out` null or writable.
#[no_mangle]
pub unsafe extern "C" fn dataset_box_get_attributes(
    b: *const c_void,
    out: *mut NativeBoxAttributes,
) -> bool {
    ffi_guard_or!(false, {
        write_field(b, out, |b: &NativeBox| Some(b.attributes))
    })
}

/// The label of `b` as a new owned string handle.
///
/// # Safety
///
/// `b` must be null or a live box handle.
#[no_mangle]
pub unsafe extern "C" fn dataset_box_label(b: *const c_void) -> *mut c_void {
    ffi_guard_or!(ptr::null_mut(), {
        Tracked::<NativeBox>::borrow(b).map_or(ptr::null_mut(), |b| publish_string(&b.label))
    })
}

/// Number of named parts of `b`.
///
/// # Safety
///
/// `b` must be null or a live box handle.
#[no_mangle]
pub unsafe extern "C" fn dataset_box_num_parts(b: *const c_void) -> usize {
    ffi_guard_or!(0, { field(b, |b: &NativeBox| b.parts.len()) })
}

/// The name of part `index` of `b` as a new owned string handle, or null
/// when out of range.
///
/// # Safety
///
/// `b` must be null or a live box handle.
#[no_mangle]
pub unsafe extern "C" fn dataset_box_part_name(b: *const c_void, index: usize) -> *mut c_void {
    ffi_guard_or!(ptr::null_mut(), {
        Tracked::<NativeBox>::borrow(b)
            .and_then(|b| b.parts.keys().nth(index))
            .map_or(ptr::null_mut(), |name| publish_string(name))
    })
}

/// Copy the point of part `index` of `b` into `out`. Returns `false` when
/// out of range.
///
/// # Safety
///
/// `b` must be null or a live box handle; `out` null or writable.
#[no_mangle]
pub unsafe extern "C" fn dataset_box_get_part(
    b: *const c_void,
    index: usize,
    out: *mut NativePoint,
) -> bool {
    ffi_guard_or!(false, {
        write_field(b, out, |b: &NativeBox| b.parts.values().nth(index).copied())
    })
}

/// Release a box handle.
///
/// # Safety
///
/// `b` must be null or an owned box handle.
#[no_mangle]
pub unsafe extern "C" fn dataset_box_delete(b: *mut c_void) {
    ffi_guard!({ Tracked::<NativeBox>::release(b) })
}

// ── image ─────────────────────────────────────────────────────────

/// Allocate an annotated image holding copies of `num_boxes` boxes.
///
/// Returns null if any box handle is null, or if an array is null with a
/// non-zero length. The caller keeps its box handles.
///
/// # Safety
///
/// A non-null `filename` must be valid for `filename_len` reads. A non-null
/// `boxes` must be valid for `num_boxes` reads, and every entry must be null
/// or a live box handle.
#[no_mangle]
pub unsafe extern "C" fn dataset_image_new(
    filename: *const u8,
    filename_len: usize,
    boxes: *const *mut c_void,
    num_boxes: usize,
) -> *mut c_void {
    ffi_guard_or!(ptr::null_mut(), {
        let (Some(filename), Some(handles)) =
            (raw_slice(filename, filename_len), raw_slice(boxes, num_boxes))
        else {
            return ptr::null_mut();
        };
        let mut boxes = Vec::with_capacity(handles.len());
        for (i, &h) in handles.iter().enumerate() {
            let Some(b) = Tracked::<NativeBox>::borrow(h) else {
                log::warn!("dataset_image: null box handle at {i}");
                return ptr::null_mut();
            };
            boxes.push(b.clone());
        }
        publish(NativeImage {
            filename: filename.to_vec(),
            boxes,
        })
    })
}

/// The filename of `img` as a new owned string handle.
///
/// # Safety
///
/// `img` must be null or a live image handle.
#[no_mangle]
pub unsafe extern "C" fn dataset_image_filename(img: *const c_void) -> *mut c_void {
    ffi_guard_or!(ptr::null_mut(), {
        Tracked::<NativeImage>::borrow(img).map_or(ptr::null_mut(), |i| publish_string(&i.filename))
    })
}

/// Number of boxes in `img`.
///
/// # Safety
///
/// `img` must be null or a live image handle.
#[no_mangle]
pub unsafe extern "C" fn dataset_image_num_boxes(img: *const c_void) -> usize {
    ffi_guard_or!(0, { field(img, |i: &NativeImage| i.boxes.len()) })
}

/// A copy of box `index` of `img` as a new owned box handle, or null when
/// out of range.
///
/// # Safety
///
/// `img` must be null or a live image handle.
#[no_mangle]
pub unsafe extern "C" fn dataset_image_get_box(img: *const c_void, index: usize) -> *mut c_void {
    ffi_guard_or!(ptr::null_mut(), {
        Tracked::<NativeImage>::borrow(img)
            .and_then(|i| i.boxes.get(index))
            .map_or(ptr::null_mut(), |b| publish(b.clone()))
    })
}

/// Release an image handle.
///
/// # Safety
///
/// `img` must be null or an owned image handle.
#[no_mangle]
pub unsafe extern "C" fn dataset_image_delete(img: *mut c_void) {
    ffi_guard!({ Tracked::<NativeImage>::release(img) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{stdstring_delete, stdstring_new, stdstring_size};
    use crate::stats;

    unsafe fn string(s: &[u8]) -> *mut c_void {
        stdstring_new(s.as_ptr(), s.len())
    }

    #[test]
    fn parts_are_name_ordered_and_deduplicated() {
        let names = unsafe { [string(b"nose"), string(b"eye"), string(b"nose")] };
        let points = [
            NativePoint { x: 1, y: 1 },
            NativePoint { x: 2, y: 2 },
            NativePoint { x: 3, y: 3 },
        ];
        let b = unsafe {
            dataset_box_new(
                NativeRectangle::new(0, 0, 9, 9),
                NativeBoxAttributes::default(),
                b"face".as_ptr(),
                4,
                names.as_ptr(),
                points.as_ptr(),
                3,
            )
        };
        let mut out = NativePoint::default();
        unsafe {
            assert_eq!(dataset_box_num_parts(b), 2);
            let first = dataset_box_part_name(b, 0);
            assert_eq!(stdstring_size(first), 3);
            stdstring_delete(first);
            assert!(dataset_box_get_part(b, 1, &mut out));
            assert!(dataset_box_part_name(b, 2).is_null());
            dataset_box_delete(b);
            names.iter().for_each(|&n| stdstring_delete(n));
        }
        assert_eq!(out, NativePoint { x: 3, y: 3 });
    }

    #[test]
    fn image_copies_boxes() {
        stats::reset();
        let attrs = NativeBoxAttributes {
            occluded: true,
            pose: 15.0,
            ..NativeBoxAttributes::default()
        };
        let b = unsafe {
            dataset_box_new(
                NativeRectangle::new(1, 2, 3, 4),
                attrs,
                ptr::null(),
                0,
                ptr::null(),
                ptr::null(),
                0,
            )
        };
        let img = unsafe { dataset_image_new(b"a.jpg".as_ptr(), 5, [b].as_ptr(), 1) };
        unsafe { dataset_box_delete(b) };

        let mut out = NativeBoxAttributes::default();
        unsafe {
            assert_eq!(dataset_image_num_boxes(img), 1);
            let copy = dataset_image_get_box(img, 0);
            assert!(dataset_box_get_attributes(copy, &mut out));
            dataset_box_delete(copy);
            assert!(dataset_image_get_box(img, 1).is_null());
            dataset_image_delete(img);
        }
        assert_eq!(out, attrs);
        let s = stats::snapshot();
        assert_eq!(s.objects_created, s.objects_freed);
    }

    #[test]
    fn null_box_is_refused() {
        let img = unsafe { dataset_image_new(ptr::null(), 0, [ptr::null_mut()].as_ptr(), 1) };
        assert!(img.is_null());
    }
}
