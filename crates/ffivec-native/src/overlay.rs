//! Display overlays: image window lines, perspective window dots, and
//! image display rectangles.

#![allow(unsafe_code)]

use std::ffi::c_void;
use std::ptr;

use crate::objects::{publish, publish_string, raw_slice, write_field};
use crate::tracked::Tracked;
use crate::types::{NativeDPoint3, NativePoint, NativeRectangle, NativeRgbPixel};

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct NativeOverlayLine {
    pub(crate) p1: NativePoint,
    pub(crate) p2: NativePoint,
    pub(crate) color: NativeRgbPixel,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct NativeOverlayDot {
    pub(crate) position: NativeDPoint3,
    pub(crate) color: NativeRgbPixel,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct NativeOverlayRect {
    pub(crate) rect: NativeRectangle,
    pub(crate) color: NativeRgbPixel,
    pub(crate) label: Vec<u8>,
}

// ── image window line ─────────────────────────────────────────────

/// Allocate a line from `p1` to `p2`.
#[no_mangle]
pub extern "C" fn overlay_line_new(
    p1: NativePoint,
    p2: NativePoint,
    color: NativeRgbPixel,
) -> *mut c_void {
    ffi_guard_or!(ptr::null_mut(), {
        publish(NativeOverlayLine { p1, p2, color })
    })
}

/// Copy the start point of `l` into `out`.
///
/// # Safety
///
/// `l` must be null or a live overlay line handle; `out` null or writable.
#[no_mangle]
pub unsafe extern "C" fn overlay_line_get_p1(l: *const c_void, out: *mut NativePoint) -> bool {
    ffi_guard_or!(false, {
        write_field(l, out, |l: &NativeOverlayLine| Some(l.p1))
    })
}

/// Copy the end point of `l` into `out`.
///
/// # Safety
///
/// As [`overlay_line_get_p1`].
#[no_mangle]
pub unsafe extern "C" fn overlay_line_get_p2(l: *const c_void, out: *mut NativePoint) -> bool {
    ffi_guard_or!(false, {
        write_field(l, out, |l: &NativeOverlayLine| Some(l.p2))
    })
}

/// Copy the colour of `l` into `out`.
///
/// # Safety
///
/// `l` must be null or a live overlay line handle; `out` null or writable.
#[no_mangle]
pub unsafe extern "C" fn overlay_line_get_color(
    l: *const c_void,
    out: *mut NativeRgbPixel,
) -> bool {
    ffi_guard_or!(false, {
        write_field(l, out, |l: &NativeOverlayLine| Some(l.color))
    })
}

/// Release an overlay line handle.
///
/// # Safety
///
/// `l` must be null or an owned overlay line handle.
#[no_mangle]
pub unsafe extern "C" fn overlay_line_delete(l: *mut c_void) {
    ffi_guard!({ Tracked::<NativeOverlayLine>::release(l) })
}

// ── perspective window dot ────────────────────────────────────────

/// Allocate a dot at `position`.
#[no_mangle]
pub extern "C" fn overlay_dot_new(position: NativeDPoint3, color: NativeRgbPixel) -> *mut c_void {
    ffi_guard_or!(ptr::null_mut(), {
        publish(NativeOverlayDot { position, color })
    })
}

/// Copy the position of `d` into `out`.
///
/// # Safety
///
/// `d` must be null or a live overlay dot handle; `out` null or writable.
#[no_mangle]
pub unsafe extern "C" fn overlay_dot_get_position(
    d: *const c_void,
    out: *mut NativeDPoint3,
) -> bool {
    ffi_guard_or!(false, {
        write_field(d, out, |d: &NativeOverlayDot| Some(d.position))
    })
}

/// Copy the colour of `d` into `out`.
///
/// # Safety
///
/// As [`overlay_dot_get_position`].
#[no_mangle]
pub unsafe extern "C" fn overlay_dot_get_color(d: *const c_void, out: *mut NativeRgbPixel) -> bool {
    ffi_guard_or!(false, {
        write_field(d, out, |d: &NativeOverlayDot| Some(d.color))
    })
}

/// Release an overlay dot handle.
///
/// # Safety
///
/// `d` must be null or an owned overlay dot handle.
#[no_mangle]
pub unsafe extern "C" fn overlay_dot_delete(d: *mut c_void) {
    ffi_guard!({ Tracked::<NativeOverlayDot>::release(d) })
}

// ── image display rectangle ───────────────────────────────────────

/// Allocate a labelled overlay rectangle. The label is copied.
///
/// # Safety
///
/// A non-null `label` must be valid for `label_len` reads.
#[no_mangle]
pub unsafe extern "C" fn overlay_rect_new(
    rect: NativeRectangle,
    color: NativeRgbPixel,
    label: *const u8,
    label_len: usize,
) -> *mut c_void {
    ffi_guard_or!(ptr::null_mut(), {
        let Some(label) = raw_slice(label, label_len) else {
            return ptr::null_mut();
        };
        publish(NativeOverlayRect {
            rect,
            color,
            label: label.to_vec(),
        })
    })
}

/// Copy the rectangle of `r` into `out`.
///
/// # Safety
///
/// `r` must be null or a live overlay rect handle; `out` null or writable.
#[no_mangle]
pub unsafe extern "C" fn overlay_rect_get_rect(r: *const c_void, out: *mut NativeRectangle) -> bool {
    ffi_guard_or!(false, {
        write_field(r, out, |r: &NativeOverlayRect| Some(r.rect))
    })
}

/// Copy the colour of `r` into `out`.
///
/// # Safety
///
/// As [`overlay_rect_get_rect`].
#[no_mangle]
pub unsafe extern "C" fn overlay_rect_get_color(r: *const c_void, out: *mut NativeRgbPixel) -> bool {
    ffi_guard_or!(false, {
        write_field(r, out, |r: &NativeOverlayRect| Some(r.color))
    })
}

/// The label of `r` as a new owned string handle.
///
/// # Safety
///
/// `r` must be null or a live overlay rect handle.
#[no_mangle]
pub unsafe extern "C" fn overlay_rect_label(r: *const c_void) -> *mut c_void {
    ffi_guard_or!(ptr::null_mut(), {
        Tracked::<NativeOverlayRect>::borrow(r).map_or(ptr::null_mut(), |r| publish_string(&r.label))
    })
}

/// Release an overlay rect handle.
///
/// # Safety
///
/// `r` must be null or an owned overlay rect handle.
#[no_mangle]
pub unsafe extern "C" fn overlay_rect_delete(r: *mut c_void) {
    ffi_guard!({ Tracked::<NativeOverlayRect>::release(r) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{stdstring_delete, stdstring_size};

    const RED: NativeRgbPixel = NativeRgbPixel {
        red: 255,
        green: 0,
        blue: 0,
    };

    #[test]
    fn line_endpoints() {
        let a = NativePoint { x: 0, y: 0 };
        let b = NativePoint { x: 10, y: -3 };
        let l = overlay_line_new(a, b, RED);
        let mut p = NativePoint::default();
        let mut c = NativeRgbPixel::default();
        unsafe {
            assert!(overlay_line_get_p2(l, &mut p));
            assert!(overlay_line_get_color(l, &mut c));
            overlay_line_delete(l);
        }
        assert_eq!(p, b);
        assert_eq!(c, RED);
    }

    #[test]
    fn dot_position() {
        let at = NativeDPoint3 {
            x: 1.0,
            y: 2.0,
            z: -0.5,
        };
        let d = overlay_dot_new(at, RED);
        let mut out = NativeDPoint3::default();
        unsafe {
            assert!(overlay_dot_get_position(d, &mut out));
            assert!(!overlay_dot_get_position(d, ptr::null_mut()));
            overlay_dot_delete(d);
        }
        assert_eq!(out, at);
    }

    #[test]
    fn rect_label() {
        let r = unsafe { overlay_rect_new(NativeRectangle::new(0, 0, 4, 4), RED, b"eye".as_ptr(), 3) };
        unsafe {
            let label = overlay_rect_label(r);
            assert_eq!(stdstring_size(label), 3);
            stdstring_delete(label);
            overlay_rect_delete(r);
        }
        assert!(unsafe { overlay_rect_new(NativeRectangle::default(), RED, ptr::null(), 2) }.is_null());
    }
}
