//! Fixed-layout value elements: points and rectangles.
//!
//! These are plain Rust values. They cross into a container as owned
//! foreign temporaries and come back out by reading a borrowed element
//! address, so nothing here holds a handle.

#![allow(unsafe_code)]

use std::ffi::c_void;

use ffivec_core::{ForeignHandle, Ownership, StdVectorError, TemplateShape, TypeDescriptor};
use ffivec_native::objects as native;
use ffivec_native::{NativeDPoint, NativeDPoint3, NativePoint, NativeRectangle};

use crate::element::Element;
use crate::object::{allocated, NativeObject, Release};

type Getter<N> = unsafe extern "C" fn(*const c_void, *mut N) -> bool;

/// Read a foreign struct, releasing the handle afterwards if it was owned.
///
/// # Safety
///
/// `handle` must be a live element of the family `get` reads.
unsafe fn read_struct<N: Default>(
    handle: ForeignHandle,
    ownership: Ownership,
    get: Getter<N>,
    release: Release,
) -> Result<N, StdVectorError> {
    let mut out = N::default();
    let ok = get(handle.as_ptr(), &mut out);
    if ownership.owns() {
        release(handle.as_ptr());
    }
    if ok {
        Ok(out)
    } else {
        Err(StdVectorError::NullForeignElement { index: 0 })
    }
}

/// Integer 2D point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: i64,
    /// Vertical coordinate.
    pub y: i64,
}

impl Point {
    /// Create a point.
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl From<NativePoint> for Point {
    fn from(p: NativePoint) -> Self {
        Self::new(p.x, p.y)
    }
}

impl From<Point> for NativePoint {
    fn from(p: Point) -> Self {
        NativePoint { x: p.x, y: p.y }
    }
}

impl Element for Point {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>()
    }

    fn to_transferable(&self) -> Result<NativeObject, StdVectorError> {
        allocated(native::point_new(self.x, self.y), native::point_delete, "point")
    }

    unsafe fn from_foreign(
        handle: ForeignHandle,
        ownership: Ownership,
        _shape: TemplateShape,
    ) -> Result<Self, StdVectorError> {
        read_struct(handle, ownership, native::point_get, native::point_delete).map(Self::from)
    }
}

/// Floating-point 2D point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DPoint {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl DPoint {
    /// Create a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<NativeDPoint> for DPoint {
    fn from(p: NativeDPoint) -> Self {
        Self::new(p.x, p.y)
    }
}

impl Element for DPoint {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>()
    }

    fn to_transferable(&self) -> Result<NativeObject, StdVectorError> {
        allocated(native::dpoint_new(self.x, self.y), native::dpoint_delete, "dpoint")
    }

    unsafe fn from_foreign(
        handle: ForeignHandle,
        ownership: Ownership,
        _shape: TemplateShape,
    ) -> Result<Self, StdVectorError> {
        read_struct(handle, ownership, native::dpoint_get, native::dpoint_delete).map(Self::from)
    }
}

impl From<DPoint> for NativeDPoint {
    fn from(p: DPoint) -> Self {
        NativeDPoint { x: p.x, y: p.y }
    }
}

/// Floating-point 3D point. Not an element type on its own.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DPoint3 {
    /// First coordinate.
    pub x: f64,
    /// Second coordinate.
    pub y: f64,
    /// Third coordinate.
    pub z: f64,
}

impl DPoint3 {
    /// Create a point.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl From<NativeDPoint3> for DPoint3 {
    fn from(p: NativeDPoint3) -> Self {
        Self::new(p.x, p.y, p.z)
    }
}

impl From<DPoint3> for NativeDPoint3 {
    fn from(p: DPoint3) -> Self {
        NativeDPoint3 {
            x: p.x,
            y: p.y,
            z: p.z,
        }
    }
}

/// Integer rectangle whose bounds are all inclusive.
///
/// A rectangle with `left > right` or `top > bottom` is empty. The
/// default is the empty rectangle `(0, 0, -1, -1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rectangle {
    /// Leftmost column.
    pub left: i64,
    /// Topmost row.
    pub top: i64,
    /// Rightmost column.
    pub right: i64,
    /// Bottom row.
    pub bottom: i64,
}

impl Rectangle {
    /// Create a rectangle from its bounds.
    pub const fn new(left: i64, top: i64, right: i64, bottom: i64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Whether the rectangle covers no cells.
    pub fn is_empty(&self) -> bool {
        self.left > self.right || self.top > self.bottom
    }

    /// Columns covered; zero when empty.
    pub fn width(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.right.abs_diff(self.left).saturating_add(1)
        }
    }

    /// Rows covered; zero when empty.
    pub fn height(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.bottom.abs_diff(self.top).saturating_add(1)
        }
    }

    /// Cells covered, saturating at `u64::MAX`.
    pub fn area(&self) -> u64 {
        self.width().saturating_mul(self.height())
    }
}

impl Default for Rectangle {
    fn default() -> Self {
        NativeRectangle::default().into()
    }
}

impl From<NativeRectangle> for Rectangle {
    fn from(r: NativeRectangle) -> Self {
        Self::new(r.left, r.top, r.right, r.bottom)
    }
}

impl From<Rectangle> for NativeRectangle {
    fn from(r: Rectangle) -> Self {
        NativeRectangle::new(r.left, r.top, r.right, r.bottom)
    }
}

impl Element for Rectangle {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>()
    }

    fn to_transferable(&self) -> Result<NativeObject, StdVectorError> {
        allocated(
            native::rectangle_new(self.left, self.top, self.right, self.bottom),
            native::rectangle_delete,
            "rectangle",
        )
    }

    unsafe fn from_foreign(
        handle: ForeignHandle,
        ownership: Ownership,
        _shape: TemplateShape,
    ) -> Result<Self, StdVectorError> {
        read_struct(
            handle,
            ownership,
            native::rectangle_get,
            native::rectangle_delete,
        )
        .map(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffivec_native::stats;

    #[test]
    fn rectangle_dimensions_are_inclusive() {
        let r = Rectangle::new(10, 20, 19, 24);
        assert_eq!(r.width(), 10);
        assert_eq!(r.height(), 5);
        assert_eq!(r.area(), 50);
        assert!(!r.is_empty());
    }

    #[test]
    fn inverted_rectangle_is_empty() {
        let r = Rectangle::new(5, 0, 4, 10);
        assert!(r.is_empty());
        assert_eq!(r.width(), 0);
        assert_eq!(r.area(), 0);
    }

    #[test]
    fn extreme_bounds_saturate() {
        let full = Rectangle::new(i64::MIN, i64::MIN, i64::MAX, i64::MAX);
        assert_eq!(full.width(), u64::MAX);
        assert_eq!(full.height(), u64::MAX);
        assert_eq!(full.area(), u64::MAX);

        let strip = Rectangle::new(i64::MIN, 0, i64::MAX, 1);
        assert_eq!(strip.height(), 2);
        assert_eq!(strip.area(), u64::MAX);

        let wide = Rectangle::new(0, 0, i64::MAX, 0);
        assert_eq!(wide.width(), 1 << 63);
        assert_eq!(wide.area(), 1 << 63);
    }

    #[test]
    fn default_rectangle_is_empty() {
        let r = Rectangle::default();
        assert_eq!(r, Rectangle::new(0, 0, -1, -1));
        assert!(r.is_empty());
        assert_eq!(r.area(), 0);
    }

    #[test]
    fn transferable_is_an_owned_copy() {
        stats::reset();
        let p = Point::new(-3, 8);
        let obj = p.to_transferable().unwrap();
        assert!(obj.ownership().owns());
        let back = unsafe { Point::from_foreign(obj.handle(), Ownership::Borrowed, TemplateShape::DYNAMIC) };
        assert_eq!(back, Ok(p));
        drop(obj);
        assert_eq!(stats::snapshot().objects_freed, 1);
    }

    #[test]
    fn owned_read_releases_the_handle() {
        stats::reset();
        let obj = Rectangle::new(1, 2, 3, 4).to_transferable().unwrap();
        let handle = obj.handle();
        std::mem::forget(obj);
        let r = unsafe { Rectangle::from_foreign(handle, Ownership::Owned, TemplateShape::DYNAMIC) };
        assert_eq!(r, Ok(Rectangle::new(1, 2, 3, 4)));
        assert_eq!(stats::snapshot().objects_freed, 1);
    }

    #[test]
    fn dpoint_round_trip() {
        let p = DPoint::new(0.5, -1.25);
        let obj = p.to_transferable().unwrap();
        let back = unsafe { DPoint::from_foreign(obj.handle(), Ownership::Borrowed, TemplateShape::DYNAMIC) };
        assert_eq!(back, Ok(p));
    }
}
