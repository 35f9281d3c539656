//! Feature-extraction objects held by the foreign side.

#![allow(unsafe_code)]

use std::fmt;

use ffivec_core::StdVectorError;
use ffivec_native::features as native;
use ffivec_native::NativeDPoint;

use crate::detection::read_rect;
use crate::geometry::{DPoint, Rectangle};
use crate::object::{allocated, read_out, NativeObject};
use crate::string::owned_string;

pub use ffivec_native::features::SURF_DESCRIPTOR_LEN;

/// A column vector of `f64`, stored as one foreign object.
///
/// Unlike `StdVector<f64>`, a column vector is a single element: a
/// container of them holds one handle per vector.
pub struct ColumnVector {
    object: NativeObject,
}

impl ColumnVector {
    /// Copy `values` into a new foreign column vector.
    pub fn new(values: &[f64]) -> Result<Self, StdVectorError> {
        // SAFETY: `values` is valid for `values.len()` reads.
        let ptr = unsafe { native::vector_double_new(values.as_ptr(), values.len()) };
        allocated(ptr, native::vector_double_delete, "vector_double").map(|object| Self { object })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        // SAFETY: the handle is live for `&self`.
        unsafe { native::vector_double_nr(self.object.ptr()) }
    }

    /// Whether the vector has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The values, borrowed from the foreign storage.
    pub fn as_slice(&self) -> &[f64] {
        // SAFETY: the handle stays live for `&self` and the foreign side
        // reports the length of the buffer `data` points at.
        unsafe {
            let data = native::vector_double_data(self.object.ptr());
            if data.is_null() {
                return &[];
            }
            std::slice::from_raw_parts(data, self.len())
        }
    }

    /// A copy of the values.
    pub fn to_vec(&self) -> Vec<f64> {
        self.as_slice().to_vec()
    }
}

handle_element!(ColumnVector, native::vector_double_delete);

impl PartialEq for ColumnVector {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl fmt::Debug for ColumnVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ColumnVector").field(&self.as_slice()).finish()
    }
}

/// Where to cut an image chip from: a source rectangle, a rotation, and
/// the chip's output size.
pub struct ChipDetails {
    object: NativeObject,
}

impl ChipDetails {
    /// Create foreign chip details.
    pub fn new(rect: Rectangle, angle: f64, rows: u64, cols: u64) -> Result<Self, StdVectorError> {
        let ptr = native::chip_details_new(rect.into(), angle, rows, cols);
        allocated(ptr, native::chip_details_delete, "chip_details").map(|object| Self { object })
    }

    /// Source rectangle.
    pub fn rect(&self) -> Rectangle {
        read_rect(&self.object, native::chip_details_get_rect)
    }

    /// Rotation in radians.
    pub fn angle(&self) -> f64 {
        // SAFETY: the handle is live for `&self`.
        unsafe { native::chip_details_angle(self.object.ptr()) }
    }

    /// Output rows.
    pub fn rows(&self) -> u64 {
        // SAFETY: the handle is live for `&self`.
        unsafe { native::chip_details_rows(self.object.ptr()) }
    }

    /// Output columns.
    pub fn cols(&self) -> u64 {
        // SAFETY: the handle is live for `&self`.
        unsafe { native::chip_details_cols(self.object.ptr()) }
    }
}

handle_element!(ChipDetails, native::chip_details_delete);

impl PartialEq for ChipDetails {
    fn eq(&self, other: &Self) -> bool {
        self.rect() == other.rect()
            && self.angle() == other.angle()
            && (self.rows(), self.cols()) == (other.rows(), other.cols())
    }
}

impl fmt::Debug for ChipDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChipDetails")
            .field("rect", &self.rect())
            .field("angle", &self.angle())
            .field("rows", &self.rows())
            .field("cols", &self.cols())
            .finish()
    }
}

/// A SURF interest point and its descriptor.
pub struct SurfPoint {
    object: NativeObject,
}

impl SurfPoint {
    /// Create a foreign SURF point.
    pub fn new(
        center: DPoint,
        scale: f64,
        score: f64,
        laplacian: f64,
        angle: f64,
        descriptor: &[f64; SURF_DESCRIPTOR_LEN],
    ) -> Result<Self, StdVectorError> {
        // SAFETY: `descriptor` is valid for `SURF_DESCRIPTOR_LEN` reads.
        let ptr = unsafe {
            native::surf_point_new(
                center.into(),
                scale,
                score,
                laplacian,
                angle,
                descriptor.as_ptr(),
                descriptor.len(),
            )
        };
        allocated(ptr, native::surf_point_delete, "surf_point").map(|object| Self { object })
    }

    /// Centre of the point.
    pub fn center(&self) -> DPoint {
        read_out::<NativeDPoint>(&self.object, native::surf_point_get_center).into()
    }

    /// Detection scale.
    pub fn scale(&self) -> f64 {
        // SAFETY: the handle is live for `&self`.
        unsafe { native::surf_point_scale(self.object.ptr()) }
    }

    /// Detector response.
    pub fn score(&self) -> f64 {
        // SAFETY: the handle is live for `&self`.
        unsafe { native::surf_point_score(self.object.ptr()) }
    }

    /// Sign of the Laplacian.
    pub fn laplacian(&self) -> f64 {
        // SAFETY: the handle is live for `&self`.
        unsafe { native::surf_point_laplacian(self.object.ptr()) }
    }

    /// Orientation in radians.
    pub fn angle(&self) -> f64 {
        // SAFETY: the handle is live for `&self`.
        unsafe { native::surf_point_angle(self.object.ptr()) }
    }

    /// The descriptor values.
    pub fn descriptor(&self) -> [f64; SURF_DESCRIPTOR_LEN] {
        let mut out = [0.0; SURF_DESCRIPTOR_LEN];
        // SAFETY: a live SURF point always holds `SURF_DESCRIPTOR_LEN`
        // values at `descriptor`.
        unsafe {
            let data = native::surf_point_descriptor(self.object.ptr());
            if !data.is_null() {
                std::ptr::copy_nonoverlapping(data, out.as_mut_ptr(), SURF_DESCRIPTOR_LEN);
            }
        }
        out
    }
}

handle_element!(SurfPoint, native::surf_point_delete);

impl PartialEq for SurfPoint {
    fn eq(&self, other: &Self) -> bool {
        self.center() == other.center()
            && self.scale() == other.scale()
            && self.score() == other.score()
            && self.laplacian() == other.laplacian()
            && self.angle() == other.angle()
            && self.descriptor() == other.descriptor()
    }
}

impl fmt::Debug for SurfPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfPoint")
            .field("center", &self.center())
            .field("scale", &self.scale())
            .field("score", &self.score())
            .field("laplacian", &self.laplacian())
            .field("angle", &self.angle())
            .finish_non_exhaustive()
    }
}

/// Size and label of one detector window.
pub struct DetectorWindowDetails {
    object: NativeObject,
}

impl DetectorWindowDetails {
    /// Create foreign detector window details.
    pub fn new(width: u64, height: u64, label: &str) -> Result<Self, StdVectorError> {
        // SAFETY: `label` is valid for `label.len()` reads.
        let ptr = unsafe {
            native::detector_window_details_new(width, height, label.as_ptr(), label.len())
        };
        allocated(ptr, native::detector_window_details_delete, "detector_window_details")
            .map(|object| Self { object })
    }

    /// Window width.
    pub fn width(&self) -> u64 {
        // SAFETY: the handle is live for `&self`.
        unsafe { native::detector_window_details_width(self.object.ptr()) }
    }

    /// Window height.
    pub fn height(&self) -> u64 {
        // SAFETY: the handle is live for `&self`.
        unsafe { native::detector_window_details_height(self.object.ptr()) }
    }

    /// Class label.
    pub fn label(&self) -> String {
        // SAFETY: the handle is live for `&self`.
        let ptr = unsafe { native::detector_window_details_label(self.object.ptr()) };
        owned_string(ptr, "detector_window_details_label")
    }
}

handle_element!(DetectorWindowDetails, native::detector_window_details_delete);

impl PartialEq for DetectorWindowDetails {
    fn eq(&self, other: &Self) -> bool {
        (self.width(), self.height()) == (other.width(), other.height())
            && self.label() == other.label()
    }
}

impl fmt::Debug for DetectorWindowDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectorWindowDetails")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("label", &self.label())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_vector_values() {
        let v = ColumnVector::new(&[0.5, 1.5, -3.0]).unwrap();
        assert_eq!(v.len(), 3);
        assert_eq!(v.as_slice(), [0.5, 1.5, -3.0]);
        assert!(ColumnVector::new(&[]).unwrap().is_empty());
    }

    #[test]
    fn chip_details_fields() {
        let c = ChipDetails::new(Rectangle::new(0, 0, 99, 49), 0.25, 32, 64).unwrap();
        assert_eq!(c.rect().width(), 100);
        assert_eq!(c.angle(), 0.25);
        assert_eq!((c.rows(), c.cols()), (32, 64));
    }

    #[test]
    fn surf_point_fields() {
        let mut des = [0.0; SURF_DESCRIPTOR_LEN];
        des[7] = 0.75;
        let p = SurfPoint::new(DPoint::new(4.0, 2.5), 1.5, 0.9, -1.0, 0.3, &des).unwrap();
        assert_eq!(p.center(), DPoint::new(4.0, 2.5));
        assert_eq!(p.scale(), 1.5);
        assert_eq!(p.laplacian(), -1.0);
        assert_eq!(p.descriptor(), des);
    }

    #[test]
    fn detector_window_details_fields() {
        let d = DetectorWindowDetails::new(40, 40, "face").unwrap();
        assert_eq!((d.width(), d.height()), (40, 40));
        assert_eq!(d.label(), "face");
        assert_eq!(d, DetectorWindowDetails::new(40, 40, "face").unwrap());
        assert_ne!(d, DetectorWindowDetails::new(40, 80, "face").unwrap());
    }
}
