//! Detector outputs held by the foreign side.

#![allow(unsafe_code)]

use std::fmt;

use ffivec_core::StdVectorError;
use ffivec_native::objects as native;
use ffivec_native::{NativePoint, NativeRectangle};

use crate::geometry::{Point, Rectangle};
use crate::object::{allocated, read_out, NativeObject, OutGetter};
use crate::string::owned_string;

pub(crate) fn read_rect(object: &NativeObject, get: OutGetter<NativeRectangle>) -> Rectangle {
    read_out(object, get).into()
}

/// A training or detection rectangle with confidence, ignore flag, and
/// label.
pub struct MModRect {
    object: NativeObject,
}

impl MModRect {
    /// Create a foreign mmod rect.
    pub fn new(
        rect: Rectangle,
        confidence: f64,
        ignore: bool,
        label: &str,
    ) -> Result<Self, StdVectorError> {
        // SAFETY: `label` is valid for `label.len()` reads.
        let ptr = unsafe {
            native::mmod_rect_new(rect.into(), confidence, ignore, label.as_ptr(), label.len())
        };
        allocated(ptr, native::mmod_rect_delete, "mmod_rect").map(|object| Self { object })
    }

    /// Bounding rectangle.
    pub fn rect(&self) -> Rectangle {
        read_rect(&self.object, native::mmod_rect_get_rect)
    }

    /// Detection confidence.
    pub fn confidence(&self) -> f64 {
        // SAFETY: the handle is live for `&self`.
        unsafe { native::mmod_rect_confidence(self.object.ptr()) }
    }

    /// Whether training should ignore this box.
    pub fn ignore(&self) -> bool {
        // SAFETY: the handle is live for `&self`.
        unsafe { native::mmod_rect_ignore(self.object.ptr()) }
    }

    /// Class label.
    pub fn label(&self) -> String {
        // SAFETY: the handle is live for `&self`; the result is a fresh
        // string reference.
        owned_string(unsafe { native::mmod_rect_label(self.object.ptr()) }, "mmod_rect_label")
    }
}

handle_element!(MModRect, native::mmod_rect_delete);

impl PartialEq for MModRect {
    fn eq(&self, other: &Self) -> bool {
        self.rect() == other.rect()
            && self.confidence() == other.confidence()
            && self.ignore() == other.ignore()
            && self.label() == other.label()
    }
}

impl fmt::Debug for MModRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MModRect")
            .field("rect", &self.rect())
            .field("confidence", &self.confidence())
            .field("ignore", &self.ignore())
            .field("label", &self.label())
            .finish()
    }
}

/// A detection rectangle with confidence and weight index.
pub struct RectDetection {
    object: NativeObject,
}

impl RectDetection {
    /// Create a foreign rect detection.
    pub fn new(rect: Rectangle, confidence: f64, weight_index: u64) -> Result<Self, StdVectorError> {
        let ptr = native::rect_detection_new(rect.into(), confidence, weight_index);
        allocated(ptr, native::rect_detection_delete, "rect_detection").map(|object| Self { object })
    }

    /// Bounding rectangle.
    pub fn rect(&self) -> Rectangle {
        read_rect(&self.object, native::rect_detection_get_rect)
    }

    /// Detection confidence.
    pub fn confidence(&self) -> f64 {
        // SAFETY: the handle is live for `&self`.
        unsafe { native::rect_detection_confidence(self.object.ptr()) }
    }

    /// Index of the detector weight that produced this detection.
    pub fn weight_index(&self) -> u64 {
        // SAFETY: the handle is live for `&self`.
        unsafe { native::rect_detection_weight_index(self.object.ptr()) }
    }
}

handle_element!(RectDetection, native::rect_detection_delete);

impl PartialEq for RectDetection {
    fn eq(&self, other: &Self) -> bool {
        self.rect() == other.rect()
            && self.confidence() == other.confidence()
            && self.weight_index() == other.weight_index()
    }
}

impl fmt::Debug for RectDetection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RectDetection")
            .field("rect", &self.rect())
            .field("confidence", &self.confidence())
            .field("weight_index", &self.weight_index())
            .finish()
    }
}

/// A detection rectangle with landmark parts.
pub struct FullObjectDetection {
    object: NativeObject,
}

impl FullObjectDetection {
    /// Create a foreign full object detection.
    pub fn new(rect: Rectangle, parts: &[Point]) -> Result<Self, StdVectorError> {
        let parts: Vec<NativePoint> = parts.iter().copied().map(NativePoint::from).collect();
        // SAFETY: `parts` is valid for `parts.len()` reads.
        let ptr =
            unsafe { native::full_object_detection_new(rect.into(), parts.as_ptr(), parts.len()) };
        allocated(ptr, native::full_object_detection_delete, "full_object_detection")
            .map(|object| Self { object })
    }

    /// Bounding rectangle.
    pub fn rect(&self) -> Rectangle {
        read_rect(&self.object, native::full_object_detection_get_rect)
    }

    /// Number of landmark parts.
    pub fn num_parts(&self) -> usize {
        // SAFETY: the handle is live for `&self`.
        unsafe { native::full_object_detection_num_parts(self.object.ptr()) }
    }

    /// Landmark `index`, or `None` when out of range.
    pub fn part(&self, index: usize) -> Option<Point> {
        let mut out = NativePoint::default();
        // SAFETY: the handle is live for `&self`.
        let found =
            unsafe { native::full_object_detection_get_part(self.object.ptr(), index, &mut out) };
        found.then(|| out.into())
    }

    /// Every landmark, in order.
    pub fn parts(&self) -> Vec<Point> {
        (0..self.num_parts()).filter_map(|i| self.part(i)).collect()
    }
}

handle_element!(FullObjectDetection, native::full_object_detection_delete);

impl PartialEq for FullObjectDetection {
    fn eq(&self, other: &Self) -> bool {
        self.rect() == other.rect() && self.parts() == other.parts()
    }
}

impl Eq for FullObjectDetection {}

impl fmt::Debug for FullObjectDetection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FullObjectDetection")
            .field("rect", &self.rect())
            .field("parts", &self.parts())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mmod_rect_fields() {
        let m = MModRect::new(Rectangle::new(0, 0, 9, 9), 0.9, false, "cat").unwrap();
        assert_eq!(m.rect(), Rectangle::new(0, 0, 9, 9));
        assert_eq!(m.confidence(), 0.9);
        assert!(!m.ignore());
        assert_eq!(m.label(), "cat");
    }

    #[test]
    fn rect_detection_fields() {
        let d = RectDetection::new(Rectangle::new(1, 1, 2, 2), 0.25, 4).unwrap();
        assert_eq!(d.rect().area(), 4);
        assert_eq!(d.confidence(), 0.25);
        assert_eq!(d.weight_index(), 4);
    }

    #[test]
    fn full_object_detection_parts() {
        let parts = [Point::new(1, 2), Point::new(3, 4), Point::new(5, 6)];
        let d = FullObjectDetection::new(Rectangle::new(0, 0, 10, 10), &parts).unwrap();
        assert_eq!(d.num_parts(), 3);
        assert_eq!(d.part(2), Some(Point::new(5, 6)));
        assert_eq!(d.part(3), None);
        assert_eq!(d.parts(), parts);
    }

    #[test]
    fn structural_equality() {
        let a = RectDetection::new(Rectangle::new(0, 0, 1, 1), 0.5, 1).unwrap();
        let b = RectDetection::new(Rectangle::new(0, 0, 1, 1), 0.5, 1).unwrap();
        let c = RectDetection::new(Rectangle::new(0, 0, 1, 1), 0.5, 2).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
