//! Image dataset metadata held by the foreign side.

#![allow(unsafe_code)]

use std::fmt;
use std::ptr;

use ffivec_core::StdVectorError;
use ffivec_native::dataset::{self as native, NativeBoxAttributes};
use ffivec_native::NativePoint;

use crate::detection::read_rect;
use crate::element::Element;
use crate::geometry::{Point, Rectangle};
use crate::object::{allocated, read_out, NativeObject};
use crate::string::{owned_string, StdString};

/// Flags and scalar annotations of a [`DatasetBox`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoxAttributes {
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

impl From<BoxAttributes> for NativeBoxAttributes {
    fn from(a: BoxAttributes) -> Self {
        NativeBoxAttributes {
            difficult: a.difficult,
            truncated: a.truncated,
            occluded: a.occluded,
            ignore: a.ignore,
            pose: a.pose,
            detection_score: a.detection_score,
            angle: a.angle,
        }
    }
}

impl From<NativeBoxAttributes> for BoxAttributes {
    fn from(a: NativeBoxAttributes) -> Self {
        Self {
            difficult: a.difficult,
            truncated: a.truncated,
            occluded: a.occluded,
            ignore: a.ignore,
            pose: a.pose,
            detection_score: a.detection_score,
            angle: a.angle,
        }
    }
}

/// One annotated object in a dataset image.
///
/// Named parts come back in name order, and a name given twice keeps its
/// last point.
pub struct DatasetBox {
    object: NativeObject,
}

impl DatasetBox {
    /// Create a foreign box with named landmark `parts`.
    pub fn new(
        rect: Rectangle,
        label: &str,
        attributes: BoxAttributes,
        parts: &[(&str, Point)],
    ) -> Result<Self, StdVectorError> {
        let names = parts
            .iter()
            .map(|(name, _)| StdString::new(name))
            .collect::<Result<Vec<_>, _>>()?;
        let name_handles: Vec<_> = names
            .iter()
            .map(|n| n.foreign_handle().map_or(ptr::null_mut(), |h| h.as_ptr()))
            .collect();
        let points: Vec<NativePoint> = parts.iter().map(|&(_, p)| p.into()).collect();
        // SAFETY: `label` is valid for `label.len()` reads; `name_handles`
        // and `points` are both valid for `parts.len()` reads, and every
        // name handle is kept alive by `names` for the call.
        let ptr = unsafe {
            native::dataset_box_new(
                rect.into(),
                attributes.into(),
                label.as_ptr(),
                label.len(),
                name_handles.as_ptr(),
                points.as_ptr(),
                points.len(),
            )
        };
        allocated(ptr, native::dataset_box_delete, "dataset_box").map(|object| Self { object })
    }

    /// Bounding rectangle.
    pub fn rect(&self) -> Rectangle {
        read_rect(&self.object, native::dataset_box_get_rect)
    }

    /// Class label.
    pub fn label(&self) -> String {
        // SAFETY: the handle is live for `&self`.
        let ptr = unsafe { native::dataset_box_label(self.object.ptr()) };
        owned_string(ptr, "dataset_box_label")
    }

    /// Flags and scalar annotations.
    pub fn attributes(&self) -> BoxAttributes {
        read_out::<NativeBoxAttributes>(&self.object, native::dataset_box_get_attributes).into()
    }

    /// Named landmarks, in name order.
    pub fn parts(&self) -> Vec<(String, Point)> {
        let b = self.object.ptr();
        // SAFETY: the handle is live for `&self`.
        let n = unsafe { native::dataset_box_num_parts(b) };
        (0..n)
            .filter_map(|i| {
                let mut point = NativePoint::default();
                // SAFETY: as above; `i` is in range.
                let found = unsafe { native::dataset_box_get_part(b, i, &mut point) };
                let name = owned_string(
                    // SAFETY: as above.
                    unsafe { native::dataset_box_part_name(b, i) },
                    "dataset_box_part_name",
                );
                found.then(|| (name, point.into()))
            })
            .collect()
    }
}

handle_element!(DatasetBox, native::dataset_box_delete);

impl PartialEq for DatasetBox {
    fn eq(&self, other: &Self) -> bool {
        self.rect() == other.rect()
            && self.label() == other.label()
            && self.attributes() == other.attributes()
            && self.parts() == other.parts()
    }
}

impl fmt::Debug for DatasetBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetBox")
            .field("rect", &self.rect())
            .field("label", &self.label())
            .field("attributes", &self.attributes())
            .field("parts", &self.parts())
            .finish()
    }
}

/// A dataset image: a filename and the boxes annotated on it.
///
/// The image holds its own copies of the boxes; reading them back gives
/// fresh, independently owned boxes.
pub struct DatasetImage {
    object: NativeObject,
}

impl DatasetImage {
    /// Create a foreign image, copying `boxes` in.
    pub fn new(filename: &str, boxes: &[DatasetBox]) -> Result<Self, StdVectorError> {
        let handles: Vec<_> = boxes.iter().map(|b| b.object.ptr()).collect();
        // SAFETY: `filename` is valid for `filename.len()` reads and
        // `handles` holds live box handles borrowed from `boxes`.
        let ptr = unsafe {
            native::dataset_image_new(
                filename.as_ptr(),
                filename.len(),
                handles.as_ptr(),
                handles.len(),
            )
        };
        allocated(ptr, native::dataset_image_delete, "dataset_image").map(|object| Self { object })
    }

    /// Image file path.
    pub fn filename(&self) -> String {
        // SAFETY: the handle is live for `&self`.
        let ptr = unsafe { native::dataset_image_filename(self.object.ptr()) };
        owned_string(ptr, "dataset_image_filename")
    }

    /// Number of annotated boxes.
    pub fn num_boxes(&self) -> usize {
        // SAFETY: the handle is live for `&self`.
        unsafe { native::dataset_image_num_boxes(self.object.ptr()) }
    }

    /// A copy of box `index`, or `None` when out of range.
    pub fn get_box(&self, index: usize) -> Option<DatasetBox> {
        // SAFETY: the handle is live for `&self`; the result is a fresh
        // box reference.
        let ptr = unsafe { native::dataset_image_get_box(self.object.ptr(), index) };
        allocated(ptr, native::dataset_box_delete, "dataset_image_get_box")
            .ok()
            .map(|object| DatasetBox { object })
    }

    /// Copies of every box, in order.
    pub fn boxes(&self) -> Vec<DatasetBox> {
        (0..self.num_boxes()).filter_map(|i| self.get_box(i)).collect()
    }
}

handle_element!(DatasetImage, native::dataset_image_delete);

impl PartialEq for DatasetImage {
    fn eq(&self, other: &Self) -> bool {
        self.filename() == other.filename() && self.boxes() == other.boxes()
    }
}

impl fmt::Debug for DatasetImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetImage")
            .field("filename", &self.filename())
            .field("boxes", &self.boxes())
            .finish()
    }
}
