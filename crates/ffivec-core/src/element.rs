//! Registered element types and matrix numeric kinds.

use std::fmt;

use crate::category::ElementCategory;

/// An element type with an explicit registry entry.
///
/// Each variant names one foreign function family
/// (`stdvector_<label>_<op>`, see [`abi_label`](Self::abi_label)) and maps
/// to exactly one [`ElementCategory`]. The matrix family is not listed here:
/// it is recognised structurally through [`MatrixElementType`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementType {
    /// `i32`.
    Int32,
    /// `u32`.
    UInt32,
    /// `i64`.
    Long,
    /// `f64`.
    Double,
    /// Integer 2D point.
    Point,
    /// Floating-point 2D point.
    DPoint,
    /// Integer rectangle with inclusive bounds.
    Rectangle,
    /// Foreign byte string.
    StdString,
    /// Detector training rectangle with confidence, ignore flag, and label.
    MModRect,
    /// Detection rectangle with confidence and weight index.
    RectDetection,
    /// Detection rectangle with landmark parts.
    FullObjectDetection,
    /// Weighted pair of sample indices.
    SamplePair,
    /// Column vector of `f64`.
    VectorDouble,
    /// Image chip location: rectangle, rotation, and output size.
    ChipDetails,
    /// SURF interest point with its descriptor.
    SurfPoint,
    /// Line segment overlaid on an image window.
    OverlayLine,
    /// Coloured 3D dot overlaid on a perspective window.
    OverlayDot,
    /// Labelled rectangle overlaid on an image display.
    OverlayRect,
    /// Annotated image in a dataset metadata file.
    DatasetImage,
    /// Annotated box in a dataset metadata file.
    DatasetBox,
    /// Detector window size and label.
    DetectorWindowDetails,
    /// Container of `f64` containers.
    StdVectorDouble,
    /// Container of rectangle containers.
    StdVectorRectangle,
    /// Container of mmod-rect containers.
    StdVectorMModRect,
    /// Container of full-object-detection containers.
    StdVectorFullObjectDetection,
}

impl ElementType {
    /// Every registered element type, in registry order.
    pub const ALL: [ElementType; 25] = [
        Self::Int32,
        Self::UInt32,
        Self::Long,
        Self::Double,
        Self::Point,
        Self::DPoint,
        Self::Rectangle,
        Self::StdString,
        Self::MModRect,
        Self::RectDetection,
        Self::FullObjectDetection,
        Self::SamplePair,
        Self::VectorDouble,
        Self::ChipDetails,
        Self::SurfPoint,
        Self::OverlayLine,
        Self::OverlayDot,
        Self::OverlayRect,
        Self::DatasetImage,
        Self::DatasetBox,
        Self::DetectorWindowDetails,
        Self::StdVectorDouble,
        Self::StdVectorRectangle,
        Self::StdVectorMModRect,
        Self::StdVectorFullObjectDetection,
    ];

    /// The category strategy this element type uses.
    pub fn category(self) -> ElementCategory {
        match self {
            Self::Int32 => ElementCategory::Int32,
            Self::UInt32 => ElementCategory::UInt32,
            Self::Long => ElementCategory::Int64,
            Self::Double => ElementCategory::Double,
            Self::Point | Self::DPoint | Self::Rectangle => ElementCategory::FixedLayoutStruct,
            Self::StdString
            | Self::MModRect
            | Self::RectDetection
            | Self::FullObjectDetection
            | Self::SamplePair
            | Self::VectorDouble
            | Self::ChipDetails
            | Self::SurfPoint
            | Self::OverlayLine
            | Self::OverlayDot
            | Self::OverlayRect
            | Self::DatasetImage
            | Self::DatasetBox
            | Self::DetectorWindowDetails => ElementCategory::OwningHandleObject,
            Self::StdVectorDouble
            | Self::StdVectorRectangle
            | Self::StdVectorMModRect
            | Self::StdVectorFullObjectDetection => ElementCategory::NestedContainer,
        }
    }

    /// The infix used in the foreign function names for this type.
    pub fn abi_label(self) -> &'static str {
        match self {
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::Long => "long",
            Self::Double => "double",
            Self::Point => "point",
            Self::DPoint => "dpoint",
            Self::Rectangle => "rectangle",
            Self::StdString => "string",
            Self::MModRect => "mmod_rect",
            Self::RectDetection => "rect_detection",
            Self::FullObjectDetection => "full_object_detection",
            Self::SamplePair => "sample_pair",
            Self::VectorDouble => "vector_double",
            Self::ChipDetails => "chip_details",
            Self::SurfPoint => "surf_point",
            Self::OverlayLine => "image_window_overlay_line",
            Self::OverlayDot => "perspective_window_overlay_dot",
            Self::OverlayRect => "image_display_overlay_rect",
            Self::DatasetImage => "image_dataset_metadata_image",
            Self::DatasetBox => "image_dataset_metadata_box",
            Self::DetectorWindowDetails => "mmod_options_detector_window_details",
            Self::StdVectorDouble => "stdvector_double",
            Self::StdVectorRectangle => "stdvector_rectangle",
            Self::StdVectorMModRect => "stdvector_mmod_rect",
            Self::StdVectorFullObjectDetection => "stdvector_full_object_detection",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abi_label())
    }
}

/// Numeric kind of a matrix element.
///
/// The discriminants are the ABI codes threaded through every
/// `stdvector_matrix_*` and `matrix_*` call. Values are ABI-stable.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MatrixElementType {
    /// `u8`.
    UInt8 = 0,
    /// `u16`.
    UInt16 = 1,
    /// `u32`.
    UInt32 = 2,
    /// `i8`.
    Int8 = 3,
    /// `i16`.
    Int16 = 4,
    /// `i32`.
    Int32 = 5,
    /// `f32`.
    Float = 6,
    /// `f64`.
    Double = 7,
    /// 8-bit red, green, blue.
    RgbPixel = 8,
    /// 8-bit red, green, blue, alpha.
    RgbAlphaPixel = 9,
    /// 8-bit hue, saturation, intensity.
    HsiPixel = 10,
}

impl MatrixElementType {
    /// The ABI code passed to the foreign side.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Parse an ABI code. Returns `None` for unknown codes.
    pub fn from_code(code: i32) -> Option<Self> {
        let kind = match code {
            0 => Self::UInt8,
            1 => Self::UInt16,
            2 => Self::UInt32,
            3 => Self::Int8,
            4 => Self::Int16,
            5 => Self::Int32,
            6 => Self::Float,
            7 => Self::Double,
            8 => Self::RgbPixel,
            9 => Self::RgbAlphaPixel,
            10 => Self::HsiPixel,
            _ => return None,
        };
        Some(kind)
    }

    /// Size of one element in bytes.
    pub fn element_size(self) -> usize {
        match self {
            Self::UInt8 | Self::Int8 => 1,
            Self::UInt16 | Self::Int16 => 2,
            Self::UInt32 | Self::Int32 | Self::Float | Self::RgbAlphaPixel => 4,
            Self::Double => 8,
            Self::RgbPixel | Self::HsiPixel => 3,
        }
    }
}

impl fmt::Display for MatrixElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Float => "float",
            Self::Double => "double",
            Self::RgbPixel => "rgb_pixel",
            Self::RgbAlphaPixel => "rgb_alpha_pixel",
            Self::HsiPixel => "hsi_pixel",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abi_labels_are_unique() {
        let mut labels: Vec<_> = ElementType::ALL.iter().map(|t| t.abi_label()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), ElementType::ALL.len());
    }

    #[test]
    fn nested_types_are_nested_containers() {
        for t in [
            ElementType::StdVectorDouble,
            ElementType::StdVectorRectangle,
            ElementType::StdVectorMModRect,
            ElementType::StdVectorFullObjectDetection,
        ] {
            assert_eq!(t.category(), ElementCategory::NestedContainer);
            assert!(t.abi_label().starts_with("stdvector_"));
        }
    }

    #[test]
    fn annotation_types_are_handle_objects() {
        for t in [
            ElementType::VectorDouble,
            ElementType::ChipDetails,
            ElementType::SurfPoint,
            ElementType::OverlayLine,
            ElementType::OverlayDot,
            ElementType::OverlayRect,
            ElementType::DatasetImage,
            ElementType::DatasetBox,
            ElementType::DetectorWindowDetails,
        ] {
            assert_eq!(t.category(), ElementCategory::OwningHandleObject);
        }
        assert_eq!(
            ElementType::DetectorWindowDetails.abi_label(),
            "mmod_options_detector_window_details"
        );
    }

    #[test]
    fn long_maps_to_int64() {
        assert_eq!(ElementType::Long.category(), ElementCategory::Int64);
    }

    #[test]
    fn matrix_codes_are_stable() {
        assert_eq!(MatrixElementType::UInt8.code(), 0);
        assert_eq!(MatrixElementType::Double.code(), 7);
        assert_eq!(MatrixElementType::HsiPixel.code(), 10);
    }

    #[test]
    fn matrix_code_round_trip() {
        for code in 0..=10 {
            let kind = MatrixElementType::from_code(code).unwrap();
            assert_eq!(kind.code(), code);
        }
        assert_eq!(MatrixElementType::from_code(11), None);
        assert_eq!(MatrixElementType::from_code(-1), None);
    }

    #[test]
    fn pixel_sizes() {
        assert_eq!(MatrixElementType::RgbPixel.element_size(), 3);
        assert_eq!(MatrixElementType::RgbAlphaPixel.element_size(), 4);
        assert_eq!(MatrixElementType::HsiPixel.element_size(), 3);
    }
}
