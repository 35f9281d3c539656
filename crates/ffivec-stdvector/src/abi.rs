//! Foreign function tables, one per `stdvector_<label>_*` family.
//!
//! Strategies never name a foreign function directly; they hold a
//! `&'static` table and call through it. The tables here bind to the
//! reference runtime in `ffivec-native`.

use std::any::Any;
use std::ffi::c_void;

use ffivec_core::ElementType;
use ffivec_native::{handle_vector as hv, matrix_vector as mv, struct_vector as sv};
use ffivec_native::value_vector as vv;

/// Foreign functions for a container of plain values of type `T`.
///
/// `new3` reads `len` values. There is no bulk copy: `getPointer`
/// addresses `getSize` contiguous values that the caller reads directly.
pub struct ValueFns<T: 'static> {
    /// Function family prefix, e.g. `stdvector_int32`.
    pub family: &'static str,
    pub(crate) new1: unsafe extern "C" fn() -> *mut c_void,
    pub(crate) new2: unsafe extern "C" fn(usize) -> *mut c_void,
    pub(crate) new3: unsafe extern "C" fn(*const T, usize) -> *mut c_void,
    pub(crate) delete: unsafe extern "C" fn(*mut c_void),
    pub(crate) get_pointer: unsafe extern "C" fn(*mut c_void) -> *mut c_void,
    pub(crate) get_size: unsafe extern "C" fn(*mut c_void) -> usize,
}

/// Foreign functions for a container whose elements cross the boundary as
/// handles.
pub struct HandleFns {
    /// Function family prefix, e.g. `stdvector_rectangle`.
    pub family: &'static str,
    pub(crate) new1: unsafe extern "C" fn() -> *mut c_void,
    pub(crate) new2: unsafe extern "C" fn(usize) -> *mut c_void,
    pub(crate) new3: unsafe extern "C" fn(*const *mut c_void, usize) -> *mut c_void,
    pub(crate) delete: unsafe extern "C" fn(*mut c_void),
    pub(crate) get_pointer: unsafe extern "C" fn(*mut c_void) -> *mut c_void,
    pub(crate) get_size: unsafe extern "C" fn(*mut c_void) -> usize,
    pub(crate) copy: unsafe extern "C" fn(*mut c_void, *mut *mut c_void),
}

/// Foreign functions for matrix containers. Every call leads with the
/// element code and the two template dimensions.
pub struct MatrixFns {
    /// Function family prefix.
    pub family: &'static str,
    pub(crate) new1: unsafe extern "C" fn(i32, u32, u32) -> *mut c_void,
    pub(crate) new2: unsafe extern "C" fn(i32, u32, u32, usize) -> *mut c_void,
    pub(crate) new3: unsafe extern "C" fn(i32, u32, u32, *const *mut c_void, usize) -> *mut c_void,
    pub(crate) delete: unsafe extern "C" fn(i32, u32, u32, *mut c_void),
    pub(crate) get_pointer: unsafe extern "C" fn(i32, u32, u32, *mut c_void) -> *mut c_void,
    pub(crate) get_size: unsafe extern "C" fn(i32, u32, u32, *mut c_void) -> usize,
    pub(crate) copy: unsafe extern "C" fn(i32, u32, u32, *mut c_void, *mut *mut c_void),
}

macro_rules! table {
    (
        $name:ident: $table:ident $(<$g:ty>)? = $family:literal,
        $m:ident::{$new1:ident, $new2:ident, $new3:ident, $delete:ident,
                   $get_pointer:ident, $get_size:ident $(, $copy:ident)?}
    ) => {
        pub(crate) static $name: $table $(<$g>)? = $table $(::<$g>)? {
            family: $family,
            new1: $m::$new1,
            new2: $m::$new2,
            new3: $m::$new3,
            delete: $m::$delete,
            get_pointer: $m::$get_pointer,
            get_size: $m::$get_size,
            $(copy: $m::$copy,)?
        };
    };
}

table!(INT32: ValueFns<i32> = "stdvector_int32", vv::{
    stdvector_int32_new1, stdvector_int32_new2, stdvector_int32_new3, stdvector_int32_delete,
    stdvector_int32_getPointer, stdvector_int32_getSize
});
table!(UINT32: ValueFns<u32> = "stdvector_uint32", vv::{
    stdvector_uint32_new1, stdvector_uint32_new2, stdvector_uint32_new3, stdvector_uint32_delete,
    stdvector_uint32_getPointer, stdvector_uint32_getSize
});
table!(LONG: ValueFns<i64> = "stdvector_long", vv::{
    stdvector_long_new1, stdvector_long_new2, stdvector_long_new3, stdvector_long_delete,
    stdvector_long_getPointer, stdvector_long_getSize
});
table!(DOUBLE: ValueFns<f64> = "stdvector_double", vv::{
    stdvector_double_new1, stdvector_double_new2, stdvector_double_new3, stdvector_double_delete,
    stdvector_double_getPointer, stdvector_double_getSize
});

table!(POINT: HandleFns = "stdvector_point", sv::{
    stdvector_point_new1, stdvector_point_new2, stdvector_point_new3, stdvector_point_delete,
    stdvector_point_getPointer, stdvector_point_getSize, stdvector_point_copy
});
table!(DPOINT: HandleFns = "stdvector_dpoint", sv::{
    stdvector_dpoint_new1, stdvector_dpoint_new2, stdvector_dpoint_new3, stdvector_dpoint_delete,
    stdvector_dpoint_getPointer, stdvector_dpoint_getSize, stdvector_dpoint_copy
});
table!(RECTANGLE: HandleFns = "stdvector_rectangle", sv::{
    stdvector_rectangle_new1, stdvector_rectangle_new2, stdvector_rectangle_new3,
    stdvector_rectangle_delete, stdvector_rectangle_getPointer, stdvector_rectangle_getSize,
    stdvector_rectangle_copy
});

table!(STRING: HandleFns = "stdvector_string", hv::{
    stdvector_string_new1, stdvector_string_new2, stdvector_string_new3, stdvector_string_delete,
    stdvector_string_getPointer, stdvector_string_getSize, stdvector_string_copy
});
table!(MMOD_RECT: HandleFns = "stdvector_mmod_rect", hv::{
    stdvector_mmod_rect_new1, stdvector_mmod_rect_new2, stdvector_mmod_rect_new3,
    stdvector_mmod_rect_delete, stdvector_mmod_rect_getPointer, stdvector_mmod_rect_getSize,
    stdvector_mmod_rect_copy
});
table!(RECT_DETECTION: HandleFns = "stdvector_rect_detection", hv::{
    stdvector_rect_detection_new1, stdvector_rect_detection_new2, stdvector_rect_detection_new3,
    stdvector_rect_detection_delete, stdvector_rect_detection_getPointer,
    stdvector_rect_detection_getSize, stdvector_rect_detection_copy
});
table!(FULL_OBJECT_DETECTION: HandleFns = "stdvector_full_object_detection", hv::{
    stdvector_full_object_detection_new1, stdvector_full_object_detection_new2,
    stdvector_full_object_detection_new3, stdvector_full_object_detection_delete,
    stdvector_full_object_detection_getPointer, stdvector_full_object_detection_getSize,
    stdvector_full_object_detection_copy
});
table!(SAMPLE_PAIR: HandleFns = "stdvector_sample_pair", hv::{
    stdvector_sample_pair_new1, stdvector_sample_pair_new2, stdvector_sample_pair_new3,
    stdvector_sample_pair_delete, stdvector_sample_pair_getPointer,
    stdvector_sample_pair_getSize, stdvector_sample_pair_copy
});

table!(VECTOR_DOUBLE: HandleFns = "stdvector_vector_double", hv::{
    stdvector_vector_double_new1, stdvector_vector_double_new2, stdvector_vector_double_new3,
    stdvector_vector_double_delete, stdvector_vector_double_getPointer,
    stdvector_vector_double_getSize, stdvector_vector_double_copy
});
table!(CHIP_DETAILS: HandleFns = "stdvector_chip_details", hv::{
    stdvector_chip_details_new1, stdvector_chip_details_new2, stdvector_chip_details_new3,
    stdvector_chip_details_delete, stdvector_chip_details_getPointer,
    stdvector_chip_details_getSize, stdvector_chip_details_copy
});
table!(SURF_POINT: HandleFns = "stdvector_surf_point", hv::{
    stdvector_surf_point_new1, stdvector_surf_point_new2, stdvector_surf_point_new3,
    stdvector_surf_point_delete, stdvector_surf_point_getPointer, stdvector_surf_point_getSize,
    stdvector_surf_point_copy
});
table!(OVERLAY_LINE: HandleFns = "stdvector_image_window_overlay_line", hv::{
    stdvector_image_window_overlay_line_new1, stdvector_image_window_overlay_line_new2,
    stdvector_image_window_overlay_line_new3, stdvector_image_window_overlay_line_delete,
    stdvector_image_window_overlay_line_getPointer, stdvector_image_window_overlay_line_getSize,
    stdvector_image_window_overlay_line_copy
});
table!(OVERLAY_DOT: HandleFns = "stdvector_perspective_window_overlay_dot", hv::{
    stdvector_perspective_window_overlay_dot_new1, stdvector_perspective_window_overlay_dot_new2,
    stdvector_perspective_window_overlay_dot_new3, stdvector_perspective_window_overlay_dot_delete,
    stdvector_perspective_window_overlay_dot_getPointer,
    stdvector_perspective_window_overlay_dot_getSize, stdvector_perspective_window_overlay_dot_copy
});
table!(OVERLAY_RECT: HandleFns = "stdvector_image_display_overlay_rect", hv::{
    stdvector_image_display_overlay_rect_new1, stdvector_image_display_overlay_rect_new2,
    stdvector_image_display_overlay_rect_new3, stdvector_image_display_overlay_rect_delete,
    stdvector_image_display_overlay_rect_getPointer, stdvector_image_display_overlay_rect_getSize,
    stdvector_image_display_overlay_rect_copy
});
table!(DATASET_IMAGE: HandleFns = "stdvector_image_dataset_metadata_image", hv::{
    stdvector_image_dataset_metadata_image_new1, stdvector_image_dataset_metadata_image_new2,
    stdvector_image_dataset_metadata_image_new3, stdvector_image_dataset_metadata_image_delete,
    stdvector_image_dataset_metadata_image_getPointer,
    stdvector_image_dataset_metadata_image_getSize, stdvector_image_dataset_metadata_image_copy
});
table!(DATASET_BOX: HandleFns = "stdvector_image_dataset_metadata_box", hv::{
    stdvector_image_dataset_metadata_box_new1, stdvector_image_dataset_metadata_box_new2,
    stdvector_image_dataset_metadata_box_new3, stdvector_image_dataset_metadata_box_delete,
    stdvector_image_dataset_metadata_box_getPointer, stdvector_image_dataset_metadata_box_getSize,
    stdvector_image_dataset_metadata_box_copy
});
table!(DETECTOR_WINDOW_DETAILS: HandleFns = "stdvector_mmod_options_detector_window_details", hv::{
    stdvector_mmod_options_detector_window_details_new1,
    stdvector_mmod_options_detector_window_details_new2,
    stdvector_mmod_options_detector_window_details_new3,
    stdvector_mmod_options_detector_window_details_delete,
    stdvector_mmod_options_detector_window_details_getPointer,
    stdvector_mmod_options_detector_window_details_getSize,
    stdvector_mmod_options_detector_window_details_copy
});

table!(STDVECTOR_DOUBLE: HandleFns = "stdvector_stdvector_double", hv::{
    stdvector_stdvector_double_new1, stdvector_stdvector_double_new2,
    stdvector_stdvector_double_new3, stdvector_stdvector_double_delete,
    stdvector_stdvector_double_getPointer, stdvector_stdvector_double_getSize,
    stdvector_stdvector_double_copy
});
table!(STDVECTOR_RECTANGLE: HandleFns = "stdvector_stdvector_rectangle", hv::{
    stdvector_stdvector_rectangle_new1, stdvector_stdvector_rectangle_new2,
    stdvector_stdvector_rectangle_new3, stdvector_stdvector_rectangle_delete,
    stdvector_stdvector_rectangle_getPointer, stdvector_stdvector_rectangle_getSize,
    stdvector_stdvector_rectangle_copy
});
table!(STDVECTOR_MMOD_RECT: HandleFns = "stdvector_stdvector_mmod_rect", hv::{
    stdvector_stdvector_mmod_rect_new1, stdvector_stdvector_mmod_rect_new2,
    stdvector_stdvector_mmod_rect_new3, stdvector_stdvector_mmod_rect_delete,
    stdvector_stdvector_mmod_rect_getPointer, stdvector_stdvector_mmod_rect_getSize,
    stdvector_stdvector_mmod_rect_copy
});
table!(STDVECTOR_FULL_OBJECT_DETECTION: HandleFns = "stdvector_stdvector_full_object_detection", hv::{
    stdvector_stdvector_full_object_detection_new1,
    stdvector_stdvector_full_object_detection_new2,
    stdvector_stdvector_full_object_detection_new3,
    stdvector_stdvector_full_object_detection_delete,
    stdvector_stdvector_full_object_detection_getPointer,
    stdvector_stdvector_full_object_detection_getSize,
    stdvector_stdvector_full_object_detection_copy
});

table!(MATRIX: MatrixFns = "stdvector_matrix", mv::{
    stdvector_matrix_new1, stdvector_matrix_new2, stdvector_matrix_new3, stdvector_matrix_delete,
    stdvector_matrix_getPointer, stdvector_matrix_getSize, stdvector_matrix_copy
});

/// The value table for `T` under `ty`, if `ty` is a value element type
/// whose table is typed in `T`.
pub(crate) fn value_fns<T: 'static>(ty: ElementType) -> Option<&'static ValueFns<T>> {
    let table: &'static dyn Any = match ty {
        ElementType::Int32 => &INT32,
        ElementType::UInt32 => &UINT32,
        ElementType::Long => &LONG,
        ElementType::Double => &DOUBLE,
        _ => return None,
    };
    table.downcast_ref::<ValueFns<T>>()
}

/// The handle table for `ty`, if `ty` crosses the boundary as handles.
pub(crate) fn handle_fns(ty: ElementType) -> Option<&'static HandleFns> {
    let table = match ty {
        ElementType::Int32 | ElementType::UInt32 | ElementType::Long | ElementType::Double => {
            return None
        }
        ElementType::Point => &POINT,
        ElementType::DPoint => &DPOINT,
        ElementType::Rectangle => &RECTANGLE,
        ElementType::StdString => &STRING,
        ElementType::MModRect => &MMOD_RECT,
        ElementType::RectDetection => &RECT_DETECTION,
        ElementType::FullObjectDetection => &FULL_OBJECT_DETECTION,
        ElementType::SamplePair => &SAMPLE_PAIR,
        ElementType::VectorDouble => &VECTOR_DOUBLE,
        ElementType::ChipDetails => &CHIP_DETAILS,
        ElementType::SurfPoint => &SURF_POINT,
        ElementType::OverlayLine => &OVERLAY_LINE,
        ElementType::OverlayDot => &OVERLAY_DOT,
        ElementType::OverlayRect => &OVERLAY_RECT,
        ElementType::DatasetImage => &DATASET_IMAGE,
        ElementType::DatasetBox => &DATASET_BOX,
        ElementType::DetectorWindowDetails => &DETECTOR_WINDOW_DETAILS,
        ElementType::StdVectorDouble => &STDVECTOR_DOUBLE,
        ElementType::StdVectorRectangle => &STDVECTOR_RECTANGLE,
        ElementType::StdVectorMModRect => &STDVECTOR_MMOD_RECT,
        ElementType::StdVectorFullObjectDetection => &STDVECTOR_FULL_OBJECT_DETECTION,
    };
    Some(table)
}

/// The `delete` export of the container family `ty` names.
pub(crate) fn container_delete(ty: ElementType) -> Option<unsafe extern "C" fn(*mut c_void)> {
    match ty {
        ElementType::Int32 => Some(INT32.delete),
        ElementType::UInt32 => Some(UINT32.delete),
        ElementType::Long => Some(LONG.delete),
        ElementType::Double => Some(DOUBLE.delete),
        _ => handle_fns(ty).map(|fns| fns.delete),
    }
}
