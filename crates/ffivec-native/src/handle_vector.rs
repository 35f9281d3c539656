//! Containers of handle-held elements: strings, detections, sample pairs,
//! feature and annotation objects, and containers of containers.
//!
//! The container stores one reference to each element. `new3` retains the
//! handles it is given, so the caller and the container share each
//! element. `copy` hands out a fresh reference per element that the
//! receiver must release with the element type's `*_delete`.

#![allow(unsafe_code)]

use std::ffi::c_void;
use std::ptr;
use std::sync::Arc;

use crate::alloc::try_alloc;
use crate::dataset::{NativeBox, NativeImage};
use crate::features::{
    NativeChipDetails, NativeColumnVector, NativeDetectorWindowDetails, NativeSurfPoint,
};
use crate::objects::{
    raw_slice, NativeFullObjectDetection, NativeMModRect, NativeRectDetection, NativeSamplePair,
    NativeString,
};
use crate::overlay::{NativeOverlayDot, NativeOverlayLine, NativeOverlayRect};
use crate::stats;
use crate::struct_vector::StructVec;
use crate::tracked::{Resource, Tracked};

pub(crate) struct HandleVec<E>(Vec<Arc<Tracked<E>>>);

impl<E> HandleVec<E> {
    fn len(&self) -> usize {
        self.0.len()
    }
}

impl<E> Default for HandleVec<E> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

pub(crate) fn new_empty<E>(label: &str) -> *mut c_void {
    log::debug!("stdvector_{label}: new empty");
    Tracked::publish(HandleVec::<E>::default(), Resource::Container)
}

/// `len` freshly allocated default elements, each counted as `element`.
pub(crate) fn new_sized<E: Default>(label: &str, element: Resource, len: usize) -> *mut c_void {
    let Some(mut elements) = try_alloc::<Arc<Tracked<E>>>(len, label) else {
        return ptr::null_mut();
    };
    elements.extend((0..len).map(|_| Tracked::new(E::default(), element)));
    log::debug!("stdvector_{label}: new with {len} default elements");
    Tracked::publish(HandleVec(elements), Resource::Container)
}

/// # Safety
///
/// A non-null `handles` must be valid for `len` reads, and each entry must
/// be null or a live handle published for `Tracked<E>`.
pub(crate) unsafe fn new_from<E>(
    label: &str,
    handles: *const *mut c_void,
    len: usize,
) -> *mut c_void {
    let Some(src) = raw_slice(handles, len) else {
        log::warn!("stdvector_{label}: null handle array with length {len}");
        return ptr::null_mut();
    };
    let Some(mut elements) = try_alloc::<Arc<Tracked<E>>>(len, label) else {
        return ptr::null_mut();
    };
    for (i, &h) in src.iter().enumerate() {
        match Tracked::<E>::retain(h) {
            Some(element) => elements.push(element),
            None => {
                log::warn!("stdvector_{label}: null element handle at {i}");
                return ptr::null_mut();
            }
        }
    }
    log::debug!("stdvector_{label}: new sharing {len} elements");
    Tracked::publish(HandleVec(elements), Resource::Container)
}

/// # Safety
///
/// `v` must be null or an owned `HandleVec<E>` container handle.
pub(crate) unsafe fn delete<E>(label: &str, v: *mut c_void) {
    if !v.is_null() {
        log::debug!("stdvector_{label}: delete");
    }
    Tracked::<HandleVec<E>>::release(v)
}

/// # Safety
///
/// `v` must be null or a live `HandleVec<E>` container handle.
pub(crate) unsafe fn pointer<E>(v: *const c_void) -> *mut c_void {
    stats::record_pointer_query();
    Tracked::<HandleVec<E>>::borrow(v).map_or(ptr::null_mut(), |v| v.0.as_ptr() as *mut c_void)
}

/// # Safety
///
/// `v` must be null or a live `HandleVec<E>` container handle.
pub(crate) unsafe fn size<E>(v: *const c_void) -> usize {
    Tracked::<HandleVec<E>>::borrow(v).map_or(0, HandleVec::len)
}

/// # Safety
///
/// `v` must be null or a live `HandleVec<E>` container handle; a non-null
/// `dst` must be valid for `size(v)` writes.
pub(crate) unsafe fn copy<E>(v: *const c_void, dst: *mut *mut c_void) {
    stats::record_bulk_copy();
    if let (Some(elements), false) = (Tracked::<HandleVec<E>>::borrow(v), dst.is_null()) {
        for (i, e) in elements.0.iter().enumerate() {
            dst.add(i).write(Tracked::share(e));
        }
    }
}

macro_rules! handle_vector_exports {
    (
        $e:ty, $resource:expr, $label:literal,
        $new1:ident, $new2:ident, $new3:ident, $delete:ident,
        $get_pointer:ident, $get_size:ident, $copy:ident
    ) => {
        #[doc = concat!("Allocate an empty `", $label, "` container.")]
        #[no_mangle]
        pub extern "C" fn $new1() -> *mut c_void {
            ffi_guard_or!(ptr::null_mut(), { new_empty::<$e>($label) })
        }

        #[doc = concat!("Allocate a container of `len` default `", $label, "` elements.")]
        ///
        /// Returns null when the allocation is refused.
        #[no_mangle]
        pub extern "C" fn $new2(len: usize) -> *mut c_void {
            ffi_guard_or!(ptr::null_mut(), { new_sized::<$e>($label, $resource, len) })
        }

        /// Allocate a container sharing `len` element handles.
        ///
        /// Returns null if any handle is null or the allocation is refused.
        /// The caller keeps its own reference to every handle it passed.
        ///
        /// # Safety
        ///
        /// A non-null `handles` must be valid for `len` reads, and every
        /// entry must be null or a live element handle of this type.
        #[no_mangle]
        pub unsafe extern "C" fn $new3(handles: *const *mut c_void, len: usize) -> *mut c_void {
            ffi_guard_or!(ptr::null_mut(), { new_from::<$e>($label, handles, len) })
        }

        /// Release the container's references to its elements, then the
        /// container.
        ///
        /// # Safety
        ///
        /// `v` must be null or a container handle from this family that has
        /// not been deleted.
        #[no_mangle]
        pub unsafe extern "C" fn $delete(v: *mut c_void) {
            ffi_guard!({ delete::<$e>($label, v) })
        }

        /// Address of the container's element storage.
        ///
        /// # Safety
        ///
        /// `v` must be null or a live container handle from this family.
        #[no_mangle]
        #[allow(non_snake_case)]
        pub unsafe extern "C" fn $get_pointer(v: *mut c_void) -> *mut c_void {
            ffi_guard_or!(ptr::null_mut(), { pointer::<$e>(v) })
        }

        /// Number of elements in the container.
        ///
        /// # Safety
        ///
        /// `v` must be null or a live container handle from this family.
        #[no_mangle]
        #[allow(non_snake_case)]
        pub unsafe extern "C" fn $get_size(v: *mut c_void) -> usize {
            ffi_guard_or!(0, { size::<$e>(v) })
        }

        /// Write one owned reference per element into `dst`.
        ///
        /// # Safety
        ///
        /// `v` must be null or a live container handle from this family;
        /// a non-null `dst` must be valid for `getSize(v)` writes.
        #[no_mangle]
        pub unsafe extern "C" fn $copy(v: *mut c_void, dst: *mut *mut c_void) {
            ffi_guard!({ copy::<$e>(v, dst) })
        }
    };
}

handle_vector_exports!(
    NativeString, Resource::Object, "string",
    stdvector_string_new1, stdvector_string_new2, stdvector_string_new3, stdvector_string_delete,
    stdvector_string_getPointer, stdvector_string_getSize, stdvector_string_copy
);
handle_vector_exports!(
    NativeMModRect, Resource::Object, "mmod_rect",
    stdvector_mmod_rect_new1, stdvector_mmod_rect_new2, stdvector_mmod_rect_new3,
    stdvector_mmod_rect_delete, stdvector_mmod_rect_getPointer, stdvector_mmod_rect_getSize,
    stdvector_mmod_rect_copy
);
handle_vector_exports!(
    NativeRectDetection, Resource::Object, "rect_detection",
    stdvector_rect_detection_new1, stdvector_rect_detection_new2, stdvector_rect_detection_new3,
    stdvector_rect_detection_delete, stdvector_rect_detection_getPointer,
    stdvector_rect_detection_getSize, stdvector_rect_detection_copy
);
handle_vector_exports!(
    NativeFullObjectDetection, Resource::Object, "full_object_detection",
    stdvector_full_object_detection_new1, stdvector_full_object_detection_new2,
    stdvector_full_object_detection_new3, stdvector_full_object_detection_delete,
    stdvector_full_object_detection_getPointer, stdvector_full_object_detection_getSize,
    stdvector_full_object_detection_copy
);
handle_vector_exports!(
    NativeSamplePair, Resource::Object, "sample_pair",
    stdvector_sample_pair_new1, stdvector_sample_pair_new2, stdvector_sample_pair_new3,
    stdvector_sample_pair_delete, stdvector_sample_pair_getPointer,
    stdvector_sample_pair_getSize, stdvector_sample_pair_copy
);

handle_vector_exports!(
    NativeColumnVector, Resource::Object, "vector_double",
    stdvector_vector_double_new1, stdvector_vector_double_new2, stdvector_vector_double_new3,
    stdvector_vector_double_delete, stdvector_vector_double_getPointer,
    stdvector_vector_double_getSize, stdvector_vector_double_copy
);
handle_vector_exports!(
    NativeChipDetails, Resource::Object, "chip_details",
    stdvector_chip_details_new1, stdvector_chip_details_new2, stdvector_chip_details_new3,
    stdvector_chip_details_delete, stdvector_chip_details_getPointer,
    stdvector_chip_details_getSize, stdvector_chip_details_copy
);
handle_vector_exports!(
    NativeSurfPoint, Resource::Object, "surf_point",
    stdvector_surf_point_new1, stdvector_surf_point_new2, stdvector_surf_point_new3,
    stdvector_surf_point_delete, stdvector_surf_point_getPointer,
    stdvector_surf_point_getSize, stdvector_surf_point_copy
);
handle_vector_exports!(
    NativeOverlayLine, Resource::Object, "image_window_overlay_line",
    stdvector_image_window_overlay_line_new1, stdvector_image_window_overlay_line_new2,
    stdvector_image_window_overlay_line_new3, stdvector_image_window_overlay_line_delete,
    stdvector_image_window_overlay_line_getPointer, stdvector_image_window_overlay_line_getSize,
    stdvector_image_window_overlay_line_copy
);
handle_vector_exports!(
    NativeOverlayDot, Resource::Object, "perspective_window_overlay_dot",
    stdvector_perspective_window_overlay_dot_new1,
    stdvector_perspective_window_overlay_dot_new2,
    stdvector_perspective_window_overlay_dot_new3,
    stdvector_perspective_window_overlay_dot_delete,
    stdvector_perspective_window_overlay_dot_getPointer,
    stdvector_perspective_window_overlay_dot_getSize,
    stdvector_perspective_window_overlay_dot_copy
);
handle_vector_exports!(
    NativeOverlayRect, Resource::Object, "image_display_overlay_rect",
    stdvector_image_display_overlay_rect_new1, stdvector_image_display_overlay_rect_new2,
    stdvector_image_display_overlay_rect_new3, stdvector_image_display_overlay_rect_delete,
    stdvector_image_display_overlay_rect_getPointer,
    stdvector_image_display_overlay_rect_getSize, stdvector_image_display_overlay_rect_copy
);
handle_vector_exports!(
    NativeImage, Resource::Object, "image_dataset_metadata_image",
    stdvector_image_dataset_metadata_image_new1, stdvector_image_dataset_metadata_image_new2,
    stdvector_image_dataset_metadata_image_new3, stdvector_image_dataset_metadata_image_delete,
    stdvector_image_dataset_metadata_image_getPointer,
    stdvector_image_dataset_metadata_image_getSize, stdvector_image_dataset_metadata_image_copy
);
handle_vector_exports!(
    NativeBox, Resource::Object, "image_dataset_metadata_box",
    stdvector_image_dataset_metadata_box_new1, stdvector_image_dataset_metadata_box_new2,
    stdvector_image_dataset_metadata_box_new3, stdvector_image_dataset_metadata_box_delete,
    stdvector_image_dataset_metadata_box_getPointer,
    stdvector_image_dataset_metadata_box_getSize, stdvector_image_dataset_metadata_box_copy
);
handle_vector_exports!(
    NativeDetectorWindowDetails, Resource::Object, "mmod_options_detector_window_details",
    stdvector_mmod_options_detector_window_details_new1,
    stdvector_mmod_options_detector_window_details_new2,
    stdvector_mmod_options_detector_window_details_new3,
    stdvector_mmod_options_detector_window_details_delete,
    stdvector_mmod_options_detector_window_details_getPointer,
    stdvector_mmod_options_detector_window_details_getSize,
    stdvector_mmod_options_detector_window_details_copy
);

// Containers of containers. Elements are themselves container handles of
// the inner family and are released with the inner family's `delete`.

handle_vector_exports!(
    Vec<f64>, Resource::Container, "stdvector_double",
    stdvector_stdvector_double_new1, stdvector_stdvector_double_new2,
    stdvector_stdvector_double_new3, stdvector_stdvector_double_delete,
    stdvector_stdvector_double_getPointer, stdvector_stdvector_double_getSize,
    stdvector_stdvector_double_copy
);
handle_vector_exports!(
    StructVec<crate::types::NativeRectangle>, Resource::Container, "stdvector_rectangle",
    stdvector_stdvector_rectangle_new1, stdvector_stdvector_rectangle_new2,
    stdvector_stdvector_rectangle_new3, stdvector_stdvector_rectangle_delete,
    stdvector_stdvector_rectangle_getPointer, stdvector_stdvector_rectangle_getSize,
    stdvector_stdvector_rectangle_copy
);
handle_vector_exports!(
    HandleVec<NativeMModRect>, Resource::Container, "stdvector_mmod_rect",
    stdvector_stdvector_mmod_rect_new1, stdvector_stdvector_mmod_rect_new2,
    stdvector_stdvector_mmod_rect_new3, stdvector_stdvector_mmod_rect_delete,
    stdvector_stdvector_mmod_rect_getPointer, stdvector_stdvector_mmod_rect_getSize,
    stdvector_stdvector_mmod_rect_copy
);
handle_vector_exports!(
    HandleVec<NativeFullObjectDetection>, Resource::Container,
    "stdvector_full_object_detection",
    stdvector_stdvector_full_object_detection_new1,
    stdvector_stdvector_full_object_detection_new2,
    stdvector_stdvector_full_object_detection_new3,
    stdvector_stdvector_full_object_detection_delete,
    stdvector_stdvector_full_object_detection_getPointer,
    stdvector_stdvector_full_object_detection_getSize,
    stdvector_stdvector_full_object_detection_copy
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{sample_pair_delete, sample_pair_index2, sample_pair_new};
    use crate::objects::{stdstring_delete, stdstring_new, stdstring_size};
    use crate::value_vector::{stdvector_double_delete, stdvector_double_getSize, stdvector_double_new3};

    #[test]
    fn elements_outlive_the_container() {
        stats::reset();
        let a = unsafe { stdstring_new(b"A".as_ptr(), 1) };
        let b = unsafe { stdstring_new(b"BB".as_ptr(), 2) };
        let v = unsafe { stdvector_string_new3([a, b].as_ptr(), 2) };
        unsafe { stdvector_string_delete(v) };
        assert_eq!(stats::snapshot().objects_freed, 0);
        unsafe {
            assert_eq!(stdstring_size(b), 2);
            stdstring_delete(a);
            stdstring_delete(b);
        }
        assert_eq!(stats::snapshot().objects_freed, 2);
    }

    #[test]
    fn copied_handles_are_owned_references() {
        stats::reset();
        let p = sample_pair_new(1, 5, 2.0);
        let v = unsafe { stdvector_sample_pair_new3([p].as_ptr(), 1) };
        unsafe { sample_pair_delete(p) };

        let mut out = [ptr::null_mut(); 1];
        unsafe {
            stdvector_sample_pair_copy(v, out.as_mut_ptr());
            stdvector_sample_pair_delete(v);
        }
        assert_eq!(stats::snapshot().objects_freed, 0);
        unsafe {
            assert_eq!(sample_pair_index2(out[0]), 5);
            sample_pair_delete(out[0]);
        }
        assert_eq!(stats::snapshot().objects_freed, 1);
    }

    #[test]
    fn null_element_is_refused_without_leaking() {
        stats::reset();
        let a = unsafe { stdstring_new(b"x".as_ptr(), 1) };
        let v = unsafe { stdvector_string_new3([a, ptr::null_mut()].as_ptr(), 2) };
        assert!(v.is_null());
        unsafe { stdstring_delete(a) };
        assert_eq!(stats::snapshot().objects_freed, 1);
    }

    #[test]
    fn nested_containers_share_inner_containers() {
        stats::reset();
        let inner = unsafe { stdvector_double_new3([1.0, 2.0].as_ptr(), 2) };
        let outer = unsafe { stdvector_stdvector_double_new3([inner].as_ptr(), 1) };
        unsafe { stdvector_double_delete(inner) };

        let mut out = [ptr::null_mut(); 1];
        unsafe {
            stdvector_stdvector_double_copy(outer, out.as_mut_ptr());
            stdvector_stdvector_double_delete(outer);
            assert_eq!(stdvector_double_getSize(out[0]), 2);
            stdvector_double_delete(out[0]);
        }
        let s = stats::snapshot();
        assert_eq!(s.containers_created, 2);
        assert_eq!(s.containers_freed, 2);
    }

    #[test]
    fn surf_point_container_shares_points() {
        use crate::features::{
            surf_point_delete, surf_point_new, surf_point_scale, SURF_DESCRIPTOR_LEN,
        };
        use crate::types::NativeDPoint;

        stats::reset();
        let des = [0.5; SURF_DESCRIPTOR_LEN];
        let p = unsafe {
            surf_point_new(NativeDPoint::default(), 3.0, 1.0, 1.0, 0.0, des.as_ptr(), des.len())
        };
        let v = unsafe { stdvector_surf_point_new3([p].as_ptr(), 1) };
        unsafe { surf_point_delete(p) };

        let mut out = [ptr::null_mut(); 1];
        unsafe {
            stdvector_surf_point_copy(v, out.as_mut_ptr());
            stdvector_surf_point_delete(v);
            assert_eq!(surf_point_scale(out[0]), 3.0);
            surf_point_delete(out[0]);
        }
        let s = stats::snapshot();
        assert_eq!(s.objects_created, 1);
        assert_eq!(s.objects_freed, 1);
    }

    #[test]
    fn new2_allocates_default_elements() {
        stats::reset();
        let v = stdvector_mmod_rect_new2(3);
        unsafe {
            assert_eq!(stdvector_mmod_rect_getSize(v), 3);
            stdvector_mmod_rect_delete(v);
        }
        let s = stats::snapshot();
        assert_eq!(s.objects_created, 3);
        assert_eq!(s.objects_freed, 3);
    }
}
