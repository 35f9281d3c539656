//! The per-type contract every container element satisfies.

#![allow(unsafe_code)]

use ffivec_core::{ForeignHandle, Ownership, StdVectorError, TemplateShape, TypeDescriptor};

use crate::object::NativeObject;

/// An in-process type that can be stored in a [`StdVector`](crate::StdVector).
///
/// Which methods matter depends on the element's category:
///
/// - value categories use only [`descriptor`](Self::descriptor);
/// - fixed-layout structs cross the boundary by value through
///   [`to_transferable`](Self::to_transferable) and come back borrowed
///   through [`from_foreign`](Self::from_foreign);
/// - handle-held elements expose their current handle with
///   [`foreign_handle`](Self::foreign_handle) and come back owned through
///   [`from_foreign`](Self::from_foreign);
/// - matrices additionally supply [`null_element`](Self::null_element).
///
/// Implementing this trait does not make a type usable: the registry only
/// accepts the types it lists plus the matrix family.
pub trait Element: Sized + 'static {
    /// Runtime identity used for registry lookup.
    fn descriptor() -> TypeDescriptor;

    /// The foreign handle this value currently wraps, if any.
    fn foreign_handle(&self) -> Option<ForeignHandle> {
        None
    }

    /// Create an owned foreign copy of this value for the duration of one
    /// container construction.
    fn to_transferable(&self) -> Result<NativeObject, StdVectorError> {
        Err(StdVectorError::UnsupportedElementType {
            type_name: Self::descriptor().type_name(),
        })
    }

    /// Wrap a handle produced by a container's bulk copy.
    ///
    /// # Safety
    ///
    /// `handle` must be a live foreign element of this type. With
    /// [`Ownership::Owned`] the caller transfers one reference to the
    /// returned value; with [`Ownership::Borrowed`] the handle must stay
    /// valid for the duration of the call.
    unsafe fn from_foreign(
        handle: ForeignHandle,
        ownership: Ownership,
        shape: TemplateShape,
    ) -> Result<Self, StdVectorError> {
        let _ = (handle, ownership, shape);
        Err(StdVectorError::UnsupportedElementType {
            type_name: Self::descriptor().type_name(),
        })
    }

    /// The value a null foreign element materializes as, where one exists.
    fn null_element() -> Option<Self> {
        None
    }
}

macro_rules! value_element {
    ($($t:ty),*) => {
        $(
            impl Element for $t {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::of::<$t>()
                }
            }
        )*
    };
}

value_element!(i32, u32, i64, f64);
