//! The container facade.

#![allow(unsafe_code)]

use std::any::type_name;
use std::ffi::c_void;
use std::fmt;

use ffivec_core::{
    ElementCategory, ForeignHandle, Ownership, Parameter, StdVectorError, TemplateShape,
    TypeDescriptor,
};

use crate::abi;
use crate::element::Element;
use crate::registry;
use crate::strategy::CategoryStrategy;

/// A sequence of `T` whose storage lives on the foreign side.
///
/// Construction resolves the element type once and fails for types the
/// registry does not know. The container owns exactly one foreign handle
/// and releases it at most once, on [`dispose`](Self::dispose) or drop.
/// Every read after that fails with [`StdVectorError::Released`].
///
/// Reads copy: [`to_array`](Self::to_array) queries the size and copies
/// the foreign contents on every call. The list-mutation surface is
/// present but always fails with [`StdVectorError::Unsupported`].
///
/// ```
/// use ffivec_stdvector::StdVector;
///
/// let v = StdVector::from_elements(&[3_i32, 1, 4, 1, 5])?;
/// assert_eq!(v.size()?, 5);
/// assert_eq!(v.to_array()?, vec![3, 1, 4, 1, 5]);
/// # Ok::<(), ffivec_stdvector::StdVectorError>(())
/// ```
pub struct StdVector<T: Element> {
    handle: Option<ForeignHandle>,
    strategy: Box<dyn CategoryStrategy<T>>,
}

impl<T: Element> StdVector<T> {
    /// An empty container.
    pub fn new() -> Result<Self, StdVectorError> {
        Self::with_parameter(None)
    }

    /// An empty container, with a construction parameter.
    pub fn with_parameter(param: Option<&dyn Parameter>) -> Result<Self, StdVectorError> {
        let strategy = registry::resolve::<T>(param)?;
        let handle = strategy.create_empty()?;
        Ok(Self::from_parts(handle, strategy))
    }

    /// A container of `size` default elements.
    ///
    /// # Errors
    ///
    /// [`StdVectorError::NegativeSize`] for negative `size`, reported
    /// before anything is allocated.
    pub fn with_size(size: isize) -> Result<Self, StdVectorError> {
        Self::with_size_and_parameter(size, None)
    }

    /// A container of `size` default elements, with a construction
    /// parameter.
    pub fn with_size_and_parameter(
        size: isize,
        param: Option<&dyn Parameter>,
    ) -> Result<Self, StdVectorError> {
        let strategy = registry::resolve::<T>(param)?;
        let handle = strategy.create_sized(size)?;
        Ok(Self::from_parts(handle, strategy))
    }

    /// A container populated from `elements`.
    ///
    /// Handle-held elements are shared with the container, not moved: the
    /// caller's values stay valid after the container is disposed.
    pub fn from_elements(elements: &[T]) -> Result<Self, StdVectorError> {
        Self::from_elements_with_parameter(elements, None)
    }

    /// A container populated from `elements`, with a construction
    /// parameter.
    pub fn from_elements_with_parameter(
        elements: &[T],
        param: Option<&dyn Parameter>,
    ) -> Result<Self, StdVectorError> {
        let strategy = registry::resolve::<T>(param)?;
        let handle = strategy.create_from(elements)?;
        Ok(Self::from_parts(handle, strategy))
    }

    fn from_parts(handle: ForeignHandle, strategy: Box<dyn CategoryStrategy<T>>) -> Self {
        Self {
            handle: Some(handle),
            strategy,
        }
    }

    fn live(&self) -> Result<ForeignHandle, StdVectorError> {
        self.handle.ok_or(StdVectorError::Released)
    }

    /// Number of elements.
    pub fn size(&self) -> Result<usize, StdVectorError> {
        let handle = self.live()?;
        // SAFETY: `handle` is live until `dispose` takes it.
        Ok(unsafe { self.strategy.size(handle) })
    }

    /// Whether the container holds no elements.
    pub fn is_empty(&self) -> Result<bool, StdVectorError> {
        self.size().map(|n| n == 0)
    }

    /// Copy every element out.
    ///
    /// Handle-held elements come back as independently owned values that
    /// outlive the container.
    pub fn to_array(&self) -> Result<Vec<T>, StdVectorError> {
        let handle = self.live()?;
        // SAFETY: `handle` is live until `dispose` takes it.
        unsafe { self.strategy.materialize(handle) }
    }

    /// Iterate over a fresh copy of the elements.
    ///
    /// Each call takes a new copy, so iteration can be restarted.
    pub fn iter(&self) -> Result<std::vec::IntoIter<T>, StdVectorError> {
        self.to_array().map(Vec::into_iter)
    }

    /// Address of the foreign element storage.
    pub fn element_ptr(&self) -> Result<*mut c_void, StdVectorError> {
        let handle = self.live()?;
        // SAFETY: `handle` is live until `dispose` takes it.
        Ok(unsafe { self.strategy.raw_pointer(handle) })
    }

    /// The foreign container handle.
    pub fn native_handle(&self) -> Result<ForeignHandle, StdVectorError> {
        self.live()
    }

    /// The element category this container was resolved to.
    pub fn category(&self) -> ElementCategory {
        self.strategy.category()
    }

    /// Release the foreign storage. Later calls do nothing.
    pub fn dispose(&mut self) {
        if let Some(handle) = self.handle.take() {
            // SAFETY: the handle was live and is never used again.
            unsafe { self.strategy.destroy(handle) };
        }
    }

    /// Whether [`dispose`](Self::dispose) has run.
    pub fn is_released(&self) -> bool {
        self.handle.is_none()
    }

    // ── unsupported list surface ──────────────────────────────────

    /// Always fails: the foreign sequence is not mutable from here.
    pub fn push(&mut self, _element: T) -> Result<(), StdVectorError> {
        Err(unsupported("push"))
    }

    /// Always fails.
    pub fn insert(&mut self, _index: usize, _element: T) -> Result<(), StdVectorError> {
        Err(unsupported("insert"))
    }

    /// Always fails.
    pub fn remove(&mut self, _element: &T) -> Result<bool, StdVectorError> {
        Err(unsupported("remove"))
    }

    /// Always fails.
    pub fn remove_at(&mut self, _index: usize) -> Result<(), StdVectorError> {
        Err(unsupported("remove_at"))
    }

    /// Always fails.
    pub fn clear(&mut self) -> Result<(), StdVectorError> {
        Err(unsupported("clear"))
    }

    /// Always fails. Use [`to_array`](Self::to_array) and search the copy.
    pub fn contains(&self, _element: &T) -> Result<bool, StdVectorError> {
        Err(unsupported("contains"))
    }

    /// Always fails. Use [`to_array`](Self::to_array) and search the copy.
    pub fn index_of(&self, _element: &T) -> Result<Option<usize>, StdVectorError> {
        Err(unsupported("index_of"))
    }

    /// Always fails. Use [`to_array`](Self::to_array) and index the copy.
    pub fn get(&self, _index: usize) -> Result<T, StdVectorError> {
        Err(unsupported("get"))
    }

    /// Always fails.
    pub fn set(&mut self, _index: usize, _element: T) -> Result<(), StdVectorError> {
        Err(unsupported("set"))
    }

    /// Always fails. Use [`to_array`](Self::to_array).
    pub fn copy_to(&self, _dst: &mut [T], _offset: usize) -> Result<(), StdVectorError> {
        Err(unsupported("copy_to"))
    }
}

fn unsupported(operation: &'static str) -> StdVectorError {
    StdVectorError::Unsupported { operation }
}

impl<T: Element> Drop for StdVector<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<T: Element> fmt::Debug for StdVector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdVector")
            .field("element", &type_name::<T>())
            .field("category", &self.category())
            .field("handle", &self.handle)
            .finish()
    }
}

/// Structural equality: same liveness and equal contents. A container
/// whose contents cannot be read compares unequal.
impl<T: Element + PartialEq> PartialEq for StdVector<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self.to_array(), other.to_array()) {
            (Ok(a), Ok(b)) => a == b,
            (Err(StdVectorError::Released), Err(StdVectorError::Released)) => true,
            _ => false,
        }
    }
}

/// Containers nest: a container of a registered element type is itself an
/// element when the registry lists it.
impl<T: Element> Element for StdVector<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>()
    }

    fn foreign_handle(&self) -> Option<ForeignHandle> {
        self.handle
    }

    unsafe fn from_foreign(
        handle: ForeignHandle,
        ownership: Ownership,
        _shape: TemplateShape,
    ) -> Result<Self, StdVectorError> {
        if !ownership.owns() {
            return Err(unsupported("borrowed nested container"));
        }
        match registry::resolve::<T>(None) {
            Ok(strategy) => Ok(Self::from_parts(handle, strategy)),
            Err(e) => {
                release_orphan::<T>(handle);
                Err(e)
            }
        }
    }
}

/// Free an owned container of `T` that no strategy could be built for,
/// through the family its descriptor names.
///
/// # Safety
///
/// `handle` must be an owned, live container and is invalid afterwards.
unsafe fn release_orphan<T: Element>(handle: ForeignHandle) {
    match registry::element_type_of(&T::descriptor()).and_then(abi::container_delete) {
        Some(delete) => {
            log::warn!("releasing unresolved {} container {handle}", type_name::<T>());
            delete(handle.as_ptr());
        }
        None => log::error!("no family to release {handle} of {}; leaking it", type_name::<T>()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffivec_native::stats;

    #[test]
    fn round_trip() {
        let v = StdVector::from_elements(&[3_i32, 1, 4, 1, 5]).unwrap();
        assert_eq!(v.size().unwrap(), 5);
        assert_eq!(v.to_array().unwrap(), vec![3, 1, 4, 1, 5]);
        assert_eq!(v.category(), ElementCategory::Int32);
    }

    #[test]
    fn dispose_is_idempotent() {
        stats::reset();
        let mut v = StdVector::<f64>::with_size(2).unwrap();
        v.dispose();
        v.dispose();
        drop(v);
        let s = stats::snapshot();
        assert_eq!(s.containers_freed, 1);
    }

    #[test]
    fn reads_after_dispose_fail() {
        let mut v = StdVector::<u32>::new().unwrap();
        v.dispose();
        assert!(v.is_released());
        assert_eq!(v.size(), Err(StdVectorError::Released));
        assert_eq!(v.to_array(), Err(StdVectorError::Released));
        assert_eq!(v.native_handle(), Err(StdVectorError::Released));
        assert_eq!(v.element_ptr().err(), Some(StdVectorError::Released));
        assert!(v.iter().is_err());
    }

    #[test]
    fn mutation_is_unsupported_in_every_state() {
        let mut v = StdVector::<i64>::new().unwrap();
        assert_eq!(v.push(1), Err(unsupported("push")));
        assert_eq!(v.clear(), Err(unsupported("clear")));
        v.dispose();
        assert_eq!(v.get(0), Err(unsupported("get")));
        assert_eq!(v.contains(&1), Err(unsupported("contains")));
        assert_eq!(v.copy_to(&mut [0; 2], 0), Err(unsupported("copy_to")));
    }

    #[test]
    fn iter_restarts() {
        let v = StdVector::from_elements(&[1.5_f64, 2.5]).unwrap();
        let a: Vec<_> = v.iter().unwrap().collect();
        let b: f64 = v.iter().unwrap().sum();
        assert_eq!(a, vec![1.5, 2.5]);
        assert_eq!(b, 4.0);
    }

    /// Claims the `double` family without being `f64`, so it never resolves.
    struct Mislabelled;

    impl Element for Mislabelled {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::of::<f64>()
        }
    }

    #[test]
    fn unresolvable_inner_container_is_released() {
        let inner = StdVector::from_elements(&[1.0_f64, 2.0]).unwrap();
        let handle = inner.native_handle().unwrap();
        std::mem::forget(inner);

        let freed = stats::snapshot().containers_freed;
        let r = unsafe {
            StdVector::<Mislabelled>::from_foreign(handle, Ownership::Owned, TemplateShape::DYNAMIC)
        };
        assert!(matches!(r, Err(StdVectorError::UnsupportedElementType { .. })));
        assert_eq!(stats::snapshot().containers_freed, freed + 1);
    }

    #[test]
    fn borrowed_inner_container_is_refused_and_kept() {
        let inner = StdVector::from_elements(&[4_i32]).unwrap();
        let handle = inner.native_handle().unwrap();
        let freed = stats::snapshot().containers_freed;
        let r = unsafe {
            StdVector::<i32>::from_foreign(handle, Ownership::Borrowed, TemplateShape::DYNAMIC)
        };
        assert!(r.is_err());
        assert_eq!(stats::snapshot().containers_freed, freed);
        assert_eq!(inner.to_array().unwrap(), vec![4]);
    }

    #[test]
    fn structural_equality() {
        let a = StdVector::from_elements(&[1_i32, 2]).unwrap();
        let b = StdVector::from_elements(&[1_i32, 2]).unwrap();
        let c = StdVector::from_elements(&[2_i32, 1]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
