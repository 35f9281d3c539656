//! Reference-counted storage behind every published handle.
//!
//! A handle is `Arc::into_raw` of a [`Tracked`] allocation. The payload is
//! the first field of a `repr(C)` struct, so a handle is also a valid
//! pointer to the payload itself; accessors read through that pointer and
//! never assume the rest of the allocation exists. That lets fixed-layout
//! struct containers lend plain element addresses to the same getters.

#![allow(unsafe_code)]

use std::ffi::c_void;
use std::ops::Deref;
use std::sync::Arc;

use crate::stats;

/// What a tracked allocation counts as in [`NativeStats`](crate::NativeStats).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Resource {
    Container,
    Object,
}

#[repr(C)]
pub(crate) struct Tracked<T> {
    value: T,
    resource: Resource,
}

impl<T> Tracked<T> {
    pub(crate) fn new(value: T, resource: Resource) -> Arc<Self> {
        match resource {
            Resource::Container => stats::record_container_created(),
            Resource::Object => stats::record_object_created(),
        }
        Arc::new(Self { value, resource })
    }

    /// Allocate and hand the only reference across the boundary.
    pub(crate) fn publish(value: T, resource: Resource) -> *mut c_void {
        Self::into_handle(Self::new(value, resource))
    }

    pub(crate) fn into_handle(this: Arc<Self>) -> *mut c_void {
        Arc::into_raw(this) as *mut c_void
    }

    /// Hand out an additional reference to `this`.
    pub(crate) fn share(this: &Arc<Self>) -> *mut c_void {
        Self::into_handle(Arc::clone(this))
    }

    /// Read the payload behind `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or point to a live `T`: either a handle published
    /// for `Tracked<T>` that still holds a reference, or an element address
    /// lent by a container that is still alive. The returned reference must
    /// not outlive either.
    pub(crate) unsafe fn borrow<'a>(ptr: *const c_void) -> Option<&'a T> {
        (ptr as *const T).as_ref()
    }

    /// Take one more reference to the allocation behind a published handle.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or a handle published for `Tracked<T>` that still
    /// holds a reference.
    pub(crate) unsafe fn retain(ptr: *const c_void) -> Option<Arc<Self>> {
        if ptr.is_null() {
            return None;
        }
        let raw = ptr as *const Self;
        Arc::increment_strong_count(raw);
        Some(Arc::from_raw(raw))
    }

    /// Drop one reference. Frees the allocation when it was the last.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or a handle published for `Tracked<T>` whose
    /// reference has not already been released.
    pub(crate) unsafe fn release(ptr: *mut c_void) {
        if !ptr.is_null() {
            drop(Arc::from_raw(ptr as *const Self));
        }
    }
}

impl<T> Deref for Tracked<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> Drop for Tracked<T> {
    fn drop(&mut self) {
        match self.resource {
            Resource::Container => stats::record_container_freed(),
            Resource::Object => stats::record_object_freed(),
        }
    }
}
