//! Weighted pairs of sample indices.

#![allow(unsafe_code)]

use std::fmt;

use ffivec_core::StdVectorError;
use ffivec_native::objects as native;

use crate::object::{allocated, NativeObject};

/// An edge between two samples with a distance.
///
/// The foreign side stores the indices ordered, so `index1() <= index2()`
/// regardless of construction order.
pub struct SamplePair {
    object: NativeObject,
}

impl SamplePair {
    /// Create a foreign sample pair.
    pub fn new(index1: u64, index2: u64, distance: f64) -> Result<Self, StdVectorError> {
        let ptr = native::sample_pair_new(index1, index2, distance);
        allocated(ptr, native::sample_pair_delete, "sample_pair").map(|object| Self { object })
    }

    /// Smaller index.
    pub fn index1(&self) -> u64 {
        // SAFETY: the handle is live for `&self`.
        unsafe { native::sample_pair_index1(self.object.ptr()) }
    }

    /// Larger index.
    pub fn index2(&self) -> u64 {
        // SAFETY: the handle is live for `&self`.
        unsafe { native::sample_pair_index2(self.object.ptr()) }
    }

    /// Edge distance.
    pub fn distance(&self) -> f64 {
        // SAFETY: the handle is live for `&self`.
        unsafe { native::sample_pair_distance(self.object.ptr()) }
    }
}

handle_element!(SamplePair, native::sample_pair_delete);

impl PartialEq for SamplePair {
    fn eq(&self, other: &Self) -> bool {
        self.index1() == other.index1()
            && self.index2() == other.index2()
            && self.distance() == other.distance()
    }
}

impl fmt::Debug for SamplePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SamplePair")
            .field("index1", &self.index1())
            .field("index2", &self.index2())
            .field("distance", &self.distance())
            .finish()
    }
}
