//! Reference foreign runtime for the ffivec bridge.
//!
//! Exposes the C ABI that `ffivec-stdvector` drives: one
//! `stdvector_<label>_{new1,new2,new3,delete,getPointer,getSize}` family
//! per registered element type (plus `copy` for every family whose
//! elements cross as handles), the parametric `stdvector_matrix_*` family,
//! and constructors/accessors for the standalone foreign objects (points,
//! rectangles, strings, detections, feature and annotation objects,
//! matrices).
//!
//! # Storage model
//!
//! Every standalone object and every container is an `Arc`-managed
//! `Tracked` allocation whose published address points at the
//! payload. `*_delete` releases one reference. Handle containers retain the
//! handles they are built from and hand out one retained reference per
//! element from `copy`. Fixed-layout struct containers deep-clone on insert,
//! free their elements on destroy, and lend element addresses from `copy`.
//!
//! This crate is one of two that may contain `unsafe` code (along with
//! `ffivec-stdvector`).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

#[macro_use]
mod guard;

mod alloc;
pub mod config;
pub mod dataset;
pub mod features;
pub mod handle_vector;
pub mod logging;
pub mod matrix;
pub mod matrix_vector;
pub mod objects;
pub mod overlay;
pub mod stats;
pub mod struct_vector;
mod tracked;
pub mod types;
pub mod value_vector;

pub use config::RuntimeConfig;
pub use stats::NativeStats;
pub use types::{NativeDPoint, NativeDPoint3, NativePoint, NativeRectangle, NativeRgbPixel};
