//! ffivec: strongly typed containers over foreign-backed sequences.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all ffivec sub-crates. For most users, adding `ffivec` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use ffivec::prelude::*;
//!
//! // Values cross the boundary in one bulk copy.
//! let scores = StdVector::from_elements(&[0.25_f64, 0.5, 0.75])?;
//! assert_eq!(scores.to_array()?, vec![0.25, 0.5, 0.75]);
//!
//! // Handle-held elements come back owned and outlive the container.
//! let labels = [StdString::new("cat")?, StdString::new("dog")?];
//! let mut v = StdVector::from_elements(&labels)?;
//! let copy = v.to_array()?;
//! v.dispose();
//! assert_eq!(copy[1].to_string(), "dog");
//!
//! // Matrices take their template through a parameter.
//! let column = MatrixTemplateSizeParameter::new(3, 1);
//! let m = StdVector::<Matrix<f32>>::with_size_and_parameter(2, Some(&column))?;
//! assert_eq!(m.size()?, 2);
//! # Ok::<(), StdVectorError>(())
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `ffivec-core` | Categories, descriptors, handles, parameters, errors |
//! | [`native`] | `ffivec-native` | Reference foreign runtime, stats, config, logging |
//! | [`stdvector`] | `ffivec-stdvector` | Container facade, registry, strategies, element types |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core vocabulary shared across the boundary (`ffivec-core`).
///
/// Element categories, registered element types, [`types::ForeignHandle`],
/// construction parameters, and [`types::StdVectorError`].
pub use ffivec_core as types;

/// The reference foreign runtime (`ffivec-native`).
///
/// Exposes the C ABI the bridge binds to, plus per-thread
/// [`native::stats`] and [`native::config`] for tests and diagnostics.
pub use ffivec_native as native;

/// The container facade and its element types (`ffivec-stdvector`).
///
/// [`stdvector::StdVector`] is the entry point; [`stdvector::registry`]
/// lists the supported element types.
pub use ffivec_stdvector as stdvector;

/// Common imports for typical ffivec usage.
///
/// ```rust
/// use ffivec::prelude::*;
/// ```
pub mod prelude {
    // Container and element contract
    pub use ffivec_stdvector::{Element, StdVector};

    // Element types
    pub use ffivec_stdvector::{
        BoxAttributes, ChipDetails, ColumnVector, DPoint, DPoint3, DatasetBox, DatasetImage,
        DetectorWindowDetails, FullObjectDetection, MModRect, Matrix, MatrixElement, OverlayDot,
        OverlayLine, OverlayRect, Point, RectDetection, Rectangle, RgbPixel, SamplePair,
        StdString, SurfPoint,
    };

    // Parameters and errors
    pub use ffivec_core::{ElementCategory, MatrixTemplateSizeParameter, StdVectorError};
}
