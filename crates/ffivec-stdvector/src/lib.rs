//! Strongly typed containers over foreign-backed sequences.
//!
//! A [`StdVector<T>`] owns a sequence whose storage lives on the foreign
//! side of an FFI boundary. Construction resolves `T` through the type
//! [`registry`] to one of a fixed set of element categories, and every
//! later operation dispatches through that category's
//! [`CategoryStrategy`]:
//!
//! | Category | Element types | Transfer |
//! |---|---|---|
//! | values | `i32`, `u32`, `i64`, `f64` | one bulk copy in, read in place out |
//! | fixed-layout structs | [`Point`], [`DPoint`], [`Rectangle`] | cloned in, lent out |
//! | handle-held objects | [`StdString`], [`MModRect`], [`RectDetection`], [`FullObjectDetection`], [`SamplePair`], [`ColumnVector`], [`ChipDetails`], [`SurfPoint`], [`OverlayLine`], [`OverlayDot`], [`OverlayRect`], [`DatasetImage`], [`DatasetBox`], [`DetectorWindowDetails`] | shared in, owned out |
//! | nested containers | `StdVector<f64>`, `StdVector<Rectangle>`, `StdVector<MModRect>`, `StdVector<FullObjectDetection>` | shared in, owned out |
//! | matrices | [`Matrix<E>`] for every [`MatrixElement`] | shared in, owned out |
//!
//! Containers are read-only snapshots of the foreign storage:
//! [`StdVector::to_array`] copies everything out, and the list-mutation
//! surface fails with [`StdVectorError::Unsupported`].
//!
//! ```
//! use ffivec_stdvector::{Rectangle, StdVector};
//!
//! let boxes = StdVector::from_elements(&[Rectangle::new(0, 0, 9, 9)])?;
//! let copy = boxes.to_array()?;
//! drop(boxes);
//! assert_eq!(copy[0].area(), 100);
//! # Ok::<(), ffivec_stdvector::StdVectorError>(())
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

#[macro_use]
mod object;

mod abi;
mod dataset;
mod detection;
mod element;
mod features;
mod geometry;
mod matrix;
mod overlay;
pub mod registry;
mod sample_pair;
pub mod strategy;
mod string;
mod vector;

pub use dataset::{BoxAttributes, DatasetBox, DatasetImage};
pub use detection::{FullObjectDetection, MModRect, RectDetection};
pub use element::Element;
pub use features::{ChipDetails, ColumnVector, DetectorWindowDetails, SurfPoint, SURF_DESCRIPTOR_LEN};
pub use geometry::{DPoint, DPoint3, Point, Rectangle};
pub use matrix::{HsiPixel, Matrix, MatrixElement, RgbAlphaPixel, RgbPixel};
pub use object::{NativeObject, Release};
pub use overlay::{OverlayDot, OverlayLine, OverlayRect};
pub use sample_pair::SamplePair;
pub use strategy::CategoryStrategy;
pub use string::StdString;
pub use vector::StdVector;

pub use ffivec_core::{
    ElementCategory, ElementType, ErrorClass, ForeignHandle, MatrixElementType,
    MatrixTemplateSizeParameter, Ownership, Parameter, StdVectorError, TemplateShape,
    TypeDescriptor,
};
