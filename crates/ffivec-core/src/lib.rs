//! Core types for the ffivec foreign-sequence bridge.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! vocabulary shared by the foreign runtime (`ffivec-native`) and the
//! bridge (`ffivec-stdvector`): element categories and registered element
//! types, type descriptors, opaque foreign handles with their ownership
//! flag, container parameters, and the error taxonomy.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod category;
pub mod descriptor;
pub mod element;
pub mod error;
pub mod handle;
pub mod param;

pub use category::{CopyPattern, ElementCategory};
pub use descriptor::TypeDescriptor;
pub use element::{ElementType, MatrixElementType};
pub use error::{ErrorClass, StdVectorError};
pub use handle::{ForeignHandle, Ownership, TemplateShape};
pub use param::{MatrixTemplateSizeParameter, Parameter};
