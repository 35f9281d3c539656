//! Error types for the ffivec bridge.
//!
//! Failures fall into four classes (see [`ErrorClass`]) so callers can tell
//! input validation problems from lifecycle bugs, unsupported calls, and
//! foreign-side failures. Every error surfaces synchronously to the
//! immediate caller; nothing is retried.

use std::error::Error;
use std::fmt;

/// Errors raised by element-type resolution, the category strategies, and
/// the container facade.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StdVectorError {
    /// The element type has no registry entry and is not a matrix.
    UnsupportedElementType {
        /// Name of the offending type.
        type_name: &'static str,
    },
    /// A construction parameter of the wrong kind was supplied.
    InvalidParameter {
        /// Name of the element type being resolved.
        type_name: &'static str,
        /// The parameter kind the element type expects.
        expected: &'static str,
    },
    /// A negative container size was requested.
    NegativeSize {
        /// The requested size.
        requested: isize,
    },
    /// A source element has no foreign handle (null or already released).
    NullSourceElement {
        /// Position of the element in the source sequence.
        index: usize,
    },
    /// The container was used after its foreign storage was released.
    Released,
    /// A mutating list operation was invoked.
    Unsupported {
        /// Name of the operation.
        operation: &'static str,
    },
    /// A foreign constructor returned null.
    ForeignAllocation {
        /// Foreign function family, such as `stdvector_int32` or `point`.
        element: &'static str,
        /// Foreign operation that failed.
        operation: &'static str,
    },
    /// The foreign side produced a null element handle where none is legal.
    NullForeignElement {
        /// Position of the element in the foreign container.
        index: usize,
    },
}

/// Coarse classification of a [`StdVectorError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Bad input at construction time; fix the arguments.
    Construction,
    /// Lifecycle misuse; fix the call order.
    Usage,
    /// The operation is outside the supported surface.
    UnsupportedOperation,
    /// The foreign side failed; not recoverable at this layer.
    Foreign,
}

impl StdVectorError {
    /// The class this error belongs to.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::UnsupportedElementType { .. }
            | Self::InvalidParameter { .. }
            | Self::NegativeSize { .. }
            | Self::NullSourceElement { .. } => ErrorClass::Construction,
            Self::Released => ErrorClass::Usage,
            Self::Unsupported { .. } => ErrorClass::UnsupportedOperation,
            Self::ForeignAllocation { .. } | Self::NullForeignElement { .. } => {
                ErrorClass::Foreign
            }
        }
    }
}

impl fmt::Display for StdVectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedElementType { type_name } => {
                write!(f, "unsupported element type: {type_name}")
            }
            Self::InvalidParameter {
                type_name,
                expected,
            } => {
                write!(f, "invalid parameter for {type_name}: expected {expected}")
            }
            Self::NegativeSize { requested } => {
                write!(f, "container size must be non-negative, got {requested}")
            }
            Self::NullSourceElement { index } => {
                write!(f, "source element {index} has no foreign handle")
            }
            Self::Released => write!(f, "container has already been released"),
            Self::Unsupported { operation } => {
                write!(f, "operation not supported: {operation}")
            }
            Self::ForeignAllocation { element, operation } => {
                write!(f, "foreign call {element}_{operation} returned null")
            }
            Self::NullForeignElement { index } => {
                write!(f, "foreign container returned a null handle at {index}")
            }
        }
    }
}

impl Error for StdVectorError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes() {
        assert_eq!(
            StdVectorError::UnsupportedElementType { type_name: "u8" }.class(),
            ErrorClass::Construction
        );
        assert_eq!(
            StdVectorError::NegativeSize { requested: -1 }.class(),
            ErrorClass::Construction
        );
        assert_eq!(
            StdVectorError::NullSourceElement { index: 2 }.class(),
            ErrorClass::Construction
        );
        assert_eq!(StdVectorError::Released.class(), ErrorClass::Usage);
        assert_eq!(
            StdVectorError::Unsupported { operation: "insert" }.class(),
            ErrorClass::UnsupportedOperation
        );
        assert_eq!(
            StdVectorError::ForeignAllocation {
                element: "stdvector_int32",
                operation: "new2"
            }
            .class(),
            ErrorClass::Foreign
        );
    }

    #[test]
    fn display_names_the_foreign_call() {
        let e = StdVectorError::ForeignAllocation {
            element: "stdvector_rectangle",
            operation: "new3",
        };
        assert_eq!(
            e.to_string(),
            "foreign call stdvector_rectangle_new3 returned null"
        );
    }

    #[test]
    fn display_names_the_type() {
        let e = StdVectorError::UnsupportedElementType {
            type_name: "alloc::string::String",
        };
        assert!(e.to_string().contains("alloc::string::String"));
    }
}
