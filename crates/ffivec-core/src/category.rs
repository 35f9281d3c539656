//! Element categories and the copy protocol each one follows.
//!
//! Every registered element type belongs to exactly one
//! [`ElementCategory`]. The category decides how elements cross the
//! foreign boundary and who frees them:
//!
//! | Category | Copy pattern | Destroy frees elements | Extracted elements |
//! |----------|--------------|------------------------|--------------------|
//! | `Int32` / `UInt32` / `Int64` / `Double` | bulk value | n/a | plain values |
//! | `FixedLayoutStruct` | bulk handle | yes | borrowed |
//! | `OwningHandleObject` | bulk handle | no | owned |
//! | `NestedContainer` | bulk handle | no | owned |
//! | `ParametricMatrix` | bulk handle | no | owned |

use std::fmt;

use crate::handle::Ownership;

/// Classification of an element type, selecting its category strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementCategory {
    /// 32-bit signed integers, bulk-copied by value.
    Int32,
    /// 32-bit unsigned integers, bulk-copied by value.
    UInt32,
    /// 64-bit signed integers, bulk-copied by value.
    Int64,
    /// 64-bit floats, bulk-copied by value.
    Double,
    /// Reference-counted composite objects exchanged as handles.
    OwningHandleObject,
    /// Point- and rectangle-like structs, deep-cloned by the foreign side.
    FixedLayoutStruct,
    /// Containers of containers; inner containers are exchanged as handles.
    NestedContainer,
    /// The matrix family, bound to a numeric kind and template shape.
    ParametricMatrix,
}

/// How a category moves elements across the foreign boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CopyPattern {
    /// One flat copy of the raw element values.
    BulkValue,
    /// One copy of an array of element handles, then one wrapper per handle.
    BulkHandle,
}

impl ElementCategory {
    /// The copy pattern used by this category.
    pub fn copy_pattern(self) -> CopyPattern {
        match self {
            Self::Int32 | Self::UInt32 | Self::Int64 | Self::Double => CopyPattern::BulkValue,
            Self::OwningHandleObject
            | Self::FixedLayoutStruct
            | Self::NestedContainer
            | Self::ParametricMatrix => CopyPattern::BulkHandle,
        }
    }

    /// Whether destroying a container also frees the elements it holds.
    ///
    /// Only fixed-layout structs are deep-cloned on insert, so only their
    /// containers own the contained elements.
    pub fn destroy_frees_elements(self) -> bool {
        matches!(self, Self::FixedLayoutStruct)
    }

    /// Ownership given to wrappers built from bulk-copied element handles.
    ///
    /// Returns `None` for value categories, which never produce handles.
    pub fn extracted_ownership(self) -> Option<Ownership> {
        match self.copy_pattern() {
            CopyPattern::BulkValue => None,
            CopyPattern::BulkHandle if self.destroy_frees_elements() => Some(Ownership::Borrowed),
            CopyPattern::BulkHandle => Some(Ownership::Owned),
        }
    }

    /// Whether a null element handle is a legal "empty element".
    pub fn allows_null_elements(self) -> bool {
        matches!(self, Self::ParametricMatrix)
    }
}

impl fmt::Display for ElementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::Int64 => "int64",
            Self::Double => "double",
            Self::OwningHandleObject => "owning-handle object",
            Self::FixedLayoutStruct => "fixed-layout struct",
            Self::NestedContainer => "nested container",
            Self::ParametricMatrix => "parametric matrix",
        };
        f.write_str(name)
    }
}
