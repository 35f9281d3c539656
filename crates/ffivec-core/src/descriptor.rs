//! Runtime descriptors for in-process element types.

use std::any::{type_name, TypeId};
use std::fmt;

use crate::element::MatrixElementType;

/// Identifies an element type for registry lookup.
///
/// Ordinary element types are looked up by [`TypeId`]. Members of the
/// matrix family additionally carry the numeric kind taken from their own
/// type parameter, which is how the registry recognises them without a
/// table entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    type_id: TypeId,
    type_name: &'static str,
    matrix_element: Option<MatrixElementType>,
}

impl TypeDescriptor {
    /// Descriptor for a plain element type.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            matrix_element: None,
        }
    }

    /// Descriptor for a member of the matrix family with element kind `kind`.
    pub fn matrix<T: ?Sized + 'static>(kind: MatrixElementType) -> Self {
        Self {
            matrix_element: Some(kind),
            ..Self::of::<T>()
        }
    }

    /// The described type's [`TypeId`].
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The described type's name, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The matrix element kind, if the type belongs to the matrix family.
    pub fn matrix_element(&self) -> Option<MatrixElementType> {
        self.matrix_element
    }

    /// Whether this descriptor describes `T`.
    pub fn describes<T: ?Sized + 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.matrix_element {
            Some(kind) => write!(f, "{} (matrix of {kind})", self.type_name),
            None => f.write_str(self.type_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;

    #[test]
    fn plain_descriptor_has_no_matrix_kind() {
        let d = TypeDescriptor::of::<i32>();
        assert!(d.describes::<i32>());
        assert!(!d.describes::<u32>());
        assert_eq!(d.matrix_element(), None);
        assert_eq!(d.type_name(), "i32");
    }

    #[test]
    fn matrix_descriptor_keeps_type_identity() {
        let d = TypeDescriptor::matrix::<Marker>(MatrixElementType::Float);
        assert!(d.describes::<Marker>());
        assert_eq!(d.matrix_element(), Some(MatrixElementType::Float));
        assert_ne!(d, TypeDescriptor::of::<Marker>());
    }

    #[test]
    fn display_mentions_matrix_kind() {
        let d = TypeDescriptor::matrix::<Marker>(MatrixElementType::Double);
        assert!(d.to_string().ends_with("(matrix of double)"));
    }
}
