//! Construction parameters passed alongside an element type.

use std::any::Any;
use std::fmt;

use crate::handle::TemplateShape;

/// An optional, type-specific construction parameter.
///
/// Only the matrix family consumes a parameter today
/// ([`MatrixTemplateSizeParameter`]). Resolution downcasts through
/// [`as_any`](Parameter::as_any) and rejects parameters of any other kind.
pub trait Parameter: fmt::Debug {
    /// Upcast for downcasting to the concrete parameter type.
    fn as_any(&self) -> &dyn Any;
}

/// Template dimensions for containers of matrices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MatrixTemplateSizeParameter {
    /// Template row count; `0` for dynamic.
    pub template_rows: u32,
    /// Template column count; `0` for dynamic.
    pub template_columns: u32,
}

impl MatrixTemplateSizeParameter {
    /// Create a parameter from template rows and columns.
    pub const fn new(template_rows: u32, template_columns: u32) -> Self {
        Self {
            template_rows,
            template_columns,
        }
    }

    /// The template shape this parameter describes.
    pub fn shape(&self) -> TemplateShape {
        TemplateShape::new(self.template_rows, self.template_columns)
    }
}

impl Parameter for MatrixTemplateSizeParameter {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Other;

    impl Parameter for Other {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn downcast_to_matrix_parameter() {
        let p = MatrixTemplateSizeParameter::new(3, 1);
        let dynp: &dyn Parameter = &p;
        let back = dynp
            .as_any()
            .downcast_ref::<MatrixTemplateSizeParameter>()
            .unwrap();
        assert_eq!(back.shape(), TemplateShape::new(3, 1));
    }

    #[test]
    fn foreign_parameter_does_not_downcast() {
        let dynp: &dyn Parameter = &Other;
        assert!(dynp
            .as_any()
            .downcast_ref::<MatrixTemplateSizeParameter>()
            .is_none());
    }

    #[test]
    fn default_is_dynamic() {
        assert!(MatrixTemplateSizeParameter::default().shape().is_dynamic());
    }
}
