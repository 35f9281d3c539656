//! Element type resolution.
//!
//! Maps an element type to its [`ElementType`] entry and from there to a
//! category strategy. Members of the matrix family have no entry; they are
//! recognised by the element kind their descriptor carries.

use std::any::{type_name, TypeId};
use std::sync::LazyLock;

use ffivec_core::{
    ElementCategory, ElementType, MatrixTemplateSizeParameter, Parameter, StdVectorError,
    TemplateShape, TypeDescriptor,
};
use indexmap::IndexMap;

use crate::abi;
use crate::dataset::{DatasetBox, DatasetImage};
use crate::detection::{FullObjectDetection, MModRect, RectDetection};
use crate::element::Element;
use crate::features::{ChipDetails, ColumnVector, DetectorWindowDetails, SurfPoint};
use crate::geometry::{DPoint, Point, Rectangle};
use crate::overlay::{OverlayDot, OverlayLine, OverlayRect};
use crate::sample_pair::SamplePair;
use crate::strategy::{CategoryStrategy, HandleStrategy, MatrixStrategy, ValueStrategy};
use crate::string::StdString;
use crate::vector::StdVector;

static SUPPORT_TYPES: LazyLock<IndexMap<TypeId, ElementType>> = LazyLock::new(|| {
    IndexMap::from([
        (TypeId::of::<i32>(), ElementType::Int32),
        (TypeId::of::<u32>(), ElementType::UInt32),
        (TypeId::of::<i64>(), ElementType::Long),
        (TypeId::of::<f64>(), ElementType::Double),
        (TypeId::of::<Point>(), ElementType::Point),
        (TypeId::of::<DPoint>(), ElementType::DPoint),
        (TypeId::of::<Rectangle>(), ElementType::Rectangle),
        (TypeId::of::<StdString>(), ElementType::StdString),
        (TypeId::of::<MModRect>(), ElementType::MModRect),
        (TypeId::of::<RectDetection>(), ElementType::RectDetection),
        (
            TypeId::of::<FullObjectDetection>(),
            ElementType::FullObjectDetection,
        ),
        (TypeId::of::<SamplePair>(), ElementType::SamplePair),
        (TypeId::of::<ColumnVector>(), ElementType::VectorDouble),
        (TypeId::of::<ChipDetails>(), ElementType::ChipDetails),
        (TypeId::of::<SurfPoint>(), ElementType::SurfPoint),
        (TypeId::of::<OverlayLine>(), ElementType::OverlayLine),
        (TypeId::of::<OverlayDot>(), ElementType::OverlayDot),
        (TypeId::of::<OverlayRect>(), ElementType::OverlayRect),
        (TypeId::of::<DatasetImage>(), ElementType::DatasetImage),
        (TypeId::of::<DatasetBox>(), ElementType::DatasetBox),
        (
            TypeId::of::<DetectorWindowDetails>(),
            ElementType::DetectorWindowDetails,
        ),
        (TypeId::of::<StdVector<f64>>(), ElementType::StdVectorDouble),
        (
            TypeId::of::<StdVector<Rectangle>>(),
            ElementType::StdVectorRectangle,
        ),
        (
            TypeId::of::<StdVector<MModRect>>(),
            ElementType::StdVectorMModRect,
        ),
        (
            TypeId::of::<StdVector<FullObjectDetection>>(),
            ElementType::StdVectorFullObjectDetection,
        ),
    ])
});

/// The registry entry for `descriptor`, if it has one.
pub fn element_type_of(descriptor: &TypeDescriptor) -> Option<ElementType> {
    SUPPORT_TYPES.get(&descriptor.type_id()).copied()
}

/// The category `descriptor` resolves to, without building a strategy.
pub fn category_of(descriptor: &TypeDescriptor) -> Option<ElementCategory> {
    match element_type_of(descriptor) {
        Some(ty) => Some(ty.category()),
        None => descriptor
            .matrix_element()
            .map(|_| ElementCategory::ParametricMatrix),
    }
}

/// Whether `T` can be stored in a container.
pub fn is_supported<T: Element>() -> bool {
    let descriptor = T::descriptor();
    descriptor.describes::<T>() && category_of(&descriptor).is_some()
}

/// Every registered element type, in registry order.
pub fn registered() -> impl Iterator<Item = ElementType> {
    SUPPORT_TYPES.values().copied()
}

/// Resolve the strategy for element type `T`.
///
/// `param` is consulted only for the matrix family, where it must be a
/// [`MatrixTemplateSizeParameter`]; without one the template is fully
/// dynamic. Registered types ignore `param`.
///
/// # Errors
///
/// [`StdVectorError::UnsupportedElementType`] for a type that is neither
/// registered nor a matrix, or whose descriptor describes another type.
/// [`StdVectorError::InvalidParameter`] for a matrix with a parameter of
/// another kind.
pub fn resolve<T: Element>(
    param: Option<&dyn Parameter>,
) -> Result<Box<dyn CategoryStrategy<T>>, StdVectorError> {
    let descriptor = T::descriptor();
    let unsupported = || StdVectorError::UnsupportedElementType {
        type_name: type_name::<T>(),
    };
    if !descriptor.describes::<T>() {
        log::warn!("descriptor {descriptor} does not describe {}", type_name::<T>());
        return Err(unsupported());
    }

    if let Some(ty) = element_type_of(&descriptor) {
        if param.is_some() {
            log::debug!("ignoring construction parameter for {ty}");
        }
        return strategy_for::<T>(ty).ok_or_else(unsupported);
    }

    if let Some(kind) = descriptor.matrix_element() {
        let template = match param {
            None => TemplateShape::DYNAMIC,
            Some(p) => p
                .as_any()
                .downcast_ref::<MatrixTemplateSizeParameter>()
                .map(MatrixTemplateSizeParameter::shape)
                .ok_or(StdVectorError::InvalidParameter {
                    type_name: type_name::<T>(),
                    expected: "MatrixTemplateSizeParameter",
                })?,
        };
        log::debug!("resolved {descriptor} with template {template}");
        return Ok(Box::new(MatrixStrategy::new(kind, template)));
    }

    Err(unsupported())
}

fn strategy_for<T: Element>(ty: ElementType) -> Option<Box<dyn CategoryStrategy<T>>> {
    let category = ty.category();
    match category.extracted_ownership() {
        None => abi::value_fns::<T>(ty)
            .map(|fns| Box::new(ValueStrategy::new(fns, category)) as Box<dyn CategoryStrategy<T>>),
        Some(_) => abi::handle_fns(ty)
            .map(|fns| Box::new(HandleStrategy::new(fns, category)) as Box<dyn CategoryStrategy<T>>),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Matrix;

    #[derive(Debug)]
    struct OtherParameter;

    impl Parameter for OtherParameter {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    struct Unlisted;

    impl Element for Unlisted {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::of::<Self>()
        }
    }

    struct Impostor;

    impl Element for Impostor {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::of::<i32>()
        }
    }

    #[test]
    fn every_element_type_is_registered_once() {
        let listed: Vec<_> = registered().collect();
        assert_eq!(listed, ElementType::ALL);
    }

    #[test]
    fn categories() {
        assert_eq!(
            category_of(&TypeDescriptor::of::<i64>()),
            Some(ElementCategory::Int64)
        );
        assert_eq!(
            category_of(&TypeDescriptor::of::<Rectangle>()),
            Some(ElementCategory::FixedLayoutStruct)
        );
        assert_eq!(
            category_of(&TypeDescriptor::of::<StdVector<f64>>()),
            Some(ElementCategory::NestedContainer)
        );
        assert_eq!(
            category_of(&Matrix::<u8>::descriptor()),
            Some(ElementCategory::ParametricMatrix)
        );
        assert_eq!(
            category_of(&TypeDescriptor::of::<SurfPoint>()),
            Some(ElementCategory::OwningHandleObject)
        );
        assert_eq!(category_of(&TypeDescriptor::of::<String>()), None);
    }

    #[test]
    fn unlisted_type_is_unsupported() {
        let err = resolve::<Unlisted>(None).err().unwrap();
        assert!(matches!(err, StdVectorError::UnsupportedElementType { type_name } if type_name.ends_with("Unlisted")));
    }

    #[test]
    fn unlisted_nested_type_is_unsupported() {
        assert!(!is_supported::<StdVector<i32>>());
        assert!(resolve::<StdVector<i32>>(None).is_err());
        assert!(is_supported::<StdVector<f64>>());
    }

    #[test]
    fn descriptor_must_describe_its_type() {
        assert!(resolve::<Impostor>(None).is_err());
        assert!(!is_supported::<Impostor>());
    }

    #[test]
    fn matrix_parameter_kind_is_checked() {
        let bad = OtherParameter;
        let err = resolve::<Matrix<f64>>(Some(&bad)).err().unwrap();
        assert!(matches!(err, StdVectorError::InvalidParameter { .. }));

        let good = MatrixTemplateSizeParameter::new(3, 1);
        let s = resolve::<Matrix<f64>>(Some(&good)).unwrap();
        assert_eq!(s.category(), ElementCategory::ParametricMatrix);
    }

    #[test]
    fn registered_types_ignore_parameters() {
        let p = OtherParameter;
        let s = resolve::<i32>(Some(&p)).unwrap();
        assert_eq!(s.category(), ElementCategory::Int32);
    }
}
