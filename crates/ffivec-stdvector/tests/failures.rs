//! Integration test: construction failures and the unsupported surface.

use ffivec_native::stats;
use ffivec_stdvector::{
    Element, ErrorClass, Matrix, MatrixTemplateSizeParameter, Parameter, StdString, StdVector,
    StdVectorError, TypeDescriptor,
};
use ffivec_test_utils::{ConfigGuard, StatsWindow};

#[derive(Debug)]
struct ScaleParameter(f64);

struct Celsius;

impl Element for Celsius {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>()
    }
}

impl Parameter for ScaleParameter {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[test]
fn unregistered_types_are_rejected() {
    let err = StdVector::<Celsius>::new().unwrap_err();
    assert!(matches!(err, StdVectorError::UnsupportedElementType { .. }));
    assert_eq!(err.class(), ErrorClass::Construction);

    assert!(matches!(
        StdVector::<StdVector<i32>>::new(),
        Err(StdVectorError::UnsupportedElementType { .. })
    ));
    assert!(matches!(
        StdVector::<StdVector<StdString>>::with_size(1),
        Err(StdVectorError::UnsupportedElementType { .. })
    ));
}

#[test]
fn rejected_type_makes_no_foreign_call() {
    let calls = stats::snapshot().calls;
    let _ = StdVector::<StdVector<u32>>::from_elements(&[]);
    assert_eq!(stats::snapshot().calls, calls);
}

#[test]
fn negative_size_is_rejected_before_any_call() {
    let window = StatsWindow::start();
    assert_eq!(
        StdVector::<i32>::with_size(-1).unwrap_err(),
        StdVectorError::NegativeSize { requested: -1 }
    );
    assert_eq!(
        StdVector::<StdString>::with_size(-5).unwrap_err(),
        StdVectorError::NegativeSize { requested: -5 }
    );
    assert_eq!(window.delta().calls, 0);
}

#[test]
fn matrix_parameter_must_be_a_template_size() {
    let p = ScaleParameter(2.0);
    let err = StdVector::<Matrix<u8>>::with_parameter(Some(&p)).unwrap_err();
    assert!(matches!(err, StdVectorError::InvalidParameter { .. }));
    assert_eq!(p.0, 2.0);
}

#[test]
fn registered_types_ignore_parameters() {
    let p = MatrixTemplateSizeParameter::new(3, 1);
    let v = StdVector::<f64>::with_size_and_parameter(2, Some(&p)).unwrap();
    assert_eq!(v.size().unwrap(), 2);
}

#[test]
fn allocation_failure_is_reported() {
    let window = StatsWindow::start();
    let _guard = ConfigGuard::max_elements(2);
    assert_eq!(
        StdVector::<i32>::with_size(3).unwrap_err(),
        StdVectorError::ForeignAllocation {
            element: "stdvector_int32",
            operation: "new2",
        }
    );
    let err = StdVector::from_elements(&[1_i64, 2, 3]).unwrap_err();
    assert_eq!(err.to_string(), "foreign call stdvector_long_new3 returned null");
    assert_eq!(err.class(), ErrorClass::Foreign);
    assert_eq!(window.delta().rejected_allocations, 2);
    assert!(StdVector::<i32>::with_size(2).is_ok());
}

#[test]
fn null_source_element_is_reported_by_index() {
    let ok = Matrix::<f64>::new().unwrap();
    let r = StdVector::from_elements(&[ok, Matrix::null()]);
    assert_eq!(r.err(), Some(StdVectorError::NullSourceElement { index: 1 }));
}

#[test]
fn list_mutation_is_unsupported() {
    let mut v = StdVector::from_elements(&[1_i32, 2]).unwrap();
    let unsupported = |e: StdVectorError| {
        assert_eq!(e.class(), ErrorClass::UnsupportedOperation);
        e
    };
    unsupported(v.push(3).unwrap_err());
    unsupported(v.insert(0, 3).unwrap_err());
    unsupported(v.remove(&1).unwrap_err());
    unsupported(v.remove_at(0).unwrap_err());
    unsupported(v.clear().unwrap_err());
    unsupported(v.contains(&1).unwrap_err());
    unsupported(v.index_of(&1).unwrap_err());
    unsupported(v.get(0).unwrap_err());
    unsupported(v.set(0, 9).unwrap_err());
    unsupported(v.copy_to(&mut [0; 2], 0).unwrap_err());
    assert_eq!(v.to_array().unwrap(), vec![1, 2]);
}

#[test]
fn released_container_reports_usage_error() {
    let mut v = StdVector::<StdString>::new().unwrap();
    v.dispose();
    let err = v.iter().unwrap_err();
    assert_eq!(err, StdVectorError::Released);
    assert_eq!(err.class(), ErrorClass::Usage);
}
