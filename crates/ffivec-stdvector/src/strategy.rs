//! Category strategies: the per-category implementation of container
//! lifetime and bulk data transfer.
//!
//! There are three implementations, each parameterized by a foreign
//! function table:
//!
//! - [`ValueStrategy`] moves plain values in one bulk copy each way,
//!   reading them straight out of the foreign storage address.
//! - [`HandleStrategy`] moves element handles in one bulk copy and wraps
//!   each handle, covering fixed-layout structs, handle-held objects, and
//!   nested containers.
//! - [`MatrixStrategy`] is the handle pattern bound to a matrix element
//!   kind and template shape.
//!
//! Every method that takes a [`ForeignHandle`] is `unsafe`: the handle must
//! be a live container created by the same strategy.

#![allow(unsafe_code)]

use std::ffi::c_void;
use std::ptr;

use ffivec_core::{
    ElementCategory, ForeignHandle, MatrixElementType, Ownership, StdVectorError, TemplateShape,
};
use smallvec::SmallVec;

use crate::abi::{self, HandleFns, MatrixFns, ValueFns};
use crate::element::Element;
use crate::object::NativeObject;

/// Handle arrays up to this length stay on the stack.
const INLINE_HANDLES: usize = 16;

type HandleArray = SmallVec<[*mut c_void; INLINE_HANDLES]>;

/// Foreign container operations for one element category.
pub trait CategoryStrategy<T> {
    /// The category this strategy implements.
    fn category(&self) -> ElementCategory;

    /// Allocate an empty foreign container.
    fn create_empty(&self) -> Result<ForeignHandle, StdVectorError>;

    /// Allocate a container of `n` default elements.
    ///
    /// Negative `n` fails with [`StdVectorError::NegativeSize`] before any
    /// foreign call.
    fn create_sized(&self, n: isize) -> Result<ForeignHandle, StdVectorError>;

    /// Allocate a container populated from `elements`.
    fn create_from(&self, elements: &[T]) -> Result<ForeignHandle, StdVectorError>;

    /// Free the container. Fixed-layout struct containers also free their
    /// elements; handle containers release only their own references.
    ///
    /// # Safety
    ///
    /// `handle` must be live and is invalid afterwards.
    unsafe fn destroy(&self, handle: ForeignHandle);

    /// Element count.
    ///
    /// # Safety
    ///
    /// `handle` must be live.
    unsafe fn size(&self, handle: ForeignHandle) -> usize;

    /// Address of the foreign element storage.
    ///
    /// # Safety
    ///
    /// `handle` must be live.
    unsafe fn raw_pointer(&self, handle: ForeignHandle) -> *mut c_void;

    /// Copy every element out into native values.
    ///
    /// # Safety
    ///
    /// `handle` must be live. Borrowed elements (fixed-layout structs) are
    /// read before this returns and do not outlive the call.
    unsafe fn materialize(&self, handle: ForeignHandle) -> Result<Vec<T>, StdVectorError>;
}

fn checked_len(n: isize) -> Result<usize, StdVectorError> {
    usize::try_from(n).map_err(|_| StdVectorError::NegativeSize { requested: n })
}

fn allocated(
    ptr: *mut c_void,
    family: &'static str,
    operation: &'static str,
) -> Result<ForeignHandle, StdVectorError> {
    let handle = ForeignHandle::new(ptr).ok_or(StdVectorError::ForeignAllocation {
        element: family,
        operation,
    });
    match &handle {
        Ok(h) => log::debug!("{family}_{operation} -> {h}"),
        Err(_) => log::warn!("{family}_{operation} returned null"),
    }
    handle
}

/// Wrap `raw` handles, in order.
///
/// Every non-null handle is wrapped even after a failure so owned
/// references are released when the partial result drops.
///
/// # Safety
///
/// Each non-null entry must be a live element of `T` carrying `ownership`.
unsafe fn wrap_all<T: Element>(
    raw: Vec<*mut c_void>,
    ownership: Ownership,
    shape: TemplateShape,
    allow_null: bool,
) -> Result<Vec<T>, StdVectorError> {
    let mut out = Vec::with_capacity(raw.len());
    let mut first_error = None;
    for (index, p) in raw.into_iter().enumerate() {
        let element = match ForeignHandle::new(p) {
            Some(h) => T::from_foreign(h, ownership, shape).map_err(|e| match e {
                StdVectorError::NullForeignElement { .. } => {
                    StdVectorError::NullForeignElement { index }
                }
                other => other,
            }),
            None if allow_null => {
                T::null_element().ok_or(StdVectorError::NullForeignElement { index })
            }
            None => Err(StdVectorError::NullForeignElement { index }),
        };
        match element {
            Ok(v) => out.push(v),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(out),
    }
}

/// Borrow each element's current handle.
fn source_handles<T: Element>(elements: &[T]) -> Result<HandleArray, StdVectorError> {
    elements
        .iter()
        .enumerate()
        .map(|(index, e)| {
            e.foreign_handle()
                .map(ForeignHandle::as_ptr)
                .ok_or(StdVectorError::NullSourceElement { index })
        })
        .collect()
}

// ── value categories ──────────────────────────────────────────────

/// Strategy for `int32`, `uint32`, `long`, and `double` containers.
pub struct ValueStrategy<T: 'static> {
    fns: &'static ValueFns<T>,
    category: ElementCategory,
}

impl<T: 'static> ValueStrategy<T> {
    pub(crate) fn new(fns: &'static ValueFns<T>, category: ElementCategory) -> Self {
        Self { fns, category }
    }
}

impl<T: 'static> CategoryStrategy<T> for ValueStrategy<T> {
    fn category(&self) -> ElementCategory {
        self.category
    }

    fn create_empty(&self) -> Result<ForeignHandle, StdVectorError> {
        // SAFETY: no arguments.
        allocated(unsafe { (self.fns.new1)() }, self.fns.family, "new1")
    }

    fn create_sized(&self, n: isize) -> Result<ForeignHandle, StdVectorError> {
        let n = checked_len(n)?;
        // SAFETY: plain length argument.
        allocated(unsafe { (self.fns.new2)(n) }, self.fns.family, "new2")
    }

    fn create_from(&self, elements: &[T]) -> Result<ForeignHandle, StdVectorError> {
        // SAFETY: `elements` is valid for `len` reads; the table is typed
        // in `T`, so the foreign side reads exactly these values.
        let ptr = unsafe { (self.fns.new3)(elements.as_ptr(), elements.len()) };
        allocated(ptr, self.fns.family, "new3")
    }

    unsafe fn destroy(&self, handle: ForeignHandle) {
        log::debug!("{}_delete {handle}", self.fns.family);
        (self.fns.delete)(handle.as_ptr())
    }

    unsafe fn size(&self, handle: ForeignHandle) -> usize {
        (self.fns.get_size)(handle.as_ptr())
    }

    unsafe fn raw_pointer(&self, handle: ForeignHandle) -> *mut c_void {
        (self.fns.get_pointer)(handle.as_ptr())
    }

    unsafe fn materialize(&self, handle: ForeignHandle) -> Result<Vec<T>, StdVectorError> {
        let n = self.size(handle);
        log::trace!("{}: materializing {n} values", self.fns.family);
        if n == 0 {
            return Ok(Vec::new());
        }
        let src = (self.fns.get_pointer)(handle.as_ptr()) as *const T;
        if src.is_null() {
            return Err(StdVectorError::NullForeignElement { index: 0 });
        }
        let mut out = Vec::<T>::with_capacity(n);
        // Value tables only exist for primitive numeric `T`; `src` addresses
        // `n` initialized values owned by the container.
        ptr::copy_nonoverlapping(src, out.as_mut_ptr(), n);
        out.set_len(n);
        Ok(out)
    }
}

// ── handle categories ─────────────────────────────────────────────

/// Strategy for fixed-layout struct, handle-held object, and nested
/// container elements.
pub struct HandleStrategy {
    fns: &'static HandleFns,
    category: ElementCategory,
}

impl HandleStrategy {
    pub(crate) fn new(fns: &'static HandleFns, category: ElementCategory) -> Self {
        Self { fns, category }
    }
}

impl<T: Element> CategoryStrategy<T> for HandleStrategy {
    fn category(&self) -> ElementCategory {
        self.category
    }

    fn create_empty(&self) -> Result<ForeignHandle, StdVectorError> {
        // SAFETY: no arguments.
        allocated(unsafe { (self.fns.new1)() }, self.fns.family, "new1")
    }

    fn create_sized(&self, n: isize) -> Result<ForeignHandle, StdVectorError> {
        let n = checked_len(n)?;
        // SAFETY: plain length argument.
        allocated(unsafe { (self.fns.new2)(n) }, self.fns.family, "new2")
    }

    fn create_from(&self, elements: &[T]) -> Result<ForeignHandle, StdVectorError> {
        let ptr = if self.category.destroy_frees_elements() {
            // Temporaries live until the foreign side has cloned them.
            let temporaries = elements
                .iter()
                .map(T::to_transferable)
                .collect::<Result<SmallVec<[NativeObject; INLINE_HANDLES]>, _>>()?;
            let handles: HandleArray = temporaries.iter().map(NativeObject::ptr).collect();
            // SAFETY: every entry is a live owned element of this family.
            unsafe { (self.fns.new3)(handles.as_ptr(), handles.len()) }
        } else {
            let handles = source_handles(elements)?;
            // SAFETY: every entry is the live handle of a borrowed element.
            unsafe { (self.fns.new3)(handles.as_ptr(), handles.len()) }
        };
        allocated(ptr, self.fns.family, "new3")
    }

    unsafe fn destroy(&self, handle: ForeignHandle) {
        log::debug!("{}_delete {handle}", self.fns.family);
        (self.fns.delete)(handle.as_ptr())
    }

    unsafe fn size(&self, handle: ForeignHandle) -> usize {
        (self.fns.get_size)(handle.as_ptr())
    }

    unsafe fn raw_pointer(&self, handle: ForeignHandle) -> *mut c_void {
        (self.fns.get_pointer)(handle.as_ptr())
    }

    unsafe fn materialize(&self, handle: ForeignHandle) -> Result<Vec<T>, StdVectorError> {
        let n = CategoryStrategy::<T>::size(self, handle);
        log::trace!("{}: materializing {n} handles", self.fns.family);
        if n == 0 {
            return Ok(Vec::new());
        }
        let mut raw = vec![ptr::null_mut(); n];
        (self.fns.copy)(handle.as_ptr(), raw.as_mut_ptr());
        let ownership = self
            .category
            .extracted_ownership()
            .unwrap_or(Ownership::Borrowed);
        wrap_all(
            raw,
            ownership,
            TemplateShape::DYNAMIC,
            self.category.allows_null_elements(),
        )
    }
}

// ── matrix family ─────────────────────────────────────────────────

/// Strategy for containers of matrices with one element kind and template.
pub struct MatrixStrategy {
    fns: &'static MatrixFns,
    kind: MatrixElementType,
    template: TemplateShape,
}

impl MatrixStrategy {
    pub(crate) fn new(kind: MatrixElementType, template: TemplateShape) -> Self {
        Self {
            fns: &abi::MATRIX,
            kind,
            template,
        }
    }

    /// The bound element kind.
    pub fn kind(&self) -> MatrixElementType {
        self.kind
    }

    /// The bound template shape.
    pub fn template(&self) -> TemplateShape {
        self.template
    }

    fn binding(&self) -> (i32, u32, u32) {
        (self.kind.code(), self.template.rows, self.template.columns)
    }
}

impl<T: Element> CategoryStrategy<T> for MatrixStrategy {
    fn category(&self) -> ElementCategory {
        ElementCategory::ParametricMatrix
    }

    fn create_empty(&self) -> Result<ForeignHandle, StdVectorError> {
        let (k, r, c) = self.binding();
        // SAFETY: plain arguments.
        allocated(unsafe { (self.fns.new1)(k, r, c) }, self.fns.family, "new1")
    }

    fn create_sized(&self, n: isize) -> Result<ForeignHandle, StdVectorError> {
        let n = checked_len(n)?;
        let (k, r, c) = self.binding();
        // SAFETY: plain arguments.
        allocated(unsafe { (self.fns.new2)(k, r, c, n) }, self.fns.family, "new2")
    }

    fn create_from(&self, elements: &[T]) -> Result<ForeignHandle, StdVectorError> {
        let handles = source_handles(elements)?;
        let (k, r, c) = self.binding();
        // SAFETY: every entry is the live handle of a borrowed matrix.
        let ptr = unsafe { (self.fns.new3)(k, r, c, handles.as_ptr(), handles.len()) };
        allocated(ptr, self.fns.family, "new3")
    }

    unsafe fn destroy(&self, handle: ForeignHandle) {
        let (k, r, c) = self.binding();
        log::debug!("{}_delete {handle} ({} {})", self.fns.family, self.kind, self.template);
        (self.fns.delete)(k, r, c, handle.as_ptr())
    }

    unsafe fn size(&self, handle: ForeignHandle) -> usize {
        let (k, r, c) = self.binding();
        (self.fns.get_size)(k, r, c, handle.as_ptr())
    }

    unsafe fn raw_pointer(&self, handle: ForeignHandle) -> *mut c_void {
        let (k, r, c) = self.binding();
        (self.fns.get_pointer)(k, r, c, handle.as_ptr())
    }

    unsafe fn materialize(&self, handle: ForeignHandle) -> Result<Vec<T>, StdVectorError> {
        let n = CategoryStrategy::<T>::size(self, handle);
        log::trace!("{}: materializing {n} matrices", self.fns.family);
        if n == 0 {
            return Ok(Vec::new());
        }
        let mut raw = vec![ptr::null_mut(); n];
        let (k, r, c) = self.binding();
        (self.fns.copy)(k, r, c, handle.as_ptr(), raw.as_mut_ptr());
        let category = CategoryStrategy::<T>::category(self);
        let ownership = category.extracted_ownership().unwrap_or(Ownership::Owned);
        wrap_all(raw, ownership, self.template, category.allows_null_elements())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::matrix::Matrix;
    use crate::string::StdString;
    use ffivec_core::ElementType;
    use ffivec_native::stats;

    fn int32() -> ValueStrategy<i32> {
        ValueStrategy::new(&abi::INT32, ElementCategory::Int32)
    }

    fn strings() -> HandleStrategy {
        HandleStrategy::new(
            abi::handle_fns(ElementType::StdString).unwrap(),
            ElementCategory::OwningHandleObject,
        )
    }

    #[test]
    fn negative_size_makes_no_foreign_call() {
        let before = stats::snapshot().calls;
        let r = int32().create_sized(-1);
        assert_eq!(r, Err(StdVectorError::NegativeSize { requested: -1 }));
        assert_eq!(stats::snapshot().calls, before);
    }

    #[test]
    fn value_round_trip() {
        let s = int32();
        let h = s.create_from(&[9, 8, 7]).unwrap();
        unsafe {
            assert_eq!(s.size(h), 3);
            assert_eq!(s.materialize(h).unwrap(), vec![9, 8, 7]);
            s.destroy(h);
        }
    }

    #[test]
    fn empty_materialize_skips_copy() {
        let s = int32();
        let h = s.create_empty().unwrap();
        let before = stats::snapshot();
        let v = unsafe { s.materialize(h) }.unwrap();
        let after = stats::snapshot();
        assert!(v.is_empty());
        assert_eq!(after.bulk_copies, before.bulk_copies);
        assert_eq!(after.pointer_queries, before.pointer_queries);
        unsafe { s.destroy(h) };
    }

    #[test]
    fn value_materialize_reads_the_storage_address() {
        let s = ValueStrategy::new(&abi::LONG, ElementCategory::Int64);
        let h = s.create_from(&[i64::MIN, 0, i64::MAX]).unwrap();
        let before = stats::snapshot();
        let v = unsafe { s.materialize(h) }.unwrap();
        let after = stats::snapshot();
        assert_eq!(v, vec![i64::MIN, 0, i64::MAX]);
        assert_eq!(after.pointer_queries, before.pointer_queries + 1);
        assert_eq!(after.bulk_copies, before.bulk_copies);
        unsafe { s.destroy(h) };
    }

    #[test]
    fn null_matrix_source_is_rejected() {
        let m = Matrix::<f64>::null();
        let s = MatrixStrategy::new(MatrixElementType::Double, TemplateShape::DYNAMIC);
        assert_eq!(
            CategoryStrategy::<Matrix<f64>>::create_from(&s, &[m]),
            Err(StdVectorError::NullSourceElement { index: 0 })
        );
    }

    #[test]
    fn handle_strategy_round_trip() {
        let s = strings();
        let items = [StdString::new("one").unwrap(), StdString::new("two").unwrap()];
        let h = s.create_from(&items).unwrap();
        let out: Vec<StdString> = unsafe { s.materialize(h) }.unwrap();
        unsafe { CategoryStrategy::<StdString>::destroy(&s, h) };
        assert_eq!(out, items);
    }

    #[test]
    fn fixed_layout_temporaries_are_freed() {
        stats::reset();
        let s = HandleStrategy::new(
            abi::handle_fns(ElementType::Point).unwrap(),
            ElementCategory::FixedLayoutStruct,
        );
        let h = s.create_from(&[Point::new(1, 1), Point::new(2, 2)]).unwrap();
        let s1 = stats::snapshot();
        assert_eq!(s1.objects_created, 2);
        assert_eq!(s1.objects_freed, 2);
        let out: Vec<Point> = unsafe { s.materialize(h) }.unwrap();
        assert_eq!(out, [Point::new(1, 1), Point::new(2, 2)]);
        unsafe { CategoryStrategy::<Point>::destroy(&s, h) };
        assert_eq!(stats::snapshot().struct_elements_freed, 2);
    }

    #[test]
    fn matrix_empty_slots_materialize_as_null() {
        let s = MatrixStrategy::new(MatrixElementType::Float, TemplateShape::DYNAMIC);
        let h = CategoryStrategy::<Matrix<f32>>::create_sized(&s, 2).unwrap();
        let out: Vec<Matrix<f32>> = unsafe { s.materialize(h) }.unwrap();
        unsafe { CategoryStrategy::<Matrix<f32>>::destroy(&s, h) };
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(Matrix::is_null));
    }

    #[test]
    fn null_handle_outside_matrices_is_an_error() {
        let allow = ElementCategory::OwningHandleObject.allows_null_elements();
        let raw = vec![ptr::null_mut()];
        let r = unsafe { wrap_all::<StdString>(raw, Ownership::Owned, TemplateShape::DYNAMIC, allow) };
        assert_eq!(r.unwrap_err(), StdVectorError::NullForeignElement { index: 0 });
    }

    #[test]
    fn matrix_category_accepts_null_handles() {
        let allow = ElementCategory::ParametricMatrix.allows_null_elements();
        let raw = vec![ptr::null_mut(), ptr::null_mut()];
        let out =
            unsafe { wrap_all::<Matrix<f64>>(raw, Ownership::Owned, TemplateShape::DYNAMIC, allow) }
                .unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(Matrix::is_null));
    }
}
