//! The parametric matrix family.
//!
//! `Matrix<E>` is recognised by the registry through its element kind
//! rather than a table entry, so every [`MatrixElement`] instantiation is
//! a valid container element. Containers of matrices are additionally
//! bound to a [`TemplateShape`] supplied as a
//! [`MatrixTemplateSizeParameter`](ffivec_core::MatrixTemplateSizeParameter).

#![allow(unsafe_code)]

use std::fmt;
use std::marker::PhantomData;
use std::mem::size_of;

use ffivec_core::{
    ForeignHandle, MatrixElementType, Ownership, StdVectorError, TemplateShape, TypeDescriptor,
};
use ffivec_native::matrix as native;

use crate::element::Element;
use crate::object::{allocated, NativeObject};

mod sealed {
    pub trait Sealed {}
}

/// A numeric or pixel type that a [`Matrix`] can hold.
///
/// Sealed: the foreign side only understands the kinds in
/// [`MatrixElementType`], and `size_of::<Self>()` must equal
/// `KIND.element_size()`.
pub trait MatrixElement: Copy + Default + PartialEq + fmt::Debug + sealed::Sealed + 'static {
    /// The element kind code passed to the foreign side.
    const KIND: MatrixElementType;
}

/// 8-bit red, green, blue pixel.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RgbPixel {
    /// Red channel.
    pub red: u8,
    /// Green channel.
    pub green: u8,
    /// Blue channel.
    pub blue: u8,
}

/// 8-bit red, green, blue, alpha pixel.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RgbAlphaPixel {
    /// Red channel.
    pub red: u8,
    /// Green channel.
    pub green: u8,
    /// Blue channel.
    pub blue: u8,
    /// Alpha channel.
    pub alpha: u8,
}

/// 8-bit hue, saturation, intensity pixel.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct HsiPixel {
    /// Hue.
    pub h: u8,
    /// Saturation.
    pub s: u8,
    /// Intensity.
    pub i: u8,
}

macro_rules! matrix_element {
    ($($t:ty => $kind:ident),* $(,)?) => {
        $(
            impl sealed::Sealed for $t {}
            impl MatrixElement for $t {
                const KIND: MatrixElementType = MatrixElementType::$kind;
            }
        )*
    };
}

matrix_element! {
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    f32 => Float,
    f64 => Double,
    RgbPixel => RgbPixel,
    RgbAlphaPixel => RgbAlphaPixel,
    HsiPixel => HsiPixel,
}

/// A foreign matrix of `E`, or the null matrix.
///
/// The null matrix has no foreign storage. It is what an empty slot of a
/// matrix container materializes as.
pub struct Matrix<E: MatrixElement> {
    object: Option<NativeObject>,
    template: TemplateShape,
    _element: PhantomData<E>,
}

impl<E: MatrixElement> Matrix<E> {
    /// An empty, fully dynamic matrix.
    pub fn new() -> Result<Self, StdVectorError> {
        Self::with_template(TemplateShape::DYNAMIC)
    }

    /// A zero-filled matrix sized by the fixed dimensions of `template`.
    pub fn with_template(template: TemplateShape) -> Result<Self, StdVectorError> {
        let ptr = native::matrix_new(E::KIND.code(), template.rows, template.columns);
        let object = allocated(ptr, native::matrix_delete, "matrix")?;
        Ok(Self::wrap(object, template))
    }

    /// A dynamic `rows x columns` matrix holding `data` in row-major order.
    pub fn from_data(rows: usize, columns: usize, data: &[E]) -> Result<Self, StdVectorError> {
        Self::from_data_with_template(TemplateShape::DYNAMIC, rows, columns, data)
    }

    /// As [`from_data`](Self::from_data), checked against `template`.
    pub fn from_data_with_template(
        template: TemplateShape,
        rows: usize,
        columns: usize,
        data: &[E],
    ) -> Result<Self, StdVectorError> {
        if rows.checked_mul(columns) != Some(data.len()) || !template.admits(rows, columns) {
            return Err(StdVectorError::InvalidParameter {
                type_name: std::any::type_name::<Self>(),
                expected: "rows * columns elements fitting the template",
            });
        }
        let bytes = std::mem::size_of_val(data);
        // SAFETY: `data` is valid for `bytes` reads and `E` has no padding.
        let ptr = unsafe {
            native::matrix_new_with_data(
                E::KIND.code(),
                template.rows,
                template.columns,
                rows,
                columns,
                data.as_ptr() as *const u8,
                bytes,
            )
        };
        let object = allocated(ptr, native::matrix_delete, "matrix_with_data")?;
        Ok(Self::wrap(object, template))
    }

    /// The null matrix.
    pub fn null() -> Self {
        Self {
            object: None,
            template: TemplateShape::DYNAMIC,
            _element: PhantomData,
        }
    }

    fn wrap(object: NativeObject, template: TemplateShape) -> Self {
        Self {
            object: Some(object),
            template,
            _element: PhantomData,
        }
    }

    /// Whether this is the null matrix.
    pub fn is_null(&self) -> bool {
        self.object.is_none()
    }

    /// Row count; zero for the null matrix.
    pub fn rows(&self) -> usize {
        self.object.as_ref().map_or(0, |o| {
            // SAFETY: the handle is live for `&self`.
            unsafe { native::matrix_nr(o.ptr()) }
        })
    }

    /// Column count; zero for the null matrix.
    pub fn columns(&self) -> usize {
        self.object.as_ref().map_or(0, |o| {
            // SAFETY: the handle is live for `&self`.
            unsafe { native::matrix_nc(o.ptr()) }
        })
    }

    /// The template this matrix was created or extracted with.
    pub fn template(&self) -> TemplateShape {
        self.template
    }

    /// Ownership of the underlying handle; `None` for the null matrix.
    pub fn ownership(&self) -> Option<Ownership> {
        self.object.as_ref().map(NativeObject::ownership)
    }

    /// Copy the elements out in row-major order.
    pub fn to_vec(&self) -> Vec<E> {
        let Some(o) = &self.object else {
            return Vec::new();
        };
        let n = self.rows() * self.columns();
        let mut out = Vec::<E>::with_capacity(n);
        // SAFETY: the foreign buffer holds `n` elements of `E::KIND`, each
        // `size_of::<E>()` bytes, and every bit pattern is a valid `E`.
        unsafe {
            let data = native::matrix_data(o.ptr());
            if n == 0 || data.is_null() {
                return Vec::new();
            }
            std::ptr::copy_nonoverlapping(data, out.as_mut_ptr() as *mut u8, n * size_of::<E>());
            out.set_len(n);
        }
        out
    }
}

impl<E: MatrixElement> Element for Matrix<E> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::matrix::<Self>(E::KIND)
    }

    fn foreign_handle(&self) -> Option<ForeignHandle> {
        self.object.as_ref().map(NativeObject::handle)
    }

    unsafe fn from_foreign(
        handle: ForeignHandle,
        ownership: Ownership,
        shape: TemplateShape,
    ) -> Result<Self, StdVectorError> {
        let object = NativeObject::from_raw(handle, ownership, native::matrix_delete);
        Ok(Self::wrap(object, shape))
    }

    fn null_element() -> Option<Self> {
        Some(Self::null())
    }
}

impl<E: MatrixElement> PartialEq for Matrix<E> {
    fn eq(&self, other: &Self) -> bool {
        self.is_null() == other.is_null()
            && self.rows() == other.rows()
            && self.columns() == other.columns()
            && self.to_vec() == other.to_vec()
    }
}

impl<E: MatrixElement> fmt::Debug for Matrix<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("Matrix(null)");
        }
        f.debug_struct("Matrix")
            .field("kind", &E::KIND)
            .field("rows", &self.rows())
            .field("columns", &self.columns())
            .field("template", &self.template)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_sizes_match_kinds() {
        fn check<E: MatrixElement>() {
            assert_eq!(size_of::<E>(), E::KIND.element_size(), "{:?}", E::KIND);
        }
        check::<u8>();
        check::<u16>();
        check::<u32>();
        check::<i8>();
        check::<i16>();
        check::<i32>();
        check::<f32>();
        check::<f64>();
        check::<RgbPixel>();
        check::<RgbAlphaPixel>();
        check::<HsiPixel>();
    }

    #[test]
    fn from_data_round_trip() {
        let data = [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0];
        let m = Matrix::from_data(2, 3, &data).unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.columns(), 3);
        assert_eq!(m.to_vec(), data);
    }

    #[test]
    fn pixel_data_round_trip() {
        let px = [
            RgbPixel { red: 1, green: 2, blue: 3 },
            RgbPixel { red: 4, green: 5, blue: 6 },
        ];
        let m = Matrix::from_data(1, 2, &px).unwrap();
        assert_eq!(m.to_vec(), px);
    }

    #[test]
    fn from_data_checks_length_and_template() {
        assert!(matches!(
            Matrix::<u8>::from_data(2, 2, &[0; 3]),
            Err(StdVectorError::InvalidParameter { .. })
        ));
        assert!(Matrix::<u8>::from_data_with_template(TemplateShape::new(0, 1), 2, 2, &[0; 4]).is_err());
        assert!(Matrix::<u8>::from_data_with_template(TemplateShape::new(0, 2), 2, 2, &[0; 4]).is_ok());
    }

    #[test]
    fn template_sets_fixed_dimensions() {
        let m = Matrix::<f32>::with_template(TemplateShape::new(3, 1)).unwrap();
        assert_eq!((m.rows(), m.columns()), (3, 1));
        assert_eq!(m.to_vec(), vec![0.0; 3]);
    }

    #[test]
    fn null_matrix() {
        let m = Matrix::<i32>::null();
        assert!(m.is_null());
        assert_eq!(m.rows(), 0);
        assert!(m.to_vec().is_empty());
        assert!(m.foreign_handle().is_none());
        assert_eq!(m.ownership(), None);
    }

    #[test]
    fn descriptor_carries_kind() {
        assert_eq!(
            Matrix::<HsiPixel>::descriptor().matrix_element(),
            Some(MatrixElementType::HsiPixel)
        );
        assert!(<f64 as Element>::descriptor().matrix_element().is_none());
    }
}
