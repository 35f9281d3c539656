//! Opaque foreign handles, the owns/borrows flag, and matrix template shapes.

use std::ffi::c_void;
use std::fmt;
use std::ptr::NonNull;

/// An opaque, non-null address identifying foreign-side storage.
///
/// A handle is either a *container handle* (a whole foreign sequence) or an
/// *element handle* (one foreign element). It is never dereferenced on this
/// side of the boundary; only foreign functions interpret it. A null foreign
/// address is represented as `Option<ForeignHandle>::None`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ForeignHandle(NonNull<c_void>);

impl ForeignHandle {
    /// Wrap a raw foreign address. Returns `None` for null.
    pub fn new(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr).map(Self)
    }

    /// The raw address, for passing back to foreign functions.
    pub fn as_ptr(self) -> *mut c_void {
        self.0.as_ptr()
    }

    /// The address as an integer, for diagnostics.
    pub fn addr(self) -> usize {
        self.0.as_ptr() as usize
    }
}

impl fmt::Debug for ForeignHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ForeignHandle({:#x})", self.addr())
    }
}

impl fmt::Display for ForeignHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.addr())
    }
}

/// Whether an in-process wrapper is responsible for freeing its handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ownership {
    /// The wrapper frees the handle when dropped.
    Owned,
    /// Another party (usually the containing sequence) frees the handle.
    Borrowed,
}

impl Ownership {
    /// `true` for [`Ownership::Owned`].
    pub fn owns(self) -> bool {
        matches!(self, Self::Owned)
    }
}

/// Compile-time matrix dimensions threaded through matrix foreign calls.
///
/// Zero in either position means that dimension is dynamic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TemplateShape {
    /// Template row count; `0` for dynamic.
    pub rows: u32,
    /// Template column count; `0` for dynamic.
    pub columns: u32,
}

impl TemplateShape {
    /// Both dimensions dynamic.
    pub const DYNAMIC: TemplateShape = TemplateShape {
        rows: 0,
        columns: 0,
    };

    /// Create a shape from template rows and columns.
    pub const fn new(rows: u32, columns: u32) -> Self {
        Self { rows, columns }
    }

    /// Whether both dimensions are dynamic.
    pub fn is_dynamic(&self) -> bool {
        self.rows == 0 && self.columns == 0
    }

    /// Whether a concrete `rows × columns` matrix fits this template.
    pub fn admits(&self, rows: usize, columns: usize) -> bool {
        (self.rows == 0 || self.rows as usize == rows)
            && (self.columns == 0 || self.columns as usize == columns)
    }
}

impl fmt::Display for TemplateShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_is_not_a_handle() {
        assert!(ForeignHandle::new(std::ptr::null_mut()).is_none());
    }

    #[test]
    fn handle_round_trips_address() {
        let mut slot = 7u64;
        let raw = &mut slot as *mut u64 as *mut c_void;
        let h = ForeignHandle::new(raw).unwrap();
        assert_eq!(h.as_ptr(), raw);
        assert_eq!(h.addr(), raw as usize);
    }

    #[test]
    fn ownership_flag() {
        assert!(Ownership::Owned.owns());
        assert!(!Ownership::Borrowed.owns());
    }

    #[test]
    fn dynamic_template_admits_anything() {
        assert!(TemplateShape::DYNAMIC.is_dynamic());
        assert!(TemplateShape::DYNAMIC.admits(0, 0));
        assert!(TemplateShape::DYNAMIC.admits(31, 7));
    }

    #[test]
    fn fixed_template_checks_each_dimension() {
        let column_vector = TemplateShape::new(0, 1);
        assert!(!column_vector.is_dynamic());
        assert!(column_vector.admits(5, 1));
        assert!(!column_vector.admits(5, 2));

        let square = TemplateShape::new(3, 3);
        assert!(square.admits(3, 3));
        assert!(!square.admits(3, 4));
        assert!(!square.admits(2, 3));
    }
}
