//! `repr(C)` value types shared with callers.

/// Integer 2D point.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NativePoint {
    /// Horizontal coordinate.
    pub x: i64,
    /// Vertical coordinate.
    pub y: i64,
}

/// Floating-point 2D point.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NativeDPoint {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

/// Floating-point 3D point.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NativeDPoint3 {
    /// First coordinate.
    pub x: f64,
    /// Second coordinate.
    pub y: f64,
    /// Third coordinate.
    pub z: f64,
}

/// 8-bit red, green, blue colour.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NativeRgbPixel {
    /// Red channel.
    pub red: u8,
    /// Green channel.
    pub green: u8,
    /// Blue channel.
    pub blue: u8,
}

/// Integer rectangle. Bounds are inclusive on all four sides.
///
/// The default is the empty rectangle `(0, 0, -1, -1)`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NativeRectangle {
    /// Leftmost column.
    pub left: i64,
    /// Topmost row.
    pub top: i64,
    /// Rightmost column.
    pub right: i64,
    /// Bottom row.
    pub bottom: i64,
}

impl NativeRectangle {
    /// Build a rectangle from its four bounds.
    pub const fn new(left: i64, top: i64, right: i64, bottom: i64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Whether the rectangle covers no cells.
    pub const fn is_empty(&self) -> bool {
        self.left > self.right || self.top > self.bottom
    }
}

impl Default for NativeRectangle {
    fn default() -> Self {
        Self::new(0, 0, -1, -1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rectangle_is_empty() {
        let r = NativeRectangle::default();
        assert_eq!(r, NativeRectangle::new(0, 0, -1, -1));
        assert!(r.is_empty());
        assert!(!NativeRectangle::new(0, 0, 0, 0).is_empty());
    }
}
