//! Display overlays held by the foreign side.

#![allow(unsafe_code)]

use std::fmt;

use ffivec_core::StdVectorError;
use ffivec_native::overlay as native;
use ffivec_native::{NativeDPoint3, NativePoint, NativeRgbPixel};

use crate::detection::read_rect;
use crate::geometry::{DPoint3, Point, Rectangle};
use crate::matrix::RgbPixel;
use crate::object::{allocated, read_out, NativeObject};
use crate::string::owned_string;

impl From<RgbPixel> for NativeRgbPixel {
    fn from(p: RgbPixel) -> Self {
        NativeRgbPixel {
            red: p.red,
            green: p.green,
            blue: p.blue,
        }
    }
}

impl From<NativeRgbPixel> for RgbPixel {
    fn from(p: NativeRgbPixel) -> Self {
        RgbPixel {
            red: p.red,
            green: p.green,
            blue: p.blue,
        }
    }
}

/// A coloured line segment drawn over an image window.
pub struct OverlayLine {
    object: NativeObject,
}

impl OverlayLine {
    /// Create a foreign overlay line from `p1` to `p2`.
    pub fn new(p1: Point, p2: Point, color: RgbPixel) -> Result<Self, StdVectorError> {
        let ptr = native::overlay_line_new(p1.into(), p2.into(), color.into());
        allocated(ptr, native::overlay_line_delete, "overlay_line").map(|object| Self { object })
    }

    /// Start point.
    pub fn p1(&self) -> Point {
        read_out::<NativePoint>(&self.object, native::overlay_line_get_p1).into()
    }

    /// End point.
    pub fn p2(&self) -> Point {
        read_out::<NativePoint>(&self.object, native::overlay_line_get_p2).into()
    }

    /// Line colour.
    pub fn color(&self) -> RgbPixel {
        read_out::<NativeRgbPixel>(&self.object, native::overlay_line_get_color).into()
    }
}

handle_element!(OverlayLine, native::overlay_line_delete);

impl PartialEq for OverlayLine {
    fn eq(&self, other: &Self) -> bool {
        (self.p1(), self.p2(), self.color()) == (other.p1(), other.p2(), other.color())
    }
}

impl Eq for OverlayLine {}

impl fmt::Debug for OverlayLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayLine")
            .field("p1", &self.p1())
            .field("p2", &self.p2())
            .field("color", &self.color())
            .finish()
    }
}

/// A coloured dot drawn in a 3D perspective window.
pub struct OverlayDot {
    object: NativeObject,
}

impl OverlayDot {
    /// Create a foreign overlay dot.
    pub fn new(position: DPoint3, color: RgbPixel) -> Result<Self, StdVectorError> {
        let ptr = native::overlay_dot_new(position.into(), color.into());
        allocated(ptr, native::overlay_dot_delete, "overlay_dot").map(|object| Self { object })
    }

    /// Position in space.
    pub fn position(&self) -> DPoint3 {
        read_out::<NativeDPoint3>(&self.object, native::overlay_dot_get_position).into()
    }

    /// Dot colour.
    pub fn color(&self) -> RgbPixel {
        read_out::<NativeRgbPixel>(&self.object, native::overlay_dot_get_color).into()
    }
}

handle_element!(OverlayDot, native::overlay_dot_delete);

impl PartialEq for OverlayDot {
    fn eq(&self, other: &Self) -> bool {
        self.position() == other.position() && self.color() == other.color()
    }
}

impl fmt::Debug for OverlayDot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayDot")
            .field("position", &self.position())
            .field("color", &self.color())
            .finish()
    }
}

/// A labelled, coloured rectangle drawn over an image display.
pub struct OverlayRect {
    object: NativeObject,
}

impl OverlayRect {
    /// Create a foreign overlay rectangle.
    pub fn new(rect: Rectangle, color: RgbPixel, label: &str) -> Result<Self, StdVectorError> {
        // SAFETY: `label` is valid for `label.len()` reads.
        let ptr = unsafe {
            native::overlay_rect_new(rect.into(), color.into(), label.as_ptr(), label.len())
        };
        allocated(ptr, native::overlay_rect_delete, "overlay_rect").map(|object| Self { object })
    }

    /// Outline.
    pub fn rect(&self) -> Rectangle {
        read_rect(&self.object, native::overlay_rect_get_rect)
    }

    /// Outline colour.
    pub fn color(&self) -> RgbPixel {
        read_out::<NativeRgbPixel>(&self.object, native::overlay_rect_get_color).into()
    }

    /// Caption.
    pub fn label(&self) -> String {
        // SAFETY: the handle is live for `&self`.
        let ptr = unsafe { native::overlay_rect_label(self.object.ptr()) };
        owned_string(ptr, "overlay_rect_label")
    }
}

handle_element!(OverlayRect, native::overlay_rect_delete);

impl PartialEq for OverlayRect {
    fn eq(&self, other: &Self) -> bool {
        self.rect() == other.rect() && self.color() == other.color() && self.label() == other.label()
    }
}

impl Eq for OverlayRect {}

impl fmt::Debug for OverlayRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayRect")
            .field("rect", &self.rect())
            .field("color", &self.color())
            .field("label", &self.label())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREEN: RgbPixel = RgbPixel {
        red: 0,
        green: 255,
        blue: 0,
    };

    #[test]
    fn line_fields() {
        let l = OverlayLine::new(Point::new(0, 0), Point::new(5, 7), GREEN).unwrap();
        assert_eq!(l.p1(), Point::new(0, 0));
        assert_eq!(l.p2(), Point::new(5, 7));
        assert_eq!(l.color(), GREEN);
    }

    #[test]
    fn dot_fields() {
        let d = OverlayDot::new(DPoint3::new(0.5, 1.0, -2.0), GREEN).unwrap();
        assert_eq!(d.position(), DPoint3::new(0.5, 1.0, -2.0));
        assert_eq!(d.color(), GREEN);
    }

    #[test]
    fn rect_fields() {
        let r = OverlayRect::new(Rectangle::new(2, 2, 6, 6), GREEN, "plate").unwrap();
        assert_eq!(r.rect().area(), 25);
        assert_eq!(r.label(), "plate");
        assert_ne!(r, OverlayRect::new(Rectangle::new(2, 2, 6, 6), GREEN, "sign").unwrap());
    }
}
