//! Geometry primitives shared by layout output and the paint stage.
//!
//! [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
//!
//! All coordinates are CSS pixels in a y-down space unless stated otherwise.
//! Rectangles are axis-aligned and stored as origin + size, matching the
//! geometry the layout stage hands to paint.

/// A point in 2D space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Point {
    /// The origin (0, 0).
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a point from its coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl Size {
    /// Create a size from its extents.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Edge sizes for padding, border, margin, or any other inset.
///
/// [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EdgeSizes {
    /// Top edge size.
    pub top: f32,
    /// Right edge size.
    pub right: f32,
    /// Bottom edge size.
    pub bottom: f32,
    /// Left edge size.
    pub left: f32,
}

impl EdgeSizes {
    /// The same size on all four edges.
    #[must_use]
    pub const fn uniform(size: f32) -> Self {
        Self {
            top: size,
            right: size,
            bottom: size,
            left: size,
        }
    }

    /// `horizontal` on left/right, `vertical` on top/bottom.
    #[must_use]
    pub const fn symmetric(horizontal: f32, vertical: f32) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }
}

/// A rectangle positioned in 2D space.
///
/// [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    /// Horizontal position of the top-left corner.
    pub x: f32,
    /// Vertical position of the top-left corner.
    pub y: f32,
    /// Width of the rectangle.
    pub width: f32,
    /// Height of the rectangle.
    pub height: f32,
}

impl Rect {
    /// Create a rectangle from origin and size.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from its left/top/right/bottom edges.
    #[must_use]
    pub fn from_ltrb(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    /// Left edge.
    #[must_use]
    pub const fn min_x(&self) -> f32 {
        self.x
    }

    /// Top edge.
    #[must_use]
    pub const fn min_y(&self) -> f32 {
        self.y
    }

    /// Right edge.
    #[must_use]
    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }

    /// Horizontal center.
    #[must_use]
    pub fn mid_x(&self) -> f32 {
        self.width.mul_add(0.5, self.x)
    }

    /// Vertical center.
    #[must_use]
    pub fn mid_y(&self) -> f32 {
        self.height.mul_add(0.5, self.y)
    }

    /// Top-left corner.
    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Width and height.
    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// True when the rectangle covers no area (zero or negative extent).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        // Written so that NaN extents also count as empty.
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// True when every component is a finite number.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Whether `point` lies inside the rectangle (left/top inclusive,
    /// right/bottom exclusive).
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.max_x() && point.y >= self.y && point.y < self.max_y()
    }

    /// Whether `other` lies entirely inside this rectangle.
    #[must_use]
    pub fn contains_rect(&self, other: &Self) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.max_x() <= self.max_x()
            && other.max_y() <= self.max_y()
    }

    /// The overlapping region, or `None` when the rectangles do not overlap.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.max_x().min(other.max_x());
        let bottom = self.max_y().min(other.max_y());
        let rect = Self::from_ltrb(left, top, right, bottom);
        (!rect.is_empty()).then_some(rect)
    }

    /// Whether the rectangles share any area.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.intersection(other).is_some()
    }

    /// The smallest rectangle containing both. Empty rectangles are ignored.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Self::from_ltrb(
            self.x.min(other.x),
            self.y.min(other.y),
            self.max_x().max(other.max_x()),
            self.max_y().max(other.max_y()),
        )
    }

    /// Shrink by the given edge sizes.
    #[must_use]
    pub fn inset(&self, edges: EdgeSizes) -> Self {
        Self::new(
            self.x + edges.left,
            self.y + edges.top,
            self.width - edges.left - edges.right,
            self.height - edges.top - edges.bottom,
        )
    }

    /// Grow by the given edge sizes.
    #[must_use]
    pub fn outset(&self, edges: EdgeSizes) -> Self {
        Self::new(
            self.x - edges.left,
            self.y - edges.top,
            self.width + edges.left + edges.right,
            self.height + edges.top + edges.bottom,
        )
    }

    /// Move the rectangle by `(dx, dy)`.
    #[must_use]
    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// A 2D affine transform.
///
/// Maps `(x, y)` to `(a*x + c*y + e, b*x + d*y + f)`, the same column layout
/// as CSS `matrix(a, b, c, d, e, f)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Horizontal scale component.
    pub a: f32,
    /// Vertical skew component.
    pub b: f32,
    /// Horizontal skew component.
    pub c: f32,
    /// Vertical scale component.
    pub d: f32,
    /// Horizontal translation.
    pub e: f32,
    /// Vertical translation.
    pub f: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// Create a transform from CSS `matrix()` components.
    #[must_use]
    pub const fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// A pure translation.
    #[must_use]
    pub const fn translate(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// A pure scale about the origin.
    #[must_use]
    pub const fn scale(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Exact identity check. This is the paint fast path, so no tolerance.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// True when every component is finite.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.a.is_finite()
            && self.b.is_finite()
            && self.c.is_finite()
            && self.d.is_finite()
            && self.e.is_finite()
            && self.f.is_finite()
    }

    /// Determinant of the linear part.
    #[must_use]
    pub fn determinant(&self) -> f32 {
        self.a.mul_add(self.d, -(self.b * self.c))
    }

    /// Whether the transform can be inverted (finite, non-zero determinant).
    #[must_use]
    pub fn is_invertible(&self) -> bool {
        self.is_finite() && self.determinant().abs() > f32::EPSILON
    }

    /// Compose: the result applies `other` first, then `self`.
    ///
    /// This is how a canvas concatenates a new transform onto its current one.
    #[must_use]
    pub fn pre_concat(&self, other: &Self) -> Self {
        Self {
            a: self.a.mul_add(other.a, self.c * other.b),
            b: self.b.mul_add(other.a, self.d * other.b),
            c: self.a.mul_add(other.c, self.c * other.d),
            d: self.b.mul_add(other.c, self.d * other.d),
            e: self.a.mul_add(other.e, self.c.mul_add(other.f, self.e)),
            f: self.b.mul_add(other.e, self.d.mul_add(other.f, self.f)),
        }
    }

    /// Map a point through the transform.
    #[must_use]
    pub fn map_point(&self, p: Point) -> Point {
        Point::new(
            self.a.mul_add(p.x, self.c.mul_add(p.y, self.e)),
            self.b.mul_add(p.x, self.d.mul_add(p.y, self.f)),
        )
    }

    /// Map a rectangle and return the axis-aligned bounds of the result.
    #[must_use]
    pub fn map_rect(&self, rect: &Rect) -> Rect {
        let corners = [
            self.map_point(Point::new(rect.min_x(), rect.min_y())),
            self.map_point(Point::new(rect.max_x(), rect.min_y())),
            self.map_point(Point::new(rect.min_x(), rect.max_y())),
            self.map_point(Point::new(rect.max_x(), rect.max_y())),
        ];
        let (mut left, mut top) = (f32::INFINITY, f32::INFINITY);
        let (mut right, mut bottom) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
        for p in corners {
            left = left.min(p.x);
            top = top.min(p.y);
            right = right.max(p.x);
            bottom = bottom.max(p.y);
        }
        Rect::from_ltrb(left, top, right, bottom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_empty() {
        assert!(Rect::new(0.0, 0.0, 0.0, 10.0).is_empty());
        assert!(Rect::new(0.0, 0.0, 10.0, -1.0).is_empty());
        assert!(Rect::new(0.0, 0.0, f32::NAN, 10.0).is_empty());
        assert!(!Rect::new(0.0, 0.0, 1.0, 1.0).is_empty());
    }

    #[test]
    fn test_rect_intersection_and_union() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert_eq!(a.intersection(&b), Some(Rect::new(5.0, 5.0, 5.0, 5.0)));
        assert_eq!(a.union(&b), Rect::new(0.0, 0.0, 15.0, 15.0));

        let far = Rect::new(20.0, 20.0, 1.0, 1.0);
        assert_eq!(a.intersection(&far), None);
        assert!(!a.intersects(&far));
    }

    #[test]
    fn test_rect_contains() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(Point::new(0.0, 0.0)));
        assert!(!r.contains(Point::new(10.0, 5.0)));
        assert!(r.contains_rect(&Rect::new(2.0, 2.0, 8.0, 8.0)));
        assert!(!r.contains_rect(&Rect::new(2.0, 2.0, 9.0, 8.0)));
    }

    #[test]
    fn test_rect_inset_outset() {
        let r = Rect::new(10.0, 10.0, 100.0, 50.0);
        let inner = r.inset(EdgeSizes::symmetric(8.0, 0.0));
        assert_eq!(inner, Rect::new(18.0, 10.0, 84.0, 50.0));
        assert_eq!(inner.outset(EdgeSizes::symmetric(8.0, 0.0)), r);
    }

    #[test]
    fn test_transform_pre_concat_order() {
        // translate then scale: the scale applies to the point first
        let t = Transform::translate(10.0, 0.0).pre_concat(&Transform::scale(2.0, 2.0));
        assert_eq!(t.map_point(Point::new(1.0, 1.0)), Point::new(12.0, 2.0));
    }

    #[test]
    fn test_transform_flip_maps_rect_onto_itself() {
        let frame = Rect::new(0.0, 20.0, 50.0, 30.0);
        let flip = Transform::translate(0.0, frame.min_y() + frame.max_y())
            .pre_concat(&Transform::scale(1.0, -1.0));
        assert_eq!(flip.map_rect(&frame), frame);
        assert!(flip.is_invertible());
        assert!(!Transform::scale(0.0, 1.0).is_invertible());
    }
}
