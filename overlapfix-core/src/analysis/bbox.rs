use glam::DVec2;
use serde::Serialize;

/// A 2D axis-aligned bounding box in corner form, represented by minimum and
/// maximum points.
///
/// Annotation geometry is carried in normalized image space, so a box covering
/// the whole image is `(0, 0)..(1, 1)`. A box whose maximum does not strictly
/// exceed its minimum on both axes is degenerate and has zero area.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Bbox {
    /// The minimum point of the bounding box (`x_min`, `y_min`).
    pub min: DVec2,
    /// The maximum point of the bounding box (`x_max`, `y_max`).
    pub max: DVec2,
}

impl Bbox {
    /// Creates a new bounding box from minimum and maximum points.
    ///
    /// # Example
    /// ```
    /// use glam::DVec2;
    /// use overlapfix_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::new(DVec2::new(0.0, 0.0), DVec2::new(0.5, 0.25));
    /// assert_eq!(bbox.area(), 0.125);
    /// ```
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    /// Creates a new bounding box from its four corner coordinates.
    pub fn from_corners(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self::new(DVec2::new(x_min, y_min), DVec2::new(x_max, y_max))
    }

    /// Creates a new bounding box from a center point and size vector.
    ///
    /// This is the inverse of [`Bbox::to_center`] and is how YOLO-style
    /// `(x_center, y_center, width, height)` records enter corner space.
    pub fn from_center_size(center: DVec2, size: DVec2) -> Self {
        let half_size = size / 2.0;
        Self {
            min: center - half_size,
            max: center + half_size,
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Returns `true` unless both width and height are strictly positive.
    pub fn is_degenerate(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    /// Calculates the area of the bounding box, zero for degenerate boxes.
    pub fn area(&self) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }

        let length = self.max - self.min;

        length.x * length.y
    }

    pub fn center(&self) -> DVec2 {
        (self.min + self.max) / 2.0
    }

    /// Signed extent of the intersection rectangle on each axis.
    ///
    /// A component is negative when the boxes are separated on that axis and
    /// zero when they only touch.
    pub fn intersection_extent(&self, other: &Self) -> DVec2 {
        self.max.min(other.max) - self.min.max(other.min)
    }

    /// Returns `true` if the intersection is wider and taller than `epsilon`.
    ///
    /// Boxes sharing an edge, or crossing by no more than `epsilon`, do not
    /// overlap.
    pub fn overlaps(&self, other: &Self, epsilon: f64) -> bool {
        let extent = self.intersection_extent(other);

        extent.x > epsilon && extent.y > epsilon
    }

    /// Converts this box to normalized center form.
    pub fn to_center(&self) -> CenterBox {
        let size = self.max - self.min;
        CenterBox {
            center: self.min + size / 2.0,
            size,
        }
    }
}

/// A box in normalized center form: center coordinates plus width and height,
/// each relative to the image extent.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CenterBox {
    pub center: DVec2,
    pub size: DVec2,
}

impl CenterBox {
    pub fn new(x_center: f64, y_center: f64, width: f64, height: f64) -> Self {
        Self {
            center: DVec2::new(x_center, y_center),
            size: DVec2::new(width, height),
        }
    }

    /// Converts to corner form in normalized space.
    pub fn to_corner(&self) -> Bbox {
        self.to_corner_in(DVec2::ONE)
    }

    /// Converts to corner form scaled to an image of the given extent.
    ///
    /// Overlap geometry always runs in normalized space (`DVec2::ONE`); pixel
    /// extents are only useful to consumers drawing boxes over images.
    pub fn to_corner_in(&self, extent: DVec2) -> Bbox {
        Bbox::from_center_size(self.center * extent, self.size * extent)
    }

    /// Clamps all four fields to `[0, 1]`.
    pub fn clamp_unit(&self) -> Self {
        // `+ 0.0` folds a negative zero into positive zero so it prints as `0.000000`
        Self {
            center: self.center.clamp(DVec2::ZERO, DVec2::ONE) + 0.0,
            size: self.size.clamp(DVec2::ZERO, DVec2::ONE) + 0.0,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.size.x > 0.0 && self.size.y > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-6, "{a} != {b}");
    }

    #[test]
    fn test_bbox_area() {
        // Basic rectangle
        let bbox = Bbox::from_corners(0.0, 0.0, 0.5, 0.25);
        assert_eq!(bbox.area(), 0.125);

        // Unit square
        let unit = Bbox::new(DVec2::ZERO, DVec2::ONE);
        assert_eq!(unit.area(), 1.0);

        // Zero height line
        let line = Bbox::from_corners(0.0, 0.5, 1.0, 0.5);
        assert_eq!(line.area(), 0.0);
        assert!(line.is_degenerate());

        // Inverted box is degenerate, never negative area
        let inverted = Bbox::from_corners(0.6, 0.0, 0.4, 1.0);
        assert_eq!(inverted.area(), 0.0);
        assert!(inverted.is_degenerate());
    }

    #[test]
    fn test_bbox_from_center_size() {
        let unit = Bbox::from_center_size(DVec2::new(0.5, 0.5), DVec2::new(1.0, 1.0));
        assert_eq!(unit.min, DVec2::ZERO);
        assert_eq!(unit.max, DVec2::ONE);
        assert_eq!(unit.center(), DVec2::new(0.5, 0.5));

        let quarter = Bbox::from_center_size(DVec2::new(0.25, 0.75), DVec2::new(0.5, 0.5));
        assert_eq!(quarter.min, DVec2::new(0.0, 0.5));
        assert_eq!(quarter.max, DVec2::new(0.5, 1.0));

        // Zero size collapses to a point
        let point = Bbox::from_center_size(DVec2::new(0.3, 0.7), DVec2::ZERO);
        assert_eq!(point.min, point.max);
        assert_eq!(point.area(), 0.0);
    }

    #[test]
    fn test_center_corner_round_trip() {
        let samples = [
            CenterBox::new(0.5, 0.5, 1.0, 1.0),
            CenterBox::new(0.123456, 0.654321, 0.2, 0.1),
            CenterBox::new(0.999999, 0.000001, 0.000002, 0.000002),
            CenterBox::new(0.312500, 0.871094, 0.048828, 0.033203),
        ];

        for sample in samples {
            let back = sample.to_corner().to_center();
            assert_close(back.center.x, sample.center.x);
            assert_close(back.center.y, sample.center.y);
            assert_close(back.size.x, sample.size.x);
            assert_close(back.size.y, sample.size.y);
        }
    }

    #[test]
    fn test_center_to_pixel_corner() {
        let center = CenterBox::new(0.5, 0.25, 0.5, 0.5);
        let pixels = center.to_corner_in(DVec2::new(640.0, 480.0));
        assert_eq!(pixels.min, DVec2::new(160.0, 0.0));
        assert_eq!(pixels.max, DVec2::new(480.0, 240.0));
    }

    #[test]
    fn test_bbox_intersection_extent() {
        // Two partially overlapping boxes
        let a = Bbox::from_corners(0.0, 0.0, 0.5, 0.5);
        let b = Bbox::from_corners(0.25, 0.25, 0.75, 1.0);
        assert_eq!(a.intersection_extent(&b), DVec2::new(0.25, 0.25));
        assert_eq!(b.intersection_extent(&a), DVec2::new(0.25, 0.25));

        // Separated boxes
        let c = Bbox::from_corners(0.0, 0.0, 0.25, 0.25);
        let d = Bbox::from_corners(0.5, 0.5, 0.75, 0.75);
        assert_eq!(c.intersection_extent(&d), DVec2::new(-0.25, -0.25));

        // Edge touching
        let left = Bbox::from_corners(0.0, 0.0, 0.5, 1.0);
        let right = Bbox::from_corners(0.5, 0.0, 1.0, 1.0);
        assert_eq!(left.intersection_extent(&right), DVec2::new(0.0, 1.0));
    }

    #[test]
    fn test_bbox_overlaps() {
        let a = Bbox::from_corners(0.0, 0.0, 0.5, 0.5);
        let b = Bbox::from_corners(0.25, 0.25, 0.75, 0.75);
        assert!(a.overlaps(&b, 1e-6));
        assert!(b.overlaps(&a, 1e-6));

        // Touching on an edge is not an overlap
        let right = Bbox::from_corners(0.5, 0.0, 1.0, 0.5);
        assert!(!a.overlaps(&right, 1e-6));
        assert!(!a.overlaps(&right, 0.0));

        // Touching at a corner is not an overlap
        let corner = Bbox::from_corners(0.5, 0.5, 1.0, 1.0);
        assert!(!a.overlaps(&corner, 1e-6));

        // Crossing by less than epsilon is tolerated
        let sliver = Bbox::from_corners(0.4999995, 0.0, 1.0, 0.5);
        assert!(!a.overlaps(&sliver, 1e-6));
        assert!(a.overlaps(&sliver, 0.0));

        // Overlap on one axis only
        let beside = Bbox::from_corners(0.25, 0.75, 0.75, 1.0);
        assert!(!a.overlaps(&beside, 1e-6));
    }

    #[test]
    fn test_center_clamp_unit() {
        let out_of_range = CenterBox::new(1.2, -0.0, 1.5, 0.5);
        let clamped = out_of_range.clamp_unit();
        assert_eq!(clamped.center, DVec2::new(1.0, 0.0));
        assert_eq!(clamped.size, DVec2::new(1.0, 0.5));
        assert!(clamped.center.y.is_sign_positive());

        let flat = CenterBox::new(0.5, 0.5, -0.1, 0.2).clamp_unit();
        assert_eq!(flat.size.x, 0.0);
        assert!(flat.is_degenerate());
    }
}
