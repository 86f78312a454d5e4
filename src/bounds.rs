use crate::{
    coords::to_render,
    types::{RenderPoint, Vector},
    utils::{BOX_EDGES, box_corners, center_box},
    view_box::ViewBox,
};

/// Axis-aligned box in render space, derived from a [`ViewBox`].
///
/// Any dimension may be zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingVolume {
    pub center: RenderPoint,
    /// `(width, height, depth)` along render `x`, `y`, `z`.
    pub size: Vector,
}

/// A straight render-space line segment.
pub type Segment = [RenderPoint; 2];

impl BoundingVolume {
    /// Builds the render-space box of `view_box`.
    ///
    /// Height comes from the math `z` range and depth from the math `y` range.
    /// The center goes through [`to_render`], so its depth is the negated math `y` midpoint.
    pub fn from_view_box(view_box: &ViewBox) -> Self {
        let size = Vector::new(
            view_box.x.span().abs(),
            view_box.z.span().abs(),
            view_box.y.span().abs(),
        );

        Self {
            center: to_render(view_box.midpoint()),
            size,
        }
    }

    pub fn min(&self) -> RenderPoint {
        RenderPoint(center_box(self.center.0, self.size)[0])
    }

    pub fn max(&self) -> RenderPoint {
        RenderPoint(center_box(self.center.0, self.size)[1])
    }

    pub fn is_degenerate(&self) -> bool {
        self.size.iter().any(|d| *d == 0.0)
    }

    /// The 12 edges of the box, for drawing a border.
    pub fn edges(&self) -> [Segment; 12] {
        let [min, max] = center_box(self.center.0, self.size);
        let corners = box_corners(min, max);
        BOX_EDGES.map(|[a, b]| [RenderPoint(corners[a]), RenderPoint(corners[b])])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swaps_height_and_depth() {
        let vb = ViewBox::new([0.0, 4.0], [-1.0, 1.0], [10.0, 16.0]).unwrap();
        let volume = BoundingVolume::from_view_box(&vb);

        assert_eq!(volume.size, Vector::new(4.0, 6.0, 2.0));
        assert_eq!(volume.center, RenderPoint::new(2.0, 13.0, 0.0));
    }

    #[test]
    fn center_depth_negates_math_y() {
        let vb = ViewBox::new([-1.0, 1.0], [2.0, 6.0], [-1.0, 1.0]).unwrap();
        let volume = BoundingVolume::from_view_box(&vb);

        assert_eq!(volume.center.0.z, -4.0);
        assert_eq!(volume.min().0.z, -6.0);
        assert_eq!(volume.max().0.z, -2.0);
    }

    #[test]
    fn degenerate_view_box_gives_zero_size() {
        let vb = ViewBox::new([0.0, 0.0], [0.0, 0.0], [0.0, 0.0]).unwrap();
        let volume = BoundingVolume::from_view_box(&vb);

        assert!(volume.is_degenerate());
        assert_eq!(volume.size, Vector::zeros());
    }

    #[test]
    fn edges_stay_on_the_box_surface() {
        let volume = BoundingVolume::from_view_box(&ViewBox::default());
        let edges = volume.edges();

        assert_eq!(edges.len(), 12);
        for [a, b] in edges {
            for p in [a, b] {
                assert!(p.0.iter().all(|c| c.abs() == 10.0));
            }
            assert_eq!(a.distance(&b), 20.0);
        }
    }
}
