use crate::types::{Point, Value, Vector};

/// Returns the flat vertex index of grid sample `(i, j)` in a grid with
/// `resolution + 1` samples per side, stored row-major by `i`.
#[inline]
pub fn grid_index(i: u32, j: u32, resolution: u32) -> u32 {
    i * (resolution + 1) + j
}

/// Returns the 4 vertex indices `[a, b, c, d]` of grid cell `(i, j)`.
///
/// ```text
///   j+1  b-------d
///        | \     |
///        |   \   |
///        |     \ |
///   j    a-------c
///        i      i+1
/// ```
#[inline]
pub fn cell_vertex_indices(i: u32, j: u32, resolution: u32) -> [u32; 4] {
    let a = grid_index(i, j, resolution);
    let b = a + 1;
    let c = a + (resolution + 1);
    let d = c + 1;
    [a, b, c, d]
}

/// Splits grid cell `(i, j)` into the triangles `(a, b, c)` and `(b, d, c)`.
///
/// The winding is part of the output contract: normals and backface culling depend on it.
#[inline]
pub fn cell_triangles(i: u32, j: u32, resolution: u32) -> [[u32; 3]; 2] {
    let [a, b, c, d] = cell_vertex_indices(i, j, resolution);
    [[a, b, c], [b, d, c]]
}

/// Returns the `[min, max]` bounding box corners given a `center` point and box dimensions.
///
/// ```text
///  min = center - dims/2
///  max = center + dims/2
/// ```
#[inline]
pub fn center_box(center: Point, dims: Vector) -> [Point; 2] {
    let half = dims / 2.0;
    [center - half, center + half]
}

/// Returns the 8 corners of the axis-aligned box `[min, max]`.
///
/// Corners are ordered as follows:
/// ```text
///     6----7          Y
///    /|   /|          |
///   2----3 |          *-- X
///   | 4--|-5         /
///   |/   |/         Z
///   0----1
/// ```
#[inline]
pub fn box_corners(min: Point, max: Point) -> [Point; 8] {
    let (x0, y0, z0) = (min.x, min.y, min.z);
    let (x1, y1, z1) = (max.x, max.y, max.z);

    [
        Point::new(x0, y0, z0),
        Point::new(x1, y0, z0),
        Point::new(x0, y1, z0),
        Point::new(x1, y1, z0),
        Point::new(x0, y0, z1),
        Point::new(x1, y0, z1),
        Point::new(x0, y1, z1),
        Point::new(x1, y1, z1),
    ]
}

/// Corner index pairs for the 12 edges of a box, in [`box_corners`] order.
pub const BOX_EDGES: [[usize; 2]; 12] = [
    // bottom face
    [0, 1],
    [1, 5],
    [5, 4],
    [4, 0],
    // top face
    [2, 3],
    [3, 7],
    [7, 6],
    [6, 2],
    // verticals
    [0, 2],
    [1, 3],
    [4, 6],
    [5, 7],
];

/// Replaces a non-finite sample with the nearest bound of `[min, max]`.
///
/// `+inf` maps to `max`; `-inf` and `NaN` map to `min`. Finite values pass through.
#[inline]
pub fn finite_or_bound(v: Value, min: Value, max: Value) -> Value {
    if v.is_finite() {
        v
    } else if v == Value::INFINITY {
        max
    } else {
        min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_indices_follow_row_major_layout() {
        // resolution 4 -> 5 samples per row
        assert_eq!(cell_vertex_indices(0, 0, 4), [0, 1, 5, 6]);
        assert_eq!(cell_vertex_indices(3, 3, 4), [18, 19, 23, 24]);
    }

    #[test]
    fn cell_triangles_keep_winding() {
        assert_eq!(cell_triangles(0, 0, 4), [[0, 1, 5], [1, 6, 5]]);
    }

    #[test]
    fn center_box_spans_dims() {
        let [min, max] = center_box(Point::new(1.0, 2.0, -3.0), Vector::new(4.0, 0.0, 2.0));
        assert_eq!(min, Point::new(-1.0, 2.0, -4.0));
        assert_eq!(max, Point::new(3.0, 2.0, -2.0));
    }

    #[test]
    fn box_edges_connect_corners_differing_on_one_axis() {
        let corners = box_corners(Point::new(0.0, 0.0, 0.0), Point::new(1.0, 1.0, 1.0));
        for [a, b] in BOX_EDGES {
            let d = corners[b] - corners[a];
            let changed = d.iter().filter(|c| **c != 0.0).count();
            assert_eq!(changed, 1, "edge {a}-{b}");
        }
    }

    #[test]
    fn non_finite_samples_snap_to_bounds() {
        assert_eq!(finite_or_bound(Value::INFINITY, -2.0, 5.0), 5.0);
        assert_eq!(finite_or_bound(Value::NEG_INFINITY, -2.0, 5.0), -2.0);
        assert_eq!(finite_or_bound(Value::NAN, -2.0, 5.0), -2.0);
        assert_eq!(finite_or_bound(1.0, -2.0, 5.0), 1.0);
    }
}
