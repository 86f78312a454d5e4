//! Height-field tessellation: samples `z = f(x, y)` on a regular grid over the view box and
//! connects the samples into a vertex-colored, clip-annotated triangle mesh.
//!
//! ```text
//! Per surface:
//! 1. sample_heights    →  (res+1)² clamped heights, rows sampled in parallel
//! 2. vertices          →  math (x, y, z) mapped to render space
//! 3. colors            →  low→high gradient over the view box z range
//! 4. triangles         →  two per cell: (a, b, c) and (b, d, c)
//! 5. clip_planes       →  top and bottom of the z range, pulled inward by the clip margin
//! ```
//!
//! Output depends only on the inputs, so equal inputs give bit-identical meshes.

use std::convert::Infallible;

use ndarray::{Array2, Axis};
use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};
use tracing::{debug, warn};

use crate::{
    coords::math_to_render,
    error::{PlotError, Result},
    interp::{find_t, lerp_color},
    mesh::{ClipPlane, SurfaceMesh},
    types::{Rgba, Value, Vector},
    utils::{cell_triangles, finite_or_bound},
    view_box::ViewBox,
};

/// Default grid steps per axis.
pub const DEFAULT_RESOLUTION: u32 = 200;

/// Largest resolution whose `(resolution + 1)²` vertex indices fit in a `u32`.
pub const MAX_RESOLUTION: u32 = 65_534;

/// Default inward margin of the clip planes, in render units.
pub const DEFAULT_CLIP_MARGIN: Value = 0.2;

/// Coloring and clipping options for a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceStyle {
    /// Color at the bottom of the view box z range.
    pub low_color: Rgba,
    /// Color at the top of the view box z range.
    pub high_color: Rgba,
    /// Emit vertices clamped to the z ceiling fully transparent.
    pub transparent_ceiling: bool,
    pub clip_margin: Value,
}

impl Default for SurfaceStyle {
    fn default() -> Self {
        Self {
            low_color: [0.05, 0.25, 0.85, 1.0],
            high_color: [0.95, 0.35, 0.15, 1.0],
            transparent_ceiling: false,
            clip_margin: DEFAULT_CLIP_MARGIN,
        }
    }
}

impl SurfaceStyle {
    pub fn with_colors(mut self, low: Rgba, high: Rgba) -> Self {
        self.low_color = low;
        self.high_color = high;
        self
    }

    pub fn with_transparent_ceiling(mut self, enabled: bool) -> Self {
        self.transparent_ceiling = enabled;
        self
    }

    pub fn with_clip_margin(mut self, margin: Value) -> Self {
        self.clip_margin = margin;
        self
    }

    /// Vertex color for a clamped height `z` within `[z_min, z_max]`.
    pub fn color_at(&self, z: Value, z_min: Value, z_max: Value) -> Rgba {
        let mut color = lerp_color(self.low_color, self.high_color, find_t(z_min, z_max, z));
        if self.transparent_ceiling && z >= z_max {
            color[3] = 0.0;
        }
        color
    }
}

/// Turns a height function into a [`SurfaceMesh`] over a fixed view box and grid resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceMesher {
    view_box: ViewBox,
    resolution: u32,
    style: SurfaceStyle,
}

impl SurfaceMesher {
    /// Returns [`PlotError::InvalidResolution`] unless `1 <= resolution <= MAX_RESOLUTION`.
    pub fn new(view_box: ViewBox, resolution: u32, style: SurfaceStyle) -> Result<Self> {
        if resolution == 0 || resolution > MAX_RESOLUTION {
            return Err(PlotError::InvalidResolution(resolution));
        }
        Ok(Self {
            view_box,
            resolution,
            style,
        })
    }

    pub fn view_box(&self) -> &ViewBox {
        &self.view_box
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Samples per grid side, `resolution + 1`.
    pub fn samples_per_side(&self) -> usize {
        self.resolution as usize + 1
    }

    /// Math `x` of grid column `i`.
    #[inline]
    pub fn x_at(&self, i: usize) -> Value {
        let step = self.view_box.x.span() / self.resolution as Value;
        self.view_box.x.min() + i as Value * step
    }

    /// Math `y` of grid row `j`.
    #[inline]
    pub fn y_at(&self, j: usize) -> Value {
        let step = self.view_box.y.span() / self.resolution as Value;
        self.view_box.y.min() + j as Value * step
    }

    /// Maps a raw function output into the view box z range.
    ///
    /// Non-finite values snap to the nearest bound first (`NaN` counts as the bottom).
    #[inline]
    pub fn clamp_height(&self, raw: Value) -> Value {
        let z = self.view_box.z;
        z.clamp(finite_or_bound(raw, z.min(), z.max()))
    }

    /// Meshes an infallible height function.
    pub fn mesh<F>(&self, f: F) -> SurfaceMesh
    where
        F: Fn(Value, Value) -> Value + Sync,
    {
        match self.sample_heights(|x, y| Ok::<Value, Infallible>(f(x, y))) {
            Ok(heights) => self.build(&heights),
            Err((_, _, never)) => match never {},
        }
    }

    /// Meshes a fallible height function.
    ///
    /// The first failure in grid order fails the whole mesh with [`PlotError::FunctionEvaluation`].
    pub fn try_mesh<F, E>(&self, f: F) -> Result<SurfaceMesh>
    where
        F: Fn(Value, Value) -> core::result::Result<Value, E> + Sync,
        E: std::fmt::Display + Send,
    {
        let heights = self
            .sample_heights(f)
            .map_err(|(x, y, e)| PlotError::FunctionEvaluation {
                x,
                y,
                message: e.to_string(),
            })?;
        Ok(self.build(&heights))
    }

    /// Evaluates `f` at every grid sample and clamps the result, indexed `[i, j]`.
    ///
    /// Rows are sampled in parallel; on failure, the earliest failing sample in grid order wins.
    pub fn sample_heights<F, E>(&self, f: F) -> core::result::Result<Array2<Value>, (Value, Value, E)>
    where
        F: Fn(Value, Value) -> core::result::Result<Value, E> + Sync,
        E: Send,
    {
        let n = self.samples_per_side();
        let mut heights = Array2::<Value>::zeros((n, n));

        let rows: Vec<core::result::Result<usize, (Value, Value, E)>> = heights
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .map(|(i, mut row)| {
                let x = self.x_at(i);
                let mut non_finite = 0;
                for (j, h) in row.iter_mut().enumerate() {
                    let y = self.y_at(j);
                    let raw = f(x, y).map_err(|e| (x, y, e))?;
                    if !raw.is_finite() {
                        non_finite += 1;
                    }
                    *h = self.clamp_height(raw);
                }
                Ok(non_finite)
            })
            .collect();

        let mut non_finite = 0;
        for row in rows {
            non_finite += row?;
        }
        if non_finite > 0 {
            warn!("{non_finite} non-finite samples snapped to the view box z bounds");
        }

        Ok(heights)
    }

    /// Assembles the mesh from clamped heights produced by [`sample_heights`](Self::sample_heights).
    pub fn build(&self, heights: &Array2<Value>) -> SurfaceMesh {
        let n = self.samples_per_side();
        let res = self.resolution;
        let (z_min, z_max) = (self.view_box.z.min(), self.view_box.z.max());

        let mut mesh = SurfaceMesh::new_empty();
        mesh.vertices.reserve(n * n);
        mesh.colors.reserve(n * n);
        mesh.triangles.reserve(2 * (n - 1) * (n - 1));

        for i in 0..n {
            let x = self.x_at(i);
            for j in 0..n {
                let z = heights[[i, j]];
                mesh.vertices.push(math_to_render(x, self.y_at(j), z));
                mesh.colors.push(self.style.color_at(z, z_min, z_max));
            }
        }

        for i in 0..res {
            for j in 0..res {
                mesh.triangles.extend(cell_triangles(i, j, res));
            }
        }

        mesh.clip_planes = self.clip_planes();

        debug!(
            "meshed surface: {} vertices, {} triangles",
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        mesh
    }

    /// Render-space planes keeping `z_min + margin <= y <= z_max - margin`.
    ///
    /// The margin shrinks to half the z span when the span is narrower than two margins.
    /// With a transparent ceiling the top plane is left out, so the clamped plateau stays in
    /// the mesh and fades instead of being cut.
    pub fn clip_planes(&self) -> Vec<ClipPlane> {
        let z = self.view_box.z;
        let margin = self.style.clip_margin.min(z.span() / 2.0);
        if margin < self.style.clip_margin {
            warn!(
                "z range [{}, {}] is narrower than twice the clip margin {}, clipping at {margin}",
                z.min(),
                z.max(),
                self.style.clip_margin
            );
        }

        let mut planes = Vec::with_capacity(2);
        if !self.style.transparent_ceiling {
            planes.push(ClipPlane::new(-Vector::y(), z.max() - margin));
        }
        planes.push(ClipPlane::new(Vector::y(), -(z.min() + margin)));
        planes
    }
}

/// Meshes `f` over `view_box` with the default style.
pub fn mesh<F>(f: F, view_box: ViewBox, resolution: u32) -> Result<SurfaceMesh>
where
    F: Fn(Value, Value) -> Value + Sync,
{
    Ok(SurfaceMesher::new(view_box, resolution, SurfaceStyle::default())?.mesh(f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{coords::to_math, types::RenderPoint};

    fn paraboloid(x: Value, y: Value) -> Value {
        x * x + (y - 5.0) * (y - 5.0) + 2.0
    }

    fn small_box() -> ViewBox {
        ViewBox::new([-2.0, 5.0], [-2.0, 5.0], [-2.0, 5.0]).unwrap()
    }

    #[test]
    fn paraboloid_scenario() {
        let mesh = mesh(paraboloid, small_box(), 4).unwrap();

        assert_eq!(mesh.vertex_count(), 25);
        assert_eq!(mesh.triangle_count(), 32);
        for v in &mesh.vertices {
            assert!((-2.0..=5.0).contains(&v.0.y), "{v:?}");
        }

        // grid origin is math (-2, -2); f = 4 + 49 + 2 = 55, clamped to 5
        assert_eq!(mesh.vertices[0], RenderPoint::new(-2.0, 5.0, 2.0));
        let origin = to_math(mesh.vertices[0]);
        assert_eq!((origin.0.x, origin.0.y, origin.0.z), (-2.0, -2.0, 5.0));
    }

    #[test]
    fn counts_scale_with_resolution() {
        for res in [1, 2, 7, 16] {
            let mesh = mesh(|x, y| x - y, ViewBox::default(), res).unwrap();
            let n = (res as usize + 1).pow(2);
            assert_eq!(mesh.vertex_count(), n);
            assert_eq!(mesh.colors.len(), n);
            assert_eq!(mesh.triangle_count(), 2 * (res as usize).pow(2));
        }
    }

    #[test]
    fn zero_resolution_is_rejected() {
        let err = SurfaceMesher::new(ViewBox::default(), 0, SurfaceStyle::default()).unwrap_err();
        assert_eq!(err, PlotError::InvalidResolution(0));
    }

    #[test]
    fn resolution_is_capped_for_u32_indices() {
        assert!(SurfaceMesher::new(ViewBox::default(), MAX_RESOLUTION, SurfaceStyle::default()).is_ok());
        assert_eq!(
            SurfaceMesher::new(ViewBox::default(), MAX_RESOLUTION + 1, SurfaceStyle::default()),
            Err(PlotError::InvalidResolution(MAX_RESOLUTION + 1))
        );
        let last = MAX_RESOLUTION as u64 + 1;
        assert!(last * last - 1 <= u32::MAX as u64);
    }

    #[test]
    fn grid_spans_view_box() {
        let mesher = SurfaceMesher::new(small_box(), 4, SurfaceStyle::default()).unwrap();
        assert_eq!(mesher.x_at(0), -2.0);
        assert_eq!(mesher.x_at(4), 5.0);
        assert_eq!(mesher.y_at(0), -2.0);
        assert_eq!(mesher.y_at(4), 5.0);
    }

    #[test]
    fn rows_advance_along_x_and_columns_along_y() {
        let mesh = mesh(|_, _| 0.0, small_box(), 4).unwrap();
        // b = a + 1 steps math y, so render z decreases
        assert_eq!(mesh.vertices[1].0.x, -2.0);
        assert!(mesh.vertices[1].0.z < mesh.vertices[0].0.z);
        // c = a + 5 steps math x
        assert!(mesh.vertices[5].0.x > mesh.vertices[0].0.x);
        assert_eq!(mesh.vertices[5].0.z, mesh.vertices[0].0.z);
    }

    #[test]
    fn winding_matches_cell_layout() {
        let mesh = mesh(|_, _| 0.0, small_box(), 4).unwrap();
        assert_eq!(&mesh.triangles[..4], &[[0, 1, 5], [1, 6, 5], [1, 2, 6], [2, 7, 6]]);
        assert_eq!(mesh.triangles[31], [19, 24, 23]);
    }

    #[test]
    fn deterministic_output() {
        let a = mesh(paraboloid, small_box(), 32).unwrap();
        let b = mesh(paraboloid, small_box(), 32).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn function_sees_unclamped_inputs_and_heights_are_clamped() {
        let vb = ViewBox::new([-10.0, 10.0], [-10.0, 10.0], [-1.0, 1.0]).unwrap();
        let mesh = mesh(|x, y| x * y, vb, 10).unwrap();
        let ys: Vec<Value> = mesh.vertices.iter().map(|v| v.0.y).collect();
        assert!(ys.iter().all(|y| (-1.0..=1.0).contains(y)));
        assert!(ys.contains(&1.0));
        assert!(ys.contains(&-1.0));
    }

    #[test]
    fn colors_follow_height() {
        let style = SurfaceStyle::default().with_colors([0.0, 0.0, 0.0, 1.0], [1.0, 1.0, 1.0, 1.0]);
        let mesher = SurfaceMesher::new(small_box(), 4, style).unwrap();
        let mesh = mesher.mesh(|_, y| y);

        // height equals math y, which runs -2..5 down each row
        assert_eq!(mesh.colors[0], [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(mesh.colors[4], [1.0, 1.0, 1.0, 1.0]);
        assert!(mesh.colors[2][0] > 0.0 && mesh.colors[2][0] < 1.0);
    }

    #[test]
    fn flat_z_range_uses_low_color() {
        let vb = ViewBox::new([-1.0, 1.0], [-1.0, 1.0], [3.0, 3.0]).unwrap();
        let style = SurfaceStyle::default();
        let mesh = SurfaceMesher::new(vb, 2, style).unwrap().mesh(paraboloid);
        assert!(mesh.colors.iter().all(|c| *c == style.low_color));
        assert!(mesh.vertices.iter().all(|v| v.0.y == 3.0));
    }

    #[test]
    fn transparent_ceiling_hides_clamped_tops() {
        let style = SurfaceStyle::default().with_transparent_ceiling(true);
        let mesh = SurfaceMesher::new(small_box(), 4, style).unwrap().mesh(paraboloid);

        for (v, c) in mesh.vertices.iter().zip(&mesh.colors) {
            if v.0.y == 5.0 {
                assert_eq!(c[3], 0.0);
            } else {
                assert_eq!(c[3], 1.0);
            }
        }
    }

    #[test]
    fn transparent_ceiling_replaces_top_clip_plane() {
        let style = SurfaceStyle::default().with_transparent_ceiling(true);
        let mesh = SurfaceMesher::new(small_box(), 4, style).unwrap().mesh(paraboloid);

        assert_eq!(mesh.clip_planes.len(), 1);
        let visible = mesh.visible_triangles();
        assert!(
            visible
                .iter()
                .flatten()
                .any(|&v| mesh.colors[v as usize][3] == 0.0)
        );
    }

    #[test]
    fn narrow_z_range_shrinks_clip_margin() {
        let vb = ViewBox::new([-1.0, 1.0], [-1.0, 1.0], [0.0, 0.3]).unwrap();
        let mesher = SurfaceMesher::new(vb, 2, SurfaceStyle::default()).unwrap();
        let planes = mesher.clip_planes();
        assert_eq!(planes[0].offset, 0.15);
        assert_eq!(planes[1].offset, -0.15);

        // a zero-width z range keeps the flat sheet it is clamped to
        let flat = ViewBox::new([-1.0, 1.0], [-1.0, 1.0], [3.0, 3.0]).unwrap();
        let mesh = SurfaceMesher::new(flat, 2, SurfaceStyle::default())
            .unwrap()
            .mesh(paraboloid);
        assert_eq!(mesh.visible_triangles().len(), mesh.triangle_count());
    }

    #[test]
    fn non_finite_values_snap_to_bounds() {
        let mesh = mesh(
            |x, _| {
                if x < 0.0 {
                    Value::NAN
                } else if x > 0.0 {
                    Value::INFINITY
                } else {
                    Value::NEG_INFINITY
                }
            },
            ViewBox::new([-1.0, 1.0], [0.0, 1.0], [-2.0, 5.0]).unwrap(),
            2,
        )
        .unwrap();

        let ys: Vec<Value> = mesh.vertices.iter().map(|v| v.0.y).collect();
        assert_eq!(ys, vec![-2.0, -2.0, -2.0, -2.0, -2.0, -2.0, 5.0, 5.0, 5.0]);
    }

    #[test]
    fn clip_planes_bracket_z_range() {
        let mesh = mesh(paraboloid, small_box(), 4).unwrap();
        assert_eq!(mesh.clip_planes.len(), 2);

        let inside = RenderPoint::new(0.0, 1.0, 0.0);
        let near_top = RenderPoint::new(0.0, 4.9, 0.0);
        let near_bottom = RenderPoint::new(0.0, -1.9, 0.0);
        assert!(mesh.is_visible(&inside));
        assert!(!mesh.is_visible(&near_top));
        assert!(!mesh.is_visible(&near_bottom));

        // every cell touching the clamped plateau is clipped
        for tri in mesh.visible_triangles() {
            for v in tri {
                assert!(mesh.vertices[v as usize].0.y < 5.0);
            }
        }
    }

    #[test]
    fn try_mesh_reports_first_failure() {
        let mesher = SurfaceMesher::new(small_box(), 4, SurfaceStyle::default()).unwrap();
        let err = mesher
            .try_mesh(|x, y| if x > 1.0 { Err(format!("pole at {x}")) } else { Ok(x + y) })
            .unwrap_err();

        // x steps by 1.75, so the first failing column is x = 1.5
        match err {
            PlotError::FunctionEvaluation { x, y, message } => {
                assert_eq!(x, 1.5);
                assert_eq!(y, -2.0);
                assert_eq!(message, "pole at 1.5");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn try_mesh_matches_mesh_on_success() {
        let mesher = SurfaceMesher::new(small_box(), 8, SurfaceStyle::default()).unwrap();
        let fallible = mesher
            .try_mesh(|x, y| Ok::<_, String>(paraboloid(x, y)))
            .unwrap();
        assert_eq!(fallible, mesher.mesh(paraboloid));
    }
}
