use bevy::prelude::Component;

use crate::types::{Point, RenderPoint, Rgba, Value, Vector};

/// A render-space half-space `normal · p + offset >= 0`.
///
/// Points on the positive side are kept; the rest are clipped away at render time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipPlane {
    pub normal: Vector,
    pub offset: Value,
}

impl ClipPlane {
    pub fn new(normal: Vector, offset: Value) -> Self {
        Self { normal, offset }
    }

    pub fn signed_distance(&self, p: &RenderPoint) -> Value {
        self.normal.dot(&p.0.coords) + self.offset
    }

    pub fn contains(&self, p: &RenderPoint) -> bool {
        self.signed_distance(p) >= 0.0
    }
}

/// Triangle mesh description produced by the surface mesher.
///
/// Buffers are parallel: `colors[k]` belongs to `vertices[k]`. Nothing here owns GPU
/// resources; the scene uploads the buffers and frees them when the entity goes away.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceMesh {
    /// Vertex positions in render space.
    pub vertices: Vec<RenderPoint>,

    /// Per-vertex linear RGBA colors.
    pub colors: Vec<Rgba>,

    /// Triangle index triples into `vertices`.
    pub triangles: Vec<[u32; 3]>,

    /// Half-spaces that bound the visible part of the surface.
    pub clip_planes: Vec<ClipPlane>,
}

impl SurfaceMesh {
    /// Creates an empty mesh with no vertices, triangles, or clip planes.
    pub fn new_empty() -> Self {
        Self {
            vertices: Vec::new(),
            colors: Vec::new(),
            triangles: Vec::new(),
            clip_planes: Vec::new(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Returns the three vertex positions of triangle `tri`.
    pub fn tri_coords(&self, tri: usize) -> [Point; 3] {
        self.triangles[tri].map(|v| self.vertices[v as usize].0)
    }

    /// Un-normalized face normal of triangle `tri`; its length is twice the triangle's area.
    fn tri_cross(&self, tri: usize) -> Vector {
        let [a, b, c] = self.tri_coords(tri);
        (b - a).cross(&(c - b))
    }

    /// Computes the unit face normal for triangle `tri`.
    ///
    /// Returns the zero vector if the triangle is degenerate.
    pub fn tri_normal(&self, tri: usize) -> Vector {
        let cross = self.tri_cross(tri);
        let nrm = cross.norm();
        if nrm == 0.0 {
            Vector::zeros()
        } else {
            cross / nrm
        }
    }

    /// Smooth per-vertex normals: the area-weighted sum of adjacent face normals, normalized.
    ///
    /// Vertices touching only degenerate triangles get the zero vector.
    pub fn vertex_normals(&self) -> Vec<Vector> {
        let mut normals = vec![Vector::zeros(); self.vertices.len()];
        for (tri, indices) in self.triangles.iter().enumerate() {
            let cross = self.tri_cross(tri);
            for &v in indices {
                normals[v as usize] += cross;
            }
        }

        for n in normals.iter_mut() {
            let nrm = n.norm();
            if nrm > 0.0 {
                *n /= nrm;
            }
        }
        normals
    }

    /// Whether `p` lies inside every clip plane.
    pub fn is_visible(&self, p: &RenderPoint) -> bool {
        self.clip_planes.iter().all(|plane| plane.contains(p))
    }

    /// Triangles whose three vertices all lie inside every clip plane.
    ///
    /// For renderers that cannot clip against planes themselves.
    pub fn visible_triangles(&self) -> Vec<[u32; 3]> {
        let visible: Vec<bool> = self.vertices.iter().map(|p| self.is_visible(p)).collect();
        self.triangles
            .iter()
            .filter(|tri| tri.iter().all(|&v| visible[v as usize]))
            .copied()
            .collect()
    }

    /// Triangle indices flattened for an index buffer.
    pub fn flat_indices(triangles: &[[u32; 3]]) -> Vec<u32> {
        triangles.iter().flatten().copied().collect()
    }
}

/// Upload-ready vertex data for one surface, produced off the main thread.
///
/// Only triangles inside the clip planes are kept in `indices`.
#[derive(Component, Debug, Default, Clone)]
pub struct GeneratedSurface {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub colors: Vec<Rgba>,
    pub indices: Vec<u32>,
    /// Some vertex referenced by `indices` is not fully opaque.
    pub translucent: bool,
}

impl GeneratedSurface {
    pub fn build(mesh: &SurfaceMesh) -> Self {
        let positions = mesh.vertices.iter().map(|v| v.to_array()).collect();
        let normals = mesh
            .vertex_normals()
            .iter()
            .map(|n| [n.x as f32, n.y as f32, n.z as f32])
            .collect();
        let indices = SurfaceMesh::flat_indices(&mesh.visible_triangles());
        let translucent = indices.iter().any(|&v| mesh.colors[v as usize][3] < 1.0);

        Self {
            positions,
            normals,
            colors: mesh.colors.clone(),
            indices,
            translucent,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    /// A unit quad in the render `y = 0` plane, split like a surface cell.
    fn quad() -> SurfaceMesh {
        SurfaceMesh {
            vertices: vec![
                RenderPoint::new(0.0, 0.0, 0.0),
                RenderPoint::new(0.0, 0.0, -1.0),
                RenderPoint::new(1.0, 0.0, 0.0),
                RenderPoint::new(1.0, 0.0, -1.0),
            ],
            colors: vec![[1.0; 4]; 4],
            triangles: vec![[0, 1, 2], [1, 3, 2]],
            clip_planes: Vec::new(),
        }
    }

    #[test]
    fn normals_follow_cell_winding() {
        // (a, b, c) runs a -> -z -> +x, which winds clockwise seen from above
        let mesh = quad();
        for tri in 0..mesh.triangle_count() {
            assert_relative_eq!(mesh.tri_normal(tri), -Vector::y(), epsilon = 1e-12);
        }
        for n in mesh.vertex_normals() {
            assert_relative_eq!(n, -Vector::y(), epsilon = 1e-12);
        }
    }

    #[test]
    fn degenerate_triangle_has_zero_normal() {
        let mut mesh = quad();
        mesh.triangles = vec![[0, 0, 1]];
        assert_eq!(mesh.tri_normal(0), Vector::zeros());
        assert_eq!(mesh.vertex_normals()[3], Vector::zeros());
    }

    #[test]
    fn clip_planes_drop_triangles_touching_outside_vertices() {
        let mut mesh = quad();
        // keep x <= 0.5
        mesh.clip_planes.push(ClipPlane::new(-Vector::x(), 0.5));

        assert!(mesh.is_visible(&mesh.vertices[0]));
        assert!(!mesh.is_visible(&mesh.vertices[2]));
        assert!(mesh.visible_triangles().is_empty());

        mesh.clip_planes[0].offset = 1.0;
        assert_eq!(mesh.visible_triangles(), mesh.triangles);
    }

    #[test]
    fn generated_surface_keeps_vertices_and_drops_clipped_triangles() {
        let mut mesh = quad();
        mesh.clip_planes.push(ClipPlane::new(-Vector::x(), 0.5));
        mesh.colors[3][3] = 0.0;

        let generated = GeneratedSurface::build(&mesh);
        assert_eq!(generated.positions.len(), 4);
        assert_eq!(generated.normals.len(), 4);
        assert_eq!(generated.positions[1], [0.0, 0.0, -1.0]);
        assert!(generated.indices.is_empty());
        // the translucent vertex is only used by clipped triangles
        assert!(!generated.translucent);
    }

    #[test]
    fn translucent_when_visible_vertex_has_alpha() {
        let mut mesh = quad();
        mesh.colors[3][3] = 0.5;

        let generated = GeneratedSurface::build(&mesh);
        assert_eq!(generated.indices.len(), 6);
        assert!(generated.translucent);
    }

    #[test]
    fn flat_indices_preserve_order() {
        let mesh = quad();
        assert_eq!(SurfaceMesh::flat_indices(&mesh.triangles), vec![0, 1, 2, 1, 3, 2]);
    }
}
