use nalgebra::{Point3, Vector3};

/// Scalar value used throughout the geometry core.
pub type Value = f64;

/// A 3D point with [`Value`] components, in no particular convention.
pub type Point = Point3<Value>;

/// A 3D vector with [`Value`] components.
pub type Vector = Vector3<Value>;

/// A plotted height function: maps math-space `(x, y)` to a height `z`.
///
/// Must be pure. The mesher samples it from several threads, hence `Sync`.
pub type PlotFunction = dyn Fn(Value, Value) -> Value + Send + Sync;

/// Linear RGBA color, each channel in `[0, 1]`.
pub type Rgba = [f32; 4];

/// A point in math space, where `z` is height: `z = f(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MathPoint(pub Point);

/// A point in render space, where `y` is up.
///
/// Related to [`MathPoint`] by `(x, y, z)_render = (x, z, -y)_math`.
/// Use [`coords`](crate::coords) to convert; never build one by hand from math coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderPoint(pub Point);

impl MathPoint {
    pub fn new(x: Value, y: Value, z: Value) -> Self {
        Self(Point::new(x, y, z))
    }
}

impl RenderPoint {
    pub fn new(x: Value, y: Value, z: Value) -> Self {
        Self(Point::new(x, y, z))
    }

    /// Euclidean distance between two render-space points.
    pub fn distance(&self, other: &RenderPoint) -> Value {
        nalgebra::distance(&self.0, &other.0)
    }

    /// Narrows to a Bevy `Vec3` for upload.
    pub fn to_vec3(self) -> bevy::math::Vec3 {
        bevy::math::Vec3::new(self.0.x as f32, self.0.y as f32, self.0.z as f32)
    }

    /// Narrows to a `[f32; 3]` vertex attribute.
    pub fn to_array(self) -> [f32; 3] {
        [self.0.x as f32, self.0.y as f32, self.0.z as f32]
    }
}
