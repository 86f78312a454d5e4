use crate::{
    error::{PlotError, Result},
    types::{MathPoint, Value},
};

/// A closed interval `[min, max]` along one math-space axis.
///
/// Zero-width ranges are allowed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    min: Value,
    max: Value,
}

impl AxisRange {
    /// Returns [`PlotError::InvalidViewBox`] if `min > max` or either bound is not finite.
    pub fn new(axis: char, min: Value, max: Value) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(PlotError::InvalidViewBox { axis, min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> Value {
        self.min
    }

    pub fn max(&self) -> Value {
        self.max
    }

    pub fn span(&self) -> Value {
        self.max - self.min
    }

    pub fn midpoint(&self) -> Value {
        (self.min + self.max) / 2.0
    }

    /// Clamps `v` into the range.
    #[inline]
    pub fn clamp(&self, v: Value) -> Value {
        v.clamp(self.min, self.max)
    }

    pub fn contains(&self, v: Value) -> bool {
        v >= self.min && v <= self.max
    }
}

/// The math-space cuboid of interest.
///
/// Drives camera framing, surface sampling and clipping, and the height color gradient.
/// Immutable: build a new one to change it, which invalidates all derived geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub x: AxisRange,
    pub y: AxisRange,
    pub z: AxisRange,
}

impl Default for ViewBox {
    fn default() -> Self {
        let r = AxisRange {
            min: -10.0,
            max: 10.0,
        };
        Self { x: r, y: r, z: r }
    }
}

impl ViewBox {
    /// Builds a view box from `[min, max]` pairs, validating each axis.
    pub fn new(x: [Value; 2], y: [Value; 2], z: [Value; 2]) -> Result<Self> {
        Ok(Self {
            x: AxisRange::new('x', x[0], x[1])?,
            y: AxisRange::new('y', y[0], y[1])?,
            z: AxisRange::new('z', z[0], z[1])?,
        })
    }

    /// A cube `[-half, half]` on every axis.
    pub fn symmetric(half: Value) -> Result<Self> {
        let half = half.abs();
        Self::new([-half, half], [-half, half], [-half, half])
    }

    /// Center of the box in math space.
    pub fn midpoint(&self) -> MathPoint {
        MathPoint::new(self.x.midpoint(), self.y.midpoint(), self.z.midpoint())
    }

    pub fn contains(&self, p: MathPoint) -> bool {
        self.x.contains(p.0.x) && self.y.contains(p.0.y) && self.z.contains(p.0.z)
    }
}
