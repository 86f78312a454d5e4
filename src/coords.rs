//! Conversion between math space (`z` up) and render space (`y` up).
//!
//! ```text
//!   math (x, y, z)  ──to_render──▶  render (x,  z, -y)
//!   render (x, y, z) ──to_math───▶  math   (x, -z,  y)
//! ```
//!
//! Both directions are a permutation plus one negation, so round trips are exact.
//! Every piece of geometry this crate emits goes through here.

use crate::types::{MathPoint, RenderPoint, Value};

#[inline]
pub fn to_render(p: MathPoint) -> RenderPoint {
    RenderPoint::new(p.0.x, p.0.z, -p.0.y)
}

#[inline]
pub fn to_math(p: RenderPoint) -> MathPoint {
    MathPoint::new(p.0.x, -p.0.z, p.0.y)
}

/// Shorthand for `to_render(MathPoint::new(x, y, z))`.
#[inline]
pub fn math_to_render(x: Value, y: Value, z: Value) -> RenderPoint {
    to_render(MathPoint::new(x, y, z))
}
