//! Auto-framing of a [`BoundingVolume`] with a perspective camera.
//!
//! Fitting places the camera on the render `+z` side of the volume, far enough that both the
//! width and the height of the box fit in the frustum:
//!
//! ```text
//!  (size/2)
//! +--------+
//! |       /
//! |      /
//! |     /          distance = size/2 / tan(F)
//! | F° /
//! |   /            F = half of the vertical FOV for the height,
//! |  /                 half of the horizontal FOV for the width
//! | /
//! |/
//! camera
//! ```
//!
//! Both fits add `max.z`, the part of the box protruding toward the viewer, rather than solving
//! for the exact frustum distance. The larger of the two, scaled by `offset`, wins. The camera is
//! then orbited by a fixed angle around the volume center so the box is seen slightly from the side.

use bevy::prelude::*;

use crate::{
    bounds::BoundingVolume,
    error::{PlotError, Result},
    types::{RenderPoint, Value},
};

/// Half-angles are clamped into `[MIN_HALF_FOV, MAX_HALF_FOV]` (degrees) so `tan` stays finite and non-zero.
pub const MIN_HALF_FOV: Value = 0.01;
pub const MAX_HALF_FOV: Value = 89.9;

/// Smallest gap, in render units, kept between the fitted camera and the volume center.
///
/// Only reached when the fitted camera would sit on or behind the center, as it does for a
/// zero-size volume at the origin. The camera `z` may still be negative.
pub const MIN_FIT_DISTANCE: Value = 0.5;

/// Result of [`fit`]: a camera on the render `+z` axis through the volume center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFit {
    pub position: RenderPoint,
    pub target: RenderPoint,
    /// Camera `z` before any orbit, after applying `offset`.
    pub distance: Value,
    pub far: Value,
    /// How far an orbit controller may zoom out before the far plane cuts the volume.
    pub max_orbit_distance: Value,
}

/// Camera placement handed to the scene: where to stand, where to look, how deep to see.
///
/// Recomputed whenever the view box or the viewport aspect ratio changes.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: RenderPoint,
    pub target: RenderPoint,
    pub far: Value,
    pub max_orbit_distance: Value,
}

impl CameraPose {
    /// A Bevy [`Transform`] at `position` looking at `target` with render `y` up.
    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position.to_vec3()).looking_at(self.target.to_vec3(), Vec3::Y)
    }
}

/// Checks camera parameters at the configuration boundary.
pub fn validate(fov_degrees: Value, aspect_ratio: Value, offset: Value) -> Result<()> {
    if !fov_degrees.is_finite() || fov_degrees <= 0.0 || fov_degrees >= 180.0 {
        return Err(PlotError::InvalidFov(fov_degrees));
    }
    if !aspect_ratio.is_finite() || aspect_ratio <= 0.0 {
        return Err(PlotError::InvalidAspectRatio(aspect_ratio));
    }
    if !offset.is_finite() || offset <= 0.0 {
        return Err(PlotError::InvalidOffset(offset));
    }
    Ok(())
}

#[inline]
fn clamp_half_angle(radians: Value) -> Value {
    radians.clamp(MIN_HALF_FOV.to_radians(), MAX_HALF_FOV.to_radians())
}

/// Fits `volume` into a perspective frustum with vertical field of view `fov_degrees`.
///
/// `offset > 1` pulls the camera back so the volume does not fill the whole frame.
/// Always returns finite values, including for zero-size volumes.
pub fn fit(fov_degrees: Value, aspect_ratio: Value, volume: &BoundingVolume, offset: Value) -> CameraFit {
    let half_v = clamp_half_angle(fov_degrees.to_radians() / 2.0);
    let half_h = clamp_half_angle((half_v.tan() * aspect_ratio).atan());

    let center = volume.center.0;
    let max_z = volume.max().0.z;
    let min_z = volume.min().0.z;

    let dx = max_z + (volume.size.x / 2.0 / half_h.tan()).abs();
    let dy = max_z + (volume.size.y / 2.0 / half_v.tan()).abs();

    let distance = (dx.max(dy) * offset).max(center.z + MIN_FIT_DISTANCE);

    // the back face of the volume sits at min_z, which is at most center.z
    let to_far_edge = distance - min_z;

    CameraFit {
        position: RenderPoint::new(center.x, center.y, distance),
        target: volume.center,
        distance,
        far: 3.0 * to_far_edge,
        max_orbit_distance: 2.0 * to_far_edge,
    }
}

/// Orbits `position` around `target` in the horizontal plane by `angle_degrees`.
///
/// The new position keeps the camera-to-target distance and the camera height; an angle of
/// zero puts the camera straight down the render `+z` axis from the target.
pub fn rotate(position: RenderPoint, target: RenderPoint, angle_degrees: Value) -> RenderPoint {
    let (sin, cos) = angle_degrees.to_radians().sin_cos();
    let distance = position.distance(&target);

    RenderPoint::new(
        target.0.x + distance * sin,
        position.0.y,
        target.0.z + distance * cos,
    )
}

/// Fits the camera to `volume`, then orbits it by `rotation_degrees` around the volume center.
pub fn frame(
    fov_degrees: Value,
    aspect_ratio: Value,
    volume: &BoundingVolume,
    offset: Value,
    rotation_degrees: Value,
) -> CameraPose {
    let fit = fit(fov_degrees, aspect_ratio, volume, offset);
    let position = rotate(fit.position, fit.target, rotation_degrees);

    CameraPose {
        position,
        target: fit.target,
        far: fit.far,
        max_orbit_distance: fit.max_orbit_distance,
    }
}
