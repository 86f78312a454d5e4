use std::sync::Arc;

use bevy::prelude::*;

use crate::{
    axes::AxesStyle,
    coords::math_to_render,
    surface::SurfaceStyle,
    types::{PlotFunction, RenderPoint, Value},
};

/// A height field `z = f(x, y)` plotted over the view box in [`PlotSettings`](crate::plugin::PlotSettings).
///
/// The mesh is rebuilt in full whenever this component or the settings change.
/// `function` is wrapped in an [`Arc`] so the async meshing task can hold it without copying.
#[derive(Component, Clone)]
#[require(Transform)]
pub struct SurfacePlot {
    pub function: Arc<PlotFunction>,
    pub style: SurfaceStyle,
}

impl SurfacePlot {
    /// Plots `function` with the default style.
    pub fn new<F>(function: F) -> Self
    where
        F: Fn(Value, Value) -> Value + Send + Sync + 'static,
    {
        Self {
            function: Arc::new(function),
            style: SurfaceStyle::default(),
        }
    }

    pub fn with_style(mut self, style: SurfaceStyle) -> Self {
        self.style = style;
        self
    }

    /// Evaluates the plotted function at math `(x, y)`, unclamped.
    pub fn eval(&self, x: Value, y: Value) -> Value {
        (self.function)(x, y)
    }
}

/// A marker sphere at a math-space position.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
#[require(Transform)]
pub struct PlotPoint {
    pub x: Value,
    pub y: Value,
    pub z: Value,
}

impl PlotPoint {
    pub fn new(x: Value, y: Value, z: Value) -> Self {
        Self { x, y, z }
    }

    pub fn render_position(&self) -> RenderPoint {
        math_to_render(self.x, self.y, self.z)
    }
}

/// Draws the edges of the view box.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Border;

/// Draws the coordinate axes and their tick marks.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Coordinates(pub AxesStyle);

/// A camera that is auto-framed around the view box.
///
/// Gets a [`CameraPose`](crate::camera::CameraPose) whenever it is (re)framed. Orbit controls
/// are left to other plugins; they should respect `CameraPose::max_orbit_distance`.
#[derive(Component, Debug, Default, Clone, Copy)]
#[require(Camera3d)]
pub struct PlotCamera;
