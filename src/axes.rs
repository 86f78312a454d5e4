//! Line geometry for the coordinate axes overlay: three long axis lines and small tick marks
//! at regular intervals. Everything is laid out in math space and mapped to render space, so
//! the math `y` axis ends up pointing into the screen (render `-z`).

use crate::{
    bounds::Segment,
    coords::math_to_render,
    types::{Rgba, Value},
};

/// Soft red, soft green and soft blue for the x, y and z axes.
pub const AXIS_COLORS: [Rgba; 3] = [
    [1.0, 0.702, 0.702, 1.0],
    [0.702, 1.0, 0.702, 1.0],
    [0.702, 0.702, 1.0, 1.0],
];

/// Layout of the axes overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxesStyle {
    /// Half-length of each axis line.
    pub extent: Value,
    pub tick_interval: Value,
    /// Number of ticks on each side of the origin.
    pub max_ticks: u32,
    /// Full length of a tick mark, centered on its axis.
    pub tick_size: Value,
}

impl Default for AxesStyle {
    fn default() -> Self {
        Self {
            extent: 1000.0,
            tick_interval: 1.0,
            max_ticks: 10,
            tick_size: 0.2,
        }
    }
}

/// One colored line of the overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisLine {
    pub segment: Segment,
    pub color: Rgba,
}

/// Math-space unit direction of axis `axis` (0 = x, 1 = y, 2 = z).
fn unit(axis: usize, length: Value) -> [Value; 3] {
    let mut v = [0.0; 3];
    v[axis] = length;
    v
}

fn segment(from: [Value; 3], to: [Value; 3]) -> Segment {
    [
        math_to_render(from[0], from[1], from[2]),
        math_to_render(to[0], to[1], to[2]),
    ]
}

impl AxesStyle {
    /// The x, y and z axis lines, each spanning `[-extent, extent]`.
    pub fn axis_lines(&self) -> [AxisLine; 3] {
        std::array::from_fn(|axis| AxisLine {
            segment: segment(unit(axis, -self.extent), unit(axis, self.extent)),
            color: AXIS_COLORS[axis],
        })
    }

    /// Tick marks at every `tick_interval` along each axis, skipping the origin.
    ///
    /// Ticks on x lie across math `y`; ticks on y and z lie across math `x`.
    pub fn ticks(&self) -> Vec<AxisLine> {
        let half = self.tick_size / 2.0;
        let max = self.max_ticks as i64;
        let mut lines = Vec::with_capacity(3 * 2 * self.max_ticks as usize);

        for axis in 0..3 {
            let across = if axis == 0 { 1 } else { 0 };
            for i in (-max..=max).filter(|i| *i != 0) {
                let mut from = unit(axis, i as Value * self.tick_interval);
                let mut to = from;
                from[across] = -half;
                to[across] = half;
                lines.push(AxisLine {
                    segment: segment(from, to),
                    color: AXIS_COLORS[axis],
                });
            }
        }
        lines
    }

    /// Axis lines followed by ticks.
    pub fn lines(&self) -> Vec<AxisLine> {
        let mut lines = self.axis_lines().to_vec();
        lines.extend(self.ticks());
        lines
    }
}
