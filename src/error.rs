use derive_more::Display;

pub type Result<T> = core::result::Result<T, PlotError>;

#[derive(Debug, Clone, PartialEq, Display)]
pub enum PlotError {
    /// An axis range with `min > max`, or a non-finite bound.
    #[display("invalid view box: {axis} range [{min}, {max}]")]
    InvalidViewBox { axis: char, min: f64, max: f64 },
    /// Zero, or too fine for `u32` vertex indices.
    #[display("surface resolution must lie between 1 and 65534, got {_0}")]
    InvalidResolution(u32),
    #[display("field of view must lie strictly between 0 and 180 degrees, got {_0}")]
    InvalidFov(f64),
    #[display("aspect ratio must be positive and finite, got {_0}")]
    InvalidAspectRatio(f64),
    #[display("camera offset must be positive and finite, got {_0}")]
    InvalidOffset(f64),
    /// A fallible plot function failed at a sample point.
    #[display("plot function failed at ({x}, {y}): {message}")]
    FunctionEvaluation { x: f64, y: f64, message: String },
}

impl std::error::Error for PlotError {}
