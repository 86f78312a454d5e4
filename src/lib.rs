pub mod axes;
pub mod bounds;
pub mod camera;
pub mod coords;
pub mod error;
pub mod interp;
pub mod mesh;
pub mod plot;
pub mod plugin;
pub mod surface;
pub mod types;
pub mod utils;
pub mod view_box;

pub use plugin::{PlotPlugin, PlotSettings};
