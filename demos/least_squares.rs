//! Plots the squared error of a line fit `y = m * x + b` over slope `m` and intercept `b`.

use bevy::prelude::*;
use bevy_plot3d::{
    PlotPlugin, PlotSettings,
    plot::{Border, Coordinates, PlotCamera, PlotPoint, SurfacePlot},
    view_box::ViewBox,
};

const DATA: [(f64, f64); 4] = [(1.0, 6.0), (2.0, 5.0), (3.0, 7.0), (4.0, 10.0)];

fn sum_of_squared_errors(m: f64, b: f64) -> f64 {
    DATA.iter()
        .map(|(x, y)| {
            let error = y - (m * x + b);
            error * error
        })
        .sum()
}

fn main() {
    let view_box = ViewBox::new([-2.0, 4.0], [0.0, 7.0], [0.0, 40.0]).expect("valid view box");

    App::new()
        .add_plugins((
            DefaultPlugins,
            PlotPlugin {
                settings: PlotSettings::default()
                    .with_view_box(view_box)
                    .with_resolution(120),
                ..default()
            },
        ))
        .add_systems(Startup, setup)
        .run();
}

fn setup(mut commands: Commands) {
    commands.spawn(PlotCamera);
    commands.spawn(Border);
    commands.spawn(Coordinates::default());
    commands.spawn(SurfacePlot::new(sum_of_squared_errors));

    // closed-form least squares fit for DATA: m = 1.4, b = 3.5
    let (m, b) = (1.4, 3.5);
    commands.spawn(PlotPoint::new(m, b, sum_of_squared_errors(m, b)));
}
