use bevy::prelude::*;
use bevy_plot3d::{
    PlotPlugin, PlotSettings,
    plot::{Border, Coordinates, PlotCamera, PlotPoint, SurfacePlot},
    surface::SurfaceStyle,
    view_box::ViewBox,
};

fn main() {
    let view_box = ViewBox::new([-2.0, 5.0], [-2.0, 5.0], [-2.0, 5.0]).expect("valid view box");

    App::new()
        .add_plugins((
            DefaultPlugins,
            PlotPlugin {
                settings: PlotSettings::default().with_view_box(view_box),
                ..default()
            },
        ))
        .add_systems(Startup, setup)
        .run();
}

fn setup(mut commands: Commands) {
    bevy::log::info!("Paraboloid Example");

    commands.spawn(PlotCamera);
    commands.spawn(Border);
    commands.spawn(Coordinates::default());

    commands.spawn(
        SurfacePlot::new(|x, y| x * x + (y - 5.0) * (y - 5.0) + 2.0)
            .with_style(SurfaceStyle::default().with_transparent_ceiling(true)),
    );

    // the minimum of the paraboloid
    commands.spawn(PlotPoint::new(0.0, 5.0, 2.0));
}
