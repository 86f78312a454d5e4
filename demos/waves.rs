use bevy::prelude::*;
use bevy_plot3d::{
    PlotPlugin,
    plot::{Border, Coordinates, PlotCamera, SurfacePlot},
    PlotSettings,
    view_box::ViewBox,
};

fn main() {
    App::new()
        .add_plugins((DefaultPlugins, PlotPlugin::default()))
        .add_systems(Startup, setup)
        .add_systems(Update, adjust_settings)
        .run();
}

fn setup(mut commands: Commands) {
    bevy::log::info!("Waves Example: Up/Down change resolution, +/- resize the view box");

    commands.spawn(PlotCamera);
    commands.spawn(Border);
    commands.spawn(Coordinates::default());
    commands.spawn(SurfacePlot::new(|x, y| x.sin() + y.cos()));
}

/// Every change to the settings rebuilds the surface and reframes the camera.
fn adjust_settings(keyboard: Res<ButtonInput<KeyCode>>, mut settings: ResMut<PlotSettings>) {
    if keyboard.just_pressed(KeyCode::ArrowUp) {
        settings.resolution = (settings.resolution * 2).min(800);
    }
    if keyboard.just_pressed(KeyCode::ArrowDown) {
        settings.resolution = (settings.resolution / 2).max(4);
    }

    let half = settings.view_box.x.max();
    let resized = if keyboard.just_pressed(KeyCode::Equal) {
        ViewBox::symmetric(half * 2.0)
    } else if keyboard.just_pressed(KeyCode::Minus) {
        ViewBox::symmetric((half / 2.0).max(1.0))
    } else {
        return;
    };

    match resized {
        Ok(view_box) => settings.view_box = view_box,
        Err(err) => bevy::log::warn!("{err}"),
    }
}
