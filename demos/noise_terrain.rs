use bevy::prelude::*;
use bevy_infinite_grid::{InfiniteGridBundle, InfiniteGridPlugin, InfiniteGridSettings};
use bevy_panorbit_camera::{PanOrbitCamera, PanOrbitCameraPlugin};
use bevy_plot3d::{
    PlotPlugin, PlotSettings,
    camera::CameraPose,
    plot::{Border, PlotCamera, SurfacePlot},
    surface::SurfaceStyle,
    view_box::ViewBox,
};
use noiz::prelude::*;

type TerrainNoise = Noise<
    LayeredNoise<
        Normed<f32>,
        Persistence,
        Octave<MixCellGradients<OrthoGrid, Smoothstep, QuickGradients>>,
    >,
>;

fn main() {
    let view_box = ViewBox::new([-40.0, 40.0], [-40.0, 40.0], [-4.0, 12.0]).expect("valid view box");

    App::new()
        .add_plugins((
            DefaultPlugins,
            PlotPlugin {
                settings: PlotSettings::default()
                    .with_view_box(view_box)
                    .with_resolution(400),
                ..default()
            },
            PanOrbitCameraPlugin,
            InfiniteGridPlugin,
        ))
        .add_systems(Startup, setup)
        .add_systems(Update, sync_orbit_controls)
        .run();
}

fn setup(mut commands: Commands) {
    commands.spawn(InfiniteGridBundle {
        settings: InfiniteGridSettings {
            fadeout_distance: 400.0,
            ..Default::default()
        },
        ..Default::default()
    });

    commands.spawn((
        PlotCamera,
        PanOrbitCamera {
            button_orbit: MouseButton::Right,
            button_pan: MouseButton::Middle,
            ..default()
        },
    ));
    commands.spawn(Border);

    let mut noise = TerrainNoise::default();
    noise.set_frequency(0.06);

    let style = SurfaceStyle::default().with_colors([0.1, 0.35, 0.1, 1.0], [0.95, 0.95, 0.95, 1.0]);
    commands.spawn(
        SurfacePlot::new(move |x, y| {
            let n: f32 = noise.sample_for(Vec2::new(x as f32, y as f32));
            (n as f64) * 10.0
        })
        .with_style(style),
    );
}

/// Hands each new camera pose to the orbit controller and caps its zoom.
fn sync_orbit_controls(mut cameras: Query<(&CameraPose, &mut PanOrbitCamera), Changed<CameraPose>>) {
    for (pose, mut orbit) in cameras.iter_mut() {
        let target = pose.target.to_vec3();
        let offset = pose.position.to_vec3() - target;

        orbit.target_focus = target;
        orbit.target_radius = offset.length();
        orbit.target_yaw = offset.x.atan2(offset.z);
        orbit.target_pitch = (offset.y / offset.length().max(f32::EPSILON)).asin();
        orbit.zoom_upper_limit = Some(pose.max_orbit_distance as f32);
        orbit.force_update = true;
    }
}
