use bevy::{
    asset::RenderAssetUsages,
    gizmos::config::GizmoConfigStore,
    mesh::{Indices, PrimitiveTopology},
    prelude::*,
    tasks::{AsyncComputeTaskPool, Task, block_on, futures_lite::future},
    window::PrimaryWindow,
};
use tracing::{debug, error, info, warn};

use crate::{
    bounds::BoundingVolume,
    camera::{self, CameraPose},
    error::{PlotError, Result},
    mesh::{GeneratedSurface, SurfaceMesh},
    plot::{Border, Coordinates, PlotCamera, PlotPoint, SurfacePlot},
    surface::{DEFAULT_RESOLUTION, MAX_RESOLUTION, SurfaceMesher, SurfaceStyle},
    types::{Rgba, Value},
    view_box::ViewBox,
};

/// System sets for the surface pipeline.
///
/// Use these to order your own systems relative to mesh generation:
///
/// ```rust,ignore
/// // Inspect the clipped buffers before they reach the GPU:
/// app.add_systems(Update, export_surface.after(PlotSet::Generate)
///                                       .before(PlotSet::Upload));
/// ```
///
/// ```text
/// PlotSet::Spawn   →  [async compute]  →  PlotSet::Generate  →  [your systems]  →  PlotSet::Upload
/// ```
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlotSet {
    /// Spawns an async compute task for each queued surface.
    Spawn,
    /// Polls async tasks and inserts [`GeneratedSurface`] on completion.
    Generate,
    /// Uploads [`GeneratedSurface`] data into a Bevy [`Mesh3d`] and removes [`GeneratedSurface`].
    Upload,
}

/// Marker component added to [`SurfacePlot`] entities whose mesh must be (re)built.
#[derive(Component)]
pub struct QueuedSurface;

/// Holds the in-flight async meshing task for a [`SurfacePlot`].
#[derive(Component)]
pub struct SurfaceTask(Task<SurfaceMesh>);

/// Scene-wide plot configuration.
///
/// Changing it at runtime rebuilds every surface and reframes every [`PlotCamera`]:
///
/// ```rust,ignore
/// fn zoom_in(mut settings: ResMut<PlotSettings>) {
///     settings.view_box = ViewBox::symmetric(2.0).unwrap();
/// }
/// ```
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct PlotSettings {
    /// Math-space region that is framed, sampled and clipped.
    pub view_box: ViewBox,
    /// Grid steps per axis for every surface. Cost grows with its square. Default: `200`.
    pub resolution: u32,
    /// Vertical field of view of plot cameras. Default: `50`.
    pub fov_degrees: Value,
    /// How far past a tight fit cameras are pulled back. Default: `1.25`.
    pub offset: Value,
    /// Orbit applied after fitting so the box is seen from the side. Default: `15`.
    pub rotation_degrees: Value,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            view_box: ViewBox::default(),
            resolution: DEFAULT_RESOLUTION,
            fov_degrees: 50.0,
            offset: 1.25,
            rotation_degrees: 15.0,
        }
    }
}

impl PlotSettings {
    pub fn with_view_box(mut self, view_box: ViewBox) -> Self {
        self.view_box = view_box;
        self
    }

    pub fn with_resolution(mut self, resolution: u32) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_fov(mut self, fov_degrees: Value) -> Self {
        self.fov_degrees = fov_degrees;
        self
    }

    pub fn with_offset(mut self, offset: Value) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_rotation(mut self, rotation_degrees: Value) -> Self {
        self.rotation_degrees = rotation_degrees;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.resolution == 0 || self.resolution > MAX_RESOLUTION {
            return Err(PlotError::InvalidResolution(self.resolution));
        }
        camera::validate(self.fov_degrees, 1.0, self.offset)
    }

    pub fn bounding_volume(&self) -> BoundingVolume {
        BoundingVolume::from_view_box(&self.view_box)
    }

    pub fn mesher(&self, style: SurfaceStyle) -> Result<SurfaceMesher> {
        SurfaceMesher::new(self.view_box, self.resolution, style)
    }

    /// Camera pose for a viewport with the given aspect ratio.
    pub fn frame(&self, aspect_ratio: Value) -> Result<CameraPose> {
        camera::validate(self.fov_degrees, aspect_ratio, self.offset)?;
        Ok(camera::frame(
            self.fov_degrees,
            aspect_ratio,
            &self.bounding_volume(),
            self.offset,
            self.rotation_degrees,
        ))
    }
}

/// Runtime configuration for the surface pipeline.
#[derive(Resource)]
pub struct SurfacePipelineConfig {
    /// Maximum number of async mesh tasks spawned per frame.
    ///
    /// Higher values rebuild many surfaces faster but may cause frame hitches. Default: `4`.
    pub max_tasks_per_frame: usize,
}

impl Default for SurfacePipelineConfig {
    fn default() -> Self {
        Self {
            max_tasks_per_frame: 4,
        }
    }
}

/// Bevy plugin that composes plots into the scene.
///
/// Surfaces are meshed on Bevy's `AsyncComputeTaskPool` so the main thread is never blocked.
/// With the `auto_queue` feature, new or changed [`SurfacePlot`]s and any change to
/// [`PlotSettings`] queue a rebuild automatically:
///
/// ```text
/// SurfacePlot added / changed, or PlotSettings changed
///   → QueuedSurface inserted        (queue_surfaces)
///   → SurfaceTask spawned           (PlotSet::Spawn)
///   → [async compute runs]
///   → GeneratedSurface inserted     (PlotSet::Generate, unless re-queued meanwhile)
///   → [your systems here]
///   → Mesh3d replaced               (PlotSet::Upload)
/// ```
///
/// [`PlotCamera`]s are reframed on settings or window aspect changes; [`Border`] and
/// [`Coordinates`] are drawn with gizmos; [`PlotPoint`]s get a small sphere.
pub struct PlotPlugin {
    /// Initial value of the [`PlotSettings`] resource.
    pub settings: PlotSettings,
    /// Initial value for [`SurfacePipelineConfig::max_tasks_per_frame`].
    pub max_tasks_per_frame: usize,
    /// Spawn a directional light at startup and give each [`PlotCamera`] an ambient light.
    pub spawn_light: bool,
}

impl Default for PlotPlugin {
    fn default() -> Self {
        Self {
            settings: PlotSettings::default(),
            max_tasks_per_frame: SurfacePipelineConfig::default().max_tasks_per_frame,
            spawn_light: true,
        }
    }
}

impl Plugin for PlotPlugin {
    fn build(&self, app: &mut App) {
        let settings = match self.settings.validate() {
            Ok(()) => self.settings,
            Err(err) => {
                error!("rejecting plot settings ({err}), falling back to defaults");
                PlotSettings::default()
            }
        };

        info!(
            "plotting {:?} at resolution {}",
            settings.view_box, settings.resolution
        );

        app.insert_resource(settings)
            .insert_resource(SurfacePipelineConfig {
                max_tasks_per_frame: self.max_tasks_per_frame,
            })
            .configure_sets(
                Update,
                (PlotSet::Spawn, PlotSet::Generate, PlotSet::Upload).chain(),
            )
            .add_systems(
                Update,
                (
                    spawn_surface_tasks.in_set(PlotSet::Spawn),
                    poll_surface_tasks.in_set(PlotSet::Generate),
                    upload_surfaces.in_set(PlotSet::Upload),
                    frame_plot_cameras,
                    place_points,
                    // gizmos need the gizmo plugin, which headless apps leave out
                    (draw_borders, draw_coordinates).run_if(resource_exists::<GizmoConfigStore>),
                ),
            );

        #[cfg(feature = "auto_queue")]
        app.add_systems(Update, queue_surfaces.before(PlotSet::Spawn));

        if self.spawn_light {
            app.add_systems(Startup, spawn_light)
                .add_systems(Update, light_plot_cameras);
        }
    }
}

/// Brightness of the white ambient light given to each [`PlotCamera`].
pub const AMBIENT_BRIGHTNESS: f32 = 300.0;

fn spawn_light(mut commands: Commands) {
    commands.spawn((
        DirectionalLight {
            illuminance: light_consts::lux::OVERCAST_DAY,
            ..Default::default()
        },
        Transform::from_xyz(1.0, 1.0, 1.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

/// Gives new [`PlotCamera`]s an ambient fill light.
fn light_plot_cameras(mut commands: Commands, cameras: Query<Entity, Added<PlotCamera>>) {
    for entity in cameras.iter() {
        commands.entity(entity).insert(AmbientLight {
            color: Color::WHITE,
            brightness: AMBIENT_BRIGHTNESS,
            ..default()
        });
    }
}

/// Queues every surface whose plot changed, or all of them when the settings changed.
#[cfg(feature = "auto_queue")]
fn queue_surfaces(
    mut commands: Commands,
    settings: Res<PlotSettings>,
    query: Query<(Entity, Ref<SurfacePlot>), Without<QueuedSurface>>,
) {
    for (entity, plot) in query.iter() {
        if settings.is_changed() || plot.is_changed() {
            commands.entity(entity).insert(QueuedSurface);
        }
    }
}

/// Spawns async meshing tasks for [`QueuedSurface`]s, up to [`SurfacePipelineConfig::max_tasks_per_frame`] per frame.
///
/// A surface with a task still in flight waits; the stale result is dropped when it lands.
fn spawn_surface_tasks(
    mut commands: Commands,
    config: Res<SurfacePipelineConfig>,
    settings: Res<PlotSettings>,
    query: Query<(Entity, &SurfacePlot), (With<QueuedSurface>, Without<SurfaceTask>)>,
) {
    let task_pool = AsyncComputeTaskPool::get();

    for (entity, plot) in query.iter().take(config.max_tasks_per_frame) {
        let mesher = match settings.mesher(plot.style) {
            Ok(mesher) => mesher,
            Err(err) => {
                warn!("cannot mesh surface {entity}: {err}");
                commands.entity(entity).remove::<QueuedSurface>();
                continue;
            }
        };
        // Arc::clone is a single pointer bump, the function itself is shared with the task.
        let function = plot.function.clone();

        let task = task_pool.spawn(async move { mesher.mesh(|x, y| function(x, y)) });

        commands
            .entity(entity)
            .insert(SurfaceTask(task))
            .remove::<QueuedSurface>();
    }
}

/// Polls in-flight [`SurfaceTask`]s each frame and inserts [`GeneratedSurface`] on completion.
///
/// Non-blocking: tasks that haven't finished are skipped and retried next frame.
fn poll_surface_tasks(
    mut commands: Commands,
    mut query: Query<(Entity, &mut SurfaceTask, Has<QueuedSurface>)>,
) {
    for (entity, mut task, requeued) in query.iter_mut() {
        let Some(mesh) = block_on(future::poll_once(&mut task.0)) else {
            continue;
        };

        let mut entity_commands = commands.entity(entity);
        entity_commands.remove::<SurfaceTask>();
        if requeued {
            debug!("dropping stale surface mesh for {entity}");
            continue;
        }
        entity_commands.insert(GeneratedSurface::build(&mesh));
    }
}

/// Uploads a [`GeneratedSurface`] into a Bevy [`Mesh3d`], replacing and freeing the previous mesh.
///
/// Vertex buffers are moved out of the component, not copied.
fn upload_surfaces(
    mut commands: Commands,
    mut query: Query<(Entity, &mut GeneratedSurface, Option<&Mesh3d>, Option<&MeshMaterial3d<StandardMaterial>>)>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (entity, mut generated, old_mesh, old_material) in query.iter_mut() {
        let mut bevy_mesh = Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::RENDER_WORLD,
        );

        let triangles = generated.indices.len() / 3;
        bevy_mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, std::mem::take(&mut generated.positions));
        bevy_mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, std::mem::take(&mut generated.normals));
        bevy_mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, std::mem::take(&mut generated.colors));
        bevy_mesh.insert_indices(Indices::U32(std::mem::take(&mut generated.indices)));

        if let Some(old) = old_mesh {
            meshes.remove(&old.0);
        }
        if let Some(old) = old_material {
            materials.remove(&old.0);
        }

        let material = StandardMaterial {
            base_color: Color::WHITE,
            double_sided: true,
            cull_mode: None,
            alpha_mode: if generated.translucent {
                AlphaMode::Blend
            } else {
                AlphaMode::Opaque
            },
            ..Default::default()
        };

        commands
            .entity(entity)
            .insert((
                Mesh3d(meshes.add(bevy_mesh)),
                MeshMaterial3d(materials.add(material)),
            ))
            .remove::<GeneratedSurface>();

        debug!("uploaded surface {entity} with {triangles} visible triangles");
    }
}

/// Reframes [`PlotCamera`]s when they appear, when the settings change, or when the window aspect changes.
fn frame_plot_cameras(
    mut commands: Commands,
    settings: Res<PlotSettings>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut last_aspect: Local<Option<Value>>,
    mut cameras: Query<(Entity, Ref<PlotCamera>, &mut Transform, &mut Projection)>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let (width, height) = (window.width(), window.height());
    if width <= 0.0 || height <= 0.0 {
        // minimized
        return;
    }

    let aspect = (width / height) as Value;
    let aspect_changed = *last_aspect != Some(aspect);
    *last_aspect = Some(aspect);

    if settings.is_changed() && settings.bounding_volume().is_degenerate() {
        warn!("view box {:?} is flat along some axis, framing may be loose", settings.view_box);
    }

    for (entity, marker, mut transform, mut projection) in cameras.iter_mut() {
        if !(aspect_changed || settings.is_changed() || marker.is_added()) {
            continue;
        }

        let pose = match settings.frame(aspect) {
            Ok(pose) => pose,
            Err(err) => {
                warn!("cannot frame camera {entity}: {err}");
                continue;
            }
        };

        *transform = pose.transform();
        if let Projection::Perspective(perspective) = projection.as_mut() {
            perspective.fov = (settings.fov_degrees as f32).to_radians();
            perspective.far = pose.far as f32;
        }
        commands.entity(entity).insert(pose);

        debug!(
            "framed camera {entity} at {:?}, far plane {:.2}",
            pose.position.0, pose.far
        );
    }
}

/// Moves [`PlotPoint`]s to their render position and gives new ones a sphere.
fn place_points(
    mut commands: Commands,
    mut query: Query<(Entity, &PlotPoint, &mut Transform, Has<Mesh3d>), Changed<PlotPoint>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (entity, point, mut transform, has_mesh) in query.iter_mut() {
        transform.translation = point.render_position().to_vec3();
        if !has_mesh {
            commands.entity(entity).insert((
                Mesh3d(meshes.add(Sphere::new(0.1))),
                MeshMaterial3d(materials.add(Color::WHITE)),
            ));
        }
    }
}

fn srgba(c: Rgba) -> Color {
    Color::srgba(c[0], c[1], c[2], c[3])
}

/// Draws the view box edges for every [`Border`].
fn draw_borders(mut gizmos: Gizmos, settings: Res<PlotSettings>, borders: Query<(), With<Border>>) {
    if borders.is_empty() {
        return;
    }

    let color = Color::srgba(0.5, 0.5, 0.5, 0.5);
    for [a, b] in settings.bounding_volume().edges() {
        gizmos.line(a.to_vec3(), b.to_vec3(), color);
    }
}

/// Draws axis lines and ticks for every [`Coordinates`].
fn draw_coordinates(mut gizmos: Gizmos, query: Query<&Coordinates>) {
    for Coordinates(style) in query.iter() {
        for line in style.lines() {
            let [a, b] = line.segment;
            gizmos.line(a.to_vec3(), b.to_vec3(), srgba(line.color));
        }
    }
}
