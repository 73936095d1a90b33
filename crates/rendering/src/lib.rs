//! Draws the terrain session: uploads surface and cliff buffers into Bevy
//! meshes after each flush, plus lighting and an orbit camera.

use bevy::prelude::*;

use terrain::TerrainEditSet;

pub mod camera;
pub mod terrain_mesh;

use terrain_mesh::UploadedRevisions;

pub struct TerrainRenderPlugin;

impl Plugin for TerrainRenderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<UploadedRevisions>()
            .add_systems(
                Startup,
                (
                    camera::setup_camera,
                    setup_lighting,
                    terrain_mesh::spawn_terrain_meshes,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                terrain_mesh::upload_terrain_meshes.after(TerrainEditSet),
            )
            .add_systems(
                Update,
                (
                    camera::frame_loaded_grid,
                    camera::camera_pan_keyboard,
                    camera::camera_rotate_keyboard,
                    camera::camera_orbit_drag,
                    camera::camera_zoom,
                    camera::follow_surface.after(TerrainEditSet),
                    camera::apply_orbit_camera,
                )
                    .chain(),
            );
    }
}

fn setup_lighting(mut commands: Commands) {
    // Ambient light for baseline illumination
    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.9, 0.9, 1.0),
        brightness: 300.0,
    });

    // Directional light angled from above so cliff faces shade differently
    commands.spawn((
        DirectionalLight {
            illuminance: 10000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::XYZ,
            -std::f32::consts::FRAC_PI_4,
            std::f32::consts::FRAC_PI_6,
            0.0,
        )),
    ));
}
