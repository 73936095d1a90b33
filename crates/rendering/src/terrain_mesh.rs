use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;

use terrain::mesh_buffers::GeometryBuffers;
use terrain::TerrainSession;

/// Marker for the heightfield surface entity.
#[derive(Component)]
pub struct TerrainSurface;

/// Marker for the cliff wall entity.
#[derive(Component)]
pub struct CliffMesh;

/// Session revisions the GPU meshes were last built from.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadedRevisions {
    pub surface: u64,
    pub cliffs: u64,
}

fn vec3s(flat: &[f32]) -> Vec<[f32; 3]> {
    flat.chunks_exact(3).map(|v| [v[0], v[1], v[2]]).collect()
}

fn rgba(flat: &[f32]) -> Vec<[f32; 4]> {
    flat.chunks_exact(3).map(|c| [c[0], c[1], c[2], 1.0]).collect()
}

/// Convert flat session buffers into a Bevy mesh. Colors gain an alpha of 1.
pub fn buffers_to_mesh(buffers: &GeometryBuffers) -> Mesh {
    let uvs: Vec<[f32; 2]> = vec![[0.0, 0.0]; buffers.vertex_count()];

    Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD | RenderAssetUsages::MAIN_WORLD,
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, vec3s(&buffers.positions))
    .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, vec3s(&buffers.normals))
    .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, rgba(&buffers.colors))
    .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
    .with_inserted_indices(Indices::U32(buffers.indices.clone()))
}

/// Overwrite positions, normals and colors of `mesh` in place, keeping its
/// indices and UVs. Returns false without touching the mesh when the
/// topology differs, in which case it has to be rebuilt.
pub fn patch_mesh_vertices(mesh: &mut Mesh, buffers: &GeometryBuffers) -> bool {
    let same_topology = mesh.count_vertices() == buffers.vertex_count()
        && matches!(mesh.indices(), Some(Indices::U32(indices)) if *indices == buffers.indices);
    if !same_topology {
        return false;
    }
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, vec3s(&buffers.positions));
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, vec3s(&buffers.normals));
    mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, rgba(&buffers.colors));
    true
}

/// Patch the asset behind `handle`, or replace it when the topology changed.
/// Returns true when it was patched.
fn upload_buffers(meshes: &mut Assets<Mesh>, handle: &Handle<Mesh>, buffers: &GeometryBuffers) -> bool {
    let patched = meshes
        .get_mut(handle)
        .is_some_and(|mesh| patch_mesh_vertices(mesh, buffers));
    if !patched {
        meshes.insert(handle, buffers_to_mesh(buffers));
    }
    patched
}

fn visibility_for(buffers: &GeometryBuffers) -> Visibility {
    if buffers.is_empty() {
        Visibility::Hidden
    } else {
        Visibility::Inherited
    }
}

pub fn spawn_terrain_meshes(
    mut commands: Commands,
    session: Res<TerrainSession>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut uploaded: ResMut<UploadedRevisions>,
) {
    // Vertex colors carry all shading; the base color stays white.
    let surface_material = materials.add(StandardMaterial {
        base_color: Color::WHITE,
        perceptual_roughness: 0.9,
        ..default()
    });
    let cliff_material = materials.add(StandardMaterial {
        base_color: Color::WHITE,
        perceptual_roughness: 0.95,
        ..default()
    });

    let surface = session.surface().buffers();
    commands.spawn((
        Mesh3d(meshes.add(buffers_to_mesh(surface))),
        MeshMaterial3d(surface_material),
        Transform::IDENTITY,
        visibility_for(surface),
        TerrainSurface,
    ));

    let cliffs = session.cliffs().buffers();
    commands.spawn((
        Mesh3d(meshes.add(buffers_to_mesh(cliffs))),
        MeshMaterial3d(cliff_material),
        Transform::IDENTITY,
        visibility_for(cliffs),
        CliffMesh,
    ));

    *uploaded = UploadedRevisions {
        surface: session.surface_revision(),
        cliffs: session.cliff_revision(),
    };
}

/// Push whichever mesh the session changed since the last frame. Edits that
/// keep the topology patch vertex attributes in place.
pub fn upload_terrain_meshes(
    session: Res<TerrainSession>,
    mut uploaded: ResMut<UploadedRevisions>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut surfaces: Query<(&Mesh3d, &mut Visibility), (With<TerrainSurface>, Without<CliffMesh>)>,
    mut cliffs: Query<(&Mesh3d, &mut Visibility), (With<CliffMesh>, Without<TerrainSurface>)>,
) {
    if session.surface_revision() != uploaded.surface {
        let buffers = session.surface().buffers();
        for (mesh, mut visibility) in &mut surfaces {
            let patched = upload_buffers(&mut meshes, &mesh.0, buffers);
            *visibility = visibility_for(buffers);
            debug!(
                "Terrain render: surface {} ({} vertices)",
                if patched { "patched" } else { "rebuilt" },
                buffers.vertex_count()
            );
        }
        uploaded.surface = session.surface_revision();
    }

    if session.cliff_revision() != uploaded.cliffs {
        let buffers = session.cliffs().buffers();
        for (mesh, mut visibility) in &mut cliffs {
            upload_buffers(&mut meshes, &mesh.0, buffers);
            *visibility = visibility_for(buffers);
        }
        uploaded.cliffs = session.cliff_revision();
        debug!(
            "Terrain render: cliffs uploaded ({} quads)",
            session.cliffs().quad_count()
        );
    }
}
