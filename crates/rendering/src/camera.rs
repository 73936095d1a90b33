use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;

use terrain::config::CELL_SIZE;
use terrain::{LoadTerrainGrid, TerrainSession};

const PAN_SPEED: f32 = 120.0;
const ZOOM_SPEED: f32 = 0.15;
const MIN_DISTANCE: f32 = 8.0;
const MAX_DISTANCE: f32 = 1200.0;
const MIN_PITCH: f32 = 5.0 * std::f32::consts::PI / 180.0;
const MAX_PITCH: f32 = 85.0 * std::f32::consts::PI / 180.0;
const ORBIT_SENSITIVITY: f32 = 0.005;
const ROTATE_SPEED: f32 = 1.5;

/// Orbital camera model: camera orbits around a focus point on the terrain.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    /// Terrain point the camera looks at
    pub focus: Vec3,
    /// Horizontal rotation in radians
    pub yaw: f32,
    /// Elevation angle in radians (clamped between MIN_PITCH and MAX_PITCH)
    pub pitch: f32,
    /// Distance from focus point
    pub distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            focus: Vec3::ZERO,
            yaw: 0.0,
            pitch: 50.0_f32.to_radians(),
            distance: 200.0,
        }
    }
}

impl OrbitCamera {
    /// Look at the middle of a `width x height` grid from far enough to see it.
    pub fn framing(width: usize, height: usize) -> Self {
        let w = width as f32 * CELL_SIZE;
        let h = height as f32 * CELL_SIZE;
        Self {
            focus: Vec3::new(w * 0.5, 0.0, h * 0.5),
            distance: (w.max(h) * 0.9).clamp(MIN_DISTANCE, MAX_DISTANCE),
            ..default()
        }
    }

    pub fn eye(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.focus + Vec3::new(x, y, z)
    }

    /// Move the focus along the ground plane, relative to the current yaw.
    fn pan(&mut self, screen_dir: Vec2, amount: f32) {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        self.focus.x += (screen_dir.x * cos_yaw + screen_dir.y * sin_yaw) * amount;
        self.focus.z += (-screen_dir.x * sin_yaw + screen_dir.y * cos_yaw) * amount;
    }
}

#[derive(Resource, Default)]
pub struct CameraOrbitDrag {
    pub dragging: bool,
    pub last_pos: Vec2,
}

pub fn setup_camera(mut commands: Commands) {
    let orbit = OrbitCamera::default();
    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(orbit.eye()).looking_at(orbit.focus, Vec3::Y),
    ));
    commands.insert_resource(orbit);
    commands.init_resource::<CameraOrbitDrag>();
}

/// Reframe whenever a new grid is loaded.
pub fn frame_loaded_grid(mut loads: EventReader<LoadTerrainGrid>, mut orbit: ResMut<OrbitCamera>) {
    let Some(LoadTerrainGrid(grid)) = loads.read().last() else {
        return;
    };
    *orbit = OrbitCamera::framing(grid.width(), grid.height());
}

/// Keep the focus resting on the surface so orbiting pivots around the terrain.
pub fn follow_surface(session: Res<TerrainSession>, mut orbit: ResMut<OrbitCamera>) {
    let y = session.height_at(orbit.focus.x, orbit.focus.z);
    if (orbit.focus.y - y).abs() > f32::EPSILON {
        orbit.focus.y = y;
    }
}

/// System: apply OrbitCamera state to the actual camera Transform each frame.
pub fn apply_orbit_camera(
    orbit: Res<OrbitCamera>,
    mut query: Query<&mut Transform, With<Camera3d>>,
) {
    if !orbit.is_changed() {
        return;
    }
    let Ok(mut transform) = query.get_single_mut() else {
        return;
    };
    *transform = Transform::from_translation(orbit.eye()).looking_at(orbit.focus, Vec3::Y);
}

/// WASD/Arrow keys: pan focus along the ground plane.
pub fn camera_pan_keyboard(
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut orbit: ResMut<OrbitCamera>,
) {
    let mut dir = Vec2::ZERO;
    if keys.pressed(KeyCode::KeyW) || keys.pressed(KeyCode::ArrowUp) {
        dir.y -= 1.0;
    }
    if keys.pressed(KeyCode::KeyS) || keys.pressed(KeyCode::ArrowDown) {
        dir.y += 1.0;
    }
    if keys.pressed(KeyCode::KeyA) || keys.pressed(KeyCode::ArrowLeft) {
        dir.x -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) || keys.pressed(KeyCode::ArrowRight) {
        dir.x += 1.0;
    }
    if dir == Vec2::ZERO {
        return;
    }
    let scale = orbit.distance / 200.0;
    orbit.pan(dir.normalize(), PAN_SPEED * scale * time.delta_secs());
}

/// Q/E: rotate around the focus.
pub fn camera_rotate_keyboard(
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut orbit: ResMut<OrbitCamera>,
) {
    let mut turn = 0.0;
    if keys.pressed(KeyCode::KeyQ) {
        turn -= 1.0;
    }
    if keys.pressed(KeyCode::KeyE) {
        turn += 1.0;
    }
    if turn != 0.0 {
        orbit.yaw += turn * ROTATE_SPEED * time.delta_secs();
    }
}

/// Right-mouse drag: orbit (horizontal = yaw, vertical = pitch).
pub fn camera_orbit_drag(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window>,
    mut drag: ResMut<CameraOrbitDrag>,
    mut orbit: ResMut<OrbitCamera>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };

    if buttons.just_pressed(MouseButton::Right) {
        if let Some(pos) = window.cursor_position() {
            drag.dragging = true;
            drag.last_pos = pos;
        }
    }

    if buttons.just_released(MouseButton::Right) {
        drag.dragging = false;
    }

    if drag.dragging {
        if let Some(pos) = window.cursor_position() {
            let delta = pos - drag.last_pos;
            orbit.yaw += delta.x * ORBIT_SENSITIVITY;
            orbit.pitch = (orbit.pitch - delta.y * ORBIT_SENSITIVITY).clamp(MIN_PITCH, MAX_PITCH);
            drag.last_pos = pos;
        }
    }
}

/// Scroll wheel: zoom (change distance).
pub fn camera_zoom(mut scroll_evts: EventReader<MouseWheel>, mut orbit: ResMut<OrbitCamera>) {
    for evt in scroll_evts.read() {
        let dy = match evt.unit {
            MouseScrollUnit::Line => evt.y,
            MouseScrollUnit::Pixel => evt.y / 100.0,
        };
        let factor = 1.0 - dy * ZOOM_SPEED;
        orbit.distance = (orbit.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framing_centers_on_grid() {
        let orbit = OrbitCamera::framing(100, 40);
        assert_eq!(orbit.focus, Vec3::new(50.0, 0.0, 20.0));
        assert!((orbit.distance - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_framing_clamps_distance() {
        assert_eq!(OrbitCamera::framing(1, 1).distance, MIN_DISTANCE);
        assert_eq!(OrbitCamera::framing(4096, 4096).distance, MAX_DISTANCE);
    }

    #[test]
    fn test_eye_sits_above_focus_at_distance() {
        let orbit = OrbitCamera {
            focus: Vec3::new(10.0, 2.0, 10.0),
            ..default()
        };
        let eye = orbit.eye();
        assert!(eye.y > orbit.focus.y);
        assert!((eye.distance(orbit.focus) - orbit.distance).abs() < 1e-3);
    }

    #[test]
    fn test_pan_follows_yaw() {
        let mut orbit = OrbitCamera::default();
        orbit.pan(Vec2::new(0.0, -1.0), 10.0);
        assert!((orbit.focus.z + 10.0).abs() < 1e-5);

        let mut turned = OrbitCamera {
            yaw: std::f32::consts::FRAC_PI_2,
            ..default()
        };
        turned.pan(Vec2::new(0.0, -1.0), 10.0);
        assert!((turned.focus.x + 10.0).abs() < 1e-5);
        assert!(turned.focus.z.abs() < 1e-5);
    }
}
