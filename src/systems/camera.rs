use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;
use bevy::input::mouse::MouseWheel;

use crate::config::{CAMERA_DAMPING, CAMERA_FOV_DEGREES, CAMERA_MIN_DISTANCE, CAMERA_NEAR};
use crate::systems::driver::FrameSet;

// keep pitch just short of the poles so look_at never degenerates
const PITCH_LIMIT: f32 = 1.5;

pub struct OrbitCamPlugin;

impl Plugin for OrbitCamPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (
            read_input.in_set(FrameSet::Input),
            apply_damping.in_set(FrameSet::Camera),
        ));
    }
}

/// Placement of the camera for one scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub distance: f32,
    pub far: f32,
}

impl CameraRig {
    pub const GLOBE: Self = Self { distance: 5.0, far: 100.0 };
    pub const ICOSAHEDRON: Self = Self { distance: 2.0, far: 10.0 };

    // starts on +Z looking back at the origin
    pub fn orbit(&self) -> OrbitCamera {
        OrbitCamera::new(self.distance, 0.5).with_zoom_limits(CAMERA_MIN_DISTANCE, self.far * 0.5)
    }

    pub fn projection(&self) -> Projection {
        Projection::Perspective(PerspectiveProjection {
            fov: CAMERA_FOV_DEGREES.to_radians(),
            near: CAMERA_NEAR,
            far: self.far,
            ..default()
        })
    }
}

pub fn spawn_orbit_camera(commands: &mut Commands, rig: CameraRig) -> Entity {
    let orbit = rig.orbit();
    let transform = Transform::from_translation(orbit.calculate_position())
        .looking_at(orbit.target, Vec3::Y);

    commands
        .spawn((Camera3d::default(), rig.projection(), transform, orbit))
        .id()
}

// camera component
#[derive(Component, Debug, Clone)]
pub struct OrbitCamera {
    pub radius: f32,
    pub speed: f32,
    pub angle: f32,
    pub v_angle: f32,
    pub is_dragging: bool,
    pub target: Vec3,

    pub min_radius: f32,
    pub max_radius: f32,

    // pending motion, bled off a little every tick
    pub damping: f32,
    pub angle_velocity: f32,
    pub v_angle_velocity: f32,
    pub zoom_velocity: f32,
    pub zoom_speed: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            radius: 5.0,
            speed: 0.5,
            angle: FRAC_PI_2,
            v_angle: 0.0,
            is_dragging: false,
            target: Vec3::ZERO,

            min_radius: 0.0,
            max_radius: 1000.0,

            damping: CAMERA_DAMPING,
            angle_velocity: 0.0,
            v_angle_velocity: 0.0,
            zoom_velocity: 0.0,
            zoom_speed: 0.5,
        }
    }
}

impl OrbitCamera {
    pub fn new(radius: f32, speed: f32) -> Self {
        Self {
            radius,
            speed,
            ..default()
        }
    }

    pub fn with_zoom_limits(mut self, min_radius: f32, max_radius: f32) -> Self {
        self.min_radius = min_radius;
        self.max_radius = max_radius;
        self
    }

    // calculate world position from spherical coordinates
    // https://en.wikipedia.org/wiki/Spherical_coordinate_system#Cartesian_coordinates
    pub fn calculate_position(&self) -> Vec3 {
        let x = self.radius * self.v_angle.cos() * self.angle.cos();
        let y = self.radius * self.v_angle.sin();
        let z = self.radius * self.v_angle.cos() * self.angle.sin();

        self.target + Vec3::new(x, y, z)
    }

    /// Queue a drag, in pixels
    pub fn push_drag(&mut self, delta: Vec2) {
        self.angle_velocity += delta.x * self.speed * 0.01;
        self.v_angle_velocity += delta.y * self.speed * 0.01;
    }

    /// Queue a scroll, in wheel lines
    pub fn push_scroll(&mut self, lines: f32) {
        self.zoom_velocity -= lines * self.zoom_speed;
    }

    /// Applies a damped share of the queued motion and decays the rest
    pub fn advance_damping(&mut self) {
        self.angle += self.angle_velocity * self.damping;
        self.v_angle = (self.v_angle + self.v_angle_velocity * self.damping)
            .clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.radius = (self.radius + self.zoom_velocity * self.damping)
            .clamp(self.min_radius, self.max_radius);

        let keep = 1.0 - self.damping;
        self.angle_velocity *= keep;
        self.v_angle_velocity *= keep;
        self.zoom_velocity *= keep;
    }
}

fn read_input(
    mut camera_query: Query<&mut OrbitCamera>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<CursorMoved>,
    mut scroll_events: EventReader<MouseWheel>,
) {
    let drag: Vec2 = mouse_motion.read().filter_map(|motion| motion.delta).sum();
    let scroll: f32 = scroll_events.read().map(|scroll| scroll.y).sum();

    for mut camera in camera_query.iter_mut() {
        if mouse_buttons.just_pressed(MouseButton::Left) {
            camera.is_dragging = true;
        }
        if mouse_buttons.just_released(MouseButton::Left) {
            camera.is_dragging = false;
        }

        if camera.is_dragging {
            camera.push_drag(drag);
        }
        if scroll != 0.0 {
            camera.push_scroll(scroll);
        }
    }
}

fn apply_damping(mut camera_query: Query<(&mut Transform, &mut OrbitCamera)>) {
    for (mut transform, mut camera) in camera_query.iter_mut() {
        camera.advance_damping();

        transform.translation = camera.calculate_position();
        transform.look_at(camera.target, Vec3::Y);
    }
}
