use bevy::prelude::*;

use crate::config::{
    hex_color, HEMISPHERE_BRIGHTNESS, HEMISPHERE_GROUND_COLOR, HEMISPHERE_SKY_COLOR,
    ICOSAHEDRON_DETAIL, ICOSAHEDRON_SPIN, SUN_ILLUMINANCE, SUN_POSITION, WIREFRAME_SCALE,
};
use crate::systems::camera::{spawn_orbit_camera, CameraRig};
use crate::systems::driver::Spin;
use crate::systems::geometry::{flat_shaded, sphere_mesh, wireframe_mesh};

pub struct IcosahedronPlugin;

impl Plugin for IcosahedronPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup)
            .add_systems(Update, apply_hemisphere_light);
    }
}

// faceted body tag
#[derive(Component)]
pub struct Icosahedron;

// wire overlay tag
#[derive(Component)]
pub struct WireOverlay;

/// Sky/ground light, folded into the ambient term since bevy has no hemisphere light
#[derive(Component, Debug, Clone, Copy)]
pub struct HemisphereLight {
    pub sky_color: Color,
    pub ground_color: Color,
    pub brightness: f32,
}

impl HemisphereLight {
    pub fn new(sky_color: Color, ground_color: Color) -> Self {
        Self {
            sky_color,
            ground_color,
            brightness: HEMISPHERE_BRIGHTNESS,
        }
    }

    // average of both hemispheres
    pub fn ambient_color(&self) -> Color {
        let sky = self.sky_color.to_linear();
        let ground = self.ground_color.to_linear();
        Color::from((sky + ground) * 0.5)
    }
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) -> Result {
    let base = sphere_mesh(ICOSAHEDRON_DETAIL)?;
    let wire = wireframe_mesh(&base)?;

    spawn_orbit_camera(&mut commands, CameraRig::ICOSAHEDRON);

    let body = commands
        .spawn((
            Icosahedron,
            Mesh3d(meshes.add(flat_shaded(&base))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: Color::WHITE,
                ..default()
            })),
            Transform::default(),
            Spin::new(ICOSAHEDRON_SPIN),
        ))
        .id();

    // wireframe rides along as a child, slightly inflated
    commands.spawn((
        WireOverlay,
        Mesh3d(meshes.add(wire)),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::WHITE,
            unlit: true,
            ..default()
        })),
        Transform::from_scale(Vec3::splat(WIREFRAME_SCALE)),
        ChildOf(body),
    ));

    commands.spawn(HemisphereLight::new(
        hex_color(HEMISPHERE_SKY_COLOR),
        hex_color(HEMISPHERE_GROUND_COLOR),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: SUN_ILLUMINANCE,
            ..default()
        },
        Transform::from_translation(SUN_POSITION).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    info!("icosahedron scene ready: detail {ICOSAHEDRON_DETAIL}");
    Ok(())
}

fn apply_hemisphere_light(
    lights: Query<&HemisphereLight, Changed<HemisphereLight>>,
    mut ambient: ResMut<AmbientLight>,
) {
    for light in lights.iter() {
        ambient.color = light.ambient_color();
        ambient.brightness = light.brightness;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::driver::tests::driver_app;

    fn icosahedron_app() -> App {
        let mut app = driver_app(None);
        app.insert_resource(Assets::<Mesh>::default())
            .insert_resource(Assets::<StandardMaterial>::default())
            .insert_resource(AmbientLight::default())
            .add_systems(Startup, setup)
            .add_systems(Update, apply_hemisphere_light);
        app
    }

    fn count<F: bevy::ecs::query::QueryFilter>(app: &mut App) -> usize {
        let mut query = app.world_mut().query_filtered::<Entity, F>();
        query.iter(app.world()).count()
    }

    #[test]
    fn builds_body_wire_and_two_lights() {
        let mut app = icosahedron_app();
        app.update();

        assert_eq!(count::<With<Icosahedron>>(&mut app), 1);
        assert_eq!(count::<With<WireOverlay>>(&mut app), 1);
        assert_eq!(count::<With<DirectionalLight>>(&mut app), 1);
        assert_eq!(count::<With<HemisphereLight>>(&mut app), 1);

        let mut bodies = app.world_mut().query_filtered::<Entity, With<Icosahedron>>();
        let body = bodies.single(app.world()).unwrap();
        let children = app.world().get::<Children>(body).unwrap();
        assert_eq!(children.len(), 1);

        let wire = children[0];
        assert!(app.world().get::<WireOverlay>(wire).is_some());
        let scale = app.world().get::<Transform>(wire).unwrap().scale;
        assert_eq!(scale, Vec3::splat(1.001));
    }

    #[test]
    fn wireframe_turns_with_the_body() {
        let mut app = icosahedron_app();
        for _ in 0..10 {
            app.update();
        }

        let mut spinning = app.world_mut().query_filtered::<&Spin, With<Icosahedron>>();
        let angle = spinning.single(app.world()).unwrap().angle;
        assert!(angle > 0.0);

        // the child itself never spins, it inherits
        let mut wires = app.world_mut().query_filtered::<(&Transform, Option<&Spin>), With<WireOverlay>>();
        let (transform, spin) = wires.single(app.world()).unwrap();
        assert!(spin.is_none());
        assert_eq!(transform.rotation, Quat::IDENTITY);
    }

    #[test]
    fn hemisphere_light_drives_ambient() {
        let mut app = icosahedron_app();
        app.update();

        let ambient = app.world().resource::<AmbientLight>();
        let expected = HemisphereLight::new(
            hex_color(HEMISPHERE_SKY_COLOR),
            hex_color(HEMISPHERE_GROUND_COLOR),
        );
        assert_eq!(ambient.color, expected.ambient_color());
        assert_eq!(ambient.brightness, HEMISPHERE_BRIGHTNESS);
    }

    #[test]
    fn ambient_color_averages_hemispheres() {
        let light = HemisphereLight::new(
            Color::linear_rgb(1.0, 0.0, 0.0),
            Color::linear_rgb(0.0, 0.0, 1.0),
        );
        let mixed = light.ambient_color().to_linear();
        assert!((mixed.red - 0.5).abs() < 1e-6);
        assert!((mixed.blue - 0.5).abs() < 1e-6);
        assert_eq!(mixed.green, 0.0);
    }
}
