use bevy::prelude::*;
use bevy::asset::LoadState;

pub mod materials;

use materials::{RimMaterial, RimUniform};
use crate::config::{
    hex_color, GlobeSettings, AXIAL_TILT_DEGREES, CLOUD_SCALE, CLOUD_SPIN, EARTH_CLOUDS_TEXTURE,
    EARTH_DIFFUSE_TEXTURE, EARTH_NIGHT_TEXTURE, GLOW_SCALE, GLOW_SPIN, NIGHT_LIGHTS_SCALE,
    NIGHT_LIGHTS_SPIN, RIM_EDGE_COLOR, RIM_FACING_COLOR, STARS_SPIN, SUN_ILLUMINANCE,
    SUN_POSITION, SURFACE_SCALE, SURFACE_SPIN,
};
use crate::systems::camera::{spawn_orbit_camera, CameraRig};
use crate::systems::driver::{FrameSet, Spin};
use crate::systems::geometry::{point_cloud_mesh, sphere_mesh};
use crate::systems::starfield::generate_starfield;

pub struct GlobePlugin;

impl Plugin for GlobePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(MaterialPlugin::<RimMaterial>::default())
            .init_resource::<GlobeSettings>()
            .add_systems(Startup, (load_textures, setup).chain())
            .add_systems(Update, (
                sync_rim_camera
                    .in_set(FrameSet::Uniforms)
                    .run_if(resource_exists::<PlanetLayers>),
                strip_failed_textures,
            ));
    }
}

// planet group tag, parent of every layer
#[derive(Component)]
pub struct Planet;

// star point cloud tag
#[derive(Component)]
pub struct Stars;

/// One shell of the planet, all of them share the same unit sphere mesh
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Surface,
    Clouds,
    NightLights,
    Glow,
}

impl Layer {
    pub const ALL: [Layer; 4] = [Layer::Surface, Layer::Clouds, Layer::NightLights, Layer::Glow];

    // shells sit slightly apart so they don't z-fight
    pub fn scale(self) -> f32 {
        match self {
            Layer::Surface => SURFACE_SCALE,
            Layer::Clouds => CLOUD_SCALE,
            Layer::NightLights => NIGHT_LIGHTS_SCALE,
            Layer::Glow => GLOW_SCALE,
        }
    }

    // blended with AlphaMode::Add on top of the surface
    pub fn is_additive(self) -> bool {
        matches!(self, Layer::Clouds | Layer::NightLights)
    }

    // clouds drift a bit faster than the ground
    pub fn spin(self) -> f32 {
        match self {
            Layer::Surface => SURFACE_SPIN,
            Layer::Clouds => CLOUD_SPIN,
            Layer::NightLights => NIGHT_LIGHTS_SPIN,
            Layer::Glow => GLOW_SPIN,
        }
    }
}

/// Image handles for the textured layers, may still be loading
#[derive(Resource, Clone, Default)]
pub struct PlanetTextures {
    pub surface: Handle<Image>,
    pub clouds: Handle<Image>,
    pub night_lights: Handle<Image>,
}

/// Named entities of the assembled globe scene
#[derive(Resource, Debug, Clone, Copy)]
pub struct PlanetLayers {
    pub planet: Entity,
    pub surface: Entity,
    pub clouds: Entity,
    pub night_lights: Entity,
    pub glow: Entity,
    pub stars: Entity,
    pub camera: Entity,
}

impl PlanetLayers {
    pub fn layer(&self, layer: Layer) -> Entity {
        match layer {
            Layer::Surface => self.surface,
            Layer::Clouds => self.clouds,
            Layer::NightLights => self.night_lights,
            Layer::Glow => self.glow,
        }
    }
}

fn load_textures(mut commands: Commands, asset_server: Res<AssetServer>) {
    // loads finish in the background, layers get spawned right away
    commands.insert_resource(PlanetTextures {
        surface: asset_server.load(EARTH_DIFFUSE_TEXTURE),
        clouds: asset_server.load(EARTH_CLOUDS_TEXTURE),
        night_lights: asset_server.load(EARTH_NIGHT_TEXTURE),
    });
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut standard_materials: ResMut<Assets<StandardMaterial>>,
    mut rim_materials: ResMut<Assets<RimMaterial>>,
    settings: Res<GlobeSettings>,
    textures: Res<PlanetTextures>,
) -> Result {
    let sphere = meshes.add(sphere_mesh(settings.sphere_detail)?);

    let rig = CameraRig::GLOBE;
    let camera = spawn_orbit_camera(&mut commands, rig);

    // tilted group, the layers spin inside it
    let planet = commands
        .spawn((
            Planet,
            Transform::from_rotation(Quat::from_rotation_z(AXIAL_TILT_DEGREES.to_radians())),
            Visibility::default(),
        ))
        .id();

    let surface_material = standard_materials.add(StandardMaterial {
        base_color_texture: Some(textures.surface.clone()),
        metallic: 0.0,
        perceptual_roughness: 1.0,
        ..default()
    });

    let night_material = standard_materials.add(StandardMaterial {
        base_color_texture: Some(textures.night_lights.clone()),
        unlit: true,
        alpha_mode: AlphaMode::Add,
        ..default()
    });

    let cloud_material = standard_materials.add(StandardMaterial {
        base_color: Color::srgba(1.0, 1.0, 1.0, 0.8),
        base_color_texture: Some(textures.clouds.clone()),
        alpha_mode: AlphaMode::Add,
        ..default()
    });

    // camera position here is only the starting value, see sync_rim_camera
    let glow_material = rim_materials.add(RimMaterial {
        rim_uniform: RimUniform::new(
            hex_color(RIM_FACING_COLOR),
            hex_color(RIM_EDGE_COLOR),
            settings.rim_intensity,
            rig.orbit().calculate_position(),
        )?,
    });

    let surface = spawn_layer(&mut commands, planet, Layer::Surface, &sphere, MeshMaterial3d(surface_material));
    let night_lights = spawn_layer(&mut commands, planet, Layer::NightLights, &sphere, MeshMaterial3d(night_material));
    let clouds = spawn_layer(&mut commands, planet, Layer::Clouds, &sphere, MeshMaterial3d(cloud_material));
    let glow = spawn_layer(&mut commands, planet, Layer::Glow, &sphere, MeshMaterial3d(glow_material));

    let star_cloud = generate_starfield(
        &mut rand::rng(),
        settings.star_count,
        settings.star_inner_radius,
        settings.star_outer_radius,
    )?;
    debug!("generated {} stars", star_cloud.len());

    let stars = commands
        .spawn((
            Stars,
            Mesh3d(meshes.add(point_cloud_mesh(&star_cloud.positions, &star_cloud.colors))),
            MeshMaterial3d(standard_materials.add(StandardMaterial {
                base_color: Color::WHITE,
                unlit: true,
                ..default()
            })),
            Transform::default(),
            Spin::new(STARS_SPIN),
        ))
        .id();

    // sun light
    commands.spawn((
        DirectionalLight {
            illuminance: SUN_ILLUMINANCE,
            ..default()
        },
        Transform::from_translation(SUN_POSITION).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.insert_resource(PlanetLayers {
        planet,
        surface,
        clouds,
        night_lights,
        glow,
        stars,
        camera,
    });

    info!(
        "globe scene ready: detail {}, {} stars",
        settings.sphere_detail, settings.star_count
    );
    Ok(())
}

fn spawn_layer(
    commands: &mut Commands,
    planet: Entity,
    layer: Layer,
    mesh: &Handle<Mesh>,
    material: impl Bundle,
) -> Entity {
    commands
        .spawn((
            layer,
            Mesh3d(mesh.clone()),
            material,
            Transform::from_scale(Vec3::splat(layer.scale())),
            Visibility::default(),
            Spin::new(layer.spin()),
            ChildOf(planet),
        ))
        .id()
}

// keep the rim glow computed against the live camera
fn sync_rim_camera(
    layers: Res<PlanetLayers>,
    camera_query: Query<&Transform, With<Camera3d>>,
    glow_query: Query<&MeshMaterial3d<RimMaterial>>,
    mut rim_materials: ResMut<Assets<RimMaterial>>,
) {
    let (Ok(camera_transform), Ok(glow_material)) =
        (camera_query.get(layers.camera), glow_query.get(layers.glow))
    else {
        return;
    };

    let camera_position = camera_transform.translation;
    let stale = rim_materials
        .get(&glow_material.0)
        .is_some_and(|material| material.rim_uniform.camera_position != camera_position);

    if stale {
        if let Some(material) = rim_materials.get_mut(&glow_material.0) {
            material.rim_uniform.camera_position = camera_position;
        }
    }
}

/// Texture of `material` that the loader gave up on, if any
pub fn failed_texture(
    material: &StandardMaterial,
    is_failed: impl Fn(AssetId<Image>) -> bool,
) -> Option<AssetId<Image>> {
    material
        .base_color_texture
        .as_ref()
        .map(Handle::id)
        .filter(|id| is_failed(*id))
}

fn strip_failed_textures(
    asset_server: Res<AssetServer>,
    mut layers: Query<(&Layer, &MeshMaterial3d<StandardMaterial>, &mut Visibility)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    degrade_failed_layers(&mut layers, &mut materials, |id| {
        matches!(asset_server.load_state(id), LoadState::Failed(_))
    });
}

/// Drops every texture `is_failed` reports. Opaque layers keep drawing untextured,
/// additive layers are hidden since an unmapped additive shell renders solid white
pub fn degrade_failed_layers(
    layers: &mut Query<(&Layer, &MeshMaterial3d<StandardMaterial>, &mut Visibility)>,
    materials: &mut Assets<StandardMaterial>,
    is_failed: impl Fn(AssetId<Image>) -> bool,
) {
    for (layer, handle, mut visibility) in layers.iter_mut() {
        let Some(texture) = materials
            .get(&handle.0)
            .and_then(|material| failed_texture(material, &is_failed))
        else {
            continue;
        };

        if let Some(material) = materials.get_mut(&handle.0) {
            material.base_color_texture = None;
        }

        if layer.is_additive() {
            *visibility = Visibility::Hidden;
            warn!("{layer:?} texture {texture:?} failed to load, hiding the layer");
        } else {
            warn!("{layer:?} texture {texture:?} failed to load, drawing the layer untextured");
        }
    }
}
