use std::str::FromStr;

use bevy::prelude::*;

use crate::error::SceneError;

// Log filter, RUST_LOG wins if set
pub const LOG_FILTER: &str = "info,wgpu=error,naga=warn,bevy_globe=debug";
pub const WINDOW_TITLE: &str = "bevy_globe";

// Environment overrides
pub const SCENE_ENV_VAR: &str = "BEVY_GLOBE_SCENE";
pub const FRAME_LIMIT_ENV_VAR: &str = "BEVY_GLOBE_FRAMES";

// Camera
pub const CAMERA_FOV_DEGREES: f32 = 75.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_DAMPING: f32 = 0.03;
// closest zoom, just outside the unit body and its glow shell
pub const CAMERA_MIN_DISTANCE: f32 = 1.2;

// Planet layer scales (relative to the shared unit sphere)
pub const SURFACE_SCALE: f32 = 1.0;
pub const CLOUD_SCALE: f32 = 1.003;
pub const NIGHT_LIGHTS_SCALE: f32 = 1.0;
pub const GLOW_SCALE: f32 = 1.01;
pub const AXIAL_TILT_DEGREES: f32 = -23.4;

// Rotation deltas, radians per tick
pub const SURFACE_SPIN: f32 = 0.002;
pub const CLOUD_SPIN: f32 = 0.0023;
pub const NIGHT_LIGHTS_SPIN: f32 = 0.002;
pub const GLOW_SPIN: f32 = 0.002;
pub const STARS_SPIN: f32 = -0.0002;
pub const ICOSAHEDRON_SPIN: f32 = 0.0017;

// Starfield
pub const STAR_COUNT: usize = 2000;
pub const STAR_INNER_RADIUS: f32 = 25.0;
pub const STAR_OUTER_RADIUS: f32 = 50.0;
pub const STAR_HUE_DEGREES: f32 = 216.0;
pub const STAR_SATURATION: f32 = 0.2;

// Sphere subdivision
pub const GLOBE_DETAIL: u32 = 12;
pub const ICOSAHEDRON_DETAIL: u32 = 2;
pub const WIREFRAME_SCALE: f32 = 1.001;

// Rim glow
pub const RIM_FACING_COLOR: u32 = 0x000000;
pub const RIM_EDGE_COLOR: u32 = 0x0088ff;
pub const RIM_INTENSITY: f32 = 1.0;

// Lights
pub const SUN_ILLUMINANCE: f32 = 4_000.0;
pub const SUN_POSITION: Vec3 = Vec3::new(-2.0, 0.5, 1.5);
pub const HEMISPHERE_SKY_COLOR: u32 = 0x0099ff;
pub const HEMISPHERE_GROUND_COLOR: u32 = 0xaa5500;
pub const HEMISPHERE_BRIGHTNESS: f32 = 400.0;

// Asset paths
pub const EARTH_DIFFUSE_TEXTURE: &str = "textures/earth_diffuse.jpg";
pub const EARTH_NIGHT_TEXTURE: &str = "textures/earth_night.jpg";
pub const EARTH_CLOUDS_TEXTURE: &str = "textures/earth_clouds.jpg";
pub const RIM_SHADER: &str = "shaders/rim.wgsl";

/// Packs a 0xRRGGBB literal into an sRGB color
pub fn hex_color(hex: u32) -> Color {
    let [_, r, g, b] = hex.to_be_bytes();
    Color::srgb_u8(r, g, b)
}

/// Which of the two demo scenes to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneKind {
    #[default]
    Globe,
    Icosahedron,
}

impl FromStr for SceneKind {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "globe" | "earth" => Ok(SceneKind::Globe),
            "icosahedron" | "ico" => Ok(SceneKind::Icosahedron),
            other => Err(SceneError::UnknownScene(other.to_string())),
        }
    }
}

/// Startup choices read from the environment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunConfig {
    pub scene: SceneKind,
    pub frame_limit: Option<u64>,
}

impl RunConfig {
    pub fn from_env() -> Result<Self, SceneError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SceneError> {
        let scene = match lookup(SCENE_ENV_VAR) {
            Some(value) => value.parse()?,
            None => SceneKind::default(),
        };

        let frame_limit = match lookup(FRAME_LIMIT_ENV_VAR) {
            Some(value) => Some(
                value
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| SceneError::InvalidFrameLimit(value))?,
            ),
            None => None,
        };

        Ok(Self { scene, frame_limit })
    }
}

/// Tunables for the globe scene
#[derive(Resource, Debug, Clone)]
pub struct GlobeSettings {
    pub star_count: usize,
    pub star_inner_radius: f32,
    pub star_outer_radius: f32,
    pub sphere_detail: u32,
    pub rim_intensity: f32,
}

impl Default for GlobeSettings {
    fn default() -> Self {
        Self {
            star_count: STAR_COUNT,
            star_inner_radius: STAR_INNER_RADIUS,
            star_outer_radius: STAR_OUTER_RADIUS,
            sphere_detail: GLOBE_DETAIL,
            rim_intensity: RIM_INTENSITY,
        }
    }
}
