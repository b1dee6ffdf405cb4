use bevy::prelude::*;
use bevy::color::ColorToComponents;
use bevy::render::render_resource::{AsBindGroup, ShaderRef, ShaderType};
use bevy::reflect::TypePath;
use bevy::asset::Asset;

use crate::config::RIM_SHADER;
use crate::error::SceneError;

// rim glow inputs, laid out for the fragment shader
// https://www.w3.org/TR/WGSL/#address-space-layout-constraints
#[derive(ShaderType, Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct RimUniform {
    pub facing_color: Vec4,
    pub rim_color: Vec4,
    pub camera_position: Vec3,
    pub intensity: f32,
}

impl RimUniform {
    pub fn new(
        facing_color: Color,
        rim_color: Color,
        intensity: f32,
        camera_position: Vec3,
    ) -> Result<Self, SceneError> {
        if !intensity.is_finite() || intensity < 0.0 {
            return Err(SceneError::InvalidRimParameter {
                name: "intensity",
                value: intensity,
            });
        }
        let facing_color = facing_color.to_linear().to_vec4();
        let rim_color = rim_color.to_linear().to_vec4();
        for (name, color) in [("facing_color", facing_color), ("rim_color", rim_color)] {
            if !color.is_finite() {
                return Err(SceneError::InvalidRimParameter {
                    name,
                    value: color.element_sum(),
                });
            }
        }
        if !camera_position.is_finite() {
            return Err(SceneError::InvalidRimParameter {
                name: "camera_position",
                value: camera_position.x + camera_position.y + camera_position.z,
            });
        }

        Ok(Self {
            facing_color,
            rim_color,
            camera_position,
            intensity,
        })
    }

    /// CPU copy of the fragment stage in rim.wgsl
    pub fn shade(&self, world_normal: Vec3, world_position: Vec3) -> Vec4 {
        let view_dir = (self.camera_position - world_position).normalize_or_zero();
        let facing = world_normal.normalize_or_zero().dot(view_dir);
        self.blend(facing)
    }

    /// Output color for a given facing term
    pub fn blend(&self, facing: f32) -> Vec4 {
        let t = (rim_strength(facing) * self.intensity).clamp(0.0, 1.0);
        self.facing_color.lerp(self.rim_color, t)
    }
}

/// 0 when looking straight at the surface, 1 at grazing angles and behind
pub fn rim_strength(facing: f32) -> f32 {
    1.0 - smoothstep(0.4, 0.6, facing)
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

// atmosphere rim glow
#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct RimMaterial {
    #[uniform(0)]
    pub rim_uniform: RimUniform,
}

impl Material for RimMaterial {
    fn fragment_shader() -> ShaderRef {
        RIM_SHADER.into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        AlphaMode::Add
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(intensity: f32) -> RimUniform {
        RimUniform::new(
            Color::BLACK,
            Color::linear_rgb(0.0, 0.5, 1.0),
            intensity,
            Vec3::new(0.0, 0.0, 5.0),
        )
        .unwrap()
    }

    #[test]
    fn face_on_has_no_rim() {
        assert!(rim_strength(1.0).abs() < 1e-6);
        assert!(rim_strength(0.6).abs() < 1e-6);

        let color = uniform(1.0).blend(1.0);
        assert!(color.abs_diff_eq(Vec4::new(0.0, 0.0, 0.0, 1.0), 1e-6));
    }

    #[test]
    fn edge_on_and_behind_are_full_rim() {
        let rim = uniform(1.0);
        for facing in [0.4, 0.2, 0.0, -0.5, -1.0] {
            assert!((rim_strength(facing) - 1.0).abs() < 1e-6);
            assert!(rim.blend(facing).abs_diff_eq(rim.rim_color, 1e-6));
        }
    }

    #[test]
    fn rim_fades_monotonically_between_thresholds() {
        let rim = uniform(1.0);
        let mut previous_strength = f32::INFINITY;
        let mut previous_blue = f32::INFINITY;

        for step in 0..=100 {
            let facing = step as f32 / 100.0;
            let strength = rim_strength(facing);
            let blue = rim.blend(facing).z;

            assert!(strength <= previous_strength + 1e-6);
            assert!(blue <= previous_blue + 1e-6);
            previous_strength = strength;
            previous_blue = blue;
        }
        assert!((rim_strength(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn intensity_scales_and_clamps() {
        let half = uniform(0.5).blend(0.0);
        assert!((half.z - 0.5).abs() < 1e-6);

        let over = uniform(4.0).blend(0.0);
        assert!(over.abs_diff_eq(uniform(1.0).rim_color, 1e-6));
    }

    #[test]
    fn shade_uses_camera_direction() {
        let rim = uniform(1.0);

        // sphere point facing the camera
        let front = rim.shade(Vec3::Z, Vec3::Z);
        assert!(front.abs_diff_eq(rim.facing_color, 1e-6));

        // silhouette point, normal perpendicular to the view ray
        let edge = rim.shade(Vec3::X, Vec3::X);
        assert!(edge.z > 0.9);
    }

    #[test]
    fn moving_camera_changes_result() {
        let mut rim = uniform(1.0);
        let before = rim.shade(Vec3::X, Vec3::X);

        rim.camera_position = Vec3::new(5.0, 0.0, 0.0);
        let after = rim.shade(Vec3::X, Vec3::X);

        assert!(before.z > 0.9);
        assert!(after.z < 1e-6);
    }

    #[test]
    fn bad_parameters_are_rejected() {
        let err = RimUniform::new(Color::BLACK, Color::WHITE, -1.0, Vec3::ZERO).unwrap_err();
        assert_eq!(
            err,
            SceneError::InvalidRimParameter { name: "intensity", value: -1.0 }
        );
        assert!(RimUniform::new(Color::BLACK, Color::WHITE, f32::NAN, Vec3::ZERO).is_err());
        assert!(RimUniform::new(Color::BLACK, Color::WHITE, 1.0, Vec3::splat(f32::INFINITY)).is_err());

        let nan = Color::linear_rgb(f32::NAN, 0.0, 0.0);
        let err = RimUniform::new(nan, Color::WHITE, 1.0, Vec3::ZERO).unwrap_err();
        assert!(matches!(err, SceneError::InvalidRimParameter { name: "facing_color", .. }));

        let err = RimUniform::new(Color::BLACK, Color::linear_rgba(0.0, f32::INFINITY, 0.0, 1.0), 1.0, Vec3::ZERO)
            .unwrap_err();
        assert!(matches!(err, SceneError::InvalidRimParameter { name: "rim_color", .. }));
    }
}
