//! Procedural starfield
//!
//! Stars are scattered through a spherical shell around the origin. Directions are
//! uniform on the sphere (phi from acos, so the poles don't bunch up), radius is
//! uniform between the shell bounds. Nothing is seeded, every run gets a new sky.

use std::f32::consts::TAU;

use bevy::prelude::*;
use rand::Rng;

use crate::config::{STAR_HUE_DEGREES, STAR_SATURATION};
use crate::error::SceneError;

/// Flat vertex buffers for the star point cloud, 3 floats per star in each
#[derive(Debug, Clone, Default)]
pub struct StarCloud {
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
}

impl StarCloud {
    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.positions
            .chunks_exact(3)
            .map(|p| Vec3::new(p[0], p[1], p[2]))
    }
}

/// Generates `count` stars between `inner` and `outer` radius
pub fn generate_starfield<R: Rng>(
    rng: &mut R,
    count: usize,
    inner: f32,
    outer: f32,
) -> Result<StarCloud, SceneError> {
    if !inner.is_finite() || !outer.is_finite() || inner < 0.0 || inner > outer {
        return Err(SceneError::InvalidRadii { inner, outer });
    }

    let len = count
        .checked_mul(3)
        .filter(|&len| len <= isize::MAX as usize / size_of::<f32>())
        .ok_or(SceneError::TooManyStars(count))?;

    let mut positions = Vec::with_capacity(len);
    let mut colors = Vec::with_capacity(len);

    for _ in 0..count {
        let theta = rng.random::<f32>() * TAU;
        let phi = (2.0 * rng.random::<f32>() - 1.0).acos();
        let radius = rng.random_range(inner..=outer);

        let point = spherical_to_cartesian(radius, phi, theta);
        positions.extend_from_slice(&point.to_array());

        let lightness = rng.random::<f32>();
        colors.extend_from_slice(&star_color(lightness));
    }

    Ok(StarCloud { positions, colors })
}

// phi measured from +Y so "up" stays the polar axis
fn spherical_to_cartesian(radius: f32, phi: f32, theta: f32) -> Vec3 {
    Vec3::new(
        radius * phi.sin() * theta.cos(),
        radius * phi.cos(),
        radius * phi.sin() * theta.sin(),
    )
}

/// Faintly blue star tint, lightness is the only thing that varies
pub fn star_color(lightness: f32) -> [f32; 3] {
    let linear = Color::hsl(STAR_HUE_DEGREES, STAR_SATURATION, lightness.clamp(0.0, 1.0)).to_linear();
    [linear.red, linear.green, linear.blue]
}
