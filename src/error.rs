use thiserror::Error;

/// Rejections raised while building scene geometry and materials
#[derive(Debug, Error, PartialEq)]
pub enum SceneError {
    #[error("invalid starfield radii: inner {inner}, outer {outer} (need 0 <= inner <= outer, both finite)")]
    InvalidRadii { inner: f32, outer: f32 },

    #[error("starfield of {0} stars does not fit in a vertex buffer")]
    TooManyStars(usize),

    #[error("sphere detail level {detail} rejected: {reason}")]
    SphereDetail { detail: u32, reason: String },

    #[error("mesh is missing its {0} data")]
    MissingMeshData(&'static str),

    #[error("invalid rim parameter {name}: {value}")]
    InvalidRimParameter { name: &'static str, value: f32 },

    #[error("unknown scene '{0}', expected 'globe' or 'icosahedron'")]
    UnknownScene(String),

    #[error("invalid frame limit '{0}', expected a non-negative integer")]
    InvalidFrameLimit(String),
}
