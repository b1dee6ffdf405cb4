pub mod camera;
pub mod driver;
pub mod geometry;
pub mod globe;
pub mod icosahedron;
pub mod starfield;
