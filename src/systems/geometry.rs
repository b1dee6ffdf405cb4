//! Mesh builders shared by both scenes
//!
//! Everything here runs once at startup, the resulting meshes are never touched again

use std::collections::BTreeSet;

use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;

use crate::error::SceneError;

/// Unit icosphere at the given subdivision level, with normals and UVs
pub fn sphere_mesh(detail: u32) -> Result<Mesh, SceneError> {
    Sphere::new(1.0)
        .mesh()
        .ico(detail)
        .map_err(|err| SceneError::SphereDetail {
            detail,
            reason: err.to_string(),
        })
}

/// Faceted icosahedron: every triangle gets its own vertices and face normal
pub fn flat_shaded(mesh: &Mesh) -> Mesh {
    mesh.clone()
        .with_duplicated_vertices()
        .with_computed_flat_normals()
}

/// Builds a line mesh out of the unique triangle edges of an indexed mesh
pub fn wireframe_mesh(source: &Mesh) -> Result<Mesh, SceneError> {
    let positions = source
        .attribute(Mesh::ATTRIBUTE_POSITION)
        .and_then(|values| values.as_float3())
        .ok_or(SceneError::MissingMeshData("position"))?
        .to_vec();

    let triangles: Vec<u32> = source
        .indices()
        .ok_or(SceneError::MissingMeshData("index"))?
        .iter()
        .map(|i| i as u32)
        .collect();

    // shared edges only once, ordered so output is stable
    let mut edges = BTreeSet::new();
    for triangle in triangles.chunks_exact(3) {
        for (a, b) in [
            (triangle[0], triangle[1]),
            (triangle[1], triangle[2]),
            (triangle[2], triangle[0]),
        ] {
            edges.insert((a.min(b), a.max(b)));
        }
    }

    let mut indices = Vec::with_capacity(edges.len() * 2);
    for (a, b) in edges {
        indices.push(a);
        indices.push(b);
    }

    let mut mesh = Mesh::new(
        PrimitiveTopology::LineList,
        RenderAssetUsages::RENDER_WORLD | RenderAssetUsages::MAIN_WORLD,
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_indices(Indices::U32(indices));

    Ok(mesh)
}

/// Point list mesh from flat xyz / rgb buffers
pub fn point_cloud_mesh(positions: &[f32], colors: &[f32]) -> Mesh {
    let positions: Vec<[f32; 3]> = positions
        .chunks_exact(3)
        .map(|p| [p[0], p[1], p[2]])
        .collect();

    // vertex colors are rgba
    let colors: Vec<[f32; 4]> = colors
        .chunks_exact(3)
        .map(|c| [c[0], c[1], c[2], 1.0])
        .collect();

    let mut mesh = Mesh::new(
        PrimitiveTopology::PointList,
        RenderAssetUsages::RENDER_WORLD | RenderAssetUsages::MAIN_WORLD,
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, colors);

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(mesh: &Mesh) -> &[[f32; 3]] {
        mesh.attribute(Mesh::ATTRIBUTE_POSITION)
            .and_then(|values| values.as_float3())
            .unwrap()
    }

    #[test]
    fn sphere_vertices_sit_on_unit_radius() {
        let mesh = sphere_mesh(3).unwrap();

        assert_eq!(mesh.primitive_topology(), PrimitiveTopology::TriangleList);
        assert!(mesh.attribute(Mesh::ATTRIBUTE_NORMAL).is_some());
        assert!(mesh.attribute(Mesh::ATTRIBUTE_UV_0).is_some());
        for p in positions(&mesh) {
            assert!((Vec3::from(*p).length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn sphere_normals_face_outward() {
        let mesh = sphere_mesh(2).unwrap();
        let normals = mesh
            .attribute(Mesh::ATTRIBUTE_NORMAL)
            .and_then(|values| values.as_float3())
            .unwrap();

        for (p, n) in positions(&mesh).iter().zip(normals) {
            assert!(Vec3::from(*p).dot(Vec3::from(*n)) > 0.9);
        }
    }

    #[test]
    fn excessive_detail_is_rejected() {
        let err = sphere_mesh(500).unwrap_err();
        assert!(matches!(err, SceneError::SphereDetail { detail: 500, .. }));
    }

    #[test]
    fn wireframe_of_icosahedron_has_thirty_edges() {
        let mesh = sphere_mesh(0).unwrap();
        let wire = wireframe_mesh(&mesh).unwrap();

        assert_eq!(wire.primitive_topology(), PrimitiveTopology::LineList);
        assert_eq!(wire.indices().unwrap().len(), 30 * 2);
        assert_eq!(positions(&wire).len(), positions(&mesh).len());
    }

    #[test]
    fn wireframe_needs_indices() {
        let flat = flat_shaded(&sphere_mesh(1).unwrap());
        assert_eq!(
            wireframe_mesh(&flat).unwrap_err(),
            SceneError::MissingMeshData("index")
        );
    }

    #[test]
    fn flat_shading_gives_each_triangle_its_own_vertices() {
        let mesh = sphere_mesh(1).unwrap();
        let triangle_count = mesh.indices().unwrap().len() / 3;
        let flat = flat_shaded(&mesh);

        assert!(flat.indices().is_none());
        assert_eq!(positions(&flat).len(), triangle_count * 3);
    }

    #[test]
    fn point_cloud_keeps_one_vertex_per_triple() {
        let mesh = point_cloud_mesh(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0], &[0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);

        assert_eq!(mesh.primitive_topology(), PrimitiveTopology::PointList);
        assert_eq!(positions(&mesh), &[[0.0, 1.0, 2.0], [3.0, 4.0, 5.0]]);
        assert_eq!(mesh.count_vertices(), 2);
    }
}
