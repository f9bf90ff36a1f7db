//! Merge all of a model's meshes into one vertex buffer and one index
//! buffer, so they can be uploaded at once and drawn with one call per
//! texture.

use crate::primitives::Vertex;
use crate::studio::Mesh;
use std::ops::Range;

pub struct Batch {
    pub vertices: Vec<Vertex>,
    /// Indices into `vertices` (already offset for each mesh).
    pub indices: Vec<u32>,
    pub surfaces: Vec<Surface>,
}

/// The piece of a `Batch` that came from one mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    /// Texture to bind while drawing this surface.
    pub texture: Option<usize>,
    /// The range of `Batch::indices` this mesh produced.
    pub index_range: Range<usize>,
}

impl Batch {
    pub fn build(meshes: &[Mesh]) -> Batch {
        let num_verts = meshes.iter().map(|m| m.vertices.len()).sum();
        let num_inds = meshes.iter().map(|m| m.indices.len()).sum();

        let mut batch = Batch {
            vertices: Vec::with_capacity(num_verts),
            indices: Vec::with_capacity(num_inds),
            surfaces: Vec::with_capacity(meshes.len()),
        };

        for mesh in meshes {
            let base = batch.vertices.len() as u32;
            let start = batch.indices.len();

            batch.indices.extend(mesh.indices.iter().map(|&i| base + i));
            batch.vertices.extend_from_slice(&mesh.vertices);

            batch.surfaces.push(Surface {
                texture: mesh.texture,
                index_range: start..batch.indices.len(),
            });
        }

        batch
    }
}

#[test]
fn test_rebases_indices() {
    let vertex = |x: f32| Vertex { position: [x, 0.0, 0.0], ..Default::default() };
    let meshes = vec![
        Mesh {
            vertices: vec![vertex(0.0), vertex(1.0), vertex(2.0)],
            indices: vec![0, 1, 2],
            texture: Some(1),
        },
        Mesh {
            vertices: vec![],
            indices: vec![],
            texture: None,
        },
        Mesh {
            vertices: vec![vertex(3.0), vertex(4.0), vertex(5.0), vertex(6.0)],
            indices: vec![0, 1, 2, 0, 2, 3],
            texture: Some(0),
        },
    ];

    let batch = Batch::build(&meshes);

    assert_eq!(batch.vertices.len(), 7);
    assert_eq!(batch.indices, vec![0, 1, 2, 3, 4, 5, 3, 5, 6]);
    assert_eq!(batch.surfaces, vec![
        Surface { texture: Some(1), index_range: 0..3 },
        Surface { texture: None, index_range: 3..3 },
        Surface { texture: Some(0), index_range: 3..9 },
    ]);
    for surface in &batch.surfaces {
        for &i in &batch.indices[surface.index_range.clone()] {
            assert!((i as usize) < batch.vertices.len());
        }
    }
}
