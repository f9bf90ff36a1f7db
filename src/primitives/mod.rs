//! Produce vertex and index buffers for a studio model mesh.
//!
//! A mesh is stored as a stream of int16 records describing triangle fans
//! and strips. Each group starts with a header record: its magnitude is the
//! number of vertices in the group and its sign is the kind (negative for a
//! fan, positive for a strip). A header of 0 ends the stream. Each vertex is
//! four records: index into the sub-model's vertex array, index into its
//! normal array, and the texture coordinates in texels.
//!
//! `unpack` turns this into buffers of the sort consumed by eg.
//! `glDrawElements`. Every vertex in the stream gets its own slot in the
//! vertex buffer, even when it refers to the same position as another one,
//! since it can have a different normal or texcoord.

pub mod batch;
pub mod index_builder;

use self::index_builder::{IndexBuilder, PrimKind};
use crate::errors::Result;
use crate::util::cur::Cur;

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub texcoord: [f32; 2],
    /// Index of the bone whose transform skins this vertex.
    pub bone: u8,
}

/// Per-sub-model arrays the command stream indexes into.
pub struct Source<'a> {
    pub positions: &'a [[f32; 3]],
    pub normals: &'a [[f32; 3]],
    /// Bone index for every entry in `positions`.
    pub bones: &'a [u8],
}

pub struct Primitives {
    pub vertices: Vec<Vertex>,
    /// Triangle list; the length is always a multiple of three.
    pub indices: Vec<u32>,
}

/// Texture size used for texcoords when a mesh has no texture.
pub const DEFAULT_TEXTURE_DIM: (u32, u32) = (64, 64);

/// Decodes the command stream at `cur`.
pub fn unpack(mut cur: Cur, src: &Source, texture_dim: (u32, u32)) -> Result<Primitives> {
    let (tex_w, tex_h) = (texture_dim.0 as f32, texture_dim.1 as f32);

    let mut vertices: Vec<Vertex> = vec![];
    let mut b = IndexBuilder::new();

    loop {
        let header = cur.next::<i16>()?;
        if header == 0 {
            break;
        }
        let kind = if header < 0 { PrimKind::Fan } else { PrimKind::Strip };
        let num_verts = (header as i32).abs() as usize;

        b.begin(kind);

        for _ in 0..num_verts {
            let ((vert_idx, norm_idx), (s, t)) = cur.next::<((i16, i16), (i16, i16))>()?;

            let vert_idx = lookup("vertex", vert_idx, src.positions.len())?;
            let norm_idx = lookup("normal", norm_idx, src.normals.len())?;

            // Looked up by the source index, not the output position.
            let bone = match src.bones.get(vert_idx) {
                Some(&bone) => bone,
                None => out_of_range!("no bone index for vertex {}", vert_idx),
            };

            let out_idx = vertices.len() as u32;
            vertices.push(Vertex {
                position: src.positions[vert_idx],
                normal: src.normals[norm_idx],
                texcoord: [s as f32 / tex_w, t as f32 / tex_h],
                bone,
            });
            b.push(out_idx);
        }
    }

    let indices = b.done();
    trace!("unpacked {} vertices, {} triangles", vertices.len(), indices.len() / 3);

    Ok(Primitives { vertices, indices })
}

fn lookup(what: &str, idx: i16, len: usize) -> Result<usize> {
    if idx < 0 || idx as usize >= len {
        out_of_range!("{} index {} in mesh stream, but there are only {}", what, idx, len);
    }
    Ok(idx as usize)
}

#[cfg(test)]
pub fn stream_bytes(records: &[i16]) -> Vec<u8> {
    records.iter().flat_map(|r| r.to_le_bytes().to_vec()).collect()
}

#[cfg(test)]
static POSITIONS: [[f32; 3]; 4] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
];

#[cfg(test)]
static NORMALS: [[f32; 3]; 2] = [[0.0, 0.0, 1.0], [0.0, 0.0, -1.0]];

#[cfg(test)]
static BONES: [u8; 4] = [0, 0, 3, 7];

#[cfg(test)]
fn source() -> Source<'static> {
    Source { positions: &POSITIONS, normals: &NORMALS, bones: &BONES }
}

#[test]
fn test_fan_stream() {
    let buf = stream_bytes(&[
        -4,
        0, 0, 0, 0,
        1, 0, 64, 0,
        2, 1, 64, 32,
        3, 1, 0, 32,
        0,
    ]);
    let prims = unpack(Cur::new(&buf), &source(), (64, 32)).unwrap();

    assert_eq!(prims.indices, vec![0, 1, 2, 0, 2, 3]);
    assert_eq!(prims.vertices.len(), 4);
    assert_eq!(prims.vertices[2].position, [1.0, 1.0, 0.0]);
    assert_eq!(prims.vertices[2].normal, [0.0, 0.0, -1.0]);
    assert_eq!(prims.vertices[2].texcoord, [1.0, 1.0]);
    assert_eq!(prims.vertices[3].bone, 7);
}

#[test]
fn test_strip_stream_duplicates_vertices() {
    // The same source vertex twice, with different texcoords.
    let buf = stream_bytes(&[
        5,
        3, 0, 0, 0,
        2, 0, 0, 0,
        3, 0, 16, 16,
        1, 0, 0, 0,
        0, 0, 0, 0,
        0,
    ]);
    let prims = unpack(Cur::new(&buf), &source(), DEFAULT_TEXTURE_DIM).unwrap();

    assert_eq!(prims.indices, vec![0, 1, 2, 2, 1, 3, 2, 3, 4]);
    assert_eq!(prims.vertices.len(), 5);
    assert_eq!(prims.vertices[0].position, prims.vertices[2].position);
    assert_eq!(prims.vertices[0].texcoord, [0.0, 0.0]);
    assert_eq!(prims.vertices[2].texcoord, [0.25, 0.25]);
    assert_eq!(prims.vertices[2].bone, 7);
}

#[test]
fn test_short_group_makes_no_triangles() {
    let buf = stream_bytes(&[
        2,
        0, 0, 0, 0,
        1, 0, 0, 0,
        -3,
        0, 0, 0, 0,
        1, 0, 0, 0,
        2, 0, 0, 0,
        0,
    ]);
    let prims = unpack(Cur::new(&buf), &source(), DEFAULT_TEXTURE_DIM).unwrap();
    assert_eq!(prims.vertices.len(), 5);
    assert_eq!(prims.indices, vec![2, 3, 4]);
}

#[test]
fn test_bad_streams() {
    // Vertex index past the end of the sub-model's vertices.
    let buf = stream_bytes(&[3, 0, 0, 0, 0, 1, 0, 0, 0, 4, 0, 0, 0, 0]);
    assert!(unpack(Cur::new(&buf), &source(), DEFAULT_TEXTURE_DIM).is_err());

    // Negative normal index.
    let buf = stream_bytes(&[3, 0, -1, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 0]);
    assert!(unpack(Cur::new(&buf), &source(), DEFAULT_TEXTURE_DIM).is_err());

    // No terminator.
    let buf = stream_bytes(&[3, 0, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0]);
    assert!(unpack(Cur::new(&buf), &source(), DEFAULT_TEXTURE_DIM).is_err());
}
