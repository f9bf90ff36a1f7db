//! Geometry: body parts contain sub-models, sub-models contain meshes.
//!
//! Each sub-model owns the vertex, normal, and vertex-bone arrays that its
//! meshes' command streams index into. Every mesh of every sub-model of every
//! body part becomes one `Mesh`.

use crate::errors::Result;
use crate::primitives::{self, Source, Vertex, DEFAULT_TEXTURE_DIM};
use crate::studio::header::Header;
use crate::studio::texture::Texture;
use crate::util::cur::{at_offset, count, Cur};

pub const BODY_PART_SIZE: usize = 76;
pub const SUB_MODEL_SIZE: usize = 112;
pub const MESH_SIZE: usize = 20;

pub struct Mesh {
    pub vertices: Vec<Vertex>,
    /// Triangle list into `vertices`.
    pub indices: Vec<u32>,
    /// Index into the model's textures, if the mesh has one.
    pub texture: Option<usize>,
}

pub fn read_meshes(cur: Cur, hdr: &Header, textures: &[Texture]) -> Result<Vec<Mesh>> {
    let skins = SkinTable::read(cur, hdr, textures.len())?;

    let mut meshes = vec![];
    if hdr.num_body_parts == 0 {
        return Ok(meshes);
    }

    let body_parts = at_offset(cur, hdr.body_part_index)?;
    for i in 0..hdr.num_body_parts {
        fields!(body_parts + i * BODY_PART_SIZE, mstudiobodyparts {
            name: (name(64)),
            num_models: i32,
            base: i32,
            model_index: i32,
        });
        debug!("body part {}: {}", i, name);

        let num_models = count("sub-model", num_models)?;
        if num_models == 0 {
            continue;
        }
        let models = at_offset(cur, model_index)?;
        for j in 0..num_models {
            read_sub_model(cur, models + j * SUB_MODEL_SIZE, &skins, textures, &mut meshes)?;
        }
    }

    Ok(meshes)
}

fn read_sub_model(
    base: Cur,
    cur: Cur,
    skins: &SkinTable,
    textures: &[Texture],
    meshes: &mut Vec<Mesh>,
) -> Result<()> {
    fields!(cur, mstudiomodel {
        name: (name(64)),
        kind: i32,
        bounding_radius: f32,
        num_mesh: i32,
        mesh_index: i32,
        num_verts: i32,
        vert_info_index: i32,
        vert_index: i32,
        num_norms: i32,
        norm_info_index: i32,
        norm_index: i32,
        num_groups: i32,
        group_index: i32,
    });
    debug!("  sub-model {}: {} meshes", name, num_mesh);

    let num_mesh = count("mesh", num_mesh)?;
    let num_verts = count("vertex", num_verts)?;
    let num_norms = count("normal", num_norms)?;
    if num_mesh == 0 {
        return Ok(());
    }

    let positions = read_vec3s(base, vert_index, num_verts)?;
    let normals = read_vec3s(base, norm_index, num_norms)?;
    let bones = at_offset(base, vert_info_index)?.next_n_u8s(num_verts)?;
    let src = Source { positions: &positions, normals: &normals, bones };

    let mesh_table = at_offset(base, mesh_index)?;
    for k in 0..num_mesh {
        fields!(mesh_table + k * MESH_SIZE, mstudiomesh {
            num_tris: i32,
            tri_index: i32,
            skin_ref: i32,
            num_norms: i32,
            norm_index: i32,
        });

        let texture = skins.texture_for(skin_ref)?;
        let texture_dim = texture
            .map(|idx| (textures[idx].width, textures[idx].height))
            .unwrap_or(DEFAULT_TEXTURE_DIM);

        // The stream isn't sized; it runs until its terminator, which has to
        // come before the end of the file.
        let prims = primitives::unpack(at_offset(base, tri_index)?, &src, texture_dim)?;
        if prims.indices.len() / 3 != num_tris.max(0) as usize {
            trace!("mesh declared {} triangles, unpacked {}", num_tris, prims.indices.len() / 3);
        }

        meshes.push(Mesh {
            vertices: prims.vertices,
            indices: prims.indices,
            texture,
        });
    }

    Ok(())
}

fn read_vec3s(base: Cur, off: i32, n: usize) -> Result<Vec<[f32; 3]>> {
    if n == 0 {
        return Ok(vec![]);
    }
    let view = at_offset(base, off)?.next_n::<(f32, f32, f32)>(n)?;
    Ok(view.map(|(x, y, z)| [x, y, z]).collect())
}

/// Maps a mesh's skin reference to a texture index. Only the first skin
/// family is used.
struct SkinTable {
    /// Texture for each skin reference.
    refs: Vec<usize>,
}

impl SkinTable {
    fn read(cur: Cur, hdr: &Header, num_textures: usize) -> Result<SkinTable> {
        // Without textures there's nothing to refer to; the table (if any)
        // describes a separate texture file.
        if num_textures == 0 || hdr.num_skin_refs == 0 {
            return Ok(SkinTable { refs: vec![] });
        }

        let refs = at_offset(cur, hdr.skin_index)?
            .next_n::<i16>(hdr.num_skin_refs)?
            .enumerate()
            .map(|(i, tex)| -> Result<usize> {
                if tex < 0 || tex as usize >= num_textures {
                    out_of_range!("skin reference {} names texture {}, but there are {}",
                        i, tex, num_textures);
                }
                Ok(tex as usize)
            })
            .collect::<Result<Vec<usize>>>()?;

        Ok(SkinTable { refs })
    }

    /// Texture for a mesh's skin reference. References past the table mean
    /// the mesh is untextured.
    fn texture_for(&self, skin_ref: i32) -> Result<Option<usize>> {
        if skin_ref < 0 {
            out_of_range!("negative skin reference {}", skin_ref);
        }
        Ok(self.refs.get(skin_ref as usize).cloned())
    }
}
