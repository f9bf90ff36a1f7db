use crate::errors::Result;
use crate::util::cur::{count, Cur};
use crate::util::name::Name;

pub const MAGIC: &[u8] = b"IDST";
pub const VERSION: i32 = 10;
pub const HEADER_SIZE: usize = 244;

/// The parts of `studiohdr_t` we care about.
#[derive(Debug, Clone)]
pub struct Header {
    pub name: Name,
    pub version: i32,
    /// Declared file length. Anything in the buffer past this is ignored.
    pub length: usize,
    pub eye_position: (f32, f32, f32),
    pub flags: i32,

    pub num_bones: usize,
    pub bone_index: i32,
    pub num_bone_controllers: usize,
    pub num_seqs: usize,
    pub seq_index: i32,
    pub num_seq_groups: usize,
    pub num_textures: usize,
    pub texture_index: i32,
    pub num_skin_refs: usize,
    pub num_skin_families: usize,
    pub skin_index: i32,
    pub num_body_parts: usize,
    pub body_part_index: i32,
    pub num_attachments: usize,
}

pub fn read_header(cur: Cur) -> Result<Header> {
    fields!(cur, studiohdr {
        id: [u8; 4],
        version: i32,
        name: (name(64)),
        length: i32,
        eye_position: (f32, f32, f32),
        min: (f32, f32, f32),
        max: (f32, f32, f32),
        bbmin: (f32, f32, f32),
        bbmax: (f32, f32, f32),
        flags: i32,
        num_bones: i32,
        bone_index: i32,
        num_bone_controllers: i32,
        bone_controller_index: i32,
        num_hitboxes: i32,
        hitbox_index: i32,
        num_seqs: i32,
        seq_index: i32,
        num_seq_groups: i32,
        seq_group_index: i32,
        num_textures: i32,
        texture_index: i32,
        texture_data_index: i32,
        num_skin_refs: i32,
        num_skin_families: i32,
        skin_index: i32,
        num_body_parts: i32,
        body_part_index: i32,
        num_attachments: i32,
        attachment_index: i32,
        sound_table: i32,
        sound_index: i32,
        sound_groups: i32,
        sound_group_index: i32,
        num_transitions: i32,
        transition_index: i32,
    });

    if id != MAGIC {
        bad_format!("expected the first four bytes to be IDST, found {:?}", id);
    }
    if version != VERSION {
        bad_format!("unsupported version {} (only {} is supported)", version, VERSION);
    }

    let buf_len = cur.buf().len();
    if length < HEADER_SIZE as i32 || length as usize > buf_len {
        bad_format!("declared length {} doesn't fit the {} byte buffer", length, buf_len);
    }
    if (length as usize) < buf_len {
        debug!("ignoring {} trailing bytes", buf_len - length as usize);
    }

    Ok(Header {
        name,
        version,
        length: length as usize,
        eye_position,
        flags,
        num_bones: count("bone", num_bones)?,
        bone_index,
        num_bone_controllers: count("bone controller", num_bone_controllers)?,
        num_seqs: count("sequence", num_seqs)?,
        seq_index,
        num_seq_groups: count("sequence group", num_seq_groups)?,
        num_textures: count("texture", num_textures)?,
        texture_index,
        num_skin_refs: count("skin reference", num_skin_refs)?,
        num_skin_families: count("skin family", num_skin_families)?,
        skin_index,
        num_body_parts: count("body part", num_body_parts)?,
        body_part_index,
        num_attachments: count("attachment", num_attachments)?,
    })
}
