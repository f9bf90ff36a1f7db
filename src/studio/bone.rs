use crate::errors::Result;
use crate::studio::header::Header;
use crate::util::cur::{at_offset, Cur};
use crate::util::name::Name;

pub const BONE_SIZE: usize = 112;

/// Vertex bone indices are stored in a byte, and the engine keeps fixed
/// arrays of this many bone transforms.
pub const MAX_BONES: usize = 128;

/// A node in the skeleton.
///
/// The six channels are position x,y,z followed by rotation x,y,z (Euler
/// angles in radians). `value` is the rest value of each channel and `scale`
/// multiplies the raw values stored in animation streams.
#[derive(Debug, Clone)]
pub struct Bone {
    pub name: Name,
    /// Always a smaller index than this bone's own (checked on load).
    pub parent: Option<usize>,
    pub flags: i32,
    pub value: [f32; 6],
    pub scale: [f32; 6],
}

pub fn read_bones(cur: Cur, hdr: &Header) -> Result<Vec<Bone>> {
    if hdr.num_bones > MAX_BONES {
        bad_format!("{} bones, at most {} are supported", hdr.num_bones, MAX_BONES);
    }
    if hdr.num_bones == 0 {
        return Ok(vec![]);
    }

    let table = at_offset(cur, hdr.bone_index)?;
    let bones = (0..hdr.num_bones)
        .map(|i| read_bone(table + i * BONE_SIZE, i, hdr.num_bones))
        .collect::<Result<Vec<Bone>>>()?;

    trace!("read {} bones", bones.len());
    Ok(bones)
}

fn read_bone(cur: Cur, idx: usize, num_bones: usize) -> Result<Bone> {
    fields!(cur, mstudiobone {
        name: (name(32)),
        parent: i32,
        flags: i32,
        bone_controller: [i32; 6],
        value: [f32; 6],
        scale: [f32; 6],
    });

    let parent = match parent {
        -1 => None,
        p if p < 0 || p as usize >= num_bones => {
            out_of_range!("bone {} ({}) has parent {}, but there are {} bones",
                idx, name, p, num_bones);
        }
        p if p as usize >= idx => {
            // Poses are resolved in index order, so a parent has to have
            // been resolved before any of its children.
            bad_format!("bone {} ({}) comes before its parent {}", idx, name, p);
        }
        p => Some(p as usize),
    };

    let mut bone = Bone { name, parent, flags, value: [0.0; 6], scale: [0.0; 6] };
    for (dst, src) in bone.value.iter_mut().zip(value) {
        *dst = src;
    }
    for (dst, src) in bone.scale.iter_mut().zip(scale) {
        *dst = src;
    }
    Ok(bone)
}
