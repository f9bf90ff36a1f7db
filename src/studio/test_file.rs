//! Builds small studio model files for tests.

use crate::studio::header::HEADER_SIZE;
use crate::studio::animation::{ANIM_SIZE, SEQ_DESC_SIZE};
use crate::studio::texture::TEXTURE_SIZE;

#[derive(Default)]
pub struct Writer {
    pub buf: Vec<u8>,
}

impl Writer {
    pub fn pos(&self) -> usize { self.buf.len() }
    pub fn u8(&mut self, x: u8) { self.buf.push(x) }
    pub fn i16(&mut self, x: i16) { self.buf.extend_from_slice(&x.to_le_bytes()) }
    pub fn i32(&mut self, x: i32) { self.buf.extend_from_slice(&x.to_le_bytes()) }
    pub fn f32(&mut self, x: f32) { self.buf.extend_from_slice(&x.to_le_bytes()) }
    pub fn bytes(&mut self, x: &[u8]) { self.buf.extend_from_slice(x) }
    pub fn zeros(&mut self, n: usize) { self.buf.resize(self.buf.len() + n, 0) }

    /// NUL-padded string in a field of `len` bytes.
    pub fn name(&mut self, s: &str, len: usize) {
        assert!(s.len() < len);
        self.bytes(s.as_bytes());
        self.zeros(len - s.len());
    }

    pub fn patch_bytes(&mut self, at: usize, x: &[u8]) {
        self.buf[at .. at + x.len()].copy_from_slice(x);
    }
    pub fn patch_i32(&mut self, at: usize, x: i32) { self.patch_bytes(at, &x.to_le_bytes()) }
    pub fn patch_u16(&mut self, at: usize, x: u16) { self.patch_bytes(at, &x.to_le_bytes()) }
    pub fn patch_f32(&mut self, at: usize, x: f32) { self.patch_bytes(at, &x.to_le_bytes()) }
}

pub struct TestBone {
    pub name: String,
    pub parent: i32,
    pub flags: i32,
    pub value: [f32; 6],
    pub scale: [f32; 6],
}

impl TestBone {
    /// Bone at rest at `pos` with no rotation. Position channels are
    /// unscaled and rotation channels are in hundredths of a radian.
    pub fn new(name: &str, parent: i32, pos: [f32; 3]) -> TestBone {
        TestBone {
            name: name.to_string(),
            parent,
            flags: 0,
            value: [pos[0], pos[1], pos[2], 0.0, 0.0, 0.0],
            scale: [1.0, 1.0, 1.0, 0.01, 0.01, 0.01],
        }
    }
}

pub struct TestTexture {
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub indices: Vec<u8>,
    pub palette: Vec<u8>,
}

pub struct TestMesh {
    pub skin_ref: i32,
    pub stream: Vec<i16>,
}

#[derive(Clone)]
pub struct TestSequence {
    pub name: String,
    pub fps: f32,
    pub num_frames: i32,
    pub seq_group: i32,
    /// (bone, channel, spans); each span is (valid, total, values).
    pub anims: Vec<(usize, usize, Vec<(u8, u8, Vec<i16>)>)>,
}

/// A model with one body part holding one sub-model.
pub struct TestFile {
    pub name: String,
    pub bones: Vec<TestBone>,
    pub textures: Vec<TestTexture>,
    pub skin_refs: Vec<i16>,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub vertex_bones: Vec<u8>,
    pub meshes: Vec<TestMesh>,
    pub sequences: Vec<TestSequence>,
}

impl TestFile {
    pub fn build(&self) -> Vec<u8> {
        let mut w = Writer::default();
        w.zeros(HEADER_SIZE);

        let bone_index = w.pos();
        for bone in &self.bones {
            w.name(&bone.name, 32);
            w.i32(bone.parent);
            w.i32(bone.flags);
            for _ in 0..6 { w.i32(-1); }
            for &v in &bone.value { w.f32(v); }
            for &v in &bone.scale { w.f32(v); }
        }

        let texture_index = w.pos();
        for tex in &self.textures {
            w.name(&tex.name, 64);
            w.i32(0);
            w.i32(tex.width);
            w.i32(tex.height);
            w.i32(0);
        }
        for (i, tex) in self.textures.iter().enumerate() {
            let data = w.pos();
            w.bytes(&tex.indices);
            w.bytes(&tex.palette);
            w.patch_i32(texture_index + i * TEXTURE_SIZE + 76, data as i32);
        }

        let skin_index = w.pos();
        for &s in &self.skin_refs { w.i16(s); }

        let vert_index = w.pos();
        for p in &self.positions { for &x in p { w.f32(x); } }
        let norm_index = w.pos();
        for n in &self.normals { for &x in n { w.f32(x); } }
        let vert_info_index = w.pos();
        w.bytes(&self.vertex_bones);

        let streams = self.meshes.iter()
            .map(|mesh| {
                let pos = w.pos();
                for &r in &mesh.stream { w.i16(r); }
                pos
            })
            .collect::<Vec<usize>>();

        let mesh_index = w.pos();
        for (mesh, &stream) in self.meshes.iter().zip(&streams) {
            w.i32(0);
            w.i32(stream as i32);
            w.i32(mesh.skin_ref);
            w.i32(0);
            w.i32(0);
        }

        let model_index = w.pos();
        w.name("body", 64);
        w.i32(0);
        w.f32(0.0);
        w.i32(self.meshes.len() as i32);
        w.i32(mesh_index as i32);
        w.i32(self.positions.len() as i32);
        w.i32(vert_info_index as i32);
        w.i32(vert_index as i32);
        w.i32(self.normals.len() as i32);
        w.i32(0);
        w.i32(norm_index as i32);
        w.i32(0);
        w.i32(0);

        let body_part_index = w.pos();
        w.name("studio", 64);
        w.i32(1);
        w.i32(1);
        w.i32(model_index as i32);

        let seq_index = w.pos();
        for seq in &self.sequences {
            let desc = w.pos();
            w.zeros(SEQ_DESC_SIZE);
            w.patch_bytes(desc, seq.name.as_bytes());
            w.patch_f32(desc + 32, seq.fps);
            w.patch_i32(desc + 56, seq.num_frames);
            w.patch_i32(desc + 120, 1);
            w.patch_i32(desc + 156, seq.seq_group);
        }
        for (i, seq) in self.sequences.iter().enumerate() {
            let anim = w.pos();
            w.zeros(ANIM_SIZE * self.bones.len());
            for &(bone, channel, ref spans) in &seq.anims {
                let rec = anim + bone * ANIM_SIZE;
                let data = w.pos();
                for &(valid, total, ref values) in spans {
                    w.u8(valid);
                    w.u8(total);
                    for &v in values { w.i16(v); }
                }
                w.patch_u16(rec + 2 * channel, (data - rec) as u16);
            }
            w.patch_i32(seq_index + i * SEQ_DESC_SIZE + 124, anim as i32);
        }

        let length = w.pos();
        w.patch_bytes(0, b"IDST");
        w.patch_i32(4, 10);
        w.patch_bytes(8, self.name.as_bytes());
        w.patch_i32(72, length as i32);
        w.patch_i32(140, self.bones.len() as i32);
        w.patch_i32(144, bone_index as i32);
        w.patch_i32(164, self.sequences.len() as i32);
        w.patch_i32(168, seq_index as i32);
        w.patch_i32(180, self.textures.len() as i32);
        w.patch_i32(184, texture_index as i32);
        w.patch_i32(192, self.skin_refs.len() as i32);
        w.patch_i32(196, 1);
        w.patch_i32(200, skin_index as i32);
        w.patch_i32(204, 1);
        w.patch_i32(208, body_part_index as i32);

        w.buf
    }
}
