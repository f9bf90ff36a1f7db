//! Load GoldSrc studio models (.mdl).
//!
//! A studio model is one little-endian file (magic `IDST`, version 10). All
//! the tables in it are found through offsets from the start of the file
//! stored in the header, so we read it with a `Cur` over the whole buffer and
//! jump around as needed.
//!
//! Decoding is all-or-nothing: any error means no `Model`. Once loaded, a
//! `Model` owns all its data and doesn't refer back to the buffer.

pub mod animation;
pub mod bone;
pub mod header;
pub mod mesh;
pub mod rotation;
pub mod texture;
#[cfg(test)]
pub mod test_file;

pub use self::animation::{Frame, Sequence};
pub use self::bone::Bone;
pub use self::mesh::Mesh;
pub use self::texture::Texture;

use crate::errors::Result;
use crate::util::cur::Cur;
use crate::util::name::Name;

pub struct Model {
    pub name: Name,
    /// Parents always come before their children.
    pub bones: Vec<Bone>,
    pub textures: Vec<Texture>,
    pub meshes: Vec<Mesh>,
    pub sequences: Vec<Sequence>,
}

pub fn load_model(buf: &[u8]) -> Result<Model> {
    read_model(Cur::new(buf))
}

pub fn read_model(cur: Cur) -> Result<Model> {
    use self::animation::read_sequences;
    use self::bone::read_bones;
    use self::header::read_header;
    use self::mesh::read_meshes;
    use self::texture::read_textures;

    let hdr = read_header(cur)?;
    info!("model {} (version {}, {} bytes)", hdr.name, hdr.version, hdr.length);

    // Nothing past the declared length belongs to the model.
    let cur = Cur::new(&cur.buf()[..hdr.length]);

    let bones = read_bones(cur, &hdr)?;
    let textures = read_textures(cur, &hdr)?;
    let meshes = read_meshes(cur, &hdr, &textures)?;
    let sequences = read_sequences(cur, &hdr, &bones)?;

    debug!("{} bones, {} textures, {} meshes, {} sequences",
        bones.len(), textures.len(), meshes.len(), sequences.len());

    Ok(Model {
        name: hdr.name,
        bones,
        textures,
        meshes,
        sequences,
    })
}

#[cfg(test)]
use self::test_file::{TestBone, TestFile, TestMesh, TestSequence, TestTexture};

#[cfg(test)]
fn is_out_of_range(res: Result<Model>) -> bool {
    use crate::errors::ErrorKind;
    match res {
        Err(e) => match e.kind() {
            ErrorKind::OutOfRange(_) => true,
            _ => false,
        },
        Ok(_) => false,
    }
}

#[cfg(test)]
fn is_format_error(res: Result<Model>) -> bool {
    use crate::errors::ErrorKind;
    match res {
        Err(e) => match e.kind() {
            ErrorKind::Format(_) => true,
            _ => false,
        },
        Ok(_) => false,
    }
}

#[cfg(test)]
fn sample_file() -> TestFile {
    let mut palette = vec![0u8; 768];
    palette[3..6].copy_from_slice(&[255, 0, 0]);
    palette[6..9].copy_from_slice(&[0, 0, 255]);

    let mut head = TestBone::new("head", 1, [0.0, 0.0, 5.0]);
    head.flags = 0x200;

    TestFile {
        name: "soldier".into(),
        bones: vec![
            TestBone::new("root", -1, [0.0, 0.0, 0.0]),
            TestBone::new("spine", 0, [0.0, 0.0, 10.0]),
            head,
        ],
        textures: vec![TestTexture {
            name: "skin.bmp".into(),
            width: 2,
            height: 2,
            indices: vec![0, 1, 2, 1],
            palette,
        }],
        skin_refs: vec![0],
        positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
        normals: vec![[0.0, 0.0, 1.0]],
        vertex_bones: vec![0, 1, 2, 2],
        meshes: vec![
            TestMesh {
                skin_ref: 0,
                stream: vec![-4, 0, 0, 0, 0, 1, 0, 2, 0, 2, 0, 2, 2, 3, 0, 0, 2, 0],
            },
            TestMesh {
                skin_ref: 5,
                stream: vec![3, 3, 0, 32, 0, 2, 0, 0, 0, 1, 0, 0, 0, 0],
            },
        ],
        sequences: vec![TestSequence {
            name: "idle".into(),
            fps: 10.0,
            num_frames: 3,
            seq_group: 0,
            // Bone 1 moves along x: 0, 2, 2 (scale 1), and turns about z.
            anims: vec![
                (1, 0, vec![(2, 3, vec![0, 2])]),
                (1, 5, vec![(3, 3, vec![0, 100, 200])]),
            ],
        }],
    }
}

#[test]
fn test_load_sample() {
    let buf = sample_file().build();
    let model = load_model(&buf).unwrap();

    assert_eq!(model.name.to_string(), "soldier");

    assert_eq!(model.bones.len(), 3);
    assert_eq!(model.bones[0].parent, None);
    assert_eq!(model.bones[2].parent, Some(1));
    assert_eq!(model.bones[2].name.to_string(), "head");
    assert_eq!(model.bones[2].flags, 0x200);

    assert_eq!(model.textures.len(), 1);
    let tex = &model.textures[0];
    assert_eq!((tex.width, tex.height), (2, 2));
    assert_eq!(&tex.rgba[4..8], &[255, 0, 0, 255]);
    assert_eq!(&tex.rgba[8..12], &[0, 0, 255, 255]);

    assert_eq!(model.meshes.len(), 2);
    let mesh = &model.meshes[0];
    assert_eq!(mesh.texture, Some(0));
    assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
    assert_eq!(mesh.vertices[2].texcoord, [1.0, 1.0]);
    assert_eq!(mesh.vertices[3].bone, 2);
    // Skin reference past the table: untextured, 64x64 texcoords.
    let mesh = &model.meshes[1];
    assert_eq!(mesh.texture, None);
    assert_eq!(mesh.vertices[0].texcoord, [0.5, 0.0]);
    assert_eq!(mesh.indices, vec![0, 1, 2]);

    assert_eq!(model.sequences.len(), 1);
    let seq = &model.sequences[0];
    assert_eq!(seq.name.to_string(), "idle");
    assert_eq!(seq.fps, 10.0);
    assert_eq!(seq.ground_speed, 0.0);
    assert_eq!(seq.frames.len(), 3);
    let xs = seq.frames.iter().map(|f| f.positions[1].x).collect::<Vec<_>>();
    assert_eq!(xs, vec![0.0, 2.0, 2.0]);
    for frame in &seq.frames {
        assert_eq!(frame.positions.len(), 3);
        assert_eq!(frame.rotations.len(), 3);
        // Rest values for unanimated channels.
        assert_eq!(frame.positions[1].z, 10.0);
        assert_eq!(frame.positions[2].z, 5.0);
    }
    // 100 * 0.01 radians about z.
    let q = seq.frames[1].rotations[1];
    assert!((q.s - 0.5f32.cos()).abs() < 1e-6);
    assert!((q.v.z - 0.5f32.sin()).abs() < 1e-6);
}

#[test]
fn test_trailing_data_is_ignored() {
    let mut buf = sample_file().build();
    buf.extend_from_slice(&[0xcd; 32]);
    assert!(load_model(&buf).is_ok());
}

#[test]
fn test_bad_header() {
    let mut buf = sample_file().build();
    buf[0] = b'X';
    assert!(is_format_error(load_model(&buf)));

    let mut buf = sample_file().build();
    buf[4] = 6;
    assert!(is_format_error(load_model(&buf)));

    // Declared length longer than the buffer.
    let buf = sample_file().build();
    assert!(is_format_error(load_model(&buf[..buf.len() - 1])));

    assert!(load_model(&buf[..100]).is_err());
}

#[test]
fn test_parent_must_come_first() {
    let mut file = sample_file();
    file.bones[1].parent = 2;
    assert!(is_format_error(load_model(&file.build())));

    let mut file = sample_file();
    file.bones[1].parent = 7;
    assert!(is_out_of_range(load_model(&file.build())));
}

#[test]
fn test_bad_skin_reference() {
    let mut file = sample_file();
    file.skin_refs = vec![3];
    assert!(is_out_of_range(load_model(&file.build())));
}

#[test]
fn test_bad_mesh_stream() {
    let mut file = sample_file();
    // Vertex 9 doesn't exist.
    file.meshes[1].stream = vec![3, 9, 0, 0, 0, 2, 0, 0, 0, 1, 0, 0, 0, 0];
    assert!(is_out_of_range(load_model(&file.build())));
}

#[test]
fn test_huge_counts_are_rejected() {
    // Sequence count far past what the file can hold.
    let mut buf = sample_file().build();
    buf[164..168].copy_from_slice(&i32::max_value().to_le_bytes());
    assert!(is_out_of_range(load_model(&buf)));

    // Frames that read nothing from the file can't be checked against its
    // size; they're capped instead.
    let mut file = sample_file();
    file.sequences[0].anims = vec![];
    file.sequences[0].num_frames = i32::max_value();
    assert!(is_format_error(load_model(&file.build())));
}

#[test]
fn test_external_sequence_group_is_skipped() {
    let mut file = sample_file();
    let mut seq = file.sequences[0].clone();
    seq.name = "walk".into();
    seq.seq_group = 1;
    file.sequences.push(seq);

    let model = load_model(&file.build()).unwrap();
    assert_eq!(model.sequences.len(), 1);
    assert_eq!(model.sequences[0].name.to_string(), "idle");
}
