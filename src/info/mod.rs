use clap::ArgMatches;
use crate::errors::Result;
use crate::primitives::batch::Batch;
use crate::studio::header::{read_header, Header};
use crate::studio::{read_model, Model};
use crate::util::cur::Cur;
use crate::util::read_file;
use std::path::Path;

pub fn main(matches: &ArgMatches) -> Result<()> {
    let path = Path::new(matches.value_of_os("INPUT").unwrap());
    let buf = read_file(path)?;

    let cur = Cur::new(&buf);
    let hdr = read_header(cur)?;
    let model = read_model(cur)?;

    header_info(&hdr);
    println!();
    bone_info(&model);
    texture_info(&model);
    mesh_info(&model);
    sequence_info(&model);

    Ok(())
}

fn header_info(hdr: &Header) {
    println!("Model: {:?}", hdr.name);
    println!("  Version: {}", hdr.version);
    println!("  Length: {} bytes", hdr.length);
    println!("  Eye Position: {:?}", hdr.eye_position);
    println!("  Flags: {:#x}", hdr.flags);
    println!("  Bone Controllers: {}", hdr.num_bone_controllers);
    println!("  Sequence Groups: {}", hdr.num_seq_groups);
    println!("  Skin Families: {}", hdr.num_skin_families);
    println!("  Body Parts: {}", hdr.num_body_parts);
    println!("  Attachments: {}", hdr.num_attachments);
}

fn bone_info(model: &Model) {
    println!("Bones ({} total):", model.bones.len());
    for (i, bone) in model.bones.iter().enumerate() {
        print!("  Bone {}: {:?}", i, bone.name);
        match bone.parent {
            Some(p) => print!(" (parent {:?})", model.bones[p].name),
            None => print!(" (root)"),
        }
        println!(" flags {:#x}", bone.flags);
    }
}

fn texture_info(model: &Model) {
    println!("Textures ({} total):", model.textures.len());
    for (i, tex) in model.textures.iter().enumerate() {
        println!("  Texture {}: {:?} {}x{} flags {:#x}",
            i, tex.name, tex.width, tex.height, tex.flags);
    }
}

fn mesh_info(model: &Model) {
    println!("Meshes ({} total):", model.meshes.len());
    for (i, mesh) in model.meshes.iter().enumerate() {
        print!("  Mesh {}: {} vertices, {} triangles, ",
            i, mesh.vertices.len(), mesh.indices.len() / 3);
        match mesh.texture {
            Some(t) => println!("texture {:?}", model.textures[t].name),
            None => println!("untextured"),
        }
    }

    let batch = Batch::build(&model.meshes);
    println!("  Batched: {} vertices, {} triangles, {} surfaces",
        batch.vertices.len(), batch.indices.len() / 3, batch.surfaces.len());
}

fn sequence_info(model: &Model) {
    println!("Sequences ({} total):", model.sequences.len());
    for (i, seq) in model.sequences.iter().enumerate() {
        println!("  Sequence {}: {:?} {} frames at {} fps",
            i, seq.name, seq.frames.len(), seq.fps);
    }
}
