//! Indexed-color textures.
//!
//! Each texture is `width * height` bytes of palette indices followed
//! immediately by its own 256-entry RGB palette.

use crate::errors::Result;
use crate::studio::header::Header;
use crate::util::cur::{at_offset, Cur};
use crate::util::name::Name;
use std::convert::TryFrom;

pub const TEXTURE_SIZE: usize = 80;
pub const PALETTE_SIZE: usize = 256 * 3;

pub struct Texture {
    pub name: Name,
    pub flags: i32,
    pub width: u32,
    pub height: u32,
    /// RGBA8, `width * height * 4` bytes.
    pub rgba: Vec<u8>,
}

pub fn read_textures(cur: Cur, hdr: &Header) -> Result<Vec<Texture>> {
    // Some models keep their textures in a separate "T" file. Those have no
    // texture table in the main file.
    if hdr.texture_index == 0 {
        if hdr.num_textures != 0 {
            info!("textures are stored in a separate file; skipping them");
        }
        return Ok(vec![]);
    }

    let table = at_offset(cur, hdr.texture_index)?;
    (0..hdr.num_textures)
        .map(|i| read_texture(cur, table + i * TEXTURE_SIZE))
        .collect()
}

fn read_texture(base: Cur, cur: Cur) -> Result<Texture> {
    fields!(cur, mstudiotexture {
        name: (name(64)),
        flags: i32,
        width: i32,
        height: i32,
        index: i32,
    });

    if width <= 0 || height <= 0 {
        bad_format!("texture {} has bad dimensions {}x{}", name, width, height);
    }
    let (width, height) = (width as u32, height as u32);

    let num_pixels = match (width as usize).checked_mul(height as usize) {
        Some(n) => n,
        None => out_of_range!("texture {} is too big: {}x{}", name, width, height),
    };
    let mut data = at_offset(base, index)?;
    let indices = data.next_n_u8s(num_pixels)?;
    let palette = data.next_n_u8s(PALETTE_SIZE)?;
    let palette = <&[u8; PALETTE_SIZE]>::try_from(palette)
        .map_err(|_| "palette slice has the wrong length")?;

    let rgba = decode_indexed(indices, palette);

    Ok(Texture { name, flags, width, height, rgba })
}

/// Converts palette indices to RGBA8 pixels. There is no transparency;
/// alpha is always 255.
pub fn decode_indexed(indices: &[u8], palette: &[u8; PALETTE_SIZE]) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(4 * indices.len());
    for &index in indices {
        let off = 3 * index as usize;
        rgba.extend_from_slice(&palette[off .. off + 3]);
        rgba.push(255);
    }
    rgba
}

#[cfg(test)]
fn nearest_index(rgb: &[u8], palette: &[u8; PALETTE_SIZE]) -> u8 {
    let dist = |i: usize| -> u32 {
        (0..3)
            .map(|c| {
                let d = rgb[c] as i32 - palette[3 * i + c] as i32;
                (d * d) as u32
            })
            .sum()
    };
    (0..256).min_by_key(|&i| dist(i)).unwrap() as u8
}

#[test]
fn test_palette_round_trip() {
    // A palette with a few duplicated entries so not every index is unique.
    let mut palette = [0u8; PALETTE_SIZE];
    for i in 0..256 {
        let j = if i % 17 == 5 { i - 1 } else { i };
        palette[3 * i] = (j * 7 % 256) as u8;
        palette[3 * i + 1] = (j * 13 % 256) as u8;
        palette[3 * i + 2] = j as u8;
    }
    let unique = |i: usize| {
        let entry = &palette[3 * i .. 3 * i + 3];
        (0..256).filter(|&k| &palette[3 * k .. 3 * k + 3] == entry).count() == 1
    };

    let (width, height) = (16, 16);
    let indices: Vec<u8> = (0..width * height).map(|i| (i * 31 % 256) as u8).collect();
    let rgba = decode_indexed(&indices, &palette);
    assert_eq!(rgba.len(), width * height * 4);

    for (i, &index) in indices.iter().enumerate() {
        let pixel = &rgba[4 * i .. 4 * i + 4];
        assert_eq!(pixel[3], 255);
        if unique(index as usize) {
            assert_eq!(nearest_index(&pixel[..3], &palette), index);
        }
    }
}

#[test]
fn test_decode_indexed() {
    let mut palette = [0u8; PALETTE_SIZE];
    palette[3..6].copy_from_slice(&[10, 20, 30]);
    palette[765..768].copy_from_slice(&[1, 2, 3]);
    let rgba = decode_indexed(&[1, 255, 0], &palette);
    assert_eq!(rgba, vec![10, 20, 30, 255, 1, 2, 3, 255, 0, 0, 0, 255]);
}
