use crate::errors::Result;
use pnglib::{BitDepth, ColorType, Encoder};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Writes `rgba` (RGBA8, row-major, top row first) to a PNG file.
pub fn write(path: &Path, rgba: &[u8], width: u32, height: u32) -> Result<()> {
    check!(rgba.len() as u64 == 4 * width as u64 * height as u64)?;

    let fout = BufWriter::new(File::create(path)?);
    let mut enc = Encoder::new(fout, width, height);
    enc.set_color(ColorType::RGBA);
    enc.set_depth(BitDepth::Eight);
    let mut writer = enc.write_header()?;
    writer.write_image_data(rgba)?;
    Ok(())
}
