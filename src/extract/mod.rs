//! Save the textures in a model as PNGs.

use clap::ArgMatches;
use crate::errors::{Result, ResultExt};
use crate::png;
use crate::studio::load_model;
use crate::util::{read_file, OutDir};
use std::path::{Path, PathBuf};

pub fn main(matches: &ArgMatches) -> Result<()> {
    let path = Path::new(matches.value_of_os("INPUT").unwrap());
    let buf = read_file(path)?;
    let model = load_model(&buf)?;

    let mut out_dir = OutDir::new(PathBuf::from(matches.value_of_os("OUTPUT").unwrap()));

    if model.textures.is_empty() {
        warn!("{} has no textures", path.display());
        return Ok(());
    }

    for (i, tex) in model.textures.iter().enumerate() {
        // Prefix with the index; texture names aren't necessarily unique.
        let filename = format!("{:02}_{}.png", i, tex.name.print_safe());
        let file_path = out_dir.file_path(&filename)?;
        png::write(&file_path, &tex.rgba, tex.width, tex.height)
            .chain_err(|| format!("couldn't write texture {:?}", tex.name))?;
        debug!("wrote {}", file_path.display());
    }

    info!("wrote {} textures to {}", model.textures.len(), out_dir.path().display());
    Ok(())
}
