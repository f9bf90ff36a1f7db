//! More-or-less general-purpose utility functions.

pub mod cur;
#[macro_use]
pub mod fields;
pub mod name;
pub mod out_dir;
pub mod view;

pub use self::out_dir::OutDir;

use crate::errors::Result;
use std::path::Path;

pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    use std::{fs::File, io::Read};
    let mut f = File::open(&path)?;
    let mut b: Vec<u8> = vec![];
    f.read_to_end(&mut b)?;
    Ok(b)
}
