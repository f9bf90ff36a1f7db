use crate::errors::Result;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Directory for putting output files in. Will be created lazily when the first
/// file is created.
pub struct OutDir {
    path: PathBuf,
    created: bool,
}

impl OutDir {
    pub fn new(path: PathBuf) -> OutDir {
        OutDir { path, created: false }
    }

    /// Path for `filename` inside the directory, creating the directory if
    /// this is the first file.
    pub fn file_path(&mut self, filename: &str) -> Result<PathBuf> {
        if !self.created {
            match fs::create_dir_all(&self.path) {
                Ok(()) => (),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => (),
                Err(e) => Err(e)?,
            }
            self.created = true;
        }
        Ok(self.path.join(filename))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
