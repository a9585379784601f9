//! All-or-nothing persistence of an artifact set
//!
//! Files are first written to a hidden staging directory next to their
//! destination and only moved into place once every file has been written.

use std::fs;
use std::path::{Path, PathBuf};

use rand::distr::Alphanumeric;
use rand::Rng;

use crate::codegen::{ArtifactSet, CodegenError};

impl ArtifactSet {
    /// Write every artifact into `dir`, creating it if needed
    ///
    /// Returns the paths written, in artifact order. Files of the same name
    /// from an earlier run are replaced. On failure the staging directory is
    /// removed, no artifact of this set is left in `dir`, and any earlier
    /// files that had already been replaced are put back.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, CodegenError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| CodegenError::io(dir, e))?;

        let staging = dir.join(staging_name());
        fs::create_dir(&staging).map_err(|e| CodegenError::io(&staging, e))?;
        tracing::debug!(staging = %staging.display(), "Staging {} artifacts", self.len());

        let result = self.stage(&staging).and_then(|_| self.publish(&staging, dir));
        if let Err(e) = fs::remove_dir_all(&staging) {
            tracing::warn!("Could not remove staging directory {}: {e}", staging.display());
        }
        let written = result?;
        tracing::info!("Wrote {} artifacts to {}", written.len(), dir.display());
        Ok(written)
    }

    fn stage(&self, staging: &Path) -> Result<(), CodegenError> {
        let previous = staging.join(PREVIOUS);
        fs::create_dir(&previous).map_err(|e| CodegenError::io(&previous, e))?;
        for artifact in self.iter() {
            let path = staging.join(&artifact.name);
            fs::write(&path, &artifact.contents).map_err(|e| CodegenError::io(&path, e))?;
        }
        Ok(())
    }

    fn publish(&self, staging: &Path, dir: &Path) -> Result<Vec<PathBuf>, CodegenError> {
        let mut landed = Publication::default();
        for artifact in self.iter() {
            let target = dir.join(&artifact.name);
            if let Err(e) = landed.replace(staging, &artifact.name, &target) {
                landed.rollback();
                return Err(e);
            }
        }
        Ok(landed.written)
    }
}

/// Subdirectory of the staging area holding files displaced from `dir`
const PREVIOUS: &str = "previous";

/// Files moved into place so far and the earlier files they displaced
#[derive(Default)]
struct Publication {
    written: Vec<PathBuf>,
    /// (backup in staging, original location)
    displaced: Vec<(PathBuf, PathBuf)>,
}

impl Publication {
    fn replace(&mut self, staging: &Path, name: &str, target: &Path) -> Result<(), CodegenError> {
        if target.is_file() {
            let backup = staging.join(PREVIOUS).join(name);
            fs::rename(target, &backup).map_err(|e| CodegenError::io(target, e))?;
            self.displaced.push((backup, target.to_path_buf()));
        }
        fs::rename(staging.join(name), target).map_err(|e| CodegenError::io(target, e))?;
        self.written.push(target.to_path_buf());
        Ok(())
    }

    /// Remove this run's files and restore the ones they replaced
    fn rollback(self) {
        for path in &self.written {
            if let Err(e) = fs::remove_file(path) {
                tracing::warn!("Could not remove partially written {}: {e}", path.display());
            }
        }
        for (backup, original) in &self.displaced {
            if let Err(e) = fs::rename(backup, original) {
                tracing::warn!("Could not restore {}: {e}", original.display());
            }
        }
    }
}

fn staging_name() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(5)
        .map(char::from)
        .collect();
    format!(".mechgen-{suffix}")
}
