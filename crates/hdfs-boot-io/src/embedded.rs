//! In-process filesystem service for the local profile.
//!
//! The cluster is rooted at a base directory. When no directory is given a
//! fresh temporary one is synthesized and owned by the cluster, so it is
//! removed when the cluster is dropped on every exit path. An explicit
//! directory is never removed and can be shared across runs.

use std::path::{Path, PathBuf};

use hdfs_boot_types::error::Result;
use tempfile::TempDir;

use crate::local_fs::{absolutize, LocalFileSystem};

pub struct EmbeddedCluster {
    base_dir: PathBuf,
    _temp: Option<TempDir>,
}

impl EmbeddedCluster {
    /// Start a cluster rooted at `base_dir`, or at a fresh temporary
    /// directory when `None`. The base directory exists afterwards.
    pub fn start(base_dir: Option<&Path>) -> Result<Self> {
        let (base_dir, temp) = match base_dir {
            Some(dir) => {
                let dir = absolutize(dir)?;
                std::fs::create_dir_all(&dir)?;
                (dir, None)
            }
            None => {
                let temp = tempfile::Builder::new().prefix("hdfs-boot-embedded").tempdir()?;
                (absolutize(temp.path())?, Some(temp))
            }
        };
        log::info!("Embedded filesystem started at {}", base_dir.display());
        Ok(EmbeddedCluster {
            base_dir,
            _temp: temp,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Whether the base directory is removed on drop.
    pub fn is_ephemeral(&self) -> bool {
        self._temp.is_some()
    }

    /// A fresh client of this cluster, working directory at the base.
    pub fn file_system(&self) -> Result<LocalFileSystem> {
        LocalFileSystem::rooted_at(&self.base_dir)
    }
}

impl Drop for EmbeddedCluster {
    fn drop(&mut self) {
        if self.is_ephemeral() {
            log::debug!("Embedded filesystem at {} shutting down", self.base_dir.display());
        }
    }
}
