use log::info;

use crate::config::FsConfig;
use crate::error::{FsError, FsResult};
use crate::fs::FileSystem;

/// Holds at most one file system for its whole lifetime. `mkfs` formats the volume
/// once, every other access goes through `fs`/`fs_mut` and fails until then.
#[derive(Default)]
pub struct Volume {
    fs: Option<FileSystem>,
}

impl Volume {
    pub fn new() -> Self {
        Self { fs: None }
    }

    /// Initializes the file system.
    ///
    /// # Errors
    ///
    /// Formatting a volume a second time returns `AlreadyInitialized` and leaves the
    /// existing file system in place. A configuration rejected by
    /// `FsConfig::validate` leaves the volume unformatted.
    pub fn mkfs(&mut self, config: FsConfig) -> FsResult<&mut FileSystem> {
        if self.fs.is_some() {
            return Err(FsError::AlreadyInitialized);
        }
        config.validate()?;
        info!(
            "File system initialized with {} file descriptors.",
            config.max_descriptors
        );
        Ok(self.fs.get_or_insert(FileSystem::new(config)))
    }

    pub fn is_initialized(&self) -> bool {
        self.fs.is_some()
    }

    pub fn fs(&self) -> FsResult<&FileSystem> {
        self.fs.as_ref().ok_or(FsError::NotInitialized)
    }

    pub fn fs_mut(&mut self) -> FsResult<&mut FileSystem> {
        self.fs.as_mut().ok_or(FsError::NotInitialized)
    }
}
