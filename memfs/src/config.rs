use crate::descriptor::MAX_DESCRIPTORS;
use crate::error::{FsError, FsResult};

/// Tunables fixed for the lifetime of a file system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsConfig {
    /// The upper bound on regular files (descriptors) alive at the same time.
    pub max_descriptors: usize,
    /// Blocks handed to every newly created file.
    pub initial_blocks: usize,
    /// The byte pattern stored by `write`.
    pub fill_byte: u8,
    /// How many symbolic links a single lookup may expand before giving up.
    pub max_symlink_depth: usize,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            max_descriptors: 16,
            initial_blocks: 4,
            fill_byte: 1,
            max_symlink_depth: 40,
        }
    }
}

impl FsConfig {
    pub fn builder() -> FsConfigBuilder {
        FsConfigBuilder::default()
    }

    /// Checks that every descriptor the configuration promises can be given an id.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when `max_descriptors` exceeds `MAX_DESCRIPTORS`.
    pub fn validate(&self) -> FsResult<()> {
        if self.max_descriptors > MAX_DESCRIPTORS {
            return Err(FsError::InvalidArgument(format!(
                "{} descriptors requested, at most {} are supported",
                self.max_descriptors, MAX_DESCRIPTORS
            )));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FsConfigBuilder {
    config: FsConfig,
}

impl FsConfigBuilder {
    /// Sets the number of descriptors available to the file system.
    pub fn with_descriptors(mut self, descriptors: usize) -> Self {
        self.config.max_descriptors = descriptors;
        self
    }

    pub fn with_initial_blocks(mut self, blocks: usize) -> Self {
        self.config.initial_blocks = blocks;
        self
    }

    pub fn with_fill_byte(mut self, byte: u8) -> Self {
        self.config.fill_byte = byte;
        self
    }

    pub fn with_symlink_depth(mut self, depth: usize) -> Self {
        self.config.max_symlink_depth = depth;
        self
    }

    pub fn build(self) -> FsConfig {
        self.config
    }
}
