//! An in-memory model of a small Unix-like file system.
//!
//! Regular files are backed by descriptors owning fixed-size blocks, names live in
//! a directory tree with "." and ".." navigation, hard links share a descriptor and
//! symbolic links hold a path resolved at lookup time. Open files are tracked in a
//! table of handles, each with its own offset.
//!
//! ```
//! use memfs::{FileSystem, FsConfig};
//!
//! let mut fs = FileSystem::new(FsConfig::default());
//! fs.create("a.txt").unwrap();
//! let handle = fs.open("a.txt").unwrap();
//! assert_eq!(fs.write(handle, 5).unwrap(), 5);
//! assert_eq!(fs.read(handle, 5).unwrap(), vec![1; 5]);
//! ```
mod alloc;
pub mod block;
mod config;
pub mod descriptor;
mod error;
mod fs;
pub mod handle;
pub mod node;
pub mod path;
mod volume;

pub use crate::block::BLOCK_SIZE;
pub use crate::config::{FsConfig, FsConfigBuilder};
pub use crate::descriptor::{DescriptorId, FileDescriptor, MAX_DESCRIPTORS};
pub use crate::error::{FsError, FsResult};
pub use crate::fs::{DirEntry, FileSystem, Stat};
pub use crate::handle::HandleId;
pub use crate::node::FileType;
pub use crate::path::Lookup;
pub use crate::volume::Volume;
