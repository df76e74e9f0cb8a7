use log::{debug, info, warn};

use crate::config::FsConfig;
use crate::descriptor::{DescriptorGroup, DescriptorId, FileDescriptor};
use crate::error::{FsError, FsResult};
use crate::handle::{HandleId, OpenFileTable};
use crate::node::{FileType, Node, NodeGroup, NodeId, NodeKind, CURRENT_DIR, PARENT_DIR, ROOT_NAME};
use crate::path::{Lookup, PathResolver};

/// One line of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub file_type: FileType,
    /// The stored path of a symbolic link.
    pub target: Option<String>,
}

/// What `stat` knows about a node. Size, block and link counts come from the
/// descriptor of a regular file and are zero for directories and links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
    pub name: String,
    pub file_type: FileType,
    pub descriptor: Option<DescriptorId>,
    pub size: usize,
    pub blocks: usize,
    pub links: usize,
    pub target: Option<String>,
}

/// An in-memory file system: a directory tree, the descriptors backing its regular
/// files and the table of open handles.
///
/// # Ownership
/// ==============================================================================
/// | Directory --children--> Node --descriptor id--> FileDescriptor --> Blocks |
/// | OpenFile --descriptor id--> FileDescriptor (shared, never owning)         |
/// ==============================================================================
///
/// A descriptor lives as long as at least one regular file node names it.
pub struct FileSystem {
    config: FsConfig,
    nodes: NodeGroup,
    current: NodeId,
    descriptors: DescriptorGroup,
    open_files: OpenFileTable,
}

impl FileSystem {
    /// Creates an empty file system holding only the root directory.
    pub fn new(config: FsConfig) -> Self {
        let nodes = NodeGroup::new();
        let current = nodes.root();
        let descriptors = DescriptorGroup::new(config.max_descriptors, config.initial_blocks);
        Self {
            config,
            nodes,
            current,
            descriptors,
            open_files: OpenFileTable::new(),
        }
    }

    pub fn config(&self) -> &FsConfig {
        &self.config
    }

    /// Resolves `path` against the current directory.
    pub fn resolve(&self, path: &str, follow: bool) -> FsResult<Lookup> {
        PathResolver::new(&self.nodes, self.config.max_symlink_depth).resolve(
            self.current,
            path,
            follow,
        )
    }

    /// Describes the node at `path`. A symbolic link is described itself, not
    /// followed.
    pub fn stat(&self, path: &str) -> FsResult<Stat> {
        let lookup = self.resolve(path, false)?;
        let id = lookup
            .target
            .ok_or_else(|| FsError::NotFound(path.to_string()))?;
        let node = self.node(id)?;

        let mut stat = Stat {
            name: node.name().to_string(),
            file_type: node.file_type(),
            descriptor: None,
            size: 0,
            blocks: 0,
            links: 0,
            target: None,
        };
        match node.kind() {
            NodeKind::Regular { descriptor } => {
                if let Some(fd) = self.descriptors.get(*descriptor) {
                    stat.descriptor = Some(fd.id());
                    stat.size = fd.size();
                    stat.blocks = fd.block_count();
                    stat.links = fd.links();
                }
            }
            NodeKind::Symlink { target } => stat.target = Some(target.clone()),
            NodeKind::Directory { .. } => {}
        }
        Ok(stat)
    }

    /// Lists the current directory, synthetic entries first.
    pub fn list(&self) -> Vec<DirEntry> {
        self.entries(self.current)
    }

    /// Lists the directory at `path`, following a symbolic link to it.
    pub fn list_at(&self, path: &str) -> FsResult<Vec<DirEntry>> {
        let dir = self.directory_at(path)?;
        Ok(self.entries(dir))
    }

    fn entries(&self, dir: NodeId) -> Vec<DirEntry> {
        let mut entries: Vec<DirEntry> = [CURRENT_DIR, PARENT_DIR]
            .iter()
            .map(|name| DirEntry {
                name: name.to_string(),
                file_type: FileType::Directory,
                target: None,
            })
            .collect();
        entries.extend(
            self.nodes
                .children(dir)
                .iter()
                .filter_map(|&id| self.nodes.get(id))
                .map(|node| DirEntry {
                    name: node.name().to_string(),
                    file_type: node.file_type(),
                    target: match node.kind() {
                        NodeKind::Symlink { target } => Some(target.clone()),
                        _ => None,
                    },
                }),
        );
        entries
    }

    /// Creates an empty regular file backed by a fresh descriptor. A symbolic link
    /// in the final position is followed, so the file is created where it points.
    ///
    /// # Errors
    ///
    /// `AlreadyExists` if the name is taken, `NoDescriptorsAvailable` once the
    /// configured number of descriptors is in use.
    pub fn create(&mut self, path: &str) -> FsResult<DescriptorId> {
        let lookup = self.vacant(path, true)?;
        let descriptor = self.descriptors.allocate()?;
        self.nodes
            .attach(lookup.parent, Node::regular(&lookup.name, descriptor));
        info!("Created file \"{}\" with descriptor {}.", path, descriptor);
        Ok(descriptor)
    }

    pub fn mkdir(&mut self, path: &str) -> FsResult<()> {
        let lookup = self.vacant(path, false)?;
        self.nodes
            .attach(lookup.parent, Node::directory(&lookup.name, Some(lookup.parent)));
        info!("Created directory \"{}\".", path);
        Ok(())
    }

    /// Removes a directory together with everything below it. Descriptors only
    /// referenced from inside the removed subtree are freed.
    pub fn rmdir(&mut self, path: &str) -> FsResult<()> {
        let lookup = self.resolve(path, false)?;
        if lookup.name == CURRENT_DIR || lookup.name == PARENT_DIR {
            return Err(FsError::InvalidArgument(format!(
                "cannot remove \"{}\"",
                lookup.name
            )));
        }
        let id = lookup
            .target
            .ok_or_else(|| FsError::NotFound(path.to_string()))?;
        if id == self.nodes.root() {
            return Err(FsError::InvalidArgument(
                "cannot remove the root directory".to_string(),
            ));
        }
        self.expect_type(id, FileType::Directory)?;

        let parent = self.nodes.parent(id);
        if self.nodes.is_within(self.current, id) {
            debug!("Current directory removed, moving up to node {}.", parent);
            self.current = parent;
        }

        let removed = self.nodes.detach(parent, id);
        for node in &removed {
            if let NodeKind::Regular { descriptor } = node.kind() {
                self.release(*descriptor);
            }
        }
        info!("Removed directory \"{}\" ({} nodes).", path, removed.len());
        Ok(())
    }

    /// Changes the current directory. On failure the current directory is kept.
    pub fn cd(&mut self, path: &str) -> FsResult<()> {
        if path == ROOT_NAME {
            self.current = self.nodes.root();
            return Ok(());
        }
        self.current = self.directory_at(path)?;
        Ok(())
    }

    /// Renders the absolute path of the current directory.
    pub fn pwd(&self) -> String {
        let root = self.nodes.root();
        let mut names = Vec::new();
        let mut cursor = self.current;
        while cursor != root {
            if let Some(node) = self.nodes.get(cursor) {
                names.push(node.name());
            }
            cursor = self.nodes.parent(cursor);
        }
        names.reverse();
        format!("{}{}", ROOT_NAME, names.join("/"))
    }

    /// Opens the regular file at `path` with its offset at zero.
    pub fn open(&mut self, path: &str) -> FsResult<HandleId> {
        let descriptor = self.regular_file(path)?;
        let handle = self.open_files.open(descriptor)?;
        debug!("Opened \"{}\" as handle {}.", path, handle);
        Ok(handle)
    }

    pub fn close(&mut self, handle: HandleId) -> FsResult<()> {
        self.open_files.close(handle)
    }

    /// Sets the offset of a handle. Offsets past the end of the file are only
    /// rejected by the next read or write.
    pub fn seek(&mut self, handle: HandleId, offset: usize) -> FsResult<()> {
        self.open_files.seek(handle, offset)
    }

    /// Reads up to `len` bytes at the handle's offset. The offset is left where it
    /// is, callers move it with `seek`.
    pub fn read(&self, handle: HandleId, len: usize) -> FsResult<Vec<u8>> {
        let open = self.open_files.get(handle)?;
        self.descriptors
            .get(open.descriptor())
            .ok_or(FsError::UnknownHandle(handle))?
            .read_at(open.offset(), len)
    }

    /// Writes `len` copies of the fill byte at the handle's offset, stopping at the
    /// end of the file. Returns the number of bytes written. The offset is left
    /// where it is.
    pub fn write(&mut self, handle: HandleId, len: usize) -> FsResult<usize> {
        let (offset, descriptor) = {
            let open = self.open_files.get(handle)?;
            (open.offset(), open.descriptor())
        };
        let pattern = self.config.fill_byte;
        self.descriptors
            .get_mut(descriptor)
            .ok_or(FsError::UnknownHandle(handle))?
            .write_at(offset, len, pattern)
    }

    /// Grows or shrinks the regular file at `path` to `size` bytes.
    pub fn truncate(&mut self, path: &str, size: usize) -> FsResult<()> {
        let descriptor = self.regular_file(path)?;
        if let Some(fd) = self.descriptors.get_mut(descriptor) {
            fd.resize(size);
        }
        info!("Truncated \"{}\" to {} bytes.", path, size);
        Ok(())
    }

    /// Adds `new_path` as another name for the regular file at `path`.
    pub fn link(&mut self, path: &str, new_path: &str) -> FsResult<()> {
        let descriptor = self.regular_file(path)?;
        let lookup = self.vacant(new_path, false)?;

        self.descriptors.link(descriptor);
        self.nodes
            .attach(lookup.parent, Node::regular(&lookup.name, descriptor));
        info!(
            "Linked \"{}\" to \"{}\" (descriptor {}).",
            new_path, path, descriptor
        );
        Ok(())
    }

    /// Removes a regular file or a symbolic link. The link itself is removed, never
    /// its target.
    pub fn unlink(&mut self, path: &str) -> FsResult<()> {
        let lookup = self.resolve(path, false)?;
        let id = lookup
            .target
            .ok_or_else(|| FsError::NotFound(path.to_string()))?;

        let descriptor = match self.node(id)?.kind() {
            NodeKind::Regular { descriptor } => Some(*descriptor),
            NodeKind::Symlink { .. } => None,
            NodeKind::Directory { .. } => {
                return Err(FsError::WrongType {
                    expected: FileType::Regular,
                    found: FileType::Directory,
                })
            }
        };

        self.nodes.detach(lookup.parent, id);
        if let Some(descriptor) = descriptor {
            self.release(descriptor);
        }
        info!("Unlinked \"{}\".", path);
        Ok(())
    }

    /// Creates a symbolic link at `path` storing `target` verbatim.
    pub fn symlink(&mut self, path: &str, target: &str) -> FsResult<()> {
        if target.is_empty() {
            return Err(FsError::InvalidArgument("empty symlink target".to_string()));
        }
        let lookup = self.vacant(path, false)?;
        self.nodes
            .attach(lookup.parent, Node::symlink(&lookup.name, target));
        info!("Created symlink \"{}\" -> \"{}\".", path, target);
        Ok(())
    }

    pub fn descriptor(&self, id: DescriptorId) -> Option<&FileDescriptor> {
        self.descriptors.get(id)
    }

    pub fn descriptors_in_use(&self) -> usize {
        self.descriptors.len()
    }

    pub fn open_handles(&self) -> usize {
        self.open_files.len()
    }

    fn node(&self, id: NodeId) -> FsResult<&Node> {
        self.nodes
            .get(id)
            .ok_or_else(|| FsError::NotFound(format!("node {}", id)))
    }

    /// Resolves `path` and insists nothing is there yet.
    fn vacant(&self, path: &str, follow: bool) -> FsResult<Lookup> {
        let lookup = self.resolve(path, follow)?;
        if lookup.target.is_some() {
            return Err(FsError::AlreadyExists(path.to_string()));
        }
        Ok(lookup)
    }

    /// Resolves `path`, following links, to the descriptor of a regular file.
    fn regular_file(&self, path: &str) -> FsResult<DescriptorId> {
        let id = self
            .resolve(path, true)?
            .target
            .ok_or_else(|| FsError::NotFound(path.to_string()))?;
        let node = self.node(id)?;
        match node.kind() {
            NodeKind::Regular { descriptor } => Ok(*descriptor),
            _ => Err(FsError::WrongType {
                expected: FileType::Regular,
                found: node.file_type(),
            }),
        }
    }

    fn directory_at(&self, path: &str) -> FsResult<NodeId> {
        let id = self
            .resolve(path, true)?
            .target
            .ok_or_else(|| FsError::NotFound(path.to_string()))?;
        if self.node(id)?.is_directory() {
            Ok(id)
        } else {
            Err(FsError::NotADirectory(path.to_string()))
        }
    }

    fn expect_type(&self, id: NodeId, expected: FileType) -> FsResult<()> {
        let found = self.node(id)?.file_type();
        if found != expected {
            return Err(FsError::WrongType { expected, found });
        }
        Ok(())
    }

    /// Drops one name from a descriptor. Handles left open on a freed descriptor are
    /// closed with it.
    fn release(&mut self, descriptor: DescriptorId) {
        if self.descriptors.unlink(descriptor) {
            let dropped = self.open_files.invalidate(descriptor);
            if dropped > 0 {
                warn!(
                    "Descriptor {} freed with {} open handle(s), handles closed.",
                    descriptor, dropped
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BLOCK_SIZE;

    fn fs() -> FileSystem {
        FileSystem::new(FsConfig::default())
    }

    fn names(entries: &[DirEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn fresh_root_lists_synthetic_entries() {
        let fs = fs();
        assert_eq!(names(&fs.list()), vec![".", ".."]);
        assert_eq!(fs.pwd(), "/");
    }

    #[test]
    fn created_file_appears_in_listing() {
        let mut fs = fs();
        fs.create("a.txt").unwrap();
        fs.create("/b.txt").unwrap();

        let entries = fs.list();
        assert_eq!(names(&entries), vec![".", "..", "a.txt", "b.txt"]);
        assert_eq!(entries[2].file_type, FileType::Regular);
    }

    #[test]
    fn create_rejects_existing_name() {
        let mut fs = fs();
        fs.create("a.txt").unwrap();
        assert_eq!(
            fs.create("a.txt").unwrap_err(),
            FsError::AlreadyExists("a.txt".to_string())
        );
        assert_eq!(fs.descriptors_in_use(), 1);
    }

    #[test]
    fn create_fails_at_capacity() {
        let mut fs = FileSystem::new(FsConfig::builder().with_descriptors(2).build());
        fs.create("a").unwrap();
        fs.create("b").unwrap();

        assert_eq!(
            fs.create("c").unwrap_err(),
            FsError::NoDescriptorsAvailable(2)
        );
        assert_eq!(names(&fs.list()), vec![".", "..", "a", "b"]);
    }

    #[test]
    fn create_in_nested_directory() {
        let mut fs = fs();
        fs.mkdir("/d").unwrap();
        fs.mkdir("d/e").unwrap();
        fs.create("d/e/f").unwrap();

        assert_eq!(names(&fs.list_at("/d/e").unwrap()), vec![".", "..", "f"]);
        assert_eq!(
            fs.create("missing/f").unwrap_err(),
            FsError::NotFound("missing/f".to_string())
        );
    }

    #[test]
    fn mkdir_on_existing_name_changes_nothing() {
        let mut fs = fs();
        fs.mkdir("d").unwrap();
        fs.create("d/f").unwrap();

        assert_eq!(
            fs.mkdir("d").unwrap_err(),
            FsError::AlreadyExists("d".to_string())
        );
        assert_eq!(names(&fs.list_at("d").unwrap()), vec![".", "..", "f"]);
        assert!(fs.mkdir(".").is_err());
    }

    #[test]
    fn cd_and_pwd() {
        let mut fs = fs();
        fs.mkdir("d").unwrap();
        fs.cd("d").unwrap();
        assert_eq!(fs.pwd(), "/d");

        fs.mkdir("e").unwrap();
        fs.cd("e").unwrap();
        assert_eq!(fs.pwd(), "/d/e");

        fs.cd("..").unwrap();
        assert_eq!(fs.pwd(), "/d");
        fs.cd("/").unwrap();
        assert_eq!(fs.pwd(), "/");
    }

    #[test]
    fn failed_cd_keeps_current_directory() {
        let mut fs = fs();
        fs.mkdir("d").unwrap();
        fs.create("f").unwrap();
        fs.cd("d").unwrap();

        assert!(matches!(fs.cd("/nope"), Err(FsError::NotFound(_))));
        assert!(matches!(fs.cd("/f"), Err(FsError::NotADirectory(_))));
        assert_eq!(fs.pwd(), "/d");
    }

    #[test]
    fn cd_through_symlink() {
        let mut fs = fs();
        fs.mkdir("/a").unwrap();
        fs.mkdir("/a/b").unwrap();
        fs.symlink("/short", "/a/b").unwrap();

        fs.cd("short").unwrap();
        assert_eq!(fs.pwd(), "/a/b");
    }

    #[test]
    fn rmdir_removes_subtree_and_frees_descriptors() {
        let mut fs = fs();
        fs.mkdir("d").unwrap();
        fs.mkdir("d/e").unwrap();
        fs.create("d/e/f").unwrap();
        fs.create("d/g").unwrap();
        fs.create("keep").unwrap();
        assert_eq!(fs.descriptors_in_use(), 3);

        fs.rmdir("d").unwrap();

        assert_eq!(names(&fs.list()), vec![".", "..", "keep"]);
        assert_eq!(fs.descriptors_in_use(), 1);
    }

    #[test]
    fn rmdir_keeps_descriptors_linked_from_outside() {
        let mut fs = fs();
        fs.mkdir("d").unwrap();
        fs.create("d/f").unwrap();
        fs.link("d/f", "outside").unwrap();

        fs.rmdir("d").unwrap();

        let h = fs.open("outside").unwrap();
        assert_eq!(fs.read(h, 4).unwrap().len(), 4);
        assert_eq!(fs.descriptors_in_use(), 1);
    }

    #[test]
    fn rmdir_of_current_directory_moves_up() {
        let mut fs = fs();
        fs.mkdir("d").unwrap();
        fs.mkdir("d/e").unwrap();
        fs.cd("d/e").unwrap();

        fs.rmdir("/d").unwrap();

        assert_eq!(fs.pwd(), "/");
    }

    #[test]
    fn rmdir_rejects_files_root_and_dots() {
        let mut fs = fs();
        fs.create("f").unwrap();

        assert_eq!(
            fs.rmdir("f").unwrap_err(),
            FsError::WrongType {
                expected: FileType::Directory,
                found: FileType::Regular,
            }
        );
        assert!(matches!(fs.rmdir("/"), Err(FsError::InvalidArgument(_))));
        assert!(matches!(fs.rmdir("."), Err(FsError::InvalidArgument(_))));
        assert!(matches!(fs.rmdir("nope"), Err(FsError::NotFound(_))));
    }

    #[test]
    fn rmdir_of_parent_entry_is_rejected() {
        let mut fs = fs();
        fs.mkdir("d").unwrap();
        fs.mkdir("d/e").unwrap();
        fs.cd("d/e").unwrap();

        assert!(matches!(fs.rmdir(".."), Err(FsError::InvalidArgument(_))));
        assert!(matches!(fs.rmdir("/d/.."), Err(FsError::InvalidArgument(_))));
        assert_eq!(fs.pwd(), "/d/e");
        assert_eq!(fs.stat("/d").unwrap().file_type, FileType::Directory);
    }

    #[test]
    fn new_file_is_full_of_zeros() {
        let mut fs = fs();
        fs.create("f").unwrap();
        let h = fs.open("f").unwrap();

        let data = fs.read(h, 100).unwrap();
        assert_eq!(data, vec![0; 4 * BLOCK_SIZE]);
    }

    #[test]
    fn write_then_read_back() {
        let mut fs = fs();
        fs.create("f").unwrap();
        let h = fs.open("f").unwrap();

        assert_eq!(fs.write(h, 5).unwrap(), 5);
        fs.seek(h, 0).unwrap();
        assert_eq!(fs.read(h, 5).unwrap(), vec![1; 5]);
    }

    #[test]
    fn read_and_write_leave_offset_alone() {
        let mut fs = fs();
        fs.create("f").unwrap();
        let h = fs.open("f").unwrap();
        fs.seek(h, 30).unwrap();

        fs.write(h, 10).unwrap();
        fs.read(h, 10).unwrap();

        assert_eq!(fs.read(h, 10).unwrap(), vec![1; 10]);
        fs.seek(h, 0).unwrap();
        assert_eq!(fs.read(h, 30).unwrap(), vec![0; 30]);
    }

    #[test]
    fn offset_past_end_is_rejected_on_io() {
        let mut fs = fs();
        fs.create("f").unwrap();
        let h = fs.open("f").unwrap();

        fs.seek(h, 65).unwrap();
        assert_eq!(
            fs.read(h, 1).unwrap_err(),
            FsError::OffsetOutOfRange { offset: 65, size: 64 }
        );
        assert!(fs.write(h, 1).is_err());

        fs.seek(h, 64).unwrap();
        assert!(fs.read(h, 1).unwrap().is_empty());
        assert_eq!(fs.write(h, 1).unwrap(), 0);
    }

    #[test]
    fn unknown_handles_are_reported() {
        let mut fs = fs();
        assert_eq!(fs.close(9).unwrap_err(), FsError::UnknownHandle(9));
        assert_eq!(fs.seek(9, 0).unwrap_err(), FsError::UnknownHandle(9));
        assert_eq!(fs.read(9, 1).unwrap_err(), FsError::UnknownHandle(9));
        assert_eq!(fs.write(9, 1).unwrap_err(), FsError::UnknownHandle(9));
    }

    #[test]
    fn open_rejects_missing_and_non_regular() {
        let mut fs = fs();
        fs.mkdir("d").unwrap();

        assert!(matches!(fs.open("nope"), Err(FsError::NotFound(_))));
        assert_eq!(
            fs.open("d").unwrap_err(),
            FsError::WrongType {
                expected: FileType::Regular,
                found: FileType::Directory,
            }
        );
        assert_eq!(fs.open_handles(), 0);
    }

    #[test]
    fn truncate_resizes_descriptor() {
        let mut fs = fs();
        let id = fs.create("f").unwrap();

        fs.truncate("f", 40).unwrap();
        let fd = fs.descriptor(id).unwrap();
        assert_eq!((fd.size(), fd.block_count()), (40, 3));

        fs.truncate("f", 8).unwrap();
        let fd = fs.descriptor(id).unwrap();
        assert_eq!((fd.size(), fd.block_count()), (8, 1));

        assert!(matches!(fs.truncate("nope", 8), Err(FsError::NotFound(_))));
    }

    #[test]
    fn truncate_is_visible_through_open_handle() {
        let mut fs = fs();
        fs.create("f").unwrap();
        let h = fs.open("f").unwrap();
        fs.seek(h, 30).unwrap();

        fs.truncate("f", 20).unwrap();
        assert!(matches!(
            fs.read(h, 1),
            Err(FsError::OffsetOutOfRange { .. })
        ));
    }

    #[test]
    fn hard_links_share_content() {
        let mut fs = fs();
        fs.create("a").unwrap();
        fs.link("a", "b").unwrap();

        let ha = fs.open("a").unwrap();
        fs.write(ha, 16).unwrap();

        let hb = fs.open("b").unwrap();
        assert_eq!(fs.read(hb, 16).unwrap(), vec![1; 16]);
        assert_eq!(fs.stat("a").unwrap().descriptor, fs.stat("b").unwrap().descriptor);
        assert_eq!(fs.stat("b").unwrap().links, 2);
    }

    #[test]
    fn link_rejects_directories_and_taken_names() {
        let mut fs = fs();
        fs.mkdir("d").unwrap();
        fs.create("a").unwrap();
        fs.create("b").unwrap();

        assert!(matches!(fs.link("d", "e"), Err(FsError::WrongType { .. })));
        assert_eq!(
            fs.link("a", "b").unwrap_err(),
            FsError::AlreadyExists("b".to_string())
        );
        assert!(matches!(fs.link("nope", "c"), Err(FsError::NotFound(_))));
        assert_eq!(fs.stat("a").unwrap().links, 1);
    }

    #[test]
    fn link_into_other_directory() {
        let mut fs = fs();
        fs.mkdir("d").unwrap();
        fs.create("a").unwrap();
        fs.link("a", "/d/a2").unwrap();

        assert_eq!(names(&fs.list_at("d").unwrap()), vec![".", "..", "a2"]);
    }

    #[test]
    fn unlink_last_name_frees_descriptor_and_handles() {
        let mut fs = fs();
        fs.create("a").unwrap();
        let h = fs.open("a").unwrap();

        fs.unlink("a").unwrap();

        assert_eq!(fs.descriptors_in_use(), 0);
        assert_eq!(fs.read(h, 1).unwrap_err(), FsError::UnknownHandle(h));
        assert!(matches!(fs.open("a"), Err(FsError::NotFound(_))));
    }

    #[test]
    fn unlink_removes_symlink_not_target() {
        let mut fs = fs();
        fs.create("a").unwrap();
        fs.symlink("s", "a").unwrap();

        fs.unlink("s").unwrap();

        assert_eq!(names(&fs.list()), vec![".", "..", "a"]);
        assert_eq!(fs.descriptors_in_use(), 1);
    }

    #[test]
    fn unlink_rejects_directories() {
        let mut fs = fs();
        fs.mkdir("d").unwrap();
        assert!(matches!(fs.unlink("d"), Err(FsError::WrongType { .. })));
        assert!(matches!(fs.unlink("nope"), Err(FsError::NotFound(_))));
    }

    #[test]
    fn symlink_is_listed_with_target() {
        let mut fs = fs();
        fs.symlink("s", "/somewhere/else").unwrap();

        let entries = fs.list();
        assert_eq!(entries[2].file_type, FileType::Symlink);
        assert_eq!(entries[2].target.as_deref(), Some("/somewhere/else"));
        assert!(matches!(fs.symlink("s", "x"), Err(FsError::AlreadyExists(_))));
        assert!(matches!(fs.symlink("t", ""), Err(FsError::InvalidArgument(_))));
    }

    #[test]
    fn open_follows_relative_symlink_from_its_directory() {
        let mut fs = fs();
        fs.mkdir("d").unwrap();
        fs.create("d/f").unwrap();
        fs.symlink("d/s", "f").unwrap();

        let h = fs.open("d/s").unwrap();
        fs.write(h, 3).unwrap();
        let direct = fs.open("/d/f").unwrap();
        assert_eq!(fs.read(direct, 3).unwrap(), vec![1; 3]);
    }

    #[test]
    fn create_through_dangling_symlink_creates_target() {
        let mut fs = fs();
        fs.symlink("s", "real").unwrap();
        fs.create("s").unwrap();

        assert_eq!(fs.stat("real").unwrap().file_type, FileType::Regular);
        assert_eq!(fs.stat("s").unwrap().file_type, FileType::Symlink);
    }

    #[test]
    fn stat_describes_each_kind() {
        let mut fs = fs();
        let id = fs.create("f").unwrap();
        fs.mkdir("d").unwrap();
        fs.symlink("s", "f").unwrap();

        let f = fs.stat("f").unwrap();
        assert_eq!(f.descriptor, Some(id));
        assert_eq!((f.size, f.blocks, f.links), (64, 4, 1));

        let d = fs.stat("d").unwrap();
        assert_eq!(d.file_type, FileType::Directory);
        assert_eq!(d.descriptor, None);

        let s = fs.stat("s").unwrap();
        assert_eq!(s.target.as_deref(), Some("f"));

        assert_eq!(fs.stat("/").unwrap().name, "/");
        assert!(matches!(fs.stat("nope"), Err(FsError::NotFound(_))));
    }
}
