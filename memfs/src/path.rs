//! Path resolution.
//!
//! Turns a path string into the node it names plus the directory holding that
//! name. Paths starting with "/" resolve from the root, anything else from the
//! directory the lookup starts in. Empty segments are ignored, "." and ".." are
//! understood everywhere, and symbolic links are expanded with a bounded depth.

use log::debug;

use crate::error::{FsError, FsResult};
use crate::node::{NodeGroup, NodeId, NodeKind, ROOT_NAME};

/// The outcome of resolving a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    /// The node the path names, if it exists.
    pub target: Option<NodeId>,
    /// The directory holding the final name. Always present, for "/" it is the
    /// root itself.
    pub parent: NodeId,
    /// The final path segment, "/" for the root.
    pub name: String,
}

pub struct PathResolver<'a> {
    nodes: &'a NodeGroup,
    max_depth: usize,
}

impl<'a> PathResolver<'a> {
    pub fn new(nodes: &'a NodeGroup, max_depth: usize) -> Self {
        Self { nodes, max_depth }
    }

    /// Resolves `path` starting from directory `cwd`. With `follow` set, a symbolic
    /// link in the final position is replaced by whatever its target resolves to.
    /// Links in intermediate positions are always followed.
    ///
    /// # Errors
    ///
    /// `NotFound` or `NotADirectory` when an intermediate segment is missing or is
    /// not a directory, `SymlinkLoop` when expansion goes deeper than the
    /// configured limit.
    pub fn resolve(&self, cwd: NodeId, path: &str, follow: bool) -> FsResult<Lookup> {
        let mut depth = 0;
        self.resolve_from(cwd, path, follow, &mut depth)
    }

    fn resolve_from(
        &self,
        cwd: NodeId,
        path: &str,
        follow: bool,
        depth: &mut usize,
    ) -> FsResult<Lookup> {
        if path.is_empty() {
            return Err(FsError::InvalidArgument("empty path".to_string()));
        }

        let root = self.nodes.root();
        let mut dir = if path.starts_with('/') { root } else { cwd };
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let (last, intermediate) = match segments.split_last() {
            Some(split) => split,
            // Nothing but separators, which names the root.
            None => {
                return Ok(Lookup {
                    target: Some(root),
                    parent: root,
                    name: ROOT_NAME.to_string(),
                })
            }
        };

        for segment in intermediate {
            dir = self.descend(dir, segment, path, depth)?;
        }

        let target = self.nodes.lookup(dir, last);
        if follow {
            if let Some(target) = target {
                if let Some(NodeKind::Symlink { target: link }) =
                    self.nodes.get(target).map(|node| node.kind())
                {
                    self.enter_link(path, depth)?;
                    debug!("Following symlink \"{}\" -> \"{}\".", last, link);
                    // Relative targets are relative to the directory holding the link.
                    return self.resolve_from(dir, link, true, depth);
                }
            }
        }

        Ok(Lookup {
            target,
            parent: dir,
            name: last.to_string(),
        })
    }

    /// Steps from directory `dir` into `segment`, which has to end up at a directory.
    fn descend(
        &self,
        dir: NodeId,
        segment: &str,
        path: &str,
        depth: &mut usize,
    ) -> FsResult<NodeId> {
        let child = self
            .nodes
            .lookup(dir, segment)
            .ok_or_else(|| FsError::NotFound(path.to_string()))?;

        match self.nodes.get(child).map(|node| node.kind()) {
            Some(NodeKind::Directory { .. }) => Ok(child),
            Some(NodeKind::Symlink { target }) => {
                self.enter_link(path, depth)?;
                let lookup = self.resolve_from(dir, target, true, depth)?;
                match lookup.target {
                    Some(id) if self.nodes.get(id).map_or(false, |node| node.is_directory()) => {
                        Ok(id)
                    }
                    Some(_) => Err(FsError::NotADirectory(path.to_string())),
                    None => Err(FsError::NotFound(path.to_string())),
                }
            }
            Some(NodeKind::Regular { .. }) => Err(FsError::NotADirectory(path.to_string())),
            None => Err(FsError::NotFound(path.to_string())),
        }
    }

    fn enter_link(&self, path: &str, depth: &mut usize) -> FsResult<()> {
        *depth += 1;
        if *depth > self.max_depth {
            return Err(FsError::SymlinkLoop(path.to_string()));
        }
        Ok(())
    }
}
