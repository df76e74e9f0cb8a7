use std::collections::BTreeMap;
use std::fmt;

use crate::descriptor::DescriptorId;

pub const ROOT_NAME: &str = "/";
pub const CURRENT_DIR: &str = ".";
pub const PARENT_DIR: &str = "..";

pub type NodeId = usize;

/// A description of the type of file object a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// A file whose bytes live in the blocks of a descriptor.
    Regular,
    /// A collection of named child nodes.
    Directory,
    /// A node holding another path, resolved only when traversed.
    Symlink,
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileType::Regular => "regular",
            FileType::Directory => "directory",
            FileType::Symlink => "symlink",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Regular {
        descriptor: DescriptorId,
    },
    Directory {
        /// Navigational only, the root has no parent. Children are owned through
        /// `children`, never through this back-reference.
        parent: Option<NodeId>,
        /// Child nodes in insertion order. The synthetic "." and ".." entries are
        /// not stored, they are derived from the node itself and `parent`.
        children: Vec<NodeId>,
    },
    Symlink {
        target: String,
    },
}

/// A named entry in the directory tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    name: String,
    kind: NodeKind,
}

impl Node {
    pub fn regular(name: &str, descriptor: DescriptorId) -> Self {
        Self {
            name: name.to_string(),
            kind: NodeKind::Regular { descriptor },
        }
    }

    pub fn directory(name: &str, parent: Option<NodeId>) -> Self {
        Self {
            name: name.to_string(),
            kind: NodeKind::Directory {
                parent,
                children: Vec::new(),
            },
        }
    }

    pub fn symlink(name: &str, target: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: NodeKind::Symlink {
                target: target.to_string(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn file_type(&self) -> FileType {
        match self.kind {
            NodeKind::Regular { .. } => FileType::Regular,
            NodeKind::Directory { .. } => FileType::Directory,
            NodeKind::Symlink { .. } => FileType::Symlink,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.kind, NodeKind::Directory { .. })
    }
}

/// Every node in the tree keyed by id. The group only stores nodes, the shape of
/// the tree is held by each directory's child list.
pub struct NodeGroup {
    nodes: BTreeMap<NodeId, Node>,
    next_id: NodeId,
    root: NodeId,
}

impl NodeGroup {
    /// Creates a group holding only the root directory.
    pub fn new() -> Self {
        let mut group = Self {
            nodes: BTreeMap::new(),
            next_id: 0,
            root: 0,
        };
        group.root = group.insert(Node::directory(ROOT_NAME, None));
        group
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn insert(&mut self, node: Node) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Adds `node` at the end of directory `dir`'s children. Name collisions are the
    /// caller's concern.
    pub fn attach(&mut self, dir: NodeId, node: Node) -> NodeId {
        let id = self.insert(node);
        if let Some(Node {
            kind: NodeKind::Directory { children, .. },
            ..
        }) = self.nodes.get_mut(&dir)
        {
            children.push(id);
        }
        id
    }

    /// Unhooks `child` from directory `dir` and hands back the whole subtree rooted
    /// at it, children before their directories.
    pub fn detach(&mut self, dir: NodeId, child: NodeId) -> Vec<Node> {
        if let Some(Node {
            kind: NodeKind::Directory { children, .. },
            ..
        }) = self.nodes.get_mut(&dir)
        {
            children.retain(|&id| id != child);
        }

        let mut removed = Vec::new();
        self.remove_subtree(child, &mut removed);
        removed
    }

    fn remove_subtree(&mut self, id: NodeId, removed: &mut Vec<Node>) {
        let node = match self.nodes.remove(&id) {
            Some(node) => node,
            None => return,
        };
        if let NodeKind::Directory { children, .. } = &node.kind {
            for &child in children {
                self.remove_subtree(child, removed);
            }
        }
        removed.push(node);
    }

    /// The parent of a directory, the root being its own parent.
    pub fn parent(&self, dir: NodeId) -> NodeId {
        match self.nodes.get(&dir).map(Node::kind) {
            Some(NodeKind::Directory {
                parent: Some(parent),
                ..
            }) => *parent,
            _ => self.root,
        }
    }

    pub fn children(&self, dir: NodeId) -> &[NodeId] {
        match self.nodes.get(&dir).map(Node::kind) {
            Some(NodeKind::Directory { children, .. }) => children.as_slice(),
            _ => &[],
        }
    }

    /// Finds the child of `dir` called `name`. The synthetic entries resolve to the
    /// directory itself and its parent.
    pub fn lookup(&self, dir: NodeId, name: &str) -> Option<NodeId> {
        match name {
            CURRENT_DIR => Some(dir),
            PARENT_DIR => Some(self.parent(dir)),
            _ => self
                .children(dir)
                .iter()
                .copied()
                .find(|&id| self.nodes.get(&id).map(Node::name) == Some(name)),
        }
    }

    /// True if `node` is `ancestor` or lies somewhere below it.
    pub fn is_within(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = node;
        loop {
            if cursor == ancestor {
                return true;
            }
            if cursor == self.root {
                return false;
            }
            cursor = self.parent(cursor);
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Default for NodeGroup {
    fn default() -> Self {
        NodeGroup::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_group_holds_only_root() {
        let group = NodeGroup::new();
        let root = group.root();

        assert_eq!(group.len(), 1);
        assert_eq!(group.get(root).unwrap().name(), ROOT_NAME);
        assert_eq!(group.parent(root), root);
        assert!(group.children(root).is_empty());
    }

    #[test]
    fn children_keep_insertion_order() {
        let mut group = NodeGroup::new();
        let root = group.root();
        let b = group.attach(root, Node::regular("b", 1));
        let a = group.attach(root, Node::regular("a", 2));

        assert_eq!(group.children(root), &[b, a]);
        assert_eq!(group.lookup(root, "a"), Some(a));
        assert_eq!(group.lookup(root, "c"), None);
    }

    #[test]
    fn synthetic_entries_resolve_to_self_and_parent() {
        let mut group = NodeGroup::new();
        let root = group.root();
        let dir = group.attach(root, Node::directory("d", Some(root)));

        assert_eq!(group.lookup(dir, "."), Some(dir));
        assert_eq!(group.lookup(dir, ".."), Some(root));
        assert_eq!(group.lookup(root, ".."), Some(root));
    }

    #[test]
    fn detach_removes_whole_subtree() {
        let mut group = NodeGroup::new();
        let root = group.root();
        let dir = group.attach(root, Node::directory("d", Some(root)));
        let inner = group.attach(dir, Node::directory("e", Some(dir)));
        group.attach(inner, Node::regular("f", 3));
        group.attach(dir, Node::symlink("s", "/"));

        let removed = group.detach(root, dir);

        assert_eq!(removed.len(), 4);
        assert_eq!(removed.last().unwrap().name(), "d");
        assert_eq!(group.len(), 1);
        assert!(group.children(root).is_empty());
    }

    #[test]
    fn ancestry_follows_parent_links() {
        let mut group = NodeGroup::new();
        let root = group.root();
        let a = group.attach(root, Node::directory("a", Some(root)));
        let b = group.attach(a, Node::directory("b", Some(a)));
        let c = group.attach(root, Node::directory("c", Some(root)));

        assert!(group.is_within(b, a));
        assert!(group.is_within(b, root));
        assert!(group.is_within(a, a));
        assert!(!group.is_within(c, a));
    }

    #[test]
    fn file_type_is_derived_from_kind() {
        assert_eq!(Node::regular("f", 1).file_type(), FileType::Regular);
        assert_eq!(Node::directory("d", None).file_type(), FileType::Directory);
        assert_eq!(Node::symlink("s", "f").file_type(), FileType::Symlink);
        assert_eq!(FileType::Symlink.to_string(), "symlink");
    }
}
