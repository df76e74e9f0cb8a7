use std::collections::BTreeMap;

use crate::descriptor::DescriptorId;
use crate::error::{FsError, FsResult};

pub type HandleId = u32;

/// A cursor into an open regular file. Handles share the descriptor with the
/// directory tree but never keep it alive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenFile {
    id: HandleId,
    offset: usize,
    descriptor: DescriptorId,
}

impl OpenFile {
    pub fn id(&self) -> HandleId {
        self.id
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn descriptor(&self) -> DescriptorId {
        self.descriptor
    }
}

/// Every open handle keyed by id. Each `open` gets its own entry and offset even
/// when the same file is opened twice.
pub struct OpenFileTable {
    handles: BTreeMap<HandleId, OpenFile>,
    next_id: HandleId,
}

impl OpenFileTable {
    pub fn new() -> Self {
        Self {
            handles: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Hands out the next handle id.
    ///
    /// # Errors
    ///
    /// `NoHandlesAvailable` once every id has been used. Ids are never reused, so
    /// closing handles does not help.
    pub fn open(&mut self, descriptor: DescriptorId) -> FsResult<HandleId> {
        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or(FsError::NoHandlesAvailable)?;
        self.handles.insert(
            id,
            OpenFile {
                id,
                offset: 0,
                descriptor,
            },
        );
        Ok(id)
    }

    pub fn close(&mut self, id: HandleId) -> FsResult<()> {
        self.handles
            .remove(&id)
            .map(|_| ())
            .ok_or(FsError::UnknownHandle(id))
    }

    pub fn get(&self, id: HandleId) -> FsResult<&OpenFile> {
        self.handles.get(&id).ok_or(FsError::UnknownHandle(id))
    }

    /// Moves the cursor. Offsets past the end of the file are accepted here and
    /// rejected by the next read or write.
    pub fn seek(&mut self, id: HandleId, offset: usize) -> FsResult<()> {
        let handle = self
            .handles
            .get_mut(&id)
            .ok_or(FsError::UnknownHandle(id))?;
        handle.offset = offset;
        Ok(())
    }

    /// Drops every handle on `descriptor`, returning how many were open.
    pub fn invalidate(&mut self, descriptor: DescriptorId) -> usize {
        let before = self.handles.len();
        self.handles.retain(|_, handle| handle.descriptor != descriptor);
        before - self.handles.len()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl Default for OpenFileTable {
    fn default() -> Self {
        OpenFileTable::new()
    }
}
