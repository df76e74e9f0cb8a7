use std::collections::BTreeMap;
use std::convert::TryFrom;

use crate::alloc::{Bitmap, NextAvailableAllocation};
use crate::block::{blocks_for, Block, BLOCK_SIZE};
use crate::error::{FsError, FsResult};

use log::debug;

pub type DescriptorId = u32;

/// Ids are 1-based, so a file system never holds more descriptors than there are
/// nonzero ids.
pub const MAX_DESCRIPTORS: usize = DescriptorId::MAX as usize;

/// The allocation record behind a regular file: the blocks holding its bytes and
/// its logical size. A descriptor knows nothing about the names pointing at it,
/// only how many of them there are.
#[derive(Debug, Clone)]
pub struct FileDescriptor {
    id: DescriptorId,
    blocks: Vec<Block>,
    /// The logical size of the file in bytes, never more than the blocks can hold.
    size: usize,
    /// The number of regular file nodes sharing this descriptor.
    links: usize,
}

impl FileDescriptor {
    /// A fresh descriptor is handed `initial_blocks` zeroed blocks and is considered
    /// full, so a new file can be written to without truncating it first.
    fn new(id: DescriptorId, initial_blocks: usize) -> Self {
        Self {
            id,
            blocks: vec![Block::new(); initial_blocks],
            size: initial_blocks * BLOCK_SIZE,
            links: 1,
        }
    }

    pub fn id(&self) -> DescriptorId {
        self.id
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn links(&self) -> usize {
        self.links
    }

    /// Returns up to `len` bytes starting at `offset`. Reads stop at the end of the
    /// file, so the result may be shorter than requested.
    pub fn read_at(&self, offset: usize, len: usize) -> FsResult<Vec<u8>> {
        self.check_offset(offset)?;
        let end = offset.saturating_add(len).min(self.size);

        let content: Vec<u8> = self
            .blocks
            .iter()
            .flat_map(|block| block.data().iter().copied())
            .take(self.size)
            .collect();
        Ok(content[offset..end].to_vec())
    }

    /// Fills `len` bytes starting at `offset` with `pattern`. Writes never grow the
    /// file, anything past the current size is dropped. Returns the number of bytes
    /// written.
    pub fn write_at(&mut self, offset: usize, len: usize, pattern: u8) -> FsResult<usize> {
        self.check_offset(offset)?;
        let end = offset.saturating_add(len).min(self.size);

        for pos in offset..end {
            self.blocks[pos / BLOCK_SIZE].data_mut()[pos % BLOCK_SIZE] = pattern;
        }
        Ok(end - offset)
    }

    /// Resizes the file to exactly `new_size` bytes, keeping just enough blocks to
    /// cover it. New blocks are zeroed and so is the unused tail of the last block
    /// when shrinking.
    pub fn resize(&mut self, new_size: usize) {
        if new_size == self.size {
            return;
        }

        let needed = blocks_for(new_size);
        if new_size < self.size {
            self.blocks.truncate(needed);
            if let Some(last) = self.blocks.last_mut() {
                let used = new_size - (needed - 1) * BLOCK_SIZE;
                last.clear_from(used);
            }
        } else {
            self.blocks.resize(needed, Block::new());
        }

        debug!(
            "Resized descriptor {} from {} to {} bytes ({} blocks).",
            self.id,
            self.size,
            new_size,
            self.blocks.len()
        );
        self.size = new_size;
    }

    fn check_offset(&self, offset: usize) -> FsResult<()> {
        if offset > self.size {
            return Err(FsError::OffsetOutOfRange {
                offset,
                size: self.size,
            });
        }
        Ok(())
    }
}

/// All live descriptors keyed by id. Ids are drawn from a bitmap bounded by the
/// configured capacity, so the number of files that can exist at once is bounded.
/// Capacities past `MAX_DESCRIPTORS` are clamped.
pub struct DescriptorGroup {
    descriptors: BTreeMap<DescriptorId, FileDescriptor>,
    alloc_tracker: Bitmap,
    initial_blocks: usize,
}

impl DescriptorGroup {
    pub fn new(capacity: usize, initial_blocks: usize) -> Self {
        Self {
            descriptors: BTreeMap::new(),
            alloc_tracker: Bitmap::new(capacity.min(MAX_DESCRIPTORS)),
            initial_blocks,
        }
    }

    /// Allocates a descriptor with a single link.
    ///
    /// # Errors
    ///
    /// Returns `NoDescriptorsAvailable` once every slot is in use.
    pub fn allocate(&mut self) -> FsResult<DescriptorId> {
        let exhausted = || FsError::NoDescriptorsAvailable(self.alloc_tracker.capacity());
        let slot = NextAvailableAllocation::new(&self.alloc_tracker)
            .next()
            .ok_or_else(exhausted)?;
        // Slot 0 is descriptor 1, ids are 1-based.
        let id = DescriptorId::try_from(slot + 1).map_err(|_| exhausted())?;
        self.alloc_tracker.set_reserved(slot);
        self.descriptors
            .insert(id, FileDescriptor::new(id, self.initial_blocks));
        debug!(
            "Allocated descriptor {} ({} of {} in use).",
            id,
            self.alloc_tracker.used(),
            self.alloc_tracker.capacity()
        );
        Ok(id)
    }

    pub fn get(&self, id: DescriptorId) -> Option<&FileDescriptor> {
        self.descriptors.get(&id)
    }

    pub fn get_mut(&mut self, id: DescriptorId) -> Option<&mut FileDescriptor> {
        self.descriptors.get_mut(&id)
    }

    /// Records one more name for the descriptor.
    pub fn link(&mut self, id: DescriptorId) {
        if let Some(descriptor) = self.descriptors.get_mut(&id) {
            descriptor.links += 1;
        }
    }

    /// Drops one name from the descriptor and frees it once no names are left.
    /// Returns true when the descriptor was freed.
    pub fn unlink(&mut self, id: DescriptorId) -> bool {
        let remaining = match self.descriptors.get_mut(&id) {
            Some(descriptor) => {
                descriptor.links -= 1;
                descriptor.links
            }
            None => return false,
        };
        if remaining > 0 {
            return false;
        }

        self.descriptors.remove(&id);
        self.alloc_tracker.set_free(id as usize - 1);
        debug!("Freed descriptor {}.", id);
        true
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.alloc_tracker.capacity()
    }
}
