use zerocopy::{AsBytes, FromBytes};

/// Blocks are deliberately tiny so that even short files span several of them and
/// reads or writes crossing block boundaries are easy to exercise by hand.
pub const BLOCK_SIZE: usize = 16;

/// The number of blocks needed to hold `size` bytes.
pub fn blocks_for(size: usize) -> usize {
    (size + BLOCK_SIZE - 1) / BLOCK_SIZE
}

#[repr(C)]
#[derive(AsBytes, FromBytes, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Block {
    data: [u8; BLOCK_SIZE],
}

impl Block {
    pub fn new() -> Self {
        Self {
            data: [0; BLOCK_SIZE],
        }
    }

    pub fn data(&self) -> &[u8] {
        self.as_bytes()
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        self.as_bytes_mut()
    }

    /// Zeroes every byte from `from` to the end of the block.
    pub fn clear_from(&mut self, from: usize) {
        for byte in self.data.iter_mut().skip(from) {
            *byte = 0;
        }
    }
}

impl Default for Block {
    fn default() -> Self {
        Block::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_block_is_zeroed() {
        let block = Block::new();
        assert_eq!(block.data(), &[0; BLOCK_SIZE]);
    }

    #[test]
    fn can_write_through_mutable_view() {
        let mut block = Block::new();
        block.data_mut()[3] = 0x55;

        assert_eq!(block.data()[3], 0x55);
        assert_eq!(block.data()[2], 0);
    }

    #[test]
    fn clear_from_only_touches_the_tail() {
        let mut block = Block::new();
        block.data_mut().copy_from_slice(&[1; BLOCK_SIZE]);

        block.clear_from(10);

        assert_eq!(&block.data()[..10], &[1; 10]);
        assert_eq!(&block.data()[10..], &[0; BLOCK_SIZE - 10]);
    }

    #[test]
    fn block_count_rounds_up() {
        assert_eq!(blocks_for(0), 0);
        assert_eq!(blocks_for(1), 1);
        assert_eq!(blocks_for(BLOCK_SIZE), 1);
        assert_eq!(blocks_for(BLOCK_SIZE + 1), 2);
        assert_eq!(blocks_for(40), 3);
    }
}
