#[derive(Debug, PartialEq)]
pub enum State {
    Free,
    Used,
}

/// Tracks which descriptor slots are taken. One bit per slot, slots beyond the
/// configured capacity are never handed out. Words are only added as slots get
/// reserved, a bitmap of any capacity starts out empty.
#[derive(Debug, Clone)]
pub struct Bitmap {
    bitmap: Vec<u64>,
    /// The number of slots addressable through this bitmap.
    cap: usize,
}

impl Bitmap {
    pub fn new(cap: usize) -> Self {
        Self {
            bitmap: Vec::new(),
            cap,
        }
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn get(&self, slot: usize) -> State {
        assert!(slot < self.cap, "slot {} out of range", slot);
        let mask = 0b01_u64 << (slot % 64);
        match self.bitmap.get(slot / 64) {
            Some(word) if word & mask != 0 => State::Used,
            _ => State::Free,
        }
    }

    pub fn set_reserved(&mut self, slot: usize) {
        assert!(slot < self.cap, "slot {} out of range", slot);
        let index = slot / 64;
        if index >= self.bitmap.len() {
            self.bitmap.resize(index + 1, 0);
        }
        self.bitmap[index] |= 0b01_u64 << (slot % 64);
    }

    pub fn set_free(&mut self, slot: usize) {
        assert!(slot < self.cap, "slot {} out of range", slot);
        if let Some(word) = self.bitmap.get_mut(slot / 64) {
            *word &= !(0b01_u64 << (slot % 64));
        }
    }

    pub fn used(&self) -> usize {
        self.bitmap.iter().map(|word| word.count_ones() as usize).sum()
    }

    fn word_is_full(&self, index: usize) -> bool {
        self.bitmap.get(index) == Some(&u64::MAX)
    }
}

/// Implements a naive allocation policy for descriptor slots: always hand out the
/// lowest free slot, so a slot released by a deleted file is the next one reused.
///
/// ## Other Allocation Policies
///
/// 1. A rolling marker that keeps moving forward and only wraps once the end is
///    reached, which delays id reuse for as long as possible.
/// 2. A free list of released slots, trading memory for O(1) allocation.
pub struct NextAvailableAllocation<'a> {
    /// Keeps track of the next starting place for looking for available slots.
    marker: usize,
    bitmap: &'a Bitmap,
}

impl<'a> NextAvailableAllocation<'a> {
    pub fn new(bitmap: &'a Bitmap) -> Self {
        Self { marker: 0, bitmap }
    }
}

impl<'a> Iterator for NextAvailableAllocation<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        while self.marker < self.bitmap.capacity() {
            let slot = self.marker;
            if slot % 64 == 0 && self.bitmap.word_is_full(slot / 64) {
                self.marker = slot.saturating_add(64);
                continue;
            }
            self.marker += 1;
            if let State::Free = self.bitmap.get(slot) {
                return Some(slot);
            }
        }
        None
    }
}
