use crate::constants::PAGES;

/// One page table slot. `frame` is only meaningful while `valid` is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageTableEntry {
    pub frame: Option<u8>,
    pub valid: bool,
}

impl PageTableEntry {
    /// Frame of a resident page, `None` if the entry is invalid
    #[inline]
    pub fn resident_frame(&self) -> Option<u8> {
        if self.valid { self.frame } else { None }
    }
}

/// Single-level page table: one entry per logical page
pub struct PageTable {
    entries: [PageTableEntry; PAGES],
}

impl PageTable {
    /// All entries start invalid
    pub fn new() -> Self {
        PageTable {
            entries: [PageTableEntry::default(); PAGES],
        }
    }

    #[inline]
    pub fn lookup(&self, page: u8) -> PageTableEntry {
        self.entries[page as usize]
    }

    pub fn install(&mut self, page: u8, frame: u8) {
        self.entries[page as usize] = PageTableEntry {
            frame: Some(frame),
            valid: true,
        };
    }

    /// Clear validity. The stale frame number is dropped as well.
    pub fn invalidate(&mut self, page: u8) {
        self.entries[page as usize] = PageTableEntry::default();
    }

    /// Number of valid entries
    pub fn resident_count(&self) -> usize {
        self.entries.iter().filter(|e| e.valid).count()
    }

    /// Logical page currently mapped to `frame`, if any
    pub fn owner_of(&self, frame: u8) -> Option<u8> {
        self.entries
            .iter()
            .position(|e| e.resident_frame() == Some(frame))
            .map(|page| page as u8)
    }
}

impl Default for PageTable {
    fn default() -> Self {
        Self::new()
    }
}
