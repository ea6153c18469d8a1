//! Translation lookaside buffer.
//!
//! A ring of `TLB_SIZE` slots written in insertion order. The slot for the
//! next insert is `inserts % TLB_SIZE`, so replacement is strict FIFO no
//! matter how often an entry is read.

use crate::constants::TLB_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlbEntry {
    pub page: u8,
    pub frame: u8,
}

pub struct Tlb {
    slots: [Option<TlbEntry>; TLB_SIZE],
    inserts: u64,
}

impl Tlb {
    pub fn new() -> Self {
        Tlb {
            slots: [None; TLB_SIZE],
            inserts: 0,
        }
    }

    /// Insertions since creation; never reset
    pub fn inserts(&self) -> u64 {
        self.inserts
    }

    /// Live entries, oldest first
    pub fn entries(&self) -> impl Iterator<Item = TlbEntry> + '_ {
        let start = self.inserts.saturating_sub(TLB_SIZE as u64);
        (start..self.inserts).filter_map(move |i| self.slots[(i % TLB_SIZE as u64) as usize])
    }

    /// Frame of the oldest live entry for `page`
    pub fn probe(&self, page: u8) -> Option<u8> {
        self.entries().find(|e| e.page == page).map(|e| e.frame)
    }

    /// Append a mapping, overwriting the oldest slot once the ring is full
    pub fn insert(&mut self, page: u8, frame: u8) {
        let slot = (self.inserts % TLB_SIZE as u64) as usize;
        self.slots[slot] = Some(TlbEntry { page, frame });
        self.inserts += 1;
    }

    /// Drop every live entry for `page`. Returns how many were dropped.
    ///
    /// Invalidated slots stay empty until the ring wraps onto them; the
    /// insertion order of the remaining entries is unchanged.
    pub fn invalidate(&mut self, page: u8) -> usize {
        let mut dropped = 0;
        for slot in self.slots.iter_mut() {
            if slot.is_some_and(|e| e.page == page) {
                *slot = None;
                dropped += 1;
            }
        }
        dropped
    }
}

impl Default for Tlb {
    fn default() -> Self {
        Self::new()
    }
}
