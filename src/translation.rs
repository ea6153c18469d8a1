use log::{debug, trace};

use crate::constants::*;
use crate::frame_allocator::{Allocation, FrameAllocator};
use crate::memory::{BackingStore, PhysicalMemory};
use crate::page_table::PageTable;
use crate::replacement::ReplacementPolicy;
use crate::stats::Statistics;
use crate::tlb::Tlb;

/// Represents the decomposed components of a logical address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualAddress {
    pub va: u32,
    pub page: u8,
    pub offset: u8,
}

impl VirtualAddress {
    /// Decompose a raw address. Bits above the address space are ignored.
    pub fn from_raw(va: u32) -> Self {
        let page = ((va >> PAGE_SHIFT) & PAGE_MASK) as u8;
        let offset = (va & OFFSET_MASK) as u8;

        VirtualAddress { va, page, offset }
    }

    /// Recombine page and offset
    #[inline]
    pub fn to_raw(&self) -> u32 {
        ((self.page as u32) << PAGE_SHIFT) | self.offset as u32
    }
}

impl std::fmt::Display for VirtualAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VA({}) = (p={}, d={})", self.va, self.page, self.offset)
    }
}

/// A location in simulated main memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalAddress {
    pub frame: u8,
    pub offset: u8,
}

impl PhysicalAddress {
    #[inline]
    pub fn to_raw(&self) -> u32 {
        ((self.frame as u32) << PAGE_SHIFT) | self.offset as u32
    }
}

impl std::fmt::Display for PhysicalAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_raw())
    }
}

/// How a translation found its frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    TlbHit,
    /// TLB miss served by a valid page table entry
    PageTableHit,
    /// Page loaded from the backing store, possibly evicting another page
    PageFault { evicted: Option<u8> },
}

/// Result of translating one logical address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translation {
    pub virtual_address: VirtualAddress,
    pub physical_address: PhysicalAddress,
    pub value: i8,
    pub outcome: Outcome,
}

/// Whether evictions purge the TLB
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TlbMode {
    /// Invalidate TLB entries of an evicted page
    #[default]
    Coherent,
    /// Never invalidate; a hit may return a frame that now holds another page
    Legacy,
}

/// One simulation session: page table, TLB, frames and counters
pub struct Translator<'s> {
    store: &'s dyn BackingStore,
    memory: PhysicalMemory,
    page_table: PageTable,
    tlb: Tlb,
    allocator: FrameAllocator,
    tlb_mode: TlbMode,
    stats: Statistics,
}

impl<'s> Translator<'s> {
    pub fn new(store: &'s dyn BackingStore, policy: ReplacementPolicy, tlb_mode: TlbMode) -> Self {
        Self::with_frames(store, policy, tlb_mode, FRAMES)
    }

    /// Build a translator over a smaller frame pool
    pub fn with_frames(
        store: &'s dyn BackingStore,
        policy: ReplacementPolicy,
        tlb_mode: TlbMode,
        frames: usize,
    ) -> Self {
        assert!(
            frames > 0 && frames <= FRAMES,
            "frame pool of {} outside 1..={}",
            frames,
            FRAMES
        );
        Translator {
            store,
            memory: PhysicalMemory::new(),
            page_table: PageTable::new(),
            tlb: Tlb::new(),
            allocator: FrameAllocator::new(frames, policy),
            tlb_mode,
            stats: Statistics::default(),
        }
    }

    pub fn stats(&self) -> Statistics {
        self.stats
    }

    pub fn page_table(&self) -> &PageTable {
        &self.page_table
    }

    pub fn tlb(&self) -> &Tlb {
        &self.tlb
    }

    pub fn allocator(&self) -> &FrameAllocator {
        &self.allocator
    }

    pub fn memory(&self) -> &PhysicalMemory {
        &self.memory
    }

    /// Translate one logical address and read the byte it names
    pub fn translate(&mut self, raw: u32) -> Translation {
        let va = VirtualAddress::from_raw(raw);

        let (frame, outcome) = match self.tlb.probe(va.page) {
            Some(frame) => (frame, Outcome::TlbHit),
            None => {
                let (frame, outcome) = match self.page_table.lookup(va.page).resident_frame() {
                    Some(frame) => (frame, Outcome::PageTableHit),
                    None => self.fault(va.page),
                };
                self.tlb.insert(va.page, frame);
                (frame, outcome)
            }
        };

        self.allocator.reference(va.page);
        self.stats.record(&outcome);

        let physical_address = PhysicalAddress {
            frame,
            offset: va.offset,
        };
        let value = self.memory.read(physical_address.to_raw() as usize);
        trace!(
            "{} -> PA {} value {} ({:?})",
            va, physical_address, value, outcome
        );

        Translation {
            virtual_address: va,
            physical_address,
            value,
            outcome,
        }
    }

    /// Translate every address in order
    pub fn translate_all<I>(&mut self, addresses: I) -> Vec<Translation>
    where
        I: IntoIterator<Item = u32>,
    {
        addresses.into_iter().map(|va| self.translate(va)).collect()
    }

    fn fault(&mut self, page: u8) -> (u8, Outcome) {
        let Allocation { frame, evicted } = self.allocator.allocate_frame(page, &mut self.page_table);

        if let Some(victim) = evicted {
            if self.tlb_mode == TlbMode::Coherent {
                let dropped = self.tlb.invalidate(victim);
                if dropped > 0 {
                    debug!("Dropped {} TLB entries for evicted page {}", dropped, victim);
                }
            }
        }

        debug_assert_eq!(
            self.page_table.owner_of(frame),
            None,
            "frame {} handed out while still mapped",
            frame
        );
        self.memory.load_frame(frame, self.store.page(page));
        self.page_table.install(page, frame);
        debug!("Page fault: page {} loaded into frame {}", page, frame);

        (frame, Outcome::PageFault { evicted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryBackingStore;

    /// Byte at logical address a is the page number plus the offset
    fn store() -> InMemoryBackingStore {
        InMemoryBackingStore::from_fn(|a| ((a >> 8) as u8).wrapping_add(a as u8))
    }

    fn addr(page: u8, offset: u8) -> u32 {
        ((page as u32) << 8) | offset as u32
    }

    // =========================================================================
    // Address decomposition
    // =========================================================================

    #[test]
    fn test_va_decomposition() {
        // 16916 = 0x4214 -> page 0x42, offset 0x14
        let va = VirtualAddress::from_raw(16916);
        assert_eq!(va.page, 66);
        assert_eq!(va.offset, 20);

        let va = VirtualAddress::from_raw(62493);
        assert_eq!(va.page, 244);
        assert_eq!(va.offset, 29);
    }

    #[test]
    fn test_va_decomposition_edge_cases() {
        let va = VirtualAddress::from_raw(0);
        assert_eq!((va.page, va.offset), (0, 0));

        let va = VirtualAddress::from_raw(65535);
        assert_eq!((va.page, va.offset), (255, 255));
    }

    #[test]
    fn test_va_high_bits_masked() {
        let va = VirtualAddress::from_raw(0x1_0203);
        assert_eq!(va.page, 2);
        assert_eq!(va.offset, 3);
        assert_eq!(va.va, 0x1_0203);
    }

    #[test]
    fn test_va_reconstruction() {
        for &original in &[0, 1, 255, 256, 16916, 62493, 65535] {
            let va = VirtualAddress::from_raw(original);
            assert_eq!(va.to_raw(), original, "Failed for VA={}", original);
        }
    }

    #[test]
    fn test_display() {
        let va = VirtualAddress::from_raw(16916);
        let display = format!("{}", va);
        assert!(display.contains("16916"));
        assert!(display.contains("p=66"));
        assert!(display.contains("d=20"));

        let pa = PhysicalAddress { frame: 2, offset: 5 };
        assert_eq!(pa.to_string(), "517");
    }

    // =========================================================================
    // Translation pipeline
    // =========================================================================

    #[test]
    fn test_first_reference_faults() {
        let store = store();
        let mut t = Translator::new(&store, ReplacementPolicy::Fifo, TlbMode::Coherent);

        let r = t.translate(addr(66, 20));
        assert_eq!(r.outcome, Outcome::PageFault { evicted: None });
        assert_eq!(r.physical_address, PhysicalAddress { frame: 0, offset: 20 });
        assert_eq!(r.physical_address.to_raw(), 20);
        assert_eq!(r.value, 86);
        assert_eq!(t.page_table().lookup(66).resident_frame(), Some(0));
        assert_eq!(t.tlb().probe(66), Some(0));
    }

    #[test]
    fn test_hit_rate_scenario() {
        let store = store();
        let mut t = Translator::new(&store, ReplacementPolicy::Fifo, TlbMode::Coherent);

        let outcomes: Vec<Outcome> = t
            .translate_all([addr(1, 0), addr(1, 9), addr(2, 0), addr(1, 200)])
            .into_iter()
            .map(|r| r.outcome)
            .collect();

        assert_eq!(
            outcomes,
            vec![
                Outcome::PageFault { evicted: None },
                Outcome::TlbHit,
                Outcome::PageFault { evicted: None },
                Outcome::TlbHit,
            ]
        );
        let stats = t.stats();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.page_faults, 2);
        assert_eq!(stats.tlb_hits, 2);
    }

    #[test]
    fn test_page_table_hit_after_tlb_wrap() {
        let store = store();
        let mut t = Translator::new(&store, ReplacementPolicy::Fifo, TlbMode::Coherent);

        // 17 distinct pages push page 0 out of the 16-entry TLB
        for page in 0..=TLB_SIZE as u8 {
            t.translate(addr(page, 0));
        }
        assert_eq!(t.tlb().probe(0), None);

        let r = t.translate(addr(0, 3));
        assert_eq!(r.outcome, Outcome::PageTableHit);
        assert_eq!(r.physical_address.frame, 0);
        assert_eq!(r.value, 3);
        // Re-inserted into the TLB
        assert_eq!(t.tlb().probe(0), Some(0));
        assert_eq!(t.stats().page_table_hits(), 1);
    }

    #[test]
    fn test_distinct_pages_fault_once_each() {
        let store = store();
        let mut t = Translator::new(&store, ReplacementPolicy::Fifo, TlbMode::Coherent);

        for page in 0..FRAMES as u8 {
            t.translate(addr(page, 1));
        }
        let stats = t.stats();
        assert_eq!(stats.page_faults, FRAMES as u64);
        assert_eq!(stats.tlb_hits, 0);
        assert_eq!(t.allocator().evictions(), 0);
    }

    #[test]
    fn test_fifo_evicts_first_faulted_page() {
        let store = store();
        let mut t = Translator::new(&store, ReplacementPolicy::Fifo, TlbMode::Coherent);

        for page in 0..FRAMES as u8 {
            t.translate(addr(page, 0));
        }
        t.translate(addr(0, 0));
        let r = t.translate(addr(FRAMES as u8, 0));

        assert_eq!(r.outcome, Outcome::PageFault { evicted: Some(0) });
        assert_eq!(r.physical_address.frame, 0);
        assert!(!t.page_table().lookup(0).valid);
    }

    #[test]
    fn test_lru_evicts_second_faulted_page() {
        let store = store();
        let mut t = Translator::new(&store, ReplacementPolicy::Lru, TlbMode::Coherent);

        for page in 0..FRAMES as u8 {
            t.translate(addr(page, 0));
        }
        t.translate(addr(0, 0));
        let r = t.translate(addr(FRAMES as u8, 0));

        assert_eq!(r.outcome, Outcome::PageFault { evicted: Some(1) });
        assert_eq!(r.physical_address.frame, 1);
        assert!(t.page_table().lookup(0).valid);
        assert!(!t.page_table().lookup(1).valid);
    }

    #[test]
    fn test_reused_frame_holds_new_page() {
        let store = store();
        let mut t = Translator::with_frames(&store, ReplacementPolicy::Fifo, TlbMode::Coherent, 2);

        t.translate(addr(10, 0));
        t.translate(addr(11, 0));
        let r = t.translate(addr(12, 7));

        assert_eq!(r.physical_address.frame, 0);
        assert_eq!(r.value, 19);
        let expected = |i: usize| 12u8.wrapping_add(i as u8) as i8;
        assert!(t.memory().frame(0).iter().enumerate().all(|(i, &b)| b == expected(i)));
    }

    // =========================================================================
    // TLB coherence
    // =========================================================================

    #[test]
    fn test_coherent_tlb_drops_evicted_page() {
        let store = store();
        let mut t = Translator::with_frames(&store, ReplacementPolicy::Fifo, TlbMode::Coherent, 2);

        t.translate(addr(10, 0));
        t.translate(addr(11, 0));
        t.translate(addr(12, 0)); // evicts 10 from frame 0

        assert_eq!(t.tlb().probe(10), None);
        let r = t.translate(addr(10, 5));
        assert_eq!(r.outcome, Outcome::PageFault { evicted: Some(11) });
        assert_eq!(r.value, 15);

        // Every live TLB entry matches the page table
        for entry in t.tlb().entries() {
            assert_eq!(t.page_table().lookup(entry.page).resident_frame(), Some(entry.frame));
        }
    }

    #[test]
    fn test_legacy_tlb_returns_stale_frame() {
        let store = store();
        let mut t = Translator::with_frames(&store, ReplacementPolicy::Fifo, TlbMode::Legacy, 2);

        t.translate(addr(10, 0));
        t.translate(addr(11, 0));
        t.translate(addr(12, 0)); // evicts 10, frame 0 now holds page 12

        let r = t.translate(addr(10, 5));
        assert_eq!(r.outcome, Outcome::TlbHit);
        assert_eq!(r.physical_address.frame, 0);
        // Byte comes from page 12, not page 10
        assert_eq!(r.value, 17);
        assert!(!t.page_table().lookup(10).valid);
    }

    #[test]
    fn test_legacy_lru_reference_to_evicted_page_is_noop() {
        let store = store();
        let mut t = Translator::with_frames(&store, ReplacementPolicy::Lru, TlbMode::Legacy, 2);

        t.translate(addr(10, 0));
        t.translate(addr(11, 0));
        t.translate(addr(12, 0));
        t.translate(addr(10, 0)); // stale TLB hit

        let queued: Vec<u8> = t.allocator().queue().iter().collect();
        assert_eq!(queued, vec![12, 11]);
    }
}
