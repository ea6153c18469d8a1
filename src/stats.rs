use std::fmt;

use crate::translation::Outcome;

/// Running counters of a simulation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
    pub total: u64,
    pub tlb_hits: u64,
    pub page_faults: u64,
}

impl Statistics {
    pub fn record(&mut self, outcome: &Outcome) {
        self.total += 1;
        match outcome {
            Outcome::TlbHit => self.tlb_hits += 1,
            Outcome::PageFault { .. } => self.page_faults += 1,
            Outcome::PageTableHit => {}
        }
    }

    /// TLB misses resolved from the page table without faulting
    pub fn page_table_hits(&self) -> u64 {
        self.total - self.tlb_hits - self.page_faults
    }

    pub fn page_fault_rate(&self) -> f64 {
        ratio(self.page_faults, self.total)
    }

    pub fn tlb_hit_rate(&self) -> f64 {
        ratio(self.tlb_hits, self.total)
    }
}

fn ratio(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of Translated Addresses = {}", self.total)?;
        writeln!(f, "Page Faults = {}", self.page_faults)?;
        writeln!(f, "Page Fault Rate = {:.3}", self.page_fault_rate())?;
        writeln!(f, "TLB Hits = {}", self.tlb_hits)?;
        write!(f, "TLB Hit Rate = {:.3}", self.tlb_hit_rate())
    }
}
