//! Frame allocation with eviction.
//!
//! Frames are handed out in order `0, 1, 2, ...` until the pool is empty.
//! From then on every allocation evicts the eviction queue's tail page and
//! reuses its frame.

use log::debug;

use crate::page_table::PageTable;
use crate::replacement::{EvictionQueue, ReplacementPolicy};

/// Outcome of `FrameAllocator::allocate_frame`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub frame: u8,
    /// Page that lost `frame`, if the pool was exhausted
    pub evicted: Option<u8>,
}

pub struct FrameAllocator {
    queue: EvictionQueue,
    policy: ReplacementPolicy,
    next_frame: usize,
    frames: usize,
    evictions: u64,
}

impl FrameAllocator {
    pub fn new(frames: usize, policy: ReplacementPolicy) -> Self {
        assert!(frames <= u8::MAX as usize + 1, "frame numbers must fit in a byte");
        FrameAllocator {
            queue: EvictionQueue::new(frames),
            policy,
            next_frame: 0,
            frames,
            evictions: 0,
        }
    }

    pub fn policy(&self) -> ReplacementPolicy {
        self.policy
    }

    pub fn queue(&self) -> &EvictionQueue {
        &self.queue
    }

    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    /// Frames never handed out yet
    pub fn free_frames(&self) -> usize {
        self.frames - self.next_frame
    }

    /// Give `page` a frame and record it as resident.
    ///
    /// Only called for pages whose page table entry is invalid. On eviction
    /// the victim's entry is invalidated here; installing the new mapping is
    /// left to the caller.
    pub fn allocate_frame(&mut self, page: u8, page_table: &mut PageTable) -> Allocation {
        assert!(
            !self.queue.contains(page),
            "page {} faulted while still resident",
            page
        );

        if !self.queue.is_full() {
            assert!(
                self.next_frame < self.frames,
                "frame counter {} past pool of {}",
                self.next_frame,
                self.frames
            );
            let frame = self.next_frame as u8;
            self.next_frame += 1;
            self.queue.enqueue(page);
            return Allocation { frame, evicted: None };
        }

        let victim = self.queue.dequeue();
        let frame = match page_table.lookup(victim).resident_frame() {
            Some(frame) => frame,
            None => panic!("queued page {} has no resident frame", victim),
        };
        page_table.invalidate(victim);
        self.queue.enqueue(page);
        self.evictions += 1;

        debug!(
            "{} evicted page {} from frame {} for page {}",
            self.policy, victim, frame, page
        );
        Allocation {
            frame,
            evicted: Some(victim),
        }
    }

    /// Note a resolved reference to `page`; reorders the queue under LRU
    pub fn reference(&mut self, page: u8) {
        if self.policy.tracks_references() {
            self.queue.reference(page);
        }
    }
}
