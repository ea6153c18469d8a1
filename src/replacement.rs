//! Page replacement bookkeeping.
//!
//! `EvictionQueue` orders the resident logical pages from most recently
//! queued (head) to next victim (tail). It is a doubly-linked list whose
//! links live in a table indexed by page number, so membership, unlinking
//! and move-to-front are all O(1) without any per-node allocation.

use std::fmt;
use std::str::FromStr;

use crate::constants::PAGES;
use crate::error::VmError;

/// Which page gives up its frame when memory is full
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReplacementPolicy {
    /// Evict in arrival order
    #[default]
    Fifo,
    /// Evict the least recently referenced page
    Lru,
}

impl ReplacementPolicy {
    /// Whether every resolved reference reorders the queue
    pub fn tracks_references(&self) -> bool {
        matches!(self, ReplacementPolicy::Lru)
    }
}

impl FromStr for ReplacementPolicy {
    type Err = VmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "fifo" => Ok(ReplacementPolicy::Fifo),
            "1" | "lru" | "recency" => Ok(ReplacementPolicy::Lru),
            _ => Err(VmError::InvalidPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplacementPolicy::Fifo => write!(f, "FIFO"),
            ReplacementPolicy::Lru => write!(f, "LRU"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Link {
    /// Neighbour towards the head
    prev: Option<u8>,
    /// Neighbour towards the tail
    next: Option<u8>,
}

pub struct EvictionQueue {
    links: [Option<Link>; PAGES],
    head: Option<u8>,
    tail: Option<u8>,
    len: usize,
    capacity: usize,
}

impl EvictionQueue {
    pub fn new(capacity: usize) -> Self {
        assert!(
            capacity > 0 && capacity <= PAGES,
            "eviction queue capacity {} out of range",
            capacity
        );
        EvictionQueue {
            links: [None; PAGES],
            head: None,
            tail: None,
            len: 0,
            capacity,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    #[inline]
    pub fn contains(&self, page: u8) -> bool {
        self.links[page as usize].is_some()
    }

    /// Most recently queued or referenced page
    pub fn head(&self) -> Option<u8> {
        self.head
    }

    /// Next eviction victim
    pub fn tail(&self) -> Option<u8> {
        self.tail
    }

    /// Push a page at the head.
    ///
    /// Panics if the queue is full or already holds the page; either means
    /// the allocator skipped an eviction.
    pub fn enqueue(&mut self, page: u8) {
        assert!(
            !self.is_full(),
            "enqueue of page {} into full eviction queue ({} entries)",
            page,
            self.len
        );
        assert!(!self.contains(page), "page {} is already queued", page);

        self.links[page as usize] = Some(Link {
            prev: None,
            next: self.head,
        });
        match self.head {
            Some(old_head) => self.link_mut(old_head).prev = Some(page),
            None => self.tail = Some(page),
        }
        self.head = Some(page);
        self.len += 1;
    }

    /// Pop the tail page. Panics on an empty queue.
    pub fn dequeue(&mut self) -> u8 {
        let Some(victim) = self.tail else {
            panic!("dequeue from empty eviction queue");
        };
        self.unlink(victim);
        victim
    }

    /// Remove a page wherever it sits. Returns false if it was not queued.
    pub fn remove(&mut self, page: u8) -> bool {
        if !self.contains(page) {
            return false;
        }
        self.unlink(page);
        true
    }

    /// Move a queued page to the head. Returns false if it was not queued.
    pub fn reference(&mut self, page: u8) -> bool {
        if !self.contains(page) {
            return false;
        }
        if self.head != Some(page) {
            self.unlink(page);
            self.enqueue(page);
        }
        true
    }

    /// Pages from head (most recent) to tail (next victim)
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        std::iter::successors(self.head, move |&page| {
            self.links[page as usize].and_then(|link| link.next)
        })
    }

    fn link_mut(&mut self, page: u8) -> &mut Link {
        match self.links[page as usize].as_mut() {
            Some(link) => link,
            None => panic!("page {} has no queue link", page),
        }
    }

    fn unlink(&mut self, page: u8) {
        let Some(link) = self.links[page as usize].take() else {
            panic!("page {} is not queued", page);
        };
        match link.prev {
            Some(prev) => self.link_mut(prev).next = link.next,
            None => self.head = link.next,
        }
        match link.next {
            Some(next) => self.link_mut(next).prev = link.prev,
            None => self.tail = link.prev,
        }
        self.len -= 1;
    }
}
