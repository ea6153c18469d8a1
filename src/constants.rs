pub const OFFSET_BITS: u32 = 8;
pub const PAGE_BITS: u32 = 8;

pub const PAGE_SIZE: usize = 1 << OFFSET_BITS;
pub const PAGES: usize = 1 << PAGE_BITS;
pub const FRAMES: usize = 64;
pub const TLB_SIZE: usize = 16;

pub const MEMORY_SIZE: usize = FRAMES * PAGE_SIZE;
pub const VIRTUAL_MEMORY_SIZE: usize = PAGES * PAGE_SIZE;

pub const OFFSET_MASK: u32 = (1 << OFFSET_BITS) - 1;
pub const PAGE_MASK: u32 = (1 << PAGE_BITS) - 1;
pub const ADDRESS_MASK: u32 = (1 << (PAGE_BITS + OFFSET_BITS)) - 1;

pub const PAGE_SHIFT: u32 = OFFSET_BITS;
