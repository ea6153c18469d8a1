use std::fs::File;
use std::path::{Path, PathBuf};

use log::warn;

use crate::constants::*;
use crate::error::{Result, VmError};

/// Simulated main memory: `FRAMES` frames of `PAGE_SIZE` signed bytes
pub struct PhysicalMemory {
    data: Box<[i8]>,
}

impl PhysicalMemory {
    /// Create a new physical memory initialized to all zeros
    pub fn new() -> Self {
        let data = vec![0i8; MEMORY_SIZE].into_boxed_slice();
        assert_eq!(data.len(), MEMORY_SIZE);
        PhysicalMemory { data }
    }

    /// Read a byte from physical memory
    #[inline]
    pub fn read(&self, address: usize) -> i8 {
        self.data[address]
    }

    /// Calculate the starting address of a frame
    #[inline]
    pub fn frame_to_address(frame: u8) -> usize {
        frame as usize * PAGE_SIZE
    }

    /// Borrow one frame's bytes
    pub fn frame(&self, frame: u8) -> &[i8] {
        let start = Self::frame_to_address(frame);
        &self.data[start..start + PAGE_SIZE]
    }

    /// Copy a page-sized block into a frame, overwriting its previous contents
    pub fn load_frame(&mut self, frame: u8, page: &[u8]) {
        assert_eq!(page.len(), PAGE_SIZE, "page block must be exactly one page");
        let start = Self::frame_to_address(frame);
        for (dst, &src) in self.data[start..start + PAGE_SIZE].iter_mut().zip(page) {
            *dst = src as i8;
        }
    }
}

impl Default for PhysicalMemory {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only source of every logical page's initial contents
pub trait BackingStore {
    /// The whole store, at least `VIRTUAL_MEMORY_SIZE` bytes long
    fn bytes(&self) -> &[u8];

    /// The `PAGE_SIZE` bytes backing one logical page
    fn page(&self, page: u8) -> &[u8] {
        let start = page as usize * PAGE_SIZE;
        &self.bytes()[start..start + PAGE_SIZE]
    }
}

fn check_store_len(len: usize) -> Result<()> {
    if len < VIRTUAL_MEMORY_SIZE {
        return Err(VmError::BackingStoreTooSmall {
            len,
            expected: VIRTUAL_MEMORY_SIZE,
        });
    }
    if len > VIRTUAL_MEMORY_SIZE {
        warn!(
            "Backing store holds {} bytes; only the first {} are addressable",
            len, VIRTUAL_MEMORY_SIZE
        );
    }
    Ok(())
}

/// Backing store mapped read-only from a file
#[derive(Debug)]
pub struct MappedBackingStore {
    mmap: memmap2::Mmap,
    path: PathBuf,
}

impl MappedBackingStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let open_err = |source: std::io::Error| VmError::BackingStoreOpen {
            path: path.clone(),
            source,
        };

        let file = File::open(&path).map_err(open_err)?;
        let len = file.metadata().map_err(open_err)?.len() as usize;
        // Zero-length maps fail on some platforms, so reject short files first.
        check_store_len(len)?;

        // SAFETY: the file is opened read-only and the store is never written
        // through the mapping. Truncating it externally while mapped is unsupported.
        let mmap = unsafe {
            memmap2::MmapOptions::new()
                .len(VIRTUAL_MEMORY_SIZE)
                .map(&file)
                .map_err(open_err)?
        };

        Ok(Self { mmap, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BackingStore for MappedBackingStore {
    fn bytes(&self) -> &[u8] {
        &self.mmap
    }
}

/// Backing store held in an owned buffer
#[derive(Debug, Clone)]
pub struct InMemoryBackingStore {
    data: Vec<u8>,
}

impl InMemoryBackingStore {
    pub fn new(data: Vec<u8>) -> Result<Self> {
        check_store_len(data.len())?;
        Ok(Self { data })
    }

    /// Build a store whose byte at logical address `a` is `f(a)`
    pub fn from_fn(f: impl Fn(usize) -> u8) -> Self {
        Self {
            data: (0..VIRTUAL_MEMORY_SIZE).map(f).collect(),
        }
    }
}

impl BackingStore for InMemoryBackingStore {
    fn bytes(&self) -> &[u8] {
        &self.data
    }
}
