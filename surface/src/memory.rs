//! Linear memory of a loaded unit.
//!
//! Structured arguments are built here by the host and handed to exports as
//! 32-bit offsets. All accesses are bounds-checked.

use alloc::vec;
use alloc::vec::Vec;

use crate::SurfaceError;

/// Page size in bytes (64 KB).
pub const PAGE_SIZE: usize = 65536;

/// Most pages a unit can address with a `u32` offset.
pub const MAX_PAGES: u32 = 65536;

/// Linear memory for one instance.
#[derive(Clone)]
pub struct LinearMemory {
    data: Vec<u8>,
    pages: u32,
    /// Per-instance cap, never above `MAX_PAGES`.
    limit: u32,
}

/// Bytes spanned by `pages` pages, or an error naming `what` when the count
/// is not addressable by a unit.
fn page_bytes(pages: u32, what: &str) -> Result<usize, SurfaceError> {
    if pages > MAX_PAGES {
        return Err(SurfaceError::MemoryError(alloc::format!(
            "linear memory: {} of {} pages is past the {}-page address space",
            what,
            pages,
            MAX_PAGES
        )));
    }
    usize::try_from(pages as u64 * PAGE_SIZE as u64).map_err(|_| {
        SurfaceError::MemoryError(alloc::format!(
            "linear memory: {} of {} pages does not fit this host",
            what,
            pages
        ))
    })
}

impl LinearMemory {
    /// Create a memory of `initial_pages`, growable up to `max_pages`
    /// (the whole address space when `None`).
    pub fn new(initial_pages: u32, max_pages: Option<u32>) -> Result<Self, SurfaceError> {
        let limit = max_pages.unwrap_or(MAX_PAGES);
        page_bytes(limit, "limit")?;
        if initial_pages > limit {
            return Err(SurfaceError::MemoryError(alloc::format!(
                "linear memory: {} initial pages above the {}-page limit",
                initial_pages,
                limit
            )));
        }
        let size = page_bytes(initial_pages, "initial size")?;

        Ok(LinearMemory {
            data: vec![0; size],
            pages: initial_pages,
            limit,
        })
    }

    /// Current size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Current size in pages.
    pub fn pages(&self) -> u32 {
        self.pages
    }

    /// Largest page count `grow` may reach.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Grow by `delta_pages`, returning the previous page count. New bytes
    /// are zero. On error the memory is unchanged.
    pub fn grow(&mut self, delta_pages: u32) -> Result<u32, SurfaceError> {
        let pages = match self.pages.checked_add(delta_pages) {
            Some(p) if p <= self.limit => p,
            _ => {
                return Err(SurfaceError::MemoryError(alloc::format!(
                    "linear memory: cannot grow {} pages by {} (limit {})",
                    self.pages,
                    delta_pages,
                    self.limit
                )))
            }
        };
        let size = page_bytes(pages, "grown size")?;

        let previous = self.pages;
        self.data.resize(size, 0);
        self.pages = pages;
        Ok(previous)
    }

    /// Read a little-endian u32.
    pub fn read_u32(&self, offset: usize) -> Result<u32, SurfaceError> {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(self.read_bytes(offset, 4)?);
        Ok(u32::from_le_bytes(bytes))
    }

    /// Read a little-endian i32.
    pub fn read_i32(&self, offset: usize) -> Result<i32, SurfaceError> {
        self.read_u32(offset).map(|v| v as i32)
    }

    pub fn read_bytes(&self, offset: usize, len: usize) -> Result<&[u8], SurfaceError> {
        self.check_range(offset, len)?;
        Ok(&self.data[offset..offset + len])
    }

    /// Write a little-endian u32.
    pub fn write_u32(&mut self, offset: usize, value: u32) -> Result<(), SurfaceError> {
        self.write_bytes(offset, &value.to_le_bytes())
    }

    /// Write a little-endian i32.
    pub fn write_i32(&mut self, offset: usize, value: i32) -> Result<(), SurfaceError> {
        self.write_bytes(offset, &value.to_le_bytes())
    }

    pub fn write_bytes(&mut self, offset: usize, bytes: &[u8]) -> Result<(), SurfaceError> {
        self.check_range(offset, bytes.len())?;
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Check that `[offset, offset + len)` lies inside the memory.
    pub fn check_range(&self, offset: usize, len: usize) -> Result<(), SurfaceError> {
        match offset.checked_add(len) {
            Some(end) if end <= self.data.len() => Ok(()),
            _ => Err(SurfaceError::MemoryError(alloc::format!(
                "linear memory: {} bytes at {:#x} outside {} bytes",
                len,
                offset,
                self.data.len()
            ))),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
