use serde::{Deserialize, Serialize};

use crate::error::PaginationError;

/// Entries per page when nothing else is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Offset/limit pair for one page request.
///
/// Equality of descriptors is what the fetch controller uses to decide
/// whether a response still answers the page the user wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub limit: u32,
    pub offset: u64,
}

/// Pure: `{ limit: page_size, offset: page_size * page_number }`.
pub fn compute_source(page_size: u32, page_number: u64) -> RequestDescriptor {
    RequestDescriptor {
        limit: page_size,
        offset: u64::from(page_size).saturating_mul(page_number),
    }
}

/// Whether a next page may exist.
///
/// Heuristic: a full page suggests more data. The endpoint reports no total,
/// so a final page that happens to be exactly full still enables "next" and
/// the following request comes back empty.
pub fn has_next(current_page_len: usize, page_size: u32) -> bool {
    current_page_len == page_size as usize
}

/// Page index owner. Never negative, never errors after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationController {
    page_size: u32,
    page_number: u64,
}

impl PaginationController {
    pub fn new(page_size: u32) -> Result<Self, PaginationError> {
        if page_size == 0 {
            return Err(PaginationError::ZeroPageSize);
        }
        Ok(Self {
            page_size,
            page_number: 0,
        })
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn page_number(&self) -> u64 {
        self.page_number
    }

    pub fn offset(&self) -> u64 {
        self.descriptor().offset
    }

    /// Descriptor for the current page.
    pub fn descriptor(&self) -> RequestDescriptor {
        compute_source(self.page_size, self.page_number)
    }

    /// Moves by `delta` pages, clamping at page 0. Returns the new page number.
    pub fn change_page(&mut self, delta: i64) -> u64 {
        self.page_number = self.page_number.saturating_add_signed(delta);
        self.page_number
    }

    pub fn previous(&mut self) -> u64 {
        self.change_page(-1)
    }

    pub fn next(&mut self) -> u64 {
        self.change_page(1)
    }

    pub fn has_previous(&self) -> bool {
        self.page_number != 0
    }

    pub fn has_next(&self, current_page_len: usize) -> bool {
        has_next(current_page_len, self.page_size)
    }
}

impl Default for PaginationController {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page_number: 0,
        }
    }
}
