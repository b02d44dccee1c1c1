use crate::helpers::{calculate_current_page, calculate_total_pages, ensure_min};
use crate::types::PageRequest;

/// Read-only view of the current page window.
///
/// `has_next`/`has_previous` come from the server's continuation markers and
/// are never recomputed from `total`, which may be approximate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationSnapshot {
    pub total: u32,
    pub limit: u32,
    pub offset: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Partial update merged into the snapshot after a fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationUpdate {
    pub total: Option<u32>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub has_next: Option<bool>,
    pub has_previous: Option<bool>,
}

impl PaginationUpdate {
    /// A full update, every field set.
    pub fn all(total: u32, limit: u32, offset: u32, has_next: bool, has_previous: bool) -> Self {
        Self {
            total: Some(total),
            limit: Some(limit),
            offset: Some(offset),
            has_next: Some(has_next),
            has_previous: Some(has_previous),
        }
    }
}

/// Page/offset/limit bookkeeping. Never touches the network: the mutators
/// return the request the caller should issue, and the caller reports the
/// authoritative outcome back through [`PaginationState::update_pagination`].
#[derive(Debug, Clone)]
pub struct PaginationState {
    snapshot: PaginationSnapshot,
}

impl PaginationState {
    pub fn new(initial_limit: u32) -> Self {
        Self {
            snapshot: PaginationSnapshot {
                total: 0,
                limit: initial_limit,
                offset: 0,
                has_next: false,
                has_previous: false,
            },
        }
    }

    pub fn snapshot(&self) -> PaginationSnapshot {
        self.snapshot
    }

    pub fn limit(&self) -> u32 {
        self.snapshot.limit
    }

    pub fn current_page(&self) -> u32 {
        calculate_current_page(self.snapshot.offset, self.snapshot.limit)
    }

    pub fn total_pages(&self) -> u32 {
        calculate_total_pages(self.snapshot.total, self.snapshot.limit)
    }

    pub fn update_pagination(&mut self, update: PaginationUpdate) {
        let s = &mut self.snapshot;
        if let Some(total) = update.total {
            s.total = total;
        }
        if let Some(limit) = update.limit {
            s.limit = limit;
        }
        if let Some(offset) = update.offset {
            s.offset = offset;
        }
        if let Some(has_next) = update.has_next {
            s.has_next = has_next;
        }
        if let Some(has_previous) = update.has_previous {
            s.has_previous = has_previous;
        }
    }

    /// `page` is zero-based; UI page N maps to `page = N - 1`.
    pub fn go_to_page(&mut self, page: u32) -> PageRequest {
        let limit = self.snapshot.limit;
        let offset = page.saturating_mul(limit);
        self.snapshot.offset = offset;
        PageRequest { limit, offset }
    }

    pub fn load_next_page(&mut self) -> Option<PageRequest> {
        if !self.snapshot.has_next {
            return None;
        }
        let limit = self.snapshot.limit;
        let offset = self.snapshot.offset.saturating_add(limit);
        self.snapshot.offset = offset;
        Some(PageRequest { limit, offset })
    }

    pub fn load_previous_page(&mut self) -> Option<PageRequest> {
        if !self.snapshot.has_previous {
            return None;
        }
        let limit = self.snapshot.limit;
        let offset = ensure_min(i64::from(self.snapshot.offset) - i64::from(limit), 0) as u32;
        self.snapshot.offset = offset;
        Some(PageRequest { limit, offset })
    }

    /// A new page size invalidates the current offset, so it always restarts at 0.
    pub fn change_limit(&mut self, new_limit: u32) -> PageRequest {
        self.snapshot.limit = new_limit;
        self.snapshot.offset = 0;
        PageRequest {
            limit: new_limit,
            offset: 0,
        }
    }

    pub fn reset_pagination(&mut self) {
        self.snapshot.offset = 0;
    }
}
