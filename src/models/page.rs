use serde::Serialize;

/// A 1-based page request. `limit` is already resolved against the configured
/// default and maximum by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    #[must_use]
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Zero-based index for `sea-orm` paginators.
    #[must_use]
    pub const fn index(&self) -> u64 {
        self.page - 1
    }
}

/// One page of results with the total count and neighbouring page numbers.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<u64>,
    pub previous: Option<u64>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(results: Vec<T>, count: u64, request: PageRequest) -> Self {
        let last_page = count.div_ceil(request.limit).max(1);
        let next = (request.page < last_page).then_some(request.page + 1);
        let previous = (request.page > 1).then(|| (request.page - 1).min(last_page));

        Self {
            count,
            next,
            previous,
            results,
        }
    }
}
