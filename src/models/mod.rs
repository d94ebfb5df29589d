pub mod account;
pub mod audit;
pub mod blog;
pub mod bookings;
pub mod content;
pub mod gallery;
pub mod pricing;
pub mod review;
pub mod route;
pub mod settings;
pub mod vehicle;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
}

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Normalises 1-based page/limit query parameters into (page, limit, skip).
pub fn paging(page: Option<u64>, limit: Option<u64>) -> (u64, u64, u64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    (page, limit, (page - 1) * limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paging_defaults_and_clamps() {
        assert_eq!(paging(None, None), (1, DEFAULT_PAGE_SIZE, 0));
        assert_eq!(paging(Some(0), Some(0)), (1, 1, 0));
        assert_eq!(paging(Some(3), Some(10)), (3, 10, 20));
        assert_eq!(paging(Some(2), Some(1000)), (2, MAX_PAGE_SIZE, MAX_PAGE_SIZE));
    }
}
