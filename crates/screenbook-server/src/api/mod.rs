//! HTTP handlers, grouped by resource.

pub mod auth;
pub mod bookings;
pub mod events;
pub mod files;
pub mod health;
pub mod profile;
pub mod results;

use screenbook_core::repository::Pagination;
use serde::Deserialize;

const MAX_PAGE_SIZE: u64 = 100;

/// `?offset=&limit=` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl From<PageQuery> for Pagination {
    fn from(q: PageQuery) -> Self {
        let defaults = Pagination::default();
        Self {
            offset: q.offset.unwrap_or(defaults.offset),
            limit: q.limit.unwrap_or(defaults.limit).clamp(1, MAX_PAGE_SIZE),
        }
    }
}
