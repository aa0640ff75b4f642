//! # Pagination
//!
//! Query options and the page wrapper returned by list endpoints.
//! Sorting is expressed as `field:direction` pairs separated by commas,
//! e.g. `district:asc,createdAt:desc`.

use serde::{Deserialize, Serialize};

use crate::utils::constant::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

/// Raw pagination options as received from a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    pub sort_by: Option<String>,
    pub limit: Option<u32>,
    pub page: Option<u32>,
}

impl QueryOptions {
    /// Page size, clamped to `1..=MAX_PAGE_LIMIT`.
    pub fn limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT)
    }

    /// One-based page number.
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(self.limit())
    }

    /// Parses `sort_by` into `(field, direction)` pairs. Unknown directions
    /// fall back to ascending; empty segments are skipped.
    pub fn sort_keys(&self) -> Vec<(&str, SortOrder)> {
        let Some(sort_by) = self.sort_by.as_deref() else {
            return Vec::new();
        };

        sort_by
            .split(',')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(|segment| match segment.split_once(':') {
                Some((field, order)) => (field.trim(), SortOrder::parse(order.trim())),
                None => (segment, SortOrder::Asc),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("desc") {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub results: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub total_results: u64,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, options: &QueryOptions, total_results: u64) -> Self {
        let limit = options.limit();
        let total_pages = u32::try_from(total_results.div_ceil(u64::from(limit))).unwrap_or(u32::MAX);

        Self {
            results,
            page: options.page(),
            limit,
            total_pages,
            total_results,
        }
    }
}
