//! Read-only upstream sources for each record kind.
//!
//! Sources reshape third-party payloads into records and report the
//! upstream total. They know nothing about local edits.

mod api_types;
mod berries;
mod client;
mod products;

use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::cache::Record;

pub use berries::BerriesSource;
pub use products::ProductsSource;

/// Which page to fetch. Pages are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
  pub page: u32,
  pub limit: u32,
  pub search: Option<String>,
}

impl PageQuery {
  pub fn new(page: u32, limit: u32) -> Self {
    Self {
      page: page.max(1),
      limit,
      search: None,
    }
  }

  pub fn with_search(mut self, search: Option<String>) -> Self {
    self.search = search.filter(|s| !s.trim().is_empty());
    self
  }

  /// Zero-based index of the first record on this page.
  pub fn offset(&self) -> u64 {
    u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
  pub total: u64,
  pub page: u32,
  pub limit: u32,
  pub page_count: u64,
}

impl PageMeta {
  pub fn new(total: u64, page: u32, limit: u32) -> Self {
    Self {
      total,
      page,
      limit,
      page_count: page_count(total, limit),
    }
  }
}

/// Number of pages needed for `total` records at `limit` per page.
pub fn page_count(total: u64, limit: u32) -> u64 {
  if limit == 0 {
    return 0;
  }
  total.div_ceil(u64::from(limit))
}

/// One page of canonical records plus the upstream's pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<R> {
  pub data: Vec<R>,
  pub meta: PageMeta,
}

/// An external, read-only source of canonical records.
pub trait RemoteSource: Send + Sync {
  type Record: Record;

  /// Fetch one page of canonical records and the upstream total.
  fn fetch_page(
    &self,
    query: &PageQuery,
  ) -> impl Future<Output = Result<Page<Self::Record>>> + Send;

  /// Fetch a single canonical record; `None` if upstream has no such id.
  fn fetch_one(&self, id: &str) -> impl Future<Output = Result<Option<Self::Record>>> + Send;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_page_count_rounds_up() {
    assert_eq!(page_count(20, 10), 2);
    assert_eq!(page_count(21, 10), 3);
    assert_eq!(page_count(0, 10), 0);
    assert_eq!(page_count(5, 0), 0);
  }

  #[test]
  fn test_query_offset() {
    assert_eq!(PageQuery::new(1, 10).offset(), 0);
    assert_eq!(PageQuery::new(3, 10).offset(), 20);
    // Page 0 is clamped to the first page
    assert_eq!(PageQuery::new(0, 10).page, 1);
  }

  #[test]
  fn test_blank_search_is_dropped() {
    let query = PageQuery::new(1, 10).with_search(Some("  ".to_string()));
    assert_eq!(query.search, None);
  }

  #[test]
  fn test_meta_wire_names() {
    let json = serde_json::to_value(PageMeta::new(64, 2, 10)).unwrap();
    assert_eq!(json["pageCount"], 7);
  }
}
