// stocktone/src/view.rs

//! The read-only projection consumed for display.
//!
//! The coordinator only talks to it through [`CatalogViewModel`]: it asks for
//! the current list query before Settling and hands the resulting records
//! back, tagged with a settle sequence number. Rendering is somebody else's job.

use crate::model::{ListQuery, ProductRecord, SortOrder};
use parking_lot::RwLock;
use std::collections::BTreeSet;
use tracing::{event, Level};

pub trait CatalogViewModel: Send + Sync {
  /// Parameters for the next `list` issued by Settling.
  fn query(&self) -> ListQuery;

  /// Replaces the projection with `records` unless a settle with a higher
  /// `seq` has already been applied. Returns whether the records were applied.
  fn refresh(&self, seq: u64, records: Vec<ProductRecord>) -> bool;
}

#[derive(Debug, Default)]
struct ProjectionInner {
  query: ListQuery,
  records: Vec<ProductRecord>,
  applied_seq: u64,
}

/// Default in-memory view model.
///
/// Applies the catalog page's client-side rules on refresh: optional sort by
/// price or name, and hiding rows with no stock.
#[derive(Debug, Default)]
pub struct CatalogProjection {
  inner: RwLock<ProjectionInner>,
}

impl CatalogProjection {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_query(query: ListQuery) -> Self {
    Self {
      inner: RwLock::new(ProjectionInner {
        query,
        ..Default::default()
      }),
    }
  }

  pub fn set_search(&self, q: Option<String>) {
    self.inner.write().query.q = q.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
  }

  pub fn set_category(&self, category: Option<String>) {
    self.inner.write().query.category = category.filter(|c| !c.trim().is_empty());
  }

  pub fn set_sort(&self, sort: Option<SortOrder>) {
    self.inner.write().query.sort = sort;
  }

  pub fn set_hide_out_of_stock(&self, hide: bool) {
    self.inner.write().query.hide_out_of_stock = hide;
  }

  pub fn records(&self) -> Vec<ProductRecord> {
    self.inner.read().records.clone()
  }

  pub fn len(&self) -> usize {
    self.inner.read().records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.inner.read().records.is_empty()
  }

  pub fn find(&self, sku: &str) -> Option<ProductRecord> {
    self.inner.read().records.iter().find(|r| r.sku == sku).cloned()
  }

  /// Distinct, non-blank categories of the current rows, sorted.
  pub fn categories(&self) -> Vec<String> {
    let inner = self.inner.read();
    inner
      .records
      .iter()
      .map(|r| r.category.trim())
      .filter(|c| !c.is_empty())
      .map(str::to_string)
      .collect::<BTreeSet<_>>()
      .into_iter()
      .collect()
  }

  pub fn applied_seq(&self) -> u64 {
    self.inner.read().applied_seq
  }
}

impl CatalogViewModel for CatalogProjection {
  fn query(&self) -> ListQuery {
    self.inner.read().query.clone()
  }

  fn refresh(&self, seq: u64, mut records: Vec<ProductRecord>) -> bool {
    let mut inner = self.inner.write();
    if seq < inner.applied_seq {
      event!(Level::DEBUG, seq, applied_seq = inner.applied_seq, "Discarding stale settle result.");
      return false;
    }

    apply_client_rules(&inner.query, &mut records);
    inner.records = records;
    inner.applied_seq = seq;
    event!(Level::DEBUG, seq, count = inner.records.len(), "Projection replaced.");
    true
  }
}

fn apply_client_rules(query: &ListQuery, records: &mut Vec<ProductRecord>) {
  match query.sort {
    Some(SortOrder::PriceAsc) => records.sort_by(|a, b| a.cost.cmp(&b.cost)),
    Some(SortOrder::PriceDesc) => records.sort_by(|a, b| b.cost.cmp(&a.cost)),
    Some(SortOrder::NameAsc) => records.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
    None => {}
  }
  if query.hide_out_of_stock {
    records.retain(|r| r.quantity > 0);
  }
}
