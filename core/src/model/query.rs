// stocktone/src/model/query.rs

use crate::config::DEFAULT_LIST_LIMIT;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
  PriceAsc,
  PriceDesc,
  NameAsc,
}

impl SortOrder {
  pub fn as_wire(&self) -> &'static str {
    match self {
      SortOrder::PriceAsc => "price_asc",
      SortOrder::PriceDesc => "price_desc",
      SortOrder::NameAsc => "name_asc",
    }
  }
}

impl FromStr for SortOrder {
  type Err = crate::SyncError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim() {
      "price_asc" => Ok(SortOrder::PriceAsc),
      "price_desc" => Ok(SortOrder::PriceDesc),
      "name_asc" | "name" => Ok(SortOrder::NameAsc),
      other => Err(crate::SyncError::InvalidInput(format!("unknown sort order '{}'", other))),
    }
  }
}

/// Parameters for the `list` action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
  pub q: Option<String>,
  pub category: Option<String>,
  pub status: Option<String>,
  pub limit: u32,
  pub sort: Option<SortOrder>,
  /// Applied client side; the store has no quantity filter.
  pub hide_out_of_stock: bool,
}

impl Default for ListQuery {
  fn default() -> Self {
    Self {
      q: None,
      category: None,
      status: None,
      limit: DEFAULT_LIST_LIMIT,
      sort: None,
      hide_out_of_stock: false,
    }
  }
}

impl ListQuery {
  pub fn search(q: impl Into<String>) -> Self {
    Self {
      q: Some(q.into()),
      ..Default::default()
    }
  }

  /// Query-string pairs sent with `action=list`. Blank values are omitted.
  pub fn to_params(&self) -> Vec<(&'static str, String)> {
    let mut params = vec![("limit", self.limit.to_string())];
    let non_blank = |v: &Option<String>| v.as_ref().map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    if let Some(q) = non_blank(&self.q) {
      params.push(("q", q));
    }
    if let Some(category) = non_blank(&self.category) {
      params.push(("category", category));
    }
    if let Some(status) = non_blank(&self.status) {
      params.push(("status", status));
    } else if self.hide_out_of_stock {
      params.push(("status", "active".to_string()));
    }
    if let Some(sort) = self.sort {
      params.push(("sort", sort.as_wire().to_string()));
    }
    params
  }
}
