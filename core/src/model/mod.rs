// stocktone/src/model/mod.rs

//! Typed catalog entities. Everything the remote store returns is parsed into
//! these shapes at the client boundary.

pub mod movement;
pub mod product;
pub mod query;
pub mod serde_helpers;

pub use movement::{Direction, MovementReceipt, StockMovement};
pub use product::{ProductDraft, ProductPatch, ProductRecord, ProductStatus};
pub use query::{ListQuery, SortOrder};

use serde::{Deserialize, Serialize};

/// Outcome of a successful image upload: a publicly resolvable URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
  pub url: String,
  pub filename: String,
  pub content_type: String,
}

/// Trims a SKU and rejects it when nothing is left.
pub fn normalize_sku(raw: &str) -> crate::SyncResult<String> {
  let sku = raw.trim();
  if sku.is_empty() {
    return Err(crate::SyncError::InvalidInput("SKU must not be empty".to_string()));
  }
  Ok(sku.to_string())
}
