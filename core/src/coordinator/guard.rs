// stocktone/src/coordinator/guard.rs

//! At most one in-flight mutation per SKU from this client.

use crate::error::{SyncError, SyncResult};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{event, Level};

#[derive(Debug, Clone, Default)]
pub struct SkuGuard {
  in_flight: Arc<Mutex<HashSet<String>>>,
}

impl SkuGuard {
  pub fn new() -> Self {
    Self::default()
  }

  /// Claims every SKU in `skus` or none of them. `Busy` names the first SKU
  /// already held.
  pub fn try_acquire(&self, skus: &[&str]) -> SyncResult<SkuLease> {
    let mut held = self.in_flight.lock();
    if let Some(busy) = skus.iter().find(|sku| held.contains(**sku)) {
      event!(Level::INFO, sku = %busy, "Rejecting mutation, SKU already in flight.");
      return Err(SyncError::Busy { sku: busy.to_string() });
    }

    let mut claimed = Vec::with_capacity(skus.len());
    for sku in skus {
      if held.insert(sku.to_string()) {
        claimed.push(sku.to_string());
      }
    }
    Ok(SkuLease {
      in_flight: Arc::clone(&self.in_flight),
      skus: claimed,
    })
  }

  pub fn is_held(&self, sku: &str) -> bool {
    self.in_flight.lock().contains(sku)
  }
}

/// Releases its SKUs when dropped, whichever way the flow ended.
#[derive(Debug)]
pub struct SkuLease {
  in_flight: Arc<Mutex<HashSet<String>>>,
  skus: Vec<String>,
}

impl Drop for SkuLease {
  fn drop(&mut self) {
    let mut held = self.in_flight.lock();
    for sku in &self.skus {
      held.remove(sku);
    }
  }
}
