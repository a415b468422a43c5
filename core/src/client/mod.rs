// stocktone/src/client/mod.rs

//! Typed request/response boundary over the remote catalog store.
//!
//! Implementations perform exactly one round trip per call, carry no business
//! logic and never retry on their own. Bounded retries for reads are opt-in
//! through [`ReadRetry`].

pub mod http;
pub mod retry;
pub mod wire;

pub use http::HttpCatalogClient;
pub use retry::ReadRetry;

use crate::error::SyncResult;
use crate::model::{Direction, ListQuery, MovementReceipt, ProductDraft, ProductPatch, ProductRecord, UploadResult};
use crate::upload::ImagePayload;
use async_trait::async_trait;
use std::sync::Arc;

/// The seven operations of the remote store.
#[async_trait]
pub trait CatalogApi: Send + Sync {
  /// Ordered as the store returns them unless `query.sort` asks otherwise.
  /// An empty result is valid.
  async fn list(&self, query: &ListQuery) -> SyncResult<Vec<ProductRecord>>;

  async fn get(&self, sku: &str) -> SyncResult<ProductRecord>;

  /// Fails with `Conflict` when the SKU already exists.
  async fn add(&self, draft: &ProductDraft) -> SyncResult<ProductRecord>;

  /// `sku` is the lookup key; `rename_to` asks the store to change it.
  /// Returns `None` when the store acknowledges without echoing the row.
  async fn update(&self, sku: &str, patch: &ProductPatch, rename_to: Option<&str>)
    -> SyncResult<Option<ProductRecord>>;

  /// Soft delete flips the status; hard delete removes the row.
  async fn delete(&self, sku: &str, hard: bool) -> SyncResult<()>;

  async fn history_add(&self, sku: &str, direction: Direction, qty: u32, note: &str) -> SyncResult<MovementReceipt>;

  async fn upload_image(&self, payload: &ImagePayload, sku: Option<&str>) -> SyncResult<UploadResult>;
}

#[async_trait]
impl<T: CatalogApi + ?Sized> CatalogApi for Arc<T> {
  async fn list(&self, query: &ListQuery) -> SyncResult<Vec<ProductRecord>> {
    (**self).list(query).await
  }

  async fn get(&self, sku: &str) -> SyncResult<ProductRecord> {
    (**self).get(sku).await
  }

  async fn add(&self, draft: &ProductDraft) -> SyncResult<ProductRecord> {
    (**self).add(draft).await
  }

  async fn update(
    &self,
    sku: &str,
    patch: &ProductPatch,
    rename_to: Option<&str>,
  ) -> SyncResult<Option<ProductRecord>> {
    (**self).update(sku, patch, rename_to).await
  }

  async fn delete(&self, sku: &str, hard: bool) -> SyncResult<()> {
    (**self).delete(sku, hard).await
  }

  async fn history_add(&self, sku: &str, direction: Direction, qty: u32, note: &str) -> SyncResult<MovementReceipt> {
    (**self).history_add(sku, direction, qty, note).await
  }

  async fn upload_image(&self, payload: &ImagePayload, sku: Option<&str>) -> SyncResult<UploadResult> {
    (**self).upload_image(payload, sku).await
  }
}
