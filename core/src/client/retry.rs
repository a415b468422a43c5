// stocktone/src/client/retry.rs

//! Bounded retry for the idempotent reads (`list`, `get`).
//!
//! Only `NetworkError` is retried. Every mutation passes straight through to
//! the wrapped client exactly once.

use super::CatalogApi;
use crate::config::{SyncConfig, MAX_READ_RETRY_DELAY};
use crate::error::SyncResult;
use crate::model::{Direction, ListQuery, MovementReceipt, ProductDraft, ProductPatch, ProductRecord, UploadResult};
use crate::upload::ImagePayload;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::{event, Level};

#[derive(Debug, Clone)]
pub struct ReadRetry<C> {
  inner: C,
  retries: u32,
  delay: Duration,
}

impl<C: CatalogApi> ReadRetry<C> {
  /// `delay` is capped at `MAX_READ_RETRY_DELAY`.
  pub fn new(inner: C, retries: u32, delay: Duration) -> Self {
    Self {
      inner,
      retries,
      delay: delay.min(MAX_READ_RETRY_DELAY),
    }
  }

  pub fn from_config(inner: C, config: &SyncConfig) -> Self {
    Self::new(inner, config.read_retries, config.read_retry_delay)
  }

  async fn with_retry<T, F, Fut>(&self, op_name: &'static str, mut op: F) -> SyncResult<T>
  where
    F: FnMut() -> Fut + Send,
    Fut: Future<Output = SyncResult<T>> + Send,
    T: Send,
  {
    let mut attempt = 0u32;
    loop {
      match op().await {
        Err(err) if err.is_transient() && attempt < self.retries => {
          attempt += 1;
          event!(Level::WARN, op = op_name, attempt, error = %err, "Transient read failure, retrying.");
          // Linear backoff
          tokio::time::sleep(self.delay.saturating_mul(attempt)).await;
        }
        other => return other,
      }
    }
  }
}

#[async_trait]
impl<C: CatalogApi> CatalogApi for ReadRetry<C> {
  async fn list(&self, query: &ListQuery) -> SyncResult<Vec<ProductRecord>> {
    self.with_retry("list", || self.inner.list(query)).await
  }

  async fn get(&self, sku: &str) -> SyncResult<ProductRecord> {
    self.with_retry("get", || self.inner.get(sku)).await
  }

  async fn add(&self, draft: &ProductDraft) -> SyncResult<ProductRecord> {
    self.inner.add(draft).await
  }

  async fn update(
    &self,
    sku: &str,
    patch: &ProductPatch,
    rename_to: Option<&str>,
  ) -> SyncResult<Option<ProductRecord>> {
    self.inner.update(sku, patch, rename_to).await
  }

  async fn delete(&self, sku: &str, hard: bool) -> SyncResult<()> {
    self.inner.delete(sku, hard).await
  }

  async fn history_add(&self, sku: &str, direction: Direction, qty: u32, note: &str) -> SyncResult<MovementReceipt> {
    self.inner.history_add(sku, direction, qty, note).await
  }

  async fn upload_image(&self, payload: &ImagePayload, sku: Option<&str>) -> SyncResult<UploadResult> {
    self.inner.upload_image(payload, sku).await
  }
}
