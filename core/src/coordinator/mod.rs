// stocktone/src/coordinator/mod.rs

//! Sequences multi-step writes against a store that only offers single-record
//! atomicity, and decides which partial failures are safe to report as success.
//!
//! Rules the flows follow:
//!  - An attached image is uploaded before any write that references its URL.
//!  - One in-flight mutation per SKU; a second one is refused with `Busy`
//!    before any network activity.
//!  - Rename never undoes its add. If retiring the old row fails the result is
//!    a duplicate plus a warning, never a lost record.
//!  - An image uploaded for a write that then fails is left where it is.
//!  - The projection is replaced whole at Settling, never piecemeal.

pub mod context;
pub mod flows;
pub mod guard;

pub use context::{AddRequest, DeleteRequest, MutationReport, StockRequest, SyncWarning, UpdateRequest};
pub use guard::{SkuGuard, SkuLease};

use crate::client::CatalogApi;
use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::flow::{Flow, FlowState};
use crate::model::normalize_sku;
use crate::upload::{self, ImageFile, ImagePayload};
use crate::view::CatalogViewModel;
use context::{MutationCtx, Operation, SyncDeps};
use flows::SyncFlows;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use tracing::{event, instrument, Level};

pub struct CatalogSyncCoordinator {
  deps: SyncDeps,
  guard: SkuGuard,
  flows: SyncFlows,
  max_image_bytes: usize,
}

impl CatalogSyncCoordinator {
  pub fn new(api: Arc<dyn CatalogApi>, view: Arc<dyn CatalogViewModel>, config: &SyncConfig) -> Self {
    Self {
      deps: SyncDeps {
        api,
        view,
        settle_seq: Arc::new(AtomicU64::new(0)),
      },
      guard: SkuGuard::new(),
      flows: SyncFlows::build(),
      max_image_bytes: config.max_image_bytes,
    }
  }

  pub fn is_busy(&self, sku: &str) -> bool {
    self.guard.is_held(sku.trim())
  }

  #[instrument(name = "CatalogSyncCoordinator::add", skip_all, fields(sku = %request.draft.sku), err(Display))]
  pub async fn add(&self, request: AddRequest) -> SyncResult<MutationReport> {
    let AddRequest { mut draft, image } = request;
    draft.sku = normalize_sku(&draft.sku)?;
    draft.validate()?;
    let payload = self.prepare_image(image.as_ref())?;

    let _lease = self.guard.try_acquire(&[draft.sku.as_str()])?;
    let sku = draft.sku.clone();
    self
      .execute(&self.flows.add, sku, Operation::Add { draft }, payload)
      .await
  }

  /// In-place update, or rename when `rename_to` names a different SKU.
  #[instrument(
    name = "CatalogSyncCoordinator::update",
    skip_all,
    fields(sku = %request.sku, rename_to = ?request.rename_to),
    err(Display)
  )]
  pub async fn update(&self, request: UpdateRequest) -> SyncResult<MutationReport> {
    let sku = normalize_sku(&request.sku)?;
    request.patch.validate()?;
    let target = match request.rename_to.as_deref() {
      Some(raw) => Some(normalize_sku(raw)?).filter(|t| *t != sku),
      None => None,
    };

    match target {
      Some(target) => {
        let payload = self.prepare_image(request.image.as_ref())?;
        let _lease = self.guard.try_acquire(&[sku.as_str(), target.as_str()])?;
        let op = Operation::Rename {
          patch: request.patch,
          target,
          hard_delete_old: request.hard_delete_old,
        };
        self.execute(&self.flows.rename, sku, op, payload).await
      }
      None => {
        if request.patch.is_empty() && request.image.is_none() {
          return Err(SyncError::InvalidInput(format!("nothing to update for '{}'", sku)));
        }
        let payload = self.prepare_image(request.image.as_ref())?;
        let _lease = self.guard.try_acquire(&[sku.as_str()])?;
        let op = Operation::Update { patch: request.patch };
        self.execute(&self.flows.update, sku, op, payload).await
      }
    }
  }

  /// Appends a ledger entry. A quantity of zero or less never leaves the process.
  #[instrument(
    name = "CatalogSyncCoordinator::record_movement",
    skip_all,
    fields(sku = %request.sku, direction = %request.direction, qty = request.quantity),
    err(Display)
  )]
  pub async fn record_movement(&self, request: StockRequest) -> SyncResult<MutationReport> {
    if request.quantity <= 0 {
      return Err(SyncError::InvalidInput(format!(
        "movement quantity must be positive (got {})",
        request.quantity
      )));
    }
    let qty = u32::try_from(request.quantity)
      .map_err(|_| SyncError::InvalidInput(format!("movement quantity too large: {}", request.quantity)))?;
    let sku = normalize_sku(&request.sku)?;
    let note = request
      .note
      .map(|n| n.trim().to_string())
      .filter(|n| !n.is_empty())
      .unwrap_or_else(|| request.direction.default_note().to_string());

    let _lease = self.guard.try_acquire(&[sku.as_str()])?;
    let op = Operation::Movement {
      direction: request.direction,
      qty,
      note,
    };
    self.execute(&self.flows.movement, sku, op, None).await
  }

  #[instrument(name = "CatalogSyncCoordinator::delete", skip_all, fields(sku = %request.sku, hard = request.hard), err(Display))]
  pub async fn delete(&self, request: DeleteRequest) -> SyncResult<MutationReport> {
    let sku = normalize_sku(&request.sku)?;
    let _lease = self.guard.try_acquire(&[sku.as_str()])?;
    self
      .execute(&self.flows.delete, sku, Operation::Delete { hard: request.hard }, None)
      .await
  }

  /// Settling on demand (after login, or when the operator changes the query).
  /// Returns whether the fresh rows were applied to the view.
  #[instrument(name = "CatalogSyncCoordinator::refresh", skip_all, err(Display))]
  pub async fn refresh(&self) -> SyncResult<bool> {
    flows::settle(&self.deps).await
  }

  fn prepare_image(&self, image: Option<&ImageFile>) -> SyncResult<Option<ImagePayload>> {
    image
      .map(|image| upload::prepare(image, self.max_image_bytes))
      .transpose()
  }

  async fn execute(
    &self,
    flow: &Flow<MutationCtx>,
    sku: String,
    op: Operation,
    image: Option<ImagePayload>,
  ) -> SyncResult<MutationReport> {
    let state = FlowState::new(MutationCtx::new(self.deps.clone(), sku, op, image));

    match flow.run(state.clone()).await {
      Ok(_) => {
        let report = state.read().report();
        event!(
          Level::INFO,
          sku = %report.sku,
          warnings = report.warnings.len(),
          projection_applied = report.projection_applied,
          "Mutation settled."
        );
        Ok(report)
      }
      Err(err) => {
        let orphaned = state.read().upload.as_ref().map(|u| u.url.clone());
        if let Some(url) = orphaned {
          event!(Level::WARN, %url, error = %err, "Write failed after upload; uploaded image left orphaned.");
        }
        Err(err)
      }
    }
  }
}
