// stocktone/src/coordinator/context.rs

//! Requests, reports and the flow data every mutation runs on.

use crate::client::CatalogApi;
use crate::flow::{PhaseTracking, SyncPhase};
use crate::model::{Direction, ProductDraft, ProductPatch, ProductRecord, UploadResult};
use crate::upload::{ImageFile, ImagePayload};
use crate::view::CatalogViewModel;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

// --- Requests ---

#[derive(Debug, Clone)]
pub struct AddRequest {
  pub draft: ProductDraft,
  pub image: Option<ImageFile>,
}

impl AddRequest {
  pub fn new(draft: ProductDraft) -> Self {
    Self { draft, image: None }
  }

  pub fn with_image(mut self, image: ImageFile) -> Self {
    self.image = Some(image);
    self
  }
}

/// In-place update, or a rename when `rename_to` names a different SKU.
#[derive(Debug, Clone, Default)]
pub struct UpdateRequest {
  pub sku: String,
  pub patch: ProductPatch,
  pub image: Option<ImageFile>,
  pub rename_to: Option<String>,
  /// Rename only: remove the old row instead of flipping its status.
  pub hard_delete_old: bool,
}

impl UpdateRequest {
  pub fn new(sku: impl Into<String>, patch: ProductPatch) -> Self {
    Self {
      sku: sku.into(),
      patch,
      ..Default::default()
    }
  }

  pub fn with_image(mut self, image: ImageFile) -> Self {
    self.image = Some(image);
    self
  }

  pub fn rename_to(mut self, target: impl Into<String>) -> Self {
    self.rename_to = Some(target.into());
    self
  }
}

#[derive(Debug, Clone)]
pub struct StockRequest {
  pub sku: String,
  pub direction: Direction,
  /// Signed so that a zero or negative entry from the operator can be refused locally.
  pub quantity: i64,
  pub note: Option<String>,
}

impl StockRequest {
  pub fn new(sku: impl Into<String>, direction: Direction, quantity: i64) -> Self {
    Self {
      sku: sku.into(),
      direction,
      quantity,
      note: None,
    }
  }

  pub fn with_note(mut self, note: impl Into<String>) -> Self {
    self.note = Some(note.into());
    self
  }
}

#[derive(Debug, Clone)]
pub struct DeleteRequest {
  pub sku: String,
  pub hard: bool,
}

impl DeleteRequest {
  pub fn soft(sku: impl Into<String>) -> Self {
    Self { sku: sku.into(), hard: false }
  }

  pub fn hard(sku: impl Into<String>) -> Self {
    Self { sku: sku.into(), hard: true }
  }
}

// --- Reports ---

/// Partial failures that still count as success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncWarning {
  /// Rename wrote the new record but could not retire the old one. Both rows exist.
  RenameCleanupFailed { old_sku: String, reason: String },
  /// The write stands; only the projection could not be refreshed.
  RefreshFailed { reason: String },
}

#[derive(Debug, Clone)]
pub struct MutationReport {
  /// SKU the record lives under once the mutation is done (the target for a rename).
  pub sku: String,
  pub phases: Vec<SyncPhase>,
  pub record: Option<ProductRecord>,
  pub upload: Option<UploadResult>,
  pub resulting_quantity: Option<u32>,
  pub warnings: Vec<SyncWarning>,
  pub projection_applied: bool,
}

impl MutationReport {
  pub fn final_phase(&self) -> SyncPhase {
    self.phases.last().copied().unwrap_or(SyncPhase::Idle)
  }

  pub fn has_warnings(&self) -> bool {
    !self.warnings.is_empty()
  }
}

// --- Flow data ---

#[derive(Clone)]
pub(crate) struct SyncDeps {
  pub api: Arc<dyn CatalogApi>,
  pub view: Arc<dyn CatalogViewModel>,
  pub settle_seq: Arc<AtomicU64>,
}

#[derive(Debug, Clone)]
pub(crate) enum Operation {
  Add {
    draft: ProductDraft,
  },
  Update {
    patch: ProductPatch,
  },
  Rename {
    patch: ProductPatch,
    target: String,
    hard_delete_old: bool,
  },
  Movement {
    direction: Direction,
    qty: u32,
    note: String,
  },
  Delete {
    hard: bool,
  },
}

pub(crate) struct MutationCtx {
  pub deps: SyncDeps,
  pub sku: String,
  pub op: Operation,
  /// Already validated and encoded; `None` skips the Uploading phase.
  pub image: Option<ImagePayload>,

  pub phases: Vec<SyncPhase>,
  /// Rename: the row being moved, as read before any write.
  pub source: Option<ProductRecord>,
  pub upload: Option<UploadResult>,
  pub record: Option<ProductRecord>,
  pub resulting_quantity: Option<u32>,
  pub warnings: Vec<SyncWarning>,
  pub projection_applied: bool,
}

impl MutationCtx {
  pub fn new(deps: SyncDeps, sku: String, op: Operation, image: Option<ImagePayload>) -> Self {
    Self {
      deps,
      sku,
      op,
      image,
      phases: vec![SyncPhase::Idle],
      source: None,
      upload: None,
      record: None,
      resulting_quantity: None,
      warnings: Vec::new(),
      projection_applied: false,
    }
  }

  /// The SKU the record ends up under.
  pub fn target_sku(&self) -> &str {
    match &self.op {
      Operation::Rename { target, .. } => target,
      _ => &self.sku,
    }
  }

  pub fn report(&self) -> MutationReport {
    MutationReport {
      sku: self.target_sku().to_string(),
      phases: self.phases.clone(),
      record: self.record.clone(),
      upload: self.upload.clone(),
      resulting_quantity: self.resulting_quantity,
      warnings: self.warnings.clone(),
      projection_applied: self.projection_applied,
    }
  }
}

impl PhaseTracking for MutationCtx {
  fn enter_phase(&mut self, phase: SyncPhase) {
    if self.current_phase() != phase {
      self.phases.push(phase);
    }
  }

  fn current_phase(&self) -> SyncPhase {
    self.phases.last().copied().unwrap_or(SyncPhase::Idle)
  }
}
