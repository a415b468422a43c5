// stocktone/src/coordinator/flows.rs

//! Flow definitions for each mutation kind and the step handlers behind them.
//!
//! Handlers copy what they need out of the state, drop the guard, do one
//! remote call, then write the result back.

use super::context::{MutationCtx, Operation, SyncDeps, SyncWarning};
use crate::error::{SyncError, SyncResult};
use crate::flow::{Flow, FlowState, SkipCondition, StepControl, SyncPhase};
use crate::model::ProductPatch;
use crate::upload::ImageUploadPipeline;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{event, Level};

pub(crate) struct SyncFlows {
  pub add: Flow<MutationCtx>,
  pub update: Flow<MutationCtx>,
  pub rename: Flow<MutationCtx>,
  pub movement: Flow<MutationCtx>,
  pub delete: Flow<MutationCtx>,
}

impl SyncFlows {
  pub fn build() -> Self {
    Self {
      add: add_flow(),
      update: update_flow(),
      rename: rename_flow(),
      movement: movement_flow(),
      delete: delete_flow(),
    }
  }
}

fn no_image() -> Option<SkipCondition<MutationCtx>> {
  Some(Arc::new(|state: FlowState<MutationCtx>| state.read().image.is_none()))
}

pub(crate) fn add_flow() -> Flow<MutationCtx> {
  let mut flow = Flow::new(
    "add",
    &[
      ("upload_image", SyncPhase::Uploading, false, no_image()),
      ("add_record", SyncPhase::Writing, false, None),
      ("settle_projection", SyncPhase::Settling, false, None),
    ],
  );
  flow.on("upload_image", upload_image);
  flow.on("add_record", add_record);
  flow.on("settle_projection", settle_projection);
  flow
}

pub(crate) fn update_flow() -> Flow<MutationCtx> {
  let mut flow = Flow::new(
    "update",
    &[
      ("upload_image", SyncPhase::Uploading, false, no_image()),
      ("update_record", SyncPhase::Writing, false, None),
      ("settle_projection", SyncPhase::Settling, false, None),
    ],
  );
  flow.on("upload_image", upload_image);
  flow.on("update_record", update_record);
  flow.on("settle_projection", settle_projection);
  flow
}

/// The store has no atomic rename: read the source, make sure the target is
/// free, write the new row, then retire the old one. Retiring is best effort.
pub(crate) fn rename_flow() -> Flow<MutationCtx> {
  let mut flow = Flow::new(
    "rename",
    &[
      ("load_source_record", SyncPhase::Idle, false, None),
      ("check_target_free", SyncPhase::Idle, false, None),
      ("upload_image", SyncPhase::Uploading, false, no_image()),
      ("add_renamed_record", SyncPhase::Writing, false, None),
      ("retire_source_record", SyncPhase::Writing, false, None),
      ("settle_projection", SyncPhase::Settling, false, None),
    ],
  );
  flow.on("load_source_record", load_source_record);
  flow.on("check_target_free", check_target_free);
  flow.on("upload_image", upload_image);
  flow.on("add_renamed_record", add_renamed_record);
  flow.on("retire_source_record", retire_source_record);
  flow.on("settle_projection", settle_projection);
  flow
}

pub(crate) fn movement_flow() -> Flow<MutationCtx> {
  let mut flow = Flow::new(
    "stock_movement",
    &[
      ("record_movement", SyncPhase::Writing, false, None),
      ("settle_projection", SyncPhase::Settling, false, None),
    ],
  );
  flow.on("record_movement", record_movement);
  flow.on("settle_projection", settle_projection);
  flow
}

pub(crate) fn delete_flow() -> Flow<MutationCtx> {
  let mut flow = Flow::new(
    "delete",
    &[
      ("delete_record", SyncPhase::Writing, false, None),
      ("settle_projection", SyncPhase::Settling, false, None),
    ],
  );
  flow.on("delete_record", delete_record);
  flow.on("settle_projection", settle_projection);
  flow
}

// --- Handlers ---

fn unexpected_operation(step: &str) -> SyncError {
  SyncError::Internal(format!("step '{}' ran for the wrong operation", step))
}

async fn upload_image(state: FlowState<MutationCtx>) -> SyncResult<StepControl> {
  let (api, payload, sku) = {
    let ctx = state.read();
    (ctx.deps.api.clone(), ctx.image.clone(), ctx.target_sku().to_string())
  };
  let Some(payload) = payload else {
    return Ok(StepControl::Continue);
  };

  // Size policy was applied when the payload was prepared.
  let result = ImageUploadPipeline::new(api.as_ref()).upload(&payload, Some(&sku)).await?;
  state.write().upload = Some(result);
  Ok(StepControl::Continue)
}

async fn add_record(state: FlowState<MutationCtx>) -> SyncResult<StepControl> {
  let (api, mut draft, upload) = {
    let ctx = state.read();
    let Operation::Add { draft } = &ctx.op else {
      return Err(unexpected_operation("add_record"));
    };
    (ctx.deps.api.clone(), draft.clone(), ctx.upload.clone())
  };
  if let Some(upload) = upload {
    draft.image_url = upload.url;
  }

  let record = api.add(&draft).await?;
  event!(Level::INFO, sku = %record.sku, "Record added.");
  state.write().record = Some(record);
  Ok(StepControl::Continue)
}

async fn update_record(state: FlowState<MutationCtx>) -> SyncResult<StepControl> {
  let (api, sku, mut patch, upload) = {
    let ctx = state.read();
    let Operation::Update { patch } = &ctx.op else {
      return Err(unexpected_operation("update_record"));
    };
    (ctx.deps.api.clone(), ctx.sku.clone(), patch.clone(), ctx.upload.clone())
  };
  if let Some(upload) = upload {
    patch.image_url = Some(upload.url);
  }

  let record = api.update(&sku, &patch, None).await?;
  event!(Level::INFO, %sku, echoed = record.is_some(), "Record updated.");
  state.write().record = record;
  Ok(StepControl::Continue)
}

async fn load_source_record(state: FlowState<MutationCtx>) -> SyncResult<StepControl> {
  let (api, sku) = {
    let ctx = state.read();
    (ctx.deps.api.clone(), ctx.sku.clone())
  };
  let source = api.get(&sku).await?;
  state.write().source = Some(source);
  Ok(StepControl::Continue)
}

async fn check_target_free(state: FlowState<MutationCtx>) -> SyncResult<StepControl> {
  let (api, target) = {
    let ctx = state.read();
    (ctx.deps.api.clone(), ctx.target_sku().to_string())
  };
  match api.get(&target).await {
    Ok(_) => {
      event!(Level::INFO, %target, "Rename target already exists.");
      Err(SyncError::Conflict { sku: target })
    }
    Err(SyncError::NotFound { .. }) => Ok(StepControl::Continue),
    Err(other) => Err(other),
  }
}

async fn add_renamed_record(state: FlowState<MutationCtx>) -> SyncResult<StepControl> {
  let (api, draft) = {
    let ctx = state.read();
    let Operation::Rename { patch, target, .. } = &ctx.op else {
      return Err(unexpected_operation("add_renamed_record"));
    };
    let source = ctx
      .source
      .as_ref()
      .ok_or_else(|| SyncError::Internal("rename source record was not loaded".to_string()))?;
    let mut patch: ProductPatch = patch.clone();
    if let Some(upload) = &ctx.upload {
      patch.image_url = Some(upload.url.clone());
    }
    (ctx.deps.api.clone(), source.merged_with(&patch).to_draft(target.clone()))
  };

  let record = api.add(&draft).await?;
  event!(Level::INFO, sku = %record.sku, "Renamed record written under new SKU.");
  state.write().record = Some(record);
  Ok(StepControl::Continue)
}

/// Never fails the flow: the new row is already written, and undoing it would
/// lose data. A failed cleanup leaves a duplicate and a warning behind.
async fn retire_source_record(state: FlowState<MutationCtx>) -> SyncResult<StepControl> {
  let (api, old_sku, hard) = {
    let ctx = state.read();
    let Operation::Rename { hard_delete_old, .. } = &ctx.op else {
      return Err(unexpected_operation("retire_source_record"));
    };
    (ctx.deps.api.clone(), ctx.sku.clone(), *hard_delete_old)
  };

  if let Err(err) = api.delete(&old_sku, hard).await {
    event!(Level::WARN, %old_sku, error = %err, "Rename cleanup failed; old record left in place.");
    state.write().warnings.push(SyncWarning::RenameCleanupFailed {
      old_sku,
      reason: err.to_string(),
    });
  }
  Ok(StepControl::Continue)
}

async fn record_movement(state: FlowState<MutationCtx>) -> SyncResult<StepControl> {
  let (api, sku, direction, qty, note) = {
    let ctx = state.read();
    let Operation::Movement { direction, qty, note } = &ctx.op else {
      return Err(unexpected_operation("record_movement"));
    };
    (ctx.deps.api.clone(), ctx.sku.clone(), *direction, *qty, note.clone())
  };

  let receipt = api.history_add(&sku, direction, qty, &note).await?;
  event!(
    Level::INFO,
    %sku,
    %direction,
    qty,
    resulting_quantity = ?receipt.resulting_quantity,
    "Stock movement recorded."
  );
  state.write().resulting_quantity = receipt.resulting_quantity;
  Ok(StepControl::Continue)
}

async fn delete_record(state: FlowState<MutationCtx>) -> SyncResult<StepControl> {
  let (api, sku, hard) = {
    let ctx = state.read();
    let Operation::Delete { hard } = &ctx.op else {
      return Err(unexpected_operation("delete_record"));
    };
    (ctx.deps.api.clone(), ctx.sku.clone(), *hard)
  };

  api.delete(&sku, hard).await?;
  event!(Level::INFO, %sku, hard, "Record deleted.");
  Ok(StepControl::Continue)
}

/// A failed refresh after a successful write is a warning, not a failure.
async fn settle_projection(state: FlowState<MutationCtx>) -> SyncResult<StepControl> {
  let deps = state.read().deps.clone();
  match settle(&deps).await {
    Ok(applied) => state.write().projection_applied = applied,
    Err(err) => {
      event!(Level::WARN, error = %err, "Projection refresh failed after write.");
      state.write().warnings.push(SyncWarning::RefreshFailed { reason: err.to_string() });
    }
  }
  Ok(StepControl::Continue)
}

/// Lists with the view model's current query and hands the rows over in one
/// piece. The sequence number lets the view drop a slower, older settle.
pub(crate) async fn settle(deps: &SyncDeps) -> SyncResult<bool> {
  let seq = deps.settle_seq.fetch_add(1, Ordering::SeqCst) + 1;
  let query = deps.view.query();
  let records = deps.api.list(&query).await?;
  Ok(deps.view.refresh(seq, records))
}
