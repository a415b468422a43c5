// stocktone/src/flow/phase.rs

use serde::Serialize;
use std::fmt;

/// States a single mutation moves through.
///
/// `Idle → [Uploading] → Writing → Settling → Done | Failed`; `Uploading` is
/// skipped when no image is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
  Idle,
  Uploading,
  Writing,
  Settling,
  Done,
  Failed,
}

impl SyncPhase {
  pub fn is_terminal(&self) -> bool {
    matches!(self, SyncPhase::Done | SyncPhase::Failed)
  }
}

impl fmt::Display for SyncPhase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      SyncPhase::Idle => "idle",
      SyncPhase::Uploading => "uploading",
      SyncPhase::Writing => "writing",
      SyncPhase::Settling => "settling",
      SyncPhase::Done => "done",
      SyncPhase::Failed => "failed",
    };
    f.write_str(name)
  }
}

/// Implemented by flow data that wants to observe phase transitions.
/// The engine calls `enter_phase` before the first handler of every step that
/// runs, and once more with `Done` or `Failed` at the end of the run.
pub trait PhaseTracking {
  fn enter_phase(&mut self, phase: SyncPhase);

  fn current_phase(&self) -> SyncPhase;
}
