// stocktone/src/flow/step.rs

use super::phase::SyncPhase;
use super::state::FlowState;

/// Evaluated before a step runs; `true` skips the step.
pub type SkipCondition<T> = std::sync::Arc<dyn Fn(FlowState<T>) -> bool + Send + Sync + 'static>;

#[derive(Clone)]
pub struct FlowStep<T: 'static + Send + Sync> {
  pub name: String,
  pub phase: SyncPhase,
  /// An optional step without handlers is skipped instead of failing the run.
  pub optional: bool,
  pub skip_if: Option<SkipCondition<T>>,
}

impl<T: 'static + Send + Sync> std::fmt::Debug for FlowStep<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FlowStep")
      .field("name", &self.name)
      .field("phase", &self.phase)
      .field("optional", &self.optional)
      .field("skip_if_present", &self.skip_if.is_some())
      .finish()
  }
}
