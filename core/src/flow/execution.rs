// stocktone/src/flow/execution.rs

//! `Flow::run()`: executes steps in order against one shared state.

use super::control::{FlowOutcome, StepControl};
use super::definition::Flow;
use super::hooks::Handler;
use super::phase::{PhaseTracking, SyncPhase};
use super::state::FlowState;
use crate::error::{SyncError, SyncResult};
use tracing::{event, instrument, span, Instrument, Level};

impl<T> Flow<T>
where
  T: 'static + Send + Sync + PhaseTracking,
{
  /// Runs every step in order.
  ///
  /// A step whose skip condition holds is passed over. A non-optional step
  /// without handlers fails the run with `HandlerMissing`. The first handler
  /// error ends the run; the state is then moved to `Failed`. Otherwise it ends
  /// in `Done`, whether the flow completed or was stopped.
  #[instrument(
    name = "Flow::run",
    skip_all,
    fields(flow = %self.name, num_steps = self.steps.len()),
    err(Display)
  )]
  pub async fn run(&self, state: FlowState<T>) -> SyncResult<FlowOutcome> {
    event!(Level::DEBUG, "Flow execution starting.");
    match self.run_steps(&state).await {
      Ok(outcome) => {
        state.write().enter_phase(SyncPhase::Done);
        event!(Level::DEBUG, ?outcome, "Flow execution finished.");
        Ok(outcome)
      }
      Err(err) => {
        state.write().enter_phase(SyncPhase::Failed);
        Err(err)
      }
    }
  }

  async fn run_steps(&self, state: &FlowState<T>) -> SyncResult<FlowOutcome> {
    for (step_idx, step) in self.steps.iter().enumerate() {
      let step_name = step.name.as_str();
      let step_span = span!(
        Level::INFO,
        "flow_step_execution",
        step_name = step_name,
        step_index = step_idx,
        phase = %step.phase
      );

      if let Some(skip_if) = &step.skip_if {
        if skip_if(state.clone()) {
          event!(parent: &step_span, Level::DEBUG, "Step skipped due to 'skip_if' condition.");
          continue;
        }
      }

      if !self.has_handlers(step_name) {
        if step.optional {
          event!(parent: &step_span, Level::DEBUG, "Optional step has no handlers, skipping.");
          continue;
        }
        event!(parent: &step_span, Level::ERROR, "Non-optional step has no handlers.");
        return Err(SyncError::HandlerMissing {
          step_name: step.name.clone(),
        });
      }

      state.write().enter_phase(step.phase);

      for (label, handlers) in [("before", &self.before), ("on", &self.on), ("after", &self.after)] {
        if let Some(handlers) = handlers.get(step_name) {
          let control = Self::run_handlers(label, handlers, state)
            .instrument(step_span.clone())
            .await?;
          if control == StepControl::Stop {
            event!(parent: &step_span, Level::INFO, hook = label, "Flow stopped by a handler.");
            return Ok(FlowOutcome::Stopped);
          }
        }
      }
      event!(parent: &step_span, Level::DEBUG, "Step finished.");
    }
    Ok(FlowOutcome::Completed)
  }

  async fn run_handlers(label: &'static str, handlers: &[Handler<T>], state: &FlowState<T>) -> SyncResult<StepControl> {
    for (handler_idx, handler_fn) in handlers.iter().enumerate() {
      match handler_fn(state.clone()).await {
        Ok(StepControl::Continue) => {}
        Ok(StepControl::Stop) => return Ok(StepControl::Stop),
        Err(e) => {
          event!(Level::WARN, hook = label, handler_index = handler_idx, error = %e, "Handler failed.");
          return Err(e);
        }
      }
    }
    Ok(StepControl::Continue)
  }
}
