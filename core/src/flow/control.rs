// stocktone/src/flow/control.rs

//! Signals for controlling flow execution and the outcome of a run.

/// Returned by a handler to say whether the flow should go on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepControl {
  /// Run the remaining handlers of this step and the following steps.
  Continue,
  /// Halt the flow here. Nothing after this handler runs, Settling included.
  Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
  /// Every step that was not skipped ran to completion.
  Completed,
  /// A handler returned `StepControl::Stop`.
  Stopped,
}
