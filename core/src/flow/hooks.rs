// stocktone/src/flow/hooks.rs

//! Registration of `before`, `on` and `after` handlers for flow steps.

use super::control::StepControl;
use super::definition::Flow;
use super::state::FlowState;
use crate::error::SyncResult;
use std::future::Future;
use std::pin::Pin;

/// A step handler: takes a clone of the shared state and resolves to a
/// [`StepControl`] or the error that fails the run.
pub type Handler<T> = Box<dyn Fn(FlowState<T>) -> HandlerFuture + Send + Sync>;

pub type HandlerFuture = Pin<Box<dyn Future<Output = SyncResult<StepControl>> + Send>>;

impl<T> Flow<T>
where
  T: 'static + Send + Sync,
{
  pub fn before<F>(&mut self, step_name: &str, handler_fn: impl Fn(FlowState<T>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = SyncResult<StepControl>> + Send + 'static,
  {
    self.ensure_step_exists(step_name);
    let handler: Handler<T> = Box::new(move |state: FlowState<T>| -> HandlerFuture { Box::pin(handler_fn(state)) });
    self.before.entry(step_name.to_string()).or_default().push(handler);
  }

  pub fn on<F>(&mut self, step_name: &str, handler_fn: impl Fn(FlowState<T>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = SyncResult<StepControl>> + Send + 'static,
  {
    self.ensure_step_exists(step_name);
    let handler: Handler<T> = Box::new(move |state: FlowState<T>| -> HandlerFuture { Box::pin(handler_fn(state)) });
    self.on.entry(step_name.to_string()).or_default().push(handler);
  }

  pub fn after<F>(&mut self, step_name: &str, handler_fn: impl Fn(FlowState<T>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = SyncResult<StepControl>> + Send + 'static,
  {
    self.ensure_step_exists(step_name);
    let handler: Handler<T> = Box::new(move |state: FlowState<T>| -> HandlerFuture { Box::pin(handler_fn(state)) });
    self.after.entry(step_name.to_string()).or_default().push(handler);
  }

  pub(crate) fn has_handlers(&self, step_name: &str) -> bool {
    [&self.before, &self.on, &self.after]
      .iter()
      .any(|phase_map| phase_map.get(step_name).map_or(false, |v| !v.is_empty()))
  }
}
