// stocktone/src/flow/definition.rs

//! The `Flow<T>` struct and its construction.

use super::hooks::Handler;
use super::phase::SyncPhase;
use super::step::{FlowStep, SkipCondition};
use std::collections::HashMap;

/// Step definition tuple accepted by [`Flow::new`]: name, phase, optional, skip condition.
pub type StepSpec<'a, T> = (&'a str, SyncPhase, bool, Option<SkipCondition<T>>);

pub struct Flow<T>
where
  T: 'static + Send + Sync,
{
  /// Human-readable flow name, used in spans.
  pub(crate) name: String,
  pub(crate) steps: Vec<FlowStep<T>>,

  pub(crate) before: HashMap<String, Vec<Handler<T>>>,
  pub(crate) on: HashMap<String, Vec<Handler<T>>>,
  pub(crate) after: HashMap<String, Vec<Handler<T>>>,
}

impl<T> Flow<T>
where
  T: 'static + Send + Sync,
{
  pub fn new(name: impl Into<String>, step_specs: &[StepSpec<'_, T>]) -> Self {
    let mut flow = Self {
      name: name.into(),
      steps: Vec::with_capacity(step_specs.len()),
      before: HashMap::new(),
      on: HashMap::new(),
      after: HashMap::new(),
    };
    for (step_name, phase, optional, skip_if) in step_specs {
      flow.ensure_step_not_exists(step_name);
      flow.steps.push(FlowStep {
        name: (*step_name).to_string(),
        phase: *phase,
        optional: *optional,
        skip_if: skip_if.clone(),
      });
    }
    flow
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn steps(&self) -> &[FlowStep<T>] {
    &self.steps
  }

  /// Panics on an unknown step name; that is a wiring mistake, not a runtime condition.
  pub(crate) fn ensure_step_exists(&self, step_name: &str) {
    if !self.steps.iter().any(|s| s.name == step_name) {
      panic!("Flow '{}' setup error: step '{}' is not defined.", self.name, step_name);
    }
  }

  fn ensure_step_not_exists(&self, step_name: &str) {
    if self.steps.iter().any(|s| s.name == step_name) {
      panic!("Flow '{}' setup error: step '{}' is defined twice.", self.name, step_name);
    }
  }

  pub fn set_skip_condition(&mut self, step_name: &str, skip_if: Option<SkipCondition<T>>) {
    self.ensure_step_exists(step_name);
    if let Some(step) = self.steps.iter_mut().find(|s| s.name == step_name) {
      step.skip_if = skip_if;
    }
  }
}
