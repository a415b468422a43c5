// stocktone/src/flow/mod.rs

//! A small step-flow engine: an ordered list of named steps, each tagged with
//! the [`SyncPhase`] it belongs to, with `before`/`on`/`after` async handlers
//! operating on shared [`FlowState`].
//!
//! The coordinator builds one flow per mutation kind at construction time and
//! runs a fresh state through it for every request.

pub mod control;
pub mod definition;
pub mod execution;
pub mod hooks;
pub mod phase;
pub mod state;
pub mod step;

pub use control::{FlowOutcome, StepControl};
pub use definition::Flow;
pub use hooks::{Handler, HandlerFuture};
pub use phase::{PhaseTracking, SyncPhase};
pub use state::FlowState;
pub use step::{FlowStep, SkipCondition};
