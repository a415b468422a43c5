// stocktone/src/flow/state.rs
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Shared, lockable data passed to every handler of a flow run.
///
/// IMPORTANT: guards are blocking and MUST be dropped before any `.await`.
/// Copy what you need out of the guard, release it, then do the I/O.
#[derive(Debug)]
pub struct FlowState<T: Send + Sync + 'static>(Arc<RwLock<T>>);

impl<T: Send + Sync + 'static> FlowState<T> {
  pub fn new(data: T) -> Self {
    FlowState(Arc::new(RwLock::new(data)))
  }

  pub fn read(&self) -> RwLockReadGuard<'_, T> {
    self.0.read()
  }

  pub fn write(&self) -> RwLockWriteGuard<'_, T> {
    self.0.write()
  }
}

impl<T: Send + Sync + 'static> Clone for FlowState<T> {
  fn clone(&self) -> Self {
    FlowState(Arc::clone(&self.0))
  }
}
