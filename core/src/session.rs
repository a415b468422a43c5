// stocktone/src/session.rs

//! Operator credentials for the lifetime of one client session.
//!
//! The context is constructed once and handed to the client as an
//! `Arc<SessionContext>`. It lives in memory only; nothing here touches disk.

use crate::error::{SyncError, SyncResult};
use parking_lot::RwLock;
use std::fmt;
use tracing::{event, Level};

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
  pub admin_id: String,
  pub admin_password: String,
}

// The password never reaches logs.
impl fmt::Debug for Credentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Credentials")
      .field("admin_id", &self.admin_id)
      .field("admin_password", &"[REDACTED]")
      .finish()
  }
}

#[derive(Debug, Default)]
pub struct SessionContext {
  credentials: RwLock<Option<Credentials>>,
}

impl SessionContext {
  pub fn new() -> Self {
    Self::default()
  }

  /// Starts (or replaces) the session. Both values are trimmed and must be non-empty.
  pub fn set(&self, admin_id: &str, admin_password: &str) -> SyncResult<()> {
    let admin_id = admin_id.trim();
    let admin_password = admin_password.trim();
    if admin_id.is_empty() || admin_password.is_empty() {
      return Err(SyncError::InvalidInput(
        "admin id and password are both required".to_string(),
      ));
    }
    *self.credentials.write() = Some(Credentials {
      admin_id: admin_id.to_string(),
      admin_password: admin_password.to_string(),
    });
    event!(Level::INFO, operator = %admin_id, "Session started.");
    Ok(())
  }

  pub fn clear(&self) {
    if self.credentials.write().take().is_some() {
      event!(Level::INFO, "Session cleared.");
    }
  }

  pub fn is_active(&self) -> bool {
    self.credentials.read().is_some()
  }

  pub fn operator(&self) -> Option<String> {
    self.credentials.read().as_ref().map(|c| c.admin_id.clone())
  }

  /// Credentials for a mutating call; `Unauthorized` when no session is active.
  pub fn credentials(&self) -> SyncResult<Credentials> {
    self
      .credentials
      .read()
      .clone()
      .ok_or_else(|| SyncError::Unauthorized("no active session".to_string()))
  }
}
