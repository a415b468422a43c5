// stocktone/src/error.rs
use thiserror::Error;

/// Failure taxonomy shared by the remote client, the upload pipeline and the coordinator.
///
/// `NotFound`, `Conflict`, `InvalidInput` and `Unauthorized` are surfaced verbatim;
/// nothing in this crate attempts local recovery for them.
#[derive(Debug, Error)]
pub enum SyncError {
  #[error("Record not found: {sku}")]
  NotFound { sku: String },

  #[error("SKU already exists: {sku}")]
  Conflict { sku: String },

  #[error("Unauthorized: {0}")]
  Unauthorized(String),

  #[error("Invalid input: {0}")]
  InvalidInput(String),

  #[error("Image upload failed: {reason}")]
  UploadFailed { reason: String },

  #[error("Network error: {0}")]
  NetworkError(String),

  /// Local concurrency guard: another mutation for this SKU has not settled yet.
  #[error("A mutation for SKU '{sku}' is already in flight")]
  Busy { sku: String },

  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("Configuration error: {0}")]
  Configuration(String),

  #[error("Internal error: {0}")]
  Internal(String),
}

/// Fieldless discriminant of [`SyncError`], handy for matching and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
  NotFound,
  Conflict,
  Unauthorized,
  InvalidInput,
  UploadFailed,
  NetworkError,
  Busy,
  HandlerMissing,
  Configuration,
  Internal,
}

impl SyncError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      SyncError::NotFound { .. } => ErrorKind::NotFound,
      SyncError::Conflict { .. } => ErrorKind::Conflict,
      SyncError::Unauthorized(_) => ErrorKind::Unauthorized,
      SyncError::InvalidInput(_) => ErrorKind::InvalidInput,
      SyncError::UploadFailed { .. } => ErrorKind::UploadFailed,
      SyncError::NetworkError(_) => ErrorKind::NetworkError,
      SyncError::Busy { .. } => ErrorKind::Busy,
      SyncError::HandlerMissing { .. } => ErrorKind::HandlerMissing,
      SyncError::Configuration(_) => ErrorKind::Configuration,
      SyncError::Internal(_) => ErrorKind::Internal,
    }
  }

  /// Only transport-level failures are worth repeating, and only for reads.
  pub fn is_transient(&self) -> bool {
    matches!(self, SyncError::NetworkError(_))
  }
}

impl From<reqwest::Error> for SyncError {
  fn from(err: reqwest::Error) -> Self {
    SyncError::NetworkError(err.to_string())
  }
}

// Malformed payloads never leak past the client boundary as ad hoc shapes.
impl From<serde_json::Error> for SyncError {
  fn from(err: serde_json::Error) -> Self {
    SyncError::NetworkError(format!("malformed response: {}", err))
  }
}

pub type SyncResult<T, E = SyncError> = std::result::Result<T, E>;
