// stocktone/src/config.rs

use crate::error::{SyncError, SyncResult};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

/// Largest image accepted for upload (8 MiB).
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 8 * 1024 * 1024;
pub const DEFAULT_LIST_LIMIT: u32 = 500;
/// Upper bound on the base delay between read retries.
pub const MAX_READ_RETRY_DELAY: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct SyncConfig {
  /// Single dispatch endpoint of the remote catalog store.
  pub endpoint: String,
  /// Transport-level timeout; the coordinator itself never times out a flow.
  pub timeout: Duration,
  pub list_limit: u32,
  /// Capped at `DEFAULT_MAX_IMAGE_BYTES`; larger values are not honoured.
  pub max_image_bytes: usize,

  // Bounded retry for idempotent reads only
  pub read_retries: u32,
  pub read_retry_delay: Duration,
}

impl SyncConfig {
  pub fn new(endpoint: impl Into<String>) -> Self {
    Self {
      endpoint: endpoint.into(),
      timeout: Duration::from_secs(30),
      list_limit: DEFAULT_LIST_LIMIT,
      max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
      read_retries: 2,
      read_retry_delay: Duration::from_millis(200),
    }
  }

  pub fn from_env() -> SyncResult<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name)
        .map_err(|e| SyncError::Configuration(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let endpoint = get_env("STOCKTONE_ENDPOINT")?;
    if endpoint.trim().is_empty() {
      return Err(SyncError::Configuration("STOCKTONE_ENDPOINT is empty".to_string()));
    }
    let mut config = Self::new(endpoint.trim());

    if let Ok(raw) = get_env("STOCKTONE_TIMEOUT_SECS") {
      config.timeout = Duration::from_secs(parse_var("STOCKTONE_TIMEOUT_SECS", &raw)?);
    }
    if let Ok(raw) = get_env("STOCKTONE_LIST_LIMIT") {
      config.list_limit = parse_var("STOCKTONE_LIST_LIMIT", &raw)?;
    }
    if let Ok(raw) = get_env("STOCKTONE_MAX_IMAGE_BYTES") {
      config.max_image_bytes = parse_var("STOCKTONE_MAX_IMAGE_BYTES", &raw)?;
      if config.max_image_bytes > DEFAULT_MAX_IMAGE_BYTES {
        return Err(SyncError::Configuration(format!(
          "STOCKTONE_MAX_IMAGE_BYTES is {}, it cannot exceed {}",
          config.max_image_bytes, DEFAULT_MAX_IMAGE_BYTES
        )));
      }
    }
    if let Ok(raw) = get_env("STOCKTONE_READ_RETRIES") {
      config.read_retries = parse_var("STOCKTONE_READ_RETRIES", &raw)?;
    }
    if let Ok(raw) = get_env("STOCKTONE_READ_RETRY_DELAY_MS") {
      config.read_retry_delay = Duration::from_millis(parse_var("STOCKTONE_READ_RETRY_DELAY_MS", &raw)?);
      if config.read_retry_delay > MAX_READ_RETRY_DELAY {
        return Err(SyncError::Configuration(format!(
          "STOCKTONE_READ_RETRY_DELAY_MS cannot exceed {}",
          MAX_READ_RETRY_DELAY.as_millis()
        )));
      }
    }

    tracing::info!(endpoint = %config.endpoint, "Sync configuration loaded.");
    Ok(config)
  }
}

fn parse_var<T>(name: &str, raw: &str) -> SyncResult<T>
where
  T: std::str::FromStr,
  T::Err: std::fmt::Display,
{
  raw
    .trim()
    .parse::<T>()
    .map_err(|e| SyncError::Configuration(format!("Invalid {}: {}", name, e)))
}
