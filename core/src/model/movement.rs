// stocktone/src/model/movement.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
  In,
  Out,
}

impl Direction {
  pub fn as_wire(&self) -> &'static str {
    match self {
      Direction::In => "in",
      Direction::Out => "out",
    }
  }

  /// Note recorded when the operator leaves it blank.
  pub fn default_note(&self) -> &'static str {
    match self {
      Direction::In => "stock in",
      Direction::Out => "stock out",
    }
  }
}

impl fmt::Display for Direction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_wire())
  }
}

impl FromStr for Direction {
  type Err = crate::SyncError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "in" => Ok(Direction::In),
      "out" => Ok(Direction::Out),
      other => Err(crate::SyncError::InvalidInput(format!(
        "direction must be 'in' or 'out' (got '{}')",
        other
      ))),
    }
  }
}

/// Append-only ledger entry. There is no update or delete for movements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
  pub sku: String,
  pub direction: Direction,
  pub quantity: u32,
  pub note: String,
  /// Assigned by the remote store; absent when the reply does not carry it.
  pub recorded_at: Option<DateTime<Utc>>,
}

/// What `history_add` hands back: the entry as written plus the quantity the
/// store reports afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementReceipt {
  pub movement: StockMovement,
  pub resulting_quantity: Option<u32>,
}
