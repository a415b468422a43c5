// stocktone/src/client/wire.rs

//! The remote store's wire contract: a single endpoint dispatching on an
//! `action` field, form-encoded fields, and a loosely typed JSON reply
//! `{ ok, data?, imageUrl?, error? }`.
//!
//! Everything loosely typed is validated here and turned into the typed
//! entities of [`crate::model`]. A reply that cannot be understood becomes
//! `SyncError::NetworkError`.

use crate::error::{SyncError, SyncResult};
use crate::model::serde_helpers::{u32_from_value, value_kind};
use crate::model::{Direction, ProductDraft, ProductPatch, ProductRecord};
use crate::session::Credentials;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  List,
  Get,
  Add,
  Update,
  Delete,
  HistoryAdd,
  UploadImage,
}

impl Action {
  pub fn as_str(&self) -> &'static str {
    match self {
      Action::List => "list",
      Action::Get => "get",
      Action::Add => "add",
      Action::Update => "update",
      Action::Delete => "delete",
      Action::HistoryAdd => "history_add",
      Action::UploadImage => "upload_image",
    }
  }

  pub fn is_mutation(&self) -> bool {
    !matches!(self, Action::List | Action::Get)
  }
}

/// Form field carrying the rename target on `update`; `sku` stays the lookup key.
pub const RENAME_FIELD: &str = "newSku";
/// Form field requesting a physical row removal on `delete`.
pub const HARD_DELETE_FIELD: &str = "hard";

pub type FormFields = Vec<(&'static str, String)>;

/// Decoded reply of any action.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
  #[serde(default)]
  pub ok: bool,
  #[serde(default)]
  pub data: Option<Value>,
  #[serde(default)]
  pub image_url: Option<String>,
  #[serde(default)]
  pub error: Option<String>,
  /// Optional machine-readable error code (`NOT_FOUND`, `CONFLICT`, ...).
  #[serde(default)]
  pub code: Option<String>,
  #[serde(default)]
  pub quantity: Option<Value>,
}

pub fn parse_envelope(body: &str) -> SyncResult<Envelope> {
  let envelope: Envelope = serde_json::from_str(body)?;
  Ok(envelope)
}

impl Envelope {
  /// Turns an `ok: false` reply into the matching [`SyncError`].
  pub fn into_result(self, sku: &str) -> SyncResult<Envelope> {
    if self.ok {
      return Ok(self);
    }
    Err(classify_error(self.code.as_deref(), self.error.as_deref().unwrap_or(""), sku))
  }

  pub fn record(&self) -> SyncResult<Option<ProductRecord>> {
    match &self.data {
      None | Some(Value::Null) => Ok(None),
      Some(value) => parse_record(value).map(Some),
    }
  }

  /// `list` replies: a missing `data` is an empty page, not an error.
  pub fn records(&self) -> SyncResult<Vec<ProductRecord>> {
    match &self.data {
      None | Some(Value::Null) => Ok(Vec::new()),
      Some(Value::Array(items)) => items.iter().map(parse_record).collect(),
      Some(other) => Err(SyncError::NetworkError(format!(
        "malformed response: expected a list, got {}",
        value_kind(other)
      ))),
    }
  }

  /// Quantity reported after a ledger write, wherever the store put it.
  pub fn resulting_quantity(&self) -> Option<u32> {
    let candidate = match (&self.quantity, &self.data) {
      (Some(q), _) => Some(q),
      (None, Some(Value::Object(map))) => map.get("quantity").or_else(|| map.get("newQuantity")),
      (None, Some(n @ Value::Number(_))) => Some(n),
      _ => None,
    };
    candidate.and_then(|v| u32_from_value(v).ok())
  }

  pub fn timestamp(&self) -> Option<DateTime<Utc>> {
    let map = self.data.as_ref()?.as_object()?;
    let raw = map.get("timestamp").or_else(|| map.get("date"))?.as_str()?;
    DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.with_timezone(&Utc))
  }

  /// URL of an uploaded image: top-level `imageUrl`, or inside `data`.
  pub fn uploaded_url(&self) -> Option<String> {
    let nested = || {
      let map = self.data.as_ref()?.as_object()?;
      map
        .get("imageUrl")
        .or_else(|| map.get("url"))
        .and_then(Value::as_str)
        .map(str::to_string)
    };
    self
      .image_url
      .clone()
      .or_else(nested)
      .map(|u| u.trim().to_string())
      .filter(|u| !u.is_empty())
  }
}

pub fn parse_record(value: &Value) -> SyncResult<ProductRecord> {
  let record = ProductRecord::deserialize(value)?;
  if record.sku.trim().is_empty() {
    return Err(SyncError::NetworkError("malformed response: record without sku".to_string()));
  }
  Ok(record)
}

/// Maps a refusal onto the taxonomy. The explicit code wins; otherwise the
/// message text is inspected. Anything unrecognised is treated as refused input.
pub fn classify_error(code: Option<&str>, message: &str, sku: &str) -> SyncError {
  let sku = sku.to_string();
  match code.map(|c| c.trim().to_ascii_uppercase()).as_deref() {
    Some("NOT_FOUND") => return SyncError::NotFound { sku },
    Some("CONFLICT") | Some("DUPLICATE") => return SyncError::Conflict { sku },
    Some("UNAUTHORIZED") | Some("FORBIDDEN") => return SyncError::Unauthorized(message.to_string()),
    Some("INVALID_INPUT") => return SyncError::InvalidInput(message.to_string()),
    _ => {}
  }

  let lowered = message.to_ascii_lowercase();
  if lowered.contains("not found") || lowered.contains("not exist") || lowered.contains("no such") {
    SyncError::NotFound { sku }
  } else if lowered.contains("exist") || lowered.contains("duplicate") || lowered.contains("conflict") {
    SyncError::Conflict { sku }
  } else if lowered.contains("unauthorized")
    || lowered.contains("forbidden")
    || lowered.contains("credential")
    || lowered.contains("password")
  {
    SyncError::Unauthorized(message.to_string())
  } else {
    let reason = if message.is_empty() { "request refused by remote store" } else { message };
    SyncError::InvalidInput(reason.to_string())
  }
}

// --- Form field builders ---

pub fn credential_fields(credentials: &Credentials) -> FormFields {
  vec![
    ("adminId", credentials.admin_id.clone()),
    ("adminPassword", credentials.admin_password.clone()),
  ]
}

pub fn draft_fields(draft: &ProductDraft) -> FormFields {
  vec![
    ("sku", draft.sku.clone()),
    ("name", draft.name.clone()),
    ("quantity", draft.quantity.to_string()),
    ("cost", draft.cost.normalize().to_string()),
    ("status", draft.status.as_str().to_string()),
    ("category", draft.category.clone()),
    ("imageUrl", draft.image_url.clone()),
    ("description", draft.description.clone()),
  ]
}

pub fn patch_fields(sku: &str, patch: &ProductPatch, rename_to: Option<&str>) -> FormFields {
  let mut fields = vec![("sku", sku.to_string())];
  if let Some(name) = &patch.name {
    fields.push(("name", name.clone()));
  }
  if let Some(quantity) = patch.quantity {
    fields.push(("quantity", quantity.to_string()));
  }
  if let Some(cost) = patch.cost {
    fields.push(("cost", cost.normalize().to_string()));
  }
  if let Some(status) = &patch.status {
    fields.push(("status", status.as_str().to_string()));
  }
  if let Some(category) = &patch.category {
    fields.push(("category", category.clone()));
  }
  if let Some(image_url) = &patch.image_url {
    fields.push(("imageUrl", image_url.clone()));
  }
  if let Some(description) = &patch.description {
    fields.push(("description", description.clone()));
  }
  if let Some(target) = rename_to {
    fields.push((RENAME_FIELD, target.to_string()));
  }
  fields
}

pub fn delete_fields(sku: &str, hard: bool) -> FormFields {
  let mut fields = vec![("sku", sku.to_string())];
  if hard {
    fields.push((HARD_DELETE_FIELD, "true".to_string()));
  }
  fields
}

pub fn history_fields(sku: &str, direction: Direction, qty: u32, note: &str) -> FormFields {
  vec![
    ("sku", sku.to_string()),
    ("actionType", direction.as_wire().to_string()),
    ("qty", qty.to_string()),
    ("note", note.to_string()),
  ]
}
