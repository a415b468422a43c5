// stocktone/src/client/http.rs

//! `reqwest`-backed [`CatalogApi`] talking to the single dispatch endpoint.
//!
//! Reads go out as GET with query parameters. Mutations are form-encoded POSTs
//! to `endpoint?action=<name>` and carry the operator credentials from the
//! injected [`SessionContext`]. A plain form body keeps the request "simple"
//! for script-hosted endpoints that reject preflighted requests.

use super::wire::{self, Action, Envelope, FormFields};
use super::CatalogApi;
use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::model::{
  Direction, ListQuery, MovementReceipt, ProductDraft, ProductPatch, ProductRecord, StockMovement, UploadResult,
};
use crate::session::SessionContext;
use crate::upload::ImagePayload;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use tracing::{event, instrument, Level};

#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
  client: Client,
  endpoint: String,
  session: Arc<SessionContext>,
}

impl HttpCatalogClient {
  pub fn new(config: &SyncConfig, session: Arc<SessionContext>) -> SyncResult<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .map_err(|e| SyncError::Configuration(format!("failed to build HTTP client: {}", e)))?;

    Ok(Self {
      client,
      endpoint: config.endpoint.clone(),
      session,
    })
  }

  async fn read(&self, action: Action, params: FormFields) -> SyncResult<Envelope> {
    let response = self
      .client
      .get(&self.endpoint)
      .query(&[("action", action.as_str())])
      .query(&params)
      .send()
      .await?;
    Self::decode(action, response).await
  }

  async fn mutate(&self, action: Action, fields: FormFields) -> SyncResult<Envelope> {
    // Fails before any I/O when nobody is logged in.
    let credentials = self.session.credentials()?;

    let mut body = vec![("action", action.as_str().to_string())];
    body.extend(wire::credential_fields(&credentials));
    body.extend(fields);

    let response = self
      .client
      .post(&self.endpoint)
      .query(&[("action", action.as_str())])
      .form(&body)
      .send()
      .await?;
    Self::decode(action, response).await
  }

  async fn decode(action: Action, response: reqwest::Response) -> SyncResult<Envelope> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
      event!(Level::WARN, action = action.as_str(), %status, "Remote store replied with an error status.");
      return match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SyncError::Unauthorized(text)),
        _ => Err(SyncError::NetworkError(format!("HTTP {} from '{}'", status, action.as_str()))),
      };
    }

    wire::parse_envelope(&text)
  }
}

#[async_trait]
impl CatalogApi for HttpCatalogClient {
  #[instrument(name = "HttpCatalogClient::list", skip_all, fields(limit = query.limit), err(Display))]
  async fn list(&self, query: &ListQuery) -> SyncResult<Vec<ProductRecord>> {
    let envelope = self.read(Action::List, query.to_params()).await?.into_result("")?;
    let records = envelope.records()?;
    event!(Level::DEBUG, count = records.len(), "Listed records.");
    Ok(records)
  }

  #[instrument(name = "HttpCatalogClient::get", skip(self), err(Display))]
  async fn get(&self, sku: &str) -> SyncResult<ProductRecord> {
    let envelope = self
      .read(Action::Get, vec![("sku", sku.to_string())])
      .await?
      .into_result(sku)?;
    // An `ok` reply without a row is how some deployments say "absent".
    envelope.record()?.ok_or_else(|| SyncError::NotFound { sku: sku.to_string() })
  }

  #[instrument(name = "HttpCatalogClient::add", skip_all, fields(sku = %draft.sku), err(Display))]
  async fn add(&self, draft: &ProductDraft) -> SyncResult<ProductRecord> {
    let envelope = self
      .mutate(Action::Add, wire::draft_fields(draft))
      .await?
      .into_result(&draft.sku)?;
    Ok(envelope.record()?.unwrap_or_else(|| draft.clone().into_record()))
  }

  #[instrument(name = "HttpCatalogClient::update", skip(self, patch), err(Display))]
  async fn update(
    &self,
    sku: &str,
    patch: &ProductPatch,
    rename_to: Option<&str>,
  ) -> SyncResult<Option<ProductRecord>> {
    let conflict_key = rename_to.unwrap_or(sku);
    let envelope = self
      .mutate(Action::Update, wire::patch_fields(sku, patch, rename_to))
      .await?;
    // A refusal on rename is about the target key; anything else about the lookup key.
    let envelope = match envelope.into_result(sku) {
      Err(SyncError::Conflict { .. }) => return Err(SyncError::Conflict { sku: conflict_key.to_string() }),
      other => other?,
    };
    envelope.record()
  }

  #[instrument(name = "HttpCatalogClient::delete", skip(self), err(Display))]
  async fn delete(&self, sku: &str, hard: bool) -> SyncResult<()> {
    self
      .mutate(Action::Delete, wire::delete_fields(sku, hard))
      .await?
      .into_result(sku)?;
    Ok(())
  }

  #[instrument(name = "HttpCatalogClient::history_add", skip(self, note), err(Display))]
  async fn history_add(&self, sku: &str, direction: Direction, qty: u32, note: &str) -> SyncResult<MovementReceipt> {
    let envelope = self
      .mutate(Action::HistoryAdd, wire::history_fields(sku, direction, qty, note))
      .await?
      .into_result(sku)?;
    Ok(MovementReceipt {
      resulting_quantity: envelope.resulting_quantity(),
      movement: StockMovement {
        sku: sku.to_string(),
        direction,
        quantity: qty,
        note: note.to_string(),
        recorded_at: envelope.timestamp(),
      },
    })
  }

  #[instrument(
    name = "HttpCatalogClient::upload_image",
    skip_all,
    fields(filename = %payload.filename, content_type = %payload.content_type, encoded_len = payload.data.len()),
    err(Display)
  )]
  async fn upload_image(&self, payload: &ImagePayload, sku: Option<&str>) -> SyncResult<UploadResult> {
    let mut fields = vec![
      ("filename", payload.filename.clone()),
      ("contentType", payload.content_type.clone()),
      ("base64", payload.data.clone()),
    ];
    if let Some(sku) = sku.filter(|s| !s.is_empty()) {
      fields.push(("sku", sku.to_string()));
    }

    let envelope = match self.mutate(Action::UploadImage, fields).await {
      Ok(envelope) => envelope,
      // Missing credentials are reported as such; every other failure is an upload failure.
      Err(err @ SyncError::Unauthorized(_)) => return Err(err),
      Err(other) => return Err(SyncError::UploadFailed { reason: other.to_string() }),
    };
    if !envelope.ok {
      return Err(SyncError::UploadFailed {
        reason: envelope.error.unwrap_or_else(|| "remote store refused the upload".to_string()),
      });
    }
    let url = envelope.uploaded_url().ok_or_else(|| SyncError::UploadFailed {
      reason: "reply did not contain an image URL".to_string(),
    })?;

    Ok(UploadResult {
      url,
      filename: payload.filename.clone(),
      content_type: payload.content_type.clone(),
    })
  }
}
