// stocktone/src/upload.rs

//! Makes an image referenceable by a record before that record is written.
//!
//! `encode` is pure. Size and content-type policy is applied in `prepare`,
//! before anything leaves the process.

use crate::client::CatalogApi;
use crate::config::DEFAULT_MAX_IMAGE_BYTES;
use crate::error::{SyncError, SyncResult};
use crate::model::UploadResult;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{event, instrument, Level};

pub const DEFAULT_CONTENT_TYPE: &str = "image/png";

/// An image selected by the operator, not yet encoded.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
  pub bytes: Vec<u8>,
  pub filename: String,
  pub content_type: Option<String>,
}

// Image bytes are never dumped into logs.
impl std::fmt::Debug for ImageFile {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ImageFile")
      .field("filename", &self.filename)
      .field("content_type", &self.content_type)
      .field("len", &self.bytes.len())
      .finish()
  }
}

impl ImageFile {
  pub fn new(bytes: Vec<u8>, filename: impl Into<String>, content_type: Option<String>) -> Self {
    Self {
      bytes,
      filename: filename.into(),
      content_type,
    }
  }
}

/// Text-encoded image ready for the `upload_image` action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
  pub filename: String,
  pub content_type: String,
  /// Standard base64, no data-URL prefix.
  pub data: String,
}

pub fn encode(bytes: &[u8]) -> String {
  STANDARD.encode(bytes)
}

pub struct ImageUploadPipeline<'a, C: CatalogApi + ?Sized> {
  api: &'a C,
  max_bytes: usize,
}

impl<'a, C: CatalogApi + ?Sized> ImageUploadPipeline<'a, C> {
  pub fn new(api: &'a C) -> Self {
    Self {
      api,
      max_bytes: DEFAULT_MAX_IMAGE_BYTES,
    }
  }

  /// Lowers the size cap. Values above `DEFAULT_MAX_IMAGE_BYTES` are ignored.
  pub fn with_limit(mut self, max_bytes: usize) -> Self {
    self.max_bytes = max_bytes.min(DEFAULT_MAX_IMAGE_BYTES);
    self
  }

  /// Validates and encodes `image`.
  ///
  /// Empty or oversize input is rejected with `InvalidInput`. A content type
  /// outside `image/*` is only warned about.
  pub fn prepare(&self, image: &ImageFile) -> SyncResult<ImagePayload> {
    prepare(image, self.max_bytes)
  }

  #[instrument(name = "ImageUploadPipeline::upload", skip_all, fields(filename = %payload.filename, sku = ?sku), err(Display))]
  pub async fn upload(&self, payload: &ImagePayload, sku: Option<&str>) -> SyncResult<UploadResult> {
    let result = self.api.upload_image(payload, sku).await?;
    if result.url.trim().is_empty() {
      return Err(SyncError::UploadFailed {
        reason: "remote store returned an empty URL".to_string(),
      });
    }
    event!(Level::INFO, url = %result.url, "Image uploaded.");
    Ok(result)
  }

  /// `prepare` then `upload`.
  pub async fn run(&self, image: &ImageFile, sku: Option<&str>) -> SyncResult<UploadResult> {
    let payload = self.prepare(image)?;
    self.upload(&payload, sku).await
  }
}

/// `max_bytes` can only tighten the 8 MiB cap, never raise it.
pub fn prepare(image: &ImageFile, max_bytes: usize) -> SyncResult<ImagePayload> {
  let max_bytes = max_bytes.min(DEFAULT_MAX_IMAGE_BYTES);
  if image.bytes.is_empty() {
    return Err(SyncError::InvalidInput(format!("image '{}' is empty", image.filename)));
  }
  if image.bytes.len() > max_bytes {
    return Err(SyncError::InvalidInput(format!(
      "image '{}' is {} bytes, limit is {}",
      image.filename,
      image.bytes.len(),
      max_bytes
    )));
  }

  let content_type = image
    .content_type
    .as_deref()
    .map(str::trim)
    .filter(|ct| !ct.is_empty())
    .unwrap_or(DEFAULT_CONTENT_TYPE)
    .to_string();
  if !content_type.starts_with("image/") {
    event!(Level::WARN, filename = %image.filename, %content_type, "Unexpected content type for image upload.");
  }

  let filename = if image.filename.trim().is_empty() {
    "image".to_string()
  } else {
    image.filename.trim().to_string()
  };

  Ok(ImagePayload {
    filename,
    content_type,
    data: encode(&image.bytes),
  })
}
