// stocktone/src/model/product.rs

use super::serde_helpers::{lenient_decimal, lenient_u32};
use crate::error::{SyncError, SyncResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a product row. Soft delete flips this to `Deleted`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProductStatus {
  #[default]
  Active,
  Inactive,
  Deleted,
  /// Free-form values typed into the sheet by hand are preserved as-is.
  Other(String),
}

impl ProductStatus {
  pub fn as_str(&self) -> &str {
    match self {
      ProductStatus::Active => "active",
      ProductStatus::Inactive => "inactive",
      ProductStatus::Deleted => "deleted",
      ProductStatus::Other(s) => s.as_str(),
    }
  }
}

impl From<String> for ProductStatus {
  fn from(raw: String) -> Self {
    match raw.trim().to_ascii_lowercase().as_str() {
      "" | "active" => ProductStatus::Active,
      "inactive" => ProductStatus::Inactive,
      "deleted" => ProductStatus::Deleted,
      _ => ProductStatus::Other(raw.trim().to_string()),
    }
  }
}

impl From<&str> for ProductStatus {
  fn from(raw: &str) -> Self {
    ProductStatus::from(raw.to_string())
  }
}

impl From<ProductStatus> for String {
  fn from(status: ProductStatus) -> Self {
    status.as_str().to_string()
  }
}

impl fmt::Display for ProductStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One catalog row, keyed by `sku`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
  pub sku: String,
  #[serde(default)]
  pub name: String,
  #[serde(default, deserialize_with = "lenient_u32")]
  pub quantity: u32,
  #[serde(default, deserialize_with = "lenient_decimal")]
  pub cost: Decimal,
  #[serde(default)]
  pub status: ProductStatus,
  #[serde(default)]
  pub category: String,
  #[serde(default)]
  pub image_url: String,
  #[serde(default)]
  pub description: String,
}

impl ProductRecord {
  /// Applies every field present in `patch`; the SKU is left untouched.
  pub fn merged_with(&self, patch: &ProductPatch) -> ProductRecord {
    let mut merged = self.clone();
    if let Some(name) = &patch.name {
      merged.name = name.clone();
    }
    if let Some(quantity) = patch.quantity {
      merged.quantity = quantity;
    }
    if let Some(cost) = patch.cost {
      merged.cost = cost;
    }
    if let Some(status) = &patch.status {
      merged.status = status.clone();
    }
    if let Some(category) = &patch.category {
      merged.category = category.clone();
    }
    if let Some(image_url) = &patch.image_url {
      merged.image_url = image_url.clone();
    }
    if let Some(description) = &patch.description {
      merged.description = description.clone();
    }
    merged
  }

  pub fn is_deleted(&self) -> bool {
    self.status == ProductStatus::Deleted
  }

  /// Draft that would recreate this record under `sku`.
  pub fn to_draft(&self, sku: impl Into<String>) -> ProductDraft {
    ProductDraft {
      sku: sku.into(),
      name: self.name.clone(),
      quantity: self.quantity,
      cost: self.cost,
      status: self.status.clone(),
      category: self.category.clone(),
      image_url: self.image_url.clone(),
      description: self.description.clone(),
    }
  }
}

/// Fields submitted when creating a record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductDraft {
  pub sku: String,
  pub name: String,
  pub quantity: u32,
  pub cost: Decimal,
  pub status: ProductStatus,
  pub category: String,
  /// Filled by the coordinator once an attached image has been uploaded.
  pub image_url: String,
  pub description: String,
}

impl ProductDraft {
  pub fn new(sku: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      sku: sku.into(),
      name: name.into(),
      ..Default::default()
    }
  }

  pub fn validate(&self) -> SyncResult<()> {
    super::normalize_sku(&self.sku)?;
    if self.cost.is_sign_negative() && !self.cost.is_zero() {
      return Err(SyncError::InvalidInput(format!("cost must not be negative (got {})", self.cost)));
    }
    Ok(())
  }

  pub fn into_record(self) -> ProductRecord {
    ProductRecord {
      sku: self.sku,
      name: self.name,
      quantity: self.quantity,
      cost: self.cost,
      status: self.status,
      category: self.category,
      image_url: self.image_url,
      description: self.description,
    }
  }
}

/// Partial update; `None` leaves a field unchanged.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductPatch {
  pub name: Option<String>,
  pub quantity: Option<u32>,
  pub cost: Option<Decimal>,
  pub status: Option<ProductStatus>,
  pub category: Option<String>,
  pub image_url: Option<String>,
  pub description: Option<String>,
}

impl ProductPatch {
  pub fn is_empty(&self) -> bool {
    self.name.is_none()
      && self.quantity.is_none()
      && self.cost.is_none()
      && self.status.is_none()
      && self.category.is_none()
      && self.image_url.is_none()
      && self.description.is_none()
  }

  pub fn validate(&self) -> SyncResult<()> {
    if let Some(cost) = self.cost {
      if cost.is_sign_negative() && !cost.is_zero() {
        return Err(SyncError::InvalidInput(format!("cost must not be negative (got {})", cost)));
      }
    }
    Ok(())
  }
}
