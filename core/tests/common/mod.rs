// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every helper

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use stocktone::{
  CatalogApi, CatalogProjection, CatalogSyncCoordinator, Direction, ImageFile, ImagePayload, ListQuery,
  MovementReceipt, ProductDraft, ProductPatch, ProductRecord, ProductStatus, StockMovement, SyncConfig, SyncError,
  SyncResult, UploadResult,
};
use tokio::sync::Notify;
use tracing::Level;

// --- Call log ---
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
  List,
  Get(String),
  Add(ProductDraft),
  Update {
    sku: String,
    patch: ProductPatch,
    rename_to: Option<String>,
  },
  Delete {
    sku: String,
    hard: bool,
  },
  HistoryAdd {
    sku: String,
    direction: Direction,
    qty: u32,
    note: String,
  },
  UploadImage {
    filename: String,
    sku: Option<String>,
  },
}

impl Call {
  pub fn is_mutation(&self) -> bool {
    !matches!(self, Call::List | Call::Get(_))
  }
}

// --- Fault injection ---
#[derive(Debug, Default, Clone)]
pub struct Faults {
  pub fail_add: bool,
  pub fail_delete: bool,
  pub fail_list: bool,
  pub fail_upload: bool,
  /// Number of upcoming `get` calls that fail with a transient network error.
  pub flaky_gets: usize,
  /// Number of upcoming `list` calls that fail with a transient network error.
  pub flaky_lists: usize,
}

/// Parks a mutation inside the store until the test releases it.
#[derive(Debug, Default)]
pub struct Gate {
  pub entered: Notify,
  pub release: Notify,
}

/// In-memory stand-in for the remote store, with the same refusal rules.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
  rows: Mutex<BTreeMap<String, ProductRecord>>,
  calls: Mutex<Vec<Call>>,
  faults: Mutex<Faults>,
  gate: Mutex<Option<Arc<Gate>>>,
}

impl MemoryCatalog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn seeded(records: Vec<ProductRecord>) -> Self {
    let catalog = Self::default();
    {
      let mut rows = catalog.rows.lock();
      for record in records {
        rows.insert(record.sku.clone(), record);
      }
    }
    catalog
  }

  pub fn faults(&self) -> parking_lot::MutexGuard<'_, Faults> {
    self.faults.lock()
  }

  pub fn install_gate(&self) -> Arc<Gate> {
    let gate = Arc::new(Gate::default());
    *self.gate.lock() = Some(gate.clone());
    gate
  }

  pub fn calls(&self) -> Vec<Call> {
    self.calls.lock().clone()
  }

  pub fn mutations(&self) -> Vec<Call> {
    self.calls.lock().iter().filter(|c| c.is_mutation()).cloned().collect()
  }

  pub fn clear_calls(&self) {
    self.calls.lock().clear();
  }

  pub fn row(&self, sku: &str) -> Option<ProductRecord> {
    self.rows.lock().get(sku).cloned()
  }

  pub fn row_count(&self) -> usize {
    self.rows.lock().len()
  }

  fn log(&self, call: Call) {
    self.calls.lock().push(call);
  }

  async fn pass_gate(&self) {
    let gate = self.gate.lock().clone();
    if let Some(gate) = gate {
      gate.entered.notify_one();
      gate.release.notified().await;
    }
  }
}

#[async_trait]
impl CatalogApi for MemoryCatalog {
  async fn list(&self, query: &ListQuery) -> SyncResult<Vec<ProductRecord>> {
    self.log(Call::List);
    {
      let mut faults = self.faults.lock();
      if faults.flaky_lists > 0 {
        faults.flaky_lists -= 1;
        return Err(SyncError::NetworkError("injected: connection reset".to_string()));
      }
      if faults.fail_list {
        return Err(SyncError::NetworkError("injected: list unavailable".to_string()));
      }
    }

    let needle = query.q.as_ref().map(|q| q.to_lowercase());
    let rows = self.rows.lock();
    Ok(
      rows
        .values()
        .filter(|r| match &query.status {
          Some(status) => r.status.as_str() == status,
          None => !r.is_deleted(),
        })
        .filter(|r| query.category.as_ref().map_or(true, |c| &r.category == c))
        .filter(|r| {
          needle
            .as_ref()
            .map_or(true, |n| r.sku.to_lowercase().contains(n) || r.name.to_lowercase().contains(n))
        })
        .take(query.limit as usize)
        .cloned()
        .collect(),
    )
  }

  async fn get(&self, sku: &str) -> SyncResult<ProductRecord> {
    self.log(Call::Get(sku.to_string()));
    {
      let mut faults = self.faults.lock();
      if faults.flaky_gets > 0 {
        faults.flaky_gets -= 1;
        return Err(SyncError::NetworkError("injected: timeout".to_string()));
      }
    }
    self.row(sku).ok_or_else(|| SyncError::NotFound { sku: sku.to_string() })
  }

  async fn add(&self, draft: &ProductDraft) -> SyncResult<ProductRecord> {
    self.log(Call::Add(draft.clone()));
    self.pass_gate().await;
    if self.faults.lock().fail_add {
      return Err(SyncError::NetworkError("injected: add failed".to_string()));
    }
    let mut rows = self.rows.lock();
    if rows.contains_key(&draft.sku) {
      return Err(SyncError::Conflict { sku: draft.sku.clone() });
    }
    let record = draft.clone().into_record();
    rows.insert(record.sku.clone(), record.clone());
    Ok(record)
  }

  async fn update(
    &self,
    sku: &str,
    patch: &ProductPatch,
    rename_to: Option<&str>,
  ) -> SyncResult<Option<ProductRecord>> {
    self.log(Call::Update {
      sku: sku.to_string(),
      patch: patch.clone(),
      rename_to: rename_to.map(str::to_string),
    });
    self.pass_gate().await;
    let mut rows = self.rows.lock();
    let current = rows.get(sku).cloned().ok_or_else(|| SyncError::NotFound { sku: sku.to_string() })?;
    let mut merged = current.merged_with(patch);
    if let Some(target) = rename_to {
      if rows.contains_key(target) {
        return Err(SyncError::Conflict { sku: target.to_string() });
      }
      rows.remove(sku);
      merged.sku = target.to_string();
    }
    rows.insert(merged.sku.clone(), merged.clone());
    Ok(Some(merged))
  }

  async fn delete(&self, sku: &str, hard: bool) -> SyncResult<()> {
    self.log(Call::Delete {
      sku: sku.to_string(),
      hard,
    });
    self.pass_gate().await;
    if self.faults.lock().fail_delete {
      return Err(SyncError::NetworkError("injected: delete failed".to_string()));
    }
    let mut rows = self.rows.lock();
    if hard {
      rows.remove(sku).ok_or_else(|| SyncError::NotFound { sku: sku.to_string() })?;
    } else {
      let row = rows.get_mut(sku).ok_or_else(|| SyncError::NotFound { sku: sku.to_string() })?;
      row.status = ProductStatus::Deleted;
    }
    Ok(())
  }

  async fn history_add(&self, sku: &str, direction: Direction, qty: u32, note: &str) -> SyncResult<MovementReceipt> {
    self.log(Call::HistoryAdd {
      sku: sku.to_string(),
      direction,
      qty,
      note: note.to_string(),
    });
    self.pass_gate().await;
    let mut rows = self.rows.lock();
    let row = rows.get_mut(sku).ok_or_else(|| SyncError::NotFound { sku: sku.to_string() })?;
    row.quantity = match direction {
      Direction::In => row.quantity.saturating_add(qty),
      Direction::Out => row.quantity.saturating_sub(qty),
    };
    Ok(MovementReceipt {
      resulting_quantity: Some(row.quantity),
      movement: StockMovement {
        sku: sku.to_string(),
        direction,
        quantity: qty,
        note: note.to_string(),
        recorded_at: None,
      },
    })
  }

  async fn upload_image(&self, payload: &ImagePayload, sku: Option<&str>) -> SyncResult<UploadResult> {
    self.log(Call::UploadImage {
      filename: payload.filename.clone(),
      sku: sku.map(str::to_string),
    });
    if self.faults.lock().fail_upload {
      return Err(SyncError::UploadFailed {
        reason: "injected: storage quota exceeded".to_string(),
      });
    }
    Ok(UploadResult {
      url: format!("https://img.test/{}", payload.filename),
      filename: payload.filename.clone(),
      content_type: payload.content_type.clone(),
    })
  }
}

// --- Builders ---
pub fn record(sku: &str, name: &str, quantity: u32, cost: &str) -> ProductRecord {
  ProductRecord {
    sku: sku.to_string(),
    name: name.to_string(),
    quantity,
    cost: cost.parse::<Decimal>().unwrap(),
    status: ProductStatus::Active,
    category: String::new(),
    image_url: String::new(),
    description: String::new(),
  }
}

pub fn png(filename: &str) -> ImageFile {
  ImageFile::new(vec![0x89, b'P', b'N', b'G', 1, 2, 3, 4], filename, Some("image/png".to_string()))
}

pub fn test_config() -> SyncConfig {
  SyncConfig::new("memory://catalog")
}

/// Coordinator over `catalog` with a fresh default projection.
pub fn coordinator_over(catalog: Arc<MemoryCatalog>) -> (CatalogSyncCoordinator, Arc<CatalogProjection>) {
  let projection = Arc::new(CatalogProjection::new());
  let coordinator = CatalogSyncCoordinator::new(catalog, projection.clone(), &test_config());
  (coordinator, projection)
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
