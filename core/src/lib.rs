// src/lib.rs

//! Stocktone: catalog synchronization for a spreadsheet-backed inventory store.
//!
//! The remote store only offers single-record atomicity. This crate sequences
//! the multi-step writes an operator triggers on top of it:
//!  - Image upload before any write that references the image URL.
//!  - Add, in-place update and rename (add under the new SKU, then retire the old row).
//!  - Append-only stock movements, with the resulting quantity echoed back.
//!  - Soft and hard delete.
//!  - A whole-list refresh of the local projection once a write has landed.
//!
//! At most one mutation per SKU is in flight from this client. A second one is
//! refused with `SyncError::Busy` before any request leaves the process.

pub mod client;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod flow;
pub mod model;
pub mod session;
pub mod upload;
pub mod view;

// --- Re-exports for the Public API ---

pub use crate::coordinator::{
  AddRequest, CatalogSyncCoordinator, DeleteRequest, MutationReport, StockRequest, SyncWarning, UpdateRequest,
};
pub use crate::error::{ErrorKind, SyncError, SyncResult};
pub use crate::config::SyncConfig;
pub use crate::session::{Credentials, SessionContext};

// Remote boundary
pub use crate::client::{CatalogApi, HttpCatalogClient, ReadRetry};

pub use crate::flow::SyncPhase;
pub use crate::model::{
  Direction, ListQuery, MovementReceipt, ProductDraft, ProductPatch, ProductRecord, ProductStatus, SortOrder,
  StockMovement, UploadResult,
};
pub use crate::upload::{ImageFile, ImagePayload, ImageUploadPipeline};
pub use crate::view::{CatalogProjection, CatalogViewModel};
