// tests/coordinator_tests.rs
mod common;

use common::*;
use rust_decimal::Decimal;
use serial_test::serial;
use std::str::FromStr;
use std::sync::Arc;
use stocktone::{
  AddRequest, CatalogApi, CatalogSyncCoordinator, DeleteRequest, Direction, ErrorKind, ImageFile, ProductDraft, ProductPatch,
  ProductStatus, StockRequest, SyncConfig, SyncError, SyncPhase, SyncWarning, UpdateRequest,
};

fn widget_draft(sku: &str) -> ProductDraft {
  ProductDraft {
    quantity: 10,
    cost: Decimal::from_str("2.50").unwrap(),
    category: "tools".to_string(),
    ..ProductDraft::new(sku, "Widget")
  }
}

// --- Add ---

#[tokio::test]
#[serial]
async fn test_add_without_image_writes_then_settles() {
  setup_tracing();
  let catalog = Arc::new(MemoryCatalog::new());
  let (coordinator, projection) = coordinator_over(catalog.clone());

  let report = coordinator.add(AddRequest::new(widget_draft("A100"))).await.unwrap();

  assert_eq!(
    report.phases,
    vec![SyncPhase::Idle, SyncPhase::Writing, SyncPhase::Settling, SyncPhase::Done]
  );
  assert_eq!(report.final_phase(), SyncPhase::Done);
  assert!(report.upload.is_none());
  assert!(report.projection_applied);
  assert!(!report.has_warnings());

  let stored = catalog.row("A100").expect("row written");
  assert_eq!(stored.name, "Widget");
  assert_eq!(stored.quantity, 10);
  assert_eq!(stored.cost, Decimal::from_str("2.5").unwrap());
  assert_eq!(stored.image_url, "");
  assert_eq!(stored.status, ProductStatus::Active);

  assert_eq!(catalog.calls(), vec![Call::Add(widget_draft("A100")), Call::List]);
  assert!(projection.find("A100").is_some());
}

#[tokio::test]
#[serial]
async fn test_add_uploads_image_before_write_and_references_url() {
  setup_tracing();
  let catalog = Arc::new(MemoryCatalog::new());
  let (coordinator, projection) = coordinator_over(catalog.clone());

  let report = coordinator
    .add(AddRequest::new(widget_draft("A100")).with_image(png("widget.png")))
    .await
    .unwrap();

  assert_eq!(
    report.phases,
    vec![
      SyncPhase::Idle,
      SyncPhase::Uploading,
      SyncPhase::Writing,
      SyncPhase::Settling,
      SyncPhase::Done
    ]
  );
  let mutations = catalog.mutations();
  assert_eq!(mutations.len(), 2);
  assert_eq!(
    mutations[0],
    Call::UploadImage {
      filename: "widget.png".to_string(),
      sku: Some("A100".to_string())
    }
  );
  match &mutations[1] {
    Call::Add(draft) => assert_eq!(draft.image_url, "https://img.test/widget.png"),
    other => panic!("Expected Add after upload, got {:?}", other),
  }
  assert_eq!(report.upload.unwrap().url, "https://img.test/widget.png");
  assert_eq!(projection.find("A100").unwrap().image_url, "https://img.test/widget.png");
}

#[tokio::test]
#[serial]
async fn test_add_trims_sku_and_rejects_blank_sku() {
  setup_tracing();
  let catalog = Arc::new(MemoryCatalog::new());
  let (coordinator, _projection) = coordinator_over(catalog.clone());

  let report = coordinator.add(AddRequest::new(widget_draft("  B7 "))).await.unwrap();
  assert_eq!(report.sku, "B7");
  assert!(catalog.row("B7").is_some());

  catalog.clear_calls();
  let err = coordinator.add(AddRequest::new(widget_draft("   "))).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvalidInput);
  assert!(catalog.calls().is_empty());
}

#[tokio::test]
#[serial]
async fn test_add_rejects_negative_cost_locally() {
  setup_tracing();
  let catalog = Arc::new(MemoryCatalog::new());
  let (coordinator, _projection) = coordinator_over(catalog.clone());

  let mut draft = widget_draft("A100");
  draft.cost = Decimal::from_str("-1").unwrap();
  let err = coordinator.add(AddRequest::new(draft)).await.unwrap_err();

  assert_eq!(err.kind(), ErrorKind::InvalidInput);
  assert!(catalog.calls().is_empty());
}

#[tokio::test]
#[serial]
async fn test_add_existing_sku_is_conflict_and_skips_settle() {
  setup_tracing();
  let catalog = Arc::new(MemoryCatalog::seeded(vec![record("A100", "Old", 1, "1")]));
  let (coordinator, _projection) = coordinator_over(catalog.clone());

  let err = coordinator.add(AddRequest::new(widget_draft("A100"))).await.unwrap_err();

  match err {
    SyncError::Conflict { sku } => assert_eq!(sku, "A100"),
    other => panic!("Expected Conflict, got {:?}", other),
  }
  assert!(!catalog.calls().contains(&Call::List));
  assert_eq!(catalog.row("A100").unwrap().name, "Old");
}

#[tokio::test]
#[serial]
async fn test_oversize_image_is_rejected_before_any_call() {
  setup_tracing();
  let catalog = Arc::new(MemoryCatalog::new());
  let projection = Arc::new(stocktone::CatalogProjection::new());
  let mut config = SyncConfig::new("memory://catalog");
  config.max_image_bytes = 4;
  let coordinator = CatalogSyncCoordinator::new(catalog.clone(), projection, &config);

  let err = coordinator
    .add(AddRequest::new(widget_draft("A100")).with_image(png("big.png")))
    .await
    .unwrap_err();

  assert_eq!(err.kind(), ErrorKind::InvalidInput);
  assert!(catalog.calls().is_empty());
  assert!(!coordinator.is_busy("A100"));
}

#[tokio::test]
#[serial]
async fn test_configured_limit_cannot_raise_image_cap() {
  setup_tracing();
  let catalog = Arc::new(MemoryCatalog::new());
  let projection = Arc::new(stocktone::CatalogProjection::new());
  let mut config = SyncConfig::new("memory://catalog");
  config.max_image_bytes = 16 * 1024 * 1024;
  let coordinator = CatalogSyncCoordinator::new(catalog.clone(), projection, &config);

  let big = ImageFile::new(vec![0u8; 9 * 1024 * 1024], "big.png", Some("image/png".to_string()));
  let err = coordinator
    .add(AddRequest::new(widget_draft("A100")).with_image(big))
    .await
    .unwrap_err();

  assert_eq!(err.kind(), ErrorKind::InvalidInput);
  assert!(catalog.calls().is_empty());
  assert!(catalog.row("A100").is_none());
}

#[tokio::test]
#[serial]
async fn test_empty_image_is_rejected_before_any_call() {
  setup_tracing();
  let catalog = Arc::new(MemoryCatalog::new());
  let (coordinator, _projection) = coordinator_over(catalog.clone());

  let empty = ImageFile::new(Vec::new(), "empty.png", None);
  let err = coordinator
    .add(AddRequest::new(widget_draft("A100")).with_image(empty))
    .await
    .unwrap_err();

  assert_eq!(err.kind(), ErrorKind::InvalidInput);
  assert!(catalog.calls().is_empty());
}

#[tokio::test]
#[serial]
async fn test_failed_upload_aborts_before_write() {
  setup_tracing();
  let catalog = Arc::new(MemoryCatalog::new());
  catalog.faults().fail_upload = true;
  let (coordinator, _projection) = coordinator_over(catalog.clone());

  let err = coordinator
    .add(AddRequest::new(widget_draft("A100")).with_image(png("widget.png")))
    .await
    .unwrap_err();

  assert_eq!(err.kind(), ErrorKind::UploadFailed);
  assert_eq!(catalog.mutations().len(), 1);
  assert!(matches!(catalog.mutations()[0], Call::UploadImage { .. }));
  assert!(catalog.row("A100").is_none());
  assert!(!coordinator.is_busy("A100"));
}

#[tokio::test]
#[serial]
async fn test_failed_write_after_upload_surfaces_write_error() {
  setup_tracing();
  let catalog = Arc::new(MemoryCatalog::new());
  catalog.faults().fail_add = true;
  let (coordinator, _projection) = coordinator_over(catalog.clone());

  let err = coordinator
    .add(AddRequest::new(widget_draft("A100")).with_image(png("widget.png")))
    .await
    .unwrap_err();

  assert_eq!(err.kind(), ErrorKind::NetworkError);
  let mutations = catalog.mutations();
  assert_eq!(mutations.len(), 2);
  assert!(matches!(mutations[0], Call::UploadImage { .. }));
  assert!(matches!(mutations[1], Call::Add(_)));
  assert!(!catalog.calls().contains(&Call::List));
}

#[tokio::test]
#[serial]
async fn test_refresh_failure_after_write_is_a_warning() {
  setup_tracing();
  let catalog = Arc::new(MemoryCatalog::new());
  catalog.faults().fail_list = true;
  let (coordinator, projection) = coordinator_over(catalog.clone());

  let report = coordinator.add(AddRequest::new(widget_draft("A100"))).await.unwrap();

  assert!(catalog.row("A100").is_some());
  assert!(!report.projection_applied);
  assert_eq!(report.warnings.len(), 1);
  assert!(matches!(report.warnings[0], SyncWarning::RefreshFailed { .. }));
  assert_eq!(report.final_phase(), SyncPhase::Done);
  assert!(projection.is_empty());
}

// --- Update and rename ---

#[tokio::test]
#[serial]
async fn test_in_place_update_sends_only_changed_fields() {
  setup_tracing();
  let catalog = Arc::new(MemoryCatalog::seeded(vec![record("A100", "Widget", 4, "2.50")]));
  let (coordinator, projection) = coordinator_over(catalog.clone());

  let patch = ProductPatch {
    name: Some("Widget Pro".to_string()),
    ..Default::default()
  };
  let report = coordinator.update(UpdateRequest::new("A100", patch.clone())).await.unwrap();

  assert_eq!(report.sku, "A100");
  assert_eq!(
    catalog.mutations(),
    vec![Call::Update {
      sku: "A100".to_string(),
      patch,
      rename_to: None
    }]
  );
  let stored = catalog.row("A100").unwrap();
  assert_eq!(stored.name, "Widget Pro");
  assert_eq!(stored.quantity, 4);
  assert_eq!(projection.find("A100").unwrap().name, "Widget Pro");
}

#[tokio::test]
#[serial]
async fn test_update_with_image_only_sets_image_url() {
  setup_tracing();
  let catalog = Arc::new(MemoryCatalog::seeded(vec![record("A100", "Widget", 4, "2.50")]));
  let (coordinator, _projection) = coordinator_over(catalog.clone());

  coordinator
    .update(UpdateRequest::new("A100", ProductPatch::default()).with_image(png("new.png")))
    .await
    .unwrap();

  let mutations = catalog.mutations();
  assert_eq!(mutations.len(), 2);
  assert_eq!(
    mutations[0],
    Call::UploadImage {
      filename: "new.png".to_string(),
      sku: Some("A100".to_string())
    }
  );
  match &mutations[1] {
    Call::Update { sku, patch, rename_to } => {
      assert_eq!(sku, "A100");
      assert_eq!(patch.image_url.as_deref(), Some("https://img.test/new.png"));
      assert!(rename_to.is_none());
    }
    other => panic!("Expected Update after upload, got {:?}", other),
  }
  assert_eq!(catalog.row("A100").unwrap().image_url, "https://img.test/new.png");
}

#[tokio::test]
#[serial]
async fn test_update_with_nothing_to_change_is_invalid() {
  setup_tracing();
  let catalog = Arc::new(MemoryCatalog::seeded(vec![record("A100", "Widget", 4, "2.50")]));
  let (coordinator, _projection) = coordinator_over(catalog.clone());

  let err = coordinator
    .update(UpdateRequest::new("A100", ProductPatch::default()))
    .await
    .unwrap_err();

  assert_eq!(err.kind(), ErrorKind::InvalidInput);
  assert!(catalog.calls().is_empty());
}

#[tokio::test]
#[serial]
async fn test_update_of_missing_sku_is_not_found() {
  setup_tracing();
  let catalog = Arc::new(MemoryCatalog::new());
  let (coordinator, _projection) = coordinator_over(catalog.clone());

  let patch = ProductPatch {
    quantity: Some(3),
    ..Default::default()
  };
  let err = coordinator.update(UpdateRequest::new("Z9", patch)).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
#[serial]
async fn test_rename_adds_new_row_then_soft_deletes_old() {
  setup_tracing();
  let mut source = record("A100", "Widget", 7, "2.50");
  source.category = "tools".to_string();
  let catalog = Arc::new(MemoryCatalog::seeded(vec![source]));
  let (coordinator, projection) = coordinator_over(catalog.clone());

  let patch = ProductPatch {
    name: Some("Widget v2".to_string()),
    ..Default::default()
  };
  let report = coordinator
    .update(UpdateRequest::new("A100", patch).rename_to("A200"))
    .await
    .unwrap();

  assert_eq!(report.sku, "A200");
  assert!(!report.has_warnings());

  let mutations = catalog.mutations();
  assert_eq!(mutations.len(), 2);
  match &mutations[0] {
    Call::Add(draft) => {
      assert_eq!(draft.sku, "A200");
      assert_eq!(draft.name, "Widget v2");
      assert_eq!(draft.quantity, 7);
      assert_eq!(draft.category, "tools");
    }
    other => panic!("Expected Add of the renamed row first, got {:?}", other),
  }
  assert_eq!(
    mutations[1],
    Call::Delete {
      sku: "A100".to_string(),
      hard: false
    }
  );

  assert_eq!(catalog.row("A100").unwrap().status, ProductStatus::Deleted);
  assert_eq!(catalog.row("A200").unwrap().quantity, 7);
  assert!(projection.find("A200").is_some());
  assert!(projection.find("A100").is_none());
}

#[tokio::test]
#[serial]
async fn test_rename_with_image_uploads_for_target_before_add() {
  setup_tracing();
  let catalog = Arc::new(MemoryCatalog::seeded(vec![record("A100", "Widget", 7, "2.50")]));
  let (coordinator, projection) = coordinator_over(catalog.clone());

  let report = coordinator
    .update(
      UpdateRequest::new("A100", ProductPatch::default())
        .rename_to("A200")
        .with_image(png("n.png")),
    )
    .await
    .unwrap();

  assert_eq!(report.sku, "A200");
  let mutations = catalog.mutations();
  assert_eq!(mutations.len(), 3);
  assert_eq!(
    mutations[0],
    Call::UploadImage {
      filename: "n.png".to_string(),
      sku: Some("A200".to_string())
    }
  );
  match &mutations[1] {
    Call::Add(draft) => {
      assert_eq!(draft.sku, "A200");
      assert_eq!(draft.image_url, "https://img.test/n.png");
    }
    other => panic!("Expected Add of the renamed row after upload, got {:?}", other),
  }
  assert_eq!(
    mutations[2],
    Call::Delete {
      sku: "A100".to_string(),
      hard: false
    }
  );
  assert_eq!(projection.find("A200").unwrap().image_url, "https://img.test/n.png");
}

#[tokio::test]
#[serial]
async fn test_rename_can_hard_delete_the_old_row() {
  setup_tracing();
  let catalog = Arc::new(MemoryCatalog::seeded(vec![record("A100", "Widget", 7, "2.50")]));
  let (coordinator, _projection) = coordinator_over(catalog.clone());

  let mut request = UpdateRequest::new("A100", ProductPatch::default()).rename_to("A200");
  request.hard_delete_old = true;
  coordinator.update(request).await.unwrap();

  assert!(catalog.row("A100").is_none());
  assert!(catalog.row("A200").is_some());
}

#[tokio::test]
#[serial]
async fn test_rename_onto_existing_sku_is_conflict_without_mutations() {
  setup_tracing();
  let catalog = Arc::new(MemoryCatalog::seeded(vec![
    record("A100", "Widget", 7, "2.50"),
    record("A200", "Gadget", 1, "9"),
  ]));
  let (coordinator, _projection) = coordinator_over(catalog.clone());

  let err = coordinator
    .update(UpdateRequest::new("A100", ProductPatch::default()).rename_to("A200"))
    .await
    .unwrap_err();

  match err {
    SyncError::Conflict { sku } => assert_eq!(sku, "A200"),
    other => panic!("Expected Conflict on the target, got {:?}", other),
  }
  assert!(catalog.mutations().is_empty());
  assert_eq!(catalog.row("A100").unwrap().status, ProductStatus::Active);
  assert_eq!(catalog.row("A200").unwrap().name, "Gadget");
}

#[tokio::test]
#[serial]
async fn test_rename_of_missing_source_is_not_found() {
  setup_tracing();
  let catalog = Arc::new(MemoryCatalog::new());
  let (coordinator, _projection) = coordinator_over(catalog.clone());

  let err = coordinator
    .update(UpdateRequest::new("A100", ProductPatch::default()).rename_to("A200"))
    .await
    .unwrap_err();

  assert_eq!(err.kind(), ErrorKind::NotFound);
  assert!(catalog.mutations().is_empty());
}

#[tokio::test]
#[serial]
async fn test_rename_cleanup_failure_keeps_both_rows_and_warns() {
  setup_tracing();
  let catalog = Arc::new(MemoryCatalog::seeded(vec![record("A100", "Widget", 7, "2.50")]));
  catalog.faults().fail_delete = true;
  let (coordinator, _projection) = coordinator_over(catalog.clone());

  let report = coordinator
    .update(UpdateRequest::new("A100", ProductPatch::default()).rename_to("A200"))
    .await
    .unwrap();

  assert_eq!(report.sku, "A200");
  assert_eq!(report.final_phase(), SyncPhase::Done);
  assert_eq!(report.warnings.len(), 1);
  match &report.warnings[0] {
    SyncWarning::RenameCleanupFailed { old_sku, reason } => {
      assert_eq!(old_sku, "A100");
      assert!(reason.contains("delete failed"));
    }
    other => panic!("Expected RenameCleanupFailed, got {:?}", other),
  }
  // Duplicate, never a loss
  assert_eq!(catalog.row("A100").unwrap().status, ProductStatus::Active);
  assert!(catalog.row("A200").is_some());
}

#[tokio::test]
#[serial]
async fn test_rename_to_same_sku_is_an_in_place_update() {
  setup_tracing();
  let catalog = Arc::new(MemoryCatalog::seeded(vec![record("A100", "Widget", 7, "2.50")]));
  let (coordinator, _projection) = coordinator_over(catalog.clone());

  let patch = ProductPatch {
    quantity: Some(9),
    ..Default::default()
  };
  coordinator
    .update(UpdateRequest::new("A100", patch).rename_to(" A100 "))
    .await
    .unwrap();

  let mutations = catalog.mutations();
  assert_eq!(mutations.len(), 1);
  assert!(matches!(mutations[0], Call::Update { .. }));
  assert_eq!(catalog.row("A100").unwrap().quantity, 9);
}

// --- Stock movements ---

#[tokio::test]
#[serial]
async fn test_stock_in_reports_resulting_quantity() {
  setup_tracing();
  let catalog = Arc::new(MemoryCatalog::seeded(vec![record("A100", "Widget", 5, "2.50")]));
  let (coordinator, projection) = coordinator_over(catalog.clone());

  let report = coordinator
    .record_movement(StockRequest::new("A100", Direction::In, 3))
    .await
    .unwrap();

  assert_eq!(report.resulting_quantity, Some(8));
  assert_eq!(
    catalog.mutations(),
    vec![Call::HistoryAdd {
      sku: "A100".to_string(),
      direction: Direction::In,
      qty: 3,
      note: "stock in".to_string()
    }]
  );
  assert_eq!(projection.find("A100").unwrap().quantity, 8);
}

#[tokio::test]
#[serial]
async fn test_stock_out_keeps_operator_note() {
  setup_tracing();
  let catalog = Arc::new(MemoryCatalog::seeded(vec![record("A100", "Widget", 5, "2.50")]));
  let (coordinator, _projection) = coordinator_over(catalog.clone());

  let report = coordinator
    .record_movement(StockRequest::new("A100", Direction::Out, 2).with_note("sold at fair"))
    .await
    .unwrap();

  assert_eq!(report.resulting_quantity, Some(3));
  match &catalog.mutations()[0] {
    Call::HistoryAdd { note, direction, .. } => {
      assert_eq!(note, "sold at fair");
      assert_eq!(*direction, Direction::Out);
    }
    other => panic!("Expected HistoryAdd, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn test_non_positive_movement_never_reaches_the_store() {
  setup_tracing();
  let catalog = Arc::new(MemoryCatalog::seeded(vec![record("A100", "Widget", 5, "2.50")]));
  let (coordinator, _projection) = coordinator_over(catalog.clone());

  for qty in [0, -2] {
    let err = coordinator
      .record_movement(StockRequest::new("A100", Direction::In, qty))
      .await
      .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
  }
  assert!(catalog.calls().is_empty());
  assert_eq!(catalog.row("A100").unwrap().quantity, 5);
}

// --- Delete ---

#[tokio::test]
#[serial]
async fn test_soft_delete_flips_status_and_hides_row() {
  setup_tracing();
  let catalog = Arc::new(MemoryCatalog::seeded(vec![record("A100", "Widget", 5, "2.50")]));
  let (coordinator, projection) = coordinator_over(catalog.clone());
  coordinator.refresh().await.unwrap();
  assert!(projection.find("A100").is_some());

  coordinator.delete(DeleteRequest::soft("A100")).await.unwrap();

  assert_eq!(catalog.row("A100").unwrap().status, ProductStatus::Deleted);
  assert!(projection.find("A100").is_none());
}

#[tokio::test]
#[serial]
async fn test_hard_delete_removes_row() {
  setup_tracing();
  let catalog = Arc::new(MemoryCatalog::seeded(vec![record("A100", "Widget", 5, "2.50")]));
  let (coordinator, _projection) = coordinator_over(catalog.clone());

  coordinator.delete(DeleteRequest::hard("A100")).await.unwrap();

  assert!(catalog.row("A100").is_none());
  assert_eq!(
    catalog.mutations(),
    vec![Call::Delete {
      sku: "A100".to_string(),
      hard: true
    }]
  );
}

// --- Per-SKU serialization ---

#[tokio::test]
#[serial]
async fn test_second_mutation_on_same_sku_is_busy() {
  setup_tracing();
  let catalog = Arc::new(MemoryCatalog::seeded(vec![
    record("A100", "Widget", 5, "2.50"),
    record("B200", "Gadget", 1, "9"),
  ]));
  let gate = catalog.install_gate();
  let (coordinator, _projection) = coordinator_over(catalog.clone());
  let coordinator = Arc::new(coordinator);

  let first = {
    let coordinator = coordinator.clone();
    tokio::spawn(async move {
      coordinator
        .record_movement(StockRequest::new("A100", Direction::In, 1))
        .await
    })
  };
  gate.entered.notified().await;
  assert!(coordinator.is_busy("A100"));

  let err = coordinator
    .update(UpdateRequest::new(
      "A100",
      ProductPatch {
        name: Some("clash".to_string()),
        ..Default::default()
      },
    ))
    .await
    .unwrap_err();
  match err {
    SyncError::Busy { sku } => assert_eq!(sku, "A100"),
    other => panic!("Expected Busy, got {:?}", other),
  }
  // A rename touching the held SKU as its target is refused too
  let err = coordinator
    .update(UpdateRequest::new("B200", ProductPatch::default()).rename_to("A100"))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Busy);
  assert_eq!(catalog.mutations().len(), 1);

  gate.release.notify_one();
  let report = first.await.unwrap().unwrap();
  assert_eq!(report.resulting_quantity, Some(6));
  assert!(!coordinator.is_busy("A100"));
}

#[tokio::test]
#[serial]
async fn test_guard_is_released_after_failure() {
  setup_tracing();
  let catalog = Arc::new(MemoryCatalog::new());
  let (coordinator, _projection) = coordinator_over(catalog.clone());

  let err = coordinator.delete(DeleteRequest::soft("A100")).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
  assert!(!coordinator.is_busy("A100"));

  coordinator.add(AddRequest::new(widget_draft("A100"))).await.unwrap();
}

#[tokio::test]
#[serial]
async fn test_added_record_reads_back_with_submitted_fields() {
  setup_tracing();
  let catalog = Arc::new(MemoryCatalog::new());
  let (coordinator, _projection) = coordinator_over(catalog.clone());

  let draft = ProductDraft {
    quantity: 5,
    cost: Decimal::from(10),
    status: ProductStatus::from("active"),
    ..ProductDraft::new("A100", "Test")
  };
  coordinator.add(AddRequest::new(draft)).await.unwrap();

  let fetched = catalog.get("A100").await.unwrap();
  assert_eq!(fetched.sku, "A100");
  assert_eq!(fetched.name, "Test");
  assert_eq!(fetched.quantity, 5);
  assert_eq!(fetched.cost, Decimal::from(10));
  assert_eq!(fetched.status.as_str(), "active");
  assert_eq!(fetched.image_url, "");
}

#[tokio::test]
#[serial]
async fn test_restock_note_is_sent_with_movement() {
  setup_tracing();
  let catalog = Arc::new(MemoryCatalog::seeded(vec![record("A100", "Test", 5, "10")]));
  let (coordinator, _projection) = coordinator_over(catalog.clone());

  let report = coordinator
    .record_movement(StockRequest::new("A100", Direction::In, 3).with_note("restock"))
    .await
    .unwrap();

  assert_eq!(report.resulting_quantity, Some(8));
  assert_eq!(catalog.row("A100").unwrap().quantity, 8);
  assert_eq!(
    report.phases,
    vec![SyncPhase::Idle, SyncPhase::Writing, SyncPhase::Settling, SyncPhase::Done]
  );
}
