// stocktone-admin/src/main.rs

mod args;

use anyhow::Context;
use args::{Cli, Commands};
use clap::Parser;
use std::env;
use std::path::Path;
use std::sync::Arc;
use stocktone::{
  AddRequest, CatalogApi, CatalogProjection, CatalogSyncCoordinator, DeleteRequest, HttpCatalogClient, ImageFile,
  ListQuery, MutationReport, ProductDraft, ProductPatch, ProductStatus, ReadRetry, SessionContext, StockRequest,
  SyncConfig, SyncWarning, UpdateRequest,
};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { Level::DEBUG } else { Level::WARN };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level.as_str())))
    .with_span_events(FmtSpan::CLOSE)
    .with_writer(std::io::stderr)
    .init();

  let config = SyncConfig::from_env().context("loading configuration")?;

  let session = Arc::new(SessionContext::new());
  if let (Ok(id), Ok(password)) = (env::var("STOCKTONE_ADMIN_ID"), env::var("STOCKTONE_ADMIN_PASSWORD")) {
    session.set(&id, &password).context("starting session")?;
  } else {
    tracing::debug!("No operator credentials in environment; only reads will succeed.");
  }

  let api = Arc::new(ReadRetry::from_config(HttpCatalogClient::new(&config, session)?, &config));
  let projection = Arc::new(CatalogProjection::with_query(ListQuery {
    limit: config.list_limit,
    ..Default::default()
  }));
  let coordinator = CatalogSyncCoordinator::new(api.clone(), projection.clone(), &config);

  match cli.command {
    Commands::List {
      q,
      category,
      sort,
      hide_out_of_stock,
    } => {
      projection.set_search(q);
      projection.set_category(category);
      projection.set_sort(sort);
      projection.set_hide_out_of_stock(hide_out_of_stock);
      coordinator.refresh().await?;
      println!("{}", serde_json::to_string_pretty(&projection.records())?);
    }

    Commands::Get { sku } => {
      let record = api.get(sku.trim()).await?;
      println!("{}", serde_json::to_string_pretty(&record)?);
    }

    Commands::Add {
      sku,
      name,
      quantity,
      cost,
      status,
      category,
      description,
      image,
    } => {
      let draft = ProductDraft {
        quantity,
        cost,
        status: status.map(ProductStatus::from).unwrap_or_default(),
        category: category.unwrap_or_default(),
        description: description.unwrap_or_default(),
        ..ProductDraft::new(sku, name)
      };
      let mut request = AddRequest::new(draft);
      if let Some(path) = image {
        request = request.with_image(load_image(&path)?);
      }
      print_report(&coordinator.add(request).await?);
    }

    Commands::Update {
      sku,
      name,
      quantity,
      cost,
      status,
      category,
      description,
      image,
      rename_to,
      hard_delete_old,
    } => {
      let patch = ProductPatch {
        name,
        quantity,
        cost,
        status: status.map(ProductStatus::from),
        category,
        image_url: None,
        description,
      };
      let mut request = UpdateRequest::new(sku, patch);
      request.rename_to = rename_to;
      request.hard_delete_old = hard_delete_old;
      if let Some(path) = image {
        request = request.with_image(load_image(&path)?);
      }
      print_report(&coordinator.update(request).await?);
    }

    Commands::Stock {
      sku,
      direction,
      quantity,
      note,
    } => {
      let mut request = StockRequest::new(sku, direction, quantity);
      request.note = note;
      print_report(&coordinator.record_movement(request).await?);
    }

    Commands::Delete { sku, hard } => {
      let request = if hard { DeleteRequest::hard(sku) } else { DeleteRequest::soft(sku) };
      print_report(&coordinator.delete(request).await?);
    }
  }

  Ok(())
}

fn load_image(path: &Path) -> anyhow::Result<ImageFile> {
  let bytes = std::fs::read(path).with_context(|| format!("reading image {}", path.display()))?;
  let filename = path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_default();
  let content_type = path
    .extension()
    .and_then(|e| e.to_str())
    .and_then(|ext| match ext.to_ascii_lowercase().as_str() {
      "png" => Some("image/png"),
      "jpg" | "jpeg" => Some("image/jpeg"),
      "gif" => Some("image/gif"),
      "webp" => Some("image/webp"),
      _ => None,
    })
    .map(str::to_string);
  Ok(ImageFile::new(bytes, filename, content_type))
}

fn print_report(report: &MutationReport) {
  let phases: Vec<String> = report.phases.iter().map(|p| p.to_string()).collect();
  println!("sku: {}", report.sku);
  println!("phases: {}", phases.join(" -> "));
  if let Some(upload) = &report.upload {
    println!("image: {}", upload.url);
  }
  if let Some(quantity) = report.resulting_quantity {
    println!("quantity: {}", quantity);
  }
  for warning in &report.warnings {
    match warning {
      SyncWarning::RenameCleanupFailed { old_sku, reason } => {
        println!("warning: old record {} was not retired ({}); both rows exist", old_sku, reason)
      }
      SyncWarning::RefreshFailed { reason } => println!("warning: list refresh failed ({})", reason),
    }
  }
}
