// stocktone-admin/src/args.rs

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;
use stocktone::{Direction, SortOrder};

#[derive(Parser, Debug)]
#[command(name = "stocktone-admin")]
#[command(about = "Operate on the spreadsheet-backed catalog", long_about = None)]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,

  /// Debug-level logging (RUST_LOG still wins when set)
  #[arg(short, long, global = true)]
  pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// List products
  #[command(alias = "ls")]
  List {
    /// Search text, matched by the store against SKU and name
    #[arg(short, long)]
    q: Option<String>,

    #[arg(short, long)]
    category: Option<String>,

    /// price_asc, price_desc or name_asc
    #[arg(short, long)]
    sort: Option<SortOrder>,

    #[arg(long)]
    hide_out_of_stock: bool,
  },

  /// Show one product
  Get { sku: String },

  /// Create a product, optionally with an image
  Add {
    #[arg(long)]
    sku: String,

    #[arg(long)]
    name: String,

    #[arg(long, default_value_t = 0)]
    quantity: u32,

    #[arg(long)]
    cost: Decimal,

    #[arg(long)]
    status: Option<String>,

    #[arg(long)]
    category: Option<String>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    image: Option<PathBuf>,
  },

  /// Change fields of a product, or move it to a new SKU
  #[command(alias = "edit")]
  Update {
    sku: String,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    quantity: Option<u32>,

    #[arg(long)]
    cost: Option<Decimal>,

    #[arg(long)]
    status: Option<String>,

    #[arg(long)]
    category: Option<String>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    image: Option<PathBuf>,

    #[arg(long)]
    rename_to: Option<String>,

    /// Rename only: remove the old row instead of marking it deleted
    #[arg(long)]
    hard_delete_old: bool,
  },

  /// Record a stock movement
  Stock {
    sku: String,

    /// in or out
    direction: Direction,

    #[arg(allow_negative_numbers = true)]
    quantity: i64,

    #[arg(short, long)]
    note: Option<String>,
  },

  /// Delete a product (soft unless --hard)
  #[command(alias = "rm")]
  Delete {
    sku: String,

    #[arg(long)]
    hard: bool,
  },
}
