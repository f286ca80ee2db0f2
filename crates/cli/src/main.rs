//! Tally CLI - catalog & sales administration from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog (filtered, sorted, paginated)
//! tally products list --name moka --order desc --page 2
//!
//! # Create and update products
//! tally products create --name "Moka pot" --brand Bialetti --price "R$ 249,90" --category 3
//! tally products update 17 --name "Moka pot 6-cup" --brand Bialetti --price 289.90 --category 3
//! tally products delete 17
//!
//! # Categories
//! tally categories list
//! tally categories create --name Drinks
//!
//! # Monthly sales
//! tally sales summary --year 2024
//! tally sales override --year 2024 --month 1 --quantity 10 --total 999,90
//!
//! # Bulk CSV import / export
//! tally import products ./products.csv
//! tally products export -o ./products.csv
//! ```
//!
//! # Environment Variables
//!
//! - `TALLY_API_BASE_URL` - Base URL of the catalog/sales service (required)
//! - `TALLY_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default 30)
//! - `TALLY_PAGE_SIZE` - Catalog page size (default 4)

#![cfg_attr(not(test), forbid(unsafe_code))]
// Tabular output is the point of a CLI; logs still go through tracing.
#![allow(clippy::print_stdout)]

use clap::{Parser, Subcommand, ValueEnum};

use tally_core::{CategoryId, ImportKind, ProductId};
use tally_engine::PriceOrder;

mod commands;

#[derive(Parser)]
#[command(name = "tally")]
#[command(author, version, about = "Tally catalog & sales administration CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse and manage catalog products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage product categories
    Categories {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// Inspect and adjust monthly sales
    Sales {
        #[command(subcommand)]
        action: SalesAction,
    },
    /// Bulk-import a CSV file
    Import {
        /// What the file contains
        #[arg(value_enum)]
        target: ImportTarget,

        /// Path to the CSV file
        file: std::path::PathBuf,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// List products with optional filter, sort, and paging
    List {
        /// Case-insensitive name filter
        #[arg(short, long)]
        name: Option<String>,

        /// Restrict to one category id
        #[arg(short, long)]
        category: Option<i64>,

        /// Price sort direction
        #[arg(short, long, value_enum, default_value = "asc")]
        order: SortOrder,

        /// Page to show (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Create a new product
    Create {
        #[command(flatten)]
        fields: ProductFields,
    },
    /// Update an existing product
    Update {
        /// Product id
        id: i64,

        #[command(flatten)]
        fields: ProductFields,
    },
    /// Delete a product
    Delete {
        /// Product id
        id: i64,
    },
    /// Download the product catalog as CSV
    Export {
        /// Output path (defaults to products.csv)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },
}

#[derive(clap::Args)]
struct ProductFields {
    /// Product name
    #[arg(short, long)]
    name: String,

    /// Brand name
    #[arg(short, long)]
    brand: String,

    /// Price, either dot- or comma-decimal ("249.90", "R$ 249,90")
    #[arg(short, long)]
    price: String,

    /// Free-form description
    #[arg(short, long, default_value = "")]
    description: String,

    /// Category id
    #[arg(short, long)]
    category: i64,
}

#[derive(Subcommand)]
enum CategoryAction {
    /// List categories
    List,
    /// Create a new category
    Create {
        /// Category name
        #[arg(short, long)]
        name: String,
    },
    /// Rename an existing category
    Update {
        /// Category id
        id: i64,

        /// New category name
        #[arg(short, long)]
        name: String,
    },
}

#[derive(Subcommand)]
enum SalesAction {
    /// Show the 12-month summary table
    Summary {
        /// Restrict to one year (all years when omitted)
        #[arg(short, long)]
        year: Option<i32>,
    },
    /// List the years with recorded sales
    Years,
    /// Override one month's quantity and total
    Override {
        /// Year to edit
        #[arg(short, long)]
        year: i32,

        /// Month number (1-12)
        #[arg(short, long)]
        month: u8,

        /// New quantity sold
        #[arg(short, long)]
        quantity: String,

        /// New total, either dot- or comma-decimal
        #[arg(short, long)]
        total: String,
    },
    /// Download sales rows as CSV
    Export {
        /// Restrict to one year (all years when omitted)
        #[arg(short, long)]
        year: Option<i32>,

        /// Output path (defaults to sales_<year|all>.csv)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortOrder {
    Asc,
    Desc,
}

impl From<SortOrder> for PriceOrder {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Asc => Self::Ascending,
            SortOrder::Desc => Self::Descending,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ImportTarget {
    Products,
    Categories,
    Sales,
}

impl From<ImportTarget> for ImportKind {
    fn from(target: ImportTarget) -> Self {
        match target {
            ImportTarget::Products => Self::Product,
            ImportTarget::Categories => Self::Category,
            ImportTarget::Sales => Self::Sales,
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Products { action } => match action {
            ProductAction::List {
                name,
                category,
                order,
                page,
            } => {
                commands::products::list(
                    name.as_deref(),
                    category.map(CategoryId::new),
                    order.into(),
                    page,
                )
                .await?;
            }
            ProductAction::Create { fields } => {
                commands::products::save(&fields, None).await?;
            }
            ProductAction::Update { id, fields } => {
                commands::products::save(&fields, Some(ProductId::new(id))).await?;
            }
            ProductAction::Delete { id } => {
                commands::products::delete(ProductId::new(id)).await?;
            }
            ProductAction::Export { output } => {
                commands::products::export(output.as_deref()).await?;
            }
        },
        Commands::Categories { action } => match action {
            CategoryAction::List => commands::categories::list().await?,
            CategoryAction::Create { name } => {
                commands::categories::save(&name, None).await?;
            }
            CategoryAction::Update { id, name } => {
                commands::categories::save(&name, Some(CategoryId::new(id))).await?;
            }
        },
        Commands::Sales { action } => match action {
            SalesAction::Summary { year } => commands::sales::summary(year).await?,
            SalesAction::Years => commands::sales::years().await?,
            SalesAction::Override {
                year,
                month,
                quantity,
                total,
            } => {
                commands::sales::override_month(year, month, &quantity, &total).await?;
            }
            SalesAction::Export { year, output } => {
                commands::sales::export(year, output.as_deref()).await?;
            }
        },
        Commands::Import { target, file } => {
            commands::import::run(target.into(), &file).await?;
        }
    }
    Ok(())
}
