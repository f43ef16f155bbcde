//! # Stockroom CLI
//!
//! Runs a single service operation and prints the result as JSON.
//!
//! ```text
//! args ──► Cli::parse ──► StockroomConfig::load ──► Stockroom::open
//!                                                        │
//!                         stdout ◄── JSON ◄── command ◄──┘
//!                                                        │
//!                                     shutdown (flush alerts)
//! ```

mod command;

use std::process::ExitCode;

use clap::Parser;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, Level};
use tracing_subscriber::EnvFilter;

use stockroom_core::{NewOrder, Restock};
use stockroom_service::{ServiceError, Stockroom, StockroomConfig};

use crate::command::{Cli, Command};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    // Usage errors print clap's message and exit with status 2
    let cli = Cli::parse();

    init_tracing();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = StockroomConfig::load(cli.config)?;
    let stockroom = Stockroom::open(&config).await?;

    let result = execute(&stockroom, cli.command).await;

    // Queued alerts are delivered even when the command failed
    stockroom.shutdown().await;

    let output = result?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn execute(stockroom: &Stockroom, command: Command) -> Result<Value, CliError> {
    debug!(?command, "Executing command");

    let value = match command {
        Command::Stats => serde_json::to_value(stockroom.get_stats().await?)?,
        Command::Products(p) => {
            serde_json::to_value(stockroom.list_products(stockroom.page(p.page, p.limit)).await?)?
        }
        Command::Suppliers(p) => serde_json::to_value(
            stockroom
                .list_suppliers(stockroom.page(p.page, p.limit))
                .await?,
        )?,
        Command::Orders(p) => {
            serde_json::to_value(stockroom.list_orders(stockroom.page(p.page, p.limit)).await?)?
        }
        Command::OrderCreate {
            product_id,
            quantity,
            issued_to,
            purpose,
            price,
            issued_by,
        } => {
            let order = NewOrder {
                product_id,
                quantity: Some(quantity),
                issued_to,
                purpose,
                price_per_item_cents: price,
                issued_by,
                status: None,
            };
            serde_json::to_value(stockroom.create_order(order).await?)?
        }
        Command::OrderStatus { order_id, status } => {
            serde_json::to_value(stockroom.transition_order(&order_id, status).await?)?
        }
        Command::OrderDelete { order_id } => {
            stockroom.delete_order(&order_id).await?;
            serde_json::json!({ "deleted": order_id })
        }
        Command::Restock {
            product_id,
            quantity,
            price,
        } => {
            let restock = Restock {
                quantity,
                price_per_item_cents: price,
            };
            serde_json::to_value(stockroom.restock_product(&product_id, restock).await?)?
        }
    };

    Ok(value)
}

/// Logs go to stderr; `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stockroom=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .with_writer(std::io::stderr)
        .init();
}
