//! Argument parsing for the `stockroom` binary.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};
use stockroom_core::{Money, OrderStatus, ValidationError};

#[derive(Debug, Parser)]
#[command(name = "stockroom")]
#[command(about = "Inventory stock, supplier alerts and order issuing")]
#[command(version)]
pub struct Cli {
    /// Config file (default: platform config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, PartialEq, Subcommand)]
pub enum Command {
    /// Dashboard counts and revenue
    Stats,

    /// List products
    Products(PageArgs),

    /// List suppliers
    Suppliers(PageArgs),

    /// List orders, newest first
    Orders(PageArgs),

    /// Issue stock to someone (quantity 0 records the order only)
    OrderCreate {
        product_id: String,
        quantity: i64,
        issued_to: String,
        purpose: String,
        /// Price per item, e.g. 12.50
        #[arg(value_parser = parse_price)]
        price: i64,
        issued_by: Option<String>,
    },

    /// Move an order between issued and returned, adjusting stock
    OrderStatus {
        order_id: String,
        #[arg(value_parser = OrderStatus::from_str)]
        status: OrderStatus,
    },

    /// Delete an order (stock is kept)
    OrderDelete { order_id: String },

    /// Add stock; a negative quantity corrects a miscount
    Restock {
        product_id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
        /// Price per item, e.g. 12.50
        #[arg(value_parser = parse_price)]
        price: i64,
    },
}

#[derive(Debug, PartialEq, Args)]
pub struct PageArgs {
    /// Page number, starting at 1
    pub page: Option<u32>,
    /// Items per page
    pub limit: Option<u32>,
}

/// Decimal amount to cents.
fn parse_price(input: &str) -> Result<i64, ValidationError> {
    Money::parse(input).map(|m| m.cents())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(line: &str) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("stockroom").chain(line.split_whitespace()))
    }

    #[test]
    fn test_listing_with_page() {
        let cli = parse("--config /etc/stockroom.toml orders 2 10").unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/stockroom.toml")));
        assert_eq!(
            cli.command,
            Command::Orders(PageArgs {
                page: Some(2),
                limit: Some(10)
            })
        );

        let cli = parse("products -c local.toml").unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("local.toml")));
        assert_eq!(
            cli.command,
            Command::Products(PageArgs {
                page: None,
                limit: None
            })
        );
    }

    #[test]
    fn test_order_create() {
        let cli = parse("order-create p-1 6 Line3 maintenance 12.50 user-7").unwrap();
        assert_eq!(
            cli.command,
            Command::OrderCreate {
                product_id: "p-1".into(),
                quantity: 6,
                issued_to: "Line3".into(),
                purpose: "maintenance".into(),
                price: 1250,
                issued_by: Some("user-7".into()),
            }
        );

        let err = parse("order-create p-1 6 Line3 maintenance 1.234").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_order_status() {
        let cli = parse("order-status o-1 RETURNED").unwrap();
        assert_eq!(
            cli.command,
            Command::OrderStatus {
                order_id: "o-1".into(),
                status: OrderStatus::Returned
            }
        );

        let err = parse("order-status o-1 lost").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_restock_accepts_negative_correction() {
        let cli = parse("restock p-1 -5 0").unwrap();
        assert_eq!(
            cli.command,
            Command::Restock {
                product_id: "p-1".into(),
                quantity: -5,
                price: 0,
            }
        );
    }

    #[test]
    fn test_usage_errors() {
        assert_eq!(
            parse("").unwrap_err().kind(),
            ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        );
        assert_eq!(
            parse("restock p-1 5").unwrap_err().kind(),
            ErrorKind::MissingRequiredArgument
        );
        assert_eq!(
            parse("stats now").unwrap_err().kind(),
            ErrorKind::UnknownArgument
        );
        assert_eq!(
            parse("frobnicate").unwrap_err().kind(),
            ErrorKind::InvalidSubcommand
        );
        assert_eq!(parse("--help").unwrap_err().kind(), ErrorKind::DisplayHelp);
    }
}
