use std::{io::Write as _, path::PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{ArgAction, Args, Parser, Subcommand};
use resale::{io, report, store::RecordStore, types::Item};
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Track resale items, sales and profit in a CSV file
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// CSV file holding the items; created if missing
    #[arg(long, short = 'f', env = "RESALE_DATA_FILE", default_value = "inventory.csv")]
    data_file: PathBuf,

    /// Log more (-v for info, -vv for debug)
    #[arg(long, short, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    page: Option<Page>,
}

#[derive(Subcommand, Debug)]
enum Page {
    /// Sales totals and a chart of sales per month
    Dashboard,
    /// Add a newly listed item
    Add(NewItem),
    /// List items as CSV, optionally only one category
    Inventory {
        /// Only show items in this category
        #[arg(long, short)]
        category: Option<String>,
        /// Print the known categories instead of the items
        #[arg(long, conflicts_with = "category")]
        list_categories: bool,
    },
    /// Average profit and purchase price per category, and profit per item
    Analysis,
}

#[derive(Args, Debug)]
struct NewItem {
    /// What kind of item it is
    #[arg(long, short, default_value = "")]
    category: String,
    /// What the item is
    #[arg(long, short)]
    description: String,
    /// What was paid for it
    #[arg(long, default_value = "0", value_parser = parse_non_negative)]
    purchase_price: Decimal,
    /// The price it is listed at
    #[arg(long, default_value = "0", value_parser = parse_non_negative)]
    asking_price: Decimal,
    /// Listing date, day first (dd/mm/yyyy); defaults to today
    #[arg(long, value_parser = parse_day_first)]
    listed_date: Option<NaiveDate>,
    /// Postage and packaging
    #[arg(long, default_value = "0", value_parser = parse_non_negative)]
    shipping_cost: Decimal,
    /// Any other expense
    #[arg(long, default_value = "0", value_parser = parse_non_negative)]
    other_costs: Decimal,
}

impl From<NewItem> for Item {
    fn from(new: NewItem) -> Self {
        let listed_date = new.listed_date.unwrap_or_else(|| Local::now().date_naive());
        Item::new(
            Some(new.category),
            new.description,
            new.purchase_price,
            new.asking_price,
            Some(listed_date),
        )
        .with_costs(new.shipping_cost, new.other_costs)
    }
}

fn parse_non_negative(value: &str) -> Result<Decimal, String> {
    match io::parse_amount(value) {
        Some(amount) if amount.is_sign_negative() && !amount.is_zero() => {
            Err(format!("{value} is negative"))
        }
        Some(amount) => Ok(amount),
        None => Err(format!("{value} is not a decimal amount")),
    }
}

fn parse_day_first(value: &str) -> Result<NaiveDate, String> {
    io::parse_date(value).ok_or_else(|| format!("{value} is not a date (expected dd/mm/yyyy)"))
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let store = RecordStore::new(&cli.data_file);
    store
        .initialize()
        .with_context(|| format!("Couldn't set up item table at {}", cli.data_file.display()))?;
    let items = store
        .load()
        .with_context(|| format!("Couldn't load items from {}", cli.data_file.display()))?;

    let mut stdout = std::io::stdout().lock();
    match cli.page.unwrap_or(Page::Dashboard) {
        Page::Dashboard => report::write_dashboard(&mut stdout, &items)?,
        Page::Add(new) => {
            if new.description.trim().is_empty() {
                bail!("An item needs a description");
            }
            let items = items.append(new.into());
            store
                .save(&items)
                .with_context(|| format!("Couldn't save items to {}", cli.data_file.display()))?;
            info!(items = items.len(), "Item added");
            writeln!(stdout, "Item added ({} items in total).", items.len())?;
        }
        Page::Inventory {
            list_categories: true,
            ..
        } => {
            for category in items.categories() {
                writeln!(stdout, "{category}")?;
            }
        }
        Page::Inventory { category, .. } => {
            io::write_items_to_csv(&mut stdout, items.filter_by_category(category.as_deref()))
                .context("Failed to write items to CSV")?;
        }
        Page::Analysis => report::write_analysis(&mut stdout, &items)?,
    }
    Ok(())
}
