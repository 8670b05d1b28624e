//! Helpers for reading and writing the item table as CSV

use std::{
    io::{Read, Write},
    str::FromStr,
};

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use csv::{StringRecord, Trim};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    errors::{Error, ParseWarning},
    types::{money, Item, ItemCollection, COLUMNS},
};

/// Format dates are written in
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Date formats accepted on input, tried in order. Anything ambiguous is day first.
const INPUT_DATE_FORMATS: [&str; 4] = ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d"];

/// Day-first formats with a two digit year, tried only once the four digit forms fail
const SHORT_YEAR_DATE_FORMATS: [&str; 3] = ["%d/%m/%y", "%d-%m-%y", "%d.%m.%y"];

/// ISO date-time forms; the time of day is discarded
const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// `%Y` happily reads `24` as the year 24; anything earlier than this is a misread short year
const MIN_YEAR: i32 = 1000;

/// Largest magnitude accepted for a single amount, in whole units. Keeps sums over
/// any realistic number of rows well inside [`Decimal::MAX`].
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// A row as it appears in the file, before any field is interpreted.
///
/// Every field is kept as text so one bad value only costs that field, not the row.
/// The stored `profit` column is read but never trusted.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct RawRow {
    category: String,
    description: String,
    purchase_price: String,
    asking_price: String,
    sale_price: String,
    listed_date: String,
    sold_date: String,
    shipping_cost: String,
    other_costs: String,
    #[allow(dead_code)]
    profit: String,
}

/// Field-by-field parser for one row, collecting warnings as it goes
struct RowParser<'w> {
    row: usize,
    warnings: &'w mut Vec<ParseWarning>,
}

impl RowParser<'_> {
    fn warn(&mut self, column: &'static str, value: &str) {
        let warning = ParseWarning {
            row: self.row,
            column,
            value: value.to_string(),
        };
        tracing::debug!(%warning, "Degrading unparseable field");
        self.warnings.push(warning);
    }

    /// Absent when blank or unparseable
    fn optional_amount(&mut self, column: &'static str, value: &str) -> Option<Decimal> {
        if value.is_empty() {
            return None;
        }
        let parsed = parse_amount(value);
        if parsed.is_none() {
            self.warn(column, value);
        }
        parsed
    }

    /// Zero when blank or unparseable
    fn amount(&mut self, column: &'static str, value: &str) -> Decimal {
        self.optional_amount(column, value)
            .unwrap_or_else(|| money(Decimal::ZERO))
    }

    fn date(&mut self, column: &'static str, value: &str) -> Option<NaiveDate> {
        if value.is_empty() {
            return None;
        }
        let parsed = parse_date(value);
        if parsed.is_none() {
            self.warn(column, value);
        }
        parsed
    }

    fn item(&mut self, raw: RawRow) -> Item {
        Item {
            category: Some(raw.category).filter(|category| !category.is_empty()),
            purchase_price: self.amount("purchase_price", &raw.purchase_price),
            asking_price: self.amount("asking_price", &raw.asking_price),
            sale_price: self.optional_amount("sale_price", &raw.sale_price),
            listed_date: self.date("listed_date", &raw.listed_date),
            sold_date: self.date("sold_date", &raw.sold_date),
            shipping_cost: self.amount("shipping_cost", &raw.shipping_cost),
            other_costs: self.amount("other_costs", &raw.other_costs),
            description: raw.description,
        }
    }
}

/// Parses a decimal amount, rescaled to [`MONEY_SCALE`](crate::types::MONEY_SCALE).
///
/// A comma is accepted as the decimal separator when there is no dot. Amounts
/// larger than [`MAX_AMOUNT`] are rejected.
#[must_use]
pub fn parse_amount(value: &str) -> Option<Decimal> {
    let value = value.trim();
    let parsed = if !value.contains('.') && value.matches(',').count() == 1 {
        Decimal::from_str(&value.replace(',', "."))
    } else {
        Decimal::from_str(value)
    };
    parsed
        .ok()
        .filter(|amount| amount.abs() <= Decimal::from(MAX_AMOUNT))
        .map(money)
}

/// Parses a calendar date, day first: `05/03/2024` is the 5th of March.
///
/// Two digit years follow chrono's `%y`: `05/03/24` is 2024. ISO dates
/// (`2024-03-05`, optionally with a time of day) are accepted too, since they are
/// unambiguous.
#[must_use]
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    INPUT_DATE_FORMATS
        .iter()
        .filter_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .find(|date| date.year() >= MIN_YEAR)
        .or_else(|| {
            SHORT_YEAR_DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        })
        .or_else(|| {
            DATE_TIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .map(|datetime| datetime.date())
                .filter(|date| date.year() >= MIN_YEAR)
        })
}

/// Loads items from a CSV-formatted stream.
///
/// Columns are matched by header name, so column order does not matter and
/// missing columns read as blank. Fields that fail to parse are degraded (see
/// [`ParseWarning`]) and reported alongside the items.
///
/// Expects input data in this format (including header):
/// ```csv
/// category,description,purchase_price,asking_price,sale_price,listed_date,sold_date,shipping_cost,other_costs,profit
/// shoes,   trainers,   10.00,         18.00,       20.00,     01/03/2024, 05/03/2024,1.00,        0.00,       9.00
/// coats,   parka,      5.00,          12.00,       ,          02/03/2024, ,          0.00,        0.00,
/// ```
pub fn read_items_from_csv<R>(reader: &mut R) -> Result<(ItemCollection, Vec<ParseWarning>), Error>
where
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut record = StringRecord::new();
    let mut items = ItemCollection::new();
    let mut warnings = Vec::new();
    let mut row = 0;
    while csv_reader.read_record(&mut record)? {
        row += 1;
        // Short rows read as if the trailing fields were blank
        while record.len() < headers.len() {
            record.push_field("");
        }
        let raw: RawRow = record.deserialize(Some(&headers))?;
        let mut parser = RowParser {
            row,
            warnings: &mut warnings,
        };
        items.push(parser.item(raw));
    }
    Ok((items, warnings))
}

/// Type used for serializing an [`Item`], including its derived `profit`.
#[derive(Serialize, Debug)]
struct ItemRow<'a> {
    category: &'a str,
    description: &'a str,
    purchase_price: Decimal,
    asking_price: Decimal,
    #[serde(with = "rust_decimal::serde::str_option")]
    sale_price: Option<Decimal>,
    listed_date: Option<String>,
    sold_date: Option<String>,
    shipping_cost: Decimal,
    other_costs: Decimal,
    #[serde(with = "rust_decimal::serde::str_option")]
    profit: Option<Decimal>,
}

impl<'a> From<&'a Item> for ItemRow<'a> {
    fn from(item: &'a Item) -> Self {
        Self {
            category: item.category().unwrap_or_default(),
            description: &item.description,
            purchase_price: item.purchase_price,
            asking_price: item.asking_price,
            sale_price: item.sale_price,
            listed_date: item.listed_date.map(|date| date.format(DATE_FORMAT).to_string()),
            sold_date: item.sold_date.map(|date| date.format(DATE_FORMAT).to_string()),
            shipping_cost: item.shipping_cost,
            other_costs: item.other_costs,
            profit: item.profit(),
        }
    }
}

/// Outputs items to CSV, header first, even when there are no items.
///
/// See [`Item`] for more details on the meaning of each field.
///
/// Output data will be in the form:
/// ```csv
/// category,description,purchase_price,asking_price,sale_price,listed_date,sold_date,shipping_cost,other_costs,profit
/// shoes,trainers,10.00,18.00,20.00,01/03/2024,05/03/2024,1.00,0.00,9.00
/// coats,parka,5.00,12.00,,02/03/2024,,0.00,0.00,
/// ```
pub fn write_items_to_csv<'a, W, I>(writer: &mut W, items: I) -> Result<(), Error>
where
    W: Write,
    I: IntoIterator<Item = &'a Item>,
{
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(COLUMNS)?;
    for item in items {
        csv_writer.serialize(ItemRow::from(item))?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}
