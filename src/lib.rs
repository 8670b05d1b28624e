#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]
/// Error handling and custom [`Error`](std::error::Error) types
pub mod errors;
/// Functions for reading and writing the item table as CSV
pub mod io;
/// Profit and summary calculations over items
pub mod ops;
/// Text rendering of the dashboard and analysis pages
pub mod report;
/// The file-backed item table
pub mod store;
/// Data types used throughout the ledger
pub mod types;
