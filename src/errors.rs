use std::{fmt::Display, path::PathBuf};

/// Error type that can be returned by fallible operations in this crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error reading or writing CSV data; could wrap IO or encoding errors
    #[error("Error processing CSV")]
    Csv(#[from] csv::Error),
    /// The backing file could not be created, read, written or replaced.
    #[error("Storage at {} is not accessible", .path.display())]
    Storage {
        /// The file (or temporary sibling) the operation was working on
        path: PathBuf,
        /// The underlying IO failure
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }
}

/// A field that could not be parsed while loading.
///
/// These never fail a load: the field degrades to absent (or zero, for amounts
/// that always have a value) and the rest of the row is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// 1-based data row, not counting the header
    pub row: usize,
    /// Column the bad value was found in
    pub column: &'static str,
    /// The raw text that was rejected
    pub value: String,
}

impl Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "row {}: could not parse {} value {:?}",
            self.row, self.column, self.value
        )
    }
}
