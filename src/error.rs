use std::path::PathBuf;

/// Errors raised while loading and enriching a listings dataset.
///
/// File and schema failures are always fatal for the session. Whether an
/// unparseable price is fatal depends on `cleaning.on_unparsable_price`;
/// under the default policy the row is dropped and only counted.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed input: {0}")]
    Csv(#[from] csv::Error),

    #[error("delimiter {got:?} must be a single ASCII character")]
    InvalidDelimiter { got: String },

    #[error("required column `{name}` not found (headers: {headers:?})")]
    MissingColumn { name: String, headers: Vec<String> },

    #[error("no discount column found, tried {tried:?} (headers: {headers:?})")]
    MissingDiscountColumn {
        tried: Vec<String>,
        headers: Vec<String>,
    },

    #[error("row {row}: unparseable price {value:?}")]
    UnparsablePrice { row: usize, value: String },
}
