use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, IngestError>;

/// Error type covering the different failure cases that can occur while a
/// supplier workbook is read, segmented, parsed, or exported.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when table start and end boundaries of a sheet cannot be paired.
    #[error(
        "could not find table boundaries in sheet '{sheet}': table starts {starts:?}, table ends {ends:?}"
    )]
    Segmentation {
        sheet: String,
        starts: Vec<usize>,
        ends: Vec<usize>,
    },

    /// Raised when a dimension or numeric cell does not hold a decimal number.
    #[error("invalid numeric value '{value}'")]
    NumericFormat { value: String },

    /// Wraps a failure raised while a single table row was extracted. `row`
    /// is the one-based spreadsheet row number.
    #[error("{supplier}: row {row} of sheet '{sheet}' failed: {source}")]
    Row {
        supplier: String,
        sheet: String,
        row: usize,
        #[source]
        source: Box<IngestError>,
    },

    /// Raised when a workbook does not contain a sheet that was asked for.
    #[error("missing sheet '{0}'")]
    MissingSheet(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when a supplier name is not one of the known sources.
    #[error("unknown supplier '{0}'")]
    UnknownSupplier(String),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
