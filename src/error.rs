use thiserror::Error;

#[derive(Error, Debug)]
pub enum WaybillError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV file has no header row")]
    NoHeaderRow,

    #[error("Unknown canonical field: {0} (expected fee_type_raw, amount, order_ref or tracking_ref)")]
    UnknownCanonicalField(String),

    #[error("Header not found in file: '{header}' (mapped to {field})")]
    HeaderNotFound { field: &'static str, header: String },

    #[error("Field map is incomplete: missing {0}")]
    IncompleteFieldMap(String),

    #[error("Unknown match kind: {0} (expected exact, contains or regex)")]
    UnknownMatchKind(String),

    #[error("No upload with ID {0}")]
    UnknownUpload(i64),

    #[error("No line item with ID {0}")]
    UnknownLineItem(i64),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, WaybillError>;
