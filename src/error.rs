use thiserror::Error;

/// Convenience result type used across the crate.
pub type BillResult<T> = Result<T, BillError>;

/// Error type returned by parsing, exporting, rendering and session operations.
///
/// A single enum is shared by every stage so the session layer can surface one message per
/// failed action.
#[derive(Debug, Error)]
pub enum BillError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The bytes are not a recognized spreadsheet container, or the container is corrupt.
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// The container decoded but cannot be turned into a workbook (e.g. it has no sheets).
    #[error("failed to parse workbook: {message}")]
    Parse { message: String },

    /// The input is larger than [`crate::ingestion::ParseOptions::max_input_bytes`].
    #[error("input is {size} bytes, limit is {limit} bytes")]
    InputTooLarge { size: usize, limit: usize },

    /// An operation that needs at least one record (to derive columns) got none.
    #[error("{operation}: no records to derive columns from")]
    EmptyInput { operation: &'static str },

    /// Spreadsheet writer error.
    #[error("xlsx writer error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// The PDF document could not be assembled or serialized.
    #[error("failed to render document: {message}")]
    Render { message: String },

    /// Rendering would exceed [`crate::export::RenderOptions::max_pages`].
    #[error("limit exceeded: {message}")]
    LimitExceeded { message: String },

    /// The requested sheet does not exist in the active workbook.
    #[error("unknown sheet '{name}'")]
    UnknownSheet { name: String },

    /// A session action was attempted from a state that does not allow it.
    #[error("cannot {action} while session is {from}")]
    InvalidTransition { from: &'static str, action: &'static str },

    /// The background parse task went away without reporting a result.
    #[error("worker error: {message}")]
    Worker { message: String },
}
