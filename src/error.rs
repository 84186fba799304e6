use thiserror::Error;

/// Errors that abort a review run as a whole.
///
/// Per-chunk analysis failures never surface here; the pipeline converts
/// them into report text at the chunk boundary. Only conditions detected
/// before any chunk is processed (or outside the pipeline entirely, such as
/// reading the manuscript or writing the export) use this type.
#[derive(Debug, Error)]
pub enum Error {
    /// No usable API key, model, or option value. Fatal before analysis starts.
    #[error("configuration error: {0}")]
    Config(String),

    /// The manuscript could not be read or its text extracted.
    #[error("document error: {0}")]
    Document(String),

    /// The assembled report could not be written out.
    #[error("export error: {0}")]
    Export(String),
}

pub type Result<T> = std::result::Result<T, Error>;
