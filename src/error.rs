use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unsupported format {0:?}. Use \"json\" or \"markdown\".")]
    UnsupportedFormat(String),

    #[error("Invalid {name} marker selector {selector:?}")]
    InvalidMarker { name: &'static str, selector: String },

    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize export: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ExportError>;
