use std::path::PathBuf;

use thiserror::Error;

/// Main import error type
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Document processing failed")]
    Processing(#[from] ProcessingError),

    #[error("Invalid page range '{input}': {message}")]
    InvalidPageRange { input: String, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to serialize {what}")]
    Serialization {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Document processing errors
#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("Failed to load PDFium library: {message}")]
    PdfiumUnavailable { message: String },

    #[error("Cannot open or parse document {path}: {message}")]
    SourceUnavailable { path: PathBuf, message: String },

    #[error("Failed to decode image {image_index} on page {page}")]
    ImageDecode {
        page: usize,
        image_index: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to read text from page {page}")]
    PageText {
        page: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to write {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ImportError {
    /// Short machine-readable code, used in log fields
    pub fn error_code(&self) -> &'static str {
        match self {
            ImportError::Processing(ProcessingError::PdfiumUnavailable { .. }) => {
                "pdfium_unavailable"
            }
            ImportError::Processing(ProcessingError::SourceUnavailable { .. }) => {
                "source_unavailable"
            }
            ImportError::Processing(ProcessingError::ImageDecode { .. }) => "image_decode",
            ImportError::Processing(ProcessingError::PageText { .. }) => "page_text",
            ImportError::Processing(ProcessingError::Io { .. }) => "io_error",
            ImportError::InvalidPageRange { .. } => "invalid_page_range",
            ImportError::Config { .. } => "config_error",
            ImportError::Serialization { .. } => "serialization_error",
        }
    }

    /// Render the error together with its source chain on one line
    pub fn report(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}

impl ProcessingError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ProcessingError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for import operations
pub type ImportResult<T> = Result<T, ImportError>;
