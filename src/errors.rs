use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("file_path is required")]
    FilePathRequired,
    #[error("file not found")]
    FileNotFound { file_path: String },
    #[error("OCR engine is unavailable: {message}")]
    EngineUnavailable { message: String },
    #[error("OCR execution failed: {message}")]
    RecognitionError { message: String },
    #[error("Extraction failed: {message}")]
    ExtractionFailed { message: String },
    #[error("request cancelled")]
    Cancelled,
    #[error("response exceeds maximum message size: {size} > {limit} bytes")]
    MessageTooLarge { size: usize, limit: usize },
    #[error("Unsupported language '{lang}' for the OCR engine")]
    UnsupportedLanguage { lang: String },
    #[error("Input/output error: {0}")]
    InputOutputError(#[from] std::io::Error),
    #[error("Image conversion error: {0}")]
    ImageError(#[from] image::ImageError),
    #[cfg(feature = "pdf-render")]
    #[error("PDF conversion error: {0}")]
    PdfiumError(#[from] pdfium_render::prelude::PdfiumError),
    #[error("Blocking task failed: {0}")]
    BlockingTaskError(#[from] tokio::task::JoinError),
    #[error("System error: {message}")]
    SystemError { message: String },
}

impl AppError {
    /// Errors raised while building the engine are reported as an unavailable engine,
    /// everything else keeps its own message.
    pub fn into_engine_unavailable(self) -> Self {
        match self {
            err @ AppError::EngineUnavailable { .. } => err,
            other => AppError::EngineUnavailable {
                message: other.to_string(),
            },
        }
    }
}
