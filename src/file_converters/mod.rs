use crate::errors::AppError;
use crate::file_converters::pdf::PdfToImage;
use crate::AppResult;
use image::DynamicImage;
use std::path::Path;
use std::sync::Mutex;
use tracing::warn;

pub mod pdf;

#[cfg(feature = "pdf-render")]
mod pdf_image_converter;

/// Converters bound once per engine. Pdfium is not reentrant, so one document is rendered at a time.
pub struct FileConverters {
    pub pdf_image_converter: Option<Mutex<Box<dyn PdfToImage + Send + 'static>>>,
}

impl FileConverters {
    pub fn new() -> Self {
        Self {
            pdf_image_converter: None,
        }
    }

    /// A missing Pdfium library only disables PDF input.
    #[cfg(feature = "pdf-render")]
    pub fn init(&mut self) {
        match pdf_image_converter::PdfImageConverter::new() {
            Ok(pdf_image_converter) => {
                self.pdf_image_converter = Some(Mutex::new(Box::new(pdf_image_converter)));
            }
            Err(err) => {
                warn!(error = %err, "Pdfium library is not available, PDF input is disabled");
            }
        }
    }

    #[cfg(not(feature = "pdf-render"))]
    pub fn init(&mut self) {
        warn!("ocr-worker was built without the `pdf-render` feature, PDF input is disabled");
    }

    pub fn pdf_to_images(&self, file_path: &Path) -> AppResult<Vec<DynamicImage>> {
        match &self.pdf_image_converter {
            Some(converter) => converter
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .convert_to_images(file_path),
            None => Err(AppError::RecognitionError {
                message: format!("PDF rendering is not available: {}", file_path.display()),
            }),
        }
    }
}

impl Default for FileConverters {
    fn default() -> Self {
        Self::new()
    }
}
