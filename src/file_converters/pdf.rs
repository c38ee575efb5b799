use crate::AppResult;
use std::path::Path;

pub trait PdfToImage {
    /// Renders every page of the document, first page first.
    fn convert_to_images(&self, file_path: &Path) -> AppResult<Vec<image::DynamicImage>>;
}
