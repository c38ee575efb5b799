use crate::errors::AppError;
use crate::file_converters::pdf::PdfToImage;
use crate::AppResult;
use pdfium_render::prelude::*;
use std::path::Path;

pub struct PdfImageConverter {
    pdfium: Pdfium,
}

impl PdfImageConverter {
    const RENDER_TARGET_WIDTH: i32 = 2000;
    const RENDER_MAX_HEIGHT: i32 = 2800;

    pub fn new() -> AppResult<Self> {
        let executable = std::env::current_exe()?;
        let current_dir = executable
            .parent()
            .ok_or(AppError::SystemError {
                message: "No parent directory for executable".to_string(),
            })?
            .to_path_buf();

        // Next to the binary or in a sibling lib/ directory before falling back to the system library
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
            &current_dir,
        ))
        .or_else(|_| {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                &current_dir
                    .parent()
                    .map(|p| p.join("lib"))
                    .unwrap_or(current_dir.clone()),
            ))
        })
        .or_else(|_| Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./lib")))
        .or_else(|_| Pdfium::bind_to_system_library())?;

        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }
}

impl PdfToImage for PdfImageConverter {
    fn convert_to_images(&self, file_path: &Path) -> AppResult<Vec<image::DynamicImage>> {
        let render_config = PdfRenderConfig::new()
            .set_target_width(Self::RENDER_TARGET_WIDTH)
            .set_maximum_height(Self::RENDER_MAX_HEIGHT);
        let document = self.pdfium.load_pdf_from_file(file_path, None)?;
        let mut page_images = Vec::new();
        for page in document.pages().iter() {
            page_images.push(page.render_with_config(&render_config)?.as_image());
        }
        Ok(page_images)
    }
}
