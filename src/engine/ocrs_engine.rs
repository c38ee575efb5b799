use crate::common_types::{RecognizedLine, RecognizedPage};
use crate::engine::{EngineOptions, OcrEngine};
use crate::errors::AppError;
use crate::file_converters::FileConverters;
use crate::AppResult;
use image::DynamicImage;
use ocrs::{ImageSource, OcrEngineParams};
use rvstruct::ValueStruct;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Recognition engine backed by the `ocrs` detection and recognition models.
pub struct OcrsEngine {
    ocr_engine: ocrs::OcrEngine,
    use_angle_cls: bool,
    file_converters: FileConverters,
}

impl OcrsEngine {
    /// The bundled models only recognize the Latin alphabet
    const SUPPORTED_LANGUAGES: [&'static str; 21] = [
        "latin", "en", "es", "fr", "de", "it", "pt", "nl", "ca", "da", "fi", "no", "sv", "pl",
        "cs", "ro", "hu", "tr", "id", "ms", "vi",
    ];

    pub fn new(options: &EngineOptions) -> AppResult<Self> {
        let lang = options.lang.value();
        if !Self::SUPPORTED_LANGUAGES.contains(&lang.as_str()) {
            return Err(AppError::UnsupportedLanguage { lang: lang.clone() });
        }

        let models_dir = match &options.models_dir {
            Some(dir) if dir.is_dir() => dir.clone(),
            Some(dir) => {
                return Err(AppError::EngineUnavailable {
                    message: format!("Models directory does not exist: {}", dir.display()),
                })
            }
            None => Self::find_models_dir()?,
        };
        info!(models_dir = %models_dir.display(), "Loading OCR models");

        let detection_model = Self::load_model(&models_dir.join("text-detection.rten"))?;
        let recognition_model = Self::load_model(&models_dir.join("text-recognition.rten"))?;
        let ocr_engine = ocrs::OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|e| AppError::EngineUnavailable {
            message: e.to_string(),
        })?;

        let mut file_converters = FileConverters::new();
        file_converters.init();

        Ok(Self {
            ocr_engine,
            use_angle_cls: options.use_angle_cls,
            file_converters,
        })
    }

    fn load_model(path: &Path) -> AppResult<rten::Model> {
        rten::Model::load_file(path).map_err(|e| AppError::EngineUnavailable {
            message: format!("Failed to load model {}: {}", path.display(), e),
        })
    }

    fn find_models_dir() -> AppResult<PathBuf> {
        let executable = std::env::current_exe()?;
        let current_dir = executable.parent().map(|p| p.to_path_buf());

        [
            current_dir.clone().map(|p| p.join("models").join("ocrs")),
            current_dir.and_then(|p| p.parent().map(|p| p.join("share").join("ocrs"))),
            dirs::home_dir().map(|p| p.join(".cache").join("ocrs")),
        ]
        .into_iter()
        .flatten()
        .find(|p| p.exists())
        .ok_or_else(|| AppError::EngineUnavailable {
            message: "Could not find models directory".to_string(),
        })
    }

    fn recognize_image(&self, image: DynamicImage) -> AppResult<Vec<RecognizedLine>> {
        if !self.use_angle_cls {
            return self.recognize_lines(&image);
        }

        // Upright wins ties
        let mut best = self.recognize_lines(&image)?;
        let mut best_score = orientation_score(&best);
        for (degrees, rotated) in [
            (90, image.rotate90()),
            (180, image.rotate180()),
            (270, image.rotate270()),
        ] {
            let lines = self.recognize_lines(&rotated)?;
            let score = orientation_score(&lines);
            if score > best_score {
                debug!(degrees, score, "Rotated orientation recognized more text");
                best = lines;
                best_score = score;
            }
        }
        Ok(best)
    }

    fn recognize_lines(&self, image: &DynamicImage) -> AppResult<Vec<RecognizedLine>> {
        let rgb_image = image.to_rgb8();
        let image_source = ImageSource::from_bytes(rgb_image.as_raw(), rgb_image.dimensions())
            .map_err(recognition_error)?;
        let input = self
            .ocr_engine
            .prepare_input(image_source)
            .map_err(recognition_error)?;
        let word_rects = self
            .ocr_engine
            .detect_words(&input)
            .map_err(recognition_error)?;
        let line_rects = self.ocr_engine.find_text_lines(&input, &word_rects);
        Ok(self
            .ocr_engine
            .recognize_text(&input, &line_rects)
            .map_err(recognition_error)?
            .into_iter()
            .flatten()
            .map(|text_line| text_line.to_string())
            .filter(|text| !text.trim().is_empty())
            .map(RecognizedLine::new)
            .collect())
    }
}

impl OcrEngine for OcrsEngine {
    fn recognize(&self, file_path: &Path) -> AppResult<Vec<RecognizedPage>> {
        let media_type = mime_guess::from_path(file_path).first();
        if media_type.as_ref() == Some(&mime::APPLICATION_PDF) {
            let page_images = self.file_converters.pdf_to_images(file_path)?;
            debug!(pages = page_images.len(), "Rendered PDF pages");
            page_images
                .into_iter()
                .map(|page_image| self.recognize_image(page_image).map(RecognizedPage::new))
                .collect()
        } else {
            let image = image::open(file_path)?;
            Ok(vec![RecognizedPage::new(self.recognize_image(image)?)])
        }
    }
}

fn recognition_error<E: Display>(err: E) -> AppError {
    AppError::RecognitionError {
        message: err.to_string(),
    }
}

fn orientation_score(lines: &[RecognizedLine]) -> usize {
    lines
        .iter()
        .flat_map(|line| line.text.chars())
        .filter(|c| c.is_alphanumeric())
        .count()
}
