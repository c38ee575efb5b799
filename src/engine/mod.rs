use crate::common_types::{LanguageCode, RecognizedPage};
use crate::AppResult;
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod lazy_handle;
pub use lazy_handle::*;

#[cfg(feature = "ocr")]
mod ocrs_engine;
#[cfg(feature = "ocr")]
pub use ocrs_engine::*;

#[cfg(test)]
pub mod stub;

/// Engine configuration, fixed when the process starts.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub lang: LanguageCode,
    pub use_angle_cls: bool,
    #[cfg_attr(not(feature = "ocr"), allow(dead_code))]
    pub models_dir: Option<PathBuf>,
}

/// A constructed recognition engine. Calls block the current thread.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, file_path: &Path) -> AppResult<Vec<RecognizedPage>>;
}

pub trait EngineFactory: Send + Sync {
    fn create(&self, options: &EngineOptions) -> AppResult<Arc<dyn OcrEngine>>;
}

pub struct DefaultEngineFactory;

impl EngineFactory for DefaultEngineFactory {
    #[cfg(feature = "ocr")]
    fn create(&self, options: &EngineOptions) -> AppResult<Arc<dyn OcrEngine>> {
        Ok(Arc::new(OcrsEngine::new(options)?))
    }

    #[cfg(not(feature = "ocr"))]
    fn create(&self, _options: &EngineOptions) -> AppResult<Arc<dyn OcrEngine>> {
        Err(crate::errors::AppError::EngineUnavailable {
            message: "ocr-worker was built without the `ocr` feature".to_string(),
        })
    }
}
