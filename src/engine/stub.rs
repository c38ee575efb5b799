use crate::common_types::{LanguageCode, RecognizedLine, RecognizedPage};
use crate::engine::{EngineFactory, EngineOptions, OcrEngine};
use crate::errors::AppError;
use crate::AppResult;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub fn stub_engine_options() -> EngineOptions {
    EngineOptions {
        lang: LanguageCode::parse("en").unwrap(),
        use_angle_cls: false,
        models_dir: None,
    }
}

/// Returns fixed pages and records how many calls overlap.
#[derive(Debug, Default)]
pub struct StubEngine {
    pub pages: Vec<RecognizedPage>,
    pub delay: Option<Duration>,
    pub failure: Option<String>,
    pub calls: AtomicUsize,
    pub active: AtomicUsize,
    pub peak_active: AtomicUsize,
}

impl StubEngine {
    pub fn with_lines(lines: &[&str]) -> Self {
        Self::with_pages(vec![RecognizedPage::new(
            lines.iter().map(|line| RecognizedLine::new(*line)).collect(),
        )])
    }

    pub fn with_pages(pages: Vec<RecognizedPage>) -> Self {
        Self {
            pages,
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl OcrEngine for StubEngine {
    fn recognize(&self, _file_path: &Path) -> AppResult<Vec<RecognizedPage>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_active.fetch_max(now_active, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.active.fetch_sub(1, Ordering::SeqCst);
        match &self.failure {
            Some(message) => Err(AppError::RecognitionError {
                message: message.clone(),
            }),
            None => Ok(self.pages.clone()),
        }
    }
}

/// Hands out one shared [`StubEngine`] and counts construction attempts.
pub struct CountingEngineFactory {
    pub engine: Arc<StubEngine>,
    pub constructions: AtomicUsize,
    pub construction_delay: Option<Duration>,
    pub failures_left: AtomicUsize,
}

impl CountingEngineFactory {
    pub fn new(engine: StubEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            constructions: AtomicUsize::new(0),
            construction_delay: None,
            failures_left: AtomicUsize::new(0),
        }
    }

    pub fn with_construction_delay(mut self, delay: Duration) -> Self {
        self.construction_delay = Some(delay);
        self
    }

    pub fn failing_first(self, attempts: usize) -> Self {
        self.failures_left.store(attempts, Ordering::SeqCst);
        self
    }
}

impl EngineFactory for CountingEngineFactory {
    fn create(&self, _options: &EngineOptions) -> AppResult<Arc<dyn OcrEngine>> {
        self.constructions.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.construction_delay {
            std::thread::sleep(delay);
        }
        let should_fail = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(AppError::SystemError {
                message: "models are missing".to_string(),
            });
        }
        Ok(self.engine.clone())
    }
}
