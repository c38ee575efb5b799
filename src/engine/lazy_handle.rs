use crate::engine::{EngineFactory, EngineOptions, OcrEngine};
use crate::AppResult;
use rvstruct::ValueStruct;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

/// Builds the engine on first use and hands out the cached instance afterwards.
///
/// Only a successful construction is cached: when the factory fails, the
/// error goes back to the caller that triggered it and the next caller tries again.
pub struct LazyEngineHandle {
    factory: Arc<dyn EngineFactory>,
    options: EngineOptions,
    engine: Mutex<Option<Arc<dyn OcrEngine>>>,
    initialized: AtomicBool,
}

impl LazyEngineHandle {
    pub fn new(factory: Arc<dyn EngineFactory>, options: EngineOptions) -> Self {
        Self {
            factory,
            options,
            engine: Mutex::new(None),
            initialized: AtomicBool::new(false),
        }
    }

    /// Blocks while another caller is constructing the engine.
    pub fn get_or_create(&self) -> AppResult<Arc<dyn OcrEngine>> {
        let mut engine = self.lock();
        if let Some(existing) = engine.as_ref() {
            return Ok(existing.clone());
        }

        info!(
            lang = %self.options.lang.value(),
            use_angle_cls = self.options.use_angle_cls,
            "Initializing OCR engine"
        );
        match self.factory.create(&self.options) {
            Ok(created) => {
                *engine = Some(created.clone());
                self.initialized.store(true, Ordering::Release);
                info!("OCR engine is ready");
                Ok(created)
            }
            Err(err) => {
                warn!(error = %err, "OCR engine initialization failed");
                Err(err.into_engine_unavailable())
            }
        }
    }

    /// Never waits on the construction lock.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    // A panicking factory leaves the slot empty, so the poisoned state is still consistent.
    fn lock(&self) -> MutexGuard<'_, Option<Arc<dyn OcrEngine>>> {
        self.engine
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
