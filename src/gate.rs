use crate::errors::AppError;
use crate::AppResult;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

/// Limits how many callers may hold the recognition resource at once.
///
/// Waiters are admitted in FIFO order, so a steady stream of new callers
/// cannot starve an earlier one.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// A unit of gate capacity. Returned to the gate on drop.
#[derive(Debug)]
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
}

impl GatePermit {
    pub fn release(self) {
        drop(self)
    }
}

impl AdmissionGate {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity.get())),
            capacity: capacity.get(),
        }
    }

    pub async fn acquire(&self) -> AppResult<GatePermit> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| AppError::SystemError {
                message: format!("Admission gate is closed: {}", e),
            })?;
        Ok(GatePermit { _permit: permit })
    }

    /// Waits for admission unless `cancel` fires first, in which case no permit is granted.
    pub async fn acquire_cancellable(&self, cancel: &CancellationToken) -> AppResult<GatePermit> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AppError::Cancelled),
            permit = self.acquire() => permit,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}
