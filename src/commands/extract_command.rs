use crate::common_types::MessageSizeLimit;
use crate::engine::{EngineFactory, EngineOptions, LazyEngineHandle};
use crate::gate::AdmissionGate;
use crate::service::{ExtractTextRequest, ExtractTextResponse, OcrWorkerService};
use crate::AppResult;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runs one extraction through the same path the server uses, with a gate of one.
pub async fn command_extract(
    file_path: &str,
    engine_factory: Arc<dyn EngineFactory>,
    engine_options: EngineOptions,
) -> AppResult<ExtractTextResponse> {
    let service = OcrWorkerService::new(
        AdmissionGate::new(NonZeroUsize::MIN),
        Arc::new(LazyEngineHandle::new(engine_factory, engine_options)),
        MessageSizeLimit::default(),
    );
    Ok(service
        .extract_text(
            ExtractTextRequest {
                file_path: file_path.to_string(),
                request_id: None,
            },
            &CancellationToken::new(),
        )
        .await)
}
