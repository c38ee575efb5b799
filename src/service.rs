use crate::common_types::{join_recognized_lines, MessageSizeLimit, RequestId};
use crate::engine::LazyEngineHandle;
use crate::errors::AppError;
use crate::gate::{AdmissionGate, GatePermit};
use crate::AppResult;
use rvstruct::ValueStruct;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, warn, Instrument, Span};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PingRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingResponse {
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractTextRequest {
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub request_id: Option<RequestId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractTextResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

impl ExtractTextResponse {
    pub fn succeeded(text: String, elapsed_ms: u64) -> Self {
        Self {
            ok: true,
            text: Some(text),
            error: None,
            elapsed_ms,
        }
    }

    /// Size of the response as it is sent over the wire.
    pub fn encoded_len(&self) -> AppResult<usize> {
        serde_json::to_vec(self)
            .map(|encoded| encoded.len())
            .map_err(|e| AppError::SystemError {
                message: format!("Unable to encode response: {}", e),
            })
    }

    pub fn failed(err: &AppError, elapsed_ms: u64) -> Self {
        Self {
            ok: false,
            text: None,
            error: Some(err.to_string()),
            elapsed_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: String,
    pub gate_capacity: usize,
    pub gate_available: usize,
    pub engine_initialized: bool,
}

/// Admits extraction requests through the gate and runs recognition on the blocking pool.
#[derive(Clone)]
pub struct OcrWorkerService {
    gate: AdmissionGate,
    engine: Arc<LazyEngineHandle>,
    max_message_size: MessageSizeLimit,
}

impl OcrWorkerService {
    pub fn new(
        gate: AdmissionGate,
        engine: Arc<LazyEngineHandle>,
        max_message_size: MessageSizeLimit,
    ) -> Self {
        Self {
            gate,
            engine,
            max_message_size,
        }
    }

    pub fn ping(&self, request: PingRequest) -> PingResponse {
        let message = match request.message.as_deref() {
            Some(message) if !message.is_empty() => format!("pong: {message}"),
            _ => "pong".to_string(),
        };
        PingResponse { message }
    }

    pub fn health(&self) -> HealthReport {
        HealthReport {
            status: "ok".to_string(),
            gate_capacity: self.gate.capacity(),
            gate_available: self.gate.available(),
            engine_initialized: self.engine.is_initialized(),
        }
    }

    pub async fn extract_text(
        &self,
        request: ExtractTextRequest,
        cancel: &CancellationToken,
    ) -> ExtractTextResponse {
        let span = info_span!(
            "extract_text",
            request_id = request.request_id.as_ref().map(|id| id.value().as_str()),
            file_path = %request.file_path,
        );
        async move {
            let permit = match self.gate.acquire_cancellable(cancel).await {
                Ok(permit) => permit,
                Err(err) => {
                    warn!(error = %err, "Request released before admission");
                    return ExtractTextResponse::failed(&err, 0);
                }
            };
            let admitted_at = Instant::now();

            let result = self.extract_admitted(request.file_path, permit).await;
            let elapsed_ms = admitted_at.elapsed().as_millis() as u64;
            match result.and_then(|text| self.limit_response(text, elapsed_ms)) {
                Ok(response) => {
                    info!(elapsed_ms, "Text extracted");
                    response
                }
                Err(err @ (AppError::FilePathRequired | AppError::FileNotFound { .. })) => {
                    warn!(error = %err, "Request rejected");
                    ExtractTextResponse::failed(&err, elapsed_ms)
                }
                Err(err) => {
                    error!(error = %err, elapsed_ms, "OCR execution failed");
                    ExtractTextResponse::failed(&err, elapsed_ms)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Constructs the engine ahead of the first request, under the same gate.
    pub async fn preload_engine(&self) -> AppResult<()> {
        let permit = self.gate.acquire().await?;
        let engine = self.engine.clone();
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            engine.get_or_create().map(|_| ())
        })
        .await?
    }

    // The permit moves into the blocking task: it is only released once recognition
    // returns, even when the caller stops waiting for it.
    async fn extract_admitted(&self, file_path: String, permit: GatePermit) -> AppResult<String> {
        if file_path.is_empty() {
            return Err(AppError::FilePathRequired);
        }
        let path = PathBuf::from(&file_path);
        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => {}
            _ => return Err(AppError::FileNotFound { file_path }),
        }

        let engine = self.engine.clone();
        let span = Span::current();
        let pages = tokio::task::spawn_blocking(move || {
            let _entered = span.enter();
            let _permit = permit;
            let engine = engine.get_or_create()?;
            engine.recognize(&path)
        })
        .await??;

        Ok(join_recognized_lines(&pages))
    }

    fn limit_response(&self, text: String, elapsed_ms: u64) -> AppResult<ExtractTextResponse> {
        let response = ExtractTextResponse::succeeded(text, elapsed_ms);
        let size = response.encoded_len()?;
        if size > self.max_message_size.bytes {
            return Err(AppError::MessageTooLarge {
                size,
                limit: self.max_message_size.bytes,
            });
        }
        Ok(response)
    }
}
