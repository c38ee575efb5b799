use crate::common_types::MessageSizeLimit;
use crate::engine::{DefaultEngineFactory, EngineOptions, LazyEngineHandle};
use crate::gate::AdmissionGate;
use crate::server::{shutdown_on_ctrl_c, start_server, ServerState};
use crate::service::OcrWorkerService;
use crate::AppResult;
use console::{Style, Term};
use rvstruct::ValueStruct;
use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct ServeCommandOptions {
    pub bind_address: IpAddr,
    pub port: u16,
    pub concurrency: NonZeroUsize,
    pub max_message_size: MessageSizeLimit,
    pub preload_engine: bool,
}

pub async fn command_serve(
    term: &Term,
    options: ServeCommandOptions,
    engine_options: EngineOptions,
) -> AppResult<()> {
    let bold_style = Style::new().bold();
    let addr = SocketAddr::new(options.bind_address, options.port);
    term.write_line(
        format!(
            "Serving on {}.\nLanguage: {}. Orientation classification: {}. Concurrency: {}.",
            bold_style.clone().white().apply_to(addr),
            bold_style.clone().yellow().apply_to(engine_options.lang.value()),
            if engine_options.use_angle_cls {
                bold_style.clone().green().apply_to("✓ Yes")
            } else {
                bold_style.clone().red().apply_to("✗ No")
            },
            bold_style.apply_to(options.concurrency),
        )
        .as_str(),
    )?;

    let engine = Arc::new(LazyEngineHandle::new(
        Arc::new(DefaultEngineFactory),
        engine_options,
    ));
    let service = OcrWorkerService::new(
        AdmissionGate::new(options.concurrency),
        engine,
        options.max_message_size,
    );

    if options.preload_engine {
        if let Err(err) = service.preload_engine().await {
            warn!(error = %err, "Engine preload failed, the first request will retry");
        }
    }

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_on_ctrl_c(shutdown.clone()));
    start_server(
        addr,
        ServerState { service, shutdown },
        options.max_message_size,
    )
    .await
}
