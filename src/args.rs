use crate::common_types::{LanguageCode, MessageSizeLimit};
use crate::engine::EngineOptions;
use clap::builder::BoolishValueParser;
use clap::*;
use std::net::IpAddr;
use std::num::NonZeroUsize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    #[command(about = "Run the OCR worker RPC server")]
    Serve {
        #[arg(
            short = 'p',
            long,
            env = "WORKER_PORT",
            default_value_t = 50051,
            help = "Port to listen on"
        )]
        port: u16,
        #[arg(
            long,
            env = "WORKER_BIND_ADDRESS",
            default_value = "0.0.0.0",
            help = "Address to bind the server to"
        )]
        bind_address: IpAddr,
        #[arg(
            short = 'c',
            long,
            env = "WORKER_CONCURRENCY",
            default_value = "1",
            help = "Maximum number of recognitions running at the same time"
        )]
        concurrency: NonZeroUsize,
        #[arg(
            long,
            env = "WORKER_MAX_MESSAGE_SIZE",
            default_value = "20MiB",
            help = "Maximum size of request and response messages such as 20MiB, 512KiB or bytes"
        )]
        max_message_size: MessageSizeLimit,
        #[arg(
            long,
            env = "WORKER_PRELOAD_ENGINE",
            default_value_t = false,
            action = ArgAction::Set,
            value_parser = BoolishValueParser::new(),
            help = "Initialize the OCR engine at startup instead of on the first request"
        )]
        preload_engine: bool,
        #[command(flatten)]
        engine_args: EngineArgs,
    },
    #[command(about = "Extract text from a single file and print it")]
    Extract {
        #[arg(help = "Image or PDF file to extract text from")]
        file_path: String,
        #[command(flatten)]
        engine_args: EngineArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    #[arg(
        short = 'l',
        long,
        env = "WORKER_LANG",
        default_value = "es",
        value_parser = LanguageCode::parse,
        help = "Recognition language code"
    )]
    pub lang: LanguageCode,

    #[arg(
        long,
        env = "WORKER_USE_ANGLE_CLS",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        help = "Recognize rotated pages by running four recognition passes per page (upright, 90, 180, 270 degrees) [default: true, or PADDLE_USE_ANGLE_CLS when set]"
    )]
    pub use_angle_cls: Option<bool>,

    #[arg(
        long,
        env = "OCRS_MODELS_DIR",
        help = "Directory with text-detection.rten and text-recognition.rten models"
    )]
    pub models_dir: Option<PathBuf>,
}

const LEGACY_USE_ANGLE_CLS_ENV: &str = "PADDLE_USE_ANGLE_CLS";

/// The flag and `WORKER_USE_ANGLE_CLS` win over the legacy variable,
/// which only accepts `1`, `true`, `yes`, `y` and `on` as true.
fn resolve_use_angle_cls(explicit: Option<bool>, legacy: Option<&str>) -> bool {
    match (explicit, legacy) {
        (Some(value), _) => value,
        (None, Some(value)) => matches!(
            value.to_lowercase().as_str(),
            "1" | "true" | "yes" | "y" | "on"
        ),
        (None, None) => true,
    }
}

impl From<EngineArgs> for EngineOptions {
    fn from(args: EngineArgs) -> Self {
        let legacy = std::env::var(LEGACY_USE_ANGLE_CLS_ENV).ok();
        EngineOptions {
            lang: args.lang,
            use_angle_cls: resolve_use_angle_cls(args.use_angle_cls, legacy.as_deref()),
            models_dir: args.models_dir,
        }
    }
}
