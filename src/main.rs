use clap::Parser;
use console::{Style, Term};
use tracing_subscriber::EnvFilter;

use std::error::Error;
use std::sync::Arc;

mod args;
use crate::commands::*;
use crate::engine::DefaultEngineFactory;
use crate::errors::AppError;
use args::*;

mod errors;

mod commands;

mod common_types;

mod engine;

#[cfg(feature = "ocr")]
mod file_converters;

mod gate;

mod server;

mod service;

pub type AppResult<T> = Result<T, AppError>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let term = Term::stdout();
    let bold_style = Style::new().bold();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    term.write_line(
        format!(
            "{} v{}",
            bold_style.clone().green().apply_to("OCR Worker"),
            bold_style.apply_to(env!("CARGO_PKG_VERSION"))
        )
        .as_str(),
    )?;

    let cli = CliArgs::parse();
    if let Err(err) = handle_args(cli, &term).await {
        term.write_line(
            format!(
                "{}: {}\nDetails: {:?}",
                bold_style.clone().red().apply_to("Error"),
                err,
                err.source()
            )
            .as_str(),
        )?;
        std::process::exit(1);
    }

    Ok(())
}

async fn handle_args(cli: CliArgs, term: &Term) -> AppResult<()> {
    let bold_style = Style::new().bold();

    match cli.command {
        CliCommand::Serve {
            port,
            bind_address,
            concurrency,
            max_message_size,
            preload_engine,
            engine_args,
        } => {
            let options = ServeCommandOptions {
                bind_address,
                port,
                concurrency,
                max_message_size,
                preload_engine,
            };
            command_serve(term, options, engine_args.into()).await?;
        }
        CliCommand::Extract {
            file_path,
            engine_args,
        } => {
            let response =
                command_extract(&file_path, Arc::new(DefaultEngineFactory), engine_args.into())
                    .await?;
            match (response.ok, response.text, response.error) {
                (true, Some(text), _) => {
                    term.write_line(text.as_str())?;
                    term.write_line(
                        format!(
                            "{} in {} ms.",
                            bold_style.clone().green().apply_to("Extracted"),
                            bold_style.apply_to(response.elapsed_ms)
                        )
                        .as_str(),
                    )?;
                }
                (_, _, error) => {
                    return Err(AppError::ExtractionFailed {
                        message: format!(
                            "{} (after {} ms)",
                            error.unwrap_or_else(|| "unknown error".to_string()),
                            response.elapsed_ms
                        ),
                    });
                }
            }
        }
    }

    Ok(())
}
