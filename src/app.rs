//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads config and stored state
//! - runs `check` / `discover` / `read`
//! - writes JSON-lines messages to stdout and checkpoints to the state file

use std::io::{BufWriter, Write};
use std::path::Path;

use clap::Parser;

use crate::cli::{Command, ConfigArgs, ReadArgs};
use crate::data::Transport;
use crate::domain::{ConnectionStatus, Message, SyncMode};
use crate::error::{AppError, SourceError};
use crate::source::ExchangeRateSource;

pub mod pipeline;

/// Entry point for the `exrate` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    let source = ExchangeRateSource::new();

    match cli.command {
        Command::Check(args) => handle_check(&source, &args),
        Command::Discover(args) => handle_discover(&source, &args),
        Command::Read(args) => handle_read(&source, &args),
    }
}

fn handle_check(source: &ExchangeRateSource, args: &ConfigArgs) -> Result<(), AppError> {
    let config = crate::io::load_config(&args.config)?;
    let message = match source.check_connection(&config) {
        Ok(()) => Message::ConnectionStatus {
            status: ConnectionStatus::Succeeded,
            message: None,
        },
        Err(err) => {
            log::warn!("Connection check failed: {err}");
            Message::ConnectionStatus {
                status: ConnectionStatus::Failed,
                message: Some(err.to_string()),
            }
        }
    };
    print_message(&mut std::io::stdout().lock(), &message)?;
    Ok(())
}

fn handle_discover(source: &ExchangeRateSource, args: &ConfigArgs) -> Result<(), AppError> {
    let config = crate::io::load_config(&args.config)?;
    let streams = source.discover(&config)?;
    print_message(&mut std::io::stdout().lock(), &Message::Catalog { streams })?;
    Ok(())
}

fn handle_read(source: &ExchangeRateSource, args: &ReadArgs) -> Result<(), AppError> {
    let config = crate::io::load_config(&args.config.config)?;
    source.check_connection(&config)?;

    let transport = source.transport(&config)?;
    let mode = if args.full_refresh {
        SyncMode::FullRefresh
    } else {
        SyncMode::Incremental
    };
    let state = stored_state(mode, args.state.as_deref())?;

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for stream in source.streams(&config)? {
        read_to_writer(&stream, &transport, mode, state, args.state.as_deref(), &mut out)?;
    }
    out.flush().map_err(SourceError::from)?;
    Ok(())
}

/// State to resume from. A full refresh never looks at the state file.
fn stored_state(
    mode: SyncMode,
    path: Option<&Path>,
) -> Result<Option<crate::domain::CursorState>, SourceError> {
    match (mode, path) {
        (SyncMode::Incremental, Some(path)) => crate::io::read_state(path),
        _ => Ok(None),
    }
}

/// Run one stream, printing every message and persisting each checkpoint.
pub fn read_to_writer<T: Transport + ?Sized, W: Write>(
    stream: &crate::stream::ExchangeRateStream,
    transport: &T,
    mode: SyncMode,
    state: Option<crate::domain::CursorState>,
    state_path: Option<&Path>,
    out: &mut W,
) -> Result<pipeline::SyncSummary, SourceError> {
    pipeline::read_stream(stream, transport, mode, state, |message| {
        print_message(out, &message)?;
        if let (Message::State { data }, Some(path)) = (&message, state_path) {
            // Flush records before the state that covers them is persisted.
            out.flush()?;
            crate::io::write_state(path, data)?;
        }
        Ok(())
    })
}

fn print_message<W: Write>(out: &mut W, message: &Message) -> Result<(), SourceError> {
    writeln!(out, "{}", message.to_json_line()?)?;
    Ok(())
}
