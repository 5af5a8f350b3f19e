//! Shared "read" pipeline used by the CLI and by tests.
//!
//! slices -> request path -> transport GET -> parse -> emit record -> merge cursor
//!
//! State is emitted every `state_checkpoint_interval` slices and once more at
//! the end. A slice whose fetch or parse fails stops the sync before the cursor
//! sees anything from it, so the last emitted state stays valid for resuming.

use crate::data::Transport;
use crate::domain::{CursorState, Message, SyncMode};
use crate::error::Result;
use crate::stream::ExchangeRateStream;

/// Counters for a finished `read`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    pub slices: usize,
    pub records: usize,
    pub checkpoints: usize,
    pub state: Option<CursorState>,
}

/// Drive one stream to completion, handing each message to `emit`.
pub fn read_stream<T, F>(
    stream: &ExchangeRateStream,
    transport: &T,
    mode: SyncMode,
    state: Option<CursorState>,
    mut emit: F,
) -> Result<SyncSummary>
where
    T: Transport + ?Sized,
    F: FnMut(Message) -> Result<()>,
{
    let track_state = mode == SyncMode::Incremental;
    let mut state = if track_state { state } else { None };
    let slices = stream.slices_for(mode, state.as_ref());
    let interval = stream.state_checkpoint_interval();

    log::info!(
        "Reading {} ({:?}): {} slice(s) for {} from {} through {}",
        stream.name(),
        mode,
        slices.len(),
        stream.base_currency(),
        state.map(|s| s.date).unwrap_or(stream.start_date()),
        slices.end()
    );

    let mut summary = SyncSummary {
        slices: 0,
        records: 0,
        checkpoints: 0,
        state: None,
    };
    let mut last_checkpoint: Option<CursorState> = None;

    for slice in slices {
        let path = stream.build_request_path(&slice);
        log::debug!("Slice {} -> {path}", slice.date);

        let body = transport.get(&path)?;
        let records = stream.parse_response(body)?;

        for record in records {
            if track_state {
                state = Some(stream.compute_updated_state(state.as_ref(), &record));
            }
            emit(Message::Record {
                stream: stream.name().to_string(),
                data: record,
            })?;
            summary.records += 1;
        }
        summary.slices += 1;

        if summary.slices % interval == 0 {
            if let Some(current) = state {
                emit(Message::State { data: current })?;
                summary.checkpoints += 1;
                last_checkpoint = Some(current);
                log::info!("Checkpoint after {} slice(s): {}", summary.slices, current.date);
            }
        }
    }

    if let Some(current) = state {
        if last_checkpoint != Some(current) {
            emit(Message::State { data: current })?;
            summary.checkpoints += 1;
        }
    }

    summary.state = state;
    log::info!(
        "Finished {}: {} slice(s), {} record(s), {} checkpoint(s)",
        stream.name(),
        summary.slices,
        summary.records,
        summary.checkpoints
    );
    Ok(summary)
}
