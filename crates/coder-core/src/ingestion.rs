use std::path::PathBuf;

use super::error::RequestFailure;
use super::reducer::record;
use super::reducer::CoderEffect;
use super::state::ClientState;
use super::state::IngestFlow;
use super::state::IngestStatus;
use super::state::LogLevel;
use super::state::LogSource;
use super::state::PendingFile;
use super::state::RejectReason;

/// Sends the text buffer as-is; only the emptiness check looks at it trimmed.
pub fn ingest_text(state: &mut ClientState) -> Vec<CoderEffect> {
    if state.ingestion.text_buffer.trim().is_empty() {
        state.ingestion.set_status(
            IngestFlow::Text,
            IngestStatus::Rejected(RejectReason::EmptyContent),
        );
        record(
            state,
            LogLevel::Debug,
            LogSource::Ingestion,
            "text ingestion rejected: empty content",
        );
        return vec![CoderEffect::RequestFrame];
    }

    state
        .ingestion
        .set_status(IngestFlow::Text, IngestStatus::InProgress { file_name: None });
    let content = state.ingestion.text_buffer.clone();
    record(
        state,
        LogLevel::Info,
        LogSource::Ingestion,
        format!("ingesting {} characters of text", content.chars().count()),
    );
    vec![
        CoderEffect::IngestText { content },
        CoderEffect::RequestFrame,
    ]
}

/// Replaces the pending file. An empty path clears it.
pub fn select_file(state: &mut ClientState, path: PathBuf) -> Vec<CoderEffect> {
    if path.as_os_str().is_empty() {
        state.ingestion.pending_file = None;
        state.ingestion.file_path_input.clear();
        return vec![CoderEffect::RequestFrame];
    }

    let file = PendingFile::from_path(path);
    state.ingestion.file_path_input = file.path.display().to_string();
    record(
        state,
        LogLevel::Debug,
        LogSource::Ingestion,
        format!("selected file {}", file.name),
    );
    state.ingestion.pending_file = Some(file);
    vec![CoderEffect::RequestFrame]
}

pub fn ingest_file(state: &mut ClientState) -> Vec<CoderEffect> {
    let Some(file) = state.ingestion.pending_file.clone() else {
        state.ingestion.set_status(
            IngestFlow::File,
            IngestStatus::Rejected(RejectReason::NoFileSelected),
        );
        record(
            state,
            LogLevel::Debug,
            LogSource::Ingestion,
            "file ingestion rejected: no file selected",
        );
        return vec![CoderEffect::RequestFrame];
    };

    state.ingestion.set_status(
        IngestFlow::File,
        IngestStatus::InProgress {
            file_name: Some(file.name.clone()),
        },
    );
    record(
        state,
        LogLevel::Info,
        LogSource::Ingestion,
        format!("uploading {}", file.path.display()),
    );
    vec![CoderEffect::IngestFile { file }, CoderEffect::RequestFrame]
}

/// Inputs are cleared only on success so a failed upload can be retried as-is.
pub fn settle(
    state: &mut ClientState,
    flow: IngestFlow,
    outcome: Result<(), RequestFailure>,
) -> Vec<CoderEffect> {
    match outcome {
        Ok(()) => {
            state.ingestion.set_status(flow, IngestStatus::Succeeded);
            match flow {
                IngestFlow::Text => state.ingestion.text_buffer.clear(),
                IngestFlow::File => {
                    state.ingestion.pending_file = None;
                    state.ingestion.file_path_input.clear();
                }
            }
            record(
                state,
                LogLevel::Info,
                LogSource::Ingestion,
                format!("{} ingestion succeeded", flow.label()),
            );
        }
        Err(failure) => {
            state.ingestion.set_status(flow, IngestStatus::Failed);
            record(
                state,
                LogLevel::Warn,
                LogSource::Ingestion,
                format!("{} ingestion failed: {failure}", flow.label()),
            );
        }
    }
    vec![CoderEffect::RequestFrame]
}
