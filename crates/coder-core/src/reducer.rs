use std::path::PathBuf;

use super::actions::ClientAction;
use super::actions::RuntimeAction;
use super::actions::UserAction;
use super::conversation;
use super::feedback;
use super::ingestion;
use super::state::now_ms;
use super::state::ClientState;
use super::state::LogEntry;
use super::state::LogLevel;
use super::state::LogSource;
use super::state::MessageId;
use super::state::PendingFile;

/// Work the reducer asks its host to perform. Request effects settle back as a
/// `RuntimeAction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoderEffect {
    RequestFrame,
    IngestText {
        content: String,
    },
    IngestFile {
        file: PendingFile,
    },
    SubmitQuery {
        query: String,
    },
    SubmitFeedback {
        query: String,
        code: String,
        upvoted: bool,
    },
    CopyToClipboard(String),
}

impl CoderEffect {
    pub fn is_request(&self) -> bool {
        matches!(
            self,
            Self::IngestText { .. }
                | Self::IngestFile { .. }
                | Self::SubmitQuery { .. }
                | Self::SubmitFeedback { .. }
        )
    }
}

pub fn reduce(state: &mut ClientState, action: ClientAction) -> Vec<CoderEffect> {
    match action {
        ClientAction::User(user) => reduce_user(state, user),
        ClientAction::Runtime(runtime) => reduce_runtime(state, runtime),
    }
}

fn reduce_user(state: &mut ClientState, action: UserAction) -> Vec<CoderEffect> {
    match action {
        UserAction::FocusNext => {
            state.interaction.focus = state.interaction.focus.next();
            vec![CoderEffect::RequestFrame]
        }
        UserAction::FocusPrev => {
            state.interaction.focus = state.interaction.focus.prev();
            vec![CoderEffect::RequestFrame]
        }
        UserAction::InputChar { field, ch } => {
            state.input_mut(field).push(ch);
            vec![CoderEffect::RequestFrame]
        }
        UserAction::InputBackspace { field } => {
            state.input_mut(field).pop();
            vec![CoderEffect::RequestFrame]
        }
        UserAction::InputPaste { field, text } => {
            state.input_mut(field).push_str(&text);
            vec![CoderEffect::RequestFrame]
        }
        UserAction::SetInput { field, text } => {
            *state.input_mut(field) = text;
            vec![CoderEffect::RequestFrame]
        }
        UserAction::SubmitIngestText => ingestion::ingest_text(state),
        UserAction::SelectFile(path) => ingestion::select_file(state, path),
        UserAction::SelectFileFromInput => {
            let path = PathBuf::from(state.ingestion.file_path_input.trim());
            ingestion::select_file(state, path)
        }
        UserAction::SubmitIngestFile => ingestion::ingest_file(state),
        UserAction::SubmitQuery => conversation::submit_query(state),
        UserAction::SelectPrevAnswer => {
            step_selected_answer(state, false);
            vec![CoderEffect::RequestFrame]
        }
        UserAction::SelectNextAnswer => {
            step_selected_answer(state, true);
            vec![CoderEffect::RequestFrame]
        }
        UserAction::RateMessage { id, upvoted } => feedback::rate_message(state, id, upvoted),
        UserAction::RateSelected { upvoted } => match state.interaction.selected_answer {
            Some(id) => feedback::rate_message(state, id, upvoted),
            None => Vec::new(),
        },
        UserAction::SubmitFeedback {
            original_query,
            code,
            upvoted,
        } => feedback::submit_feedback(state, original_query.as_deref(), &code, upvoted),
        UserAction::CopySelected => copy_selected(state),
        UserAction::DismissNotice => {
            state.interaction.notice = None;
            vec![CoderEffect::RequestFrame]
        }
        UserAction::ToggleActivity => {
            state.interaction.show_activity = !state.interaction.show_activity;
            vec![CoderEffect::RequestFrame]
        }
        UserAction::ClearActivity => {
            state.logs.clear();
            vec![CoderEffect::RequestFrame]
        }
    }
}

fn reduce_runtime(state: &mut ClientState, action: RuntimeAction) -> Vec<CoderEffect> {
    match action {
        RuntimeAction::IngestSettled { flow, outcome } => {
            ingestion::settle(state, flow, outcome)
        }
        RuntimeAction::QuerySettled { query, outcome } => {
            conversation::settle_query(state, query, outcome)
        }
        RuntimeAction::FeedbackSettled { upvoted, outcome } => {
            feedback::settle(state, upvoted, outcome)
        }
        RuntimeAction::AppendLog {
            level,
            source,
            message,
        } => {
            record(state, level, source, message);
            vec![CoderEffect::RequestFrame]
        }
    }
}

/// Appends to the session activity log and mirrors the line to `tracing`.
pub(crate) fn record(
    state: &mut ClientState,
    level: LogLevel,
    source: LogSource,
    message: impl Into<String>,
) {
    let message = message.into();
    match level {
        LogLevel::Debug => tracing::debug!(source = source.label(), "{message}"),
        LogLevel::Info => tracing::info!(source = source.label(), "{message}"),
        LogLevel::Warn => tracing::warn!(source = source.label(), "{message}"),
        LogLevel::Error => tracing::error!(source = source.label(), "{message}"),
    }
    state.logs.append(LogEntry {
        seq: 0,
        level,
        ts_ms: Some(now_ms()),
        source,
        message,
    });
}

fn step_selected_answer(state: &mut ClientState, forward: bool) {
    let answers = state.answer_ids();
    let Some(last) = answers.len().checked_sub(1) else {
        state.interaction.selected_answer = None;
        return;
    };
    let current = state
        .interaction
        .selected_answer
        .and_then(|id| answers.iter().position(|candidate| *candidate == id));
    let next = match (current, forward) {
        (None, _) => last,
        (Some(idx), true) => (idx + 1).min(last),
        (Some(idx), false) => idx.saturating_sub(1),
    };
    state.interaction.selected_answer = Some(answers[next]);
}

fn selected_or_latest_answer(state: &ClientState) -> Option<MessageId> {
    state
        .interaction
        .selected_answer
        .or_else(|| state.conversation.latest_answer().map(|message| message.id))
}

fn copy_selected(state: &mut ClientState) -> Vec<CoderEffect> {
    let text = selected_or_latest_answer(state)
        .and_then(|id| state.conversation.message(id))
        .map(|message| message.text.clone());
    match text {
        Some(text) => {
            record(
                state,
                LogLevel::Info,
                LogSource::Client,
                "copied answer to clipboard",
            );
            vec![CoderEffect::CopyToClipboard(text), CoderEffect::RequestFrame]
        }
        None => {
            record(
                state,
                LogLevel::Debug,
                LogSource::Client,
                "no answer available to copy",
            );
            vec![CoderEffect::RequestFrame]
        }
    }
}

#[cfg(test)]
mod tests;
