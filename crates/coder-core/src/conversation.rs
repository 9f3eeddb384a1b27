use std::ops::Deref;
use std::ops::DerefMut;

use super::error::RequestFailure;
use super::reducer::record;
use super::reducer::CoderEffect;
use super::response::extract_code;
use super::state::now_ms;
use super::state::ClientState;
use super::state::ConversationState;
use super::state::LogLevel;
use super::state::LogSource;
use super::state::Sender;

pub const QUERY_FAILED_TEXT: &str =
    "Sorry, something went wrong while generating a response. Please try again.";

/// Starts a turn: the user message is appended before the request is issued.
/// Blank queries and submissions while a turn is open are ignored.
pub fn submit_query(state: &mut ClientState) -> Vec<CoderEffect> {
    if state.conversation.query_buffer.trim().is_empty() {
        return Vec::new();
    }
    if state.conversation.in_flight {
        record(
            state,
            LogLevel::Debug,
            LogSource::Conversation,
            "query ignored: another query is in flight",
        );
        return Vec::new();
    }

    let query = state.conversation.query_buffer.clone();
    state
        .conversation
        .append(Sender::User, query.clone(), None, now_ms());
    state.conversation.in_flight = true;
    record(
        state,
        LogLevel::Info,
        LogSource::Conversation,
        format!("submitting query ({} characters)", query.chars().count()),
    );
    vec![CoderEffect::SubmitQuery { query }, CoderEffect::RequestFrame]
}

/// Closes the open turn when dropped, whichever way the turn settled.
struct OpenTurn<'a> {
    conversation: &'a mut ConversationState,
}

impl<'a> OpenTurn<'a> {
    fn new(conversation: &'a mut ConversationState) -> Self {
        Self { conversation }
    }
}

impl Deref for OpenTurn<'_> {
    type Target = ConversationState;

    fn deref(&self) -> &Self::Target {
        self.conversation
    }
}

impl DerefMut for OpenTurn<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.conversation
    }
}

impl Drop for OpenTurn<'_> {
    fn drop(&mut self) {
        self.conversation.in_flight = false;
        self.conversation.query_buffer.clear();
    }
}

pub fn settle_query(
    state: &mut ClientState,
    query: String,
    outcome: Result<String, RequestFailure>,
) -> Vec<CoderEffect> {
    if !state.conversation.in_flight {
        record(
            state,
            LogLevel::Warn,
            LogSource::Conversation,
            "dropping query settlement with no query in flight",
        );
        return Vec::new();
    }

    let failure = outcome.as_ref().err().cloned();
    let answer_id = {
        let mut turn = OpenTurn::new(&mut state.conversation);
        match outcome {
            Ok(raw) => {
                let code = extract_code(&raw);
                turn.append(Sender::Assistant, code, Some(query), now_ms())
            }
            Err(_) => turn.append(
                Sender::Assistant,
                QUERY_FAILED_TEXT.to_string(),
                None,
                now_ms(),
            ),
        }
    };
    state.interaction.selected_answer = Some(answer_id);

    match failure {
        None => record(
            state,
            LogLevel::Info,
            LogSource::Conversation,
            "answer received",
        ),
        Some(failure) => record(
            state,
            LogLevel::Warn,
            LogSource::Conversation,
            format!("query failed: {failure}"),
        ),
    }
    vec![CoderEffect::RequestFrame]
}
