pub(super) use super::reduce;
pub(super) use crate::actions::ClientAction;
pub(super) use crate::actions::RuntimeAction;
pub(super) use crate::actions::UserAction;
pub(super) use crate::config::Config;
pub(super) use crate::conversation::QUERY_FAILED_TEXT;
pub(super) use crate::error::RequestFailure;
pub(super) use crate::feedback::FEEDBACK_FAILED_TEXT;
pub(super) use crate::feedback::FEEDBACK_THANKS_TEXT;
pub(super) use crate::reducer::CoderEffect;
pub(super) use crate::state::ClientState;
pub(super) use crate::state::FocusPane;
pub(super) use crate::state::IngestFlow;
pub(super) use crate::state::IngestStatus;
pub(super) use crate::state::InputField;
pub(super) use crate::state::LogBuffer;
pub(super) use crate::state::LogLevel;
pub(super) use crate::state::LogSource;
pub(super) use crate::state::Message;
pub(super) use crate::state::MessageId;
pub(super) use crate::state::NoticeKind;
pub(super) use crate::state::PendingFile;
pub(super) use crate::state::Sender;

mod conversation_turns;
mod ingestion_flow;

fn state() -> ClientState {
    ClientState::new(Config::default())
}

fn user(state: &mut ClientState, action: UserAction) -> Vec<CoderEffect> {
    reduce(state, ClientAction::User(action))
}

fn runtime(state: &mut ClientState, action: RuntimeAction) -> Vec<CoderEffect> {
    reduce(state, ClientAction::Runtime(action))
}

fn set_input(state: &mut ClientState, field: InputField, text: &str) {
    user(
        state,
        UserAction::SetInput {
            field,
            text: text.to_string(),
        },
    );
}

fn requests(effects: &[CoderEffect]) -> Vec<CoderEffect> {
    effects
        .iter()
        .filter(|effect| effect.is_request())
        .cloned()
        .collect()
}

fn transport_failure() -> RequestFailure {
    RequestFailure::Transport("connection refused".to_string())
}

/// Submits `query` and settles it with `outcome`, returning the effects of the submission.
fn run_turn(
    state: &mut ClientState,
    query: &str,
    outcome: Result<String, RequestFailure>,
) -> Vec<CoderEffect> {
    set_input(state, InputField::Query, query);
    let effects = user(state, UserAction::SubmitQuery);
    runtime(
        state,
        RuntimeAction::QuerySettled {
            query: query.to_string(),
            outcome,
        },
    );
    effects
}

fn senders(state: &ClientState) -> Vec<Sender> {
    state
        .conversation
        .history()
        .iter()
        .map(|message| message.sender)
        .collect()
}

fn last_message(state: &ClientState) -> &Message {
    state
        .conversation
        .history()
        .last()
        .expect("history should not be empty")
}
