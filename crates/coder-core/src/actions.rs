use std::path::PathBuf;

use super::error::RequestFailure;
use super::state::IngestFlow;
use super::state::InputField;
use super::state::LogLevel;
use super::state::LogSource;
use super::state::MessageId;

#[derive(Debug, Clone)]
pub enum ClientAction {
    User(UserAction),
    Runtime(RuntimeAction),
}

#[derive(Debug, Clone, PartialEq)]
pub enum UserAction {
    FocusNext,
    FocusPrev,
    InputChar {
        field: InputField,
        ch: char,
    },
    InputBackspace {
        field: InputField,
    },
    InputPaste {
        field: InputField,
        text: String,
    },
    SetInput {
        field: InputField,
        text: String,
    },
    SubmitIngestText,
    SelectFile(PathBuf),
    SelectFileFromInput,
    SubmitIngestFile,
    SubmitQuery,
    SelectPrevAnswer,
    SelectNextAnswer,
    RateMessage {
        id: MessageId,
        upvoted: bool,
    },
    RateSelected {
        upvoted: bool,
    },
    SubmitFeedback {
        original_query: Option<String>,
        code: String,
        upvoted: bool,
    },
    CopySelected,
    DismissNotice,
    ToggleActivity,
    ClearActivity,
}

#[derive(Debug, Clone)]
pub enum RuntimeAction {
    IngestSettled {
        flow: IngestFlow,
        outcome: Result<(), RequestFailure>,
    },
    QuerySettled {
        query: String,
        outcome: Result<String, RequestFailure>,
    },
    FeedbackSettled {
        upvoted: bool,
        outcome: Result<(), RequestFailure>,
    },
    AppendLog {
        level: LogLevel,
        source: LogSource,
        message: String,
    },
}

impl RuntimeAction {
    /// True for the actions that close a request issued through a `CoderEffect`.
    pub fn is_settlement(&self) -> bool {
        matches!(
            self,
            Self::IngestSettled { .. } | Self::QuerySettled { .. } | Self::FeedbackSettled { .. }
        )
    }
}
