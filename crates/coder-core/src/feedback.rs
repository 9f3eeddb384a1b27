use super::error::RequestFailure;
use super::reducer::record;
use super::reducer::CoderEffect;
use super::state::ClientState;
use super::state::LogLevel;
use super::state::LogSource;
use super::state::MessageId;
use super::state::Notice;
use super::state::NoticeKind;

pub const FEEDBACK_THANKS_TEXT: &str = "Thanks for the feedback!";
pub const FEEDBACK_FAILED_TEXT: &str = "Failed to submit feedback.";

/// No request without the query the answer belongs to. Repeat ratings are allowed.
pub fn submit_feedback(
    state: &mut ClientState,
    original_query: Option<&str>,
    code: &str,
    upvoted: bool,
) -> Vec<CoderEffect> {
    let Some(query) = original_query.filter(|query| !query.is_empty()) else {
        record(
            state,
            LogLevel::Debug,
            LogSource::Feedback,
            "feedback skipped: answer has no originating query",
        );
        return Vec::new();
    };

    record(
        state,
        LogLevel::Info,
        LogSource::Feedback,
        format!("sending {} feedback", vote_label(upvoted)),
    );
    vec![CoderEffect::SubmitFeedback {
        query: query.to_string(),
        code: code.to_string(),
        upvoted,
    }]
}

pub fn rate_message(state: &mut ClientState, id: MessageId, upvoted: bool) -> Vec<CoderEffect> {
    let Some(message) = state.conversation.message(id).cloned() else {
        return Vec::new();
    };
    submit_feedback(
        state,
        message.original_query.as_deref(),
        &message.text,
        upvoted,
    )
}

pub fn settle(
    state: &mut ClientState,
    upvoted: bool,
    outcome: Result<(), RequestFailure>,
) -> Vec<CoderEffect> {
    let notice = match outcome {
        Ok(()) => {
            record(
                state,
                LogLevel::Info,
                LogSource::Feedback,
                format!("{} feedback recorded", vote_label(upvoted)),
            );
            Notice {
                kind: NoticeKind::Info,
                message: FEEDBACK_THANKS_TEXT.to_string(),
            }
        }
        Err(failure) => {
            record(
                state,
                LogLevel::Warn,
                LogSource::Feedback,
                format!("feedback failed: {failure}"),
            );
            Notice {
                kind: NoticeKind::Error,
                message: FEEDBACK_FAILED_TEXT.to_string(),
            }
        }
    };
    state.interaction.notice = Some(notice);
    vec![CoderEffect::RequestFrame]
}

fn vote_label(upvoted: bool) -> &'static str {
    if upvoted {
        "up"
    } else {
        "down"
    }
}
