use super::*;
use pretty_assertions::assert_eq;

#[test]
fn text_ingestion_status_progression_and_buffer_reset() {
    let mut state = state();
    assert_eq!(state.ingestion.status_message(IngestFlow::Text), "");

    set_input(&mut state, InputField::IngestText, "Rust ownership rules");
    let effects = user(&mut state, UserAction::SubmitIngestText);
    assert_eq!(
        state.ingestion.status_message(IngestFlow::Text),
        "Ingesting text..."
    );
    assert_eq!(
        requests(&effects),
        vec![CoderEffect::IngestText {
            content: "Rust ownership rules".to_string()
        }]
    );

    runtime(
        &mut state,
        RuntimeAction::IngestSettled {
            flow: IngestFlow::Text,
            outcome: Ok(()),
        },
    );
    assert_eq!(
        state.ingestion.status_message(IngestFlow::Text),
        "Successfully ingested text!"
    );
    assert_eq!(state.ingestion.text_buffer, "");
}

#[test]
fn blank_text_is_rejected_without_a_request() {
    let mut state = state();
    set_input(&mut state, InputField::IngestText, "  \n\t ");

    let effects = user(&mut state, UserAction::SubmitIngestText);

    assert!(requests(&effects).is_empty());
    assert_eq!(
        state.ingestion.status_message(IngestFlow::Text),
        "Content cannot be empty."
    );
    assert_eq!(state.ingestion.text_buffer, "  \n\t ");
}

#[test]
fn text_is_sent_untrimmed() {
    let mut state = state();
    set_input(&mut state, InputField::IngestText, "  fn a() {}\n");

    let effects = user(&mut state, UserAction::SubmitIngestText);

    assert_eq!(
        requests(&effects),
        vec![CoderEffect::IngestText {
            content: "  fn a() {}\n".to_string()
        }]
    );
}

#[test]
fn failed_text_ingestion_keeps_buffer() {
    let mut state = state();
    set_input(&mut state, InputField::IngestText, "keep me");
    user(&mut state, UserAction::SubmitIngestText);

    runtime(
        &mut state,
        RuntimeAction::IngestSettled {
            flow: IngestFlow::Text,
            outcome: Err(RequestFailure::Status { status: 500 }),
        },
    );

    assert_eq!(
        state.ingestion.status_message(IngestFlow::Text),
        "Failed to ingest text."
    );
    assert_eq!(state.ingestion.text_buffer, "keep me");
}

#[test]
fn file_ingestion_without_selection_is_rejected() {
    let mut state = state();

    let effects = user(&mut state, UserAction::SubmitIngestFile);

    assert!(requests(&effects).is_empty());
    assert_eq!(
        state.ingestion.status_message(IngestFlow::File),
        "Please select a file first."
    );
}

#[test]
fn file_ingestion_success_clears_selection_and_picker() {
    let mut state = state();
    set_input(&mut state, InputField::FilePath, " docs/borrowing.md ");
    user(&mut state, UserAction::SelectFileFromInput);
    assert_eq!(
        state.ingestion.pending_file,
        Some(PendingFile::from_path("docs/borrowing.md"))
    );

    let effects = user(&mut state, UserAction::SubmitIngestFile);
    assert_eq!(
        state.ingestion.status_message(IngestFlow::File),
        "Ingesting file: borrowing.md..."
    );
    assert_eq!(
        requests(&effects),
        vec![CoderEffect::IngestFile {
            file: PendingFile::from_path("docs/borrowing.md")
        }]
    );

    runtime(
        &mut state,
        RuntimeAction::IngestSettled {
            flow: IngestFlow::File,
            outcome: Ok(()),
        },
    );
    assert_eq!(
        state.ingestion.status_message(IngestFlow::File),
        "Successfully ingested file!"
    );
    assert_eq!(state.ingestion.pending_file, None);
    assert_eq!(state.ingestion.file_path_input, "");
}

#[test]
fn file_ingestion_failure_keeps_selection_for_retry() {
    let mut state = state();
    user(&mut state, UserAction::SelectFile("/tmp/notes.txt".into()));
    user(&mut state, UserAction::SubmitIngestFile);

    runtime(
        &mut state,
        RuntimeAction::IngestSettled {
            flow: IngestFlow::File,
            outcome: Err(transport_failure()),
        },
    );

    assert_eq!(
        state.ingestion.status_message(IngestFlow::File),
        "Failed to ingest file."
    );
    assert_eq!(
        state.ingestion.pending_file,
        Some(PendingFile::from_path("/tmp/notes.txt"))
    );

    let retry = user(&mut state, UserAction::SubmitIngestFile);
    assert_eq!(requests(&retry).len(), 1);
}

#[test]
fn picking_another_file_replaces_selection() {
    let mut state = state();
    user(&mut state, UserAction::SelectFile("a.md".into()));
    user(&mut state, UserAction::SelectFile("b.md".into()));

    assert_eq!(
        state.ingestion.pending_file.as_ref().map(|f| f.name.as_str()),
        Some("b.md")
    );
    assert_eq!(state.ingestion.file_path_input, "b.md");
}

#[test]
fn selecting_an_empty_path_clears_selection() {
    let mut state = state();
    user(&mut state, UserAction::SelectFile("a.md".into()));
    set_input(&mut state, InputField::FilePath, "   ");

    user(&mut state, UserAction::SelectFileFromInput);

    assert_eq!(state.ingestion.pending_file, None);
}

#[test]
fn flows_never_update_each_other() {
    let mut state = state();
    set_input(&mut state, InputField::IngestText, "text");
    user(&mut state, UserAction::SelectFile("doc.txt".into()));
    user(&mut state, UserAction::SubmitIngestText);
    user(&mut state, UserAction::SubmitIngestFile);

    assert!(state.ingestion.status(IngestFlow::Text).is_in_progress());
    assert!(state.ingestion.status(IngestFlow::File).is_in_progress());

    runtime(
        &mut state,
        RuntimeAction::IngestSettled {
            flow: IngestFlow::File,
            outcome: Err(transport_failure()),
        },
    );
    assert_eq!(
        state.ingestion.status(IngestFlow::Text),
        &IngestStatus::InProgress { file_name: None }
    );
    assert_eq!(state.ingestion.text_buffer, "text");

    runtime(
        &mut state,
        RuntimeAction::IngestSettled {
            flow: IngestFlow::Text,
            outcome: Ok(()),
        },
    );
    assert_eq!(state.ingestion.status(IngestFlow::File), &IngestStatus::Failed);
    assert!(state.ingestion.pending_file.is_some());
}

#[test]
fn status_is_not_reset_until_the_next_action() {
    let mut state = state();
    set_input(&mut state, InputField::IngestText, "x");
    user(&mut state, UserAction::SubmitIngestText);
    runtime(
        &mut state,
        RuntimeAction::IngestSettled {
            flow: IngestFlow::Text,
            outcome: Ok(()),
        },
    );

    user(&mut state, UserAction::FocusNext);
    set_input(&mut state, InputField::IngestText, "y");
    assert_eq!(
        state.ingestion.status_message(IngestFlow::Text),
        "Successfully ingested text!"
    );

    user(&mut state, UserAction::SubmitIngestText);
    assert_eq!(
        state.ingestion.status_message(IngestFlow::Text),
        "Ingesting text..."
    );
}

#[test]
fn ingestion_never_touches_conversation() {
    let mut state = state();
    set_input(&mut state, InputField::Query, "draft query");
    set_input(&mut state, InputField::IngestText, "doc");
    user(&mut state, UserAction::SubmitIngestText);
    runtime(
        &mut state,
        RuntimeAction::IngestSettled {
            flow: IngestFlow::Text,
            outcome: Ok(()),
        },
    );

    assert!(state.conversation.history().is_empty());
    assert!(!state.conversation.in_flight);
    assert_eq!(state.conversation.query_buffer, "draft query");
}
