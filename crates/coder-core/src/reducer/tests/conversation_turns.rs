use super::*;
use pretty_assertions::assert_eq;

#[test]
fn successful_turn_appends_user_then_extracted_answer() {
    let mut state = state();
    let query = "write a hello world in Rust";

    let effects = run_turn(
        &mut state,
        query,
        Ok("Sure!\n---\nfn main() { println!(\"hi\"); }".to_string()),
    );

    assert_eq!(
        requests(&effects),
        vec![CoderEffect::SubmitQuery {
            query: query.to_string()
        }]
    );
    assert_eq!(senders(&state), vec![Sender::User, Sender::Assistant]);
    let answer = last_message(&state);
    assert_eq!(answer.text, "fn main() { println!(\"hi\"); }");
    assert_eq!(answer.original_query.as_deref(), Some(query));
    assert!(answer.is_rateable());
    assert!(!state.conversation.in_flight);
    assert_eq!(state.conversation.query_buffer, "");
}

#[test]
fn user_message_is_visible_before_settlement() {
    let mut state = state();
    set_input(&mut state, InputField::Query, "explain lifetimes");

    user(&mut state, UserAction::SubmitQuery);

    assert!(state.conversation.in_flight);
    assert_eq!(senders(&state), vec![Sender::User]);
    let pending = last_message(&state);
    assert_eq!(pending.text, "explain lifetimes");
    assert_eq!(pending.original_query, None);
}

#[test]
fn failed_turn_appends_canned_answer_without_query() {
    let mut state = state();

    run_turn(&mut state, "anything", Err(transport_failure()));

    assert_eq!(senders(&state), vec![Sender::User, Sender::Assistant]);
    let answer = last_message(&state);
    assert_eq!(answer.text, QUERY_FAILED_TEXT);
    assert_eq!(answer.original_query, None);
    assert!(!answer.is_rateable());
    assert!(!state.conversation.in_flight);
    assert_eq!(state.conversation.query_buffer, "");
}

#[test]
fn submission_while_in_flight_is_a_no_op() {
    let mut state = state();
    set_input(&mut state, InputField::Query, "first");
    user(&mut state, UserAction::SubmitQuery);
    set_input(&mut state, InputField::Query, "second");

    let effects = user(&mut state, UserAction::SubmitQuery);

    assert!(effects.is_empty());
    assert_eq!(state.conversation.history().len(), 1);
    assert_eq!(state.conversation.query_buffer, "second");
}

#[test]
fn blank_query_is_a_no_op() {
    let mut state = state();
    set_input(&mut state, InputField::Query, "   ");

    let effects = user(&mut state, UserAction::SubmitQuery);

    assert!(effects.is_empty());
    assert!(state.conversation.history().is_empty());
    assert!(!state.conversation.in_flight);
}

#[test]
fn finalization_clears_text_typed_during_flight() {
    let mut state = state();
    set_input(&mut state, InputField::Query, "first");
    user(&mut state, UserAction::SubmitQuery);
    user(
        &mut state,
        UserAction::InputChar {
            field: InputField::Query,
            ch: 'x',
        },
    );

    runtime(
        &mut state,
        RuntimeAction::QuerySettled {
            query: "first".to_string(),
            outcome: Ok("---\nok".to_string()),
        },
    );

    assert_eq!(state.conversation.query_buffer, "");
}

#[test]
fn stray_settlement_is_ignored() {
    let mut state = state();

    let effects = runtime(
        &mut state,
        RuntimeAction::QuerySettled {
            query: "ghost".to_string(),
            outcome: Ok("---\nboo".to_string()),
        },
    );

    assert!(effects.is_empty());
    assert!(state.conversation.history().is_empty());
}

#[test]
fn answer_without_delimiter_keeps_offset_fragment() {
    let mut state = state();

    run_turn(&mut state, "q", Ok("no delimiter here".to_string()));

    assert_eq!(last_message(&state).text, "delimiter here");
}

#[test]
fn history_grows_by_two_per_turn_in_order() {
    let mut state = state();
    run_turn(&mut state, "one", Ok("a\n---\n1".to_string()));
    run_turn(&mut state, "two", Err(transport_failure()));
    run_turn(&mut state, "three", Ok("c\n---\n3".to_string()));

    assert_eq!(state.conversation.history().len(), 6);
    assert_eq!(
        senders(&state),
        vec![
            Sender::User,
            Sender::Assistant,
            Sender::User,
            Sender::Assistant,
            Sender::User,
            Sender::Assistant,
        ]
    );
    let texts: Vec<&str> = state
        .conversation
        .history()
        .iter()
        .map(|message| message.text.as_str())
        .collect();
    assert_eq!(texts, vec!["one", "1", "two", QUERY_FAILED_TEXT, "three", "3"]);
}

#[test]
fn message_ids_are_strictly_increasing() {
    let mut state = state();
    for idx in 0..5 {
        run_turn(&mut state, &format!("q{idx}"), Ok(format!("---\n{idx}")));
    }

    let ids: Vec<MessageId> = state
        .conversation
        .history()
        .iter()
        .map(|message| message.id)
        .collect();
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]), "{ids:?}");
}

#[test]
fn new_answer_becomes_the_selected_answer() {
    let mut state = state();
    run_turn(&mut state, "one", Ok("---\n1".to_string()));
    let first = last_message(&state).id;
    assert_eq!(state.interaction.selected_answer, Some(first));

    run_turn(&mut state, "two", Ok("---\n2".to_string()));
    let second = last_message(&state).id;
    assert_eq!(state.interaction.selected_answer, Some(second));
}
