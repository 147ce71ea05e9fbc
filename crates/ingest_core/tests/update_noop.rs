use ingest_core::{update, Msg, SessionRules, SessionState};

#[test]
fn update_is_noop() {
    let state = SessionState::new();
    let (next, effects) = update(state.clone(), Msg::NoOp, &SessionRules::default());

    assert_eq!(state, next);
    assert!(effects.is_empty());
}
