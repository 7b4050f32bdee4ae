//! Custom assertion helpers for session states.

use cf_protocol::session_models::PipelineSession;

/// Assert the invariants every reachable session must hold.
///
/// Checks that:
/// 1. At most one step is Running
/// 2. The session is not both complete and failed
pub fn assert_session_invariants(session: &PipelineSession) {
    assert!(
        session.running_count() <= 1,
        "More than one running step: {:?}",
        session.steps
    );
    assert!(
        !(session.is_complete && session.error.is_some()),
        "Session is both complete and failed"
    );
}

/// Assert that `current_step_index` never decreased across `states`.
pub fn assert_monotonic_index(states: &[PipelineSession]) {
    for pair in states.windows(2) {
        let (before, after) = (pair[0].current_step_index, pair[1].current_step_index);
        assert!(
            after >= before,
            "currentStepIndex went from {before:?} to {after:?}"
        );
    }
}
