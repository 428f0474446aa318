//! Session state transitions
//!
//! Deterministic transition function over [`SessionState`]:
//!
//! ```text
//! Created --IssueQuestions--> AwaitingAnswer
//! AwaitingAnswer --SubmitAnswer--> Evaluating
//! Evaluating --CompleteEvaluation--> AwaitingAnswer
//! Evaluating --FailEvaluation--> AwaitingAnswer   (re-enterable for retry)
//! any non-terminal --Close--> Closed
//! ```
//!
//! Everything else is an invalid transition and leaves the session
//! unchanged.

use uuid::Uuid;

use crate::errors::{EngineError, Result};
use crate::types::SessionState;

/// Actions that drive session transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    /// Interviewer issues the opening questions
    IssueQuestions,
    /// Candidate submits an answer to the pending question
    SubmitAnswer,
    /// Evaluation succeeded; follow-up question appended
    CompleteEvaluation,
    /// Evaluation failed; session returns to awaiting the same answer
    FailEvaluation,
    /// Explicit external close
    Close,
}

impl std::fmt::Display for SessionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionAction::IssueQuestions => "issue_questions",
            SessionAction::SubmitAnswer => "submit_answer",
            SessionAction::CompleteEvaluation => "complete_evaluation",
            SessionAction::FailEvaluation => "fail_evaluation",
            SessionAction::Close => "close",
        };
        write!(f, "{name}")
    }
}

/// Compute the next state, or reject the action for the current state.
pub fn transition(
    session_id: Uuid,
    state: SessionState,
    action: SessionAction,
) -> Result<SessionState> {
    use SessionAction::*;
    use SessionState::*;

    let next = match (state, action) {
        (Created, IssueQuestions) => AwaitingAnswer,
        (AwaitingAnswer, SubmitAnswer) => Evaluating,
        (Evaluating, CompleteEvaluation) => AwaitingAnswer,
        (Evaluating, FailEvaluation) => AwaitingAnswer,
        (Created | AwaitingAnswer | Evaluating, Close) => Closed,
        (state, action) => {
            return Err(EngineError::InvalidTransition {
                session_id: session_id.to_string(),
                state: state.to_string(),
                action: action.to_string(),
                reason: format!("action {action} is not valid in state {state}"),
            });
        }
    };
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> Uuid {
        Uuid::new_v4()
    }

    #[test]
    fn test_happy_path_loop() {
        let s = transition(id(), SessionState::Created, SessionAction::IssueQuestions).unwrap();
        assert_eq!(s, SessionState::AwaitingAnswer);
        let s = transition(id(), s, SessionAction::SubmitAnswer).unwrap();
        assert_eq!(s, SessionState::Evaluating);
        let s = transition(id(), s, SessionAction::CompleteEvaluation).unwrap();
        assert_eq!(s, SessionState::AwaitingAnswer);
    }

    #[test]
    fn test_failed_evaluation_returns_to_awaiting() {
        let s = transition(id(), SessionState::Evaluating, SessionAction::FailEvaluation).unwrap();
        assert_eq!(s, SessionState::AwaitingAnswer);
    }

    #[test]
    fn test_answer_in_created_is_rejected() {
        let err = transition(id(), SessionState::Created, SessionAction::SubmitAnswer).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition { .. }));
    }

    #[test]
    fn test_double_answer_is_rejected() {
        let err =
            transition(id(), SessionState::Evaluating, SessionAction::SubmitAnswer).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition { .. }));
    }

    #[test]
    fn test_closed_is_terminal() {
        for action in [
            SessionAction::IssueQuestions,
            SessionAction::SubmitAnswer,
            SessionAction::CompleteEvaluation,
            SessionAction::FailEvaluation,
            SessionAction::Close,
        ] {
            assert!(transition(id(), SessionState::Closed, action).is_err());
        }
    }

    #[test]
    fn test_close_from_any_live_state() {
        for state in [
            SessionState::Created,
            SessionState::AwaitingAnswer,
            SessionState::Evaluating,
        ] {
            assert_eq!(
                transition(id(), state, SessionAction::Close).unwrap(),
                SessionState::Closed
            );
        }
    }
}
