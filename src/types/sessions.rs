//! Session and turn entities
//!
//! A session is an append-only sequence of turns plus a lifecycle state.
//! Turns are immutable once appended; append order is the only ordering
//! guarantee the engine relies on. Timestamps are metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    Interviewer,
    Candidate,
}

/// Validated citation marker: 0 = resume, 1 = job description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CitationIndex(u8);

impl CitationIndex {
    /// Rejects anything outside {0, 1}
    pub fn new(index: u8) -> Option<Self> {
        (index <= 1).then_some(Self(index))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

/// One message in a session's history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
    /// 1..=10, present only on interviewer evaluation turns
    pub score: Option<u8>,
    pub feedback: Option<String>,
    pub citations: Vec<CitationIndex>,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    /// Plain turn with no evaluation payload
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            score: None,
            feedback: None,
            citations: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Interviewer turn carrying an evaluation of the preceding answer
    pub fn evaluation(
        next_question: impl Into<String>,
        score: u8,
        feedback: impl Into<String>,
        citations: Vec<CitationIndex>,
    ) -> Self {
        Self {
            role: TurnRole::Interviewer,
            content: next_question.into(),
            score: Some(score),
            feedback: Some(feedback.into()),
            citations,
            created_at: Utc::now(),
        }
    }
}

/// Session lifecycle state
///
/// `Created -> AwaitingAnswer -> Evaluating -> AwaitingAnswer -> ... -> Closed`.
/// Transition rules live in [`crate::session::state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No turns yet; waiting for the interviewer's opening questions
    Created,
    /// A question is pending; exactly one candidate answer is accepted
    AwaitingAnswer,
    /// An answer has been captured and is being evaluated
    Evaluating,
    /// Terminal; no further turns accepted
    Closed,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionState::Created => "Created",
            SessionState::AwaitingAnswer => "AwaitingAnswer",
            SessionState::Evaluating => "Evaluating",
            SessionState::Closed => "Closed",
        };
        write!(f, "{name}")
    }
}

/// One interview session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub state: SessionState,
    pub turns: Vec<Turn>,
    /// Monotonic write counter; backs the repository compare-and-swap
    pub version: u64,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(owner_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            state: SessionState::Created,
            turns: Vec::new(),
            version: 0,
            created_at: Utc::now(),
        }
    }

    /// The question under evaluation: last interviewer turn in the history
    pub fn last_interviewer_turn(&self) -> Option<&Turn> {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role == TurnRole::Interviewer)
    }

    /// Last turn regardless of role
    pub fn last_turn(&self) -> Option<&Turn> {
        self.turns.last()
    }
}
