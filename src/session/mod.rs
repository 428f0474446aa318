//! Interview session lifecycle
//!
//! [`state`] holds the pure transition function; [`engine`] drives full
//! turns (question issuance, answer intake, grounded evaluation) against
//! the repository with single-writer-per-session discipline.

pub mod engine;
pub mod state;

pub use engine::{InterviewEngine, StartedInterview};
pub use state::SessionAction;
