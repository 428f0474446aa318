//! Intervue - retrieval-grounded mock interview engine
//!
//! Ingests a candidate's resume and a job description, splits and embeds
//! them into a fragment index, and drives a turn-by-turn interview session
//! whose evaluations are grounded in the most relevant fragments of both
//! documents.
//!
//! # Architecture
//!
//! - **ingest**: chunk extracted text, embed fragments concurrently, index
//! - **retrieval**: cosine-similarity top-k over candidate documents
//! - **grounding**: bounded context assembly with placeholder degradation
//! - **session**: the interview state machine and engine
//! - **generation**: boundary to the external text-generation service
//!
//! Transport, credential management, and binary file storage live outside
//! this crate; the engine consumes already-extracted text and an abstract
//! repository.

pub mod embedding;
pub mod errors;
pub mod generation;
pub mod grounding;
pub mod index;
pub mod ingest;
pub mod repository;
pub mod retrieval;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use errors::{EngineError, Result};
pub use session::{InterviewEngine, StartedInterview};
pub use types::{Document, DocumentKind, Fragment, Session, SessionState, Turn, TurnRole};
