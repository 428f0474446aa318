//! Domain types shared across the engine
//!
//! Documents and their fragments on the ingestion side, sessions and turns
//! on the interview side. All persisted entities derive serde so the
//! repository boundary stays typed end to end.

pub mod documents;
pub mod sessions;

pub use documents::{Document, DocumentKind, Fragment};
pub use sessions::{CitationIndex, Session, SessionState, Turn, TurnRole};
