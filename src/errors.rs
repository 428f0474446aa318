//! Error types for the interview engine
//!
//! Every fallible operation in the crate returns [`EngineError`] with enough
//! context (session id, document id, stage) for the caller to decide between
//! retry and abort. None of these variants should take the process down;
//! invariant breakage inside the engine is a bug, not an error value.

use thiserror::Error;

/// Main error type for the interview engine
#[derive(Error, Debug)]
pub enum EngineError {
    /// Embedding or chunking failed for a fragment during ingestion.
    /// Non-fatal: the fragment is dropped and ingestion continues.
    #[error("Ingestion failed for document {document_id}: {reason}")]
    Ingestion { document_id: String, reason: String },

    /// Concurrent writers raced on the same session. Retryable.
    #[error("Session {session_id} is being modified by another request")]
    SessionConflict { session_id: String },

    /// Caller attempted an action not valid in the session's current state.
    #[error("Invalid action '{action}' for session {session_id} in state {state}: {reason}")]
    InvalidTransition {
        session_id: String,
        state: String,
        action: String,
        reason: String,
    },

    /// External generation call failed, timed out, or returned content
    /// failing schema validation. The session stays re-enterable for retry.
    #[error("Generation failed at {stage} for session {session_id}: {reason}")]
    Generation {
        session_id: String,
        stage: &'static str,
        reason: String,
    },

    /// Embedding backend could not produce a vector for the input
    #[error("Embedding failed: {reason}")]
    EmbeddingFailed { reason: String },

    /// Stored embedding vector failed validation on read
    #[error("Embedding vector decode failed: expected dimension {expected}, got {actual}")]
    VectorDecode { expected: usize, actual: usize },

    /// Entity lookup failed
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Backing store failure
    #[error("Repository error: {reason}")]
    Repository { reason: String },

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EngineError {
    /// True for errors the caller may safely retry without intervention
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngineError::SessionConflict { .. } | EngineError::Generation { .. }
        )
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_context() {
        let err = EngineError::Generation {
            session_id: "s-42".to_string(),
            stage: "transport",
            reason: "timed out".to_string(),
        };
        assert!(err.to_string().contains("s-42"));
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_conflict_is_retryable() {
        let err = EngineError::SessionConflict {
            session_id: "s-1".to_string(),
        };
        assert!(err.is_retryable());

        let err = EngineError::InvalidTransition {
            session_id: "s-1".to_string(),
            state: "Created".to_string(),
            action: "submit_answer".to_string(),
            reason: "no question pending".to_string(),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_vector_decode_display() {
        let err = EngineError::VectorDecode {
            expected: 8,
            actual: 3,
        };
        assert!(err.to_string().contains('8'));
        assert!(err.to_string().contains('3'));
    }
}
