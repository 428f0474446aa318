//! Request and response types for the generation boundary

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{EngineError, Result};
use crate::types::CitationIndex;

/// Prompt material for one generation call. The session id is request
/// metadata only, carried so failures can name the session they belong to.
#[derive(Debug, Clone)]
pub struct PromptMaterial {
    pub session_id: Uuid,
    pub system: String,
    pub user: String,
}

/// Structured evaluation of one candidate answer, validated on receipt
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    /// 1..=10
    pub score: u8,
    pub feedback: String,
    pub next_question: String,
    pub citation_indices: Vec<CitationIndex>,
}

/// Raw wire shape before validation
#[derive(Debug, Deserialize)]
pub(crate) struct EvaluationPayload {
    pub score: i64,
    pub feedback: String,
    #[serde(rename = "nextQuestion")]
    pub next_question: String,
    #[serde(rename = "citationIndices")]
    pub citation_indices: Vec<i64>,
}

impl Evaluation {
    /// Validate a raw payload. Out-of-range scores or citation indices are
    /// a schema failure, never silently coerced.
    pub(crate) fn from_payload(payload: EvaluationPayload, session_id: Uuid) -> Result<Self> {
        let schema_err = |reason: String| EngineError::Generation {
            session_id: session_id.to_string(),
            stage: "schema",
            reason,
        };

        if !(1..=10).contains(&payload.score) {
            return Err(schema_err(format!(
                "score {} outside 1..=10",
                payload.score
            )));
        }
        if payload.next_question.trim().is_empty() {
            return Err(schema_err("empty nextQuestion".to_string()));
        }

        let mut citation_indices = Vec::with_capacity(payload.citation_indices.len());
        for raw in payload.citation_indices {
            let index = u8::try_from(raw)
                .ok()
                .and_then(CitationIndex::new)
                .ok_or_else(|| schema_err(format!("citation index {raw} outside {{0, 1}}")))?;
            citation_indices.push(index);
        }

        Ok(Self {
            score: payload.score as u8,
            feedback: payload.feedback,
            next_question: payload.next_question,
            citation_indices,
        })
    }

    /// Parse and validate a JSON evaluation string from the service
    pub fn parse(json: &str, session_id: Uuid) -> Result<Self> {
        let payload: EvaluationPayload =
            serde_json::from_str(json).map_err(|e| EngineError::Generation {
                session_id: session_id.to_string(),
                stage: "schema",
                reason: format!("evaluation JSON did not match schema: {e}"),
            })?;
        Self::from_payload(payload, session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Uuid {
        Uuid::new_v4()
    }

    #[test]
    fn test_parse_valid_evaluation() {
        let json = r#"{
            "score": 7,
            "feedback": "Good depth on the backend work.",
            "nextQuestion": "How would you scale that service?",
            "citationIndices": [0]
        }"#;
        let eval = Evaluation::parse(json, session()).unwrap();
        assert_eq!(eval.score, 7);
        assert_eq!(eval.citation_indices.len(), 1);
        assert_eq!(eval.citation_indices[0].value(), 0);
    }

    #[test]
    fn test_score_out_of_range_is_schema_error() {
        let json = r#"{"score": 11, "feedback": "f", "nextQuestion": "q", "citationIndices": []}"#;
        let err = Evaluation::parse(json, session()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Generation { stage: "schema", .. }
        ));
    }

    #[test]
    fn test_citation_out_of_range_is_schema_error() {
        let json = r#"{"score": 5, "feedback": "f", "nextQuestion": "q", "citationIndices": [2]}"#;
        let err = Evaluation::parse(json, session()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Generation { stage: "schema", .. }
        ));
    }

    #[test]
    fn test_negative_citation_is_schema_error() {
        let json = r#"{"score": 5, "feedback": "f", "nextQuestion": "q", "citationIndices": [-1]}"#;
        assert!(Evaluation::parse(json, session()).is_err());
    }

    #[test]
    fn test_malformed_json_is_schema_error() {
        let err = Evaluation::parse("not json at all", session()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Generation { stage: "schema", .. }
        ));
    }

    #[test]
    fn test_empty_next_question_rejected() {
        let json = r#"{"score": 5, "feedback": "f", "nextQuestion": "  ", "citationIndices": []}"#;
        assert!(Evaluation::parse(json, session()).is_err());
    }
}
