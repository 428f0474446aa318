//! Grounding assembler
//!
//! Turns a candidate's answer plus the two session documents into the
//! bounded context strings handed to the generation client. Missing or
//! fragmentless documents degrade to fallbacks rather than failing: a broken
//! upload should never kill an interview mid-flight.

use std::sync::Arc;

use tracing::debug;

use crate::embedding::{codec, Embedder};
use crate::errors::Result;
use crate::retrieval::{RetrievalResult, Retriever};
use crate::types::{Document, DocumentKind};

/// Context string when neither retrieval nor a first fragment is available
pub const NO_CONTEXT_PLACEHOLDER: &str =
    "No document context available. Evaluate the answer generally.";

/// Per-kind context cap in characters
pub const MAX_CONTEXT_CHARS: usize = 1000;

/// How many fragments the assembler retrieves across both documents
const TOP_K: usize = 2;

/// Prompt material produced for one evaluation
#[derive(Debug, Clone)]
pub struct GroundedPrompt {
    /// Context drawn from the resume (source index 0)
    pub resume_context: String,
    /// Context drawn from the job description (source index 1)
    pub jd_context: String,
    /// Retrieval provenance, best first
    pub retrieval: Vec<RetrievalResult>,
}

/// Builds grounded prompt material from the answer and candidate documents
pub struct GroundingAssembler {
    embedder: Arc<dyn Embedder>,
    retriever: Retriever,
}

impl GroundingAssembler {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            retriever: Retriever::new(),
        }
    }

    /// Assemble contexts for evaluating `answer`.
    ///
    /// Per document kind, independently: the top retrieved fragment of that
    /// kind if one made the top results, else the document's first fragment,
    /// else the placeholder. Either document may be absent. Stored fragment
    /// vectors are checked against the embedder dimension first; a width or
    /// content mismatch is a decode error, not a degraded score.
    pub async fn assemble(
        &self,
        resume: Option<&Document>,
        job_description: Option<&Document>,
        answer: &str,
    ) -> Result<GroundedPrompt> {
        let query = self.embedder.embed(answer).await?;

        let candidates: Vec<&Document> = resume.iter().chain(job_description.iter()).copied().collect();
        for document in &candidates {
            for fragment in &document.fragments {
                codec::validate(&fragment.embedding, self.embedder.dimension())?;
            }
        }
        let retrieval = self.retriever.retrieve(&query, &candidates, TOP_K);
        debug!(results = retrieval.len(), "grounding retrieval complete");

        let resume_context = context_for(DocumentKind::Resume, &retrieval, resume);
        let jd_context = context_for(DocumentKind::JobDescription, &retrieval, job_description);

        Ok(GroundedPrompt {
            resume_context,
            jd_context,
            retrieval,
        })
    }
}

fn context_for(
    kind: DocumentKind,
    retrieval: &[RetrievalResult],
    document: Option<&Document>,
) -> String {
    let text = retrieval
        .iter()
        .find(|r| r.kind == kind)
        .map(|r| r.text.as_str())
        .or_else(|| document.and_then(|d| d.first_fragment_text()))
        .unwrap_or(NO_CONTEXT_PLACEHOLDER);
    truncate_chars(text, MAX_CONTEXT_CHARS)
}

/// Truncate to at most `max` characters without splitting a code point
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
